//! a module turns a String expression into a symbolic expression
//!
//! Grammar (usual precedence, `^` right associative, unary minus below `^`):
//! ```text
//!   expr  := term (('+' | '-') term)*
//!   term  := unary (('*' | '/') unary)*
//!   unary := ('-' | '+') unary | power
//!   power := atom (('^' | '**') unary)?
//!   atom  := number | function '(' expr ')' | identifier | '(' expr ')'
//! ```
//! The only identifier accepted besides the constants `pi` and `e` is the bound variable
//! passed by the caller; everything else is rejected with a descriptive [`ParseError`].
//! Nesting is limited to [`MAX_NESTING`] levels and a formula to [`MAX_OPERATIONS`]
//! operators and function calls, so every later tree walk stays shallow.
//!
//!# Example
//! ```
//! use RustedFuncAnalyzer::symbolic::parse_expr::parse_expression_func;
//! let parsed = parse_expression_func("x^2 - 4", "x").unwrap();
//! assert_eq!(parsed.to_string(), "x^2 - 4");
//! assert!(parse_expression_func("foo(x)", "x").is_err());
//! ```
use crate::symbolic::symbolic_engine::Expr;
use log::{debug, warn};
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, digit0, digit1, multispace0, one_of},
    combinator::{opt, recognize},
    error::ErrorKind,
    multi::many0,
    sequence::{delimited, pair},
};
use std::f64::consts::{E, LN_10, PI};
use std::fmt;
use std::cell::Cell;
use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// deepest accepted nesting of parentheses, signs and exponents
pub const MAX_NESTING: usize = 256;
/// most operators, signs and function calls in one formula
pub const MAX_OPERATIONS: usize = 1000;

/// Elementary functions understood by the parser, with their accepted spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, EnumIter, Display)]
pub enum KnownFunction {
    #[strum(to_string = "exp")]
    Exp,
    #[strum(to_string = "log", serialize = "ln")]
    Ln,
    #[strum(to_string = "log10")]
    Log10,
    #[strum(to_string = "sqrt")]
    Sqrt,
    #[strum(to_string = "cbrt")]
    Cbrt,
    #[strum(to_string = "sin")]
    Sin,
    #[strum(to_string = "cos")]
    Cos,
    #[strum(to_string = "tan", serialize = "tg")]
    Tan,
    #[strum(to_string = "cot", serialize = "ctg")]
    Cot,
    #[strum(to_string = "asin", serialize = "arcsin")]
    Asin,
    #[strum(to_string = "acos", serialize = "arccos")]
    Acos,
    #[strum(to_string = "atan", serialize = "arctan", serialize = "arctg")]
    Atan,
    #[strum(to_string = "acot", serialize = "arccot", serialize = "arcctg")]
    Acot,
}

impl KnownFunction {
    /// Builds the expression node for `self(arg)`.
    pub fn apply(self, arg: Expr) -> Expr {
        match self {
            KnownFunction::Exp => arg.exp(),
            KnownFunction::Ln => arg.ln(),
            KnownFunction::Log10 => arg.ln() / Expr::Const(LN_10),
            KnownFunction::Sqrt => arg.sqrt(),
            KnownFunction::Cbrt => arg.pow(Expr::Const(1.0 / 3.0)),
            KnownFunction::Sin => Expr::sin(arg.boxed()),
            KnownFunction::Cos => Expr::cos(arg.boxed()),
            KnownFunction::Tan => Expr::tg(arg.boxed()),
            KnownFunction::Cot => Expr::ctg(arg.boxed()),
            KnownFunction::Asin => Expr::arcsin(arg.boxed()),
            KnownFunction::Acos => Expr::arccos(arg.boxed()),
            KnownFunction::Atan => Expr::arctg(arg.boxed()),
            KnownFunction::Acot => Expr::arcctg(arg.boxed()),
        }
    }

    pub fn supported_names() -> String {
        KnownFunction::iter()
            .map(|f| f.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Parse failure reported to the caller; positions are byte offsets into the input.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    EmptyInput,
    UnknownFunction { name: String, position: usize },
    UnknownSymbol { name: String, position: usize },
    /// a known function name used without a parenthesised argument
    MissingArguments { name: String, position: usize },
    MissingClosingParen { position: usize },
    ExpectedOperand { position: usize },
    InvalidNumber { text: String, position: usize },
    UnexpectedInput { found: String, position: usize },
    NestingTooDeep { position: usize },
    TooManyOperations { position: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::EmptyInput => write!(f, "the expression is empty"),
            ParseError::UnknownFunction { name, position } => write!(
                f,
                "unknown function '{}' at position {} (supported: {})",
                name,
                position,
                KnownFunction::supported_names()
            ),
            ParseError::UnknownSymbol { name, position } => {
                write!(f, "unknown symbol '{}' at position {}", name, position)
            }
            ParseError::MissingArguments { name, position } => write!(
                f,
                "function '{}' at position {} needs an argument in parentheses",
                name, position
            ),
            ParseError::MissingClosingParen { position } => {
                write!(f, "missing ')' at position {}", position)
            }
            ParseError::ExpectedOperand { position } => {
                write!(f, "expected a number, variable or '(' at position {}", position)
            }
            ParseError::InvalidNumber { text, position } => {
                write!(f, "invalid number '{}' at position {}", text, position)
            }
            ParseError::UnexpectedInput { found, position } if found == ")" => {
                write!(f, "unmatched ')' at position {}", position)
            }
            ParseError::UnexpectedInput { found, position } => {
                write!(f, "unexpected '{}' at position {}", found, position)
            }
            ParseError::NestingTooDeep { position } => write!(
                f,
                "nesting deeper than {} levels at position {}",
                MAX_NESTING, position
            ),
            ParseError::TooManyOperations { position } => write!(
                f,
                "more than {} operations, stopped at position {}",
                MAX_OPERATIONS, position
            ),
        }
    }
}

impl std::error::Error for ParseError {}

//////////////////////////////////////NOM PLUMBING/////////////////////////////////////////

#[derive(Debug, Clone, PartialEq)]
enum ExprErrorKind {
    Nom(ErrorKind),
    ExpectedOperand,
    MissingClosingParen,
    UnknownFunction(String),
    MissingArguments(String),
    UnknownSymbol(String),
    InvalidNumber(String),
    NestingTooDeep,
    TooManyOperations,
}

/// Error carried through the combinators; `input` is the unparsed suffix where it happened.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprError<'a> {
    input: &'a str,
    kind: ExprErrorKind,
}

impl<'a> ExprError<'a> {
    fn new(input: &'a str, kind: ExprErrorKind) -> Self {
        Self { input, kind }
    }

    fn into_parse_error(self, source: &str) -> ParseError {
        let position = source.len() - self.input.len();
        match self.kind {
            ExprErrorKind::ExpectedOperand | ExprErrorKind::Nom(_) if self.input.trim().is_empty() => {
                ParseError::ExpectedOperand { position }
            }
            ExprErrorKind::ExpectedOperand | ExprErrorKind::Nom(_) => {
                match self.input.chars().next() {
                    Some(c) if c.is_alphanumeric() || c == '(' || c == '.' => {
                        ParseError::ExpectedOperand { position }
                    }
                    Some(c) => ParseError::UnexpectedInput {
                        found: c.to_string(),
                        position,
                    },
                    None => ParseError::ExpectedOperand { position },
                }
            }
            ExprErrorKind::MissingClosingParen => ParseError::MissingClosingParen { position },
            ExprErrorKind::UnknownFunction(name) => ParseError::UnknownFunction { name, position },
            ExprErrorKind::MissingArguments(name) => {
                ParseError::MissingArguments { name, position }
            }
            ExprErrorKind::UnknownSymbol(name) => ParseError::UnknownSymbol { name, position },
            ExprErrorKind::InvalidNumber(text) => ParseError::InvalidNumber { text, position },
            ExprErrorKind::NestingTooDeep => ParseError::NestingTooDeep { position },
            ExprErrorKind::TooManyOperations => ParseError::TooManyOperations { position },
        }
    }
}

impl<'a> nom::error::ParseError<&'a str> for ExprError<'a> {
    fn from_error_kind(input: &'a str, kind: ErrorKind) -> Self {
        ExprError::new(input, ExprErrorKind::Nom(kind))
    }

    fn append(_input: &'a str, _kind: ErrorKind, other: Self) -> Self {
        other
    }
}

type PResult<'a, O> = IResult<&'a str, O, ExprError<'a>>;

fn ws<'a, O, P>(inner: P) -> impl Parser<&'a str, Output = O, Error = ExprError<'a>>
where
    P: Parser<&'a str, Output = O, Error = ExprError<'a>>,
{
    delimited(multispace0, inner, multispace0)
}

fn additive_op(input: &str) -> PResult<'_, Option<char>> {
    opt(ws(one_of("+-"))).parse(input)
}

fn multiplicative_op(input: &str) -> PResult<'_, Option<char>> {
    opt(ws(one_of("*/"))).parse(input)
}

fn power_op(input: &str) -> PResult<'_, Option<&str>> {
    opt(ws(alt((tag("^"), tag("**"))))).parse(input)
}

fn open_paren(input: &str) -> PResult<'_, char> {
    ws(char('(')).parse(input)
}

fn close_paren(input: &str) -> PResult<'_, char> {
    ws(char(')')).parse(input)
}

/// `12`, `1.5`, `.5`, `2.`, `3e-4`
fn number_text(input: &str) -> PResult<'_, &str> {
    recognize(pair(
        alt((
            recognize(pair(digit1, opt(pair(char('.'), digit0)))),
            recognize(pair(char('.'), digit1)),
        )),
        opt((one_of("eE"), opt(one_of("+-")), digit1)),
    ))
    .parse(input)
}

fn identifier(input: &str) -> PResult<'_, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))
    .parse(input)
}

fn negate(expr: Expr) -> Expr {
    match expr {
        Expr::Const(val) => Expr::Const(-val),
        other => -other,
    }
}

/// Recursive-descent parser bound to one variable name. `depth` counts the open
/// parentheses, signs and exponents above the current position.
struct ExprParser<'v> {
    var: &'v str,
    operations: Cell<usize>,
}

fn failure<'a, O>(input: &'a str, kind: ExprErrorKind) -> PResult<'a, O> {
    Err(nom::Err::Failure(ExprError::new(input, kind)))
}

impl<'v> ExprParser<'v> {
    fn new(var: &'v str) -> Self {
        ExprParser {
            var,
            operations: Cell::new(0),
        }
    }

    fn nested<'a>(&self, input: &'a str, depth: usize) -> PResult<'a, ()> {
        if depth > MAX_NESTING {
            return failure(input, ExprErrorKind::NestingTooDeep);
        }
        Ok((input, ()))
    }

    /// counts one more operator or call
    fn operation<'a>(&self, input: &'a str) -> PResult<'a, ()> {
        let count = self.operations.get() + 1;
        self.operations.set(count);
        if count > MAX_OPERATIONS {
            return failure(input, ExprErrorKind::TooManyOperations);
        }
        Ok((input, ()))
    }

    fn expr<'a>(&self, input: &'a str, depth: usize) -> PResult<'a, Expr> {
        self.nested(input, depth)?;
        let (mut rest, mut acc) = self.term(input, depth)?;
        loop {
            let (after_op, op) = additive_op(rest)?;
            let Some(op) = op else {
                return Ok((rest, acc));
            };
            self.operation(rest)?;
            let (after_term, rhs) = self.term(after_op, depth)?;
            acc = if op == '+' {
                Expr::Add(acc.boxed(), rhs.boxed())
            } else {
                Expr::Sub(acc.boxed(), rhs.boxed())
            };
            rest = after_term;
        }
    }

    fn term<'a>(&self, input: &'a str, depth: usize) -> PResult<'a, Expr> {
        let (mut rest, mut acc) = self.unary(input, depth)?;
        loop {
            let (after_op, op) = multiplicative_op(rest)?;
            let Some(op) = op else {
                return Ok((rest, acc));
            };
            self.operation(rest)?;
            let (after_factor, rhs) = self.unary(after_op, depth)?;
            acc = if op == '*' {
                Expr::Mul(acc.boxed(), rhs.boxed())
            } else {
                Expr::Div(acc.boxed(), rhs.boxed())
            };
            rest = after_factor;
        }
    }

    fn unary<'a>(&self, input: &'a str, depth: usize) -> PResult<'a, Expr> {
        let (rest, sign) = additive_op(input)?;
        match sign {
            Some(_) => {
                self.nested(input, depth + 1)?;
                self.operation(input)?;
                let (rest, inner) = self.unary(rest, depth + 1)?;
                Ok((rest, if sign == Some('-') { negate(inner) } else { inner }))
            }
            None => self.power(rest, depth),
        }
    }

    fn power<'a>(&self, input: &'a str, depth: usize) -> PResult<'a, Expr> {
        let (rest, base) = self.atom(input, depth)?;
        let (after_op, op) = power_op(rest)?;
        if op.is_none() {
            return Ok((rest, base));
        }
        self.nested(rest, depth + 1)?;
        self.operation(rest)?;
        let (rest, exponent) = self.unary(after_op, depth + 1)?;
        Ok((rest, Expr::Pow(base.boxed(), exponent.boxed())))
    }

    fn atom<'a>(&self, input: &'a str, depth: usize) -> PResult<'a, Expr> {
        let input = input.trim_start();
        if let Ok((rest, text)) = number_text(input) {
            return match text.parse::<f64>() {
                Ok(value) => Ok((rest, Expr::Const(value))),
                Err(_) => Err(nom::Err::Failure(ExprError::new(
                    input,
                    ExprErrorKind::InvalidNumber(text.to_string()),
                ))),
            };
        }
        if let Ok((rest, name)) = identifier(input) {
            return self.named(input, rest, name, depth);
        }
        if input.starts_with('(') {
            return self.parenthesized(input, depth);
        }
        Err(nom::Err::Error(ExprError::new(
            input,
            ExprErrorKind::ExpectedOperand,
        )))
    }

    /// identifier: bound variable, constant or function call
    fn named<'a>(
        &self,
        start: &'a str,
        rest: &'a str,
        name: &'a str,
        depth: usize,
    ) -> PResult<'a, Expr> {
        let is_call = rest.trim_start().starts_with('(');
        if is_call {
            let function = KnownFunction::from_str(name).map_err(|_| {
                nom::Err::Failure(ExprError::new(
                    start,
                    ExprErrorKind::UnknownFunction(name.to_string()),
                ))
            })?;
            self.operation(start)?;
            let (rest, arg) = self.parenthesized(rest, depth)?;
            return Ok((rest, function.apply(arg)));
        }
        if name == self.var {
            return Ok((rest, Expr::Var(name.to_string())));
        }
        match name {
            "pi" => Ok((rest, Expr::Const(PI))),
            "e" => Ok((rest, Expr::Const(E))),
            _ if KnownFunction::from_str(name).is_ok() => Err(nom::Err::Failure(
                ExprError::new(start, ExprErrorKind::MissingArguments(name.to_string())),
            )),
            _ => Err(nom::Err::Failure(ExprError::new(
                start,
                ExprErrorKind::UnknownSymbol(name.to_string()),
            ))),
        }
    }

    fn parenthesized<'a>(&self, input: &'a str, depth: usize) -> PResult<'a, Expr> {
        let (rest, _) = open_paren(input)?;
        let (rest, inner) = self.expr(rest, depth + 1)?;
        match close_paren(rest) {
            Ok((rest, _)) => Ok((rest, inner)),
            Err(_) => Err(nom::Err::Failure(ExprError::new(
                rest,
                ExprErrorKind::MissingClosingParen,
            ))),
        }
    }
}

/// Parses `input` as a function of the single variable `var`.
pub fn parse_expression_func(input: &str, var: &str) -> Result<Expr, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::EmptyInput);
    }
    let parser = ExprParser::new(var);
    match parser.expr(input, 0) {
        Ok((rest, expr)) => {
            let rest = rest.trim_start();
            match rest.chars().next() {
                None => Ok(expr),
                Some(c) => Err(ParseError::UnexpectedInput {
                    found: c.to_string(),
                    position: input.len() - rest.len(),
                }),
            }
        }
        Err(nom::Err::Error(err)) | Err(nom::Err::Failure(err)) => {
            Err(err.into_parse_error(input))
        }
        Err(nom::Err::Incomplete(_)) => Err(ParseError::ExpectedOperand {
            position: input.len(),
        }),
    }
}

impl Expr {
    /// Parses a mathematical expression in the variable `var`, logging the outcome.
    ///
    /// # Supported Syntax
    /// - Variable: the one named by `var`
    /// - Constants: 3.14, 1e-6, pi, e
    /// - Operators: +, -, *, /, ^ (or **)
    /// - Functions: see [`KnownFunction`]
    /// - Parentheses for grouping
    pub fn parse_expression(input: &str, var: &str) -> Result<Expr, ParseError> {
        match parse_expression_func(input, var) {
            Ok(expr) => {
                debug!("parsed '{}' as {}", input, expr.srepr());
                Ok(expr)
            }
            Err(err) => {
                warn!("could not parse '{}': {}", input, err);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Expr, ParseError> {
        parse_expression_func(input, "x")
    }

    fn x() -> Box<Expr> {
        Box::new(Expr::Var("x".to_string()))
    }

    #[test]
    fn test_parse_exponential() {
        let expr = parse("exp(x)").unwrap();
        assert_eq!(expr, Expr::Exp(x()));
    }

    #[test]
    fn test_parse_constant() {
        let expr = parse("42").unwrap();
        assert_eq!(expr, Expr::Const(42.0));
        assert_eq!(parse("1.5e-3").unwrap(), Expr::Const(1.5e-3));
        assert_eq!(parse(".5").unwrap(), Expr::Const(0.5));
        assert_eq!(parse("pi").unwrap(), Expr::Const(PI));
    }

    #[test]
    fn test_parse_addition() {
        let expr = parse("x + 2").unwrap();
        assert_eq!(expr, Expr::Add(x(), Box::new(Expr::Const(2.0))));
    }

    #[test]
    fn test_parse_division() {
        let expr = parse("1/x").unwrap();
        assert_eq!(expr, Expr::Div(Box::new(Expr::Const(1.0)), x()));
    }

    #[test]
    fn test_parse_power_and_unary_minus() {
        let expr = parse("-x^2").unwrap();
        assert_eq!(expr, -Expr::Pow(x(), Box::new(Expr::Const(2.0))));
        let expr = parse("x**-1").unwrap();
        assert_eq!(expr, Expr::Pow(x(), Box::new(Expr::Const(-1.0))));
    }

    #[test]
    fn test_power_is_right_associative() {
        let expr = parse("2^3^2").unwrap();
        let expected = Expr::Const(2.0).pow(Expr::Const(3.0).pow(Expr::Const(2.0)));
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_multiple_subtraction_is_left_associative() {
        let result = parse("x^2 - x - 1").unwrap();
        let to_check = Expr::Pow(x(), Box::new(Expr::Const(2.0))) - *x() - Expr::Const(1.0);
        assert_eq!(result, to_check);
    }

    #[test]
    fn test_parse_expression_with_brackets() {
        let expr = parse("(x + 1) * (x - 2) / exp(x)").unwrap();
        let expected = (*x() + Expr::Const(1.0)) * (*x() - Expr::Const(2.0)) / Expr::Exp(x());
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_function_aliases() {
        assert_eq!(parse("log(x)").unwrap(), Expr::Ln(x()));
        assert_eq!(parse("ln(x)").unwrap(), Expr::Ln(x()));
        assert_eq!(parse("tan(x)").unwrap(), Expr::tg(x()));
        assert_eq!(parse("arctan(x)").unwrap(), Expr::arctg(x()));
        assert_eq!(parse("sqrt(x)").unwrap(), Expr::Pow(x(), Box::new(Expr::Const(0.5))));
        assert_eq!(parse("sin(cos(x))").unwrap(), Expr::sin(Box::new(Expr::cos(x()))));
    }

    #[test]
    fn test_invalid_expression() {
        assert_eq!(parse("(x +"), Err(ParseError::ExpectedOperand { position: 4 }));
        assert_eq!(parse("(x + 1"), Err(ParseError::MissingClosingParen { position: 6 }));
        assert_eq!(
            parse("x + 1)"),
            Err(ParseError::UnexpectedInput {
                found: ")".to_string(),
                position: 5
            })
        );
        assert_eq!(parse("   "), Err(ParseError::EmptyInput));
    }

    #[test]
    fn test_unknown_names() {
        assert_eq!(
            parse("foo(x)"),
            Err(ParseError::UnknownFunction {
                name: "foo".to_string(),
                position: 0
            })
        );
        assert_eq!(
            parse("x + y"),
            Err(ParseError::UnknownSymbol {
                name: "y".to_string(),
                position: 4
            })
        );
        assert_eq!(
            parse("sin x"),
            Err(ParseError::MissingArguments {
                name: "sin".to_string(),
                position: 0
            })
        );
        let message = parse("foo(x)").unwrap_err().to_string();
        assert!(message.contains("foo") && message.contains("sqrt"));
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}x{}", "(".repeat(20_000), ")".repeat(20_000));
        assert!(matches!(parse(&deep), Err(ParseError::NestingTooDeep { .. })));
        let signs = format!("{}x", "-".repeat(5_000));
        assert!(matches!(parse(&signs), Err(ParseError::NestingTooDeep { .. })));
        let towers = vec!["x"; 2_000].join("^");
        assert!(matches!(parse(&towers), Err(ParseError::NestingTooDeep { .. })));
        let calls = format!("{}x{}", "sin(".repeat(300), ")".repeat(300));
        assert!(matches!(parse(&calls), Err(ParseError::NestingTooDeep { .. })));

        let fine = format!("{}x{}", "(".repeat(200), ")".repeat(200));
        assert_eq!(parse(&fine).unwrap(), Expr::Var("x".to_string()));
        let message = parse(&deep).unwrap_err().to_string();
        assert!(message.contains("256"));
    }

    #[test]
    fn test_operation_limit() {
        let long_sum = vec!["x"; 5_000].join(" + ");
        assert!(matches!(
            parse(&long_sum),
            Err(ParseError::TooManyOperations { .. })
        ));
        let long_product = vec!["2"; 5_000].join("*");
        assert!(matches!(
            parse(&long_product),
            Err(ParseError::TooManyOperations { .. })
        ));
        let accepted = vec!["x"; 500].join(" + ");
        assert!(parse(&accepted).is_ok());
    }

    #[test]
    fn test_other_variable_name() {
        let expr = parse_expression_func("t^2 + 1", "t").unwrap();
        assert!(expr.contains_variable("t"));
        assert!(parse_expression_func("t^2 + 1", "x").is_err());
    }
}
