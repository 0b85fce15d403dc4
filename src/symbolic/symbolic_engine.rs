//! # Symbolic Engine Module
//!
//! Core expression type of the analyzer: an immutable tree over one real variable.
//! Every transformation (substitution, simplification, fraction reduction) returns a new
//! `Expr`; nothing in the analysis pipeline mutates a parsed expression.
//!
//! ## Main Structures and Methods
//!
//! ### `Expr` Enum
//! - **Variables**: `Var(String)` - the bound variable, e.g. "x"
//! - **Constants**: `Const(f64)` - numerical constants
//! - **Operations**: `Add`, `Sub`, `Mul`, `Div`, `Pow` - basic arithmetic
//! - **Functions**: `Exp`, `Ln`, `sin`, `cos`, `tg`, `ctg`, `arcsin`, `arccos`, `arctg`, `arcctg`
//!
//! ### Key Methods
//! - `set_variable(var, value)` - substitute the variable with a number
//! - `eval_checked(var, value)` - evaluate over the reals with typed failures
//! - `walk(..)` - pre-order traversal used by the domain scans
//! - `srepr()` - structural form of the tree, used in evaluation traces
//!
//! ## Interesting Code Features
//!
//! 1. **Operator Overloading**: `std::ops` traits give natural syntax: `x.clone() * x - c`
//! 2. **Precedence-aware Display**: prints `x^2 - 4` rather than `((x ^ 2) - 4)`, so
//!    constraints read like the user typed them
//! 3. **Real odd roots**: `x^(1/3)` evaluates to `-2` at `-8` instead of NaN
//! 4. **Non-standard Function Names**: mathematical notation (tg, ctg, arctg) is kept for
//!    the variants; the parser accepts the programming names as aliases

#![allow(non_camel_case_types)]

use crate::symbolic::utils::rational_exponent;
use std::f64::consts::PI;
use std::fmt;

/// Symbolic expression over a single real variable.
///
/// # Examples
/// ```rust, ignore
/// use symbolic_engine::Expr;
/// let x = Expr::Var("x".to_string());
/// let expr = Expr::Add(Box::new(x), Box::new(Expr::Const(2.0)));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Symbolic variable with a name (e.g., "x")
    Var(String),
    /// Numerical constant value
    Const(f64),
    /// Addition operation: left + right
    Add(Box<Expr>, Box<Expr>),
    /// Subtraction operation: left - right
    Sub(Box<Expr>, Box<Expr>),
    /// Multiplication operation: left * right
    Mul(Box<Expr>, Box<Expr>),
    /// Division operation: left / right
    Div(Box<Expr>, Box<Expr>),
    /// Power operation: base ^ exponent
    Pow(Box<Expr>, Box<Expr>),
    /// Exponential function: e^x
    Exp(Box<Expr>),
    /// Natural logarithm: ln(x)
    Ln(Box<Expr>),
    sin(Box<Expr>),
    cos(Box<Expr>),
    /// Tangent, mathematical notation 'tg'
    tg(Box<Expr>),
    /// Cotangent, mathematical notation 'ctg'
    ctg(Box<Expr>),
    arcsin(Box<Expr>),
    arccos(Box<Expr>),
    /// Arctangent, mathematical notation 'arctg'
    arctg(Box<Expr>),
    /// Arccotangent, mathematical notation 'arcctg'
    arcctg(Box<Expr>),
}

/// Reasons a point evaluation over the reals can fail.
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationError {
    /// A symbol other than the bound variable was met
    UnboundVariable(String),
    DivisionByZero,
    LogOfNonPositive(f64),
    EvenRootOfNegative(f64),
    /// Argument outside the real domain of an elementary function
    OutOfDomain { function: &'static str, argument: f64 },
    /// Overflow or another non-finite intermediate value
    NonFinite,
    /// The input value itself is NaN or infinite
    InvalidArgument(f64),
}

impl fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EvaluationError::UnboundVariable(name) => {
                write!(f, "symbol '{}' has no value", name)
            }
            EvaluationError::DivisionByZero => write!(f, "division by zero"),
            EvaluationError::LogOfNonPositive(arg) => {
                write!(f, "logarithm of non-positive value {}", arg)
            }
            EvaluationError::EvenRootOfNegative(arg) => {
                write!(f, "even root of negative value {}", arg)
            }
            EvaluationError::OutOfDomain { function, argument } => {
                write!(f, "{} is not defined over the reals at {}", function, argument)
            }
            EvaluationError::NonFinite => write!(f, "result is not a finite real number"),
            EvaluationError::InvalidArgument(value) => {
                write!(f, "input value {} is not a finite real number", value)
            }
        }
    }
}

impl std::error::Error for EvaluationError {}

/// Operator precedence used by `Display`.
fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Add(..) | Expr::Sub(..) => 1,
        Expr::Mul(..) | Expr::Div(..) => 2,
        Expr::Pow(base, exp) if is_half(exp) && !base.is_constant() => 5,
        Expr::Pow(..) => 3,
        Expr::Const(val) if *val < 0.0 => 1,
        _ => 5,
    }
}

fn is_half(expr: &Expr) -> bool {
    matches!(expr, Expr::Const(c) if *c == 0.5)
}

fn write_operand(f: &mut fmt::Formatter, expr: &Expr, min_prec: u8) -> fmt::Result {
    if precedence(expr) < min_prec {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}

/// Human-readable form with minimal parentheses.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Const(val) => write!(f, "{}", val),
            Expr::Add(lhs, rhs) => {
                write_operand(f, lhs, 1)?;
                match &**rhs {
                    Expr::Const(c) if *c < 0.0 => write!(f, " - {}", -c),
                    Expr::Mul(k, inner) if matches!(**k, Expr::Const(c) if c == -1.0) => {
                        write!(f, " - ")?;
                        write_operand(f, inner, 2)
                    }
                    _ => {
                        write!(f, " + ")?;
                        write_operand(f, rhs, 1)
                    }
                }
            }
            Expr::Sub(lhs, rhs) => {
                write_operand(f, lhs, 1)?;
                write!(f, " - ")?;
                write_operand(f, rhs, 2)
            }
            Expr::Mul(lhs, rhs) => {
                if matches!(**lhs, Expr::Const(c) if c == -1.0) {
                    write!(f, "-")?;
                    return write_operand(f, rhs, 2);
                }
                match &**lhs {
                    Expr::Const(c) if *c < 0.0 => write!(f, "{}", c)?,
                    _ => write_operand(f, lhs, 2)?,
                }
                write!(f, "*")?;
                write_operand(f, rhs, 2)
            }
            Expr::Div(lhs, rhs) => {
                write_operand(f, lhs, 2)?;
                write!(f, "/")?;
                write_operand(f, rhs, 3)
            }
            Expr::Pow(base, exp) => {
                if is_half(exp) && !base.is_constant() {
                    return write!(f, "sqrt({})", base);
                }
                write_operand(f, base, 4)?;
                write!(f, "^")?;
                write_operand(f, exp, 4)
            }
            Expr::Exp(expr) => write!(f, "exp({})", expr),
            Expr::Ln(expr) => write!(f, "ln({})", expr),
            Expr::sin(expr) => write!(f, "sin({})", expr),
            Expr::cos(expr) => write!(f, "cos({})", expr),
            Expr::tg(expr) => write!(f, "tg({})", expr),
            Expr::ctg(expr) => write!(f, "ctg({})", expr),
            Expr::arcsin(expr) => write!(f, "arcsin({})", expr),
            Expr::arccos(expr) => write!(f, "arccos({})", expr),
            Expr::arctg(expr) => write!(f, "arctg({})", expr),
            Expr::arcctg(expr) => write!(f, "arcctg({})", expr),
        }
    }
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::Add(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::Sub(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::Mul(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expr::Div(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(self))
    }
}

impl Expr {
    /// BASIC FEATURES

    /// Convenience method to wrap expression in Box for recursive structures.
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    /// Creates exponential function e^(self).
    pub fn exp(self) -> Expr {
        Expr::Exp(self.boxed())
    }

    /// Creates natural logarithm ln(self).
    pub fn ln(self) -> Expr {
        Expr::Ln(self.boxed())
    }

    /// Creates power expression self^rhs.
    pub fn pow(self, rhs: Expr) -> Expr {
        Expr::Pow(self.boxed(), rhs.boxed())
    }

    /// Square root as the power `self^0.5`, so the even-root scan sees it.
    pub fn sqrt(self) -> Expr {
        Expr::Pow(self.boxed(), Box::new(Expr::Const(0.5)))
    }

    /// Checks if expression is exactly the constant zero.
    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Const(val) if *val == 0.0)
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Expr::Const(val) if *val == 1.0)
    }

    /// true if the tree has no variables at all
    pub fn is_constant(&self) -> bool {
        self.all_arguments_are_variables().is_empty()
    }

    /// Numerical value of a variable-free expression, if it is a finite real number.
    pub fn const_value(&self) -> Option<f64> {
        match self {
            Expr::Const(val) => Some(*val),
            _ if self.is_constant() => self.eval_checked("", 0.0).ok(),
            _ => None,
        }
    }

    /// Argument of a unary elementary function, `None` for leaves and binary operations.
    pub fn function_argument(&self) -> Option<&Expr> {
        match self {
            Expr::Exp(arg)
            | Expr::Ln(arg)
            | Expr::sin(arg)
            | Expr::cos(arg)
            | Expr::tg(arg)
            | Expr::ctg(arg)
            | Expr::arcsin(arg)
            | Expr::arccos(arg)
            | Expr::arctg(arg)
            | Expr::arcctg(arg) => Some(arg),
            _ => None,
        }
    }

    /// Rebuilds the same unary function around a new argument.
    /// Leaves and binary operations are returned unchanged.
    pub fn with_argument(&self, arg: Expr) -> Expr {
        let arg = arg.boxed();
        match self {
            Expr::Exp(_) => Expr::Exp(arg),
            Expr::Ln(_) => Expr::Ln(arg),
            Expr::sin(_) => Expr::sin(arg),
            Expr::cos(_) => Expr::cos(arg),
            Expr::tg(_) => Expr::tg(arg),
            Expr::ctg(_) => Expr::ctg(arg),
            Expr::arcsin(_) => Expr::arcsin(arg),
            Expr::arccos(_) => Expr::arccos(arg),
            Expr::arctg(_) => Expr::arctg(arg),
            Expr::arcctg(_) => Expr::arcctg(arg),
            _ => self.clone(),
        }
    }

    /// Structural representation of the tree (the `Debug` form), e.g.
    /// `Add(Var("x"), Const(1.0))`.
    pub fn srepr(&self) -> String {
        format!("{:?}", self)
    }

    /// Pre-order traversal: `visit` sees every node, parents before children.
    pub fn walk<'a, F>(&'a self, visit: &mut F)
    where
        F: FnMut(&'a Expr),
    {
        visit(self);
        match self {
            Expr::Var(_) | Expr::Const(_) => {}
            Expr::Add(lhs, rhs)
            | Expr::Sub(lhs, rhs)
            | Expr::Mul(lhs, rhs)
            | Expr::Div(lhs, rhs)
            | Expr::Pow(lhs, rhs) => {
                lhs.walk(visit);
                rhs.walk(visit);
            }
            _ => {
                if let Some(arg) = self.function_argument() {
                    arg.walk(visit);
                }
            }
        }
    }

    /// Substitutes a variable with a constant value throughout the expression.
    pub fn set_variable(&self, var: &str, value: f64) -> Expr {
        self.substitute_variable(var, &Expr::Const(value))
    }

    /// substitute a variable with an expression
    pub fn substitute_variable(&self, var: &str, expr: &Expr) -> Expr {
        match self {
            Expr::Var(name) if name == var => expr.clone(),
            Expr::Var(_) | Expr::Const(_) => self.clone(),
            Expr::Add(lhs, rhs) => Expr::Add(
                Box::new(lhs.substitute_variable(var, expr)),
                Box::new(rhs.substitute_variable(var, expr)),
            ),
            Expr::Sub(lhs, rhs) => Expr::Sub(
                Box::new(lhs.substitute_variable(var, expr)),
                Box::new(rhs.substitute_variable(var, expr)),
            ),
            Expr::Mul(lhs, rhs) => Expr::Mul(
                Box::new(lhs.substitute_variable(var, expr)),
                Box::new(rhs.substitute_variable(var, expr)),
            ),
            Expr::Div(lhs, rhs) => Expr::Div(
                Box::new(lhs.substitute_variable(var, expr)),
                Box::new(rhs.substitute_variable(var, expr)),
            ),
            Expr::Pow(base, exp) => Expr::Pow(
                Box::new(base.substitute_variable(var, expr)),
                Box::new(exp.substitute_variable(var, expr)),
            ),
            _ => match self.function_argument() {
                Some(arg) => self.with_argument(arg.substitute_variable(var, expr)),
                None => self.clone(),
            },
        }
    }

    /// check if the expression contains a variable
    pub fn contains_variable(&self, var_name: &str) -> bool {
        let mut found = false;
        self.walk(&mut |node| {
            if let Expr::Var(name) = node {
                found |= name == var_name;
            }
        });
        found
    }

    /// Extracts all unique variable names, sorted and de-duplicated.
    pub fn all_arguments_are_variables(&self) -> Vec<String> {
        let mut vars = Vec::new();
        self.walk(&mut |node| {
            if let Expr::Var(name) = node {
                vars.push(name.clone());
            }
        });
        vars.sort();
        vars.dedup();
        vars
    }

    //___________________________________CHECKED EVALUATION____________________________________

    /// Evaluates the expression over the reals at `var = value`.
    ///
    /// Unlike a plain `f64` evaluation, every node is checked: a zero denominator, a
    /// logarithm of a non-positive number or an even root of a negative number produce a
    /// typed [`EvaluationError`] instead of `inf`/`NaN`. Odd roots of negative numbers are
    /// real (`(-8)^(1/3) = -2`).
    pub fn eval_checked(&self, var: &str, value: f64) -> Result<f64, EvaluationError> {
        let result = match self {
            Expr::Var(name) => {
                if name == var {
                    if !value.is_finite() {
                        return Err(EvaluationError::InvalidArgument(value));
                    }
                    value
                } else {
                    return Err(EvaluationError::UnboundVariable(name.clone()));
                }
            }
            Expr::Const(val) => *val,
            Expr::Add(lhs, rhs) => lhs.eval_checked(var, value)? + rhs.eval_checked(var, value)?,
            Expr::Sub(lhs, rhs) => lhs.eval_checked(var, value)? - rhs.eval_checked(var, value)?,
            Expr::Mul(lhs, rhs) => lhs.eval_checked(var, value)? * rhs.eval_checked(var, value)?,
            Expr::Div(lhs, rhs) => {
                let num = lhs.eval_checked(var, value)?;
                let den = rhs.eval_checked(var, value)?;
                if den == 0.0 {
                    return Err(EvaluationError::DivisionByZero);
                }
                num / den
            }
            Expr::Pow(base, exp) => {
                let b = base.eval_checked(var, value)?;
                let e = exp.eval_checked(var, value)?;
                real_power(b, e)?
            }
            Expr::Exp(expr) => expr.eval_checked(var, value)?.exp(),
            Expr::Ln(expr) => {
                let arg = expr.eval_checked(var, value)?;
                if arg <= 0.0 {
                    return Err(EvaluationError::LogOfNonPositive(arg));
                }
                arg.ln()
            }
            Expr::sin(expr) => expr.eval_checked(var, value)?.sin(),
            Expr::cos(expr) => expr.eval_checked(var, value)?.cos(),
            Expr::tg(expr) => {
                let arg = expr.eval_checked(var, value)?;
                if arg.cos() == 0.0 {
                    return Err(EvaluationError::DivisionByZero);
                }
                arg.tan()
            }
            Expr::ctg(expr) => {
                let arg = expr.eval_checked(var, value)?;
                let sin = arg.sin();
                if sin == 0.0 {
                    return Err(EvaluationError::DivisionByZero);
                }
                arg.cos() / sin
            }
            Expr::arcsin(expr) => {
                let arg = expr.eval_checked(var, value)?;
                if arg.abs() > 1.0 {
                    return Err(EvaluationError::OutOfDomain {
                        function: "arcsin",
                        argument: arg,
                    });
                }
                arg.asin()
            }
            Expr::arccos(expr) => {
                let arg = expr.eval_checked(var, value)?;
                if arg.abs() > 1.0 {
                    return Err(EvaluationError::OutOfDomain {
                        function: "arccos",
                        argument: arg,
                    });
                }
                arg.acos()
            }
            Expr::arctg(expr) => expr.eval_checked(var, value)?.atan(),
            Expr::arcctg(expr) => PI / 2.0 - expr.eval_checked(var, value)?.atan(),
        };
        if result.is_finite() {
            Ok(result)
        } else {
            Err(EvaluationError::NonFinite)
        }
    } // end of eval_checked
}

/// `base^exp` over the reals.
fn real_power(base: f64, exp: f64) -> Result<f64, EvaluationError> {
    if base == 0.0 && exp < 0.0 {
        return Err(EvaluationError::DivisionByZero);
    }
    if base >= 0.0 || exp.fract() == 0.0 {
        return Ok(base.powf(exp));
    }
    // negative base, fractional exponent: only odd-index roots stay real
    match rational_exponent(exp) {
        Some(ratio) if ratio.denom() % 2 != 0 => {
            let magnitude = (-base).powf(exp);
            if ratio.numer() % 2 == 0 {
                Ok(magnitude)
            } else {
                Ok(-magnitude)
            }
        }
        Some(_) => Err(EvaluationError::EvenRootOfNegative(base)),
        None => Err(EvaluationError::OutOfDomain {
            function: "pow",
            argument: base,
        }),
    }
}
