#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// a module turns a String expression into a symbolic expression
///
///# Example
/// ```
/// use RustedFuncAnalyzer::symbolic::symbolic_engine::Expr;
/// let input = "x^2 - 4*log(x + 1)";
/// let parsed_expression = Expr::parse_expression(input, "x").unwrap();
/// println!(" parsed_expression {}", parsed_expression);
/// assert!(Expr::parse_expression("y + 1", "x").is_err());
/// ```
/// ________________________________________________________________________________________________________________________________
pub mod parse_expr;
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// a module
/// 1) holds the expression tree of a function of one real variable
/// 2) prints it in a human-readable form and as a structural tree
/// 3) evaluates it at a point, reporting why the value does not exist over the reals
///# Example#
/// ```
/// use RustedFuncAnalyzer::symbolic::symbolic_engine::{EvaluationError, Expr};
/// let f = Expr::parse_expression("sqrt(x) + 1/x", "x").unwrap();
/// println!("f = {}", f);
/// assert_eq!(f.eval_checked("x", 4.0), Ok(2.25));
/// assert_eq!(f.eval_checked("x", 0.0), Err(EvaluationError::DivisionByZero));
/// ```
/// ________________________________________________________________________________________________________________________________________________
pub mod symbolic_engine;
mod symbolic_engine_tests;
/// numerator/denominator form and hidden denominators
pub mod symbolic_fraction;
/// dense polynomials and their real roots
pub mod symbolic_polynomial;
pub mod symbolic_simplify;
/// real solutions of f(x) = 0
///# Example#
/// ```
/// use RustedFuncAnalyzer::symbolic::symbolic_engine::Expr;
/// use RustedFuncAnalyzer::symbolic::symbolic_solve::{solve_real, SolveFailure};
/// let f = Expr::parse_expression("ln(x - 1)", "x").unwrap();
/// assert_eq!(solve_real(&f, "x"), Ok(vec![2.0]));
/// let g = Expr::parse_expression("sin(x)", "x").unwrap();
/// assert!(matches!(solve_real(&g, "x"), Err(SolveFailure::InfiniteSolutions(_))));
/// ```
pub mod symbolic_solve;
pub mod utils;
