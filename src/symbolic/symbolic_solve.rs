//! Real solutions of `f(x) = 0` for the expression shapes the analyses meet in practice.
//!
//! The solver is a small set of rules rather than a general algebra system:
//! - products split into factors and positive powers reduce to their base, before any
//!   expansion, so `(x - 2)^4` is solved as `x - 2`;
//! - polynomials go to [`Polynomial::real_roots_within`];
//! - `N/D` keeps the zeros of `N` where `D` does not vanish;
//! - `h(g) = c` is inverted for `exp`, `ln`, powers, affine maps and the inverse
//!   trigonometric functions, then `g = h^-1(c)` is solved recursively.
//!
//! Every candidate is checked by evaluating the expression, so a root is only reported
//! where the function is actually defined and zero. The whole search runs under a
//! [`Deadline`].
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_polynomial::Polynomial;
use crate::symbolic::utils::{format_number, sorted_unique};
use log::debug;
use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;
use std::time::{Duration, Instant};

/// budget of [`solve_real`]
pub const SOLVE_BUDGET: Duration = Duration::from_secs(5);
const MAX_DEPTH: usize = 32;
const ROOT_TOLERANCE: f64 = 1e-7;
/// |f(root)| allowed when verifying a candidate, relative to 1 + |root|
const RESIDUAL_TOLERANCE: f64 = 1e-6;

/// Why an equation could not be solved; `Ok(vec![])` means "no real solution".
#[derive(Debug, Clone, PartialEq)]
pub enum SolveFailure {
    /// the equation shape is outside what the solver handles
    Unsupported(String),
    /// identically zero, or periodic with infinitely many solutions
    InfiniteSolutions(String),
    Numerical(String),
    Timeout,
}

impl fmt::Display for SolveFailure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SolveFailure::Unsupported(what) => write!(f, "unsupported equation: {}", what),
            SolveFailure::InfiniteSolutions(what) => {
                write!(f, "infinitely many solutions: {}", what)
            }
            SolveFailure::Numerical(what) => write!(f, "numerical failure: {}", what),
            SolveFailure::Timeout => write!(f, "the time budget was exhausted"),
        }
    }
}

impl std::error::Error for SolveFailure {}

/// Wall-clock budget shared by the solver, the root finder and the range estimator.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    budget: Duration,
}

impl Deadline {
    pub fn new(budget: Duration) -> Deadline {
        Deadline {
            start: Instant::now(),
            budget,
        }
    }

    pub fn unlimited() -> Deadline {
        Deadline::new(Duration::MAX)
    }

    pub fn expired(&self) -> bool {
        self.start.elapsed() >= self.budget
    }

    pub fn check(&self) -> Result<(), SolveFailure> {
        if self.expired() {
            Err(SolveFailure::Timeout)
        } else {
            Ok(())
        }
    }
}

/// Solves `expr = 0` over the reals in the variable `var`.
///
/// # Example
/// ```
/// use RustedFuncAnalyzer::symbolic::parse_expr::parse_expression_func;
/// use RustedFuncAnalyzer::symbolic::symbolic_solve::solve_real;
/// let expr = parse_expression_func("x^2 - 4", "x").unwrap();
/// assert_eq!(solve_real(&expr, "x"), Ok(vec![-2.0, 2.0]));
/// ```
pub fn solve_real(expr: &Expr, var: &str) -> Result<Vec<f64>, SolveFailure> {
    solve_real_within(expr, var, &Deadline::new(SOLVE_BUDGET))
}

/// [`solve_real`] with an explicit budget; `Err(Timeout)` once it passes.
pub fn solve_real_within(
    expr: &Expr,
    var: &str,
    deadline: &Deadline,
) -> Result<Vec<f64>, SolveFailure> {
    let solver = RealSolver { var, deadline };
    let roots = solver
        .solve(&expr.simplify_(), 0)
        .map(|roots| solver.defined_only(expr, roots));
    match &roots {
        Ok(roots) => debug!("{} = 0 solved: {:?}", expr, roots),
        Err(failure) => debug!("{} = 0 not solved: {}", expr, failure),
    }
    roots
}

struct RealSolver<'v> {
    var: &'v str,
    deadline: &'v Deadline,
}

impl<'v> RealSolver<'v> {
    fn solve(&self, expr: &Expr, depth: usize) -> Result<Vec<f64>, SolveFailure> {
        if depth > MAX_DEPTH {
            return Err(SolveFailure::Unsupported(format!(
                "{} = 0 is nested too deeply",
                expr
            )));
        }
        self.deadline.check()?;
        if !expr.contains_variable(self.var) {
            return match expr.const_value() {
                Some(value) if value == 0.0 => Err(SolveFailure::InfiniteSolutions(format!(
                    "{} is identically zero",
                    expr
                ))),
                _ => Ok(Vec::new()),
            };
        }
        if let Some(roots) = self.factored(expr, depth)? {
            return Ok(roots);
        }
        if let Some(polynomial) = Polynomial::from_expr(expr, self.var) {
            return polynomial.real_roots_within(self.deadline);
        }
        let (numer, denom) = expr.as_numer_denom();
        if denom.contains_variable(self.var) {
            let candidates = self.solve(&numer, depth + 1)?;
            return Ok(self.verified(expr, candidates));
        }
        let candidates = self.solve_shape(expr, depth)?;
        Ok(self.verified(expr, candidates))
    }

    /// `expr = value`, i.e. `expr - value = 0`
    fn solve_equal(&self, expr: &Expr, value: f64, depth: usize) -> Result<Vec<f64>, SolveFailure> {
        let shifted = (expr.clone() - Expr::Const(value)).simplify_();
        self.solve(&shifted, depth + 1)
    }

    /// A product vanishes where a factor does, a positive power where its base does.
    /// `None` for other shapes.
    fn factored(&self, expr: &Expr, depth: usize) -> Result<Option<Vec<f64>>, SolveFailure> {
        let candidates = match expr {
            Expr::Mul(lhs, rhs) => {
                let mut roots = self.solve(lhs, depth + 1)?;
                roots.extend(self.solve(rhs, depth + 1)?);
                roots
            }
            Expr::Pow(base, exp)
                if base.contains_variable(self.var)
                    && exp.const_value().is_some_and(|p| p > 0.0) =>
            {
                self.solve(base, depth + 1)?
            }
            _ => return Ok(None),
        };
        Ok(Some(sorted_unique(
            self.defined_only(expr, candidates),
            ROOT_TOLERANCE,
        )))
    }

    fn solve_shape(&self, expr: &Expr, depth: usize) -> Result<Vec<f64>, SolveFailure> {
        match expr {
            Expr::Div(lhs, _) => self.solve(lhs, depth + 1),
            Expr::Pow(base, exp) => match exp.const_value() {
                Some(_) => Ok(Vec::new()),
                // c^g with a constant base never vanishes for c > 0
                None if !base.contains_variable(self.var) => Ok(Vec::new()),
                None => Err(self.unsupported(expr)),
            },
            Expr::Add(lhs, rhs) => match (lhs.const_value(), rhs.const_value()) {
                (_, Some(c)) => self.invert(lhs, -c, depth),
                (Some(c), _) => self.invert(rhs, -c, depth),
                _ => Err(self.unsupported(expr)),
            },
            Expr::Sub(lhs, rhs) => match (lhs.const_value(), rhs.const_value()) {
                (_, Some(c)) => self.invert(lhs, c, depth),
                (Some(c), _) => self.invert(rhs, c, depth),
                _ => Err(self.unsupported(expr)),
            },
            _ => self.invert(expr, 0.0, depth),
        }
    }

    /// Solves `h(..) = value` by undoing the outermost operation of `h`.
    fn invert(&self, h: &Expr, value: f64, depth: usize) -> Result<Vec<f64>, SolveFailure> {
        let none = || Ok(Vec::new());
        match h {
            Expr::Var(_) => Ok(vec![value]),
            Expr::Exp(g) if value > 0.0 => self.solve_equal(g, value.ln(), depth),
            Expr::Exp(_) => none(),
            Expr::Ln(g) => self.solve_equal(g, value.exp(), depth),
            Expr::Pow(g, exp) => match exp.const_value() {
                Some(p) if value == 0.0 && p > 0.0 => self.solve(g, depth + 1),
                Some(_) if value == 0.0 => none(),
                Some(p) => {
                    // g = ±|value|^(1/p); the wrong sign is rejected by verification
                    let magnitude = value.abs().powf(1.0 / p);
                    let mut roots = self.solve_equal(g, magnitude, depth)?;
                    roots.extend(self.solve_equal(g, -magnitude, depth)?);
                    Ok(self.verified(&(h.clone() - Expr::Const(value)), roots))
                }
                None => Err(self.unsupported(h)),
            },
            Expr::Mul(k, g) | Expr::Mul(g, k) if k.const_value().is_some_and(|k| k != 0.0) => {
                let k = k.const_value().unwrap_or(1.0);
                self.solve_equal(g, value / k, depth)
            }
            Expr::Div(g, k) if k.const_value().is_some_and(|k| k != 0.0) => {
                let k = k.const_value().unwrap_or(1.0);
                self.solve_equal(g, value * k, depth)
            }
            Expr::Div(k, g) if k.const_value().is_some() => match k.const_value() {
                Some(k) if value != 0.0 => self.solve_equal(g, k / value, depth),
                _ => none(),
            },
            Expr::Add(g, k) | Expr::Add(k, g) if k.const_value().is_some() => {
                let k = k.const_value().unwrap_or(0.0);
                self.solve_equal(g, value - k, depth)
            }
            Expr::Sub(g, k) if k.const_value().is_some() => {
                let k = k.const_value().unwrap_or(0.0);
                self.solve_equal(g, value + k, depth)
            }
            Expr::Sub(k, g) if k.const_value().is_some() => {
                let k = k.const_value().unwrap_or(0.0);
                self.solve_equal(g, k - value, depth)
            }
            Expr::arctg(g) if value.abs() < FRAC_PI_2 => self.solve_equal(g, value.tan(), depth),
            Expr::arcctg(g) if value > 0.0 && value < PI => {
                self.solve_equal(g, (FRAC_PI_2 - value).tan(), depth)
            }
            Expr::arcsin(g) if value.abs() <= FRAC_PI_2 => {
                self.solve_equal(g, value.sin(), depth)
            }
            Expr::arccos(g) if (0.0..=PI).contains(&value) => {
                self.solve_equal(g, value.cos(), depth)
            }
            Expr::arctg(_) | Expr::arcctg(_) | Expr::arcsin(_) | Expr::arccos(_) => none(),
            Expr::sin(_) | Expr::cos(_) if value.abs() > 1.0 => none(),
            Expr::sin(_) | Expr::cos(_) | Expr::tg(_) | Expr::ctg(_) => {
                Err(SolveFailure::InfiniteSolutions(format!(
                    "{} = {} is periodic",
                    h,
                    format_number(value)
                )))
            }
            _ => Err(self.unsupported(&(h.clone() - Expr::Const(value)))),
        }
    }

    /// keeps the candidates where `expr` is defined and (numerically) zero
    fn verified(&self, expr: &Expr, candidates: Vec<f64>) -> Vec<f64> {
        let accepted = candidates
            .into_iter()
            .filter(|root| match expr.eval_checked(self.var, *root) {
                Ok(value) => value.abs() <= RESIDUAL_TOLERANCE * (1.0 + root.abs()),
                Err(err) => {
                    debug!("candidate {} of {} = 0 rejected: {}", root, expr, err);
                    false
                }
            })
            .collect();
        sorted_unique(accepted, ROOT_TOLERANCE)
    }

    /// drops the roots where `expr` itself is undefined
    fn defined_only(&self, expr: &Expr, roots: Vec<f64>) -> Vec<f64> {
        roots
            .into_iter()
            .filter(|root| expr.eval_checked(self.var, *root).is_ok())
            .collect()
    }

    fn unsupported(&self, expr: &Expr) -> SolveFailure {
        SolveFailure::Unsupported(format!("cannot solve {} = 0", expr))
    }
}
