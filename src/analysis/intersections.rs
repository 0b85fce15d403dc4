//! Intersection Solver: the value at zero and the real roots.
use crate::symbolic::symbolic_engine::{EvaluationError, Expr};
use crate::symbolic::symbolic_solve::{SolveFailure, solve_real};
use crate::symbolic::utils::format_list;
use log::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct Intersections {
    /// f(0), or why it does not exist
    pub y_intercept: Result<f64, EvaluationError>,
    /// real solutions of f(x) = 0, ascending
    pub roots: Result<Vec<f64>, SolveFailure>,
}

impl Intersections {
    /// The roots, or an empty slice when they could not be determined.
    pub fn real_roots(&self) -> &[f64] {
        match &self.roots {
            Ok(roots) => roots,
            Err(_) => &[],
        }
    }

    pub fn y_intercept_value(&self) -> Option<f64> {
        self.y_intercept.as_ref().ok().copied()
    }
}

pub fn intersections(expr: &Expr, var: &str) -> Intersections {
    let y_intercept = expr.eval_checked(var, 0.0);
    match &y_intercept {
        Ok(y) => info!("f(0) = {}", y),
        Err(err) => info!("f(0) is undefined: {}", err),
    }
    let roots = solve_real(expr, var);
    match &roots {
        Ok(roots) if roots.is_empty() => info!("no real roots"),
        Ok(roots) => info!("real roots: {}", format_list(roots)),
        Err(failure) => warn!("roots of {} not determined: {}", expr, failure),
    }
    Intersections { y_intercept, roots }
}
