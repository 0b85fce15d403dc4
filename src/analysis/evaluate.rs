//! Point Evaluator: `f(x0)` with a readable trace of the reduction.
use crate::symbolic::symbolic_engine::{EvaluationError, Expr};
use crate::symbolic::utils::format_number;
use log::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct PointEvaluation {
    /// structural form, substituted form, then the numeric result or the error
    pub trace: Vec<String>,
    pub value: Option<f64>,
    pub error: Option<EvaluationError>,
}

impl PointEvaluation {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Evaluates `expr` at `var = x`; failures become a trace entry and a typed error.
pub fn evaluate_at(expr: &Expr, var: &str, x: f64) -> PointEvaluation {
    let mut trace = vec![format!("Original expression: {}", expr.srepr())];
    let shown_x = format_number(x);
    let substituted = expr.set_variable(var, x).simplify_();
    trace.push(format!("Substituting {} = {} -> {}", var, shown_x, substituted));
    // the unsimplified tree keeps every check (x/x at 0 still divides by zero)
    match expr.eval_checked(var, x) {
        Ok(value) => {
            trace.push(format!("Numeric evaluation: f({}) = {}", shown_x, value));
            info!("f({}) = {}", shown_x, value);
            PointEvaluation {
                trace,
                value: Some(value),
                error: None,
            }
        }
        Err(err) => {
            trace.push(format!("Evaluation error: {}", err));
            warn!("f({}) could not be evaluated: {}", shown_x, err);
            PointEvaluation {
                trace,
                value: None,
                error: Some(err),
            }
        }
    }
}
