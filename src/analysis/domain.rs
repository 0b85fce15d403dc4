//! Domain Analyzer
//!
//! Finds where a function of one real variable is undefined:
//! - zeros of its denominator (after bringing it onto one fraction) and of denominators hidden
//!   inside function arguments become [`DomainExclusionSet`] members;
//! - every logarithm gives a `arg > 0` [`Constraint`];
//! - every even-index root gives a `radicand >= 0` [`Constraint`] (`> 0` when the root sits
//!   in a denominator, i.e. the exponent is negative).
//!
//! Constraints are reported, not solved. A denominator the solver cannot handle is recorded in
//! [`DomainAnalysis::failures`] and the rest of the analysis goes on.
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_solve::{SolveFailure, solve_real};
use crate::symbolic::utils::{format_list, rational_exponent, sorted_unique};
use itertools::Itertools;
use log::{info, warn};
use std::fmt;

/// exclusions closer than this are the same point
const EXCLUSION_MERGE_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Greater,
    GreaterOrEqual,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Relation::Greater => write!(f, ">"),
            Relation::GreaterOrEqual => write!(f, ">="),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOrigin {
    Logarithm,
    EvenRoot,
}

/// `expr > 0` or `expr >= 0`, required for the function to be defined.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub expr: Expr,
    pub relation: Relation,
    pub origin: ConstraintOrigin,
}

impl Constraint {
    /// `None` when the constrained expression itself cannot be evaluated at `x`.
    pub fn is_satisfied_at(&self, var: &str, x: f64) -> Option<bool> {
        let value = self.expr.eval_checked(var, x).ok()?;
        Some(match self.relation {
            Relation::Greater => value > 0.0,
            Relation::GreaterOrEqual => value >= 0.0,
        })
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} 0", self.expr, self.relation)
    }
}

/// Sorted, de-duplicated real points where some denominator vanishes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DomainExclusionSet {
    values: Vec<f64>,
}

impl DomainExclusionSet {
    pub fn new(values: Vec<f64>) -> Self {
        DomainExclusionSet {
            values: sorted_unique(values, EXCLUSION_MERGE_TOLERANCE),
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.values.iter()
    }

    /// true if some exclusion lies strictly closer than `tolerance` to `x`
    pub fn is_near(&self, x: f64, tolerance: f64) -> bool {
        self.values.iter().any(|e| (x - e).abs() < tolerance)
    }
}

impl fmt::Display for DomainExclusionSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", format_list(&self.values))
    }
}

/// A denominator whose zeros could not be determined.
#[derive(Debug, Clone, PartialEq)]
pub struct UnresolvedDenominator {
    pub denominator: Expr,
    pub failure: SolveFailure,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DomainAnalysis {
    pub description: String,
    pub exclusions: DomainExclusionSet,
    pub log_constraints: Vec<Constraint>,
    pub root_constraints: Vec<Constraint>,
    pub failures: Vec<UnresolvedDenominator>,
}

/// Analyzes where `expr` is defined as a function of `var`.
pub fn analyze_domain(expr: &Expr, var: &str) -> DomainAnalysis {
    let mut denominators = Vec::new();
    let (_, denominator) = expr.as_numer_denom();
    if denominator.contains_variable(var) {
        denominators.push(denominator);
    }
    for hidden in expr.inner_denominators(var) {
        if !denominators.contains(&hidden) {
            denominators.push(hidden);
        }
    }

    let mut excluded = Vec::new();
    let mut failures = Vec::new();
    for denominator in denominators {
        match solve_real(&denominator, var) {
            Ok(roots) => excluded.extend(roots),
            Err(failure) => {
                warn!("zeros of the denominator {} not found: {}", denominator, failure);
                failures.push(UnresolvedDenominator {
                    denominator,
                    failure,
                });
            }
        }
    }
    let exclusions = DomainExclusionSet::new(excluded);
    let log_constraints = log_constraints(expr, var);
    let root_constraints = even_root_constraints(expr, var);
    let description = describe(
        var,
        &exclusions,
        &log_constraints,
        &root_constraints,
        &failures,
    );
    info!("{}", description);
    DomainAnalysis {
        description,
        exclusions,
        log_constraints,
        root_constraints,
        failures,
    }
}

fn push_unique(constraints: &mut Vec<Constraint>, constraint: Constraint) {
    if !constraints.contains(&constraint) {
        constraints.push(constraint);
    }
}

/// `arg > 0` for every logarithm whose argument depends on `var`
pub fn log_constraints(expr: &Expr, var: &str) -> Vec<Constraint> {
    let mut constraints = Vec::new();
    expr.walk(&mut |node| {
        if let Expr::Ln(arg) = node {
            if arg.contains_variable(var) {
                push_unique(
                    &mut constraints,
                    Constraint {
                        expr: (**arg).clone(),
                        relation: Relation::Greater,
                        origin: ConstraintOrigin::Logarithm,
                    },
                );
            }
        }
    });
    constraints
}

/// `base >= 0` for every power whose exponent is a fraction with an even denominator
pub fn even_root_constraints(expr: &Expr, var: &str) -> Vec<Constraint> {
    let mut constraints = Vec::new();
    expr.walk(&mut |node| {
        let Expr::Pow(base, exp) = node else {
            return;
        };
        if !base.contains_variable(var) {
            return;
        }
        let Some(ratio) = exp.const_value().and_then(rational_exponent) else {
            return;
        };
        if ratio.denom() % 2 != 0 {
            return;
        }
        let relation = if *ratio.numer() < 0 {
            Relation::Greater
        } else {
            Relation::GreaterOrEqual
        };
        push_unique(
            &mut constraints,
            Constraint {
                expr: (**base).clone(),
                relation,
                origin: ConstraintOrigin::EvenRoot,
            },
        );
    });
    constraints
}

fn describe(
    var: &str,
    exclusions: &DomainExclusionSet,
    log_constraints: &[Constraint],
    root_constraints: &[Constraint],
    failures: &[UnresolvedDenominator],
) -> String {
    let mut parts = Vec::new();
    if !exclusions.is_empty() {
        parts.push(format!("except {} = {}", var, exclusions));
    }
    if !log_constraints.is_empty() {
        parts.push(format!(
            "log arguments must be positive: {}",
            log_constraints.iter().join(", ")
        ));
    }
    if !root_constraints.is_empty() {
        parts.push(format!(
            "even-root radicands must be non-negative: {}",
            root_constraints.iter().join(", ")
        ));
    }
    if !failures.is_empty() {
        parts.push(format!(
            "unresolved: zeros of {} could not be determined",
            failures.iter().map(|f| &f.denominator).join(", ")
        ));
    }
    if parts.is_empty() {
        "Domain: all real numbers".to_string()
    } else {
        format!("Domain: all real numbers, {}", parts.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::parse_expr::parse_expression_func;

    fn analyze(input: &str) -> DomainAnalysis {
        analyze_domain(&parse_expression_func(input, "x").unwrap(), "x")
    }

    #[test]
    fn test_polynomial_has_no_restrictions() {
        let domain = analyze("x^2 - 4");
        assert!(domain.exclusions.is_empty());
        assert!(domain.log_constraints.is_empty() && domain.root_constraints.is_empty());
        assert_eq!(domain.description, "Domain: all real numbers");
    }

    #[test]
    fn test_reciprocal() {
        let domain = analyze("1/x");
        assert_eq!(domain.exclusions.values(), &[0.0]);
        assert_eq!(domain.description, "Domain: all real numbers, except x = 0");
    }

    #[test]
    fn test_rational_with_several_poles() {
        let domain = analyze("1/x + 1/(x - 2) + x/(x^2 - 9)");
        assert_eq!(domain.exclusions.values(), &[-3.0, 0.0, 2.0, 3.0]);
    }

    #[test]
    fn test_removable_singularity_is_still_excluded() {
        let domain = analyze("(x^2 - 1)/(x - 1)");
        assert_eq!(domain.exclusions.values(), &[1.0]);
    }

    #[test]
    fn test_logarithm_constraint() {
        let domain = analyze("log(x - 1)");
        assert_eq!(domain.log_constraints.len(), 1);
        assert_eq!(domain.log_constraints[0].to_string(), "x - 1 > 0");
        assert!(domain.description.contains("x - 1 > 0"));
        assert_eq!(domain.log_constraints[0].is_satisfied_at("x", 2.0), Some(true));
        assert_eq!(domain.log_constraints[0].is_satisfied_at("x", 0.5), Some(false));
    }

    #[test]
    fn test_even_root_constraint() {
        let domain = analyze("sqrt(x)");
        assert_eq!(domain.root_constraints.len(), 1);
        assert_eq!(domain.root_constraints[0].expr, Expr::Var("x".to_string()));
        assert_eq!(domain.root_constraints[0].to_string(), "x >= 0");
        assert_eq!(
            domain.description,
            "Domain: all real numbers, even-root radicands must be non-negative: x >= 0"
        );
    }

    #[test]
    fn test_odd_root_has_no_constraint() {
        assert!(analyze("cbrt(x - 1)").root_constraints.is_empty());
        assert!(analyze("x^(2/3)").root_constraints.is_empty());
    }

    #[test]
    fn test_repeated_denominator_roots() {
        let domain = analyze("1/(x - 2)^4");
        assert_eq!(domain.exclusions.values(), &[2.0]);
        assert_eq!(domain.description, "Domain: all real numbers, except x = 2");
        let domain = analyze("1/(x^3 - 3*x^2 + 3*x - 1)");
        assert_eq!(domain.exclusions.values(), &[1.0]);
        let domain = analyze("x/((x - 1)^2*(x + 3))");
        assert_eq!(domain.exclusions.values(), &[-3.0, 1.0]);
    }

    #[test]
    fn test_root_in_denominator() {
        let domain = analyze("1/sqrt(x - 1)");
        assert_eq!(domain.exclusions.values(), &[1.0]);
        assert_eq!(domain.root_constraints[0].relation, Relation::GreaterOrEqual);
        let domain = analyze("(x + 2)^(-0.5)");
        assert_eq!(domain.root_constraints[0].to_string(), "x + 2 > 0");
        assert_eq!(domain.exclusions.values(), &[-2.0]);
    }

    #[test]
    fn test_hidden_denominators() {
        let domain = analyze("ln(1/(x - 3))");
        assert_eq!(domain.exclusions.values(), &[3.0]);
        assert_eq!(domain.log_constraints[0].to_string(), "1/(x - 3) > 0");
    }

    #[test]
    fn test_unresolved_denominator_degrades() {
        let domain = analyze("1/sin(x)");
        assert!(domain.exclusions.is_empty());
        assert_eq!(domain.failures.len(), 1);
        assert!(matches!(
            domain.failures[0].failure,
            SolveFailure::InfiniteSolutions(_)
        ));
        assert!(domain.description.contains("unresolved"));
    }

    #[test]
    fn test_tangent_poles_are_reported() {
        for input in ["tan(x)", "cot(x)", "1/sin(x)"] {
            let domain = analyze(input);
            assert_eq!(domain.failures.len(), 1, "{}", input);
            assert!(domain.description.contains("unresolved"), "{}", input);
            assert_ne!(domain.description, "Domain: all real numbers");
        }
        assert!(analyze("tan(x)").failures[0].denominator.to_string().contains("cos"));
    }

    #[test]
    fn test_combined_description() {
        let domain = analyze("ln(x)/(x - 2) + sqrt(x + 5)");
        assert_eq!(
            domain.description,
            "Domain: all real numbers, except x = 2; log arguments must be positive: x > 0; \
             even-root radicands must be non-negative: x + 5 >= 0"
        );
    }
}
