//! # Symbolic Expression Simplification Module
//!
//! Light algebraic simplification, enough for the analyses built on top of it:
//!
//! 1. **Constant Folding**: evaluates variable-free subtrees, but only when the result is a
//!    finite real number, so `1/0` or `ln(-1)` stay visible for the domain scans
//! 2. **Algebraic Identities**: `x + 0 = x`, `x * 1 = x`, `x^1 = x`, `x - x = 0`, ...
//! 3. **Constant Chains**: `2 * (3 * x) = 6 * x`, `(x + 1) + 2 = x + 3`
//!
//! It is not a canonical form; polynomial work goes through
//! [`crate::symbolic::symbolic_polynomial::Polynomial`] instead.

use crate::symbolic::symbolic_engine::Expr;

impl Expr {
    //___________________________________SIMPLIFICATION____________________________________

    /// Bottom-up simplification with constant folding and basic identities.
    ///
    /// ## Examples
    ///
    /// - `Const(2) + Const(3)` → `Const(5)`
    /// - `x * 1 + 0` → `x`
    /// - `(x - x) * y` → `0`
    /// - `1 / 0` → `1 / 0` (left for the domain analysis)
    pub fn simplify_(&self) -> Expr {
        let simplified = match self {
            Expr::Var(_) | Expr::Const(_) => return self.clone(),
            Expr::Add(lhs, rhs) => simplify_add(lhs.simplify_(), rhs.simplify_()),
            Expr::Sub(lhs, rhs) => simplify_sub(lhs.simplify_(), rhs.simplify_()),
            Expr::Mul(lhs, rhs) => simplify_mul(lhs.simplify_(), rhs.simplify_()),
            Expr::Div(lhs, rhs) => simplify_div(lhs.simplify_(), rhs.simplify_()),
            Expr::Pow(base, exp) => simplify_pow(base.simplify_(), exp.simplify_()),
            _ => match self.function_argument() {
                Some(arg) => self.with_argument(arg.simplify_()),
                None => self.clone(),
            },
        };
        fold_constant(simplified)
    }
}

/// Replaces a variable-free tree by its value if that value is a finite real.
fn fold_constant(expr: Expr) -> Expr {
    if let Expr::Const(_) = expr {
        return expr;
    }
    match expr.is_constant().then(|| expr.eval_checked("", 0.0)) {
        Some(Ok(value)) => Expr::Const(value),
        _ => expr,
    }
}

fn simplify_add(lhs: Expr, rhs: Expr) -> Expr {
    match (lhs, rhs) {
        (lhs, rhs) if lhs.is_zero() => rhs,
        (lhs, rhs) if rhs.is_zero() => lhs,
        (Expr::Const(a), Expr::Const(b)) => Expr::Const(a + b),
        // (x + c1) + c2 = x + (c1 + c2)
        (Expr::Add(inner, c1), Expr::Const(c2)) if matches!(*c1, Expr::Const(_)) => {
            let c1 = c1.const_value().unwrap_or(0.0);
            simplify_add(*inner, Expr::Const(c1 + c2))
        }
        (Expr::Const(c), rhs) => simplify_add(rhs, Expr::Const(c)),
        (lhs, rhs) => Expr::Add(Box::new(lhs), Box::new(rhs)),
    }
}

fn simplify_sub(lhs: Expr, rhs: Expr) -> Expr {
    if rhs.is_zero() {
        return lhs;
    }
    if lhs == rhs {
        return Expr::Const(0.0);
    }
    if lhs.is_zero() {
        return simplify_mul(Expr::Const(-1.0), rhs);
    }
    Expr::Sub(Box::new(lhs), Box::new(rhs))
}

fn simplify_mul(lhs: Expr, rhs: Expr) -> Expr {
    match (lhs, rhs) {
        (lhs, _) if lhs.is_zero() => Expr::Const(0.0),
        (_, rhs) if rhs.is_zero() => Expr::Const(0.0),
        (lhs, rhs) if lhs.is_one() => rhs,
        (lhs, rhs) if rhs.is_one() => lhs,
        (Expr::Const(a), Expr::Const(b)) => Expr::Const(a * b),
        // keep constants on the left
        (lhs, Expr::Const(c)) => simplify_mul(Expr::Const(c), lhs),
        // c1 * (c2 * x) = (c1 * c2) * x
        (Expr::Const(c1), Expr::Mul(inner_c, inner)) if matches!(*inner_c, Expr::Const(_)) => {
            let c2 = inner_c.const_value().unwrap_or(1.0);
            simplify_mul(Expr::Const(c1 * c2), *inner)
        }
        (lhs, rhs) => Expr::Mul(Box::new(lhs), Box::new(rhs)),
    }
}

fn simplify_div(lhs: Expr, rhs: Expr) -> Expr {
    if rhs.is_one() {
        return lhs;
    }
    if lhs == rhs && !rhs.is_zero() {
        return Expr::Const(1.0);
    }
    if lhs.is_zero() && !rhs.is_zero() {
        return Expr::Const(0.0);
    }
    Expr::Div(Box::new(lhs), Box::new(rhs))
}

fn simplify_pow(base: Expr, exp: Expr) -> Expr {
    if exp.is_one() {
        return base;
    }
    if exp.is_zero() || base.is_one() {
        return Expr::Const(1.0);
    }
    Expr::Pow(Box::new(base), Box::new(exp))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Expr {
        Expr::Var("x".to_string())
    }

    #[test]
    fn test_constant_folding() {
        let expr = Expr::Const(2.0) + Expr::Const(3.0) * Expr::Const(4.0);
        assert_eq!(expr.simplify_(), Expr::Const(14.0));
    }

    #[test]
    fn test_division_by_zero_is_not_folded() {
        let expr = Expr::Const(1.0) / Expr::Const(0.0);
        assert_eq!(expr.simplify_(), expr);
        let log = Expr::Const(-1.0).ln();
        assert_eq!(log.simplify_(), log);
    }

    #[test]
    fn test_identities() {
        let expr = x() * Expr::Const(1.0) + Expr::Const(0.0);
        assert_eq!(expr.simplify_(), x());
        let expr = (x() - x()) * Expr::Var("x".to_string()).exp();
        assert_eq!(expr.simplify_(), Expr::Const(0.0));
        let expr = x().pow(Expr::Const(1.0));
        assert_eq!(expr.simplify_(), x());
        let expr = x().pow(Expr::Const(0.0));
        assert_eq!(expr.simplify_(), Expr::Const(1.0));
    }

    #[test]
    fn test_constant_chains() {
        let expr = Expr::Const(2.0) * (Expr::Const(3.0) * x());
        assert_eq!(expr.simplify_(), Expr::Const(6.0) * x());
        let expr = (x() + Expr::Const(1.0)) + Expr::Const(2.0);
        assert_eq!(expr.simplify_(), x() + Expr::Const(3.0));
        let expr = x() * Expr::Const(5.0);
        assert_eq!(expr.simplify_(), Expr::Const(5.0) * x());
    }

    #[test]
    fn test_substitution_then_simplify() {
        let expr = x() + Expr::Const(1.0);
        assert_eq!(expr.set_variable("x", 2.0).simplify_(), Expr::Const(3.0));
    }
}
