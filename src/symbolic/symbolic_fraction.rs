//! Numerator/denominator form of an expression.
//!
//! [`Expr::as_numer_denom`] brings sums, products, quotients and powers onto one fraction
//! `N/D`, so every point where some denominator vanishes is a zero of `D`.
//! [`Expr::inner_denominators`] collects the denominators that the outer fraction cannot see
//! because they sit inside a function argument or under a fractional power.
use crate::symbolic::symbolic_engine::Expr;

fn product(lhs: Expr, rhs: Expr) -> Expr {
    (lhs * rhs).simplify_()
}

impl Expr {
    /// Returns `(numerator, denominator)` with `self == numerator / denominator` wherever
    /// both sides are defined. Function applications are kept whole in the numerator.
    pub fn as_numer_denom(&self) -> (Expr, Expr) {
        let one = || Expr::Const(1.0);
        match self {
            Expr::Add(lhs, rhs) | Expr::Sub(lhs, rhs) => {
                let (ln, ld) = lhs.as_numer_denom();
                let (rn, rd) = rhs.as_numer_denom();
                let (lhs_part, rhs_part, denom) = if ld == rd {
                    (ln, rn, ld)
                } else {
                    (
                        product(ln, rd.clone()),
                        product(rn, ld.clone()),
                        product(ld, rd),
                    )
                };
                let numer = if matches!(self, Expr::Add(..)) {
                    (lhs_part + rhs_part).simplify_()
                } else {
                    (lhs_part - rhs_part).simplify_()
                };
                (numer, denom)
            }
            Expr::Mul(lhs, rhs) => {
                let (ln, ld) = lhs.as_numer_denom();
                let (rn, rd) = rhs.as_numer_denom();
                (product(ln, rn), product(ld, rd))
            }
            Expr::Div(lhs, rhs) => {
                let (ln, ld) = lhs.as_numer_denom();
                let (rn, rd) = rhs.as_numer_denom();
                (product(ln, rd), product(ld, rn))
            }
            Expr::Pow(base, exp) => match exp.const_value() {
                Some(p) if p < 0.0 => {
                    let (bn, bd) = base.as_numer_denom();
                    let flipped = Expr::Const(-p);
                    (
                        bd.pow(flipped.clone()).simplify_(),
                        bn.pow(flipped).simplify_(),
                    )
                }
                Some(p) if p.fract() == 0.0 => {
                    let (bn, bd) = base.as_numer_denom();
                    let p = Expr::Const(p);
                    (bn.pow(p.clone()).simplify_(), bd.pow(p).simplify_())
                }
                _ => (self.clone(), one()),
            },
            _ => (self.clone(), one()),
        }
    }

    /// Denominators in `var` hidden inside function arguments, fractional-power bases and
    /// non-constant exponents, e.g. `x - 2` for `sqrt(1/(x - 2))`. `tg(g)` contributes
    /// `cos(g)` and `ctg(g)` contributes `sin(g)`.
    pub fn inner_denominators(&self, var: &str) -> Vec<Expr> {
        let mut hidden: Vec<&Expr> = Vec::new();
        let mut implicit: Vec<Expr> = Vec::new();
        self.walk(&mut |node| match node {
            Expr::tg(arg) => {
                implicit.push(Expr::cos(arg.clone()));
                hidden.push(arg);
            }
            Expr::ctg(arg) => {
                implicit.push(Expr::sin(arg.clone()));
                hidden.push(arg);
            }
            Expr::Pow(base, exp) => {
                let integer_exponent = exp.const_value().is_some_and(|p| p.fract() == 0.0);
                if !integer_exponent {
                    hidden.push(base);
                    hidden.push(exp);
                }
            }
            _ => {
                if let Some(arg) = node.function_argument() {
                    hidden.push(arg);
                }
            }
        });
        let mut denominators: Vec<Expr> = Vec::new();
        let found = hidden
            .into_iter()
            .map(|inner| inner.as_numer_denom().1)
            .chain(implicit);
        for denom in found {
            if denom.contains_variable(var) && !denominators.contains(&denom) {
                denominators.push(denom);
            }
        }
        denominators
    }
}
