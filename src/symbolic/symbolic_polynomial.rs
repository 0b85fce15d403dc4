//! Dense univariate polynomials with `f64` coefficients.
//!
//! Used by the solver (real roots), by the domain analysis (denominator zeros) and by the
//! range estimator (critical points). Coefficients are stored in ascending order:
//! `coeffs[k]` multiplies `x^k`.
//!
//! Real roots are isolated between the critical points: the roots of `p'` split the line
//! into pieces where `p` is monotone, so every piece holds at most one root and bisection
//! finds it. A critical point where `p` itself vanishes is a multiple root. The derivative
//! is handled the same way, down to the closed forms of degree 2.
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_solve::{Deadline, SolveFailure};
use crate::symbolic::utils::{canonical, sorted_unique};
use log::debug;
use std::ops::{Add, Mul, Neg, Sub};

/// highest degree `from_expr` builds and `real_roots` accepts
pub const MAX_DEGREE: usize = 64;
/// |p(c)| at a critical point below this share of `sum |a_k| |c|^k` counts as zero
const ZERO_TOLERANCE: f64 = 1e-10;
const ROOT_MERGE_TOLERANCE: f64 = 1e-7;
/// bisection steps between two deadline checks
const STEPS_PER_CHECK: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    coeffs: Vec<f64>,
}

impl Polynomial {
    /// Builds a polynomial from ascending coefficients; trailing zeros are dropped.
    pub fn new(coeffs: Vec<f64>) -> Self {
        let mut coeffs = coeffs;
        while coeffs.last() == Some(&0.0) {
            coeffs.pop();
        }
        Polynomial { coeffs }
    }

    pub fn zero() -> Self {
        Polynomial { coeffs: Vec::new() }
    }

    pub fn constant(value: f64) -> Self {
        Polynomial::new(vec![value])
    }

    /// the polynomial `x`
    pub fn identity() -> Self {
        Polynomial::new(vec![0.0, 1.0])
    }

    pub fn coeffs(&self) -> &[f64] {
        &self.coeffs
    }

    /// `None` for the zero polynomial.
    pub fn degree(&self) -> Option<usize> {
        self.coeffs.len().checked_sub(1)
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    pub fn leading_coefficient(&self) -> f64 {
        self.coeffs.last().copied().unwrap_or(0.0)
    }

    pub fn scale(&self, factor: f64) -> Polynomial {
        Polynomial::new(self.coeffs.iter().map(|c| c * factor).collect())
    }

    pub fn powi(&self, exponent: u32) -> Polynomial {
        (0..exponent).fold(Polynomial::constant(1.0), |acc, _| acc * self.clone())
    }

    /// Horner evaluation
    pub fn eval(&self, x: f64) -> f64 {
        self.coeffs.iter().rev().fold(0.0, |acc, c| acc * x + c)
    }

    pub fn derivative(&self) -> Polynomial {
        Polynomial::new(
            self.coeffs
                .iter()
                .enumerate()
                .skip(1)
                .map(|(k, c)| k as f64 * c)
                .collect(),
        )
    }

    /// Extracts a polynomial in `var` from an expression made of `+ - * /` by constants,
    /// non-negative integer powers and variable-free subtrees. `None` for anything else,
    /// and for expansions above [`MAX_DEGREE`].
    pub fn from_expr(expr: &Expr, var: &str) -> Option<Polynomial> {
        if !expr.contains_variable(var) {
            return expr
                .const_value()
                .filter(|v| v.is_finite())
                .map(Polynomial::constant);
        }
        match expr {
            Expr::Var(name) if name == var => Some(Polynomial::identity()),
            Expr::Add(lhs, rhs) => {
                Some(Polynomial::from_expr(lhs, var)? + Polynomial::from_expr(rhs, var)?)
            }
            Expr::Sub(lhs, rhs) => {
                Some(Polynomial::from_expr(lhs, var)? - Polynomial::from_expr(rhs, var)?)
            }
            Expr::Mul(lhs, rhs) => {
                let lhs = Polynomial::from_expr(lhs, var)?;
                let rhs = Polynomial::from_expr(rhs, var)?;
                if lhs.degree().unwrap_or(0) + rhs.degree().unwrap_or(0) > MAX_DEGREE {
                    return None;
                }
                Some(lhs * rhs)
            }
            Expr::Div(lhs, rhs) => {
                let divisor = rhs.const_value().filter(|d| *d != 0.0)?;
                Some(Polynomial::from_expr(lhs, var)?.scale(1.0 / divisor))
            }
            Expr::Pow(base, exp) => {
                let exponent = exp.const_value()?;
                if exponent < 0.0 || exponent.fract() != 0.0 || exponent > MAX_DEGREE as f64 {
                    return None;
                }
                let base = Polynomial::from_expr(base, var)?;
                if base.degree().unwrap_or(0) * exponent as usize > MAX_DEGREE {
                    return None;
                }
                Some(base.powi(exponent as u32))
            }
            _ => None,
        }
    }

    /// Rebuilds the polynomial as an expression tree, highest power first.
    pub fn to_expr(&self, var: &str) -> Expr {
        let x = || Expr::Var(var.to_string());
        let mut result: Option<Expr> = None;
        for (k, c) in self.coeffs.iter().enumerate().rev() {
            if *c == 0.0 {
                continue;
            }
            let magnitude = match (k, c.abs()) {
                (0, m) => Expr::Const(m),
                (1, m) if m == 1.0 => x(),
                (1, m) => Expr::Const(m) * x(),
                (k, m) if m == 1.0 => x().pow(Expr::Const(k as f64)),
                (k, m) => Expr::Const(m) * x().pow(Expr::Const(k as f64)),
            };
            result = Some(match result {
                None if *c < 0.0 => -magnitude,
                None => magnitude,
                Some(acc) if *c < 0.0 => acc - magnitude,
                Some(acc) => acc + magnitude,
            });
        }
        result.unwrap_or(Expr::Const(0.0))
    }

    /// All distinct real roots, ascending, without a time limit.
    pub fn real_roots(&self) -> Result<Vec<f64>, SolveFailure> {
        self.real_roots_within(&Deadline::unlimited())
    }

    /// All distinct real roots, ascending; repeated roots are reported once.
    ///
    /// `Err(InfiniteSolutions)` for the zero polynomial, `Err(Unsupported)` above
    /// [`MAX_DEGREE`] and `Err(Timeout)` once `deadline` passes.
    pub fn real_roots_within(&self, deadline: &Deadline) -> Result<Vec<f64>, SolveFailure> {
        let Some(degree) = self.degree() else {
            return Err(SolveFailure::InfiniteSolutions(
                "the polynomial is identically zero".to_string(),
            ));
        };
        if degree > MAX_DEGREE {
            return Err(SolveFailure::Unsupported(format!(
                "polynomial of degree {} (at most {} is solved)",
                degree, MAX_DEGREE
            )));
        }
        // x = 0 roots first, so the remaining polynomial has a non-zero constant term
        let zero_multiplicity = self.coeffs.iter().take_while(|c| **c == 0.0).count();
        let reduced = Polynomial::new(self.coeffs[zero_multiplicity..].to_vec());
        let mut roots = if zero_multiplicity > 0 { vec![0.0] } else { Vec::new() };
        roots.extend(reduced.isolated_roots(deadline)?);
        let roots = sorted_unique(roots, ROOT_MERGE_TOLERANCE);
        debug!("real roots of degree {} polynomial: {:?}", degree, roots);
        Ok(roots)
    }

    fn isolated_roots(&self, deadline: &Deadline) -> Result<Vec<f64>, SolveFailure> {
        deadline.check()?;
        let critical = match self.coeffs.as_slice() {
            [] | [_] => return Ok(Vec::new()),
            [c0, c1] => return Ok(vec![-c0 / c1]),
            [c, b, a] => return Ok(quadratic_roots(*a, *b, *c)),
            _ => self.derivative().isolated_roots(deadline)?,
        };
        let bound = critical
            .iter()
            .fold(self.root_bound(), |bound, c| bound.max(2.0 * c.abs()));
        if !bound.is_finite() {
            return Err(SolveFailure::Numerical(
                "the roots of the polynomial are out of floating-point range".to_string(),
            ));
        }
        let mut ends = vec![-bound];
        ends.extend(sorted_unique(critical, 0.0));
        ends.push(bound);
        let mut roots: Vec<f64> = ends[1..ends.len() - 1]
            .iter()
            .copied()
            .filter(|c| self.vanishes_at(*c))
            .collect();
        for piece in ends.windows(2) {
            let (lo, hi) = (piece[0], piece[1]);
            // a root at an end already closes the monotone piece
            if self.vanishes_at(lo) || self.vanishes_at(hi) {
                continue;
            }
            if let Some(root) = self.bisect(lo, hi, deadline)? {
                roots.push(root);
            }
        }
        Ok(sorted_unique(roots, 0.0))
    }

    /// Cauchy bound: every root satisfies `|x| < bound`.
    fn root_bound(&self) -> f64 {
        let lead = self.leading_coefficient().abs();
        let n = self.coeffs.len() - 1;
        1.0 + self.coeffs[..n]
            .iter()
            .map(|c| c.abs() / lead)
            .fold(0.0, f64::max)
    }

    /// `p(x)` is zero up to the rounding error of evaluating it at `x`
    fn vanishes_at(&self, x: f64) -> bool {
        let magnitude = self
            .coeffs
            .iter()
            .rev()
            .fold(0.0, |acc, c| acc * x.abs() + c.abs());
        magnitude.is_finite() && self.eval(x).abs() <= ZERO_TOLERANCE * magnitude
    }

    /// The single root of a monotone piece `[lo, hi]`, if the sign changes there.
    fn bisect(&self, lo: f64, hi: f64, deadline: &Deadline) -> Result<Option<f64>, SolveFailure> {
        let (mut lo, mut hi) = (lo, hi);
        let (mut f_lo, f_hi) = (self.eval(lo), self.eval(hi));
        if f_lo.is_nan() || f_hi.is_nan() {
            return Err(SolveFailure::Numerical(
                "the polynomial overflows between its critical points".to_string(),
            ));
        }
        if f_lo.signum() == f_hi.signum() {
            return Ok(None);
        }
        let mut steps = 0;
        loop {
            let mid = lo + 0.5 * (hi - lo);
            if mid <= lo || mid >= hi {
                break;
            }
            let f_mid = self.eval(mid);
            if f_mid == 0.0 {
                return Ok(Some(canonical(mid)));
            }
            if f_mid.signum() == f_lo.signum() {
                lo = mid;
                f_lo = f_mid;
            } else {
                hi = mid;
            }
            steps += 1;
            if steps % STEPS_PER_CHECK == 0 {
                deadline.check()?;
            }
        }
        let root = if self.eval(lo).abs() <= self.eval(hi).abs() { lo } else { hi };
        Ok(Some(canonical(root)))
    }
}

/// Real roots of `a x^2 + b x + c` with the cancellation-free formula.
fn quadratic_roots(a: f64, b: f64, c: f64) -> Vec<f64> {
    let discriminant = b * b - 4.0 * a * c;
    let scale = (b * b).abs() + (4.0 * a * c).abs();
    if discriminant.abs() <= 1e-12 * scale {
        return vec![-b / (2.0 * a)];
    }
    if discriminant < 0.0 {
        return Vec::new();
    }
    // q != 0 here: q == 0 needs b == 0 and a zero discriminant
    let q = -0.5 * (b + b.signum() * discriminant.sqrt());
    vec![q / a, c / q]
}

impl Add for Polynomial {
    type Output = Polynomial;

    fn add(self, rhs: Polynomial) -> Polynomial {
        let len = self.coeffs.len().max(rhs.coeffs.len());
        Polynomial::new(
            (0..len)
                .map(|k| {
                    self.coeffs.get(k).copied().unwrap_or(0.0)
                        + rhs.coeffs.get(k).copied().unwrap_or(0.0)
                })
                .collect(),
        )
    }
}

impl Neg for Polynomial {
    type Output = Polynomial;

    fn neg(self) -> Polynomial {
        self.scale(-1.0)
    }
}

impl Sub for Polynomial {
    type Output = Polynomial;

    fn sub(self, rhs: Polynomial) -> Polynomial {
        self + (-rhs)
    }
}

impl Mul for Polynomial {
    type Output = Polynomial;

    fn mul(self, rhs: Polynomial) -> Polynomial {
        if self.is_zero() || rhs.is_zero() {
            return Polynomial::zero();
        }
        let mut coeffs = vec![0.0; self.coeffs.len() + rhs.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            for (j, b) in rhs.coeffs.iter().enumerate() {
                coeffs[i + j] += a * b;
            }
        }
        Polynomial::new(coeffs)
    }
}
