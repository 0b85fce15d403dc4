//! Range Estimator
//!
//! First an exact image of the real domain is attempted by interval propagation. The image
//! is an [`IntervalUnion`], so the two branches around a pole stay apart:
//! - an operation with exactly one variable-dependent operand maps the image of that operand
//!   piece by piece (affine maps, reciprocals, powers, `exp`, `ln`, the trigonometric
//!   functions and their inverses), after intersecting it with the operation's own domain;
//! - a subtree where that fails but which is a polynomial in the variable gets its image
//!   from the critical points of the derivative.
//!
//! The attempt runs under a [`Deadline`]. When it fails (unsupported shape, time budget) the
//! function is sampled on an integer grid and the observed bounds are reported as an
//! approximation.
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_polynomial::Polynomial;
pub use crate::symbolic::symbolic_solve::Deadline;
use crate::symbolic::symbolic_solve::SolveFailure;
use crate::symbolic::utils::{canonical, format_number, rational_exponent};
use itertools::Itertools;
use log::{debug, info};
use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;
use std::time::Duration;

/// Interval of real numbers; infinite ends are always open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub lo: f64,
    pub hi: f64,
    pub lo_closed: bool,
    pub hi_closed: bool,
}

impl Interval {
    pub fn new(lo: f64, lo_closed: bool, hi: f64, hi_closed: bool) -> Interval {
        Interval {
            lo: canonical(lo),
            hi: canonical(hi),
            lo_closed: lo_closed && lo.is_finite(),
            hi_closed: hi_closed && hi.is_finite(),
        }
    }

    pub fn closed(lo: f64, hi: f64) -> Interval {
        Interval::new(lo, true, hi, true)
    }

    pub fn open(lo: f64, hi: f64) -> Interval {
        Interval::new(lo, false, hi, false)
    }

    pub fn point(value: f64) -> Interval {
        Interval::closed(value, value)
    }

    pub fn real_line() -> Interval {
        Interval::open(f64::NEG_INFINITY, f64::INFINITY)
    }

    pub fn is_empty(&self) -> bool {
        self.lo > self.hi || (self.lo == self.hi && !(self.lo_closed && self.hi_closed))
    }

    pub fn contains(&self, value: f64) -> bool {
        let above = value > self.lo || (self.lo_closed && value == self.lo);
        let below = value < self.hi || (self.hi_closed && value == self.hi);
        above && below
    }

    pub fn width(&self) -> f64 {
        self.hi - self.lo
    }

    pub fn intersect(&self, other: &Interval) -> Option<Interval> {
        let (lo, lo_closed) = if self.lo > other.lo {
            (self.lo, self.lo_closed)
        } else if other.lo > self.lo {
            (other.lo, other.lo_closed)
        } else {
            (self.lo, self.lo_closed && other.lo_closed)
        };
        let (hi, hi_closed) = if self.hi < other.hi {
            (self.hi, self.hi_closed)
        } else if other.hi < self.hi {
            (other.hi, other.hi_closed)
        } else {
            (self.hi, self.hi_closed && other.hi_closed)
        };
        let result = Interval::new(lo, lo_closed, hi, hi_closed);
        (!result.is_empty()).then_some(result)
    }

    /// image under a non-decreasing map
    fn map_increasing(&self, f: impl Fn(f64) -> f64) -> Interval {
        Interval::new(f(self.lo), self.lo_closed, f(self.hi), self.hi_closed)
    }

    /// image under a non-increasing map
    fn map_decreasing(&self, f: impl Fn(f64) -> f64) -> Interval {
        Interval::new(f(self.hi), self.hi_closed, f(self.lo), self.lo_closed)
    }

    fn scale(&self, factor: f64) -> Interval {
        if factor > 0.0 {
            self.map_increasing(|t| t * factor)
        } else if factor < 0.0 {
            self.map_decreasing(|t| t * factor)
        } else {
            Interval::point(0.0)
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.lo == self.hi {
            return write!(f, "{{{}}}", format_number(self.lo));
        }
        write!(
            f,
            "{}{}, {}{}",
            if self.lo_closed { "[" } else { "(" },
            format_number(self.lo),
            format_number(self.hi),
            if self.hi_closed { "]" } else { ")" }
        )
    }
}

/// Finite union of disjoint intervals, sorted; touching pieces are merged.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalUnion {
    pieces: Vec<Interval>,
}

impl IntervalUnion {
    pub fn new(pieces: impl IntoIterator<Item = Interval>) -> IntervalUnion {
        let sorted = pieces
            .into_iter()
            .filter(|piece| !piece.is_empty())
            .sorted_by(|a, b| a.lo.total_cmp(&b.lo).then(b.lo_closed.cmp(&a.lo_closed)));
        let mut merged: Vec<Interval> = Vec::new();
        for piece in sorted {
            let joins = merged.last().is_some_and(|last| {
                piece.lo < last.hi || (piece.lo == last.hi && (last.hi_closed || piece.lo_closed))
            });
            if !joins {
                merged.push(piece);
                continue;
            }
            let Some(last) = merged.last_mut() else {
                continue;
            };
            if piece.lo == last.lo {
                last.lo_closed |= piece.lo_closed;
            }
            if piece.hi > last.hi {
                last.hi = piece.hi;
                last.hi_closed = piece.hi_closed;
            } else if piece.hi == last.hi {
                last.hi_closed |= piece.hi_closed;
            }
        }
        IntervalUnion { pieces: merged }
    }

    pub fn empty() -> IntervalUnion {
        IntervalUnion { pieces: Vec::new() }
    }

    pub fn pieces(&self) -> &[Interval] {
        &self.pieces
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn contains(&self, value: f64) -> bool {
        self.pieces.iter().any(|piece| piece.contains(value))
    }

    /// union of the images of every piece
    fn try_map(
        &self,
        f: impl Fn(&Interval) -> Result<IntervalUnion, SolveFailure>,
    ) -> Result<IntervalUnion, SolveFailure> {
        let mut images = Vec::new();
        for piece in &self.pieces {
            images.extend(f(piece)?.pieces);
        }
        Ok(IntervalUnion::new(images))
    }

    fn map(&self, f: impl Fn(&Interval) -> Interval) -> IntervalUnion {
        IntervalUnion::new(self.pieces.iter().map(f))
    }

    fn flat_map(&self, f: impl Fn(&Interval) -> IntervalUnion) -> IntervalUnion {
        IntervalUnion::new(self.pieces.iter().flat_map(|piece| f(piece).pieces))
    }
}

impl From<Interval> for IntervalUnion {
    fn from(interval: Interval) -> Self {
        IntervalUnion::new([interval])
    }
}

impl fmt::Display for IntervalUnion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.pieces.is_empty() {
            return write!(f, "∅");
        }
        write!(f, "{}", self.pieces.iter().join(" ∪ "))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeConfig {
    /// first integer point of the fallback grid
    pub grid_start: i64,
    /// last integer point of the fallback grid (inclusive)
    pub grid_end: i64,
    pub grid_step: usize,
    /// time allowed for the exact attempt
    pub time_budget: Duration,
}

impl Default for RangeConfig {
    fn default() -> Self {
        RangeConfig {
            grid_start: -50,
            grid_end: 50,
            grid_step: 2,
            time_budget: Duration::from_millis(2000),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RangeEstimate {
    Exact(IntervalUnion),
    /// observed bounds over the fallback grid
    Approximate { min: f64, max: f64, samples: usize },
    Unavailable,
}

impl RangeEstimate {
    pub fn is_exact(&self) -> bool {
        matches!(self, RangeEstimate::Exact(_))
    }
}

impl fmt::Display for RangeEstimate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RangeEstimate::Exact(image) => write!(f, "{}", image),
            RangeEstimate::Approximate { min, max, .. } => write!(
                f,
                "approx [{}, {}] (sampled)",
                format_number(*min),
                format_number(*max)
            ),
            RangeEstimate::Unavailable => write!(f, "could not estimate the range"),
        }
    }
}

/// Range of `expr` over its real domain: exact when possible, sampled otherwise.
pub fn estimate_range(expr: &Expr, var: &str, config: &RangeConfig) -> RangeEstimate {
    let deadline = Deadline::new(config.time_budget);
    match exact_range(expr, var, &deadline) {
        Ok(image) => {
            info!("range of {}: {}", expr, image);
            RangeEstimate::Exact(image)
        }
        Err(failure) => {
            info!("exact range of {} failed ({}), sampling instead", expr, failure);
            let estimate = sampled_range(expr, var, config);
            info!("range of {}: {}", expr, estimate);
            estimate
        }
    }
}

/// Exact image of the real domain of `expr`, or why it could not be found.
pub fn exact_range(
    expr: &Expr,
    var: &str,
    deadline: &Deadline,
) -> Result<IntervalUnion, SolveFailure> {
    let finder = ImageFinder { var, deadline };
    let image = finder.image(&expr.simplify_())?;
    if image
        .pieces()
        .iter()
        .any(|piece| piece.lo.is_nan() || piece.hi.is_nan())
    {
        return Err(SolveFailure::Numerical(format!(
            "range bounds of {} are not numbers",
            expr
        )));
    }
    if image.is_empty() {
        return Err(SolveFailure::Numerical(format!(
            "{} is defined nowhere on the real line",
            expr
        )));
    }
    Ok(image)
}

/// Observed bounds on the integer grid of `config`; undefined and non-finite values are skipped.
pub fn sampled_range(expr: &Expr, var: &str, config: &RangeConfig) -> RangeEstimate {
    let values: Vec<f64> = (config.grid_start..=config.grid_end)
        .step_by(config.grid_step.max(1))
        .filter_map(|x| expr.eval_checked(var, x as f64).ok())
        .filter(|y| y.is_finite())
        .collect();
    debug!("{} finite samples for the range of {}", values.len(), expr);
    if values.is_empty() {
        return RangeEstimate::Unavailable;
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    RangeEstimate::Approximate {
        min,
        max,
        samples: values.len(),
    }
}

struct ImageFinder<'a> {
    var: &'a str,
    deadline: &'a Deadline,
}

impl<'a> ImageFinder<'a> {
    fn image(&self, expr: &Expr) -> Result<IntervalUnion, SolveFailure> {
        self.deadline.check()?;
        if !expr.contains_variable(self.var) {
            return expr
                .const_value()
                .map(|value| Interval::point(value).into())
                .ok_or_else(|| SolveFailure::Numerical(format!("{} is not a real number", expr)));
        }
        match self.structural_image(expr) {
            Err(SolveFailure::Unsupported(reason)) => {
                match Polynomial::from_expr(expr, self.var) {
                    Some(polynomial) => self.polynomial_image(&polynomial),
                    None => Err(SolveFailure::Unsupported(reason)),
                }
            }
            image => image,
        }
    }

    fn structural_image(&self, expr: &Expr) -> Result<IntervalUnion, SolveFailure> {
        match expr {
            Expr::Add(lhs, rhs) => {
                let (inner, c, _) = self.split(lhs, rhs, expr)?;
                Ok(self.image(inner)?.map(|i| i.map_increasing(|t| t + c)))
            }
            Expr::Sub(lhs, rhs) => {
                let (inner, c, var_on_left) = self.split(lhs, rhs, expr)?;
                let image = self.image(inner)?;
                Ok(if var_on_left {
                    image.map(|i| i.map_increasing(|t| t - c))
                } else {
                    image.map(|i| i.map_decreasing(|t| c - t))
                })
            }
            Expr::Mul(lhs, rhs) => {
                let (inner, c, _) = self.split(lhs, rhs, expr)?;
                Ok(self.image(inner)?.map(|i| i.scale(c)))
            }
            Expr::Div(lhs, rhs) => {
                let (inner, c, var_on_left) = self.split(lhs, rhs, expr)?;
                let image = self.image(inner)?;
                if var_on_left {
                    if c == 0.0 {
                        return Err(SolveFailure::Numerical("division by zero".to_string()));
                    }
                    Ok(image.map(|i| i.scale(1.0 / c)))
                } else {
                    Ok(image.try_map(reciprocal)?.map(|i| i.scale(c)))
                }
            }
            Expr::Pow(base, exp) => {
                let (inner, c, var_in_base) = self.split(base, exp, expr)?;
                let image = self.image(inner)?;
                if var_in_base {
                    image.try_map(|i| power_image(i, c))
                } else {
                    image.try_map(|i| exponential_image(c, i))
                }
            }
            Expr::Exp(arg) => Ok(self.image(arg)?.map(|i| i.map_increasing(f64::exp))),
            Expr::Ln(arg) => {
                let image = restrict(&self.image(arg)?, Interval::open(0.0, f64::INFINITY), expr)?;
                Ok(image.map(|i| i.map_increasing(f64::ln)))
            }
            Expr::sin(arg) => Ok(self.image(arg)?.map(|i| periodic_image(i, f64::sin, FRAC_PI_2))),
            Expr::cos(arg) => Ok(self.image(arg)?.map(|i| periodic_image(i, f64::cos, 0.0))),
            Expr::tg(arg) => {
                Ok(self.image(arg)?.flat_map(|i| branch_image(i, FRAC_PI_2, f64::tan, true)))
            }
            Expr::ctg(arg) => Ok(self
                .image(arg)?
                .flat_map(|i| branch_image(i, 0.0, |t| t.cos() / t.sin(), false))),
            Expr::arcsin(arg) => {
                let image = restrict(&self.image(arg)?, Interval::closed(-1.0, 1.0), expr)?;
                Ok(image.map(|i| i.map_increasing(f64::asin)))
            }
            Expr::arccos(arg) => {
                let image = restrict(&self.image(arg)?, Interval::closed(-1.0, 1.0), expr)?;
                Ok(image.map(|i| i.map_decreasing(f64::acos)))
            }
            Expr::arctg(arg) => Ok(self.image(arg)?.map(|i| i.map_increasing(f64::atan))),
            Expr::arcctg(arg) => {
                Ok(self.image(arg)?.map(|i| i.map_decreasing(|t| FRAC_PI_2 - t.atan())))
            }
            Expr::Var(_) => Ok(Interval::real_line().into()),
            Expr::Const(_) => Err(unsupported(expr)),
        }
    }

    fn polynomial_image(&self, polynomial: &Polynomial) -> Result<IntervalUnion, SolveFailure> {
        let image = match polynomial.degree() {
            None => Interval::point(0.0),
            Some(0) => Interval::point(polynomial.coeffs()[0]),
            Some(degree) if degree % 2 == 1 => Interval::real_line(),
            Some(_) => {
                let values = polynomial
                    .derivative()
                    .real_roots_within(self.deadline)?
                    .into_iter()
                    .map(|c| polynomial.eval(c));
                if polynomial.leading_coefficient() > 0.0 {
                    let min = values.fold(f64::INFINITY, f64::min);
                    Interval::new(min, true, f64::INFINITY, false)
                } else {
                    let max = values.fold(f64::NEG_INFINITY, f64::max);
                    Interval::new(f64::NEG_INFINITY, false, max, true)
                }
            }
        };
        Ok(image.into())
    }

    /// `(operand with the variable, value of the other operand, variable is on the left)`
    fn split<'e>(
        &self,
        lhs: &'e Expr,
        rhs: &'e Expr,
        whole: &Expr,
    ) -> Result<(&'e Expr, f64, bool), SolveFailure> {
        let (inner, other, var_on_left) =
            match (lhs.contains_variable(self.var), rhs.contains_variable(self.var)) {
                (true, false) => (lhs, rhs, true),
                (false, true) => (rhs, lhs, false),
                _ => return Err(unsupported(whole)),
            };
        let value = other
            .const_value()
            .filter(|v| v.is_finite())
            .ok_or_else(|| SolveFailure::Numerical(format!("{} is not a real number", other)))?;
        Ok((inner, value, var_on_left))
    }
}

fn unsupported(expr: &Expr) -> SolveFailure {
    SolveFailure::Unsupported(format!("no exact range for {}", expr))
}

fn restrict(
    image: &IntervalUnion,
    domain: Interval,
    expr: &Expr,
) -> Result<IntervalUnion, SolveFailure> {
    let restricted = IntervalUnion::new(image.pieces().iter().filter_map(|i| i.intersect(&domain)));
    if restricted.is_empty() {
        return Err(SolveFailure::Numerical(format!(
            "{} is defined nowhere on the real line",
            expr
        )));
    }
    Ok(restricted)
}

/// image of `1/t`; a piece around 0 splits into the two branches of the pole
fn reciprocal(image: &Interval) -> Result<IntervalUnion, SolveFailure> {
    if image.lo == 0.0 && image.hi == 0.0 {
        return Err(SolveFailure::Numerical(
            "division by zero everywhere".to_string(),
        ));
    }
    if image.lo < 0.0 && image.hi > 0.0 {
        let negative = Interval::new(image.lo, image.lo_closed, 0.0, false);
        let positive = Interval::new(0.0, false, image.hi, image.hi_closed);
        return Ok(IntervalUnion::new([
            one_signed_reciprocal(&negative),
            one_signed_reciprocal(&positive),
        ]));
    }
    Ok(one_signed_reciprocal(image).into())
}

fn one_signed_reciprocal(image: &Interval) -> Interval {
    if image.lo >= 0.0 {
        let hi = if image.lo == 0.0 { f64::INFINITY } else { 1.0 / image.lo };
        Interval::new(1.0 / image.hi, image.hi_closed, hi, image.lo_closed)
    } else {
        let lo = if image.hi == 0.0 { f64::NEG_INFINITY } else { 1.0 / image.hi };
        Interval::new(lo, image.hi_closed, 1.0 / image.lo, image.lo_closed)
    }
}

/// image of `t^p` for a constant exponent, with real odd roots of negative numbers
fn power_image(image: &Interval, p: f64) -> Result<IntervalUnion, SolveFailure> {
    if p == 0.0 {
        return Ok(Interval::point(1.0).into());
    }
    if p < 0.0 {
        return power_image(image, -p)?.try_map(reciprocal);
    }
    let ratio = rational_exponent(p).filter(|r| r.denom() % 2 != 0);
    match ratio {
        // even function |t|^p
        Some(r) if r.numer() % 2 == 0 => Ok(even_power_image(image, p).into()),
        // odd, increasing
        Some(_) => Ok(image.map_increasing(|t| t.signum() * t.abs().powf(p)).into()),
        // even-index or irrational root: defined for t >= 0 only
        None => {
            let domain = Interval::new(0.0, true, f64::INFINITY, false);
            let image = image.intersect(&domain).ok_or_else(|| {
                SolveFailure::Numerical("even root of a negative quantity".to_string())
            })?;
            Ok(image.map_increasing(|t| t.powf(p)).into())
        }
    }
}

fn even_power_image(image: &Interval, p: f64) -> Interval {
    let f = |t: f64| t.abs().powf(p);
    if image.lo >= 0.0 {
        return image.map_increasing(f);
    }
    if image.hi <= 0.0 {
        return image.map_decreasing(f);
    }
    let (left, right) = (f(image.lo), f(image.hi));
    let (top, top_closed) = if left > right {
        (left, image.lo_closed)
    } else if right > left {
        (right, image.hi_closed)
    } else {
        (right, image.lo_closed || image.hi_closed)
    };
    Interval::new(0.0, true, top, top_closed)
}

/// image of `c^t`
fn exponential_image(c: f64, image: &Interval) -> Result<IntervalUnion, SolveFailure> {
    if c <= 0.0 {
        return Err(SolveFailure::Unsupported(format!(
            "power of the non-positive base {}",
            format_number(c)
        )));
    }
    let image = if c > 1.0 {
        image.map_increasing(|t| c.powf(t))
    } else if c < 1.0 {
        image.map_decreasing(|t| c.powf(t))
    } else {
        Interval::point(1.0)
    };
    Ok(image.into())
}

/// image of `sin`/`cos`; extremes ±1 sit at `first_extremum + k*pi` with value `f` there
fn periodic_image(image: &Interval, f: fn(f64) -> f64, first_extremum: f64) -> Interval {
    if !image.lo.is_finite() || !image.hi.is_finite() || image.width() >= 2.0 * PI {
        return Interval::closed(-1.0, 1.0);
    }
    let mut candidates = vec![(f(image.lo), image.lo_closed), (f(image.hi), image.hi_closed)];
    let mut k = ((image.lo - first_extremum) / PI).ceil();
    while first_extremum + k * PI <= image.hi {
        let t = first_extremum + k * PI;
        if image.contains(t) {
            // f(first_extremum + k*pi) is exactly (-1)^k times f(first_extremum) = 1
            let value = if (k as i64) % 2 == 0 { 1.0 } else { -1.0 };
            candidates.push((value, true));
        }
        k += 1.0;
    }
    let mut lo = (f64::INFINITY, false);
    let mut hi = (f64::NEG_INFINITY, false);
    for (value, closed) in candidates {
        if value < lo.0 {
            lo = (value, closed);
        } else if value == lo.0 {
            lo.1 |= closed;
        }
        if value > hi.0 {
            hi = (value, closed);
        } else if value == hi.0 {
            hi.1 |= closed;
        }
    }
    Interval::new(lo.0, lo.1, hi.0, hi.1)
}

/// Image of `tg` (increasing on every branch) or `ctg` (decreasing) with poles at
/// `first_pole + k*pi`. The piece is cut at every pole it reaches.
fn branch_image(
    image: &Interval,
    first_pole: f64,
    f: fn(f64) -> f64,
    increasing: bool,
) -> IntervalUnion {
    if !image.lo.is_finite() || !image.hi.is_finite() || image.width() >= PI {
        return Interval::real_line().into();
    }
    let first = ((image.lo - first_pole) / PI).ceil();
    let poles: Vec<f64> = (0u32..)
        .map(|k| first_pole + (first + k as f64) * PI)
        .take_while(|pole| *pole <= image.hi)
        .collect();
    if image.lo == image.hi {
        return if poles.is_empty() {
            Interval::point(f(image.lo)).into()
        } else {
            IntervalUnion::empty()
        };
    }
    // (position, closed, is a pole)
    let mut ends = vec![(image.lo, image.lo_closed, false)];
    ends.extend(poles.iter().map(|pole| (*pole, false, true)));
    ends.push((image.hi, image.hi_closed, false));
    // limit at a pole closing a branch on the left or on the right
    let infinity = |left: bool| {
        if left == increasing {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        }
    };
    IntervalUnion::new(ends.windows(2).filter(|w| w[0].0 < w[1].0).map(|w| {
        let (a, b) = (w[0], w[1]);
        let (start, start_closed) = if a.2 { (infinity(true), false) } else { (f(a.0), a.1) };
        let (end, end_closed) = if b.2 { (infinity(false), false) } else { (f(b.0), b.1) };
        if increasing {
            Interval::new(start, start_closed, end, end_closed)
        } else {
            Interval::new(end, end_closed, start, start_closed)
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::parse_expr::parse_expression_func;
    use approx::assert_relative_eq;

    fn range(input: &str) -> RangeEstimate {
        estimate_range(
            &parse_expression_func(input, "x").unwrap(),
            "x",
            &RangeConfig::default(),
        )
    }

    #[test]
    fn test_interval_display() {
        assert_eq!(
            Interval::new(-4.0, true, f64::INFINITY, true).to_string(),
            "[-4, +inf)"
        );
        assert_eq!(Interval::real_line().to_string(), "(-inf, +inf)");
        assert_eq!(Interval::new(0.0, false, 1.0, true).to_string(), "(0, 1]");
        assert_eq!(Interval::point(3.0).to_string(), "{3}");
    }

    #[test]
    fn test_interval_intersect() {
        let a = Interval::closed(-1.0, 2.0);
        let b = Interval::open(0.0, f64::INFINITY);
        assert_eq!(a.intersect(&b), Some(Interval::new(0.0, false, 2.0, true)));
        assert_eq!(Interval::closed(-3.0, -1.0).intersect(&b), None);
        assert!(Interval::new(0.0, false, 2.0, true).contains(2.0));
        assert!(!Interval::new(0.0, false, 2.0, true).contains(0.0));
    }

    #[test]
    fn test_quadratic_range() {
        let estimate = range("x^2 - 4");
        assert_eq!(
            estimate,
            RangeEstimate::Exact(Interval::new(-4.0, true, f64::INFINITY, false).into())
        );
        assert_eq!(estimate.to_string(), "[-4, +inf)");
        assert_eq!(range("-(x - 1)^2 + 3").to_string(), "(-inf, 3]");
        assert_eq!(range("x^3 - x").to_string(), "(-inf, +inf)");
        assert_eq!(range("7").to_string(), "{7}");
    }

    #[test]
    fn test_transcendental_ranges() {
        assert_eq!(range("exp(x)").to_string(), "(0, +inf)");
        assert_eq!(range("sqrt(x)").to_string(), "[0, +inf)");
        assert_eq!(range("log(x - 1)").to_string(), "(-inf, +inf)");
        assert_eq!(range("3*sin(2*x) + 1").to_string(), "[-2, 4]");
        assert_eq!(range("1/(x^2 + 1)").to_string(), "(0, 1]");
        assert_eq!(range("exp(-x^2)").to_string(), "(0, 1]");
        assert_eq!(range("sqrt(4 - x^2)").to_string(), "[0, 2]");
        assert_eq!(range("cbrt(x)").to_string(), "(-inf, +inf)");
        assert_eq!(range("1/sqrt(x)").to_string(), "(0, +inf)");
    }

    #[test]
    fn test_inverse_trigonometric_ranges() {
        let RangeEstimate::Exact(image) = range("arctg(x)") else {
            panic!("arctg range should be exact");
        };
        let interval = image.pieces()[0];
        assert_relative_eq!(interval.lo, -FRAC_PI_2);
        assert_relative_eq!(interval.hi, FRAC_PI_2);
        assert!(!interval.lo_closed && !interval.hi_closed);
        let RangeEstimate::Exact(image) = range("arccos(x)") else {
            panic!("arccos range should be exact");
        };
        let interval = image.pieces()[0];
        assert_eq!(interval.lo, 0.0);
        assert_relative_eq!(interval.hi, PI);
    }

    #[test]
    fn test_interval_union_merges_pieces() {
        let union = IntervalUnion::new([
            Interval::new(2.0, true, 3.0, false),
            Interval::open(f64::NEG_INFINITY, 0.0),
            Interval::closed(3.0, 4.0),
            Interval::open(0.0, 0.0),
        ]);
        assert_eq!(union.to_string(), "(-inf, 0) ∪ [2, 4]");
        assert!(!union.contains(0.0));
        assert!(union.contains(3.0));
        let touching = IntervalUnion::new([Interval::open(0.0, 1.0), Interval::open(1.0, 2.0)]);
        assert_eq!(touching.pieces().len(), 2);
        assert_eq!(IntervalUnion::empty().to_string(), "∅");
    }

    #[test]
    fn test_poles_split_the_range() {
        let estimate = range("1/x");
        assert_eq!(
            estimate,
            RangeEstimate::Exact(IntervalUnion::new([
                Interval::open(f64::NEG_INFINITY, 0.0),
                Interval::open(0.0, f64::INFINITY),
            ]))
        );
        assert_eq!(estimate.to_string(), "(-inf, 0) ∪ (0, +inf)");
        assert_eq!(range("1/(x^2 - 1)").to_string(), "(-inf, -1] ∪ (0, +inf)");
        assert_eq!(range("2/(x - 3) + 1").to_string(), "(-inf, 1) ∪ (1, +inf)");
        assert_eq!(range("x^(-2)").to_string(), "(0, +inf)");
    }

    #[test]
    fn test_tangent_ranges() {
        assert_eq!(range("tan(x)").to_string(), "(-inf, +inf)");
        assert_eq!(range("cot(x)").to_string(), "(-inf, +inf)");
        assert!(range("tan(3*x - 1)").is_exact());
        assert_eq!(range("tan(arcsin(x)/2)").to_string(), "[-1, 1]");
        // the argument runs over [1, 2] and crosses the pole at pi/2
        let RangeEstimate::Exact(image) = range("tan(arcsin(x)/pi + 1.5)") else {
            panic!("tan over one pole should be exact");
        };
        let pieces = image.pieces();
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].lo, f64::NEG_INFINITY);
        assert_relative_eq!(pieces[0].hi, 2f64.tan(), epsilon = 1e-12);
        assert!(pieces[0].hi_closed);
        assert_relative_eq!(pieces[1].lo, 1f64.tan(), epsilon = 1e-12);
        assert_eq!(pieces[1].hi, f64::INFINITY);
    }

    #[test]
    fn test_high_powers_keep_an_exact_range() {
        assert_eq!(range("(x^2 - 2)^8").to_string(), "[0, +inf)");
        assert_eq!(range("(x^2 + 1)^30").to_string(), "[1, +inf)");
        assert_eq!(range("x^4 - 2*x^2").to_string(), "[-1, +inf)");
        assert!(range("(x - 1)^3*(x + 2)").is_exact());
    }

    #[test]
    fn test_large_expansion_respects_the_budget() {
        let expr = parse_expression_func("((x^2 + x + 1)^60)^5 - x", "x").unwrap();
        let config = RangeConfig {
            time_budget: Duration::from_millis(50),
            ..RangeConfig::default()
        };
        let started = std::time::Instant::now();
        let estimate = estimate_range(&expr, "x", &config);
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(!estimate.is_exact());
    }

    #[test]
    fn test_unsupported_shape_falls_back_to_sampling() {
        let estimate = range("(x + 1)/(x - 1)");
        assert_eq!(
            estimate,
            RangeEstimate::Approximate {
                min: -1.0,
                max: 3.0,
                samples: 51
            }
        );
        assert_eq!(estimate.to_string(), "approx [-1, 3] (sampled)");
    }

    #[test]
    fn test_fallback_bounds_are_observed_values() {
        let expr = parse_expression_func("x*exp(-x/10)", "x").unwrap();
        let config = RangeConfig::default();
        let RangeEstimate::Approximate { min, max, .. } = estimate_range(&expr, "x", &config)
        else {
            panic!("x*exp(-x/10) has no exact rule");
        };
        let observed: Vec<f64> = (-50..=50)
            .step_by(2)
            .map(|x| expr.eval_checked("x", x as f64).unwrap())
            .collect();
        assert!(observed.contains(&min) && observed.contains(&max));
        assert!(observed.iter().all(|y| *y >= min && *y <= max));
    }

    #[test]
    fn test_unavailable_range() {
        assert_eq!(range("ln(-x^2 - 1)"), RangeEstimate::Unavailable);
        assert_eq!(
            RangeEstimate::Unavailable.to_string(),
            "could not estimate the range"
        );
    }

    #[test]
    fn test_zero_budget_times_out() {
        let expr = parse_expression_func("x^2 - 4", "x").unwrap();
        let deadline = Deadline::new(Duration::ZERO);
        assert_eq!(exact_range(&expr, "x", &deadline), Err(SolveFailure::Timeout));
        let config = RangeConfig {
            time_budget: Duration::ZERO,
            ..RangeConfig::default()
        };
        assert_eq!(
            estimate_range(&expr, "x", &config),
            RangeEstimate::Approximate {
                min: -4.0,
                max: 2496.0,
                samples: 51
            }
        );
    }
}
