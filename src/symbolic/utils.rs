// the collection of numeric helpers shared by the solvers, the range estimator and the sampler
use itertools::Itertools;
use num::rational::Ratio;

/// largest denominator tried when reading a float exponent as a fraction
const MAX_EXPONENT_DENOMINATOR: i64 = 1000;
const EXPONENT_TOLERANCE: f64 = 1e-9;
/// roots closer than this to an integer are snapped onto it
const SNAP_TOLERANCE: f64 = 1e-9;

/// Reads a float exponent as a small fraction p/q (in lowest terms), e.g. 0.5 -> 1/2,
/// 0.333.. -> 1/3. Returns None for exponents with no such representation.
pub fn rational_exponent(exp: f64) -> Option<Ratio<i64>> {
    if !exp.is_finite() {
        return None;
    }
    for denom in 1..=MAX_EXPONENT_DENOMINATOR {
        let numer = (exp * denom as f64).round();
        if (numer / denom as f64 - exp).abs() < EXPONENT_TOLERANCE {
            return Some(Ratio::new(numer as i64, denom));
        }
    }
    None
}

/// Canonical form of a computed root: integers snapped, -0 removed.
pub fn canonical(value: f64) -> f64 {
    let rounded = value.round();
    let snapped = if (value - rounded).abs() < SNAP_TOLERANCE * rounded.abs().max(1.0) {
        rounded
    } else {
        value
    };
    if snapped == 0.0 { 0.0 } else { snapped }
}

/// sorts, canonicalises and merges values closer than `tolerance`
pub fn sorted_unique(values: Vec<f64>, tolerance: f64) -> Vec<f64> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .map(canonical)
        .sorted_by(|a, b| a.total_cmp(b))
        .dedup_by(|a, b| (a - b).abs() <= tolerance * a.abs().max(1.0))
        .collect()
}

/// magnitudes from here on are written with an exponent
const EXPONENT_NOTATION_ABOVE: f64 = 1e15;
/// non-zero magnitudes below this would round to `0` with six decimals
const EXPONENT_NOTATION_BELOW: f64 = 1e-6;

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

/// Compact text for numbers in descriptions: `2`, `-0.5`, `1.414214`, `2.5e20`.
pub fn format_number(value: f64) -> String {
    if value.is_infinite() {
        return if value > 0.0 { "+inf".to_string() } else { "-inf".to_string() };
    }
    let value = canonical(value);
    let magnitude = value.abs();
    if magnitude >= EXPONENT_NOTATION_ABOVE || (value != 0.0 && magnitude < EXPONENT_NOTATION_BELOW)
    {
        let text = format!("{:.6e}", value);
        return match text.split_once('e') {
            Some((mantissa, exponent)) => format!("{}e{}", trim_fraction(mantissa), exponent),
            None => text,
        };
    }
    if value.fract() == 0.0 {
        format!("{}", value)
    } else {
        trim_fraction(&format!("{:.6}", value)).to_string()
    }
}

pub fn format_list(values: &[f64]) -> String {
    values.iter().map(|v| format_number(*v)).join(", ")
}

/// i-th node of an evenly spaced grid of `intervals` steps over [start, end]; the last
/// node is exactly `end`.
pub fn grid_point(start: f64, end: f64, intervals: usize, i: usize) -> f64 {
    if i >= intervals {
        return end;
    }
    start + i as f64 * (end - start) / intervals as f64
}

pub fn linspace(start: f64, end: f64, num_values: usize) -> Vec<f64> {
    match num_values {
        0 => Vec::new(),
        1 => vec![start],
        _ => (0..num_values)
            .map(|i| grid_point(start, end, num_values - 1, i))
            .collect(),
    }
}
