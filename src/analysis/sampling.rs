//! Curve Sampler
//!
//! Evenly spaced points `x_i = x_min + i*step`, `step = (x_max - x_min)/max(1, n)`,
//! `i = 0..=n`. Points within the tolerance of a domain exclusion are skipped, and only finite
//! real values are kept; nothing is ever replaced by a placeholder. The sequence is
//! deterministic and can be iterated any number of times.
use crate::analysis::domain::DomainExclusionSet;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::utils::grid_point;
use log::debug;

pub const DEFAULT_X_MIN: f64 = -10.0;
pub const DEFAULT_X_MAX: f64 = 10.0;
pub const DEFAULT_POINT_COUNT: usize = 800;
/// distance to an exclusion below which a grid point is skipped
pub const EXCLUSION_TOLERANCE: f64 = 1e-2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurveSampler {
    expr: Expr,
    var: String,
    exclusions: DomainExclusionSet,
    x_min: f64,
    x_max: f64,
    point_count: usize,
    tolerance: f64,
}

impl CurveSampler {
    /// Sampler over the default window [-10, 10] with 800 steps.
    pub fn new(expr: Expr, var: &str, exclusions: DomainExclusionSet) -> Self {
        CurveSampler {
            expr,
            var: var.to_string(),
            exclusions,
            x_min: DEFAULT_X_MIN,
            x_max: DEFAULT_X_MAX,
            point_count: DEFAULT_POINT_COUNT,
            tolerance: EXCLUSION_TOLERANCE,
        }
    }

    pub fn with_window(mut self, x_min: f64, x_max: f64) -> Self {
        self.x_min = x_min;
        self.x_max = x_max;
        self
    }

    pub fn with_point_count(mut self, point_count: usize) -> Self {
        self.point_count = point_count;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn step(&self) -> f64 {
        (self.x_max - self.x_min) / self.point_count.max(1) as f64
    }

    /// the point at `x`, if it is kept
    pub fn sample_at(&self, x: f64) -> Option<SamplePoint> {
        if self.exclusions.is_near(x, self.tolerance) {
            return None;
        }
        match self.expr.eval_checked(&self.var, x) {
            Ok(y) if y.is_finite() => Some(SamplePoint { x, y }),
            _ => None,
        }
    }

    fn indexed(&self) -> impl Iterator<Item = (usize, SamplePoint)> + '_ {
        let intervals = self.point_count.max(1);
        (0..=self.point_count).filter_map(move |i| {
            let x = grid_point(self.x_min, self.x_max, intervals, i);
            self.sample_at(x).map(|point| (i, point))
        })
    }

    /// Lazy pass over the kept points, ascending in x; restartable.
    pub fn iter(&self) -> impl Iterator<Item = SamplePoint> + '_ {
        self.indexed().map(|(_, point)| point)
    }

    /// the kept points as two equal-length sequences
    pub fn sample(&self) -> (Vec<f64>, Vec<f64>) {
        let (xs, ys): (Vec<f64>, Vec<f64>) = self.iter().map(|p| (p.x, p.y)).unzip();
        debug!(
            "sampled {} of {} points of {} on [{}, {}]",
            xs.len(),
            self.point_count + 1,
            self.expr,
            self.x_min,
            self.x_max
        );
        (xs, ys)
    }

    /// Kept points grouped into runs of consecutive grid nodes, so a drawing does not join
    /// the two sides of a pole or a gap in the domain.
    pub fn split_segments(&self) -> Vec<Vec<SamplePoint>> {
        let mut segments: Vec<Vec<SamplePoint>> = Vec::new();
        let mut previous: Option<usize> = None;
        for (i, point) in self.indexed() {
            match (previous, segments.last_mut()) {
                (Some(prev), Some(segment)) if prev + 1 == i => segment.push(point),
                _ => segments.push(vec![point]),
            }
            previous = Some(i);
        }
        segments
    }
}

/// Samples `expr` on `point_count` steps over [x_min, x_max], skipping the exclusions.
pub fn sample_curve(
    expr: &Expr,
    var: &str,
    exclusions: &DomainExclusionSet,
    x_min: f64,
    x_max: f64,
    point_count: usize,
) -> (Vec<f64>, Vec<f64>) {
    CurveSampler::new(expr.clone(), var, exclusions.clone())
        .with_window(x_min, x_max)
        .with_point_count(point_count)
        .sample()
}
