//! One parsed function and the Analyze / Evaluate / Plot workflow around it.
use crate::Utils::config::AnalyzerConfig;
use crate::Utils::plots::PlotData;
use crate::analysis::domain::{DomainExclusionSet, analyze_domain};
use crate::analysis::evaluate::{PointEvaluation, evaluate_at};
use crate::analysis::intersections::intersections;
use crate::analysis::range::estimate_range;
use crate::analysis::report::AnalysisReport;
use crate::analysis::sampling::{CurveSampler, SamplePoint};
use crate::symbolic::parse_expr::ParseError;
use crate::symbolic::symbolic_engine::Expr;
use log::info;

/// A parsed function bound to one variable. Parsing a new text means creating a new session.
#[derive(Debug, Clone)]
pub struct AnalysisSession {
    source: String,
    var: String,
    /// tree as parsed; every analysis runs on it so no undefined point is simplified away
    expr: Expr,
    simplified: Expr,
    config: AnalyzerConfig,
    evaluated_point: Option<SamplePoint>,
}

impl AnalysisSession {
    pub fn parse(text: &str, config: &AnalyzerConfig) -> Result<Self, ParseError> {
        let expr = Expr::parse_expression(text, &config.variable)?;
        let simplified = expr.simplify_();
        info!("Parsed function: {}", simplified);
        Ok(AnalysisSession {
            source: text.to_string(),
            var: config.variable.clone(),
            expr,
            simplified,
            config: config.clone(),
            evaluated_point: None,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn var(&self) -> &str {
        &self.var
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn simplified(&self) -> &Expr {
        &self.simplified
    }

    pub fn evaluated_point(&self) -> Option<SamplePoint> {
        self.evaluated_point
    }

    pub fn analyze(&self) -> AnalysisReport {
        let domain = analyze_domain(&self.expr, &self.var);
        let intersections = intersections(&self.expr, &self.var);
        let range = estimate_range(&self.expr, &self.var, &self.config.range);
        info!("Analysis complete.");
        AnalysisReport {
            function: self.simplified.to_string(),
            var: self.var.clone(),
            domain,
            intersections,
            range,
        }
    }

    /// Evaluates at `x`; a successful evaluation becomes the marked point of later plots.
    pub fn evaluate(&mut self, x: f64) -> PointEvaluation {
        let evaluation = evaluate_at(&self.expr, &self.var, x);
        if let Some(y) = evaluation.value {
            info!("Evaluated point: ({}, {})", x, y);
            self.evaluated_point = Some(SamplePoint { x, y });
        }
        evaluation
    }

    /// Curve sampler over the configured window, skipping the domain exclusions.
    pub fn sampler(&self) -> CurveSampler {
        self.sampler_with(analyze_domain(&self.expr, &self.var).exclusions)
    }

    fn sampler_with(&self, exclusions: DomainExclusionSet) -> CurveSampler {
        let sampling = &self.config.sampling;
        CurveSampler::new(self.expr.clone(), &self.var, exclusions)
            .with_window(sampling.x_min, sampling.x_max)
            .with_point_count(sampling.point_count)
            .with_tolerance(sampling.tolerance)
    }

    pub fn plot_data(&self) -> PlotData {
        let sampling = &self.config.sampling;
        let domain = analyze_domain(&self.expr, &self.var);
        let found = intersections(&self.expr, &self.var);
        let segments = self.sampler_with(domain.exclusions.clone()).split_segments();
        if segments.is_empty() {
            info!("No samplable points to plot (the domain may be very restricted).");
        }
        PlotData {
            title: format!("f({}) = {}", self.var, self.simplified),
            var: self.var.clone(),
            segments,
            x_min: sampling.x_min,
            x_max: sampling.x_max,
            y_intercept: found.y_intercept_value(),
            roots: found.real_roots().to_vec(),
            asymptotes: domain.exclusions.values().to_vec(),
            evaluated_point: self.evaluated_point,
        }
    }
}
