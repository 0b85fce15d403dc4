#[cfg(test)]
mod tests {
    use crate::Utils::config::AnalyzerConfig;
    use crate::analysis::range::RangeEstimate;
    use crate::analysis::session::AnalysisSession;
    use crate::symbolic::parse_expr::ParseError;
    use crate::symbolic::symbolic_engine::EvaluationError;
    use approx::assert_relative_eq;

    fn session(input: &str) -> AnalysisSession {
        AnalysisSession::parse(input, &AnalyzerConfig::default()).unwrap()
    }

    #[test]
    fn test_reciprocal_function() {
        let session = session("1/x");
        let report = session.analyze();
        assert_eq!(report.domain.exclusions.values(), &[0.0]);
        assert_eq!(
            report.intersections.y_intercept,
            Err(EvaluationError::DivisionByZero)
        );
        assert!(report.intersections.real_roots().is_empty());
        let (xs, ys) = session.sampler().sample();
        assert_eq!(xs.len(), ys.len());
        assert!(xs.iter().all(|x| x.abs() >= 1e-2));
        let plot = session.plot_data();
        assert_eq!(plot.segments.len(), 2);
        assert_eq!(plot.asymptotes, vec![0.0]);
        assert_eq!(plot.y_intercept, None);
    }

    #[test]
    fn test_quadratic_function() {
        let report = session("x^2 - 4").analyze();
        assert_eq!(report.intersections.real_roots(), &[-2.0, 2.0]);
        assert_eq!(report.intersections.y_intercept, Ok(-4.0));
        assert!(report.range.is_exact());
        assert_eq!(report.range.to_string(), "[-4, +inf)");
        let text = report.to_string();
        assert!(text.contains("Y-axis intersection: f(0) = -4"));
        assert!(text.contains("X-axis intersections (real): -2, 2"));
        assert!(text.contains("Range (exact/approx): [-4, +inf)"));
        assert!(text.ends_with("Analysis complete."));
    }

    #[test]
    fn test_logarithm_function() {
        let session = session("log(x - 1)");
        let report = session.analyze();
        assert!(report.domain.description.contains("x - 1 > 0"));
        let (xs, _) = session.sampler().sample();
        assert!(!xs.is_empty());
        assert!(xs.iter().all(|x| *x > 1.0));
    }

    #[test]
    fn test_square_root_function() {
        let session = session("sqrt(x)");
        let report = session.analyze();
        assert_eq!(report.domain.root_constraints.len(), 1);
        assert_eq!(report.domain.root_constraints[0].expr.to_string(), "x");
        let (xs, ys) = session.sampler().sample();
        assert!(xs.iter().all(|x| *x >= 0.0));
        assert!(ys.iter().all(|y| y.is_finite()));
    }

    #[test]
    fn test_point_evaluation_is_remembered() {
        let mut session = session("x + 1");
        let evaluation = session.evaluate(2.0);
        assert!(evaluation.is_ok());
        assert_eq!(evaluation.value, Some(3.0));
        assert_eq!(
            evaluation.trace.last().map(String::as_str),
            Some("Numeric evaluation: f(2) = 3")
        );
        assert_eq!(session.plot_data().evaluated_point.map(|p| p.y), Some(3.0));
        let failed = session.evaluate(f64::INFINITY);
        assert!(!failed.is_ok());
        assert_eq!(session.evaluated_point().map(|p| p.x), Some(2.0));
    }

    #[test]
    fn test_sampling_is_idempotent() {
        let session = session("sin(x)/x + ln(x^2)");
        let sampler = session.sampler();
        assert_eq!(sampler.sample(), sampler.sample());
        assert_eq!(session.plot_data(), session.plot_data());
    }

    #[test]
    fn test_fallback_range_lies_within_observed_values() {
        let session = session("x*exp(-x/10) + 1/(x - 0.5)");
        let report = session.analyze();
        let RangeEstimate::Approximate { min, max, samples } = report.range else {
            panic!("this function has no exact range rule");
        };
        let observed: Vec<f64> = (-50..=50)
            .step_by(2)
            .filter_map(|x| session.expr().eval_checked("x", x as f64).ok())
            .collect();
        assert_eq!(samples, observed.len());
        let lo = observed.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = observed.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert_relative_eq!(min, lo);
        assert_relative_eq!(max, hi);
    }

    #[test]
    fn test_parse_failure_blocks_the_session() {
        let config = AnalyzerConfig::default();
        assert_eq!(
            AnalysisSession::parse("", &config).unwrap_err(),
            ParseError::EmptyInput
        );
        assert!(matches!(
            AnalysisSession::parse("foo(x)", &config),
            Err(ParseError::UnknownFunction { .. })
        ));
    }

    #[test]
    fn test_other_variable_name() {
        let config = AnalyzerConfig {
            variable: "t".to_string(),
            ..AnalyzerConfig::default()
        };
        let mut session = AnalysisSession::parse("t^2 - 1", &config).unwrap();
        assert_eq!(session.analyze().intersections.real_roots(), &[-1.0, 1.0]);
        assert_eq!(session.evaluate(3.0).value, Some(8.0));
        assert!(AnalysisSession::parse("x^2", &config).is_err());
    }

    #[test]
    fn test_analysis_never_panics() {
        let inputs = [
            "x",
            "1/x",
            "1/(x^2 + 1)",
            "x^5 - 3*x + 1",
            "sin(x)/x",
            "tan(x)",
            "cot(2*x)",
            "ln(ln(x))",
            "sqrt(-x^2)",
            "sqrt(-x^2 - 1)",
            "exp(exp(x))",
            "x^x",
            "(x - 1)^(-2)",
            "arcsin(x/3) + arccos(x)",
            "1/(sin(x) + 2)",
            "log10(x) - cbrt(x)",
            "0*x",
            "5",
            "pi*e",
            "1/0",
        ];
        for input in inputs {
            let mut session = session(input);
            let report = session.analyze();
            assert!(report.domain.description.starts_with("Domain: "));
            assert!(!report.summary_table().is_empty());
            let _ = session.evaluate(0.0);
            let plot = session.plot_data();
            for segment in &plot.segments {
                assert!(segment.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
            }
        }
    }
}
