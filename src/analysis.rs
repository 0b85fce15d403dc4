/// where the function is defined: denominator zeros, log and even-root conditions
///# Example#
/// ```
/// use RustedFuncAnalyzer::symbolic::symbolic_engine::Expr;
/// use RustedFuncAnalyzer::analysis::domain::analyze_domain;
/// let f = Expr::parse_expression("1/(x - 2)", "x").unwrap();
/// let domain = analyze_domain(&f, "x");
/// assert_eq!(domain.exclusions.values(), &[2.0]);
/// println!("{}", domain.description);
/// ```
pub mod domain;
/// value at a point with a step-by-step trace
pub mod evaluate;
/// f(0) and the real roots
pub mod intersections;
/// image of the domain: exact interval propagation under a time budget, sampled otherwise
///# Example#
/// ```
/// use RustedFuncAnalyzer::symbolic::symbolic_engine::Expr;
/// use RustedFuncAnalyzer::analysis::range::{estimate_range, RangeConfig};
/// let f = Expr::parse_expression("x^2 - 4", "x").unwrap();
/// let range = estimate_range(&f, "x", &RangeConfig::default());
/// assert_eq!(range.to_string(), "[-4, +inf)");
/// ```
pub mod range;
pub mod report;
/// evenly spaced samples for drawing, skipping exclusions and undefined points
pub mod sampling;
///____________________________________________________________________________________________________________________________
/// # Analysis session
/// the whole workflow for one function:
/// 1) parse the text once
/// 2) analyze: domain, intersections with the axes, range
/// 3) evaluate at chosen points
/// 4) collect everything a plot needs
///# Example#
/// ```
/// use RustedFuncAnalyzer::Utils::config::AnalyzerConfig;
/// use RustedFuncAnalyzer::analysis::session::AnalysisSession;
/// let mut session = AnalysisSession::parse("x^2 - 4", &AnalyzerConfig::default()).unwrap();
/// let report = session.analyze();
/// println!("{}", report);
/// println!("{}", report.summary_table());
/// let evaluation = session.evaluate(3.0);
/// assert_eq!(evaluation.value, Some(5.0));
/// let plot = session.plot_data();
/// assert_eq!(plot.roots, vec![-2.0, 2.0]);
/// ```
pub mod session;
mod analysis_tests;
