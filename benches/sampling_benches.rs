use RustedFuncAnalyzer::analysis::domain::analyze_domain;
use RustedFuncAnalyzer::analysis::range::{RangeConfig, estimate_range};
use RustedFuncAnalyzer::analysis::sampling::sample_curve;
use RustedFuncAnalyzer::symbolic::symbolic_engine::Expr;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn bench_sample_curve(c: &mut Criterion) {
    let expr = Expr::parse_expression("sin(x)/x + ln(x^2 + 1) - 1/(x - 2)", "x").unwrap();
    let exclusions = analyze_domain(&expr, "x").exclusions;
    c.bench_function("sample 800 points", |b| {
        b.iter(|| sample_curve(black_box(&expr), "x", &exclusions, -10.0, 10.0, 800))
    });
}

fn bench_estimate_range(c: &mut Criterion) {
    let config = RangeConfig::default();
    let mut group = c.benchmark_group("range");
    for input in ["x^2 - 4", "3*sin(2*x) + 1", "x*exp(-x/10)"] {
        let expr = Expr::parse_expression(input, "x").unwrap();
        group.bench_function(input, |b| {
            b.iter(|| estimate_range(black_box(&expr), "x", &config))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_sample_curve, bench_estimate_range);
criterion_main!(benches);
