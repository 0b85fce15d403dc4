#![allow(non_snake_case)]
use RustedFuncAnalyzer::Utils::config::{AnalyzerConfig, LogFile};
use RustedFuncAnalyzer::Utils::logger::{init_logger, save_curve_to_csv};
use RustedFuncAnalyzer::Utils::plots::plot_function;
use RustedFuncAnalyzer::analysis::session::AnalysisSession;
use log::{error, info};
use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

/// Analysis of a real function of one variable
#[derive(Debug, Parser)]
#[command(name = "RustedFuncAnalyzer", version)]
#[command(about = "Domain, axis intersections, range, point evaluation and plot of f(x)", long_about = None)]
struct Cli {
    /// Formula of the function, e.g. "x^2 - 4"
    #[arg(allow_hyphen_values = true)]
    expression: String,

    /// Evaluate the function at this point
    #[arg(long, allow_negative_numbers = true)]
    at: Option<f64>,

    /// TOML file with analyzer settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Render the curve into this PNG file
    #[arg(long)]
    plot: Option<PathBuf>,

    /// Save the sampled curve into this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Log file path, or "auto" for a time-stamped name
    #[arg(long)]
    log: Option<String>,
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(path) => AnalyzerConfig::from_file(path)?,
        None => AnalyzerConfig::default(),
    };
    if let Some(log) = &cli.log {
        config.logging.file = Some(match log.as_str() {
            "auto" => LogFile::Timestamped,
            path => LogFile::Path(PathBuf::from(path)),
        });
    }
    if let Some(path) = init_logger(&config.logging)? {
        info!("logging to {}", path.display());
    }

    let mut session = AnalysisSession::parse(&cli.expression, &config)?;
    let report = session.analyze();
    println!("{}", report);
    println!("{}", report.summary_table());

    if let Some(x) = cli.at {
        let evaluation = session.evaluate(x);
        for step in &evaluation.trace {
            println!("{}", step);
        }
        if let Some(value) = evaluation.value {
            println!("Evaluated point: ({}, {})", x, value);
        }
    }
    if let Some(path) = &cli.csv {
        let (xs, ys) = session.sampler().sample();
        save_curve_to_csv(&xs, &ys, session.var(), path)?;
        info!("{} curve points saved to {}", xs.len(), path.display());
    }
    if let Some(path) = &cli.plot {
        plot_function(&session.plot_data(), path)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            // help and version requests are not usage errors
            return if err.use_stderr() {
                ExitCode::from(2)
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
