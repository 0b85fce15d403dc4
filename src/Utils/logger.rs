use crate::Utils::config::{LogFile, LoggingConfig};
use chrono::Local;
use csv::Writer;
use simplelog::{
    ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// `log_<date>_<time>.txt`
pub fn timestamped_log_name() -> String {
    let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
    format!("log_{}.txt", date_and_time)
}

/// Terminal logging at the configured level, plus a log file when one is configured.
/// Calling it again after a logger is installed is a no-op.
pub fn init_logger(config: &LoggingConfig) -> io::Result<Option<PathBuf>> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        config.level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    let log_path = match &config.file {
        None => None,
        Some(LogFile::Timestamped) => Some(PathBuf::from(timestamped_log_name())),
        Some(LogFile::Path(path)) => Some(path.clone()),
    };
    if let Some(path) = &log_path {
        let file = File::create(path)?;
        loggers.push(WriteLogger::new(config.level, Config::default(), file));
    }
    let _ = CombinedLogger::init(loggers);
    Ok(log_path)
}

/// Writes the sampled curve as two columns, `<var>,f(<var>)`.
pub fn save_curve_to_csv(xs: &[f64], ys: &[f64], var: &str, path: &Path) -> io::Result<()> {
    if xs.len() != ys.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} abscissas but {} values", xs.len(), ys.len()),
        ));
    }
    let file = File::create(path)?;
    let mut writer = Writer::from_writer(file);
    writer.write_record([var.to_string(), format!("f({})", var)])?;
    for (x, y) in xs.iter().zip(ys) {
        writer.write_record([x.to_string(), y.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}
