//! Analyzer settings with their defaults, optionally read from a TOML file:
//! ```toml
//! [analysis]
//! variable = "x"
//!
//! [sampling]
//! x_min = -10.0
//! x_max = 10.0
//! points = 800
//! tolerance = 0.01
//!
//! [range]
//! grid_start = -50
//! grid_end = 50
//! grid_step = 2
//! time_budget_ms = 2000
//!
//! [logging]
//! level = "info"
//! file = "auto"   # time-stamped log file; any other string is a path
//! ```
//! Missing sections and keys keep their defaults.
use crate::analysis::range::RangeConfig;
use crate::analysis::sampling::{
    DEFAULT_POINT_COUNT, DEFAULT_X_MAX, DEFAULT_X_MIN, EXCLUSION_TOLERANCE,
};
use crate::symbolic::parse_expr::KnownFunction;
use log::{LevelFilter, warn};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use toml::{Table, Value};

const SECTIONS: [&str; 4] = ["analysis", "sampling", "range", "logging"];

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Toml(toml::de::Error),
    /// a key holds a value of the wrong type or outside its allowed range
    InvalidValue { key: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "cannot read config file {}: {}", path.display(), source)
            }
            ConfigError::Toml(err) => write!(f, "malformed config: {}", err),
            ConfigError::InvalidValue { key, reason } => {
                write!(f, "invalid value for '{}': {}", key, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Toml(err) => Some(err),
            ConfigError::InvalidValue { .. } => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Toml(err)
    }
}

fn invalid(key: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.into(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SamplingConfig {
    pub x_min: f64,
    pub x_max: f64,
    pub point_count: usize,
    pub tolerance: f64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        SamplingConfig {
            x_min: DEFAULT_X_MIN,
            x_max: DEFAULT_X_MAX,
            point_count: DEFAULT_POINT_COUNT,
            tolerance: EXCLUSION_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogFile {
    /// `log_<date>_<time>.txt` in the working directory
    Timestamped,
    Path(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    pub level: LevelFilter,
    pub file: Option<LogFile>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: LevelFilter::Info,
            file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    /// name of the bound variable
    pub variable: String,
    pub sampling: SamplingConfig,
    pub range: RangeConfig,
    pub logging: LoggingConfig,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig {
            variable: "x".to_string(),
            sampling: SamplingConfig::default(),
            range: RangeConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AnalyzerConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let table: Table = text.parse()?;
        let mut config = AnalyzerConfig::default();
        for name in table.keys() {
            if !SECTIONS.contains(&name.as_str()) {
                warn!("unknown config section [{}] ignored", name);
            }
        }

        let analysis = section(&table, "analysis")?;
        if let Some(variable) = get_str(analysis, "analysis.variable")? {
            config.variable = variable.to_string();
        }

        let sampling = section(&table, "sampling")?;
        if let Some(x_min) = get_f64(sampling, "sampling.x_min")? {
            config.sampling.x_min = x_min;
        }
        if let Some(x_max) = get_f64(sampling, "sampling.x_max")? {
            config.sampling.x_max = x_max;
        }
        if let Some(points) = get_i64(sampling, "sampling.points")? {
            config.sampling.point_count = usize::try_from(points)
                .map_err(|_| invalid("sampling.points", "must be positive"))?;
        }
        if let Some(tolerance) = get_f64(sampling, "sampling.tolerance")? {
            config.sampling.tolerance = tolerance;
        }

        let range = section(&table, "range")?;
        if let Some(start) = get_i64(range, "range.grid_start")? {
            config.range.grid_start = start;
        }
        if let Some(end) = get_i64(range, "range.grid_end")? {
            config.range.grid_end = end;
        }
        if let Some(step) = get_i64(range, "range.grid_step")? {
            config.range.grid_step =
                usize::try_from(step).map_err(|_| invalid("range.grid_step", "must be positive"))?;
        }
        if let Some(budget) = get_i64(range, "range.time_budget_ms")? {
            let millis = u64::try_from(budget)
                .map_err(|_| invalid("range.time_budget_ms", "must not be negative"))?;
            config.range.time_budget = Duration::from_millis(millis);
        }

        let logging = section(&table, "logging")?;
        if let Some(level) = get_str(logging, "logging.level")? {
            config.logging.level = LevelFilter::from_str(level).map_err(|_| {
                invalid(
                    "logging.level",
                    format!("'{}' is not one of off, error, warn, info, debug, trace", level),
                )
            })?;
        }
        if let Some(file) = get_str(logging, "logging.file")? {
            config.logging.file = Some(match file {
                "auto" => LogFile::Timestamped,
                path => LogFile::Path(PathBuf::from(path)),
            });
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks the cross-field rules: a usable variable name, a non-empty window and grid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let variable = self.variable.as_str();
        let is_identifier = variable
            .chars()
            .next()
            .is_some_and(|c| c.is_alphabetic() || c == '_')
            && variable.chars().all(|c| c.is_alphanumeric() || c == '_');
        if !is_identifier {
            return Err(invalid("analysis.variable", "must be an identifier"));
        }
        if variable == "pi" || variable == "e" || KnownFunction::from_str(variable).is_ok() {
            return Err(invalid(
                "analysis.variable",
                format!("'{}' is a reserved name", variable),
            ));
        }
        let sampling = &self.sampling;
        if !(sampling.x_min.is_finite() && sampling.x_max.is_finite())
            || sampling.x_min >= sampling.x_max
        {
            return Err(invalid("sampling", "x_min must be below x_max"));
        }
        if sampling.point_count == 0 {
            return Err(invalid("sampling.points", "must be positive"));
        }
        if !(sampling.tolerance >= 0.0) {
            return Err(invalid("sampling.tolerance", "must not be negative"));
        }
        if self.range.grid_start > self.range.grid_end {
            return Err(invalid("range", "grid_start must not exceed grid_end"));
        }
        if self.range.grid_step == 0 {
            return Err(invalid("range.grid_step", "must be positive"));
        }
        Ok(())
    }
}

/// the section table, `None` when the section is missing
fn section<'t>(table: &'t Table, name: &str) -> Result<Option<&'t Table>, ConfigError> {
    match table.get(name) {
        None => Ok(None),
        Some(Value::Table(section)) => Ok(Some(section)),
        Some(_) => Err(invalid(name, "must be a [section]")),
    }
}

/// `key` is `section.name`; the lookup uses the part after the dot
fn leaf<'t>(section: Option<&'t Table>, key: &str) -> Option<&'t Value> {
    let name = key.rsplit('.').next().unwrap_or(key);
    section?.get(name)
}

fn get_str<'t>(section: Option<&'t Table>, key: &str) -> Result<Option<&'t str>, ConfigError> {
    match leaf(section, key) {
        None => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.as_str())),
        Some(_) => Err(invalid(key, "expected a string")),
    }
}

fn get_i64(section: Option<&Table>, key: &str) -> Result<Option<i64>, ConfigError> {
    match leaf(section, key) {
        None => Ok(None),
        Some(Value::Integer(value)) => Ok(Some(*value)),
        Some(_) => Err(invalid(key, "expected an integer")),
    }
}

fn get_f64(section: Option<&Table>, key: &str) -> Result<Option<f64>, ConfigError> {
    match leaf(section, key) {
        None => Ok(None),
        Some(Value::Float(value)) => Ok(Some(*value)),
        Some(Value::Integer(value)) => Ok(Some(*value as f64)),
        Some(_) => Err(invalid(key, "expected a number")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.variable, "x");
        assert_eq!(config.sampling.point_count, 800);
        assert_eq!(config.sampling.x_min, -10.0);
        assert_eq!(config.range.grid_step, 2);
        assert_eq!(config.range.time_budget, Duration::from_millis(2000));
        assert_eq!(config.logging.level, LevelFilter::Info);
        assert!(config.validate().is_ok());
        assert_eq!(AnalyzerConfig::from_toml_str("").unwrap(), config);
    }

    #[test]
    fn test_partial_file_overrides_defaults() {
        let text = r#"
            [analysis]
            variable = "t"

            [sampling]
            x_min = -5
            points = 200

            [range]
            time_budget_ms = 50

            [logging]
            level = "debug"
            file = "auto"
        "#;
        let config = AnalyzerConfig::from_toml_str(text).unwrap();
        assert_eq!(config.variable, "t");
        assert_eq!(config.sampling.x_min, -5.0);
        assert_eq!(config.sampling.x_max, 10.0);
        assert_eq!(config.sampling.point_count, 200);
        assert_eq!(config.range.time_budget, Duration::from_millis(50));
        assert_eq!(config.range.grid_start, -50);
        assert_eq!(config.logging.level, LevelFilter::Debug);
        assert_eq!(config.logging.file, Some(LogFile::Timestamped));
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let err = AnalyzerConfig::from_toml_str("[sampling]\npoints = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "sampling.points"));
        let err = AnalyzerConfig::from_toml_str("[sampling]\nx_min = 3\nx_max = 1").unwrap_err();
        assert!(err.to_string().contains("x_min must be below x_max"));
        let err = AnalyzerConfig::from_toml_str("[analysis]\nvariable = \"sin\"").unwrap_err();
        assert!(err.to_string().contains("reserved"));
        let err = AnalyzerConfig::from_toml_str("[logging]\nlevel = \"loud\"").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        let err = AnalyzerConfig::from_toml_str("[range\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[range]\ngrid_start = -10\ngrid_end = 10\ngrid_step = 1").unwrap();
        let config = AnalyzerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.range.grid_start, -10);
        assert_eq!(config.range.grid_step, 1);
        let missing = AnalyzerConfig::from_file(Path::new("/no/such/analyzer.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
