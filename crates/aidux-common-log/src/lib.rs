//! Logging infrastructure for the integrity subsystem.
//!
//! Services log through `tracing`; binaries and test harnesses call [`init`]
//! once to install a subscriber configured from `AIDUX_LOG_*` variables.

use std::io;
use std::path::PathBuf;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Distributed tracing utilities.
pub mod spans;

/// Convenience macros re-exported from tracing.
pub use tracing::{debug, error, info, trace, warn};

/// Environment variable names.
pub mod vars {
    pub const AIDUX_LOG_LEVEL: &str = "AIDUX_LOG_LEVEL";
    pub const AIDUX_LOG_FORMAT: &str = "AIDUX_LOG_FORMAT";
    pub const AIDUX_LOG_FILE: &str = "AIDUX_LOG_FILE";
    pub const AIDUX_LOG_SOURCE: &str = "AIDUX_LOG_SOURCE";
    pub const AIDUX_LOG_SPANS: &str = "AIDUX_LOG_SPANS";
    pub const RUST_LOG: &str = "RUST_LOG";
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level.
    pub level: LogLevel,
    /// Output format.
    pub format: LogFormat,
    /// Log file path (if file logging enabled).
    pub file_path: Option<PathBuf>,
    /// Include source location.
    pub source_location: bool,
    /// Include span events.
    pub span_events: bool,
}

/// Log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing_subscriber::filter::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

impl LogLevel {
    /// Parse from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable pretty format.
    #[default]
    Pretty,
    /// Compact single-line format.
    Compact,
    /// JSON structured format, one object per line.
    Json,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            "compact" => Self::Compact,
            _ => Self::Pretty,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            file_path: None,
            source_location: false,
            span_events: false,
        }
    }
}

fn flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}

impl LogConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Create config from an arbitrary variable source.
    ///
    /// `AIDUX_LOG_LEVEL` wins over `RUST_LOG` when both are set.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(level) = lookup(vars::AIDUX_LOG_LEVEL)
            .or_else(|| lookup(vars::RUST_LOG))
            .as_deref()
            .and_then(LogLevel::parse)
        {
            config.level = level;
        }

        if let Some(format) = lookup(vars::AIDUX_LOG_FORMAT) {
            config.format = LogFormat::parse(&format);
        }

        if let Some(file_path) = lookup(vars::AIDUX_LOG_FILE) {
            config.file_path = Some(PathBuf::from(file_path));
        }

        if let Some(source_location) = lookup(vars::AIDUX_LOG_SOURCE) {
            config.source_location = flag(&source_location);
        }

        if let Some(span_events) = lookup(vars::AIDUX_LOG_SPANS) {
            config.span_events = flag(&span_events);
        }

        config
    }

    fn span_events(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }

    fn layer<W>(&self, writer: W, ansi: bool) -> Box<dyn Layer<Registry> + Send + Sync>
    where
        W: for<'w> fmt::MakeWriter<'w> + Send + Sync + 'static,
    {
        let base = fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_file(self.source_location)
            .with_line_number(self.source_location)
            .with_span_events(self.span_events());

        match self.format {
            LogFormat::Pretty => base.with_ansi(ansi).boxed(),
            LogFormat::Compact => base.compact().with_ansi(ansi).boxed(),
            LogFormat::Json => base.json().boxed(),
        }
    }
}

/// Initialize logging with the given configuration.
///
/// A `RUST_LOG` directive string takes precedence over the configured level
/// so per-module filters keep working.
pub fn init(config: LogConfig) -> Result<(), LogError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let mut layers = vec![config.layer(io::stderr, true)];

    if let Some(file_path) = &config.file_path {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;
        layers.push(config.layer(std::sync::Mutex::new(file), false));
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| LogError::InitError(e.to_string()))
}

/// Logging errors.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("failed to initialize logging: {0}")]
    InitError(String),

    #[error("failed to open log file: {0}")]
    FileError(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!(LogLevel::parse("info"), Some(LogLevel::Info));
        assert_eq!(LogLevel::parse("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("Warning"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("trace"), Some(LogLevel::Trace));
        assert_eq!(LogLevel::parse("invalid"), None);
    }

    #[test]
    fn test_log_level_from() {
        use tracing_subscriber::filter::LevelFilter;
        assert_eq!(LevelFilter::from(LogLevel::Trace), LevelFilter::TRACE);
        assert_eq!(LevelFilter::from(LogLevel::Warn), LevelFilter::WARN);
        assert_eq!(LevelFilter::from(LogLevel::Error), LevelFilter::ERROR);
    }

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.level, LogLevel::Info);
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.file_path.is_none());
        assert!(!config.source_location);
        assert!(!config.span_events);
    }

    #[test]
    fn test_config_from_lookup() {
        let config = LogConfig::from_lookup(lookup(&[
            (vars::AIDUX_LOG_LEVEL, "debug"),
            (vars::AIDUX_LOG_FORMAT, "json"),
            (vars::AIDUX_LOG_FILE, "/tmp/aidux.log"),
            (vars::AIDUX_LOG_SOURCE, "true"),
            (vars::AIDUX_LOG_SPANS, "1"),
        ]));
        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.file_path, Some(PathBuf::from("/tmp/aidux.log")));
        assert!(config.source_location);
        assert!(config.span_events);
    }

    #[test]
    fn test_rust_log_fallback() {
        let config = LogConfig::from_lookup(lookup(&[(vars::RUST_LOG, "warn")]));
        assert_eq!(config.level, LogLevel::Warn);

        let config = LogConfig::from_lookup(lookup(&[
            (vars::AIDUX_LOG_LEVEL, "error"),
            (vars::RUST_LOG, "warn"),
        ]));
        assert_eq!(config.level, LogLevel::Error);
    }

    #[test]
    fn test_unknown_format_is_pretty() {
        assert_eq!(LogFormat::parse("fancy"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("COMPACT"), LogFormat::Compact);
    }

    #[test]
    fn test_init_twice_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = LogConfig {
            file_path: Some(dir.path().join("aidux.log")),
            format: LogFormat::Json,
            ..Default::default()
        };

        // Another test may already have installed a global subscriber.
        let _ = init(config.clone());
        assert!(matches!(init(config), Err(LogError::InitError(_))));
    }
}
