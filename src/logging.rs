//! Process-wide log output
//!
//! The crate logs through the `log` facade. Hosts that do not bring their own
//! logger call [`init`] once at startup; it reads [`LOG_LEVEL_ENV`] a single
//! time and installs a [`Logger`] that prints lines shaped like
//!
//! ```text
//! ccsettings (ini) - WARNING: Unable to parse value for s0_speed
//! ```

use std::fmt::Write as _;
use std::io::Write as _;
use std::sync::OnceLock;

/// Name printed at the start of each log line
pub const TOOL_NAME: &str = "ccsettings";

/// Environment variable selecting the verbosity
pub const LOG_LEVEL_ENV: &str = "CCSETTINGS_LOG_LEVEL";

/// Verbosity levels, from most to least verbose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Parse a level name (case-insensitive). Unknown names give `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warning" | "warn" => Some(LogLevel::Warning),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    /// Upper-case label used in log lines
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }

    fn filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Debug => log::LevelFilter::Trace,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warning => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => LogLevel::Error,
            log::Level::Warn => LogLevel::Warning,
            log::Level::Info => LogLevel::Info,
            log::Level::Debug | log::Level::Trace => LogLevel::Debug,
        }
    }
}

/// Resolve the level from the raw environment value
#[must_use]
pub fn level_from_env(value: Option<&str>) -> LogLevel {
    value.and_then(LogLevel::parse).unwrap_or_default()
}

/// Format one log line; a newline is appended only if `message` lacks one
#[must_use]
pub fn format_line(domain: Option<&str>, level: LogLevel, message: &str) -> String {
    let mut line = String::with_capacity(TOOL_NAME.len() + message.len() + 24);
    line.push_str(TOOL_NAME);
    if let Some(domain) = domain.filter(|d| !d.is_empty()) {
        let _ = write!(line, " ({domain})");
    }
    let _ = write!(line, " - {}: {message}", level.as_str());
    if !message.ends_with('\n') {
        line.push('\n');
    }
    line
}

/// `log::Log` implementation writing formatted lines to stderr
#[derive(Debug)]
pub struct Logger {
    level: LogLevel,
}

impl Logger {
    #[must_use]
    pub fn new(level: LogLevel) -> Self {
        Self { level }
    }

    #[must_use]
    pub fn level(&self) -> LogLevel {
        self.level
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        LogLevel::from(metadata.level()) >= self.level
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let domain = record.target().rsplit("::").next();
        let line = format_line(domain, record.level().into(), &record.args().to_string());
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<Logger> = OnceLock::new();

/// Install the crate logger, reading the level from the environment once.
///
/// Returns the level in force. If another logger is already installed the
/// call leaves it in place.
pub fn init() -> LogLevel {
    let logger = LOGGER.get_or_init(|| {
        let raw = std::env::var(LOG_LEVEL_ENV).ok();
        Logger::new(level_from_env(raw.as_deref()))
    });
    if log::set_logger(logger).is_ok() {
        log::set_max_level(logger.level.filter());
    }
    logger.level
}
