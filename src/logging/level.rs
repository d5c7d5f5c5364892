use std::{fmt, str::FromStr};

use thiserror::Error;
use tracing::level_filters::LevelFilter;

/// Verbosity accepted by log level settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Show debug information useful for development and troubleshooting.
    Debug,

    /// Show informational messages, warnings, and errors.
    Info,

    /// Show warnings and errors (default level).
    #[default]
    Warning,

    /// Only show errors.
    Error,
}

/// A string that names no known log level.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown log level '{0}'")]
pub struct UnknownLogLevel(pub String);

impl LogLevel {
    /// The equivalent tracing filter.
    pub fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warning => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }

    /// The closest level to a tracing filter.
    pub fn from_filter(filter: LevelFilter) -> Self {
        if filter >= LevelFilter::DEBUG {
            LogLevel::Debug
        } else if filter == LevelFilter::INFO {
            LogLevel::Info
        } else if filter == LevelFilter::WARN {
            LogLevel::Warning
        } else {
            LogLevel::Error
        }
    }

    /// Whether `info` events pass at this level.
    pub fn admits_info(self) -> bool {
        self.as_filter() >= LevelFilter::INFO
    }
}

impl FromStr for LogLevel {
    type Err = UnknownLogLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            _ => Err(UnknownLogLevel(s.to_string())),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warning => write!(f, "warning"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}
