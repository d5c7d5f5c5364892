use std::{
    fmt, io,
    path::{Path, PathBuf},
    result,
};

use thiserror::Error;

/// Error types for settings registration, lookup and loading.
///
/// These are programmer or environment errors. Bad values inside a settings
/// file never surface here; they are reported as diagnostics instead.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// A setting with the same name is already registered
    #[error("setting '{name}' is already registered")]
    DuplicateSetting {
        /// Name of the setting
        name: String,
    },

    /// No setting with this name is registered
    #[error("no such setting '{name}'")]
    UnknownSetting {
        /// Name that was looked up
        name: String,
    },

    /// The tag already registered a callback on this owner
    #[error("tag '{tag}' already registered a callback for change of {owner}")]
    DuplicateListener {
        /// Listener tag
        tag: String,
        /// What the listener is attached to (a setting or a source)
        owner: String,
    },

    /// The tag never registered a callback on this owner
    #[error("tag '{tag}' has not registered a callback for change of {owner}")]
    UnknownListener {
        /// Listener tag
        tag: String,
        /// What the listener is attached to (a setting or a source)
        owner: String,
    },

    /// The default value given at construction does not pass its own validator
    #[error("default value {value} for setting '{name}' is not valid: {reason}")]
    InvalidDefault {
        /// Name of the setting
        name: String,
        /// Rendered default value
        value: String,
        /// Why the validator refused it
        reason: String,
    },

    /// I/O operation error
    #[error("I/O error on '{path}': {details}")]
    Io {
        /// Path where I/O error occurred
        path: PathBuf,
        /// I/O error details
        details: String,
    },

    /// TOML parsing error with location context
    #[error("failed to parse TOML at '{location}': {details}")]
    TomlParse {
        /// Location of TOML being parsed (file path or "string")
        location: String,
        /// Parse error details
        details: String,
    },

    /// The logging subscriber could not be installed or updated
    #[error("logging error: {0}")]
    Logging(String),
}

/// A specialized `Result` type for settings operations.
pub type Result<T> = result::Result<T, SettingsError>;

impl SettingsError {
    /// Creates a TOML parsing error with optional file path context.
    ///
    /// # Arguments
    ///
    /// * `error` - The underlying parsing error
    /// * `path` - Optional path to the file that failed to parse
    pub fn toml_parse(error: impl fmt::Display, path: Option<&Path>) -> Self {
        let location = match path {
            Some(p) => p.to_string_lossy().to_string(),
            None => "string".to_string(),
        };

        SettingsError::TomlParse {
            location,
            details: error.to_string(),
        }
    }

    /// Creates an I/O error with file path context.
    pub fn io(error: &io::Error, path: &Path) -> Self {
        SettingsError::Io {
            path: path.to_path_buf(),
            details: error.to_string(),
        }
    }

    pub(crate) fn setting_owner(name: &str) -> String {
        format!("setting '{name}'")
    }
}
