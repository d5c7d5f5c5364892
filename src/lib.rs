//! Plugin Settings - typed, validated settings with change notification.
//!
//! Settings are named values guarded by validators. A registry keeps them in
//! sync with a key/value source that only ever reports "something changed",
//! and dispatches per-setting callbacks to listeners. The main features are:
//!
//! - Validators for enums, integer ranges, value kinds, booleans and string lists
//! - Tagged listeners with explicit register/unregister
//! - Full-scan reloads that report bad values and unknown keys as diagnostics
//! - An explicit logging context whose level follows a `log_level` setting
//!
//! # Quick Start
//!
//! ```rust
//! use plugin_settings::settings::{CollectingSink, Setting, SettingsRegistry};
//!
//! let mut registry = SettingsRegistry::new(CollectingSink::new());
//! registry.register(Setting::log_level("log_level", "warning")?)?;
//!
//! let source: toml::Table = toml::from_str(r#"log_level = "DEBUG""#)?;
//! registry.reload(&source);
//!
//! assert_eq!(registry.value("log_level")?.as_str(), Some("debug"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Error types and result aliases.
pub mod error;

/// Log levels and the runtime-adjustable logging context.
pub mod logging;

/// Settings, the registry and configuration sources.
pub mod settings;

/// Subscriber setup for the process or for tests.
pub mod tracing_config;

/// Value validators.
pub mod validators;

/// Re-exported error types for convenience.
pub use error::{Result, SettingsError};
