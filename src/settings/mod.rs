//! Typed, validated settings with change notification.
//!
//! A [`SettingsRegistry`] owns named [`Setting`]s and re-synchronizes all of
//! them from a [`ConfigSource`] whenever the source reports a change. The
//! source never says what changed, so every reload is a full scan.
//!
//! Listener callbacks run synchronously inside `apply`. They cannot reach
//! back into the setting or registry that is dispatching them; a listener
//! that wants to change configuration has to do so after the reload returns.

mod change;
mod diagnostics;
mod plugin;
mod registry;
mod setting;
mod source;

#[cfg(test)]
mod tests;

pub use change::{ApplyOutcome, SettingChange};
pub use diagnostics::{CollectingSink, DiagnosticSink, TracingSink};
pub use plugin::{LOG_LEVEL, PluginSettings};
pub use registry::{ReloadReport, SettingsRegistry};
pub use setting::{LOG_LEVELS, Listener, Setting};
pub use source::{ConfigSource, MapSource, Watcher};
