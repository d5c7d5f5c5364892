//! Explicitly constructed logging context with runtime-adjustable levels.
//!
//! A [`LoggingContext`] wraps the reload handle of a `Targets` filter. It is
//! handed to whoever needs to change verbosity instead of being looked up
//! from process-global state.

mod level;


pub use level::{LogLevel, UnknownLogLevel};

use tracing::{debug, info, level_filters::LevelFilter, warn};
use tracing_subscriber::{Registry, filter::Targets, reload};

use crate::{
    Result, SettingsError,
    settings::{SettingChange, SettingsRegistry},
    validators::string_form,
};

/// Target of the events announcing a level change.
pub const LOG_TARGET: &str = "plugin_settings::logging";

pub(crate) type FilterHandle = reload::Handle<Targets, Registry>;

/// Handle to the active level filter.
///
/// Cheap to clone; every clone controls the same filter.
#[derive(Clone, Debug)]
pub struct LoggingContext {
    handle: FilterHandle,
}

impl LoggingContext {
    pub(crate) fn from_handle(handle: FilterHandle) -> Self {
        Self { handle }
    }

    /// The level applied to targets without their own level.
    ///
    /// Returns `None` when the filter has no default, i.e. such targets are off.
    ///
    /// # Errors
    /// * `SettingsError::Logging` - If the subscriber has been dropped
    pub fn level(&self) -> Result<Option<LogLevel>> {
        self.handle
            .with_current(|targets| targets.default_level().map(LogLevel::from_filter))
            .map_err(logging_error)
    }

    /// Sets the level applied to targets without their own level.
    ///
    /// # Errors
    /// * `SettingsError::Logging` - If the subscriber has been dropped
    pub fn set_level(&self, level: LogLevel) -> Result<()> {
        self.handle
            .modify(|targets| *targets = targets.clone().with_default(level.as_filter()))
            .map_err(logging_error)
    }

    /// The level set for `target`, if it has one of its own.
    ///
    /// # Errors
    /// * `SettingsError::Logging` - If the subscriber has been dropped
    pub fn target_level(&self, target: &str) -> Result<Option<LogLevel>> {
        self.handle
            .with_current(|targets| {
                targets
                    .iter()
                    .find(|(name, _)| *name == target)
                    .map(|(_, filter)| LogLevel::from_filter(filter))
            })
            .map_err(logging_error)
    }

    /// Gives `target` its own level, overriding the default.
    ///
    /// # Errors
    /// * `SettingsError::Logging` - If the subscriber has been dropped
    pub fn set_target_level(&self, target: &str, level: LogLevel) -> Result<()> {
        self.handle
            .modify(|targets| {
                *targets = targets.clone().with_target(target, level.as_filter());
            })
            .map_err(logging_error)
    }

    /// Drops the level of `target` so it follows the default again.
    ///
    /// # Errors
    /// * `SettingsError::Logging` - If the subscriber has been dropped
    pub fn clear_target_level(&self, target: &str) -> Result<()> {
        self.handle
            .modify(|targets| {
                let default = targets.default_level();
                let kept: Vec<(String, LevelFilter)> = targets
                    .iter()
                    .filter(|(name, _)| *name != target)
                    .map(|(name, filter)| (name.to_string(), filter))
                    .collect();

                let mut rebuilt = Targets::new().with_targets(kept);
                if let Some(default) = default {
                    rebuilt = rebuilt.with_default(default);
                }
                *targets = rebuilt;
            })
            .map_err(logging_error)
    }

    /// Moves the default level from `old` to `new`, announcing the change.
    ///
    /// The announcement is an `info` event. If neither level lets it through,
    /// the level is raised to `info` just long enough to emit it.
    ///
    /// # Errors
    /// * `SettingsError::Logging` - If the subscriber has been dropped
    pub fn change_level(&self, old: LogLevel, new: LogLevel) -> Result<()> {
        let announce = || {
            info!(
                target: LOG_TARGET,
                "Changing log level from {} to {}",
                old.to_string().to_uppercase(),
                new.to_string().to_uppercase()
            );
        };

        match (old.admits_info(), new.admits_info()) {
            (true, _) => {
                announce();
                self.set_level(new)
            }
            (false, true) => {
                self.set_level(new)?;
                announce();
                Ok(())
            }
            (false, false) => {
                self.set_level(LogLevel::Info)?;
                announce();
                self.set_level(new)
            }
        }
    }

    /// Listener body for a log level setting controlling the default level.
    ///
    /// # Errors
    /// * `SettingsError::Logging` - If a value is not a log level or the
    ///   subscriber has been dropped
    pub fn on_log_level_change(&self, change: &SettingChange) -> Result<()> {
        let old = parse_level(&change.old_value)?;
        let new = parse_level(&change.new_value)?;
        self.change_level(old, new)
    }

    /// Drives the level of `target` from the log level setting `setting_name`.
    ///
    /// Applies the setting's current value right away and registers a
    /// listener, tagged with the setting name, for later changes.
    ///
    /// # Errors
    /// * `SettingsError::UnknownSetting` - If the setting is not registered
    /// * `SettingsError::DuplicateListener` - If the setting is already bound
    /// * `SettingsError::Logging` - If the value is not a log level
    pub fn bind_target(
        &self,
        registry: &mut SettingsRegistry,
        setting_name: &str,
        target: &str,
    ) -> Result<()> {
        let setting = registry.get_mut(setting_name)?;
        let level = parse_level(setting.value())?;
        self.set_target_level(target, level)?;

        let context = self.clone();
        let target = target.to_string();
        setting.add_listener(setting_name, move |change: &SettingChange| {
            let result = parse_level(&change.new_value)
                .and_then(|level| context.set_target_level(&target, level));

            match result {
                Ok(()) => debug!(
                    target: LOG_TARGET,
                    "Changed log level of '{}' to {}",
                    target,
                    string_form(&change.new_value)
                ),
                Err(e) => warn!(target: LOG_TARGET, "Cannot update log level of '{}': {}", target, e),
            }
        })
    }

    /// Stops `setting_name` from driving a target level.
    ///
    /// # Errors
    /// * `SettingsError::UnknownSetting` - If the setting is not registered
    /// * `SettingsError::UnknownListener` - If the setting was not bound
    pub fn unbind_target(&self, registry: &mut SettingsRegistry, setting_name: &str) -> Result<()> {
        registry.get_mut(setting_name)?.remove_listener(setting_name)
    }
}

fn parse_level(value: &toml::Value) -> Result<LogLevel> {
    value
        .as_str()
        .ok_or_else(|| SettingsError::Logging(format!("log level must be a string, got {value}")))?
        .parse()
        .map_err(|e: UnknownLogLevel| SettingsError::Logging(e.to_string()))
}

fn logging_error(error: reload::Error) -> SettingsError {
    SettingsError::Logging(error.to_string())
}
