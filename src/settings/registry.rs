use std::{
    collections::{BTreeSet, HashMap},
    fmt,
};

use toml::{Table, Value};
use tracing::{debug, instrument};

use crate::{Result, SettingsError, validators::quoted_list};

use super::{ApplyOutcome, ConfigSource, DiagnosticSink, Setting, SettingChange, TracingSink};

/// Summary of one reload pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReloadReport {
    /// Changes that were stored and dispatched.
    pub changes: Vec<SettingChange>,
    /// Diagnostics for refused values.
    pub rejected: Vec<String>,
    /// Keys present in the source that no setting claims, sorted.
    pub unknown_keys: Vec<String>,
}

impl ReloadReport {
    /// Whether the pass produced any diagnostic.
    pub fn has_diagnostics(&self) -> bool {
        !self.rejected.is_empty() || !self.unknown_keys.is_empty()
    }
}

/// Owns every registered setting and re-synchronizes them from a source.
pub struct SettingsRegistry {
    settings: HashMap<String, Setting>,
    diagnostics: Box<dyn DiagnosticSink>,
}

impl SettingsRegistry {
    /// Creates an empty registry reporting to `diagnostics`.
    pub fn new(diagnostics: impl DiagnosticSink + 'static) -> Self {
        Self {
            settings: HashMap::new(),
            diagnostics: Box::new(diagnostics),
        }
    }

    /// Adds `setting` under its own name.
    ///
    /// # Errors
    /// * `SettingsError::DuplicateSetting` - If a setting with that name exists
    pub fn register(&mut self, setting: Setting) -> Result<()> {
        let name = setting.name().to_string();
        if self.settings.contains_key(&name) {
            return Err(SettingsError::DuplicateSetting { name });
        }

        debug!("Registered setting '{}'", name);
        self.settings.insert(name, setting);
        Ok(())
    }

    /// Looks up a setting by name.
    ///
    /// # Errors
    /// * `SettingsError::UnknownSetting` - If no such setting is registered
    pub fn get(&self, name: &str) -> Result<&Setting> {
        self.settings
            .get(name)
            .ok_or_else(|| SettingsError::UnknownSetting {
                name: name.to_string(),
            })
    }

    /// Looks up a setting by name for mutation, e.g. to add a listener.
    ///
    /// # Errors
    /// * `SettingsError::UnknownSetting` - If no such setting is registered
    pub fn get_mut(&mut self, name: &str) -> Result<&mut Setting> {
        self.settings
            .get_mut(name)
            .ok_or_else(|| SettingsError::UnknownSetting {
                name: name.to_string(),
            })
    }

    /// The current value of a setting.
    ///
    /// # Errors
    /// * `SettingsError::UnknownSetting` - If no such setting is registered
    pub fn value(&self, name: &str) -> Result<&Value> {
        self.get(name).map(Setting::value)
    }

    /// Registered setting names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.settings.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered settings.
    pub fn len(&self) -> usize {
        self.settings.len()
    }

    /// Whether no setting is registered.
    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    /// Current values of all settings as a TOML table.
    pub fn snapshot(&self) -> Table {
        self.settings
            .iter()
            .map(|(name, setting)| (name.clone(), setting.value().clone()))
            .collect()
    }

    /// Re-reads every registered setting from `source`.
    ///
    /// Settings present in the source get their raw value applied; absent
    /// ones are reset to their default. Refused values and keys no setting
    /// claims are reported as diagnostics and never stop the pass.
    #[instrument(skip_all)]
    pub fn reload(&mut self, source: &dyn ConfigSource) -> ReloadReport {
        debug!("Reloading settings");
        let mut report = ReloadReport::default();

        for (name, setting) in self.settings.iter_mut() {
            let outcome = match source.get(name) {
                Some(raw) => setting.apply(&raw),
                None => setting.reset_to_default(),
            };

            match outcome {
                ApplyOutcome::Unchanged => {}
                ApplyOutcome::Changed(change) => report.changes.push(change),
                ApplyOutcome::Rejected(message) => {
                    self.diagnostics.report(&message);
                    report.rejected.push(message);
                }
            }
        }

        let unknown: BTreeSet<String> = source
            .keys()
            .into_iter()
            .filter(|key| !self.settings.contains_key(key))
            .collect();
        report.unknown_keys = unknown.into_iter().collect();

        if let Some(message) = unknown_keys_message(&report.unknown_keys) {
            self.diagnostics.report(&message);
        }

        report
    }

    /// Removes the listener registered under `tag` from every setting.
    ///
    /// Returns how many listeners were removed.
    pub fn detach(&mut self, tag: &str) -> usize {
        let mut removed = 0;
        for setting in self.settings.values_mut() {
            if setting.has_listener(tag) && setting.remove_listener(tag).is_ok() {
                removed += 1;
            }
        }

        debug!("Detached {} callback(s) for tag '{}'", removed, tag);
        removed
    }
}

impl Default for SettingsRegistry {
    fn default() -> Self {
        Self::new(TracingSink)
    }
}

impl fmt::Debug for SettingsRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsRegistry")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

fn unknown_keys_message(keys: &[String]) -> Option<String> {
    match keys {
        [] => None,
        [key] => Some(format!("Unknown setting '{key}'.")),
        keys => Some(format!(
            "Unknown settings {}.",
            quoted_list(keys.iter().map(String::as_str))
        )),
    }
}
