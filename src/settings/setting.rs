use std::{collections::HashMap, fmt};

use toml::Value;
use tracing::debug;

use crate::{
    Result, SettingsError,
    validators::{
        BooleanValidator, EnumValidator, IntegerRangeValidator, ListOfStringsValidator,
        TypeValidator, ValidationError, Validator, string_form,
    },
};

use super::{ApplyOutcome, SettingChange};

/// Callback invoked after a setting changes value.
pub type Listener = Box<dyn FnMut(&SettingChange)>;

/// Levels accepted by a log level setting.
pub const LOG_LEVELS: [&str; 4] = ["debug", "info", "warning", "error"];

/// A single named configuration value guarded by a validator.
///
/// The stored value is always either the validated default or a value that
/// passed validation later. Listeners are keyed by tag; each tag may hold at
/// most one callback.
pub struct Setting {
    name: String,
    value: Value,
    default: Value,
    validator: Box<dyn Validator>,
    listeners: HashMap<String, Listener>,
}

impl Setting {
    /// Creates a setting whose current value is the validated default.
    ///
    /// # Errors
    /// * `SettingsError::InvalidDefault` - If the default does not pass `validator`
    pub fn new(
        name: impl Into<String>,
        default: impl Into<Value>,
        validator: impl Validator + 'static,
    ) -> Result<Self> {
        let name = name.into();
        let default = default.into();

        let value = validator
            .validate(&default)
            .map_err(|err| SettingsError::InvalidDefault {
                name: name.clone(),
                value: string_form(&default),
                reason: match err {
                    ValidationError::NotAllowed => format!(
                        "allowed values are {}",
                        validator.allowed_values()
                    ),
                    ValidationError::Invalid { reason } => reason,
                },
            })?;

        Ok(Self {
            name,
            value,
            default,
            validator: Box::new(validator),
            listeners: HashMap::new(),
        })
    }

    /// A setting restricted to a fixed set of case-insensitive strings.
    ///
    /// # Errors
    /// * `SettingsError::InvalidDefault` - If `default` is not one of `allowed`
    pub fn enumeration<I, S>(name: impl Into<String>, allowed: I, default: &str) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(name, default, EnumValidator::new(allowed))
    }

    /// A setting holding one of `debug`, `info`, `warning` or `error`.
    ///
    /// # Errors
    /// * `SettingsError::InvalidDefault` - If `default` is not a known level
    pub fn log_level(name: impl Into<String>, default: &str) -> Result<Self> {
        Self::enumeration(name, LOG_LEVELS, default)
    }

    /// A setting holding an integer within `min..=max`.
    ///
    /// # Errors
    /// * `SettingsError::InvalidDefault` - If `default` is out of range
    pub fn integer_range(
        name: impl Into<String>,
        default: i64,
        min: i64,
        max: i64,
    ) -> Result<Self> {
        Self::new(name, default, IntegerRangeValidator::new(min, max))
    }

    /// A setting that accepts any value of the same kind as `default`.
    ///
    /// # Errors
    /// Never fails in practice; the default always matches its own kind.
    pub fn typed(name: impl Into<String>, default: impl Into<Value>) -> Result<Self> {
        let default = default.into();
        let validator = TypeValidator::of(&default);
        Self::new(name, default, validator)
    }

    /// A setting holding `true` or `false`.
    ///
    /// # Errors
    /// Never fails in practice; both booleans are accepted.
    pub fn boolean(name: impl Into<String>, default: bool) -> Result<Self> {
        Self::new(name, default, BooleanValidator)
    }

    /// A setting holding an array of strings.
    ///
    /// # Errors
    /// * `SettingsError::InvalidDefault` - Never for a `Vec<String>` default
    pub fn list_of_strings(name: impl Into<String>, default: Vec<String>) -> Result<Self> {
        Self::new(name, default, ListOfStringsValidator)
    }

    /// The setting name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The accepted value currently in effect.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The fallback value used when the source has no entry.
    pub fn default_value(&self) -> &Value {
        &self.default
    }

    /// Description of the values the validator accepts.
    pub fn allowed_values(&self) -> String {
        self.validator.allowed_values()
    }

    /// Registers `callback` under `tag`.
    ///
    /// # Errors
    /// * `SettingsError::DuplicateListener` - If `tag` already has a callback here
    pub fn add_listener(
        &mut self,
        tag: impl Into<String>,
        callback: impl FnMut(&SettingChange) + 'static,
    ) -> Result<()> {
        let tag = tag.into();
        if self.listeners.contains_key(&tag) {
            return Err(SettingsError::DuplicateListener {
                tag,
                owner: SettingsError::setting_owner(&self.name),
            });
        }

        debug!("Adding callback '{}' for setting '{}'", tag, self.name);
        self.listeners.insert(tag, Box::new(callback));
        Ok(())
    }

    /// Removes the callback registered under `tag`.
    ///
    /// # Errors
    /// * `SettingsError::UnknownListener` - If `tag` has no callback here
    pub fn remove_listener(&mut self, tag: &str) -> Result<()> {
        if self.listeners.remove(tag).is_none() {
            return Err(SettingsError::UnknownListener {
                tag: tag.to_string(),
                owner: SettingsError::setting_owner(&self.name),
            });
        }

        debug!("Removed callback '{}' for setting '{}'", tag, self.name);
        Ok(())
    }

    /// Whether `tag` has a callback registered here.
    pub fn has_listener(&self, tag: &str) -> bool {
        self.listeners.contains_key(tag)
    }

    /// Number of registered callbacks.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Validates `raw` and, if accepted, stores it and notifies listeners.
    ///
    /// A raw value whose string form equals the current value's string form,
    /// ignoring case, is a no-op and skips validation entirely. A refused
    /// value leaves the current value untouched and comes back as
    /// `ApplyOutcome::Rejected` with the message to show the user.
    ///
    /// Listeners run synchronously, in no particular order, while the setting
    /// is mutably borrowed.
    pub fn apply(&mut self, raw: &Value) -> ApplyOutcome {
        let raw_form = string_form(raw);
        if raw_form.to_lowercase() == string_form(&self.value).to_lowercase() {
            return ApplyOutcome::Unchanged;
        }

        let new_value = match self.validator.validate(raw) {
            Ok(value) => value,
            Err(ValidationError::NotAllowed) => {
                return ApplyOutcome::Rejected(format!(
                    "Value '{}' for setting '{}' not supported. Allowed values are {}.",
                    raw_form,
                    self.name,
                    self.validator.allowed_values()
                ));
            }
            Err(ValidationError::Invalid { reason }) => {
                return ApplyOutcome::Rejected(format!(
                    "Failed validating value {} for setting '{}':\n{}",
                    raw_form, self.name, reason
                ));
            }
        };

        debug!(
            "Changed setting '{}' from '{}' to '{}'",
            self.name,
            string_form(&self.value),
            string_form(&new_value)
        );

        let old_value = std::mem::replace(&mut self.value, new_value);
        let change = SettingChange::new(self.name.clone(), old_value, self.value.clone());

        for (tag, listener) in self.listeners.iter_mut() {
            debug!("Calling callback '{}' for setting '{}'", tag, self.name);
            listener(&change);
        }

        ApplyOutcome::Changed(change)
    }

    /// Applies the default value.
    pub fn reset_to_default(&mut self) -> ApplyOutcome {
        debug!(
            "Changing setting '{}' to default value '{}'",
            self.name,
            string_form(&self.default)
        );
        let default = self.default.clone();
        self.apply(&default)
    }
}

impl fmt::Debug for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setting")
            .field("name", &self.name)
            .field("value", &self.value)
            .field("default", &self.default)
            .field("validator", &self.validator)
            .field("listeners", &self.listeners.keys().collect::<Vec<_>>())
            .finish()
    }
}
