use std::time::Instant;

use toml::Value;

/// Record of a setting moving from one accepted value to another.
///
/// Delivered to every listener of the setting after the new value is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingChange {
    /// Name of the changed setting.
    pub name: String,
    /// The value before the change.
    pub old_value: Value,
    /// The value now stored.
    pub new_value: Value,
    /// Timestamp when the change occurred.
    pub timestamp: Instant,
}

impl SettingChange {
    /// Creates a new change record stamped with the current time.
    pub fn new(name: String, old_value: Value, new_value: Value) -> Self {
        Self {
            name,
            old_value,
            new_value,
            timestamp: Instant::now(),
        }
    }

    /// Attempts to extract the new value as a string.
    ///
    /// Returns `None` if the value is not a string.
    pub fn new_str(&self) -> Option<&str> {
        self.new_value.as_str()
    }

    /// Attempts to extract the old value as a string.
    pub fn old_str(&self) -> Option<&str> {
        self.old_value.as_str()
    }
}

/// What happened when a raw value was applied to a setting.
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    /// The raw value matched the current value; nothing was dispatched.
    Unchanged,
    /// The value was accepted, stored and dispatched to listeners.
    Changed(SettingChange),
    /// The value was refused; the current value is untouched.
    Rejected(String),
}

impl ApplyOutcome {
    /// The diagnostic message for a rejected value.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            ApplyOutcome::Rejected(message) => Some(message),
            _ => None,
        }
    }

    /// Whether the stored value changed.
    pub fn is_changed(&self) -> bool {
        matches!(self, ApplyOutcome::Changed(_))
    }
}
