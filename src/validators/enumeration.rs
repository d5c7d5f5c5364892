use toml::Value;

use super::{ValidationError, Validator, quoted_list};

/// Accepts one of a fixed set of strings, ignoring case.
///
/// Allowed values are stored lowercase and the matched canonical form is
/// what gets returned.
#[derive(Debug, Clone)]
pub struct EnumValidator {
    allowed: Vec<String>,
}

impl EnumValidator {
    /// Creates a validator for the given allowed values.
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed: allowed
                .into_iter()
                .map(|value| value.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// The canonical allowed values.
    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }
}

impl Validator for EnumValidator {
    fn validate(&self, value: &Value) -> Result<Value, ValidationError> {
        let Value::String(raw) = value else {
            return Err(ValidationError::invalid("value must be a string"));
        };

        let lowered = raw.to_lowercase();
        self.allowed
            .iter()
            .find(|allowed| **allowed == lowered)
            .map(|allowed| Value::String(allowed.clone()))
            .ok_or(ValidationError::NotAllowed)
    }

    fn allowed_values(&self) -> String {
        quoted_list(self.allowed.iter().map(String::as_str))
    }
}
