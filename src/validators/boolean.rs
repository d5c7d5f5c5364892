use toml::Value;

use super::{ValidationError, Validator, string_form};

/// Accepts `true` or `false`, as booleans or case-insensitive strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanValidator;

impl Validator for BooleanValidator {
    fn validate(&self, value: &Value) -> Result<Value, ValidationError> {
        match string_form(value).to_lowercase().as_str() {
            "true" => Ok(Value::Boolean(true)),
            "false" => Ok(Value::Boolean(false)),
            _ => Err(ValidationError::NotAllowed),
        }
    }

    fn allowed_values(&self) -> String {
        "true or false".to_string()
    }
}
