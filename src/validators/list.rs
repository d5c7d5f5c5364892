use toml::Value;

use super::{ValidationError, Validator};

/// Accepts an array whose elements are all strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListOfStringsValidator;

impl Validator for ListOfStringsValidator {
    fn validate(&self, value: &Value) -> Result<Value, ValidationError> {
        let Value::Array(items) = value else {
            return Err(ValidationError::invalid(format!(
                "expected an array, got {}",
                value.type_str()
            )));
        };

        if items.iter().all(Value::is_str) {
            Ok(value.clone())
        } else {
            Err(ValidationError::NotAllowed)
        }
    }

    fn allowed_values(&self) -> String {
        "list of strings".to_string()
    }
}
