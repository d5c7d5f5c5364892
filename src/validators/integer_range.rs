use toml::Value;

use super::{ValidationError, Validator};

/// Accepts integers within an inclusive range.
#[derive(Debug, Clone, Copy)]
pub struct IntegerRangeValidator {
    min: i64,
    max: i64,
}

impl IntegerRangeValidator {
    /// Creates a validator for `min..=max`.
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }
}

impl Validator for IntegerRangeValidator {
    fn validate(&self, value: &Value) -> Result<Value, ValidationError> {
        let Value::Integer(number) = value else {
            return Err(ValidationError::invalid(format!(
                "expected an integer, got {}",
                value.type_str()
            )));
        };

        if (self.min..=self.max).contains(number) {
            Ok(value.clone())
        } else {
            Err(ValidationError::NotAllowed)
        }
    }

    fn allowed_values(&self) -> String {
        format!("{} to {}", self.min, self.max)
    }
}
