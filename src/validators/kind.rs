use std::fmt;

use toml::Value;

use super::{ValidationError, Validator};

/// The shape of a TOML value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// UTF-8 string
    String,
    /// 64-bit signed integer
    Integer,
    /// 64-bit float
    Float,
    /// Boolean
    Boolean,
    /// Offset or local date/time
    Datetime,
    /// Array of values
    Array,
    /// Table of key/value pairs
    Table,
}

impl ValueKind {
    /// Returns the kind of `value`.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => ValueKind::String,
            Value::Integer(_) => ValueKind::Integer,
            Value::Float(_) => ValueKind::Float,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Datetime(_) => ValueKind::Datetime,
            Value::Array(_) => ValueKind::Array,
            Value::Table(_) => ValueKind::Table,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::String => "string",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::Boolean => "boolean",
            ValueKind::Datetime => "datetime",
            ValueKind::Array => "array",
            ValueKind::Table => "table",
        };
        write!(f, "{name}")
    }
}

/// Accepts any value of one specific kind.
#[derive(Debug, Clone, Copy)]
pub struct TypeValidator {
    kind: ValueKind,
}

impl TypeValidator {
    /// Creates a validator for `kind`.
    pub fn new(kind: ValueKind) -> Self {
        Self { kind }
    }

    /// Creates a validator matching the kind of an example value.
    pub fn of(value: &Value) -> Self {
        Self::new(ValueKind::of(value))
    }
}

impl Validator for TypeValidator {
    fn validate(&self, value: &Value) -> Result<Value, ValidationError> {
        if ValueKind::of(value) == self.kind {
            Ok(value.clone())
        } else {
            Err(ValidationError::NotAllowed)
        }
    }

    fn allowed_values(&self) -> String {
        format!("of type {}", self.kind)
    }
}
