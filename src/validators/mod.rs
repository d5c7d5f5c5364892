//! Validators that accept, reject or canonicalize raw setting values.
//!
//! Every validator works on `toml::Value` and distinguishes two kinds of
//! failure: a value that is well-formed but not allowed, and a value that
//! cannot be evaluated at all.

mod boolean;
mod enumeration;
mod integer_range;
mod kind;
mod list;


pub use boolean::BooleanValidator;
pub use enumeration::EnumValidator;
pub use integer_range::IntegerRangeValidator;
pub use kind::{TypeValidator, ValueKind};
pub use list::ListOfStringsValidator;

use std::fmt;

use thiserror::Error;
use toml::Value;

/// Reasons a validator refuses a raw value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The value is well-formed but outside the allowed set.
    #[error("value not allowed")]
    NotAllowed,

    /// The value could not be evaluated by this validator.
    #[error("{reason}")]
    Invalid {
        /// Why evaluation failed
        reason: String,
    },
}

impl ValidationError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        ValidationError::Invalid {
            reason: reason.into(),
        }
    }
}

/// Capability that checks a raw value and returns its accepted form.
pub trait Validator: fmt::Debug {
    /// Validates `value`, returning the value to store on success.
    ///
    /// # Errors
    /// * `ValidationError::NotAllowed` - If the value is outside the allowed set
    /// * `ValidationError::Invalid` - If the value has the wrong shape
    fn validate(&self, value: &Value) -> Result<Value, ValidationError>;

    /// Human-readable description of the accepted values.
    fn allowed_values(&self) -> String;
}

/// Renders a value the way users typed it: strings without quotes,
/// everything else in TOML notation.
pub fn string_form(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Renders a list of strings as `['a', 'b']`.
pub(crate) fn quoted_list<'a>(items: impl IntoIterator<Item = &'a str>) -> String {
    let quoted: Vec<String> = items.into_iter().map(|item| format!("'{item}'")).collect();
    format!("[{}]", quoted.join(", "))
}
