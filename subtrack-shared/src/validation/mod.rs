//! Input validation for subscription payloads
//!
//! Validation is explicit: each request type has a hand-written `validate`
//! method (see [`crate::models::subscription`]) built from the checks in this
//! module. Two kinds of failure are reported separately:
//!
//! - [`ValidationErrors`]: a required field is missing or breaks a rule
//!   (every failing field is collected)
//! - [`date::DateFormatError`]: a date is not `MM-YYYY` (first failure wins)

pub mod date;

use std::fmt;

use uuid::Uuid;

pub use date::{validate_month_year, DateFormatError};

/// Rule a field failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Field must be present and non-empty
    Required,

    /// Number must be strictly greater than zero
    Gt,
}

impl Rule {
    /// Short tag used in error messages
    pub fn tag(&self) -> &'static str {
        match self {
            Rule::Required => "required",
            Rule::Gt => "gt",
        }
    }
}

/// A single failed field check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// JSON name of the field
    pub field: &'static str,

    /// Rule that failed
    pub rule: Rule,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Field '{}' failed validation: {}", self.field, self.rule.tag())
    }
}

/// All field checks that failed for one payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, rule: Rule) {
        self.0.push(FieldError { field, rule });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// `Ok(())` when nothing failed, otherwise the collected errors
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Why a payload was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    #[error(transparent)]
    InvalidDate(#[from] DateFormatError),
}

impl From<ValidationErrors> for InputError {
    fn from(errors: ValidationErrors) -> Self {
        InputError::Validation(errors)
    }
}

/// Records `Required` unless the string has content
pub fn check_non_empty(errors: &mut ValidationErrors, field: &'static str, value: &str) {
    if value.is_empty() {
        errors.push(field, Rule::Required);
    }
}

/// Records `Required` for zero and `Gt` for negative numbers
pub fn check_positive(errors: &mut ValidationErrors, field: &'static str, value: i64) {
    if value == 0 {
        errors.push(field, Rule::Required);
    } else if value < 0 {
        errors.push(field, Rule::Gt);
    }
}

/// Records `Required` for the nil UUID
pub fn check_non_nil(errors: &mut ValidationErrors, field: &'static str, value: &Uuid) {
    if value.is_nil() {
        errors.push(field, Rule::Required);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_joins_fields() {
        let mut errors = ValidationErrors::new();
        errors.push("service_name", Rule::Required);
        errors.push("price", Rule::Gt);

        assert_eq!(
            errors.to_string(),
            "Field 'service_name' failed validation: required; Field 'price' failed validation: gt"
        );
    }

    #[test]
    fn test_into_result() {
        assert!(ValidationErrors::new().into_result().is_ok());

        let mut errors = ValidationErrors::new();
        errors.push("user_id", Rule::Required);
        let err = errors.into_result().unwrap_err();
        assert_eq!(err.errors().len(), 1);
        assert_eq!(err.errors()[0].field, "user_id");
    }

    #[test]
    fn test_check_positive() {
        let mut errors = ValidationErrors::new();
        check_positive(&mut errors, "price", 10);
        assert!(errors.is_empty());

        check_positive(&mut errors, "price", 0);
        check_positive(&mut errors, "price", -5);
        assert_eq!(
            errors.errors(),
            &[
                FieldError { field: "price", rule: Rule::Required },
                FieldError { field: "price", rule: Rule::Gt },
            ]
        );
    }

    #[test]
    fn test_check_non_nil() {
        let mut errors = ValidationErrors::new();
        check_non_nil(&mut errors, "user_id", &Uuid::new_v4());
        assert!(errors.is_empty());

        check_non_nil(&mut errors, "user_id", &Uuid::nil());
        assert_eq!(errors.errors().len(), 1);
    }

    #[test]
    fn test_input_error_from_date() {
        let err: InputError = validate_month_year("1-2025").unwrap_err().into();
        assert!(matches!(err, InputError::InvalidDate(DateFormatError::Width { .. })));
    }
}
