//! Validation system for configuration values
//!
//! Each config section implements [`ConfigSection`], which reports every
//! invalid field at once instead of stopping at the first.

pub use crate::error::ValidationError;

/// Trait for configuration sections that can validate themselves
pub trait ConfigSection: Default {
    /// Validates the configuration section
    ///
    /// Returns a list of validation errors. Empty list means valid.
    fn validate(&self) -> Result<(), Vec<ValidationError>>;

    /// Returns the section name for error reporting
    fn section_name(&self) -> &'static str;
}

/// Common validators for config values
pub struct Validator;

impl Validator {
    /// Validates that a numeric value is within a range
    pub fn in_range<T>(value: T, min: T, max: T, field: &str) -> Result<(), ValidationError>
    where
        T: PartialOrd + std::fmt::Display + Copy,
    {
        if value < min || value > max {
            Err(ValidationError::with_value(
                field,
                format!("must be between {} and {}", min, max),
                value,
            ))
        } else {
            Ok(())
        }
    }

    /// Validates that a string is not empty
    pub fn not_empty(value: &str, field: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            Err(ValidationError::new(field, "must not be empty"))
        } else {
            Ok(())
        }
    }

    /// Validates that a string is an absolute `http://` or `https://` URL
    pub fn http_url(value: &str, field: &str) -> Result<(), ValidationError> {
        let rest = value
            .strip_prefix("https://")
            .or_else(|| value.strip_prefix("http://"));

        match rest {
            None => Err(ValidationError::with_value(
                field,
                "must start with http:// or https://",
                value,
            )),
            Some(rest) if rest.is_empty() || rest.starts_with('/') => Err(
                ValidationError::with_value(field, "must include a host", value),
            ),
            Some(rest) if rest.chars().any(char::is_whitespace) => Err(
                ValidationError::with_value(field, "must not contain whitespace", value),
            ),
            Some(_) => Ok(()),
        }
    }

    /// Like [`Validator::http_url`], but an empty value means "unset" and passes
    pub fn optional_http_url(value: &str, field: &str) -> Result<(), ValidationError> {
        if value.is_empty() {
            Ok(())
        } else {
            Self::http_url(value, field)
        }
    }

    /// Collects multiple validation results into a single result
    pub fn collect_errors(
        results: Vec<Result<(), ValidationError>>,
    ) -> Result<(), Vec<ValidationError>> {
        let errors: Vec<ValidationError> = results.into_iter().filter_map(|r| r.err()).collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
