//! Shared validation helpers for request payloads.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::envelope::FieldError;
use crate::error::{ModelError, ModelResult};

/// Optional leading `+`, then 7-20 digits with spaces, dashes, dots or parentheses.
static PHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9 ()\-.]{7,20}$").unwrap());

/// Validator for phone number fields.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    if PHONE_REGEX.is_match(phone) && digits >= 7 {
        Ok(())
    } else {
        Err(ValidationError::new("phone")
            .with_message(Cow::Borrowed("Please provide a valid phone number")))
    }
}

/// Trim and lower-case an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Flatten validator errors into field errors, ordered by `field_order`.
///
/// Fields missing from `field_order` sort last, alphabetically.
pub fn to_field_errors(errors: &ValidationErrors, field_order: &[&str]) -> Vec<FieldError> {
    let mut fields: Vec<(String, Vec<FieldError>)> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let field = field.to_string();
            let list = errs
                .iter()
                .map(|e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", field));
                    FieldError::new(field.clone(), message)
                })
                .collect();
            (field, list)
        })
        .collect();

    fields.sort_by_key(|(field, _)| {
        let rank = field_order
            .iter()
            .position(|f| *f == field.as_str())
            .unwrap_or(field_order.len());
        (rank, field.clone())
    });

    fields.into_iter().flat_map(|(_, list)| list).collect()
}

/// Payloads that validate against a declared field order.
pub trait ValidatedPayload: Validate {
    /// Field names in declaration order, used to pick the first error.
    const FIELD_ORDER: &'static [&'static str];

    fn check(&self) -> ModelResult<()> {
        self.validate()
            .map_err(|e| ModelError::Validation(to_field_errors(&e, Self::FIELD_ORDER)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("+1 (555) 123-4567").is_ok());
        assert!(validate_phone("555.123.4567").is_ok());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("call me maybe").is_err());
        assert!(validate_phone("--------").is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Jane.Doe@Example.COM "), "jane.doe@example.com");
    }
}
