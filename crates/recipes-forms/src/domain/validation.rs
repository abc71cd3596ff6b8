//! Validation library
//!
//! Synchronous per-field rules and the availability check used by the
//! signup form. Rules return the user-facing message, or `None` when the
//! value is acceptable.

use tracing::warn;

use crate::domain::value_objects::{FieldErrors, FieldName, FormType, FormValues};
use crate::ports::outbound::{Availability, AvailabilityChecker};

pub const DIFFICULTIES: [&str; 5] = ["Easy", "Normal", "A Bit Difficult", "Difficult", "Very Difficult"];
pub const MAX_TEXT_LENGTH: usize = 500;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const USERNAME_LENGTH: std::ops::RangeInclusive<usize> = 3..=25;

const PUNCTUATION: &str = " ,.'-";

/// Synchronous error for `field` (or entry `index` of a list field)
pub fn sync_validate(
    form_type: FormType,
    field: FieldName,
    values: &FormValues,
    index: Option<usize>,
) -> Option<String> {
    form_type.kind().validate(field, values, index)
}

/// Fields whose value must be checked against the server
pub fn needs_async_check(form_type: FormType, field: FieldName) -> bool {
    form_type.kind().async_fields().contains(&field)
}

/// Remote availability check. Resolves when the value can be used and
/// rejects with a single-entry error map otherwise.
pub async fn async_validate(
    checker: &dyn AvailabilityChecker,
    form_type: FormType,
    field: FieldName,
    value: &str,
) -> Result<(), FieldErrors> {
    if !needs_async_check(form_type, field) {
        return Ok(());
    }

    match checker.check(field, value).await {
        Ok(Availability::Available) => Ok(()),
        Ok(Availability::Taken { message }) => {
            let message = message.unwrap_or_else(|| format!("{} already exists", field.label()));
            Err(FieldErrors::from([(field, message)]))
        }
        Err(err) => {
            warn!(%field, error = %err, "availability check failed");
            Err(FieldErrors::from([(
                field,
                format!("Unable to verify {}, please try again", field.label().to_lowercase()),
            )]))
        }
    }
}

// =============================================================================
// Rules
// =============================================================================

pub fn required(value: &str, field: FieldName) -> Option<String> {
    value.trim().is_empty().then(|| format!("{} is required", field.label()))
}

pub fn email(value: &str) -> Option<String> {
    (!is_valid_email(value.trim())).then(|| "Please enter a valid email address".to_string())
}

/// Letters, spaces and `,.'-`
pub fn letters(value: &str, field: FieldName) -> Option<String> {
    let ok = value.chars().all(|c| c.is_alphabetic() || PUNCTUATION.contains(c));
    (!ok).then(|| format!("{} can only contain letters and the characters (,.'-)", field.label()))
}

/// List entries also allow quantities ("2 cups of beans")
pub fn entry_text(value: &str, field: FieldName) -> Option<String> {
    let ok = value.chars().all(|c| c.is_alphanumeric() || PUNCTUATION.contains(c));
    (!ok).then(|| format!("{} can only contain letters and the characters (,.'-)", field.label()))
}

pub fn alphanumeric(value: &str, field: FieldName) -> Option<String> {
    let ok = value.chars().all(|c| c.is_alphanumeric() || c == ' ');
    (!ok).then(|| format!("{} can only contain letters and numbers", field.label()))
}

pub fn username(value: &str) -> Option<String> {
    let len = value.chars().count();
    if !USERNAME_LENGTH.contains(&len) {
        return Some(format!(
            "Username must be between {} and {} characters",
            USERNAME_LENGTH.start(),
            USERNAME_LENGTH.end()
        ));
    }
    let ok = value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    (!ok).then(|| "Username can only contain letters, numbers and the underscore character".to_string())
}

pub fn min_length(value: &str, field: FieldName, min: usize) -> Option<String> {
    (value.chars().count() < min).then(|| format!("{} must be at least {} characters long", field.label(), min))
}

pub fn max_length(value: &str, field: FieldName, max: usize) -> Option<String> {
    (value.chars().count() > max).then(|| format!("{} must not exceed {} characters", field.label(), max))
}

pub fn matches(value: &str, other: &str) -> Option<String> {
    (value != other).then(|| "Passwords do not match".to_string())
}

pub fn one_of(value: &str, options: &[&str]) -> Option<String> {
    (!options.contains(&value)).then(|| "Please select a valid field".to_string())
}

pub fn rating(value: Option<i64>) -> Option<String> {
    match value {
        None | Some(0) => Some("Rating is required".to_string()),
        Some(n) if !(1..=5).contains(&n) => Some("Rating must be between 1 and 5".to_string()),
        Some(_) => None,
    }
}

fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
