//! Field validators shared by resource models.
//!
//! Used with `#[validate(custom(function = "..."))]`.

use secrecy::ExposeSecret;
use std::borrow::Cow;
use url::Url;
use validator::ValidationError;

use crate::sensitive::SensitiveValue;

/// Reject empty or whitespace-only text.
///
/// # Errors
///
/// Returns a `required` validation error.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(required("must not be blank"));
    }
    Ok(())
}

/// Reject a sensitive value that holds no secret.
///
/// A value decoded from the server carries only `HasValue` and passes; a new value
/// set by the caller must not be blank.
///
/// # Errors
///
/// Returns a `required` validation error.
pub fn has_secret(value: &SensitiveValue) -> Result<(), ValidationError> {
    let blank = value
        .new_value()
        .is_some_and(|secret| secret.expose_secret().trim().is_empty());
    if !value.has_value() || blank {
        return Err(required("a secret value is required"));
    }
    Ok(())
}

/// Reject text that is not an absolute URL.
///
/// # Errors
///
/// Returns a `url` validation error.
pub fn absolute_url(value: &str) -> Result<(), ValidationError> {
    not_blank(value)?;
    Url::parse(value).map(drop).map_err(|err| {
        let mut error = ValidationError::new("url");
        error.message = Some(Cow::Owned(err.to_string()));
        error
    })
}

fn required(message: &'static str) -> ValidationError {
    let mut error = ValidationError::new("required");
    error.message = Some(Cow::Borrowed(message));
    error
}
