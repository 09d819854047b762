use serde::{Deserialize, Deserializer};
use thiserror::Error;

use super::url_validator::validate_url;

/// Input that failed shape or constraint checks.
///
/// Raised before any storage access is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required text field is empty or whitespace-only.
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    /// A URL field does not hold a well-formed http(s) URL.
    #[error("{field} is not a valid URL: {reason}")]
    InvalidUrl { field: &'static str, reason: String },

    /// A numeric field is below its lower bound.
    #[error("{field} must be at least {min}, got {value}")]
    TooSmall {
        field: &'static str,
        min: i64,
        value: i64,
    },

    /// The payload could not be decoded into the expected shape
    /// (missing field, wrong type, unknown enum member, bad date).
    #[error("malformed input: {0}")]
    Malformed(String),
}

/// Constraint checks for an input payload.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(())
}

pub(crate) fn require_url(field: &'static str, value: &str) -> Result<(), ValidationError> {
    require_text(field, value)?;
    validate_url(value).map_err(|e| ValidationError::InvalidUrl {
        field,
        reason: e.to_string(),
    })?;
    Ok(())
}

pub(crate) fn require_at_least(
    field: &'static str,
    value: i64,
    min: i64,
) -> Result<(), ValidationError> {
    if value < min {
        return Err(ValidationError::TooSmall { field, min, value });
    }
    Ok(())
}

/// Deserializes a field that distinguishes "absent" from "explicitly null".
///
/// Used with `#[serde(default)]`: a missing key stays `None`, `null` becomes
/// `Some(None)` and a value becomes `Some(Some(v))`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_require_text() {
        assert!(require_text("title", "Road closures").is_ok());
        assert_eq!(
            require_text("title", ""),
            Err(ValidationError::Empty { field: "title" })
        );
        assert_eq!(
            require_text("slug", " \t\n"),
            Err(ValidationError::Empty { field: "slug" })
        );
    }

    #[test]
    fn test_require_url_reports_field() {
        let err = require_url("image_url", "not-a-url").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidUrl { field: "image_url", .. }));
        assert!(err.to_string().starts_with("image_url is not a valid URL"));
    }

    #[test]
    fn test_require_url_empty_is_empty_error() {
        assert_eq!(
            require_url("image_url", ""),
            Err(ValidationError::Empty { field: "image_url" })
        );
    }

    #[test]
    fn test_require_at_least() {
        assert!(require_at_least("limit", 1, 1).is_ok());
        assert_eq!(
            require_at_least("limit", 0, 1),
            Err(ValidationError::TooSmall {
                field: "limit",
                min: 1,
                value: 0
            })
        );
    }

    proptest! {
        #[test]
        fn whitespace_only_text_is_rejected(s in "[ \t\r\n]{0,16}") {
            prop_assert!(require_text("title", &s).is_err());
        }

        #[test]
        fn text_with_a_visible_char_is_accepted(
            pad in "[ \t]{0,4}",
            word in "[A-Za-z0-9]{1,12}",
        ) {
            let value = format!("{pad}{word}{pad}");
            prop_assert!(require_text("title", &value).is_ok());
        }
    }
}
