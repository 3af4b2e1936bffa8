//! Field validation and natural-key normalization.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Input rejected before reaching storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text field is empty after trim.
    Blank { field: &'static str },
    /// Text field is shorter than allowed.
    TooShort { field: &'static str, min: usize },
    /// Text field is longer than allowed.
    TooLong { field: &'static str, max: usize },
    /// Numeric field must be zero or greater.
    Negative { field: &'static str, value: i64 },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blank { field } => write!(f, "`{field}` must not be blank"),
            Self::TooShort { field, min } => {
                write!(f, "`{field}` must have at least {min} characters")
            }
            Self::TooLong { field, max } => {
                write!(f, "`{field}` must have at most {max} characters")
            }
            Self::Negative { field, value } => {
                write!(f, "`{field}` must not be negative, got {value}")
            }
        }
    }
}

impl Error for ValidationError {}

/// Trims a natural key and collapses inner whitespace runs to one space.
///
/// Applied to author names, book titles and ISBNs on both write and lookup,
/// so `"Jorge  Luis Borges "` and `"Jorge Luis Borges"` address one row.
pub fn normalize_key(value: &str) -> String {
    WHITESPACE_RE.replace_all(value.trim(), " ").into_owned()
}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Blank { field });
    }
    Ok(())
}

pub(crate) fn check_length(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), ValidationError> {
    let count = value.chars().count();
    if count < min {
        return Err(ValidationError::TooShort { field, min });
    }
    if count > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

pub(crate) fn check_non_negative(field: &'static str, value: i64) -> Result<(), ValidationError> {
    if value < 0 {
        return Err(ValidationError::Negative { field, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{check_length, normalize_key, ValidationError};

    #[test]
    fn normalize_key_trims_and_collapses_whitespace() {
        assert_eq!(normalize_key("  Jorge \t Luis\nBorges "), "Jorge Luis Borges");
        assert_eq!(normalize_key("978-0-00"), "978-0-00");
    }

    #[test]
    fn check_length_counts_chars_not_bytes() {
        assert!(check_length("name", "Ñu", 2, 50).is_ok());
        assert_eq!(
            check_length("name", "J", 2, 50),
            Err(ValidationError::TooShort {
                field: "name",
                min: 2
            })
        );
    }
}
