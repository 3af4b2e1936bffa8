//! Live author records and author request shapes.
//!
//! # Invariants
//! - `name` is the natural key and is unique among live authors.
//! - `id` is assigned by storage and never reused.

use crate::model::deserialize_present;
use crate::model::validation::{check_length, normalize_key, require_text, ValidationError};
use serde::{Deserialize, Serialize};

/// Surrogate identifier of a live author.
pub type AuthorId = i64;

/// Description stored when a create request omits one.
pub const DEFAULT_AUTHOR_DESCRIPTION: &str = "Little is known about this author yet";

const NAME_MIN_CHARS: usize = 2;
const NAME_MAX_CHARS: usize = 50;
const DESCRIPTION_MIN_CHARS: usize = 2;
const DESCRIPTION_MAX_CHARS: usize = 200;
const DEATH_YEAR_MAX_CHARS: usize = 50;

/// Scalar author fields shared by live and archived records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorFields {
    /// Full name; natural key.
    pub name: String,
    /// Country of origin.
    pub country: String,
    pub description: String,
    /// Free text, usually a four-digit year.
    pub birth_year: String,
    /// `None` while the author is alive or the year is unknown.
    pub death_year: Option<String>,
}

impl AuthorFields {
    /// Checks field-level rules.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        check_length("name", &self.name, NAME_MIN_CHARS, NAME_MAX_CHARS)?;
        require_text("country", &self.country)?;
        check_length(
            "description",
            &self.description,
            DESCRIPTION_MIN_CHARS,
            DESCRIPTION_MAX_CHARS,
        )?;
        require_text("birth_year", &self.birth_year)?;
        if let Some(death_year) = self.death_year.as_deref() {
            check_length("death_year", death_year, 0, DEATH_YEAR_MAX_CHARS)?;
        }
        Ok(())
    }
}

/// Live catalog author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: AuthorId,
    #[serde(flatten)]
    pub fields: AuthorFields,
}

/// Create request for one author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAuthor {
    pub name: String,
    pub country: String,
    /// Falls back to [`DEFAULT_AUTHOR_DESCRIPTION`].
    #[serde(default)]
    pub description: Option<String>,
    pub birth_year: String,
    #[serde(default)]
    pub death_year: Option<String>,
}

impl NewAuthor {
    pub fn new(
        name: impl Into<String>,
        country: impl Into<String>,
        birth_year: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            country: country.into(),
            description: None,
            birth_year: birth_year.into(),
            death_year: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_death_year(mut self, death_year: impl Into<String>) -> Self {
        self.death_year = Some(death_year.into());
        self
    }

    /// Normalizes the request into storable fields.
    ///
    /// # Errors
    /// - Returns the first failing field rule.
    pub fn into_fields(self) -> Result<AuthorFields, ValidationError> {
        let fields = AuthorFields {
            name: normalize_key(&self.name),
            country: self.country.trim().to_string(),
            description: self
                .description
                .map(|value| value.trim().to_string())
                .unwrap_or_else(|| DEFAULT_AUTHOR_DESCRIPTION.to_string()),
            birth_year: self.birth_year.trim().to_string(),
            death_year: self.death_year.map(|value| value.trim().to_string()),
        };
        fields.validate()?;
        Ok(fields)
    }
}

/// Partial update for one author.
///
/// Only fields that are present are written. An explicit empty string is a
/// real value, and `death_year: Some(None)` clears the column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub death_year: Option<Option<String>>,
}

impl AuthorPatch {
    /// Returns `true` when no field is present.
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.death_year.is_none()
    }

    /// Writes present fields onto `fields`.
    pub fn apply_to(&self, fields: &mut AuthorFields) {
        if let Some(description) = self.description.as_ref() {
            fields.description = description.trim().to_string();
        }
        if let Some(death_year) = self.death_year.as_ref() {
            fields.death_year = death_year.as_ref().map(|value| value.trim().to_string());
        }
    }
}

/// Short author view embedded in book details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub name: String,
    pub country: String,
}

impl From<&Author> for AuthorSummary {
    fn from(author: &Author) -> Self {
        Self {
            name: author.fields.name.clone(),
            country: author.fields.country.clone(),
        }
    }
}

/// Filter for author listings, live or archived.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorListQuery {
    /// Exact country match.
    pub country: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{AuthorPatch, NewAuthor, DEFAULT_AUTHOR_DESCRIPTION};
    use crate::model::validation::ValidationError;

    #[test]
    fn into_fields_applies_defaults_and_normalizes_name() {
        let fields = NewAuthor::new("  Jorge   Luis Borges", "Argentina", "1899")
            .into_fields()
            .unwrap();
        assert_eq!(fields.name, "Jorge Luis Borges");
        assert_eq!(fields.description, DEFAULT_AUTHOR_DESCRIPTION);
        assert_eq!(fields.death_year, None);
    }

    #[test]
    fn into_fields_rejects_short_name_and_long_description() {
        let short = NewAuthor::new("J", "Argentina", "1899").into_fields();
        assert!(matches!(
            short,
            Err(ValidationError::TooShort { field: "name", .. })
        ));

        let long = NewAuthor::new("Jorge Luis Borges", "Argentina", "1899")
            .with_description("x".repeat(201))
            .into_fields();
        assert!(matches!(
            long,
            Err(ValidationError::TooLong {
                field: "description",
                ..
            })
        ));
    }

    #[test]
    fn patch_distinguishes_missing_null_and_value() {
        let missing: AuthorPatch = serde_json::from_str("{}").unwrap();
        assert!(missing.is_empty());

        let cleared: AuthorPatch = serde_json::from_str(r#"{"death_year": null}"#).unwrap();
        assert_eq!(cleared.death_year, Some(None));

        let empty: AuthorPatch = serde_json::from_str(r#"{"death_year": ""}"#).unwrap();
        assert_eq!(empty.death_year, Some(Some(String::new())));
    }

    #[test]
    fn patch_apply_only_touches_present_fields() {
        let mut fields = NewAuthor::new("Jorge Luis Borges", "Argentina", "1899")
            .with_description("Poet")
            .with_death_year("1986")
            .into_fields()
            .unwrap();

        AuthorPatch {
            description: None,
            death_year: Some(None),
        }
        .apply_to(&mut fields);

        assert_eq!(fields.description, "Poet");
        assert_eq!(fields.death_year, None);
    }
}
