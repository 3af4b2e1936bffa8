//! Catalog domain model.
//!
//! # Responsibility
//! - Define live records (authors, books, links) and their archived copies.
//! - Own input normalization and field validation rules.
//!
//! # Invariants
//! - Live and archived records never share identifiers.
//! - Natural keys are normalized before they are stored or looked up.

pub mod archive;
pub mod author;
pub mod book;
pub mod validation;

use serde::{Deserialize, Deserializer};

/// Deserializes a nullable patch field with presence semantics.
///
/// Missing field -> `None` (via `#[serde(default)]`), explicit `null` ->
/// `Some(None)`, value -> `Some(Some(value))`.
pub(crate) fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
