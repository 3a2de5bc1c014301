//! Book records and partial-update documents.
//!
//! A `Book` is the catalog's unit of storage. Records enter the catalog
//! through reconciliation against the external provider and are mutated
//! by user-issued partial updates (`BookPatch`) or by re-imports.

use serde::{Deserialize, Serialize};

/// A single book record in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Local identifier: unique, stable once assigned, never reused
    pub id: u64,

    /// Identifier in the external provider's namespace. Used solely for
    /// deduplication during reconciliation; records without one never
    /// participate in dedup matching.
    pub external_id: Option<String>,

    /// Book title
    pub title: String,

    /// Authors in the order the provider lists them (None when unknown)
    pub authors: Option<Vec<String>>,

    /// Publication year, kept as text to tolerate partial dates and
    /// unknowns
    pub published_year: Option<String>,

    /// Whether the book is owned locally. Never supplied by the provider;
    /// reconciliation leaves it untouched on update.
    #[serde(default)]
    pub acquired: bool,

    /// Cover thumbnail URL
    pub thumbnail: Option<String>,
}

impl Book {
    /// Apply a user-originated partial update: each present field
    /// overwrites the record verbatim, absent fields are left untouched.
    pub fn apply_patch(&mut self, patch: &BookPatch) {
        if let Some(external_id) = &patch.external_id {
            self.external_id = Some(external_id.clone());
        }
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(authors) = &patch.authors {
            self.authors = Some(authors.clone());
        }
        if let Some(published_year) = &patch.published_year {
            self.published_year = Some(published_year.clone());
        }
        if let Some(acquired) = patch.acquired {
            self.acquired = acquired;
        }
        if let Some(thumbnail) = &patch.thumbnail {
            self.thumbnail = Some(thumbnail.clone());
        }
    }
}

/// A user-originated partial update: a mapping from field name to new
/// value. Fields absent from the document leave the record unchanged.
/// The local id is not updatable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_year: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acquired: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl BookPatch {
    /// True when the document carries no fields at all
    pub fn is_empty(&self) -> bool {
        self.external_id.is_none()
            && self.title.is_none()
            && self.authors.is_none()
            && self.published_year.is_none()
            && self.acquired.is_none()
            && self.thumbnail.is_none()
    }
}
