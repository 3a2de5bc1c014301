//! Normalization of provider-shaped volume records.
//!
//! The search provider returns loosely populated volume documents; any of
//! the nested metadata fields may be absent. Normalization converts one
//! volume into the catalog's record shape, requiring only the provider id
//! and the title.

use serde::Deserialize;
use thiserror::Error;

use crate::domain::Book;

/// A volume the normalizer cannot accept
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("volume record has no provider id")]
    MissingId,

    #[error("volume {id} has no title")]
    MissingTitle { id: String },
}

/// One volume as it appears in the provider's search response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeRecord {
    /// Identifier in the provider's namespace
    #[serde(default)]
    pub id: Option<String>,

    /// Nested volume metadata
    #[serde(default)]
    pub volume_info: VolumeInfo,
}

/// Nested metadata of a volume; every field may be absent
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub authors: Option<Vec<String>>,

    /// Full or partial publication date, e.g. `2005-06-23` or `2005`
    #[serde(default)]
    pub published_date: Option<String>,

    #[serde(default)]
    pub image_links: Option<ImageLinks>,
}

/// Cover image links of a volume
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageLinks {
    #[serde(default)]
    pub small_thumbnail: Option<String>,
}

/// A provider record converted to the catalog's shape, before a local id
/// is assigned
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedBook {
    pub external_id: String,
    pub title: String,
    pub authors: Option<Vec<String>>,
    pub published_year: Option<String>,
    pub thumbnail: Option<String>,
}

impl NormalizedBook {
    /// Overwrite a record's provider-known fields with this normalized
    /// state, including overwriting with absent values. The local id and
    /// the acquired flag are never touched.
    pub fn apply_to(&self, book: &mut Book) {
        book.external_id = Some(self.external_id.clone());
        book.title = self.title.clone();
        book.authors = self.authors.clone();
        book.published_year = self.published_year.clone();
        book.thumbnail = self.thumbnail.clone();
    }

    /// Materialize a new record under a freshly assigned local id.
    /// Records created this way always start unacquired.
    pub fn into_book(self, id: u64) -> Book {
        Book {
            id,
            external_id: Some(self.external_id),
            title: self.title,
            authors: self.authors,
            published_year: self.published_year,
            acquired: false,
            thumbnail: self.thumbnail,
        }
    }
}

/// Convert one provider volume into the catalog's record shape.
///
/// The provider id and title are required; `authors`, `published_date`
/// and the thumbnail are each independently optional and map to absent
/// attributes when missing.
pub fn normalize(record: &VolumeRecord) -> Result<NormalizedBook, NormalizeError> {
    let external_id = record.id.clone().ok_or(NormalizeError::MissingId)?;
    let title = record
        .volume_info
        .title
        .clone()
        .ok_or_else(|| NormalizeError::MissingTitle {
            id: external_id.clone(),
        })?;

    Ok(NormalizedBook {
        external_id,
        title,
        authors: record.volume_info.authors.clone(),
        published_year: record
            .volume_info
            .published_date
            .as_deref()
            .map(extract_year),
        thumbnail: record
            .volume_info
            .image_links
            .as_ref()
            .and_then(|links| links.small_thumbnail.clone()),
    })
}

/// Year component of a date string: the text before the first `-`
fn extract_year(date: &str) -> String {
    match date.split_once('-') {
        Some((year, _)) => year.to_string(),
        None => date.to_string(),
    }
}
