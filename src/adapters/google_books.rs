//! Google Books volumes API client.
//!
//! Builds the `q=` search expression from structured terms and returns
//! the provider-shaped volume batch for the reconciliation engine. Query
//! construction and transport live here; the per-record normalization
//! contract lives in `reconcile::normalize`.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::config::ProviderSettings;
use crate::reconcile::normalize::VolumeRecord;

/// Search terms recognized by the provider query grammar
#[derive(Debug, Clone, Default)]
pub struct SearchTerms {
    /// Restricts matches to volume titles (`intitle:`)
    pub title: Option<String>,

    /// Restricts matches to volume authors (`inauthor:`)
    pub author: Option<String>,

    /// Generic terms, matched anywhere in the volume
    pub terms: Vec<String>,
}

impl SearchTerms {
    /// True when no term of any kind is present
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.terms.is_empty()
    }
}

/// Envelope of the volumes search response
#[derive(Debug, Deserialize)]
struct VolumesResponse {
    /// Absent entirely when the search matched nothing
    #[serde(default)]
    items: Option<Vec<VolumeRecord>>,
}

/// Client for the provider's volumes search endpoint
pub struct GoogleBooksClient {
    base_url: String,
    client: reqwest::Client,
}

impl GoogleBooksClient {
    /// Create a client against the given volumes endpoint
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a client from provider settings
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: settings.base_url.clone(),
            client,
        })
    }

    /// Build the search URL for a set of terms.
    ///
    /// Generic terms lead the expression, field-scoped terms follow, all
    /// `+`-joined and capitalized.
    fn search_url(&self, terms: &SearchTerms) -> String {
        let mut parts: Vec<String> = terms.terms.iter().map(|t| capitalize(t)).collect();

        if let Some(title) = &terms.title {
            parts.push(format!("intitle:{}", capitalize(title)));
        }
        if let Some(author) = &terms.author {
            parts.push(format!("inauthor:{}", capitalize(author)));
        }

        format!("{}?q={}", self.base_url, parts.join("+"))
    }

    /// Run a volumes search and return the raw record batch.
    ///
    /// A response without an `items` key is an empty batch, not an error.
    pub async fn search(&self, terms: &SearchTerms) -> Result<Vec<VolumeRecord>> {
        let url = self.search_url(terms);
        tracing::debug!(%url, "querying books provider");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to reach the books provider")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("Books provider error ({}): {}", status, text);
        }

        let volumes: VolumesResponse = response
            .json()
            .await
            .context("Failed to parse the books provider response")?;

        Ok(volumes.items.unwrap_or_default())
    }
}

/// Capitalize a query term: first character uppercased, the rest lowered
fn capitalize(term: &str) -> String {
    let mut chars = term.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}
