//! Identity resolution for externally-sourced records.
//!
//! Maps a record's external identifier to an existing local id, or
//! allocates the next free one. The resolver is seeded from the catalog
//! once per batch and threaded through it sequentially, so a record
//! inserted earlier in a batch is visible to every later dedup check.

use std::collections::HashMap;

use crate::domain::Book;

/// Outcome of resolving one external identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// An existing record already carries this external id
    Existing(u64),

    /// The external id was unknown; a fresh local id has been allocated
    /// and registered for it
    New(u64),
}

/// Allocates local ids and tracks which external ids are already known
#[derive(Debug)]
pub struct IdentityResolver {
    known: HashMap<String, u64>,
    next_id: u64,
}

impl IdentityResolver {
    /// Seed the resolver from the current catalog: external ids of
    /// existing records, and `max(local_id) + 1` (1 for an empty catalog)
    /// as the next allocation.
    pub fn from_catalog(books: &[Book]) -> Self {
        let known = books
            .iter()
            .filter_map(|book| book.external_id.clone().map(|ext| (ext, book.id)))
            .collect();
        let next_id = books.iter().map(|b| b.id).max().map_or(1, |max| max + 1);

        Self { known, next_id }
    }

    /// Resolve one external identifier (exact equality only).
    ///
    /// A miss allocates the next local id, registers the external id so
    /// later records of the same batch match it, and returns `New`.
    pub fn resolve(&mut self, external_id: &str) -> Resolution {
        if let Some(&id) = self.known.get(external_id) {
            return Resolution::Existing(id);
        }

        let id = self.next_id;
        self.next_id += 1;
        self.known.insert(external_id.to_string(), id);
        Resolution::New(id)
    }
}
