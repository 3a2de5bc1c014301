//! Catalog storage and querying.
//!
//! The catalog is the full ordered collection of book records, persisted
//! as a single JSON file and always rewritten whole.
//!
//! # Storage Layout
//!
//! ```text
//! ~/.shelfmark/
//! └── books.json        # JSON array of book records, in catalog order
//! ```

pub mod filter;
pub mod store;

pub use filter::BookFilter;
pub use store::{Catalog, CatalogError, CatalogStore, JsonFileStore, StoreError};
