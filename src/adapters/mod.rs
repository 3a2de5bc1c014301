//! Adapter interfaces for external systems.
//!
//! The only external collaborator besides the catalog store is the
//! bibliographic search provider.

pub mod google_books;

pub use google_books::{GoogleBooksClient, SearchTerms};
