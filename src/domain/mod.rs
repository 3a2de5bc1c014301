//! Data structures shared across the catalog and reconciliation layers.

pub mod book;

pub use book::{Book, BookPatch};
