//! The in-memory catalog and its file-backed store.
//!
//! The catalog is always read from and rewritten to its backing store as a
//! single unit; there are no partial writes. Two overlapping writers are
//! not excluded (last full rewrite wins); single-operator usage is
//! assumed.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::fs;

use crate::domain::{Book, BookPatch};

/// Errors from the persistence collaborator. Fatal to the in-progress
/// operation; nothing is partially committed.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from catalog operations addressed at a single book
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("no book with id {0}")]
    NotFound(u64),
}

/// Whole-file persistence collaborator for the catalog
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Load the full ordered set of book records
    async fn load(&self) -> Result<Vec<Book>, StoreError>;

    /// Replace the full set of book records
    async fn replace(&self, books: &[Book]) -> Result<(), StoreError>;
}

/// JSON-file implementation of the catalog store.
///
/// A missing or empty file loads as an empty catalog.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store backed by the given file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path to the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CatalogStore for JsonFileStore {
    async fn load(&self) -> Result<Vec<Book>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path).await?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        Ok(serde_json::from_str(&content)?)
    }

    async fn replace(&self, books: &[Book]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(books)?;
        fs::write(&self.path, content).await?;

        Ok(())
    }
}

/// The full ordered collection of book records
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// All records, in storage order
    pub books: Vec<Book>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self { books: Vec::new() }
    }

    /// Wrap an ordered set of records loaded from a store
    pub fn from_books(books: Vec<Book>) -> Self {
        Self { books }
    }

    /// Get a book by local id
    pub fn get(&self, id: u64) -> Option<&Book> {
        self.books.iter().find(|b| b.id == id)
    }

    /// Get a mutable book by local id
    pub fn get_mut(&mut self, id: u64) -> Option<&mut Book> {
        self.books.iter_mut().find(|b| b.id == id)
    }

    /// Find the book carrying an external identifier (exact match)
    pub fn find_by_external_id(&self, external_id: &str) -> Option<&Book> {
        self.books
            .iter()
            .find(|b| b.external_id.as_deref() == Some(external_id))
    }

    /// Apply a user-originated partial update to a book.
    ///
    /// Returns the updated book, or `NotFound` leaving the catalog
    /// unchanged.
    pub fn update(&mut self, id: u64, patch: &BookPatch) -> Result<&Book, CatalogError> {
        let book = self.get_mut(id).ok_or(CatalogError::NotFound(id))?;
        book.apply_patch(patch);
        Ok(book)
    }

    /// Remove a book by local id, returning it
    pub fn remove(&mut self, id: u64) -> Result<Book, CatalogError> {
        let position = self
            .books
            .iter()
            .position(|b| b.id == id)
            .ok_or(CatalogError::NotFound(id))?;
        Ok(self.books.remove(position))
    }

    /// Append a new record at the end of the catalog
    pub fn push(&mut self, book: Book) {
        self.books.push(book);
    }

    /// The next free local id: `max(existing) + 1`, or 1 for an empty
    /// catalog
    pub fn next_free_id(&self) -> u64 {
        self.books.iter().map(|b| b.id).max().map_or(1, |max| max + 1)
    }

    /// Number of records in the catalog
    pub fn len(&self) -> usize {
        self.books.len()
    }

    /// True when the catalog holds no records
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}
