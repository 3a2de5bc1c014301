//! Reconciliation Integration Tests
//!
//! Batch imports against a file-backed store: dedup, identity stability,
//! the acquired default, and failure behavior partway through a batch.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::json;
use tempfile::TempDir;

use shelfmark::catalog::{CatalogStore, JsonFileStore, StoreError};
use shelfmark::domain::{Book, BookPatch};
use shelfmark::reconcile::{Reconciler, VolumeRecord};
use shelfmark::Catalog;

fn volume(value: serde_json::Value) -> VolumeRecord {
    serde_json::from_value(value).unwrap()
}

fn sample_batch() -> Vec<VolumeRecord> {
    vec![
        volume(json!({
            "id": "ext-a",
            "volumeInfo": {
                "title": "A Wizard of Earthsea",
                "authors": ["Ursula K. Le Guin"],
                "publishedDate": "1968",
            }
        })),
        volume(json!({
            "id": "ext-b",
            "volumeInfo": {
                "title": "The Tombs of Atuan",
                "authors": ["Ursula K. Le Guin"],
                "publishedDate": "1971-06",
            }
        })),
    ]
}

#[tokio::test]
async fn test_import_inserts_new_records_in_batch_order() {
    let temp = TempDir::new().unwrap();
    let store = JsonFileStore::new(temp.path().join("books.json"));
    let reconciler = Reconciler::new(&store);

    let report = reconciler.import_batch(&sample_batch()).await.unwrap();

    assert_eq!(report.added, 2);
    assert_eq!(report.updated, 0);
    assert!(report.skipped.is_empty());

    let books = store.load().await.unwrap();
    assert_eq!(books.len(), 2);
    assert_eq!(books[0].id, 1);
    assert_eq!(books[0].external_id.as_deref(), Some("ext-a"));
    assert_eq!(books[1].id, 2);
    assert_eq!(books[1].published_year.as_deref(), Some("1971"));
}

#[tokio::test]
async fn test_reimport_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let store = JsonFileStore::new(temp.path().join("books.json"));
    let reconciler = Reconciler::new(&store);

    reconciler.import_batch(&sample_batch()).await.unwrap();
    let first = store.load().await.unwrap();

    let report = reconciler.import_batch(&sample_batch()).await.unwrap();
    let second = store.load().await.unwrap();

    assert_eq!(report.added, 0);
    assert_eq!(report.updated, 2);
    assert_eq!(second.len(), first.len());
    assert_eq!(second, first);
}

#[tokio::test]
async fn test_intra_batch_duplicates_collapse_to_one_record() {
    let temp = TempDir::new().unwrap();
    let store = JsonFileStore::new(temp.path().join("books.json"));
    let reconciler = Reconciler::new(&store);

    let batch = vec![
        volume(json!({
            "id": "dup",
            "volumeInfo": {"title": "First Edition", "publishedDate": "1990"}
        })),
        volume(json!({
            "id": "dup",
            "volumeInfo": {"title": "Second Edition", "publishedDate": "1995"}
        })),
    ];

    let report = reconciler.import_batch(&batch).await.unwrap();

    assert_eq!(report.added, 1);
    assert_eq!(report.updated, 1);

    let books = store.load().await.unwrap();
    assert_eq!(books.len(), 1);
    // Both updates applied in batch order: the later record wins
    assert_eq!(books[0].title, "Second Edition");
    assert_eq!(books[0].published_year.as_deref(), Some("1995"));
}

#[tokio::test]
async fn test_imported_records_start_unacquired() {
    let temp = TempDir::new().unwrap();
    let store = JsonFileStore::new(temp.path().join("books.json"));
    let reconciler = Reconciler::new(&store);

    // An acquired-like field in the payload must be ignored
    let batch = vec![volume(json!({
        "id": "ext-a",
        "volumeInfo": {"title": "Owned Elsewhere", "acquired": true}
    }))];

    reconciler.import_batch(&batch).await.unwrap();

    let books = store.load().await.unwrap();
    assert!(!books[0].acquired);
}

#[tokio::test]
async fn test_reimport_refreshes_fields_but_not_acquired() {
    let temp = TempDir::new().unwrap();
    let store = JsonFileStore::new(temp.path().join("books.json"));
    let reconciler = Reconciler::new(&store);

    reconciler.import_batch(&sample_batch()).await.unwrap();

    // User marks the first book as owned and renames it
    let mut catalog = Catalog::from_books(store.load().await.unwrap());
    catalog
        .update(
            1,
            &BookPatch {
                title: Some("My Copy".to_string()),
                acquired: Some(true),
                ..Default::default()
            },
        )
        .unwrap();
    store.replace(&catalog.books).await.unwrap();

    // A refresh is authoritative for provider fields, never for acquired
    reconciler.import_batch(&sample_batch()).await.unwrap();

    let books = store.load().await.unwrap();
    assert_eq!(books[0].title, "A Wizard of Earthsea");
    assert!(books[0].acquired);
}

#[tokio::test]
async fn test_local_ids_are_never_reused_after_deletion() {
    let temp = TempDir::new().unwrap();
    let store = JsonFileStore::new(temp.path().join("books.json"));
    let reconciler = Reconciler::new(&store);

    reconciler.import_batch(&sample_batch()).await.unwrap();

    // Delete the first record (id 1)
    let mut catalog = Catalog::from_books(store.load().await.unwrap());
    catalog.remove(1).unwrap();
    store.replace(&catalog.books).await.unwrap();

    // Its external id is gone from the catalog, so the volume re-imports
    // as a new record under a fresh id
    let batch = vec![volume(json!({
        "id": "ext-a",
        "volumeInfo": {"title": "A Wizard of Earthsea"}
    }))];
    reconciler.import_batch(&batch).await.unwrap();

    let books = store.load().await.unwrap();
    let ids: Vec<u64> = books.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![2, 3]);
}

#[tokio::test]
async fn test_malformed_records_are_skipped_not_fatal() {
    let temp = TempDir::new().unwrap();
    let store = JsonFileStore::new(temp.path().join("books.json"));
    let reconciler = Reconciler::new(&store);

    let batch = vec![
        volume(json!({
            "id": "good-1",
            "volumeInfo": {"title": "Kept"}
        })),
        // No title
        volume(json!({
            "id": "bad",
            "volumeInfo": {"authors": ["Anonymous"]}
        })),
        // No provider id
        volume(json!({
            "volumeInfo": {"title": "Orphan"}
        })),
        volume(json!({
            "id": "good-2",
            "volumeInfo": {"title": "Also Kept"}
        })),
    ];

    let report = reconciler.import_batch(&batch).await.unwrap();

    assert_eq!(report.added, 2);
    assert_eq!(report.skipped.len(), 2);
    assert_eq!(report.skipped[0].index, 1);
    assert_eq!(report.skipped[1].index, 2);

    let books = store.load().await.unwrap();
    let ids: Vec<u64> = books.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

/// Store double that starts failing after a fixed number of rewrites
struct FlakyStore {
    inner: JsonFileStore,
    rewrites_allowed: usize,
    rewrites: AtomicUsize,
}

#[async_trait]
impl CatalogStore for FlakyStore {
    async fn load(&self) -> Result<Vec<Book>, StoreError> {
        self.inner.load().await
    }

    async fn replace(&self, books: &[Book]) -> Result<(), StoreError> {
        let seen = self.rewrites.fetch_add(1, Ordering::SeqCst);
        if seen >= self.rewrites_allowed {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "store offline",
            )));
        }
        self.inner.replace(books).await
    }
}

#[tokio::test]
async fn test_store_failure_aborts_batch_but_keeps_prior_effects() {
    let temp = TempDir::new().unwrap();
    let store = FlakyStore {
        inner: JsonFileStore::new(temp.path().join("books.json")),
        rewrites_allowed: 1,
        rewrites: AtomicUsize::new(0),
    };
    let reconciler = Reconciler::new(&store);

    let result = reconciler.import_batch(&sample_batch()).await;
    assert!(result.is_err());

    // The catalog is rewritten once per processed record: the first
    // record's insert survived, the second never landed
    let books = store.inner.load().await.unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].external_id.as_deref(), Some("ext-a"));
}
