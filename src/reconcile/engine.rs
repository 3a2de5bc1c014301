//! Reconciliation of provider batches into the catalog.
//!
//! Each batch record is normalized and resolved against the catalog:
//! known external ids update the existing record in place, unknown ones
//! insert a new record under a fresh local id. The catalog is rewritten
//! through the store after every processed record, so a failure partway
//! through a batch leaves the already-processed effects persisted.

use tracing::{info, warn};

use crate::catalog::{Catalog, CatalogStore, StoreError};
use crate::reconcile::identity::{IdentityResolver, Resolution};
use crate::reconcile::normalize::{normalize, NormalizeError, VolumeRecord};

/// Outcome of one reconciliation batch
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Records inserted as new books
    pub added: usize,

    /// Records merged into existing books
    pub updated: usize,

    /// Malformed records skipped without aborting the batch
    pub skipped: Vec<SkippedRecord>,
}

/// A batch record the normalizer rejected
#[derive(Debug)]
pub struct SkippedRecord {
    /// Position of the record in the batch
    pub index: usize,

    /// Why it was rejected
    pub reason: NormalizeError,
}

/// Drives batches of provider records through the normalizer and the
/// identity resolver into the catalog store.
pub struct Reconciler<'a, S: CatalogStore> {
    store: &'a S,
}

impl<'a, S: CatalogStore> Reconciler<'a, S> {
    /// Create a reconciler over the given store
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Merge a batch of provider records into the catalog, in batch order.
    ///
    /// A record whose external id is already known (to the catalog or to
    /// an earlier record of this batch) updates the existing book; the
    /// acquired flag is never touched by such an update. Unknown records
    /// are inserted unacquired under the next free local id. Records the
    /// normalizer rejects are skipped and reported; a store failure
    /// aborts the batch.
    pub async fn import_batch(
        &self,
        records: &[VolumeRecord],
    ) -> Result<ImportReport, StoreError> {
        let mut catalog = Catalog::from_books(self.store.load().await?);
        let mut resolver = IdentityResolver::from_catalog(&catalog.books);
        let mut report = ImportReport::default();

        for (index, record) in records.iter().enumerate() {
            let normalized = match normalize(record) {
                Ok(normalized) => normalized,
                Err(reason) => {
                    warn!(index, %reason, "skipping malformed volume record");
                    report.skipped.push(SkippedRecord { index, reason });
                    continue;
                }
            };

            match resolver.resolve(&normalized.external_id) {
                Resolution::Existing(id) => match catalog.get_mut(id) {
                    Some(book) => {
                        normalized.apply_to(book);
                        report.updated += 1;
                    }
                    None => {
                        warn!(id, "resolved id missing from catalog, skipping update");
                        continue;
                    }
                },
                Resolution::New(id) => {
                    catalog.push(normalized.into_book(id));
                    report.added += 1;
                }
            }

            self.store.replace(&catalog.books).await?;
        }

        info!(
            added = report.added,
            updated = report.updated,
            skipped = report.skipped.len(),
            "reconciliation batch complete"
        );

        Ok(report)
    }
}
