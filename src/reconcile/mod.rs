//! Reconciliation: merging externally-fetched records into the catalog.
//!
//! The flow per batch record: normalize the provider-shaped volume into
//! the catalog's record shape, resolve its external identifier to an
//! existing local id or a freshly allocated one, then update or insert
//! and persist.

pub mod engine;
pub mod identity;
pub mod normalize;

pub use engine::{ImportReport, Reconciler, SkippedRecord};
pub use identity::{IdentityResolver, Resolution};
pub use normalize::{normalize, NormalizeError, NormalizedBook, VolumeRecord};
