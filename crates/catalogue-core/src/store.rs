//! Store contract consumed by the catalogue engine.
//!
//! Backends persist [`DescriptorRecord`]s per descriptor kind and enforce
//! the two uniqueness constraints at the storage layer: one record per
//! identity triple, one record per id. The engine deliberately does not
//! pre-check uniqueness before writing; it relies on [`RecordStore::insert`]
//! rejecting the write inside a single transaction, which keeps concurrent
//! creates correct without application-level locking.

use thiserror::Error;

use crate::filter::RecordFilter;
use crate::kind::DescriptorKind;
use crate::types::{DescriptorIdentity, DescriptorRecord, RecordId, Status};

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by record store backends.
///
/// Infrastructure variants (open, transaction, table, read, write,
/// serialize, deserialize) indicate the store itself failed and the call
/// may be retried. The constraint variants are terminal outcomes for the
/// request that triggered them.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open database: {0}")]
    Open(String),

    #[error("transaction error: {0}")]
    Transaction(String),

    #[error("table error: {0}")]
    Table(String),

    #[error("read error: {0}")]
    Read(String),

    #[error("write error: {0}")]
    Write(String),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("deserialization error: {0}")]
    Deserialize(String),

    /// A record with the same (name, vendor, version) is already stored.
    #[error("identity already stored: {0}")]
    IdentityExists(DescriptorIdentity),

    /// A record with the same id is already stored.
    #[error("record id already stored: {0}")]
    IdExists(RecordId),

    /// The record body lacks the name/vendor/version identity fields.
    #[error("record {0} carries no identity triple")]
    MissingIdentity(RecordId),
}

impl StoreError {
    /// Whether the failed call is worth retrying. Only infrastructure
    /// failures are; constraint violations will fail again identically.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::Open(_)
                | StoreError::Transaction(_)
                | StoreError::Table(_)
                | StoreError::Read(_)
                | StoreError::Write(_)
        )
    }
}

/// Orderings a store query can return records in.
///
/// Both orderings are total: the insertion sequence breaks every tie, so a
/// query against a fixed store state always returns the same sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Version string descending, insertion sequence ascending on equal
    /// versions. Records without a version sort after all versioned ones.
    VersionDescending,
    /// Insertion sequence ascending.
    Insertion,
}

/// Sort records according to a [`SortOrder`].
///
/// Version comparison is a literal string comparison, preserving the
/// catalogue's historical ordering (so "9.0" sorts above "10.0").
pub fn sort_records(records: &mut [DescriptorRecord], sort: SortOrder) {
    match sort {
        SortOrder::Insertion => records.sort_by_key(|r| r.seq),
        SortOrder::VersionDescending => records.sort_by(|a, b| match (a.version(), b.version()) {
            (Some(x), Some(y)) => y.cmp(x).then(a.seq.cmp(&b.seq)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.seq.cmp(&b.seq),
        }),
    }
}

/// Persistence contract for descriptor records, one collection per
/// [`DescriptorKind`].
pub trait RecordStore {
    /// All records matching `filter`, in the requested order.
    fn find_by_filter(
        &self,
        kind: &DescriptorKind,
        filter: &RecordFilter,
        sort: SortOrder,
    ) -> StoreResult<Vec<DescriptorRecord>>;

    /// Look up one record by id.
    fn find_by_id(&self, kind: &DescriptorKind, id: &str) -> StoreResult<Option<DescriptorRecord>>;

    /// Persist a new record, assigning its insertion sequence. Fails with
    /// [`StoreError::IdentityExists`] when a non-deleted record already
    /// holds the identity triple (a deleted-status record cedes its
    /// triple), or [`StoreError::IdExists`] on an id collision; on failure
    /// nothing is written.
    fn insert(&self, kind: &DescriptorKind, record: DescriptorRecord)
    -> StoreResult<DescriptorRecord>;

    /// Delete one record by id. Returns whether it existed. Never touches
    /// other records, in particular not other versions of the same
    /// descriptor.
    fn delete_by_id(&self, kind: &DescriptorKind, id: &str) -> StoreResult<bool>;

    /// Update the status field of one record in place, leaving the body,
    /// id, and digest untouched. Returns the updated record, or `None`
    /// when the id is unknown. Reactivating a deleted record whose triple
    /// was taken over by a newer insert fails with
    /// [`StoreError::IdentityExists`].
    fn update_status(
        &self,
        kind: &DescriptorKind,
        id: &str,
        status: Status,
    ) -> StoreResult<Option<DescriptorRecord>>;
}
