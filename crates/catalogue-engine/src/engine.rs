//! Catalogue — the operation surface over a record store.
//!
//! The engine is request-scoped and stateless between calls; all state
//! lives in the store. Uniqueness on create is not pre-checked: the record
//! is built and handed to [`RecordStore::insert`], whose storage-level
//! constraint rejects duplicates atomically, and the rejection is
//! translated into the matching terminal outcome. Content revisions are
//! append-only: `revise` writes a new record and leaves the predecessor
//! untouched.

use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;
use tracing::{debug, info};

use catalogue_core::{
    DescriptorIdentity, DescriptorKind, DescriptorRecord, RecordFilter, RecordStore, SortOrder,
    Status, StoreError, content_digest, fresh_record_id,
};

use crate::error::{CatalogueError, CatalogueResult};
use crate::page::{Page, PageRequest, paginate};
use crate::resolve::latest_per_identity;

/// The descriptor catalogue engine, generic over its store backend.
pub struct Catalogue<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> Catalogue<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Create a new descriptor record from an inbound body.
    ///
    /// The body must carry string `name`, `vendor`, and `version` fields.
    /// The record gets a fresh id, active status, and a content digest; a
    /// client-supplied `id` field is never honored, and is rejected as a
    /// duplicate when a record with that id already exists.
    pub fn create(
        &self,
        kind: &DescriptorKind,
        body: Value,
        owner: Option<&str>,
    ) -> CatalogueResult<DescriptorRecord> {
        validate_identity_fields(&body)?;
        if let Some(id) = body.get("id").and_then(Value::as_str) {
            if self.store.find_by_id(kind, id)?.is_some() {
                info!(collection = kind.collection, id, "create rejected, id already stored");
                return Err(CatalogueError::DuplicateId(id.to_string()));
            }
        }
        self.insert_new(kind, body, owner)
    }

    /// Append a new revision of the record addressed by `id`.
    ///
    /// The predecessor must exist and is left untouched; the revision is a
    /// brand-new record with its own id, digest, and version. Fails with
    /// [`CatalogueError::DuplicateIdentity`] when the revised body keeps an
    /// already-stored (name, vendor, version) triple.
    pub fn revise(
        &self,
        kind: &DescriptorKind,
        id: &str,
        body: Value,
        owner: Option<&str>,
    ) -> CatalogueResult<DescriptorRecord> {
        validate_identity_fields(&body)?;
        if self.store.find_by_id(kind, id)?.is_none() {
            return Err(CatalogueError::NotFound(format!("{} {id}", kind.label)));
        }
        self.insert_new(kind, body, owner)
    }

    /// Append a new revision, addressing the predecessor by its identity
    /// triple instead of its id.
    pub fn revise_by_identity(
        &self,
        kind: &DescriptorKind,
        predecessor: &DescriptorIdentity,
        body: Value,
        owner: Option<&str>,
    ) -> CatalogueResult<DescriptorRecord> {
        validate_identity_fields(&body)?;
        if self.find_by_identity(kind, predecessor)?.is_none() {
            return Err(CatalogueError::NotFound(format!("{} {predecessor}", kind.label)));
        }
        self.insert_new(kind, body, owner)
    }

    /// Look up one record by id.
    pub fn fetch(&self, kind: &DescriptorKind, id: &str) -> CatalogueResult<DescriptorRecord> {
        self.store
            .find_by_id(kind, id)?
            .ok_or_else(|| CatalogueError::NotFound(format!("{} {id}", kind.label)))
    }

    /// Resolve "the latest version of each distinct descriptor" for the
    /// given filter. Deleted records never participate. An empty result is
    /// a normal outcome, not an error.
    pub fn resolve_latest(
        &self,
        kind: &DescriptorKind,
        filter: &RecordFilter,
    ) -> CatalogueResult<Vec<DescriptorRecord>> {
        let records = self.store.find_by_filter(
            kind,
            &filter.clone().not_deleted(),
            SortOrder::VersionDescending,
        )?;
        let latest = latest_per_identity(records);
        debug!(collection = kind.collection, distinct = latest.len(), "resolved latest versions");
        Ok(latest)
    }

    /// List records matching a filter, windowed. The total counts every
    /// match before windowing.
    pub fn list(
        &self,
        kind: &DescriptorKind,
        filter: &RecordFilter,
        page: &PageRequest,
    ) -> CatalogueResult<Page<DescriptorRecord>> {
        let records = self.store.find_by_filter(kind, filter, SortOrder::Insertion)?;
        Ok(paginate(records, page))
    }

    /// List the latest version of each distinct descriptor, windowed. The
    /// total counts distinct (name, vendor) pairs, not stored records.
    pub fn list_latest(
        &self,
        kind: &DescriptorKind,
        filter: &RecordFilter,
        page: &PageRequest,
    ) -> CatalogueResult<Page<DescriptorRecord>> {
        Ok(paginate(self.resolve_latest(kind, filter)?, page))
    }

    /// Update a record's status in place. The only in-place mutation the
    /// catalogue permits; body, id, and digest are untouched. Values
    /// outside the whitelist are rejected without touching the record.
    pub fn set_status(
        &self,
        kind: &DescriptorKind,
        id: &str,
        new_status: &str,
    ) -> CatalogueResult<DescriptorRecord> {
        let status = Status::parse(new_status)
            .ok_or_else(|| CatalogueError::InvalidStatus(new_status.to_string()))?;
        let updated = match self.store.update_status(kind, id, status) {
            Ok(updated) => updated,
            // Reactivating a deleted record after its triple was reused.
            Err(StoreError::IdentityExists(identity)) => {
                return Err(CatalogueError::DuplicateIdentity(identity));
            }
            Err(e) => return Err(e.into()),
        }
        .ok_or_else(|| CatalogueError::NotFound(format!("{} {id}", kind.label)))?;
        info!(collection = kind.collection, id, status = %status, "status updated");
        Ok(updated)
    }

    /// Delete exactly one record by id. Other versions of the same
    /// descriptor are unaffected.
    pub fn remove(&self, kind: &DescriptorKind, id: &str) -> CatalogueResult<()> {
        if self.store.delete_by_id(kind, id)? {
            info!(collection = kind.collection, id, "record removed");
            Ok(())
        } else {
            Err(CatalogueError::NotFound(format!("{} {id}", kind.label)))
        }
    }

    /// Delete the single record matching an identity triple.
    pub fn remove_by_identity(
        &self,
        kind: &DescriptorKind,
        identity: &DescriptorIdentity,
    ) -> CatalogueResult<()> {
        match self.find_by_identity(kind, identity)? {
            Some(record) => self.remove(kind, &record.id),
            None => Err(CatalogueError::NotFound(format!("{} {identity}", kind.label))),
        }
    }

    fn find_by_identity(
        &self,
        kind: &DescriptorKind,
        identity: &DescriptorIdentity,
    ) -> CatalogueResult<Option<DescriptorRecord>> {
        let filter = RecordFilter::new()
            .field("vendor", identity.vendor.as_str())
            .field("name", identity.name.as_str())
            .field("version", identity.version.as_str());
        let matches = self.store.find_by_filter(kind, &filter, SortOrder::Insertion)?;
        Ok(matches.into_iter().next())
    }

    fn insert_new(
        &self,
        kind: &DescriptorKind,
        body: Value,
        owner: Option<&str>,
    ) -> CatalogueResult<DescriptorRecord> {
        let record = DescriptorRecord {
            id: fresh_record_id(),
            integrity_digest: content_digest(&body),
            descriptor: body,
            status: Status::Active,
            owner: owner.map(str::to_string),
            signature: None,
            seq: 0,
            created_at: unix_now(),
        };
        match self.store.insert(kind, record) {
            Ok(stored) => {
                info!(collection = kind.collection, id = %stored.id, "record created");
                Ok(stored)
            }
            Err(StoreError::IdentityExists(identity)) => {
                info!(collection = kind.collection, identity = %identity, "create rejected, duplicate identity");
                Err(CatalogueError::DuplicateIdentity(identity))
            }
            Err(StoreError::IdExists(id)) => Err(CatalogueError::DuplicateId(id)),
            Err(e) => Err(CatalogueError::Store(e)),
        }
    }
}

/// Ensure the body carries the three string identity fields.
fn validate_identity_fields(body: &Value) -> CatalogueResult<()> {
    for field in ["vendor", "name", "version"] {
        if body.get(field).and_then(Value::as_str).is_none() {
            return Err(CatalogueError::MissingField(field));
        }
    }
    Ok(())
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
