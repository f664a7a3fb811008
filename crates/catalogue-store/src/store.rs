//! CatalogueStore — redb-backed persistence for descriptor records.
//!
//! Implements [`RecordStore`] with per-kind record tables plus an identity
//! index that rejects duplicate (name, vendor, version) triples inside the
//! insert transaction. redb serializes write transactions, so two
//! concurrent creates for the same identity cannot both commit; the loser
//! surfaces as an ordinary [`StoreError::IdentityExists`].

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, TableError};
use tracing::debug;

use catalogue_core::{
    DescriptorKind, DescriptorRecord, RecordFilter, RecordStore, SortOrder, Status, StoreError,
    StoreResult, sort_records,
};

use crate::tables::{META, identities_table, records_table};

/// Convert any `Display` error into a `StoreError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StoreError::$variant(e.to_string())
    };
}

/// Thread-safe descriptor record store backed by redb.
#[derive(Clone)]
pub struct CatalogueStore {
    db: Arc<Database>,
}

impl CatalogueStore {
    /// Open (or create) a persistent store at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_meta()?;
        debug!(?path, "catalogue store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory store (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_meta()?;
        debug!("in-memory catalogue store opened");
        Ok(store)
    }

    /// Create the shared meta table. Per-kind tables are created lazily on
    /// first insert; reads treat an absent table as an empty collection.
    fn ensure_meta(&self) -> StoreResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        txn.open_table(META).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }
}

impl RecordStore for CatalogueStore {
    fn find_by_filter(
        &self,
        kind: &DescriptorKind,
        filter: &RecordFilter,
        sort: SortOrder,
    ) -> StoreResult<Vec<DescriptorRecord>> {
        let name = records_table(kind.collection);
        let def: TableDefinition<&str, &[u8]> = TableDefinition::new(&name);
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = match txn.open_table(def) {
            Ok(table) => table,
            // Nothing was ever inserted for this kind.
            Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Table(e.to_string())),
        };
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (_, value) = entry.map_err(map_err!(Read))?;
            let record: DescriptorRecord =
                serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
            if filter.matches(&record) {
                results.push(record);
            }
        }
        sort_records(&mut results, sort);
        Ok(results)
    }

    fn find_by_id(&self, kind: &DescriptorKind, id: &str) -> StoreResult<Option<DescriptorRecord>> {
        let name = records_table(kind.collection);
        let def: TableDefinition<&str, &[u8]> = TableDefinition::new(&name);
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = match txn.open_table(def) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(StoreError::Table(e.to_string())),
        };
        match table.get(id).map_err(map_err!(Read))? {
            Some(guard) => {
                let record: DescriptorRecord =
                    serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    fn insert(
        &self,
        kind: &DescriptorKind,
        mut record: DescriptorRecord,
    ) -> StoreResult<DescriptorRecord> {
        let identity = record
            .identity()
            .ok_or_else(|| StoreError::MissingIdentity(record.id.clone()))?;
        let identity_key = identity.table_key();
        let records_name = records_table(kind.collection);
        let identities_name = identities_table(kind.collection);
        let records_def: TableDefinition<&str, &[u8]> = TableDefinition::new(&records_name);
        let identities_def: TableDefinition<&str, &str> = TableDefinition::new(&identities_name);

        // Dropping the transaction on any early return aborts it, so a
        // rejected insert writes nothing.
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut records = txn.open_table(records_def).map_err(map_err!(Table))?;
            let mut identities = txn.open_table(identities_def).map_err(map_err!(Table))?;

            // The identity constraint only counts non-deleted records: a
            // record parked in status `delete` cedes its triple to the next
            // insert, which takes over the index entry.
            let occupant = identities
                .get(identity_key.as_str())
                .map_err(map_err!(Read))?
                .map(|guard| guard.value().to_string());
            if let Some(occupant_id) = occupant {
                let blocking = match records.get(occupant_id.as_str()).map_err(map_err!(Read))? {
                    Some(guard) => {
                        let occupant: DescriptorRecord =
                            serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                        occupant.status != Status::Delete
                    }
                    None => false,
                };
                if blocking {
                    debug!(collection = kind.collection, identity = %identity, "duplicate identity rejected");
                    return Err(StoreError::IdentityExists(identity));
                }
            }

            if records.get(record.id.as_str()).map_err(map_err!(Read))?.is_some() {
                debug!(collection = kind.collection, id = %record.id, "duplicate id rejected");
                return Err(StoreError::IdExists(record.id));
            }

            let mut meta = txn.open_table(META).map_err(map_err!(Table))?;
            let next = meta
                .get(kind.collection)
                .map_err(map_err!(Read))?
                .map(|guard| guard.value())
                .unwrap_or(0)
                + 1;
            meta.insert(kind.collection, next).map_err(map_err!(Write))?;
            record.seq = next;

            let bytes = serde_json::to_vec(&record).map_err(map_err!(Serialize))?;
            records
                .insert(record.id.as_str(), bytes.as_slice())
                .map_err(map_err!(Write))?;
            identities
                .insert(identity_key.as_str(), record.id.as_str())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(collection = kind.collection, id = %record.id, seq = record.seq, "record stored");
        Ok(record)
    }

    fn delete_by_id(&self, kind: &DescriptorKind, id: &str) -> StoreResult<bool> {
        let records_name = records_table(kind.collection);
        let identities_name = identities_table(kind.collection);
        let records_def: TableDefinition<&str, &[u8]> = TableDefinition::new(&records_name);
        let identities_def: TableDefinition<&str, &str> = TableDefinition::new(&identities_name);

        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let existed;
        {
            let mut records = txn.open_table(records_def).map_err(map_err!(Table))?;
            let removed = match records.remove(id).map_err(map_err!(Write))? {
                Some(guard) => {
                    let record: DescriptorRecord =
                        serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                    Some(record)
                }
                None => None,
            };
            existed = removed.is_some();
            // Free the identity key, but only when it still points at this
            // record; a deleted-status record may have already ceded its
            // triple to a newer insert.
            if let Some(identity) = removed.as_ref().and_then(DescriptorRecord::identity) {
                let key = identity.table_key();
                let mut identities = txn.open_table(identities_def).map_err(map_err!(Table))?;
                let points_here = identities
                    .get(key.as_str())
                    .map_err(map_err!(Read))?
                    .is_some_and(|guard| guard.value() == id);
                if points_here {
                    identities.remove(key.as_str()).map_err(map_err!(Write))?;
                }
            }
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(collection = kind.collection, id, existed, "record deleted");
        Ok(existed)
    }

    fn update_status(
        &self,
        kind: &DescriptorKind,
        id: &str,
        status: Status,
    ) -> StoreResult<Option<DescriptorRecord>> {
        let records_name = records_table(kind.collection);
        let identities_name = identities_table(kind.collection);
        let records_def: TableDefinition<&str, &[u8]> = TableDefinition::new(&records_name);
        let identities_def: TableDefinition<&str, &str> = TableDefinition::new(&identities_name);

        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let updated;
        {
            // Opening in a write transaction creates the table if absent;
            // the early returns below abort the transaction, so an update
            // against an untouched collection still writes nothing.
            let mut records = txn.open_table(records_def).map_err(map_err!(Table))?;
            let mut record = match records.get(id).map_err(map_err!(Read))? {
                Some(guard) => {
                    let record: DescriptorRecord =
                        serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                    record
                }
                None => return Ok(None),
            };

            // Reactivating a deleted record re-claims its identity key; if
            // a newer record took the triple over in the meantime, the
            // reactivation would break identity uniqueness and is rejected.
            if record.status == Status::Delete
                && status != Status::Delete
                && let Some(identity) = record.identity()
            {
                let key = identity.table_key();
                let mut identities = txn.open_table(identities_def).map_err(map_err!(Table))?;
                let taken_over = identities
                    .get(key.as_str())
                    .map_err(map_err!(Read))?
                    .is_some_and(|guard| guard.value() != id);
                if taken_over {
                    debug!(collection = kind.collection, id, identity = %identity, "reactivation rejected");
                    return Err(StoreError::IdentityExists(identity));
                }
                identities.insert(key.as_str(), id).map_err(map_err!(Write))?;
            }

            record.status = status;
            let bytes = serde_json::to_vec(&record).map_err(map_err!(Serialize))?;
            records
                .insert(id, bytes.as_slice())
                .map_err(map_err!(Write))?;
            updated = record;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(collection = kind.collection, id, status = %status, "status updated");
        Ok(Some(updated))
    }
}
