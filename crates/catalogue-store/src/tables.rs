//! redb table layout for the catalogue store.
//!
//! Record and identity tables are per descriptor kind, named after the
//! kind's collection. The meta table is shared and holds one sequence
//! counter per collection.

use redb::TableDefinition;

/// Per-collection sequence counters, keyed by collection name. The value is
/// the last sequence handed out; 0 means no record was ever inserted.
pub const META: TableDefinition<&str, u64> = TableDefinition::new("catalogue.meta");

/// Name of the record table for a collection: record id to JSON record.
pub fn records_table(collection: &str) -> String {
    format!("{collection}.records")
}

/// Name of the identity index table for a collection:
/// `{vendor}/{name}/{version}` to record id. Presence of a key is the
/// storage-level uniqueness constraint on the identity triple.
pub fn identities_table(collection: &str) -> String {
    format!("{collection}.identities")
}
