//! catalogue-store — embedded record store for the descriptor catalogue.
//!
//! Backed by [redb](https://docs.rs/redb), implements the
//! [`RecordStore`](catalogue_core::RecordStore) contract with both on-disk
//! and in-memory backends (the latter for testing).
//!
//! # Architecture
//!
//! Records are JSON-serialized into redb's `&[u8]` value columns. Each
//! descriptor kind gets two tables: `{collection}.records` (id to record)
//! and `{collection}.identities`, a secondary index keyed by the
//! `{vendor}/{name}/{version}` composite that enforces identity uniqueness
//! inside the insert transaction. A shared meta table hands out the
//! per-collection insertion sequence that makes query ordering total.
//!
//! The `CatalogueStore` is `Clone` + `Send` + `Sync` (backed by
//! `Arc<Database>`).

pub mod store;
pub mod tables;

pub use store::CatalogueStore;
