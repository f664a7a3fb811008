//! catalogue-core — shared types for the descriptor catalogue.
//!
//! A catalogue stores versioned service/function descriptors as opaque JSON
//! bodies wrapped in a [`DescriptorRecord`] envelope. This crate defines the
//! record envelope, the identity triple (name, vendor, version) that scopes
//! uniqueness, the filter language used for store queries, and the
//! [`RecordStore`] contract that storage backends implement.
//!
//! The resolution/consistency logic itself lives in `catalogue-engine`; the
//! redb-backed store lives in `catalogue-store`.

pub mod digest;
pub mod filter;
pub mod kind;
pub mod store;
pub mod types;

pub use digest::content_digest;
pub use filter::RecordFilter;
pub use kind::{AWS_SERVICE, DescriptorKind, FPGA_SERVICE};
pub use store::{RecordStore, SortOrder, StoreError, StoreResult, sort_records};
pub use types::{DescriptorIdentity, DescriptorRecord, RecordId, Status, fresh_record_id};
