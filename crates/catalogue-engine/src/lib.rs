//! catalogue-engine — descriptor version resolution and consistency.
//!
//! One generic engine serves every descriptor kind; callers hand it a
//! [`DescriptorKind`](catalogue_core::DescriptorKind) and a store, and get
//! the catalogue semantics: append-only creation guarded by identity
//! uniqueness, "latest version per descriptor" resolution, deterministic
//! pagination, and the status lifecycle.
//!
//! # Components
//!
//! - **`engine`** — [`Catalogue`], the operation surface (create, revise,
//!   fetch, resolve, list, set_status, remove)
//! - **`resolve`** — single-pass latest-version grouping
//! - **`page`** — offset/limit windowing with pre-window totals
//! - **`error`** — the outcome taxonomy surfaced to presentation layers

pub mod engine;
pub mod error;
pub mod page;
pub mod resolve;

pub use engine::Catalogue;
pub use error::{CatalogueError, CatalogueResult};
pub use page::{DEFAULT_LIMIT, MAX_LIMIT, Page, PageRequest, paginate};
pub use resolve::latest_per_identity;
