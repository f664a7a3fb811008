//! Engine error taxonomy.
//!
//! Every outcome is distinct; the presentation layer maps them to status
//! codes without inspecting message text. Only store infrastructure
//! failures are retryable; everything else is terminal for the request.

use thiserror::Error;

use catalogue_core::{DescriptorIdentity, StoreError};

/// Result type alias for engine operations.
pub type CatalogueResult<T> = Result<T, CatalogueError>;

/// Errors surfaced by catalogue operations.
#[derive(Debug, Error)]
pub enum CatalogueError {
    /// A non-deleted record with the same (name, vendor, version) exists.
    #[error("duplicate identity: {0}")]
    DuplicateIdentity(DescriptorIdentity),

    /// A record with the same id exists.
    #[error("duplicate record id: {0}")]
    DuplicateId(String),

    /// The id or identity addressed nothing.
    #[error("not found: {0}")]
    NotFound(String),

    /// Status value outside the {active, inactive, delete} whitelist.
    #[error("invalid status: {0}")]
    InvalidStatus(String),

    /// The inbound descriptor body lacks a required identity field.
    #[error("descriptor is missing required field: {0}")]
    MissingField(&'static str),

    /// The underlying store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl CatalogueError {
    /// Whether the caller may retry the request. True only for store
    /// infrastructure failures; duplicates, not-found, and invalid input
    /// will fail again identically.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CatalogueError::Store(e) if e.is_retryable())
    }
}
