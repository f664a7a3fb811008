//! Record envelope and identity types for stored descriptors.
//!
//! A descriptor body is opaque JSON except for the three identity fields
//! `name`, `vendor`, and `version`, which every stored body must carry.
//! Content revisions never mutate a record in place; a revision is a new
//! record with a new id. The only in-place mutation permitted anywhere in
//! the model is the `status` field.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Unique identifier of a stored descriptor record (uuid-v4 string).
pub type RecordId = String;

/// Allocate a fresh record id. Ids are system-generated at creation time,
/// never client-supplied.
pub fn fresh_record_id() -> RecordId {
    Uuid::new_v4().to_string()
}

/// Lifecycle status of a stored record.
///
/// The wire values are the lowercase names; anything outside this whitelist
/// is rejected by the engine as an invalid status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Active,
    Inactive,
    Delete,
}

impl Status {
    /// Parse a status from its wire value. Returns `None` for anything
    /// outside the whitelist.
    pub fn parse(value: &str) -> Option<Status> {
        match value {
            "active" => Some(Status::Active),
            "inactive" => Some(Status::Inactive),
            "delete" => Some(Status::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Inactive => "inactive",
            Status::Delete => "delete",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The (vendor, name, version) triple that scopes descriptor uniqueness.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DescriptorIdentity {
    pub vendor: String,
    pub name: String,
    pub version: String,
}

impl DescriptorIdentity {
    pub fn new(
        vendor: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self { vendor: vendor.into(), name: name.into(), version: version.into() }
    }

    /// Composite key for the identity uniqueness index.
    pub fn table_key(&self) -> String {
        format!("{}/{}/{}", self.vendor, self.name, self.version)
    }
}

impl fmt::Display for DescriptorIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.vendor, self.name, self.version)
    }
}

/// Stored unit of the catalogue: an opaque descriptor body plus envelope
/// metadata maintained by the engine and the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptorRecord {
    pub id: RecordId,
    /// Opaque descriptor body. Must carry string fields `name`, `vendor`,
    /// and `version`; everything else is caller-defined.
    pub descriptor: Value,
    pub status: Status,
    /// SHA-256 hex of the canonical JSON body, computed once at creation.
    pub integrity_digest: String,
    /// Identity of the submitting user, `None` when anonymous.
    pub owner: Option<String>,
    /// Reserved for future signing support; always `None` for now.
    pub signature: Option<String>,
    /// Insertion sequence assigned by the store; 0 until persisted. Used as
    /// the deterministic tie-break wherever version sorting alone is
    /// ambiguous.
    pub seq: u64,
    /// Unix timestamp (seconds) when this record was created.
    pub created_at: u64,
}

impl DescriptorRecord {
    /// Read a top-level string field out of the descriptor body.
    pub fn field_str(&self, field: &str) -> Option<&str> {
        self.descriptor.get(field).and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.field_str("name")
    }

    pub fn vendor(&self) -> Option<&str> {
        self.field_str("vendor")
    }

    pub fn version(&self) -> Option<&str> {
        self.field_str("version")
    }

    /// The identity triple of this record, if the body carries all three
    /// fields. Records created through the engine always do.
    pub fn identity(&self) -> Option<DescriptorIdentity> {
        Some(DescriptorIdentity::new(self.vendor()?, self.name()?, self.version()?))
    }
}
