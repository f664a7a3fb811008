//! Query filters over stored descriptor records.
//!
//! A [`RecordFilter`] is a conjunction of set-membership equality predicates
//! on descriptor body fields (dotted paths), plus an optional status
//! constraint on the envelope. Filters are evaluated store-side against
//! every record in a collection; there is no index on body fields.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::types::{DescriptorRecord, Status};

/// Conjunctive filter over descriptor records.
///
/// Each field predicate accepts a set of values; a record matches when the
/// addressed body field equals any of them. An empty filter matches every
/// record.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    fields: BTreeMap<String, Vec<Value>>,
    statuses: Vec<Status>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require a body field (dotted path) to equal `value`.
    pub fn field(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(path.into(), vec![value.into()]);
        self
    }

    /// Require a body field (dotted path) to equal any of `values`.
    pub fn field_in(mut self, path: impl Into<String>, values: Vec<Value>) -> Self {
        self.fields.insert(path.into(), values);
        self
    }

    /// Restrict to records whose envelope status is in the given set.
    /// Replaces any previously set status constraint.
    pub fn statuses(mut self, statuses: &[Status]) -> Self {
        self.statuses = statuses.to_vec();
        self
    }

    /// Drop deleted records from the result. Narrows an existing status
    /// constraint rather than replacing it.
    pub fn not_deleted(mut self) -> Self {
        self.statuses.retain(|s| *s != Status::Delete);
        if self.statuses.is_empty() {
            // An empty list means "any status", so a constraint narrowed to
            // nothing must be repopulated with the non-deleted whitelist.
            self.statuses = vec![Status::Active, Status::Inactive];
        }
        self
    }

    /// Evaluate this filter against a record.
    pub fn matches(&self, record: &DescriptorRecord) -> bool {
        if !self.statuses.is_empty() && !self.statuses.contains(&record.status) {
            return false;
        }
        self.fields.iter().all(|(path, accepted)| {
            lookup(&record.descriptor, path).is_some_and(|v| accepted.iter().any(|a| a == v))
        })
    }
}

/// Resolve a dotted path against a JSON body.
fn lookup<'a>(body: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(body, |value, segment| value.get(segment))
}
