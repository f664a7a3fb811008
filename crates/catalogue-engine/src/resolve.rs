//! Latest-version grouping over sorted record sequences.

use std::collections::HashSet;

use catalogue_core::DescriptorRecord;

/// Reduce a version-descending-sorted sequence to one record per distinct
/// (name, vendor) pair: the first (= highest-version) occurrence of each.
///
/// Single linear pass over the input; correctness requires the caller to
/// have sorted with [`SortOrder::VersionDescending`](catalogue_core::SortOrder),
/// whose seq tie-break also makes the output deterministic for equal
/// version strings. Records lacking a name or vendor are dropped; the
/// engine never creates such records.
pub fn latest_per_identity(records: Vec<DescriptorRecord>) -> Vec<DescriptorRecord> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut latest = Vec::new();
    for record in records {
        let (Some(name), Some(vendor)) = (record.name(), record.vendor()) else {
            continue;
        };
        let key = (name.to_string(), vendor.to_string());
        if seen.insert(key) {
            latest.push(record);
        }
    }
    latest
}
