//! Integration tests for the catalogue engine over the redb store.
//!
//! These tests prove the end-to-end consistency guarantees:
//! 1. Identity uniqueness holds across create/revise/delete interleavings,
//!    including a seeded pseudo-random workload
//! 2. `resolve_latest` returns exactly the highest version per (name,
//!    vendor) pair, deterministically
//! 3. Pagination totals count the post-resolution set, with clamped
//!    windows
//! 4. The status lifecycle mutates nothing but the status field

use catalogue_core::{
    AWS_SERVICE, DescriptorIdentity, FPGA_SERVICE, RecordFilter, Status,
};
use catalogue_engine::{Catalogue, CatalogueError, PageRequest};
use catalogue_store::CatalogueStore;
use serde_json::{Value, json};

fn catalogue() -> Catalogue<CatalogueStore> {
    Catalogue::new(CatalogueStore::open_in_memory().unwrap())
}

fn body(name: &str, vendor: &str, version: &str) -> Value {
    json!({
        "name": name,
        "vendor": vendor,
        "version": version,
        "description": format!("{name} by {vendor}"),
    })
}

// ── Create & uniqueness ───────────────────────────────────────────

#[test]
fn create_sets_envelope_fields() {
    let cat = catalogue();
    let rec = cat
        .create(&AWS_SERVICE, body("firewall", "acme", "1.0"), Some("alice"))
        .unwrap();

    assert_eq!(rec.status, Status::Active);
    assert_eq!(rec.owner.as_deref(), Some("alice"));
    assert_eq!(rec.signature, None);
    assert_eq!(rec.integrity_digest.len(), 64);
    assert!(!rec.id.is_empty());
    assert_eq!(rec.seq, 1);
}

#[test]
fn second_create_with_same_identity_is_rejected() {
    let cat = catalogue();
    cat.create(&AWS_SERVICE, body("foo", "bar", "1.0"), None).unwrap();

    let err = cat
        .create(&AWS_SERVICE, body("foo", "bar", "1.0"), None)
        .unwrap_err();
    assert!(matches!(err, CatalogueError::DuplicateIdentity(_)));
    assert!(!err.is_retryable());

    // The store still holds exactly one record for the identity.
    let filter = RecordFilter::new().field("name", "foo").field("vendor", "bar");
    let page = cat.list(&AWS_SERVICE, &filter, &PageRequest::default()).unwrap();
    assert_eq!(page.total, 1);
}

#[test]
fn create_rejects_body_missing_identity_fields() {
    let cat = catalogue();
    let err = cat
        .create(&AWS_SERVICE, json!({"name": "fw", "vendor": "acme"}), None)
        .unwrap_err();
    assert!(matches!(err, CatalogueError::MissingField("version")));
}

#[test]
fn create_rejects_known_client_supplied_id() {
    let cat = catalogue();
    let stored = cat.create(&AWS_SERVICE, body("fw", "acme", "1.0"), None).unwrap();

    let mut b = body("fw", "acme", "2.0");
    b["id"] = json!(stored.id.clone());
    let err = cat.create(&AWS_SERVICE, b, None).unwrap_err();
    assert!(matches!(err, CatalogueError::DuplicateId(id) if id == stored.id));

    // An unknown client id is ignored and replaced by a fresh one.
    let mut b = body("fw", "acme", "2.0");
    b["id"] = json!("client-chosen");
    let rec = cat.create(&AWS_SERVICE, b, None).unwrap();
    assert_ne!(rec.id, "client-chosen");
}

#[test]
fn kinds_do_not_share_identity_space() {
    let cat = catalogue();
    cat.create(&AWS_SERVICE, body("fw", "acme", "1.0"), None).unwrap();
    cat.create(&FPGA_SERVICE, body("fw", "acme", "1.0"), None).unwrap();
}

// ── Revision (append-only update) ─────────────────────────────────

#[test]
fn revise_appends_and_keeps_predecessor() {
    let cat = catalogue();
    let v1 = cat.create(&AWS_SERVICE, body("fw", "acme", "1.0"), None).unwrap();
    let v2 = cat
        .revise(&AWS_SERVICE, &v1.id, body("fw", "acme", "2.0"), Some("bob"))
        .unwrap();

    assert_ne!(v1.id, v2.id);
    assert_eq!(v2.owner.as_deref(), Some("bob"));

    // Predecessor is intact and still readable.
    let old = cat.fetch(&AWS_SERVICE, &v1.id).unwrap();
    assert_eq!(old.descriptor["version"], json!("1.0"));
    assert_eq!(old.integrity_digest, v1.integrity_digest);
}

#[test]
fn revise_unknown_predecessor_is_not_found() {
    let cat = catalogue();
    let err = cat
        .revise(&AWS_SERVICE, "missing", body("fw", "acme", "2.0"), None)
        .unwrap_err();
    assert!(matches!(err, CatalogueError::NotFound(_)));
}

#[test]
fn revise_to_existing_version_is_duplicate_identity() {
    let cat = catalogue();
    let v1 = cat.create(&AWS_SERVICE, body("fw", "acme", "1.0"), None).unwrap();
    cat.create(&AWS_SERVICE, body("fw", "acme", "2.0"), None).unwrap();

    let err = cat
        .revise(&AWS_SERVICE, &v1.id, body("fw", "acme", "2.0"), None)
        .unwrap_err();
    assert!(matches!(err, CatalogueError::DuplicateIdentity(_)));
}

#[test]
fn revise_by_identity_addresses_predecessor_by_triple() {
    let cat = catalogue();
    cat.create(&AWS_SERVICE, body("fw", "acme", "1.0"), None).unwrap();

    let predecessor = DescriptorIdentity::new("acme", "fw", "1.0");
    let v2 = cat
        .revise_by_identity(&AWS_SERVICE, &predecessor, body("fw", "acme", "2.0"), None)
        .unwrap();
    assert_eq!(v2.descriptor["version"], json!("2.0"));

    let absent = DescriptorIdentity::new("acme", "fw", "9.9");
    let err = cat
        .revise_by_identity(&AWS_SERVICE, &absent, body("fw", "acme", "3.0"), None)
        .unwrap_err();
    assert!(matches!(err, CatalogueError::NotFound(_)));
}

// ── Latest-version resolution ─────────────────────────────────────

#[test]
fn resolve_latest_picks_highest_version() {
    let cat = catalogue();
    for version in ["1", "2", "3"] {
        cat.create(&AWS_SERVICE, body("fw", "acme", version), None).unwrap();
    }

    let latest = cat.resolve_latest(&AWS_SERVICE, &RecordFilter::new()).unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].version(), Some("3"));
}

#[test]
fn resolve_latest_on_empty_filter_set_is_empty_not_error() {
    let cat = catalogue();
    cat.create(&AWS_SERVICE, body("fw", "acme", "1.0"), None).unwrap();

    let filter = RecordFilter::new().field("vendor", "nobody");
    let latest = cat.resolve_latest(&AWS_SERVICE, &filter).unwrap();
    assert!(latest.is_empty());

    // Untouched kind behaves the same.
    let latest = cat.resolve_latest(&FPGA_SERVICE, &RecordFilter::new()).unwrap();
    assert!(latest.is_empty());
}

#[test]
fn resolve_latest_is_deterministic() {
    let cat = catalogue();
    for (name, vendor, version) in [
        ("fw", "acme", "1.0"),
        ("fw", "acme", "2.0"),
        ("lb", "acme", "1.0"),
        ("fw", "emca", "0.9"),
    ] {
        cat.create(&AWS_SERVICE, body(name, vendor, version), None).unwrap();
    }

    let first = cat.resolve_latest(&AWS_SERVICE, &RecordFilter::new()).unwrap();
    let second = cat.resolve_latest(&AWS_SERVICE, &RecordFilter::new()).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

#[test]
fn resolve_latest_skips_deleted_records() {
    let cat = catalogue();
    cat.create(&AWS_SERVICE, body("fw", "acme", "1.0"), None).unwrap();
    let v2 = cat.create(&AWS_SERVICE, body("fw", "acme", "2.0"), None).unwrap();
    cat.set_status(&AWS_SERVICE, &v2.id, "delete").unwrap();

    let latest = cat.resolve_latest(&AWS_SERVICE, &RecordFilter::new()).unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].version(), Some("1.0"));
}

// ── Pagination ────────────────────────────────────────────────────

#[test]
fn list_windows_and_reports_totals() {
    let cat = catalogue();
    for i in 0..25 {
        cat.create(&AWS_SERVICE, body(&format!("svc-{i:02}"), "acme", "1.0"), None)
            .unwrap();
    }

    let all = RecordFilter::new();
    let page = cat.list(&AWS_SERVICE, &all, &PageRequest::new(0, 10)).unwrap();
    assert_eq!(page.items.len(), 10);
    assert_eq!(page.total, 25);

    let page = cat.list(&AWS_SERVICE, &all, &PageRequest::new(20, 10)).unwrap();
    assert_eq!(page.items.len(), 5);
    assert_eq!(page.total, 25);

    let page = cat.list(&AWS_SERVICE, &all, &PageRequest::new(30, 10)).unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.total, 25);
}

#[test]
fn list_latest_total_counts_distinct_descriptors() {
    let cat = catalogue();
    // Three descriptors, several versions each: 8 stored records.
    for version in ["1.0", "2.0", "3.0"] {
        cat.create(&AWS_SERVICE, body("fw", "acme", version), None).unwrap();
    }
    for version in ["1.0", "2.0"] {
        cat.create(&AWS_SERVICE, body("lb", "acme", version), None).unwrap();
    }
    for version in ["0.1", "0.2", "0.3"] {
        cat.create(&AWS_SERVICE, body("dpi", "emca", version), None).unwrap();
    }

    let page = cat
        .list_latest(&AWS_SERVICE, &RecordFilter::new(), &PageRequest::new(0, 2))
        .unwrap();
    assert_eq!(page.total, 3, "total is the reduced set size, not the store count");
    assert_eq!(page.items.len(), 2);

    let rest = cat
        .list_latest(&AWS_SERVICE, &RecordFilter::new(), &PageRequest::new(2, 2))
        .unwrap();
    assert_eq!(rest.total, 3);
    assert_eq!(rest.items.len(), 1);
}

#[test]
fn list_is_stable_across_calls() {
    let cat = catalogue();
    for i in 0..12 {
        cat.create(&AWS_SERVICE, body(&format!("svc-{i}"), "acme", "1.0"), None)
            .unwrap();
    }
    let all = RecordFilter::new();
    let a = cat.list(&AWS_SERVICE, &all, &PageRequest::new(4, 4)).unwrap();
    let b = cat.list(&AWS_SERVICE, &all, &PageRequest::new(4, 4)).unwrap();
    assert_eq!(a, b);
}

// ── Status lifecycle ──────────────────────────────────────────────

#[test]
fn set_status_walks_the_whitelist() {
    let cat = catalogue();
    let rec = cat.create(&AWS_SERVICE, body("fw", "acme", "1.0"), None).unwrap();

    let rec = cat.set_status(&AWS_SERVICE, &rec.id, "inactive").unwrap();
    assert_eq!(rec.status, Status::Inactive);
    let rec = cat.set_status(&AWS_SERVICE, &rec.id, "delete").unwrap();
    assert_eq!(rec.status, Status::Delete);
    let rec = cat.set_status(&AWS_SERVICE, &rec.id, "active").unwrap();
    assert_eq!(rec.status, Status::Active);
}

#[test]
fn bogus_status_rejected_without_mutation() {
    let cat = catalogue();
    let rec = cat.create(&AWS_SERVICE, body("fw", "acme", "1.0"), None).unwrap();

    let err = cat.set_status(&AWS_SERVICE, &rec.id, "bogus").unwrap_err();
    assert!(matches!(err, CatalogueError::InvalidStatus(s) if s == "bogus"));

    let unchanged = cat.fetch(&AWS_SERVICE, &rec.id).unwrap();
    assert_eq!(unchanged.status, Status::Active);
    assert_eq!(unchanged.descriptor, rec.descriptor);
    assert_eq!(unchanged.integrity_digest, rec.integrity_digest);
}

#[test]
fn set_status_unknown_id_is_not_found() {
    let cat = catalogue();
    let err = cat.set_status(&AWS_SERVICE, "missing", "inactive").unwrap_err();
    assert!(matches!(err, CatalogueError::NotFound(_)));
}

// ── Deletion ──────────────────────────────────────────────────────

#[test]
fn deleting_one_version_leaves_siblings_untouched() {
    let cat = catalogue();
    let v1 = cat.create(&AWS_SERVICE, body("fw", "acme", "1.0"), None).unwrap();
    let v2 = cat.create(&AWS_SERVICE, body("fw", "acme", "2.0"), None).unwrap();
    let v3 = cat.create(&AWS_SERVICE, body("fw", "acme", "3.0"), None).unwrap();

    cat.remove(&AWS_SERVICE, &v2.id).unwrap();

    assert_eq!(cat.fetch(&AWS_SERVICE, &v1.id).unwrap().id, v1.id);
    assert_eq!(cat.fetch(&AWS_SERVICE, &v3.id).unwrap().id, v3.id);
    let err = cat.fetch(&AWS_SERVICE, &v2.id).unwrap_err();
    assert!(matches!(err, CatalogueError::NotFound(_)));

    // Resolution now lands on the surviving highest version.
    let latest = cat.resolve_latest(&AWS_SERVICE, &RecordFilter::new()).unwrap();
    assert_eq!(latest[0].version(), Some("3.0"));
}

#[test]
fn remove_by_identity_deletes_exactly_one_version() {
    let cat = catalogue();
    cat.create(&AWS_SERVICE, body("fw", "acme", "1.0"), None).unwrap();
    cat.create(&AWS_SERVICE, body("fw", "acme", "2.0"), None).unwrap();

    cat.remove_by_identity(&AWS_SERVICE, &DescriptorIdentity::new("acme", "fw", "1.0"))
        .unwrap();

    let page = cat
        .list(&AWS_SERVICE, &RecordFilter::new(), &PageRequest::default())
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].version(), Some("2.0"));

    let err = cat
        .remove_by_identity(&AWS_SERVICE, &DescriptorIdentity::new("acme", "fw", "1.0"))
        .unwrap_err();
    assert!(matches!(err, CatalogueError::NotFound(_)));
}

// ── Uniqueness property under a randomized workload ───────────────

/// xorshift64 — deterministic pseudo-random stream for the workload test.
struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn pick<'a>(&mut self, options: &'a [&'a str]) -> &'a str {
        options[(self.next() % options.len() as u64) as usize]
    }
}

#[test]
fn random_triples_never_duplicate_identities() {
    let names = ["fw", "lb", "dpi", "nat"];
    let vendors = ["acme", "emca"];
    let versions = ["1.0", "1.1", "2.0"];

    let cat = catalogue();
    let mut rng = XorShift(0x5eed_cafe);
    let mut expected: std::collections::HashSet<(String, String, String)> =
        std::collections::HashSet::new();

    for _ in 0..200 {
        let (name, vendor, version) =
            (rng.pick(&names), rng.pick(&vendors), rng.pick(&versions));
        let outcome = cat.create(&AWS_SERVICE, body(name, vendor, version), None);
        let fresh =
            expected.insert((name.to_string(), vendor.to_string(), version.to_string()));
        match outcome {
            Ok(_) => assert!(fresh, "store accepted an already-present triple"),
            Err(CatalogueError::DuplicateIdentity(_)) => {
                assert!(!fresh, "store rejected a never-seen triple");
            }
            Err(e) => panic!("unexpected outcome: {e}"),
        }
    }

    // Every stored pair of records differs in identity.
    let all = cat
        .list(&AWS_SERVICE, &RecordFilter::new(), &PageRequest::new(0, 100))
        .unwrap();
    assert_eq!(all.total, expected.len());
    let mut seen = std::collections::HashSet::new();
    for record in &all.items {
        assert!(seen.insert(record.identity().unwrap()), "duplicate identity stored");
    }
}
