// caseflow-store-sqlite/tests/sqlite_store.rs
// ============================================================================
// Module: SQLite Store Tests
// Description: Validate SQLite CaseStore/FingerprintIndex behavior.
// Purpose: Ensure durable persistence and idempotent fingerprint claims.
// Dependencies: caseflow-store-sqlite, caseflow-core, rusqlite, serde_json, tempfile
// ============================================================================

//! ## Overview
//! Conformance tests for the SQLite-backed case store. Exercises save/load
//! round trips, schema version mismatch handling, and the fingerprint
//! compare-and-set that backs the draft writer's at-most-once guarantee (I4).

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use caseflow_core::Case;
use caseflow_core::CaseId;
use caseflow_core::CaseState;
use caseflow_core::OrderFingerprint;
use caseflow_core::SubmitterId;
use caseflow_core::TenantId;
use caseflow_core::Timestamp;
use caseflow_core::interfaces::CaseStore;
use caseflow_core::interfaces::FingerprintIndex;
use caseflow_store_sqlite::SqliteCaseStore;
use caseflow_store_sqlite::SqliteStoreConfig;
use caseflow_store_sqlite::SqliteStoreMode;
use caseflow_store_sqlite::SqliteSyncMode;

fn sample_case(case_id: &str) -> Case {
    Case {
        tenant_id: TenantId::new("tenant-1"),
        case_id: CaseId::new(case_id),
        submitter_id: SubmitterId::new("submitter-1"),
        state: CaseState::Received,
        created_at: Timestamp::Logical(0),
        updated_at: Timestamp::Logical(0),
        order: None,
        issues: Vec::new(),
        committee_result: None,
        fingerprint: None,
        draft_reference: None,
        history: Vec::new(),
    }
}

#[test]
fn save_then_load_round_trips() {
    let store = SqliteCaseStore::open_in_memory().expect("open store");
    let case = sample_case("case-1");
    store.save(&case).expect("save case");

    let loaded = store
        .load(&case.tenant_id, &case.case_id)
        .expect("load case")
        .expect("case present");
    assert_eq!(loaded, case);
}

#[test]
fn load_missing_case_returns_none() {
    let store = SqliteCaseStore::open_in_memory().expect("open store");
    let found = store
        .load(&TenantId::new("tenant-1"), &CaseId::new("nonexistent"))
        .expect("load does not error");
    assert!(found.is_none());
}

#[test]
fn save_overwrites_existing_case() {
    let store = SqliteCaseStore::open_in_memory().expect("open store");
    let mut case = sample_case("case-1");
    store.save(&case).expect("save case");

    case.state = CaseState::Parsing;
    case.updated_at = Timestamp::Logical(5);
    store.save(&case).expect("save updated case");

    let loaded = store
        .load(&case.tenant_id, &case.case_id)
        .expect("load case")
        .expect("case present");
    assert_eq!(loaded.state, CaseState::Parsing);
}

#[test]
fn fingerprint_put_if_absent_is_idempotent() {
    let store = SqliteCaseStore::open_in_memory().expect("open store");
    let tenant_id = TenantId::new("tenant-1");
    let fingerprint: OrderFingerprint =
        serde_json::from_str(r#""abc123""#).expect("transparent fingerprint deserialization");
    let first = CaseId::new("case-first");
    let second = CaseId::new("case-second");

    let owner_one = store
        .put_if_absent(&tenant_id, &fingerprint, &first)
        .expect("first claim");
    assert_eq!(owner_one, first);

    let owner_two = store
        .put_if_absent(&tenant_id, &fingerprint, &second)
        .expect("second claim observes existing owner");
    assert_eq!(owner_two, first, "second claimant must see the first owner, not win the race");

    let fetched = store
        .get(&tenant_id, &fingerprint)
        .expect("get fingerprint")
        .expect("fingerprint present");
    assert_eq!(fetched, first);
}

#[test]
fn fingerprint_scoped_per_tenant() {
    let store = SqliteCaseStore::open_in_memory().expect("open store");
    let fingerprint: OrderFingerprint =
        serde_json::from_str(r#""shared-fp""#).expect("transparent fingerprint deserialization");

    let tenant_a = TenantId::new("tenant-a");
    let tenant_b = TenantId::new("tenant-b");

    store
        .put_if_absent(&tenant_a, &fingerprint, &CaseId::new("case-a"))
        .expect("claim in tenant a");
    let owner_b = store
        .put_if_absent(&tenant_b, &fingerprint, &CaseId::new("case-b"))
        .expect("claim in tenant b");

    assert_eq!(owner_b, CaseId::new("case-b"), "tenants do not share fingerprint claims");
}

#[test]
fn reopening_an_existing_database_preserves_data() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("cases.sqlite3");
    let config = SqliteStoreConfig {
        path: path.clone(),
        busy_timeout_ms: 1_000,
        journal_mode: SqliteStoreMode::Wal,
        sync_mode: SqliteSyncMode::Full,
    };

    {
        let store = SqliteCaseStore::open(&config).expect("open store");
        store.save(&sample_case("case-1")).expect("save case");
    }

    let store = SqliteCaseStore::open(&config).expect("reopen store");
    let loaded = store
        .load(&TenantId::new("tenant-1"), &CaseId::new("case-1"))
        .expect("load case")
        .expect("case present after reopen");
    assert_eq!(loaded.state, CaseState::Received);
}
