//! `SQLite` crash writer for case store durability tests.
// caseflow-store-sqlite/src/bin/sqlite_crash_writer.rs
// ============================================================================
// Binary: SQLite Crash Writer
// Description: Simulates a crash during an uncommitted case-store write.
// Purpose: Support durability tests for rollback/crash recovery behavior.
// Dependencies: caseflow-core, caseflow-store-sqlite, rusqlite
// ============================================================================

use std::env;
use std::path::PathBuf;

use caseflow_core::Case;
use caseflow_core::CaseId;
use caseflow_core::CaseState;
use caseflow_core::SubmitterId;
use caseflow_core::TenantId;
use caseflow_core::Timestamp;
use caseflow_store_sqlite::SqliteCaseStore;
use caseflow_store_sqlite::SqliteStoreConfig;
use caseflow_store_sqlite::SqliteStoreMode;
use caseflow_store_sqlite::SqliteSyncMode;
use rusqlite::params;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let path = args.next().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "missing sqlite path")
    })?;
    let case_id = args.next().unwrap_or_else(|| "case-1".to_string());
    let path = PathBuf::from(path);

    let config = SqliteStoreConfig {
        path: path.clone(),
        busy_timeout_ms: 1_000,
        journal_mode: SqliteStoreMode::Wal,
        sync_mode: SqliteSyncMode::Full,
    };
    // Open once through the real store so the schema is created, then
    // reopen a raw connection and begin an uncommitted write directly
    // against the `cases` table, bypassing `save`'s transaction boundary.
    let _store = SqliteCaseStore::open(&config)?;
    let case = sample_case(&case_id);
    let payload = serde_json::to_string(&case)?;
    let state_json = serde_json::to_string(&case.state)?;
    let updated_at_json = serde_json::to_string(&case.updated_at)?;

    let conn = rusqlite::Connection::open(&path)?;
    conn.execute_batch(
        "PRAGMA foreign_keys = ON; PRAGMA journal_mode = wal; PRAGMA synchronous = full;",
    )?;
    conn.execute(
        "INSERT INTO cases (tenant_id, case_id, state, updated_at_json, payload)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            case.tenant_id.as_str(),
            case.case_id.as_str(),
            state_json,
            updated_at_json,
            payload,
        ],
    )?;

    std::process::abort();
}

/// Builds a minimal case used by the crash writer.
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
