// caseflow-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Case Store
// Description: Durable Case/FingerprintIndex backend using SQLite WAL.
// Purpose: Persist case records with deterministic serialization and give the
//          order-fingerprint index a true transactional compare-and-set.
// Dependencies: caseflow-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This module implements [`SqliteCaseStore`], a durable backend for
//! [`caseflow_core::CaseStore`] and [`caseflow_core::FingerprintIndex`]. Every
//! `save` writes a canonical JSON snapshot of the [`Case`] keyed by
//! `(tenant_id, case_id)`; the fingerprint table enforces uniqueness on
//! `(tenant_id, fingerprint)` so `put_if_absent` never races, even when two
//! workflow workers attempt to claim the same fingerprint concurrently on
//! different processes (§5, "Shared resources").

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;

use caseflow_core::Case;
use caseflow_core::CaseId;
use caseflow_core::OrderFingerprint;
use caseflow_core::TenantId;
use caseflow_core::interfaces::CaseStore;
use caseflow_core::interfaces::FingerprintIndex;
use caseflow_core::interfaces::FingerprintIndexError;
use caseflow_core::interfaces::StoreError;
use rusqlite::Connection;
use rusqlite::ErrorCode;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum serialized case size accepted by the store. A canonical order with
/// thousands of line items and a full committee audit trail is still well
/// under this; anything larger indicates a caller bug, not a large order.
pub const MAX_CASE_BYTES: usize = 16 * 1024 * 1024;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended; allows concurrent readers).
    #[default]
    Wal,
    /// Delete journal mode (legacy, single-writer friendly for tests).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest, recommended for the case store).
    #[default]
    Full,
    /// Normal synchronous mode (balanced; acceptable with WAL).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` case store.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Store corruption or serialization failure.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: found {found}, expected {expected}")]
    VersionMismatch {
        /// Schema version recorded in the database file.
        found: i64,
        /// Schema version this build expects.
        expected: i64,
    },
    /// Store payload exceeded configured size limits.
    #[error("sqlite store payload too large: {actual_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual payload size in bytes.
        actual_bytes: usize,
    },
}

impl From<rusqlite::Error> for SqliteStoreError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Db(err.to_string())
    }
}

impl From<SqliteStoreError> for StoreError {
    fn from(err: SqliteStoreError) -> Self {
        match err {
            SqliteStoreError::Io(msg) => Self::Io(msg),
            SqliteStoreError::Db(msg) => Self::Store(msg),
            SqliteStoreError::Corrupt(msg) => Self::Corrupt(msg),
            SqliteStoreError::VersionMismatch { found, expected } => {
                Self::VersionMismatch(format!("found {found}, expected {expected}"))
            }
            SqliteStoreError::TooLarge {
                max_bytes,
                actual_bytes,
            } => Self::Invalid(format!(
                "payload too large: {actual_bytes} bytes (max {max_bytes})"
            )),
        }
    }
}

impl From<SqliteStoreError> for FingerprintIndexError {
    fn from(err: SqliteStoreError) -> Self {
        Self::Io(err.to_string())
    }
}

// ============================================================================
// SECTION: Schema
// ============================================================================

const SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS schema_meta (
    id INTEGER PRIMARY KEY CHECK (id = 0),
    version INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS cases (
    tenant_id TEXT NOT NULL,
    case_id TEXT NOT NULL,
    state TEXT NOT NULL,
    updated_at_json TEXT NOT NULL,
    payload TEXT NOT NULL,
    PRIMARY KEY (tenant_id, case_id)
);
CREATE TABLE IF NOT EXISTS fingerprints (
    tenant_id TEXT NOT NULL,
    fingerprint TEXT NOT NULL,
    case_id TEXT NOT NULL,
    PRIMARY KEY (tenant_id, fingerprint)
);
";

fn initialize_schema(conn: &Connection) -> Result<(), SqliteStoreError> {
    conn.execute_batch(SCHEMA_SQL)?;
    let existing: Option<i64> = conn
        .query_row(
            "SELECT version FROM schema_meta WHERE id = 0",
            [],
            |row| row.get(0),
        )
        .optional()?;
    match existing {
        None => {
            conn.execute(
                "INSERT INTO schema_meta (id, version) VALUES (0, ?1)",
                params![SCHEMA_VERSION],
            )?;
        }
        Some(found) if found != SCHEMA_VERSION => {
            return Err(SqliteStoreError::VersionMismatch {
                found,
                expected: SCHEMA_VERSION,
            });
        }
        Some(_) => {}
    }
    Ok(())
}

fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    if let Some(parent) = config.path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))?;
    }
    let conn = Connection::open_with_flags(
        &config.path,
        OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    conn.busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))?;
    conn.pragma_update(None, "journal_mode", config.journal_mode.pragma_value())?;
    conn.pragma_update(None, "synchronous", config.sync_mode.pragma_value())?;
    conn.pragma_update(None, "foreign_keys", "on")?;
    initialize_schema(&conn)?;
    Ok(conn)
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed [`CaseStore`] and [`FingerprintIndex`].
///
/// # Invariants
/// - A single [`Connection`] is shared behind a mutex; `SQLite`'s own
///   file-level locking is the concurrency boundary across processes.
pub struct SqliteCaseStore {
    /// Guarded connection; `rusqlite::Connection` is `!Sync`.
    conn: Mutex<Connection>,
}

impl SqliteCaseStore {
    /// Opens (creating if absent) a `SQLite`-backed case store at the
    /// configured path.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or its
    /// schema version does not match this build.
    pub fn open(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        let conn = open_connection(config)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens an in-memory store for tests.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the in-memory database cannot be
    /// initialized.
    pub fn open_in_memory() -> Result<Self, SqliteStoreError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, SqliteStoreError> {
        self.conn
            .lock()
            .map_err(|_| SqliteStoreError::Db("case store connection mutex poisoned".to_string()))
    }
}

impl CaseStore for SqliteCaseStore {
    fn load(&self, tenant_id: &TenantId, case_id: &CaseId) -> Result<Option<Case>, StoreError> {
        let conn = self.lock().map_err(StoreError::from)?;
        let payload: Option<String> = conn
            .query_row(
                "SELECT payload FROM cases WHERE tenant_id = ?1 AND case_id = ?2",
                params![tenant_id.as_str(), case_id.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| StoreError::from(SqliteStoreError::from(err)))?;
        match payload {
            None => Ok(None),
            Some(json) => {
                let case: Case = serde_json::from_str(&json)
                    .map_err(|err| StoreError::Corrupt(err.to_string()))?;
                Ok(Some(case))
            }
        }
    }

    fn save(&self, case: &Case) -> Result<(), StoreError> {
        let json =
            serde_json::to_string(case).map_err(|err| StoreError::Invalid(err.to_string()))?;
        if json.len() > MAX_CASE_BYTES {
            return Err(StoreError::from(SqliteStoreError::TooLarge {
                max_bytes: MAX_CASE_BYTES,
                actual_bytes: json.len(),
            }));
        }
        let state_json = serde_json::to_string(&case.state)
            .map_err(|err| StoreError::Invalid(err.to_string()))?;
        let updated_at_json = serde_json::to_string(&case.updated_at)
            .map_err(|err| StoreError::Invalid(err.to_string()))?;
        let conn = self.lock().map_err(StoreError::from)?;
        conn.execute(
            "INSERT INTO cases (tenant_id, case_id, state, updated_at_json, payload)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(tenant_id, case_id) DO UPDATE SET
                state = excluded.state,
                updated_at_json = excluded.updated_at_json,
                payload = excluded.payload",
            params![
                case.tenant_id.as_str(),
                case.case_id.as_str(),
                state_json,
                updated_at_json,
                json,
            ],
        )
        .map_err(|err| StoreError::from(SqliteStoreError::from(err)))?;
        Ok(())
    }
}

impl FingerprintIndex for SqliteCaseStore {
    fn get(
        &self,
        tenant_id: &TenantId,
        fingerprint: &OrderFingerprint,
    ) -> Result<Option<CaseId>, FingerprintIndexError> {
        let conn = self
            .lock()
            .map_err(|err| FingerprintIndexError::Io(err.to_string()))?;
        let case_id: Option<String> = conn
            .query_row(
                "SELECT case_id FROM fingerprints WHERE tenant_id = ?1 AND fingerprint = ?2",
                params![tenant_id.as_str(), fingerprint.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| FingerprintIndexError::Io(err.to_string()))?;
        Ok(case_id.map(CaseId::new))
    }

    fn put_if_absent(
        &self,
        tenant_id: &TenantId,
        fingerprint: &OrderFingerprint,
        case_id: &CaseId,
    ) -> Result<CaseId, FingerprintIndexError> {
        let conn = self
            .lock()
            .map_err(|err| FingerprintIndexError::Io(err.to_string()))?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO fingerprints (tenant_id, fingerprint, case_id)
             VALUES (?1, ?2, ?3)",
            params![tenant_id.as_str(), fingerprint.as_str(), case_id.as_str()],
        );
        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(err, _)) if err.code == ErrorCode::ConstraintViolation => {}
            Err(err) => return Err(FingerprintIndexError::Io(err.to_string())),
        }
        let owner: String = conn
            .query_row(
                "SELECT case_id FROM fingerprints WHERE tenant_id = ?1 AND fingerprint = ?2",
                params![tenant_id.as_str(), fingerprint.as_str()],
                |row| row.get(0),
            )
            .map_err(|err| FingerprintIndexError::Io(err.to_string()))?;
        Ok(CaseId::new(owner))
    }
}

/// Removes the database file at `path` along with its WAL/SHM siblings, for
/// tests that want a clean slate between runs.
///
/// # Errors
///
/// Returns [`SqliteStoreError`] when a present file cannot be removed.
pub fn purge_database_files(path: &Path) -> Result<(), SqliteStoreError> {
    for suffix in ["", "-wal", "-shm"] {
        let candidate = PathBuf::from(format!("{}{suffix}", path.display()));
        if candidate.exists() {
            std::fs::remove_file(&candidate)
                .map_err(|err| SqliteStoreError::Io(err.to_string()))?;
        }
    }
    Ok(())
}
