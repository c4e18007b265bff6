// caseflow-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Case Store
// Description: Durable CaseStore and FingerprintIndex backend using SQLite WAL.
// Purpose: Provide production-grade persistence for caseflow case records and
//          the idempotency fingerprint index.
// Dependencies: caseflow-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`caseflow_core::CaseStore`] and
//! [`caseflow_core::FingerprintIndex`] implementation. Each case save writes a
//! canonical JSON snapshot plus its append-only event history; the
//! fingerprint index uses a `UNIQUE` constraint so `put_if_absent` is a true
//! transactional compare-and-set, safe across concurrent workflow workers.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::MAX_CASE_BYTES;
pub use store::SqliteCaseStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
