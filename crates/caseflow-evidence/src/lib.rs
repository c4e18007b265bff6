// caseflow-evidence/src/lib.rs
// ============================================================================
// Module: Evidence Store
// Description: Write-once evidence storage and append-only audit trail.
// Purpose: Preserve source workbooks, committee outputs, and writer
//          request/response pairs for replay and audit, under the
//          content-addressed layout the workflow engine expects.
// Dependencies: caseflow-core, serde_json, sha2 (via caseflow-core hashing)
// ============================================================================

//! ## Overview
//! This crate provides concrete [`caseflow_core::interfaces::EvidenceSink`]
//! and [`caseflow_core::interfaces::EvidenceReader`] backends. The default
//! backend is a local filesystem store suitable for a single-node deployment
//! or for tests; the `s3` feature adds an object-storage backend for
//! multi-node deployments. Both backends enforce write-once semantics: a
//! path that already holds an artifact cannot be silently overwritten.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod fs_store;
pub mod paths;

#[cfg(feature = "s3")]
pub mod s3_store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuditTrail;
pub use fs_store::FsEvidenceStore;
pub use fs_store::FsEvidenceStoreError;
pub use paths::EvidencePathError;

#[cfg(feature = "s3")]
pub use s3_store::S3EvidenceStore;
#[cfg(feature = "s3")]
pub use s3_store::S3EvidenceStoreConfig;
#[cfg(feature = "s3")]
pub use s3_store::S3EvidenceStoreError;
