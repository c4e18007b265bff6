// caseflow-core/src/core/mod.rs
// ============================================================================
// Module: Caseflow Core Types
// Description: Canonical case, order, committee, and identifier structures.
// Purpose: Provide stable, serializable types shared by every caseflow crate.
// Dependencies: caseflow-logic, serde
// ============================================================================

//! ## Overview
//! Caseflow core types define the case state machine's persisted shape, the
//! normalized order model with cell-level provenance, the committee voting
//! model, and the idempotency fingerprint. These types are the canonical
//! source of truth for every derived surface (ingress API, CLI, store).

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod case;
pub mod committee;
pub mod fingerprint;
pub mod hashing;
pub mod identifiers;
pub mod order;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use case::Actor;
pub use case::Case;
pub use case::CaseEvent;
pub use case::CaseEventKind;
pub use case::CaseState;
pub use committee::AggregatedVotes;
pub use committee::CommitteeResult;
pub use committee::Consensus;
pub use committee::FieldVote;
pub use committee::ProviderFamily;
pub use committee::ProviderOutput;
pub use fingerprint::FingerprintError;
pub use fingerprint::OrderFingerprint;
pub use fingerprint::compute_fingerprint;
pub use hashing::DEFAULT_HASH_ALGORITHM;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use hashing::hash_bytes;
pub use identifiers::CaseId;
pub use identifiers::ColumnId;
pub use identifiers::CorrelationId;
pub use identifiers::CustomerRef;
pub use identifiers::DraftReference;
pub use identifiers::FieldId;
pub use identifiers::ItemRef;
pub use identifiers::ProviderId;
pub use identifiers::SheetName;
pub use identifiers::SubmitterId;
pub use identifiers::TaskId;
pub use identifiers::TenantId;
pub use order::CanonicalOrder;
pub use order::ColumnStat;
pub use order::DetectedLanguage;
pub use order::EvidenceCell;
pub use order::Issue;
pub use order::IssueSeverity;
pub use order::LineItem;
pub use order::SchemaInference;
pub use order::Totals;
pub use time::Timestamp;
pub use time::utc_date_bucket;
