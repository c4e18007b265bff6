// caseflow-core/src/interfaces/mod.rs
// ============================================================================
// Module: Caseflow Interfaces
// Description: Backend-agnostic interfaces for storage, evidence, catalog
//              resolution, draft creation, and notification.
// Purpose: Define the contract surfaces used by the caseflow runtime so that
//          concrete backends (SQLite, S3, a specific accounting API) can be
//          swapped without touching the engine.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Interfaces define how caseflow integrates with external systems without
//! embedding backend-specific details into the engine. Implementations must
//! be deterministic where the engine depends on determinism, and must fail
//! closed on missing or invalid data.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::Case;
use crate::core::CaseId;
use crate::core::CustomerRef;
use crate::core::ItemRef;
use crate::core::OrderFingerprint;
use crate::core::TenantId;

// ============================================================================
// SECTION: Case Store
// ============================================================================

/// Case store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("case store io error: {0}")]
    Io(String),
    /// Store data is corrupted or fails integrity checks.
    #[error("case store corruption: {0}")]
    Corrupt(String),
    /// Store data version is incompatible.
    #[error("case store version mismatch: {0}")]
    VersionMismatch(String),
    /// Store data is invalid.
    #[error("case store invalid data: {0}")]
    Invalid(String),
    /// Store reported an error.
    #[error("case store error: {0}")]
    Store(String),
}

/// Case persistence for the workflow engine.
pub trait CaseStore {
    /// Loads a case by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn load(&self, tenant_id: &TenantId, case_id: &CaseId) -> Result<Option<Case>, StoreError>;

    /// Saves a case, overwriting any prior persisted state.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when saving fails.
    fn save(&self, case: &Case) -> Result<(), StoreError>;
}

// ============================================================================
// SECTION: Fingerprint Index
// ============================================================================

/// Fingerprint index errors.
#[derive(Debug, Error)]
pub enum FingerprintIndexError {
    /// Underlying store I/O error.
    #[error("fingerprint index io error: {0}")]
    Io(String),
}

/// Transactional compare-and-set index from an order fingerprint to the case
/// that first claimed it.
///
/// # Invariants
/// - `put_if_absent` is atomic: concurrent callers racing on the same
///   fingerprint must observe exactly one winner.
pub trait FingerprintIndex {
    /// Returns the case id already associated with a fingerprint, if any.
    ///
    /// # Errors
    ///
    /// Returns [`FingerprintIndexError`] when the lookup fails.
    fn get(
        &self,
        tenant_id: &TenantId,
        fingerprint: &OrderFingerprint,
    ) -> Result<Option<CaseId>, FingerprintIndexError>;

    /// Atomically associates a fingerprint with a case id if no association
    /// exists yet. Returns the case id that now owns the fingerprint, which
    /// is `case_id` on a fresh claim or the pre-existing owner otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`FingerprintIndexError`] when the write fails.
    fn put_if_absent(
        &self,
        tenant_id: &TenantId,
        fingerprint: &OrderFingerprint,
        case_id: &CaseId,
    ) -> Result<CaseId, FingerprintIndexError>;
}

// ============================================================================
// SECTION: Evidence Sink / Reader
// ============================================================================

/// An evidence artifact to be written to the write-once evidence store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceArtifact {
    /// Content-addressed relative path the artifact will be stored under.
    pub path: String,
    /// Content type for the artifact.
    pub content_type: Option<String>,
    /// Artifact bytes.
    pub bytes: Vec<u8>,
}

/// Reference to a stored evidence artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceRef {
    /// Storage-relative path or external URI.
    pub uri: String,
}

/// Evidence store errors.
#[derive(Debug, Error)]
pub enum EvidenceError {
    /// Evidence store reported an error.
    #[error("evidence store error: {0}")]
    Store(String),
    /// Attempted to overwrite an existing write-once artifact.
    #[error("evidence artifact already exists: {0}")]
    AlreadyExists(String),
}

/// Write-once evidence sink.
pub trait EvidenceSink {
    /// Writes an artifact into the evidence store.
    ///
    /// # Errors
    ///
    /// Returns [`EvidenceError::AlreadyExists`] if the path is already
    /// populated, or [`EvidenceError::Store`] on other failures.
    fn write(&self, artifact: &EvidenceArtifact) -> Result<EvidenceRef, EvidenceError>;
}

/// Evidence reader for retrieval during review or audit.
pub trait EvidenceReader {
    /// Reads artifact bytes from the evidence store.
    ///
    /// # Errors
    ///
    /// Returns [`EvidenceError`] when reading fails.
    fn read(&self, path: &str) -> Result<Vec<u8>, EvidenceError>;
}

// ============================================================================
// SECTION: External Catalog Client
// ============================================================================

/// A customer record candidate returned by the external catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerCandidate {
    /// Candidate customer reference.
    pub customer_ref: CustomerRef,
    /// Display name as stored in the catalog.
    pub display_name: String,
    /// Match confidence in `[0, 1]` as computed by the catalog lookup.
    pub score: f64,
}

/// An item record candidate returned by the external catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemCandidate {
    /// Candidate item reference.
    pub item_ref: ItemRef,
    /// Display name as stored in the catalog.
    pub display_name: String,
    /// Match confidence in `[0, 1]` as computed by the catalog lookup.
    pub score: f64,
}

/// Request to create a draft sales order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftOrderRequest {
    /// Resolved customer reference.
    pub customer_ref: CustomerRef,
    /// Resolved line items, each with an item reference and quantity/price.
    pub lines: Vec<DraftOrderLine>,
    /// Idempotency key sent to the external system.
    pub idempotency_key: String,
}

/// A single resolved draft order line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftOrderLine {
    /// Resolved item reference.
    pub item_ref: ItemRef,
    /// Ordered quantity as a decimal string.
    pub quantity: String,
    /// Unit price as a decimal string.
    pub unit_price: String,
}

/// External catalog and draft-order client errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The external system answered with an HTTP-style status and message.
    #[error("external catalog error ({status}): {message}")]
    Remote {
        /// HTTP-style status code returned by the external system.
        status: u16,
        /// Human-readable error detail from the external system.
        message: String,
    },
    /// The call could not be completed due to a transport failure (network,
    /// DNS, TLS, connection reset).
    #[error("external catalog transport error: {0}")]
    Transport(String),
}

/// Backend-agnostic client for the external accounting/catalog system.
pub trait ExternalCatalogClient {
    /// Searches for customer candidates matching free text.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the search fails.
    fn search_customers(&self, query: &str) -> Result<Vec<CustomerCandidate>, CatalogError>;

    /// Searches for item candidates matching a SKU, GTIN, or description.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the search fails.
    fn search_items(&self, query: &str) -> Result<Vec<ItemCandidate>, CatalogError>;

    /// Creates a draft sales order, or returns the existing draft reference
    /// when `idempotency_key` was already used.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the creation call fails.
    fn create_draft_order(
        &self,
        request: &DraftOrderRequest,
    ) -> Result<crate::core::identifiers::DraftReference, CatalogError>;
}

// ============================================================================
// SECTION: Notification Sink
// ============================================================================

/// Notification delivery errors.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// The notification channel reported an error.
    #[error("notification delivery error: {0}")]
    Delivery(String),
}

/// Sink for posting case status and confirmation requests back to the
/// originating chat channel.
pub trait NotificationSink {
    /// Posts a plain-text notification associated with a case.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError`] when delivery fails.
    fn notify(&self, case_id: &CaseId, message: &str) -> Result<(), NotificationError>;
}

// ============================================================================
// SECTION: Trigger Sources
// ============================================================================

/// An externally delivered event that creates or advances a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseTrigger {
    /// Tenant the trigger applies to.
    pub tenant_id: TenantId,
    /// Case the trigger applies to, when it references an existing case.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_id: Option<CaseId>,
    /// Trigger payload as received from the ingress surface.
    pub payload: serde_json::Value,
}

/// Trigger source for push-mode ingestion from the ingress surface.
pub trait TriggerSource {
    /// Returns the next available trigger event, if any.
    fn next_trigger(&mut self) -> Option<CaseTrigger>;
}
