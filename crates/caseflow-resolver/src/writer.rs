// caseflow-resolver/src/writer.rs
// ============================================================================
// Module: Draft Writer
// Description: Idempotent draft sales order creation against the external
//              accounting system.
// Purpose: Implement the draft writer activity: fingerprint claim,
//          idempotent short-circuit, and 4xx/401/403/429/5xx error
//          classification.
// Dependencies: caseflow-core
// ============================================================================

//! ## Overview
//! The draft writer runs only after a human (or the auto-accept policy) has
//! approved a case. It claims the order's fingerprint through
//! [`FingerprintIndex::put_if_absent`] before calling the external system, so
//! that two concurrent attempts to write the same order are collapsed into
//! one external call: the loser simply reads the draft reference off the
//! case that won the claim. Remote errors are classified into the error
//! codes `caseflow-config`'s retry policy table keys on
//! (`ZOHO_VALIDATION_ERROR`, `auth-invalid`), never retried blindly.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use caseflow_core::CaseId;
use caseflow_core::CaseStore;
use caseflow_core::CatalogError;
use caseflow_core::DraftOrderRequest;
use caseflow_core::DraftReference;
use caseflow_core::ExternalCatalogClient;
use caseflow_core::FingerprintIndex;
use caseflow_core::FingerprintIndexError;
use caseflow_core::OrderFingerprint;
use caseflow_core::StoreError;
use caseflow_core::TenantId;

// ============================================================================
// SECTION: Outcome
// ============================================================================

/// Outcome of a draft write attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftWriteOutcome {
    /// A new draft order was created in the external system.
    Created {
        /// Reference returned by the external system.
        reference: DraftReference,
    },
    /// The fingerprint was already claimed by another case that has already
    /// recorded a draft reference; that reference is returned unchanged.
    AlreadyExists {
        /// Reference recorded by the case that first claimed the fingerprint.
        reference: DraftReference,
    },
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Draft write failure, classified by retryability.
#[derive(Debug, Error)]
pub enum DraftWriteError {
    /// 4xx semantic error (missing required field, invalid customer):
    /// non-retryable.
    #[error("external system rejected the draft order: {0}")]
    Validation(String),
    /// 401/403 from the external system: non-retryable.
    #[error("external system authentication rejected: {0}")]
    AuthInvalid(String),
    /// 429, 5xx, or a network failure: retryable per the workflow's policy.
    #[error("external system call failed transiently: {0}")]
    Transient(String),
    /// The case that first claimed this fingerprint could not be loaded, or
    /// recorded no draft reference yet; the caller should retry shortly.
    #[error("fingerprint already claimed by case {0} with no draft reference recorded yet")]
    ClaimPending(CaseId),
    /// Underlying case store failure.
    #[error("case store error: {0}")]
    Store(#[from] StoreError),
    /// Underlying fingerprint index failure.
    #[error("fingerprint index error: {0}")]
    FingerprintIndex(#[from] FingerprintIndexError),
}

impl DraftWriteError {
    /// Returns the stable error code the workflow's retry policy keys on.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "ZOHO_VALIDATION_ERROR",
            Self::AuthInvalid(_) => "auth-invalid",
            Self::Transient(_) => "external-service-unavailable",
            Self::ClaimPending(_) => "claim-pending",
            Self::Store(_) | Self::FingerprintIndex(_) => "internal-error",
        }
    }
}

// ============================================================================
// SECTION: Draft Write
// ============================================================================

/// Writes the draft order for `case_id`, claiming `fingerprint` first so a
/// second call with the same fingerprint (a retried activity, or a racing
/// duplicate case) never creates a second draft order.
///
/// # Errors
///
/// Returns [`DraftWriteError`] when the fingerprint claim, the case lookup,
/// or the external draft-order call fails.
pub fn write_draft(
    case_store: &dyn CaseStore,
    fingerprint_index: &dyn FingerprintIndex,
    catalog: &dyn ExternalCatalogClient,
    tenant_id: &TenantId,
    case_id: &CaseId,
    fingerprint: &OrderFingerprint,
    request: &DraftOrderRequest,
) -> Result<DraftWriteOutcome, DraftWriteError> {
    let owner = fingerprint_index.put_if_absent(tenant_id, fingerprint, case_id)?;
    if owner != *case_id {
        return match case_store.load(tenant_id, &owner)?.and_then(|case| case.draft_reference) {
            Some(reference) => Ok(DraftWriteOutcome::AlreadyExists { reference }),
            None => Err(DraftWriteError::ClaimPending(owner)),
        };
    }

    match catalog.create_draft_order(request) {
        Ok(reference) => Ok(DraftWriteOutcome::Created { reference }),
        Err(CatalogError::Remote { status, message }) => Err(classify_remote_error(status, message)),
        Err(CatalogError::Transport(message)) => Err(DraftWriteError::Transient(message)),
    }
}

/// Classifies an external system's HTTP-style status: 401/403 are auth
/// failures, 429 is retried per policy alongside 5xx, and the remaining
/// 4xx range is a non-retryable validation rejection.
fn classify_remote_error(status: u16, message: String) -> DraftWriteError {
    match status {
        401 | 403 => DraftWriteError::AuthInvalid(message),
        429 => DraftWriteError::Transient(message),
        400..=499 => DraftWriteError::Validation(message),
        _ => DraftWriteError::Transient(message),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use caseflow_core::Case;
    use caseflow_core::CaseState;
    use caseflow_core::DraftOrderLine;
    use caseflow_core::InMemoryCaseStore;
    use caseflow_core::InMemoryFingerprintIndex;
    use caseflow_core::ItemRef;
    use caseflow_core::SubmitterId;
    use caseflow_core::Timestamp;
    use std::cell::Cell;

    struct StubCatalog {
        result: Cell<Option<Result<DraftReference, u16>>>,
    }

    impl ExternalCatalogClient for StubCatalog {
        fn search_customers(&self, _query: &str) -> Result<Vec<caseflow_core::CustomerCandidate>, CatalogError> {
            Ok(Vec::new())
        }

        fn search_items(&self, _query: &str) -> Result<Vec<caseflow_core::ItemCandidate>, CatalogError> {
            Ok(Vec::new())
        }

        fn create_draft_order(&self, _request: &DraftOrderRequest) -> Result<DraftReference, CatalogError> {
            match self.result.take() {
                Some(Ok(reference)) => Ok(reference),
                Some(Err(status)) => Err(CatalogError::Remote { status, message: "rejected".to_string() }),
                None => Err(CatalogError::Transport("no stubbed result".to_string())),
            }
        }
    }

    fn sample_request() -> DraftOrderRequest {
        DraftOrderRequest {
            customer_ref: caseflow_core::CustomerRef::new("cust-1"),
            lines: vec![DraftOrderLine {
                item_ref: ItemRef::new("item-1"),
                quantity: "1".to_string(),
                unit_price: "9.99".to_string(),
            }],
            idempotency_key: "fp-1".to_string(),
        }
    }

    fn bare_case(tenant_id: &TenantId, case_id: &CaseId, draft_reference: Option<DraftReference>) -> Case {
        Case {
            tenant_id: tenant_id.clone(),
            case_id: case_id.clone(),
            submitter_id: SubmitterId::new("submitter-1"),
            state: if draft_reference.is_some() { CaseState::Completed } else { CaseState::Drafting },
            created_at: Timestamp::Logical(0),
            updated_at: Timestamp::Logical(0),
            order: None,
            issues: Vec::new(),
            committee_result: None,
            fingerprint: None,
            draft_reference,
            history: Vec::new(),
        }
    }

    #[test]
    fn creates_draft_on_first_claim() {
        let tenant_id = TenantId::new("tenant-1");
        let case_id = CaseId::new("case-1");
        let fingerprint = OrderFingerprint::new("fp-1".to_string());
        let case_store = InMemoryCaseStore::default();
        let fingerprint_index = InMemoryFingerprintIndex::default();
        let catalog = StubCatalog { result: Cell::new(Some(Ok(DraftReference::new("draft-1")))) };

        let outcome =
            write_draft(&case_store, &fingerprint_index, &catalog, &tenant_id, &case_id, &fingerprint, &sample_request())
                .expect("writes");
        assert_eq!(outcome, DraftWriteOutcome::Created { reference: DraftReference::new("draft-1") });
    }

    #[test]
    fn second_case_reuses_first_case_draft_reference() {
        let tenant_id = TenantId::new("tenant-1");
        let winner_case_id = CaseId::new("case-winner");
        let loser_case_id = CaseId::new("case-loser");
        let fingerprint = OrderFingerprint::new("fp-1".to_string());

        let case_store = InMemoryCaseStore::default();
        let fingerprint_index = InMemoryFingerprintIndex::default();
        fingerprint_index
            .put_if_absent(&tenant_id, &fingerprint, &winner_case_id)
            .expect("claims");
        case_store
            .save(&bare_case(&tenant_id, &winner_case_id, Some(DraftReference::new("draft-1"))))
            .expect("saves");

        let catalog = StubCatalog { result: Cell::new(None) };
        let outcome = write_draft(
            &case_store,
            &fingerprint_index,
            &catalog,
            &tenant_id,
            &loser_case_id,
            &fingerprint,
            &sample_request(),
        )
        .expect("returns existing reference without calling the catalog");
        assert_eq!(outcome, DraftWriteOutcome::AlreadyExists { reference: DraftReference::new("draft-1") });
    }

    #[test]
    fn four_hundred_status_is_validation_error() {
        let tenant_id = TenantId::new("tenant-1");
        let case_id = CaseId::new("case-1");
        let fingerprint = OrderFingerprint::new("fp-1".to_string());
        let case_store = InMemoryCaseStore::default();
        let fingerprint_index = InMemoryFingerprintIndex::default();
        let catalog = StubCatalog { result: Cell::new(Some(Err(400))) };

        let error =
            write_draft(&case_store, &fingerprint_index, &catalog, &tenant_id, &case_id, &fingerprint, &sample_request())
                .expect_err("rejected");
        assert_eq!(error.error_code(), "ZOHO_VALIDATION_ERROR");
    }

    #[test]
    fn four_oh_one_status_is_auth_invalid() {
        let tenant_id = TenantId::new("tenant-1");
        let case_id = CaseId::new("case-1");
        let fingerprint = OrderFingerprint::new("fp-1".to_string());
        let case_store = InMemoryCaseStore::default();
        let fingerprint_index = InMemoryFingerprintIndex::default();
        let catalog = StubCatalog { result: Cell::new(Some(Err(401))) };

        let error =
            write_draft(&case_store, &fingerprint_index, &catalog, &tenant_id, &case_id, &fingerprint, &sample_request())
                .expect_err("rejected");
        assert_eq!(error.error_code(), "auth-invalid");
    }

    #[test]
    fn five_hundred_status_is_transient() {
        let tenant_id = TenantId::new("tenant-1");
        let case_id = CaseId::new("case-1");
        let fingerprint = OrderFingerprint::new("fp-1".to_string());
        let case_store = InMemoryCaseStore::default();
        let fingerprint_index = InMemoryFingerprintIndex::default();
        let catalog = StubCatalog { result: Cell::new(Some(Err(503))) };

        let error =
            write_draft(&case_store, &fingerprint_index, &catalog, &tenant_id, &case_id, &fingerprint, &sample_request())
                .expect_err("rejected");
        assert_eq!(error.error_code(), "external-service-unavailable");
    }
}
