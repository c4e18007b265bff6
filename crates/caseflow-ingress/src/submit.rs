// caseflow-ingress/src/submit.rs
// ============================================================================
// Module: Caseflow Ingress Submit Handler
// Description: The `submit-order` operation: creates a new case from an
//              uploaded workbook reference.
// Purpose: Turn a validated upload notification into a persisted case and a
//          queued trigger for the parsing worker, guarding against duplicate
//          same-day resubmission of an identical file.
// Dependencies: axum, caseflow-broker, caseflow-core, rand
// ============================================================================

//! ## Overview
//! Submission does not parse the workbook itself; it only creates the case
//! record in [`caseflow_core::CaseState::Received`], appends a `Submitted`
//! event (advancing it to `Parsing`), and enqueues a [`CaseTrigger`] for the
//! worker that actually runs the parser. The submission guard exists because
//! chat-borne uploads are frequently retried by the client; it is deliberately
//! coarser than the full [`caseflow_core::OrderFingerprint`] used later for
//! draft idempotency, since no parsed order exists yet at this point.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::response::Response;
use caseflow_core::Case;
use caseflow_core::CaseEvent;
use caseflow_core::CaseEventKind;
use caseflow_core::CaseId;
use caseflow_core::CaseTrigger;
use caseflow_core::CorrelationId;
use caseflow_core::FingerprintIndex;
use caseflow_core::HashAlgorithm;
use caseflow_core::HashDigest;
use caseflow_core::OrderFingerprint;
use caseflow_core::Timestamp;
use caseflow_core::apply_event;
use caseflow_core::core::Actor;
use caseflow_core::interfaces::CaseStore;
use rand::RngCore;
use rand::thread_rng;

use crate::error::IngressError;
use crate::state::AppState;
use crate::types::SubmitOrderRequest;
use crate::types::SubmitOrderResponse;

// ============================================================================
// SECTION: Submission Guard Key
// ============================================================================

/// Derives the day-bucketed dedupe key for a submission, from the tenant, the
/// caller-supplied file hash, and the current day (UTC, as unix days).
///
/// Reuses the fingerprint index's `put_if_absent` rather than a bespoke
/// transactional primitive: resubmitting the identical file within the same
/// day claims no new key and the original case id is returned.
#[must_use]
pub fn submission_guard_key(
    tenant_id: &str,
    file_sha256: &str,
    now: SystemTime,
) -> OrderFingerprint {
    let day_bucket = now
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() / 86_400)
        .unwrap_or_default();
    OrderFingerprint::new(format!("{tenant_id}:{file_sha256}:{day_bucket}"))
}

/// Generates a fresh, random case identifier.
fn new_case_id() -> CaseId {
    let mut bytes = [0_u8; 16];
    thread_rng().fill_bytes(&mut bytes);
    let hex: String = bytes.iter().map(|byte| format!("{byte:02x}")).collect();
    CaseId::new(hex)
}

/// Returns the current wall-clock time as a case-event [`Timestamp`].
///
/// Ingress is an external system boundary; unlike the engine body, it is
/// permitted to read wall-clock time to stamp events as they are accepted.
fn now_timestamp() -> Timestamp {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or_default();
    Timestamp::UnixMillis(millis)
}

// ============================================================================
// SECTION: Handler
// ============================================================================

/// Handles `POST /cases` (`submit-order`).
///
/// # Errors
///
/// Returns [`IngressError::InvalidInput`] for an empty required field,
/// [`IngressError::DuplicateFingerprintRecentlyActive`] when an identical
/// file was already submitted for the tenant today, and
/// [`IngressError::DependencyUnavailable`] when the case store or submission
/// guard fails.
pub async fn submit_order(
    State(state): State<AppState>,
    Json(request): Json<SubmitOrderRequest>,
) -> Response {
    match handle(&state, request) {
        Ok(response) => (axum::http::StatusCode::CREATED, Json(response)).into_response(),
        Err((error, correlation_id)) => error.into_response_with_correlation(&correlation_id),
    }
}

/// Synchronous handler body, separated from the axum entry point for testing
/// without spinning up an executor.
fn handle(
    state: &AppState,
    request: SubmitOrderRequest,
) -> Result<SubmitOrderResponse, (IngressError, CorrelationId)> {
    let correlation_id = request
        .correlation_id
        .clone()
        .unwrap_or_else(|| CorrelationId::new(new_case_id().as_str().to_string()));

    if request.blob_url.trim().is_empty() {
        return Err((
            IngressError::InvalidInput("blob_url must not be empty".to_string()),
            correlation_id,
        ));
    }
    if request.file_sha256.trim().is_empty() {
        return Err((
            IngressError::InvalidInput("file_sha256 must not be empty".to_string()),
            correlation_id,
        ));
    }

    let guard_key = submission_guard_key(
        request.tenant_id.as_str(),
        &request.file_sha256,
        SystemTime::now(),
    );
    let case_id = new_case_id();
    let claimed = state
        .submission_guard
        .put_if_absent(&request.tenant_id, &guard_key, &case_id)
        .map_err(|_| (IngressError::DependencyUnavailable, correlation_id.clone()))?;
    if claimed != case_id {
        return Err((
            IngressError::DuplicateFingerprintRecentlyActive,
            correlation_id,
        ));
    }

    let time = now_timestamp();
    let file_hash = HashDigest::new(HashAlgorithm::Sha256, request.file_sha256.as_bytes());
    let case = Case {
        tenant_id: request.tenant_id.clone(),
        case_id: case_id.clone(),
        submitter_id: request.submitter_id.clone(),
        state: caseflow_core::CaseState::Received,
        created_at: time,
        updated_at: time,
        order: None,
        issues: Vec::new(),
        committee_result: None,
        fingerprint: None,
        draft_reference: None,
        history: Vec::new(),
    };
    let event = CaseEvent {
        case_id: case_id.clone(),
        actor: Actor::User {
            submitter_id: request.submitter_id.clone(),
        },
        time,
        correlation_id: Some(correlation_id.clone()),
        kind: CaseEventKind::Submitted { file_hash },
    };
    let case = apply_event(case, event)
        .map_err(|_| (IngressError::DependencyUnavailable, correlation_id.clone()))?;
    state
        .case_store
        .save(&case)
        .map_err(|_| (IngressError::DependencyUnavailable, correlation_id.clone()))?;

    state.triggers.push(CaseTrigger {
        tenant_id: request.tenant_id,
        case_id: Some(case_id.clone()),
        payload: serde_json::json!({
            "op": "submit-order",
            "blob_url": request.blob_url,
            "file_name": request.file_name,
        }),
    });

    Ok(SubmitOrderResponse {
        workflow_instance_id: case_id.as_str().to_string(),
        case_id,
        correlation_id,
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "test assertions")]

    use std::sync::Arc;
    use std::time::Duration;

    use caseflow_core::InMemoryCaseStore;
    use caseflow_core::InMemoryFingerprintIndex;

    use super::*;

    fn state() -> AppState {
        AppState::new(
            InMemoryCaseStore::new(),
            Arc::new(InMemoryFingerprintIndex::new()),
            caseflow_broker::InlineSource::new(),
        )
    }

    fn request() -> SubmitOrderRequest {
        SubmitOrderRequest {
            blob_url: "blob://uploads/po-1.xlsx".to_string(),
            file_name: "po-1.xlsx".to_string(),
            file_sha256: "a".repeat(64),
            submitter_id: caseflow_core::SubmitterId::new("alice"),
            tenant_id: caseflow_core::TenantId::new("acme"),
            correlation_id: None,
        }
    }

    #[test]
    fn creates_a_case_in_parsing_state() {
        let state = state();
        let response = handle(&state, request()).expect("first submission succeeds");
        let case = state
            .case_store
            .load(
                &caseflow_core::TenantId::new("acme"),
                &response.case_id,
            )
            .unwrap()
            .expect("case was persisted");
        assert_eq!(case.state, caseflow_core::CaseState::Parsing);
        assert_eq!(case.history.len(), 1);
    }

    #[test]
    fn rejects_duplicate_same_day_submission() {
        let state = state();
        handle(&state, request()).expect("first submission succeeds");
        let (error, _) = handle(&state, request()).expect_err("second submission is a duplicate");
        assert!(matches!(
            error,
            IngressError::DuplicateFingerprintRecentlyActive
        ));
    }

    #[test]
    fn rejects_empty_blob_url() {
        let state = state();
        let mut bad = request();
        bad.blob_url = String::new();
        let (error, _) = handle(&state, bad).expect_err("empty blob_url is invalid");
        assert!(matches!(error, IngressError::InvalidInput(_)));
    }

    #[test]
    fn submission_guard_key_varies_by_day() {
        let base = UNIX_EPOCH + Duration::from_secs(0);
        let next_day = UNIX_EPOCH + Duration::from_secs(86_400);
        let first = submission_guard_key("acme", "hash", base);
        let second = submission_guard_key("acme", "hash", next_day);
        assert_ne!(first.as_str(), second.as_str());
    }
}
