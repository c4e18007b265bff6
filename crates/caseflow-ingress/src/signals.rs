// caseflow-ingress/src/signals.rs
// ============================================================================
// Module: Caseflow Ingress Signal Handlers
// Description: The four `signal-*` operations that advance an existing case.
// Purpose: Validate a case exists and is in a state that accepts the signal,
//          then either apply a deterministic engine transition (reupload,
//          approval) or enqueue the signal payload for the workflow worker
//          to apply during re-resolution (corrections, selections).
// Dependencies: axum, caseflow-core
// ============================================================================

//! ## Overview
//! `signal-corrections` and `signal-selections` carry review decisions that
//! the case engine itself has no dedicated event for: the engine's transition
//! table only knows how to leave `AwaitingApproval` via `ApprovalGranted` or
//! `ApprovalRejected`. Ingress therefore validates the case is parked in a
//! state that actually accepts human input, records nothing onto the engine
//! directly, and enqueues the payload as a [`CaseTrigger`] for the worker to
//! apply before the case is next offered up for approval. `signal-reupload`
//! and `signal-approval` map onto well-defined transitions and are applied
//! here synchronously; `ApprovalGranted` is the mandatory human gate every
//! case passes through before a draft is ever written, so it moves the case
//! straight to `Drafting`.

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
use caseflow_core::CaseState;
use caseflow_core::CaseTrigger;
use caseflow_core::CorrelationId;
use caseflow_core::HashAlgorithm;
use caseflow_core::HashDigest;
use caseflow_core::Timestamp;
use caseflow_core::apply_event;
use caseflow_core::core::Actor;
use caseflow_core::interfaces::CaseStore;
use serde_json::json;

use crate::error::IngressError;
use crate::state::AppState;
use crate::types::Ack;
use crate::types::SignalApprovalRequest;
use crate::types::SignalCorrectionsRequest;
use crate::types::SignalReuploadRequest;
use crate::types::SignalSelectionsRequest;

/// Returns the current wall-clock time as a case-event [`Timestamp`].
fn now_timestamp() -> Timestamp {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or_default();
    Timestamp::UnixMillis(millis)
}

/// Loads a case, failing with [`IngressError::CaseNotFound`] when absent and
/// [`IngressError::DependencyUnavailable`] when the store itself fails.
fn load_case(
    state: &AppState,
    tenant_id: &caseflow_core::TenantId,
    case_id: &caseflow_core::CaseId,
) -> Result<Case, IngressError> {
    state
        .case_store
        .load(tenant_id, case_id)
        .map_err(|_| IngressError::DependencyUnavailable)?
        .ok_or(IngressError::CaseNotFound)
}

// ============================================================================
// SECTION: Signal: Reupload
// ============================================================================

/// Handles `POST /cases/{case_id}/reupload` (`signal-reupload`).
///
/// # Errors
///
/// Returns [`IngressError::CaseNotFound`] when the case does not exist,
/// [`IngressError::InvalidState`] unless the case is `Blocked`, and
/// [`IngressError::DependencyUnavailable`] on store or engine failure.
pub async fn signal_reupload(
    State(state): State<AppState>,
    Json(request): Json<SignalReuploadRequest>,
) -> Response {
    let correlation_id = correlation_or_synthetic(request.correlation_id.clone());
    match handle_reupload(&state, request, &correlation_id) {
        Ok(ack) => (axum::http::StatusCode::OK, Json(ack)).into_response(),
        Err(error) => error.into_response_with_correlation(&correlation_id),
    }
}

/// Synchronous body of [`signal_reupload`].
fn handle_reupload(
    state: &AppState,
    request: SignalReuploadRequest,
    correlation_id: &CorrelationId,
) -> Result<Ack, IngressError> {
    if request.new_blob_url.trim().is_empty() {
        return Err(IngressError::InvalidInput(
            "new_blob_url must not be empty".to_string(),
        ));
    }
    let case = load_case(state, &request.tenant_id, &request.case_id)?;
    if case.state != CaseState::Blocked {
        return Err(IngressError::InvalidState);
    }

    let file_hash = HashDigest::new(HashAlgorithm::Sha256, request.file_sha256.as_bytes());
    let event = CaseEvent {
        case_id: request.case_id.clone(),
        actor: Actor::System,
        time: now_timestamp(),
        correlation_id: Some(correlation_id.clone()),
        kind: CaseEventKind::FileReuploaded { file_hash },
    };
    let case =
        apply_event(case, event).map_err(|_| IngressError::InvalidState)?;
    state
        .case_store
        .save(&case)
        .map_err(|_| IngressError::DependencyUnavailable)?;

    state.triggers.push(CaseTrigger {
        tenant_id: request.tenant_id,
        case_id: Some(request.case_id),
        payload: json!({
            "op": "signal-reupload",
            "new_blob_url": request.new_blob_url,
        }),
    });

    Ok(Ack::new(correlation_id.clone()))
}

// ============================================================================
// SECTION: Signal: Corrections
// ============================================================================

/// Handles `POST /cases/{case_id}/corrections` (`signal-corrections`).
///
/// # Errors
///
/// Returns [`IngressError::CaseNotFound`] when the case does not exist and
/// [`IngressError::InvalidState`] unless the case is `AwaitingApproval`.
pub async fn signal_corrections(
    State(state): State<AppState>,
    Json(request): Json<SignalCorrectionsRequest>,
) -> Response {
    let correlation_id = correlation_or_synthetic(request.correlation_id.clone());
    match handle_corrections(&state, request, &correlation_id) {
        Ok(ack) => (axum::http::StatusCode::OK, Json(ack)).into_response(),
        Err(error) => error.into_response_with_correlation(&correlation_id),
    }
}

/// Synchronous body of [`signal_corrections`].
fn handle_corrections(
    state: &AppState,
    request: SignalCorrectionsRequest,
    correlation_id: &CorrelationId,
) -> Result<Ack, IngressError> {
    let case = load_case(state, &request.tenant_id, &request.case_id)?;
    if case.state != CaseState::AwaitingApproval {
        return Err(IngressError::InvalidState);
    }

    state.triggers.push(CaseTrigger {
        tenant_id: request.tenant_id,
        case_id: Some(request.case_id),
        payload: json!({
            "op": "signal-corrections",
            "corrections": request.corrections,
        }),
    });

    Ok(Ack::new(correlation_id.clone()))
}

// ============================================================================
// SECTION: Signal: Selections
// ============================================================================

/// Handles `POST /cases/{case_id}/selections` (`signal-selections`).
///
/// # Errors
///
/// Returns [`IngressError::CaseNotFound`] when the case does not exist and
/// [`IngressError::InvalidState`] unless the case is `AwaitingApproval`.
pub async fn signal_selections(
    State(state): State<AppState>,
    Json(request): Json<SignalSelectionsRequest>,
) -> Response {
    let correlation_id = correlation_or_synthetic(request.correlation_id.clone());
    match handle_selections(&state, request, &correlation_id) {
        Ok(ack) => (axum::http::StatusCode::OK, Json(ack)).into_response(),
        Err(error) => error.into_response_with_correlation(&correlation_id),
    }
}

/// Synchronous body of [`signal_selections`].
fn handle_selections(
    state: &AppState,
    request: SignalSelectionsRequest,
    correlation_id: &CorrelationId,
) -> Result<Ack, IngressError> {
    let case = load_case(state, &request.tenant_id, &request.case_id)?;
    if case.state != CaseState::AwaitingApproval {
        return Err(IngressError::InvalidState);
    }

    state.triggers.push(CaseTrigger {
        tenant_id: request.tenant_id,
        case_id: Some(request.case_id),
        payload: json!({
            "op": "signal-selections",
            "customer": request.selections.customer,
            "items": request.selections.items,
        }),
    });

    Ok(Ack::new(correlation_id.clone()))
}

// ============================================================================
// SECTION: Signal: Approval
// ============================================================================

/// Handles `POST /cases/{case_id}/approval` (`signal-approval`).
///
/// # Errors
///
/// Returns [`IngressError::CaseNotFound`] when the case does not exist,
/// [`IngressError::InvalidState`] unless the case is `AwaitingApproval`, and
/// [`IngressError::DependencyUnavailable`] on store or engine failure.
pub async fn signal_approval(
    State(state): State<AppState>,
    Json(request): Json<SignalApprovalRequest>,
) -> Response {
    let correlation_id = correlation_or_synthetic(request.correlation_id.clone());
    match handle_approval(&state, request, &correlation_id) {
        Ok(ack) => (axum::http::StatusCode::OK, Json(ack)).into_response(),
        Err(error) => error.into_response_with_correlation(&correlation_id),
    }
}

/// Synchronous body of [`signal_approval`].
fn handle_approval(
    state: &AppState,
    request: SignalApprovalRequest,
    correlation_id: &CorrelationId,
) -> Result<Ack, IngressError> {
    if request.actor.trim().is_empty() {
        return Err(IngressError::InvalidInput(
            "actor must not be empty".to_string(),
        ));
    }
    let case = load_case(state, &request.tenant_id, &request.case_id)?;
    if case.state != CaseState::AwaitingApproval {
        return Err(IngressError::InvalidState);
    }

    let kind = if request.approved {
        CaseEventKind::ApprovalGranted
    } else {
        CaseEventKind::ApprovalRejected {
            reason: request
                .comments
                .clone()
                .unwrap_or_else(|| "rejected by reviewer".to_string()),
        }
    };
    let event = CaseEvent {
        case_id: request.case_id.clone(),
        actor: Actor::User {
            submitter_id: caseflow_core::SubmitterId::new(request.actor.clone()),
        },
        time: now_timestamp(),
        correlation_id: Some(correlation_id.clone()),
        kind,
    };
    let case = apply_event(case, event).map_err(|_| IngressError::InvalidState)?;
    state
        .case_store
        .save(&case)
        .map_err(|_| IngressError::DependencyUnavailable)?;

    if request.approved {
        state.triggers.push(CaseTrigger {
            tenant_id: request.tenant_id,
            case_id: Some(request.case_id),
            payload: json!({"op": "signal-approval", "approved": true}),
        });
    }

    Ok(Ack::new(correlation_id.clone()))
}

// ============================================================================
// SECTION: Correlation Id Helper
// ============================================================================

/// Returns the given correlation id, or synthesizes one from the current
/// time when the caller omitted it.
fn correlation_or_synthetic(correlation_id: Option<CorrelationId>) -> CorrelationId {
    correlation_id.unwrap_or_else(|| {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or_default();
        CorrelationId::new(format!("synthesized-{millis}"))
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "test assertions")]

    use std::sync::Arc;

    use caseflow_core::CaseId;
    use caseflow_core::InMemoryCaseStore;
    use caseflow_core::InMemoryFingerprintIndex;
    use caseflow_core::SubmitterId;
    use caseflow_core::TenantId;

    use super::*;

    fn state_with_case(initial: CaseState) -> (AppState, CaseId, TenantId) {
        let store = InMemoryCaseStore::new();
        let tenant_id = TenantId::new("acme");
        let case_id = CaseId::new("case-1");
        let case = Case {
            tenant_id: tenant_id.clone(),
            case_id: case_id.clone(),
            submitter_id: SubmitterId::new("alice"),
            state: initial,
            created_at: Timestamp::UnixMillis(0),
            updated_at: Timestamp::UnixMillis(0),
            order: None,
            issues: Vec::new(),
            committee_result: None,
            fingerprint: None,
            draft_reference: None,
            history: Vec::new(),
        };
        store.save(&case).unwrap();
        let state = AppState::new(
            store,
            Arc::new(InMemoryFingerprintIndex::new()),
            caseflow_broker::InlineSource::new(),
        );
        (state, case_id, tenant_id)
    }

    #[test]
    fn reupload_transitions_blocked_case_to_parsing() {
        let (state, case_id, tenant_id) = state_with_case(CaseState::Blocked);
        let request = SignalReuploadRequest {
            tenant_id: tenant_id.clone(),
            case_id: case_id.clone(),
            new_blob_url: "blob://uploads/po-1-fixed.xlsx".to_string(),
            file_sha256: "b".repeat(64),
            correlation_id: None,
        };
        let correlation_id = correlation_or_synthetic(None);
        handle_reupload(&state, request, &correlation_id).expect("reupload succeeds");
        let case = state.case_store.load(&tenant_id, &case_id).unwrap().unwrap();
        assert_eq!(case.state, CaseState::Parsing);
        assert_eq!(state.triggers.len(), 1);
    }

    #[test]
    fn reupload_rejects_case_not_in_blocked_state() {
        let (state, case_id, tenant_id) = state_with_case(CaseState::Parsing);
        let request = SignalReuploadRequest {
            tenant_id,
            case_id,
            new_blob_url: "blob://uploads/po-1-fixed.xlsx".to_string(),
            file_sha256: "b".repeat(64),
            correlation_id: None,
        };
        let correlation_id = correlation_or_synthetic(None);
        let error = handle_reupload(&state, request, &correlation_id).expect_err("not blocked");
        assert!(matches!(error, IngressError::InvalidState));
    }

    #[test]
    fn approval_granted_transitions_to_drafting() {
        let (state, case_id, tenant_id) = state_with_case(CaseState::AwaitingApproval);
        let request = SignalApprovalRequest {
            tenant_id: tenant_id.clone(),
            case_id: case_id.clone(),
            approved: true,
            actor: "reviewer-1".to_string(),
            comments: None,
            correlation_id: None,
        };
        let correlation_id = correlation_or_synthetic(None);
        handle_approval(&state, request, &correlation_id).expect("approval succeeds");
        let case = state.case_store.load(&tenant_id, &case_id).unwrap().unwrap();
        assert_eq!(case.state, CaseState::Drafting);
        assert_eq!(state.triggers.len(), 1);
    }

    #[test]
    fn approval_rejected_cancels_the_case() {
        let (state, case_id, tenant_id) = state_with_case(CaseState::AwaitingApproval);
        let request = SignalApprovalRequest {
            tenant_id: tenant_id.clone(),
            case_id: case_id.clone(),
            approved: false,
            actor: "reviewer-1".to_string(),
            comments: Some("wrong customer".to_string()),
            correlation_id: None,
        };
        let correlation_id = correlation_or_synthetic(None);
        handle_approval(&state, request, &correlation_id).expect("rejection succeeds");
        let case = state.case_store.load(&tenant_id, &case_id).unwrap().unwrap();
        assert_eq!(case.state, CaseState::Cancelled);
        assert!(state.triggers.is_empty());
    }

    #[test]
    fn corrections_require_awaiting_approval_state() {
        let (state, case_id, tenant_id) = state_with_case(CaseState::Parsing);
        let request = SignalCorrectionsRequest {
            tenant_id,
            case_id,
            corrections: std::collections::BTreeMap::new(),
            correlation_id: None,
        };
        let correlation_id = correlation_or_synthetic(None);
        let error =
            handle_corrections(&state, request, &correlation_id).expect_err("not awaiting");
        assert!(matches!(error, IngressError::InvalidState));
    }

    #[test]
    fn selections_enqueue_a_trigger_without_mutating_engine_state() {
        let (state, case_id, tenant_id) = state_with_case(CaseState::AwaitingApproval);
        let request = SignalSelectionsRequest {
            tenant_id: tenant_id.clone(),
            case_id: case_id.clone(),
            selections: crate::types::Selections {
                customer: Some("cust-42".to_string()),
                items: std::collections::BTreeMap::new(),
            },
            correlation_id: None,
        };
        let correlation_id = correlation_or_synthetic(None);
        handle_selections(&state, request, &correlation_id).expect("selections accepted");
        let case = state.case_store.load(&tenant_id, &case_id).unwrap().unwrap();
        assert_eq!(case.state, CaseState::AwaitingApproval);
        assert_eq!(state.triggers.len(), 1);
    }
}
