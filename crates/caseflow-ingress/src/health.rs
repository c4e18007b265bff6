// caseflow-ingress/src/health.rs
// ============================================================================
// Module: Caseflow Ingress Health Handler
// Description: The `get-health` operation.
// Purpose: Give load balancers and the calling chat platform a liveness probe
//          that also exercises the case store dependency.
// Dependencies: axum, caseflow-core
// ============================================================================

//! ## Overview
//! Health checks never leak internal error detail; they collapse any store
//! failure into `deps_ok: false` and an HTTP 503.

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use caseflow_core::CaseId;
use caseflow_core::TenantId;
use caseflow_core::interfaces::CaseStore;

use crate::state::AppState;
use crate::types::HealthResponse;

/// Handles `GET /health` (`get-health`).
pub async fn get_health(State(state): State<AppState>) -> Response {
    let probe_tenant = TenantId::new("__health__");
    let probe_case = CaseId::new("__health__");
    let deps_ok = state.case_store.load(&probe_tenant, &probe_case).is_ok();

    let status = if deps_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = HealthResponse {
        state: if deps_ok { "ok" } else { "degraded" }.to_string(),
        deps_ok,
    };
    (status, Json(body)).into_response()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "test assertions")]

    use std::sync::Arc;

    use axum::http::StatusCode;
    use caseflow_core::InMemoryCaseStore;
    use caseflow_core::InMemoryFingerprintIndex;

    use super::*;

    #[tokio::test]
    async fn reports_healthy_against_a_live_store() {
        let state = AppState::new(
            InMemoryCaseStore::new(),
            Arc::new(InMemoryFingerprintIndex::new()),
            caseflow_broker::InlineSource::new(),
        );
        let response = get_health(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
