// caseflow-ingress/src/router.rs
// ============================================================================
// Module: Caseflow Ingress Router
// Description: Assembles the axum router for the six ingress operations.
// Purpose: Give `caseflow-cli serve` and the test suite one function that
//          wires every handler to its route.
// Dependencies: axum
// ============================================================================

//! ## Overview
//! Every operation takes its target case id (when one applies) in the
//! request body rather than the URL path, since every signal already carries
//! a `tenant_id`/`case_id` pair for store lookup; this keeps the route table
//! flat and avoids a second place case identity is threaded through.

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::Router;
use axum::routing::get;
use axum::routing::post;

use crate::health::get_health;
use crate::signals::signal_approval;
use crate::signals::signal_corrections;
use crate::signals::signal_reupload;
use crate::signals::signal_selections;
use crate::state::AppState;
use crate::submit::submit_order;

/// Builds the ingress router over the given shared state.
#[must_use]
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/cases", post(submit_order))
        .route("/cases/signals/reupload", post(signal_reupload))
        .route("/cases/signals/corrections", post(signal_corrections))
        .route("/cases/signals/selections", post(signal_selections))
        .route("/cases/signals/approval", post(signal_approval))
        .route("/health", get(get_health))
        .with_state(state)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "test assertions")]

    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use axum::http::StatusCode;
    use caseflow_core::InMemoryCaseStore;
    use caseflow_core::InMemoryFingerprintIndex;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;

    fn router() -> Router {
        let state = AppState::new(
            InMemoryCaseStore::new(),
            Arc::new(InMemoryFingerprintIndex::new()),
            caseflow_broker::InlineSource::new(),
        );
        build_router(state)
    }

    #[tokio::test]
    async fn health_route_is_reachable() {
        let response = router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn submit_order_route_creates_a_case() {
        let body = serde_json::json!({
            "blob_url": "blob://uploads/po-1.xlsx",
            "file_name": "po-1.xlsx",
            "file_sha256": "c".repeat(64),
            "submitter_id": "alice",
            "tenant_id": "acme",
        });
        let response = router()
            .oneshot(
                Request::post("/cases")
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(parsed["case_id"].is_string());
        assert!(parsed["correlation_id"].is_string());
    }

    #[tokio::test]
    async fn submit_order_route_rejects_unknown_fields() {
        let body = serde_json::json!({
            "blob_url": "blob://uploads/po-1.xlsx",
            "file_name": "po-1.xlsx",
            "file_sha256": "c".repeat(64),
            "submitter_id": "alice",
            "tenant_id": "acme",
            "unexpected_field": "nope",
        });
        let response = router()
            .oneshot(
                Request::post("/cases")
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
