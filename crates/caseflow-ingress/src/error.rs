// caseflow-ingress/src/error.rs
// ============================================================================
// Module: Caseflow Ingress Errors
// Description: The ingress error taxonomy and its HTTP status mapping.
// Purpose: Give every handler one place to report a failure so responses
//          stay consistent (status codes, correlation id, no internal
//          detail leakage).
// Dependencies: axum, caseflow-core, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Ingress errors carry a stable machine-readable code (`invalid-input`,
//! `case-not-found`, `invalid-state`, `duplicate-fingerprint-recently-active`)
//! plus a status code, and render as a JSON body that always includes the
//! request's correlation id. Internal detail (store errors, stack traces)
//! never reaches the response body.

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use caseflow_core::CorrelationId;
use serde_json::json;
use thiserror::Error;

// ============================================================================
// SECTION: Ingress Error
// ============================================================================

/// Errors returned by ingress handlers.
#[derive(Debug, Error)]
pub enum IngressError {
    /// The request body failed validation (unknown fields, empty required
    /// value, malformed identifier).
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The referenced case does not exist for the tenant.
    #[error("case not found")]
    CaseNotFound,
    /// The case exists but is not in a state that accepts this signal.
    #[error("invalid state for this operation")]
    InvalidState,
    /// An identical submission is already active for this tenant today.
    #[error("duplicate fingerprint recently active")]
    DuplicateFingerprintRecentlyActive,
    /// A dependency (case store, fingerprint index) failed.
    #[error("dependency unavailable")]
    DependencyUnavailable,
}

impl IngressError {
    /// Returns the stable machine-readable error code for this error.
    const fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid-input",
            Self::CaseNotFound => "case-not-found",
            Self::InvalidState => "invalid-state",
            Self::DuplicateFingerprintRecentlyActive => "duplicate-fingerprint-recently-active",
            Self::DependencyUnavailable => "dependency-unavailable",
        }
    }

    /// Returns the HTTP status code for this error.
    const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::CaseNotFound => StatusCode::NOT_FOUND,
            Self::InvalidState | Self::DuplicateFingerprintRecentlyActive => StatusCode::CONFLICT,
            Self::DependencyUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Renders this error as a response carrying the request's correlation id.
    pub fn into_response_with_correlation(self, correlation_id: &CorrelationId) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": self.code(),
            "message": self.to_string(),
            "correlation_id": correlation_id.as_str(),
        }));
        (status, body).into_response()
    }
}
