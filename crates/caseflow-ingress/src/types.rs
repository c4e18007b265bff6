// caseflow-ingress/src/types.rs
// ============================================================================
// Module: Caseflow Ingress Wire Types
// Description: Request and response bodies for the six ingress
//              operations.
// Purpose: Give each operation a strict-schema request type (unknown fields
//          rejected) and a response type that always carries the
//          correlation id.
// Dependencies: caseflow-core, serde
// ============================================================================

//! ## Overview
//! Every request type derives `#[serde(deny_unknown_fields)]` per the
//! ingress contract ("Input validation rejects unknown field names").
//! `tenant_id` is required on every signal request even though the
//! operation table omits it from the signal payloads, because the
//! [`caseflow_core::CaseStore`] contract is tenant-partitioned; see
//! `DESIGN.md` for this extension.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use caseflow_core::CaseId;
use caseflow_core::CorrelationId;
use caseflow_core::SubmitterId;
use caseflow_core::TenantId;
use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Submit Order
// ============================================================================

/// Request body for `submit-order`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubmitOrderRequest {
    /// Reference to the uploaded workbook blob.
    pub blob_url: String,
    /// Original file name as uploaded.
    pub file_name: String,
    /// Hex-encoded SHA-256 of the uploaded file, computed by the caller.
    pub file_sha256: String,
    /// Submitter identifier.
    pub submitter_id: SubmitterId,
    /// Tenant identifier.
    pub tenant_id: TenantId,
    /// Correlation identifier threaded from the originating chat channel.
    #[serde(default)]
    pub correlation_id: Option<CorrelationId>,
}

/// Response body for `submit-order`.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitOrderResponse {
    /// Newly created case identifier.
    pub case_id: CaseId,
    /// Workflow instance identifier (equal to `case_id` in this engine: the
    /// case id is itself the workflow's stable key).
    pub workflow_instance_id: String,
    /// Correlation identifier carried or synthesized for this request.
    pub correlation_id: CorrelationId,
}

// ============================================================================
// SECTION: Signal: Reupload
// ============================================================================

/// Request body for `signal-reupload`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignalReuploadRequest {
    /// Tenant identifier.
    pub tenant_id: TenantId,
    /// Case being corrected.
    pub case_id: CaseId,
    /// Reference to the replacement workbook blob.
    pub new_blob_url: String,
    /// Hex-encoded SHA-256 of the replacement file.
    pub file_sha256: String,
    /// Correlation identifier.
    #[serde(default)]
    pub correlation_id: Option<CorrelationId>,
}

// ============================================================================
// SECTION: Signal: Corrections
// ============================================================================

/// Request body for `signal-corrections`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignalCorrectionsRequest {
    /// Tenant identifier.
    pub tenant_id: TenantId,
    /// Case being corrected.
    pub case_id: CaseId,
    /// Canonical field name to corrected evidence-pack column id.
    pub corrections: BTreeMap<String, String>,
    /// Correlation identifier.
    #[serde(default)]
    pub correlation_id: Option<CorrelationId>,
}

// ============================================================================
// SECTION: Signal: Selections
// ============================================================================

/// Customer/item candidate selections submitted by a human reviewer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Selections {
    /// Selected customer reference, when the customer was ambiguous.
    #[serde(default)]
    pub customer: Option<String>,
    /// Selected item reference per ambiguous row index.
    #[serde(default)]
    pub items: BTreeMap<u32, String>,
}

/// Request body for `signal-selections`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignalSelectionsRequest {
    /// Tenant identifier.
    pub tenant_id: TenantId,
    /// Case being corrected.
    pub case_id: CaseId,
    /// Selections made by the reviewer.
    pub selections: Selections,
    /// Correlation identifier.
    #[serde(default)]
    pub correlation_id: Option<CorrelationId>,
}

// ============================================================================
// SECTION: Signal: Approval
// ============================================================================

/// Request body for `signal-approval`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignalApprovalRequest {
    /// Tenant identifier.
    pub tenant_id: TenantId,
    /// Case awaiting approval.
    pub case_id: CaseId,
    /// Whether the reviewer approved draft creation.
    pub approved: bool,
    /// Identifier of the approving actor.
    pub actor: String,
    /// Optional free-text comments.
    #[serde(default)]
    pub comments: Option<String>,
    /// Correlation identifier.
    #[serde(default)]
    pub correlation_id: Option<CorrelationId>,
}

// ============================================================================
// SECTION: Shared Acknowledgement
// ============================================================================

/// Generic acknowledgement response carrying the request's correlation id.
#[derive(Debug, Clone, Serialize)]
pub struct Ack {
    /// Always `true`: a non-2xx status is returned on failure instead.
    pub ok: bool,
    /// Correlation identifier carried or synthesized for this request.
    pub correlation_id: CorrelationId,
}

impl Ack {
    /// Builds an acknowledgement for the given correlation id.
    #[must_use]
    pub const fn new(correlation_id: CorrelationId) -> Self {
        Self {
            ok: true,
            correlation_id,
        }
    }
}

// ============================================================================
// SECTION: Health
// ============================================================================

/// Response body for `get-health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// A short status label (`ok` or `degraded`).
    pub state: String,
    /// Whether the case store dependency answered a liveness probe.
    pub deps_ok: bool,
}
