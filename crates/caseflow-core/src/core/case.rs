// caseflow-core/src/core/case.rs
// ============================================================================
// Module: Caseflow Case Model
// Description: The case record, its state machine states, and its audit trail.
// Purpose: Provide the canonical, persisted shape of a purchase order case as
//          it moves from ingestion to a drafted (or rejected) sales order.
// Dependencies: crate::core::{committee, fingerprint, identifiers, order, time}, serde
// ============================================================================

//! ## Overview
//! A [`Case`] is the unit of work tracked from the moment a spreadsheet
//! purchase order is observed in a chat channel until a sales order draft is
//! created (or the case is cancelled/failed). Every transition is recorded as
//! an append-only [`CaseEvent`] so the full history can be replayed and
//! retained for audit.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::core::committee::CommitteeResult;
use crate::core::fingerprint::OrderFingerprint;
use crate::core::identifiers::CaseId;
use crate::core::identifiers::CorrelationId;
use crate::core::identifiers::DraftReference;
use crate::core::identifiers::ItemRef;
use crate::core::identifiers::SubmitterId;
use crate::core::identifiers::TenantId;
use crate::core::order::CanonicalOrder;
use crate::core::order::Issue;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Case State
// ============================================================================

/// The lifecycle state of a case.
///
/// # Invariants
/// - Transitions are enforced by `caseflow_core::runtime::engine`; this type
///   only enumerates the reachable states.
/// - `Completed`, `Cancelled`, and `Failed` are terminal: no further events
///   change state once reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseState {
    /// Case created; awaiting the parser.
    Received,
    /// Workbook parsing in progress.
    Parsing,
    /// Parsing produced blocking issues; awaiting human correction.
    Blocked,
    /// Parsed order is being validated (arithmetic, GTIN checks).
    Validating,
    /// Ambiguous structural decisions are before the provider committee.
    AwaitingCommittee,
    /// Customer is being resolved against the external catalog.
    ResolvingCustomer,
    /// Line items are being resolved against the external catalog.
    ResolvingItems,
    /// Resolution requires a human decision before proceeding.
    AwaitingApproval,
    /// Draft sales order creation is in flight.
    Drafting,
    /// Draft creation succeeded and has a confirmed reference.
    Completed,
    /// Draft creation succeeded but the reference write-back is queued.
    QueuedForWriter,
    /// Case was cancelled by an operator or submitter.
    Cancelled,
    /// Case failed terminally after exhausting retries.
    Failed,
}

impl CaseState {
    /// Returns true when no further events can change this case's state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

// ============================================================================
// SECTION: Actors
// ============================================================================

/// The originator of a case event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Actor {
    /// The system itself (an activity or the engine) produced the event.
    System,
    /// A human user produced the event.
    User {
        /// Identifier of the acting submitter or reviewer.
        submitter_id: SubmitterId,
    },
    /// A committee provider produced the event.
    Provider {
        /// Identifier of the acting provider.
        provider_id: crate::core::identifiers::ProviderId,
    },
}

// ============================================================================
// SECTION: Case Events
// ============================================================================

/// A single, append-only audit entry in a case's history.
///
/// # Invariants
/// - `time` must be non-decreasing across a case's event sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseEvent {
    /// Case this event belongs to.
    pub case_id: CaseId,
    /// Who or what produced the event.
    pub actor: Actor,
    /// When the event occurred.
    pub time: Timestamp,
    /// Correlation identifier threaded from the originating ingress call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<CorrelationId>,
    /// The event payload.
    pub kind: CaseEventKind,
}

/// The set of events that can occur over a case's lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CaseEventKind {
    /// A workbook was submitted and a case was created for it.
    Submitted {
        /// Hash of the submitted file.
        file_hash: crate::core::hashing::HashDigest,
    },
    /// Parsing started.
    ParseStarted,
    /// Parsing completed, producing a canonical order and any issues.
    ParseCompleted {
        /// Issues surfaced while parsing.
        issues: Vec<Issue>,
    },
    /// Parsing failed outright (e.g. unreadable file).
    ParseFailed {
        /// Human-readable failure reason.
        reason: String,
    },
    /// The committee was invoked to resolve ambiguous fields.
    CommitteeInvoked,
    /// The committee returned a result.
    CommitteeResolved {
        /// The committee's aggregated result.
        result: CommitteeResult,
    },
    /// Customer resolution succeeded.
    CustomerResolved {
        /// Resolved customer reference.
        customer_ref: crate::core::identifiers::CustomerRef,
    },
    /// Customer resolution was ambiguous and needs a human decision.
    CustomerAmbiguous {
        /// Candidate customer references surfaced by the catalog lookup.
        candidates: Vec<crate::core::identifiers::CustomerRef>,
    },
    /// All line items resolved successfully.
    ItemsResolved {
        /// Resolved catalog item reference per source row index.
        resolutions: BTreeMap<u32, ItemRef>,
    },
    /// One or more line items could not be resolved unambiguously.
    ItemsAmbiguous {
        /// Rows whose item resolution needs a human decision.
        rows: Vec<u32>,
    },
    /// A human confirmation was requested.
    ApprovalRequested {
        /// Reason the case needs human confirmation.
        reason: String,
    },
    /// A human granted the requested approval.
    ApprovalGranted,
    /// A human rejected the case.
    ApprovalRejected {
        /// Reason given for rejection.
        reason: String,
    },
    /// A draft sales order was created in the external accounting system.
    DraftCreated {
        /// Reference returned by the external accounting system.
        draft_reference: DraftReference,
        /// Fingerprint the draft was created under.
        fingerprint: OrderFingerprint,
    },
    /// Draft creation failed terminally.
    DraftCreationFailed {
        /// Human-readable failure reason.
        reason: String,
    },
    /// Draft creation exhausted its retry budget against a transient error;
    /// the case waits for the slow-cadence recovery workflow.
    DraftQueuedForRetry {
        /// Human-readable reason the writer could not complete immediately.
        reason: String,
    },
    /// A corrected workbook was uploaded for a blocked case.
    FileReuploaded {
        /// Hash of the newly submitted file.
        file_hash: crate::core::hashing::HashDigest,
    },
    /// The case was cancelled.
    Cancelled {
        /// Reason given for cancellation.
        reason: String,
    },
}

// ============================================================================
// SECTION: Case Record
// ============================================================================

/// The persisted, replayable record for a single purchase order case.
///
/// # Invariants
/// - `state` always reflects the fold of `history` under the case state
///   machine; it is stored for convenient querying, not as a second source of
///   truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    /// Tenant the case belongs to.
    pub tenant_id: TenantId,
    /// Case identifier.
    pub case_id: CaseId,
    /// Submitter who uploaded the source workbook.
    pub submitter_id: SubmitterId,
    /// Current lifecycle state.
    pub state: CaseState,
    /// Time the case was created.
    pub created_at: Timestamp,
    /// Time of the most recent event applied to this case.
    pub updated_at: Timestamp,
    /// Canonical order contents, once parsing has produced one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<CanonicalOrder>,
    /// Accumulated issues across parsing, validation, and resolution.
    #[serde(default)]
    pub issues: Vec<Issue>,
    /// Most recent committee result, if the committee has been invoked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub committee_result: Option<CommitteeResult>,
    /// Fingerprint computed once the order and customer are resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<OrderFingerprint>,
    /// Draft reference, once draft creation succeeds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft_reference: Option<DraftReference>,
    /// Full ordered history of events applied to this case.
    pub history: Vec<CaseEvent>,
}

impl Case {
    /// Returns true when the case has reached a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}
