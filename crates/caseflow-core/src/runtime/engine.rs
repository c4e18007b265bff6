// caseflow-core/src/runtime/engine.rs
// ============================================================================
// Module: Caseflow Case Engine
// Description: Deterministic case state machine: applies events, enforces
//              valid transitions, and folds history into the current state.
// Purpose: Provide the single canonical execution path every caseflow
//          surface (ingress, CLI, activities) calls into to mutate a case.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! The case engine is the single canonical execution path for caseflow. All
//! surfaces that mutate a case (ingress handlers, worker activities, the CLI
//! replay command) must call [`apply_event`] rather than mutate a [`Case`]
//! directly, so that history stays the single source of truth and invalid
//! transitions are rejected deterministically.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::Case;
use crate::core::CaseEvent;
use crate::core::CaseEventKind;
use crate::core::CaseState;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while applying an event to a case.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The event kind is not valid from the case's current state.
    #[error("event {event:?} is not valid from state {from:?}")]
    InvalidTransition {
        /// The state the case was in when the event was applied.
        from: CaseState,
        /// A short label for the rejected event kind.
        event: &'static str,
    },
    /// An event was applied to a case already in a terminal state.
    #[error("case is in terminal state {state:?} and accepts no further events")]
    TerminalCase {
        /// The terminal state the case was in.
        state: CaseState,
    },
    /// The event's timestamp was earlier than the case's last recorded event.
    #[error("event time is not monotonically non-decreasing")]
    NonMonotonicTime,
}

// ============================================================================
// SECTION: Transition Table
// ============================================================================

/// Returns the next state for applying `kind` to a case currently in `from`,
/// or `None` if the transition is not valid.
const fn next_state(from: CaseState, kind: &CaseEventKind) -> Option<CaseState> {
    use CaseEventKind as K;
    use CaseState as S;

    match (from, kind) {
        (S::Received, K::Submitted { .. }) => Some(S::Parsing),
        (S::Received, K::ParseStarted) => Some(S::Parsing),
        (S::Parsing, K::ParseCompleted { .. }) => Some(S::Validating),
        (S::Parsing, K::ParseFailed { .. }) => Some(S::Blocked),
        (S::Validating, K::CommitteeInvoked) => Some(S::AwaitingCommittee),
        (S::Validating, K::CustomerResolved { .. }) => Some(S::ResolvingItems),
        (S::AwaitingCommittee, K::CommitteeResolved { .. }) => Some(S::ResolvingCustomer),
        (S::ResolvingCustomer, K::CustomerResolved { .. }) => Some(S::ResolvingItems),
        (S::ResolvingCustomer, K::CustomerAmbiguous { .. }) => Some(S::AwaitingApproval),
        (S::ResolvingItems, K::ItemsResolved { .. }) => Some(S::AwaitingApproval),
        (S::ResolvingItems, K::ItemsAmbiguous { .. }) => Some(S::AwaitingApproval),
        (S::AwaitingApproval, K::ApprovalGranted) => Some(S::Drafting),
        (S::AwaitingApproval, K::ApprovalRejected { .. }) => Some(S::Cancelled),
        (S::Drafting, K::DraftCreated { .. }) => Some(S::Completed),
        (S::Drafting, K::DraftCreationFailed { .. }) => Some(S::Failed),
        (S::Drafting, K::DraftQueuedForRetry { .. }) => Some(S::QueuedForWriter),
        (S::QueuedForWriter, K::DraftCreated { .. }) => Some(S::Completed),
        (S::QueuedForWriter, K::DraftCreationFailed { .. }) => Some(S::Failed),
        (S::Blocked, K::FileReuploaded { .. }) => Some(S::Parsing),
        (
            S::Blocked
            | S::Parsing
            | S::Validating
            | S::AwaitingCommittee
            | S::ResolvingCustomer
            | S::ResolvingItems
            | S::AwaitingApproval
            | S::Drafting
            | S::QueuedForWriter,
            K::Cancelled { .. },
        ) => Some(S::Cancelled),
        _ => None,
    }
}

/// Returns a short label for an event kind, used in error messages.
const fn event_label(kind: &CaseEventKind) -> &'static str {
    match kind {
        CaseEventKind::Submitted { .. } => "submitted",
        CaseEventKind::ParseStarted => "parse_started",
        CaseEventKind::ParseCompleted { .. } => "parse_completed",
        CaseEventKind::ParseFailed { .. } => "parse_failed",
        CaseEventKind::CommitteeInvoked => "committee_invoked",
        CaseEventKind::CommitteeResolved { .. } => "committee_resolved",
        CaseEventKind::CustomerResolved { .. } => "customer_resolved",
        CaseEventKind::CustomerAmbiguous { .. } => "customer_ambiguous",
        CaseEventKind::ItemsResolved { .. } => "items_resolved",
        CaseEventKind::ItemsAmbiguous { .. } => "items_ambiguous",
        CaseEventKind::ApprovalRequested { .. } => "approval_requested",
        CaseEventKind::ApprovalGranted => "approval_granted",
        CaseEventKind::ApprovalRejected { .. } => "approval_rejected",
        CaseEventKind::DraftCreated { .. } => "draft_created",
        CaseEventKind::DraftCreationFailed { .. } => "draft_creation_failed",
        CaseEventKind::DraftQueuedForRetry { .. } => "draft_queued_for_retry",
        CaseEventKind::FileReuploaded { .. } => "file_reuploaded",
        CaseEventKind::Cancelled { .. } => "cancelled",
    }
}

// ============================================================================
// SECTION: Apply
// ============================================================================

/// Applies a single event to a case, returning the updated case.
///
/// `ApprovalRequested` is the one event kind that does not change `state` by
/// itself (the case is already in `AwaitingApproval` by the time a human
/// confirmation is requested); it is still recorded in history for the audit
/// trail.
///
/// # Errors
///
/// Returns [`EngineError`] when the case is terminal, the event's time
/// regresses, or the transition table has no entry for `(case.state, event)`.
pub fn apply_event(mut case: Case, event: CaseEvent) -> Result<Case, EngineError> {
    if case.is_terminal() {
        return Err(EngineError::TerminalCase { state: case.state });
    }

    if let (Some(last), Some(next)) = (
        case.updated_at.as_unix_millis(),
        event.time.as_unix_millis(),
    ) && next < last
    {
        return Err(EngineError::NonMonotonicTime);
    }

    let new_state = if matches!(event.kind, CaseEventKind::ApprovalRequested { .. }) {
        case.state
    } else {
        next_state(case.state, &event.kind).ok_or(EngineError::InvalidTransition {
            from: case.state,
            event: event_label(&event.kind),
        })?
    };

    apply_side_effects(&mut case, &event.kind);
    case.state = new_state;
    case.updated_at = event.time;
    case.history.push(event);
    Ok(case)
}

/// Applies the event-kind-specific data mutations (issues, order, committee
/// result, draft reference) that accompany a state transition.
fn apply_side_effects(case: &mut Case, kind: &CaseEventKind) {
    match kind {
        CaseEventKind::ParseCompleted { issues } => {
            case.issues.extend(issues.iter().cloned());
        }
        CaseEventKind::CommitteeResolved { result } => {
            case.committee_result = Some(result.clone());
        }
        CaseEventKind::CustomerResolved { customer_ref } => {
            if let Some(order) = case.order.as_mut() {
                order.resolved_customer = Some(customer_ref.clone());
            }
        }
        CaseEventKind::ItemsResolved { resolutions } => {
            if let Some(order) = case.order.as_mut() {
                for line in &mut order.line_items {
                    if let Some(item_ref) = resolutions.get(&line.row) {
                        line.resolved_item = Some(item_ref.clone());
                    }
                }
            }
        }
        CaseEventKind::DraftCreated {
            draft_reference,
            fingerprint,
        } => {
            case.draft_reference = Some(draft_reference.clone());
            case.fingerprint = Some(fingerprint.clone());
        }
        _ => {}
    }
}

// ============================================================================
// SECTION: Replay
// ============================================================================

/// Replays a full event history onto a freshly created case, re-deriving its
/// current state. Used by the CLI's case-replay command and by store-backed
/// recovery paths that keep only the append-only history as ground truth.
///
/// # Errors
///
/// Returns [`EngineError`] at the first event in `events` that the
/// transition table rejects.
pub fn replay(mut case: Case, events: Vec<CaseEvent>) -> Result<Case, EngineError> {
    case.history.clear();
    for event in events {
        case = apply_event(case, event)?;
    }
    Ok(case)
}
