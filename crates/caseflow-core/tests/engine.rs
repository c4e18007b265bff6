// caseflow-core/tests/engine.rs
// ============================================================================
// Module: Case Engine Tests
// Description: Validates the case state machine's transition table.
// ============================================================================
//! ## Overview
//! Exercises the happy path from submission to a completed draft, and checks
//! that invalid transitions and terminal-case events are rejected.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use caseflow_core::Actor;
use caseflow_core::Case;
use caseflow_core::CaseEvent;
use caseflow_core::CaseEventKind;
use caseflow_core::CaseId;
use caseflow_core::CaseState;
use caseflow_core::DraftReference;
use caseflow_core::EngineError;
use caseflow_core::SubmitterId;
use caseflow_core::TenantId;
use caseflow_core::Timestamp;
use caseflow_core::apply_event;
use caseflow_core::hashing::DEFAULT_HASH_ALGORITHM;
use caseflow_core::hashing::hash_bytes;

fn blank_case() -> Case {
    Case {
        tenant_id: TenantId::new("tenant-1"),
        case_id: CaseId::new("case-1"),
        submitter_id: SubmitterId::new("submitter-1"),
        state: CaseState::Received,
        created_at: Timestamp::Logical(0),
        updated_at: Timestamp::Logical(0),
        order: None,
        issues: Vec::new(),
        committee_result: None,
        fingerprint: None,
        draft_reference: None,
        history: Vec::new(),
    }
}

fn event_at(tick: u64, kind: CaseEventKind) -> CaseEvent {
    CaseEvent {
        case_id: CaseId::new("case-1"),
        actor: Actor::System,
        time: Timestamp::Logical(tick),
        correlation_id: None,
        kind,
    }
}

#[test]
fn happy_path_reaches_completed() {
    let case = blank_case();
    let file_hash = hash_bytes(DEFAULT_HASH_ALGORITHM, b"workbook-bytes");

    let case = apply_event(
        case,
        event_at(
            1,
            CaseEventKind::Submitted {
                file_hash: file_hash.clone(),
            },
        ),
    )
    .unwrap();
    assert_eq!(case.state, CaseState::Parsing);

    let case = apply_event(
        case,
        event_at(
            2,
            CaseEventKind::ParseCompleted {
                issues: Vec::new(),
            },
        ),
    )
    .unwrap();
    assert_eq!(case.state, CaseState::Validating);

    let case = apply_event(case, event_at(3, CaseEventKind::CommitteeInvoked)).unwrap();
    assert_eq!(case.state, CaseState::AwaitingCommittee);

    let case = apply_event(
        case,
        event_at(
            4,
            CaseEventKind::CommitteeResolved {
                result: caseflow_core::CommitteeResult {
                    task_id: caseflow_core::TaskId::new("task-1"),
                    outputs: Vec::new(),
                    aggregated: Vec::new(),
                },
            },
        ),
    )
    .unwrap();
    assert_eq!(case.state, CaseState::ResolvingCustomer);

    let case = apply_event(
        case,
        event_at(
            5,
            CaseEventKind::CustomerResolved {
                customer_ref: caseflow_core::CustomerRef::new("cust-1"),
            },
        ),
    )
    .unwrap();
    assert_eq!(case.state, CaseState::ResolvingItems);

    let case = apply_event(
        case,
        event_at(
            6,
            CaseEventKind::ItemsResolved {
                resolutions: std::collections::BTreeMap::new(),
            },
        ),
    )
    .unwrap();
    assert_eq!(case.state, CaseState::AwaitingApproval);

    let case = apply_event(case, event_at(7, CaseEventKind::ApprovalGranted)).unwrap();
    assert_eq!(case.state, CaseState::Drafting);

    let fingerprint = caseflow_core::compute_fingerprint(
        &file_hash,
        &caseflow_core::CustomerRef::new("cust-1"),
        &caseflow_core::CanonicalOrder {
            customer_name_raw: "Acme".to_string(),
            resolved_customer: None,
            currency: None,
            order_date: None,
            line_items: Vec::new(),
            totals: caseflow_core::Totals {
                subtotal: "0".parse().unwrap(),
                tax: None,
                total: "0".parse().unwrap(),
            },
            schema: Vec::new(),
        },
        "2026-07-28",
    )
    .unwrap();

    let case = apply_event(
        case,
        event_at(
            8,
            CaseEventKind::DraftCreated {
                draft_reference: DraftReference::new("SO-0001"),
                fingerprint,
            },
        ),
    )
    .unwrap();
    assert_eq!(case.state, CaseState::Completed);
    assert!(case.is_terminal());
    assert_eq!(case.history.len(), 8);
}

#[test]
fn invalid_transition_is_rejected() {
    let case = blank_case();
    let result = apply_event(
        case,
        event_at(
            1,
            CaseEventKind::ItemsResolved {
                resolutions: std::collections::BTreeMap::new(),
            },
        ),
    );
    assert_eq!(
        result.unwrap_err(),
        EngineError::InvalidTransition {
            from: CaseState::Received,
            event: "items_resolved",
        }
    );
}

#[test]
fn terminal_case_rejects_further_events() {
    let mut case = blank_case();
    case.state = CaseState::Completed;
    let result = apply_event(
        case,
        event_at(
            1,
            CaseEventKind::ItemsResolved {
                resolutions: std::collections::BTreeMap::new(),
            },
        ),
    );
    assert_eq!(
        result.unwrap_err(),
        EngineError::TerminalCase {
            state: CaseState::Completed
        }
    );
}

#[test]
fn approval_rejected_cancels_the_case() {
    let case = blank_case();
    let mut case = case;
    case.state = CaseState::AwaitingApproval;
    let case = apply_event(
        case,
        event_at(
            1,
            CaseEventKind::ApprovalRejected {
                reason: "wrong customer".to_string(),
            },
        ),
    )
    .unwrap();
    assert_eq!(case.state, CaseState::Cancelled);
    assert!(case.is_terminal());
}
