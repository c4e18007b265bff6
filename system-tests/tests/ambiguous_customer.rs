// system-tests/tests/ambiguous_customer.rs
// ============================================================================
// Scenario: two catalog customers score identically against the submitted
// name. Expect the case to suspend in `AwaitingApproval` with both
// candidates surfaced, rather than guessing.
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions are permitted."
)]

mod support;

use caseflow_core::CaseState;
use support::build_dispatcher_with_ambiguous_customer;
use support::demo_evidence_pack;
use support::demo_order;
use support::submitter;

#[tokio::test]
async fn ambiguous_customer_suspends_for_human_review() {
    let dispatcher = build_dispatcher_with_ambiguous_customer();
    let case_id = dispatcher.submit(submitter(), demo_order(), demo_evidence_pack()).expect("submits");

    let processed = dispatcher.drain_and_process().await.expect("processes").expect("trigger was queued");
    assert_eq!(processed.state, CaseState::AwaitingApproval);

    let case = dispatcher.load_case(&case_id).expect("loads").expect("case exists");
    assert_eq!(case.state, CaseState::AwaitingApproval);
    assert!(case.draft_reference.is_none());
    assert!(dispatcher.catalog().created_drafts().is_empty());

    assert_eq!(dispatcher.pending_triggers(), 0, "no further trigger is queued until a human resolves the case");
}
