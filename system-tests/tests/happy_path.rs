// system-tests/tests/happy_path.rs
// ============================================================================
// Scenario: single-line order, unanimous committee, unique customer/item
// match. Expect the case to reach `Completed` with exactly one draft order.
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions are permitted."
)]

mod support;

use caseflow_core::CaseState;
use support::build_dispatcher;
use support::demo_evidence_pack;
use support::demo_order;
use support::submitter;

#[tokio::test]
async fn single_line_order_completes_with_one_draft() {
    let dispatcher = build_dispatcher();
    let case_id = dispatcher.submit(submitter(), demo_order(), demo_evidence_pack()).expect("submits");

    let mut final_state = None;
    while let Some(processed) = dispatcher.drain_and_process().await.expect("processes") {
        final_state = Some(processed.state);
    }
    assert_eq!(final_state, Some(CaseState::AwaitingApproval));

    let approved = dispatcher.approve(&case_id, true).await.expect("approves").expect("case exists");
    assert_eq!(approved.state, CaseState::Completed);
    let case = dispatcher.load_case(&case_id).expect("loads").expect("case exists");
    assert!(case.draft_reference.is_some());
    assert_eq!(dispatcher.catalog().created_drafts().len(), 1);
}
