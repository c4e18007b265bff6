// system-tests/tests/ambiguous_items.rs
// ============================================================================
// Scenario: the catalog returns two equally plausible items for the
// submitted SKU. Expect the case to suspend in `AwaitingApproval`, naming
// the ambiguous row, rather than guessing between them.
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions are permitted."
)]

mod support;

use caseflow_core::CaseState;
use support::build_dispatcher_with_ambiguous_item;
use support::demo_evidence_pack;
use support::demo_order;
use support::submitter;

#[tokio::test]
async fn ambiguous_item_suspends_for_human_review() {
    let dispatcher = build_dispatcher_with_ambiguous_item();
    let case_id = dispatcher.submit(submitter(), demo_order(), demo_evidence_pack()).expect("submits");

    let processed = dispatcher.drain_and_process().await.expect("processes").expect("trigger was queued");
    assert_eq!(processed.state, CaseState::AwaitingApproval);

    let case = dispatcher.load_case(&case_id).expect("loads").expect("case exists");
    assert!(case.draft_reference.is_none());
    assert!(dispatcher.catalog().created_drafts().is_empty());
}
