// system-tests/tests/idempotent_resubmission.rs
// ============================================================================
// Scenario: the same workbook (same file hash, customer, and date bucket) is
// submitted twice. Expect the second submission to return the first
// submission's draft reference rather than creating a second draft order;
// a submission under a different date bucket is a distinct fingerprint and
// does create its own draft.
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
async fn resubmitting_the_identical_order_reuses_the_draft_reference() {
    let dispatcher = build_dispatcher();

    let first_case_id = dispatcher.submit(submitter(), demo_order(), demo_evidence_pack()).expect("submits");
    while dispatcher.drain_and_process().await.expect("processes").is_some() {}
    dispatcher.approve(&first_case_id, true).await.expect("approves");
    let first_case = dispatcher.load_case(&first_case_id).expect("loads").expect("case exists");
    assert_eq!(first_case.state, CaseState::Completed);

    let second_case_id = dispatcher.submit(submitter(), demo_order(), demo_evidence_pack()).expect("submits");
    while dispatcher.drain_and_process().await.expect("processes").is_some() {}
    dispatcher.approve(&second_case_id, true).await.expect("approves");
    let second_case = dispatcher.load_case(&second_case_id).expect("loads").expect("case exists");

    assert_eq!(second_case.state, CaseState::Completed);
    assert_eq!(second_case.draft_reference, first_case.draft_reference);
    assert_eq!(dispatcher.catalog().created_drafts().len(), 1, "only one draft order should ever reach the catalog");
}

#[tokio::test]
async fn a_different_date_bucket_is_a_distinct_fingerprint() {
    let dispatcher = build_dispatcher();

    let first_case_id = dispatcher.submit(submitter(), demo_order(), demo_evidence_pack()).expect("submits");
    while dispatcher.drain_and_process().await.expect("processes").is_some() {}
    dispatcher.approve(&first_case_id, true).await.expect("approves");
    let first_case = dispatcher.load_case(&first_case_id).expect("loads").expect("case exists");

    // The order is byte-identical to the first submission; only the
    // dispatcher's recorded processing day differs, which is the date
    // bucket a resubmission's fingerprint is distinguished by.
    dispatcher.advance_processing_day();

    let second_case_id = dispatcher.submit(submitter(), demo_order(), demo_evidence_pack()).expect("submits");
    while dispatcher.drain_and_process().await.expect("processes").is_some() {}
    dispatcher.approve(&second_case_id, true).await.expect("approves");
    let second_case = dispatcher.load_case(&second_case_id).expect("loads").expect("case exists");

    assert_ne!(second_case.draft_reference, first_case.draft_reference);
    assert_eq!(dispatcher.catalog().created_drafts().len(), 2);
}
