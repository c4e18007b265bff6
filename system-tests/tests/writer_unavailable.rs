// system-tests/tests/writer_unavailable.rs
// ============================================================================
// Scenario: the external accounting system answers with a transient failure
// for several consecutive attempts before succeeding. Expect each failed
// attempt to queue the case for retry without creating a draft, and the
// eventual successful attempt to complete the case with exactly one draft.
//
// This drives `caseflow_resolver::write_draft` directly rather than through
// `Dispatcher`: the in-memory demo catalog always succeeds, so simulating a
// flaky external system needs a catalog stub, not the dispatcher's
// committee/resolution machinery.
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions are permitted."
)]

use std::cell::Cell;

use caseflow_core::Actor;
use caseflow_core::Case;
use caseflow_core::CaseEvent;
use caseflow_core::CaseEventKind;
use caseflow_core::CaseId;
use caseflow_core::CaseState;
use caseflow_core::CaseStore;
use caseflow_core::CatalogError;
use caseflow_core::CustomerRef;
use caseflow_core::DraftOrderLine;
use caseflow_core::DraftOrderRequest;
use caseflow_core::DraftReference;
use caseflow_core::ExternalCatalogClient;
use caseflow_core::InMemoryCaseStore;
use caseflow_core::InMemoryFingerprintIndex;
use caseflow_core::ItemCandidate;
use caseflow_core::ItemRef;
use caseflow_core::OrderFingerprint;
use caseflow_core::SubmitterId;
use caseflow_core::TenantId;
use caseflow_core::Timestamp;
use caseflow_core::apply_event;
use caseflow_resolver::DraftWriteOutcome;
use caseflow_resolver::write_draft;

/// A catalog whose `create_draft_order` answers 503 for the first
/// `fail_attempts` calls, then succeeds.
struct FlakyCatalog {
    remaining_failures: Cell<u32>,
}

impl ExternalCatalogClient for FlakyCatalog {
    fn search_customers(&self, _query: &str) -> Result<Vec<caseflow_core::CustomerCandidate>, CatalogError> {
        Ok(Vec::new())
    }

    fn search_items(&self, _query: &str) -> Result<Vec<ItemCandidate>, CatalogError> {
        Ok(Vec::new())
    }

    fn create_draft_order(&self, _request: &DraftOrderRequest) -> Result<DraftReference, CatalogError> {
        let remaining = self.remaining_failures.get();
        if remaining > 0 {
            self.remaining_failures.set(remaining - 1);
            return Err(CatalogError::Remote { status: 503, message: "writer temporarily unavailable".to_string() });
        }
        Ok(DraftReference::new("draft-after-outage"))
    }
}

fn draft_request() -> DraftOrderRequest {
    DraftOrderRequest {
        customer_ref: CustomerRef::new("cust-acme"),
        lines: vec![DraftOrderLine { item_ref: ItemRef::new("item-widget"), quantity: "10".to_string(), unit_price: "25.50".to_string() }],
        idempotency_key: "fp-outage".to_string(),
    }
}

fn bare_case(tenant_id: &TenantId, case_id: &CaseId) -> Case {
    Case {
        tenant_id: tenant_id.clone(),
        case_id: case_id.clone(),
        submitter_id: SubmitterId::new("system-test-submitter"),
        state: CaseState::Drafting,
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

fn apply(case: Case, time: u64, kind: CaseEventKind) -> Case {
    let event = CaseEvent { case_id: case.case_id.clone(), actor: Actor::System, time: Timestamp::Logical(time), correlation_id: None, kind };
    apply_event(case, event).expect("transition is valid")
}

#[test]
fn repeated_transient_failures_queue_for_retry_then_complete() {
    let tenant_id = TenantId::new("tenant-system-test");
    let case_id = CaseId::new("case-outage");
    let fingerprint = OrderFingerprint::new("fp-outage".to_string());
    let case_store = InMemoryCaseStore::default();
    let fingerprint_index = InMemoryFingerprintIndex::default();
    let catalog = FlakyCatalog { remaining_failures: Cell::new(8) };

    let mut case = bare_case(&tenant_id, &case_id);
    case_store.save(&case).expect("saves");

    // The first failed attempt is the event that moves the case out of
    // `Drafting`; the engine has no transition for repeating
    // `DraftQueuedForRetry` once the case is already `QueuedForWriter`, so
    // later retries re-call the activity without appending a new event,
    // mirroring how the real recovery workflow polls rather than replays.
    let first_reason = write_draft(&case_store, &fingerprint_index, &catalog, &tenant_id, &case_id, &fingerprint, &draft_request())
        .expect_err("first attempt still fails")
        .to_string();
    case = apply(case, 1, CaseEventKind::DraftQueuedForRetry { reason: first_reason });
    case_store.save(&case).expect("saves");
    assert_eq!(case.state, CaseState::QueuedForWriter);

    for attempt in 1..8 {
        write_draft(&case_store, &fingerprint_index, &catalog, &tenant_id, &case_id, &fingerprint, &draft_request())
            .expect_err("attempt should still be failing");
        assert_eq!(case.state, CaseState::QueuedForWriter, "attempt {attempt} should leave the case queued for the writer");
        assert!(case.draft_reference.is_none());
    }

    let outcome = write_draft(&case_store, &fingerprint_index, &catalog, &tenant_id, &case_id, &fingerprint, &draft_request())
        .expect("ninth attempt succeeds");
    let DraftWriteOutcome::Created { reference } = outcome else {
        panic!("expected a freshly created draft reference");
    };
    case = apply(case, 2, CaseEventKind::DraftCreated { draft_reference: reference.clone(), fingerprint: fingerprint.clone() });
    case_store.save(&case).expect("saves");

    assert_eq!(case.state, CaseState::Completed);
    assert_eq!(case.draft_reference, Some(reference));
}
