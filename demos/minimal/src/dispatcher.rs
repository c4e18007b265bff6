// caseflow-demo-minimal/src/dispatcher.rs
// ============================================================================
// Module: Minimal Dispatcher
// Description: Drives one case through every workflow stage in-process.
// Purpose: Stand in for the real workflow worker that drains
//          `caseflow_core::TriggerSource` and calls the parser, committee,
//          resolver, and writer activities in sequence.
// Dependencies: caseflow-broker, caseflow-committee, caseflow-core,
//               caseflow-evidence, caseflow-resolver
// ============================================================================

//! ## Overview
//! The real deployment drains [`caseflow_broker::InlineSource`] (or another
//! [`caseflow_core::TriggerSource`]) from a long-running worker process that
//! calls `caseflow-parser`, `caseflow-committee`, and `caseflow-resolver` in
//! the order the case's event history demands. [`Dispatcher`] reproduces that
//! sequence for one case at a time, without a workbook to parse: the
//! canonical order a real parse would have produced is supplied directly to
//! [`Dispatcher::submit`], alongside the evidence pack a real column-mapping
//! stage would have built from it. Everything downstream — committee
//! fan-out, customer/item resolution, idempotent draft writing — runs for
//! real against the crates that implement it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicI64;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use caseflow_broker::InlineSource;
use caseflow_committee::CommitteeConfig;
use caseflow_committee::CommitteeError;
use caseflow_committee::CommitteeProvider;
use caseflow_committee::EvidencePack;
use caseflow_committee::run_committee;
use caseflow_core::Case;
use caseflow_core::CaseEvent;
use caseflow_core::CaseEventKind;
use caseflow_core::CaseId;
use caseflow_core::CaseState;
use caseflow_core::CaseTrigger;
use caseflow_core::CanonicalOrder;
use caseflow_core::CatalogError;
use caseflow_core::DraftOrderLine;
use caseflow_core::DraftOrderRequest;
use caseflow_core::EngineError;
use caseflow_core::EvidenceError;
use caseflow_core::FingerprintError;
use caseflow_core::FingerprintIndexError;
use caseflow_core::HashAlgorithm;
use caseflow_core::HashDigest;
use caseflow_core::InMemoryCaseStore;
use caseflow_core::InMemoryFingerprintIndex;
use caseflow_core::ItemRef;
use caseflow_core::ProviderId;
use caseflow_core::StoreError;
use caseflow_core::SubmitterId;
use caseflow_core::TaskId;
use caseflow_core::TenantId;
use caseflow_core::Timestamp;
use caseflow_core::Actor;
use caseflow_core::apply_event;
use caseflow_core::compute_fingerprint;
use caseflow_core::hash_bytes;
use caseflow_core::utc_date_bucket;
use caseflow_core::interfaces::CaseStore;
use caseflow_evidence::FsEvidenceStore;
use caseflow_resolver::CustomerResolution;
use caseflow_resolver::CustomerResolutionPolicy;
use caseflow_resolver::DraftWriteError;
use caseflow_resolver::DraftWriteOutcome;
use caseflow_resolver::ItemResolution;
use caseflow_resolver::ItemResolutionPolicy;
use caseflow_resolver::resolve_customer;
use caseflow_resolver::resolve_item;
use caseflow_resolver::write_draft;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::catalog::InMemoryCatalog;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while dispatching or processing a case.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A queued trigger had no case id attached.
    #[error("trigger carried no case id")]
    MissingCaseId,
    /// The trigger's case id had no persisted case.
    #[error("no case persisted for case id {0}")]
    CaseNotFound(CaseId),
    /// The trigger payload could not be decoded.
    #[error("failed to decode trigger payload: {0}")]
    PayloadDecode(String),
    /// The case reached a resolution stage with no canonical order attached.
    #[error("case has no canonical order attached")]
    MissingOrder,
    /// A draft approval was requested for a case not parked in
    /// `AwaitingApproval`.
    #[error("case {0} is not awaiting approval")]
    NotAwaitingApproval(CaseId),
    /// Approval was granted but the dispatcher has no submitted-file hash on
    /// record for the case (it was not the one that suspended it).
    #[error("no pending file hash recorded for case {0}")]
    MissingPendingFileHash(CaseId),
    /// Underlying case store failure.
    #[error("case store error: {0}")]
    Store(#[from] StoreError),
    /// Underlying fingerprint index failure.
    #[error("fingerprint index error: {0}")]
    FingerprintIndex(#[from] FingerprintIndexError),
    /// The case state machine rejected a transition.
    #[error("case engine error: {0}")]
    Engine(#[from] EngineError),
    /// The committee invocation failed outright.
    #[error("committee error: {0}")]
    Committee(#[from] CommitteeError),
    /// A catalog lookup failed during customer or item resolution.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    /// Fingerprint computation failed.
    #[error("fingerprint computation error: {0}")]
    Fingerprint(#[from] FingerprintError),
    /// Writing the evidence audit trail failed.
    #[error("evidence error: {0}")]
    Evidence(#[from] EvidenceError),
}

// ============================================================================
// SECTION: Trigger Payload
// ============================================================================

/// The trigger payload a real submission-plus-parse would have produced:
/// the canonical order and the evidence pack built from its column mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TriggerPayload {
    /// Parsed canonical order.
    order: CanonicalOrder,
    /// Evidence pack the committee will be called with.
    evidence_pack: EvidencePack,
    /// Hash of the (notional) submitted file, carried through to the
    /// idempotency fingerprint computed before the draft write.
    file_hash: HashDigest,
}

// ============================================================================
// SECTION: Outcome
// ============================================================================

/// Summary of one case's processing run, returned from
/// [`Dispatcher::drain_and_process`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedCase {
    /// The case that was processed.
    pub case_id: CaseId,
    /// The case's state after processing stopped (either terminal or
    /// suspended awaiting a human decision).
    pub state: CaseState,
}

// ============================================================================
// SECTION: Dispatcher
// ============================================================================

/// Drives cases through submission, committee invocation, resolution, and
/// draft writing, one queued trigger at a time.
pub struct Dispatcher {
    /// Tenant every case dispatched through this instance belongs to.
    tenant_id: TenantId,
    /// In-memory case store.
    case_store: InMemoryCaseStore,
    /// In-memory fingerprint index guarding idempotent draft creation.
    fingerprint_index: InMemoryFingerprintIndex,
    /// Write-once evidence store backing the committee's audit trail.
    evidence: FsEvidenceStore,
    /// In-process trigger queue linking `submit` to `drain_and_process`.
    triggers: InlineSource,
    /// Canned external catalog client.
    catalog: InMemoryCatalog,
    /// Configured committee providers, keyed by provider id.
    providers: BTreeMap<ProviderId, Arc<dyn CommitteeProvider>>,
    /// Committee invocation configuration.
    committee_config: CommitteeConfig,
    /// Customer resolution thresholds.
    customer_policy: CustomerResolutionPolicy,
    /// Item resolution thresholds.
    item_policy: ItemResolutionPolicy,
    /// Monotonic logical clock backing every case event's timestamp.
    clock: AtomicU64,
    /// Sequence counter used to derive deterministic case ids.
    case_sequence: AtomicU64,
    /// The dispatcher's recorded processing instant, read from the wall
    /// clock once at construction and otherwise only advanced explicitly
    /// (never re-read), so the UTC date bucket every submission lands in is
    /// deterministic for the lifetime of this dispatcher.
    processing_instant_millis: AtomicI64,
    /// Submitted-file hashes and processing date buckets for cases parked in
    /// `AwaitingApproval` via the clean resolution path, kept so the
    /// fingerprint can be recomputed once a human approves the draft.
    /// `Case`/`CanonicalOrder` do not otherwise retain the file hash past the
    /// `Submitted` event, and the fingerprint's date bucket must reflect the
    /// instant the order was submitted for processing, not any date stated
    /// on the order itself.
    pending_submissions: Mutex<BTreeMap<CaseId, PendingSubmission>>,
}

/// Context captured at submission time and consumed once a human approves
/// the draft, so the idempotency fingerprint is derived from the instant the
/// case was actually processed rather than re-derived from the order.
struct PendingSubmission {
    /// Hash of the submitted workbook.
    file_hash: HashDigest,
    /// `YYYY-MM-DD` UTC date bucket of the processing instant.
    date_bucket: String,
}

impl Dispatcher {
    /// Builds a dispatcher rooted at `evidence_root` on disk, with a fresh
    /// in-memory case store and fingerprint index.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Evidence`] if the evidence root cannot be
    /// created.
    pub fn new(
        tenant_id: TenantId,
        evidence_root: impl Into<std::path::PathBuf>,
        catalog: InMemoryCatalog,
        providers: BTreeMap<ProviderId, Arc<dyn CommitteeProvider>>,
        committee_config: CommitteeConfig,
    ) -> Result<Self, DispatchError> {
        let evidence = FsEvidenceStore::open(evidence_root).map_err(|err| EvidenceError::Store(err.to_string()))?;
        Ok(Self {
            tenant_id,
            case_store: InMemoryCaseStore::new(),
            fingerprint_index: InMemoryFingerprintIndex::new(),
            evidence,
            triggers: InlineSource::new(),
            catalog,
            providers,
            committee_config,
            customer_policy: CustomerResolutionPolicy::default(),
            item_policy: ItemResolutionPolicy::default(),
            clock: AtomicU64::new(0),
            case_sequence: AtomicU64::new(0),
            processing_instant_millis: AtomicI64::new(now_unix_millis()),
            pending_submissions: Mutex::new(BTreeMap::new()),
        })
    }

    /// Returns the catalog client, so a caller can inspect drafts created
    /// during processing.
    #[must_use]
    pub const fn catalog(&self) -> &InMemoryCatalog {
        &self.catalog
    }

    /// Returns the number of triggers still queued for processing.
    #[must_use]
    pub fn pending_triggers(&self) -> usize {
        self.triggers.len()
    }

    /// Advances this dispatcher's recorded processing instant by one full
    /// UTC day. Lets a caller (a test, or a recovery workflow simulating a
    /// later processing run) land a later submission in a distinct date
    /// bucket without depending on the real wall clock advancing.
    pub fn advance_processing_day(&self) {
        self.processing_instant_millis.fetch_add(86_400_000, Ordering::Relaxed);
    }

    /// Returns the `YYYY-MM-DD` UTC date bucket for this dispatcher's current
    /// processing instant, used for fingerprinting (not the order's own
    /// stated date).
    fn current_date_bucket(&self) -> String {
        utc_date_bucket(self.processing_instant_millis.load(Ordering::Relaxed))
    }

    /// Loads a case by id, for inspection after processing.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Store`] when the load fails.
    pub fn load_case(&self, case_id: &CaseId) -> Result<Option<Case>, DispatchError> {
        Ok(self.case_store.load(&self.tenant_id, case_id)?)
    }

    /// Submits a new case for `order`, pre-parsed and pre-mapped as
    /// [`EvidencePack`] would require. Appends `Submitted`, persists the
    /// case in [`CaseState::Parsing`], and enqueues a trigger for
    /// [`Self::drain_and_process`].
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Engine`] if the initial transition is
    /// rejected, or [`DispatchError::Store`] if persisting fails.
    pub fn submit(
        &self,
        submitter_id: SubmitterId,
        order: CanonicalOrder,
        evidence_pack: EvidencePack,
    ) -> Result<CaseId, DispatchError> {
        let case_id = self.next_case_id();
        let order_bytes = serde_json::to_vec(&order).unwrap_or_default();
        let file_hash = hash_bytes(HashAlgorithm::Sha256, &order_bytes);
        let time = self.next_time();

        let case = Case {
            tenant_id: self.tenant_id.clone(),
            case_id: case_id.clone(),
            submitter_id: submitter_id.clone(),
            state: CaseState::Received,
            created_at: time,
            updated_at: time,
            order: None,
            issues: Vec::new(),
            committee_result: None,
            fingerprint: None,
            draft_reference: None,
            history: Vec::new(),
        };
        let event = CaseEvent {
            case_id: case_id.clone(),
            actor: Actor::User { submitter_id },
            time,
            correlation_id: None,
            kind: CaseEventKind::Submitted { file_hash: file_hash.clone() },
        };
        let case = apply_event(case, event)?;
        self.case_store.save(&case)?;

        let payload = TriggerPayload { order, evidence_pack, file_hash };
        self.triggers.push(CaseTrigger {
            tenant_id: self.tenant_id.clone(),
            case_id: Some(case_id.clone()),
            payload: serde_json::to_value(payload).unwrap_or(serde_json::Value::Null),
        });

        Ok(case_id)
    }

    /// Pops the next queued trigger and runs it through parsing completion,
    /// committee invocation, customer/item resolution, and draft writing.
    /// Returns `Ok(None)` when no trigger is queued.
    ///
    /// Processing always stops once item resolution completes, whether it
    /// resolved cleanly or needed a human decision: every case waits in
    /// `AwaitingApproval` for [`Self::approve`] before a draft is written,
    /// matching the real workflow's suspend-and-wait behavior on
    /// `CustomerAmbiguous`/`ItemsAmbiguous` and on the mandatory approval
    /// gate that follows clean resolution.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when any stage's activity fails outright
    /// (as opposed to producing an ambiguous-but-valid outcome).
    pub async fn drain_and_process(&self) -> Result<Option<ProcessedCase>, DispatchError> {
        let mut triggers = self.triggers.clone();
        let Some(trigger) = triggers.next_trigger() else {
            return Ok(None);
        };
        let case_id = trigger.case_id.ok_or(DispatchError::MissingCaseId)?;
        let payload: TriggerPayload =
            serde_json::from_value(trigger.payload).map_err(|err| DispatchError::PayloadDecode(err.to_string()))?;

        let case =
            self.case_store.load(&self.tenant_id, &case_id)?.ok_or_else(|| DispatchError::CaseNotFound(case_id.clone()))?;

        let mut case = self.apply(case, CaseEventKind::ParseCompleted { issues: Vec::new() })?;
        case.order = Some(payload.order.clone());
        self.case_store.save(&case)?;

        let case = self.apply(case, CaseEventKind::CommitteeInvoked)?;
        self.case_store.save(&case)?;

        let task_id = TaskId::new(format!("{}-committee", case_id.as_str()));
        let outcome =
            run_committee(&self.providers, &self.committee_config, &case_id, &task_id, &payload.evidence_pack, &self.evidence)
                .await?;
        let case = self.apply(case, CaseEventKind::CommitteeResolved { result: outcome.result })?;
        self.case_store.save(&case)?;

        let order = case.order.clone().ok_or(DispatchError::MissingOrder)?;
        let customer_resolution =
            resolve_customer(&self.catalog, &order.customer_name_raw, None, &self.customer_policy)?;
        let case = match customer_resolution {
            CustomerResolution::Resolved(candidate) => {
                let case = self.apply(case, CaseEventKind::CustomerResolved { customer_ref: candidate.customer_ref })?;
                self.case_store.save(&case)?;
                case
            }
            CustomerResolution::NeedsHuman(candidates) => {
                let candidates = candidates.into_iter().map(|candidate| candidate.customer_ref).collect();
                let case = self.apply(case, CaseEventKind::CustomerAmbiguous { candidates })?;
                self.case_store.save(&case)?;
                return Ok(Some(ProcessedCase { case_id, state: case.state }));
            }
            CustomerResolution::Unresolved => {
                let case = self.apply(case, CaseEventKind::CustomerAmbiguous { candidates: Vec::new() })?;
                self.case_store.save(&case)?;
                return Ok(Some(ProcessedCase { case_id, state: case.state }));
            }
        };

        let mut resolutions: BTreeMap<u32, ItemRef> = BTreeMap::new();
        let mut rows_needing_human = Vec::new();
        for line in &order.line_items {
            match resolve_item(&self.catalog, line, &self.item_policy)? {
                ItemResolution::Resolved(candidate) => {
                    resolutions.insert(line.row, candidate.item_ref);
                }
                ItemResolution::NeedsHuman(_) | ItemResolution::Unresolved => rows_needing_human.push(line.row),
            }
        }
        if !rows_needing_human.is_empty() {
            let case = self.apply(case, CaseEventKind::ItemsAmbiguous { rows: rows_needing_human })?;
            self.case_store.save(&case)?;
            return Ok(Some(ProcessedCase { case_id, state: case.state }));
        }
        let case = self.apply(case, CaseEventKind::ItemsResolved { resolutions })?;
        self.case_store.save(&case)?;

        // Case is now parked in `AwaitingApproval`; remember the submitted
        // file's hash and the processing date bucket so `approve` can
        // recompute the idempotency fingerprint once a human signs off,
        // without re-deriving either from the order.
        if let Ok(mut guard) = self.pending_submissions.lock() {
            guard.insert(
                case_id.clone(),
                PendingSubmission { file_hash: payload.file_hash, date_bucket: self.current_date_bucket() },
            );
        }

        Ok(Some(ProcessedCase { case_id, state: case.state }))
    }

    /// Records a human's approval decision for a case parked in
    /// `AwaitingApproval`. On rejection, cancels the case. On approval,
    /// writes the draft sales order using the customer and item references
    /// resolution recorded on the case, exactly as the automatic pipeline
    /// would have before the approval gate was added.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::CaseNotFound`] if no case is persisted for
    /// `case_id`, [`DispatchError::NotAwaitingApproval`] if the case is not
    /// parked in `AwaitingApproval`, [`DispatchError::MissingPendingFileHash`]
    /// if approval is granted but this dispatcher has no submitted-file hash
    /// on record for the case, or any stage's activity error.
    pub async fn approve(&self, case_id: &CaseId, approved: bool) -> Result<Option<ProcessedCase>, DispatchError> {
        let case = self.case_store.load(&self.tenant_id, case_id)?.ok_or_else(|| DispatchError::CaseNotFound(case_id.clone()))?;
        if case.state != CaseState::AwaitingApproval {
            return Err(DispatchError::NotAwaitingApproval(case_id.clone()));
        }

        if !approved {
            let case = self.apply(case, CaseEventKind::ApprovalRejected { reason: "rejected by reviewer".to_string() })?;
            self.case_store.save(&case)?;
            if let Ok(mut guard) = self.pending_submissions.lock() {
                guard.remove(case_id);
            }
            return Ok(Some(ProcessedCase { case_id: case_id.clone(), state: case.state }));
        }

        let case = self.apply(case, CaseEventKind::ApprovalGranted)?;
        self.case_store.save(&case)?;

        let order = case.order.clone().ok_or(DispatchError::MissingOrder)?;
        let resolved_customer = order.resolved_customer.clone().ok_or(DispatchError::MissingOrder)?;
        let lines: Vec<DraftOrderLine> = order
            .line_items
            .iter()
            .map(|line| {
                let item_ref = line.resolved_item.clone().ok_or(DispatchError::MissingOrder)?;
                Ok(DraftOrderLine {
                    item_ref,
                    quantity: line.quantity.to_string(),
                    unit_price: line.unit_price.to_string(),
                })
            })
            .collect::<Result<_, DispatchError>>()?;

        let PendingSubmission { file_hash, date_bucket } = self
            .pending_submissions
            .lock()
            .ok()
            .and_then(|mut guard| guard.remove(case_id))
            .ok_or_else(|| DispatchError::MissingPendingFileHash(case_id.clone()))?;
        let fingerprint = compute_fingerprint(&file_hash, &resolved_customer, &order, &date_bucket)?;
        let request = DraftOrderRequest {
            customer_ref: resolved_customer,
            lines,
            idempotency_key: fingerprint.as_str().to_string(),
        };

        let draft_kind = match write_draft(
            &self.case_store,
            &self.fingerprint_index,
            &self.catalog,
            &self.tenant_id,
            case_id,
            &fingerprint,
            &request,
        ) {
            Ok(DraftWriteOutcome::Created { reference } | DraftWriteOutcome::AlreadyExists { reference }) => {
                CaseEventKind::DraftCreated { draft_reference: reference, fingerprint }
            }
            Err(err @ (DraftWriteError::Transient(_) | DraftWriteError::ClaimPending(_))) => {
                CaseEventKind::DraftQueuedForRetry { reason: err.to_string() }
            }
            Err(err) => CaseEventKind::DraftCreationFailed { reason: err.to_string() },
        };
        let case = self.apply(case, draft_kind)?;
        self.case_store.save(&case)?;

        Ok(Some(ProcessedCase { case_id: case_id.clone(), state: case.state }))
    }

    /// Applies one system-originated event to `case` at the dispatcher's
    /// next logical time.
    fn apply(&self, case: Case, kind: CaseEventKind) -> Result<Case, DispatchError> {
        let event = CaseEvent {
            case_id: case.case_id.clone(),
            actor: Actor::System,
            time: self.next_time(),
            correlation_id: None,
            kind,
        };
        Ok(apply_event(case, event)?)
    }

    /// Returns the next logical timestamp, monotonically increasing.
    fn next_time(&self) -> Timestamp {
        Timestamp::Logical(self.clock.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the next deterministic case id.
    fn next_case_id(&self) -> CaseId {
        let sequence = self.case_sequence.fetch_add(1, Ordering::Relaxed);
        CaseId::new(format!("case-{sequence}"))
    }
}

/// Returns the current wall-clock time as unix milliseconds.
///
/// Read once, at dispatcher construction, to seed the processing instant
/// that every submission's date bucket derives from; never read again on
/// the per-case processing path.
fn now_unix_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}
