// caseflow-ingress/src/state.rs
// ============================================================================
// Module: Caseflow Ingress State
// Description: Shared application state for the ingress router.
// Purpose: Hold the case store, submission dedupe index, and trigger sink
//          every handler needs, without tying the router to one backend.
// Dependencies: caseflow-broker, caseflow-core
// ============================================================================

//! ## Overview
//! [`AppState`] is cloned per request (cheap: everything inside is `Arc` or
//! already clone-shared) and threaded through axum's `State` extractor.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use caseflow_broker::InlineSource;
use caseflow_core::CaseStore;
use caseflow_core::FingerprintIndex;
use caseflow_core::SharedCaseStore;

// ============================================================================
// SECTION: App State
// ============================================================================

/// Shared state backing every ingress handler.
#[derive(Clone)]
pub struct AppState {
    /// Case persistence.
    pub case_store: SharedCaseStore,
    /// Submission dedupe index, keyed by a day-bucketed digest of the
    /// submitted file hash (see [`crate::submit::submission_guard_key`]).
    /// Reuses the fingerprint-index contract (atomic claim-if-absent) rather
    /// than introducing a second transactional primitive.
    pub submission_guard: Arc<dyn FingerprintIndex + Send + Sync>,
    /// Sink triggers are pushed onto for the workflow worker to consume.
    pub triggers: InlineSource,
}

impl AppState {
    /// Builds app state from a case store, submission guard, and trigger sink.
    #[must_use]
    pub fn new(
        case_store: impl CaseStore + Send + Sync + 'static,
        submission_guard: Arc<dyn FingerprintIndex + Send + Sync>,
        triggers: InlineSource,
    ) -> Self {
        Self {
            case_store: SharedCaseStore::from_store(case_store),
            submission_guard,
            triggers,
        }
    }
}
