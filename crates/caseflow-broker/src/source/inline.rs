// caseflow-broker/src/source/inline.rs
// ============================================================================
// Module: Caseflow Inline Trigger Source
// Description: In-process queue of pending case triggers.
// Purpose: Feed triggers pushed directly by an in-process caller (tests,
//          demos, or an ingress handler running in the same process as the
//          worker).
// Dependencies: caseflow-core, std
// ============================================================================

//! ## Overview
//! [`InlineSource`] is a `Mutex`-guarded FIFO queue of [`CaseTrigger`]
//! values. Producers call [`InlineSource::push`]; the workflow worker calls
//! [`caseflow_core::TriggerSource::next_trigger`] to drain it. Cloning shares
//! the same underlying queue.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

use caseflow_core::CaseTrigger;
use caseflow_core::TriggerSource;

// ============================================================================
// SECTION: Inline Source
// ============================================================================

/// In-process, FIFO trigger queue.
#[derive(Debug, Default, Clone)]
pub struct InlineSource {
    /// Shared pending-trigger queue.
    pending: Arc<Mutex<VecDeque<CaseTrigger>>>,
}

impl InlineSource {
    /// Creates an empty inline source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a trigger for later delivery.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned by a prior panic while the
    /// lock was held.
    pub fn push(&self, trigger: CaseTrigger) {
        let Ok(mut guard) = self.pending.lock() else {
            return;
        };
        guard.push_back(trigger);
    }

    /// Returns the number of triggers currently queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    /// Returns true when no triggers are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TriggerSource for InlineSource {
    fn next_trigger(&mut self) -> Option<CaseTrigger> {
        self.pending.lock().ok()?.pop_front()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions."
    )]

    use caseflow_core::CaseId;
    use caseflow_core::TenantId;
    use serde_json::json;

    use super::*;

    fn trigger(case_id: &str) -> CaseTrigger {
        CaseTrigger {
            tenant_id: TenantId::new("acme"),
            case_id: Some(CaseId::new(case_id)),
            payload: json!({"kind": "test"}),
        }
    }

    #[test]
    fn drains_in_fifo_order() {
        let source = InlineSource::new();
        source.push(trigger("a"));
        source.push(trigger("b"));
        let mut source = source;
        assert_eq!(
            source.next_trigger().map(|t| t.case_id),
            Some(Some(CaseId::new("a")))
        );
        assert_eq!(
            source.next_trigger().map(|t| t.case_id),
            Some(Some(CaseId::new("b")))
        );
        assert!(source.next_trigger().is_none());
    }

    #[test]
    fn shares_queue_across_clones() {
        let source = InlineSource::new();
        let producer = source.clone();
        producer.push(trigger("shared"));
        assert_eq!(source.len(), 1);
    }
}
