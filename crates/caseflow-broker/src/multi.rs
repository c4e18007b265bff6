// caseflow-broker/src/multi.rs
// ============================================================================
// Module: Caseflow Multi Trigger Source
// Description: Round-robin composite over several trigger sources.
// Purpose: Let a worker poll one combined source instead of each transport
//          individually (e.g. an inline queue for signals plus a file spool
//          for batch uploads).
// Dependencies: caseflow-core
// ============================================================================

//! ## Overview
//! [`MultiSource`] holds an ordered list of trigger sources and polls them in
//! round-robin order, starting from the source after the one that last
//! yielded a trigger, so no single source can starve the others.

// ============================================================================
// SECTION: Imports
// ============================================================================

use caseflow_core::CaseTrigger;
use caseflow_core::TriggerSource;

// ============================================================================
// SECTION: Multi Source
// ============================================================================

/// Round-robin composite trigger source.
pub struct MultiSource {
    /// Component sources, polled in order starting from `next_index`.
    sources: Vec<Box<dyn TriggerSource + Send>>,
    /// Index of the source to poll first on the next call.
    next_index: usize,
}

impl MultiSource {
    /// Creates an empty composite source.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sources: Vec::new(),
            next_index: 0,
        }
    }

    /// Adds a component source, polled after all previously added sources in
    /// round-robin order.
    #[must_use]
    pub fn with_source(mut self, source: impl TriggerSource + Send + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }
}

impl Default for MultiSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TriggerSource for MultiSource {
    fn next_trigger(&mut self) -> Option<CaseTrigger> {
        let count = self.sources.len();
        if count == 0 {
            return None;
        }
        for offset in 0..count {
            let index = (self.next_index + offset) % count;
            if let Some(trigger) = self.sources[index].next_trigger() {
                self.next_index = (index + 1) % count;
                return Some(trigger);
            }
        }
        None
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
    use crate::source::InlineSource;

    fn trigger(case_id: &str) -> CaseTrigger {
        CaseTrigger {
            tenant_id: TenantId::new("acme"),
            case_id: Some(CaseId::new(case_id)),
            payload: json!({}),
        }
    }

    #[test]
    fn round_robins_across_sources_without_starving_either() {
        let first = InlineSource::new();
        let second = InlineSource::new();
        first.push(trigger("a1"));
        first.push(trigger("a2"));
        second.push(trigger("b1"));

        let mut multi = MultiSource::new().with_source(first).with_source(second);

        let delivered: Vec<_> = std::iter::from_fn(|| multi.next_trigger())
            .map(|t| t.case_id.expect("case id").to_string())
            .collect();
        assert_eq!(delivered, vec!["a1", "b1", "a2"]);
    }

    #[test]
    fn empty_composite_yields_nothing() {
        let mut multi = MultiSource::new();
        assert!(multi.next_trigger().is_none());
    }
}
