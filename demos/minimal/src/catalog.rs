// caseflow-demo-minimal/src/catalog.rs
// ============================================================================
// Module: In-Memory Catalog Stub
// Description: A canned ExternalCatalogClient for the minimal demo.
// Purpose: Answer customer/item searches from a fixed, caller-registered
//          table and assign sequential draft references, standing in for a
//          real accounting system integration.
// Dependencies: caseflow-core
// ============================================================================

//! ## Overview
//! [`InMemoryCatalog`] is not a test double hidden in a `#[cfg(test)]`
//! module: the demo has no network access and no credentials for a real
//! accounting system, so this stands in for one end to end. Every query is
//! matched by exact string equality against a table the caller populates up
//! front; there is no fuzzy behavior here; the fuzzy logic lives in
//! `caseflow-resolver` and is exercised against whatever this catalog
//! returns.

use std::sync::Mutex;

use caseflow_core::CatalogError;
use caseflow_core::CustomerCandidate;
use caseflow_core::DraftOrderRequest;
use caseflow_core::DraftReference;
use caseflow_core::ExternalCatalogClient;
use caseflow_core::ItemCandidate;

/// Canned catalog client keyed by exact query string.
pub struct InMemoryCatalog {
    /// Registered customer search results, keyed by exact query text.
    customers: Vec<(String, Vec<CustomerCandidate>)>,
    /// Registered item search results, keyed by exact query text.
    items: Vec<(String, Vec<ItemCandidate>)>,
    /// Next sequence number handed out for a created draft reference.
    next_draft_sequence: Mutex<u64>,
    /// Every draft order request accepted so far, in creation order.
    created_drafts: Mutex<Vec<DraftOrderRequest>>,
}

impl InMemoryCatalog {
    /// Creates an empty catalog with no registered customers or items.
    #[must_use]
    pub fn new() -> Self {
        Self {
            customers: Vec::new(),
            items: Vec::new(),
            next_draft_sequence: Mutex::new(0),
            created_drafts: Mutex::new(Vec::new()),
        }
    }

    /// Registers the candidates returned for an exact customer query.
    pub fn register_customer_query(&mut self, query: impl Into<String>, candidates: Vec<CustomerCandidate>) {
        self.customers.push((query.into(), candidates));
    }

    /// Registers the candidates returned for an exact item query.
    pub fn register_item_query(&mut self, query: impl Into<String>, candidates: Vec<ItemCandidate>) {
        self.items.push((query.into(), candidates));
    }

    /// Returns every draft order request accepted so far, in creation order.
    #[must_use]
    pub fn created_drafts(&self) -> Vec<DraftOrderRequest> {
        self.created_drafts.lock().map(|guard| guard.clone()).unwrap_or_default()
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ExternalCatalogClient for InMemoryCatalog {
    fn search_customers(&self, query: &str) -> Result<Vec<CustomerCandidate>, CatalogError> {
        Ok(self
            .customers
            .iter()
            .find(|(key, _)| key == query)
            .map(|(_, candidates)| candidates.clone())
            .unwrap_or_default())
    }

    fn search_items(&self, query: &str) -> Result<Vec<ItemCandidate>, CatalogError> {
        Ok(self
            .items
            .iter()
            .find(|(key, _)| key == query)
            .map(|(_, candidates)| candidates.clone())
            .unwrap_or_default())
    }

    fn create_draft_order(&self, request: &DraftOrderRequest) -> Result<DraftReference, CatalogError> {
        let mut sequence = self
            .next_draft_sequence
            .lock()
            .map_err(|_| CatalogError::Transport("catalog mutex poisoned".to_string()))?;
        *sequence += 1;
        let reference = DraftReference::new(format!("draft-{sequence}"));
        self.created_drafts
            .lock()
            .map_err(|_| CatalogError::Transport("catalog mutex poisoned".to_string()))?
            .push(request.clone());
        Ok(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caseflow_core::CustomerRef;

    #[test]
    fn unregistered_query_returns_no_candidates() {
        let catalog = InMemoryCatalog::new();
        assert!(catalog.search_customers("nobody").expect("search succeeds").is_empty());
    }

    #[test]
    fn registered_query_is_matched_exactly() {
        let mut catalog = InMemoryCatalog::new();
        let candidate = CustomerCandidate {
            customer_ref: CustomerRef::new("cust-1"),
            display_name: "Acme Corp".to_string(),
            score: 1.0,
        };
        catalog.register_customer_query("Acme Corp", vec![candidate.clone()]);
        assert_eq!(catalog.search_customers("Acme Corp").expect("search succeeds"), vec![candidate]);
    }

    #[test]
    fn draft_references_are_sequential() {
        let catalog = InMemoryCatalog::new();
        let request = DraftOrderRequest {
            customer_ref: CustomerRef::new("cust-1"),
            lines: Vec::new(),
            idempotency_key: "fp-1".to_string(),
        };
        let first = catalog.create_draft_order(&request).expect("creates");
        let second = catalog.create_draft_order(&request).expect("creates");
        assert_eq!(first, DraftReference::new("draft-1"));
        assert_eq!(second, DraftReference::new("draft-2"));
        assert_eq!(catalog.created_drafts().len(), 2);
    }
}
