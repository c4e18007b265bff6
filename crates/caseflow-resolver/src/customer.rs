// caseflow-resolver/src/customer.rs
// ============================================================================
// Module: Customer Resolution
// Description: Resolves a parsed customer name (+ optional tax id) against
//              the external catalog.
// Purpose: Implement the customer resolution rule: exact normalized-name
//          match, then fuzzy name match, then tax-id match.
// Dependencies: caseflow-core, strsim
// ============================================================================

//! ## Overview
//! Customer resolution never guesses: it either finds exactly one confident
//! match, surfaces every plausible candidate for a human to pick from, or
//! reports that nothing matched. The workflow engine suspends on the latter
//! two outcomes (`CustomerAmbiguous`) rather than silently picking a
//! candidate.

// ============================================================================
// SECTION: Imports
// ============================================================================

use caseflow_core::CatalogError;
use caseflow_core::CustomerCandidate;
use caseflow_core::ExternalCatalogClient;

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Tunable thresholds for customer resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CustomerResolutionPolicy {
    /// Minimum Jaro-Winkler similarity for a fuzzy name match.
    /// Default 0.85.
    pub fuzzy_threshold: f64,
}

impl Default for CustomerResolutionPolicy {
    fn default() -> Self {
        Self { fuzzy_threshold: 0.85 }
    }
}

// ============================================================================
// SECTION: Resolution Outcome
// ============================================================================

/// Outcome of resolving a customer against the external catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomerResolution {
    /// A single confident match was found.
    Resolved(CustomerCandidate),
    /// Multiple plausible candidates were found; a human must choose.
    NeedsHuman(Vec<CustomerCandidate>),
    /// No candidate met the resolution thresholds.
    Unresolved,
}

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Resolves `customer_name_raw` (+ optional `tax_id`) against `catalog`:
/// exact normalized-name match, then fuzzy name match above
/// `policy.fuzzy_threshold`, then tax-id match.
///
/// # Errors
///
/// Returns [`CatalogError`] when the catalog lookup itself fails; this is
/// distinct from an empty or ambiguous result, which is reported as
/// `Ok(CustomerResolution::Unresolved)` / `Ok(CustomerResolution::NeedsHuman(_))`.
pub fn resolve_customer(
    catalog: &dyn ExternalCatalogClient,
    customer_name_raw: &str,
    tax_id: Option<&str>,
    policy: &CustomerResolutionPolicy,
) -> Result<CustomerResolution, CatalogError> {
    let mut candidates = catalog.search_customers(customer_name_raw)?;
    if let Some(tax_id) = tax_id {
        for candidate in catalog.search_customers(tax_id)? {
            if !candidates.iter().any(|existing| existing.customer_ref == candidate.customer_ref) {
                candidates.push(candidate);
            }
        }
    }
    if candidates.is_empty() {
        return Ok(CustomerResolution::Unresolved);
    }

    let normalized_input = normalize_name(customer_name_raw);
    let exact: Vec<CustomerCandidate> = candidates
        .iter()
        .filter(|candidate| normalize_name(&candidate.display_name) == normalized_input)
        .cloned()
        .collect();
    if let [only] = exact.as_slice() {
        return Ok(CustomerResolution::Resolved(only.clone()));
    }
    if exact.len() > 1 {
        return Ok(CustomerResolution::NeedsHuman(exact));
    }

    if let Some(tax_id) = tax_id {
        let normalized_tax = normalize_name(tax_id);
        let tax_matches: Vec<CustomerCandidate> = candidates
            .iter()
            .filter(|candidate| normalize_name(&candidate.display_name).contains(&normalized_tax))
            .cloned()
            .collect();
        if let [only] = tax_matches.as_slice() {
            return Ok(CustomerResolution::Resolved(only.clone()));
        }
    }

    let mut fuzzy: Vec<(f64, CustomerCandidate)> = candidates
        .into_iter()
        .map(|candidate| {
            let score = strsim::jaro_winkler(&normalize_name(&candidate.display_name), &normalized_input);
            (score, candidate)
        })
        .filter(|(score, _)| *score >= policy.fuzzy_threshold)
        .collect();
    fuzzy.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    match fuzzy.as_slice() {
        [] => Ok(CustomerResolution::Unresolved),
        [(_, only)] => Ok(CustomerResolution::Resolved(only.clone())),
        _ => Ok(CustomerResolution::NeedsHuman(fuzzy.into_iter().map(|(_, candidate)| candidate).collect())),
    }
}

/// Normalizes a customer name for exact and fuzzy comparison: trims,
/// lowercases, and collapses internal whitespace, mirroring the
/// `normalize_sku` approach in `caseflow-parser`.
fn normalize_name(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use caseflow_core::CustomerRef;

    struct StubCatalog {
        customers: Vec<CustomerCandidate>,
    }

    impl ExternalCatalogClient for StubCatalog {
        fn search_customers(&self, _query: &str) -> Result<Vec<CustomerCandidate>, CatalogError> {
            Ok(self.customers.clone())
        }

        fn search_items(&self, _query: &str) -> Result<Vec<caseflow_core::ItemCandidate>, CatalogError> {
            Ok(Vec::new())
        }

        fn create_draft_order(
            &self,
            _request: &caseflow_core::DraftOrderRequest,
        ) -> Result<caseflow_core::DraftReference, CatalogError> {
            Err(CatalogError::Transport("not implemented in stub".to_string()))
        }
    }

    fn candidate(name: &str) -> CustomerCandidate {
        CustomerCandidate { customer_ref: CustomerRef::new(name.to_string()), display_name: name.to_string(), score: 1.0 }
    }

    #[test]
    fn exact_normalized_match_resolves() {
        let catalog = StubCatalog { customers: vec![candidate("  Acme   Corp ")] };
        let outcome = resolve_customer(&catalog, "acme corp", None, &CustomerResolutionPolicy::default()).expect("resolves");
        assert_eq!(outcome, CustomerResolution::Resolved(candidate("  Acme   Corp ")));
    }

    #[test]
    fn fuzzy_match_above_threshold_resolves() {
        let catalog = StubCatalog { customers: vec![candidate("Acme Corporation")] };
        let outcome = resolve_customer(&catalog, "Acme Corp", None, &CustomerResolutionPolicy::default()).expect("resolves");
        assert!(matches!(outcome, CustomerResolution::Resolved(_)));
    }

    #[test]
    fn no_candidates_is_unresolved() {
        let catalog = StubCatalog { customers: vec![] };
        let outcome = resolve_customer(&catalog, "Nobody Inc", None, &CustomerResolutionPolicy::default()).expect("resolves");
        assert_eq!(outcome, CustomerResolution::Unresolved);
    }

    #[test]
    fn multiple_exact_matches_need_human() {
        let catalog = StubCatalog { customers: vec![candidate("Acme Corp"), candidate("ACME CORP")] };
        let outcome = resolve_customer(&catalog, "acme corp", None, &CustomerResolutionPolicy::default()).expect("resolves");
        assert!(matches!(outcome, CustomerResolution::NeedsHuman(ref candidates) if candidates.len() == 2));
    }

    #[test]
    fn dissimilar_name_is_unresolved() {
        let catalog = StubCatalog { customers: vec![candidate("Zebra Traders")] };
        let outcome = resolve_customer(&catalog, "Acme Corp", None, &CustomerResolutionPolicy::default()).expect("resolves");
        assert_eq!(outcome, CustomerResolution::Unresolved);
    }
}
