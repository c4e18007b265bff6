// caseflow-resolver/src/item.rs
// ============================================================================
// Module: Item Resolution
// Description: Resolves a parsed line item (GTIN/SKU/description) against
//              the external catalog.
// Purpose: Implement the item resolution rule: GTIN match, then
//          normalized SKU, then fuzzy product name.
// Dependencies: caseflow-core, caseflow-parser, strsim
// ============================================================================

//! ## Overview
//! Item resolution mirrors customer resolution's three-way outcome
//! (`resolved` / `needs-human` / `unresolved`), but walks a fixed priority
//! order of identifiers rather than trying them all at once: a GTIN, being
//! globally unique, is trusted over a SKU, which is trusted over a fuzzy
//! match on the free-text description.

// ============================================================================
// SECTION: Imports
// ============================================================================

use caseflow_core::CatalogError;
use caseflow_core::ItemCandidate;
use caseflow_core::LineItem;
use caseflow_parser::numbers::normalize_sku;
use caseflow_parser::numbers::strip_gtin;

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Tunable thresholds for item resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemResolutionPolicy {
    /// Minimum catalog match score treated as an exact GTIN/SKU hit.
    pub exact_threshold: f64,
    /// Minimum Jaro-Winkler similarity for a fuzzy description match.
    /// Default 0.85, matching customer resolution.
    pub fuzzy_threshold: f64,
}

impl Default for ItemResolutionPolicy {
    fn default() -> Self {
        Self { exact_threshold: 0.9, fuzzy_threshold: 0.85 }
    }
}

// ============================================================================
// SECTION: Resolution Outcome
// ============================================================================

/// Outcome of resolving one line item against the external catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemResolution {
    /// A single confident match was found.
    Resolved(ItemCandidate),
    /// Multiple plausible candidates were found; a human must choose.
    NeedsHuman(Vec<ItemCandidate>),
    /// No candidate met the resolution thresholds.
    Unresolved,
}

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Resolves `line` against `catalog`: prefer a GTIN match, fall back to
/// normalized SKU, then fuzzy product-description match.
///
/// # Errors
///
/// Returns [`CatalogError`] when a catalog lookup itself fails.
pub fn resolve_item(
    catalog: &dyn caseflow_core::ExternalCatalogClient,
    line: &LineItem,
    policy: &ItemResolutionPolicy,
) -> Result<ItemResolution, CatalogError> {
    if let Some(gtin) = line.gtin.as_deref().filter(|value| !value.trim().is_empty()) {
        let resolution = classify(catalog.search_items(&strip_gtin(gtin))?, policy.exact_threshold);
        if !matches!(resolution, ItemResolution::Unresolved) {
            return Ok(resolution);
        }
    }

    if let Some(sku) = line.sku.as_deref().filter(|value| !value.trim().is_empty()) {
        let resolution = classify(catalog.search_items(&normalize_sku(sku))?, policy.exact_threshold);
        if !matches!(resolution, ItemResolution::Unresolved) {
            return Ok(resolution);
        }
    }

    if line.description.trim().is_empty() {
        return Ok(ItemResolution::Unresolved);
    }
    Ok(classify(catalog.search_items(&line.description)?, policy.fuzzy_threshold))
}

/// Classifies a set of catalog candidates already ranked by the catalog's
/// own match score: keeps only candidates at or above `threshold`, then
/// reports resolved/needs-human/unresolved by how many remain.
fn classify(candidates: Vec<ItemCandidate>, threshold: f64) -> ItemResolution {
    let mut qualifying: Vec<ItemCandidate> = candidates.into_iter().filter(|candidate| candidate.score >= threshold).collect();
    qualifying.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    match qualifying.as_slice() {
        [] => ItemResolution::Unresolved,
        [only] => ItemResolution::Resolved(only.clone()),
        _ => ItemResolution::NeedsHuman(qualifying),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use caseflow_core::DraftOrderRequest;
    use caseflow_core::DraftReference;
    use caseflow_core::ItemRef;
    use std::cell::RefCell;

    struct StubCatalog {
        by_query: RefCell<Vec<(String, Vec<ItemCandidate>)>>,
    }

    impl caseflow_core::ExternalCatalogClient for StubCatalog {
        fn search_customers(&self, _query: &str) -> Result<Vec<caseflow_core::CustomerCandidate>, CatalogError> {
            Ok(Vec::new())
        }

        fn search_items(&self, query: &str) -> Result<Vec<ItemCandidate>, CatalogError> {
            Ok(self
                .by_query
                .borrow()
                .iter()
                .find(|(key, _)| key == query)
                .map(|(_, candidates)| candidates.clone())
                .unwrap_or_default())
        }

        fn create_draft_order(&self, _request: &DraftOrderRequest) -> Result<DraftReference, CatalogError> {
            Err(CatalogError::Transport("not implemented in stub".to_string()))
        }
    }

    fn candidate(id: &str, score: f64) -> ItemCandidate {
        ItemCandidate { item_ref: ItemRef::new(id.to_string()), display_name: id.to_string(), score }
    }

    fn non_empty(value: &str) -> Option<String> {
        if value.is_empty() { None } else { Some(value.to_string()) }
    }

    fn line(gtin: &str, sku: &str, description: &str) -> LineItem {
        use bigdecimal::BigDecimal;
        use std::str::FromStr;
        LineItem {
            row: 1,
            sku: non_empty(sku),
            gtin: non_empty(gtin),
            description: description.to_string(),
            quantity: BigDecimal::from_str("1").unwrap_or_default(),
            unit_price: BigDecimal::from_str("1").unwrap_or_default(),
            line_total: BigDecimal::from_str("1").unwrap_or_default(),
            evidence: Vec::new(),
            resolved_item: None,
        }
    }

    #[test]
    fn gtin_match_takes_priority() {
        let catalog = StubCatalog {
            by_query: RefCell::new(vec![("00012345600012".to_string(), vec![candidate("widget", 1.0)])]),
        };
        let resolution = resolve_item(&catalog, &line("00012345600012", "SKU1", "Widget"), &ItemResolutionPolicy::default())
            .expect("resolves");
        assert_eq!(resolution, ItemResolution::Resolved(candidate("widget", 1.0)));
    }

    #[test]
    fn falls_back_to_sku_when_gtin_unmatched() {
        let catalog =
            StubCatalog { by_query: RefCell::new(vec![("SKU1".to_string(), vec![candidate("widget", 1.0)])]) };
        let resolution = resolve_item(&catalog, &line("", "sku1", "Widget"), &ItemResolutionPolicy::default()).expect("resolves");
        assert_eq!(resolution, ItemResolution::Resolved(candidate("widget", 1.0)));
    }

    #[test]
    fn falls_back_to_fuzzy_description() {
        let catalog =
            StubCatalog { by_query: RefCell::new(vec![("Blue Widget".to_string(), vec![candidate("widget", 0.9)])]) };
        let resolution =
            resolve_item(&catalog, &line("", "", "Blue Widget"), &ItemResolutionPolicy::default()).expect("resolves");
        assert_eq!(resolution, ItemResolution::Resolved(candidate("widget", 0.9)));
    }

    #[test]
    fn multiple_qualifying_candidates_need_human() {
        let catalog = StubCatalog {
            by_query: RefCell::new(vec![("SKU1".to_string(), vec![candidate("a", 0.95), candidate("b", 0.96)])]),
        };
        let resolution = resolve_item(&catalog, &line("", "sku1", ""), &ItemResolutionPolicy::default()).expect("resolves");
        assert!(matches!(resolution, ItemResolution::NeedsHuman(ref candidates) if candidates.len() == 2));
    }

    #[test]
    fn no_identifiers_is_unresolved() {
        let catalog = StubCatalog { by_query: RefCell::new(Vec::new()) };
        let resolution = resolve_item(&catalog, &line("", "", ""), &ItemResolutionPolicy::default()).expect("resolves");
        assert_eq!(resolution, ItemResolution::Unresolved);
    }
}
