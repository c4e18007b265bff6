// caseflow-contract/src/examples.rs
// ============================================================================
// Module: Contract Examples
// Description: Canonical example payloads for the four wire shapes and the
//              configuration file.
// Purpose: Provide deterministic, real-world examples built from the actual
//          runtime types so docs and SDKs cannot drift from what the system
//          actually produces.
// Dependencies: caseflow-committee, caseflow-config, caseflow-core, bigdecimal
// ============================================================================

//! ## Overview
//! This module constructs example payloads from the real wire types in
//! `caseflow-core` and `caseflow-committee` rather than hand-written JSON, so
//! a schema change in those crates breaks this module at compile time
//! instead of silently diverging from the generated docs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use caseflow_committee::EvidencePack;
use caseflow_committee::StrictProviderResponse;
use caseflow_committee::pack::CandidateHeader;
use caseflow_committee::provider::FieldMapping;
use caseflow_core::AggregatedVotes;
use caseflow_core::CanonicalOrder;
use caseflow_core::CaseId;
use caseflow_core::ColumnId;
use caseflow_core::ColumnStat;
use caseflow_core::CommitteeResult;
use caseflow_core::Consensus;
use caseflow_core::DetectedLanguage;
use caseflow_core::EvidenceCell;
use caseflow_core::FieldId;
use caseflow_core::FieldVote;
use caseflow_core::LineItem;
use caseflow_core::ProviderFamily;
use caseflow_core::ProviderId;
use caseflow_core::ProviderOutput;
use caseflow_core::SchemaInference;
use caseflow_core::SheetName;
use caseflow_core::TaskId;
use caseflow_core::Timestamp;
use caseflow_core::Totals;

// ============================================================================
// SECTION: Evidence Pack Example
// ============================================================================

/// Returns a canonical example [`EvidencePack`] for a sheet with an
/// ambiguous customer-name column (`Bill-To` vs `Customer`).
#[must_use]
pub fn evidence_pack_example() -> EvidencePack {
    let customer_field = FieldId::from("customer_name");
    let sku_field = FieldId::from("sku");
    let bill_to = ColumnId::from("col-a");
    let customer = ColumnId::from("col-b");
    let sku = ColumnId::from("col-c");

    let mut sample_values = BTreeMap::new();
    sample_values.insert(bill_to.clone(), vec![String::from("Acme Corp"), String::from("Acme Co.")]);
    sample_values.insert(customer.clone(), vec![String::from("Acme Corp"), String::from("Acme Co.")]);
    sample_values.insert(sku.clone(), vec![String::from("ABC-1")]);

    EvidencePack {
        case_id: CaseId::from("case-0001"),
        candidate_headers: vec![
            CandidateHeader {
                column_id: bill_to,
                header_text: Some(String::from("Bill-To")),
                candidate_fields: vec![customer_field.clone()],
            },
            CandidateHeader {
                column_id: customer,
                header_text: Some(String::from("Customer")),
                candidate_fields: vec![customer_field],
            },
            CandidateHeader {
                column_id: sku.clone(),
                header_text: Some(String::from("SKU")),
                candidate_fields: vec![sku_field.clone()],
            },
        ],
        sample_values,
        column_stats: vec![ColumnStat {
            column: sku,
            header_text: Some(String::from("SKU")),
            non_empty_count: 1,
            numeric_ratio: 0.0,
            sample_values: vec![String::from("ABC-1")],
        }],
        detected_language: DetectedLanguage::English,
        constraints: vec![String::from(
            "only choose among the listed column ids, or null if none is plausible",
        )],
        timestamp: Timestamp::UnixMillis(1_732_550_400_000),
    }
}

// ============================================================================
// SECTION: Provider Response Example
// ============================================================================

/// Returns a canonical example [`StrictProviderResponse`] selecting the
/// `Customer` column over `Bill-To` for the customer-name field.
#[must_use]
pub fn strict_provider_response_example() -> StrictProviderResponse {
    StrictProviderResponse {
        mappings: vec![FieldMapping {
            field: FieldId::from("customer_name"),
            selected_column_id: Some(ColumnId::from("col-b")),
            confidence: 0.88,
            reasoning: String::from(
                "Header text 'Customer' is an exact dictionary match; 'Bill-To' is a \
                 secondary synonym with lower prior weight.",
            ),
        }],
        issues: Vec::new(),
        overall_confidence: 0.88,
        processing_time_ms: 842,
    }
}

// ============================================================================
// SECTION: Committee Result Example
// ============================================================================

/// Returns a canonical example [`CommitteeResult`] reflecting a split-vote
/// outcome over an ambiguous customer-name column.
#[must_use]
pub fn committee_result_example() -> CommitteeResult {
    let field = FieldId::from("customer_name");
    let chosen = ColumnId::from("col-b");
    let other = ColumnId::from("col-a");

    let outputs = vec![
        provider_output("azure-openai-gpt4o", ProviderFamily::OpenAi, &field, &chosen, 0.88),
        provider_output("azure-anthropic-claude", ProviderFamily::Anthropic, &field, &chosen, 0.81),
        provider_output("azure-deepseek-v3", ProviderFamily::DeepSeek, &field, &other, 0.76),
    ];

    CommitteeResult {
        task_id: TaskId::from("task-0001"),
        outputs,
        aggregated: vec![AggregatedVotes {
            field_id: field,
            consensus: Consensus::Split,
            chosen_value: Some(serde_json::json!("col-b")),
            supporting_weight: 0.62,
            dissenting_weight: 0.38,
        }],
    }
}

/// Builds one provider's output for the committee-result example.
fn provider_output(
    id: &str,
    family: ProviderFamily,
    field: &FieldId,
    selected: &ColumnId,
    confidence: f64,
) -> ProviderOutput {
    ProviderOutput {
        provider_id: ProviderId::from(id),
        family,
        field_votes: vec![FieldVote {
            field_id: field.clone(),
            value: serde_json::Value::String(selected.as_str().to_string()),
            confidence,
        }],
        latency_ms: 900,
    }
}

// ============================================================================
// SECTION: Canonical Order Example
// ============================================================================

/// Returns a canonical example [`CanonicalOrder`] for the happy-path
/// scenario: one line, quantity 10, unit price 25.50.
#[must_use]
pub fn canonical_order_example() -> CanonicalOrder {
    let sheet = SheetName::from("Sheet1");
    let sku_field = FieldId::from("sku");
    let qty_field = FieldId::from("quantity");

    let sku_cell = EvidenceCell {
        sheet: sheet.clone(),
        row: 1,
        column: ColumnId::from("B"),
        raw_value: String::from("ABC-1"),
        normalized_value: None,
    };
    let qty_cell = EvidenceCell {
        sheet: sheet.clone(),
        row: 1,
        column: ColumnId::from("C"),
        raw_value: String::from("10"),
        normalized_value: None,
    };

    let line = LineItem {
        row: 1,
        sku: Some(String::from("ABC-1")),
        gtin: None,
        description: String::from("Acme Widget"),
        quantity: decimal("10"),
        unit_price: decimal("25.50"),
        line_total: decimal("255.00"),
        evidence: vec![(sku_field, sku_cell), (qty_field, qty_cell)],
        resolved_item: None,
    };

    CanonicalOrder {
        customer_name_raw: String::from("Acme"),
        resolved_customer: None,
        currency: Some(String::from("USD")),
        order_date: Some(String::from("2026-01-15")),
        line_items: vec![line],
        totals: Totals { subtotal: decimal("255.00"), tax: None, total: decimal("255.00") },
        schema: vec![SchemaInference {
            sheet,
            header_row_index: Some(0),
            column_roles: vec![
                (ColumnId::from("B"), FieldId::from("sku")),
                (ColumnId::from("C"), FieldId::from("quantity")),
            ],
            column_stats: Vec::new(),
            detected_language: DetectedLanguage::English,
        }],
    }
}

/// Parses a fixed decimal literal used by this module's own example
/// constants, which are all known-valid at compile time.
fn decimal(value: &str) -> BigDecimal {
    BigDecimal::from_str(value).unwrap_or_else(|_| unreachable_decimal(value))
}

/// Cold path hit only if a literal above were malformed; kept out of line so
/// `decimal` stays a simple expression and no `unwrap`/`expect` appears here.
#[cold]
#[allow(clippy::panic, reason = "cold path: compile-time-known-valid literal")]
fn unreachable_decimal(value: &str) -> BigDecimal {
    panic!("invalid example decimal literal: {value}")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions")]

    use super::*;

    #[test]
    fn evidence_pack_example_is_internally_consistent() {
        let pack = evidence_pack_example();
        assert!(pack.contains_column(&ColumnId::from("col-b")));
    }

    #[test]
    fn provider_response_example_selects_a_pack_column() {
        let pack = evidence_pack_example();
        let response = strict_provider_response_example();
        let mapping = &response.mappings[0];
        let selected = mapping.selected_column_id.as_ref().expect("selected column");
        assert!(pack.contains_column(selected));
    }

    #[test]
    fn committee_result_example_reaches_split_consensus() {
        let result = committee_result_example();
        assert_eq!(result.aggregated[0].consensus, Consensus::Split);
    }

    #[test]
    fn canonical_order_example_has_evidence_for_every_field() {
        let order = canonical_order_example();
        let line = &order.line_items[0];
        assert!(line.evidence_for(&FieldId::from("sku")).is_some());
        assert!(line.evidence_for(&FieldId::from("quantity")).is_some());
    }
}
