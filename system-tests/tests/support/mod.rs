// system-tests/tests/support/mod.rs
// ============================================================================
// Shared fixtures for the end-to-end scenario tests in this crate. Not a
// test binary itself: `autotests = false` in Cargo.toml means only the
// explicitly declared `[[test]]` entries are compiled, so this module is
// safe to include via `mod support;` from each of them.
// ============================================================================

#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "not every scenario test uses every fixture, and fixtures may assert via panic"
)]

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use bigdecimal::BigDecimal;
use caseflow_committee::AggregationPolicy;
use caseflow_committee::CommitteeConfig;
use caseflow_committee::CommitteeProvider;
use caseflow_committee::EvidencePack;
use caseflow_committee::ProviderConfig;
use caseflow_committee::StrictProviderResponse;
use caseflow_committee::pack::CandidateHeader;
use caseflow_committee::provider::FieldMapping;
use caseflow_core::CanonicalOrder;
use caseflow_core::CaseId;
use caseflow_core::ColumnId;
use caseflow_core::ColumnStat;
use caseflow_core::CustomerCandidate;
use caseflow_core::CustomerRef;
use caseflow_core::DetectedLanguage;
use caseflow_core::EvidenceCell;
use caseflow_core::FieldId;
use caseflow_core::ItemCandidate;
use caseflow_core::ItemRef;
use caseflow_core::LineItem;
use caseflow_core::ProviderFamily;
use caseflow_core::ProviderId;
use caseflow_core::SchemaInference;
use caseflow_core::SheetName;
use caseflow_core::SubmitterId;
use caseflow_core::TenantId;
use caseflow_core::Timestamp;
use caseflow_core::Totals;
use caseflow_demo_minimal::Dispatcher;
use caseflow_demo_minimal::InMemoryCatalog;
use caseflow_demo_minimal::StaticProvider;

/// Returns the submitter id every scenario test submits under.
pub fn submitter() -> SubmitterId {
    SubmitterId::new("system-test-submitter")
}

/// Returns a dispatcher wired with one registered customer ("Acme Corp") and
/// one registered item ("ABC-1"), and a two-provider committee that always
/// agrees.
pub fn build_dispatcher() -> Dispatcher {
    let mut catalog = InMemoryCatalog::new();
    register_unique_customer(&mut catalog);
    register_unique_item(&mut catalog);
    dispatcher_with_catalog_and_providers(catalog, unanimous_provider_pool())
}

/// Returns a dispatcher whose catalog answers the demo order's customer
/// query with two equally-scored candidates, forcing `CustomerAmbiguous`.
pub fn build_dispatcher_with_ambiguous_customer() -> Dispatcher {
    let mut catalog = InMemoryCatalog::new();
    catalog.register_customer_query(
        "Acme Corp",
        vec![
            CustomerCandidate { customer_ref: CustomerRef::new("cust-acme-east"), display_name: "Acme Corp".to_string(), score: 1.0 },
            CustomerCandidate { customer_ref: CustomerRef::new("cust-acme-west"), display_name: "Acme Corp".to_string(), score: 1.0 },
        ],
    );
    register_unique_item(&mut catalog);
    dispatcher_with_catalog_and_providers(catalog, unanimous_provider_pool())
}

/// Returns a dispatcher whose catalog answers the demo order's item query
/// with two equally-scored candidates, forcing `ItemsAmbiguous`.
pub fn build_dispatcher_with_ambiguous_item() -> Dispatcher {
    let mut catalog = InMemoryCatalog::new();
    register_unique_customer(&mut catalog);
    catalog.register_item_query(
        "ABC-1",
        vec![
            ItemCandidate { item_ref: ItemRef::new("item-widget-small"), display_name: "Widget (small)".to_string(), score: 0.95 },
            ItemCandidate { item_ref: ItemRef::new("item-widget-large"), display_name: "Widget (large)".to_string(), score: 0.96 },
        ],
    );
    dispatcher_with_catalog_and_providers(catalog, unanimous_provider_pool())
}

fn register_unique_customer(catalog: &mut InMemoryCatalog) {
    catalog.register_customer_query(
        "Acme Corp",
        vec![CustomerCandidate { customer_ref: CustomerRef::new("cust-acme"), display_name: "Acme Corp".to_string(), score: 1.0 }],
    );
}

fn register_unique_item(catalog: &mut InMemoryCatalog) {
    catalog.register_item_query(
        "ABC-1",
        vec![ItemCandidate { item_ref: ItemRef::new("item-widget"), display_name: "Acme Widget".to_string(), score: 1.0 }],
    );
}

fn dispatcher_with_catalog_and_providers(
    catalog: InMemoryCatalog,
    providers: BTreeMap<ProviderId, Arc<dyn CommitteeProvider>>,
) -> Dispatcher {
    let committee_config = CommitteeConfig {
        pool: vec![
            ProviderConfig { id: ProviderId::new("test-openai"), family: ProviderFamily::OpenAi, weight: 1.0 },
            ProviderConfig { id: ProviderId::new("test-anthropic"), family: ProviderFamily::Anthropic, weight: 1.0 },
        ],
        want: 2,
        min_successful: 1,
        per_call_timeout: std::time::Duration::from_secs(5),
        committee_timeout: std::time::Duration::from_secs(10),
        policy: AggregationPolicy::default(),
    };
    Dispatcher::new(TenantId::new("tenant-system-test"), unique_evidence_root(), catalog, providers, committee_config)
        .expect("builds dispatcher")
}

/// Returns a fresh, process-unique evidence root under the system temp
/// directory; the evidence store creates it on open and scenario tests
/// write only a handful of small JSON files into it.
fn unique_evidence_root() -> std::path::PathBuf {
    static SEQUENCE: AtomicU64 = AtomicU64::new(0);
    let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("caseflow-system-tests-{}-{sequence}", std::process::id()))
}

/// Two providers that unanimously pick the sole candidate column.
fn unanimous_provider_pool() -> BTreeMap<ProviderId, Arc<dyn CommitteeProvider>> {
    let response = confident_response("col-customer", 0.92);
    let mut providers: BTreeMap<ProviderId, Arc<dyn CommitteeProvider>> = BTreeMap::new();
    providers.insert(
        ProviderId::new("test-openai"),
        Arc::new(StaticProvider::new(ProviderId::new("test-openai"), ProviderFamily::OpenAi, response.clone())),
    );
    providers.insert(
        ProviderId::new("test-anthropic"),
        Arc::new(StaticProvider::new(ProviderId::new("test-anthropic"), ProviderFamily::Anthropic, response)),
    );
    providers
}

fn confident_response(column_id: &str, confidence: f64) -> StrictProviderResponse {
    StrictProviderResponse {
        mappings: vec![FieldMapping {
            field: FieldId::from("customer_name"),
            selected_column_id: Some(ColumnId::from(column_id)),
            confidence,
            reasoning: "header text matches the customer_name field directly".to_string(),
        }],
        issues: Vec::new(),
        overall_confidence: confidence,
        processing_time_ms: 50,
    }
}

/// Builds the evidence pack for the demo order's single unambiguous
/// `Customer` column.
pub fn demo_evidence_pack() -> EvidencePack {
    let column = ColumnId::from("col-customer");
    let mut sample_values = BTreeMap::new();
    sample_values.insert(column.clone(), vec!["Acme Corp".to_string()]);

    EvidencePack {
        case_id: CaseId::from("case-0"),
        candidate_headers: vec![CandidateHeader {
            column_id: column.clone(),
            header_text: Some("Customer".to_string()),
            candidate_fields: vec![FieldId::from("customer_name")],
        }],
        sample_values,
        column_stats: vec![ColumnStat {
            column,
            header_text: Some("Customer".to_string()),
            non_empty_count: 1,
            numeric_ratio: 0.0,
            sample_values: vec!["Acme Corp".to_string()],
        }],
        detected_language: DetectedLanguage::English,
        constraints: vec!["only choose among the listed column ids, or null if none is plausible".to_string()],
        timestamp: Timestamp::Logical(0),
    }
}

/// Builds a single-line canonical order: one line, quantity 10, unit price
/// 25.50, matching the registered customer and item exactly.
pub fn demo_order() -> CanonicalOrder {
    let sheet = SheetName::from("Sheet1");
    let sku_field = FieldId::from("sku");
    let qty_field = FieldId::from("quantity");

    let sku_cell = EvidenceCell {
        sheet: sheet.clone(),
        row: 1,
        column: ColumnId::from("B"),
        raw_value: "ABC-1".to_string(),
        normalized_value: None,
    };
    let qty_cell = EvidenceCell {
        sheet: sheet.clone(),
        row: 1,
        column: ColumnId::from("C"),
        raw_value: "10".to_string(),
        normalized_value: None,
    };

    let line = LineItem {
        row: 1,
        sku: Some("ABC-1".to_string()),
        gtin: None,
        description: "Acme Widget".to_string(),
        quantity: decimal("10"),
        unit_price: decimal("25.50"),
        line_total: decimal("255.00"),
        evidence: vec![(sku_field, sku_cell), (qty_field, qty_cell)],
        resolved_item: None,
    };

    CanonicalOrder {
        customer_name_raw: "Acme Corp".to_string(),
        resolved_customer: None,
        currency: Some("USD".to_string()),
        order_date: Some("2026-01-15".to_string()),
        line_items: vec![line],
        totals: Totals { subtotal: decimal("255.00"), tax: None, total: decimal("255.00") },
        schema: vec![SchemaInference {
            sheet,
            header_row_index: Some(0),
            column_roles: vec![(ColumnId::from("B"), FieldId::from("sku")), (ColumnId::from("C"), FieldId::from("quantity"))],
            column_stats: Vec::new(),
            detected_language: DetectedLanguage::English,
        }],
    }
}

fn decimal(value: &str) -> BigDecimal {
    BigDecimal::from_str(value).unwrap_or_else(|_| unreachable_decimal(value))
}

#[cold]
fn unreachable_decimal(value: &str) -> BigDecimal {
    panic!("invalid fixture decimal literal: {value}")
}
