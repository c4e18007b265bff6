// caseflow-demo-minimal/src/main.rs
// ============================================================================
// Module: Caseflow Minimal Demo Binary
// Description: Submits one hand-built order and drains it to completion.
// Purpose: A runnable, inspectable walk-through of the case lifecycle for
//          local exploration, with no external dependencies.
// Dependencies: caseflow-demo-minimal, tokio
// ============================================================================

//! ## Overview
//! Builds a single customer and a single catalog item, registers them with
//! [`caseflow_demo_minimal::InMemoryCatalog`], submits a matching order
//! through [`caseflow_demo_minimal::Dispatcher`], and drains it to
//! completion, printing the case's state after each processing step.

use std::collections::BTreeMap;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use caseflow_committee::AggregationPolicy;
use caseflow_committee::CommitteeConfig;
use caseflow_committee::CommitteeProvider;
use caseflow_committee::EvidencePack;
use caseflow_committee::ProviderConfig;
use caseflow_committee::pack::CandidateHeader;
use caseflow_committee::provider::FieldMapping;
use caseflow_core::CanonicalOrder;
use caseflow_core::CaseState;
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

/// Demo entry point returning an exit code.
#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => emit_error(&message),
    }
}

/// Runs the demo end to end, returning a human-readable error on failure.
async fn run() -> Result<(), String> {
    let tenant_id = TenantId::new("tenant-demo");
    let mut catalog = InMemoryCatalog::new();
    let customer_ref = CustomerRef::new("cust-acme");
    catalog.register_customer_query(
        "Acme Corp",
        vec![CustomerCandidate { customer_ref: customer_ref.clone(), display_name: "Acme Corp".to_string(), score: 1.0 }],
    );
    let item_ref = ItemRef::new("item-widget");
    catalog.register_item_query(
        "ABC-1",
        vec![ItemCandidate { item_ref: item_ref.clone(), display_name: "Acme Widget".to_string(), score: 1.0 }],
    );

    let providers = static_provider_pool();
    let committee_config = CommitteeConfig {
        pool: vec![
            ProviderConfig { id: ProviderId::new("demo-openai"), family: ProviderFamily::OpenAi, weight: 1.0 },
            ProviderConfig { id: ProviderId::new("demo-anthropic"), family: ProviderFamily::Anthropic, weight: 1.0 },
        ],
        want: 2,
        min_successful: 1,
        per_call_timeout: std::time::Duration::from_secs(5),
        committee_timeout: std::time::Duration::from_secs(10),
        policy: AggregationPolicy::default(),
    };

    let evidence_root = std::env::temp_dir().join("caseflow-demo-minimal");
    let dispatcher = Dispatcher::new(tenant_id, evidence_root, catalog, providers, committee_config)
        .map_err(|err| err.to_string())?;

    let order = demo_order();
    let evidence_pack = demo_evidence_pack();
    let submitter_id = SubmitterId::new("demo-submitter");
    let case_id = dispatcher.submit(submitter_id, order, evidence_pack).map_err(|err| err.to_string())?;
    write_stdout_line(&format!("submitted case {}", case_id.as_str()));

    while dispatcher.pending_triggers() > 0 {
        match dispatcher.drain_and_process().await.map_err(|err| err.to_string())? {
            Some(processed) => {
                write_stdout_line(&format!(
                    "case {} now in state {}",
                    processed.case_id.as_str(),
                    state_label(processed.state)
                ));
            }
            None => break,
        }
    }

    if let Some(case) = dispatcher.load_case(&case_id).map_err(|err| err.to_string())?
        && case.state == CaseState::AwaitingApproval
    {
        write_stdout_line("approving draft for human-reviewed case");
        if let Some(processed) = dispatcher.approve(&case_id, true).await.map_err(|err| err.to_string())? {
            write_stdout_line(&format!(
                "case {} now in state {}",
                processed.case_id.as_str(),
                state_label(processed.state)
            ));
        }
    }

    if let Some(case) = dispatcher.load_case(&case_id).map_err(|err| err.to_string())? {
        write_stdout_line(&format!("final state: {}", state_label(case.state)));
        if let Some(reference) = &case.draft_reference {
            write_stdout_line(&format!("draft order reference: {}", reference.as_str()));
        }
    }

    Ok(())
}

/// Builds the two committee providers the demo runs against, both
/// deterministically choosing the `customer_name` column the demo order
/// actually maps to.
fn static_provider_pool() -> BTreeMap<ProviderId, Arc<dyn CommitteeProvider>> {
    let response = demo_provider_response();
    let mut providers: BTreeMap<ProviderId, Arc<dyn CommitteeProvider>> = BTreeMap::new();
    providers.insert(
        ProviderId::new("demo-openai"),
        Arc::new(StaticProvider::new(ProviderId::new("demo-openai"), ProviderFamily::OpenAi, response.clone())),
    );
    providers.insert(
        ProviderId::new("demo-anthropic"),
        Arc::new(StaticProvider::new(ProviderId::new("demo-anthropic"), ProviderFamily::Anthropic, response)),
    );
    providers
}

/// Returns the canned response every demo provider returns: a confident
/// selection of the sole candidate column for `customer_name`.
fn demo_provider_response() -> caseflow_committee::StrictProviderResponse {
    caseflow_committee::StrictProviderResponse {
        mappings: vec![FieldMapping {
            field: FieldId::from("customer_name"),
            selected_column_id: Some(ColumnId::from("col-customer")),
            confidence: 0.92,
            reasoning: "Header text 'Customer' matches the customer_name field directly.".to_string(),
        }],
        issues: Vec::new(),
        overall_confidence: 0.92,
        processing_time_ms: 50,
    }
}

/// Builds the evidence pack the demo's committee call is run against,
/// mirroring what a real column-mapping stage would produce for a sheet
/// with one unambiguous `Customer` column.
fn demo_evidence_pack() -> EvidencePack {
    let column = ColumnId::from("col-customer");
    let mut sample_values = BTreeMap::new();
    sample_values.insert(column.clone(), vec!["Acme Corp".to_string()]);

    EvidencePack {
        case_id: caseflow_core::CaseId::from("case-0"),
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

/// Builds the demo's single-line canonical order: one line, quantity 10,
/// unit price 25.50, matching the registered customer and item exactly.
fn demo_order() -> CanonicalOrder {
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

/// Returns a short label for a case state, for human-readable progress output.
const fn state_label(state: CaseState) -> &'static str {
    match state {
        CaseState::Received => "received",
        CaseState::Parsing => "parsing",
        CaseState::Blocked => "blocked",
        CaseState::Validating => "validating",
        CaseState::AwaitingCommittee => "awaiting_committee",
        CaseState::ResolvingCustomer => "resolving_customer",
        CaseState::ResolvingItems => "resolving_items",
        CaseState::AwaitingApproval => "awaiting_approval",
        CaseState::Drafting => "drafting",
        CaseState::Completed => "completed",
        CaseState::QueuedForWriter => "queued_for_writer",
        CaseState::Cancelled => "cancelled",
        CaseState::Failed => "failed",
    }
}

/// Parses a fixed decimal literal used only by this module's own demo
/// constants, which are all known-valid at compile time.
fn decimal(value: &str) -> BigDecimal {
    BigDecimal::from_str(value).unwrap_or_else(|_| unreachable_decimal(value))
}

/// Cold path hit only if a literal above were malformed; kept out of line so
/// `decimal` stays a simple expression and no `unwrap`/`expect` appears here.
#[cold]
#[allow(clippy::panic, reason = "cold path: compile-time-known-valid literal")]
fn unreachable_decimal(value: &str) -> BigDecimal {
    panic!("invalid demo decimal literal: {value}")
}

/// Writes one line to stdout, permitted here as the demo binary's only
/// output surface.
fn write_stdout_line(message: &str) {
    use std::io::Write;
    let mut stdout = std::io::stdout();
    let _ = writeln!(&mut stdout, "{message}");
}

/// Writes one line to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    use std::io::Write;
    let mut stderr = std::io::stderr();
    let _ = writeln!(&mut stderr, "{message}");
    ExitCode::FAILURE
}
