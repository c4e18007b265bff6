// caseflow-core/tests/fingerprint.rs
// ============================================================================
// Module: Fingerprint Tests
// Description: Validates deterministic, order-independent fingerprinting.
// ============================================================================
//! ## Overview
//! Confirms the fingerprint is stable across line-item reordering and
//! changes whenever the customer or quantities change.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use caseflow_core::CanonicalOrder;
use caseflow_core::CustomerRef;
use caseflow_core::LineItem;
use caseflow_core::Totals;
use caseflow_core::compute_fingerprint;
use caseflow_core::hashing::DEFAULT_HASH_ALGORITHM;
use caseflow_core::hashing::hash_bytes;

fn line(sku: &str, qty: &str, price: &str) -> LineItem {
    LineItem {
        row: 0,
        sku: Some(sku.to_string()),
        gtin: None,
        description: sku.to_string(),
        quantity: qty.parse().unwrap(),
        unit_price: price.parse().unwrap(),
        line_total: "0".parse().unwrap(),
        evidence: Vec::new(),
        resolved_item: None,
    }
}

fn order(lines: Vec<LineItem>) -> CanonicalOrder {
    CanonicalOrder {
        customer_name_raw: "Acme Corp".to_string(),
        resolved_customer: None,
        currency: Some("USD".to_string()),
        order_date: Some("2026-07-28".to_string()),
        line_items: lines,
        totals: Totals {
            subtotal: "0".parse().unwrap(),
            tax: None,
            total: "0".parse().unwrap(),
        },
        schema: Vec::new(),
    }
}

#[test]
fn fingerprint_is_stable_under_line_item_reordering() {
    let file_hash = hash_bytes(DEFAULT_HASH_ALGORITHM, b"workbook-bytes");
    let customer = CustomerRef::new("cust-1");

    let order_a = order(vec![line("SKU-1", "2", "10.00"), line("SKU-2", "1", "5.00")]);
    let order_b = order(vec![line("SKU-2", "1", "5.00"), line("SKU-1", "2", "10.00")]);

    let fp_a = compute_fingerprint(&file_hash, &customer, &order_a, "2026-07-28").unwrap();
    let fp_b = compute_fingerprint(&file_hash, &customer, &order_b, "2026-07-28").unwrap();

    assert_eq!(fp_a.as_str(), fp_b.as_str());
}

#[test]
fn fingerprint_is_stable_across_unit_price_and_description_changes() {
    let file_hash = hash_bytes(DEFAULT_HASH_ALGORITHM, b"workbook-bytes");
    let customer = CustomerRef::new("cust-1");

    let order_a = order(vec![line("SKU-1", "2", "10.00")]);
    let mut repriced = line("SKU-1", "2", "12.50");
    repriced.description = "Widget, re-worded".to_string();
    let order_b = order(vec![repriced]);

    let fp_a = compute_fingerprint(&file_hash, &customer, &order_a, "2026-07-28").unwrap();
    let fp_b = compute_fingerprint(&file_hash, &customer, &order_b, "2026-07-28").unwrap();

    assert_eq!(fp_a.as_str(), fp_b.as_str());
}

#[test]
fn fingerprint_changes_with_customer() {
    let file_hash = hash_bytes(DEFAULT_HASH_ALGORITHM, b"workbook-bytes");
    let order = order(vec![line("SKU-1", "2", "10.00")]);

    let fp_a =
        compute_fingerprint(&file_hash, &CustomerRef::new("cust-1"), &order, "2026-07-28")
            .unwrap();
    let fp_b =
        compute_fingerprint(&file_hash, &CustomerRef::new("cust-2"), &order, "2026-07-28")
            .unwrap();

    assert_ne!(fp_a.as_str(), fp_b.as_str());
}
