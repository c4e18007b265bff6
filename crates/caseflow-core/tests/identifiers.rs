// caseflow-core/tests/identifiers.rs
// ============================================================================
// Module: Identifier Tests
// Description: Tests for caseflow identifier wrappers.
// Purpose: Ensure IDs round-trip through serde and display correctly.
// Dependencies: caseflow-core, serde_json
// ============================================================================
//! ## Overview
//! Validates that identifier wrappers preserve their underlying string values.

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

use caseflow_core::CaseId;
use caseflow_core::ColumnId;
use caseflow_core::CorrelationId;
use caseflow_core::CustomerRef;
use caseflow_core::DraftReference;
use caseflow_core::FieldId;
use caseflow_core::ItemRef;
use caseflow_core::ProviderId;
use caseflow_core::SheetName;
use caseflow_core::SubmitterId;
use caseflow_core::TaskId;
use caseflow_core::TenantId;

macro_rules! assert_id_roundtrip {
    ($ty:ty, $value:expr) => {{
        let id = <$ty>::new($value);
        assert_eq!(id.as_str(), $value);
        assert_eq!(id.to_string(), $value);

        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, format!("\"{}\"", $value));

        let decoded: $ty = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(decoded.as_str(), $value);
    }};
}

/// Verifies identifier wrappers expose stable string values and serde.
#[test]
fn identifiers_roundtrip_with_serde_and_display() {
    assert_id_roundtrip!(TenantId, "tenant-1");
    assert_id_roundtrip!(CaseId, "case-1");
    assert_id_roundtrip!(SubmitterId, "submitter-1");
    assert_id_roundtrip!(CorrelationId, "corr-1");
    assert_id_roundtrip!(TaskId, "task-1");
    assert_id_roundtrip!(ProviderId, "openai-gpt");
    assert_id_roundtrip!(FieldId, "customer_name");
    assert_id_roundtrip!(ColumnId, "col-b");
    assert_id_roundtrip!(SheetName, "Sheet1");
    assert_id_roundtrip!(DraftReference, "SO-00042");
    assert_id_roundtrip!(CustomerRef, "cust-17");
    assert_id_roundtrip!(ItemRef, "item-9");
}

/// Distinct identifier types with the same underlying string are not
/// interchangeable at the type level (compile-time check only; this test
/// documents the intent).
#[test]
fn identifiers_are_opaque_wrappers() {
    let case_id = CaseId::new("shared-value");
    let task_id = TaskId::new("shared-value");
    assert_eq!(case_id.as_str(), task_id.as_str());
}
