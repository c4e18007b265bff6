// caseflow-core/src/core/order.rs
// ============================================================================
// Module: Caseflow Order Model
// Description: Canonical purchase order contents with cell-level provenance.
// Purpose: Represent extracted and normalized order data independent of the
//          workbook layout it was parsed from.
// Dependencies: bigdecimal, crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! A [`CanonicalOrder`] is the normalized result of parsing a submitted
//! workbook. Every field that was read from a cell carries an [`EvidenceCell`]
//! so downstream review and audit can point back at the exact source
//! location, independent of how the workbook was laid out.

// ============================================================================
// SECTION: Imports
// ============================================================================

use bigdecimal::BigDecimal;
use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ColumnId;
use crate::core::identifiers::FieldId;
use crate::core::identifiers::SheetName;

// ============================================================================
// SECTION: Evidence Cells
// ============================================================================

/// Pointer to the exact workbook cell a value was read from.
///
/// # Invariants
/// - `row` and `column` are zero-based offsets within `sheet`.
/// - `normalized_value` is `None` when no normalization was required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceCell {
    /// Sheet the value was read from.
    pub sheet: SheetName,
    /// Zero-based row offset.
    pub row: u32,
    /// Column identifier (header-derived or positional).
    pub column: ColumnId,
    /// Raw cell text as read from the workbook.
    pub raw_value: String,
    /// Normalized value, when normalization (digit folding, trimming) applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalized_value: Option<String>,
}

impl EvidenceCell {
    /// Returns the normalized value if present, else the raw value.
    #[must_use]
    pub fn effective_value(&self) -> &str {
        self.normalized_value.as_deref().unwrap_or(&self.raw_value)
    }
}

// ============================================================================
// SECTION: Language Detection
// ============================================================================

/// Detected header/content language for a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DetectedLanguage {
    /// Latin-script English content.
    #[default]
    English,
    /// Persian (Farsi) content, right-to-left.
    Persian,
    /// Arabic content, right-to-left.
    Arabic,
    /// Mixture of scripts within the same sheet.
    Mixed,
    /// Language could not be determined from the sample.
    Unknown,
}

// ============================================================================
// SECTION: Schema Inference
// ============================================================================

/// Summary statistics for a single workbook column, used to infer its role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStat {
    /// Column identifier.
    pub column: ColumnId,
    /// Header text observed for the column, if a header row was detected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_text: Option<String>,
    /// Count of non-empty cells sampled in the column.
    pub non_empty_count: u32,
    /// Fraction of sampled cells that parsed as numeric, in `[0, 1]`.
    pub numeric_ratio: f64,
    /// Small sample of raw cell values used for role inference.
    pub sample_values: Vec<String>,
}

/// Result of inferring the header row and column-to-field mapping for a sheet.
///
/// # Invariants
/// - `column_roles` contains at most one mapping per [`FieldId`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaInference {
    /// Sheet the inference was performed against.
    pub sheet: SheetName,
    /// Zero-based row index of the detected header, when one was found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_row_index: Option<u32>,
    /// Column-to-canonical-field assignments.
    pub column_roles: Vec<(ColumnId, FieldId)>,
    /// Column statistics collected during inference.
    pub column_stats: Vec<ColumnStat>,
    /// Detected language of the header/content.
    pub detected_language: DetectedLanguage,
}

impl SchemaInference {
    /// Returns the column assigned to a canonical field, if any.
    #[must_use]
    pub fn column_for(&self, field: &FieldId) -> Option<&ColumnId> {
        self.column_roles
            .iter()
            .find(|(_, assigned)| assigned == field)
            .map(|(column, _)| column)
    }
}

// ============================================================================
// SECTION: Issues
// ============================================================================

/// Severity of a parsing or validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    /// Informational note; does not block progress.
    Info,
    /// Non-blocking warning surfaced for human review.
    Warning,
    /// Error that invalidates a single line or field.
    Error,
    /// Blocking error that halts automatic processing of the case.
    Blocking,
}

/// A single parsing, validation, or resolution issue tied to evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Issue severity.
    pub severity: IssueSeverity,
    /// Stable machine-readable issue code (e.g. `gtin_checksum_failed`).
    pub code: String,
    /// Human-readable message for operators and reviewers.
    pub message: String,
    /// Evidence cell the issue was raised against, when applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell: Option<EvidenceCell>,
}

// ============================================================================
// SECTION: Line Items and Totals
// ============================================================================

/// A single normalized order line item.
///
/// # Invariants
/// - `line_total` is expected to equal `quantity * unit_price` within the
///   configured arithmetic tolerance; violations are raised as [`Issue`]s
///   rather than enforced here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Zero-based row index within the source sheet.
    pub row: u32,
    /// Stock keeping unit as read from the workbook, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    /// GTIN/EAN/UPC code as read from the workbook, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gtin: Option<String>,
    /// Free-text item description.
    pub description: String,
    /// Ordered quantity.
    pub quantity: BigDecimal,
    /// Unit price in the order's currency.
    pub unit_price: BigDecimal,
    /// Extended line total as stated on the order.
    pub line_total: BigDecimal,
    /// Evidence cells for each populated field, keyed by canonical field id.
    pub evidence: Vec<(FieldId, EvidenceCell)>,
    /// Resolved catalog item reference, once resolution succeeds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_item: Option<crate::core::identifiers::ItemRef>,
}

impl LineItem {
    /// Returns the evidence cell recorded for a canonical field, if any.
    #[must_use]
    pub fn evidence_for(&self, field: &FieldId) -> Option<&EvidenceCell> {
        self.evidence
            .iter()
            .find(|(assigned, _)| assigned == field)
            .map(|(_, cell)| cell)
    }
}

/// Order-level totals as stated on the workbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    /// Sum of line totals before tax.
    pub subtotal: BigDecimal,
    /// Tax amount, when a tax column or total was present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax: Option<BigDecimal>,
    /// Grand total as stated on the order.
    pub total: BigDecimal,
}

// ============================================================================
// SECTION: Canonical Order
// ============================================================================

/// Normalized purchase order contents, independent of source layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalOrder {
    /// Customer name as stated on the order (pre-resolution).
    pub customer_name_raw: String,
    /// Resolved customer reference in the external catalog, once resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_customer: Option<crate::core::identifiers::CustomerRef>,
    /// ISO 4217 currency code, when determinable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Order date as stated on the workbook, in `YYYY-MM-DD` form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_date: Option<String>,
    /// Normalized line items.
    pub line_items: Vec<LineItem>,
    /// Order-level totals.
    pub totals: Totals,
    /// Schema inference results per parsed sheet.
    pub schema: Vec<SchemaInference>,
}
