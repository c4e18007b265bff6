// caseflow-parser/src/rows.rs
// ============================================================================
// Module: Row Extraction and Arithmetic Validation
// Description: Extracts line items from a sheet body and validates their
//              arithmetic against stated totals.
// Purpose: Turn a mapped sheet into normalized LineItem records plus the
//          issues raised while doing so.
// Dependencies: bigdecimal, caseflow-core
// ============================================================================

//! ## Overview
//! Row extraction walks every row below the header, skips empty rows, flags
//! total rows without emitting them as line items, and normalizes each
//! populated cell through the GTIN/SKU/number rules in [`crate::numbers`].
//! Arithmetic validation then checks each line's stated total against its
//! computed `quantity * unit_price`, and the sheet's stated totals against
//! the sum of its lines.

use bigdecimal::BigDecimal;
use bigdecimal::Zero;

use caseflow_core::EvidenceCell;
use caseflow_core::FieldId;
use caseflow_core::Issue;
use caseflow_core::IssueSeverity;
use caseflow_core::LineItem;
use caseflow_core::SchemaInference;
use caseflow_core::SheetName;
use caseflow_core::Totals;

use crate::dictionary::is_total_row_keyword;
use crate::dictionary::normalize_for_match;
use crate::numbers::gtin_check_digit_valid;
use crate::numbers::normalize_sku;
use crate::numbers::parse_numeric_cell;
use crate::numbers::strip_gtin;
use crate::workbook::SheetGrid;

/// Result of extracting and validating a sheet's body rows.
pub struct ExtractionResult {
    /// Normalized line items, excluding total rows.
    pub line_items: Vec<LineItem>,
    /// Stated order-level totals, derived from a totals row when present,
    /// otherwise computed from the extracted line items.
    pub totals: Totals,
    /// Issues raised during extraction and arithmetic validation.
    pub issues: Vec<Issue>,
}

/// Reads a field's raw text for a row, given the schema's column mapping.
fn read_field<'a>(grid: &'a SheetGrid, schema: &SchemaInference, row: usize, field: &str) -> Option<&'a str> {
    let column: usize = schema.column_for(&FieldId::new(field))?.as_str().parse().ok()?;
    grid.rows.get(row)?.get(column).map(String::as_str).filter(|text| !text.trim().is_empty())
}

/// Builds an [`EvidenceCell`] for a field read from a row, if the field has
/// a mapped column and a non-empty value.
fn evidence_for(
    grid: &SheetGrid,
    schema: &SchemaInference,
    row: usize,
    field: &str,
    normalized: Option<String>,
) -> Option<EvidenceCell> {
    let column = schema.column_for(&FieldId::new(field))?;
    let column_index: usize = column.as_str().parse().ok()?;
    let raw_value = grid.rows.get(row)?.get(column_index)?.clone();
    if raw_value.trim().is_empty() {
        return None;
    }
    Some(EvidenceCell {
        sheet: SheetName::new(grid.name.clone()),
        row: u32::try_from(row).unwrap_or(u32::MAX),
        column: column.clone(),
        raw_value,
        normalized_value: normalized,
    })
}

/// Returns true if every cell in the row is empty.
fn row_is_empty(row: &[String]) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}

/// Returns true if the row looks like a total/subtotal row: a total keyword
/// appears anywhere, or the required identifier columns are empty while a
/// total-like column has a value.
fn row_is_total(grid: &SheetGrid, schema: &SchemaInference, row: usize) -> bool {
    let Some(cells) = grid.rows.get(row) else { return false };
    if cells.iter().any(|cell| is_total_row_keyword(cell)) {
        return true;
    }
    let has_description = read_field(grid, schema, row, "description").is_some()
        || read_field(grid, schema, row, "sku").is_some();
    let has_total_value = read_field(grid, schema, row, "line_total").is_some();
    !has_description && has_total_value
}

/// Which of the sheet's stated totals a detected total row states.
enum StatedTotalKind {
    /// Sum of line items before tax.
    Subtotal,
    /// Tax or VAT line.
    Tax,
    /// The final, post-tax total.
    GrandTotal,
}

/// Classifies a total row's kind from whichever cell matched a total-row
/// keyword, defaulting to `GrandTotal` for a bare "total"/"sum" match.
fn stated_total_kind(cells: &[String]) -> Option<StatedTotalKind> {
    for cell in cells {
        let normalized = normalize_for_match(cell);
        if normalized.contains("subtotal") {
            return Some(StatedTotalKind::Subtotal);
        }
        if normalized.contains("tax") || normalized.contains("vat") || cell.trim() == "مالیات" || cell.trim() == "ارزش افزوده" {
            return Some(StatedTotalKind::Tax);
        }
        if is_total_row_keyword(cell) {
            return Some(StatedTotalKind::GrandTotal);
        }
    }
    None
}

/// The sheet's own stated totals, accumulated from total rows as they are
/// encountered during extraction; distinct from the totals computed by
/// summing line items.
#[derive(Default)]
struct StatedTotals {
    /// Stated subtotal, if a subtotal row was found.
    subtotal: Option<BigDecimal>,
    /// Stated tax/VAT, if a tax row was found.
    tax: Option<BigDecimal>,
    /// Stated grand total, if a total row was found.
    grand_total: Option<BigDecimal>,
}

/// Reads a total row's stated value and folds it into `stated`, keeping the
/// first value seen for each kind.
fn record_stated_total(grid: &SheetGrid, schema: &SchemaInference, row: usize, stated: &mut StatedTotals) {
    let Some(cells) = grid.rows.get(row) else { return };
    let Some(value_raw) = read_field(grid, schema, row, "line_total") else { return };
    let Some(value) = parse_numeric_cell(value_raw) else { return };
    match stated_total_kind(cells) {
        Some(StatedTotalKind::Subtotal) => {
            stated.subtotal.get_or_insert(value);
        }
        Some(StatedTotalKind::Tax) => {
            stated.tax.get_or_insert(value);
        }
        Some(StatedTotalKind::GrandTotal) | None => {
            stated.grand_total.get_or_insert(value);
        }
    }
}

/// Textual identifier fields eligible for merged-cell master-value
/// carry-forward: the templates Caseflow sees commonly merge a product's
/// SKU/GTIN/description cell across the rows of a grouped line item.
const CARRY_FORWARD_FIELDS: &[&str] = &["sku", "gtin", "description"];

/// Fills empty cells in carry-forward-eligible columns with the nearest
/// non-empty value above, per the merged-cell master-value rule, and
/// records `merged_cell_value`/`multi_row_merge` issues for each fill.
fn fill_merged_cells(
    grid: &SheetGrid,
    schema: &SchemaInference,
    body_start: usize,
    issues: &mut Vec<Issue>,
) -> Vec<Vec<String>> {
    let mut rows = grid.rows.clone();
    for field in CARRY_FORWARD_FIELDS {
        let Some(column) =
            schema.column_for(&FieldId::new(*field)).and_then(|column| column.as_str().parse::<usize>().ok())
        else {
            continue;
        };
        let mut master: Option<(String, usize)> = None;
        let mut span = 0_usize;
        for row in body_start..rows.len() {
            if row_is_empty(&grid.rows[row]) {
                master = None;
                span = 0;
                continue;
            }
            let current = rows[row].get(column).cloned().unwrap_or_default();
            if !current.trim().is_empty() {
                master = Some((current, row));
                span = 0;
                continue;
            }
            let Some((value, master_row)) = master.clone() else { continue };
            if let Some(cell) = rows[row].get_mut(column) {
                *cell = value;
            }
            span += 1;
            let (severity, code) = if span == 1 {
                (IssueSeverity::Info, "merged_cell_value")
            } else {
                (IssueSeverity::Warning, "multi_row_merge")
            };
            issues.push(Issue {
                severity,
                code: code.to_string(),
                message: format!(
                    "row {row} inherits '{field}' from merged master cell at row {master_row}"
                ),
                cell: None,
            });
        }
    }
    rows
}

/// Extracts and validates line items for a single mapped sheet.
#[must_use]
pub fn extract_rows(grid: &SheetGrid, schema: &SchemaInference) -> ExtractionResult {
    let mut issues = Vec::new();
    let mut line_items = Vec::new();
    let body_start = schema.header_row_index.map_or(0, |row| row as usize + 1);

    let filled_rows = fill_merged_cells(grid, schema, body_start, &mut issues);
    let working_grid = SheetGrid { name: grid.name.clone(), rows: filled_rows };

    let mut stated = StatedTotals::default();
    for row in body_start..working_grid.rows.len() {
        let Some(cells) = working_grid.rows.get(row) else { continue };
        if row_is_empty(cells) {
            continue;
        }
        if row_is_total(&working_grid, schema, row) {
            record_stated_total(&working_grid, schema, row, &mut stated);
            continue;
        }
        match extract_line_item(&working_grid, schema, row, &mut issues) {
            Some(item) => line_items.push(item),
            None => continue,
        }
    }

    let totals = compute_totals(&line_items, stated);
    validate_arithmetic(&line_items, &totals, &mut issues);

    ExtractionResult { line_items, totals, issues }
}

/// Extracts a single normalized line item from a row, recording issues for
/// invalid GTINs and negative quantities along the way.
fn extract_line_item(
    grid: &SheetGrid,
    schema: &SchemaInference,
    row: usize,
    issues: &mut Vec<Issue>,
) -> Option<LineItem> {
    let sku_raw = read_field(grid, schema, row, "sku");
    let sku = sku_raw.map(normalize_sku);

    let gtin_raw = read_field(grid, schema, row, "gtin");
    let gtin = gtin_raw.map(strip_gtin);
    if let (Some(gtin_value), Some(raw)) = (&gtin, gtin_raw)
        && !gtin_check_digit_valid(gtin_value)
    {
        issues.push(Issue {
            severity: IssueSeverity::Error,
            code: "gtin_checksum_failed".to_string(),
            message: format!("GTIN '{raw}' failed the GS1 check-digit validation"),
            cell: evidence_for(grid, schema, row, "gtin", gtin.clone()),
        });
    }

    let description =
        read_field(grid, schema, row, "description").map(str::to_string).unwrap_or_default();

    let quantity_raw = read_field(grid, schema, row, "quantity")?;
    let quantity = parse_numeric_cell(quantity_raw)?;
    if quantity < BigDecimal::zero() {
        issues.push(Issue {
            severity: IssueSeverity::Warning,
            code: "negative_quantity".to_string(),
            message: format!("quantity '{quantity_raw}' is negative"),
            cell: evidence_for(grid, schema, row, "quantity", Some(quantity.to_string())),
        });
    }

    let unit_price_raw = read_field(grid, schema, row, "unit_price")?;
    let unit_price = parse_numeric_cell(unit_price_raw)?;

    let line_total_raw = read_field(grid, schema, row, "line_total");
    let line_total = line_total_raw
        .and_then(parse_numeric_cell)
        .unwrap_or_else(|| &quantity * &unit_price);

    let mut evidence = Vec::new();
    if let Some(cell) = evidence_for(grid, schema, row, "sku", sku.clone()) {
        evidence.push((FieldId::new("sku"), cell));
    }
    if let Some(cell) = evidence_for(grid, schema, row, "gtin", gtin.clone()) {
        evidence.push((FieldId::new("gtin"), cell));
    }
    if let Some(cell) = evidence_for(grid, schema, row, "description", None) {
        evidence.push((FieldId::new("description"), cell));
    }
    if let Some(cell) = evidence_for(grid, schema, row, "quantity", Some(quantity.to_string())) {
        evidence.push((FieldId::new("quantity"), cell));
    }
    if let Some(cell) = evidence_for(grid, schema, row, "unit_price", Some(unit_price.to_string())) {
        evidence.push((FieldId::new("unit_price"), cell));
    }
    if let Some(cell) = evidence_for(grid, schema, row, "line_total", Some(line_total.to_string())) {
        evidence.push((FieldId::new("line_total"), cell));
    }

    Some(LineItem {
        row: u32::try_from(row).unwrap_or(u32::MAX),
        sku,
        gtin,
        description,
        quantity,
        unit_price,
        line_total,
        evidence,
        resolved_item: None,
    })
}

/// Builds the order-level totals summary: the sheet's own stated
/// subtotal/tax/grand-total where a total row stated them, falling back to
/// the sum of extracted line items for whichever the sheet left unstated.
fn compute_totals(line_items: &[LineItem], stated: StatedTotals) -> Totals {
    let summed =
        line_items.iter().fold(BigDecimal::zero(), |acc, item| acc + item.line_total.clone());
    let subtotal = stated.subtotal.unwrap_or_else(|| summed.clone());
    let total = stated
        .grand_total
        .unwrap_or_else(|| &subtotal + stated.tax.clone().unwrap_or_else(BigDecimal::zero));
    Totals { subtotal, tax: stated.tax, total }
}

/// Arithmetic tolerance: the greater of an absolute floor and a relative
/// fraction of the larger magnitude being compared. Converts through `f64`
/// for the tolerance comparison only; the compared values themselves stay
/// in [`BigDecimal`] throughout extraction.
fn within_tolerance(expected: &BigDecimal, actual: &BigDecimal) -> bool {
    let diff = (expected - actual).abs();
    let basis = expected.abs().max(actual.abs());
    let diff_f64: f64 = diff.to_string().parse().unwrap_or(f64::MAX);
    let basis_f64: f64 = basis.to_string().parse().unwrap_or(0.0);
    let tolerance = (0.02_f64).max(0.01 * basis_f64);
    diff_f64 <= tolerance
}

/// Checks each line's stated total against quantity times unit price, and
/// the sheet's stated subtotal against the sum of its lines.
fn validate_arithmetic(line_items: &[LineItem], totals: &Totals, issues: &mut Vec<Issue>) {
    for item in line_items {
        let expected = &item.quantity * &item.unit_price;
        if !within_tolerance(&expected, &item.line_total) {
            issues.push(Issue {
                severity: IssueSeverity::Warning,
                code: "arithmetic_mismatch".to_string(),
                message: format!(
                    "line total {} does not match quantity * unit price ({})",
                    item.line_total, expected
                ),
                cell: item.evidence_for(&FieldId::new("line_total")).cloned(),
            });
        }
    }
    let summed: BigDecimal =
        line_items.iter().fold(BigDecimal::zero(), |acc, item| acc + item.line_total.clone());
    if !within_tolerance(&summed, &totals.subtotal) {
        issues.push(Issue {
            severity: IssueSeverity::Warning,
            code: "arithmetic_mismatch".to_string(),
            message: format!(
                "stated subtotal {} does not match sum of line totals ({})",
                totals.subtotal, summed
            ),
            cell: None,
        });
    }

    let tax = totals.tax.clone().unwrap_or_else(BigDecimal::zero);
    let expected_total = &totals.subtotal + &tax;
    if !within_tolerance(&expected_total, &totals.total) {
        issues.push(Issue {
            severity: IssueSeverity::Warning,
            code: "arithmetic_mismatch".to_string(),
            message: format!(
                "stated grand total {} does not match subtotal plus tax ({})",
                totals.total, expected_total
            ),
            cell: None,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::infer_schema;

    fn grid(rows: Vec<Vec<&str>>) -> SheetGrid {
        SheetGrid {
            name: "Sheet1".to_string(),
            rows: rows.into_iter().map(|row| row.into_iter().map(str::to_string).collect()).collect(),
        }
    }

    #[test]
    fn extracts_line_items_and_skips_total_row() {
        let grid = grid(vec![
            vec!["Customer", "SKU", "Qty", "Unit Price", "Total"],
            vec!["Acme Co", "AB-12", "3", "10.00", "30.00"],
            vec!["Acme Co", "CD-34", "1", "5.00", "5.00"],
            vec!["", "", "", "Grand Total", "35.00"],
        ]);
        let (schema, _) = infer_schema(&grid);
        let result = extract_rows(&grid, &schema);
        assert_eq!(result.line_items.len(), 2);
        assert_eq!(result.totals.subtotal, BigDecimal::from(35));
        assert_eq!(result.totals.total, BigDecimal::from(35));
    }

    #[test]
    fn flags_stated_subtotal_mismatch_against_summed_lines() {
        let grid = grid(vec![
            vec!["Customer", "SKU", "Qty", "Unit Price", "Total"],
            vec!["Acme Co", "AB-12", "3", "10.00", "30.00"],
            vec!["Acme Co", "CD-34", "1", "5.00", "5.00"],
            vec!["", "", "", "Subtotal", "999.00"],
        ]);
        let (schema, _) = infer_schema(&grid);
        let result = extract_rows(&grid, &schema);
        assert_eq!(result.totals.subtotal, BigDecimal::from(999));
        assert!(result.issues.iter().any(|issue| {
            issue.code == "arithmetic_mismatch" && issue.message.contains("stated subtotal")
        }));
    }

    #[test]
    fn captures_stated_subtotal_tax_and_grand_total_separately() {
        let grid = grid(vec![
            vec!["Customer", "SKU", "Qty", "Unit Price", "Total"],
            vec!["Acme Co", "AB-12", "2", "10.00", "20.00"],
            vec!["", "", "", "Subtotal", "20.00"],
            vec!["", "", "", "Tax", "2.00"],
            vec!["", "", "", "Grand Total", "22.00"],
        ]);
        let (schema, _) = infer_schema(&grid);
        let result = extract_rows(&grid, &schema);
        assert_eq!(result.totals.subtotal, BigDecimal::from(20));
        assert_eq!(result.totals.tax, Some(BigDecimal::from(2)));
        assert_eq!(result.totals.total, BigDecimal::from(22));
        assert!(!result.issues.iter().any(|issue| issue.code == "arithmetic_mismatch"));
    }

    #[test]
    fn flags_grand_total_not_matching_subtotal_plus_tax() {
        let grid = grid(vec![
            vec!["Customer", "SKU", "Qty", "Unit Price", "Total"],
            vec!["Acme Co", "AB-12", "2", "10.00", "20.00"],
            vec!["", "", "", "Subtotal", "20.00"],
            vec!["", "", "", "Tax", "2.00"],
            vec!["", "", "", "Grand Total", "999.00"],
        ]);
        let (schema, _) = infer_schema(&grid);
        let result = extract_rows(&grid, &schema);
        assert!(result.issues.iter().any(|issue| {
            issue.code == "arithmetic_mismatch" && issue.message.contains("stated grand total")
        }));
    }

    #[test]
    fn flags_negative_quantity() {
        let grid = grid(vec![
            vec!["Customer", "SKU", "Qty", "Unit Price", "Total"],
            vec!["Acme Co", "AB-12", "-1", "10.00", "-10.00"],
        ]);
        let (schema, _) = infer_schema(&grid);
        let result = extract_rows(&grid, &schema);
        assert!(result.issues.iter().any(|issue| issue.code == "negative_quantity"));
    }

    #[test]
    fn carries_forward_merged_description_cell() {
        let grid = grid(vec![
            vec!["Customer", "SKU", "Description", "Qty", "Unit Price", "Total"],
            vec!["Acme Co", "AB-12", "Widget, size S", "1", "10.00", "10.00"],
            vec!["Acme Co", "AB-12", "", "2", "10.00", "20.00"],
        ]);
        let (schema, _) = infer_schema(&grid);
        let result = extract_rows(&grid, &schema);
        assert_eq!(result.line_items.len(), 2);
        assert_eq!(result.line_items[1].description, "Widget, size S");
        assert!(result.issues.iter().any(|issue| issue.code == "merged_cell_value"));
    }

    #[test]
    fn flags_arithmetic_mismatch() {
        let grid = grid(vec![
            vec!["Customer", "SKU", "Qty", "Unit Price", "Total"],
            vec!["Acme Co", "AB-12", "3", "10.00", "999.00"],
        ]);
        let (schema, _) = infer_schema(&grid);
        let result = extract_rows(&grid, &schema);
        assert!(result.issues.iter().any(|issue| issue.code == "arithmetic_mismatch"));
    }
}
