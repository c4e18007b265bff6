// caseflow-parser/src/pipeline.rs
// ============================================================================
// Module: Parse Pipeline
// Description: Orchestrates workbook intake through canonical-order assembly.
// Purpose: Provide the single entry point the workflow engine's parse
//          activity calls, folding every stage over the submitted bytes.
// Dependencies: caseflow-core, calamine (via crate::workbook)
// ============================================================================

//! ## Overview
//! [`parse_workbook`] runs the full pipeline: open and scan for formulas,
//! select a sheet, detect its header and column mapping, extract and
//! validate line items, and assemble a [`CanonicalOrder`] plus a combined
//! confidence score and issue list. Each stage is a free function in a
//! sibling module, so the pipeline itself is a short fold that is easy to
//! read end to end and easy to extend with a new stage.

use std::collections::BTreeMap;

use caseflow_core::CanonicalOrder;
use caseflow_core::ColumnId;
use caseflow_core::FieldId;
use caseflow_core::Issue;
use caseflow_core::IssueSeverity;

use crate::rows::extract_rows;
use crate::schema::COLUMN_MAPPING_CONFIDENCE_THRESHOLD;
use crate::schema::infer_schema;
use crate::workbook::WorkbookError;
use crate::workbook::open_and_scan;
use crate::workbook::score_sheets;
use crate::workbook::sheet_selection_is_ambiguous;

/// Outcome of running the full parse pipeline against one submitted
/// workbook.
pub struct ParseOutcome {
    /// The assembled canonical order. Present even when blocker issues are
    /// raised, so the evidence collected so far is never discarded; callers
    /// must still check [`Self::issues`] for a blocker before accepting it.
    pub order: CanonicalOrder,
    /// Every issue raised across all pipeline stages.
    pub issues: Vec<Issue>,
    /// Overall confidence in `[0, 1]`, combining sheet-selection,
    /// header-detection, and mean column-mapping confidence.
    pub confidence: f64,
    /// True if any deterministic field mapping was ambiguous and the
    /// committee should be invoked before this order is trusted.
    pub requires_committee: bool,
    /// Candidate canonical fields per source column, carried over from the
    /// column-mapping stage so a caller invoking the committee can build an
    /// evidence pack without re-deriving the mapping itself. Empty when the
    /// pipeline halted before column mapping ran.
    pub candidate_fields_by_column: BTreeMap<ColumnId, Vec<FieldId>>,
}

/// Errors that stop the pipeline before a (possibly partial) order can be
/// assembled at all.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The workbook could not be opened or scanned for formulas.
    #[error(transparent)]
    Workbook(#[from] WorkbookError),
}

/// Runs the full parse pipeline against submitted workbook bytes.
///
/// # Errors
///
/// Returns [`ParseError`] if the workbook cannot be opened at all. A
/// formula-bearing or ambiguous-sheet workbook is not an error here: it
/// produces a blocker [`Issue`] in the returned [`ParseOutcome`] so the
/// caller can persist the partial state before suspending the case.
pub fn parse_workbook(bytes: &[u8]) -> Result<ParseOutcome, ParseError> {
    let grids = match open_and_scan(bytes) {
        Ok(grids) => grids,
        Err(err @ WorkbookError::FormulasPresent(_)) => {
            return Ok(blocker_outcome("formulas_blocked", &err.to_string()));
        }
        Err(err) => return Err(ParseError::Workbook(err)),
    };

    let scores = score_sheets(&grids);
    if sheet_selection_is_ambiguous(&scores) {
        return Ok(blocker_outcome(
            "multiple_candidate_sheets",
            "more than one sheet scored within 10% of the top candidate",
        ));
    }

    let Some(top) = scores.first() else {
        return Ok(blocker_outcome("multiple_candidate_sheets", "workbook has no usable sheets"));
    };
    let grid = &grids[top.index];

    let (schema, mapping) = infer_schema(grid);
    let extraction = extract_rows(grid, &schema);

    let mut issues = extraction.issues;
    for (field, candidates) in &mapping.candidates_by_field {
        if candidates.first().is_none_or(|(_, score)| *score < COLUMN_MAPPING_CONFIDENCE_THRESHOLD) {
            issues.push(Issue {
                severity: IssueSeverity::Info,
                code: "column_mapping_low_confidence".to_string(),
                message: format!("no confident column mapping found for field '{field}'"),
                cell: None,
            });
        }
    }

    let customer_name_raw = most_common_value(grid, &schema, "customer_name").unwrap_or_default();
    let order_date = most_common_value(grid, &schema, "order_date");
    let currency = most_common_value(grid, &schema, "currency").or_else(|| {
        most_common_value(grid, &schema, "unit_price")
            .or_else(|| most_common_value(grid, &schema, "line_total"))
            .and_then(|text| crate::numbers::detect_currency(&text))
            .map(str::to_string)
    });

    let order = CanonicalOrder {
        customer_name_raw,
        resolved_customer: None,
        currency,
        order_date,
        line_items: extraction.line_items,
        totals: extraction.totals,
        schema: vec![schema],
    };

    let header_confidence = f64::from(u8::from(order.schema.first().is_some_and(|s| s.header_row_index.is_some())));
    let mean_column_confidence = mean_top_candidate_score(&mapping.candidates_by_field);
    let confidence = 0.3 * top.score + 0.2 * header_confidence + 0.5 * mean_column_confidence;
    let candidate_fields_by_column = invert_candidates_by_field(&mapping.candidates_by_field);

    Ok(ParseOutcome { order, issues, confidence, requires_committee: mapping.ambiguous, candidate_fields_by_column })
}

/// Inverts a field's top candidate columns into a per-column list of
/// candidate fields, keyed the way the committee's evidence pack expects.
fn invert_candidates_by_field(
    candidates_by_field: &[(String, Vec<(usize, f64)>)],
) -> BTreeMap<ColumnId, Vec<FieldId>> {
    let mut by_column: BTreeMap<ColumnId, Vec<FieldId>> = BTreeMap::new();
    for (field, candidates) in candidates_by_field {
        for (column, _score) in candidates {
            by_column.entry(ColumnId::new(column.to_string())).or_default().push(FieldId::new(field.clone()));
        }
    }
    by_column
}

/// Builds a blocker-only outcome for pipeline stages that halt before an
/// order can be assembled at all.
fn blocker_outcome(code: &str, message: &str) -> ParseOutcome {
    ParseOutcome {
        order: CanonicalOrder {
            customer_name_raw: String::new(),
            resolved_customer: None,
            currency: None,
            order_date: None,
            line_items: Vec::new(),
            totals: caseflow_core::Totals {
                subtotal: bigdecimal::BigDecimal::from(0),
                tax: None,
                total: bigdecimal::BigDecimal::from(0),
            },
            schema: Vec::new(),
        },
        issues: vec![Issue {
            severity: IssueSeverity::Blocking,
            code: code.to_string(),
            message: message.to_string(),
            cell: None,
        }],
        confidence: 0.0,
        requires_committee: false,
        candidate_fields_by_column: BTreeMap::new(),
    }
}

/// Returns the most frequently occurring non-empty value in a mapped
/// column, used for order-level fields that should be constant across rows.
fn most_common_value(
    grid: &crate::workbook::SheetGrid,
    schema: &caseflow_core::SchemaInference,
    field: &str,
) -> Option<String> {
    let column: usize = schema.column_for(&FieldId::new(field))?.as_str().parse().ok()?;
    let body_start = schema.header_row_index.map_or(0, |row| row as usize + 1);
    let mut counts: Vec<(String, usize)> = Vec::new();
    for row in &grid.rows[body_start.min(grid.rows.len())..] {
        let Some(value) = row.get(column) else { continue };
        if value.trim().is_empty() {
            continue;
        }
        if let Some(entry) = counts.iter_mut().find(|(existing, _)| existing == value) {
            entry.1 += 1;
        } else {
            counts.push((value.clone(), 1));
        }
    }
    counts.into_iter().max_by_key(|(_, count)| *count).map(|(value, _)| value)
}

/// Averages the top candidate score recorded per field across all fields
/// that had at least one candidate.
fn mean_top_candidate_score(candidates_by_field: &[(String, Vec<(usize, f64)>)]) -> f64 {
    let scores: Vec<f64> =
        candidates_by_field.iter().filter_map(|(_, candidates)| candidates.first().map(|(_, score)| *score)).collect();
    if scores.is_empty() {
        return 0.0;
    }
    #[allow(
        clippy::cast_precision_loss,
        reason = "field counts are small and far under f64 precision limits"
    )]
    {
        scores.iter().sum::<f64>() / scores.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_top_candidate_score_averages_present_fields() {
        let candidates = vec![
            ("sku".to_string(), vec![(0_usize, 0.9)]),
            ("quantity".to_string(), vec![(1_usize, 0.7)]),
            ("gtin".to_string(), Vec::new()),
        ];
        let mean = mean_top_candidate_score(&candidates);
        assert!((mean - 0.8).abs() < 1e-9);
    }
}
