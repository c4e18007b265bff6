// caseflow-parser/src/schema.rs
// ============================================================================
// Module: Header Detection and Column Mapping
// Description: Detects the header row and scores candidate columns for each
//              canonical field.
// Purpose: Produce a SchemaInference the rest of the pipeline can consult
//          without re-scanning the sheet.
// Dependencies: caseflow-core
// ============================================================================

//! ## Overview
//! Header detection scans from the top of a sheet for the first row where at
//! least three cells look like header labels. Column mapping then scores
//! every column against every canonical field using dictionary synonym
//! matches, sample-value pattern matches, and type-distribution purity, and
//! keeps the top three candidates per field for audit.

use bigdecimal::BigDecimal;
use caseflow_core::ColumnId;
use caseflow_core::ColumnStat;
use caseflow_core::FieldId;
use caseflow_core::SchemaInference;
use caseflow_core::SheetName;

use crate::dictionary::FIELD_SYNONYMS;
use crate::dictionary::dictionary_score;
use crate::language::detect_language;
use crate::numbers::VALID_GTIN_LENGTHS;
use crate::numbers::parse_numeric_cell;
use crate::numbers::strip_gtin;
use crate::workbook::SheetGrid;

/// Minimum number of header-like cells required to call a row a header.
const MIN_HEADER_LIKE_CELLS: usize = 3;
/// Number of rows below the header sampled when scoring columns.
const SAMPLE_ROW_COUNT: usize = 50;
/// Number of top candidates recorded per field for audit.
const TOP_CANDIDATES: usize = 3;
/// Column-mapping confidence below which committee review is triggered.
pub const COLUMN_MAPPING_CONFIDENCE_THRESHOLD: f64 = 0.80;

/// Returns true if a cell's text looks like a plausible header label: a
/// short string, not purely numeric, not empty.
fn looks_like_header_label(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.chars().count() > 40 {
        return false;
    }
    parse_numeric_cell(trimmed).is_none()
}

/// Detects the header row index for a sheet, scanning from the top for the
/// first row with at least [`MIN_HEADER_LIKE_CELLS`] header-like cells.
#[must_use]
pub fn detect_header_row(grid: &SheetGrid) -> Option<u32> {
    for (index, row) in grid.rows.iter().enumerate() {
        let header_like_count = row.iter().filter(|cell| looks_like_header_label(cell)).count();
        if header_like_count >= MIN_HEADER_LIKE_CELLS {
            return Some(u32::try_from(index).unwrap_or(u32::MAX));
        }
    }
    None
}

/// Per-field scoring for a single candidate column.
struct FieldCandidate {
    column: usize,
    score: f64,
}

/// Builds column statistics for every column in the sheet, sampling up to
/// [`SAMPLE_ROW_COUNT`] rows below the header.
fn collect_column_stats(grid: &SheetGrid, header_row: Option<u32>) -> Vec<ColumnStat> {
    let width = grid.rows.iter().map(Vec::len).max().unwrap_or(0);
    let body_start = header_row.map_or(0, |row| row as usize + 1);
    let body_end = (body_start + SAMPLE_ROW_COUNT).min(grid.rows.len());

    (0..width)
        .map(|column| {
            let header_text = header_row
                .and_then(|row| grid.rows.get(row as usize))
                .and_then(|row| row.get(column))
                .filter(|text| !text.trim().is_empty())
                .cloned();
            let samples: Vec<String> = grid.rows[body_start..body_end]
                .iter()
                .filter_map(|row| row.get(column))
                .filter(|text| !text.trim().is_empty())
                .cloned()
                .collect();
            let numeric_count = samples.iter().filter(|text| parse_numeric_cell(text).is_some()).count();
            #[allow(
                clippy::cast_precision_loss,
                reason = "sample sizes are small cell counts, far under f64 precision limits"
            )]
            let numeric_ratio = if samples.is_empty() {
                0.0
            } else {
                numeric_count as f64 / samples.len() as f64
            };
            ColumnStat {
                column: ColumnId::new(column.to_string()),
                header_text,
                non_empty_count: u32::try_from(samples.len()).unwrap_or(u32::MAX),
                numeric_ratio,
                sample_values: samples.into_iter().take(5).collect(),
            }
        })
        .collect()
}

/// Scores a column against a canonical field using dictionary, pattern, and
/// type-purity signals, per the column-mapping stage.
fn score_column_for_field(stat: &ColumnStat, field: &str) -> f64 {
    let dictionary = stat.header_text.as_deref().map_or(0.0, |header| dictionary_score(header, field));
    let pattern = pattern_score(stat, field);
    let purity = purity_score(stat, field);
    0.5 * dictionary + 0.3 * pattern + 0.2 * purity
}

/// Scores how well a column's sample values match the value pattern expected
/// for a field (GTIN checksums, SKU shape, non-negative quantities, etc).
fn pattern_score(stat: &ColumnStat, field: &str) -> f64 {
    if stat.sample_values.is_empty() {
        return 0.0;
    }
    let matches = stat
        .sample_values
        .iter()
        .filter(|value| match field {
            "gtin" => VALID_GTIN_LENGTHS.contains(&strip_gtin(value).len()),
            "sku" => {
                value.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '-') && value.contains('-')
            }
            "quantity" => parse_numeric_cell(value).is_some_and(|n| n >= BigDecimal::from(0)),
            "unit_price" | "line_total" => parse_numeric_cell(value).is_some(),
            _ => false,
        })
        .count();
    #[allow(
        clippy::cast_precision_loss,
        reason = "sample sizes are small cell counts, far under f64 precision limits"
    )]
    {
        matches as f64 / stat.sample_values.len() as f64
    }
}

/// Scores how well a column's type distribution (numeric vs text) matches
/// what is expected for a field.
fn purity_score(stat: &ColumnStat, field: &str) -> f64 {
    match field {
        "quantity" | "unit_price" | "line_total" => stat.numeric_ratio,
        "customer_name" | "description" | "sku" | "gtin" | "currency" | "order_date" => {
            1.0 - stat.numeric_ratio
        }
        _ => 0.0,
    }
}

/// Result of the column-mapping stage: the assignment plus, for audit, the
/// top-N scored candidates recorded per field.
pub struct ColumnMapping {
    /// The assignment recorded in [`SchemaInference::column_roles`].
    pub assignments: Vec<(ColumnId, FieldId)>,
    /// Top-N candidate columns per field, for audit and committee handoff.
    pub candidates_by_field: Vec<(String, Vec<(usize, f64)>)>,
    /// True if at least one field's top candidate scored below threshold or
    /// the top two candidates are too close to call deterministically.
    pub ambiguous: bool,
}

/// Maps sheet columns to canonical fields by scoring every column against
/// every field and greedily assigning the highest-scoring unclaimed column.
#[must_use]
pub fn map_columns(column_stats: &[ColumnStat]) -> ColumnMapping {
    let mut assignments = Vec::new();
    let mut candidates_by_field = Vec::new();
    let mut claimed = vec![false; column_stats.len()];
    let mut ambiguous = false;

    for entry in FIELD_SYNONYMS {
        let mut scored: Vec<FieldCandidate> = column_stats
            .iter()
            .enumerate()
            .filter(|(index, _)| !claimed[*index])
            .map(|(index, stat)| FieldCandidate { column: index, score: score_column_for_field(stat, entry.field) })
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));

        let top_candidates: Vec<(usize, f64)> =
            scored.iter().take(TOP_CANDIDATES).map(|candidate| (candidate.column, candidate.score)).collect();
        candidates_by_field.push((entry.field.to_string(), top_candidates));

        if let Some(best) = scored.first() {
            if best.score <= 0.0 {
                continue;
            }
            if best.score < COLUMN_MAPPING_CONFIDENCE_THRESHOLD {
                ambiguous = true;
            }
            if let Some(runner_up) = scored.get(1)
                && runner_up.score > 0.0
                && (best.score - runner_up.score) < 0.05
            {
                ambiguous = true;
            }
            assignments.push((ColumnId::new(best.column.to_string()), FieldId::new(entry.field)));
            claimed[best.column] = true;
        }
    }

    ColumnMapping { assignments, candidates_by_field, ambiguous }
}

/// Runs header detection, language detection, and column mapping for one
/// sheet, producing its [`SchemaInference`].
#[must_use]
pub fn infer_schema(grid: &SheetGrid) -> (SchemaInference, ColumnMapping) {
    let header_row = detect_header_row(grid);
    let column_stats = collect_column_stats(grid, header_row);

    let language_samples: Vec<&str> = header_row
        .and_then(|row| grid.rows.get(row as usize))
        .map(|row| row.iter().map(String::as_str).collect())
        .unwrap_or_default();
    let detected_language = detect_language(language_samples);

    let mapping = map_columns(&column_stats);
    let schema = SchemaInference {
        sheet: SheetName::new(grid.name.clone()),
        header_row_index: header_row,
        column_roles: mapping.assignments.clone(),
        column_stats,
        detected_language,
    };
    (schema, mapping)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: Vec<Vec<&str>>) -> SheetGrid {
        SheetGrid {
            name: "Sheet1".to_string(),
            rows: rows.into_iter().map(|row| row.into_iter().map(str::to_string).collect()).collect(),
        }
    }

    #[test]
    fn detects_simple_header_row() {
        let grid = grid(vec![
            vec!["Customer", "SKU", "Qty", "Unit Price", "Total"],
            vec!["Acme Co", "AB-12", "3", "10.00", "30.00"],
        ]);
        assert_eq!(detect_header_row(&grid), Some(0));
    }

    #[test]
    fn maps_obvious_columns_with_high_confidence() {
        let grid = grid(vec![
            vec!["Customer", "SKU", "Qty", "Unit Price", "Total"],
            vec!["Acme Co", "AB-12", "3", "10.00", "30.00"],
            vec!["Acme Co", "CD-34", "1", "5.00", "5.00"],
        ]);
        let (schema, mapping) = infer_schema(&grid);
        assert_eq!(schema.header_row_index, Some(0));
        assert!(!mapping.ambiguous);
        assert!(schema.column_for(&FieldId::new("sku")).is_some());
        assert!(schema.column_for(&FieldId::new("quantity")).is_some());
    }
}
