// caseflow-parser/src/workbook.rs
// ============================================================================
// Module: Workbook Intake
// Description: Opens a workbook, scans for formulas, and selects the sheet to
//              parse.
// Dependencies: calamine
// ============================================================================

//! ## Overview
//! Intake is the first pipeline stage: open the submitted bytes with
//! `calamine`, reject any workbook carrying a live formula (formulas hide the
//! value a human would have seen from the audit trail), and choose which
//! sheet holds the order when more than one is present.

use std::io::Cursor;

use calamine::Data;
use calamine::Reader;
use calamine::open_workbook_auto_from_rs;

/// A sheet's contents as a plain grid of display strings, one entry per
/// cell, row-major, with `""` for empty cells.
pub struct SheetGrid {
    /// Sheet name as stored in the workbook.
    pub name: String,
    /// Row-major cell text; every row has the same width as the widest row.
    pub rows: Vec<Vec<String>>,
}

/// Errors raised while opening or scanning a workbook.
#[derive(Debug, thiserror::Error)]
pub enum WorkbookError {
    /// The workbook could not be opened (unsupported format, corrupt file,
    /// or a password-protected file calamine cannot decrypt).
    #[error("workbook could not be opened: {0}")]
    Open(String),
    /// A formula cell was found; Caseflow blocks processing of such files.
    #[error("workbook contains formula cells on sheet '{0}'")]
    FormulasPresent(String),
    /// The workbook contains no sheets at all.
    #[error("workbook contains no sheets")]
    NoSheets,
}

/// Opens a workbook from raw bytes, rejecting it if any sheet contains a
/// formula cell, and returns every sheet as a plain text grid.
///
/// # Errors
///
/// Returns [`WorkbookError::Open`] if the bytes cannot be parsed as a
/// workbook, [`WorkbookError::FormulasPresent`] if any sheet carries a live
/// formula, or [`WorkbookError::NoSheets`] if the workbook has no sheets.
pub fn open_and_scan(bytes: &[u8]) -> Result<Vec<SheetGrid>, WorkbookError> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook =
        open_workbook_auto_from_rs(cursor).map_err(|err| WorkbookError::Open(err.to_string()))?;

    let sheet_names = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err(WorkbookError::NoSheets);
    }

    for name in &sheet_names {
        if let Ok(formulas) = workbook.worksheet_formula(name) {
            let has_formula = formulas.rows().any(|row| row.iter().any(|cell| !cell.is_empty()));
            if has_formula {
                return Err(WorkbookError::FormulasPresent(name.clone()));
            }
        }
    }

    let mut grids = Vec::with_capacity(sheet_names.len());
    for name in &sheet_names {
        let range = workbook
            .worksheet_range(name)
            .map_err(|err| WorkbookError::Open(err.to_string()))?;
        let mut rows = Vec::with_capacity(range.rows().count());
        for row in range.rows() {
            rows.push(row.iter().map(cell_to_text).collect());
        }
        grids.push(SheetGrid { name: name.clone(), rows });
    }
    Ok(grids)
}

/// Renders a calamine cell value as display text for downstream parsing.
fn cell_to_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.clone(),
        Data::Float(value) => value.to_string(),
        Data::Int(value) => value.to_string(),
        Data::Bool(value) => value.to_string(),
        Data::DateTime(value) => value.to_string(),
        Data::DateTimeIso(value) | Data::DurationIso(value) => value.clone(),
        Data::Error(error) => format!("#ERROR:{error}"),
    }
}

/// A sheet candidate's selection score and the statistics it was derived
/// from, kept for audit/diagnostic purposes.
#[derive(Debug, Clone)]
pub struct SheetScore {
    /// Index into the scanned sheet list.
    pub index: usize,
    /// Combined selection score in `[0, 1]`.
    pub score: f64,
}

/// Scores every scanned sheet by presence of numeric columns, presence of
/// product-identifier-like columns, and row count, returning scores sorted
/// highest first.
#[must_use]
pub fn score_sheets(grids: &[SheetGrid]) -> Vec<SheetScore> {
    let max_rows = grids.iter().map(|grid| grid.rows.len()).max().unwrap_or(1).max(1);
    let mut scores: Vec<SheetScore> = grids
        .iter()
        .enumerate()
        .map(|(index, grid)| {
            let numeric_columns = count_numeric_like_columns(grid);
            let identifier_columns = count_identifier_like_columns(grid);
            #[allow(
                clippy::cast_precision_loss,
                reason = "row/column counts are small and far under f64 precision limits"
            )]
            let row_score = grid.rows.len() as f64 / max_rows as f64;
            #[allow(
                clippy::cast_precision_loss,
                reason = "column counts are small and far under f64 precision limits"
            )]
            let numeric_score = f64::from(u32::try_from(numeric_columns).unwrap_or(u32::MAX).min(5)) / 5.0;
            #[allow(
                clippy::cast_precision_loss,
                reason = "column counts are small and far under f64 precision limits"
            )]
            let identifier_score =
                f64::from(u32::try_from(identifier_columns).unwrap_or(u32::MAX).min(3)) / 3.0;
            let score = 0.4 * numeric_score + 0.4 * identifier_score + 0.2 * row_score;
            SheetScore { index, score }
        })
        .collect();
    scores.sort_by(|a, b| b.score.total_cmp(&a.score));
    scores
}

/// Returns true if the top two sheet scores are within 10% of each other,
/// meaning sheet selection is ambiguous and requires human input.
#[must_use]
pub fn sheet_selection_is_ambiguous(scores: &[SheetScore]) -> bool {
    let (Some(top), Some(runner_up)) = (scores.first(), scores.get(1)) else {
        return false;
    };
    if top.score <= 0.0 {
        return false;
    }
    (top.score - runner_up.score) / top.score < 0.10
}

/// Counts columns where a majority of sampled cells parse as numeric.
fn count_numeric_like_columns(grid: &SheetGrid) -> usize {
    let width = grid.rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut count = 0;
    for column in 0..width {
        let samples: Vec<&str> = grid
            .rows
            .iter()
            .filter_map(|row| row.get(column))
            .map(String::as_str)
            .filter(|text| !text.trim().is_empty())
            .take(20)
            .collect();
        if samples.is_empty() {
            continue;
        }
        let numeric = samples
            .iter()
            .filter(|text| crate::numbers::parse_numeric_cell(text).is_some())
            .count();
        #[allow(
            clippy::cast_precision_loss,
            reason = "sample sizes are small cell counts, far under f64 precision limits"
        )]
        let ratio = numeric as f64 / samples.len() as f64;
        if ratio > 0.6 {
            count += 1;
        }
    }
    count
}

/// Counts columns whose sampled values look like SKUs or GTINs.
fn count_identifier_like_columns(grid: &SheetGrid) -> usize {
    let width = grid.rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut count = 0;
    for column in 0..width {
        let samples: Vec<&str> = grid
            .rows
            .iter()
            .filter_map(|row| row.get(column))
            .map(String::as_str)
            .filter(|text| !text.trim().is_empty())
            .take(20)
            .collect();
        if samples.is_empty() {
            continue;
        }
        let identifier_like = samples
            .iter()
            .filter(|text| {
                let digits = crate::numbers::strip_gtin(text);
                crate::numbers::VALID_GTIN_LENGTHS.contains(&digits.len())
                    || (text.contains('-') && text.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '-'))
            })
            .count();
        #[allow(
            clippy::cast_precision_loss,
            reason = "sample sizes are small cell counts, far under f64 precision limits"
        )]
        let ratio = identifier_like as f64 / samples.len() as f64;
        if ratio > 0.5 {
            count += 1;
        }
    }
    count
}
