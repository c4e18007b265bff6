// caseflow-committee/src/pack.rs
// ============================================================================
// Module: Evidence Pack
// Description: Bounded, PII-minimized input handed to committee providers.
// Purpose: Guarantee providers never see more than sample values and derived
//          statistics for a sheet under review.
// Dependencies: caseflow-core
// ============================================================================

//! ## Overview
//! An [`EvidencePack`] is built once per committee invocation from a parsed
//! sheet's [`caseflow_core::SchemaInference`]. It never carries full workbook
//! rows, customer records, or catalog data — only up to five sample values
//! per candidate column plus derived statistics, matching the "evidence
//! bounding" rule providers are held to.

use std::collections::BTreeMap;

use caseflow_core::CaseId;
use caseflow_core::ColumnId;
use caseflow_core::ColumnStat;
use caseflow_core::DetectedLanguage;
use caseflow_core::FieldId;
use caseflow_core::SchemaInference;
use caseflow_core::Timestamp;
use serde::Deserialize;
use serde::Serialize;

/// Maximum number of sample values exposed per column.
pub const MAX_SAMPLES_PER_COLUMN: usize = 5;

/// A candidate header exposed to the committee: the column it names and the
/// canonical fields it could plausibly map to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateHeader {
    /// Column identifier.
    pub column_id: ColumnId,
    /// Header text observed for the column, when one was detected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_text: Option<String>,
    /// Canonical fields this column is a plausible mapping target for.
    pub candidate_fields: Vec<FieldId>,
}

/// Bounded evidence handed to every committee provider for one invocation.
///
/// # Invariants
/// - `sample_values` never holds more than [`MAX_SAMPLES_PER_COLUMN`] entries
///   per column.
/// - No field carries full workbook content, customer records, or catalog
///   data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidencePack {
    /// Case the pack was built for.
    pub case_id: CaseId,
    /// Header columns under consideration.
    pub candidate_headers: Vec<CandidateHeader>,
    /// Up to [`MAX_SAMPLES_PER_COLUMN`] sample values per column.
    pub sample_values: BTreeMap<ColumnId, Vec<String>>,
    /// Column statistics carried over from schema inference.
    pub column_stats: Vec<ColumnStat>,
    /// Detected language of the sheet.
    pub detected_language: DetectedLanguage,
    /// Free-text constraints providers must honor (e.g. "only choose among
    /// the listed column ids").
    pub constraints: Vec<String>,
    /// Time the pack was assembled.
    pub timestamp: Timestamp,
}

impl EvidencePack {
    /// Returns true when `column` appears among this pack's candidate
    /// headers, used to enforce invariant I3 on provider responses.
    #[must_use]
    pub fn contains_column(&self, column: &ColumnId) -> bool {
        self.candidate_headers
            .iter()
            .any(|candidate| &candidate.column_id == column)
    }
}

/// Builds an [`EvidencePack`] from one sheet's schema inference, bounding
/// sample values to [`MAX_SAMPLES_PER_COLUMN`] and dropping any column not
/// already among the inference's per-field candidates.
#[must_use]
pub fn build_evidence_pack(
    case_id: &CaseId,
    inference: &SchemaInference,
    candidate_fields_by_column: &BTreeMap<ColumnId, Vec<FieldId>>,
    timestamp: Timestamp,
) -> EvidencePack {
    let mut sample_values = BTreeMap::new();
    let mut candidate_headers = Vec::new();

    for stat in &inference.column_stats {
        let fields = candidate_fields_by_column
            .get(&stat.column)
            .cloned()
            .unwrap_or_default();
        if fields.is_empty() {
            continue;
        }
        let samples: Vec<String> = stat
            .sample_values
            .iter()
            .take(MAX_SAMPLES_PER_COLUMN)
            .cloned()
            .collect();
        sample_values.insert(stat.column.clone(), samples);
        candidate_headers.push(CandidateHeader {
            column_id: stat.column.clone(),
            header_text: stat.header_text.clone(),
            candidate_fields: fields,
        });
    }

    EvidencePack {
        case_id: case_id.clone(),
        candidate_headers,
        sample_values,
        column_stats: inference.column_stats.clone(),
        detected_language: inference.detected_language,
        constraints: vec![
            "selectedColumnId must be one of candidate_headers[].column_id, or null".to_string(),
        ],
        timestamp,
    }
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        reason = "Test-only assertions are permitted to unwrap."
    )]

    use super::*;

    fn stat(column: &str, samples: &[&str]) -> ColumnStat {
        ColumnStat {
            column: ColumnId::new(column),
            header_text: Some(column.to_string()),
            non_empty_count: samples.len() as u32,
            numeric_ratio: 0.0,
            sample_values: samples.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    #[test]
    fn bounds_samples_and_drops_uncandidated_columns() {
        let inference = SchemaInference {
            sheet: caseflow_core::SheetName::new("Sheet1"),
            header_row_index: Some(0),
            column_roles: vec![],
            column_stats: vec![
                stat("A", &["1", "2", "3", "4", "5", "6", "7"]),
                stat("B", &["x"]),
            ],
            detected_language: DetectedLanguage::English,
        };
        let mut candidates = BTreeMap::new();
        candidates.insert(ColumnId::new("A"), vec![FieldId::new("quantity")]);

        let pack = build_evidence_pack(
            &CaseId::new("case-1"),
            &inference,
            &candidates,
            Timestamp::UnixMillis(0),
        );

        assert_eq!(pack.candidate_headers.len(), 1);
        assert_eq!(
            pack.sample_values.get(&ColumnId::new("A")).unwrap().len(),
            MAX_SAMPLES_PER_COLUMN
        );
        assert!(!pack.contains_column(&ColumnId::new("B")));
    }
}
