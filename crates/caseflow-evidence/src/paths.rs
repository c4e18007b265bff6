// caseflow-evidence/src/paths.rs
// ============================================================================
// Module: Evidence Paths
// Description: Storage layout path builders for the write-once evidence store.
// Purpose: Centralize the content-addressed directory layout so every
//          backend agrees on where artifacts live, and reject path segments
//          that could escape the evidence root.
// Dependencies: (none)
// ============================================================================

//! ## Overview
//! The evidence store uses a fixed, append-only layout keyed by case id and
//! task id:
//!
//! ```text
//! orders-incoming/{case_id}/original.{ext}
//! cases/{case_id}/canonical-order.json
//! committee-outputs/{task_id}/evidence-pack.json
//! committee-outputs/{task_id}/raw-outputs.json
//! zoho-writes/{case_id}/{attempt}/request.json
//! zoho-writes/{case_id}/{attempt}/response.json
//! audit/{case_id}/events.ndjson
//! ```
//!
//! Every identifier segment is validated before it is interpolated into a
//! path, since these identifiers may ultimately derive from submitter input.

use std::fmt;

/// Errors produced when building an evidence path from untrusted segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvidencePathError {
    /// A path segment was empty.
    Empty,
    /// A path segment contained a path separator, `..`, or a null byte.
    InvalidSegment(String),
}

impl fmt::Display for EvidencePathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "evidence path segment is empty"),
            Self::InvalidSegment(segment) => {
                write!(f, "evidence path segment is invalid: {segment}")
            }
        }
    }
}

impl std::error::Error for EvidencePathError {}

/// Validates a single path segment, rejecting anything that could traverse
/// outside the evidence root or collide with reserved names.
///
/// # Errors
///
/// Returns [`EvidencePathError`] if the segment is empty or unsafe.
pub fn validate_segment(segment: &str) -> Result<(), EvidencePathError> {
    if segment.is_empty() {
        return Err(EvidencePathError::Empty);
    }
    let is_unsafe = segment == "."
        || segment == ".."
        || segment.contains('/')
        || segment.contains('\\')
        || segment.contains('\0');
    if is_unsafe {
        return Err(EvidencePathError::InvalidSegment(segment.to_string()));
    }
    Ok(())
}

/// Builds the relative path for an uploaded workbook's original bytes.
///
/// # Errors
///
/// Returns [`EvidencePathError`] if `case_id` or `extension` is unsafe.
pub fn original_workbook_path(case_id: &str, extension: &str) -> Result<String, EvidencePathError> {
    validate_segment(case_id)?;
    validate_segment(extension)?;
    Ok(format!("orders-incoming/{case_id}/original.{extension}"))
}

/// Builds the relative path for a case's canonical order document.
///
/// # Errors
///
/// Returns [`EvidencePathError`] if `case_id` is unsafe.
pub fn canonical_order_path(case_id: &str) -> Result<String, EvidencePathError> {
    validate_segment(case_id)?;
    Ok(format!("cases/{case_id}/canonical-order.json"))
}

/// Builds the relative path for a committee task's evidence pack.
///
/// # Errors
///
/// Returns [`EvidencePathError`] if `task_id` is unsafe.
pub fn committee_evidence_pack_path(task_id: &str) -> Result<String, EvidencePathError> {
    validate_segment(task_id)?;
    Ok(format!("committee-outputs/{task_id}/evidence-pack.json"))
}

/// Builds the relative path for a committee task's raw provider outputs.
///
/// # Errors
///
/// Returns [`EvidencePathError`] if `task_id` is unsafe.
pub fn committee_raw_outputs_path(task_id: &str) -> Result<String, EvidencePathError> {
    validate_segment(task_id)?;
    Ok(format!("committee-outputs/{task_id}/raw-outputs.json"))
}

/// Builds the relative path for a draft-order write attempt's request body.
///
/// # Errors
///
/// Returns [`EvidencePathError`] if `case_id` is unsafe.
pub fn writer_request_path(case_id: &str, attempt: u32) -> Result<String, EvidencePathError> {
    validate_segment(case_id)?;
    Ok(format!("zoho-writes/{case_id}/{attempt}/request.json"))
}

/// Builds the relative path for a draft-order write attempt's response body.
///
/// # Errors
///
/// Returns [`EvidencePathError`] if `case_id` is unsafe.
pub fn writer_response_path(case_id: &str, attempt: u32) -> Result<String, EvidencePathError> {
    validate_segment(case_id)?;
    Ok(format!("zoho-writes/{case_id}/{attempt}/response.json"))
}

/// Builds the relative path for a case's append-only audit trail.
///
/// # Errors
///
/// Returns [`EvidencePathError`] if `case_id` is unsafe.
pub fn audit_trail_path(case_id: &str) -> Result<String, EvidencePathError> {
    validate_segment(case_id)?;
    Ok(format!("audit/{case_id}/events.ndjson"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_traversal_segments() {
        assert_eq!(validate_segment(".."), Err(EvidencePathError::InvalidSegment("..".into())));
        assert_eq!(
            validate_segment("a/b"),
            Err(EvidencePathError::InvalidSegment("a/b".into()))
        );
        assert_eq!(validate_segment(""), Err(EvidencePathError::Empty));
    }

    #[test]
    fn builds_expected_layout() {
        assert_eq!(
            original_workbook_path("case-1", "xlsx").expect("valid path"),
            "orders-incoming/case-1/original.xlsx"
        );
        assert_eq!(
            canonical_order_path("case-1").expect("valid path"),
            "cases/case-1/canonical-order.json"
        );
        assert_eq!(
            committee_evidence_pack_path("task-1").expect("valid path"),
            "committee-outputs/task-1/evidence-pack.json"
        );
        assert_eq!(
            writer_request_path("case-1", 2).expect("valid path"),
            "zoho-writes/case-1/2/request.json"
        );
        assert_eq!(audit_trail_path("case-1").expect("valid path"), "audit/case-1/events.ndjson");
    }
}
