// caseflow-evidence/src/audit.rs
// ============================================================================
// Module: Audit Trail
// Description: Append-only ndjson audit trail writer for a case.
// Purpose: Record every state transition and external call a case makes so
//          the history can be reviewed independent of the case store.
// Dependencies: caseflow-core, serde_json
// ============================================================================

//! ## Overview
//! Unlike the other evidence artifacts, the audit trail is append-only
//! rather than write-once: each call to [`AuditTrail::append`] adds one
//! ndjson line to `audit/{case_id}/events.ndjson`. The filesystem backend
//! opens the file in append mode; there is no compare-and-set here because
//! the audit trail is not used for idempotency, only for review.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;

use crate::paths;
use crate::paths::EvidencePathError;

/// An append-only audit trail for a single case, backed by a local file.
pub struct AuditTrail {
    /// Path to the ndjson file this trail appends to.
    file_path: PathBuf,
}

/// Errors raised while appending to an audit trail.
#[derive(Debug)]
pub enum AuditTrailError {
    /// The case id used to build the audit path was invalid.
    InvalidPath(EvidencePathError),
    /// Serializing the audit record failed.
    Serialize(serde_json::Error),
    /// Writing the record to disk failed.
    Io(std::io::Error),
}

impl std::fmt::Display for AuditTrailError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPath(err) => write!(f, "audit trail path invalid: {err}"),
            Self::Serialize(err) => write!(f, "audit record serialize error: {err}"),
            Self::Io(err) => write!(f, "audit trail io error: {err}"),
        }
    }
}

impl std::error::Error for AuditTrailError {}

impl AuditTrail {
    /// Opens the audit trail file for `case_id` under `evidence_root`,
    /// creating the parent directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`AuditTrailError`] if `case_id` is invalid or the directory
    /// cannot be created.
    pub fn open(evidence_root: &Path, case_id: &str) -> Result<Self, AuditTrailError> {
        let relative = paths::audit_trail_path(case_id).map_err(AuditTrailError::InvalidPath)?;
        let file_path = evidence_root.join(relative);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).map_err(AuditTrailError::Io)?;
        }
        Ok(Self { file_path })
    }

    /// Appends one ndjson record to the audit trail.
    ///
    /// # Errors
    ///
    /// Returns [`AuditTrailError`] if the record cannot be serialized or
    /// written.
    pub fn append<T: Serialize>(&self, record: &T) -> Result<(), AuditTrailError> {
        let mut line = serde_json::to_string(record).map_err(AuditTrailError::Serialize)?;
        line.push('\n');
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)
            .map_err(AuditTrailError::Io)?;
        file.write_all(line.as_bytes()).map_err(AuditTrailError::Io)?;
        Ok(())
    }

    /// Returns every ndjson line currently recorded, in append order.
    ///
    /// # Errors
    ///
    /// Returns [`AuditTrailError`] if the file cannot be read.
    pub fn read_all(&self) -> Result<Vec<String>, AuditTrailError> {
        if !self.file_path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&self.file_path).map_err(AuditTrailError::Io)?;
        Ok(contents.lines().map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Record {
        event: String,
    }

    #[test]
    fn append_is_ordered_and_durable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let trail = AuditTrail::open(dir.path(), "case-1").expect("open trail");

        trail.append(&Record { event: "received".to_string() }).expect("append first");
        trail.append(&Record { event: "parsed".to_string() }).expect("append second");

        let lines = trail.read_all().expect("read all");
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("received"));
        assert!(lines[1].contains("parsed"));
    }

    #[test]
    fn read_all_on_missing_file_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let trail = AuditTrail::open(dir.path(), "case-2").expect("open trail");
        assert!(trail.read_all().expect("read all").is_empty());
    }
}
