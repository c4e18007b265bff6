// caseflow-broker/src/source/file.rs
// ============================================================================
// Module: Caseflow File Spool Trigger Source
// Description: Filesystem-spool-backed trigger source.
// Purpose: Pick up case triggers dropped as JSON files into a watched
//          directory, e.g. by a batch-upload job or an ingress process that
//          cannot share memory with the worker.
// Dependencies: caseflow-core, serde_json, std
// ============================================================================

//! ## Overview
//! [`FileSpoolSource`] reads the lexicographically earliest `*.json` file in
//! its root directory, parses it as a [`CaseTrigger`], and moves it to a
//! `processed/` subdirectory so it is never delivered twice. Callers that
//! name spool files with a sortable prefix (timestamp, ULID) get FIFO
//! delivery; this source does not itself impose an ordering. Malformed files
//! are moved to `failed/` rather than retried forever.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use caseflow_core::CaseTrigger;
use caseflow_core::TriggerSource;

use crate::source::SourceError;

// ============================================================================
// SECTION: File Spool Source
// ============================================================================

/// Filesystem-spool trigger source.
#[derive(Debug, Clone)]
pub struct FileSpoolSource {
    /// Directory scanned for pending trigger files.
    root: PathBuf,
}

impl FileSpoolSource {
    /// Creates a spool source rooted at `root`. The directory (and its
    /// `processed`/`failed` subdirectories) are created if absent.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Io`] if the directories cannot be created.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, SourceError> {
        let root = root.into();
        for dir in [root.clone(), root.join("processed"), root.join("failed")] {
            fs::create_dir_all(&dir).map_err(|err| SourceError::Io(err.to_string()))?;
        }
        Ok(Self { root })
    }

    /// Returns the next pending spool file path, if any.
    fn next_pending_path(&self) -> Result<Option<PathBuf>, SourceError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(|err| SourceError::Io(err.to_string()))? {
            let entry = entry.map_err(|err| SourceError::Io(err.to_string()))?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                names.push(path);
            }
        }
        names.sort();
        Ok(names.into_iter().next())
    }

    /// Reads and parses one spool file, moving it out of `root` regardless
    /// of outcome so the same file is never reprocessed.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the file cannot be read, parsed, or
    /// moved.
    pub fn try_next(&self) -> Result<Option<CaseTrigger>, SourceError> {
        let Some(path) = self.next_pending_path()? else {
            return Ok(None);
        };
        let bytes = fs::read(&path).map_err(|err| SourceError::Io(err.to_string()))?;
        match serde_json::from_slice::<CaseTrigger>(&bytes) {
            Ok(trigger) => {
                self.archive(&path, "processed")?;
                Ok(Some(trigger))
            }
            Err(err) => {
                self.archive(&path, "failed")?;
                Err(SourceError::Decode(err.to_string()))
            }
        }
    }

    /// Moves a spool file into the named subdirectory of `root`.
    fn archive(&self, path: &Path, subdir: &str) -> Result<(), SourceError> {
        let Some(file_name) = path.file_name() else {
            return Err(SourceError::Io("spool file has no name".to_string()));
        };
        let destination = self.root.join(subdir).join(file_name);
        fs::rename(path, destination).map_err(|err| SourceError::Io(err.to_string()))
    }
}

impl TriggerSource for FileSpoolSource {
    fn next_trigger(&mut self) -> Option<CaseTrigger> {
        // Malformed files are already archived to `failed/` by `try_next`;
        // skip past them rather than stalling the whole spool on one bad
        // file.
        loop {
            match self.try_next() {
                Ok(Some(trigger)) => return Some(trigger),
                Ok(None) => return None,
                Err(_) => continue,
            }
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions."
    )]

    use caseflow_core::CaseId;
    use caseflow_core::TenantId;
    use serde_json::json;
    use tempfile::tempdir;

    use super::*;

    fn write_trigger(dir: &Path, name: &str, case_id: &str) {
        let trigger = CaseTrigger {
            tenant_id: TenantId::new("acme"),
            case_id: Some(CaseId::new(case_id)),
            payload: json!({"blob_url": "file:///tmp/a.xlsx"}),
        };
        fs::write(
            dir.join(name),
            serde_json::to_vec(&trigger).expect("serialize"),
        )
        .expect("write spool file");
    }

    #[test]
    fn delivers_files_in_sorted_order_and_archives_them() {
        let dir = tempdir().expect("tempdir");
        write_trigger(dir.path(), "0002-b.json", "b");
        write_trigger(dir.path(), "0001-a.json", "a");
        let mut source = FileSpoolSource::new(dir.path()).expect("source");

        let first = source.next_trigger().expect("first trigger");
        assert_eq!(first.case_id, Some(CaseId::new("a")));
        let second = source.next_trigger().expect("second trigger");
        assert_eq!(second.case_id, Some(CaseId::new("b")));
        assert!(source.next_trigger().is_none());

        assert!(dir.path().join("processed/0001-a.json").exists());
        assert!(dir.path().join("processed/0002-b.json").exists());
    }

    #[test]
    fn quarantines_malformed_files_without_blocking() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("0001-bad.json"), b"not json").expect("write bad file");
        write_trigger(dir.path(), "0002-good.json", "good");
        let mut source = FileSpoolSource::new(dir.path()).expect("source");

        let delivered = source.next_trigger().expect("good trigger delivered");
        assert_eq!(delivered.case_id, Some(CaseId::new("good")));
        assert!(dir.path().join("failed/0001-bad.json").exists());
    }
}
