// caseflow-evidence/src/fs_store.rs
// ============================================================================
// Module: Filesystem Evidence Store
// Description: Local filesystem backend for write-once evidence artifacts.
// Purpose: Provide the default, single-node evidence backend used in tests
//          and small deployments.
// Dependencies: caseflow-core
// ============================================================================

//! ## Overview
//! [`FsEvidenceStore`] roots all artifacts under a single directory and
//! mirrors each artifact's relative path into a file on disk. Writes use
//! [`std::fs::OpenOptions::create_new`] so a second write to the same path
//! fails rather than silently overwriting prior evidence, matching the
//! write-once contract the workflow engine depends on for replay fidelity.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::path::PathBuf;

use caseflow_core::interfaces::EvidenceArtifact;
use caseflow_core::interfaces::EvidenceError;
use caseflow_core::interfaces::EvidenceReader;
use caseflow_core::interfaces::EvidenceRef;
use caseflow_core::interfaces::EvidenceSink;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors specific to the filesystem evidence backend.
#[derive(Debug)]
pub enum FsEvidenceStoreError {
    /// The artifact path escapes the store root.
    PathEscapesRoot(String),
    /// An I/O operation failed.
    Io(std::io::Error),
}

impl fmt::Display for FsEvidenceStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PathEscapesRoot(path) => {
                write!(f, "evidence path escapes store root: {path}")
            }
            Self::Io(err) => write!(f, "evidence store io error: {err}"),
        }
    }
}

impl std::error::Error for FsEvidenceStoreError {}

impl From<FsEvidenceStoreError> for EvidenceError {
    fn from(err: FsEvidenceStoreError) -> Self {
        Self::Store(err.to_string())
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Local filesystem evidence store rooted at a single directory.
pub struct FsEvidenceStore {
    /// Directory every artifact path is resolved relative to.
    root: PathBuf,
}

impl FsEvidenceStore {
    /// Opens (and creates if missing) an evidence store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`FsEvidenceStoreError::Io`] if the root directory cannot be
    /// created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, FsEvidenceStoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(FsEvidenceStoreError::Io)?;
        Ok(Self { root })
    }

    /// Resolves a content-addressed relative path to an absolute path inside
    /// the store root, rejecting any path that would escape it.
    fn resolve(&self, relative: &str) -> Result<PathBuf, FsEvidenceStoreError> {
        if relative.is_empty() {
            return Err(FsEvidenceStoreError::PathEscapesRoot(relative.to_string()));
        }
        let has_traversal = relative
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..");
        if has_traversal || relative.starts_with('/') {
            return Err(FsEvidenceStoreError::PathEscapesRoot(relative.to_string()));
        }
        Ok(self.root.join(relative))
    }

    /// Returns the root directory this store is rooted at.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl EvidenceSink for FsEvidenceStore {
    fn write(&self, artifact: &EvidenceArtifact) -> Result<EvidenceRef, EvidenceError> {
        let full_path = self.resolve(&artifact.path)?;
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).map_err(FsEvidenceStoreError::Io)?;
        }
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&full_path)
            .map_err(|err| {
                if err.kind() == std::io::ErrorKind::AlreadyExists {
                    EvidenceError::AlreadyExists(artifact.path.clone())
                } else {
                    EvidenceError::from(FsEvidenceStoreError::Io(err))
                }
            })?;
        file.write_all(&artifact.bytes)
            .map_err(|err| EvidenceError::from(FsEvidenceStoreError::Io(err)))?;
        file.sync_all().map_err(|err| EvidenceError::from(FsEvidenceStoreError::Io(err)))?;
        Ok(EvidenceRef { uri: artifact.path.clone() })
    }
}

impl EvidenceReader for FsEvidenceStore {
    fn read(&self, path: &str) -> Result<Vec<u8>, EvidenceError> {
        let full_path = self.resolve(path)?;
        fs::read(&full_path).map_err(|err| EvidenceError::from(FsEvidenceStoreError::Io(err)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(path: &str, bytes: &[u8]) -> EvidenceArtifact {
        EvidenceArtifact {
            path: path.to_string(),
            content_type: Some("application/json".to_string()),
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn writes_then_reads_back_bytes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FsEvidenceStore::open(dir.path()).expect("open store");
        let artifact = artifact("cases/case-1/canonical-order.json", b"{\"ok\":true}");

        let reference = store.write(&artifact).expect("write artifact");
        assert_eq!(reference.uri, artifact.path);

        let bytes = store.read(&artifact.path).expect("read artifact");
        assert_eq!(bytes, artifact.bytes);
    }

    #[test]
    fn rejects_overwriting_an_existing_artifact() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FsEvidenceStore::open(dir.path()).expect("open store");
        let path = "audit/case-1/events.ndjson";

        store.write(&artifact(path, b"first")).expect("first write succeeds");
        let second = store.write(&artifact(path, b"second"));
        assert!(matches!(second, Err(EvidenceError::AlreadyExists(_))));
    }

    #[test]
    fn rejects_paths_that_escape_the_store_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FsEvidenceStore::open(dir.path()).expect("open store");
        let artifact = artifact("../escape.json", b"nope");
        let result = store.write(&artifact);
        assert!(matches!(result, Err(EvidenceError::Store(_))));
    }
}
