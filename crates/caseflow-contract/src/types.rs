// caseflow-contract/src/types.rs
// ============================================================================
// Module: Contract Types
// Description: Shared data models for generated contract artifacts.
// Purpose: Provide canonical shapes for the manifest and artifact bundle.
// Dependencies: caseflow-core, serde
// ============================================================================

//! ## Overview
//! This module defines the typed contract shapes serialized into the
//! generated artifact bundle. These structures are the canonical source for
//! docs and client-side validation tooling.

use caseflow_core::HashAlgorithm;
use caseflow_core::HashDigest;
use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Manifest Types
// ============================================================================

/// Manifest describing the generated contract artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractManifest {
    /// Contract version identifier (matches the crate version).
    pub contract_version: String,
    /// Hash algorithm used for artifact digests.
    pub hash_algorithm: HashAlgorithm,
    /// Artifacts included in the bundle, ordered by path.
    pub artifacts: Vec<ManifestArtifact>,
}

/// Manifest entry describing a single artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestArtifact {
    /// Relative artifact path under the output directory.
    pub path: String,
    /// Artifact content type.
    pub content_type: String,
    /// Content digest for the artifact payload.
    pub digest: HashDigest,
}

// ============================================================================
// SECTION: Bundle Types
// ============================================================================

/// Generated contract bundle with artifacts and manifest metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractBundle {
    /// Manifest describing the artifacts.
    pub manifest: ContractManifest,
    /// Artifact payloads included in the bundle.
    pub artifacts: Vec<ContractArtifact>,
}

/// Artifact payload with content bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractArtifact {
    /// Relative artifact path under the output directory.
    pub path: String,
    /// MIME content type for the artifact.
    pub content_type: String,
    /// Serialized artifact payload bytes.
    pub bytes: Vec<u8>,
}

// ============================================================================
// SECTION: Provider Family Contract
// ============================================================================

/// Documentation contract for one committee provider family.
///
/// Unlike [`caseflow_committee::selection::ProviderConfig`] (a configured
/// provider instance with an id and a calibrated weight), this describes the
/// family itself: the transport every member is reached over, and operator
/// notes relevant to calibrating or adding providers in that family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderFamilyContract {
    /// Stable family identifier (matches `caseflow_core::ProviderFamily`'s
    /// wire representation).
    pub family_id: String,
    /// Human-readable family name.
    pub name: String,
    /// Transport every member of the family is reached over.
    pub transport: String,
    /// Operator-facing notes on calibration or configuration.
    pub notes: Vec<String>,
}
