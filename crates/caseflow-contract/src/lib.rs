// caseflow-contract/src/lib.rs
// ============================================================================
// Module: Caseflow Contract Library
// Description: Canonical wire-shape contract definitions and generators.
// Purpose: Provide the single source of truth for the JSON schemas tooling,
//          docs, and external clients validate against.
// Dependencies: caseflow-core, caseflow-committee, caseflow-config, serde,
//               thiserror
// ============================================================================

//! ## Overview
//! The contract library defines the canonical, machine-readable shapes for
//! the artifacts caseflow exchanges with the outside world: the evidence
//! pack handed to committee providers, the strict response a provider must
//! return, the aggregated committee result, and the canonical order model.
//! It is the single source of truth for generated JSON Schema artifacts and
//! example fixtures used by docs and client tooling.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod authoring;
pub mod contract;
pub mod examples;
pub mod providers;
pub mod schemas;
pub mod tooltips;
pub mod types;

// ============================================================================
// SECTION: Errors
// ============================================================================

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised when generating contract artifacts.
///
/// # Invariants
/// - Variants carry human-readable context for diagnostics.
/// - [`ContractError::OutputPath`] always includes the offending path.
#[derive(Debug, Error)]
pub enum ContractError {
    /// IO failure while writing artifacts.
    #[error("io error: {0}")]
    Io(String),
    /// Serialization failure while rendering artifacts.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// Contract generation failed.
    #[error("contract generation error: {0}")]
    Generation(String),
    /// Output path invalid or inaccessible.
    #[error("invalid output path: {0}")]
    OutputPath(PathBuf),
}

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use authoring::ArtifactKind;
pub use authoring::AuthoringError;
pub use authoring::validate_artifact;
pub use contract::ContractBuilder;
pub use types::ContractArtifact;
pub use types::ContractBundle;
pub use types::ContractManifest;
pub use types::ManifestArtifact;
pub use types::ProviderFamilyContract;
