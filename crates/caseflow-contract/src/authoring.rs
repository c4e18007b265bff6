// caseflow-contract/src/authoring.rs
// ============================================================================
// Module: Artifact Validation
// Description: JSON Schema validation for the four caseflow wire shapes.
// Purpose: Give docs, tests, and operator tooling a single entry point that
//          validates an arbitrary JSON instance against the canonical schema
//          for one wire artifact, independent of which crate produced it.
// Dependencies: jsonschema, serde_json, caseflow-contract::schemas
// ============================================================================

//! ## Overview
//! Every wire artifact caseflow produces or accepts (an evidence pack sent to
//! a provider, a provider's strict response, an aggregated committee result,
//! or a canonical order) has a canonical JSON Schema in [`crate::schemas`].
//! This module names those four artifact kinds and validates arbitrary JSON
//! against the matching schema, using the same `jsonschema::validator_for`
//! entry point the committee crate uses to validate live provider responses.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::schemas;

// ============================================================================
// SECTION: Artifact Kinds
// ============================================================================

/// The four canonical wire artifact shapes this crate documents and
/// validates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// The bounded, PII-minimized committee input.
    EvidencePack,
    /// A single provider's strict-schema response.
    ProviderResponse,
    /// The aggregated outcome of one committee invocation.
    CommitteeResult,
    /// The parser's normalized, evidence-linked order.
    CanonicalOrder,
}

impl ArtifactKind {
    /// Every artifact kind, in the order the bundle documents them.
    #[must_use]
    pub const fn all() -> [Self; 4] {
        [Self::EvidencePack, Self::ProviderResponse, Self::CommitteeResult, Self::CanonicalOrder]
    }

    /// Returns the stable lowercase label used in file names and CLI flags.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::EvidencePack => "evidence-pack",
            Self::ProviderResponse => "provider-response",
            Self::CommitteeResult => "committee-result",
            Self::CanonicalOrder => "canonical-order",
        }
    }

    /// Parses an artifact kind from its stable label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::all().into_iter().find(|kind| kind.label() == label)
    }

    /// Returns the canonical JSON Schema for this artifact kind.
    #[must_use]
    pub fn schema(self) -> Value {
        match self {
            Self::EvidencePack => schemas::evidence_pack_schema(),
            Self::ProviderResponse => schemas::strict_provider_response_schema(),
            Self::CommitteeResult => schemas::committee_result_schema(),
            Self::CanonicalOrder => schemas::canonical_order_schema(),
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.label())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while validating an artifact instance.
#[derive(Debug, Error)]
pub enum AuthoringError {
    /// The artifact kind's own schema failed to compile.
    #[error("{kind} schema failed to compile: {error}")]
    SchemaCompile {
        /// Artifact kind whose schema failed to compile.
        kind: ArtifactKind,
        /// Underlying compilation error.
        error: String,
    },
    /// The instance failed validation against its schema.
    #[error("{kind} instance failed schema validation: {error}")]
    SchemaViolation {
        /// Artifact kind the instance was validated against.
        kind: ArtifactKind,
        /// Underlying validation error.
        error: String,
    },
}

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Validates a JSON instance against the canonical schema for `kind`.
///
/// # Errors
///
/// Returns [`AuthoringError::SchemaCompile`] if the artifact's own schema is
/// malformed (a defect in this crate, not in `instance`), or
/// [`AuthoringError::SchemaViolation`] if `instance` does not conform.
pub fn validate_artifact(kind: ArtifactKind, instance: &Value) -> Result<(), AuthoringError> {
    let schema = kind.schema();
    let validator = jsonschema::validator_for(&schema)
        .map_err(|err| AuthoringError::SchemaCompile { kind, error: err.to_string() })?;
    validator
        .validate(instance)
        .map_err(|err| AuthoringError::SchemaViolation { kind, error: err.to_string() })
}

/// Builds markdown documentation for the artifact-validation surface.
#[must_use]
pub fn authoring_markdown() -> String {
    let mut out = String::new();
    out.push_str("# Caseflow Wire Artifact Validation\n\n");
    out.push_str(
        "Caseflow exchanges four canonical JSON shapes across process and network \
         boundaries: an evidence pack sent to a committee provider, a provider's \
         strict-schema response, an aggregated committee result, and a parser's \
         canonical order. Each has a JSON Schema in `schemas/`, generated from the \
         same Rust types the runtime itself uses, so a schema change here can \
         never silently diverge from what the system actually produces or \
         accepts.\n\n",
    );
    out.push_str("## Artifact Kinds\n\n");
    for kind in ArtifactKind::all() {
        out.push_str("- `");
        out.push_str(kind.label());
        out.push_str("`: schemas/");
        out.push_str(kind.label());
        out.push_str(".schema.json\n");
    }
    out.push_str(
        "\nProvider responses are validated against `provider-response.schema.json` \
         at the moment they are received, before any field mapping is trusted \
         (invariant I3: every `selected_column_id` must name a column that \
         appeared in the evidence pack the provider was given). Canonical orders \
         and committee results are validated at the same boundary, immediately \
         after the activity that produced them returns, so a malformed artifact \
         fails fast instead of propagating into a later workflow stage.\n",
    );
    out
}
