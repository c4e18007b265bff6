// caseflow-committee/src/provider.rs
// ============================================================================
// Module: Committee Provider Contract
// Description: The tagged-union provider abstraction and its strict-schema
//              wire response, validated before any output is trusted.
// Purpose: Let concrete providers (HTTP-backed LLM calls today) be added as
//          constructor cases rather than a class hierarchy, per the
//          redesign guidance to prefer sum types over inheritance.
// Dependencies: caseflow-core, async-trait, jsonschema, serde_json
// ============================================================================

//! ## Overview
//! Every concrete committee provider implements [`CommitteeProvider`]. A
//! provider's raw response is untrusted input: it is validated against the
//! strict JSON schema in [`provider_output_schema`] before it is ever
//! deserialized into [`StrictProviderResponse`], and every
//! `selected_column_id` is re-checked against the originating evidence pack
//! (invariant I3) by the caller, not by the provider itself.

use std::time::Duration;

use async_trait::async_trait;
use caseflow_core::ColumnId;
use caseflow_core::FieldId;
use caseflow_core::ProviderFamily;
use caseflow_core::ProviderId;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::pack::EvidencePack;

// ============================================================================
// SECTION: Wire Response
// ============================================================================

/// A single field mapping proposed by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Canonical field this mapping applies to.
    pub field: FieldId,
    /// Column the provider selected for `field`, or `None` if it found no
    /// plausible candidate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_column_id: Option<ColumnId>,
    /// Provider-reported confidence in `[0, 1]`.
    pub confidence: f64,
    /// Free-text justification, retained for audit, never parsed.
    pub reasoning: String,
}

/// The strict-schema response a single provider call must produce.
///
/// # Invariants
/// - Every `mappings[].selected_column_id` is either `None` or a column id
///   present in the evidence pack the request was built from (checked by
///   [`validate_response`], not carried as a type-level guarantee).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrictProviderResponse {
    /// Proposed mappings, one entry per requested canonical field.
    pub mappings: Vec<FieldMapping>,
    /// Free-text issues the provider flagged while reasoning.
    #[serde(default)]
    pub issues: Vec<String>,
    /// Provider's overall confidence in `[0, 1]`.
    pub overall_confidence: f64,
    /// Provider-reported processing time in milliseconds.
    pub processing_time_ms: u64,
}

// ============================================================================
// SECTION: Schema Validation
// ============================================================================

/// Errors raised validating or decoding a provider's raw response.
#[derive(Debug, Error)]
pub enum ProviderResponseError {
    /// The raw response failed strict JSON-schema validation.
    #[error("provider response failed schema validation: {0}")]
    SchemaViolation(String),
    /// The response was schema-valid JSON but failed to deserialize.
    #[error("provider response could not be decoded: {0}")]
    Decode(String),
    /// A `selected_column_id` was not present in the originating evidence
    /// pack's candidate set.
    #[error("provider selected column {0:?} outside the evidence pack's candidate set")]
    ColumnOutsideEvidencePack(String),
}

/// Returns the strict JSON schema every provider response must satisfy.
#[must_use]
pub fn provider_output_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["mappings", "issues", "overallConfidence", "processingTimeMs"],
        "properties": {
            "mappings": {
                "type": "array",
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["field", "confidence", "reasoning"],
                    "properties": {
                        "field": { "type": "string", "minLength": 1 },
                        "selectedColumnId": { "type": ["string", "null"] },
                        "confidence": { "type": "number", "minimum": 0.0, "maximum": 1.0 },
                        "reasoning": { "type": "string" }
                    }
                }
            },
            "issues": {
                "type": "array",
                "items": { "type": "string" }
            },
            "overallConfidence": { "type": "number", "minimum": 0.0, "maximum": 1.0 },
            "processingTimeMs": { "type": "integer", "minimum": 0 }
        }
    })
}

/// Validates a raw provider response against the strict schema, decodes it,
/// and checks invariant I3 against `pack`.
///
/// # Errors
///
/// Returns [`ProviderResponseError`] when schema validation fails, the
/// payload cannot be decoded into [`StrictProviderResponse`], or a
/// `selected_column_id` falls outside `pack`'s candidate set.
pub fn validate_response(
    raw: &Value,
    pack: &EvidencePack,
) -> Result<StrictProviderResponse, ProviderResponseError> {
    let schema = provider_output_schema();
    let validator = jsonschema::validator_for(&schema)
        .map_err(|err| ProviderResponseError::SchemaViolation(err.to_string()))?;
    if let Err(err) = validator.validate(raw) {
        return Err(ProviderResponseError::SchemaViolation(err.to_string()));
    }

    // serde's `mappings[].selectedColumnId` is camelCase on the wire but
    // snake_case in `FieldMapping`; reuse the documented rename below.
    let response: WireResponse =
        serde_json::from_value(raw.clone()).map_err(|err| ProviderResponseError::Decode(err.to_string()))?;

    for mapping in &response.mappings {
        if let Some(column) = &mapping.selected_column_id
            && !pack.contains_column(column)
        {
            return Err(ProviderResponseError::ColumnOutsideEvidencePack(
                column.as_str().to_string(),
            ));
        }
    }

    Ok(response.into())
}

/// Wire-shaped mirror of [`StrictProviderResponse`] using the camelCase field
/// names the strict schema requires.
#[derive(Debug, Clone, Deserialize)]
struct WireResponse {
    /// Proposed field mappings.
    mappings: Vec<WireMapping>,
    /// Free-text issues the provider flagged.
    #[serde(default)]
    issues: Vec<String>,
    /// Provider's overall confidence.
    #[serde(rename = "overallConfidence")]
    overall_confidence: f64,
    /// Provider-reported processing time in milliseconds.
    #[serde(rename = "processingTimeMs")]
    processing_time_ms: u64,
}

/// Wire-shaped mirror of [`FieldMapping`].
#[derive(Debug, Clone, Deserialize)]
struct WireMapping {
    /// Canonical field this mapping applies to.
    field: FieldId,
    /// Column the provider selected, if any.
    #[serde(rename = "selectedColumnId", default)]
    selected_column_id: Option<ColumnId>,
    /// Provider-reported confidence.
    confidence: f64,
    /// Free-text justification.
    reasoning: String,
}

impl From<WireResponse> for StrictProviderResponse {
    fn from(wire: WireResponse) -> Self {
        Self {
            mappings: wire
                .mappings
                .into_iter()
                .map(|mapping| FieldMapping {
                    field: mapping.field,
                    selected_column_id: mapping.selected_column_id,
                    confidence: mapping.confidence,
                    reasoning: mapping.reasoning,
                })
                .collect(),
            issues: wire.issues,
            overall_confidence: wire.overall_confidence,
            processing_time_ms: wire.processing_time_ms,
        }
    }
}

// ============================================================================
// SECTION: Provider Trait
// ============================================================================

/// Errors raised by a single provider call.
#[derive(Debug, Error)]
pub enum ProviderCallError {
    /// The call did not complete within the allotted timeout.
    #[error("provider call timed out after {0:?}")]
    Timeout(Duration),
    /// A transport-level failure occurred (connection refused, DNS, TLS).
    #[error("provider transport error: {0}")]
    Transport(String),
    /// The provider returned a response that failed validation.
    #[error("provider response invalid: {0}")]
    InvalidResponse(#[from] ProviderResponseError),
}

/// Common behavior contract for a committee provider.
///
/// Concrete providers are a tagged union over [`ProviderFamily`] behind this
/// one trait (HTTP-backed today); adding a provider is a constructor case
/// plus configuration, never a new class in an inheritance hierarchy.
#[async_trait]
pub trait CommitteeProvider: Send + Sync {
    /// Returns this provider's configured identifier.
    fn provider_id(&self) -> &ProviderId;

    /// Returns the model family backing this provider, used to enforce pool
    /// diversity during selection.
    fn family(&self) -> ProviderFamily;

    /// Calls the provider with a bounded evidence pack, enforcing `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderCallError`] on timeout, transport failure, or an
    /// invalid response.
    async fn call(
        &self,
        pack: &EvidencePack,
        timeout: Duration,
    ) -> Result<StrictProviderResponse, ProviderCallError>;
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        reason = "Test-only assertions are permitted to unwrap."
    )]

    use caseflow_core::CaseId;
    use caseflow_core::DetectedLanguage;
    use caseflow_core::Timestamp;

    use super::*;

    fn pack_with_column(column: &str) -> EvidencePack {
        EvidencePack {
            case_id: CaseId::new("case-1"),
            candidate_headers: vec![crate::pack::CandidateHeader {
                column_id: ColumnId::new(column),
                header_text: Some(column.to_string()),
                candidate_fields: vec![FieldId::new("sku")],
            }],
            sample_values: std::collections::BTreeMap::new(),
            column_stats: vec![],
            detected_language: DetectedLanguage::English,
            constraints: vec![],
            timestamp: Timestamp::UnixMillis(0),
        }
    }

    #[test]
    fn accepts_well_formed_response() {
        let pack = pack_with_column("B");
        let raw = serde_json::json!({
            "mappings": [
                { "field": "sku", "selectedColumnId": "B", "confidence": 0.9, "reasoning": "header match" }
            ],
            "issues": [],
            "overallConfidence": 0.9,
            "processingTimeMs": 120
        });
        let parsed = validate_response(&raw, &pack).unwrap();
        assert_eq!(parsed.mappings.len(), 1);
    }

    #[test]
    fn rejects_column_outside_evidence_pack() {
        let pack = pack_with_column("B");
        let raw = serde_json::json!({
            "mappings": [
                { "field": "sku", "selectedColumnId": "Z", "confidence": 0.9, "reasoning": "bad" }
            ],
            "issues": [],
            "overallConfidence": 0.9,
            "processingTimeMs": 120
        });
        let err = validate_response(&raw, &pack).unwrap_err();
        assert!(matches!(err, ProviderResponseError::ColumnOutsideEvidencePack(_)));
    }

    #[test]
    fn rejects_schema_violation() {
        let pack = pack_with_column("B");
        let raw = serde_json::json!({ "mappings": [], "issues": [] });
        let err = validate_response(&raw, &pack).unwrap_err();
        assert!(matches!(err, ProviderResponseError::SchemaViolation(_)));
    }
}
