// caseflow-core/src/core/committee.rs
// ============================================================================
// Module: Caseflow Committee Model
// Description: Multi-provider field votes and weighted consensus outcomes.
// Purpose: Represent the cross-check committee's inputs and aggregated result.
// Dependencies: crate::core::identifiers, serde, serde_json
// ============================================================================

//! ## Overview
//! When a case contains ambiguous structural decisions (header detection,
//! column-to-field mapping, customer name extraction), caseflow asks a
//! committee of independent providers to vote on the correct interpretation.
//! Votes are weighted per configured provider weight and combined into an
//! [`AggregatedVotes`] per field, then classified into a [`Consensus`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::FieldId;
use crate::core::identifiers::ProviderId;
use crate::core::identifiers::TaskId;

// ============================================================================
// SECTION: Provider Family
// ============================================================================

/// Model family backing a committee provider, used to enforce diversity when
/// selecting the provider pool for a committee invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderFamily {
    /// OpenAI models.
    OpenAi,
    /// Anthropic models.
    Anthropic,
    /// DeepSeek models.
    DeepSeek,
    /// Google models.
    Google,
    /// xAI models.
    XAi,
}

// ============================================================================
// SECTION: Field Votes
// ============================================================================

/// A single provider's vote for one canonical field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldVote {
    /// Canonical field being voted on.
    pub field_id: FieldId,
    /// The value the provider proposed for the field.
    pub value: Value,
    /// Provider-reported confidence in `[0, 1]`.
    pub confidence: f64,
}

/// One provider's full response to a committee invocation.
///
/// # Invariants
/// - `latency_ms` reflects wall-clock time for the single provider call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderOutput {
    /// Provider that produced this output.
    pub provider_id: ProviderId,
    /// Model family backing the provider.
    pub family: ProviderFamily,
    /// Votes for each field the provider was asked to adjudicate.
    pub field_votes: Vec<FieldVote>,
    /// Observed call latency in milliseconds.
    pub latency_ms: u64,
}

// ============================================================================
// SECTION: Consensus
// ============================================================================

/// Classification of agreement across a field's weighted votes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Consensus {
    /// Every responding provider proposed the same value.
    Unanimous,
    /// A weighted majority agreed on one value.
    Majority,
    /// Votes split without a weighted majority on any single value.
    Split,
    /// Too few providers responded to reach any consensus.
    NoConsensus,
}

/// Aggregated, weighted vote outcome for a single canonical field.
///
/// # Invariants
/// - `supporting_weight + dissenting_weight` equals the sum of weights of all
///   providers that voted on this field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedVotes {
    /// Field the aggregation applies to.
    pub field_id: FieldId,
    /// Consensus classification for this field.
    pub consensus: Consensus,
    /// Value chosen by weighted plurality, when one exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chosen_value: Option<Value>,
    /// Total weight supporting `chosen_value`.
    pub supporting_weight: f64,
    /// Total weight cast for any other value.
    pub dissenting_weight: f64,
}

impl AggregatedVotes {
    /// Returns true when the chosen value's supporting weight meets or
    /// exceeds the given auto-accept threshold.
    #[must_use]
    pub fn meets_threshold(&self, threshold: f64) -> bool {
        let total = self.supporting_weight + self.dissenting_weight;
        if total <= 0.0 {
            return false;
        }
        self.chosen_value.is_some() && (self.supporting_weight / total) >= threshold
    }
}

// ============================================================================
// SECTION: Committee Result
// ============================================================================

/// Full result of a single committee invocation for one case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitteeResult {
    /// Task identifier for this committee invocation.
    pub task_id: TaskId,
    /// Raw per-provider outputs, in the order responses were received.
    pub outputs: Vec<ProviderOutput>,
    /// Per-field aggregated votes.
    pub aggregated: Vec<AggregatedVotes>,
}

impl CommitteeResult {
    /// Returns the aggregated vote for a field, if it was part of this
    /// invocation.
    #[must_use]
    pub fn aggregated_for(&self, field: &FieldId) -> Option<&AggregatedVotes> {
        self.aggregated.iter().find(|agg| agg.field_id == *field)
    }

    /// Returns true when every aggregated field reached at least the given
    /// auto-accept threshold.
    #[must_use]
    pub fn all_fields_meet_threshold(&self, threshold: f64) -> bool {
        self.aggregated
            .iter()
            .all(|agg| agg.meets_threshold(threshold))
    }
}
