// caseflow-committee/src/aggregate.rs
// ============================================================================
// Module: Weighted Vote Aggregation
// Description: Per-field weighted voting, consensus classification, and the
//              auto-accept policy.
// Purpose: Turn N providers' strict-schema mappings into one aggregated
//          decision per canonical field, with an explicit human-review flag.
// Dependencies: caseflow-core
// ============================================================================

//! ## Overview
//! For each canonical field, every responding provider's weighted,
//! confidence-scaled vote is tallied against the column it selected (or
//! against `null`). The winning choice and the margin over the runner-up
//! drive a four-way [`caseflow_core::Consensus`] classification; the
//! auto-accept policy then decides whether that classification, combined
//! with the overall committee confidence, is enough to proceed without a
//! human in the loop.

use std::collections::BTreeMap;

use caseflow_core::AggregatedVotes;
use caseflow_core::ColumnId;
use caseflow_core::Consensus;
use caseflow_core::FieldId;
use serde_json::Value;
use serde_json::json;

use crate::provider::StrictProviderResponse;
use crate::selection::ProviderConfig;

/// Configuration thresholds driving auto-accept policy.
///
/// # Invariants
/// - `auto_accept_confidence`, `majority_confidence`, `majority_margin`, and
///   `min_weight_clip` all lie in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregationPolicy {
    /// Minimum overall confidence for a `unanimous` field to auto-accept.
    pub auto_accept_confidence: f64,
    /// Minimum overall confidence for a `majority` field to auto-accept.
    pub majority_confidence: f64,
    /// Minimum tally margin (winner minus runner-up) for `majority` rather
    /// than `split` when quorum is met.
    pub majority_margin: f64,
    /// Floor applied to a provider's weight before normalization.
    pub min_weight_clip: f64,
}

impl Default for AggregationPolicy {
    fn default() -> Self {
        Self {
            auto_accept_confidence: 0.75,
            majority_confidence: 0.85,
            majority_margin: 0.25,
            min_weight_clip: 0.1,
        }
    }
}

/// Canonical fields that always require human review on any non-unanimous
/// outcome, regardless of confidence.
const CRITICAL_FIELDS: &[&str] = &["customer_name", "sku", "gtin"];

/// Returns true when `field` is subject to the critical-field override.
fn is_critical(field: &FieldId) -> bool {
    CRITICAL_FIELDS.contains(&field.as_str())
}

/// One provider's successful contribution to aggregation.
struct Vote<'a> {
    /// Provider's normalized weight.
    weight: f64,
    /// Provider's decoded response.
    response: &'a StrictProviderResponse,
}

/// Normalizes provider weights: clips each to `policy.min_weight_clip`, then
/// scales so the clipped weights sum to 1.
fn normalized_weights(providers: &[ProviderConfig], policy: AggregationPolicy) -> BTreeMap<String, f64> {
    let clipped: Vec<(String, f64)> = providers
        .iter()
        .map(|p| (p.id.as_str().to_string(), p.weight.max(policy.min_weight_clip)))
        .collect();
    let total: f64 = clipped.iter().map(|(_, w)| w).sum();
    if total <= 0.0 {
        return clipped.into_iter().map(|(id, _)| (id, 0.0)).collect();
    }
    clipped.into_iter().map(|(id, w)| (id, w / total)).collect()
}

/// Aggregates one field's votes across every provider that successfully
/// responded, classifying consensus and returning the weighted outcome.
///
/// `pool_size` is the number of providers selected for this invocation (the
/// committee's configured `N`), independent of how many actually responded;
/// quorum and the `unanimous` classification are both evaluated against it.
#[must_use]
fn aggregate_field(
    field: &FieldId,
    votes: &[Vote<'_>],
    pool_size: usize,
    policy: AggregationPolicy,
) -> AggregatedVotes {
    let mut tally: BTreeMap<Option<String>, (f64, usize)> = BTreeMap::new();
    for vote in votes {
        let Some(mapping) = vote.response.mappings.iter().find(|m| &m.field == field) else {
            continue;
        };
        let choice = mapping.selected_column_id.as_ref().map(|c| c.as_str().to_string());
        let score = vote.weight * mapping.confidence;
        let entry = tally.entry(choice).or_insert((0.0, 0));
        entry.0 += score;
        entry.1 += 1;
    }

    let respondents: usize = tally.values().map(|(_, count)| *count).sum();

    let mut ranked: Vec<(Option<String>, f64, usize)> =
        tally.into_iter().map(|(choice, (weight, count))| (choice, weight, count)).collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let Some((winner_choice, winner_weight, winner_count)) = ranked.first().cloned() else {
        return AggregatedVotes {
            field_id: field.clone(),
            consensus: Consensus::NoConsensus,
            chosen_value: None,
            supporting_weight: 0.0,
            dissenting_weight: 0.0,
        };
    };

    let runner_up_weight = ranked.get(1).map_or(0.0, |(_, weight, _)| *weight);
    let margin = winner_weight - runner_up_weight;
    let dissenting_weight: f64 = ranked.iter().skip(1).map(|(_, weight, _)| weight).sum();

    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "pool sizes are single-digit provider counts, so the round trip through f64 for ceil() cannot lose precision or truncate"
    )]
    let quorum = ((2 * pool_size) as f64 / 3.0).ceil() as usize;

    let consensus = if winner_count == respondents && respondents == pool_size {
        Consensus::Unanimous
    } else if winner_count >= quorum && margin >= policy.majority_margin {
        Consensus::Majority
    } else if winner_count >= quorum {
        Consensus::Split
    } else {
        Consensus::NoConsensus
    };

    let chosen_value: Option<Value> = winner_choice.map(|c| json!(c));

    AggregatedVotes {
        field_id: field.clone(),
        consensus,
        chosen_value,
        supporting_weight: winner_weight,
        dissenting_weight,
    }
}

/// Aggregates every field referenced by any provider's mappings across all
/// successful responses.
#[must_use]
pub fn aggregate_all(
    providers: &[ProviderConfig],
    responses: &[(ProviderConfig, StrictProviderResponse)],
    pool_size: usize,
    policy: AggregationPolicy,
) -> Vec<AggregatedVotes> {
    let weights = normalized_weights(providers, policy);

    let mut fields: Vec<FieldId> = Vec::new();
    for (_, response) in responses {
        for mapping in &response.mappings {
            if !fields.contains(&mapping.field) {
                fields.push(mapping.field.clone());
            }
        }
    }

    fields
        .iter()
        .map(|field| {
            let votes: Vec<Vote<'_>> = responses
                .iter()
                .map(|(config, response)| Vote {
                    weight: weights.get(config.id.as_str()).copied().unwrap_or(0.0),
                    response,
                })
                .collect();
            aggregate_field(field, &votes, pool_size, policy)
        })
        .collect()
}

/// Returns true when `field`'s aggregated outcome auto-accepts under
/// `policy` and `overall_confidence`, without requiring human review.
#[must_use]
pub fn auto_accepts(agg: &AggregatedVotes, overall_confidence: f64, policy: AggregationPolicy) -> bool {
    if is_critical(&agg.field_id) && agg.consensus != Consensus::Unanimous {
        return false;
    }
    match agg.consensus {
        Consensus::Unanimous => overall_confidence >= policy.auto_accept_confidence,
        Consensus::Majority => overall_confidence >= policy.majority_confidence,
        Consensus::Split | Consensus::NoConsensus => false,
    }
}

/// Resolves a chosen value (as produced by [`aggregate_field`]) back to a
/// [`ColumnId`], when one was selected.
#[must_use]
pub fn chosen_column(agg: &AggregatedVotes) -> Option<ColumnId> {
    agg.chosen_value
        .as_ref()
        .and_then(Value::as_str)
        .map(ColumnId::new)
}
