// caseflow-committee/src/run.rs
// ============================================================================
// Module: Committee Orchestration
// Description: Selection, parallel provider calls, aggregation, and audit
//              trail writing for one committee invocation.
// Purpose: Tie the committee submodules together into the single entry point
//          an orchestrating activity calls.
// Dependencies: caseflow-core, tokio
// ============================================================================

//! ## Overview
//! [`run_committee`] is the activity-level entry point for one committee
//! invocation: it selects a family-diverse provider pool, fans the call out
//! in parallel bounded by a per-call timeout and an overall ceiling, writes
//! every raw response (successes and failures alike) to the evidence store
//! before returning, and only then aggregates votes and decides whether the
//! outcome can auto-accept. The evidence write happens unconditionally so a
//! case that later fails for insufficient responses still leaves a durable
//! record of what was attempted.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use caseflow_core::CaseId;
use caseflow_core::CommitteeResult;
use caseflow_core::EvidenceArtifact;
use caseflow_core::EvidenceError;
use caseflow_core::EvidenceSink;
use caseflow_core::FieldVote;
use caseflow_core::ProviderId;
use caseflow_core::ProviderOutput;
use caseflow_core::TaskId;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

use crate::aggregate::AggregationPolicy;
use crate::aggregate::aggregate_all;
use crate::aggregate::auto_accepts;
use crate::pack::EvidencePack;
use crate::provider::CommitteeProvider;
use crate::provider::ProviderCallError;
use crate::provider::StrictProviderResponse;
use crate::selection::ProviderConfig;
use crate::selection::select_providers;

/// Configuration governing one committee invocation.
#[derive(Debug, Clone)]
pub struct CommitteeConfig {
    /// Full configured provider pool to select from.
    pub pool: Vec<ProviderConfig>,
    /// Number of providers to select for this invocation.
    pub want: usize,
    /// Minimum number of successful responses required to aggregate at all.
    pub min_successful: usize,
    /// Per-provider call timeout.
    pub per_call_timeout: Duration,
    /// Ceiling on the whole invocation, independent of per-call timeouts.
    pub committee_timeout: Duration,
    /// Aggregation policy thresholds.
    pub policy: AggregationPolicy,
}

/// Errors that abort a committee invocation outright.
#[derive(Debug, Error)]
pub enum CommitteeError {
    /// Fewer than `min_successful` providers responded successfully.
    #[error("only {succeeded} of {required} required providers responded")]
    InsufficientResponses {
        /// Number of providers that responded successfully.
        succeeded: usize,
        /// Minimum required by configuration.
        required: usize,
    },
    /// The invocation did not complete within its overall time budget.
    #[error("committee invocation exceeded its {0:?} budget")]
    Overrun(Duration),
    /// Writing the audit trail to the evidence store failed.
    #[error("failed to write committee audit trail: {0}")]
    Audit(#[from] EvidenceError),
}

/// Full result of one committee invocation, including policy decisions the
/// raw [`CommitteeResult`] does not carry.
#[derive(Debug, Clone)]
pub struct CommitteeOutcome {
    /// Canonical committee result, suitable for persisting on the case.
    pub result: CommitteeResult,
    /// True when provider selection could not maintain family diversity.
    pub diversity_downgraded: bool,
    /// True when at least one aggregated field did not auto-accept.
    pub requires_human_review: bool,
}

/// Runs one committee invocation end to end.
///
/// `providers` maps every configured provider id to its concrete client;
/// providers absent from this map are treated as call failures rather than
/// a configuration error, so a pool can be configured ahead of a provider's
/// credentials being available.
///
/// # Errors
///
/// Returns [`CommitteeError::Overrun`] if the whole invocation exceeds
/// `config.committee_timeout`, [`CommitteeError::InsufficientResponses`] if
/// fewer than `config.min_successful` providers respond successfully, or
/// [`CommitteeError::Audit`] if the audit trail cannot be written.
pub async fn run_committee(
    providers: &BTreeMap<ProviderId, Arc<dyn CommitteeProvider>>,
    config: &CommitteeConfig,
    case_id: &CaseId,
    task_id: &TaskId,
    pack: &EvidencePack,
    evidence: &dyn EvidenceSink,
) -> Result<CommitteeOutcome, CommitteeError> {
    let selection = select_providers(&config.pool, case_id, config.want);

    let (succeeded, failed) = tokio::time::timeout(
        config.committee_timeout,
        invoke_providers(providers, &selection.providers, pack, config.per_call_timeout),
    )
    .await
    .map_err(|_| CommitteeError::Overrun(config.committee_timeout))?;

    write_audit_trail(evidence, case_id, task_id, pack, &succeeded, &failed)?;

    if succeeded.len() < config.min_successful {
        return Err(CommitteeError::InsufficientResponses {
            succeeded: succeeded.len(),
            required: config.min_successful,
        });
    }

    let provider_configs: Vec<ProviderConfig> = succeeded.iter().map(|(c, _, _)| c.clone()).collect();
    let responses: Vec<(ProviderConfig, StrictProviderResponse)> =
        succeeded.iter().map(|(c, r, _)| (c.clone(), r.clone())).collect();

    let aggregated = aggregate_all(&provider_configs, &responses, selection.providers.len(), config.policy);

    let overall_confidence = mean_confidence(&succeeded);

    let requires_human_review = aggregated
        .iter()
        .any(|agg| !auto_accepts(agg, overall_confidence, config.policy));

    let outputs = succeeded
        .into_iter()
        .map(|(provider_config, response, elapsed_ms)| to_provider_output(provider_config, &response, elapsed_ms))
        .collect();

    Ok(CommitteeOutcome {
        result: CommitteeResult {
            task_id: task_id.clone(),
            outputs,
            aggregated,
        },
        diversity_downgraded: selection.diversity_downgraded,
        requires_human_review,
    })
}

/// Successful provider contribution: the config that produced it, its
/// response, and the observed call latency.
type Success = (ProviderConfig, StrictProviderResponse, u64);
/// Failed provider contribution: the config that attempted it and why.
type Failure = (ProviderConfig, ProviderCallError);

/// Spawns one call per selected provider and collects successes and
/// failures as they complete, without imposing an ordering on the result.
async fn invoke_providers(
    providers: &BTreeMap<ProviderId, Arc<dyn CommitteeProvider>>,
    selected: &[ProviderConfig],
    pack: &EvidencePack,
    per_call_timeout: Duration,
) -> (Vec<Success>, Vec<Failure>) {
    let mut set = tokio::task::JoinSet::new();
    let mut succeeded = Vec::new();
    let mut failed = Vec::new();
    for provider_config in selected.iter().cloned() {
        let Some(provider) = providers.get(&provider_config.id).cloned() else {
            failed.push((
                provider_config,
                ProviderCallError::Transport("provider not configured".to_string()),
            ));
            continue;
        };
        let pack = pack.clone();
        set.spawn(async move {
            let started = tokio::time::Instant::now();
            let outcome = provider.call(&pack, per_call_timeout).await;
            (provider_config, outcome, started.elapsed().as_millis())
        });
    }

    while let Some(joined) = set.join_next().await {
        let Ok((provider_config, outcome, elapsed_ms)) = joined else {
            continue;
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "per-call latency never approaches u64::MAX milliseconds"
        )]
        let elapsed_ms = elapsed_ms as u64;
        match outcome {
            Ok(response) => succeeded.push((provider_config, response, elapsed_ms)),
            Err(err) => failed.push((provider_config, err)),
        }
    }
    (succeeded, failed)
}

/// Returns the unweighted mean of each successful provider's
/// self-reported overall confidence.
fn mean_confidence(succeeded: &[Success]) -> f64 {
    if succeeded.is_empty() {
        return 0.0;
    }
    #[allow(
        clippy::cast_precision_loss,
        reason = "provider counts per invocation are single digits"
    )]
    let count = succeeded.len() as f64;
    succeeded.iter().map(|(_, response, _)| response.overall_confidence).sum::<f64>() / count
}

/// Converts one successful provider response into the canonical
/// [`ProviderOutput`] shape persisted on the case.
fn to_provider_output(provider_config: ProviderConfig, response: &StrictProviderResponse, latency_ms: u64) -> ProviderOutput {
    ProviderOutput {
        provider_id: provider_config.id,
        family: provider_config.family,
        field_votes: response
            .mappings
            .iter()
            .map(|mapping| FieldVote {
                field_id: mapping.field.clone(),
                value: mapping
                    .selected_column_id
                    .as_ref()
                    .map_or(Value::Null, |column| json!(column.as_str())),
                confidence: mapping.confidence,
            })
            .collect(),
        latency_ms,
    }
}

/// Serialized shape of one committee invocation's audit trail artifact.
#[derive(Serialize)]
struct AuditRecord<'a> {
    /// Evidence pack every provider in this invocation was given.
    evidence_pack: &'a EvidencePack,
    /// Every provider that responded successfully.
    succeeded: Vec<AuditSuccess<'a>>,
    /// Every provider that failed, and why.
    failed: Vec<AuditFailure<'a>>,
}

/// One successful provider's recorded contribution.
#[derive(Serialize)]
struct AuditSuccess<'a> {
    /// Provider identifier.
    provider_id: &'a str,
    /// Decoded response the provider returned.
    response: &'a StrictProviderResponse,
    /// Observed call latency in milliseconds.
    latency_ms: u64,
}

/// One failed provider's recorded contribution.
#[derive(Serialize)]
struct AuditFailure<'a> {
    /// Provider identifier.
    provider_id: &'a str,
    /// Human-readable failure reason.
    error: String,
}

/// Writes the full audit trail for one committee invocation: the evidence
/// pack, every successful response, and every failure.
fn write_audit_trail(
    evidence: &dyn EvidenceSink,
    case_id: &CaseId,
    task_id: &TaskId,
    pack: &EvidencePack,
    succeeded: &[Success],
    failed: &[Failure],
) -> Result<(), EvidenceError> {
    let record = AuditRecord {
        evidence_pack: pack,
        succeeded: succeeded
            .iter()
            .map(|(config, response, latency_ms)| AuditSuccess {
                provider_id: config.id.as_str(),
                response,
                latency_ms: *latency_ms,
            })
            .collect(),
        failed: failed
            .iter()
            .map(|(config, err)| AuditFailure {
                provider_id: config.id.as_str(),
                error: err.to_string(),
            })
            .collect(),
    };

    let bytes = serde_json::to_vec_pretty(&record)
        .map_err(|err| EvidenceError::Store(format!("failed to encode committee audit trail: {err}")))?;

    evidence.write(&EvidenceArtifact {
        path: format!("{}/committee/{}/result.json", case_id.as_str(), task_id.as_str()),
        content_type: Some("application/json".to_string()),
        bytes,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        reason = "Test-only assertions are permitted to unwrap."
    )]

    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use caseflow_core::DetectedLanguage;
    use caseflow_core::EvidenceRef;
    use caseflow_core::ProviderFamily;
    use caseflow_core::Timestamp;

    use super::*;
    use crate::provider::FieldMapping;

    struct StubProvider {
        id: ProviderId,
        family: ProviderFamily,
        response: StrictProviderResponse,
    }

    #[async_trait]
    impl CommitteeProvider for StubProvider {
        fn provider_id(&self) -> &ProviderId {
            &self.id
        }

        fn family(&self) -> ProviderFamily {
            self.family
        }

        async fn call(
            &self,
            _pack: &EvidencePack,
            _timeout: Duration,
        ) -> Result<StrictProviderResponse, ProviderCallError> {
            Ok(self.response.clone())
        }
    }

    struct RecordingSink {
        writes: Mutex<Vec<EvidenceArtifact>>,
    }

    impl EvidenceSink for RecordingSink {
        fn write(&self, artifact: &EvidenceArtifact) -> Result<EvidenceRef, EvidenceError> {
            let uri = format!("mem://{}", artifact.path);
            self.writes.lock().unwrap().push(artifact.clone());
            Ok(EvidenceRef { uri })
        }
    }

    fn pack() -> EvidencePack {
        EvidencePack {
            case_id: CaseId::new("case-1"),
            candidate_headers: vec![],
            sample_values: BTreeMap::new(),
            column_stats: vec![],
            detected_language: DetectedLanguage::English,
            constraints: vec![],
            timestamp: Timestamp::UnixMillis(0),
        }
    }

    fn config(id: &str, family: ProviderFamily) -> ProviderConfig {
        ProviderConfig {
            id: ProviderId::new(id),
            family,
            weight: 1.0,
        }
    }

    fn response(field: &str, column: &str) -> StrictProviderResponse {
        StrictProviderResponse {
            mappings: vec![FieldMapping {
                field: caseflow_core::FieldId::new(field),
                selected_column_id: Some(caseflow_core::ColumnId::new(column)),
                confidence: 0.9,
                reasoning: "test".to_string(),
            }],
            issues: vec![],
            overall_confidence: 0.9,
            processing_time_ms: 5,
        }
    }

    #[tokio::test]
    async fn auto_accepts_unanimous_noncritical_field() {
        let pool = vec![
            config("a", ProviderFamily::OpenAi),
            config("b", ProviderFamily::Anthropic),
            config("c", ProviderFamily::DeepSeek),
        ];
        let mut registry: BTreeMap<ProviderId, Arc<dyn CommitteeProvider>> = BTreeMap::new();
        for provider_config in &pool {
            registry.insert(
                provider_config.id.clone(),
                Arc::new(StubProvider {
                    id: provider_config.id.clone(),
                    family: provider_config.family,
                    response: response("bill_to", "B"),
                }) as Arc<dyn CommitteeProvider>,
            );
        }

        let committee_config = CommitteeConfig {
            pool,
            want: 3,
            min_successful: 2,
            per_call_timeout: Duration::from_secs(1),
            committee_timeout: Duration::from_secs(5),
            policy: AggregationPolicy::default(),
        };

        let sink = RecordingSink {
            writes: Mutex::new(Vec::new()),
        };

        let outcome = run_committee(
            &registry,
            &committee_config,
            &CaseId::new("case-1"),
            &TaskId::new("task-1"),
            &pack(),
            &sink,
        )
        .await
        .unwrap();

        assert!(!outcome.requires_human_review);
        assert_eq!(sink.writes.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn insufficient_responses_when_providers_missing() {
        let pool = vec![config("a", ProviderFamily::OpenAi), config("b", ProviderFamily::Anthropic)];
        let registry: BTreeMap<ProviderId, Arc<dyn CommitteeProvider>> = BTreeMap::new();

        let committee_config = CommitteeConfig {
            pool,
            want: 2,
            min_successful: 2,
            per_call_timeout: Duration::from_secs(1),
            committee_timeout: Duration::from_secs(5),
            policy: AggregationPolicy::default(),
        };

        let sink = RecordingSink {
            writes: Mutex::new(Vec::new()),
        };

        let err = run_committee(
            &registry,
            &committee_config,
            &CaseId::new("case-2"),
            &TaskId::new("task-2"),
            &pack(),
            &sink,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CommitteeError::InsufficientResponses { succeeded: 0, required: 2 }));
        assert_eq!(sink.writes.lock().unwrap().len(), 1);
    }
}
