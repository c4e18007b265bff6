#![cfg_attr(
    test,
    allow(
        clippy::panic,
        clippy::print_stdout,
        clippy::print_stderr,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::use_debug,
        clippy::dbg_macro,
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result,
        reason = "Test-only output and panic-based assertions are permitted."
    )
)]
// caseflow-cli/src/main.rs
// ============================================================================
// Module: Caseflow CLI Entry Point
// Description: Command dispatcher for the ingress server, case replay,
//              config validation, and offline committee weight calibration.
// Purpose: Provide the single operator binary for running and inspecting a
//          caseflow deployment.
// Dependencies: caseflow-broker, caseflow-config, caseflow-core,
//               caseflow-ingress, caseflow-store-sqlite, clap, serde_json,
//               thiserror, tokio
// ============================================================================

//! ## Overview
//! `caseflow` bundles the four operator-facing surfaces this project needs
//! outside of the workflow engine itself: starting the ingress HTTP server,
//! replaying a persisted case's event history to verify it still folds to
//! the same state, validating a configuration file before a deploy, and
//! running an offline committee weight calibration pass whose output is
//! hand-copied into `caseflow.toml`: weights are configuration, never
//! mutated on the workflow's critical path.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use caseflow_broker::InlineSource;
use caseflow_config::CaseflowConfig;
use caseflow_config::CommitteeProviderConfig;
use caseflow_config::ConfigError;
use caseflow_core::Case;
use caseflow_core::CaseId;
use caseflow_core::CaseState;
use caseflow_core::CaseStore;
use caseflow_core::FingerprintIndex;
use caseflow_core::FingerprintIndexError;
use caseflow_core::InMemoryCaseStore;
use caseflow_core::InMemoryFingerprintIndex;
use caseflow_core::ProviderFamily;
use caseflow_core::StoreError;
use caseflow_core::TenantId;
use caseflow_core::replay;
use caseflow_ingress::AppState;
use caseflow_ingress::build_router;
use caseflow_ingress::serve_plain;
use caseflow_ingress::serve_tls;
use caseflow_store_sqlite::SqliteCaseStore;
use caseflow_store_sqlite::SqliteStoreConfig;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "caseflow", arg_required_else_help = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the ingress HTTP server.
    Serve(ServeArgs),
    /// Replay a persisted case's event history and report its state.
    Replay(ReplayArgs),
    /// Validate a configuration file without starting anything.
    ValidateConfig(ValidateConfigArgs),
    /// Run an offline committee weight calibration pass.
    CalibrateWeights(CalibrateWeightsArgs),
}

/// Arguments for the `serve` command.
#[derive(Args, Debug)]
struct ServeArgs {
    /// Path to `caseflow.toml` (defaults to `CASEFLOW_CONFIG` or `./caseflow.toml`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Path to a `SQLite` database file for the case store. When omitted the
    /// server runs against an in-memory store, suitable only for local
    /// development: state does not survive a restart.
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,
    /// TLS certificate (PEM). Requires `--key`. Without both, the server
    /// binds plain HTTP, which is refused for any bind address other than
    /// loopback.
    #[arg(long, value_name = "PATH")]
    cert: Option<PathBuf>,
    /// TLS private key (PEM). Requires `--cert`.
    #[arg(long, value_name = "PATH")]
    key: Option<PathBuf>,
}

/// Arguments for the `replay` command.
#[derive(Args, Debug)]
struct ReplayArgs {
    /// Path to the `SQLite` database file holding the persisted case.
    #[arg(long, value_name = "PATH")]
    db: PathBuf,
    /// Tenant the case belongs to.
    #[arg(long)]
    tenant: String,
    /// Case identifier to replay.
    #[arg(long)]
    case: String,
}

/// Arguments for the `validate-config` command.
#[derive(Args, Debug)]
struct ValidateConfigArgs {
    /// Path to `caseflow.toml` (defaults to `CASEFLOW_CONFIG` or `./caseflow.toml`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for the `calibrate-weights` command.
#[derive(Args, Debug)]
struct CalibrateWeightsArgs {
    /// Path to a JSON file with one `{"id", "family", "accuracy"}` entry per
    /// provider, `accuracy` being the golden-set hit rate in `[0, 1]`.
    #[arg(long, value_name = "PATH")]
    golden_set: PathBuf,
    /// Optional output path for the generated TOML fragment; defaults to
    /// stdout.
    #[arg(long, value_name = "PATH")]
    out: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper.
#[derive(Debug, Error)]
#[error("{0}")]
struct CliError(String);

impl CliError {
    /// Builds a [`CliError`] from a display-able cause.
    fn from_display(cause: impl std::fmt::Display) -> Self {
        Self(cause.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::from_display(err)
    }
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        Self::from_display(err)
    }
}

impl From<FingerprintIndexError> for CliError {
    fn from(err: FingerprintIndexError) -> Self {
        Self::from_display(err)
    }
}

/// CLI result alias.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Serve(args) => command_serve(args).await,
        Commands::Replay(args) => command_replay(&args),
        Commands::ValidateConfig(args) => command_validate_config(&args),
        Commands::CalibrateWeights(args) => command_calibrate_weights(&args),
    }
}

// ============================================================================
// SECTION: Serve Command
// ============================================================================

/// A case store that is also a fingerprint index, sharing one backing
/// connection so both traits observe the same on-disk data. Thin delegation
/// wrapper, mirroring `caseflow_core::SharedCaseStore`'s own shape.
#[derive(Clone)]
struct SharedSqliteStore(Arc<SqliteCaseStore>);

impl CaseStore for SharedSqliteStore {
    fn load(&self, tenant_id: &TenantId, case_id: &CaseId) -> Result<Option<Case>, StoreError> {
        self.0.load(tenant_id, case_id)
    }

    fn save(&self, case: &Case) -> Result<(), StoreError> {
        self.0.save(case)
    }
}

/// Executes the `serve` command.
async fn command_serve(args: ServeArgs) -> CliResult<ExitCode> {
    let config = CaseflowConfig::load(args.config.as_deref())?;

    let state = match &args.db {
        Some(path) => {
            let store = Arc::new(
                SqliteCaseStore::open(&SqliteStoreConfig {
                    path: path.clone(),
                    busy_timeout_ms: 5_000,
                    journal_mode: caseflow_store_sqlite::SqliteStoreMode::Wal,
                    sync_mode: caseflow_store_sqlite::SqliteSyncMode::Full,
                })
                .map_err(CliError::from_display)?,
            );
            let guard: Arc<dyn FingerprintIndex + Send + Sync> = store.clone();
            AppState::new(SharedSqliteStore(store), guard, InlineSource::new())
        }
        None => {
            write_stderr_line(
                "no --db given; running against an in-memory case store (state is lost on restart)",
            );
            AppState::new(
                InMemoryCaseStore::new(),
                Arc::new(InMemoryFingerprintIndex::new()),
                InlineSource::new(),
            )
        }
    };

    let router = build_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.ingress.port));

    match (&args.cert, &args.key) {
        (Some(cert), Some(key)) => {
            serve_tls(router, addr, cert, key).await.map_err(CliError::from_display)?;
        }
        (None, None) => {
            if !addr.ip().is_loopback() {
                write_stderr_line(
                    "refusing to bind a non-loopback address without --cert/--key; pass \
                     --cert/--key or bind to 127.0.0.1",
                );
                return Ok(ExitCode::FAILURE);
            }
            write_stderr_line("no --cert/--key given; serving plain HTTP on loopback only");
            serve_plain(router, addr).await.map_err(CliError::from_display)?;
        }
        _ => {
            return Err(CliError("--cert and --key must be given together".to_string()));
        }
    }

    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Replay Command
// ============================================================================

/// Returns a stable label for a case state, used for CLI output.
const fn case_state_label(state: CaseState) -> &'static str {
    match state {
        CaseState::Received => "received",
        CaseState::Parsing => "parsing",
        CaseState::Blocked => "blocked",
        CaseState::Validating => "validating",
        CaseState::AwaitingCommittee => "awaiting_committee",
        CaseState::ResolvingCustomer => "resolving_customer",
        CaseState::ResolvingItems => "resolving_items",
        CaseState::AwaitingApproval => "awaiting_approval",
        CaseState::Drafting => "drafting",
        CaseState::QueuedForWriter => "queued_for_writer",
        CaseState::Completed => "completed",
        CaseState::Cancelled => "cancelled",
        CaseState::Failed => "failed",
    }
}

/// Executes the `replay` command: reloads a persisted case and folds its
/// recorded history over a fresh record, to confirm the stored `state`
/// still matches what the transition table derives.
fn command_replay(args: &ReplayArgs) -> CliResult<ExitCode> {
    let store = SqliteCaseStore::open(&SqliteStoreConfig {
        path: args.db.clone(),
        busy_timeout_ms: 5_000,
        journal_mode: caseflow_store_sqlite::SqliteStoreMode::Wal,
        sync_mode: caseflow_store_sqlite::SqliteSyncMode::Full,
    })
    .map_err(CliError::from_display)?;

    let tenant_id = TenantId::new(args.tenant.clone());
    let case_id = CaseId::new(args.case.clone());
    let stored = store
        .load(&tenant_id, &case_id)?
        .ok_or_else(|| CliError(format!("no case {} found for tenant {}", args.case, args.tenant)))?;

    let fresh = Case {
        tenant_id: stored.tenant_id.clone(),
        case_id: stored.case_id.clone(),
        submitter_id: stored.submitter_id.clone(),
        state: CaseState::Received,
        created_at: stored.created_at,
        updated_at: stored.created_at,
        order: None,
        issues: Vec::new(),
        committee_result: None,
        fingerprint: None,
        draft_reference: None,
        history: Vec::new(),
    };
    let replayed = replay(fresh, stored.history.clone()).map_err(CliError::from_display)?;

    write_stdout_line(&format!("history events:  {}", stored.history.len()));
    write_stdout_line(&format!("stored state:    {}", case_state_label(stored.state)));
    write_stdout_line(&format!("replayed state:  {}", case_state_label(replayed.state)));

    if replayed.state == stored.state {
        write_stdout_line("replay matches stored state");
        Ok(ExitCode::SUCCESS)
    } else {
        write_stderr_line("replay diverged from stored state");
        Ok(ExitCode::FAILURE)
    }
}

// ============================================================================
// SECTION: Validate-Config Command
// ============================================================================

/// Executes the `validate-config` command.
fn command_validate_config(args: &ValidateConfigArgs) -> CliResult<ExitCode> {
    let config = CaseflowConfig::load(args.config.as_deref())?;
    write_stdout_line("configuration is valid");
    write_stdout_line(&format!("ingress port:        {}", config.ingress.port));
    write_stdout_line(&format!("workflow task queue:  {}", config.workflow.task_queue));
    write_stdout_line(&format!("committee providers:  {}", config.committee.providers.len()));
    write_stdout_line(&format!("retention days:       {}", config.retention.days));
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Calibrate-Weights Command
// ============================================================================

/// One golden-set accuracy measurement for a provider, the input to offline
/// weight calibration.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct GoldenSetEntry {
    /// Configured provider identifier.
    id: String,
    /// Model family.
    family: ProviderFamily,
    /// Accuracy against the curated golden set, in `[0, 1]`.
    accuracy: f64,
}

/// Computes the recommended weight for one provider's golden-set accuracy:
/// `1 / (1 + exp(-10 * (a - 0.5)))`.
fn recommended_weight(accuracy: f64) -> f64 {
    1.0 / (1.0 + (-10.0 * (accuracy - 0.5)).exp())
}

/// Executes the `calibrate-weights` command.
fn command_calibrate_weights(args: &CalibrateWeightsArgs) -> CliResult<ExitCode> {
    let bytes = fs::read(&args.golden_set)
        .map_err(|err| CliError(format!("failed to read {}: {err}", args.golden_set.display())))?;
    let entries: Vec<GoldenSetEntry> = serde_json::from_slice(&bytes)
        .map_err(|err| CliError(format!("failed to parse {}: {err}", args.golden_set.display())))?;
    if entries.is_empty() {
        return Err(CliError("golden set must contain at least one provider entry".to_string()));
    }

    let raw_weights: Vec<f64> = entries.iter().map(|entry| recommended_weight(entry.accuracy)).collect();
    let total: f64 = raw_weights.iter().sum();
    if total <= 0.0 {
        return Err(CliError("calibrated weights summed to zero; check golden set accuracies".to_string()));
    }

    let providers: Vec<CommitteeProviderConfig> = entries
        .iter()
        .zip(raw_weights.iter())
        .map(|(entry, raw)| CommitteeProviderConfig {
            id: entry.id.clone(),
            family: entry.family,
            weight: raw / total,
        })
        .collect();

    #[derive(Serialize)]
    struct CommitteeFragment {
        providers: Vec<CommitteeProviderConfig>,
    }
    #[derive(Serialize)]
    struct ConfigFragment {
        committee: CommitteeFragment,
    }

    let fragment = ConfigFragment {
        committee: CommitteeFragment { providers },
    };
    let rendered = toml::to_string_pretty(&fragment)
        .map_err(|err| CliError(format!("failed to render calibrated weights: {err}")))?;

    match &args.out {
        Some(path) => {
            fs::write(path, &rendered)
                .map_err(|err| CliError(format!("failed to write {}: {err}", path.display())))?;
            write_stdout_line(&format!("wrote calibrated weights to {}", path.display()));
        }
        None => write_stdout_line(rendered.trim_end()),
    }

    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a line to stdout, ignoring write failures (nowhere useful to
/// report them to once stdout itself is broken).
fn write_stdout_line(message: &str) {
    use std::io::Write;
    let mut stdout = std::io::stdout();
    let _ = writeln!(&mut stdout, "{message}");
}

/// Writes a line to stderr, ignoring write failures.
fn write_stderr_line(message: &str) {
    use std::io::Write;
    let mut stderr = std::io::stderr();
    let _ = writeln!(&mut stderr, "{message}");
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    write_stderr_line(message);
    ExitCode::FAILURE
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use caseflow_core::Actor;
    use caseflow_core::Case;
    use caseflow_core::CaseEvent;
    use caseflow_core::CaseEventKind;
    use caseflow_core::CaseState;
    use caseflow_core::HashAlgorithm;
    use caseflow_core::HashDigest;
    use caseflow_core::SubmitterId;
    use caseflow_core::Timestamp;
    use caseflow_core::interfaces::CaseStore;

    use super::*;

    #[test]
    fn recommended_weight_is_midpoint_at_half_accuracy() {
        let weight = recommended_weight(0.5);
        assert!((weight - 0.5).abs() < 1e-9);
    }

    #[test]
    fn recommended_weight_increases_with_accuracy() {
        assert!(recommended_weight(0.95) > recommended_weight(0.6));
    }

    #[test]
    fn validate_config_accepts_the_canonical_example() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("caseflow.toml");
        fs::write(&path, caseflow_config::config_toml_example()).expect("write config");

        let outcome = command_validate_config(&ValidateConfigArgs { config: Some(path) });
        assert!(matches!(outcome, Ok(ExitCode::SUCCESS)));
    }

    #[test]
    fn validate_config_rejects_a_malformed_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("caseflow.toml");
        fs::write(&path, "not valid toml {{{").expect("write config");

        let outcome = command_validate_config(&ValidateConfigArgs { config: Some(path) });
        assert!(outcome.is_err());
    }

    #[test]
    fn calibrate_weights_normalizes_to_one() {
        let dir = tempfile::tempdir().expect("tempdir");
        let golden_set = dir.path().join("golden.json");
        fs::write(
            &golden_set,
            serde_json::json!([
                {"id": "azure-openai-gpt4o", "family": "open_ai", "accuracy": 0.92},
                {"id": "azure-anthropic-claude", "family": "anthropic", "accuracy": 0.95},
                {"id": "azure-deepseek-v3", "family": "deep_seek", "accuracy": 0.81},
            ])
            .to_string(),
        )
        .expect("write golden set");
        let out = dir.path().join("weights.toml");

        let outcome = command_calibrate_weights(&CalibrateWeightsArgs {
            golden_set,
            out: Some(out.clone()),
        });
        assert!(matches!(outcome, Ok(ExitCode::SUCCESS)));

        let rendered = fs::read_to_string(&out).expect("read generated weights");
        let fragment: toml::Value = toml::from_str(&rendered).expect("parse generated weights");
        let providers = fragment
            .get("providers")
            .and_then(toml::Value::as_array)
            .expect("providers array");
        let total: f64 = providers
            .iter()
            .map(|entry| entry.get("weight").and_then(toml::Value::as_float).expect("weight"))
            .sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn calibrate_weights_rejects_an_empty_golden_set() {
        let dir = tempfile::tempdir().expect("tempdir");
        let golden_set = dir.path().join("golden.json");
        fs::write(&golden_set, "[]").expect("write golden set");

        let outcome = command_calibrate_weights(&CalibrateWeightsArgs { golden_set, out: None });
        assert!(outcome.is_err());
    }

    #[test]
    fn replay_matches_the_stored_state_for_a_blocked_case() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = dir.path().join("cases.sqlite3");
        let store = SqliteCaseStore::open(&SqliteStoreConfig {
            path: db.clone(),
            busy_timeout_ms: 5_000,
            journal_mode: caseflow_store_sqlite::SqliteStoreMode::Wal,
            sync_mode: caseflow_store_sqlite::SqliteSyncMode::Full,
        })
        .expect("open sqlite store");

        let tenant_id = TenantId::new("tenant-1");
        let case_id = CaseId::new("case-1");
        let submitter_id = SubmitterId::new("submitter-1");

        let submitted = CaseEvent {
            case_id: case_id.clone(),
            actor: Actor::User {
                submitter_id: submitter_id.clone(),
            },
            time: Timestamp::Logical(0),
            correlation_id: None,
            kind: CaseEventKind::Submitted {
                file_hash: HashDigest::new(HashAlgorithm::Sha256, b"workbook bytes"),
            },
        };
        let parse_failed = CaseEvent {
            case_id: case_id.clone(),
            actor: Actor::System,
            time: Timestamp::Logical(1),
            correlation_id: None,
            kind: CaseEventKind::ParseFailed {
                reason: "FORMULAS_BLOCKED".to_string(),
            },
        };

        let mut case = Case {
            tenant_id: tenant_id.clone(),
            case_id: case_id.clone(),
            submitter_id,
            state: CaseState::Received,
            created_at: Timestamp::Logical(0),
            updated_at: Timestamp::Logical(0),
            order: None,
            issues: Vec::new(),
            committee_result: None,
            fingerprint: None,
            draft_reference: None,
            history: Vec::new(),
        };
        case = caseflow_core::replay(case, vec![submitted, parse_failed]).expect("apply history");
        assert_eq!(case.state, CaseState::Blocked);
        store.save(&case).expect("persist case");

        let outcome = command_replay(&ReplayArgs {
            db,
            tenant: tenant_id.as_str().to_string(),
            case: case_id.as_str().to_string(),
        });
        assert!(matches!(outcome, Ok(ExitCode::SUCCESS)));
    }
}
