// caseflow-config/src/config.rs
// ============================================================================
// Module: Caseflow Configuration
// Description: Configuration loading and validation for the caseflow
//              workflow engine, ingress, and committee.
// Purpose: Provide strict, fail-closed config parsing.
// Dependencies: caseflow-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration loads as TOML from a path given on the CLI (or the
//! `CASEFLOW_CONFIG` environment variable), after which individual scalar
//! leaves may be overridden by environment variables following the
//! `CASEFLOW_<SECTION>_<KEY>` convention. A malformed or out-of-range
//! configuration is rejected eagerly by [`CaseflowConfig::load`] at startup
//! as `CONFIGURATION_ERROR` rather than surfacing lazily the first time a
//! value is read.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use caseflow_core::ProviderFamily;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "caseflow.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "CASEFLOW_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Minimum retention period in days (at least five years).
pub(crate) const MIN_RETENTION_DAYS: u32 = 1825;
/// Default ingress HTTP port.
const DEFAULT_INGRESS_PORT: u16 = 7443;
/// Default committee per-call provider timeout in milliseconds.
const DEFAULT_COMMITTEE_TIMEOUT_MS: u64 = 30_000;
/// Default minimum number of successful provider responses to aggregate.
const DEFAULT_MIN_SUCCESSFUL: usize = 2;
/// Default quorum fraction documented alongside the committee's fixed
/// `ceil(2N/3)` quorum formula (`caseflow_committee::aggregate`); stored here
/// for schema/docs purposes and cross-checked against that formula at
/// validation time rather than threaded into the aggregation code, which
/// implements the quorum fraction literally.
const DEFAULT_CONSENSUS_THRESHOLD: f64 = 0.66;
/// Default auto-accept overall-confidence threshold for a unanimous field.
const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.75;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Root caseflow configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CaseflowConfig {
    /// Ingress HTTP server configuration.
    #[serde(default)]
    pub ingress: IngressConfig,
    /// Workflow engine configuration.
    #[serde(default)]
    pub workflow: WorkflowConfig,
    /// Committee pool and threshold configuration.
    #[serde(default)]
    pub committee: CommitteeConfig,
    /// Evidence retention configuration.
    #[serde(default)]
    pub retention: RetentionConfig,
    /// External accounting catalog configuration.
    pub external_catalog: ExternalCatalogConfig,
    /// Evidence blob storage configuration.
    #[serde(default)]
    pub blob: BlobConfig,
}

impl CaseflowConfig {
    /// Loads configuration from disk using the default resolution rules,
    /// then applies `CASEFLOW_<SECTION>_<KEY>` environment overrides to
    /// scalar leaves before validating.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading, parsing, overriding, or
    /// validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Applies scalar environment overrides using the
    /// `CASEFLOW_<SECTION>_<KEY>` convention. List-valued fields
    /// (`committee.providers`) are never overridden this way; they must come
    /// from the TOML file.
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = env_var("CASEFLOW_INGRESS_PORT")? {
            self.ingress.port = value
                .parse()
                .map_err(|_| ConfigError::Invalid("CASEFLOW_INGRESS_PORT must be a u16".to_string()))?;
        }
        if let Some(value) = env_var("CASEFLOW_WORKFLOW_TASK_QUEUE")? {
            self.workflow.task_queue = value;
        }
        if let Some(value) = env_var("CASEFLOW_COMMITTEE_CONSENSUS_THRESHOLD")? {
            self.committee.consensus_threshold =
                parse_f64("CASEFLOW_COMMITTEE_CONSENSUS_THRESHOLD", &value)?;
        }
        if let Some(value) = env_var("CASEFLOW_COMMITTEE_CONFIDENCE_THRESHOLD")? {
            self.committee.confidence_threshold =
                parse_f64("CASEFLOW_COMMITTEE_CONFIDENCE_THRESHOLD", &value)?;
        }
        if let Some(value) = env_var("CASEFLOW_COMMITTEE_MIN_SUCCESSFUL")? {
            self.committee.min_successful = value
                .parse()
                .map_err(|_| ConfigError::Invalid("CASEFLOW_COMMITTEE_MIN_SUCCESSFUL must be a usize".to_string()))?;
        }
        if let Some(value) = env_var("CASEFLOW_COMMITTEE_TIMEOUT_MS")? {
            self.committee.timeout_ms = value
                .parse()
                .map_err(|_| ConfigError::Invalid("CASEFLOW_COMMITTEE_TIMEOUT_MS must be a u64".to_string()))?;
        }
        if let Some(value) = env_var("CASEFLOW_RETENTION_DAYS")? {
            self.retention.days = value
                .parse()
                .map_err(|_| ConfigError::Invalid("CASEFLOW_RETENTION_DAYS must be a u32".to_string()))?;
        }
        if let Some(value) = env_var("CASEFLOW_EXTERNAL_CATALOG_BASE_URL")? {
            self.external_catalog.base_url = value;
        }
        if let Some(value) = env_var("CASEFLOW_EXTERNAL_CATALOG_CREDENTIALS_REF")? {
            self.external_catalog.credentials_ref = value;
        }
        if let Some(value) = env_var("CASEFLOW_BLOB_CONTAINER_PREFIX")? {
            self.blob.container_prefix = value;
        }
        Ok(())
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ingress.validate()?;
        self.workflow.validate()?;
        self.committee.validate()?;
        self.retention.validate()?;
        self.external_catalog.validate()?;
        self.blob.validate()?;
        Ok(())
    }
}

/// Ingress HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct IngressConfig {
    /// TCP port the ingress HTTP server binds.
    #[serde(default = "default_ingress_port")]
    pub port: u16,
}

impl Default for IngressConfig {
    fn default() -> Self {
        Self {
            port: default_ingress_port(),
        }
    }
}

impl IngressConfig {
    /// Validates ingress configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Invalid("ingress.port must be non-zero".to_string()));
        }
        Ok(())
    }
}

/// Returns the default ingress port.
const fn default_ingress_port() -> u16 {
    DEFAULT_INGRESS_PORT
}

/// Workflow engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowConfig {
    /// Logical task queue the engine's workers poll.
    #[serde(default = "default_task_queue")]
    pub task_queue: String,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            task_queue: default_task_queue(),
        }
    }
}

impl WorkflowConfig {
    /// Validates workflow configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.task_queue.trim().is_empty() {
            return Err(ConfigError::Invalid("workflow.task_queue must be non-empty".to_string()));
        }
        Ok(())
    }
}

/// Returns the default workflow task queue name.
fn default_task_queue() -> String {
    "caseflow-orders".to_string()
}

/// One configured committee provider entry.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct CommitteeProviderConfig {
    /// Configured provider identifier.
    pub id: String,
    /// Model family, used to enforce pool diversity.
    pub family: ProviderFamily,
    /// Calibrated weight applied during weighted voting (offline
    /// calibration output; never mutated on the workflow's critical path).
    pub weight: f64,
}

impl CommitteeProviderConfig {
    /// Validates one provider pool entry.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.id.trim().is_empty() {
            return Err(ConfigError::Invalid("committee provider id must be non-empty".to_string()));
        }
        if !(0.0..=1.0).contains(&self.weight) {
            return Err(ConfigError::Invalid(format!(
                "committee provider {} weight must be in [0, 1]",
                self.id
            )));
        }
        Ok(())
    }
}

/// Committee pool and threshold configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitteeConfig {
    /// Configured provider pool (`committee.provider-ids`/`committee.weights`
    /// combined into one table per entry).
    #[serde(default)]
    pub providers: Vec<CommitteeProviderConfig>,
    /// Documented quorum fraction; the aggregation code fixes quorum at
    /// `ceil(2N/3)`, so this is validated for consistency rather than fed
    /// into the formula.
    #[serde(default = "default_consensus_threshold")]
    pub consensus_threshold: f64,
    /// Minimum overall confidence for an auto-accepted unanimous field.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
    /// Minimum number of successful provider responses required to
    /// aggregate a committee invocation at all.
    #[serde(default = "default_min_successful")]
    pub min_successful: usize,
    /// Per-provider call timeout in milliseconds.
    #[serde(default = "default_committee_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for CommitteeConfig {
    fn default() -> Self {
        Self {
            providers: Vec::new(),
            consensus_threshold: default_consensus_threshold(),
            confidence_threshold: default_confidence_threshold(),
            min_successful: default_min_successful(),
            timeout_ms: default_committee_timeout_ms(),
        }
    }
}

impl CommitteeConfig {
    /// Validates committee configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.providers.len() < self.min_successful {
            return Err(ConfigError::Invalid(format!(
                "committee pool has {} providers but min_successful requires {}",
                self.providers.len(),
                self.min_successful
            )));
        }
        if !(0.0..=1.0).contains(&self.consensus_threshold) {
            return Err(ConfigError::Invalid("committee.consensus_threshold must be in [0, 1]".to_string()));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ConfigError::Invalid("committee.confidence_threshold must be in [0, 1]".to_string()));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid("committee.timeout_ms must be non-zero".to_string()));
        }
        let mut seen = std::collections::BTreeSet::new();
        for provider in &self.providers {
            provider.validate()?;
            if !seen.insert(provider.id.as_str()) {
                return Err(ConfigError::Invalid(format!("committee provider id {} is duplicated", provider.id)));
            }
        }
        Ok(())
    }
}

/// Returns the default documented consensus quorum fraction.
const fn default_consensus_threshold() -> f64 {
    DEFAULT_CONSENSUS_THRESHOLD
}

/// Returns the default auto-accept confidence threshold.
const fn default_confidence_threshold() -> f64 {
    DEFAULT_CONFIDENCE_THRESHOLD
}

/// Returns the default minimum successful provider count.
const fn default_min_successful() -> usize {
    DEFAULT_MIN_SUCCESSFUL
}

/// Returns the default committee per-call timeout in milliseconds.
const fn default_committee_timeout_ms() -> u64 {
    DEFAULT_COMMITTEE_TIMEOUT_MS
}

/// Evidence retention configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RetentionConfig {
    /// Minimum retention period for evidence artifacts, in days.
    #[serde(default = "default_retention_days")]
    pub days: u32,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            days: default_retention_days(),
        }
    }
}

impl RetentionConfig {
    /// Validates retention configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.days < MIN_RETENTION_DAYS {
            return Err(ConfigError::Invalid(format!(
                "retention.days must be at least {MIN_RETENTION_DAYS} (five years), got {}",
                self.days
            )));
        }
        Ok(())
    }
}

/// Returns the default (minimum) retention period in days.
const fn default_retention_days() -> u32 {
    MIN_RETENTION_DAYS
}

/// External accounting catalog configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalCatalogConfig {
    /// Base URL of the external accounting API.
    pub base_url: String,
    /// Reference to the vault-held OAuth credentials (never the credential
    /// itself; secret vault population is out of scope here).
    pub credentials_ref: String,
}

impl ExternalCatalogConfig {
    /// Validates external catalog configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let trimmed = self.base_url.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::Invalid("external_catalog.base_url must be non-empty".to_string()));
        }
        if !(trimmed.starts_with("https://") || trimmed.starts_with("http://")) {
            return Err(ConfigError::Invalid(
                "external_catalog.base_url must include http:// or https://".to_string(),
            ));
        }
        if self.credentials_ref.trim().is_empty() {
            return Err(ConfigError::Invalid("external_catalog.credentials_ref must be non-empty".to_string()));
        }
        Ok(())
    }
}

/// Evidence blob storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BlobConfig {
    /// Prefix prepended to every evidence storage path
    /// (`orders-incoming/`, `cases/`, `committee-outputs/`, `zoho-writes/`,
    /// `audit/`).
    #[serde(default = "default_blob_container_prefix")]
    pub container_prefix: String,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            container_prefix: default_blob_container_prefix(),
        }
    }
}

impl BlobConfig {
    /// Validates blob configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.container_prefix.contains("..") {
            return Err(ConfigError::Invalid("blob.container_prefix must not contain '..'".to_string()));
        }
        Ok(())
    }
}

/// Returns the default blob container prefix.
fn default_blob_container_prefix() -> String {
    "caseflow".to_string()
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Some(env_path) = env_var(CONFIG_ENV_VAR)? {
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Reads an environment variable, treating non-Unicode values as a
/// configuration error rather than silently ignoring the override.
fn env_var(name: &str) -> Result<Option<String>, ConfigError> {
    match env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => {
            Err(ConfigError::Invalid(format!("{name} is not valid unicode")))
        }
    }
}

/// Parses an environment override as an `f64`, rejecting NaN.
fn parse_f64(name: &str, value: &str) -> Result<f64, ConfigError> {
    let parsed: f64 = value.parse().map_err(|_| ConfigError::Invalid(format!("{name} must be a number")))?;
    if parsed.is_nan() {
        return Err(ConfigError::Invalid(format!("{name} must not be NaN")));
    }
    Ok(parsed)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_config() -> CaseflowConfig {
        CaseflowConfig {
            ingress: IngressConfig::default(),
            workflow: WorkflowConfig::default(),
            committee: CommitteeConfig {
                providers: vec![
                    CommitteeProviderConfig {
                        id: "openai-a".to_string(),
                        family: ProviderFamily::OpenAi,
                        weight: 0.9,
                    },
                    CommitteeProviderConfig {
                        id: "anthropic-a".to_string(),
                        family: ProviderFamily::Anthropic,
                        weight: 0.95,
                    },
                ],
                ..CommitteeConfig::default()
            },
            retention: RetentionConfig::default(),
            external_catalog: ExternalCatalogConfig {
                base_url: "https://accounts.example.com".to_string(),
                credentials_ref: "vault://catalog/oauth".to_string(),
            },
            blob: BlobConfig::default(),
        }
    }

    #[test]
    fn minimal_config_validates() {
        assert!(minimal_config().validate().is_ok());
    }

    #[test]
    fn retention_below_five_years_is_rejected() {
        let mut config = minimal_config();
        config.retention.days = 365;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn committee_pool_smaller_than_min_successful_is_rejected() {
        let mut config = minimal_config();
        config.committee.min_successful = 3;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn confidence_threshold_out_of_range_is_rejected() {
        let mut config = minimal_config();
        config.committee.confidence_threshold = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn non_https_catalog_url_is_rejected() {
        let mut config = minimal_config();
        config.external_catalog.base_url = "accounts.example.com".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn duplicate_provider_ids_are_rejected() {
        let mut config = minimal_config();
        config.committee.providers.push(CommitteeProviderConfig {
            id: "openai-a".to_string(),
            family: ProviderFamily::Google,
            weight: 0.5,
        });
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
