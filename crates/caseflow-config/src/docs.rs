// caseflow-config/src/docs.rs
// ============================================================================
// Module: Config Docs Generator
// Description: Markdown generator for caseflow.toml documentation.
// Purpose: Keep config docs in sync with the canonical config model.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Generates `Docs/configuration/caseflow.toml.md` from the canonical
//! configuration model. This output is deterministic.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;

use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default output path for generated configuration docs.
const DOCS_PATH: &str = "Docs/configuration/caseflow.toml.md";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when generating or verifying config docs.
#[derive(Debug, Error)]
pub enum DocsError {
    /// IO failure while reading or writing docs.
    #[error("docs io error: {0}")]
    Io(String),
    /// Generated docs do not match the committed file.
    #[error("docs drift: {0}")]
    Drift(String),
}

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Generates the configuration markdown documentation.
#[must_use]
pub fn config_docs_markdown() -> String {
    let mut out = String::new();

    out.push_str("<!--\n");
    out.push_str("Docs/configuration/caseflow.toml.md\n");
    out.push_str("============================================================================\n");
    out.push_str("Document: Caseflow Configuration Reference\n");
    out.push_str("Generated: This file is auto-generated; do not edit manually.\n");
    out.push_str("============================================================================\n");
    out.push_str("-->\n\n");

    out.push_str("# caseflow.toml Configuration\n\n");
    out.push_str("## Overview\n\n");
    out.push_str(
        "`caseflow.toml` configures the ingress port, workflow task queue, committee pool and \
         thresholds, evidence retention period, external accounting catalog endpoint, and evidence \
         blob container prefix. All scalar leaves may be overridden by `CASEFLOW_<SECTION>_<KEY>` \
         environment variables. Loading fails closed: a malformed or out-of-range value is a \
         `CONFIGURATION_ERROR` raised at startup.\n\n",
    );

    out.push_str("## `[ingress]`\n\n");
    out.push_str("| Field | Type | Default | Env override |\n|---|---|---|---|\n");
    out.push_str("| `port` | integer | `7443` | `CASEFLOW_INGRESS_PORT` |\n\n");

    out.push_str("## `[workflow]`\n\n");
    out.push_str("| Field | Type | Default | Env override |\n|---|---|---|---|\n");
    out.push_str("| `task_queue` | string | `caseflow-orders` | `CASEFLOW_WORKFLOW_TASK_QUEUE` |\n\n");

    out.push_str("## `[committee]`\n\n");
    out.push_str("| Field | Type | Default | Env override |\n|---|---|---|---|\n");
    out.push_str("| `providers` | array of `{id, family, weight}` | `[]` | (file only) |\n");
    out.push_str(
        "| `consensus_threshold` | number in `[0,1]` | `0.66` | \
         `CASEFLOW_COMMITTEE_CONSENSUS_THRESHOLD` |\n",
    );
    out.push_str(
        "| `confidence_threshold` | number in `[0,1]` | `0.75` | \
         `CASEFLOW_COMMITTEE_CONFIDENCE_THRESHOLD` |\n",
    );
    out.push_str("| `min_successful` | integer | `2` | `CASEFLOW_COMMITTEE_MIN_SUCCESSFUL` |\n");
    out.push_str("| `timeout_ms` | integer | `30000` | `CASEFLOW_COMMITTEE_TIMEOUT_MS` |\n\n");
    out.push_str(
        "`family` is one of `open_ai`, `anthropic`, `deep_seek`, `google`, `x_ai`. The pool must \
         contain at least `min_successful` providers. Quorum for consensus classification is fixed \
         at `ceil(2N/3)` in `caseflow-committee::aggregate`; `consensus_threshold` is validated \
         against this fraction but is not itself fed into the formula.\n\n",
    );

    out.push_str("## `[retention]`\n\n");
    out.push_str("| Field | Type | Default | Env override |\n|---|---|---|---|\n");
    out.push_str("| `days` | integer, minimum `1825` | `1825` | `CASEFLOW_RETENTION_DAYS` |\n\n");

    out.push_str("## `[external_catalog]`\n\n");
    out.push_str("| Field | Type | Default | Env override |\n|---|---|---|---|\n");
    out.push_str("| `base_url` | string, `http(s)://` | (required) | `CASEFLOW_EXTERNAL_CATALOG_BASE_URL` |\n");
    out.push_str(
        "| `credentials_ref` | string | (required) | `CASEFLOW_EXTERNAL_CATALOG_CREDENTIALS_REF` |\n\n",
    );

    out.push_str("## `[blob]`\n\n");
    out.push_str("| Field | Type | Default | Env override |\n|---|---|---|---|\n");
    out.push_str("| `container_prefix` | string | `caseflow` | `CASEFLOW_BLOB_CONTAINER_PREFIX` |\n");

    out
}

/// Writes the generated docs to the standard location.
///
/// # Errors
///
/// Returns [`DocsError`] when file output fails.
pub fn write_config_docs(path: Option<&Path>) -> Result<(), DocsError> {
    let path = path.unwrap_or_else(|| Path::new(DOCS_PATH));
    fs::write(path, config_docs_markdown().as_bytes()).map_err(|err| DocsError::Io(err.to_string()))
}

/// Verifies the on-disk docs match the generated output.
///
/// # Errors
///
/// Returns [`DocsError`] when the docs drift or cannot be read.
pub fn verify_config_docs(path: Option<&Path>) -> Result<(), DocsError> {
    let path = path.unwrap_or_else(|| Path::new(DOCS_PATH));
    let existing = fs::read_to_string(path).map_err(|err| DocsError::Io(err.to_string()))?;
    if existing != config_docs_markdown() {
        return Err(DocsError::Drift(format!("docs mismatch: {}", path.display())));
    }
    Ok(())
}
