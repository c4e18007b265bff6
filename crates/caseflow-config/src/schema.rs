// caseflow-config/src/schema.rs
// ============================================================================
// Module: Config Schema
// Description: JSON schema builder for caseflow.toml.
// Purpose: Provide canonical validation schema for config artifacts.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! This module defines the JSON Schema for caseflow configuration, generated
//! from the canonical config model so tooling, docs, and validation stay in
//! sync with [`crate::config`].

use serde_json::Value;
use serde_json::json;

use crate::config::MIN_RETENTION_DAYS;

/// Returns the JSON schema for `caseflow.toml`.
#[must_use]
pub fn config_schema() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "CaseflowConfig",
        "type": "object",
        "required": ["external_catalog"],
        "additionalProperties": false,
        "properties": {
            "ingress": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "port": { "type": "integer", "minimum": 1, "maximum": 65535 }
                }
            },
            "workflow": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "task_queue": { "type": "string", "minLength": 1 }
                }
            },
            "committee": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "providers": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "required": ["id", "family", "weight"],
                            "additionalProperties": false,
                            "properties": {
                                "id": { "type": "string", "minLength": 1 },
                                "family": {
                                    "type": "string",
                                    "enum": ["open_ai", "anthropic", "deep_seek", "google", "x_ai"]
                                },
                                "weight": { "type": "number", "minimum": 0.0, "maximum": 1.0 }
                            }
                        }
                    },
                    "consensus_threshold": { "type": "number", "minimum": 0.0, "maximum": 1.0 },
                    "confidence_threshold": { "type": "number", "minimum": 0.0, "maximum": 1.0 },
                    "min_successful": { "type": "integer", "minimum": 1 },
                    "timeout_ms": { "type": "integer", "minimum": 1 }
                }
            },
            "retention": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "days": { "type": "integer", "minimum": MIN_RETENTION_DAYS }
                }
            },
            "external_catalog": {
                "type": "object",
                "required": ["base_url", "credentials_ref"],
                "additionalProperties": false,
                "properties": {
                    "base_url": { "type": "string", "minLength": 1 },
                    "credentials_ref": { "type": "string", "minLength": 1 }
                }
            },
            "blob": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "container_prefix": { "type": "string" }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_is_valid_json_schema() {
        let schema = config_schema();
        assert!(jsonschema::validator_for(&schema).is_ok());
    }
}
