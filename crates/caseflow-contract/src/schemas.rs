// caseflow-contract/src/schemas.rs
// ============================================================================
// Module: Contract Schemas
// Description: JSON schema builders for the canonical wire shapes exchanged
//              at caseflow's component boundaries.
// Purpose: Provide a single source of truth for validating evidence packs,
//          provider responses, committee results, and canonical orders.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! This module defines JSON Schema payloads mirroring the wire types in
//! `caseflow-core` and `caseflow-committee`: the bounded evidence pack handed
//! to committee providers, the strict-schema provider response every
//! provider call must satisfy, the aggregated committee result, and the
//! canonical order produced by the parser. The provider-response schema is
//! kept in lockstep with
//! `caseflow_committee::provider::provider_output_schema`, the schema the
//! runtime actually validates live provider responses against; this module
//! additionally exposes the evidence-pack, committee-result, and
//! canonical-order shapes for docs and client SDKs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Public Schema Entrypoints
// ============================================================================

/// Returns the JSON schema for the bounded evidence pack handed to every
/// committee provider.
#[must_use]
pub fn evidence_pack_schema() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "caseflow://contract/schemas/evidence-pack.schema.json",
        "title": "EvidencePack",
        "description": "Bounded, PII-minimized input handed to committee providers.",
        "type": "object",
        "additionalProperties": false,
        "required": [
            "case_id",
            "candidate_headers",
            "sample_values",
            "column_stats",
            "detected_language",
            "constraints",
            "timestamp"
        ],
        "properties": {
            "case_id": schema_for_identifier("Case the pack was built for."),
            "candidate_headers": {
                "type": "array",
                "items": candidate_header_schema()
            },
            "sample_values": {
                "type": "object",
                "description": "Column id to at most 5 sample values.",
                "additionalProperties": {
                    "type": "array",
                    "items": { "type": "string" },
                    "maxItems": 5
                }
            },
            "column_stats": {
                "type": "array",
                "items": column_stat_schema()
            },
            "detected_language": detected_language_schema(),
            "constraints": schema_for_string_array("Free-text constraints every provider must honor."),
            "timestamp": timestamp_schema()
        }
    })
}

/// Returns the strict JSON schema every committee provider response must
/// satisfy. Kept identical in shape to
/// `caseflow_committee::provider::provider_output_schema` so the generated
/// contract bundle is self-contained.
#[must_use]
pub fn strict_provider_response_schema() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "caseflow://contract/schemas/provider-response.schema.json",
        "title": "StrictProviderResponse",
        "description": "Strict-schema response a single committee provider call must produce.",
        "type": "object",
        "additionalProperties": false,
        "required": ["mappings", "issues", "overallConfidence", "processingTimeMs"],
        "properties": {
            "mappings": {
                "type": "array",
                "items": field_mapping_schema()
            },
            "issues": schema_for_string_array("Free-text issues flagged while reasoning."),
            "overallConfidence": unit_interval_schema("Provider's overall confidence."),
            "processingTimeMs": schema_for_int("Provider-reported processing time in milliseconds.")
        }
    })
}

/// Returns the JSON schema for the aggregated committee result written to
/// the evidence store.
#[must_use]
pub fn committee_result_schema() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "caseflow://contract/schemas/committee-result.schema.json",
        "title": "CommitteeResult",
        "description": "Full result of a single committee invocation for one case.",
        "type": "object",
        "additionalProperties": false,
        "required": ["task_id", "outputs", "aggregated"],
        "properties": {
            "task_id": schema_for_identifier("Task identifier for this committee invocation."),
            "outputs": {
                "type": "array",
                "items": provider_output_schema()
            },
            "aggregated": {
                "type": "array",
                "items": aggregated_votes_schema()
            }
        }
    })
}

/// Returns the JSON schema for the canonical order produced by the parser.
#[must_use]
pub fn canonical_order_schema() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "caseflow://contract/schemas/canonical-order.schema.json",
        "title": "CanonicalOrder",
        "description": "Normalized purchase order contents, independent of source layout.",
        "type": "object",
        "additionalProperties": false,
        "required": ["customer_name_raw", "line_items", "totals", "schema"],
        "properties": {
            "customer_name_raw": schema_for_string("Customer name as stated on the order."),
            "resolved_customer": schema_for_identifier("Resolved customer reference, once resolved."),
            "currency": schema_for_string("ISO 4217 currency code, when determinable."),
            "order_date": schema_for_string("Order date as stated on the workbook, YYYY-MM-DD."),
            "line_items": {
                "type": "array",
                "items": line_item_schema()
            },
            "totals": totals_schema(),
            "schema": {
                "type": "array",
                "items": schema_inference_schema()
            }
        }
    })
}

// ============================================================================
// SECTION: Evidence Pack Components
// ============================================================================

/// Schema for a single candidate header entry.
fn candidate_header_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["column_id", "candidate_fields"],
        "properties": {
            "column_id": schema_for_identifier("Column identifier."),
            "header_text": schema_for_string("Header text observed for the column, if detected."),
            "candidate_fields": {
                "type": "array",
                "items": schema_for_identifier("Canonical field this column could map to.")
            }
        }
    })
}

/// Schema for per-column summary statistics.
fn column_stat_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["column", "non_empty_count", "numeric_ratio", "sample_values"],
        "properties": {
            "column": schema_for_identifier("Column identifier."),
            "header_text": schema_for_string("Header text observed for the column, if detected."),
            "non_empty_count": schema_for_int("Count of non-empty cells sampled in the column."),
            "numeric_ratio": unit_interval_schema("Fraction of sampled cells that parsed as numeric."),
            "sample_values": schema_for_string_array("Small sample of raw cell values.")
        }
    })
}

/// Schema for the detected-language enum.
fn detected_language_schema() -> Value {
    json!({
        "type": "string",
        "enum": ["english", "persian", "arabic", "mixed", "unknown"],
        "description": "Detected header/content language for a sheet."
    })
}

// ============================================================================
// SECTION: Provider Response Components
// ============================================================================

/// Schema for a single provider-proposed field mapping.
fn field_mapping_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["field", "confidence", "reasoning"],
        "properties": {
            "field": schema_for_identifier("Canonical field this mapping applies to."),
            "selectedColumnId": schema_for_identifier(
                "Column the provider selected, or omitted/null if none was plausible. \
                 Must appear among the originating evidence pack's candidate columns."
            ),
            "confidence": unit_interval_schema("Provider-reported confidence."),
            "reasoning": schema_for_string("Free-text justification, retained for audit, never parsed.")
        }
    })
}

// ============================================================================
// SECTION: Committee Result Components
// ============================================================================

/// Schema for one provider's full response to a committee invocation.
fn provider_output_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["provider_id", "family", "field_votes", "latency_ms"],
        "properties": {
            "provider_id": schema_for_identifier("Provider that produced this output."),
            "family": provider_family_schema(),
            "field_votes": {
                "type": "array",
                "items": field_vote_schema()
            },
            "latency_ms": schema_for_int("Observed call latency in milliseconds.")
        }
    })
}

/// Schema for a single provider's vote on one canonical field.
fn field_vote_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["field_id", "value", "confidence"],
        "properties": {
            "field_id": schema_for_identifier("Canonical field being voted on."),
            "value": schema_for_json_value("The value the provider proposed for the field."),
            "confidence": unit_interval_schema("Provider-reported confidence.")
        }
    })
}

/// Schema for the provider-family enum used to enforce selection diversity.
fn provider_family_schema() -> Value {
    json!({
        "type": "string",
        "enum": ["open_ai", "anthropic", "deep_seek", "google", "x_ai"],
        "description": "Model family backing a committee provider."
    })
}

/// Schema for the per-field aggregated, weighted vote outcome.
fn aggregated_votes_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["field_id", "consensus", "supporting_weight", "dissenting_weight"],
        "properties": {
            "field_id": schema_for_identifier("Field the aggregation applies to."),
            "consensus": consensus_schema(),
            "chosen_value": schema_for_json_value("Value chosen by weighted plurality, when one exists."),
            "supporting_weight": schema_for_number("Total weight supporting chosen_value."),
            "dissenting_weight": schema_for_number("Total weight cast for any other value.")
        }
    })
}

/// Schema for the four-way consensus classification.
fn consensus_schema() -> Value {
    json!({
        "type": "string",
        "enum": ["unanimous", "majority", "split", "no_consensus"],
        "description": "Classification of agreement across a field's weighted votes."
    })
}

// ============================================================================
// SECTION: Canonical Order Components
// ============================================================================

/// Schema for a single evidence-linked line item.
fn line_item_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["row", "description", "quantity", "unit_price", "line_total", "evidence"],
        "properties": {
            "row": schema_for_int("Zero-based row index within the source sheet."),
            "sku": schema_for_string("Stock keeping unit as read from the workbook, if present."),
            "gtin": schema_for_string("GTIN/EAN/UPC code as read from the workbook, if present."),
            "description": schema_for_string("Free-text item description."),
            "quantity": schema_for_decimal_string("Ordered quantity."),
            "unit_price": schema_for_decimal_string("Unit price in the order's currency."),
            "line_total": schema_for_decimal_string("Extended line total as stated on the order."),
            "evidence": {
                "type": "array",
                "items": field_evidence_pair_schema()
            },
            "resolved_item": schema_for_identifier("Resolved catalog item reference, once resolved.")
        }
    })
}

/// Schema for a `(field_id, evidence_cell)` pair.
fn field_evidence_pair_schema() -> Value {
    json!({
        "type": "array",
        "minItems": 2,
        "maxItems": 2,
        "prefixItems": [
            schema_for_identifier("Canonical field the evidence cell backs."),
            evidence_cell_schema()
        ]
    })
}

/// Schema for a single evidence cell pointing at a source cell.
fn evidence_cell_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["sheet", "row", "column", "raw_value"],
        "properties": {
            "sheet": schema_for_string("Sheet the value was read from."),
            "row": schema_for_int("Zero-based row offset."),
            "column": schema_for_identifier("Column identifier (header-derived or positional)."),
            "raw_value": schema_for_string("Raw cell text as read from the workbook."),
            "normalized_value": schema_for_string("Normalized value, when normalization applied.")
        }
    })
}

/// Schema for order-level totals.
fn totals_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["subtotal", "total"],
        "properties": {
            "subtotal": schema_for_decimal_string("Sum of line totals before tax."),
            "tax": schema_for_decimal_string("Tax amount, when present."),
            "total": schema_for_decimal_string("Grand total as stated on the order.")
        }
    })
}

/// Schema for a sheet's header/column inference result.
fn schema_inference_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["sheet", "column_roles", "column_stats", "detected_language"],
        "properties": {
            "sheet": schema_for_string("Sheet the inference was performed against."),
            "header_row_index": schema_for_int("Zero-based row index of the detected header, when found."),
            "column_roles": {
                "type": "array",
                "items": {
                    "type": "array",
                    "minItems": 2,
                    "maxItems": 2,
                    "prefixItems": [
                        schema_for_identifier("Column identifier."),
                        schema_for_identifier("Canonical field assigned to the column.")
                    ]
                }
            },
            "column_stats": {
                "type": "array",
                "items": column_stat_schema()
            },
            "detected_language": detected_language_schema()
        }
    })
}

// ============================================================================
// SECTION: Shared Primitive Helpers
// ============================================================================

/// Schema fragment for a stable string identifier.
fn schema_for_identifier(description: &str) -> Value {
    json!({ "type": "string", "minLength": 1, "description": description })
}

/// Schema fragment for free text.
fn schema_for_string(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

/// Schema fragment for a non-negative integer.
fn schema_for_int(description: &str) -> Value {
    json!({ "type": "integer", "minimum": 0, "description": description })
}

/// Schema fragment for a plain number.
fn schema_for_number(description: &str) -> Value {
    json!({ "type": "number", "description": description })
}

/// Schema fragment for a value confined to `[0, 1]`.
fn unit_interval_schema(description: &str) -> Value {
    json!({ "type": "number", "minimum": 0.0, "maximum": 1.0, "description": description })
}

/// Schema fragment for a list of free-text strings.
fn schema_for_string_array(description: &str) -> Value {
    json!({ "type": "array", "items": { "type": "string" }, "description": description })
}

/// Schema fragment for an arbitrary JSON value (provider-proposed field
/// values are not constrained to a single JSON type).
fn schema_for_json_value(description: &str) -> Value {
    json!({ "description": description })
}

/// Schema fragment for an exact-decimal value serialized as a numeric string
/// (caseflow never represents money or quantity as `f64`).
fn schema_for_decimal_string(description: &str) -> Value {
    json!({
        "type": "string",
        "pattern": "^-?[0-9]+(\\.[0-9]+)?$",
        "description": description
    })
}

/// Schema fragment for an RFC 3339 timestamp.
fn timestamp_schema() -> Value {
    json!({ "type": "string", "format": "date-time", "description": "RFC 3339 timestamp." })
}

/// Returns the bundle of all canonical schemas keyed by file name, used by
/// [`crate::contract::ContractBuilder`] and by schema-validation tests.
#[must_use]
pub fn all_schemas() -> Map<String, Value> {
    let mut schemas = Map::new();
    schemas.insert(String::from("evidence-pack.schema.json"), evidence_pack_schema());
    schemas.insert(
        String::from("provider-response.schema.json"),
        strict_provider_response_schema(),
    );
    schemas.insert(String::from("committee-result.schema.json"), committee_result_schema());
    schemas.insert(String::from("canonical-order.schema.json"), canonical_order_schema());
    schemas
}
