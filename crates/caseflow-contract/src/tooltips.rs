// caseflow-contract/src/tooltips.rs
// ============================================================================
// Module: Tooltip Catalog
// Description: Canonical glossary entries for caseflow docs and review UIs.
// Purpose: Provide a stable, sorted term-to-definition catalog sourced from
//          the system's glossary so docs and any human-review surface never
//          drift from the canonical vocabulary.
// Dependencies: std::collections, serde
// ============================================================================

//! ## Overview
//! Tooltips provide short, reusable explanations for the terms that appear
//! throughout caseflow's case records, evidence artifacts, and committee
//! output — the same vocabulary a human reviewer sees when resolving an
//! `AwaitingApproval` case. Keys are stable, values are plain ASCII to keep
//! the catalog portable to any downstream localization pipeline.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Tooltip Types
// ============================================================================

/// A single glossary entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TooltipEntry {
    /// Stable term key.
    pub term: String,
    /// Short display title for the term.
    pub title: String,
    /// One- or two-sentence plain-language description.
    pub description: String,
}

/// The full tooltip manifest: every entry, sorted by term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TooltipManifest {
    /// Glossary entries, sorted and deduplicated by term.
    pub entries: Vec<TooltipEntry>,
}

// ============================================================================
// SECTION: Tooltip Catalog
// ============================================================================

/// Returns the canonical tooltip manifest.
#[must_use]
pub fn tooltips_manifest() -> TooltipManifest {
    let mut entries = raw_entries();
    entries.sort_by(|a, b| a.term.cmp(&b.term));
    entries.dedup_by(|a, b| a.term == b.term);
    TooltipManifest { entries }
}

/// Builds markdown glossary documentation from the tooltip manifest.
#[must_use]
pub fn tooltips_glossary_markdown() -> String {
    let manifest = tooltips_manifest();
    let mut out = String::new();
    out.push_str("# Caseflow Glossary\n\n");
    for entry in &manifest.entries {
        out.push_str("## ");
        out.push_str(&entry.title);
        out.push_str(" (`");
        out.push_str(&entry.term);
        out.push_str("`)\n\n");
        out.push_str(&entry.description);
        out.push_str("\n\n");
    }
    out
}

/// Raw, unsorted glossary entries. Source of truth for the canonical
/// vocabulary; [`tooltips_manifest`] sorts and dedups before publishing.
#[allow(clippy::too_many_lines, reason = "flat glossary catalog is naturally long")]
fn raw_entries() -> Vec<TooltipEntry> {
    vec![
        entry(
            "canonical_order",
            "Canonical Order",
            "Normalized, evidence-linked representation of a parsed spreadsheet order.",
        ),
        entry(
            "case",
            "Case",
            "The unit of work spanning ingest through draft creation; a long-lived entity \
             identified by a UUID.",
        ),
        entry(
            "committee",
            "Committee",
            "A set of at least three diverse LLM providers invoked in parallel on a bounded \
             evidence pack to cross-check an ambiguous structural decision.",
        ),
        entry(
            "consensus",
            "Consensus",
            "Classification of committee agreement for one field: unanimous, majority, split, \
             or no_consensus.",
        ),
        entry(
            "evidence_cell",
            "Evidence Cell",
            "A provenance record linking a canonical field to the exact source spreadsheet cell \
             it was extracted from.",
        ),
        entry(
            "evidence_pack",
            "Evidence Pack",
            "The bounded, PII-minimized input provided to committee providers: candidate \
             headers, up to five sample values per column, and column statistics, never the \
             full workbook.",
        ),
        entry(
            "fingerprint",
            "Fingerprint",
            "The deterministic hash of file hash, customer, sorted line items, and UTC date \
             bucket used to enforce at-most-once draft creation.",
        ),
        entry(
            "external_catalog",
            "External Catalog",
            "The accounting system's customer and item masters, queried during resolution and \
             written to on draft creation.",
        ),
        entry(
            "worker",
            "Worker",
            "A process hosting activity implementations and executing workflow replay.",
        ),
        entry(
            "activity",
            "Activity",
            "A named, side-effecting unit invoked by the workflow; retried per its configured \
             policy and durable across process restarts.",
        ),
        entry(
            "continue_as_new",
            "Continue-as-new",
            "An engine primitive that restarts a workflow with new input while preserving its \
             case id, used when a case returns to Parsing after a reupload.",
        ),
        entry(
            "case_id",
            "Case ID",
            "Opaque identifier for a case; a UUID string in practice, keying the case's \
             workflow instance, store record, and evidence artifacts.",
        ),
        entry(
            "tenant_id",
            "Tenant ID",
            "Identifier scoping a case, its store records, and its evidence artifacts to one \
             caseflow deployment tenant.",
        ),
        entry(
            "correlation_id",
            "Correlation ID",
            "Identifier threaded through every ingress call and audit event for one case's \
             external interactions; synthesized and logged when a caller omits it.",
        ),
        entry(
            "task_id",
            "Task ID",
            "Identifier for a single committee invocation (one per RunCommittee activity call).",
        ),
        entry(
            "provider_id",
            "Provider ID",
            "Configured identifier of one committee member, e.g. azure-openai-gpt4o.",
        ),
        entry(
            "field_id",
            "Field ID",
            "Canonical field identifier a committee vote or evidence cell applies to, e.g. \
             customer_name, sku, gtin.",
        ),
        entry(
            "column_id",
            "Column ID",
            "Evidence-pack column identifier referenced by provider field mappings.",
        ),
        entry(
            "draft_reference",
            "Draft Reference",
            "Reference returned by the external accounting system for a created draft sales \
             order; stable under fingerprint idempotency.",
        ),
        entry(
            "selected_column_id",
            "Selected Column ID",
            "The column a committee provider chose for one canonical field; must appear among \
             the originating evidence pack's candidate columns (invariant I3).",
        ),
        entry(
            "overall_confidence",
            "Overall Confidence",
            "A committee provider's self-reported confidence across all of its field mappings, \
             in the range zero to one.",
        ),
        entry(
            "auto_accept",
            "Auto-accept",
            "The policy under which a field's committee outcome proceeds without human review: \
             unanimous at or above the confidence threshold, or majority at or above a higher \
             threshold; critical fields always require review on any non-unanimous outcome.",
        ),
        entry(
            "requires_human_review",
            "Requires Human Review",
            "Flag set on a committee result when at least one field's outcome failed the \
             auto-accept policy, parking the case in its current resolution stage pending a \
             CorrectionsSubmitted or SelectionsSubmitted signal.",
        ),
        entry(
            "blocker_issue",
            "Blocker Issue",
            "An issue of severity blocker; prevents a case from progressing past its current \
             stage until resolved, and a case in Completed must carry none.",
        ),
        entry(
            "gtin",
            "GTIN",
            "Global Trade Item Number; an 8, 12, 13, or 14 digit product identifier validated \
             against the GS1 check-digit algorithm.",
        ),
        entry(
            "evidence_store",
            "Evidence Store",
            "The write-once, content-addressed blob store holding original files, evidence \
             packs, raw provider outputs, and canonical order JSON for at least five years.",
        ),
        entry(
            "case_store",
            "Case Store",
            "The partitioned store owning Case records and the fingerprint index; single \
             writer per case, the case's own workflow instance.",
        ),
    ]
}

/// Builds a single tooltip entry.
fn entry(term: &str, title: &str, description: &str) -> TooltipEntry {
    TooltipEntry { term: term.to_string(), title: title.to_string(), description: description.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_terms_are_unique_and_sorted() {
        let manifest = tooltips_manifest();
        assert!(!manifest.entries.is_empty());
        let terms: Vec<&str> = manifest.entries.iter().map(|e| e.term.as_str()).collect();
        let mut sorted = terms.clone();
        sorted.sort_unstable();
        assert_eq!(terms, sorted);
        let mut deduped = sorted.clone();
        deduped.dedup();
        assert_eq!(sorted.len(), deduped.len());
    }

    #[test]
    fn manifest_is_ascii() {
        for entry in tooltips_manifest().entries {
            assert!(entry.term.is_ascii());
            assert!(entry.title.is_ascii());
            assert!(entry.description.is_ascii());
        }
    }

    #[test]
    fn manifest_includes_core_terms() {
        let manifest = tooltips_manifest();
        let terms: Vec<&str> = manifest.entries.iter().map(|e| e.term.as_str()).collect();
        for required in ["case", "fingerprint", "evidence_pack", "consensus", "gtin"] {
            assert!(terms.contains(&required), "missing glossary term: {required}");
        }
    }
}
