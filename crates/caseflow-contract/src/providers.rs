// caseflow-contract/src/providers.rs
// ============================================================================
// Module: Provider Family Contracts
// Description: Documentation contracts for the committee's model-family pool.
// Purpose: Describe each provider family's transport and calibration notes
//          for docs and operator tooling, independent of any one tenant's
//          configured provider instances.
// Dependencies: caseflow-contract::types
// ============================================================================

//! ## Overview
//! The committee selects providers from a configured pool (§4.4), enforcing
//! family diversity across five model families: OpenAI, Anthropic, DeepSeek,
//! Google, and xAI. This module documents the family-level contract every
//! member is held to — all are reached over the same HTTPS transport
//! (`caseflow_committee::http_provider::HttpCommitteeProvider`) with the
//! same strict-schema response, differing only in endpoint, model name, and
//! calibrated weight, which are tenant configuration rather than part of
//! this contract.

use crate::types::ProviderFamilyContract;

// ============================================================================
// SECTION: Provider Family Contracts
// ============================================================================

/// Returns the canonical provider-family contracts for the committee pool.
#[must_use]
pub fn provider_family_contracts() -> Vec<ProviderFamilyContract> {
    vec![
        family_contract(
            "open_ai",
            "OpenAI",
            "Azure-hosted or direct OpenAI chat-completion endpoints.",
        ),
        family_contract(
            "anthropic",
            "Anthropic",
            "Azure-hosted or direct Anthropic messages endpoints.",
        ),
        family_contract("deep_seek", "DeepSeek", "DeepSeek chat-completion endpoints."),
        family_contract("google", "Google", "Google Gemini generateContent endpoints."),
        family_contract("x_ai", "xAI", "xAI Grok chat-completion endpoints."),
    ]
}

/// Builds a single family contract with the shared transport and
/// calibration notes every family shares.
fn family_contract(family_id: &str, name: &str, description: &str) -> ProviderFamilyContract {
    ProviderFamilyContract {
        family_id: family_id.to_string(),
        name: name.to_string(),
        transport: String::from(
            "HTTPS, via caseflow_committee::http_provider::HttpCommitteeProvider: \
             bounded EvidencePack request body, strict-schema response, a 30s \
             per-call timeout independent of the HTTP client's own timeouts, \
             and a 1 MiB response-size cap.",
        ),
        notes: vec![
            description.to_string(),
            String::from(
                "Selection enforces no two providers from the same family in one \
                 committee invocation unless the pool cannot satisfy the requested \
                 count with diversity, in which case selection falls back to \
                 non-diverse and records the downgrade.",
            ),
            String::from(
                "Weight is offline-calibrated configuration, never mutated on the \
                 workflow critical path: recommended weight = \
                 1 / (1 + exp(-10 * (accuracy - 0.5))), normalized across the pool.",
            ),
        ],
    }
}

// ============================================================================
// SECTION: Markdown Rendering
// ============================================================================

/// Builds markdown documentation for the provider-family contracts.
#[must_use]
pub fn providers_markdown(contracts: &[ProviderFamilyContract]) -> String {
    let mut out = String::new();
    out.push_str("# Caseflow Committee Provider Families\n\n");
    out.push_str(
        "This document summarizes the model families the committee draws its \
         provider pool from. Full machine-readable contracts are in \
         `providers.json`. Per-tenant provider instances (id, endpoint, \
         model, calibrated weight) are configuration, documented in \
         `caseflow.toml.md`, not listed here.\n\n",
    );
    for family in contracts {
        out.push_str("## ");
        out.push_str(&family.name);
        out.push_str(" (`");
        out.push_str(&family.family_id);
        out.push_str("`)\n\n");
        out.push_str("**Transport**\n\n");
        out.push_str(&family.transport);
        out.push_str("\n\n");
        if !family.notes.is_empty() {
            out.push_str("**Notes**\n\n");
            for note in &family.notes {
                out.push_str("- ");
                out.push_str(note);
                out.push('\n');
            }
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_families_with_unique_ids() {
        let contracts = provider_family_contracts();
        assert_eq!(contracts.len(), 5);
        let mut ids: Vec<&str> = contracts.iter().map(|c| c.family_id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn markdown_mentions_every_family() {
        let contracts = provider_family_contracts();
        let markdown = providers_markdown(&contracts);
        for family in &contracts {
            assert!(markdown.contains(&family.name));
        }
    }
}
