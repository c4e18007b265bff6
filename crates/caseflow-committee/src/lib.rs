// caseflow-committee/src/lib.rs
// ============================================================================
// Module: Caseflow Committee
// Description: Evidence-bounded multi-provider committee: provider selection,
//              strict-schema calls, and weighted-vote aggregation.
// Purpose: Adjudicate ambiguous header/column decisions by cross-checking
//          several independent providers rather than trusting any single one.
// Dependencies: caseflow-core, async-trait, jsonschema, reqwest, tokio
// ============================================================================

//! ## Overview
//! This crate ships the committee invocation used when a sheet's header or
//! column mapping cannot be resolved with high confidence from deterministic
//! rules alone. A bounded [`EvidencePack`](pack::EvidencePack) is built from
//! schema inference, a family-diverse provider pool is selected
//! deterministically from the case id, every provider's raw response is
//! validated against a strict JSON schema before it is trusted, and the
//! resulting votes are aggregated into a weighted [`caseflow_core::Consensus`]
//! per field. [`run::run_committee`] ties these stages into the single entry
//! point an orchestrating activity calls.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod aggregate;
pub mod http_provider;
pub mod pack;
pub mod provider;
pub mod run;
pub mod selection;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use aggregate::AggregationPolicy;
pub use aggregate::aggregate_all;
pub use aggregate::auto_accepts;
pub use http_provider::HttpCommitteeProvider;
pub use http_provider::HttpProviderConfig;
pub use pack::EvidencePack;
pub use pack::build_evidence_pack;
pub use provider::CommitteeProvider;
pub use provider::ProviderCallError;
pub use provider::ProviderResponseError;
pub use provider::StrictProviderResponse;
pub use provider::validate_response;
pub use run::CommitteeConfig;
pub use run::CommitteeError;
pub use run::CommitteeOutcome;
pub use run::run_committee;
pub use selection::ProviderConfig;
pub use selection::Selection;
pub use selection::select_providers;
