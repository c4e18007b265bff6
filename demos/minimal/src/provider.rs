// caseflow-demo-minimal/src/provider.rs
// ============================================================================
// Module: Static Committee Provider
// Description: A CommitteeProvider that always returns a canned response.
// Purpose: Exercise the full committee selection, fan-out, and aggregation
//          path without a network-backed LLM call.
// Dependencies: caseflow-committee, caseflow-core, async-trait
// ============================================================================

//! ## Overview
//! [`StaticProvider`] is deliberately dumb: it ignores the evidence pack it
//! is called with and returns whatever [`caseflow_committee::StrictProviderResponse`]
//! it was constructed with. The committee's selection, fan-out, and
//! aggregation logic is still exercised for real; only the provider call
//! itself is canned, the same way `caseflow-committee`'s own test module
//! stubs a provider.

use std::time::Duration;

use async_trait::async_trait;
use caseflow_committee::CommitteeProvider;
use caseflow_committee::EvidencePack;
use caseflow_committee::ProviderCallError;
use caseflow_committee::StrictProviderResponse;
use caseflow_core::ProviderFamily;
use caseflow_core::ProviderId;

/// A committee provider stub that always returns the same canned response.
pub struct StaticProvider {
    /// Configured provider identifier.
    id: ProviderId,
    /// Model family this stub impersonates.
    family: ProviderFamily,
    /// Response returned from every call.
    response: StrictProviderResponse,
}

impl StaticProvider {
    /// Creates a provider that deterministically returns `response` for
    /// every call, regardless of the evidence pack supplied.
    #[must_use]
    pub const fn new(id: ProviderId, family: ProviderFamily, response: StrictProviderResponse) -> Self {
        Self { id, family, response }
    }
}

#[async_trait]
impl CommitteeProvider for StaticProvider {
    fn provider_id(&self) -> &ProviderId {
        &self.id
    }

    fn family(&self) -> ProviderFamily {
        self.family
    }

    async fn call(&self, _pack: &EvidencePack, _timeout: Duration) -> Result<StrictProviderResponse, ProviderCallError> {
        Ok(self.response.clone())
    }
}
