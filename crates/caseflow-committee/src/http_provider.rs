// caseflow-committee/src/http_provider.rs
// ============================================================================
// Module: HTTP Committee Provider
// Description: Evidence-bounded HTTP-backed committee provider.
// Purpose: Call an LLM provider's HTTP endpoint with a bounded evidence pack
//          and the strict output schema, enforcing size and time limits.
// Dependencies: caseflow-core, reqwest, tokio
// ============================================================================

//! ## Overview
//! [`HttpCommitteeProvider`] is the one concrete [`CommitteeProvider`]
//! implementation today: every configured provider, regardless of model
//! family, is reached over HTTPS with a JSON request body containing the
//! bounded [`EvidencePack`] and the strict response schema the provider must
//! satisfy. Response bodies are size-capped before parsing, and the call is
//! wrapped in an explicit timeout independent of the HTTP client's own
//! connect/read timeouts so a hung connection can never outlive the
//! committee's call budget.

use std::time::Duration;

use reqwest::Client;
use reqwest::Url;
use reqwest::redirect::Policy;
use serde::Serialize;
use serde_json::Value;

use crate::pack::EvidencePack;
use crate::provider::CommitteeProvider;
use crate::provider::ProviderCallError;
use crate::provider::StrictProviderResponse;
use crate::provider::provider_output_schema;
use crate::provider::validate_response;
use async_trait::async_trait;
use caseflow_core::ProviderFamily;
use caseflow_core::ProviderId;

/// Maximum response body size accepted from a provider, in bytes.
pub const MAX_RESPONSE_BYTES: usize = 1024 * 1024;

/// Static configuration for one HTTP-backed committee provider.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpProviderConfig {
    /// Configured provider identifier.
    pub id: ProviderId,
    /// Model family, used for pool diversity.
    pub family: ProviderFamily,
    /// HTTPS endpoint the provider is reached at.
    pub endpoint: Url,
    /// Bearer token sent as the `Authorization` header.
    pub api_key: String,
    /// Model name sent in the request body.
    pub model: String,
    /// User agent string for outbound requests.
    pub user_agent: String,
}

/// Request body sent to every HTTP-backed committee provider.
#[derive(Debug, Serialize)]
struct CommitteeRequest<'a> {
    /// Model name to invoke.
    model: &'a str,
    /// Bounded evidence pack the provider must reason over.
    evidence_pack: &'a EvidencePack,
    /// Strict JSON schema the provider's response must satisfy.
    response_schema: Value,
}

/// Evidence-bounded committee provider reached over HTTPS.
pub struct HttpCommitteeProvider {
    /// Static provider configuration.
    config: HttpProviderConfig,
    /// Shared async HTTP client.
    client: Client,
}

impl HttpCommitteeProvider {
    /// Builds a provider from its configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderCallError::Transport`] when the underlying HTTP
    /// client cannot be constructed.
    pub fn new(config: HttpProviderConfig) -> Result<Self, ProviderCallError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(Policy::none())
            .build()
            .map_err(|err| ProviderCallError::Transport(err.to_string()))?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl CommitteeProvider for HttpCommitteeProvider {
    fn provider_id(&self) -> &ProviderId {
        &self.config.id
    }

    fn family(&self) -> ProviderFamily {
        self.config.family
    }

    async fn call(
        &self,
        pack: &EvidencePack,
        timeout: Duration,
    ) -> Result<StrictProviderResponse, ProviderCallError> {
        let request = self
            .client
            .post(self.config.endpoint.clone())
            .bearer_auth(&self.config.api_key)
            .json(&CommitteeRequest {
                model: &self.config.model,
                evidence_pack: pack,
                response_schema: provider_output_schema(),
            })
            .send();

        let response = tokio::time::timeout(timeout, request)
            .await
            .map_err(|_| ProviderCallError::Timeout(timeout))?
            .map_err(|err| ProviderCallError::Transport(err.to_string()))?;

        if !response.status().is_success() {
            return Err(ProviderCallError::Transport(format!(
                "provider returned status {}",
                response.status()
            )));
        }

        let bytes = tokio::time::timeout(timeout, response.bytes())
            .await
            .map_err(|_| ProviderCallError::Timeout(timeout))?
            .map_err(|err| ProviderCallError::Transport(err.to_string()))?;

        if bytes.len() > MAX_RESPONSE_BYTES {
            return Err(ProviderCallError::Transport(format!(
                "provider response exceeded {MAX_RESPONSE_BYTES} bytes"
            )));
        }

        let raw: Value = serde_json::from_slice(&bytes)
            .map_err(|err| ProviderCallError::Transport(format!("non-json response: {err}")))?;

        Ok(validate_response(&raw, pack)?)
    }
}
