// caseflow-broker/src/source/http.rs
// ============================================================================
// Module: Caseflow HTTP Poll Trigger Source
// Description: HTTP-poll-backed trigger source.
// Purpose: Pull pending case triggers from a remote ingress process (e.g. the
//          chat-bot front-end's queue endpoint) that cannot share memory
//          with the worker process.
// Dependencies: caseflow-core, reqwest, std
// ============================================================================

//! ## Overview
//! [`HttpPollSource`] issues a blocking `GET` against a configured endpoint
//! that returns a JSON array of pending [`CaseTrigger`] values, caches them
//! locally, and hands them out one at a time. It refills only once its local
//! cache is empty, so a burst of triggers does not re-poll per item.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::VecDeque;
use std::time::Duration;

use caseflow_core::CaseTrigger;
use caseflow_core::TriggerSource;
use reqwest::blocking::Client;

use crate::source::SourceError;

// ============================================================================
// SECTION: HTTP Poll Source
// ============================================================================

/// HTTP-poll trigger source.
pub struct HttpPollSource {
    /// Endpoint polled for pending triggers.
    endpoint: String,
    /// Blocking HTTP client used for polling.
    client: Client,
    /// Locally cached triggers not yet handed out.
    cache: VecDeque<CaseTrigger>,
    /// Most recent poll error, retained for diagnostics.
    last_error: Option<SourceError>,
}

impl HttpPollSource {
    /// Builds a poll source against `endpoint` with a default 10s timeout.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|err| SourceError::Http(err.to_string()))?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
            cache: VecDeque::new(),
            last_error: None,
        })
    }

    /// Returns the most recent poll error, if any.
    #[must_use]
    pub const fn last_error(&self) -> Option<&SourceError> {
        self.last_error.as_ref()
    }

    /// Polls the endpoint once, replacing the local cache.
    fn refill(&mut self) -> Result<(), SourceError> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .map_err(|err| SourceError::Http(err.to_string()))?;
        if !response.status().is_success() {
            return Err(SourceError::Http(format!(
                "poll endpoint returned status {}",
                response.status()
            )));
        }
        let triggers: Vec<CaseTrigger> =
            response.json().map_err(|err| SourceError::Decode(err.to_string()))?;
        self.cache = triggers.into_iter().collect();
        Ok(())
    }
}

impl TriggerSource for HttpPollSource {
    fn next_trigger(&mut self) -> Option<CaseTrigger> {
        if self.cache.is_empty() {
            match self.refill() {
                Ok(()) => self.last_error = None,
                Err(err) => {
                    self.last_error = Some(err);
                    return None;
                }
            }
        }
        self.cache.pop_front()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions."
    )]

    use std::io::Write;

    use caseflow_core::CaseId;
    use caseflow_core::TenantId;
    use serde_json::json;
    use tiny_http::Response;
    use tiny_http::Server;

    use super::*;

    #[test]
    fn polls_and_drains_cached_batch() {
        let server = Server::http("127.0.0.1:0").expect("bind test server");
        let addr = server.server_addr().to_ip().expect("ip addr");
        let handle = std::thread::spawn(move || {
            let request = server.recv().expect("recv request");
            let triggers = vec![
                CaseTrigger {
                    tenant_id: TenantId::new("acme"),
                    case_id: Some(CaseId::new("a")),
                    payload: json!({}),
                },
                CaseTrigger {
                    tenant_id: TenantId::new("acme"),
                    case_id: Some(CaseId::new("b")),
                    payload: json!({}),
                },
            ];
            let body = serde_json::to_vec(&triggers).expect("serialize");
            let mut response_body = Vec::new();
            response_body.write_all(&body).expect("buffer body");
            let response = Response::from_data(response_body);
            request.respond(response).expect("respond");
        });

        let mut source = HttpPollSource::new(format!("http://{addr}")).expect("source");
        let first = source.next_trigger().expect("first trigger");
        assert_eq!(first.case_id, Some(CaseId::new("a")));
        let second = source.next_trigger().expect("second trigger, from cache");
        assert_eq!(second.case_id, Some(CaseId::new("b")));
        handle.join().expect("server thread");
    }

    #[test]
    fn connection_failure_is_observable_via_last_error() {
        let mut source = HttpPollSource::new("http://127.0.0.1:1").expect("source");
        assert!(source.next_trigger().is_none());
        assert!(source.last_error().is_some());
    }
}
