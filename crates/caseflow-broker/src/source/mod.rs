// caseflow-broker/src/source/mod.rs
// ============================================================================
// Module: Caseflow Broker Trigger Sources
// Description: TriggerSource implementations for in-process, filesystem, and
//              HTTP-poll ingestion.
// Purpose: Let the workflow engine pull pending case triggers without caring
//          which transport carried the upload/signal event.
// Dependencies: caseflow-core, thiserror
// ============================================================================

//! ## Overview
//! A [`caseflow_core::TriggerSource`] yields the next pending
//! [`caseflow_core::CaseTrigger`], or `None` when nothing is ready. Sources
//! here never block indefinitely; callers that need to wait poll on an
//! interval (see each source's documentation).

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Source Errors
// ============================================================================

/// Errors surfaced by broker trigger sources that can be observed but do not
/// stop ingestion (a malformed spool file is skipped, not fatal; a failed
/// HTTP poll is logged and retried on the next tick by the caller).
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source could not read from its backing transport.
    #[error("trigger source io error: {0}")]
    Io(String),
    /// A trigger payload failed to deserialize.
    #[error("trigger source decode error: {0}")]
    Decode(String),
    /// The HTTP poll source received a non-success response.
    #[error("trigger source http error: {0}")]
    Http(String),
}

// ============================================================================
// SECTION: Implementations
// ============================================================================

pub mod file;
pub mod http;
pub mod inline;

pub use file::FileSpoolSource;
pub use http::HttpPollSource;
pub use inline::InlineSource;
