// caseflow-broker/src/lib.rs
// ============================================================================
// Module: Caseflow Broker Library
// Description: Transport-agnostic trigger sources and notification sinks.
// Purpose: Let the ingress surface and workflow engine ignore which concrete
//          transport (in-memory, filesystem spool, HTTP poll, log, channel,
//          callback) is carrying case triggers and notifications.
// Dependencies: caseflow-core, reqwest, serde_json, tokio
// ============================================================================

//! ## Overview
//! Caseflow Broker provides ready-made [`caseflow_core::TriggerSource`] and
//! [`caseflow_core::NotificationSink`] implementations plus a composite
//! source that merges several trigger sources into one. None of these types
//! are required — any backend can implement the core traits directly — but
//! they cover the common cases: an in-process queue for tests and demos, a
//! filesystem spool for batch ingestion, an HTTP poll for a decoupled
//! ingress process, and log/channel/callback delivery for notifications.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod multi;
pub mod sink;
pub mod source;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use multi::MultiSource;
pub use sink::CallbackSink;
pub use sink::ChannelSink;
pub use sink::LogSink;
pub use source::FileSpoolSource;
pub use source::HttpPollSource;
pub use source::InlineSource;
pub use source::SourceError;

#[cfg(test)]
mod tests {
    //! Test-only lint relaxations for panic-based assertions and debug output.
    #![allow(
        clippy::panic,
        clippy::print_stdout,
        clippy::print_stderr,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::use_debug,
        clippy::dbg_macro,
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result,
        reason = "Test-only output and panic-based assertions are permitted."
    )]
}
