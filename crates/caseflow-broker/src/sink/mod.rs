// caseflow-broker/src/sink/mod.rs
// ============================================================================
// Module: Caseflow Broker Notification Sinks
// Description: NotificationSink implementations for log, channel, and
//              callback delivery.
// Purpose: Post case status and confirmation-request notifications back to
//          the originating chat channel (or a test harness standing in for
//          one) without the engine depending on a concrete transport.
// Dependencies: caseflow-core, serde_json, tokio
// ============================================================================

//! ## Overview
//! [`caseflow_core::NotificationSink`] is the seam the workflow engine calls
//! whenever a case needs to tell its submitter something (awaiting
//! correction, awaiting approval, completed, failed). This module provides
//! three implementations: one that just logs (for audit/debugging), one that
//! forwards onto a `tokio::sync::mpsc` channel (for a front-end process
//! reading from the same runtime), and one that invokes an arbitrary
//! callback (for tests and custom wiring).

// ============================================================================
// SECTION: Implementations
// ============================================================================

pub mod callback;
pub mod channel;
pub mod log;

pub use callback::CallbackSink;
pub use channel::ChannelSink;
pub use channel::NotificationMessage;
pub use log::LogSink;
