// caseflow-ingress/src/lib.rs
// ============================================================================
// Module: Caseflow Ingress Library
// Description: Public API surface for the caseflow-ingress crate.
// Purpose: Expose the ingress router, app state, and server bootstrap used by
//          `caseflow-cli serve` and the system test suite.
// Dependencies: crate::{error, health, router, serve, signals, state, submit, types}
// ============================================================================

//! ## Overview
//! `caseflow-ingress` is the C1 component: the HTTP surface a chat-platform
//! integration calls to submit a purchase order and signal case decisions
//! back to a running workflow. It validates input, applies the deterministic
//! engine transitions it owns outright (submission, reupload, approval), and
//! otherwise only enqueues triggers for the workflow worker to consume.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod error;
pub mod health;
pub mod router;
pub mod serve;
pub mod signals;
pub mod state;
pub mod submit;
pub mod types;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use error::IngressError;
pub use router::build_router;
pub use serve::ServeError;
pub use serve::serve_plain;
pub use serve::serve_tls;
pub use state::AppState;
