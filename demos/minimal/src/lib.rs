// caseflow-demo-minimal/src/lib.rs
// ============================================================================
// Module: Caseflow Minimal Demo Library
// Description: In-process wiring of the full case lifecycle without a real
//              workbook, accounting system, or LLM endpoint.
// Purpose: Exercise every crate in the workspace end to end from a single
//          binary, for local exploration and as a target for system tests.
// Dependencies: caseflow-broker, caseflow-committee, caseflow-core,
//               caseflow-evidence, caseflow-resolver
// ============================================================================

//! ## Overview
//! This crate is not a workflow engine of its own: it assembles the real
//! `caseflow-core`, `caseflow-committee`, `caseflow-resolver`,
//! `caseflow-broker`, and `caseflow-evidence` crates behind canned
//! replacements for the two external systems a full deployment depends on
//! (an LLM-backed committee provider and an accounting catalog). Everything
//! else — the case state machine, committee selection and aggregation,
//! customer/item resolution, idempotent draft writing — runs unmodified.

pub mod catalog;
pub mod dispatcher;
pub mod provider;

pub use catalog::InMemoryCatalog;
pub use dispatcher::DispatchError;
pub use dispatcher::Dispatcher;
pub use dispatcher::ProcessedCase;
pub use provider::StaticProvider;
