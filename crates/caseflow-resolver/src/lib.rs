// caseflow-resolver/src/lib.rs
// ============================================================================
// Module: Caseflow Resolver Library
// Description: Public API surface for customer/item resolution and the
//              draft-order writer activity.
// Purpose: Resolve a parsed order's customer and line items against the
//          external catalog, then (after approval) write an idempotent
//          draft sales order.
// Dependencies: caseflow-core, caseflow-parser, strsim
// ============================================================================

//! ## Overview
//! This crate implements the three workflow activities downstream of the
//! committee: resolving the customer, resolving each line item, and writing
//! the draft order. All three consult the external catalog through
//! [`caseflow_core::ExternalCatalogClient`] so that a concrete accounting
//! integration can be swapped in without touching this crate.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod customer;
pub mod item;
pub mod writer;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use customer::CustomerResolution;
pub use customer::CustomerResolutionPolicy;
pub use customer::resolve_customer;
pub use item::ItemResolution;
pub use item::ItemResolutionPolicy;
pub use item::resolve_item;
pub use writer::DraftWriteError;
pub use writer::DraftWriteOutcome;
pub use writer::write_draft;
