// caseflow-core/src/core/identifiers.rs
// ============================================================================
// Module: Caseflow Identifiers
// Description: Canonical opaque identifiers for cases, tenants, and artifacts.
// Purpose: Provide strongly typed, serializable IDs with stable string forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! This module defines the canonical string-based identifiers used throughout
//! caseflow. Identifiers are opaque and serialize as strings. Validation is
//! handled at the ingress or store boundary rather than within these wrappers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Macro
// ============================================================================

/// Declares an opaque, string-backed identifier with the shared boilerplate
/// (`new`, `as_str`, `Display`, `From<&str>`, `From<String>`).
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }
    };
}

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

string_id!(
    /// Tenant identifier scoped to a caseflow deployment.
    TenantId
);
string_id!(
    /// Case identifier; a UUID string in practice, opaque here.
    CaseId
);
string_id!(
    /// Identifier of the user or service account that submitted a case.
    SubmitterId
);
string_id!(
    /// Correlation identifier threaded through ingress calls and audit events.
    CorrelationId
);
string_id!(
    /// Committee invocation identifier (one per `RunCommittee` activity call).
    TaskId
);
string_id!(
    /// Configured committee provider identifier.
    ProviderId
);
string_id!(
    /// Canonical field identifier (e.g. `customer_name`, `sku`, `gtin`).
    FieldId
);
string_id!(
    /// Evidence-pack column identifier referenced by provider mappings.
    ColumnId
);
string_id!(
    /// Workbook sheet name.
    SheetName
);
string_id!(
    /// Reference returned by the external accounting system for a draft order.
    DraftReference
);
string_id!(
    /// Identifier of a resolved or candidate customer record in the external catalog.
    CustomerRef
);
string_id!(
    /// Identifier of a resolved or candidate item record in the external catalog.
    ItemRef
);
