// caseflow-core/src/core/fingerprint.rs
// ============================================================================
// Module: Caseflow Order Fingerprint
// Description: Deterministic idempotency fingerprint for draft sales orders.
// Purpose: Derive a stable key so re-ingesting the same order never produces
//          a second draft.
// Dependencies: crate::core::hashing, crate::core::order, serde
// ============================================================================

//! ## Overview
//! A draft sales order must never be created twice for the same underlying
//! purchase order, even if the source file is re-uploaded or processed by a
//! retried activity. [`OrderFingerprint`] derives a stable key from the
//! source file hash, resolved customer, a sorted digest of line items, and a
//! date bucket, so concurrent or repeated attempts collide deterministically
//! on the same fingerprint.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;

use crate::core::hashing::DEFAULT_HASH_ALGORITHM;
use crate::core::hashing::HashDigest;
use crate::core::hashing::hash_canonical_json;
use crate::core::identifiers::CustomerRef;
use crate::core::order::CanonicalOrder;

// ============================================================================
// SECTION: Fingerprint
// ============================================================================

/// Deterministic fingerprint used as the compare-and-set key for draft
/// creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderFingerprint(String);

impl OrderFingerprint {
    /// Wraps an already-computed fingerprint value, e.g. one read back from
    /// a store. Prefer [`compute_fingerprint`] when deriving a fingerprint
    /// from order contents.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the fingerprint as a string slice suitable for use as a store key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Errors raised while computing an order fingerprint.
#[derive(Debug, thiserror::Error)]
pub enum FingerprintError {
    /// Canonical hashing of the fingerprint components failed.
    #[error("failed to hash fingerprint components: {0}")]
    Hashing(#[from] crate::core::hashing::HashError),
}

/// Computes the idempotency fingerprint for a resolved order.
///
/// The fingerprint combines the source file hash, the resolved customer, a
/// sorted digest of line items (normalized SKU, GTIN, and quantity fixed to
/// two decimal places, sorted so row-order differences do not change the
/// fingerprint), and `date_bucket` as supplied by the caller — the `YYYY-MM-DD`
/// UTC calendar day the case was processed on, not any date stated on the
/// order itself. Unit price and description are deliberately excluded from
/// the line-item key: the same goods at the same quantity must dedupe to the
/// same draft regardless of a re-quoted price or a re-worded description.
///
/// # Errors
///
/// Returns [`FingerprintError`] when canonicalizing the fingerprint
/// components fails.
pub fn compute_fingerprint(
    file_hash: &HashDigest,
    customer: &CustomerRef,
    order: &CanonicalOrder,
    date_bucket: &str,
) -> Result<OrderFingerprint, FingerprintError> {
    let mut line_keys: Vec<Value> = order
        .line_items
        .iter()
        .map(|item| {
            json!({
                "gtin": item.gtin,
                "sku": item.sku,
                "quantity": item.quantity.with_scale(2).to_string(),
            })
        })
        .collect();
    line_keys.sort_by(|a, b| {
        let key = |value: &Value| {
            value
                .get("gtin")
                .and_then(Value::as_str)
                .or_else(|| value.get("sku").and_then(Value::as_str))
                .unwrap_or_default()
                .to_string()
        };
        key(a).cmp(&key(b))
    });

    let components = json!({
        "file_hash": file_hash,
        "customer": customer.as_str(),
        "line_items": line_keys,
        "date_bucket": date_bucket,
    });

    let digest = hash_canonical_json(DEFAULT_HASH_ALGORITHM, &components)?;
    Ok(OrderFingerprint(digest.value))
}
