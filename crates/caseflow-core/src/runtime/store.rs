// caseflow-core/src/runtime/store.rs
// ============================================================================
// Module: Caseflow In-Memory Store
// Description: Simple in-memory case store and fingerprint index for tests.
// Purpose: Provide deterministic implementations without external deps.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides simple in-memory implementations of [`CaseStore`] and
//! [`FingerprintIndex`] for tests and local demos. They are not intended for
//! production use; see `caseflow-store-sqlite` for the durable backend.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::core::Case;
use crate::core::CaseId;
use crate::core::OrderFingerprint;
use crate::core::TenantId;
use crate::interfaces::CaseStore;
use crate::interfaces::FingerprintIndex;
use crate::interfaces::FingerprintIndexError;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: In-Memory Case Store
// ============================================================================

/// In-memory case store for tests and local demos.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCaseStore {
    /// Cases keyed by `(tenant_id, case_id)`.
    cases: Arc<Mutex<BTreeMap<(String, String), Case>>>,
}

impl InMemoryCaseStore {
    /// Creates a new, empty in-memory case store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cases: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }
}

impl CaseStore for InMemoryCaseStore {
    fn load(&self, tenant_id: &TenantId, case_id: &CaseId) -> Result<Option<Case>, StoreError> {
        let guard = self
            .cases
            .lock()
            .map_err(|_| StoreError::Store("case store mutex poisoned".to_string()))?;
        Ok(guard
            .get(&(tenant_id.as_str().to_string(), case_id.as_str().to_string()))
            .cloned())
    }

    fn save(&self, case: &Case) -> Result<(), StoreError> {
        self.cases
            .lock()
            .map_err(|_| StoreError::Store("case store mutex poisoned".to_string()))?
            .insert(
                (
                    case.tenant_id.as_str().to_string(),
                    case.case_id.as_str().to_string(),
                ),
                case.clone(),
            );
        Ok(())
    }
}

// ============================================================================
// SECTION: Shared Case Store Wrapper
// ============================================================================

/// Shared case store backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedCaseStore {
    /// Inner store implementation.
    inner: Arc<dyn CaseStore + Send + Sync>,
}

impl SharedCaseStore {
    /// Wraps a case store in a shared, clonable wrapper.
    #[must_use]
    pub fn from_store(store: impl CaseStore + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }

    /// Wraps an existing shared store.
    #[must_use]
    pub const fn new(store: Arc<dyn CaseStore + Send + Sync>) -> Self {
        Self { inner: store }
    }
}

impl CaseStore for SharedCaseStore {
    fn load(&self, tenant_id: &TenantId, case_id: &CaseId) -> Result<Option<Case>, StoreError> {
        self.inner.load(tenant_id, case_id)
    }

    fn save(&self, case: &Case) -> Result<(), StoreError> {
        self.inner.save(case)
    }
}

// ============================================================================
// SECTION: In-Memory Fingerprint Index
// ============================================================================

/// In-memory, mutex-guarded fingerprint index for tests and local demos.
#[derive(Debug, Default, Clone)]
pub struct InMemoryFingerprintIndex {
    /// Fingerprint-to-case-id map keyed by `(tenant_id, fingerprint)`.
    claims: Arc<Mutex<BTreeMap<(String, String), CaseId>>>,
}

impl InMemoryFingerprintIndex {
    /// Creates a new, empty in-memory fingerprint index.
    #[must_use]
    pub fn new() -> Self {
        Self {
            claims: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }
}

impl FingerprintIndex for InMemoryFingerprintIndex {
    fn get(
        &self,
        tenant_id: &TenantId,
        fingerprint: &OrderFingerprint,
    ) -> Result<Option<CaseId>, FingerprintIndexError> {
        let guard = self.claims.lock().map_err(|_| {
            FingerprintIndexError::Io("fingerprint index mutex poisoned".to_string())
        })?;
        Ok(guard
            .get(&(
                tenant_id.as_str().to_string(),
                fingerprint.as_str().to_string(),
            ))
            .cloned())
    }

    fn put_if_absent(
        &self,
        tenant_id: &TenantId,
        fingerprint: &OrderFingerprint,
        case_id: &CaseId,
    ) -> Result<CaseId, FingerprintIndexError> {
        let mut guard = self.claims.lock().map_err(|_| {
            FingerprintIndexError::Io("fingerprint index mutex poisoned".to_string())
        })?;
        let key = (
            tenant_id.as_str().to_string(),
            fingerprint.as_str().to_string(),
        );
        let owner = guard.entry(key).or_insert_with(|| case_id.clone());
        Ok(owner.clone())
    }
}
