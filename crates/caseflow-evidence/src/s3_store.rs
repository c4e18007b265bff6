// caseflow-evidence/src/s3_store.rs
// ============================================================================
// Module: S3 Evidence Store
// Description: Object-storage backend for write-once evidence artifacts.
// Purpose: Support multi-node deployments where evidence must be durable
//          and reachable from any workflow worker, not just the one that
//          produced it.
// Dependencies: caseflow-core, aws-config, aws-sdk-s3, tokio
// ============================================================================

//! ## Overview
//! [`S3EvidenceStore`] stores each artifact as a single S3 object under its
//! content-addressed key, tagging it with a `content-sha256` metadata header
//! so a reader can verify integrity independent of transport. Write-once
//! semantics are enforced with a `HeadObject` existence check before `PutObject`;
//! this is a best-effort guard against accidental overwrite from a single
//! client, not a substitute for a bucket object-lock policy in production.
//!
//! The store owns a dedicated [`tokio::runtime::Runtime`] so its trait
//! methods can stay synchronous while the AWS SDK's calls are async; the
//! runtime is torn down on a background thread when the store is dropped,
//! since dropping a multi-thread runtime from within one of its own worker
//! threads panics.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use caseflow_core::core::hashing::DEFAULT_HASH_ALGORITHM;
use caseflow_core::core::hashing::hash_bytes;
use caseflow_core::interfaces::EvidenceArtifact;
use caseflow_core::interfaces::EvidenceError;
use caseflow_core::interfaces::EvidenceReader;
use caseflow_core::interfaces::EvidenceRef;
use caseflow_core::interfaces::EvidenceSink;

const CONTENT_HASH_METADATA_KEY: &str = "content-sha256";

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the S3 evidence backend.
#[derive(Debug, Clone)]
pub struct S3EvidenceStoreConfig {
    /// Target bucket name.
    pub bucket: String,
    /// Key prefix every artifact path is nested under.
    pub key_prefix: String,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors specific to the S3 evidence backend.
#[derive(Debug)]
pub enum S3EvidenceStoreError {
    /// The S3 `PutObject` call failed.
    Put(String),
    /// The S3 `GetObject` call failed.
    Get(String),
    /// The S3 `HeadObject` call failed for a reason other than not-found.
    Head(String),
    /// A stored object's content hash did not match its metadata.
    ContentHashMismatch(String),
}

impl fmt::Display for S3EvidenceStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Put(msg) => write!(f, "s3 evidence put error: {msg}"),
            Self::Get(msg) => write!(f, "s3 evidence get error: {msg}"),
            Self::Head(msg) => write!(f, "s3 evidence head error: {msg}"),
            Self::ContentHashMismatch(path) => {
                write!(f, "s3 evidence content hash mismatch: {path}")
            }
        }
    }
}

impl std::error::Error for S3EvidenceStoreError {}

impl From<S3EvidenceStoreError> for EvidenceError {
    fn from(err: S3EvidenceStoreError) -> Self {
        Self::Store(err.to_string())
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// S3-backed evidence store. Owns a dedicated Tokio runtime so its trait
/// methods can remain synchronous.
pub struct S3EvidenceStore {
    /// S3 client handle.
    client: Client,
    /// Bucket and key-prefix configuration.
    config: S3EvidenceStoreConfig,
    /// Dedicated Tokio runtime for blocking S3 calls; `None` once dropped.
    runtime: Option<Arc<tokio::runtime::Runtime>>,
}

impl Drop for S3EvidenceStore {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            let _ = std::thread::spawn(move || drop(runtime));
        }
    }
}

impl S3EvidenceStore {
    /// Builds a store from an already-configured S3 client.
    ///
    /// # Errors
    ///
    /// Returns [`S3EvidenceStoreError`] if a dedicated runtime cannot be
    /// created.
    pub fn new(client: Client, config: S3EvidenceStoreConfig) -> Result<Self, S3EvidenceStoreError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|err| S3EvidenceStoreError::Put(err.to_string()))?;
        Ok(Self { client, config, runtime: Some(Arc::new(runtime)) })
    }

    /// Builds a store by loading AWS configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`S3EvidenceStoreError`] if a dedicated runtime cannot be
    /// created.
    pub fn from_env(config: S3EvidenceStoreConfig) -> Result<Self, S3EvidenceStoreError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|err| S3EvidenceStoreError::Put(err.to_string()))?;
        let shared_config =
            runtime.block_on(aws_config::defaults(BehaviorVersion::latest()).load());
        let client = Client::new(&shared_config);
        Ok(Self { client, config, runtime: Some(Arc::new(runtime)) })
    }

    /// Builds the full object key for a content-addressed relative path.
    fn object_key(&self, relative: &str) -> String {
        if self.config.key_prefix.is_empty() {
            relative.to_string()
        } else {
            format!("{}/{}", self.config.key_prefix.trim_end_matches('/'), relative)
        }
    }

    /// Returns the dedicated runtime, failing if the store has been dropped.
    fn runtime(&self) -> Result<&tokio::runtime::Runtime, S3EvidenceStoreError> {
        self.runtime
            .as_deref()
            .ok_or_else(|| S3EvidenceStoreError::Put("evidence store closed".to_string()))
    }

    /// Checks whether an object already exists at `key` via `HeadObject`.
    async fn exists(&self, key: &str) -> Result<bool, S3EvidenceStoreError> {
        match self.client.head_object().bucket(&self.config.bucket).key(key).send().await {
            Ok(_) => Ok(true),
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_not_found() {
                    Ok(false)
                } else {
                    Err(S3EvidenceStoreError::Head(service_err.to_string()))
                }
            }
        }
    }
}

impl EvidenceSink for S3EvidenceStore {
    fn write(&self, artifact: &EvidenceArtifact) -> Result<EvidenceRef, EvidenceError> {
        let key = self.object_key(&artifact.path);
        let content_hash = hash_bytes(DEFAULT_HASH_ALGORITHM, &artifact.bytes).value;
        let runtime = self.runtime().map_err(EvidenceError::from)?;

        runtime.block_on(async {
            if self.exists(&key).await? {
                return Err(S3EvidenceStoreError::Put(format!("already exists: {key}")));
            }

            let mut request = self
                .client
                .put_object()
                .bucket(&self.config.bucket)
                .key(&key)
                .body(ByteStream::from(artifact.bytes.clone()))
                .metadata(CONTENT_HASH_METADATA_KEY, &content_hash);
            if let Some(content_type) = &artifact.content_type {
                request = request.content_type(content_type);
            }
            request.send().await.map_err(|err| S3EvidenceStoreError::Put(err.to_string()))?;
            Ok(())
        })
        .map_err(|err| match &err {
            S3EvidenceStoreError::Put(msg) if msg.starts_with("already exists") => {
                EvidenceError::AlreadyExists(artifact.path.clone())
            }
            _ => EvidenceError::from(err),
        })?;

        Ok(EvidenceRef { uri: format!("s3://{}/{key}", self.config.bucket) })
    }
}

impl EvidenceReader for S3EvidenceStore {
    fn read(&self, path: &str) -> Result<Vec<u8>, EvidenceError> {
        let key = self.object_key(path);
        let runtime = self.runtime().map_err(EvidenceError::from)?;
        runtime.block_on(async {
            let output = self
                .client
                .get_object()
                .bucket(&self.config.bucket)
                .key(&key)
                .send()
                .await
                .map_err(|err| S3EvidenceStoreError::Get(err.to_string()))?;

            let expected_hash = output.metadata().and_then(|meta| meta.get(CONTENT_HASH_METADATA_KEY)).cloned();

            let bytes = output
                .body
                .collect()
                .await
                .map_err(|err| S3EvidenceStoreError::Get(err.to_string()))?
                .into_bytes()
                .to_vec();

            if let Some(expected_hash) = expected_hash {
                let actual_hash = hash_bytes(DEFAULT_HASH_ALGORITHM, &bytes).value;
                if actual_hash != expected_hash {
                    return Err(S3EvidenceStoreError::ContentHashMismatch(path.to_string()));
                }
            }

            Ok(bytes)
        })
        .map_err(EvidenceError::from)
    }
}
