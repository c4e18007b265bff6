// caseflow-config/src/policy.rs
// ============================================================================
// Module: Activity Retry Policy
// Description: Per-activity retry policy configuration and disposition
//              lookup for the workflow engine's retry table.
// Purpose: Provide a single source of truth for the per-activity retry
//          policy table, swappable without touching the engine.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The workflow engine retries transient activity failures with exponential
//! backoff, but each named activity has its own initial delay, attempt cap,
//! backoff cap, and set of non-retryable error codes. This module is the
//! deterministic policy lookup the engine consults; it
//! never reads wall-clock time or randomness itself, since the engine alone
//! owns the current-time facility used to schedule a retry.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Activity Identity
// ============================================================================

/// Named activity the workflow engine invokes, keyed to a retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityName {
    /// Persists the uploaded workbook to the evidence store.
    StoreFile,
    /// Parses the workbook into a canonical order.
    ParseExcel,
    /// Runs the provider committee for ambiguous schema mapping.
    RunCommittee,
    /// Resolves the parsed customer against the external catalog.
    ResolveCustomer,
    /// Resolves parsed line items against the external catalog.
    ResolveItems,
    /// Creates the draft sales order in the external accounting system.
    CreateDraft,
    /// Notifies the submitter of a case status change.
    NotifyUser,
}

// ============================================================================
// SECTION: Retry Policy
// ============================================================================

/// Exponential backoff retry policy for one activity.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct RetryPolicy {
    /// Delay before the first retry.
    #[serde(with = "duration_millis")]
    pub initial_backoff: Duration,
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Multiplier applied to the backoff after each failed attempt.
    pub backoff_multiplier: f64,
    /// Ceiling on the backoff delay, if any.
    #[serde(default, with = "option_duration_millis")]
    pub max_backoff: Option<Duration>,
}

impl RetryPolicy {
    /// Returns the backoff delay before attempt number `attempt` (1-indexed,
    /// where attempt 1 is the first retry after the initial failure).
    #[must_use]
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        #[expect(
            clippy::cast_precision_loss,
            reason = "attempt counts are single-digit retry counts, never large enough to lose precision"
        )]
        let scaled = self.initial_backoff.as_secs_f64() * self.backoff_multiplier.powi(exponent as i32);
        let delay = Duration::from_secs_f64(scaled.max(0.0));
        match self.max_backoff {
            Some(cap) if delay > cap => cap,
            _ => delay,
        }
    }

    /// Returns true when `attempt` (1-indexed) is still within the allowed
    /// attempt budget.
    #[must_use]
    pub const fn allows_attempt(&self, attempt: u32) -> bool {
        attempt <= self.max_attempts
    }
}

/// Disposition of one activity error: whether the engine's retry policy
/// applies at all, independent of remaining attempt budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorDisposition {
    /// The error is retryable per the activity's backoff policy.
    Retryable,
    /// The error is never retried regardless of remaining attempts.
    NonRetryable,
}

/// Registry mapping each activity to its retry policy and set of
/// non-retryable error codes.
#[derive(Debug, Clone)]
pub struct RetryPolicyRegistry {
    entries: BTreeMap<ActivityName, (RetryPolicy, Vec<String>)>,
}

impl RetryPolicyRegistry {
    /// Returns the registry populated with its default per-activity table.
    #[must_use]
    pub fn defaults() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(
            ActivityName::StoreFile,
            (
                RetryPolicy {
                    initial_backoff: Duration::from_secs(1),
                    max_attempts: 5,
                    backoff_multiplier: 2.0,
                    max_backoff: Some(Duration::from_secs(60)),
                },
                vec!["hash-mismatch".to_string(), "quota-exceeded".to_string()],
            ),
        );
        entries.insert(
            ActivityName::ParseExcel,
            (
                RetryPolicy {
                    initial_backoff: Duration::from_secs(1),
                    max_attempts: 3,
                    backoff_multiplier: 2.0,
                    max_backoff: None,
                },
                vec!["FORMULAS_BLOCKED".to_string(), "FILE_CORRUPTED".to_string()],
            ),
        );
        entries.insert(
            ActivityName::RunCommittee,
            (
                RetryPolicy {
                    initial_backoff: Duration::from_secs(2),
                    max_attempts: 3,
                    backoff_multiplier: 2.0,
                    max_backoff: None,
                },
                vec!["all-providers-permanent-fail".to_string()],
            ),
        );
        entries.insert(
            ActivityName::ResolveCustomer,
            (
                RetryPolicy {
                    initial_backoff: Duration::from_secs(1),
                    max_attempts: 5,
                    backoff_multiplier: 2.0,
                    max_backoff: Some(Duration::from_secs(30)),
                },
                vec!["auth-invalid".to_string()],
            ),
        );
        entries.insert(
            ActivityName::ResolveItems,
            (
                RetryPolicy {
                    initial_backoff: Duration::from_secs(1),
                    max_attempts: 5,
                    backoff_multiplier: 2.0,
                    max_backoff: Some(Duration::from_secs(30)),
                },
                vec!["auth-invalid".to_string()],
            ),
        );
        entries.insert(
            ActivityName::CreateDraft,
            (
                RetryPolicy {
                    initial_backoff: Duration::from_secs(2),
                    max_attempts: 8,
                    backoff_multiplier: 2.0,
                    max_backoff: Some(Duration::from_secs(120)),
                },
                vec!["ZOHO_VALIDATION_ERROR".to_string(), "auth-invalid".to_string()],
            ),
        );
        entries.insert(
            ActivityName::NotifyUser,
            (
                RetryPolicy {
                    initial_backoff: Duration::from_secs(1),
                    max_attempts: 5,
                    backoff_multiplier: 2.0,
                    max_backoff: None,
                },
                vec!["policy-blocked".to_string()],
            ),
        );
        Self {
            entries,
        }
    }

    /// Returns the retry policy configured for `activity`.
    #[must_use]
    pub fn policy_for(&self, activity: ActivityName) -> Option<&RetryPolicy> {
        self.entries.get(&activity).map(|(policy, _)| policy)
    }

    /// Returns the disposition of `error_code` for `activity`: non-retryable
    /// when the code is in the activity's configured non-retryable set,
    /// retryable otherwise (including for activities with no configured
    /// entry, which fail closed to the engine's default retry behavior).
    #[must_use]
    pub fn disposition(&self, activity: ActivityName, error_code: &str) -> ErrorDisposition {
        match self.entries.get(&activity) {
            Some((_, non_retryable)) if non_retryable.iter().any(|code| code == error_code) => {
                ErrorDisposition::NonRetryable
            }
            _ => ErrorDisposition::Retryable,
        }
    }
}

impl Default for RetryPolicyRegistry {
    fn default() -> Self {
        Self::defaults()
    }
}

/// Serde helper serializing a [`Duration`] as whole milliseconds.
mod duration_millis {
    use std::time::Duration;

    use serde::Deserialize;
    use serde::Deserializer;
    use serde::Serializer;

    /// Serializes a duration as milliseconds.
    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        #[expect(clippy::cast_possible_truncation, reason = "backoff durations never exceed u64::MAX millis")]
        serializer.serialize_u64(value.as_millis() as u64)
    }

    /// Deserializes a duration from milliseconds.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Serde helper for an optional [`Duration`] in milliseconds.
mod option_duration_millis {
    use std::time::Duration;

    use serde::Deserialize;
    use serde::Deserializer;
    use serde::Serializer;

    /// Serializes an optional duration as milliseconds.
    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        #[expect(clippy::cast_possible_truncation, reason = "backoff durations never exceed u64::MAX millis")]
        match value {
            Some(duration) => serializer.serialize_some(&(duration.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    /// Deserializes an optional duration from milliseconds.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        let millis: Option<u64> = Option::deserialize(deserializer)?;
        Ok(millis.map(Duration::from_millis))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
