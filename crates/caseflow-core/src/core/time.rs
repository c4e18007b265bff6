// caseflow-core/src/core/time.rs
// ============================================================================
// Module: Caseflow Time Model
// Description: Canonical timestamp representations for case events and logs.
// Purpose: Provide deterministic, replayable time values across caseflow records.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Caseflow uses explicit time values embedded in case events and logs to keep
//! replay deterministic. The engine never reads wall-clock time directly;
//! hosts must supply timestamps via activities or ingress handlers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Time Values
// ============================================================================

/// Canonical timestamp used in caseflow logs and case event records.
///
/// # Invariants
/// - Values are explicitly provided by callers; the engine never reads wall-clock time.
/// - No validation is performed; monotonicity is a caller responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Timestamp {
    /// Unix epoch milliseconds.
    UnixMillis(i64),
    /// Monotonic logical time value.
    Logical(u64),
}

impl Timestamp {
    /// Returns the timestamp as unix milliseconds when available.
    #[must_use]
    pub const fn as_unix_millis(&self) -> Option<i64> {
        match self {
            Self::UnixMillis(value) => Some(*value),
            Self::Logical(_) => None,
        }
    }

    /// Returns the timestamp as logical time when available.
    #[must_use]
    pub const fn as_logical(&self) -> Option<u64> {
        match self {
            Self::UnixMillis(_) => None,
            Self::Logical(value) => Some(*value),
        }
    }

    /// Returns the `YYYY-MM-DD` UTC date bucket for this timestamp, when it
    /// carries real calendar time (`UnixMillis`). Returns `None` for
    /// `Logical` timestamps, which carry no calendar meaning.
    #[must_use]
    pub fn utc_date_bucket(&self) -> Option<String> {
        match self {
            Self::UnixMillis(millis) => Some(utc_date_bucket(*millis)),
            Self::Logical(_) => None,
        }
    }
}

// ============================================================================
// SECTION: UTC Date Bucketing
// ============================================================================

/// Number of milliseconds in one UTC calendar day.
const MILLIS_PER_DAY: i64 = 86_400_000;

/// Converts a day count since the Unix epoch (1970-01-01) into a proleptic
/// Gregorian `YYYY-MM-DD` UTC calendar date.
///
/// Pure integer arithmetic (Howard Hinnant's `civil_from_days` algorithm):
/// the same `epoch_day` always yields the same string, with no wall-clock
/// read or locale dependency.
#[must_use]
fn epoch_day_to_utc_date(epoch_day: i64) -> String {
    let z = epoch_day + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = if month <= 2 { y + 1 } else { y };
    format!("{year:04}-{month:02}-{day:02}")
}

/// Derives the `YYYY-MM-DD` UTC date bucket for a unix-milliseconds instant.
///
/// Used to bucket a case's processing instant (recorded once, deterministically,
/// in the case's history) into the calendar day the order-fingerprint formula
/// requires, independent of any date stated on the order itself.
#[must_use]
pub fn utc_date_bucket(unix_millis: i64) -> String {
    epoch_day_to_utc_date(unix_millis.div_euclid(MILLIS_PER_DAY))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "test assertions")]

    use super::*;

    #[test]
    fn epoch_day_zero_is_the_unix_epoch_date() {
        assert_eq!(utc_date_bucket(0), "1970-01-01");
    }

    #[test]
    fn known_date_round_trips() {
        // 2026-07-28T00:00:00Z
        assert_eq!(utc_date_bucket(1_785_196_800_000), "2026-07-28");
    }

    #[test]
    fn last_millisecond_of_day_stays_in_that_day() {
        assert_eq!(utc_date_bucket(MILLIS_PER_DAY - 1), "1970-01-01");
        assert_eq!(utc_date_bucket(MILLIS_PER_DAY), "1970-01-02");
    }

    #[test]
    fn timestamp_method_matches_free_function() {
        assert_eq!(Timestamp::UnixMillis(1_785_196_800_000).utc_date_bucket().unwrap(), "2026-07-28");
        assert_eq!(Timestamp::Logical(5).utc_date_bucket(), None);
    }
}
