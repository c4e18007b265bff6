// caseflow-broker/src/sink/log.rs
// ============================================================================
// Module: Caseflow Log Notification Sink
// Description: Log-only notification sink for audit-grade delivery records.
// Purpose: Record that a notification was due without delivering it anywhere
//          a human reads (local dev, or a sink test double).
// Dependencies: caseflow-core, serde_json, std
// ============================================================================

//! ## Overview
//! `LogSink` writes one JSON line per notification and never fails on the
//! content of the message itself; it only fails if the underlying writer
//! does.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Mutex;

use caseflow_core::CaseId;
use caseflow_core::NotificationError;
use caseflow_core::NotificationSink;
use serde_json::json;

// ============================================================================
// SECTION: Log Sink
// ============================================================================

/// Log-only notification sink.
pub struct LogSink<W: Write + Send> {
    /// Output writer for log records.
    writer: Mutex<W>,
}

impl<W: Write + Send> LogSink<W> {
    /// Creates a log sink writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }
}

impl<W: Write + Send> NotificationSink for LogSink<W> {
    fn notify(&self, case_id: &CaseId, message: &str) -> Result<(), NotificationError> {
        let record = json!({
            "case_id": case_id.as_str(),
            "message": message,
        });
        let mut guard = self
            .writer
            .lock()
            .map_err(|_| NotificationError::Delivery("log writer mutex poisoned".to_string()))?;
        serde_json::to_writer(&mut *guard, &record)
            .map_err(|err| NotificationError::Delivery(err.to_string()))?;
        guard
            .write_all(b"\n")
            .map_err(|err| NotificationError::Delivery(err.to_string()))?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions."
    )]

    use super::*;

    #[test]
    fn writes_one_json_line_per_notification() {
        let sink = LogSink::new(Vec::new());
        sink.notify(&CaseId::new("c-1"), "awaiting approval").expect("notify");
        sink.notify(&CaseId::new("c-1"), "completed").expect("notify");
        let guard = sink.writer.lock().expect("lock");
        let text = String::from_utf8(guard.clone()).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("awaiting approval"));
        assert!(lines[1].contains("completed"));
    }
}
