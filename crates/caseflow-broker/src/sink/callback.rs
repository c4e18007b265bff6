// caseflow-broker/src/sink/callback.rs
// ============================================================================
// Module: Caseflow Callback Notification Sink
// Description: Callback-based sink for synchronous delivery.
// Purpose: Invoke a user-provided function with each notification; used by
//          tests and by demos wiring the engine to a custom transport
//          without a dedicated sink type.
// Dependencies: caseflow-core, std
// ============================================================================

//! ## Overview
//! [`CallbackSink`] delivers notifications by invoking a user-supplied
//! closure and propagating its result.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use caseflow_core::CaseId;
use caseflow_core::NotificationError;
use caseflow_core::NotificationSink;

// ============================================================================
// SECTION: Callback Sink
// ============================================================================

/// Callback handler signature used by [`CallbackSink`].
type Handler = dyn Fn(&CaseId, &str) -> Result<(), NotificationError> + Send + Sync;

/// Callback-based notification sink.
#[derive(Clone)]
pub struct CallbackSink {
    /// Handler invoked with the case id and message.
    handler: Arc<Handler>,
}

impl CallbackSink {
    /// Creates a callback sink from a handler function.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&CaseId, &str) -> Result<(), NotificationError> + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
        }
    }
}

impl NotificationSink for CallbackSink {
    fn notify(&self, case_id: &CaseId, message: &str) -> Result<(), NotificationError> {
        (self.handler)(case_id, message)
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

    use std::sync::Mutex;

    use super::*;

    #[test]
    fn invokes_handler_with_case_and_message() {
        let seen: Arc<Mutex<Vec<(CaseId, String)>>> = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&seen);
        let sink = CallbackSink::new(move |case_id, message| {
            recorded
                .lock()
                .expect("lock")
                .push((case_id.clone(), message.to_string()));
            Ok(())
        });
        sink.notify(&CaseId::new("c-1"), "completed").expect("notify");
        let recorded = seen.lock().expect("lock");
        assert_eq!(recorded.as_slice(), [(CaseId::new("c-1"), "completed".to_string())]);
    }

    #[test]
    fn propagates_handler_error() {
        let sink = CallbackSink::new(|_, _| Err(NotificationError::Delivery("boom".to_string())));
        assert!(sink.notify(&CaseId::new("c-1"), "hello").is_err());
    }
}
