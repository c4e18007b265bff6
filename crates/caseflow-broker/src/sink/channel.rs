// caseflow-broker/src/sink/channel.rs
// ============================================================================
// Module: Caseflow Channel Notification Sink
// Description: Channel-based notification sink for asynchronous delivery.
// Purpose: Forward case notifications onto a `tokio::sync::mpsc` channel for
//          a front-end process (the chat-bot adaptive-card renderer, out of
//          scope here) reading from the same runtime.
// Dependencies: caseflow-core, tokio
// ============================================================================

//! ## Overview
//! [`ChannelSink`] delivers notifications by sending a [`NotificationMessage`]
//! into a bounded `tokio::sync::mpsc` channel. Delivery fails if the channel
//! is full or the receiver has been dropped; callers that need at-least-once
//! semantics should pair this with a bounded retry at the workflow activity
//! layer, not inside the sink.

// ============================================================================
// SECTION: Imports
// ============================================================================

use caseflow_core::CaseId;
use caseflow_core::NotificationError;
use caseflow_core::NotificationSink;
use tokio::sync::mpsc::Sender;

// ============================================================================
// SECTION: Notification Message
// ============================================================================

/// A notification forwarded through a [`ChannelSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    /// Case the notification concerns.
    pub case_id: CaseId,
    /// Notification text.
    pub message: String,
}

// ============================================================================
// SECTION: Channel Sink
// ============================================================================

/// Channel-based notification sink.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    /// Sender used to forward notifications.
    sender: Sender<NotificationMessage>,
}

impl ChannelSink {
    /// Creates a channel sink over the provided sender half.
    #[must_use]
    pub const fn new(sender: Sender<NotificationMessage>) -> Self {
        Self { sender }
    }
}

impl NotificationSink for ChannelSink {
    fn notify(&self, case_id: &CaseId, message: &str) -> Result<(), NotificationError> {
        let notification = NotificationMessage {
            case_id: case_id.clone(),
            message: message.to_string(),
        };
        self.sender
            .try_send(notification)
            .map_err(|err| NotificationError::Delivery(err.to_string()))
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
    fn forwards_notification_onto_channel() {
        let (tx, mut rx) = tokio::sync::mpsc::channel(4);
        let sink = ChannelSink::new(tx);
        sink.notify(&CaseId::new("c-1"), "awaiting approval").expect("notify");
        let received = rx.try_recv().expect("message present");
        assert_eq!(received.case_id, CaseId::new("c-1"));
        assert_eq!(received.message, "awaiting approval");
    }

    #[test]
    fn fails_delivery_when_channel_is_full() {
        let (tx, _rx) = tokio::sync::mpsc::channel(1);
        let sink = ChannelSink::new(tx);
        sink.notify(&CaseId::new("c-1"), "first").expect("first notify fits");
        assert!(sink.notify(&CaseId::new("c-1"), "second").is_err());
    }
}
