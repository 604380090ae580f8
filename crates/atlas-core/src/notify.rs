//! Notification sink for rejected submissions.
//!
//! Showing the alert banner, playing the alert sound, and vibrating the
//! device all belong to the view. The core only says what to announce
//! through the [`NotificationSink`] trait, fire-and-forget.

use tracing::warn;

use crate::config::NotificationConfig;

/// Receives user-facing rejection notices.
pub trait NotificationSink {
    /// Announce that a submission was rejected. Nothing is returned to the
    /// caller.
    fn notify_rejected(&mut self, message: &str);
}

/// A sink that only writes a structured log line.
///
/// Useful where no view is attached; the log carries the same alert
/// parameters a view would use.
#[derive(Debug, Clone)]
pub struct LogNotificationSink {
    vibration_pattern_ms: Vec<u64>,
    alert_display_ms: u64,
}

impl LogNotificationSink {
    /// Create a sink from notification settings.
    pub fn new(config: &NotificationConfig) -> Self {
        Self {
            vibration_pattern_ms: config.vibration_pattern_ms.clone(),
            alert_display_ms: config.alert_display_ms,
        }
    }
}

impl NotificationSink for LogNotificationSink {
    fn notify_rejected(&mut self, message: &str) {
        warn!(
            message,
            vibration_pattern_ms = ?self.vibration_pattern_ms,
            alert_display_ms = self.alert_display_ms,
            "submission rejected"
        );
    }
}

/// A sink that keeps every message until drained.
///
/// The session driver uses it to attach notices to its responses.
#[derive(Debug, Clone, Default)]
pub struct CollectingNotificationSink {
    messages: Vec<String>,
}

impl CollectingNotificationSink {
    /// Create an empty sink.
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Messages received so far.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Take all messages received so far.
    pub fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }
}

impl NotificationSink for CollectingNotificationSink {
    fn notify_rejected(&mut self, message: &str) {
        self.messages.push(message.to_owned());
    }
}

/// Fan a notice out to two sinks, in order.
impl<A: NotificationSink, B: NotificationSink> NotificationSink for (A, B) {
    fn notify_rejected(&mut self, message: &str) {
        self.0.notify_rejected(message);
        self.1.notify_rejected(message);
    }
}
