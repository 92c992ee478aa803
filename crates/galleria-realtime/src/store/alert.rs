//! User-facing alert seam.
//!
//! The store announces freshly pushed unread notifications through this
//! trait instead of driving a UI directly, so the presentation (toast,
//! desktop notification, log line) is chosen by the embedder.

use tracing::info;

use galleria_entity::Notification;

/// Receiver for "a new notification arrived" announcements.
pub trait AlertSink: Send + Sync {
    /// Announce one freshly received unread notification.
    fn notify(&self, notification: &Notification);
}

/// Discards all alerts.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAlerts;

impl AlertSink for NoAlerts {
    fn notify(&self, _notification: &Notification) {}
}

/// Emits alerts as structured log lines; used by the headless agent.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAlerts;

impl AlertSink for LogAlerts {
    fn notify(&self, notification: &Notification) {
        info!(
            id = %notification.id,
            kind = %notification.kind,
            sender = %notification.sender.username,
            message = %notification.message,
            "New notification"
        );
    }
}
