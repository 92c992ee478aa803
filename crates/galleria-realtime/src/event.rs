//! Channel events fanned out through the [`EventBus`](crate::bus::EventBus).
//!
//! Connection lifecycle events (`Connected`, `Disconnected`, `Error`) are
//! generated locally by the channel client, never received on the wire;
//! everything else is a decoded server message.

use std::fmt;

use crate::message::types::ServerMessage;

/// An event observable on the bus.
#[derive(Debug, Clone)]
pub enum ChannelEvent {
    /// The channel is open.
    Connected,
    /// The channel closed, with the close code and reason.
    Disconnected {
        /// WebSocket close code (1000 = manual/normal closure).
        code: u16,
        /// Close reason text.
        reason: String,
    },
    /// A transport-level error occurred.
    ChannelError {
        /// Error description.
        detail: String,
    },
    /// A decoded server message.
    Message(ServerMessage),
}

/// Closed set of event kinds the bus dispatches on.
///
/// The source of truth for dispatch is this enum, not runtime strings;
/// server message types outside the known set map to [`EventKind::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Channel opened.
    Connected,
    /// Channel closed.
    Disconnected,
    /// Transport error.
    Error,
    /// Single new notification.
    Notification,
    /// Unread count update.
    UnreadCount,
    /// Full notification snapshot.
    NotificationsList,
    /// Unrecognized server message.
    Unknown,
}

impl ChannelEvent {
    /// The kind used for listener dispatch.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Connected => EventKind::Connected,
            Self::Disconnected { .. } => EventKind::Disconnected,
            Self::ChannelError { .. } => EventKind::Error,
            Self::Message(msg) => match msg {
                ServerMessage::Notification(_) => EventKind::Notification,
                ServerMessage::UnreadCount { .. } => EventKind::UnreadCount,
                ServerMessage::NotificationsList(_) => EventKind::NotificationsList,
                ServerMessage::Unknown { .. } => EventKind::Unknown,
            },
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Error => "error",
            Self::Notification => "notification",
            Self::UnreadCount => "unread_count",
            Self::NotificationsList => "notifications_list",
            Self::Unknown => "unknown",
        };
        write!(f, "{name}")
    }
}
