//! Connection state owned by the channel client.

use std::fmt;

use galleria_core::types::id::UserId;

/// Lifecycle state of the channel connection. Not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection and none being established.
    Disconnected,
    /// A connect attempt is in flight.
    Connecting,
    /// The channel is open.
    Connected,
}

impl ConnectionState {
    /// Whether the channel is open.
    pub fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        };
        write!(f, "{name}")
    }
}

/// The (principal, credential) pair the channel is addressed with.
///
/// Kept between disconnects so scheduled reconnects can redial; cleared by
/// a manual disconnect, which permanently suppresses auto-reconnect.
#[derive(Debug, Clone)]
pub(crate) struct Identity {
    pub user_id: UserId,
    pub token: String,
}
