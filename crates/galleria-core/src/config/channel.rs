//! Real-time channel configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for the persistent notification channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// WebSocket endpoint URL, e.g. `wss://galleria.example.com/ws`.
    /// Principal id and credential are appended as query parameters.
    pub url: String,
    /// Fixed delay before a reconnect attempt, in seconds.
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_seconds: u64,
    /// Connection handshake timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Buffer size for the outbound message queue.
    #[serde(default = "default_send_buffer")]
    pub send_buffer_size: usize,
}

impl ChannelConfig {
    /// Reconnect delay as a [`Duration`].
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_seconds)
    }

    /// Handshake timeout as a [`Duration`].
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

fn default_reconnect_delay() -> u64 {
    3
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_send_buffer() -> usize {
    64
}
