//! Transport channel — the persistent WebSocket connection to the server.

pub mod client;
pub mod state;

use crate::message::types::ClientMessage;

/// Best-effort outbound message seam.
///
/// The store depends on this trait rather than on the concrete channel
/// client, so mutation paths can be exercised with a recording fake.
/// Sends are fire-and-forget: when the channel is down the message is
/// dropped with a warning and the caller is not informed.
pub trait PushSender: Send + Sync {
    /// Queue a message for delivery, best-effort.
    fn send(&self, message: ClientMessage);
}
