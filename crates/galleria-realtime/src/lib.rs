//! # galleria-realtime
//!
//! Real-time notification synchronization core for Galleria. Provides:
//!
//! - A WebSocket channel client with fixed-delay reconnection
//! - An in-process event bus decoupling transport from application logic
//! - A notification store reconciling push events with REST snapshots
//! - Session wiring that owns one channel + store per authenticated user

pub mod bus;
pub mod channel;
pub mod event;
pub mod message;
pub mod session;
pub mod store;

#[cfg(test)]
pub(crate) mod test_util;

pub use bus::EventBus;
pub use channel::client::ChannelClient;
pub use channel::PushSender;
pub use event::{ChannelEvent, EventKind};
pub use message::types::{ClientMessage, ServerMessage};
pub use session::NotificationSession;
pub use store::alert::{AlertSink, LogAlerts, NoAlerts};
pub use store::gateway::NotificationGateway;
pub use store::store::NotificationStore;
