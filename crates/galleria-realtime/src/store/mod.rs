//! Notification store — local state merged from push events and REST pulls.

pub mod alert;
pub mod gateway;
pub mod store;

pub use alert::{AlertSink, LogAlerts, NoAlerts};
pub use gateway::NotificationGateway;
pub use store::NotificationStore;
