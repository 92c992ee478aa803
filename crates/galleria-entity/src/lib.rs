//! # galleria-entity
//!
//! Domain entities shared between the real-time channel and the REST
//! client: notifications, their kinds, and the denormalized sender info
//! the server embeds in each notification.

pub mod notification;

pub use notification::kind::NotificationKind;
pub use notification::model::{Notification, NotificationSender};
