//! Shared fixtures for unit tests.

use chrono::Utc;

use galleria_core::types::id::{NotificationId, UserId};
use galleria_entity::{Notification, NotificationKind, NotificationSender};

/// Build a notification fixture with the given id and read flag.
pub(crate) fn notification(id: i64, is_read: bool) -> Notification {
    Notification {
        id: NotificationId::new(id),
        kind: NotificationKind::Comment,
        message: format!("notification {id}"),
        sender: NotificationSender {
            id: UserId::new(100 + id),
            username: format!("sender{id}"),
            full_name: format!("Sender {id}"),
            avatar_url: None,
        },
        painting_id: None,
        comment_id: None,
        rating_id: None,
        is_read,
        created_at: Utc::now(),
    }
}
