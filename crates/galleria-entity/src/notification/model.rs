//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use galleria_core::types::id::{CommentId, NotificationId, PaintingId, RatingId, UserId};

use super::kind::NotificationKind;

/// A notification directed at the authenticated principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Unique notification identifier, assigned by the server.
    pub id: NotificationId,
    /// Event category that triggered this notification.
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Display text.
    pub message: String,
    /// Who triggered the event (denormalized).
    pub sender: NotificationSender,
    /// Painting involved, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub painting_id: Option<PaintingId>,
    /// Comment involved, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<CommentId>,
    /// Rating involved, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_id: Option<RatingId>,
    /// Whether the principal has read this notification.
    pub is_read: bool,
    /// When the notification was created server-side.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Check if the notification has not been read yet.
    pub fn is_unread(&self) -> bool {
        !self.is_read
    }
}

/// Denormalized sender info embedded in each notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSender {
    /// Sender's user id.
    pub id: UserId,
    /// Sender's username.
    pub username: String,
    /// Sender's full name.
    pub full_name: String,
    /// Optional avatar reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}
