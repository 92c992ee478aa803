//! Inbound and outbound channel message type definitions.
//!
//! Every frame, both directions, is a JSON envelope `{ "type": string,
//! "data"?: any }`. Outbound messages serialize through serde's adjacent
//! tagging; inbound messages are decoded through [`ServerMessage::decode`]
//! so that unrecognized types land in an explicit [`ServerMessage::Unknown`]
//! variant instead of being a deserialization error.

use serde::{Deserialize, Serialize};

use galleria_core::types::id::NotificationId;
use galleria_core::{AppError, AppResult};
use galleria_entity::Notification;

/// Messages sent by the client to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Request a full notification resync.
    GetNotifications,
    /// Mark a single notification as read.
    MarkRead {
        /// Notification to mark.
        notification_id: NotificationId,
    },
    /// Mark every notification as read.
    MarkAllRead,
}

/// Messages pushed by the server to the client.
#[derive(Debug, Clone)]
pub enum ServerMessage {
    /// A single new notification.
    Notification(Notification),
    /// Authoritative unread count, without notification bodies.
    UnreadCount {
        /// Server-reported unread count.
        count: i64,
    },
    /// Authoritative full notification snapshot.
    NotificationsList(Vec<Notification>),
    /// A message type this client version does not understand.
    Unknown {
        /// The envelope's `type` field.
        kind: String,
        /// The envelope's raw `data` payload.
        data: serde_json::Value,
    },
}

/// Raw inbound envelope, before the `type` field is interpreted.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// Payload of an `unread_count` envelope.
#[derive(Debug, Deserialize)]
struct UnreadCountPayload {
    count: i64,
}

impl ServerMessage {
    /// Decode a raw inbound text frame.
    ///
    /// Known types with malformed payloads are errors; unknown types are
    /// not — they decode into [`ServerMessage::Unknown`].
    pub fn decode(raw: &str) -> AppResult<Self> {
        let envelope: Envelope = serde_json::from_str(raw)
            .map_err(|e| AppError::serialization(format!("Invalid message envelope: {e}")))?;

        match envelope.kind.as_str() {
            "notification" => {
                let notification: Notification = serde_json::from_value(envelope.data)
                    .map_err(|e| {
                        AppError::serialization(format!("Invalid notification payload: {e}"))
                    })?;
                Ok(Self::Notification(notification))
            }
            "unread_count" => {
                let payload: UnreadCountPayload = serde_json::from_value(envelope.data)
                    .map_err(|e| {
                        AppError::serialization(format!("Invalid unread_count payload: {e}"))
                    })?;
                Ok(Self::UnreadCount {
                    count: payload.count,
                })
            }
            "notifications_list" => {
                let list: Vec<Notification> =
                    serde_json::from_value(envelope.data).map_err(|e| {
                        AppError::serialization(format!("Invalid notifications_list payload: {e}"))
                    })?;
                Ok(Self::NotificationsList(list))
            }
            _ => Ok(Self::Unknown {
                kind: envelope.kind,
                data: envelope.data,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_get_notifications() {
        let value = serde_json::to_value(ClientMessage::GetNotifications).expect("serialize");
        assert_eq!(value, json!({"type": "get_notifications"}));
    }

    #[test]
    fn test_encode_mark_read() {
        let msg = ClientMessage::MarkRead {
            notification_id: NotificationId::new(9),
        };
        let value = serde_json::to_value(msg).expect("serialize");
        assert_eq!(
            value,
            json!({"type": "mark_read", "data": {"notification_id": 9}})
        );
    }

    #[test]
    fn test_decode_unread_count() {
        let msg =
            ServerMessage::decode(r#"{"type": "unread_count", "data": {"count": 5}}"#).unwrap();
        assert!(matches!(msg, ServerMessage::UnreadCount { count: 5 }));
    }

    #[test]
    fn test_decode_unknown_type_tolerated() {
        let msg =
            ServerMessage::decode(r#"{"type": "presence", "data": {"status": "online"}}"#).unwrap();
        match msg {
            ServerMessage::Unknown { kind, .. } => assert_eq!(kind, "presence"),
            other => panic!("expected Unknown, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_missing_data_defaults_to_null() {
        let msg = ServerMessage::decode(r#"{"type": "ack"}"#).unwrap();
        match msg {
            ServerMessage::Unknown { data, .. } => assert!(data.is_null()),
            other => panic!("expected Unknown, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_malformed_payload_is_error() {
        let result = ServerMessage::decode(r#"{"type": "unread_count", "data": {"n": true}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_garbage_is_error() {
        assert!(ServerMessage::decode("not json at all").is_err());
    }
}
