//! Notification kind — an open string enum.
//!
//! The server is free to introduce new kinds at any time; unrecognized
//! values are preserved verbatim in [`NotificationKind::Other`] instead of
//! failing deserialization.

use std::fmt;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// The event category that triggered a notification.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// Someone rated one of the principal's paintings.
    Rating,
    /// Someone commented on one of the principal's paintings.
    Comment,
    /// Someone replied to one of the principal's comments.
    Reply,
    /// A kind this client version does not know about.
    Other(String),
}

impl NotificationKind {
    /// Return the kind as its wire string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Rating => "rating",
            Self::Comment => "comment",
            Self::Reply => "reply",
            Self::Other(s) => s.as_str(),
        }
    }
}

impl From<&str> for NotificationKind {
    fn from(s: &str) -> Self {
        match s {
            "rating" => Self::Rating,
            "comment" => Self::Comment,
            "reply" => Self::Reply,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for NotificationKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NotificationKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s.as_str()))
    }
}
