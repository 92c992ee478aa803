//! Wire message types for the notification channel.

pub mod types;
