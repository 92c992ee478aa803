//! Notification entity and related types.

pub mod kind;
pub mod model;
