//! # galleria-client
//!
//! HTTP client for the Galleria REST API. The notification endpoints back
//! the realtime store's [`NotificationGateway`] seam; the client also
//! carries the session bearer token used by all authenticated requests.
//!
//! [`NotificationGateway`]: galleria_realtime::NotificationGateway

pub mod client;
pub mod dto;
pub mod notifications;

pub use client::ApiClient;
