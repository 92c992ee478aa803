//! Wire shapes for the Galleria REST API.
//!
//! Every endpoint wraps its payload in a `{ "success": bool, "data": ... }`
//! envelope; failures carry a `message` instead of `data`.

use serde::Deserialize;

use galleria_core::{AppError, AppResult};

/// The standard response envelope.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request succeeded.
    pub success: bool,
    /// Human-readable error message on failure.
    pub message: Option<String>,
    /// Payload on success. No `serde(default)` here: that would put a
    /// `T: Default` bound on the derived impl, and serde already treats
    /// missing `Option` fields as `None`.
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Unwrap the envelope into its payload.
    ///
    /// # Errors
    ///
    /// An unsuccessful envelope, or a successful one with no payload, is
    /// an external-service error.
    pub fn into_data(self) -> AppResult<T> {
        if !self.success {
            let message = self
                .message
                .unwrap_or_else(|| "request rejected by the API".to_string());
            return Err(AppError::external_service(message));
        }
        self.data
            .ok_or_else(|| AppError::external_service("successful response without data"))
    }
}

/// Payload of the unread-count endpoint.
#[derive(Debug, Deserialize)]
pub struct CountResponse {
    /// Number of unread notifications.
    pub count: u64,
}

/// Payload of the mark-read endpoints.
#[derive(Debug, Deserialize)]
pub struct MarkedResponse {
    /// Number of notifications the call transitioned to read.
    pub marked: u64,
}
