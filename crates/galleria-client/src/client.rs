//! The HTTP client core: base URL, bearer token, request plumbing.

use std::sync::RwLock;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;

use galleria_core::config::api::ApiConfig;
use galleria_core::{AppError, AppResult};

use crate::dto::ApiResponse;

/// Client for the Galleria REST API.
///
/// Holds the session bearer token behind a lock so one client instance can
/// be shared across tasks and re-authenticated in place.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl ApiClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Configuration error if the underlying HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                AppError::configuration(format!("Failed to build HTTP client: {e}"))
            })?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    /// Install or clear the session bearer token.
    pub fn set_token(&self, token: Option<String>) {
        *self.token.write().expect("token lock poisoned") = token;
    }

    /// Perform a GET and unwrap the response envelope.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let request = self.http.get(self.url(path));
        self.execute(path, request).await
    }

    /// Perform a bodyless PUT and unwrap the response envelope.
    pub(crate) async fn put<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let request = self.http.put(self.url(path));
        self.execute(path, request).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        path: &str,
        mut request: reqwest::RequestBuilder,
    ) -> AppResult<T> {
        let token = self.token.read().expect("token lock poisoned").clone();
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        debug!(path, "API request");
        let response = request
            .send()
            .await
            .map_err(|e| AppError::network(format!("Request to {path} failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::network(format!("Failed to read response body: {e}")))?;

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(AppError::authentication(format!(
                    "API rejected credentials for {path}"
                )));
            }
            StatusCode::NOT_FOUND => {
                return Err(AppError::not_found(format!("No resource at {path}")));
            }
            s if !s.is_success() => {
                return Err(AppError::external_service(format!(
                    "API returned {s} for {path}"
                )));
            }
            _ => {}
        }

        let envelope: ApiResponse<T> = serde_json::from_str(&body).map_err(|e| {
            AppError::serialization(format!("Invalid response body from {path}: {e}"))
        })?;
        envelope.into_data()
    }
}
