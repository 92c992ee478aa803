//! REST API collaborator configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for the Galleria REST API client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the REST API, e.g. `https://galleria.example.com`.
    pub base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// User agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl ApiConfig {
    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("galleria-notify/", env!("CARGO_PKG_VERSION")).to_string()
}
