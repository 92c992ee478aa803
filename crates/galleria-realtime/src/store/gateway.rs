//! REST gateway seam for the notification store.

use async_trait::async_trait;

use galleria_core::types::id::NotificationId;
use galleria_core::AppResult;
use galleria_entity::Notification;

/// Notification operations backed by the REST API.
///
/// The store talks to the API only through this trait; the production
/// implementation lives in `galleria-client`.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    /// Fetch the full notification snapshot, newest first.
    async fn fetch_notifications(&self) -> AppResult<Vec<Notification>>;

    /// Fetch the authoritative unread count.
    async fn fetch_unread_count(&self) -> AppResult<u64>;

    /// Persist a single notification as read.
    async fn mark_read(&self, id: NotificationId) -> AppResult<()>;

    /// Persist every notification as read.
    async fn mark_all_read(&self) -> AppResult<()>;
}
