//! Notification endpoints and the realtime gateway implementation.

use async_trait::async_trait;

use galleria_core::types::id::NotificationId;
use galleria_core::AppResult;
use galleria_entity::Notification;
use galleria_realtime::NotificationGateway;

use crate::client::ApiClient;
use crate::dto::{CountResponse, MarkedResponse};

impl ApiClient {
    /// Fetch the full notification list, newest first.
    ///
    /// # Errors
    ///
    /// Network, authentication, or envelope errors from the API.
    pub async fn get_notifications(&self) -> AppResult<Vec<Notification>> {
        self.get("/api/notifications").await
    }

    /// Fetch the unread notification count.
    ///
    /// # Errors
    ///
    /// Network, authentication, or envelope errors from the API.
    pub async fn get_unread_count(&self) -> AppResult<u64> {
        let response: CountResponse = self.get("/api/notifications/unread-count").await?;
        Ok(response.count)
    }

    /// Persist one notification as read.
    ///
    /// # Errors
    ///
    /// Network, authentication, or envelope errors from the API.
    pub async fn mark_notification_read(&self, id: NotificationId) -> AppResult<()> {
        let _: MarkedResponse = self.put(&format!("/api/notifications/{id}/read")).await?;
        Ok(())
    }

    /// Persist every notification as read.
    ///
    /// # Errors
    ///
    /// Network, authentication, or envelope errors from the API.
    pub async fn mark_all_notifications_read(&self) -> AppResult<()> {
        let _: MarkedResponse = self.put("/api/notifications/read-all").await?;
        Ok(())
    }
}

#[async_trait]
impl NotificationGateway for ApiClient {
    async fn fetch_notifications(&self) -> AppResult<Vec<Notification>> {
        self.get_notifications().await
    }

    async fn fetch_unread_count(&self) -> AppResult<u64> {
        self.get_unread_count().await
    }

    async fn mark_read(&self, id: NotificationId) -> AppResult<()> {
        self.mark_notification_read(id).await
    }

    async fn mark_all_read(&self) -> AppResult<()> {
        self.mark_all_notifications_read().await
    }
}
