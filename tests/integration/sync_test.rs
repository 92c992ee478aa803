//! End-to-end notification synchronization tests.

use std::sync::Arc;

use serde_json::json;

use galleria_client::ApiClient;
use galleria_core::config::api::ApiConfig;
use galleria_core::types::id::{NotificationId, UserId};
use galleria_realtime::{NoAlerts, NotificationGateway, NotificationSession};

use crate::helpers::{notification_json, wait_until, FakeGallery};

fn api_client(server: &FakeGallery) -> Arc<ApiClient> {
    let config = ApiConfig {
        base_url: server.api_url(),
        timeout_seconds: 5,
        user_agent: "galleria-notify/test".to_string(),
    };
    let client = Arc::new(ApiClient::new(&config).expect("build client"));
    client.set_token(Some("test-token".to_string()));
    client
}

fn session(server: &FakeGallery) -> NotificationSession {
    let api = api_client(server);
    let gateway: Arc<dyn NotificationGateway> = api;
    NotificationSession::new(server.channel_config(), gateway, Arc::new(NoAlerts))
}

#[tokio::test]
async fn test_sign_in_connects_and_primes_from_rest() {
    let server = FakeGallery::start().await;
    *server.state.notifications.lock().unwrap() =
        vec![notification_json(2, false), notification_json(1, true)];
    *server.state.unread.lock().unwrap() = 1;

    let session = session(&server);
    session.sign_in(UserId::new(42), "test-token").await.expect("sign in");

    assert!(session.channel().is_connected());
    assert!(session.is_connected());
    assert_eq!(session.unread_count(), 1);
    let list = session.notifications();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].id, NotificationId::new(2));

    // The channel resync request reaches the server exactly once.
    assert!(wait_until(|| server.sent_count("get_notifications") == 1).await);

    let calls = server.rest_calls();
    assert!(calls.contains(&"GET /api/notifications".to_string()));
    assert!(calls.contains(&"GET /api/notifications/unread-count".to_string()));
}

#[tokio::test]
async fn test_second_sign_in_does_not_duplicate_resync() {
    let server = FakeGallery::start().await;
    let session = session(&server);

    session.sign_in(UserId::new(42), "test-token").await.expect("sign in");
    session.sign_in(UserId::new(42), "test-token").await.expect("repeat sign in");

    assert!(wait_until(|| server.sent_count("get_notifications") >= 1).await);
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert_eq!(server.sent_count("get_notifications"), 1);
}

#[tokio::test]
async fn test_pushed_frames_update_the_store() {
    let server = FakeGallery::start().await;
    let session = session(&server);
    session.sign_in(UserId::new(42), "test-token").await.expect("sign in");

    server.push(json!({"type": "unread_count", "data": {"count": 5}}));
    assert!(wait_until(|| session.unread_count() == 5).await);

    server.push(json!({"type": "notification", "data": notification_json(9, false)}));
    assert!(wait_until(|| session.unread_count() == 6).await);
    assert_eq!(session.notifications()[0].id, NotificationId::new(9));
}

#[tokio::test]
async fn test_unknown_frame_types_are_tolerated() {
    let server = FakeGallery::start().await;
    let session = session(&server);
    session.sign_in(UserId::new(42), "test-token").await.expect("sign in");

    server.push(json!({"type": "promo_banner", "data": {"text": "50% off prints"}}));
    server.push(json!({"type": "unread_count", "data": {"count": 2}}));

    assert!(wait_until(|| session.unread_count() == 2).await);
    assert!(session.notifications().is_empty());
}

#[tokio::test]
async fn test_mark_as_read_writes_through_both_protocols() {
    let server = FakeGallery::start().await;
    *server.state.notifications.lock().unwrap() = vec![notification_json(9, false)];
    *server.state.unread.lock().unwrap() = 1;

    let session = session(&server);
    session.sign_in(UserId::new(42), "test-token").await.expect("sign in");

    session.mark_as_read(NotificationId::new(9)).await.expect("mark read");

    assert_eq!(session.unread_count(), 0);
    assert!(session.notifications()[0].is_read);
    assert!(wait_until(|| server.sent_count("mark_read") == 1).await);
    assert!(wait_until(|| {
        server
            .rest_calls()
            .contains(&"PUT /api/notifications/9/read".to_string())
    })
    .await);
}

#[tokio::test]
async fn test_mark_all_as_read_writes_through_both_protocols() {
    let server = FakeGallery::start().await;
    *server.state.notifications.lock().unwrap() =
        vec![notification_json(2, false), notification_json(1, false)];
    *server.state.unread.lock().unwrap() = 2;

    let session = session(&server);
    session.sign_in(UserId::new(42), "test-token").await.expect("sign in");

    session.mark_all_as_read().await.expect("mark all");

    assert_eq!(session.unread_count(), 0);
    assert!(session.notifications().iter().all(|n| n.is_read));
    assert!(wait_until(|| server.sent_count("mark_all_read") == 1).await);
    assert!(wait_until(|| {
        server
            .rest_calls()
            .contains(&"PUT /api/notifications/read-all".to_string())
    })
    .await);
}

#[tokio::test]
async fn test_refresh_repulls_the_snapshot() {
    let server = FakeGallery::start().await;
    let session = session(&server);
    session.sign_in(UserId::new(42), "test-token").await.expect("sign in");
    assert!(session.notifications().is_empty());

    *server.state.notifications.lock().unwrap() = vec![notification_json(3, false)];
    *server.state.unread.lock().unwrap() = 1;
    session.refresh().await.expect("refresh");

    assert_eq!(session.notifications().len(), 1);
    assert_eq!(session.unread_count(), 1);
    // Refresh asks both paths: one resync frame beyond the connect-time one.
    assert!(wait_until(|| server.sent_count("get_notifications") == 2).await);
}

#[tokio::test]
async fn test_sign_out_closes_channel_and_clears_state() {
    let server = FakeGallery::start().await;
    *server.state.notifications.lock().unwrap() = vec![notification_json(1, false)];
    *server.state.unread.lock().unwrap() = 1;

    let session = session(&server);
    session.sign_in(UserId::new(42), "test-token").await.expect("sign in");
    assert_eq!(session.unread_count(), 1);

    session.sign_out();

    assert!(!session.channel().is_connected());
    assert!(!session.is_connected());
    assert!(session.notifications().is_empty());
    assert_eq!(session.unread_count(), 0);

    // Frames pushed after sign-out must not resurrect state.
    server.push(json!({"type": "unread_count", "data": {"count": 9}}));
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert_eq!(session.unread_count(), 0);
}
