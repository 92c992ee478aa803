//! Shared test helpers: a fake Galleria server speaking both protocols.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{any, get, put};
use axum::{Json, Router};
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::sync::broadcast;

use galleria_core::config::channel::ChannelConfig;

/// Recorded and scripted server-side state.
pub struct FakeState {
    /// Decoded frames the client sent over the channel.
    pub ws_received: Mutex<Vec<Value>>,
    /// REST calls in "METHOD path" form, in arrival order.
    pub rest_calls: Mutex<Vec<String>>,
    /// Notification payloads served by `GET /api/notifications`.
    pub notifications: Mutex<Vec<Value>>,
    /// Count served by `GET /api/notifications/unread-count`.
    pub unread: Mutex<u64>,
    push_tx: broadcast::Sender<String>,
}

/// An in-process server exposing the REST API and the channel endpoint.
pub struct FakeGallery {
    pub addr: SocketAddr,
    pub state: Arc<FakeState>,
}

impl FakeGallery {
    /// Bind on an ephemeral port and start serving.
    pub async fn start() -> Self {
        let (push_tx, _) = broadcast::channel(32);
        let state = Arc::new(FakeState {
            ws_received: Mutex::new(Vec::new()),
            rest_calls: Mutex::new(Vec::new()),
            notifications: Mutex::new(Vec::new()),
            unread: Mutex::new(0),
            push_tx,
        });

        let router = Router::new()
            .route("/ws", any(ws_handler))
            .route("/api/notifications", get(list_notifications))
            .route("/api/notifications/unread-count", get(unread_count))
            .route("/api/notifications/{id}/read", put(mark_read))
            .route("/api/notifications/read-all", put(mark_all_read))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake server");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve");
        });

        Self { addr, state }
    }

    pub fn api_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn channel_config(&self) -> ChannelConfig {
        ChannelConfig {
            url: format!("ws://{}/ws", self.addr),
            reconnect_delay_seconds: 3,
            connect_timeout_seconds: 5,
            send_buffer_size: 16,
        }
    }

    /// Push a frame to every connected channel client.
    pub fn push(&self, frame: Value) {
        // No receivers is fine; the send just records nothing.
        let _ = self.state.push_tx.send(frame.to_string());
    }

    /// How many frames of the given type the client has sent.
    pub fn sent_count(&self, kind: &str) -> usize {
        self.state
            .ws_received
            .lock()
            .unwrap()
            .iter()
            .filter(|v| v.get("type").and_then(Value::as_str) == Some(kind))
            .count()
    }

    pub fn rest_calls(&self) -> Vec<String> {
        self.state.rest_calls.lock().unwrap().clone()
    }
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<FakeState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<FakeState>) {
    let mut push_rx = state.push_tx.subscribe();
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            frame = push_rx.recv() => {
                let Ok(frame) = frame else { break };
                if sink.send(WsMessage::Text(frame.into())).await.is_err() {
                    break;
                }
            }
            inbound = stream.next() => {
                match inbound {
                    Some(Ok(WsMessage::Text(text))) => {
                        if let Ok(value) = serde_json::from_str::<Value>(text.as_str()) {
                            state.ws_received.lock().unwrap().push(value);
                        }
                    }
                    Some(Ok(WsMessage::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}

async fn list_notifications(State(state): State<Arc<FakeState>>) -> Json<Value> {
    state
        .rest_calls
        .lock()
        .unwrap()
        .push("GET /api/notifications".to_string());
    let notifications = state.notifications.lock().unwrap().clone();
    Json(json!({"success": true, "data": notifications}))
}

async fn unread_count(State(state): State<Arc<FakeState>>) -> Json<Value> {
    state
        .rest_calls
        .lock()
        .unwrap()
        .push("GET /api/notifications/unread-count".to_string());
    let count = *state.unread.lock().unwrap();
    Json(json!({"success": true, "data": {"count": count}}))
}

async fn mark_read(State(state): State<Arc<FakeState>>, Path(id): Path<i64>) -> Json<Value> {
    state
        .rest_calls
        .lock()
        .unwrap()
        .push(format!("PUT /api/notifications/{id}/read"));
    Json(json!({"success": true, "data": {"marked": 1}}))
}

async fn mark_all_read(State(state): State<Arc<FakeState>>) -> Json<Value> {
    state
        .rest_calls
        .lock()
        .unwrap()
        .push("PUT /api/notifications/read-all".to_string());
    let marked = *state.unread.lock().unwrap();
    Json(json!({"success": true, "data": {"marked": marked}}))
}

/// Build a notification payload in the server's wire shape.
pub fn notification_json(id: i64, is_read: bool) -> Value {
    json!({
        "id": id,
        "type": "comment",
        "message": format!("New comment on painting {id}"),
        "sender": {
            "id": 100 + id,
            "username": format!("artist{id}"),
            "full_name": format!("Artist {id}"),
            "avatar_url": null
        },
        "painting_id": 7,
        "is_read": is_read,
        "created_at": "2026-08-29T10:00:00Z"
    })
}

/// Poll until the condition holds or two seconds elapse.
pub async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
