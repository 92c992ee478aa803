//! WebSocket channel client with fixed-delay reconnection.
//!
//! Exactly one live connection per (principal, credential) pair. Abnormal
//! closes (code != 1000) schedule a single reconnect attempt after a fixed
//! delay; a manual [`ChannelClient::disconnect`] cancels any pending
//! attempt and clears the stored identity so no further redials happen.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{Message, Utf8Bytes};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use galleria_core::config::channel::ChannelConfig;
use galleria_core::types::id::UserId;
use galleria_core::{AppError, AppResult};

use crate::bus::EventBus;
use crate::event::ChannelEvent;
use crate::message::types::{ClientMessage, ServerMessage};

use super::state::{ConnectionState, Identity};
use super::PushSender;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Close code for a manual/normal closure; suppresses reconnection.
const CLOSE_NORMAL: u16 = 1000;
/// Close code reported when the connection drops without a close frame.
const CLOSE_ABNORMAL: u16 = 1006;

/// The persistent notification channel.
///
/// Cheap to clone; all clones share one connection.
#[derive(Clone)]
pub struct ChannelClient {
    shared: Arc<Shared>,
}

struct Shared {
    config: ChannelConfig,
    bus: Arc<EventBus>,
    state: Mutex<ConnectionState>,
    identity: Mutex<Option<Identity>>,
    outbound: Mutex<Option<mpsc::Sender<ClientMessage>>>,
    shutdown: Mutex<Option<mpsc::Sender<()>>>,
    reconnect: Mutex<Option<JoinHandle<()>>>,
    reconnect_attempts: AtomicU32,
}

impl ChannelClient {
    /// Create a disconnected channel client emitting into the given bus.
    pub fn new(config: ChannelConfig, bus: Arc<EventBus>) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                bus,
                state: Mutex::new(ConnectionState::Disconnected),
                identity: Mutex::new(None),
                outbound: Mutex::new(None),
                shutdown: Mutex::new(None),
                reconnect: Mutex::new(None),
                reconnect_attempts: AtomicU32::new(0),
            }),
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.shared.state.lock().expect("channel lock poisoned")
    }

    /// Whether the channel is open.
    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// Number of scheduled reconnect attempts that have fired.
    pub fn reconnect_attempts(&self) -> u32 {
        self.shared.reconnect_attempts.load(Ordering::SeqCst)
    }

    /// Open the channel for the given principal.
    ///
    /// A no-op if a connection is already open or a connect attempt is in
    /// flight (for the same or a different identity). On successful open
    /// this cancels any pending reconnect, emits
    /// [`ChannelEvent::Connected`], and immediately requests a
    /// notification resync so events missed while offline are recovered.
    ///
    /// # Errors
    ///
    /// Returns a network error if the handshake fails or times out; no
    /// retry is scheduled from this path.
    pub async fn connect(&self, user_id: UserId, token: &str) -> AppResult<()> {
        {
            let mut state = self.shared.state.lock().expect("channel lock poisoned");
            if *state != ConnectionState::Disconnected {
                debug!(current = %state, "connect() ignored, channel not idle");
                return Ok(());
            }
            *state = ConnectionState::Connecting;
        }

        *self.shared.identity.lock().expect("channel lock poisoned") = Some(Identity {
            user_id,
            token: token.to_string(),
        });

        let url = format!("{}?user_id={}&token={}", self.shared.config.url, user_id, token);
        let dial = timeout(self.shared.config.connect_timeout(), connect_async(&url)).await;
        let ws = match dial {
            Ok(Ok((ws, _response))) => ws,
            Ok(Err(e)) => {
                return self.fail_connect(format!("WebSocket connect failed: {e}"));
            }
            Err(_) => {
                return self.fail_connect(format!(
                    "WebSocket connect timed out after {}s",
                    self.shared.config.connect_timeout_seconds
                ));
            }
        };

        // A disconnect() issued while the dial was in flight has already
        // torn the session down; the late handshake must not revive it.
        let still_wanted = {
            let state = self.shared.state.lock().expect("channel lock poisoned");
            *state == ConnectionState::Connecting
                && self
                    .shared
                    .identity
                    .lock()
                    .expect("channel lock poisoned")
                    .is_some()
        };
        if !still_wanted {
            debug!("Discarding handshake that completed after disconnect");
            let mut ws = ws;
            tokio::spawn(async move {
                let _ = ws.close(None).await;
            });
            return Ok(());
        }

        self.shared.cancel_reconnect();

        let (out_tx, out_rx) = mpsc::channel(self.shared.config.send_buffer_size);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        *self.shared.outbound.lock().expect("channel lock poisoned") = Some(out_tx.clone());
        *self.shared.shutdown.lock().expect("channel lock poisoned") = Some(shutdown_tx);
        *self.shared.state.lock().expect("channel lock poisoned") = ConnectionState::Connected;

        self.shared.bus.emit(&ChannelEvent::Connected);

        // Pull-on-connect: close the missed-event window straight away.
        let _ = out_tx.try_send(ClientMessage::GetNotifications);

        tokio::spawn(run_loop(Arc::clone(&self.shared), ws, out_rx, shutdown_rx));

        info!(user_id = %user_id, "Notification channel connected");
        Ok(())
    }

    /// Close the channel with the normal-closure code.
    ///
    /// Cancels any scheduled reconnect and clears the stored identity, so
    /// no automatic redial happens until the next [`connect`].
    ///
    /// [`connect`]: ChannelClient::connect
    pub fn disconnect(&self) {
        self.shared.cancel_reconnect();
        *self.shared.identity.lock().expect("channel lock poisoned") = None;
        *self.shared.outbound.lock().expect("channel lock poisoned") = None;
        let shutdown = self
            .shared
            .shutdown
            .lock()
            .expect("channel lock poisoned")
            .take();

        let was_open = {
            let mut state = self.shared.state.lock().expect("channel lock poisoned");
            let was = *state != ConnectionState::Disconnected;
            *state = ConnectionState::Disconnected;
            was
        };

        if let Some(tx) = shutdown {
            let _ = tx.try_send(());
        }

        if was_open {
            info!("Notification channel disconnected by client");
            self.shared.bus.emit(&ChannelEvent::Disconnected {
                code: CLOSE_NORMAL,
                reason: "client disconnect".to_string(),
            });
        }
    }

    /// Queue a message for delivery, best-effort.
    ///
    /// Dropped with a warning when the channel is not connected; callers
    /// must not assume delivery.
    pub fn send(&self, message: ClientMessage) {
        let sender = {
            let state = self.shared.state.lock().expect("channel lock poisoned");
            if !state.is_connected() {
                None
            } else {
                self.shared
                    .outbound
                    .lock()
                    .expect("channel lock poisoned")
                    .clone()
            }
        };

        match sender {
            Some(tx) => {
                if tx.try_send(message.clone()).is_err() {
                    warn!(?message, "Dropping channel message, send queue unavailable");
                }
            }
            None => {
                warn!(?message, "Dropping channel message, channel not connected");
            }
        }
    }

    /// Mark a failed connect attempt: back to disconnected, error event,
    /// no retry scheduled.
    fn fail_connect(&self, detail: String) -> AppResult<()> {
        *self.shared.state.lock().expect("channel lock poisoned") = ConnectionState::Disconnected;
        warn!(detail = %detail, "Channel connect failed");
        self.shared.bus.emit(&ChannelEvent::ChannelError {
            detail: detail.clone(),
        });
        Err(AppError::network(detail))
    }
}

impl PushSender for ChannelClient {
    fn send(&self, message: ClientMessage) {
        ChannelClient::send(self, message);
    }
}

impl Shared {
    fn cancel_reconnect(&self) {
        if let Some(handle) = self
            .reconnect
            .lock()
            .expect("channel lock poisoned")
            .take()
        {
            handle.abort();
        }
    }

    /// Schedule one reconnect attempt after the fixed delay.
    ///
    /// Only if an identity is still stored, and never more than one pending
    /// timer at a time. A fired attempt that fails schedules the next one;
    /// retries are unbounded.
    fn schedule_reconnect(shared: &Arc<Shared>) {
        if shared
            .identity
            .lock()
            .expect("channel lock poisoned")
            .is_none()
        {
            return;
        }

        let mut pending = shared.reconnect.lock().expect("channel lock poisoned");
        if pending.as_ref().is_some_and(|h| !h.is_finished()) {
            return;
        }

        let delay = shared.config.reconnect_delay();
        let task_shared = Arc::clone(shared);
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            // Drop our own handle first so a successful connect does not
            // abort the task that is performing it.
            *task_shared.reconnect.lock().expect("channel lock poisoned") = None;

            let identity = task_shared
                .identity
                .lock()
                .expect("channel lock poisoned")
                .clone();
            let Some(identity) = identity else {
                return;
            };

            let attempt = task_shared.reconnect_attempts.fetch_add(1, Ordering::SeqCst) + 1;
            info!(attempt, user_id = %identity.user_id, "Attempting channel reconnect");

            let client = ChannelClient {
                shared: Arc::clone(&task_shared),
            };
            if let Err(e) = client.connect(identity.user_id, &identity.token).await {
                warn!(attempt, error = %e, "Reconnect attempt failed");
                Shared::schedule_reconnect(&task_shared);
            }
        }));
    }
}

/// Tear down after the connection closed from the transport side.
///
/// Skipped entirely when a manual disconnect already handled the close
/// (the shutdown sender is gone in that case).
fn finish_closed(shared: &Arc<Shared>, code: u16, reason: String) {
    let had_channel = shared
        .shutdown
        .lock()
        .expect("channel lock poisoned")
        .take()
        .is_some();
    *shared.outbound.lock().expect("channel lock poisoned") = None;
    *shared.state.lock().expect("channel lock poisoned") = ConnectionState::Disconnected;

    if !had_channel {
        return;
    }

    warn!(code, reason = %reason, "Notification channel closed");
    shared.bus.emit(&ChannelEvent::Disconnected {
        code,
        reason: reason.clone(),
    });

    if code != CLOSE_NORMAL {
        Shared::schedule_reconnect(shared);
    }
}

/// Read/write loop for one live connection.
async fn run_loop(
    shared: Arc<Shared>,
    ws: WsStream,
    mut out_rx: mpsc::Receiver<ClientMessage>,
    mut shutdown_rx: mpsc::Receiver<()>,
) {
    let (mut sink, mut stream) = ws.split();

    let (code, reason) = loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                let frame = CloseFrame {
                    code: CloseCode::Normal,
                    reason: Utf8Bytes::from_static("client disconnect"),
                };
                let _ = sink.send(Message::Close(Some(frame))).await;
                debug!("Channel run loop exiting after client disconnect");
                return;
            }

            Some(message) = out_rx.recv() => {
                match serde_json::to_string(&message) {
                    Ok(text) => {
                        if let Err(e) = sink.send(Message::Text(text.into())).await {
                            warn!(error = %e, "Failed to send channel message");
                        }
                    }
                    Err(e) => warn!(error = %e, "Failed to serialize outbound message"),
                }
            }

            inbound = stream.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        match ServerMessage::decode(text.as_str()) {
                            Ok(message) => shared.bus.emit(&ChannelEvent::Message(message)),
                            Err(e) => warn!(error = %e, "Dropping malformed channel frame"),
                        }
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        let _ = sink.send(Message::Pong(payload)).await;
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let (code, reason) = frame
                            .map(|f| (u16::from(f.code), f.reason.to_string()))
                            .unwrap_or((CLOSE_ABNORMAL, String::new()));
                        break (code, reason);
                    }
                    Some(Ok(_)) => {
                        // Binary and pong frames are not part of the protocol.
                    }
                    Some(Err(e)) => {
                        shared.bus.emit(&ChannelEvent::ChannelError {
                            detail: e.to_string(),
                        });
                        break (CLOSE_ABNORMAL, e.to_string());
                    }
                    None => break (CLOSE_ABNORMAL, "connection reset".to_string()),
                }
            }
        }
    };

    finish_closed(&shared, code, reason);
}
