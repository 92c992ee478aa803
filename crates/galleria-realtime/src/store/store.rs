//! The notification store itself.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::debug;

use galleria_core::types::id::NotificationId;
use galleria_core::AppResult;
use galleria_entity::Notification;

use crate::bus::{EventBus, ListenerId};
use crate::channel::PushSender;
use crate::event::{ChannelEvent, EventKind};
use crate::message::types::{ClientMessage, ServerMessage};

use super::alert::AlertSink;
use super::gateway::NotificationGateway;

/// Local notification state for one signed-in user.
///
/// Two inflows feed the store: push messages from the channel (applied via
/// [`attach`]) and REST pulls ([`refresh`]). Mutations are optimistic
/// dual-writes: local state flips first, then the change is sent over both
/// the channel and the REST gateway. A failed remote write is reported to
/// the caller but never rolled back locally; the next authoritative
/// snapshot reconciles any divergence.
///
/// [`attach`]: NotificationStore::attach
/// [`refresh`]: NotificationStore::refresh
pub struct NotificationStore {
    push: Arc<dyn PushSender>,
    gateway: Arc<dyn NotificationGateway>,
    alerts: Arc<dyn AlertSink>,
    inner: Mutex<State>,
}

/// Snapshot-replaceable state.
///
/// `read_ids` outlives list snapshots: once an id is known read in this
/// session it stays read, even when a later snapshot or push carries the
/// stale unread flag.
#[derive(Default)]
struct State {
    notifications: Vec<Notification>,
    unread: u64,
    read_ids: HashSet<NotificationId>,
    connected: bool,
}

impl NotificationStore {
    /// Create an empty store over the given collaborators.
    pub fn new(
        push: Arc<dyn PushSender>,
        gateway: Arc<dyn NotificationGateway>,
        alerts: Arc<dyn AlertSink>,
    ) -> Self {
        Self {
            push,
            gateway,
            alerts,
            inner: Mutex::new(State::default()),
        }
    }

    /// Subscribe this store to every bus event kind it consumes.
    ///
    /// Returns the registrations so the owner can detach on sign-out.
    pub fn attach(self: &Arc<Self>, bus: &EventBus) -> Vec<(EventKind, ListenerId)> {
        let kinds = [
            EventKind::Connected,
            EventKind::Disconnected,
            EventKind::Error,
            EventKind::Notification,
            EventKind::UnreadCount,
            EventKind::NotificationsList,
        ];
        kinds
            .iter()
            .map(|&kind| {
                let store = Arc::clone(self);
                let id = bus.on(kind, move |event| {
                    store.apply(event);
                    Ok(())
                });
                (kind, id)
            })
            .collect()
    }

    /// Apply one channel event to local state.
    pub fn apply(&self, event: &ChannelEvent) {
        // The alert fires after the lock is released, so sinks may read
        // back from the store.
        let alert = {
            let mut state = self.inner.lock().expect("store lock poisoned");
            match event {
                ChannelEvent::Connected => {
                    state.connected = true;
                    None
                }
                ChannelEvent::Disconnected { .. } | ChannelEvent::ChannelError { .. } => {
                    state.connected = false;
                    None
                }
                ChannelEvent::Message(message) => match message {
                    ServerMessage::Notification(notification) => {
                        let mut notification = notification.clone();
                        if state.read_ids.contains(&notification.id) {
                            notification.is_read = true;
                        }
                        let unread = notification.is_unread();
                        state.notifications.insert(0, notification.clone());
                        if unread {
                            state.unread += 1;
                            Some(notification)
                        } else {
                            None
                        }
                    }
                    ServerMessage::UnreadCount { count } => {
                        state.unread = (*count).max(0) as u64;
                        None
                    }
                    ServerMessage::NotificationsList(list) => {
                        Self::replace_snapshot(&mut state, list.clone());
                        None
                    }
                    ServerMessage::Unknown { kind, .. } => {
                        debug!(kind = %kind, "Ignoring unknown server message");
                        None
                    }
                },
            }
        };

        if let Some(notification) = alert {
            self.alerts.notify(&notification);
        }
    }

    /// Mark one notification as read, everywhere.
    ///
    /// Flips local state immediately, then writes through the channel and
    /// the REST gateway. An unknown id is still recorded as read and
    /// written through.
    ///
    /// # Errors
    ///
    /// Returns the REST gateway's error; local state is not rolled back.
    pub async fn mark_as_read(&self, id: NotificationId) -> AppResult<()> {
        {
            let mut state = self.inner.lock().expect("store lock poisoned");
            state.read_ids.insert(id);
            if let Some(entry) = state.notifications.iter_mut().find(|n| n.id == id) {
                if entry.is_unread() {
                    entry.is_read = true;
                    state.unread = state.unread.saturating_sub(1);
                }
            }
        }

        self.push.send(ClientMessage::MarkRead {
            notification_id: id,
        });
        self.gateway.mark_read(id).await
    }

    /// Mark every notification as read, everywhere.
    ///
    /// # Errors
    ///
    /// Returns the REST gateway's error; local state is not rolled back.
    pub async fn mark_all_as_read(&self) -> AppResult<()> {
        {
            let mut state = self.inner.lock().expect("store lock poisoned");
            let ids: Vec<NotificationId> = state.notifications.iter().map(|n| n.id).collect();
            state.read_ids.extend(ids);
            for entry in &mut state.notifications {
                entry.is_read = true;
            }
            state.unread = 0;
        }

        self.push.send(ClientMessage::MarkAllRead);
        self.gateway.mark_all_read().await
    }

    /// Resync from both paths: a channel `get_notifications` request
    /// (best-effort) plus an authoritative REST pull.
    ///
    /// The channel reply and the REST responses race; each is applied as
    /// an override when it lands, last writer wins.
    ///
    /// # Errors
    ///
    /// Returns the gateway's error; local state is left untouched on
    /// failure.
    pub async fn refresh(&self) -> AppResult<()> {
        self.push.send(ClientMessage::GetNotifications);
        self.pull().await
    }

    /// REST pull without the channel resync request.
    pub(crate) async fn pull(&self) -> AppResult<()> {
        let list = self.gateway.fetch_notifications().await?;
        let count = self.gateway.fetch_unread_count().await?;

        let mut state = self.inner.lock().expect("store lock poisoned");
        Self::replace_snapshot(&mut state, list);
        state.unread = count;
        Ok(())
    }

    /// Clear all state, including the session read-id memory.
    pub fn reset(&self) {
        *self.inner.lock().expect("store lock poisoned") = State::default();
    }

    /// Current notification list, newest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.inner
            .lock()
            .expect("store lock poisoned")
            .notifications
            .clone()
    }

    /// Current unread count.
    pub fn unread_count(&self) -> u64 {
        self.inner.lock().expect("store lock poisoned").unread
    }

    /// Whether the channel is believed up, per the latest lifecycle event.
    ///
    /// `false` means push delivery may be stale and a manual [`refresh`]
    /// is the fallback.
    ///
    /// [`refresh`]: NotificationStore::refresh
    pub fn is_connected(&self) -> bool {
        self.inner.lock().expect("store lock poisoned").connected
    }

    /// Replace the list wholesale, carrying session read state forward.
    ///
    /// The unread count is deliberately untouched: list snapshots and
    /// count updates arrive independently.
    fn replace_snapshot(state: &mut State, mut list: Vec<Notification>) {
        for entry in &mut list {
            if state.read_ids.contains(&entry.id) {
                entry.is_read = true;
            } else if entry.is_read {
                state.read_ids.insert(entry.id);
            }
        }
        state.notifications = list;
    }
}
