//! Per-user session wiring: one bus, one channel, one store.

use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use galleria_core::config::channel::ChannelConfig;
use galleria_core::types::id::{NotificationId, UserId};
use galleria_core::AppResult;
use galleria_entity::Notification;

use crate::bus::{EventBus, ListenerId};
use crate::channel::client::ChannelClient;
use crate::channel::PushSender;
use crate::event::EventKind;
use crate::store::alert::AlertSink;
use crate::store::gateway::NotificationGateway;
use crate::store::store::NotificationStore;

/// Owns the realtime machinery for one authenticated user.
///
/// Construction wires nothing up; [`sign_in`] attaches the store to the
/// bus, opens the channel, and primes the store from the REST API.
/// [`sign_out`] tears all of that down again, so the session can be
/// reused across sign-ins.
///
/// [`sign_in`]: NotificationSession::sign_in
/// [`sign_out`]: NotificationSession::sign_out
pub struct NotificationSession {
    bus: Arc<EventBus>,
    channel: ChannelClient,
    store: Arc<NotificationStore>,
    registrations: Mutex<Vec<(EventKind, ListenerId)>>,
}

impl NotificationSession {
    /// Build a signed-out session over the given collaborators.
    pub fn new(
        config: ChannelConfig,
        gateway: Arc<dyn NotificationGateway>,
        alerts: Arc<dyn AlertSink>,
    ) -> Self {
        let bus = Arc::new(EventBus::new());
        let channel = ChannelClient::new(config, Arc::clone(&bus));
        let store = Arc::new(NotificationStore::new(
            Arc::new(channel.clone()) as Arc<dyn PushSender>,
            gateway,
            alerts,
        ));
        Self {
            bus,
            channel,
            store,
            registrations: Mutex::new(Vec::new()),
        }
    }

    /// Start the session for a user: subscribe, connect, prime.
    ///
    /// The store subscribes before the channel opens so the resync reply
    /// requested on connect cannot be missed. The priming REST pull is
    /// best-effort; a failure there is logged but does not fail sign-in,
    /// since the channel resync covers the same data.
    ///
    /// A second call while signed in is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the channel's connect error; the session is fully rolled
    /// back to signed-out in that case.
    pub async fn sign_in(&self, user_id: UserId, token: &str) -> AppResult<()> {
        {
            let registrations = self.registrations.lock().expect("session lock poisoned");
            if !registrations.is_empty() {
                debug!("sign_in() ignored, session already active");
                return Ok(());
            }
        }

        let attached = self.store.attach(&self.bus);
        *self.registrations.lock().expect("session lock poisoned") = attached;

        if let Err(e) = self.channel.connect(user_id, token).await {
            self.detach();
            self.store.reset();
            return Err(e);
        }

        if let Err(e) = self.store.pull().await {
            warn!(error = %e, "Initial notification pull failed, relying on channel resync");
        }

        info!(user_id = %user_id, "Notification session started");
        Ok(())
    }

    /// End the session: close the channel, unsubscribe, clear state.
    pub fn sign_out(&self) {
        self.channel.disconnect();
        self.detach();
        self.store.reset();
        info!("Notification session ended");
    }

    fn detach(&self) {
        let registrations: Vec<_> = self
            .registrations
            .lock()
            .expect("session lock poisoned")
            .drain(..)
            .collect();
        for (kind, id) in registrations {
            self.bus.off(kind, id);
        }
    }

    /// The session's event bus, for subscribing to lifecycle events.
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// The underlying channel client.
    pub fn channel(&self) -> &ChannelClient {
        &self.channel
    }

    /// The underlying notification store.
    pub fn store(&self) -> &Arc<NotificationStore> {
        &self.store
    }

    /// Current notification list, newest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.store.notifications()
    }

    /// Current unread count.
    pub fn unread_count(&self) -> u64 {
        self.store.unread_count()
    }

    /// Whether push delivery is believed live (a "reconnecting" indicator
    /// when `false`).
    pub fn is_connected(&self) -> bool {
        self.store.is_connected()
    }

    /// Mark one notification as read, locally and remotely.
    ///
    /// # Errors
    ///
    /// Propagates the REST write error; see
    /// [`NotificationStore::mark_as_read`].
    pub async fn mark_as_read(&self, id: NotificationId) -> AppResult<()> {
        self.store.mark_as_read(id).await
    }

    /// Mark every notification as read, locally and remotely.
    ///
    /// # Errors
    ///
    /// Propagates the REST write error; see
    /// [`NotificationStore::mark_all_as_read`].
    pub async fn mark_all_as_read(&self) -> AppResult<()> {
        self.store.mark_all_as_read().await
    }

    /// Re-pull the authoritative snapshot from the REST API.
    ///
    /// # Errors
    ///
    /// Propagates the gateway's fetch error.
    pub async fn refresh(&self) -> AppResult<()> {
        self.store.refresh().await
    }
}
