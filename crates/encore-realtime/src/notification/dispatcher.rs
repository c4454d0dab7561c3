//! Notification dispatcher: persist, enrich with the actor, push live.

use std::sync::Arc;

use tracing::{debug, warn};

use encore_core::result::AppResult;
use encore_entity::notification::{NewNotification, NotificationWithActor};
use encore_entity::user::ActorSummary;

use crate::delivery::fanout::LiveFanout;
use crate::message::types::OutboundEvent;
use crate::metrics::RealtimeMetrics;
use crate::store::NotificationStore;

/// What happened to a notification request.
#[derive(Debug, Clone, PartialEq)]
pub enum NotifyOutcome {
    /// Actor and recipient are the same user; nothing stored or sent.
    SelfSuppressed,
    /// Stored; pushed to `live_connections` registered connections (0 when
    /// the recipient is offline).
    Stored {
        /// The payload that was (or would have been) pushed.
        payload: NotificationWithActor,
        /// Connections that received `notification:new`.
        live_connections: usize,
    },
}

/// Creates notifications and delivers them to online recipients.
///
/// Offline recipients are covered by persistence alone; they fetch the
/// list over REST on their next visit.
pub struct NotificationDispatcher {
    store: Arc<dyn NotificationStore>,
    fanout: Arc<LiveFanout>,
    metrics: Arc<RealtimeMetrics>,
}

impl std::fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationDispatcher").finish()
    }
}

impl NotificationDispatcher {
    /// Create a new dispatcher
    pub fn new(
        store: Arc<dyn NotificationStore>,
        fanout: Arc<LiveFanout>,
        metrics: Arc<RealtimeMetrics>,
    ) -> Self {
        Self {
            store,
            fanout,
            metrics,
        }
    }

    /// Persist a notification and push it to the recipient's live connections.
    ///
    /// Nothing is pushed unless the row was stored. A persistence failure is
    /// returned to the caller and leaves no partial state behind.
    pub async fn notify(&self, request: NewNotification) -> AppResult<NotifyOutcome> {
        if request.is_self_notification() {
            debug!(user_id = %request.user_id, kind = %request.kind, "Self-notification suppressed");
            return Ok(NotifyOutcome::SelfSuppressed);
        }

        let recipient = request.user_id;
        let created = self.store.create(request).await?;
        self.metrics.notification_created();

        let payload = match self.store.find_with_actor(created.id).await? {
            Some(joined) => joined,
            None => {
                warn!(notification_id = %created.id, "Notification vanished before enrichment");
                let actor = ActorSummary::unknown(created.from_user_id);
                NotificationWithActor::new(created, actor)
            }
        };

        let live_connections = self
            .fanout
            .to_user(recipient, &OutboundEvent::NotificationNew(payload.clone()));
        if live_connections > 0 {
            self.metrics.notification_pushed();
        }

        debug!(
            notification_id = %payload.notification.id,
            user_id = %recipient,
            kind = %payload.notification.kind,
            live_connections,
            "Notification dispatched"
        );

        Ok(NotifyOutcome::Stored {
            payload,
            live_connections,
        })
    }
}
