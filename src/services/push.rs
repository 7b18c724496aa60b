//! Push-message intake.
//!
//! Background push payloads are re-dispatched into the toast bus and trigger
//! notification-feed invalidation plus an immediate unread re-poll, so the
//! interval poll is only a fallback when no push channel is attached.

use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::models::{NotificationKind, NotificationPriority};
use crate::store::{KEY_PUSH_PROMPT_DISMISSED, KEY_PUSH_REGISTERED, LocalStore};

use super::feed::FeedService;
use super::toast::ToastBus;

#[derive(Debug, Clone, Deserialize)]
pub struct PushNotification {
    pub title: String,
    pub body: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PushData {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub priority: NotificationPriority,
    #[serde(rename = "actionUrl")]
    pub action_url: Option<String>,
}

/// Wire shape delivered by the push provider.
#[derive(Debug, Clone, Deserialize)]
pub struct PushMessage {
    pub notification: PushNotification,
    pub data: PushData,
}

pub struct PushService {
    toasts: ToastBus,
    feed: Arc<FeedService>,
    cache: Arc<LocalStore>,
}

impl PushService {
    #[must_use]
    pub const fn new(toasts: ToastBus, feed: Arc<FeedService>, cache: Arc<LocalStore>) -> Self {
        Self { toasts, feed, cache }
    }

    pub async fn handle(&self, message: PushMessage) {
        debug!(title = %message.notification.title, "push message received");

        self.toasts.show_prioritized(
            message.data.kind,
            message.data.priority,
            message.notification.title,
            message.notification.body,
            None,
        );

        self.feed.invalidate().await;
        self.feed.poll_unread_once().await;
    }

    /// Consumes the push channel until it closes.
    pub async fn run(&self, mut messages: mpsc::Receiver<PushMessage>) {
        info!("push listener started");
        while let Some(message) = messages.recv().await {
            self.handle(message).await;
        }
        info!("push channel closed");
    }

    pub fn spawn(
        self: &Arc<Self>,
        messages: mpsc::Receiver<PushMessage>,
    ) -> tokio::task::JoinHandle<()> {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            service.run(messages).await;
        })
    }

    pub fn mark_registered(&self) {
        self.cache.set(KEY_PUSH_REGISTERED, &true);
    }

    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.cache.get(KEY_PUSH_REGISTERED).unwrap_or(false)
    }

    pub fn dismiss_prompt(&self) {
        self.cache.set(KEY_PUSH_PROMPT_DISMISSED, &true);
    }

    #[must_use]
    pub fn prompt_dismissed(&self) -> bool {
        self.cache.get(KEY_PUSH_PROMPT_DISMISSED).unwrap_or(false)
    }
}
