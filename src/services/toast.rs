//! Process-wide toast bus and notification history.
//!
//! Toasts are ephemeral UI notifications that expire on their own timer.
//! Every toast also lands in a permanent-until-cleared history list (newest
//! first) with its own read/unread bookkeeping. Read-state mutations touch
//! the history only; active toasts expire regardless.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::events::AppEvent;
use crate::models::{NotificationKind, NotificationPriority};

#[derive(Debug, Clone, Serialize)]
pub struct ToastView {
    pub id: String,
    pub kind: NotificationKind,
    pub priority: NotificationPriority,
    pub title: String,
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub id: String,
    pub kind: NotificationKind,
    pub priority: NotificationPriority,
    pub title: String,
    pub body: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Inner {
    active: Vec<ToastView>,
    history: Vec<HistoryEntry>,
}

/// Created once at startup and lives for the process.
#[derive(Clone)]
pub struct ToastBus {
    inner: Arc<Mutex<Inner>>,
    bus: broadcast::Sender<AppEvent>,
    default_duration: Duration,
}

impl ToastBus {
    #[must_use]
    pub fn new(bus: broadcast::Sender<AppEvent>, default_duration: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            bus,
            default_duration,
        }
    }

    /// Shows a toast and records it in history. The toast is auto-removed
    /// after `duration` (bus default when `None`).
    pub fn show(
        &self,
        kind: NotificationKind,
        title: impl Into<String>,
        body: Option<String>,
        duration: Option<Duration>,
    ) -> ToastView {
        self.show_prioritized(kind, NotificationPriority::Medium, title, body, duration)
    }

    pub fn show_prioritized(
        &self,
        kind: NotificationKind,
        priority: NotificationPriority,
        title: impl Into<String>,
        body: Option<String>,
        duration: Option<Duration>,
    ) -> ToastView {
        let toast = ToastView {
            id: Uuid::new_v4().to_string(),
            kind,
            priority,
            title: title.into(),
            body,
            created_at: Utc::now(),
        };

        if let Ok(mut inner) = self.inner.lock() {
            inner.active.push(toast.clone());
            inner.history.insert(
                0,
                HistoryEntry {
                    id: toast.id.clone(),
                    kind,
                    priority,
                    title: toast.title.clone(),
                    body: toast.body.clone(),
                    is_read: false,
                    created_at: toast.created_at,
                },
            );
        }

        let expires_in = duration.unwrap_or(self.default_duration);
        let inner = Arc::clone(&self.inner);
        let id = toast.id.clone();
        tokio::spawn(async move {
            tokio::time::sleep(expires_in).await;
            if let Ok(mut inner) = inner.lock() {
                inner.active.retain(|t| t.id != id);
            }
        });

        let _ = self.bus.send(AppEvent::Toast(toast.clone()));
        toast
    }

    /// Marks one history entry read. Returns false if the id is unknown.
    pub fn mark_read(&self, id: &str) -> bool {
        let Ok(mut inner) = self.inner.lock() else {
            return false;
        };
        match inner.history.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.is_read = true;
                true
            }
            None => false,
        }
    }

    /// Marks every history entry read; returns how many changed.
    pub fn mark_all_read(&self) -> usize {
        let Ok(mut inner) = self.inner.lock() else {
            return 0;
        };
        let mut changed = 0;
        for entry in &mut inner.history {
            if !entry.is_read {
                entry.is_read = true;
                changed += 1;
            }
        }
        changed
    }

    pub fn clear_history(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.history.clear();
        }
    }

    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.inner
            .lock()
            .map(|inner| inner.history.iter().filter(|e| !e.is_read).count())
            .unwrap_or(0)
    }

    #[must_use]
    pub fn active(&self) -> Vec<ToastView> {
        self.inner
            .lock()
            .map(|inner| inner.active.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.inner
            .lock()
            .map(|inner| inner.history.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bus() -> ToastBus {
        let (tx, _) = broadcast::channel(16);
        ToastBus::new(tx, Duration::from_millis(5000))
    }

    #[tokio::test(start_paused = true)]
    async fn toast_expires_but_history_remains() {
        let toasts = bus();
        toasts.show(NotificationKind::Info, "saved", None, None);

        assert_eq!(toasts.active().len(), 1);
        assert_eq!(toasts.history().len(), 1);

        tokio::time::sleep(Duration::from_millis(5001)).await;

        assert!(toasts.active().is_empty());
        assert_eq!(toasts.history().len(), 1);
        assert_eq!(toasts.unread_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn history_is_newest_first() {
        let toasts = bus();
        toasts.show(NotificationKind::Info, "first", None, None);
        toasts.show(NotificationKind::Success, "second", None, None);

        let history = toasts.history();
        assert_eq!(history[0].title, "second");
        assert_eq!(history[1].title, "first");
    }

    #[tokio::test(start_paused = true)]
    async fn read_state_touches_history_only() {
        let toasts = bus();
        let toast = toasts.show(NotificationKind::Warning, "pending review", None, None);

        assert!(toasts.mark_read(&toast.id));
        assert_eq!(toasts.unread_count(), 0);
        // Toast is still active; read state does not expire it.
        assert_eq!(toasts.active().len(), 1);

        toasts.show(NotificationKind::Error, "rejected", None, None);
        toasts.show(NotificationKind::Info, "tip", None, None);
        assert_eq!(toasts.mark_all_read(), 2);
        assert_eq!(toasts.unread_count(), 0);

        toasts.clear_history();
        assert!(toasts.history().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn custom_duration_outlives_default() {
        let toasts = bus();
        toasts.show(
            NotificationKind::Info,
            "long",
            None,
            Some(Duration::from_millis(10_000)),
        );

        tokio::time::sleep(Duration::from_millis(6000)).await;
        assert_eq!(toasts.active().len(), 1);

        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert!(toasts.active().is_empty());
    }
}
