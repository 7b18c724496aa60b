//! Notification feed state: paginated reads with a cache invalidated on
//! mutation, plus a failure-tolerant unread-count poll.
//!
//! Unlike the saved-recipes store there is no optimistic update here: batch
//! mutations affect many rows server-side, so the list only changes after
//! the server confirms and the cache is invalidated.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, info};

use crate::clients::{ApiError, NotificationsApi};
use crate::events::AppEvent;
use crate::models::{FeedFilter, FeedPage, NotificationKind};

use super::toast::ToastBus;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("{0}")]
    Api(#[from] ApiError),
}

pub struct FeedService {
    api: Arc<dyn NotificationsApi>,
    toasts: ToastBus,
    bus: broadcast::Sender<AppEvent>,
    page_size: u32,
    poll_interval: Duration,
    pages: Mutex<HashMap<(u32, FeedFilter), FeedPage>>,
    unread: AtomicU64,
}

impl FeedService {
    #[must_use]
    pub fn new(
        api: Arc<dyn NotificationsApi>,
        toasts: ToastBus,
        bus: broadcast::Sender<AppEvent>,
        page_size: u32,
        poll_interval: Duration,
    ) -> Self {
        Self {
            api,
            toasts,
            bus,
            page_size,
            poll_interval,
            pages: Mutex::new(HashMap::new()),
            unread: AtomicU64::new(0),
        }
    }

    /// Returns the requested page, hitting the network only when the cache
    /// has been invalidated (or never filled) for that page/filter pair.
    pub async fn page(&self, page: u32, filter: &FeedFilter) -> Result<FeedPage, FeedError> {
        let key = (page, filter.clone());
        {
            let pages = self.pages.lock().await;
            if let Some(cached) = pages.get(&key) {
                return Ok(cached.clone());
            }
        }

        let fetched = self.api.page(page, self.page_size, filter).await?;
        self.pages.lock().await.insert(key, fetched.clone());
        Ok(fetched)
    }

    /// Drops every cached page so the next read re-fetches.
    pub async fn invalidate(&self) {
        self.pages.lock().await.clear();
        let _ = self.bus.send(AppEvent::FeedInvalidated);
    }

    /// Last known unread count.
    #[must_use]
    pub fn unread_count(&self) -> u64 {
        self.unread.load(Ordering::Relaxed)
    }

    /// Polls the unread count once. Tolerant of failure: logs and reports 0
    /// rather than propagating the error.
    pub async fn poll_unread_once(&self) -> u64 {
        let count = match self.api.unread_count().await {
            Ok(count) => count,
            Err(e) => {
                debug!("Unread-count poll failed: {e}");
                0
            }
        };

        let previous = self.unread.swap(count, Ordering::Relaxed);
        if previous != count {
            let _ = self.bus.send(AppEvent::UnreadCount(count));
        }
        count
    }

    /// Runs the fallback poll loop on the configured interval.
    pub fn spawn_unread_poll(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(service.poll_interval);
            loop {
                ticker.tick().await;
                service.poll_unread_once().await;
            }
        })
    }

    pub async fn mark_read(&self, id: &str) -> Result<(), FeedError> {
        self.api.mark_read(id).await?;
        self.refresh().await;
        Ok(())
    }

    /// Marks everything read; reports the affected count as a toast.
    pub async fn mark_all_read(&self) -> Result<u64, FeedError> {
        let affected = self.api.mark_all_read().await?;
        self.refresh().await;
        info!("Marked {affected} notifications as read");
        self.toasts.show(
            NotificationKind::Success,
            format!("Marked {affected} notifications as read"),
            None,
            None,
        );
        Ok(affected)
    }

    pub async fn delete(&self, id: &str) -> Result<(), FeedError> {
        self.api.delete(id).await?;
        self.refresh().await;
        Ok(())
    }

    /// Deletes everything; reports the removed count as a toast.
    pub async fn clear_all(&self) -> Result<u64, FeedError> {
        let affected = self.api.clear_all().await?;
        self.refresh().await;
        info!("Cleared {affected} notifications");
        self.toasts.show(
            NotificationKind::Success,
            format!("Cleared {affected} notifications"),
            None,
            None,
        );
        Ok(affected)
    }

    async fn refresh(&self) {
        self.invalidate().await;
        self.poll_unread_once().await;
    }
}
