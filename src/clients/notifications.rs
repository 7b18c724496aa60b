use async_trait::async_trait;
use serde::Deserialize;

use crate::models::{FeedFilter, FeedPage};

use super::{ApiError, Backend, decode_envelope};

#[derive(Debug, Deserialize)]
struct CountBody {
    count: u64,
}

#[derive(Debug, Deserialize)]
struct AffectedBody {
    affected: u64,
}

/// Notification feed surface: paginated reads plus read/delete mutations.
/// Mutations are confirmed server-side; callers re-fetch afterwards rather
/// than updating optimistically.
#[async_trait]
pub trait NotificationsApi: Send + Sync {
    async fn page(
        &self,
        page: u32,
        page_size: u32,
        filter: &FeedFilter,
    ) -> Result<FeedPage, ApiError>;

    async fn unread_count(&self) -> Result<u64, ApiError>;

    async fn mark_read(&self, id: &str) -> Result<(), ApiError>;

    /// Returns the number of notifications affected.
    async fn mark_all_read(&self) -> Result<u64, ApiError>;

    async fn delete(&self, id: &str) -> Result<(), ApiError>;

    /// Returns the number of notifications removed.
    async fn clear_all(&self) -> Result<u64, ApiError>;
}

#[derive(Debug, Clone)]
pub struct HttpNotificationsClient {
    backend: Backend,
}

impl HttpNotificationsClient {
    #[must_use]
    pub const fn new(backend: Backend) -> Self {
        Self { backend }
    }

    fn page_path(page: u32, page_size: u32, filter: &FeedFilter) -> String {
        let mut path = format!("/notifications?page={page}&page_size={page_size}");
        if let Some(unread) = filter.unread {
            path.push_str(&format!("&unread={unread}"));
        }
        if let Some(kind) = filter.kind {
            path.push_str(&format!("&kind={}", kind.as_str()));
        }
        if let Some(priority) = filter.priority {
            path.push_str(&format!("&priority={}", priority.as_str()));
        }
        path
    }
}

#[async_trait]
impl NotificationsApi for HttpNotificationsClient {
    async fn page(
        &self,
        page: u32,
        page_size: u32,
        filter: &FeedFilter,
    ) -> Result<FeedPage, ApiError> {
        let path = Self::page_path(page, page_size, filter);
        let response = self.backend.get(&path)?.send().await?;
        let envelope = decode_envelope::<FeedPage>(response).await?;
        Ok(envelope.data)
    }

    async fn unread_count(&self) -> Result<u64, ApiError> {
        let response = self.backend.get("/notifications/unread-count")?.send().await?;
        let envelope = decode_envelope::<CountBody>(response).await?;
        Ok(envelope.data.count)
    }

    async fn mark_read(&self, id: &str) -> Result<(), ApiError> {
        let path = format!("/notifications/{}/read", urlencoding::encode(id));
        let response = self.backend.patch(&path)?.send().await?;
        decode_envelope::<serde_json::Value>(response).await?;
        Ok(())
    }

    async fn mark_all_read(&self) -> Result<u64, ApiError> {
        let response = self.backend.post("/notifications/read-all")?.send().await?;
        let envelope = decode_envelope::<AffectedBody>(response).await?;
        Ok(envelope.data.affected)
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let path = format!("/notifications/{}", urlencoding::encode(id));
        let response = self.backend.delete(&path)?.send().await?;
        decode_envelope::<serde_json::Value>(response).await?;
        Ok(())
    }

    async fn clear_all(&self) -> Result<u64, ApiError> {
        let response = self.backend.delete("/notifications")?.send().await?;
        let envelope = decode_envelope::<AffectedBody>(response).await?;
        Ok(envelope.data.affected)
    }
}
