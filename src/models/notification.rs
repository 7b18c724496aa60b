use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

impl NotificationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
            Self::Info => "INFO",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationPriority {
    Low,
    Medium,
    High,
}

impl NotificationPriority {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

/// A domain notification as stored by the backend. Distinct from a toast:
/// toasts are UI-only and expire on a timer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub priority: NotificationPriority,
    pub title: String,
    pub body: Option<String>,
    #[serde(rename = "actionUrl")]
    pub action_url: Option<String>,
    #[serde(rename = "isRead")]
    pub is_read: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// One page of the notification feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedPage {
    pub items: Vec<Notification>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

impl FeedPage {
    #[must_use]
    pub fn total_pages(&self) -> u32 {
        if self.page_size == 0 {
            return 0;
        }
        u32::try_from(self.total.div_ceil(u64::from(self.page_size))).unwrap_or(u32::MAX)
    }
}

/// Optional filters for a feed query. All fields narrow the result set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FeedFilter {
    pub unread: Option<bool>,
    pub kind: Option<NotificationKind>,
    pub priority: Option<NotificationPriority>,
}

impl FeedFilter {
    #[must_use]
    pub fn unread_only() -> Self {
        Self {
            unread: Some(true),
            ..Self::default()
        }
    }
}
