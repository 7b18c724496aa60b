use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Moderation status as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecipeStatus {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for RecipeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub title: String,
    #[serde(rename = "authorId")]
    pub author_id: String,
    pub category: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
    pub status: RecipeStatus,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Recipe {
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.status == RecipeStatus::Approved
    }
}
