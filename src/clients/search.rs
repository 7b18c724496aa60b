use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::models::{Recipe, SearchSuggestion};

use super::{ApiError, Backend, decode_json};

/// Which search endpoint to hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    Smart,
    Vector,
    Ingredients,
    Hybrid,
}

impl SearchMode {
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Smart => "/search/smart",
            Self::Vector => "/search/vector",
            Self::Ingredients => "/search/ingredients",
            Self::Hybrid => "/search/hybrid",
        }
    }
}

impl std::str::FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "smart" => Ok(Self::Smart),
            "vector" => Ok(Self::Vector),
            "ingredients" => Ok(Self::Ingredients),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(format!("unknown search mode: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<Vec<String>>,
    pub limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl SearchRequest {
    #[must_use]
    pub fn query(query: impl Into<String>, limit: usize) -> Self {
        Self {
            query: Some(query.into()),
            ingredients: None,
            limit,
            filters: None,
            user_id: None,
        }
    }

    #[must_use]
    pub fn ingredients(ingredients: Vec<String>, limit: usize) -> Self {
        Self {
            query: None,
            ingredients: Some(ingredients),
            limit,
            filters: None,
            user_id: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub status: String,
    pub data: Vec<Recipe>,
    pub total: u64,
    pub execution_time_ms: Option<f64>,
}

/// Search surface of the backend, gated on configuration.
#[async_trait]
pub trait SearchApi: Send + Sync {
    /// Whether the search backend is configured. When false, callers
    /// should render a disabled-feature state instead of an error.
    fn is_available(&self) -> bool;

    async fn search(
        &self,
        mode: SearchMode,
        request: &SearchRequest,
    ) -> Result<SearchResponse, ApiError>;

    async fn suggestions(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchSuggestion>, ApiError>;
}

#[derive(Debug, Clone)]
pub struct HttpSearchClient {
    backend: Backend,
}

impl HttpSearchClient {
    #[must_use]
    pub const fn new(backend: Backend) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl SearchApi for HttpSearchClient {
    fn is_available(&self) -> bool {
        self.backend.is_available()
    }

    async fn search(
        &self,
        mode: SearchMode,
        request: &SearchRequest,
    ) -> Result<SearchResponse, ApiError> {
        if !self.backend.is_available() {
            return Err(ApiError::Unavailable);
        }

        debug!(path = mode.path(), "issuing search request");
        let response = self.backend.post(mode.path())?.json(request).send().await?;
        decode_json(response).await
    }

    async fn suggestions(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchSuggestion>, ApiError> {
        if !self.backend.is_available() {
            return Err(ApiError::Unavailable);
        }

        let path = format!(
            "/search/suggestions?q={}&limit={}",
            urlencoding::encode(query),
            limit
        );
        let response = self.backend.get(&path)?.send().await?;
        let envelope = super::decode_envelope::<Vec<SearchSuggestion>>(response).await?;
        Ok(envelope.data)
    }
}
