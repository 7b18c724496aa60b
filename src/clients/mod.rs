//! Typed HTTP clients for the recipe platform backend.
//!
//! Every backend response is wrapped in a uniform envelope carrying
//! `status`, `data`, `message` and optional `errors`. Non-2xx responses
//! carry a `detail` or `message` field which becomes the error surfaced
//! to the UI layer.

pub mod auth;
pub mod notifications;
pub mod recipes;
pub mod search;

pub use auth::{AuthApi, HttpAuthClient, LoginResponse, UserProfile};
pub use notifications::{HttpNotificationsClient, NotificationsApi};
pub use recipes::{HttpRecipesClient, RecipesApi};
pub use search::{HttpSearchClient, SearchApi, SearchMode, SearchRequest, SearchResponse};

use std::sync::{Arc, RwLock};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Session bearer token shared between the session service and the clients.
/// Writes are narrow and rare; a std `RwLock` is fine here.
#[derive(Debug, Clone, Default)]
pub struct SharedToken(Arc<RwLock<Option<String>>>);

impl SharedToken {
    #[must_use]
    pub fn get(&self) -> Option<String> {
        self.0.read().ok().and_then(|t| t.clone())
    }

    pub fn set(&self, token: Option<String>) {
        if let Ok(mut guard) = self.0.write() {
            *guard = token;
        }
    }
}

/// Connection details shared by every client: base URL, API key, session
/// token and the pooled reqwest client.
#[derive(Debug, Clone)]
pub struct Backend {
    client: reqwest::Client,
    base_url: Option<String>,
    api_key: Option<String>,
    token: SharedToken,
}

impl Backend {
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        base_url: Option<String>,
        api_key: Option<String>,
        token: SharedToken,
    ) -> Self {
        Self {
            client,
            base_url: base_url.filter(|u| !u.trim().is_empty()),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            token,
        }
    }

    /// Whether the backend is configured at all. Absence is a non-fatal
    /// "feature unavailable" state.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.base_url.is_some() && self.api_key.is_some()
    }

    fn url(&self, path: &str) -> Result<String, ApiError> {
        let base = self.base_url.as_deref().ok_or(ApiError::Unavailable)?;
        Ok(format!("{}{}", base.trim_end_matches('/'), path))
    }

    pub(crate) fn get(&self, path: &str) -> Result<reqwest::RequestBuilder, ApiError> {
        Ok(self.headers(self.client.get(self.url(path)?)))
    }

    pub(crate) fn post(&self, path: &str) -> Result<reqwest::RequestBuilder, ApiError> {
        Ok(self.headers(self.client.post(self.url(path)?)))
    }

    pub(crate) fn patch(&self, path: &str) -> Result<reqwest::RequestBuilder, ApiError> {
        Ok(self.headers(self.client.patch(self.url(path)?)))
    }

    pub(crate) fn delete(&self, path: &str) -> Result<reqwest::RequestBuilder, ApiError> {
        Ok(self.headers(self.client.delete(self.url(path)?)))
    }

    fn headers(&self, mut builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(key) = &self.api_key {
            builder = builder.header("X-Api-Key", key);
        }
        if let Some(token) = self.token.get() {
            builder = builder.bearer_auth(token);
        }
        builder
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// The feature is not configured (missing base URL or API key).
    /// A disabled-feature state, not a failure.
    #[error("search backend is not configured")]
    Unavailable,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response; message extracted from the body's `detail`/`message`.
    #[error("{message}")]
    Backend { status: u16, message: String },

    #[error("unexpected response shape: {0}")]
    Decode(String),
}

/// Uniform wrapper around backend payloads.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub status: String,
    pub data: T,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
    message: Option<String>,
}

/// Turns a non-2xx response into [`ApiError::Backend`] with the backend's
/// own error text when present.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.detail.or(b.message))
        .unwrap_or_else(|| format!("HTTP {status}"));
    Err(ApiError::Backend {
        status: status.as_u16(),
        message,
    })
}

/// Decodes an enveloped response with the shared error policy.
pub(crate) async fn decode_envelope<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<ApiEnvelope<T>, ApiError> {
    decode_json(response).await
}

/// Decodes a bare (non-enveloped) JSON response with the same error policy.
pub(crate) async fn decode_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let response = check_status(response).await?;
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
}
