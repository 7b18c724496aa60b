use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ApiError, Backend, decode_envelope};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError>;

    /// Fetches the profile for the current bearer token.
    async fn me(&self) -> Result<UserProfile, ApiError>;
}

#[derive(Debug, Clone)]
pub struct HttpAuthClient {
    backend: Backend,
}

impl HttpAuthClient {
    #[must_use]
    pub const fn new(backend: Backend) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl AuthApi for HttpAuthClient {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let response = self
            .backend
            .post("/auth/login")?
            .json(&LoginRequest { email, password })
            .send()
            .await?;
        let envelope = decode_envelope::<LoginResponse>(response).await?;
        Ok(envelope.data)
    }

    async fn me(&self) -> Result<UserProfile, ApiError> {
        let response = self.backend.get("/auth/me")?.send().await?;
        let envelope = decode_envelope::<UserProfile>(response).await?;
        Ok(envelope.data)
    }
}
