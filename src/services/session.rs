//! Auth session: login/logout against the backend plus best-effort token
//! persistence so a restart stays signed in. The persisted entry is a cache,
//! never the source of truth; the backend rejects stale tokens.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::info;

use crate::clients::{ApiError, AuthApi, SharedToken, UserProfile};
use crate::events::AppEvent;
use crate::store::{KEY_SESSION, LocalStore};

use super::saved::SavedRecipesService;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{0}")]
    Api(#[from] ApiError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub user_id: String,
    pub email: String,
}

pub struct SessionService {
    api: Arc<dyn AuthApi>,
    cache: Arc<LocalStore>,
    token: SharedToken,
    saved: Arc<SavedRecipesService>,
    bus: broadcast::Sender<AppEvent>,
}

impl SessionService {
    /// Restores any persisted session into the shared token on construction.
    #[must_use]
    pub fn new(
        api: Arc<dyn AuthApi>,
        cache: Arc<LocalStore>,
        token: SharedToken,
        saved: Arc<SavedRecipesService>,
        bus: broadcast::Sender<AppEvent>,
    ) -> Self {
        if let Some(session) = cache.get::<SessionData>(KEY_SESSION) {
            token.set(Some(session.token));
        }
        Self {
            api,
            cache,
            token,
            saved,
            bus,
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, SessionError> {
        let response = self.api.login(email, password).await?;

        self.token.set(Some(response.token.clone()));
        self.cache.set(
            KEY_SESSION,
            &SessionData {
                token: response.token,
                user_id: response.user.id.clone(),
                email: response.user.email.clone(),
            },
        );

        info!(user = %response.user.email, "signed in");
        let _ = self.bus.send(AppEvent::SessionChanged { signed_in: true });
        Ok(response.user)
    }

    /// Clears the token and the persisted session, and forgets the signed-in
    /// user's saved set.
    pub async fn logout(&self) {
        self.token.set(None);
        self.cache.remove(KEY_SESSION);
        self.saved.reset().await;
        let _ = self.bus.send(AppEvent::SessionChanged { signed_in: false });
    }

    /// The persisted session, if any.
    #[must_use]
    pub fn current(&self) -> Option<SessionData> {
        self.cache.get(KEY_SESSION)
    }

    pub async fn me(&self) -> Result<UserProfile, SessionError> {
        Ok(self.api.me().await?)
    }
}
