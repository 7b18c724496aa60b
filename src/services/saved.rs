//! Optimistic saved-recipes store.
//!
//! Membership flips locally before the network round-trip and is reverted
//! exactly when the call fails. Toggles on the same recipe are serialized
//! through a per-id mutex so a rapid double-toggle cannot lose an update.
//! Successful state is snapshotted to the local cache so a failed initial
//! load can fall back to the last known set.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, warn};

use crate::clients::{ApiError, RecipesApi};
use crate::events::AppEvent;
use crate::store::{LocalStore, saved_recipes_key};

#[derive(Debug, Error)]
pub enum SavedError {
    #[error("not signed in")]
    NotSignedIn,

    #[error("{0}")]
    Api(#[from] ApiError),
}

#[derive(Debug, Default)]
struct SavedState {
    user_id: Option<String>,
    ids: HashSet<String>,
    last_error: Option<String>,
}

pub struct SavedRecipesService {
    api: Arc<dyn RecipesApi>,
    cache: Arc<LocalStore>,
    bus: broadcast::Sender<AppEvent>,
    state: Mutex<SavedState>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SavedRecipesService {
    #[must_use]
    pub fn new(
        api: Arc<dyn RecipesApi>,
        cache: Arc<LocalStore>,
        bus: broadcast::Sender<AppEvent>,
    ) -> Self {
        Self {
            api,
            cache,
            bus,
            state: Mutex::new(SavedState::default()),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Loads the saved set for a user, replacing any previous user's state.
    /// On fetch failure falls back to the last cache snapshot, else empty.
    pub async fn load(&self, user_id: &str) {
        let (ids, error) = match self.api.saved_recipes(user_id).await {
            Ok(recipes) => (
                recipes.into_iter().map(|r| r.id).collect::<HashSet<_>>(),
                None,
            ),
            Err(e) => {
                warn!("Failed to fetch saved recipes, using cache: {e}");
                let cached: Vec<String> = self
                    .cache
                    .get(&saved_recipes_key(user_id))
                    .unwrap_or_default();
                (cached.into_iter().collect(), Some(e.to_string()))
            }
        };

        let mut state = self.state.lock().await;
        state.user_id = Some(user_id.to_string());
        state.ids = ids;
        state.last_error = error;
    }

    /// Forgets all per-user state (sign-out or user switch).
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        *state = SavedState::default();
    }

    pub async fn is_saved(&self, recipe_id: &str) -> bool {
        self.state.lock().await.ids.contains(recipe_id)
    }

    pub async fn ids(&self) -> Vec<String> {
        let state = self.state.lock().await;
        let mut ids: Vec<String> = state.ids.iter().cloned().collect();
        ids.sort();
        ids
    }

    pub async fn last_error(&self) -> Option<String> {
        self.state.lock().await.last_error.clone()
    }

    /// Flips membership optimistically and reconciles with the backend.
    /// Returns the final membership. On failure the flip is undone exactly
    /// and the error is recorded in `last_error`.
    pub async fn toggle(&self, recipe_id: &str) -> Result<bool, SavedError> {
        let guard = self.lock_for(recipe_id).await;
        let result = {
            let _held = guard.lock().await;
            self.toggle_held(recipe_id).await
        };
        drop(guard);
        self.prune_lock(recipe_id).await;
        result
    }

    async fn toggle_held(&self, recipe_id: &str) -> Result<bool, SavedError> {
        let (user_id, saving) = {
            let mut state = self.state.lock().await;
            let user_id = state.user_id.clone().ok_or(SavedError::NotSignedIn)?;
            let saving = !state.ids.contains(recipe_id);
            // Optimistic flip.
            if saving {
                state.ids.insert(recipe_id.to_string());
            } else {
                state.ids.remove(recipe_id);
            }
            (user_id, saving)
        };

        let result = if saving {
            self.api.save_recipe(&user_id, recipe_id).await
        } else {
            self.api.unsave_recipe(&user_id, recipe_id).await
        };

        match result {
            Ok(()) => {
                let snapshot = {
                    let mut state = self.state.lock().await;
                    state.last_error = None;
                    let mut ids: Vec<String> = state.ids.iter().cloned().collect();
                    ids.sort();
                    ids
                };
                self.cache.set(&saved_recipes_key(&user_id), &snapshot);
                let _ = self.bus.send(AppEvent::SavedChanged {
                    recipe_id: recipe_id.to_string(),
                    saved: saving,
                });
                debug!(recipe_id, saved = saving, "toggle reconciled");
                Ok(saving)
            }
            Err(e) => {
                // Exact undo of the optimistic flip.
                let mut state = self.state.lock().await;
                if saving {
                    state.ids.remove(recipe_id);
                } else {
                    state.ids.insert(recipe_id.to_string());
                }
                state.last_error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    async fn lock_for(&self, recipe_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        Arc::clone(
            locks
                .entry(recipe_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    /// Drops the per-id lock once no toggle references it, so the map does
    /// not grow with every distinct recipe ever toggled.
    async fn prune_lock(&self, recipe_id: &str) {
        let mut locks = self.locks.lock().await;
        if locks
            .get(recipe_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(recipe_id);
        }
    }
}
