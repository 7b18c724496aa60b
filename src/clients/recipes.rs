use async_trait::async_trait;

use crate::models::Recipe;

use super::{ApiError, Backend, decode_envelope};

/// Saved-recipe operations scoped to a user.
#[async_trait]
pub trait RecipesApi: Send + Sync {
    async fn saved_recipes(&self, user_id: &str) -> Result<Vec<Recipe>, ApiError>;

    async fn save_recipe(&self, user_id: &str, recipe_id: &str) -> Result<(), ApiError>;

    async fn unsave_recipe(&self, user_id: &str, recipe_id: &str) -> Result<(), ApiError>;
}

#[derive(Debug, Clone)]
pub struct HttpRecipesClient {
    backend: Backend,
}

impl HttpRecipesClient {
    #[must_use]
    pub const fn new(backend: Backend) -> Self {
        Self { backend }
    }

    fn saved_path(user_id: &str, recipe_id: Option<&str>) -> String {
        let base = format!("/users/{}/saved-recipes", urlencoding::encode(user_id));
        match recipe_id {
            Some(id) => format!("{base}/{}", urlencoding::encode(id)),
            None => base,
        }
    }
}

#[async_trait]
impl RecipesApi for HttpRecipesClient {
    async fn saved_recipes(&self, user_id: &str) -> Result<Vec<Recipe>, ApiError> {
        let path = Self::saved_path(user_id, None);
        let response = self.backend.get(&path)?.send().await?;
        let envelope = decode_envelope::<Vec<Recipe>>(response).await?;
        Ok(envelope.data)
    }

    async fn save_recipe(&self, user_id: &str, recipe_id: &str) -> Result<(), ApiError> {
        let path = Self::saved_path(user_id, Some(recipe_id));
        let response = self.backend.post(&path)?.send().await?;
        decode_envelope::<serde_json::Value>(response).await?;
        Ok(())
    }

    async fn unsave_recipe(&self, user_id: &str, recipe_id: &str) -> Result<(), ApiError> {
        let path = Self::saved_path(user_id, Some(recipe_id));
        let response = self.backend.delete(&path)?.send().await?;
        decode_envelope::<serde_json::Value>(response).await?;
        Ok(())
    }
}
