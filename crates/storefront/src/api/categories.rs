//! Category endpoints.
//!
//! The flat category list is the one listing every page needs, so it is
//! cached under a single key and dropped whenever a category changes here or
//! a change event arrives from the server.

use nursery_core::{Category, CategoryId, CategoryInput};
use reqwest::Method;
use tracing::{debug, instrument};

use super::ApiClient;
use super::cache::{CacheKey, CacheValue};
use crate::error::ApiError;

impl ApiClient {
    /// Fetch every category as a flat list.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Schema`] if the body is not a JSON array of
    /// categories.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        if let Some(CacheValue::Categories(categories)) =
            self.cache().get(&CacheKey::Categories).await
        {
            debug!(count = categories.len(), "Cache hit for categories");
            return Ok(categories);
        }

        let categories: Vec<Category> = self.get_json(self.url("api/categories")?).await?;
        debug!(count = categories.len(), "Fetched categories");

        self.cache()
            .insert(CacheKey::Categories, CacheValue::Categories(categories.clone()))
            .await;
        Ok(categories)
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is rejected.
    #[instrument(skip(self, input), fields(slug = %input.slug))]
    pub async fn create_category(&self, input: &CategoryInput) -> Result<Category, ApiError> {
        let category = self
            .send_json(Method::POST, self.url("api/categories")?, input)
            .await?;
        self.invalidate_categories().await;
        Ok(category)
    }

    /// Replace a category's fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is rejected.
    #[instrument(skip(self, input))]
    pub async fn update_category(
        &self,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, ApiError> {
        let category = self
            .send_json(Method::PUT, self.url(&format!("api/categories/{id}"))?, input)
            .await?;
        self.invalidate_categories().await;
        Ok(category)
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is rejected.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: CategoryId) -> Result<(), ApiError> {
        let url = self.url(&format!("api/categories/{id}"))?;
        self.send_unit(self.request(Method::DELETE, url)).await?;
        self.invalidate_categories().await;
        Ok(())
    }

    /// Drop the cached category list.
    pub async fn invalidate_categories(&self) {
        self.cache().invalidate(&CacheKey::Categories).await;
    }

    /// Whether a category list is currently cached.
    #[must_use]
    pub fn categories_cached(&self) -> bool {
        self.cache().contains_key(&CacheKey::Categories)
    }
}
