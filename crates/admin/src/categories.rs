//! Category manager.
//!
//! Keeps a working copy of the flat category list and validates edits
//! against it before they are sent: a new parent must exist and must not be
//! the category itself or one of its descendants. Reads go through the
//! shared category cache, which is invalidated on every write.

use nursery_core::listing::{CategoryFilter, CategorySort, list_categories};
use nursery_core::reorder::{reorder_siblings, siblings_of};
use nursery_core::tree::{self, CategoryNode, FlatCategory};
use nursery_core::{Category, CategoryId, CategoryInput, slugify};
use nursery_storefront::ApiClient;
use tracing::{error, info, instrument};

use crate::error::AdminError;

/// Working copy of the category list plus the operations on it.
pub struct CategoryManager {
    api: ApiClient,
    categories: Vec<Category>,
}

impl CategoryManager {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self {
            api,
            categories: Vec::new(),
        }
    }

    /// Fetch the category list for display.
    ///
    /// A failed or malformed response leaves the manager empty; the failure
    /// is logged rather than returned so the listing can still render.
    pub async fn load(&mut self) -> &[Category] {
        if let Err(e) = self.try_load().await {
            error!(error = %e, "Failed to load categories");
        }
        &self.categories
    }

    /// Fetch the category list ahead of an edit.
    ///
    /// The working copy is cleared first, so it is empty on failure.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Api`] if the list cannot be fetched or decoded.
    #[instrument(skip(self))]
    pub async fn try_load(&mut self) -> Result<&[Category], AdminError> {
        self.categories.clear();
        self.categories = self.api.list_categories().await?;
        Ok(&self.categories)
    }

    /// The working copy.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    #[must_use]
    pub fn get(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// The category forest.
    #[must_use]
    pub fn tree(&self) -> Vec<CategoryNode> {
        tree::build_tree(&self.categories)
    }

    /// Filtered and sorted flat listing.
    #[must_use]
    pub fn listing(&self, filter: &CategoryFilter, sort: CategorySort) -> Vec<FlatCategory> {
        list_categories(tree::flatten(&self.tree()), filter, sort)
    }

    /// Categories the tree cannot reach (missing parent or cycle).
    #[must_use]
    pub fn detached(&self) -> Vec<&Category> {
        tree::detached(&self.categories)
    }

    /// Create a category under an existing parent (or at the root).
    ///
    /// A blank slug is derived from the name.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::BadRequest`] for a blank name,
    /// [`AdminError::Tree`] for an unknown parent, or [`AdminError::Api`].
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&mut self, mut input: CategoryInput) -> Result<Category, AdminError> {
        normalize(&mut input)?;
        tree::validate_parent(&self.categories, None, input.parent_id)?;

        let category = self.api.create_category(&input).await?;
        info!(id = %category.id, slug = %category.slug, "Category created");
        self.categories.push(category.clone());
        Ok(category)
    }

    /// Replace a category's fields.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotFound`] for an unknown id,
    /// [`AdminError::Tree`] if the new parent would create a cycle, or
    /// [`AdminError::Api`].
    #[instrument(skip(self, input))]
    pub async fn update(
        &mut self,
        id: CategoryId,
        mut input: CategoryInput,
    ) -> Result<Category, AdminError> {
        if self.get(id).is_none() {
            return Err(AdminError::NotFound(format!("category {id}")));
        }
        normalize(&mut input)?;
        tree::validate_parent(&self.categories, Some(id), input.parent_id)?;

        let category = self.api.update_category(id, &input).await?;
        info!(%id, "Category updated");
        self.replace(category.clone());
        Ok(category)
    }

    /// Delete a category that has no subcategories.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::HasChildren`] if anything still points at it,
    /// [`AdminError::NotFound`] for an unknown id, or [`AdminError::Api`].
    #[instrument(skip(self))]
    pub async fn delete(&mut self, id: CategoryId) -> Result<(), AdminError> {
        if self.get(id).is_none() {
            return Err(AdminError::NotFound(format!("category {id}")));
        }
        let count = self
            .categories
            .iter()
            .filter(|c| c.parent_id == Some(id))
            .count();
        if count > 0 {
            return Err(AdminError::HasChildren { id, count });
        }

        self.api.delete_category(id).await?;
        info!(%id, "Category deleted");
        self.categories.retain(|c| c.id != id);
        Ok(())
    }

    /// Move one sibling under `parent` from position `from` to `to` and
    /// persist the renumbered sort orders.
    ///
    /// Returns the number of categories whose sort order changed.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Api`] if an update is rejected; updates already
    /// sent stay applied.
    #[instrument(skip(self))]
    pub async fn move_sibling(
        &mut self,
        parent: Option<CategoryId>,
        from: usize,
        to: usize,
    ) -> Result<usize, AdminError> {
        let siblings = siblings_of(&self.categories, parent);
        let changes = reorder_siblings(&siblings, from, to);

        for (id, sort_order) in &changes {
            let Some(current) = siblings.iter().find(|c| c.id == *id) else {
                continue;
            };
            let input = CategoryInput {
                sort_order: *sort_order,
                ..CategoryInput::from(current)
            };
            let updated = self.api.update_category(*id, &input).await?;
            self.replace(updated);
        }

        info!(changed = changes.len(), "Siblings reordered");
        Ok(changes.len())
    }

    fn replace(&mut self, category: Category) {
        match self.categories.iter_mut().find(|c| c.id == category.id) {
            Some(existing) => *existing = category,
            None => self.categories.push(category),
        }
    }
}

/// Trim the name and fill in a missing slug.
fn normalize(input: &mut CategoryInput) -> Result<(), AdminError> {
    input.name = input.name.trim().to_string();
    if input.name.is_empty() {
        return Err(AdminError::BadRequest("category name is required".to_string()));
    }
    if input.slug.trim().is_empty() {
        input.slug = slugify(&input.name);
    } else {
        input.slug = input.slug.trim().to_string();
    }
    input.description = input
        .description
        .take()
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());
    Ok(())
}
