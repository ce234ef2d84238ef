//! Product category records as exchanged with the backend.

use serde::{Deserialize, Serialize};

use super::id::CategoryId;

/// A category record. Categories form a tree through `parent_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// URL slug, unique among siblings.
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Parent category, `None` for a root.
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Position among siblings, ascending.
    #[serde(default)]
    pub sort_order: i32,
}

const fn default_active() -> bool {
    true
}

impl Category {
    /// Whether this category has no parent.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Create/update payload for a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<CategoryId>,
    pub is_active: bool,
    pub sort_order: i32,
}

impl CategoryInput {
    /// Build an input with a slug derived from the name.
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            slug: slugify(name),
            description: None,
            parent_id: None,
            is_active: true,
            sort_order: 0,
        }
    }
}

impl From<&Category> for CategoryInput {
    fn from(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            slug: category.slug.clone(),
            description: category.description.clone(),
            parent_id: category.parent_id,
            is_active: category.is_active,
            sort_order: category.sort_order,
        }
    }
}

/// Lowercase, ASCII-alphanumeric slug with single dashes.
///
/// ```
/// assert_eq!(nursery_core::slugify("  Air Plants & Ferns "), "air-plants-ferns");
/// ```
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
