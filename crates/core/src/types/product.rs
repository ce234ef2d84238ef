//! Catalog products.

use serde::{Deserialize, Serialize};

use super::cart::CartItem;
use super::id::{CategoryId, ProductId};
use super::price::Price;

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub price: Price,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// Units in stock.
    #[serde(default)]
    pub inventory: u32,
    /// Image URLs, first is the primary image.
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

impl Product {
    /// Whether at least one unit is in stock.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.inventory > 0
    }

    /// A cart line for this product with quantity 1.
    #[must_use]
    pub fn to_cart_item(&self) -> CartItem {
        CartItem {
            id: self.id,
            name: self.name.clone(),
            price: self.price,
            image: self.images.first().cloned(),
            quantity: 1,
        }
    }
}

/// Create/update payload for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    pub slug: String,
    pub price: Price,
    pub description: Option<String>,
    pub category_id: Option<CategoryId>,
    pub inventory: u32,
    pub images: Vec<String>,
}

/// One page of a product listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl ProductPage {
    /// Number of pages at this page size.
    #[must_use]
    pub fn page_count(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.limit))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_item_uses_primary_image() {
        let product: Product = serde_json::from_str(
            r#"{"id":5,"name":"Monstera","slug":"monstera","price":"899","images":["a.jpg","b.jpg"],"inventory":3}"#,
        )
        .unwrap();
        let item = product.to_cart_item();
        assert_eq!(item.image.as_deref(), Some("a.jpg"));
        assert_eq!(item.quantity, 1);
        assert!(product.in_stock());
    }

    #[test]
    fn test_page_count() {
        let page = ProductPage {
            products: vec![],
            total: 41,
            page: 1,
            limit: 20,
        };
        assert_eq!(page.page_count(), 3);
    }
}
