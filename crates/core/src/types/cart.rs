//! Cart line items and the local (offline) cart arithmetic.
//!
//! These functions are the local half of cart reconciliation: they are what
//! the storefront applies when the backend cannot be reached.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// A single line in the shopping cart.
///
/// The line is keyed by the product it refers to; a product appears at most
/// once per cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product this line refers to.
    pub id: ProductId,
    /// Product name at the time it was added.
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Image URL, if the product has one.
    #[serde(default)]
    pub image: Option<String>,
    /// Number of units, always at least 1.
    pub quantity: u32,
}

impl CartItem {
    /// Line total (`price * quantity`).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// Clamp a requested quantity to the minimum of 1.
///
/// There is no upper bound; anything above `u32::MAX` saturates.
#[must_use]
pub fn clamp_quantity(requested: i64) -> u32 {
    u32::try_from(requested.max(1)).unwrap_or(u32::MAX)
}

/// Ordered list of cart lines with local mutation rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartLines(Vec<CartItem>);

impl CartLines {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Lines in display order (most recently added first).
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.0
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Look up a line by product.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartItem> {
        self.0.iter().find(|item| item.id == id)
    }

    /// Add `quantity` units of `item`.
    ///
    /// Increments the existing line if the product is already present,
    /// otherwise prepends a new line. The resulting quantity is at least 1.
    pub fn add(&mut self, item: CartItem, quantity: i64) {
        let quantity = clamp_quantity(quantity);
        if let Some(existing) = self.0.iter_mut().find(|line| line.id == item.id) {
            existing.quantity = existing.quantity.saturating_add(quantity);
        } else {
            self.0.insert(
                0,
                CartItem {
                    quantity,
                    ..item
                },
            );
        }
    }

    /// Remove the line for `id`. Returns whether a line was removed.
    pub fn remove(&mut self, id: ProductId) -> bool {
        let before = self.0.len();
        self.0.retain(|item| item.id != id);
        self.0.len() != before
    }

    /// Set the quantity for `id`, clamped to at least 1.
    ///
    /// Returns whether a line was found.
    pub fn set_quantity(&mut self, id: ProductId, quantity: i64) -> bool {
        match self.0.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.quantity = clamp_quantity(quantity);
                true
            }
            None => false,
        }
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Sum of `price * quantity` over all lines.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.0.iter().map(CartItem::line_total).sum()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.0.iter().map(|item| u64::from(item.quantity)).sum()
    }
}

impl From<Vec<CartItem>> for CartLines {
    fn from(items: Vec<CartItem>) -> Self {
        Self(items)
    }
}

impl IntoIterator for CartLines {
    type Item = CartItem;
    type IntoIter = std::vec::IntoIter<CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: i64, name: &str, price: &str) -> CartItem {
        CartItem {
            id: ProductId::new(id),
            name: name.to_string(),
            price: price.parse().unwrap(),
            image: None,
            quantity: 1,
        }
    }

    #[test]
    fn test_add_prepends_new_lines() {
        let mut cart = CartLines::new();
        cart.add(item(1, "Rose", "199"), 1);
        cart.add(item(2, "Tulip", "149"), 1);
        let names: Vec<_> = cart.items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Tulip", "Rose"]);
    }

    #[test]
    fn test_add_existing_increments_instead_of_duplicating() {
        let mut cart = CartLines::new();
        cart.add(item(1, "Rose", "199"), 2);
        cart.add(item(1, "Rose", "199"), 3);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(ProductId::new(1)).unwrap().quantity, 5);
    }

    #[test]
    fn test_set_quantity_clamps_to_one() {
        let mut cart = CartLines::from(vec![item(1, "Rose", "199")]);
        assert!(cart.set_quantity(ProductId::new(1), 0));
        assert_eq!(cart.get(ProductId::new(1)).unwrap().quantity, 1);
        assert!(cart.set_quantity(ProductId::new(1), -4));
        assert_eq!(cart.get(ProductId::new(1)).unwrap().quantity, 1);
        assert!(!cart.set_quantity(ProductId::new(99), 3));
    }

    #[test]
    fn test_subtotal_and_count() {
        let mut cart = CartLines::new();
        cart.add(item(1, "Rose", "199"), 2);
        cart.add(item(2, "Tulip", "149.50"), 1);
        assert_eq!(cart.subtotal(), "547.50".parse().unwrap());
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = CartLines::from(vec![item(1, "Rose", "199"), item(2, "Tulip", "149")]);
        assert!(cart.remove(ProductId::new(1)));
        assert!(!cart.remove(ProductId::new(1)));
        assert_eq!(cart.len(), 1);
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Price::ZERO);
    }

    #[test]
    fn test_clamp_quantity() {
        assert_eq!(clamp_quantity(0), 1);
        assert_eq!(clamp_quantity(-10), 1);
        assert_eq!(clamp_quantity(7), 7);
        assert_eq!(clamp_quantity(i64::MAX), u32::MAX);
    }
}
