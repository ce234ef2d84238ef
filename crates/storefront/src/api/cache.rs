//! In-memory cache entries for catalog listings.

use nursery_core::{Category, Product, ProductPage};

use super::products::ProductQuery;

/// What a cached entry was fetched for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Products(ProductQuery),
    Product(String),
    Categories,
}

/// A cached response.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(ProductPage),
    Product(Box<Product>),
    Categories(Vec<Category>),
}
