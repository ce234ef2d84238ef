//! Core types for the Nursery storefront.
//!
//! This module provides type-safe wrappers and wire records for catalog,
//! cart, order and user data.

pub mod cart;
pub mod category;
pub mod email;
pub mod id;
pub mod order;
pub mod price;
pub mod product;
pub mod user;

pub use cart::{CartItem, CartLines, clamp_quantity};
pub use category::{Category, CategoryInput, slugify};
pub use email::{Email, EmailError};
pub use id::*;
pub use order::{Order, OrderLine, OrderStatus, PlaceOrderRequest, ShippingAddress};
pub use price::{CurrencyCode, Price};
pub use product::{Product, ProductInput, ProductPage};
pub use user::{Role, User};
