//! Nursery Admin library.
//!
//! Back-office operations over the Nursery REST backend. Each operation
//! validates what it can locally (tree shape, CSV layout, field presence)
//! before calling the backend, which remains the authority on permissions.
//!
//! # Modules
//!
//! - [`categories`] - Category tree editing with cycle checks and reordering
//! - [`products`] - Product CRUD and bulk CSV import/export
//! - [`orders`] - Order listing and status changes
//! - [`users`] - User listing and role changes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod categories;
pub mod error;
pub mod orders;
pub mod products;
pub mod users;

pub use categories::CategoryManager;
pub use error::AdminError;
pub use orders::OrderAdmin;
pub use products::{ImportReport, ProductAdmin};
pub use users::UserAdmin;
