//! Nursery Core - shared types and catalog logic.
//!
//! This crate provides the types and pure algorithms used across the
//! Nursery components:
//! - `storefront` - Data client, cart reconciliation, auth bridge
//! - `admin` - Back-office operations (catalog, orders, users)
//! - `cli` - Command-line front end
//!
//! # Architecture
//!
//! The core crate does no I/O: no HTTP, no files, no logging. That keeps
//! the tree builder, cart arithmetic and CSV codec testable in isolation.
//!
//! # Modules
//!
//! - [`types`] - IDs, prices, cart lines, categories, products, orders, users
//! - [`tree`] - Category tree building, flattening and cycle checks
//! - [`listing`] - Filters and sorts over a flattened category list
//! - [`reorder`] - Sibling reordering for drag-and-drop
//! - [`product_csv`] - Bulk product CSV import/export
//! - [`events`] - Category change notifications

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod events;
pub mod listing;
pub mod product_csv;
pub mod reorder;
pub mod tree;
pub mod types;

pub use types::*;
