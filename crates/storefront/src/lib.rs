//! Nursery Storefront library.
//!
//! Client-side logic for the Nursery plant shop: a typed REST client with a
//! catalog cache, cart reconciliation with a local fallback, the Clerk/demo
//! auth bridge, a local persistent store and server-sent category events.
//!
//! # Modules
//!
//! - [`api`] - REST client and change-event stream
//! - [`cart`] - Cart reconciliation (`SyncOutcome`, checkout)
//! - [`auth`] - Clerk or demo sign-in
//! - [`storage`] - Local key-value store
//! - [`state`] - The [`Storefront`] handle tying it together

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod auth;
pub mod cart;
pub mod config;
pub mod error;
pub mod recently_viewed;
pub mod retry;
pub mod state;
pub mod storage;

pub use api::ApiClient;
pub use cart::{CartService, CheckoutError, SyncOutcome};
pub use config::StorefrontConfig;
pub use error::ApiError;
pub use state::Storefront;
