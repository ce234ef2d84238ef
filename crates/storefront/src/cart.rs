//! Cart reconciliation.
//!
//! The server cart is the source of truth whenever it can be reached. Each
//! mutation is sent to the backend once; on success the whole server cart is
//! re-fetched and replaces local state. When the backend cannot be reached,
//! or there is no session, the same mutation is applied to the local lines
//! instead and the caller is told via [`SyncOutcome::LocalOnly`]. Either way
//! the resulting lines are mirrored to the local store.
//!
//! Network failures never surface as errors from cart mutations. Checkout is
//! the exception: placing an order either succeeds or fails loudly.

use std::fmt;
use std::sync::Arc;

use nursery_core::{
    CartItem, CartLines, Order, OrderLine, PlaceOrderRequest, Price, ProductId, ShippingAddress,
    clamp_quantity,
};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::api::CartBackend;
use crate::error::{ApiError, add_breadcrumb};
use crate::storage::{LocalStore, keys, load_json, save_json};

const NOT_SIGNED_IN: &str = "not signed in";

/// Whether a cart change reached the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The server accepted the change and local state mirrors the server cart.
    Synced,
    /// The change was applied locally only.
    LocalOnly { reason: String },
}

impl SyncOutcome {
    #[must_use]
    pub const fn is_synced(&self) -> bool {
        matches!(self, Self::Synced)
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Synced => f.write_str("synced"),
            Self::LocalOnly { reason } => write!(f, "saved locally ({reason})"),
        }
    }
}

/// Errors that stop a checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Your cart is empty")]
    EmptyCart,

    #[error("Please sign in to place an order")]
    NotSignedIn,

    #[error("Shipping address is missing: {}", .0.join(", "))]
    IncompleteAddress(Vec<&'static str>),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// The shopper's cart.
pub struct CartService<B> {
    backend: B,
    store: Arc<dyn LocalStore>,
    lines: CartLines,
}

impl<B: CartBackend> CartService<B> {
    /// A cart with no lines. Call [`CartService::load`] to restore state.
    pub fn new(backend: B, store: Arc<dyn LocalStore>) -> Self {
        Self {
            backend,
            store,
            lines: CartLines::new(),
        }
    }

    /// The backend this cart syncs with.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Lines in display order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        self.lines.items()
    }

    /// Sum of `price * quantity` over every line.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.lines.subtotal()
    }

    /// Total units across every line.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.item_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Restore the local backup, then try to replace it with the server cart.
    pub async fn load(&mut self) -> SyncOutcome {
        self.lines = load_json::<CartLines>(self.store.as_ref(), keys::CART_ITEMS).unwrap_or_default();
        self.refresh().await
    }

    /// Replace local lines with the server cart.
    ///
    /// A failed fetch keeps the current lines.
    #[instrument(skip(self))]
    pub async fn refresh(&mut self) -> SyncOutcome {
        if !self.backend.is_signed_in() {
            return local_only(NOT_SIGNED_IN);
        }
        match self.backend.fetch_cart().await {
            Ok(items) => {
                self.lines = CartLines::from(items);
                self.persist();
                SyncOutcome::Synced
            }
            Err(e) => degraded("refresh", &e),
        }
    }

    /// Add `quantity` units of `item` (at least one).
    #[instrument(skip(self, item), fields(product_id = %item.id))]
    pub async fn add(&mut self, item: CartItem, quantity: i64) -> SyncOutcome {
        add_breadcrumb(
            "cart",
            "Add to cart",
            &[
                ("product_id", item.id.to_string()),
                ("quantity", quantity.to_string()),
            ],
        );
        let remote = if self.backend.is_signed_in() {
            self.backend
                .add_to_cart(item.id, clamp_quantity(quantity))
                .await
                .map_err(|e| failure("add", &e))
        } else {
            Err(NOT_SIGNED_IN.to_string())
        };
        self.reconcile(remote, |lines| lines.add(item, quantity))
            .await
    }

    /// Remove the line for `id`.
    #[instrument(skip(self))]
    pub async fn remove(&mut self, id: ProductId) -> SyncOutcome {
        add_breadcrumb("cart", "Remove from cart", &[("product_id", id.to_string())]);
        let remote = if self.backend.is_signed_in() {
            self.backend
                .remove_from_cart(id)
                .await
                .map_err(|e| failure("remove", &e))
        } else {
            Err(NOT_SIGNED_IN.to_string())
        };
        self.reconcile(remote, |lines| {
            lines.remove(id);
        })
        .await
    }

    /// Set the quantity for `id`, clamped to at least one.
    #[instrument(skip(self))]
    pub async fn update_quantity(&mut self, id: ProductId, quantity: i64) -> SyncOutcome {
        let remote = if self.backend.is_signed_in() {
            self.backend
                .update_cart_item(id, clamp_quantity(quantity))
                .await
                .map_err(|e| failure("update", &e))
        } else {
            Err(NOT_SIGNED_IN.to_string())
        };
        self.reconcile(remote, |lines| {
            lines.set_quantity(id, quantity);
        })
        .await
    }

    /// Remove every line.
    #[instrument(skip(self))]
    pub async fn clear(&mut self) -> SyncOutcome {
        let remote = if self.backend.is_signed_in() {
            self.backend
                .clear_cart()
                .await
                .map_err(|e| failure("clear", &e))
        } else {
            Err(NOT_SIGNED_IN.to_string())
        };
        self.reconcile(remote, CartLines::clear).await
    }

    /// Place an order for the current lines and empty the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError`] if the cart is empty, there is no session,
    /// the address is incomplete, or the backend rejects the order.
    #[instrument(skip(self, address))]
    pub async fn checkout(&mut self, address: ShippingAddress) -> Result<Order, CheckoutError> {
        if self.lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        if !self.backend.is_signed_in() {
            return Err(CheckoutError::NotSignedIn);
        }
        let missing = address.missing_fields();
        if !missing.is_empty() {
            return Err(CheckoutError::IncompleteAddress(missing));
        }

        let request = PlaceOrderRequest {
            items: self.lines.items().iter().map(OrderLine::from).collect(),
            shipping_address: address,
        };
        let order = self.backend.submit_order(&request).await.inspect_err(|e| {
            if e.is_server_fault() {
                sentry::capture_error(e);
            }
        })?;
        info!(order_id = %order.id, total = %order.total.amount(), "Order placed");
        add_breadcrumb("checkout", "Order placed", &[("order_id", order.id.to_string())]);

        if let SyncOutcome::LocalOnly { reason } = self.clear().await {
            warn!(%reason, "Order placed but server cart was not cleared");
        }
        Ok(order)
    }

    /// Settle a mutation: take the server cart after a successful call,
    /// otherwise apply `local` to the current lines.
    async fn reconcile(
        &mut self,
        remote: Result<(), String>,
        local: impl FnOnce(&mut CartLines) + Send,
    ) -> SyncOutcome {
        let outcome = match remote {
            Ok(()) => match self.backend.fetch_cart().await {
                Ok(items) => {
                    self.lines = CartLines::from(items);
                    SyncOutcome::Synced
                }
                Err(e) => {
                    local(&mut self.lines);
                    degraded("refresh", &e)
                }
            },
            Err(reason) => {
                local(&mut self.lines);
                SyncOutcome::LocalOnly { reason }
            }
        };
        self.persist();
        outcome
    }

    fn persist(&self) {
        save_json(self.store.as_ref(), keys::CART_ITEMS, &self.lines);
    }
}

fn local_only(reason: &str) -> SyncOutcome {
    SyncOutcome::LocalOnly {
        reason: reason.to_string(),
    }
}

fn failure(action: &str, error: &ApiError) -> String {
    warn!(action, error = %error, "Cart sync failed, falling back to local cart");
    error.to_string()
}

fn degraded(action: &str, error: &ApiError) -> SyncOutcome {
    SyncOutcome::LocalOnly {
        reason: failure(action, error),
    }
}
