//! Server-side cart endpoints.

use std::future::Future;

use nursery_core::{CartItem, Order, PlaceOrderRequest, ProductId};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::ApiClient;
use crate::error::ApiError;

/// Body of `GET /api/cart`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartResponse {
    pub items: Vec<CartItem>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CartLineRequest {
    product_id: ProductId,
    #[serde(skip_serializing_if = "Option::is_none")]
    quantity: Option<u32>,
}

/// The remote half of the cart.
///
/// [`crate::cart::CartService`] talks to the server through this trait so
/// the reconciliation rules can be exercised against an in-process fake.
pub trait CartBackend: Send + Sync {
    /// Whether requests will carry a session.
    fn is_signed_in(&self) -> bool;

    /// Fetch the full server cart.
    fn fetch_cart(&self) -> impl Future<Output = Result<Vec<CartItem>, ApiError>> + Send;

    /// Add `quantity` units of a product.
    fn add_to_cart(
        &self,
        id: ProductId,
        quantity: u32,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Remove a product's line.
    fn remove_from_cart(&self, id: ProductId) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Set a line's quantity.
    fn update_cart_item(
        &self,
        id: ProductId,
        quantity: u32,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Empty the cart.
    fn clear_cart(&self) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Place an order for the given lines.
    fn submit_order(
        &self,
        request: &PlaceOrderRequest,
    ) -> impl Future<Output = Result<Order, ApiError>> + Send;
}

impl ApiClient {
    async fn post_cart(&self, path: &str, body: &CartLineRequest) -> Result<(), ApiError> {
        let url = self.url(path)?;
        self.send_unit(self.request(Method::POST, url).json(body))
            .await
    }
}

impl CartBackend for ApiClient {
    fn is_signed_in(&self) -> bool {
        self.has_token()
    }

    #[instrument(skip(self))]
    async fn fetch_cart(&self) -> Result<Vec<CartItem>, ApiError> {
        let cart: CartResponse = self.get_json(self.url("api/cart")?).await?;
        Ok(cart.items)
    }

    #[instrument(skip(self))]
    async fn add_to_cart(&self, id: ProductId, quantity: u32) -> Result<(), ApiError> {
        self.post_cart(
            "api/cart/add",
            &CartLineRequest {
                product_id: id,
                quantity: Some(quantity),
            },
        )
        .await
    }

    #[instrument(skip(self))]
    async fn remove_from_cart(&self, id: ProductId) -> Result<(), ApiError> {
        self.post_cart(
            "api/cart/remove",
            &CartLineRequest {
                product_id: id,
                quantity: None,
            },
        )
        .await
    }

    #[instrument(skip(self))]
    async fn update_cart_item(&self, id: ProductId, quantity: u32) -> Result<(), ApiError> {
        self.post_cart(
            "api/cart/update",
            &CartLineRequest {
                product_id: id,
                quantity: Some(quantity),
            },
        )
        .await
    }

    #[instrument(skip(self))]
    async fn clear_cart(&self) -> Result<(), ApiError> {
        let url = self.url("api/cart/clear")?;
        self.send_unit(self.request(Method::POST, url)).await
    }

    async fn submit_order(&self, request: &PlaceOrderRequest) -> Result<Order, ApiError> {
        self.place_order(request).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_line_request_wire_format() {
        let add = CartLineRequest {
            product_id: ProductId::new(12),
            quantity: Some(3),
        };
        assert_eq!(
            serde_json::to_string(&add).unwrap(),
            r#"{"productId":12,"quantity":3}"#
        );

        let remove = CartLineRequest {
            product_id: ProductId::new(12),
            quantity: None,
        };
        assert_eq!(serde_json::to_string(&remove).unwrap(), r#"{"productId":12}"#);
    }

    #[test]
    fn test_cart_response_requires_items() {
        assert!(serde_json::from_str::<CartResponse>(r#"{"items":[]}"#).is_ok());
        assert!(serde_json::from_str::<CartResponse>("[]").is_err());
    }
}
