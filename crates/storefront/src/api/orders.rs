//! Order endpoints.

use nursery_core::{Order, OrderId, OrderStatus, PlaceOrderRequest};
use reqwest::Method;
use serde::Serialize;
use tracing::instrument;

use super::ApiClient;
use crate::error::ApiError;

#[derive(Serialize)]
struct StatusUpdate {
    status: OrderStatus,
}

impl ApiClient {
    /// List orders visible to the session (own orders, or all for admins).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not an order list.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get_json(self.url("api/orders")?).await
    }

    /// Fetch one order.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown id.
    #[instrument(skip(self))]
    pub async fn get_order(&self, id: OrderId) -> Result<Order, ApiError> {
        self.get_json(self.url(&format!("api/orders/{id}"))?).await
    }

    /// Place an order for the given lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is rejected.
    #[instrument(skip(self, request), fields(lines = request.items.len()))]
    pub async fn place_order(&self, request: &PlaceOrderRequest) -> Result<Order, ApiError> {
        self.send_json(Method::POST, self.url("api/orders")?, request)
            .await
    }

    /// Move an order to a new status.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is rejected.
    #[instrument(skip(self))]
    pub async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, ApiError> {
        self.send_json(
            Method::PUT,
            self.url(&format!("api/orders/{id}/status"))?,
            &StatusUpdate { status },
        )
        .await
    }
}
