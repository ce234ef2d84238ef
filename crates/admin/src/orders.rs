//! Order administration.

use nursery_core::{Order, OrderId, OrderStatus};
use nursery_storefront::ApiClient;
use tracing::{info, instrument};

use crate::error::AdminError;

/// Order back-office operations.
#[derive(Clone)]
pub struct OrderAdmin {
    api: ApiClient,
}

impl OrderAdmin {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Every order, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Api`] if the listing fails.
    pub async fn list(&self) -> Result<Vec<Order>, AdminError> {
        let mut orders = self.api.list_orders().await?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// Move an order to `status`.
    ///
    /// Orders that are delivered or cancelled stay that way.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::BadRequest`] when the order is already final,
    /// or [`AdminError::Api`].
    #[instrument(skip(self))]
    pub async fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<Order, AdminError> {
        let current = self.api.get_order(id).await?;
        if current.status.is_final() && current.status != status {
            return Err(AdminError::BadRequest(format!(
                "order {id} is already {}",
                current.status
            )));
        }
        let order = self.api.update_order_status(id, status).await?;
        info!(%id, from = %current.status, to = %order.status, "Order status updated");
        Ok(order)
    }
}
