//! Unified error handling for admin operations.

use nursery_core::CategoryId;
use nursery_core::product_csv::CsvError;
use nursery_core::tree::TreeError;
use nursery_storefront::ApiError;
use thiserror::Error;

/// Errors from back-office operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Backend request failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// A parent assignment would break the category tree.
    #[error("Invalid parent: {0}")]
    Tree(#[from] TreeError),

    /// The product file could not be read.
    #[error("Import failed: {0}")]
    Csv(#[from] CsvError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The category still has subcategories.
    #[error("Category {id} has {count} subcategories; move or delete them first")]
    HasChildren { id: CategoryId, count: usize },

    /// Bad input from the operator.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AdminError {
    /// Log the error, sending backend faults to Sentry.
    pub fn report(&self) {
        let server_fault = matches!(self, Self::Api(e) if e.is_server_fault());
        if server_fault {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin operation error"
            );
        } else {
            tracing::warn!(error = %self, "Admin operation rejected");
        }
    }

    /// Message suitable for showing to the operator.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}
