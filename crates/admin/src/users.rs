//! User administration.

use nursery_core::{Role, User, UserId};
use nursery_storefront::ApiClient;
use tracing::{info, instrument};

use crate::error::AdminError;

/// User back-office operations.
#[derive(Clone)]
pub struct UserAdmin {
    api: ApiClient,
}

impl UserAdmin {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// # Errors
    ///
    /// Returns [`AdminError::Api`] if the listing fails.
    pub async fn list(&self) -> Result<Vec<User>, AdminError> {
        Ok(self.api.list_users().await?)
    }

    /// Grant or revoke the admin role.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Api`] if the change is rejected.
    #[instrument(skip(self))]
    pub async fn set_role(&self, id: UserId, role: Role) -> Result<User, AdminError> {
        let user = self.api.set_user_role(id, role).await?;
        info!(%id, %role, "User role changed");
        Ok(user)
    }
}
