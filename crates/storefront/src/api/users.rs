//! User directory and role sync endpoints.

use nursery_core::{Role, User, UserId};
use reqwest::Method;
use serde::Serialize;
use tracing::instrument;

use super::ApiClient;
use crate::error::ApiError;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RoleUpdate {
    user_id: UserId,
    role: Role,
}

impl ApiClient {
    /// List every user. Admin only.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Forbidden`] without an admin session.
    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.get_json(self.url("api/users")?).await
    }

    /// Register the session's identity with the backend and return the
    /// stored user, including its role.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] if the session token is rejected.
    #[instrument(skip(self))]
    pub async fn sync_user(&self) -> Result<User, ApiError> {
        let url = self.url("api/admin-sync/sync-user")?;
        let body = self.execute(self.request(Method::POST, url)).await?;
        Self::parse(&body)
    }

    /// Change a user's role. Admin only.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is rejected.
    #[instrument(skip(self))]
    pub async fn set_user_role(&self, user_id: UserId, role: Role) -> Result<User, ApiError> {
        self.send_json(
            Method::PUT,
            self.url("api/admin-sync/role")?,
            &RoleUpdate { user_id, role },
        )
        .await
    }
}
