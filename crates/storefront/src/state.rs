//! The storefront handle passed to every front end.

use std::sync::Arc;

use nursery_core::{Product, User};

use crate::api::ApiClient;
use crate::auth::{AuthError, Authenticator};
use crate::cart::{CartService, SyncOutcome};
use crate::config::StorefrontConfig;
use crate::error::ApiError;
use crate::recently_viewed::RecentlyViewed;
use crate::storage::{FileStore, LocalStore};

/// Everything one shopper session needs.
///
/// Owns the configuration, the shared API client, the local store, the
/// sign-in state, the cart and the recently viewed list. There are no
/// globals; front ends create one of these and pass it around.
pub struct Storefront {
    config: StorefrontConfig,
    api: ApiClient,
    store: Arc<dyn LocalStore>,
    pub auth: Authenticator,
    pub cart: CartService<ApiClient>,
    pub recently_viewed: RecentlyViewed,
}

impl Storefront {
    /// Create a storefront backed by files in `config.data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, ApiError> {
        let store: Arc<dyn LocalStore> = Arc::new(FileStore::new(config.data_dir.clone()));
        Self::with_store(config, store)
    }

    /// Create a storefront over an explicit store.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_store(config: StorefrontConfig, store: Arc<dyn LocalStore>) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config)?;
        // Restores any saved session token before the cart first talks to the server.
        let auth = Authenticator::new(&config.auth, api.clone(), store.clone());
        let cart = CartService::new(api.clone(), store.clone());
        let recently_viewed = RecentlyViewed::load(store.clone());

        Ok(Self {
            config,
            api,
            store,
            auth,
            cart,
            recently_viewed,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub fn store(&self) -> &dyn LocalStore {
        self.store.as_ref()
    }

    /// Sign in and pull the server cart for the new session.
    ///
    /// # Errors
    ///
    /// See [`Authenticator::sign_in`].
    pub async fn sign_in(&mut self, email: &str) -> Result<(User, SyncOutcome), AuthError> {
        let user = self.auth.sign_in(email).await?;
        let outcome = self.cart.refresh().await;
        Ok((user, outcome))
    }

    /// Sign up and pull the server cart for the new session.
    ///
    /// # Errors
    ///
    /// See [`Authenticator::sign_up`].
    pub async fn sign_up(&mut self, email: &str, name: &str) -> Result<(User, SyncOutcome), AuthError> {
        let user = self.auth.sign_up(email, name).await?;
        let outcome = self.cart.refresh().await;
        Ok((user, outcome))
    }

    /// Sign out. The local cart backup is kept.
    pub fn sign_out(&mut self) {
        self.auth.sign_out();
    }

    /// Fetch a product page and remember it as recently viewed.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown slug.
    pub async fn view_product(&mut self, slug: &str) -> Result<Product, ApiError> {
        let product = self.api.get_product(slug).await?;
        self.recently_viewed.record(product.id);
        Ok(product)
    }
}
