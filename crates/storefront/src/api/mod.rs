//! REST client for the Nursery backend.
//!
//! # Architecture
//!
//! - One [`ApiClient`] per process, cheaply cloned (shared `Arc` inner)
//! - Every response is parsed into a single typed schema; a mismatch is an
//!   [`ApiError::Schema`], never a guess at an alternative shape
//! - Product and category listings are cached in memory via `moka`; the
//!   category cache is also dropped on server-sent change events
//! - No retries: each call is one attempt
//!
//! # Example
//!
//! ```rust,ignore
//! use nursery_storefront::api::{ApiClient, ProductQuery};
//!
//! let client = ApiClient::new(&config)?;
//! let page = client.list_products(&ProductQuery::default()).await?;
//! let categories = client.list_categories().await?;
//! ```

mod cache;
mod cart;
mod categories;
mod events;
mod orders;
mod products;
mod users;

pub use cart::{CartBackend, CartResponse};
pub use events::{CategoryEventStream, SseFrame};
pub use products::{BulkUploadResult, ProductQuery};

use std::sync::{Arc, PoisonError, RwLock};

use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::config::StorefrontConfig;
use crate::error::{ApiError, excerpt};

use cache::{CacheKey, CacheValue};

const CACHE_CAPACITY: u64 = 1000;

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the storefront and admin REST endpoints.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    /// No overall timeout; used for the event stream.
    stream_client: reqwest::Client,
    base_url: Url,
    token: RwLock<Option<SecretString>>,
    cache: Cache<CacheKey, CacheValue>,
}

impl ApiClient {
    /// Create a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("nursery-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let stream_client = reqwest::Client::builder()
            .connect_timeout(config.request_timeout)
            .user_agent(concat!("nursery-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(config.cache_ttl)
            .build();

        // Relative joins need a trailing slash to keep any path prefix.
        let mut base_url = config.api_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                stream_client,
                base_url,
                token: RwLock::new(config.auth.session_token().map(SecretString::from)),
                cache,
            }),
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Replace the bearer token sent with every request.
    pub fn set_token(&self, token: Option<SecretString>) {
        *self
            .inner
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = token;
    }

    /// Whether a bearer token is set.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.inner
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Resolve an API path such as `api/products` against the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.inner
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidRequest(format!("bad path '{path}': {e}")))
    }

    /// Start a request with the bearer token attached.
    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.authorize(self.inner.client.request(method, url))
    }

    /// Start a long-lived streaming request with the bearer token attached.
    pub(crate) fn stream_request(&self, method: Method, url: Url) -> RequestBuilder {
        self.authorize(self.inner.stream_client.request(method, url))
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        let token = self
            .inner
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        match token.as_ref() {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Send a request and return the body of a successful response.
    pub(crate) async fn execute(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        let url = response.url().clone();
        let body = response.text().await?;

        if !status.is_success() {
            let err = ApiError::from_status(status, &body);
            if status.is_server_error() {
                tracing::error!(%status, %url, body = %excerpt(&body), "Backend returned server error");
            } else {
                debug!(%status, %url, "Backend rejected request");
            }
            return Err(err);
        }

        Ok(body)
    }

    /// Parse a response body into `T`.
    pub(crate) fn parse<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
        serde_json::from_str(body).map_err(|error| {
            warn!(%error, body = %excerpt(body), "Response did not match schema");
            ApiError::Schema {
                error,
                body: excerpt(body),
            }
        })
    }

    /// `GET` a JSON resource.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let body = self.execute(self.request(Method::GET, url)).await?;
        Self::parse(&body)
    }

    /// Send a JSON body and parse a JSON response.
    pub(crate) async fn send_json<B, T>(&self, method: Method, url: Url, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self.execute(self.request(method, url).json(body)).await?;
        Self::parse(&body)
    }

    /// Send a request whose response body is ignored.
    pub(crate) async fn send_unit(&self, request: RequestBuilder) -> Result<(), ApiError> {
        self.execute(request).await.map(|_| ())
    }

    /// Drop every cached listing.
    pub fn invalidate_cache(&self) {
        self.inner.cache.invalidate_all();
    }

    pub(crate) fn cache(&self) -> &Cache<CacheKey, CacheValue> {
        &self.inner.cache
    }
}
