//! Storefront client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `NURSERY_API_URL` - Base URL of the REST backend (e.g. `https://shop.example.in`)
//!
//! ## Optional
//! - `NURSERY_DATA_DIR` - Directory for the local store (default: `.nursery`)
//! - `NURSERY_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 15)
//! - `NURSERY_CACHE_TTL_SECS` - Product/category cache lifetime (default: 300)
//! - `NURSERY_CURRENCY` - Display currency code (default: INR)
//! - `CLERK_PUBLISHABLE_KEY` - Enables Clerk mode; demo mode when unset
//! - `CLERK_SESSION_TOKEN` - Clerk session JWT used as the API bearer token
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use nursery_core::CurrencyCode;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL of the REST backend
    pub api_url: Url,
    /// Directory holding the local store files
    pub data_dir: PathBuf,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Lifetime of cached product and category listings
    pub cache_ttl: Duration,
    /// Currency used when formatting prices
    pub currency: CurrencyCode,
    /// Identity provider settings
    pub auth: AuthConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Which identity provider backs sign-in.
///
/// Implements `Debug` manually to redact the session token.
#[derive(Clone)]
pub enum AuthConfig {
    /// Clerk-hosted sign-in. The session token is minted by Clerk and passed in.
    Clerk {
        publishable_key: String,
        session_token: Option<SecretString>,
    },
    /// Local stand-in used when no Clerk credentials are configured.
    Demo,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Clerk {
                publishable_key,
                session_token,
            } => f
                .debug_struct("Clerk")
                .field("publishable_key", publishable_key)
                .field(
                    "session_token",
                    &session_token.as_ref().map(|_| "[REDACTED]"),
                )
                .finish(),
            Self::Demo => f.write_str("Demo"),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid,
    /// or if the Clerk session token is not a JWT.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`StorefrontConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let api_url = env.required("NURSERY_API_URL")?;
        let api_url = Url::parse(&api_url).map_err(|e| {
            ConfigError::InvalidEnvVar("NURSERY_API_URL".to_string(), e.to_string())
        })?;
        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                "NURSERY_API_URL".to_string(),
                format!("unsupported scheme '{}'", api_url.scheme()),
            ));
        }

        let data_dir = PathBuf::from(env.or_default("NURSERY_DATA_DIR", ".nursery"));
        let request_timeout = Duration::from_secs(env.parsed("NURSERY_REQUEST_TIMEOUT_SECS", 15)?);
        let cache_ttl = Duration::from_secs(env.parsed("NURSERY_CACHE_TTL_SECS", 300)?);
        let currency = env
            .or_default("NURSERY_CURRENCY", "INR")
            .parse::<CurrencyCode>()
            .map_err(|e| ConfigError::InvalidEnvVar("NURSERY_CURRENCY".to_string(), e))?;

        Ok(Self {
            api_url,
            data_dir,
            request_timeout,
            cache_ttl,
            currency,
            auth: AuthConfig::from_env(&env)?,
            sentry_dsn: env.optional("SENTRY_DSN"),
        })
    }

    /// Whether sign-in is simulated locally.
    #[must_use]
    pub const fn is_demo_mode(&self) -> bool {
        matches!(self.auth, AuthConfig::Demo)
    }
}

impl AuthConfig {
    fn from_env(env: &Env<'_>) -> Result<Self, ConfigError> {
        let Some(publishable_key) = env.optional("CLERK_PUBLISHABLE_KEY") else {
            return Ok(Self::Demo);
        };
        if !(publishable_key.starts_with("pk_test_") || publishable_key.starts_with("pk_live_")) {
            return Err(ConfigError::InvalidEnvVar(
                "CLERK_PUBLISHABLE_KEY".to_string(),
                "must start with pk_test_ or pk_live_".to_string(),
            ));
        }

        let session_token = env
            .optional("CLERK_SESSION_TOKEN")
            .map(|token| {
                validate_jwt_shape(&token, "CLERK_SESSION_TOKEN")?;
                Ok::<_, ConfigError>(SecretString::from(token))
            })
            .transpose()?;

        Ok(Self::Clerk {
            publishable_key,
            session_token,
        })
    }

    /// The configured Clerk session token, if any.
    #[must_use]
    pub fn session_token(&self) -> Option<&str> {
        match self {
            Self::Clerk {
                session_token: Some(token),
                ..
            } => Some(token.expose_secret()),
            _ => None,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get a required, non-empty variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an optional variable; blank values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Get a numeric variable with a default value.
    fn parsed(&self, key: &str, default: u64) -> Result<u64, ConfigError> {
        self.optional(key).map_or(Ok(default), |value| {
            value
                .trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }
}

/// Check that a token is three non-empty dot-separated base64url segments.
///
/// Clerk mints the token, so its contents are not inspected further.
fn validate_jwt_shape(token: &str, var_name: &str) -> Result<(), ConfigError> {
    let segments: Vec<&str> = token.split('.').collect();
    let well_formed = segments.len() == 3
        && segments.iter().all(|segment| {
            !segment.is_empty()
                && segment
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        });
    if well_formed {
        Ok(())
    } else {
        Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "expected a JWT (header.payload.signature)".to_string(),
        ))
    }
}
