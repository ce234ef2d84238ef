//! Errors from the REST backend and their user-facing messages.
//!
//! Every client call returns `Result<T, ApiError>`. Callers decide whether
//! to surface an error, degrade (the cart does), or capture it to Sentry.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when talking to the REST backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never got a response (DNS, connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// 401 from the backend.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 403 from the backend.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// 404 from the backend.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// 5xx from the backend.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Any other non-success status.
    #[error("Unexpected status ({status}): {message}")]
    Status { status: u16, message: String },

    /// The body did not match the expected schema.
    #[error("Unexpected response shape: {error} (body: {body})")]
    Schema {
        error: serde_json::Error,
        body: String,
    },

    /// The event stream broke off or sent invalid UTF-8.
    #[error("Stream error: {0}")]
    Stream(String),

    /// The request could not be built (bad path or form part).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Longest body excerpt kept in errors and logs.
pub(crate) const BODY_EXCERPT_CHARS: usize = 200;

pub(crate) fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}

impl ApiError {
    /// Build the error for a non-success status.
    pub(crate) fn from_status(status: StatusCode, body: &str) -> Self {
        let message = error_message(body);
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized(message),
            StatusCode::FORBIDDEN => Self::Forbidden(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            s if s.is_server_error() => Self::Server {
                status: s.as_u16(),
                message,
            },
            s => Self::Status {
                status: s.as_u16(),
                message,
            },
        }
    }

    /// Whether the backend was unreachable rather than refusing the request.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Stream(_))
    }

    /// Whether the failure is on the backend's side and capture-worthy.
    #[must_use]
    pub const fn is_server_fault(&self) -> bool {
        matches!(self, Self::Server { .. } | Self::Schema { .. })
    }

    /// Message suitable for showing to a shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Http(_) | Self::Stream(_) => {
                "Unable to reach the store. Check your connection and try again.".to_string()
            }
            Self::Unauthorized(_) => "Please sign in to continue.".to_string(),
            Self::Forbidden(_) => "You don't have permission to do that.".to_string(),
            Self::NotFound(_) => "We couldn't find what you were looking for.".to_string(),
            Self::RateLimited(seconds) => {
                format!("Too many requests. Please wait {seconds} seconds and try again.")
            }
            Self::Server { .. } | Self::Schema { .. } => {
                "Something went wrong on our end. Please try again later.".to_string()
            }
            Self::Status { message, .. } | Self::InvalidRequest(message) => message.clone(),
        }
    }
}

/// Pull `message` or `error` out of a JSON error body, else the raw text.
fn error_message(body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        message: Option<String>,
        error: Option<String>,
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message.or(b.error))
        .unwrap_or_else(|| excerpt(body.trim()))
}

/// Add a breadcrumb for a shopper action.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: &[(&str, String)]) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };
    for (key, value) in data {
        breadcrumb
            .data
            .insert((*key).to_string(), serde_json::Value::String(value.clone()));
    }
    sentry::add_breadcrumb(breadcrumb);
}

/// Associate subsequent Sentry events with a user.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
