//! Authentication error types.

use thiserror::Error;

use crate::error::ApiError;

/// Errors that can occur during sign-in and sign-up.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] nursery_core::EmailError),

    /// Clerk mode without a session token to present.
    #[error("no Clerk session token configured (set CLERK_SESSION_TOKEN)")]
    MissingSessionToken,

    /// The operation needs a signed-in session.
    #[error("not signed in")]
    NotSignedIn,

    /// The backend rejected the session or could not be reached.
    #[error("sign-in failed: {0}")]
    Api(#[from] ApiError),
}
