//! Authentication bridge.
//!
//! Two modes, chosen by configuration:
//!
//! - **Clerk**: the session token is minted by Clerk outside this process
//!   and handed in through `CLERK_SESSION_TOKEN`. Signing in presents it to
//!   `POST /api/admin-sync/sync-user`, which returns the stored user and role.
//! - **Demo**: no identity provider. Signing in fabricates a local customer
//!   and a random token so the rest of the storefront can run unchanged.
//!
//! The active session is persisted under `auth_session` and restored on
//! start-up. Its token is installed on the shared [`ApiClient`].

mod error;

pub use error::AuthError;

use std::sync::Arc;

use nursery_core::{Email, Role, User, UserId};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::api::ApiClient;
use crate::config::AuthConfig;
use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::storage::{LocalStore, keys, load_json, remove_entry, save_json};

/// Identity provider backing sign-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Clerk,
    Demo,
}

/// A signed-in user and the bearer token that represents them.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct Session {
    pub user: User,
    token: SecretString,
}

impl Session {
    /// Bearer token for API requests.
    #[must_use]
    pub const fn token(&self) -> &SecretString {
        &self.token
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// On-disk form of a [`Session`].
#[derive(Serialize, Deserialize)]
struct StoredSession {
    user: User,
    token: String,
}

/// Sign-in state for one shopper.
pub struct Authenticator {
    mode: AuthMode,
    clerk_token: Option<SecretString>,
    api: ApiClient,
    store: Arc<dyn LocalStore>,
    session: Option<Session>,
}

impl Authenticator {
    /// Create the authenticator and restore any persisted session.
    pub fn new(config: &AuthConfig, api: ApiClient, store: Arc<dyn LocalStore>) -> Self {
        let (mode, clerk_token) = match config {
            AuthConfig::Clerk { session_token, .. } => (AuthMode::Clerk, session_token.clone()),
            AuthConfig::Demo => (AuthMode::Demo, None),
        };

        let session = load_json::<StoredSession>(store.as_ref(), keys::AUTH_SESSION).map(|stored| {
            Session {
                user: stored.user,
                token: SecretString::from(stored.token),
            }
        });
        if let Some(session) = &session {
            api.set_token(Some(session.token.clone()));
            set_sentry_user(&session.user.id, Some(session.user.email.as_str()));
        }

        Self {
            mode,
            clerk_token,
            api,
            store,
            session,
        }
    }

    #[must_use]
    pub const fn mode(&self) -> AuthMode {
        self.mode
    }

    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<&User> {
        self.session.as_ref().map(|s| &s.user)
    }

    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    /// Whether the signed-in user has the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.current_user().is_some_and(User::is_admin)
    }

    /// Sign in as `email`.
    ///
    /// In Clerk mode the email is only checked for format; the backend
    /// decides who the token belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidEmail`] for a malformed address,
    /// [`AuthError::MissingSessionToken`] in Clerk mode without a token, or
    /// [`AuthError::Api`] if the backend rejects the token.
    #[instrument(skip(self, email))]
    pub async fn sign_in(&mut self, email: &str) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        let session = match self.mode {
            AuthMode::Demo => demo_session(email, None),
            AuthMode::Clerk => self.clerk_session().await?,
        };
        Ok(self.establish(session))
    }

    /// Create an account and sign in.
    ///
    /// Clerk accounts are created in Clerk's hosted flow; here the first
    /// sync registers them with the backend, so this behaves like
    /// [`Authenticator::sign_in`].
    ///
    /// # Errors
    ///
    /// See [`Authenticator::sign_in`].
    #[instrument(skip(self, email, name))]
    pub async fn sign_up(&mut self, email: &str, name: &str) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        let session = match self.mode {
            AuthMode::Demo => demo_session(email, Some(name)),
            AuthMode::Clerk => self.clerk_session().await?,
        };
        Ok(self.establish(session))
    }

    /// Re-read the user and role from the backend.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotSignedIn`] without a session, or
    /// [`AuthError::Api`] if the sync fails.
    pub async fn refresh_user(&mut self) -> Result<User, AuthError> {
        let Some(session) = self.session.as_ref() else {
            return Err(AuthError::NotSignedIn);
        };
        if self.mode == AuthMode::Demo {
            return Ok(session.user.clone());
        }
        let user = self.api.sync_user().await?;
        let token = session.token.clone();
        Ok(self.establish(Session { user, token }))
    }

    /// End the session and forget it locally.
    pub fn sign_out(&mut self) {
        if let Some(session) = self.session.take() {
            info!(user_id = %session.user.id, "Signed out");
        }
        self.api.set_token(None);
        remove_entry(self.store.as_ref(), keys::AUTH_SESSION);
        clear_sentry_user();
    }

    async fn clerk_session(&self) -> Result<Session, AuthError> {
        let token = self
            .clerk_token
            .clone()
            .ok_or(AuthError::MissingSessionToken)?;
        self.api.set_token(Some(token.clone()));
        match self.api.sync_user().await {
            Ok(user) => Ok(Session { user, token }),
            Err(e) => {
                self.api.set_token(self.session.as_ref().map(|s| s.token.clone()));
                Err(e.into())
            }
        }
    }

    fn establish(&mut self, session: Session) -> User {
        self.api.set_token(Some(session.token.clone()));
        save_json(
            self.store.as_ref(),
            keys::AUTH_SESSION,
            &StoredSession {
                user: session.user.clone(),
                token: session.token.expose_secret().to_string(),
            },
        );
        set_sentry_user(&session.user.id, Some(session.user.email.as_str()));
        add_breadcrumb("auth", "Signed in", &[("role", session.user.role.to_string())]);
        info!(user_id = %session.user.id, role = %session.user.role, "Signed in");

        let user = session.user.clone();
        self.session = Some(session);
        user
    }
}

/// Fixed id for the local demo shopper.
const DEMO_USER_ID: i64 = 1;

fn demo_session(email: Email, name: Option<&str>) -> Session {
    let name = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map_or_else(|| email.local_part().to_string(), str::to_string);
    Session {
        user: User {
            id: UserId::new(DEMO_USER_ID),
            email,
            name,
            role: Role::Customer,
        },
        token: SecretString::from(format!("demo_{}", uuid::Uuid::new_v4().simple())),
    }
}
