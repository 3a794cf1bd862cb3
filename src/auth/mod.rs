//! Session state and the protected-route gate.
//!
//! One context owns the `{status, user}` pair for the whole session; every
//! component that needs to know whether someone is signed in asks it instead
//! of issuing its own verification call. The gate re-verifies against the
//! server on every protected-path evaluation; there is no caching across
//! navigations, so a revoked session is caught on the next gated render.

pub mod routes;

use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

use crate::api::types::{SessionVerification, UserProfile};
use crate::api::{ApiClient, ApiError};
use routes::RouteClass;

/// Landing page for signed-in users bounced off guest-only views
const SIGNED_IN_HOME: &str = "/dashboard";

/// What the context currently knows about the session
#[derive(Debug, Clone)]
pub enum AuthStatus {
    /// No verification has run yet this session
    Unknown,
    Authenticated(UserProfile),
    Anonymous,
}

impl AuthStatus {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthStatus::Authenticated(_))
    }
}

/// Verdict for one gated navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Render the requested view
    Granted,
    /// Send the visitor elsewhere
    Redirect { target: String },
}

/// The session-verification call, seamed out so the gate can be exercised
/// without a server.
#[async_trait]
pub trait SessionVerifier: Send + Sync {
    async fn verify_session(&self) -> Result<SessionVerification, ApiError>;
}

#[async_trait]
impl SessionVerifier for ApiClient {
    async fn verify_session(&self) -> Result<SessionVerification, ApiError> {
        self.verify_token().await
    }
}

/// Shared auth state provider.
pub struct AuthContext<V = ApiClient> {
    verifier: Arc<V>,
    status: RwLock<AuthStatus>,
}

impl<V: SessionVerifier> AuthContext<V> {
    pub fn new(verifier: Arc<V>) -> Self {
        Self {
            verifier,
            status: RwLock::new(AuthStatus::Unknown),
        }
    }

    /// Last known status without touching the network
    pub fn status(&self) -> AuthStatus {
        self.status.read().clone()
    }

    /// Currently known user, if authenticated
    pub fn user(&self) -> Option<UserProfile> {
        match &*self.status.read() {
            AuthStatus::Authenticated(user) => Some(user.clone()),
            _ => None,
        }
    }

    /// Re-verify the session against the server.
    ///
    /// Any failure (network, expired cookie, server error) resolves to
    /// `Anonymous`; the distinction only matters for what the caller shows,
    /// not for whether a protected view renders.
    pub async fn refresh(&self) -> AuthStatus {
        let status = match self.verifier.verify_session().await {
            Ok(verification) if verification.authenticated => match verification.user {
                Some(user) => AuthStatus::Authenticated(user),
                None => AuthStatus::Anonymous,
            },
            Ok(_) => AuthStatus::Anonymous,
            Err(err) => {
                debug!(error = %err, "session verification failed");
                AuthStatus::Anonymous
            }
        };

        *self.status.write() = status.clone();
        status
    }

    /// Forget the session locally (the cookie itself is the server's to revoke)
    pub fn clear(&self) {
        *self.status.write() = AuthStatus::Anonymous;
    }

    /// Gate a navigation to `path`.
    ///
    /// Protected paths re-verify on every call and bounce anonymous visitors
    /// to the login view with the original path as return target; guest-only
    /// paths bounce signed-in users to the dashboard; everything else renders
    /// without a verification round trip.
    pub async fn gate(&self, path: &str) -> Access {
        match routes::classify(path) {
            RouteClass::Public => Access::Granted,
            RouteClass::Protected => {
                if self.refresh().await.is_authenticated() {
                    Access::Granted
                } else {
                    Access::Redirect {
                        target: login_redirect(path),
                    }
                }
            }
            RouteClass::GuestOnly => {
                if self.refresh().await.is_authenticated() {
                    Access::Redirect {
                        target: SIGNED_IN_HOME.to_string(),
                    }
                } else {
                    Access::Granted
                }
            }
        }
    }
}

/// Login path carrying the originally requested path as return target
pub fn login_redirect(path: &str) -> String {
    format!("/login?redirect={}", path)
}
