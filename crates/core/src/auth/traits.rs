use async_trait::async_trait;
use thiserror::Error;

use super::types::{AuthRequest, Identity};

#[derive(Debug, Error)]
pub enum AuthError {
    /// No credential was presented (no session cookie on the request).
    #[error("Authentication required")]
    NotAuthenticated,

    /// A credential was presented but did not resolve to a live session.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The session store could not be reached or answered garbage.
    #[error("Authentication service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Resolves a request to a user identity. Implementations cover the
/// configured auth methods ("none" for development, "session" for real
/// deployments).
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError>;

    /// Method label, matches the config value that selects it.
    fn method_name(&self) -> &'static str;
}
