//! Authentication provider boundary.
//!
//! The real identity provider (popup OAuth) is an external collaborator; the
//! application only sees the `AuthProvider` trait and the identity it yields
//! on success. `DevProvider` serves a fixed identity for local development
//! and tests.

use async_trait::async_trait;
use thiserror::Error;

/// Identity yielded by a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub uid: String,
    pub display_name: String,
    pub email: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("sign-in was cancelled")]
    Cancelled,

    #[error("provider failure: {0}")]
    Provider(String),
}

/// One popup-based sign-in flow plus sign-out.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self) -> Result<AuthenticatedUser, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;
}

/// Provider serving a fixed identity, configured from settings.
pub struct DevProvider {
    user: AuthenticatedUser,
}

impl DevProvider {
    pub fn new(uid: &str, display_name: &str, email: &str) -> Self {
        Self {
            user: AuthenticatedUser {
                uid: uid.to_string(),
                display_name: display_name.to_string(),
                email: email.to_string(),
            },
        }
    }
}

#[async_trait]
impl AuthProvider for DevProvider {
    async fn sign_in(&self) -> Result<AuthenticatedUser, AuthError> {
        tracing::debug!(uid = %self.user.uid, "dev sign-in");
        Ok(self.user.clone())
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        tracing::debug!(uid = %self.user.uid, "dev sign-out");
        Ok(())
    }
}
