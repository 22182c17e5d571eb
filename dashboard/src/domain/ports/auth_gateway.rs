//! Port for the backend's session endpoints.
//!
//! Login is the only backend call made without a token; it is the call that
//! obtains one.

use async_trait::async_trait;

use crate::domain::{AccessToken, LoginCredentials, LoginOutcome, User};

use super::{Acknowledgement, BackendError};

/// Backend access to `/auth/login`, `/auth/logout` and `/auth/get-user`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Exchange credentials for a session token.
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginOutcome, BackendError>;

    /// End the backend session.
    async fn logout(&self, token: &AccessToken) -> Result<Acknowledgement, BackendError>;

    /// Profile of the signed-in admin.
    async fn profile(&self, token: &AccessToken) -> Result<User, BackendError>;
}

/// Fixture gateway that rejects every login.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAuthGateway;

#[async_trait]
impl AuthGateway for FixtureAuthGateway {
    async fn login(&self, _credentials: &LoginCredentials) -> Result<LoginOutcome, BackendError> {
        Err(BackendError::rejected("Invalid credentials"))
    }

    async fn logout(&self, _token: &AccessToken) -> Result<Acknowledgement, BackendError> {
        Ok(Acknowledgement::new("Logged out"))
    }

    async fn profile(&self, _token: &AccessToken) -> Result<User, BackendError> {
        Err(BackendError::status(401_u16, "Not signed in"))
    }
}
