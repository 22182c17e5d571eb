//! Port for administering platform users.

use async_trait::async_trait;

use crate::domain::{AccessToken, ProfileUpdate, RecordId, User};

use super::{Acknowledgement, BackendError};

/// Backend access to the admin user list (`/auth/admin`).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Every user, in backend order.
    async fn list(&self, token: &AccessToken) -> Result<Vec<User>, BackendError>;

    /// Apply an admin edit to another user's profile.
    async fn update(
        &self,
        token: &AccessToken,
        id: RecordId,
        profile: &ProfileUpdate,
    ) -> Result<Acknowledgement, BackendError>;
}

/// Fixture implementation with no users.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserRepository;

#[async_trait]
impl UserRepository for FixtureUserRepository {
    async fn list(&self, _token: &AccessToken) -> Result<Vec<User>, BackendError> {
        Ok(Vec::new())
    }

    async fn update(
        &self,
        _token: &AccessToken,
        _id: RecordId,
        _profile: &ProfileUpdate,
    ) -> Result<Acknowledgement, BackendError> {
        Ok(Acknowledgement::new("Profile updated"))
    }
}
