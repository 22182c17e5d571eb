//! Port for listing reviews.

use async_trait::async_trait;

use crate::domain::{AccessToken, RecordId, Review};

use super::{Acknowledgement, BackendError};

/// Backend access to reviews (`/reviews`).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Every review, in backend order.
    async fn list(&self, token: &AccessToken) -> Result<Vec<Review>, BackendError>;

    /// Delete a review.
    async fn delete(&self, token: &AccessToken, id: RecordId)
    -> Result<Acknowledgement, BackendError>;
}

/// Fixture implementation with no reviews.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureReviewRepository;

#[async_trait]
impl ReviewRepository for FixtureReviewRepository {
    async fn list(&self, _token: &AccessToken) -> Result<Vec<Review>, BackendError> {
        Ok(Vec::new())
    }

    async fn delete(
        &self,
        _token: &AccessToken,
        _id: RecordId,
    ) -> Result<Acknowledgement, BackendError> {
        Ok(Acknowledgement::new("Review deleted"))
    }
}
