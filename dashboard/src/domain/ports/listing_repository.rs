//! Port for reading and mutating room listings.

use async_trait::async_trait;

use crate::domain::{AccessToken, Listing, ListingForm, RecordId};

use super::{Acknowledgement, BackendError};

/// Backend access to room listings (`/rooms`).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Every listing, in backend order.
    async fn list(&self, token: &AccessToken) -> Result<Vec<Listing>, BackendError>;

    /// Create a listing from a multipart form.
    async fn create(
        &self,
        token: &AccessToken,
        form: &ListingForm,
    ) -> Result<Acknowledgement, BackendError>;

    /// Replace a listing's fields and images.
    async fn update(
        &self,
        token: &AccessToken,
        id: RecordId,
        form: &ListingForm,
    ) -> Result<Acknowledgement, BackendError>;

    /// Delete a listing.
    async fn delete(&self, token: &AccessToken, id: RecordId)
    -> Result<Acknowledgement, BackendError>;
}

/// Fixture implementation with no listings that acknowledges every mutation.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureListingRepository;

#[async_trait]
impl ListingRepository for FixtureListingRepository {
    async fn list(&self, _token: &AccessToken) -> Result<Vec<Listing>, BackendError> {
        Ok(Vec::new())
    }

    async fn create(
        &self,
        _token: &AccessToken,
        _form: &ListingForm,
    ) -> Result<Acknowledgement, BackendError> {
        Ok(Acknowledgement::new("Listing created"))
    }

    async fn update(
        &self,
        _token: &AccessToken,
        _id: RecordId,
        _form: &ListingForm,
    ) -> Result<Acknowledgement, BackendError> {
        Ok(Acknowledgement::new("Listing updated"))
    }

    async fn delete(
        &self,
        _token: &AccessToken,
        _id: RecordId,
    ) -> Result<Acknowledgement, BackendError> {
        Ok(Acknowledgement::new("Listing deleted"))
    }
}
