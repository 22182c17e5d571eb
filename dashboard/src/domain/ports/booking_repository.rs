//! Port for bookings.

use async_trait::async_trait;

use crate::domain::{AccessToken, Booking, RecordId};

use super::{Acknowledgement, BackendError};

/// Backend access to bookings (`/bookings`).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Every booking, in backend order.
    async fn list(&self, token: &AccessToken) -> Result<Vec<Booking>, BackendError>;

    /// Delete a booking.
    async fn delete(&self, token: &AccessToken, id: RecordId)
    -> Result<Acknowledgement, BackendError>;
}

/// Fixture implementation with no bookings.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureBookingRepository;

#[async_trait]
impl BookingRepository for FixtureBookingRepository {
    async fn list(&self, _token: &AccessToken) -> Result<Vec<Booking>, BackendError> {
        Ok(Vec::new())
    }

    async fn delete(
        &self,
        _token: &AccessToken,
        _id: RecordId,
    ) -> Result<Acknowledgement, BackendError> {
        Ok(Acknowledgement::new("Booking deleted"))
    }
}
