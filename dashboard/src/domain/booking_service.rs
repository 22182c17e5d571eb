//! Booking queries and deletion.

use std::sync::Arc;

use super::mutation::refetch;
use super::ports::BookingRepository;
use super::{
    AccessToken, Booking, BookingsView, CacheRegistry, Error, Invalidation, MutationFailure,
    MutationOutcome, PageQuery, RecordId, bookings_view,
};

/// Use-cases behind the bookings page.
#[derive(Clone)]
pub struct BookingService {
    repo: Arc<dyn BookingRepository>,
    caches: CacheRegistry,
}

impl BookingService {
    pub fn new(repo: Arc<dyn BookingRepository>, caches: CacheRegistry) -> Self {
        Self { repo, caches }
    }

    /// Every booking, served from the session cache when filled.
    pub async fn list(&self, token: &AccessToken) -> Result<Vec<Booking>, Error> {
        let caches = self.caches.session(token).await;
        caches
            .bookings
            .get_or_fetch(|| self.repo.list(token))
            .await
            .map_err(Error::from)
    }

    /// Filtered bookings page.
    pub async fn view(&self, token: &AccessToken, query: &PageQuery) -> Result<BookingsView, Error> {
        let bookings = self.list(token).await?;
        Ok(bookings_view(&bookings, query))
    }

    /// Delete a booking, then refetch the collection.
    pub async fn delete(
        &self,
        token: &AccessToken,
        id: RecordId,
    ) -> Result<MutationOutcome<Booking>, MutationFailure> {
        let ack = self.repo.delete(token, id).await.map_err(|error| {
            tracing::error!(%error, booking_id = id, "failed to delete booking");
            MutationFailure::from_backend(error, "Failed to delete booking")
        })?;
        self.caches.invalidate(&Invalidation::booking_deleted()).await;
        let caches = self.caches.session(token).await;
        let items = refetch(&caches.bookings, "bookings", || self.repo.list(token)).await;
        Ok(MutationOutcome::new(ack.message, items))
    }
}
