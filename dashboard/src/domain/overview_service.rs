//! Dashboard home.

use std::sync::Arc;

use super::ports::CountsQuery;
use super::{
    AccessToken, BookingService, CacheRegistry, Error, ListingService, OverviewView, UserService,
    overview,
};

/// Assembles the overview from the counts endpoint and the cached
/// collections.
#[derive(Clone)]
pub struct OverviewService {
    counts: Arc<dyn CountsQuery>,
    caches: CacheRegistry,
    listings: ListingService,
    bookings: BookingService,
    users: UserService,
}

impl OverviewService {
    pub fn new(
        counts: Arc<dyn CountsQuery>,
        caches: CacheRegistry,
        listings: ListingService,
        bookings: BookingService,
        users: UserService,
    ) -> Self {
        Self {
            counts,
            caches,
            listings,
            bookings,
            users,
        }
    }

    /// Totals, user distribution and the four latest bookings and listings.
    pub async fn overview(&self, token: &AccessToken) -> Result<OverviewView, Error> {
        let caches = self.caches.session(token).await;
        let counts = caches
            .counts
            .get_or_fetch(|| self.counts.counts(token))
            .await?;
        let (users, bookings, listings) = tokio::try_join!(
            self.users.list(token),
            self.bookings.list(token),
            self.listings.list(token),
        )?;
        Ok(overview(counts, &users, &bookings, &listings))
    }
}
