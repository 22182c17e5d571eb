//! Listing queries and mutations.

use std::sync::Arc;

use super::mutation::refetch;
use super::ports::ListingRepository;
use super::{
    AccessToken, CacheRegistry, Error, Invalidation, Listing, ListingSubmission, ListingsView,
    MutationFailure, MutationOutcome, PageQuery, RecordId, SubmissionTarget, listings_view,
};

/// Notification shown when a create or update fails for any reason.
pub const LISTING_FAILURE_MESSAGE: &str = "Failed to process listing";

/// Use-cases behind the listings page.
#[derive(Clone)]
pub struct ListingService {
    repo: Arc<dyn ListingRepository>,
    caches: CacheRegistry,
}

impl ListingService {
    pub fn new(repo: Arc<dyn ListingRepository>, caches: CacheRegistry) -> Self {
        Self { repo, caches }
    }

    /// Every listing, served from the session cache when filled.
    pub async fn list(&self, token: &AccessToken) -> Result<Vec<Listing>, Error> {
        let caches = self.caches.session(token).await;
        caches
            .listings
            .get_or_fetch(|| self.repo.list(token))
            .await
            .map_err(Error::from)
    }

    /// Filtered listings page.
    pub async fn view(&self, token: &AccessToken, query: &PageQuery) -> Result<ListingsView, Error> {
        let listings = self.list(token).await?;
        Ok(listings_view(&listings, query))
    }

    /// A single listing by id.
    pub async fn find(&self, token: &AccessToken, id: RecordId) -> Result<Listing, Error> {
        self.list(token)
            .await?
            .into_iter()
            .find(|listing| listing.id == id)
            .ok_or_else(|| Error::not_found(format!("listing {id} not found")))
    }

    /// Send an assembled create or update.
    ///
    /// Any failure is reported with the generic listing failure message.
    pub async fn submit(
        &self,
        token: &AccessToken,
        submission: &ListingSubmission,
    ) -> Result<MutationOutcome<Listing>, MutationFailure> {
        let result = match submission.target {
            SubmissionTarget::Create => self.repo.create(token, &submission.form).await,
            SubmissionTarget::Update(id) => self.repo.update(token, id, &submission.form).await,
        };
        let ack = result.map_err(|error| {
            tracing::error!(%error, target = ?submission.target, "failed to process listing");
            MutationFailure::with_message(error, LISTING_FAILURE_MESSAGE)
        })?;
        Ok(MutationOutcome::new(ack.message, self.refresh(token).await))
    }

    /// Delete a listing.
    pub async fn delete(
        &self,
        token: &AccessToken,
        id: RecordId,
    ) -> Result<MutationOutcome<Listing>, MutationFailure> {
        let ack = self.repo.delete(token, id).await.map_err(|error| {
            tracing::error!(%error, listing_id = id, "failed to delete listing");
            MutationFailure::from_backend(error, "Failed to delete listing")
        })?;
        Ok(MutationOutcome::new(ack.message, self.refresh(token).await))
    }

    async fn refresh(&self, token: &AccessToken) -> Option<Vec<Listing>> {
        self.caches.invalidate(&Invalidation::listing_mutation()).await;
        let caches = self.caches.session(token).await;
        refetch(&caches.listings, "listings", || self.repo.list(token)).await
    }
}
