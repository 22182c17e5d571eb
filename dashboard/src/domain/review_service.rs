//! Review queries and moderation.

use std::sync::Arc;

use super::mutation::refetch;
use super::ports::ReviewRepository;
use super::{
    AccessToken, CacheRegistry, Error, Invalidation, MutationFailure, MutationOutcome, PageQuery,
    RecordId, Review, ReviewsView, reviews_view,
};

/// Use-cases behind the reviews page.
#[derive(Clone)]
pub struct ReviewService {
    repo: Arc<dyn ReviewRepository>,
    caches: CacheRegistry,
}

impl ReviewService {
    pub fn new(repo: Arc<dyn ReviewRepository>, caches: CacheRegistry) -> Self {
        Self { repo, caches }
    }

    pub async fn list(&self, token: &AccessToken) -> Result<Vec<Review>, Error> {
        let caches = self.caches.session(token).await;
        caches
            .reviews
            .get_or_fetch(|| self.repo.list(token))
            .await
            .map_err(Error::from)
    }

    pub async fn view(&self, token: &AccessToken, query: &PageQuery) -> Result<ReviewsView, Error> {
        let reviews = self.list(token).await?;
        Ok(reviews_view(&reviews, query))
    }

    /// Remove a review, then refetch the collection.
    pub async fn delete(
        &self,
        token: &AccessToken,
        id: RecordId,
    ) -> Result<MutationOutcome<Review>, MutationFailure> {
        let ack = self.repo.delete(token, id).await.map_err(|error| {
            tracing::error!(%error, review_id = id, "failed to delete review");
            MutationFailure::from_backend(error, "Failed to delete review")
        })?;
        self.caches.invalidate(&Invalidation::review_deleted()).await;
        let caches = self.caches.session(token).await;
        let items = refetch(&caches.reviews, "reviews", || self.repo.list(token)).await;
        Ok(MutationOutcome::new(ack.message, items))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::Notification;
    use crate::domain::ports::{BackendError, MockReviewRepository};
    use crate::domain::test_support::{review, token};

    #[tokio::test]
    async fn rejected_delete_leaves_cache_alone() {
        let mut repo = MockReviewRepository::new();
        repo.expect_list()
            .times(1)
            .returning(|_| Ok(vec![review(1, 5), review(2, 3)]));
        repo.expect_delete()
            .times(1)
            .returning(|_, _| Err(BackendError::rejected("Review not found")));
        let service = ReviewService::new(Arc::new(repo), CacheRegistry::default());

        service.list(&token()).await.expect("warm cache");
        let failure = service.delete(&token(), 9).await.expect_err("rejected");
        assert_eq!(failure.notification, Notification::error("Review not found"));
        let view = service
            .view(&token(), &PageQuery::default())
            .await
            .expect("cached view");
        assert_eq!(view.stats.average_rating, 4.0);
    }
}
