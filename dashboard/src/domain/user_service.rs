//! Administration of platform users.

use std::sync::Arc;

use super::mutation::refetch;
use super::ports::UserRepository;
use super::{
    AccessToken, CacheRegistry, Error, Invalidation, MutationFailure, MutationOutcome, PageQuery,
    ProfileForm, ProfileUpdate, RecordId, User, UsersView, users_view, validation_error,
};

/// Use-cases behind the users page and the user edit dialog.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    caches: CacheRegistry,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, caches: CacheRegistry) -> Self {
        Self { repo, caches }
    }

    pub async fn list(&self, token: &AccessToken) -> Result<Vec<User>, Error> {
        let caches = self.caches.session(token).await;
        caches
            .users
            .get_or_fetch(|| self.repo.list(token))
            .await
            .map_err(Error::from)
    }

    pub async fn view(&self, token: &AccessToken, query: &PageQuery) -> Result<UsersView, Error> {
        let users = self.list(token).await?;
        Ok(users_view(&users, query))
    }

    /// Validate and apply an admin edit of a user's profile.
    ///
    /// Invalid input fails before the backend is called.
    pub async fn update(
        &self,
        token: &AccessToken,
        id: RecordId,
        form: &ProfileForm,
    ) -> Result<MutationOutcome<User>, MutationFailure> {
        let profile = ProfileUpdate::try_from_form(form)
            .map_err(|errors| MutationFailure::invalid(validation_error(&errors)))?;
        let ack = self.repo.update(token, id, &profile).await.map_err(|error| {
            tracing::error!(%error, user_id = id, "failed to update user");
            MutationFailure::from_backend(error, "Failed to update user")
        })?;
        self.caches.invalidate(&Invalidation::user_updated()).await;
        let caches = self.caches.session(token).await;
        let items = refetch(&caches.users, "users", || self.repo.list(token)).await;
        Ok(MutationOutcome::new(ack.message, items))
    }
}
