//! Admin sign-in, sign-out and profile.

use std::sync::Arc;

use super::ports::AuthGateway;
use super::{
    AccessToken, CacheRegistry, Error, Invalidation, ListingEditor, LoginCredentials,
    MutationFailure, Notification, User, validation_error,
};

/// Shown when login fails without a server message.
pub const LOGIN_FAILURE_MESSAGE: &str = "Login failed";

/// Shown when logout fails without a server message.
pub const LOGOUT_FAILURE_MESSAGE: &str = "Logout failed";

/// A fresh session.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub token: AccessToken,
    pub notification: Notification,
}

/// Use-cases behind the login page and the sidebar's logout button.
#[derive(Clone)]
pub struct SessionService {
    gateway: Arc<dyn AuthGateway>,
    caches: CacheRegistry,
    editor: Option<ListingEditor>,
}

impl SessionService {
    pub fn new(gateway: Arc<dyn AuthGateway>, caches: CacheRegistry) -> Self {
        Self {
            gateway,
            caches,
            editor: None,
        }
    }

    /// Close the session's open listing drafts on logout.
    #[must_use]
    pub fn with_editor(mut self, editor: ListingEditor) -> Self {
        self.editor = Some(editor);
        self
    }

    /// Validate the login form and exchange it for a token.
    pub async fn login(&self, email: &str, password: &str) -> Result<SignedIn, MutationFailure> {
        let credentials = LoginCredentials::try_from_parts(email, password)
            .map_err(|errors| MutationFailure::invalid(validation_error(&errors)))?;
        let outcome = self.gateway.login(&credentials).await.map_err(|error| {
            tracing::warn!(%error, "login failed");
            MutationFailure::from_backend(error, LOGIN_FAILURE_MESSAGE)
        })?;
        self.caches.invalidate(&Invalidation::session_changed()).await;
        tracing::info!("admin signed in");
        Ok(SignedIn {
            token: outcome.token,
            notification: Notification::success(outcome.message),
        })
    }

    /// End the backend session and drop every cache and draft tied to it.
    pub async fn logout(&self, token: &AccessToken) -> Result<Notification, MutationFailure> {
        let ack = self.gateway.logout(token).await.map_err(|error| {
            tracing::error!(%error, "logout failed");
            MutationFailure::from_backend(error, LOGOUT_FAILURE_MESSAGE)
        })?;
        self.caches.end_session(token).await;
        if let Some(editor) = &self.editor {
            let closed = editor.end_session(token).await;
            if closed > 0 {
                tracing::debug!(closed, "closed listing drafts on logout");
            }
        }
        Ok(Notification::success(ack.message))
    }

    /// Profile of the signed-in admin.
    pub async fn profile(&self, token: &AccessToken) -> Result<User, Error> {
        let caches = self.caches.session(token).await;
        caches
            .profile
            .get_or_fetch(|| self.gateway.profile(token))
            .await
            .map_err(Error::from)
    }
}
