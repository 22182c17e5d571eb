//! Port for platform-wide totals.

use async_trait::async_trait;

use crate::domain::{AccessToken, Counts};

use super::BackendError;

/// Backend access to `/counts`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CountsQuery: Send + Sync {
    /// Current totals.
    async fn counts(&self, token: &AccessToken) -> Result<Counts, BackendError>;
}

/// Fixture implementation reporting zero everywhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCountsQuery;

#[async_trait]
impl CountsQuery for FixtureCountsQuery {
    async fn counts(&self, _token: &AccessToken) -> Result<Counts, BackendError> {
        Ok(Counts::default())
    }
}
