//! Results of backend mutations as seen by the admin.

use std::future::Future;

use serde::Serialize;

use super::ports::BackendError;
use super::{CollectionCache, Error, Notification};

/// A successful mutation: the server's message plus the refetched collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MutationOutcome<T> {
    pub notification: Notification,
    /// Refreshed collection; `None` when the refetch itself failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<T>>,
}

impl<T> MutationOutcome<T> {
    /// Success carrying the server's message.
    pub fn new(message: impl Into<String>, items: Option<Vec<T>>) -> Self {
        Self {
            notification: Notification::success(message),
            items,
        }
    }
}

/// A failed mutation. Nothing was invalidated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{}", notification.message)]
pub struct MutationFailure {
    pub notification: Notification,
    pub error: Error,
}

impl MutationFailure {
    /// Failure showing the server's message when it sent one, else `fallback`.
    pub fn from_backend(err: BackendError, fallback: &str) -> Self {
        let message = err.server_message().unwrap_or(fallback).to_owned();
        Self {
            notification: Notification::error(message),
            error: err.into(),
        }
    }

    /// Failure that always shows `message`.
    pub fn with_message(err: BackendError, message: &str) -> Self {
        Self {
            notification: Notification::error(message),
            error: err.into(),
        }
    }

    /// Failure caused by invalid input, before any backend call.
    pub fn invalid(error: Error) -> Self {
        Self {
            notification: Notification::error(error.message().to_owned()),
            error,
        }
    }
}

/// Refill `cache` after an invalidation.
///
/// A failed refetch is logged and reported as `None`; the mutation itself
/// already succeeded.
pub(crate) async fn refetch<T, F, Fut>(
    cache: &CollectionCache<T>,
    resource: &'static str,
    fetch: F,
) -> Option<Vec<T>>
where
    T: Clone,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>, BackendError>>,
{
    match cache.get_or_fetch(fetch).await {
        Ok(items) => Some(items),
        Err(error) => {
            tracing::warn!(%error, resource, "refetch after mutation failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;

    #[test]
    fn prefers_server_message() {
        let failure =
            MutationFailure::from_backend(BackendError::rejected("Booking locked"), "Failed");
        assert_eq!(failure.notification, Notification::error("Booking locked"));
        assert_eq!(failure.error.code(), ErrorCode::InvalidRequest);
    }

    #[test]
    fn falls_back_without_server_message() {
        let failure = MutationFailure::from_backend(BackendError::timeout("10s"), "Failed");
        assert_eq!(failure.to_string(), "Failed");
        assert_eq!(failure.error.code(), ErrorCode::ServiceUnavailable);
    }
}
