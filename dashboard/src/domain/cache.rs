//! In-memory collection caches and explicit invalidation.
//!
//! Each backend collection is fetched once and served from memory until a
//! mutation invalidates it. Invalidation is an explicit event: a service that
//! mutates state names the [`Resource`]s it touched, the cache drops them, and
//! the next read refetches.
//!
//! Caches are scoped to one admin session ([`SessionCaches`]) so a request is
//! only ever answered from data the backend already served to the same
//! token. Invalidations fan out to every session.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use super::{AccessToken, Booking, Counts, Identified, Listing, RecordId, Review, User};

/// Cached backend resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Resource {
    Listings,
    Bookings,
    Reviews,
    Users,
    Counts,
    Profile,
}

/// A set of resources to drop after a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Invalidation(Vec<Resource>);

impl Invalidation {
    /// Resources touched by a listing create, update or delete.
    pub fn listing_mutation() -> Self {
        Self(vec![Resource::Listings, Resource::Counts])
    }

    /// Resources touched by deleting a booking.
    pub fn booking_deleted() -> Self {
        Self(vec![Resource::Bookings, Resource::Counts])
    }

    /// Resources touched by deleting a review.
    pub fn review_deleted() -> Self {
        Self(vec![Resource::Reviews])
    }

    /// Resources touched by an admin profile edit.
    pub fn user_updated() -> Self {
        Self(vec![Resource::Users])
    }

    /// Resources touched by login or logout.
    pub fn session_changed() -> Self {
        Self(vec![Resource::Profile])
    }

    /// Whether `resource` is part of this invalidation.
    pub fn contains(&self, resource: Resource) -> bool {
        self.0.contains(&resource)
    }

    /// Resources in this invalidation.
    pub fn resources(&self) -> &[Resource] {
        &self.0
    }
}

/// Cached copy of one backend collection, in backend order.
///
/// Cloning shares the underlying storage.
#[derive(Debug)]
pub struct CollectionCache<T> {
    inner: Arc<RwLock<Option<Vec<T>>>>,
}

impl<T> Clone for CollectionCache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for CollectionCache<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(RwLock::new(None)),
        }
    }
}

impl<T: Clone> CollectionCache<T> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached collection, fetching it when absent.
    ///
    /// Fetch errors are returned and leave the cache empty.
    pub async fn get_or_fetch<E, F, Fut>(&self, fetch: F) -> Result<Vec<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, E>>,
    {
        if let Some(items) = self.inner.read().await.as_ref() {
            return Ok(items.clone());
        }
        let mut slot = self.inner.write().await;
        if let Some(items) = slot.as_ref() {
            return Ok(items.clone());
        }
        let items = fetch().await?;
        *slot = Some(items.clone());
        Ok(items)
    }

    /// Snapshot of the cached collection, if filled.
    pub async fn snapshot(&self) -> Option<Vec<T>> {
        self.inner.read().await.clone()
    }

    /// Replace the cached collection.
    pub async fn store(&self, items: Vec<T>) {
        *self.inner.write().await = Some(items);
    }

    /// Drop the cached collection.
    pub async fn invalidate(&self) {
        *self.inner.write().await = None;
    }

    /// Whether the collection is currently cached.
    pub async fn is_filled(&self) -> bool {
        self.inner.read().await.is_some()
    }
}

impl<T: Clone + Identified> CollectionCache<T> {
    /// Look up a cached record by id without fetching.
    pub async fn find(&self, id: RecordId) -> Option<T> {
        self.inner
            .read()
            .await
            .as_ref()
            .and_then(|items| items.iter().find(|item| item.record_id() == id).cloned())
    }
}

/// Single cached value such as the counts summary or the admin profile.
#[derive(Debug)]
pub struct ValueCache<T> {
    inner: Arc<RwLock<Option<T>>>,
}

impl<T> Clone for ValueCache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for ValueCache<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(RwLock::new(None)),
        }
    }
}

impl<T: Clone> ValueCache<T> {
    /// Return the cached value, fetching it when absent.
    pub async fn get_or_fetch<E, F, Fut>(&self, fetch: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.inner.read().await.as_ref() {
            return Ok(value.clone());
        }
        let mut slot = self.inner.write().await;
        if let Some(value) = slot.as_ref() {
            return Ok(value.clone());
        }
        let value = fetch().await?;
        *slot = Some(value.clone());
        Ok(value)
    }

    /// Drop the cached value.
    pub async fn invalidate(&self) {
        *self.inner.write().await = None;
    }

    /// Whether a value is cached.
    pub async fn is_filled(&self) -> bool {
        self.inner.read().await.is_some()
    }
}

/// Every cache belonging to one admin session.
#[derive(Debug, Clone, Default)]
pub struct SessionCaches {
    pub listings: CollectionCache<Listing>,
    pub bookings: CollectionCache<Booking>,
    pub reviews: CollectionCache<Review>,
    pub users: CollectionCache<User>,
    pub counts: ValueCache<Counts>,
    pub profile: ValueCache<User>,
}

impl SessionCaches {
    /// Drop every cache named by `invalidation`.
    pub async fn apply(&self, invalidation: &Invalidation) {
        for resource in invalidation.resources() {
            match resource {
                Resource::Listings => self.listings.invalidate().await,
                Resource::Bookings => self.bookings.invalidate().await,
                Resource::Reviews => self.reviews.invalidate().await,
                Resource::Users => self.users.invalidate().await,
                Resource::Counts => self.counts.invalidate().await,
                Resource::Profile => self.profile.invalidate().await,
            }
        }
    }
}

/// Default number of concurrently cached admin sessions.
pub const DEFAULT_SESSION_CAPACITY: usize = 64;

#[derive(Default)]
struct Sessions {
    by_token: HashMap<String, SessionCaches>,
    order: VecDeque<String>,
}

/// Session-scoped caches keyed by access token.
///
/// The oldest session is evicted once `capacity` sessions are cached.
#[derive(Clone)]
pub struct CacheRegistry {
    sessions: Arc<RwLock<Sessions>>,
    capacity: usize,
}

impl fmt::Debug for CacheRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheRegistry")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl Default for CacheRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_CAPACITY)
    }
}

impl CacheRegistry {
    /// Registry holding at most `capacity` sessions (minimum one).
    pub fn new(capacity: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(Sessions::default())),
            capacity: capacity.max(1),
        }
    }

    /// Caches for `token`, created on first use.
    pub async fn session(&self, token: &AccessToken) -> SessionCaches {
        if let Some(caches) = self.sessions.read().await.by_token.get(token.expose()) {
            return caches.clone();
        }
        let mut sessions = self.sessions.write().await;
        if let Some(caches) = sessions.by_token.get(token.expose()) {
            return caches.clone();
        }
        while sessions.order.len() >= self.capacity {
            let Some(oldest) = sessions.order.pop_front() else {
                break;
            };
            sessions.by_token.remove(&oldest);
        }
        let caches = SessionCaches::default();
        sessions.order.push_back(token.expose().to_owned());
        sessions
            .by_token
            .insert(token.expose().to_owned(), caches.clone());
        caches
    }

    /// Apply `invalidation` to every cached session.
    pub async fn invalidate(&self, invalidation: &Invalidation) {
        let sessions: Vec<SessionCaches> =
            self.sessions.read().await.by_token.values().cloned().collect();
        for caches in sessions {
            caches.apply(invalidation).await;
        }
    }

    /// Forget a session entirely, for example after logout.
    pub async fn end_session(&self, token: &AccessToken) {
        let mut sessions = self.sessions.write().await;
        sessions.by_token.remove(token.expose());
        sessions.order.retain(|cached| cached != token.expose());
    }

    /// Number of cached sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.by_token.len()
    }

    /// Whether no session is cached.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq)]
    struct Row(u64);

    impl Identified for Row {
        fn record_id(&self) -> RecordId {
            self.0
        }
    }

    #[tokio::test]
    async fn fetches_once_until_invalidated() {
        let cache = CollectionCache::<Row>::new();
        let calls = AtomicUsize::new(0);
        let fetch = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ()>(vec![Row(3), Row(1)])
        };

        assert_eq!(cache.get_or_fetch(fetch).await, Ok(vec![Row(3), Row(1)]));
        assert_eq!(cache.get_or_fetch(fetch).await, Ok(vec![Row(3), Row(1)]));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.find(1).await, Some(Row(1)));

        cache.invalidate().await;
        assert!(!cache.is_filled().await);
        assert!(cache.find(1).await.is_none());
        cache.get_or_fetch(fetch).await.expect("refetch");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_fetch_leaves_cache_empty() {
        let cache = CollectionCache::<Row>::new();
        let result = cache.get_or_fetch(|| async { Err::<Vec<Row>, _>("down") }).await;
        assert_eq!(result, Err("down"));
        assert!(!cache.is_filled().await);
    }

    #[tokio::test]
    async fn clones_share_storage() {
        let cache = CollectionCache::<Row>::new();
        let other = cache.clone();
        cache.store(vec![Row(1)]).await;
        assert_eq!(other.snapshot().await, Some(vec![Row(1)]));
    }

    fn token(raw: &str) -> AccessToken {
        AccessToken::new(raw).expect("token")
    }

    #[tokio::test]
    async fn sessions_are_isolated_but_share_invalidations() {
        let registry = CacheRegistry::default();
        let first = registry.session(&token("a.b.c")).await;
        let second = registry.session(&token("d.e.f")).await;
        let zero = || async { Ok::<_, ()>(Counts::default()) };
        first.counts.get_or_fetch(zero).await.expect("counts");
        second.counts.get_or_fetch(zero).await.expect("counts");
        assert!(!registry.session(&token("g.h.i")).await.counts.is_filled().await);

        registry.invalidate(&Invalidation::booking_deleted()).await;
        assert!(!first.counts.is_filled().await);
        assert!(!second.counts.is_filled().await);
    }

    #[tokio::test]
    async fn evicts_oldest_session_at_capacity() {
        let registry = CacheRegistry::new(2);
        let first = registry.session(&token("one")).await;
        first
            .counts
            .get_or_fetch(|| async { Ok::<_, ()>(Counts::default()) })
            .await
            .expect("counts");
        registry.session(&token("two")).await;
        registry.session(&token("three")).await;
        assert_eq!(registry.len().await, 2);
        assert!(!registry.session(&token("one")).await.counts.is_filled().await);
    }

    #[tokio::test]
    async fn ending_a_session_drops_its_caches() {
        let registry = CacheRegistry::default();
        registry.session(&token("a.b.c")).await;
        registry.end_session(&token("a.b.c")).await;
        assert!(registry.is_empty().await);
    }

    #[test]
    fn invalidation_table() {
        assert_eq!(
            Invalidation::listing_mutation().resources(),
            [Resource::Listings, Resource::Counts]
        );
        assert!(Invalidation::booking_deleted().contains(Resource::Counts));
        assert!(!Invalidation::review_deleted().contains(Resource::Counts));
        assert_eq!(Invalidation::user_updated().resources(), [Resource::Users]);
        assert_eq!(Invalidation::session_changed().resources(), [Resource::Profile]);
    }
}
