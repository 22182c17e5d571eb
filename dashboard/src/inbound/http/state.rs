//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AuthGateway, BookingRepository, CountsQuery, FixtureAuthGateway, FixtureBookingRepository,
    FixtureCountsQuery, FixtureListingRepository, FixtureReviewRepository, FixtureUserRepository,
    ListingRepository, ReviewRepository, UserRepository,
};
use crate::domain::{
    BookingService, CacheRegistry, DEFAULT_MAX_DRAFTS, DEFAULT_MAX_IMAGES,
    DEFAULT_SESSION_CAPACITY, ListingEditor, ListingService, OverviewService, ReviewService,
    SessionService, UserService,
};

use super::session::CookieSettings;

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub listings: Arc<dyn ListingRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
    pub users: Arc<dyn UserRepository>,
    pub counts: Arc<dyn CountsQuery>,
    pub auth: Arc<dyn AuthGateway>,
}

impl HttpStatePorts {
    /// Bundle one adapter that implements every port.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: ListingRepository
            + BookingRepository
            + ReviewRepository
            + UserRepository
            + CountsQuery
            + AuthGateway
            + 'static,
    {
        Self {
            listings: backend.clone(),
            bookings: backend.clone(),
            reviews: backend.clone(),
            users: backend.clone(),
            counts: backend.clone(),
            auth: backend,
        }
    }
}

impl Default for HttpStatePorts {
    fn default() -> Self {
        Self {
            listings: Arc::new(FixtureListingRepository),
            bookings: Arc::new(FixtureBookingRepository),
            reviews: Arc::new(FixtureReviewRepository),
            users: Arc::new(FixtureUserRepository),
            counts: Arc::new(FixtureCountsQuery),
            auth: Arc::new(FixtureAuthGateway),
        }
    }
}

/// Tunables that shape the services built from the ports.
#[derive(Debug, Clone, Copy)]
pub struct HttpStateOptions {
    pub cookies: CookieSettings,
    pub max_images: usize,
    pub max_drafts: usize,
    pub cache_sessions: usize,
}

impl Default for HttpStateOptions {
    fn default() -> Self {
        Self {
            cookies: CookieSettings::default(),
            max_images: DEFAULT_MAX_IMAGES,
            max_drafts: DEFAULT_MAX_DRAFTS,
            cache_sessions: DEFAULT_SESSION_CAPACITY,
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub listings: ListingService,
    pub bookings: BookingService,
    pub reviews: ReviewService,
    pub users: UserService,
    pub sessions: SessionService,
    pub overview: OverviewService,
    pub editor: ListingEditor,
    pub cookies: CookieSettings,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports, HttpStateOptions::default())
    }
}

impl HttpState {
    /// Build every service over one shared cache registry.
    ///
    /// # Examples
    /// ```
    /// use dashboard::inbound::http::state::{HttpState, HttpStateOptions, HttpStatePorts};
    ///
    /// let state = HttpState::new(HttpStatePorts::default(), HttpStateOptions::default());
    /// let _editor = state.editor.clone();
    /// ```
    pub fn new(ports: HttpStatePorts, options: HttpStateOptions) -> Self {
        let HttpStatePorts {
            listings,
            bookings,
            reviews,
            users,
            counts,
            auth,
        } = ports;
        let caches = CacheRegistry::new(options.cache_sessions);
        let listings = ListingService::new(listings, caches.clone());
        let bookings = BookingService::new(bookings, caches.clone());
        let users = UserService::new(users, caches.clone());
        let overview = OverviewService::new(
            counts,
            caches.clone(),
            listings.clone(),
            bookings.clone(),
            users.clone(),
        );
        let editor = ListingEditor::new(listings.clone(), options.max_images)
            .with_max_drafts(options.max_drafts);
        Self {
            reviews: ReviewService::new(reviews, caches.clone()),
            sessions: SessionService::new(auth, caches).with_editor(editor.clone()),
            listings,
            bookings,
            users,
            overview,
            editor,
            cookies: options.cookies,
        }
    }
}
