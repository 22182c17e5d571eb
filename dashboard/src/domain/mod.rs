//! Domain primitives, decisions and use-cases of the admin dashboard.
//!
//! Purpose: hold everything that does not depend on a transport. Inbound
//! adapters call the services here; the services talk to the REST backend
//! only through the traits in [`ports`].
//!
//! Public surface:
//! - Token claims and the navigation guard ([`decode_claims`], [`evaluate`]).
//! - Listing drafts: image staging and multipart assembly.
//! - Backend records, page views and per-session caches.
//! - Resource services and the listing editor.

pub mod ports;

mod auth;
mod booking_service;
mod cache;
mod claims;
mod drafts;
pub mod error;
mod guard;
mod listing_service;
mod mutation;
mod notification;
mod overview_service;
mod records;
mod review_service;
mod session_service;
mod staging;
mod submission;
pub mod trace_id;
mod user_service;
mod views;

#[cfg(test)]
pub(crate) mod test_support;

pub use self::auth::{
    AccessToken, LoginCredentials, LoginOutcome, PASSWORD_MIN, ProfileForm, ProfileUpdate,
};
pub use self::booking_service::BookingService;
pub use self::cache::{
    CacheRegistry, CollectionCache, DEFAULT_SESSION_CAPACITY, Invalidation, Resource,
    SessionCaches, ValueCache,
};
pub use self::claims::{Role, SessionClaims, TokenPolicy, decode_claims};
pub use self::drafts::{
    DEFAULT_DRAFT_IDLE_TIMEOUT, DEFAULT_MAX_DRAFTS, DraftSnapshot, ListingEditor, StagedFileSummary, StagedImages,
};
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::guard::{
    GUARDED_PATHS, GuardDecision, HOME_PATH, LOGIN_PATH, Navigation, evaluate, is_guarded,
};
pub use self::listing_service::{LISTING_FAILURE_MESSAGE, ListingService};
pub use self::mutation::{MutationFailure, MutationOutcome};
pub use self::notification::{Level, Notification};
pub use self::overview_service::OverviewService;
pub use self::records::{
    Booking, Counts, Identified, Listing, ListingRef, RecordId, Review, RoomType, User, UserRef,
};
pub use self::review_service::ReviewService;
pub use self::session_service::{
    LOGIN_FAILURE_MESSAGE, LOGOUT_FAILURE_MESSAGE, SessionService, SignedIn,
};
pub use self::staging::{
    AddOutcome, DEFAULT_MAX_IMAGES, ExistingImage, ImageStaging, MAX_STAGED_FILE_BYTES,
    StagedFile, StagedFileError,
};
pub use self::submission::{
    EXISTING_IMAGES_FIELD, FieldError, FormPart, IMAGES_FIELD, ListingDraft, ListingFields,
    ListingForm, ListingSubmission, SubmissionTarget, validation_error,
};
pub use self::trace_id::TraceId;
pub use self::user_service::UserService;
pub use self::views::{
    BookingRow, BookingStats, BookingsView, ListingStats, ListingsView, OverviewView, PageQuery,
    RECENT_LIMIT, ReviewStats, ReviewsView, RoleFilter, TypeFilter, UserDistribution, UserStats,
    UsersView, bookings_view, listings_view, overview, reviews_view, users_view,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use dashboard::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("admins only"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
