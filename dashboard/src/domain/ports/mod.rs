//! Domain ports for the StudentStay REST backend.
//!
//! One trait per backend resource. The outbound REST adapter implements all
//! of them; tests substitute mockall mocks or the fixtures below.

mod macros;
pub(crate) use macros::define_port_error;

mod auth_gateway;
mod backend_error;
mod booking_repository;
mod counts_query;
mod listing_repository;
mod review_repository;
mod user_repository;

#[cfg(test)]
pub use auth_gateway::MockAuthGateway;
pub use auth_gateway::{AuthGateway, FixtureAuthGateway};
pub use backend_error::{Acknowledgement, BackendError};
#[cfg(test)]
pub use booking_repository::MockBookingRepository;
pub use booking_repository::{BookingRepository, FixtureBookingRepository};
#[cfg(test)]
pub use counts_query::MockCountsQuery;
pub use counts_query::{CountsQuery, FixtureCountsQuery};
#[cfg(test)]
pub use listing_repository::MockListingRepository;
pub use listing_repository::{FixtureListingRepository, ListingRepository};
#[cfg(test)]
pub use review_repository::MockReviewRepository;
pub use review_repository::{FixtureReviewRepository, ReviewRepository};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{FixtureUserRepository, UserRepository};
