//! StudentStay admin dashboard library modules.
//!
//! The dashboard guards the admin pages with the backend-issued `token`
//! cookie, serves their view models, keeps listing dialogs (image staging
//! and multipart submission) server-side and forwards every mutation to the
//! StudentStay REST backend.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
/// Request tracing middleware.
pub use middleware::Trace;
