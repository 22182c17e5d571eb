//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every page and API handler of the inbound HTTP layer,
//! the schema wrappers from `inbound::http::schemas`, and the `token` cookie
//! security scheme. Swagger UI serves it in debug builds and
//! `cargo run --bin openapi-dump` prints it.

use crate::inbound::http::auth::{LoginRequest, SessionResponse};
use crate::inbound::http::drafts::{OpenDraftRequest, UploadRequest, UploadedFile};
use crate::inbound::http::pages::LoginPage;
use crate::inbound::http::schemas::{
    ErrorCodeSchema, ErrorSchema, ListingFieldsSchema, NotificationSchema, ProfileFormSchema,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the `token` cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "TokenCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "token",
                "Backend-issued token stored by POST /api/login.",
            ))),
        );
    }
}

/// OpenAPI document for the dashboard service.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "StudentStay admin dashboard",
        description = "Guarded dashboard pages, listing dialogs and admin actions over the StudentStay REST backend."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("TokenCookie" = [])),
    paths(
        crate::inbound::http::pages::login_page,
        crate::inbound::http::pages::overview_page,
        crate::inbound::http::pages::listings_page,
        crate::inbound::http::pages::bookings_page,
        crate::inbound::http::pages::users_page,
        crate::inbound::http::pages::reviews_page,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::profile,
        crate::inbound::http::resources::update_user,
        crate::inbound::http::resources::delete_listing,
        crate::inbound::http::resources::delete_booking,
        crate::inbound::http::resources::delete_review,
        crate::inbound::http::drafts::open_draft,
        crate::inbound::http::drafts::get_draft,
        crate::inbound::http::drafts::update_draft,
        crate::inbound::http::drafts::discard_draft,
        crate::inbound::http::drafts::stage_images,
        crate::inbound::http::drafts::remove_existing_image,
        crate::inbound::http::drafts::remove_staged_image,
        crate::inbound::http::drafts::submit_draft,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        NotificationSchema,
        ListingFieldsSchema,
        ProfileFormSchema,
        LoginPage,
        LoginRequest,
        SessionResponse,
        OpenDraftRequest,
        UploadRequest,
        UploadedFile,
    )),
    tags(
        (name = "pages", description = "Guarded dashboard pages"),
        (name = "session", description = "Admin sign-in and sign-out"),
        (name = "listings", description = "Listing dialogs and deletion"),
        (name = "bookings", description = "Booking administration"),
        (name = "reviews", description = "Review moderation"),
        (name = "users", description = "User administration"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
