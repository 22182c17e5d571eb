//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// No `token` cookie, or the backend refused it.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested record or draft does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The draft is already being submitted.
    #[schema(rename = "conflict")]
    Conflict,
    /// The REST backend could not be reached or timed out.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "validation failed")]
    message: String,
    /// Correlation identifier matching the `trace-id` header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Field errors as `{"fields":[{"field":..,"message":..}]}`.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::Notification`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Notification)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct NotificationSchema {
    /// `success` or `error`.
    #[schema(example = "success")]
    level: String,
    /// Message shown to the admin.
    #[schema(example = "Listing updated")]
    message: String,
}

/// OpenAPI schema for [`crate::domain::ListingFields`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ListingFields)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ListingFieldsSchema {
    #[schema(example = "Garden room")]
    title: String,
    #[schema(example = "Quiet room five minutes from campus")]
    description: String,
    /// Monthly price for one occupant.
    #[schema(example = 5200)]
    single_occupancy: f64,
    /// Monthly price per occupant when shared.
    #[schema(example = 3900)]
    double_occupancy: f64,
    /// `AC`, `NonAC` or `Both`.
    #[schema(rename = "type", example = "AC")]
    room_type: String,
}

/// OpenAPI schema for [`crate::domain::ProfileForm`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ProfileForm)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ProfileFormSchema {
    #[schema(example = "Ben Okafor")]
    name: String,
    #[schema(example = "ben@example.test")]
    email: String,
    /// Exactly ten digits.
    #[schema(example = "9876543210")]
    phone: String,
    /// `STUDENT`, `ALUMNI` or `ADMIN`.
    #[schema(example = "ALUMNI")]
    role: String,
}
