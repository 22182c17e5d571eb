//! Record mutation handlers.
//!
//! ```text
//! PATCH  /api/users/{id}     {"name":"Ben","email":"ben@example.test","phone":"9876543210","role":"ALUMNI"}
//! DELETE /api/listings/{id}
//! DELETE /api/bookings/{id}
//! DELETE /api/reviews/{id}
//! ```
//!
//! Successful mutations answer with the server's message and the refetched
//! collection; failures answer with an error notification and leave every
//! cache untouched.

use actix_web::{delete, patch, web};

use crate::domain::{
    Booking, Listing, MutationFailure, MutationOutcome, ProfileForm, RecordId, Review, User,
};
use crate::inbound::http::session::SessionToken;
use crate::inbound::http::state::HttpState;

type MutationResult<T> = Result<web::Json<MutationOutcome<T>>, MutationFailure>;

/// Edit another user's profile.
#[utoipa::path(
    patch,
    path = "/api/users/{id}",
    params(("id" = u64, Path, description = "Backend user id")),
    request_body = crate::inbound::http::schemas::ProfileFormSchema,
    responses(
        (status = 200, description = "Updated; body carries the refetched users"),
        (status = 400, description = "Field validation failed or the backend refused"),
        (status = 401, description = "No token cookie"),
        (status = 503, description = "Backend unavailable")
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[patch("/api/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    session: SessionToken,
    id: web::Path<RecordId>,
    form: web::Json<ProfileForm>,
) -> MutationResult<User> {
    state
        .users
        .update(session.token(), id.into_inner(), &form)
        .await
        .map(web::Json)
}

/// Delete a listing.
#[utoipa::path(
    delete,
    path = "/api/listings/{id}",
    params(("id" = u64, Path, description = "Backend listing id")),
    responses(
        (status = 200, description = "Deleted; body carries the refetched listings"),
        (status = 400, description = "Refused by the backend"),
        (status = 503, description = "Backend unavailable")
    ),
    tags = ["listings"],
    operation_id = "deleteListing"
)]
#[delete("/api/listings/{id}")]
pub async fn delete_listing(
    state: web::Data<HttpState>,
    session: SessionToken,
    id: web::Path<RecordId>,
) -> MutationResult<Listing> {
    state
        .listings
        .delete(session.token(), id.into_inner())
        .await
        .map(web::Json)
}

/// Delete a booking.
#[utoipa::path(
    delete,
    path = "/api/bookings/{id}",
    params(("id" = u64, Path, description = "Backend booking id")),
    responses(
        (status = 200, description = "Deleted; body carries the refetched bookings"),
        (status = 400, description = "Refused by the backend"),
        (status = 503, description = "Backend unavailable")
    ),
    tags = ["bookings"],
    operation_id = "deleteBooking"
)]
#[delete("/api/bookings/{id}")]
pub async fn delete_booking(
    state: web::Data<HttpState>,
    session: SessionToken,
    id: web::Path<RecordId>,
) -> MutationResult<Booking> {
    state
        .bookings
        .delete(session.token(), id.into_inner())
        .await
        .map(web::Json)
}

/// Delete a review.
#[utoipa::path(
    delete,
    path = "/api/reviews/{id}",
    params(("id" = u64, Path, description = "Backend review id")),
    responses(
        (status = 200, description = "Deleted; body carries the refetched reviews"),
        (status = 400, description = "Refused by the backend"),
        (status = 503, description = "Backend unavailable")
    ),
    tags = ["reviews"],
    operation_id = "deleteReview"
)]
#[delete("/api/reviews/{id}")]
pub async fn delete_review(
    state: web::Data<HttpState>,
    session: SessionToken,
    id: web::Path<RecordId>,
) -> MutationResult<Review> {
    state
        .reviews
        .delete(session.token(), id.into_inner())
        .await
        .map(web::Json)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::{
        Acknowledgement, BackendError, MockBookingRepository, MockListingRepository,
        MockReviewRepository, MockUserRepository,
    };
    use crate::domain::test_support::{booking, user};
    use crate::inbound::http::state::HttpStatePorts;
    use crate::inbound::http::test_utils::{admin_cookie, state_with};
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::{Value, json};
    use std::sync::Arc;

    async fn send(ports: HttpStatePorts, req: test::TestRequest) -> (StatusCode, Value) {
        let app = test::init_service(
            App::new()
                .app_data(state_with(ports))
                .service(update_user)
                .service(delete_listing)
                .service(delete_booking)
                .service(delete_review),
        )
        .await;
        let res = test::call_service(&app, req.cookie(admin_cookie()).to_request()).await;
        let status = res.status();
        (status, test::read_body_json(res).await)
    }

    #[actix_web::test]
    async fn booking_delete_returns_refetched_rows() {
        let mut repo = MockBookingRepository::new();
        repo.expect_delete()
            .withf(|_, id| *id == 7)
            .times(1)
            .returning(|_, _| Ok(Acknowledgement::new("Booking deleted")));
        repo.expect_list()
            .times(1)
            .returning(|_| Ok(vec![booking(8)]));
        let ports = HttpStatePorts {
            bookings: Arc::new(repo),
            ..HttpStatePorts::default()
        };

        let (status, body) = send(ports, test::TestRequest::delete().uri("/api/bookings/7")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["notification"]["level"], "success");
        assert_eq!(body["notification"]["message"], "Booking deleted");
        assert_eq!(body["items"][0]["id"], 8);
    }

    #[actix_web::test]
    async fn rejected_listing_delete_reports_server_message() {
        let mut repo = MockListingRepository::new();
        repo.expect_delete()
            .times(1)
            .returning(|_, _| Err(BackendError::rejected("Listing has active bookings")));
        let ports = HttpStatePorts {
            listings: Arc::new(repo),
            ..HttpStatePorts::default()
        };

        let (status, body) = send(ports, test::TestRequest::delete().uri("/api/listings/3")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["notification"]["message"], "Listing has active bookings");
    }

    #[actix_web::test]
    async fn review_delete_without_refetch_omits_items() {
        let mut repo = MockReviewRepository::new();
        repo.expect_delete()
            .times(1)
            .returning(|_, _| Ok(Acknowledgement::new("Review deleted")));
        repo.expect_list()
            .times(1)
            .returning(|_| Err(BackendError::timeout("10s")));
        let ports = HttpStatePorts {
            reviews: Arc::new(repo),
            ..HttpStatePorts::default()
        };

        let (status, body) = send(ports, test::TestRequest::delete().uri("/api/reviews/2")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["notification"]["message"], "Review deleted");
        assert!(body.get("items").is_none());
    }

    #[actix_web::test]
    async fn user_update_validates_before_calling_the_backend() {
        let (status, body) = send(
            HttpStatePorts {
                users: Arc::new(MockUserRepository::new()),
                ..HttpStatePorts::default()
            },
            test::TestRequest::patch().uri("/api/users/2").set_json(json!({
                "name": "Ben",
                "email": "ben@example.test",
                "phone": "12345",
                "role": "STUDENT"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["details"]["fields"][0]["field"], "phone");
    }

    #[actix_web::test]
    async fn user_update_sends_the_profile() {
        let mut repo = MockUserRepository::new();
        repo.expect_update()
            .withf(|_, id, profile| *id == 2 && profile.phone() == "9876543210")
            .times(1)
            .returning(|_, _, _| Ok(Acknowledgement::new("User updated")));
        repo.expect_list()
            .times(1)
            .returning(|_| Ok(vec![user(2, "ALUMNI")]));
        let ports = HttpStatePorts {
            users: Arc::new(repo),
            ..HttpStatePorts::default()
        };

        let (status, body) = send(
            ports,
            test::TestRequest::patch().uri("/api/users/2").set_json(json!({
                "name": "Ben",
                "email": "ben@example.test",
                "phone": "9876543210",
                "role": "ALUMNI"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"][0]["role"], "ALUMNI");
    }
}
