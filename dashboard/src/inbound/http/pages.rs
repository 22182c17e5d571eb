//! Dashboard page handlers.
//!
//! ```text
//! GET /login
//! GET /            overview
//! GET /listings    ?search=&type=
//! GET /bookings    ?search=&type=&role=
//! GET /users       ?search=
//! GET /reviews     ?search=&rating=&role=
//! ```
//!
//! Every page is served behind the route guard and answers with the view
//! model the dashboard renders.

use actix_web::{get, web};
use serde::Serialize;

use crate::domain::{
    BookingsView, ListingsView, OverviewView, PASSWORD_MIN, PageQuery, ReviewsView, UsersView,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionToken;
use crate::inbound::http::state::HttpState;

/// What the login form needs to validate input before posting it.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginPage {
    /// Endpoint that accepts the credentials.
    #[schema(value_type = String, example = "/api/login")]
    pub action: &'static str,
    /// Minimum accepted password length.
    pub password_min: usize,
}

/// Login page.
#[utoipa::path(
    get,
    path = "/login",
    responses(
        (status = 200, description = "Login form", body = LoginPage),
        (status = 307, description = "Already signed in as an admin")
    ),
    tags = ["pages"],
    operation_id = "loginPage",
    security([])
)]
#[get("/login")]
pub async fn login_page() -> web::Json<LoginPage> {
    web::Json(LoginPage {
        action: "/api/login",
        password_min: PASSWORD_MIN,
    })
}

/// Dashboard home.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Totals, user distribution and recent activity"),
        (status = 307, description = "Not signed in as an admin"),
        (status = 503, description = "Backend unavailable", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["pages"],
    operation_id = "overviewPage"
)]
#[get("/")]
pub async fn overview_page(
    state: web::Data<HttpState>,
    session: SessionToken,
) -> ApiResult<web::Json<OverviewView>> {
    state.overview.overview(session.token()).await.map(web::Json)
}

/// Listings page.
#[utoipa::path(
    get,
    path = "/listings",
    params(
        ("search" = Option<String>, Query, description = "Matches title, description or owner name"),
        ("type" = Option<String>, Query, description = "`all`, `AC`, `NonAC` or `Both`")
    ),
    responses(
        (status = 200, description = "Listing stats and filtered listings"),
        (status = 307, description = "Not signed in as an admin")
    ),
    tags = ["pages"],
    operation_id = "listingsPage"
)]
#[get("/listings")]
pub async fn listings_page(
    state: web::Data<HttpState>,
    session: SessionToken,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<ListingsView>> {
    state
        .listings
        .view(session.token(), &query)
        .await
        .map(web::Json)
}

/// Bookings page.
#[utoipa::path(
    get,
    path = "/bookings",
    params(
        ("search" = Option<String>, Query, description = "Matches guest name or booking id"),
        ("type" = Option<String>, Query, description = "`all`, `AC`, `NonAC` or `Both`"),
        ("role" = Option<String>, Query, description = "`all-role` or a guest role")
    ),
    responses(
        (status = 200, description = "Booking stats and filtered bookings"),
        (status = 307, description = "Not signed in as an admin")
    ),
    tags = ["pages"],
    operation_id = "bookingsPage"
)]
#[get("/bookings")]
pub async fn bookings_page(
    state: web::Data<HttpState>,
    session: SessionToken,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<BookingsView>> {
    state
        .bookings
        .view(session.token(), &query)
        .await
        .map(web::Json)
}

/// Users page.
#[utoipa::path(
    get,
    path = "/users",
    params(("search" = Option<String>, Query, description = "Matches user name")),
    responses(
        (status = 200, description = "User stats and filtered users"),
        (status = 307, description = "Not signed in as an admin")
    ),
    tags = ["pages"],
    operation_id = "usersPage"
)]
#[get("/users")]
pub async fn users_page(
    state: web::Data<HttpState>,
    session: SessionToken,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<UsersView>> {
    state.users.view(session.token(), &query).await.map(web::Json)
}

/// Reviews page.
#[utoipa::path(
    get,
    path = "/reviews",
    params(
        ("search" = Option<String>, Query, description = "Matches content, reviewer or listing title"),
        ("rating" = Option<String>, Query, description = "`all` or a star rating from 1 to 5"),
        ("role" = Option<String>, Query, description = "`all-role` or a reviewer role")
    ),
    responses(
        (status = 200, description = "Rating breakdown and filtered reviews"),
        (status = 307, description = "Not signed in as an admin")
    ),
    tags = ["pages"],
    operation_id = "reviewsPage"
)]
#[get("/reviews")]
pub async fn reviews_page(
    state: web::Data<HttpState>,
    session: SessionToken,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<ReviewsView>> {
    state
        .reviews
        .view(session.token(), &query)
        .await
        .map(web::Json)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::Counts;
    use crate::domain::ports::{
        BackendError, MockBookingRepository, MockCountsQuery, MockListingRepository,
        MockUserRepository,
    };
    use crate::domain::test_support::{booking, listing, user};
    use crate::inbound::http::state::HttpStatePorts;
    use crate::inbound::http::test_utils::{admin_cookie, state_with};
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::Value;
    use std::sync::Arc;

    async fn get_json(ports: HttpStatePorts, uri: &str) -> (StatusCode, Value) {
        let app = test::init_service(
            App::new()
                .app_data(state_with(ports))
                .service(login_page)
                .service(overview_page)
                .service(listings_page)
                .service(bookings_page)
                .service(users_page)
                .service(reviews_page),
        )
        .await;
        let req = test::TestRequest::get()
            .uri(uri)
            .cookie(admin_cookie())
            .to_request();
        let res = test::call_service(&app, req).await;
        let status = res.status();
        let body = test::read_body(res).await;
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    #[actix_web::test]
    async fn listings_page_filters_by_query() {
        let mut repo = MockListingRepository::new();
        repo.expect_list()
            .times(1)
            .returning(|_| Ok(vec![listing(1, "Loft"), listing(2, "Garden room")]));
        let ports = HttpStatePorts {
            listings: Arc::new(repo),
            ..HttpStatePorts::default()
        };

        let (status, body) = get_json(ports, "/listings?search=garden&type=all").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stats"]["total"], 2);
        assert_eq!(body["listings"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["listings"][0]["title"], "Garden room");
    }

    #[actix_web::test]
    async fn overview_combines_counts_and_collections() {
        let mut counts = MockCountsQuery::new();
        counts.expect_counts().times(1).returning(|_| {
            Ok(Counts {
                booking: 1,
                users: 2,
                listings: 1,
                total_revenue: 1500.0,
            })
        });
        let mut users = MockUserRepository::new();
        users
            .expect_list()
            .returning(|_| Ok(vec![user(1, "STUDENT"), user(2, "ALUMNI")]));
        let mut bookings = MockBookingRepository::new();
        bookings.expect_list().returning(|_| Ok(vec![booking(5)]));
        let mut listings = MockListingRepository::new();
        listings
            .expect_list()
            .returning(|_| Ok(vec![listing(3, "Garden room")]));
        let ports = HttpStatePorts {
            listings: Arc::new(listings),
            bookings: Arc::new(bookings),
            users: Arc::new(users),
            counts: Arc::new(counts),
            ..HttpStatePorts::default()
        };

        let (status, body) = get_json(ports, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["distribution"]["studentPercentage"], 50.0);
        assert_eq!(body["recentBookings"][0]["id"], 5);
        assert_eq!(body["recentListings"][0]["id"], 3);
    }

    #[actix_web::test]
    async fn backend_outage_surfaces_as_service_unavailable() {
        let mut repo = MockListingRepository::new();
        repo.expect_list()
            .returning(|_| Err(BackendError::transport("connection refused")));
        let ports = HttpStatePorts {
            listings: Arc::new(repo),
            ..HttpStatePorts::default()
        };

        let (status, body) = get_json(ports, "/listings").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], "service_unavailable");
    }

    #[actix_web::test]
    async fn login_page_describes_the_form() {
        let (status, body) = get_json(HttpStatePorts::default(), "/login").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["passwordMin"], 6);
        assert_eq!(body["action"], "/api/login");
    }

    #[actix_web::test]
    async fn pages_require_a_token_cookie() {
        let app = test::init_service(
            App::new()
                .app_data(state_with(HttpStatePorts::default()))
                .service(users_page),
        )
        .await;
        let res = test::call_service(&app, test::TestRequest::get().uri("/users").to_request())
            .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
