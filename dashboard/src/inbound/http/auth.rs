//! Session API handlers.
//!
//! ```text
//! POST /api/login {"email":"admin@studentstay.test","password":"secret1"}
//! POST /api/logout
//! GET /api/profile
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{HOME_PATH, LOGIN_PATH, MutationFailure, Notification, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionToken;
use crate::inbound::http::state::HttpState;

/// Login request body for `POST /api/login`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Outcome of a session change and where the browser should go next.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    #[schema(value_type = crate::inbound::http::schemas::NotificationSchema)]
    pub notification: Notification,
    /// Page to navigate to.
    #[schema(value_type = String, example = "/")]
    pub redirect: &'static str,
}

/// Exchange credentials for the backend token and store it in the `token`
/// cookie.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = SessionResponse, headers(("Set-Cookie" = String, description = "token cookie"))),
        (status = 400, description = "Invalid credentials or form input"),
        (status = 401, description = "Rejected by the backend"),
        (status = 503, description = "Backend unavailable")
    ),
    tags = ["session"],
    operation_id = "login",
    security([])
)]
#[post("/api/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, MutationFailure> {
    let signed_in = state
        .sessions
        .login(&payload.email, &payload.password)
        .await?;
    Ok(HttpResponse::Ok()
        .cookie(state.cookies.session_cookie(&signed_in.token))
        .json(SessionResponse {
            notification: signed_in.notification,
            redirect: HOME_PATH,
        }))
}

/// End the backend session and clear the `token` cookie.
#[utoipa::path(
    post,
    path = "/api/logout",
    responses(
        (status = 200, description = "Signed out", body = SessionResponse),
        (status = 401, description = "No token cookie"),
        (status = 503, description = "Backend unavailable")
    ),
    tags = ["session"],
    operation_id = "logout"
)]
#[post("/api/logout")]
pub async fn logout(
    state: web::Data<HttpState>,
    session: SessionToken,
) -> Result<HttpResponse, MutationFailure> {
    let notification = state.sessions.logout(session.token()).await?;
    Ok(HttpResponse::Ok()
        .cookie(state.cookies.removal_cookie())
        .json(SessionResponse {
            notification,
            redirect: LOGIN_PATH,
        }))
}

/// Profile of the signed-in admin.
#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "Signed-in user"),
        (status = 401, description = "Not signed in", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["session"],
    operation_id = "profile"
)]
#[get("/api/profile")]
pub async fn profile(
    state: web::Data<HttpState>,
    session: SessionToken,
) -> ApiResult<web::Json<User>> {
    state.sessions.profile(session.token()).await.map(web::Json)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::{Acknowledgement, BackendError, MockAuthGateway};
    use crate::domain::test_support::user;
    use crate::domain::{AccessToken, LoginOutcome};
    use crate::inbound::http::session::TOKEN_COOKIE;
    use crate::inbound::http::state::HttpStatePorts;
    use crate::inbound::http::test_utils::{admin_cookie, state_with};
    use actix_web::cookie::time::Duration;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use rstest::rstest;
    use serde_json::Value;
    use std::sync::Arc;

    fn ports(gateway: MockAuthGateway) -> HttpStatePorts {
        HttpStatePorts {
            auth: Arc::new(gateway),
            ..HttpStatePorts::default()
        }
    }

    macro_rules! app {
        ($gateway:expr) => {
            test::init_service(
                App::new()
                    .app_data(state_with(ports($gateway)))
                    .service(login)
                    .service(logout)
                    .service(profile),
            )
            .await
        };
    }

    fn login_request(email: &str, password: &str) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/api/login")
            .set_json(LoginRequest {
                email: email.to_owned(),
                password: password.to_owned(),
            })
    }

    #[actix_web::test]
    async fn successful_login_sets_the_token_cookie() {
        let mut gateway = MockAuthGateway::new();
        gateway
            .expect_login()
            .withf(|credentials| credentials.email() == "admin@studentstay.test")
            .times(1)
            .returning(|_| {
                Ok(LoginOutcome {
                    token: AccessToken::new("a.b.c").expect("token"),
                    message: "Welcome back".to_owned(),
                })
            });
        let app = app!(gateway);

        let res = test::call_service(
            &app,
            login_request("admin@studentstay.test", "secret1").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let cookie = res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == TOKEN_COOKIE)
            .expect("token cookie set");
        assert_eq!(cookie.value(), "a.b.c");
        assert_eq!(cookie.http_only(), Some(true));
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["notification"]["message"], "Welcome back");
        assert_eq!(body["redirect"], "/");
    }

    #[rstest]
    #[case("not-an-email", "secret1", "email")]
    #[case("admin@studentstay.test", "short", "password")]
    #[actix_web::test]
    async fn invalid_form_is_rejected_before_the_backend(
        #[case] email: &str,
        #[case] password: &str,
        #[case] field: &str,
    ) {
        let app = app!(MockAuthGateway::new());
        let res = test::call_service(&app, login_request(email, password).to_request()).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["notification"]["level"], "error");
        assert_eq!(body["error"]["details"]["fields"][0]["field"], field);
    }

    #[rstest]
    #[case(BackendError::rejected("Invalid password"), "Invalid password")]
    #[case(BackendError::transport("connection refused"), "Login failed")]
    #[actix_web::test]
    async fn backend_failure_shows_server_message_or_fallback(
        #[case] error: BackendError,
        #[case] message: &str,
    ) {
        let mut gateway = MockAuthGateway::new();
        gateway
            .expect_login()
            .times(1)
            .return_once(move |_| Err(error));
        let app = app!(gateway);
        let res = test::call_service(
            &app,
            login_request("admin@studentstay.test", "secret1").to_request(),
        )
        .await;
        assert!(res.response().cookies().next().is_none());
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["notification"]["message"], message);
    }

    #[actix_web::test]
    async fn logout_clears_the_cookie() {
        let mut gateway = MockAuthGateway::new();
        gateway
            .expect_logout()
            .times(1)
            .returning(|_| Ok(Acknowledgement::new("Logged out")));
        let app = app!(gateway);
        let req = test::TestRequest::post()
            .uri("/api/logout")
            .cookie(admin_cookie())
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let cookie = res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == TOKEN_COOKIE)
            .expect("removal cookie");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["redirect"], "/login");
    }

    #[actix_web::test]
    async fn failed_logout_keeps_the_cookie() {
        let mut gateway = MockAuthGateway::new();
        gateway
            .expect_logout()
            .times(1)
            .returning(|_| Err(BackendError::timeout("10s")));
        let app = app!(gateway);
        let req = test::TestRequest::post()
            .uri("/api/logout")
            .cookie(admin_cookie())
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(res.response().cookies().next().is_none());
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["notification"]["message"], "Logout failed");
    }

    #[actix_web::test]
    async fn profile_is_fetched_once_per_session() {
        let mut gateway = MockAuthGateway::new();
        gateway
            .expect_profile()
            .times(1)
            .returning(|_| Ok(user(1, "ADMIN")));
        let app = app!(gateway);
        for _ in 0..2 {
            let req = test::TestRequest::get()
                .uri("/api/profile")
                .cookie(admin_cookie())
                .to_request();
            let body: Value = test::call_and_read_body_json(&app, req).await;
            assert_eq!(body["role"], "ADMIN");
        }
    }
}
