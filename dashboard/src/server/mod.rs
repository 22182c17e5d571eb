//! Server construction and middleware wiring.

mod config;
mod settings;

pub use config::ServerConfig;
pub use settings::DashboardSettings;

use actix_web::body::{BoxBody, EitherBody};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use dashboard::Trace;
#[cfg(debug_assertions)]
use dashboard::doc::ApiDoc;
use dashboard::domain::{Error, TokenPolicy};
use dashboard::inbound::http::auth::{login, logout, profile};
use dashboard::inbound::http::drafts::{
    discard_draft, get_draft, open_draft, remove_existing_image, remove_staged_image,
    stage_images, submit_draft, update_draft, upload_json_limit,
};
use dashboard::inbound::http::guard::RouteGuard;
use dashboard::inbound::http::health::{HealthState, live, ready};
use dashboard::inbound::http::pages::{
    bookings_page, listings_page, login_page, overview_page, reviews_page, users_page,
};
use dashboard::inbound::http::resources::{
    delete_booking, delete_listing, delete_review, update_user,
};
use dashboard::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    token_policy: TokenPolicy,
    json_limit: usize,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<EitherBody<BoxBody>>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        token_policy,
        json_limit,
    } = deps;

    let json = web::JsonConfig::default()
        .limit(json_limit)
        .error_handler(|err, _req| Error::invalid_request(err.to_string()).into());

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json)
        .wrap(RouteGuard::new(token_policy))
        .wrap(Trace)
        .service(login_page)
        .service(overview_page)
        .service(listings_page)
        .service(bookings_page)
        .service(users_page)
        .service(reviews_page)
        .service(login)
        .service(logout)
        .service(profile)
        .service(update_user)
        .service(delete_listing)
        .service(delete_booking)
        .service(delete_review)
        .service(open_draft)
        .service(get_draft)
        .service(update_draft)
        .service(discard_draft)
        .service(stage_images)
        .service(remove_existing_image)
        .service(remove_staged_image)
        .service(submit_draft)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let ServerConfig {
        bind_addr,
        ports,
        options,
        token_policy,
    } = config;
    let json_limit = upload_json_limit(options.max_images);
    let http_state = web::Data::new(HttpState::new(ports, options));

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            token_policy: token_policy.clone(),
            json_limit,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    //! Wiring checks over the assembled application.
    use super::*;
    use actix_web::http::{StatusCode, header};
    use actix_web::test;
    use dashboard::inbound::http::state::{HttpStateOptions, HttpStatePorts};

    fn deps() -> AppDependencies {
        AppDependencies {
            health_state: web::Data::new(HealthState::new()),
            http_state: web::Data::new(HttpState::new(
                HttpStatePorts::default(),
                HttpStateOptions::default(),
            )),
            token_policy: TokenPolicy::Unverified,
            json_limit: upload_json_limit(4),
        }
    }

    #[actix_web::test]
    async fn guarded_page_redirects_anonymous_visitors() {
        let app = test::init_service(build_app(deps())).await;
        let req = test::TestRequest::get().uri("/listings").to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            res.headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok()),
            Some("/login")
        );
        assert!(res.headers().contains_key("trace-id"));
    }

    #[actix_web::test]
    async fn health_probe_is_not_guarded() {
        let app = test::init_service(build_app(deps())).await;
        let req = test::TestRequest::get().uri("/health/live").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn malformed_json_uses_the_error_envelope() {
        let app = test::init_service(build_app(deps())).await;
        let req = test::TestRequest::post()
            .uri("/api/login")
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload("{not json")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["code"], "invalid_request");
    }
}
