//! Route guard middleware for the dashboard pages.
//!
//! Runs [`evaluate`] on every request. Allowed requests reach the wrapped
//! service unchanged; redirects are answered directly with
//! `307 Temporary Redirect`, so the wrapped handler never runs.

use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::Error;
use actix_web::HttpResponse;
use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header;
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::debug;

use crate::domain::{GuardDecision, Navigation, TokenPolicy, evaluate, is_guarded};

use super::session::TOKEN_COOKIE;

/// Middleware factory applying the navigation guard.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use dashboard::domain::TokenPolicy;
/// use dashboard::inbound::http::guard::RouteGuard;
///
/// let app = App::new().wrap(RouteGuard::new(TokenPolicy::Unverified));
/// ```
#[derive(Clone, Debug)]
pub struct RouteGuard {
    policy: Arc<TokenPolicy>,
}

impl RouteGuard {
    pub fn new(policy: TokenPolicy) -> Self {
        Self {
            policy: Arc::new(policy),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RouteGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RouteGuardMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RouteGuardMiddleware {
            service,
            policy: Arc::clone(&self.policy),
        }))
    }
}

/// Service wrapper produced by [`RouteGuard`].
pub struct RouteGuardMiddleware<S> {
    service: S,
    policy: Arc<TokenPolicy>,
}

impl<S> RouteGuardMiddleware<S> {
    fn decide(&self, req: &ServiceRequest) -> GuardDecision {
        let path = req.path();
        if !is_guarded(path) {
            return GuardDecision::Allow;
        }
        let cookie = req.cookie(TOKEN_COOKIE);
        let token = cookie.as_ref().map(|c| c.value());
        let claims = token
            .filter(|raw| !raw.is_empty())
            .and_then(|raw| self.policy.claims(raw));
        evaluate(Navigation {
            path,
            token,
            claims: claims.as_ref(),
        })
    }
}

impl<S, B> Service<ServiceRequest> for RouteGuardMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match self.decide(&req) {
            GuardDecision::Allow => {
                if is_guarded(req.path()) {
                    debug!(path = req.path(), "guard allowed navigation");
                }
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            GuardDecision::Redirect(location) => {
                debug!(path = req.path(), location, "guard redirected navigation");
                let response = HttpResponse::TemporaryRedirect()
                    .insert_header((header::LOCATION, location))
                    .finish()
                    .map_into_right_body();
                Box::pin(ready(Ok(req.into_response(response))))
            }
        }
    }
}
