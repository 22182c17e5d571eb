//! The `token` cookie shared with the StudentStay backend.
//!
//! Handlers take a [`SessionToken`] to obtain the admin's [`AccessToken`];
//! login and logout use [`CookieSettings`] to set and clear the cookie.

use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::{Ready, ready};

use crate::domain::{AccessToken, Error};

/// Name of the cookie carrying the backend-issued token.
pub const TOKEN_COOKIE: &str = "token";

/// Attributes of the `token` cookie.
#[derive(Debug, Clone, Copy)]
pub struct CookieSettings {
    pub secure: bool,
    pub same_site: SameSite,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            secure: true,
            same_site: SameSite::Lax,
        }
    }
}

impl CookieSettings {
    /// Cookie storing a freshly issued token.
    pub fn session_cookie(&self, token: &AccessToken) -> Cookie<'static> {
        Cookie::build(TOKEN_COOKIE, token.expose().to_owned())
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
            .finish()
    }

    /// Expired cookie that makes the browser forget the token.
    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build(TOKEN_COOKIE, "")
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
            .max_age(Duration::ZERO)
            .finish()
    }
}

/// Raw `token` cookie value of a request, if any.
pub fn token_from_request(req: &HttpRequest) -> Option<AccessToken> {
    req.cookie(TOKEN_COOKIE)
        .and_then(|cookie| AccessToken::new(cookie.value()))
}

/// Extractor requiring a non-empty `token` cookie.
///
/// Rejects with `401 Unauthorized` otherwise. The guard middleware decides
/// whether the token belongs to an admin; the backend remains the authority
/// on every API call.
#[derive(Debug, Clone)]
pub struct SessionToken(pub AccessToken);

impl SessionToken {
    pub fn token(&self) -> &AccessToken {
        &self.0
    }
}

impl FromRequest for SessionToken {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            token_from_request(req)
                .map(SessionToken)
                .ok_or_else(|| Error::unauthorized("login required")),
        )
    }
}
