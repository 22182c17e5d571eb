//! Test helpers for inbound HTTP components.

use actix_web::cookie::Cookie;
use actix_web::web;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::json;

use super::session::{CookieSettings, TOKEN_COOKIE};
use super::state::{HttpState, HttpStateOptions, HttpStatePorts};

/// Unsigned token whose payload carries `role`.
pub fn token_for(role: &str) -> String {
    let payload = URL_SAFE_NO_PAD.encode(json!({ "id": 1, "role": role }).to_string());
    format!("eyJhbGciOiJIUzI1NiJ9.{payload}.sig")
}

/// `token` cookie for an admin session.
pub fn admin_cookie() -> Cookie<'static> {
    Cookie::new(TOKEN_COOKIE, token_for("ADMIN"))
}

/// Shared state over `ports` with insecure cookies for plain-HTTP tests.
pub fn state_with(ports: HttpStatePorts) -> web::Data<HttpState> {
    web::Data::new(HttpState::new(
        ports,
        HttpStateOptions {
            cookies: CookieSettings {
                secure: false,
                ..CookieSettings::default()
            },
            ..HttpStateOptions::default()
        },
    ))
}
