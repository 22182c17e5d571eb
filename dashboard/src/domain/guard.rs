//! Navigation guard for the dashboard pages.
//!
//! The guard is a pure decision over three inputs: whether the requested path
//! is the public login page, whether a `token` cookie was sent, and the claims
//! decoded from it. The inbound middleware turns the decision into either the
//! wrapped response or a redirect.

use super::SessionClaims;

/// Login page; the only guarded path reachable without a token.
pub const LOGIN_PATH: &str = "/login";

/// Dashboard home, where authenticated admins land.
pub const HOME_PATH: &str = "/";

/// Exact paths subject to the guard. Everything else is unguarded.
pub const GUARDED_PATHS: [&str; 6] = [
    LOGIN_PATH,
    HOME_PATH,
    "/bookings",
    "/listings",
    "/reviews",
    "/users",
];

/// Outcome of evaluating a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Let the request through.
    Allow,
    /// Send the browser elsewhere.
    Redirect(&'static str),
}

/// Inputs for a single guard evaluation.
#[derive(Debug, Clone, Copy)]
pub struct Navigation<'a> {
    /// Request path without query string.
    pub path: &'a str,
    /// Raw cookie value; an empty string counts as no token.
    pub token: Option<&'a str>,
    /// Claims decoded from `token`, `None` when absent or malformed.
    pub claims: Option<&'a SessionClaims>,
}

/// Whether the guard applies to `path`.
pub fn is_guarded(path: &str) -> bool {
    GUARDED_PATHS.contains(&path)
}

/// Decide whether a navigation may proceed.
///
/// | login page | token | claims | decision |
/// | --- | --- | --- | --- |
/// | yes | any | admin | redirect `/` |
/// | yes | any | other / none | allow |
/// | no | none | – | redirect `/login` |
/// | no | present | admin | allow |
/// | no | present | non-admin or malformed | redirect `/login` |
///
/// # Examples
/// ```
/// use dashboard::domain::{evaluate, GuardDecision, Navigation};
///
/// let decision = evaluate(Navigation { path: "/bookings", token: None, claims: None });
/// assert_eq!(decision, GuardDecision::Redirect("/login"));
/// ```
pub fn evaluate(navigation: Navigation<'_>) -> GuardDecision {
    let Navigation {
        path,
        token,
        claims,
    } = navigation;
    if !is_guarded(path) {
        return GuardDecision::Allow;
    }

    let is_public = path == LOGIN_PATH;
    let has_token = token.is_some_and(|raw| !raw.is_empty());
    let is_admin = claims.is_some_and(SessionClaims::is_admin);

    if is_public {
        // A non-admin token on the login page stays put: redirecting to the
        // login page again would loop.
        return if is_admin {
            GuardDecision::Redirect(HOME_PATH)
        } else {
            GuardDecision::Allow
        };
    }

    if has_token && is_admin {
        GuardDecision::Allow
    } else {
        GuardDecision::Redirect(LOGIN_PATH)
    }
}
