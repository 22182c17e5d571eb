//! Admin credentials, access tokens and profile edits.
//!
//! Constructors validate raw form input so handlers never pass unchecked
//! strings to a port. Failures are reported per field, matching how the
//! dashboard forms render them.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::{FieldError, Role};

/// Minimum password length accepted by the login form.
pub const PASSWORD_MIN: usize = 6;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
static PHONE_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

fn phone_regex() -> &'static Regex {
    PHONE_RE.get_or_init(|| {
        Regex::new(r"^\d{10}$")
            .unwrap_or_else(|error| panic!("phone regex failed to compile: {error}"))
    })
}

fn check_email(email: &str, errors: &mut Vec<FieldError>) {
    if email.is_empty() {
        errors.push(FieldError::new("email", "Email is required"));
    } else if !email_regex().is_match(email) {
        errors.push(FieldError::new("email", "Invalid email address"));
    }
}

/// Session token issued by the backend and carried in the `token` cookie.
///
/// The value is zeroised on drop and never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(Zeroizing<String>);

impl AccessToken {
    /// Wrap a raw token; returns `None` for an empty value.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            None
        } else {
            Some(Self(Zeroizing::new(raw)))
        }
    }

    /// Raw token text for forwarding to the backend.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Validated login form input.
///
/// # Examples
/// ```
/// use dashboard::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" admin@studentstay.test ", "hunter22").unwrap();
/// assert_eq!(creds.email(), "admin@studentstay.test");
/// assert!(LoginCredentials::try_from_parts("admin", "short").is_err());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Validate raw email and password inputs.
    ///
    /// # Errors
    /// One [`FieldError`] per failing field.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, Vec<FieldError>> {
        let email = email.trim();
        let mut errors = Vec::new();
        check_email(email, &mut errors);
        if password.is_empty() {
            errors.push(FieldError::new("password", "Password is required"));
        } else if password.chars().count() < PASSWORD_MIN {
            errors.push(FieldError::new(
                "password",
                format!("Password must be at least {PASSWORD_MIN} characters"),
            ));
        }
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Self {
            email: email.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password as typed.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Token to store in the `token` cookie.
    pub token: AccessToken,
    /// Backend message shown to the admin.
    pub message: String,
}

/// Raw profile fields as submitted by the user edit dialog.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub role: String,
}

/// Validated admin edit of another user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    name: String,
    email: String,
    phone: String,
    role: Role,
}

impl ProfileUpdate {
    /// Validate the edit dialog's fields.
    ///
    /// # Errors
    /// One [`FieldError`] per failing field.
    pub fn try_from_form(form: &ProfileForm) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();
        let name = form.name.trim();
        if name.is_empty() {
            errors.push(FieldError::new("name", "Name is required"));
        }
        let email = form.email.trim();
        check_email(email, &mut errors);
        let phone = form.phone.trim();
        if phone.is_empty() {
            errors.push(FieldError::new("phone", "Phone number is required"));
        } else if !phone_regex().is_match(phone) {
            errors.push(FieldError::new("phone", "Phone number must be 10 digits"));
        }
        let role = Role::parse(form.role.trim());
        if matches!(role, Role::Other(_)) {
            errors.push(FieldError::new(
                "role",
                "Role must be one of STUDENT, ALUMNI or ADMIN",
            ));
        }
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Self {
            name: name.to_owned(),
            email: email.to_owned(),
            phone: phone.to_owned(),
            role,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn role(&self) -> &Role {
        &self.role
    }
}
