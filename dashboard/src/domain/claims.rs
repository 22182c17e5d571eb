//! Session claims carried by the admin's `token` cookie.
//!
//! The REST backend issues a three-segment JWT at login. The dashboard only
//! needs the payload's `role` to decide whether a navigation may proceed, so
//! [`decode_claims`] reads the middle segment without touching the signature.
//!
//! Reading an unverified payload trusts whatever the browser sends: anyone can
//! mint a token whose payload says `ADMIN`. The backend still authorises every
//! data call, but the guarded pages themselves are only as strong as this
//! check. [`TokenPolicy::Hs256`] closes that gap when the deployment shares
//! the backend's signing secret.

use std::fmt;

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use zeroize::Zeroizing;

/// Base64url engine that accepts payloads with or without `=` padding.
const LENIENT_URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Role asserted by a token payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    /// Platform administrator; the only role admitted to the dashboard.
    Admin,
    /// Student account.
    Student,
    /// Alumni account.
    Alumni,
    /// Any other value, kept verbatim. A missing role decodes as `Other("")`.
    Other(String),
}

impl Default for Role {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl Role {
    /// Wire representation used by the backend.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "ADMIN",
            Self::Student => "STUDENT",
            Self::Alumni => "ALUMNI",
            Self::Other(raw) => raw.as_str(),
        }
    }

    /// Parse a wire role; unknown strings are preserved.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "ADMIN" => Self::Admin,
            "STUDENT" => Self::Student,
            "ALUMNI" => Self::Alumni,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Roles are compared as strings by the guard; a non-string role can
        // never be ADMIN, so it degrades to the empty role instead of failing
        // the whole payload.
        let value = Value::deserialize(deserializer)?;
        Ok(value.as_str().map_or_else(Self::default, Self::parse))
    }
}

/// Decoded token payload.
///
/// ## Invariants
/// - Only constructed from a JSON object payload.
/// - Claims other than `role`, `id`, `email` and `exp` are retained in
///   [`SessionClaims::extra`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    #[serde(default)]
    role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exp: Option<i64>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl SessionClaims {
    /// Build claims carrying only a role; used by tests and fixtures.
    pub fn with_role(role: Role) -> Self {
        Self {
            role,
            id: None,
            email: None,
            exp: None,
            extra: Map::new(),
        }
    }

    /// Role asserted by the payload.
    pub fn role(&self) -> &Role {
        &self.role
    }

    /// Whether the payload asserts the administrator role.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Subject id as issued by the backend (number or string).
    pub fn id(&self) -> Option<&Value> {
        self.id.as_ref()
    }

    /// Email claim, when present.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Expiry as a Unix timestamp, when present.
    pub fn expires_at(&self) -> Option<i64> {
        self.exp
    }

    /// Remaining claims.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}

/// Decode the payload of a three-segment token without verifying it.
///
/// Returns `None` when the token does not have exactly three segments, the
/// middle segment is not base64url, or the payload is not a JSON object.
///
/// # Examples
/// ```
/// use dashboard::domain::decode_claims;
///
/// // {"role":"ADMIN"}
/// let claims = decode_claims("h.eyJyb2xlIjoiQURNSU4ifQ.s").expect("claims");
/// assert!(claims.is_admin());
/// assert!(decode_claims("not-a-token").is_none());
/// ```
pub fn decode_claims(token: &str) -> Option<SessionClaims> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return None;
    };

    let bytes = LENIENT_URL_SAFE.decode(payload).ok()?;
    let value: Value = serde_json::from_slice(&bytes).ok()?;
    if !value.is_object() {
        return None;
    }
    serde_json::from_value(value).ok()
}

/// How the dashboard trusts the claims in a `token` cookie.
#[derive(Clone, Default)]
pub enum TokenPolicy {
    /// Read the payload without checking the signature (backend behaviour
    /// parity; see the module documentation for the risk).
    #[default]
    Unverified,
    /// Verify an HMAC-SHA256 signature with the shared secret first.
    Hs256 {
        /// Secret shared with the backend's token issuer.
        secret: Zeroizing<Vec<u8>>,
    },
}

impl fmt::Debug for TokenPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unverified => f.write_str("Unverified"),
            Self::Hs256 { .. } => f.write_str("Hs256 { secret: <redacted> }"),
        }
    }
}

impl TokenPolicy {
    /// Build an HS256 policy from a secret string.
    pub fn hs256(secret: &str) -> Self {
        Self::Hs256 {
            secret: Zeroizing::new(secret.as_bytes().to_vec()),
        }
    }

    /// Decode the token's claims according to this policy.
    ///
    /// Verification failures are treated exactly like malformed tokens.
    pub fn claims(&self, token: &str) -> Option<SessionClaims> {
        match self {
            Self::Unverified => decode_claims(token),
            Self::Hs256 { secret } => verify_hs256(token, secret),
        }
    }
}

fn verify_hs256(token: &str, secret: &[u8]) -> Option<SessionClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    // Backend tokens are not guaranteed to carry `exp`; check it only when
    // present.
    validation.required_spec_claims.clear();
    validation.validate_exp = true;
    match jsonwebtoken::decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret),
        &validation,
    ) {
        Ok(data) => Some(data.claims),
        Err(error) => {
            tracing::debug!(%error, "token failed signature verification");
            None
        }
    }
}
