//! Dashboard settings loaded via OrthoConfig.
//!
//! Every value may come from CLI flags, `DASHBOARD_*` environment variables
//! or a configuration file; unset values fall back to the defaults below.

use std::net::{AddrParseError, SocketAddr};
use std::time::Duration;

use dashboard::domain::{DEFAULT_MAX_DRAFTS, DEFAULT_MAX_IMAGES, TokenPolicy};
use ortho_config::OrthoConfig;
use reqwest::Url;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_API_URL: &str = "http://localhost:5000";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Settings that could not be turned into runtime values.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address {value:?}: {source}")]
    BindAddr {
        value: String,
        #[source]
        source: AddrParseError,
    },
    #[error("invalid backend API URL {value:?}: {message}")]
    ApiUrl { value: String, message: String },
}

/// Configuration for the dashboard server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DASHBOARD")]
pub struct DashboardSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// Base URL of the StudentStay REST backend.
    pub api_url: Option<String>,
    /// Timeout applied to every backend request, in seconds.
    pub request_timeout_secs: Option<u64>,
    /// HS256 secret; when set, token signatures are verified.
    pub token_secret: Option<String>,
    /// Mark the `token` cookie `Secure`; defaults to true.
    pub cookie_secure: Option<bool>,
    /// Image limit per listing.
    pub max_images: Option<usize>,
    /// Bound on concurrently open listing drafts.
    pub max_drafts: Option<usize>,
}

impl DashboardSettings {
    /// Parsed listen address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Parsed backend base URL.
    pub fn api_url(&self) -> Result<Url, SettingsError> {
        let value = self.api_url.as_deref().unwrap_or(DEFAULT_API_URL);
        Url::parse(value).map_err(|err| SettingsError::ApiUrl {
            value: value.to_owned(),
            message: err.to_string(),
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    /// Decode-only unless a non-empty secret is configured.
    pub fn token_policy(&self) -> TokenPolicy {
        match self.token_secret.as_deref() {
            Some(secret) if !secret.is_empty() => TokenPolicy::hs256(secret),
            _ => TokenPolicy::default(),
        }
    }

    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure.unwrap_or(true)
    }

    pub fn max_images(&self) -> usize {
        self.max_images.unwrap_or(DEFAULT_MAX_IMAGES)
    }

    pub fn max_drafts(&self) -> usize {
        self.max_drafts.unwrap_or(DEFAULT_MAX_DRAFTS)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 7] = [
        "DASHBOARD_BIND_ADDR",
        "DASHBOARD_API_URL",
        "DASHBOARD_REQUEST_TIMEOUT_SECS",
        "DASHBOARD_TOKEN_SECRET",
        "DASHBOARD_COOKIE_SECURE",
        "DASHBOARD_MAX_IMAGES",
        "DASHBOARD_MAX_DRAFTS",
    ];

    fn load_from_empty_args() -> DashboardSettings {
        DashboardSettings::load_from_iter([OsString::from("dashboard")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("bind addr"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("socket addr")
        );
        assert_eq!(
            settings.api_url().expect("url").as_str(),
            "http://localhost:5000/"
        );
        assert_eq!(settings.request_timeout(), Duration::from_secs(10));
        assert!(settings.cookie_secure());
        assert_eq!(settings.max_images(), 4);
        assert_eq!(settings.max_drafts(), DEFAULT_MAX_DRAFTS);
        assert!(matches!(settings.token_policy(), TokenPolicy::Unverified));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("DASHBOARD_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            ("DASHBOARD_API_URL", Some("https://api.example.test/api".to_owned())),
            ("DASHBOARD_REQUEST_TIMEOUT_SECS", Some("3".to_owned())),
            ("DASHBOARD_TOKEN_SECRET", Some("s3cret".to_owned())),
            ("DASHBOARD_COOKIE_SECURE", Some("false".to_owned())),
            ("DASHBOARD_MAX_IMAGES", Some("6".to_owned())),
            ("DASHBOARD_MAX_DRAFTS", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr().expect("bind addr").port(), 9000);
        assert_eq!(
            settings.api_url().expect("url").host_str(),
            Some("api.example.test")
        );
        assert_eq!(settings.request_timeout(), Duration::from_secs(3));
        assert!(!settings.cookie_secure());
        assert_eq!(settings.max_images(), 6);
        assert!(matches!(settings.token_policy(), TokenPolicy::Hs256 { .. }));
    }

    #[rstest]
    #[case(Some("not-an-address"), None)]
    #[case(None, Some("::not a url"))]
    fn malformed_values_are_reported(
        #[case] bind_addr: Option<&str>,
        #[case] api_url: Option<&str>,
    ) {
        let settings = DashboardSettings {
            bind_addr: bind_addr.map(str::to_owned),
            api_url: api_url.map(str::to_owned),
            request_timeout_secs: None,
            token_secret: None,
            cookie_secure: None,
            max_images: None,
            max_drafts: None,
        };
        let failed = settings.bind_addr().is_err() || settings.api_url().is_err();
        assert!(failed);
    }

    #[rstest]
    #[case(None, true)]
    #[case(Some(true), true)]
    #[case(Some(false), false)]
    fn cookie_is_secure_unless_disabled(#[case] configured: Option<bool>, #[case] expected: bool) {
        let settings = DashboardSettings {
            bind_addr: None,
            api_url: None,
            request_timeout_secs: None,
            token_secret: None,
            cookie_secure: configured,
            max_images: None,
            max_drafts: None,
        };
        assert_eq!(settings.cookie_secure(), expected);
    }
}
