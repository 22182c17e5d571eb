//! Reqwest-backed StudentStay backend adapter.
//!
//! This adapter owns transport details only: URL building, the `token`
//! cookie, multipart encoding, timeout and HTTP error mapping, and envelope
//! decoding into domain records.

use std::time::{Duration, Instant};

use actix_web::cookie::Cookie;
use async_trait::async_trait;
use reqwest::header::{COOKIE, HeaderMap, SET_COOKIE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::json;

use super::dto::{Envelope, FailureBody, OneOrMany, decode_envelope};
use crate::domain::ports::{
    Acknowledgement, AuthGateway, BackendError, BookingRepository, CountsQuery, ListingRepository,
    ReviewRepository, UserRepository,
};
use crate::domain::{
    AccessToken, Booking, Counts, FormPart, Listing, ListingForm, LoginCredentials, LoginOutcome,
    ProfileUpdate, RecordId, Review, User,
};

const TOKEN_COOKIE: &str = "token";

/// Client for the StudentStay REST API rooted at one base URL.
#[derive(Clone)]
pub struct RestBackend {
    client: Client,
    base: Url,
}

impl RestBackend {
    /// Build an adapter using a reqwest client with an explicit request
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    /// Base URL every endpoint is resolved against.
    pub fn base(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| BackendError::transport(format!("{} cannot be a base URL", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(
        &self,
        method: Method,
        segments: &[&str],
        token: Option<&AccessToken>,
    ) -> Result<RequestBuilder, BackendError> {
        let builder = self
            .client
            .request(method, self.endpoint(segments)?)
            .header(reqwest::header::ACCEPT, "application/json");
        Ok(match token {
            Some(token) => builder.header(COOKIE, format!("{TOKEN_COOKIE}={}", token.expose())),
            None => builder,
        })
    }

    /// Send a request and return the headers and body of a 2xx response.
    async fn send(&self, request: RequestBuilder) -> Result<(HeaderMap, Vec<u8>), BackendError> {
        let started = Instant::now();
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let headers = response.headers().clone();
        tracing::debug!(
            path = response.url().path(),
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis(),
            "backend call completed"
        );
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok((headers, body.to_vec()))
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        token: &AccessToken,
    ) -> Result<T, BackendError> {
        let request = self.request(Method::GET, segments, Some(token))?;
        let (_, body) = self.send(request).await?;
        decode_envelope::<T>(&body)?.into_data()
    }

    async fn acknowledge(&self, request: RequestBuilder) -> Result<Acknowledgement, BackendError> {
        let (_, body) = self.send(request).await?;
        Ok(decode_envelope::<serde_json::Value>(&body)?.into_acknowledgement())
    }

    async fn delete_record(
        &self,
        resource: &str,
        id: RecordId,
        token: &AccessToken,
    ) -> Result<Acknowledgement, BackendError> {
        let id = id.to_string();
        let request = self.request(Method::DELETE, &[resource, "delete", &id], Some(token))?;
        self.acknowledge(request).await
    }
}

fn multipart_form(form: &ListingForm) -> Result<Form, BackendError> {
    let mut multipart = Form::new();
    for part in form.parts() {
        multipart = match part {
            FormPart::Text { name, value } => multipart.text(name.clone(), value.clone()),
            FormPart::File { name, file } => {
                let file_part = Part::bytes(file.bytes().to_vec())
                    .file_name(file.file_name().to_owned())
                    .mime_str(file.content_type())
                    .map_err(|error| {
                        BackendError::transport(format!(
                            "invalid content type {}: {error}",
                            file.content_type()
                        ))
                    })?;
                multipart.part(name.clone(), file_part)
            }
        };
    }
    Ok(multipart)
}

/// Token set by the backend's `Set-Cookie` header, if any.
fn token_from_set_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|raw| Cookie::parse(raw).ok())
        .filter(|cookie| cookie.name() == TOKEN_COOKIE)
        .map(|cookie| unquote(cookie.value()).to_owned())
        .find(|value| !value.is_empty())
}

/// Cookie values may be wrapped in double quotes.
fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(value)
}

fn map_transport_error(error: reqwest::Error) -> BackendError {
    if error.is_timeout() {
        BackendError::timeout(error.to_string())
    } else {
        BackendError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> BackendError {
    let server_message = serde_json::from_slice::<FailureBody>(body)
        .ok()
        .and_then(|failure| failure.message)
        .unwrap_or_default();
    if server_message.is_empty() {
        tracing::warn!(
            status = status.as_u16(),
            body = %body_preview(body),
            "backend error response without message"
        );
    }
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            BackendError::timeout(format!("status {}", status.as_u16()))
        }
        _ => BackendError::status(status.as_u16(), server_message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[async_trait]
impl ListingRepository for RestBackend {
    async fn list(&self, token: &AccessToken) -> Result<Vec<Listing>, BackendError> {
        self.fetch(&["rooms"], token).await
    }

    async fn create(
        &self,
        token: &AccessToken,
        form: &ListingForm,
    ) -> Result<Acknowledgement, BackendError> {
        let request = self
            .request(Method::POST, &["rooms", "create"], Some(token))?
            .multipart(multipart_form(form)?);
        self.acknowledge(request).await
    }

    async fn update(
        &self,
        token: &AccessToken,
        id: RecordId,
        form: &ListingForm,
    ) -> Result<Acknowledgement, BackendError> {
        let id = id.to_string();
        let request = self
            .request(Method::PATCH, &["rooms", "update", &id], Some(token))?
            .multipart(multipart_form(form)?);
        self.acknowledge(request).await
    }

    async fn delete(
        &self,
        token: &AccessToken,
        id: RecordId,
    ) -> Result<Acknowledgement, BackendError> {
        self.delete_record("rooms", id, token).await
    }
}

#[async_trait]
impl BookingRepository for RestBackend {
    async fn list(&self, token: &AccessToken) -> Result<Vec<Booking>, BackendError> {
        self.fetch(&["bookings"], token).await
    }

    async fn delete(
        &self,
        token: &AccessToken,
        id: RecordId,
    ) -> Result<Acknowledgement, BackendError> {
        self.delete_record("bookings", id, token).await
    }
}

#[async_trait]
impl ReviewRepository for RestBackend {
    async fn list(&self, token: &AccessToken) -> Result<Vec<Review>, BackendError> {
        self.fetch(&["reviews"], token).await
    }

    async fn delete(
        &self,
        token: &AccessToken,
        id: RecordId,
    ) -> Result<Acknowledgement, BackendError> {
        self.delete_record("reviews", id, token).await
    }
}

#[async_trait]
impl UserRepository for RestBackend {
    async fn list(&self, token: &AccessToken) -> Result<Vec<User>, BackendError> {
        self.fetch(&["auth", "admin"], token).await
    }

    async fn update(
        &self,
        token: &AccessToken,
        id: RecordId,
        profile: &ProfileUpdate,
    ) -> Result<Acknowledgement, BackendError> {
        let id = id.to_string();
        let request = self
            .request(Method::PATCH, &["auth", "admin", "update", &id], Some(token))?
            .json(profile);
        self.acknowledge(request).await
    }
}

#[async_trait]
impl CountsQuery for RestBackend {
    async fn counts(&self, token: &AccessToken) -> Result<Counts, BackendError> {
        self.fetch(&["counts"], token).await
    }
}

#[async_trait]
impl AuthGateway for RestBackend {
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginOutcome, BackendError> {
        let request = self.request(Method::POST, &["auth", "login"], None)?.json(&json!({
            "email": credentials.email(),
            "password": credentials.password(),
        }));
        let (headers, body) = self.send(request).await?;
        let envelope: Envelope<serde_json::Value> = decode_envelope(&body)?;
        let token = envelope
            .token
            .clone()
            .or_else(|| token_from_set_cookie(&headers))
            .and_then(AccessToken::new)
            .ok_or_else(|| BackendError::decode("login response carried no token"))?;
        Ok(LoginOutcome {
            token,
            message: envelope.message.unwrap_or_default(),
        })
    }

    async fn logout(&self, token: &AccessToken) -> Result<Acknowledgement, BackendError> {
        let request = self.request(Method::POST, &["auth", "logout"], Some(token))?;
        self.acknowledge(request).await
    }

    async fn profile(&self, token: &AccessToken) -> Result<User, BackendError> {
        self.fetch::<OneOrMany<User>>(&["auth", "get-user"], token)
            .await?
            .into_first()
            .ok_or_else(|| BackendError::decode("profile response was empty"))
    }
}
