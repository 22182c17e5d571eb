//! Failure and acknowledgement types shared by every REST backend port.

use serde::{Deserialize, Serialize};

use crate::domain::Error;

use super::define_port_error;

define_port_error! {
    /// Errors raised when talking to the StudentStay REST backend.
    pub enum BackendError {
        /// The request never produced an HTTP response.
        Transport { message: String } =>
            "backend transport failed: {message}",
        /// The backend did not answer within the configured timeout.
        Timeout { message: String } =>
            "backend request timed out: {message}",
        /// The backend answered with a non-success HTTP status.
        Status { status: u16, message: String } =>
            "backend returned status {status}: {message}",
        /// The response body did not match the expected envelope.
        Decode { message: String } =>
            "backend response could not be decoded: {message}",
        /// The backend answered `success: false`.
        Rejected { message: String } =>
            "backend rejected the request: {message}",
    }
}

impl BackendError {
    /// Message suitable for showing to the admin, when the backend supplied
    /// one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message } | Self::Status { message, .. } if !message.is_empty() => {
                Some(message.as_str())
            }
            _ => None,
        }
    }
}

impl From<BackendError> for Error {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Transport { message } | BackendError::Timeout { message } => {
                Self::service_unavailable(message)
            }
            BackendError::Status { status, message } => match status {
                400 | 422 => Self::invalid_request(message),
                401 => Self::unauthorized(message),
                403 => Self::forbidden(message),
                404 => Self::not_found(message),
                _ => Self::service_unavailable(format!("backend status {status}: {message}")),
            },
            BackendError::Decode { message } => Self::internal(message),
            BackendError::Rejected { message } => Self::invalid_request(message),
        }
    }
}

/// A successful mutation acknowledged by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Acknowledgement {
    /// Message to show the admin.
    pub message: String,
}

impl Acknowledgement {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
