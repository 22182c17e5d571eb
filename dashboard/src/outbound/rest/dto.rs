//! Wire shapes of the backend's JSON responses.

use serde::Deserialize;

use crate::domain::ports::{Acknowledgement, BackendError};

/// Response envelope shared by every backend endpoint.
///
/// `success` defaults to `true` when absent; a few endpoints omit it.
#[derive(Debug, Deserialize)]
pub(super) struct Envelope<T> {
    #[serde(default = "default_success")]
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
    /// Present on `/auth/login`.
    pub token: Option<String>,
}

fn default_success() -> bool {
    true
}

/// Body of a failed response, read for its message only.
#[derive(Debug, Deserialize)]
pub(super) struct FailureBody {
    pub message: Option<String>,
}

/// `/auth/get-user` has been seen returning the user alone or wrapped in a
/// one-element array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_first(self) -> Option<T> {
        match self {
            Self::One(item) => Some(item),
            Self::Many(items) => items.into_iter().next(),
        }
    }
}

impl<T> Envelope<T> {
    /// Payload of a successful response.
    pub fn into_data(self) -> Result<T, BackendError> {
        self.data
            .ok_or_else(|| BackendError::decode("response envelope has no data"))
    }

    /// Server message of a successful mutation.
    pub fn into_acknowledgement(self) -> Acknowledgement {
        Acknowledgement::new(self.message.unwrap_or_default())
    }
}

/// Decode an envelope, turning `success: false` into a rejection.
pub(super) fn decode_envelope<T>(body: &[u8]) -> Result<Envelope<T>, BackendError>
where
    T: serde::de::DeserializeOwned,
{
    let envelope: Envelope<T> = serde_json::from_slice(body).map_err(|error| {
        BackendError::decode(format!("invalid backend JSON payload: {error}"))
    })?;
    if envelope.success {
        Ok(envelope)
    } else {
        Err(BackendError::rejected(envelope.message.unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{Counts, Listing};

    #[test]
    fn decodes_collection_payloads() {
        let body = br#"{"success":true,"message":"ok","error":false,"data":[
            {"id":3,"title":"Garden room","description":"Quiet","singleOccupancy":5200,
             "doubleOccupancy":3900,"type":"NonAC","images":[{"id":7,"url":"/u/7.jpg"}],
             "user":{"id":1,"name":"Asha","email":"asha@example.test","role":"ADMIN"}}
        ]}"#;
        let listings: Vec<Listing> = decode_envelope(body)
            .and_then(Envelope::into_data)
            .expect("listings decode");
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].images[0].id, Some(7));
    }

    #[test]
    fn success_false_is_a_rejection() {
        let error = decode_envelope::<Counts>(br#"{"success":false,"message":"Not allowed"}"#)
            .expect_err("rejected");
        assert_eq!(error, BackendError::rejected("Not allowed"));
    }

    #[test]
    fn missing_data_is_a_decode_error() {
        let error = decode_envelope::<Counts>(br#"{"success":true}"#)
            .and_then(Envelope::into_data)
            .expect_err("no data");
        assert!(matches!(error, BackendError::Decode { .. }));
    }

    #[test]
    fn invalid_json_is_a_decode_error() {
        let error = decode_envelope::<Counts>(b"<html>").expect_err("not json");
        assert!(matches!(error, BackendError::Decode { .. }));
    }

    #[test]
    fn acknowledgement_uses_server_message() {
        let envelope = decode_envelope::<serde_json::Value>(br#"{"message":"Room deleted"}"#)
            .expect("no success flag means success");
        assert_eq!(envelope.into_acknowledgement().message, "Room deleted");
    }

    #[test]
    fn profile_accepts_object_or_array() {
        let one: OneOrMany<u8> = serde_json::from_str("5").expect("one");
        let many: OneOrMany<u8> = serde_json::from_str("[6, 7]").expect("many");
        assert_eq!(one.into_first(), Some(5));
        assert_eq!(many.into_first(), Some(6));
    }
}
