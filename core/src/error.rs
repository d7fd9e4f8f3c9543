//! Error types for the Conekta client.
//!
//! # Design
//! A call ends in one of two failure families: the request never got an
//! answer (`Transport`), or the service answered with anything other than
//! 200 (`Api`). The remaining variants cover local encode/decode problems
//! and the one precondition checked at construction.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};

use crate::transport::TransportError;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by [`Client`](crate::Client) and the resource facades.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The client was constructed with an empty API key.
    #[error("API key is required")]
    InvalidCredential,

    /// No response was received: connection, DNS, TLS, timeout, or a failure
    /// while reading the response body.
    #[error("transport failure: {0}")]
    Transport(#[source] TransportError),

    /// The service answered with a status other than 200.
    #[error("service error: {0}")]
    Api(#[from] ApiError),

    /// The request payload could not be encoded as JSON.
    #[error("request serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// A 200 response body did not match the expected shape.
    #[error("response deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// A create call succeeded but the body carried no string `id`.
    #[error("response carried no resource id")]
    MissingId,
}

impl Error {
    /// The service's error envelope, if this is an application error.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            _ => None,
        }
    }
}

/// Error envelope the service returns with every non-200 response.
///
/// When the body cannot be decoded the envelope is left empty, but
/// `status` is always filled in from the HTTP response. Fields that are
/// missing or `null` decode as empty.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Error category, e.g. `parameter_validation_error`.
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(rename = "type", default)]
    pub error_type: String,

    /// Identifier of the request log on the service side, quote it to support.
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub log_id: String,

    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub details: Vec<ErrorDetail>,

    /// HTTP status the envelope arrived with.
    #[serde(skip)]
    pub status: u16,
}

impl ApiError {
    /// Detail records attached to the request parameter `param`.
    pub fn details_for<'a>(&'a self, param: &'a str) -> impl Iterator<Item = &'a ErrorDetail> {
        self.details.iter().filter(move |detail| detail.params == param)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.error_type.is_empty() {
            write!(f, "unexpected HTTP {} response", self.status)
        } else {
            f.write_str(&self.error_type)
        }
    }
}

impl std::error::Error for ApiError {}

/// One problem reported inside an [`ApiError`].
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Purchaser-facing message, localized by the service.
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub message: String,

    /// Developer-facing message, English only.
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub debug_message: String,

    /// Request parameter the problem relates to; useful to highlight form fields.
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub params: String,

    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_validation_envelope() {
        let raw = r#"{"type":"parameter_validation_error","log_id":"l1","details":[{"message":"m","debug_message":"d","params":"email","code":"invalid"}]}"#;
        let err: ApiError = serde_json::from_str(raw).unwrap();
        assert_eq!(err.error_type, "parameter_validation_error");
        assert_eq!(err.log_id, "l1");
        assert_eq!(err.details.len(), 1);
        assert_eq!(err.details[0].debug_message, "d");
        assert_eq!(err.details[0].code, "invalid");
    }

    #[test]
    fn missing_fields_decode_as_empty() {
        let err: ApiError = serde_json::from_str(r#"{"type":"authentication_error"}"#).unwrap();
        assert!(err.log_id.is_empty());
        assert!(err.details.is_empty());
    }

    #[test]
    fn null_fields_decode_as_empty_and_keep_the_rest() {
        let raw = r#"{"type":"parameter_validation_error","log_id":null,"details":[{"message":"m","debug_message":null,"params":"email","code":"invalid"}]}"#;
        let err: ApiError = serde_json::from_str(raw).unwrap();
        assert_eq!(err.error_type, "parameter_validation_error");
        assert!(err.log_id.is_empty());
        assert_eq!(err.details.len(), 1);
        assert!(err.details[0].debug_message.is_empty());
        assert_eq!(err.details_for("email").count(), 1);

        let raw = r#"{"type":"processing_error","log_id":"l2","details":[{"message":"declined","debug_message":"d","params":null,"code":"card_declined"}]}"#;
        let err: ApiError = serde_json::from_str(raw).unwrap();
        assert_eq!(err.log_id, "l2");
        assert_eq!(err.details[0].params, "");
        assert_eq!(err.details[0].code, "card_declined");

        let err: ApiError = serde_json::from_str(r#"{"type":null,"log_id":"l3","details":null}"#).unwrap();
        assert!(err.error_type.is_empty());
        assert_eq!(err.log_id, "l3");
        assert!(err.details.is_empty());
    }

    #[test]
    fn display_uses_error_type() {
        let err = ApiError {
            error_type: "processing_error".to_string(),
            ..ApiError::default()
        };
        assert_eq!(err.to_string(), "processing_error");
    }

    #[test]
    fn display_falls_back_to_status() {
        let err = ApiError {
            status: 502,
            ..ApiError::default()
        };
        assert_eq!(err.to_string(), "unexpected HTTP 502 response");
    }

    #[test]
    fn details_for_filters_by_param() {
        let err = ApiError {
            details: vec![
                ErrorDetail {
                    params: "email".to_string(),
                    code: "invalid".to_string(),
                    ..ErrorDetail::default()
                },
                ErrorDetail {
                    params: "phone".to_string(),
                    ..ErrorDetail::default()
                },
            ],
            ..ApiError::default()
        };
        let codes: Vec<_> = err.details_for("email").map(|d| d.code.as_str()).collect();
        assert_eq!(codes, vec!["invalid"]);
        assert_eq!(err.details_for("name").count(), 0);
    }

    #[test]
    fn api_error_accessor() {
        let err = Error::Api(ApiError::default());
        assert!(err.api_error().is_some());
        assert!(Error::InvalidCredential.api_error().is_none());
    }
}
