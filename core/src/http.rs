//! HTTP request and response types exchanged with a [`Transport`].
//!
//! # Design
//! `HttpRequest` describes one call as plain data: the facades build it, the
//! dispatcher decorates it with credentials and headers, and the transport
//! executes it. The payload is serialized when the request is built, so an
//! unencodable payload fails before any network activity.
//!
//! `HttpResponse` hands the body over as a reader instead of a buffer. The
//! dispatcher owns draining it, which keeps connection reuse independent of
//! which transport is plugged in.
//!
//! [`Transport`]: crate::transport::Transport

use std::fmt;
use std::io::{Cursor, Read};

use serde::Serialize;

use crate::error::{Error, Result};

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single call to the service described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Serialize `payload` as the JSON request body.
    pub fn json<T: Serialize + ?Sized>(mut self, payload: &T) -> Result<Self> {
        let body = serde_json::to_vec(payload).map_err(Error::Serialization)?;
        self.body = Some(body);
        Ok(self)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// First value of the header `name`, compared case-insensitively.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A response received from the service.
///
/// The body is an unread stream; whoever receives the response is expected
/// to consume it to the end.
pub struct HttpResponse {
    pub status: u16,
    pub body: Box<dyn Read>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Read + 'static) -> Self {
        Self {
            status,
            body: Box::new(body),
        }
    }

    /// Response backed by an in-memory body.
    pub fn from_bytes(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self::new(status, Cursor::new(body.into()))
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_serializes_payload_into_body() {
        let req = HttpRequest::new(HttpMethod::Post, "https://api.conekta.io/plans")
            .json(&serde_json::json!({ "name": "gold" }))
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["name"], "gold");
    }

    #[test]
    fn json_surfaces_serialization_failure() {
        use std::collections::HashMap;

        // JSON object keys must be strings.
        let mut payload = HashMap::new();
        payload.insert((1, 2), "tuple key");
        let err = HttpRequest::new(HttpMethod::Post, "https://api.conekta.io/plans")
            .json(&payload)
            .unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn new_request_has_no_body_or_headers() {
        let req = HttpRequest::new(HttpMethod::Delete, "https://api.conekta.io/plans/p1");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn header_lookup_ignores_case() {
        let req = HttpRequest::new(HttpMethod::Get, "https://api.conekta.io/")
            .header("Content-Type", "application/json");
        assert_eq!(req.header_value("content-type"), Some("application/json"));
        assert_eq!(req.header_value("accept"), None);
    }

    #[test]
    fn method_display_matches_wire_name() {
        assert_eq!(HttpMethod::Put.to_string(), "PUT");
        assert_eq!(HttpMethod::Delete.as_str(), "DELETE");
    }
}
