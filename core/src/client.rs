//! Client handle and the request dispatcher every resource call goes through.
//!
//! # Design
//! `Client` resolves its configuration once at construction: the versioned
//! `Accept` value, the Basic credential and the optional user agent are
//! precomputed, and one pooled [`Transport`] is shared by all clones.
//!
//! [`Client::execute`] is the single dispatch routine. It decorates the
//! request, sends it, always consumes the response body so the connection
//! can go back to the pool, and classifies the outcome: exactly 200 is
//! success, every other status becomes an [`ApiError`]. The facades only
//! pick a path, a method and a payload and then decode through
//! [`Client::send`] and friends.

use std::fmt;
use std::io::{self, Read};
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::Options;
use crate::customers::Customers;
use crate::error::{ApiError, Error, Result};
use crate::http::HttpRequest;
use crate::orders::Orders;
use crate::plans::Plans;
use crate::transport::{Transport, UreqTransport};

/// The only status the service uses for success.
const SUCCESS_STATUS: u16 = 200;

/// Handle to the service. Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    base_url: String,
    accept: String,
    authorization: String,
    user_agent: Option<String>,
}

impl Client {
    /// Build a client for `api_key`, with default options when `options` is `None`.
    ///
    /// Fails with [`Error::InvalidCredential`] when the key is empty.
    pub fn new(api_key: &str, options: Option<Options>) -> Result<Self> {
        let options = options.unwrap_or_default();
        let transport = Arc::new(UreqTransport::new(&options));
        Self::with_transport(api_key, Some(options), transport)
    }

    /// Build a client that sends its requests through `transport`.
    pub fn with_transport(
        api_key: &str,
        options: Option<Options>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::InvalidCredential);
        }
        let options = options.unwrap_or_default();
        let credential = STANDARD.encode(format!("{api_key}:"));
        Ok(Self {
            transport,
            base_url: options.base_url.trim_end_matches('/').to_string(),
            accept: format!("application/vnd.conekta-{}+json", options.api_version),
            authorization: format!("Basic {credential}"),
            user_agent: Some(options.user_agent).filter(|agent| !agent.is_empty()),
        })
    }

    pub fn orders(&self) -> Orders<'_> {
        Orders::new(self)
    }

    pub fn customers(&self) -> Customers<'_> {
        Customers::new(self)
    }

    pub fn plans(&self) -> Plans<'_> {
        Plans::new(self)
    }

    /// Dispatch `request` and return the raw body of a 200 response.
    ///
    /// Any other status yields [`Error::Api`] with the decoded envelope, or an
    /// empty envelope carrying just the status when the body is not one.
    pub fn execute(&self, request: HttpRequest) -> Result<Vec<u8>> {
        let request = self.prepare(request);
        debug!(method = %request.method, url = %request.url, "dispatching request");

        let mut response = self.transport.send(&request).map_err(Error::Transport)?;
        let body = consume(&mut response.body).map_err(|err| Error::Transport(Box::new(err)))?;

        if response.status == SUCCESS_STATUS {
            debug!(status = response.status, bytes = body.len(), "request succeeded");
            return Ok(body);
        }

        let mut error: ApiError = serde_json::from_slice(&body).unwrap_or_default();
        error.status = response.status;
        debug!(
            status = response.status,
            error_type = %error.error_type,
            log_id = %error.log_id,
            "service returned an error"
        );
        Err(Error::Api(error))
    }

    /// Dispatch `request` and decode the 200 body as `T`.
    pub fn send<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T> {
        let body = self.execute(request)?;
        serde_json::from_slice(&body).map_err(Error::Deserialization)
    }

    /// Dispatch `request` for its side effect only.
    pub(crate) fn send_unit(&self, request: HttpRequest) -> Result<()> {
        self.execute(request).map(drop)
    }

    /// Dispatch a sub-resource creation and return the id the service assigned.
    pub(crate) fn send_for_id(&self, request: HttpRequest) -> Result<String> {
        let info: Map<String, Value> = self.send(request)?;
        match info.get("id") {
            Some(Value::String(id)) => Ok(id.clone()),
            _ => Err(Error::MissingId),
        }
    }

    /// Absolute URL of the resource path made of `segments`. Empty segments
    /// are skipped.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> String {
        segments
            .iter()
            .filter(|segment| !segment.is_empty())
            .fold(self.base_url.clone(), |mut url, segment| {
                url.push('/');
                url.push_str(segment);
                url
            })
    }

    fn prepare(&self, request: HttpRequest) -> HttpRequest {
        let request = request
            .header("Accept", self.accept.as_str())
            .header("Content-Type", "application/json")
            .header("Authorization", self.authorization.as_str());
        match &self.user_agent {
            Some(agent) => request.header("User-Agent", agent.as_str()),
            None => request,
        }
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("accept", &self.accept)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

/// Read `body` to the end. Whatever the outcome of the read, drain what is
/// left so the connection is reusable.
fn consume(body: &mut dyn Read) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let read = body.read_to_end(&mut buf);
    if read.is_err() {
        let _ = io::copy(body, &mut io::sink());
    }
    read.map(|_| buf)
}
