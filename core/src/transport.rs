//! The network seam of the client.
//!
//! # Design
//! `Transport` executes one fully prepared [`HttpRequest`] and returns the
//! status plus an unread body. It adds nothing to the request: credentials,
//! versioning and content headers are the dispatcher's job. Implementations
//! must be shareable across threads since a single transport backs every
//! call made through a [`Client`](crate::Client) and its clones.

use ureq::config::AutoHeaderValue;
use ureq::{Agent, RequestBuilder};

use crate::config::Options;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Cause of a call that produced no response.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// Executes HTTP requests against the service.
pub trait Transport: Send + Sync {
    /// Send `request` and return the response with its body still unread.
    ///
    /// Any status code is a successful return; only failures to obtain a
    /// response are errors.
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Pooled blocking transport backed by a single [`ureq::Agent`].
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new(options: &Options) -> Self {
        let mut config = Agent::config_builder()
            // Status interpretation belongs to the dispatcher.
            .http_status_as_error(false)
            .timeout_global(options.timeout())
            .timeout_connect(options.timeout())
            .user_agent(AutoHeaderValue::None);
        if let Some(limit) = options.connection_limit() {
            config = config.max_idle_connections(limit).max_idle_connections_per_host(limit);
        }
        if let Some(age) = options.keep_alive() {
            config = config.max_idle_age(age);
        }
        Self {
            agent: config.build().new_agent(),
        }
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.as_str();
        let headers = request.headers.as_slice();

        let response = match (request.method, request.body.as_deref()) {
            (HttpMethod::Get, _) => with_headers(self.agent.get(url), headers).call(),
            (HttpMethod::Delete, _) => with_headers(self.agent.delete(url), headers).call(),
            (HttpMethod::Post, Some(body)) => with_headers(self.agent.post(url), headers).send(body),
            (HttpMethod::Post, None) => with_headers(self.agent.post(url), headers).send_empty(),
            (HttpMethod::Put, Some(body)) => with_headers(self.agent.put(url), headers).send(body),
            (HttpMethod::Put, None) => with_headers(self.agent.put(url), headers).send_empty(),
        }?;

        let status = response.status().as_u16();
        let body = response.into_body().into_reader();
        Ok(HttpResponse::new(status, body))
    }
}

fn with_headers<B>(builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    headers
        .iter()
        .fold(builder, |builder, (name, value)| builder.header(name.as_str(), value.as_str()))
}
