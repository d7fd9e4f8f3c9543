//! Connection tunables for a [`Client`](crate::Client).
//!
//! Every field has a default, both when `Options` is built with
//! [`Options::builder`] and fields are left unset, and when no options are
//! passed to [`Client::new`](crate::Client::new) at all.

use std::time::Duration;

use bon::Builder;

/// Production endpoint of the service.
pub const DEFAULT_BASE_URL: &str = "https://api.conekta.io/";

pub const DEFAULT_API_VERSION: &str = "v2.0.0";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_KEEP_ALIVE_SECS: u64 = 600;

pub const DEFAULT_MAX_CONNECTIONS: usize = 100;

/// Client configuration.
///
/// ```
/// use conekta::Options;
///
/// let options = Options::builder().timeout(10).user_agent("shop/1.2").build();
/// assert_eq!(options.timeout, 10);
/// assert_eq!(options.api_version, "v2.0.0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct Options {
    /// Time to wait for a request to complete, in seconds. Also bounds
    /// connection establishment. `0` means no deadline.
    #[builder(default = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// How long an idle pooled connection is kept open, in seconds.
    ///
    /// The HTTP stack exposes no TCP keep-alive probe interval, so this
    /// setting bounds the idle age of pooled connections instead of pacing
    /// probes. `0` keeps the transport's own idle age.
    #[builder(default = DEFAULT_KEEP_ALIVE_SECS)]
    pub keep_alive: u64,

    /// Maximum idle connections kept open with the service. `0` keeps the
    /// transport's own pool limits.
    #[builder(default = DEFAULT_MAX_CONNECTIONS)]
    pub max_connections: usize,

    /// API version requested through the `Accept` header.
    #[builder(into, default = DEFAULT_API_VERSION.to_string())]
    pub api_version: String,

    /// `User-Agent` reported to the service. Empty means the header is not sent.
    #[builder(into, default)]
    pub user_agent: String,

    /// Root URL every resource path is appended to.
    #[builder(into, default = DEFAULT_BASE_URL.to_string())]
    pub base_url: String,
}

impl Options {
    /// Request deadline, `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        non_zero_secs(self.timeout)
    }

    /// Idle age of pooled connections, `None` for the transport default.
    pub fn keep_alive(&self) -> Option<Duration> {
        non_zero_secs(self.keep_alive)
    }

    /// Idle pool size, `None` for the transport default.
    pub fn connection_limit(&self) -> Option<usize> {
        (self.max_connections > 0).then_some(self.max_connections)
    }
}

fn non_zero_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

impl Default for Options {
    fn default() -> Self {
        Options::builder().build()
    }
}
