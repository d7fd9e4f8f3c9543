//! Blocking client for the Conekta payments API.
//!
//! # Overview
//! Orders, customers, plans and subscriptions are exposed as typed method
//! calls on resource facades borrowed from a [`Client`]:
//!
//! ```no_run
//! use conekta::{Client, Plan};
//!
//! let client = Client::new("key_eYvWV7gSDkNYXsmr", None)?;
//! let mut plan = Plan {
//!     name: Some("gold".to_string()),
//!     amount: Some(5000),
//!     currency: Some("MXN".to_string()),
//!     interval: Some("month".to_string()),
//!     ..Plan::default()
//! };
//! client.plans().create(&mut plan)?;
//! # Ok::<(), conekta::Error>(())
//! ```
//!
//! # Design
//! - Every facade method builds one [`HttpRequest`] and hands it to
//!   [`Client::execute`], the single dispatch routine. It attaches
//!   credentials and versioning headers, always drains the response body,
//!   and maps exactly 200 to success and anything else to an [`ApiError`].
//! - The network is reached through the [`Transport`] trait. The default
//!   [`UreqTransport`] wraps one pooled `ureq` agent shared by all clones of
//!   a client.
//! - Nothing is retried, cached or paginated.

pub mod client;
pub mod config;
pub mod customers;
pub mod error;
pub mod http;
pub mod orders;
pub mod plans;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

pub use client::Client;
pub use config::Options;
pub use customers::Customers;
pub use error::{ApiError, Error, ErrorDetail, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use orders::Orders;
pub use plans::Plans;
pub use transport::{Transport, TransportError, UreqTransport};
pub use types::{
    Address, Card, Charge, Customer, CustomerInfo, DiscountLine, LineItem, Metadata, Order, PaymentSource,
    PaymentSourceUpdate, Plan, PlanUpdate, Refund, ShippingContact, ShippingLine, Subscription, TaxLine,
};
