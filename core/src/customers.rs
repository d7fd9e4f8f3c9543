//! Customers with their payment sources, shipping contacts and subscription.

use serde::Serialize;

use crate::client::Client;
use crate::error::Result;
use crate::http::{HttpMethod, HttpRequest};
use crate::types::{Customer, PaymentSource, PaymentSourceUpdate, ShippingContact, Subscription};

const CUSTOMERS: &str = "customers";
const PAYMENT_SOURCES: &str = "payment_sources";
const SHIPPING_CONTACTS: &str = "shipping_contacts";
const SUBSCRIPTION: &str = "subscription";

/// Methods for the `customers` resource, obtained from [`Client::customers`].
#[derive(Debug, Clone, Copy)]
pub struct Customers<'a> {
    client: &'a Client,
}

#[derive(Serialize)]
struct CardSource<'s> {
    #[serde(rename = "type")]
    kind: &'static str,
    token_id: &'s str,
}

#[derive(Serialize)]
struct SubscriptionPlan<'s> {
    plan: &'s str,
    #[serde(skip_serializing_if = "Option::is_none")]
    card: Option<&'s str>,
}

#[derive(Serialize)]
struct SubscriptionRef<'s> {
    id: &'s str,
}

impl<'a> Customers<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Create `customer`, then replace it with the service's view of it.
    pub fn create(&self, customer: &mut Customer) -> Result<()> {
        let url = self.client.endpoint(&[CUSTOMERS]);
        let request = HttpRequest::new(HttpMethod::Post, url).json(&*customer)?;
        *customer = self.client.send(request)?;
        Ok(())
    }

    /// Update the customer addressed by `customer.id`, then replace it with
    /// the service's view of it.
    pub fn update(&self, customer: &mut Customer) -> Result<()> {
        let url = self.client.endpoint(&[CUSTOMERS, id_of(&customer.id)]);
        let request = HttpRequest::new(HttpMethod::Put, url).json(&*customer)?;
        *customer = self.client.send(request)?;
        Ok(())
    }

    /// Delete the customer. Like every delete, the request has no body.
    pub fn delete(&self, customer_id: &str) -> Result<()> {
        let url = self.client.endpoint(&[CUSTOMERS, customer_id]);
        self.client.send_unit(HttpRequest::new(HttpMethod::Delete, url))
    }

    /// Store the tokenized card `token_id` as a payment source of the customer.
    pub fn create_payment_source(&self, customer_id: &str, token_id: &str) -> Result<PaymentSource> {
        let url = self.client.endpoint(&[CUSTOMERS, customer_id, PAYMENT_SOURCES]);
        let payload = CardSource { kind: "card", token_id };
        self.client.send(HttpRequest::new(HttpMethod::Post, url).json(&payload)?)
    }

    /// Apply `update` to the payment source addressed by `update.id`.
    pub fn update_payment_source(&self, customer_id: &str, update: &PaymentSourceUpdate) -> Result<()> {
        let url = self.client.endpoint(&[CUSTOMERS, customer_id, PAYMENT_SOURCES, id_of(&update.id)]);
        self.client.send_unit(HttpRequest::new(HttpMethod::Put, url).json(update)?)
    }

    pub fn delete_payment_source(&self, customer_id: &str, source_id: &str) -> Result<()> {
        let url = self.client.endpoint(&[CUSTOMERS, customer_id, PAYMENT_SOURCES, source_id]);
        self.client.send_unit(HttpRequest::new(HttpMethod::Delete, url))
    }

    /// Add `contact` to the customer, then replace it with the service's view
    /// of it, assigned id included.
    pub fn create_shipping_contact(&self, customer_id: &str, contact: &mut ShippingContact) -> Result<()> {
        let url = self.client.endpoint(&[CUSTOMERS, customer_id, SHIPPING_CONTACTS]);
        let request = HttpRequest::new(HttpMethod::Post, url).json(&*contact)?;
        *contact = self.client.send(request)?;
        Ok(())
    }

    pub fn update_shipping_contact(&self, customer_id: &str, contact: &ShippingContact) -> Result<()> {
        let url = self.client.endpoint(&[CUSTOMERS, customer_id, SHIPPING_CONTACTS, id_of(&contact.id)]);
        self.client.send_unit(HttpRequest::new(HttpMethod::Put, url).json(contact)?)
    }

    pub fn delete_shipping_contact(&self, customer_id: &str, contact_id: &str) -> Result<()> {
        let url = self.client.endpoint(&[CUSTOMERS, customer_id, SHIPPING_CONTACTS, contact_id]);
        self.client.send_unit(HttpRequest::new(HttpMethod::Delete, url))
    }

    /// Subscribe the customer to `plan_id`, billed to `card_id` or to the
    /// customer's default payment source.
    pub fn create_subscription(&self, customer: &Customer, plan_id: &str, card_id: Option<&str>) -> Result<Subscription> {
        self.subscribe(HttpMethod::Post, customer, plan_id, card_id)
    }

    /// Move the customer's subscription to another plan or card.
    pub fn update_subscription(&self, customer: &Customer, plan_id: &str, card_id: Option<&str>) -> Result<Subscription> {
        self.subscribe(HttpMethod::Put, customer, plan_id, card_id)
    }

    pub fn pause_subscription(&self, customer_id: &str, subscription_id: &str) -> Result<Subscription> {
        self.subscription_action(customer_id, subscription_id, "pause")
    }

    pub fn resume_subscription(&self, customer_id: &str, subscription_id: &str) -> Result<Subscription> {
        self.subscription_action(customer_id, subscription_id, "resume")
    }

    pub fn cancel_subscription(&self, customer_id: &str, subscription_id: &str) -> Result<Subscription> {
        self.subscription_action(customer_id, subscription_id, "cancel")
    }

    fn subscribe(&self, method: HttpMethod, customer: &Customer, plan_id: &str, card_id: Option<&str>) -> Result<Subscription> {
        let url = self.client.endpoint(&[CUSTOMERS, id_of(&customer.id), SUBSCRIPTION]);
        let payload = SubscriptionPlan {
            plan: plan_id,
            card: card_id.filter(|card| !card.is_empty()),
        };
        self.client.send(HttpRequest::new(method, url).json(&payload)?)
    }

    fn subscription_action(&self, customer_id: &str, subscription_id: &str, action: &str) -> Result<Subscription> {
        let url = self.client.endpoint(&[CUSTOMERS, customer_id, SUBSCRIPTION, action]);
        let payload = SubscriptionRef { id: subscription_id };
        self.client.send(HttpRequest::new(HttpMethod::Post, url).json(&payload)?)
    }
}

fn id_of(id: &Option<String>) -> &str {
    id.as_deref().unwrap_or_default()
}
