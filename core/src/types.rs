//! Domain objects exchanged with the service.
//!
//! # Design
//! Fields the service assigns (ids, timestamps, statuses) or that are
//! optional on input are `Option`s and left out of request bodies when
//! unset. Booleans are always sent. Collections of sub-resources accept both
//! a bare JSON array and the service's paged `{"object":"list","data":[..]}`
//! wrapper, since responses use the latter while requests use the former.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_with::skip_serializing_none;

/// Free-form key/value annotations attached to a resource.
pub type Metadata = HashMap<String, String>;

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Street and number.
    pub street1: Option<String>,
    /// Internal number, suite, residential complex or county.
    pub street2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    /// Two-letter ISO 3166-1 country code.
    pub country: Option<String>,
    pub postal_code: Option<String>,
    #[serde(default)]
    pub residential: bool,
}

/// Who receives a shipment and where.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingContact {
    pub id: Option<String>,
    pub phone: Option<String>,
    pub receiver: Option<String>,
    pub between_streets: Option<String>,
    pub address: Option<Address>,
}

/// A product sold in an order.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: Option<String>,
    pub name: Option<String>,
    /// Short description, under 250 characters.
    pub description: Option<String>,
    /// Price in cents.
    pub unit_price: Option<u32>,
    pub quantity: Option<u32>,
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub brand: Option<String>,
    pub metadata: Option<Metadata>,
}

/// Shipment details of an order: method, cost, carrier and tracking.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingLine {
    pub id: Option<String>,
    /// Cost in cents.
    pub amount: Option<u32>,
    pub tracking_number: Option<String>,
    pub carrier: Option<String>,
    pub method: Option<String>,
    pub metadata: Option<Metadata>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxLine {
    pub id: Option<String>,
    /// Tax code.
    pub description: Option<String>,
    pub amount: Option<u32>,
    pub metadata: Option<Metadata>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountLine {
    pub id: Option<String>,
    pub code: Option<String>,
    /// One of `loyalty`, `campaign`, `coupon` or `sign`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Discount in cents.
    pub amount: Option<u32>,
}

/// Customer data attached to an order. Either `customer_id` or the
/// contact fields must be given.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub customer_id: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub corporate: bool,
}

/// Card data as reported on a charge.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub object: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub number: Option<String>,
    pub exp_month: Option<String>,
    pub exp_year: Option<String>,
    pub brand: Option<String>,
    pub name: Option<String>,
}

/// Payment made towards an order.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charge {
    pub id: Option<String>,
    pub object: Option<String>,
    pub status: Option<String>,
    pub order_id: Option<String>,
    pub payment_method: Option<Card>,
    pub created_at: Option<u64>,
    /// ISO 4217 currency code.
    pub currency: Option<String>,
    pub amount: Option<u32>,
    pub fee: Option<u32>,
    /// Interest-free monthly installments: 3, 6, 9 or 12.
    pub monthly_installments: Option<u32>,
    #[serde(default)]
    pub livemode: bool,
}

/// Amount and reason of an order refund.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refund {
    pub id: Option<String>,
    /// `requested_by_client`, `cannot_be_fulfilled`, `duplicated_transaction`,
    /// `suspected_fraud` or `other`.
    pub reason: Option<String>,
    /// Partial refund amount in cents; the whole order when unset.
    pub amount: Option<u32>,
}

/// A purchase with its products, shipment, taxes, discounts and charges.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: Option<String>,
    pub object: Option<String>,
    pub created_at: Option<u64>,
    pub updated_at: Option<u64>,
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "list_or_page", skip_serializing_if = "Vec::is_empty")]
    pub line_items: Vec<LineItem>,
    #[serde(default, deserialize_with = "list_or_page", skip_serializing_if = "Vec::is_empty")]
    pub shipping_lines: Vec<ShippingLine>,
    #[serde(default, deserialize_with = "list_or_page", skip_serializing_if = "Vec::is_empty")]
    pub tax_lines: Vec<TaxLine>,
    #[serde(default, deserialize_with = "list_or_page", skip_serializing_if = "Vec::is_empty")]
    pub discount_lines: Vec<DiscountLine>,
    #[serde(default)]
    pub livemode: bool,
    pub metadata: Option<Metadata>,
    /// Required when the order has shipping lines; the customer's default
    /// contact is used otherwise.
    pub shipping_contact: Option<ShippingContact>,
    /// Computed by the service from the lines.
    pub amount: Option<u32>,
    pub amount_refunded: Option<u32>,
    /// `payment_pending`, `declined`, `expired`, `paid`, `refunded`,
    /// `partially_refunded`, `charged_back`, `pre_authorized` or `voided`.
    pub payment_status: Option<String>,
    pub customer_info: Option<CustomerInfo>,
    #[serde(default, deserialize_with = "list_or_page", skip_serializing_if = "Vec::is_empty")]
    pub charges: Vec<Charge>,
    #[serde(default)]
    pub pre_authorize: bool,
}

/// A stored payment method of a customer.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSource {
    pub id: Option<String>,
    pub object: Option<String>,
    /// Currently always `card`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub created_at: Option<u64>,
    pub last4: Option<String>,
    pub name: Option<String>,
    pub exp_month: Option<String>,
    pub exp_year: Option<String>,
    pub brand: Option<String>,
    /// Customer owning the source.
    pub parent_id: Option<String>,
}

/// Changes to an existing payment source, addressed by `id`.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSourceUpdate {
    pub id: Option<String>,
    pub name: Option<String>,
    pub exp_month: Option<String>,
    pub exp_year: Option<String>,
    pub address: Option<Address>,
}

/// Recurring billing of a customer against a plan.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Option<String>,
    pub object: Option<String>,
    pub created_at: Option<u64>,
    pub canceled_at: Option<u64>,
    pub paused_at: Option<u64>,
    pub billing_cycle_start: Option<u64>,
    pub billing_cycle_end: Option<u64>,
    pub trial_start: Option<u64>,
    pub trial_end: Option<u64>,
    pub plan_id: Option<String>,
    pub customer_id: Option<String>,
    pub card_id: Option<String>,
    /// `in_trial`, `active`, `past_due`, `paused` or `canceled`.
    pub status: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Option<String>,
    pub name: Option<String>,
    /// International format.
    pub phone: Option<String>,
    pub email: Option<String>,
    pub plan_id: Option<String>,
    #[serde(default)]
    pub corporate: bool,
    #[serde(default, deserialize_with = "list_or_page", skip_serializing_if = "Vec::is_empty")]
    pub payment_sources: Vec<PaymentSource>,
    #[serde(default, deserialize_with = "list_or_page", skip_serializing_if = "Vec::is_empty")]
    pub shipping_contacts: Vec<ShippingContact>,
    #[serde(default, deserialize_with = "list_or_page", skip_serializing_if = "Vec::is_empty")]
    pub subscriptions: Vec<Subscription>,
}

/// Template for subscriptions: amount and billing frequency.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub id: Option<String>,
    pub object: Option<String>,
    pub created_at: Option<u64>,
    #[serde(default)]
    pub livemode: bool,
    pub name: Option<String>,
    /// Amount charged per cycle, in cents.
    pub amount: Option<u32>,
    pub currency: Option<String>,
    /// Billing unit. Charging every two months is `interval = "month"`
    /// with `frequency = 2`.
    pub interval: Option<String>,
    pub frequency: Option<u32>,
    pub trial_period_days: Option<u32>,
    /// Charges made before the subscription expires.
    pub expiry_count: Option<u32>,
}

/// Changes to an existing plan. The id itself cannot change.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanUpdate {
    pub id: Option<String>,
    pub name: Option<String>,
    pub amount: Option<u32>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListOrPage<T> {
    List(Vec<T>),
    Page { data: Vec<T> },
}

fn list_or_page<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let items = Option::<ListOrPage<T>>::deserialize(deserializer)?;
    Ok(match items {
        Some(ListOrPage::List(items)) | Some(ListOrPage::Page { data: items }) => items,
        None => Vec::new(),
    })
}
