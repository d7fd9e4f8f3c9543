//! Orders and their line items, discount, tax and shipping lines.

use serde::Serialize;

use crate::client::Client;
use crate::error::Result;
use crate::http::{HttpMethod, HttpRequest};
use crate::types::{DiscountLine, LineItem, Order, Refund, ShippingLine, TaxLine};

const ORDERS: &str = "orders";
const LINE_ITEMS: &str = "line_items";
const DISCOUNT_LINES: &str = "discount_lines";
const TAX_LINES: &str = "tax_lines";
const SHIPPING_LINES: &str = "shipping_lines";

/// Methods for the `orders` resource, obtained from [`Client::orders`].
#[derive(Debug, Clone, Copy)]
pub struct Orders<'a> {
    client: &'a Client,
}

impl<'a> Orders<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Create `order`, then replace it with the service's view of it.
    pub fn create(&self, order: &mut Order) -> Result<()> {
        let request = HttpRequest::new(HttpMethod::Post, self.client.endpoint(&[ORDERS])).json(&*order)?;
        *order = self.client.send(request)?;
        Ok(())
    }

    /// Update the order addressed by `order.id`, then replace it with the
    /// service's view of it.
    pub fn update(&self, order: &mut Order) -> Result<()> {
        let id = order.id.as_deref().unwrap_or_default();
        let request = HttpRequest::new(HttpMethod::Put, self.client.endpoint(&[ORDERS, id])).json(&*order)?;
        *order = self.client.send(request)?;
        Ok(())
    }

    /// Process a pre-authorized order. The order is named by the path alone;
    /// no request body is sent.
    pub fn capture(&self, order_id: &str) -> Result<()> {
        let url = self.client.endpoint(&[ORDERS, order_id, "capture"]);
        self.client.send_unit(HttpRequest::new(HttpMethod::Post, url))
    }

    pub fn refund(&self, order_id: &str, refund: &Refund) -> Result<()> {
        let url = self.client.endpoint(&[ORDERS, order_id, "refunds"]);
        self.client.send_unit(HttpRequest::new(HttpMethod::Post, url).json(refund)?)
    }

    /// Add `item` to the order and return the id assigned to it.
    pub fn create_line_item(&self, order_id: &str, item: &LineItem) -> Result<String> {
        self.create_line(order_id, LINE_ITEMS, item)
    }

    pub fn update_line_item(&self, order_id: &str, item: &LineItem) -> Result<()> {
        self.update_line(order_id, LINE_ITEMS, item.id.as_deref(), item)
    }

    pub fn delete_line_item(&self, order_id: &str, item_id: &str) -> Result<()> {
        self.delete_line(order_id, LINE_ITEMS, item_id)
    }

    /// Add `discount` to the order and return the id assigned to it.
    pub fn create_discount_line(&self, order_id: &str, discount: &DiscountLine) -> Result<String> {
        self.create_line(order_id, DISCOUNT_LINES, discount)
    }

    pub fn update_discount_line(&self, order_id: &str, discount: &DiscountLine) -> Result<()> {
        self.update_line(order_id, DISCOUNT_LINES, discount.id.as_deref(), discount)
    }

    pub fn delete_discount_line(&self, order_id: &str, discount_id: &str) -> Result<()> {
        self.delete_line(order_id, DISCOUNT_LINES, discount_id)
    }

    /// Add `tax` to the order and return the id assigned to it.
    pub fn create_tax_line(&self, order_id: &str, tax: &TaxLine) -> Result<String> {
        self.create_line(order_id, TAX_LINES, tax)
    }

    pub fn update_tax_line(&self, order_id: &str, tax: &TaxLine) -> Result<()> {
        self.update_line(order_id, TAX_LINES, tax.id.as_deref(), tax)
    }

    pub fn delete_tax_line(&self, order_id: &str, tax_id: &str) -> Result<()> {
        self.delete_line(order_id, TAX_LINES, tax_id)
    }

    /// Add `line` to the order and return the id assigned to it.
    pub fn create_shipping_line(&self, order_id: &str, line: &ShippingLine) -> Result<String> {
        self.create_line(order_id, SHIPPING_LINES, line)
    }

    pub fn update_shipping_line(&self, order_id: &str, line: &ShippingLine) -> Result<()> {
        self.update_line(order_id, SHIPPING_LINES, line.id.as_deref(), line)
    }

    pub fn delete_shipping_line(&self, order_id: &str, line_id: &str) -> Result<()> {
        self.delete_line(order_id, SHIPPING_LINES, line_id)
    }

    fn create_line<T: Serialize>(&self, order_id: &str, lines: &str, line: &T) -> Result<String> {
        let url = self.client.endpoint(&[ORDERS, order_id, lines]);
        self.client.send_for_id(HttpRequest::new(HttpMethod::Post, url).json(line)?)
    }

    fn update_line<T: Serialize>(&self, order_id: &str, lines: &str, line_id: Option<&str>, line: &T) -> Result<()> {
        let url = self.client.endpoint(&[ORDERS, order_id, lines, line_id.unwrap_or_default()]);
        self.client.send_unit(HttpRequest::new(HttpMethod::Put, url).json(line)?)
    }

    /// Deletes carry no body, the line is addressed by the path.
    fn delete_line(&self, order_id: &str, lines: &str, line_id: &str) -> Result<()> {
        let url = self.client.endpoint(&[ORDERS, order_id, lines, line_id]);
        self.client.send_unit(HttpRequest::new(HttpMethod::Delete, url))
    }
}
