//! Subscription plans.

use crate::client::Client;
use crate::error::Result;
use crate::http::{HttpMethod, HttpRequest};
use crate::types::{Plan, PlanUpdate};

const PLANS: &str = "plans";

/// Methods for the `plans` resource, obtained from [`Client::plans`].
#[derive(Debug, Clone, Copy)]
pub struct Plans<'a> {
    client: &'a Client,
}

impl<'a> Plans<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Create `plan`, then replace it with the service's view of it.
    pub fn create(&self, plan: &mut Plan) -> Result<()> {
        let url = self.client.endpoint(&[PLANS]);
        let request = HttpRequest::new(HttpMethod::Post, url).json(&*plan)?;
        *plan = self.client.send(request)?;
        Ok(())
    }

    /// Apply `update` to the plan addressed by `update.id` and return the
    /// updated plan.
    pub fn update(&self, update: &PlanUpdate) -> Result<Plan> {
        let url = self.client.endpoint(&[PLANS, update.id.as_deref().unwrap_or_default()]);
        self.client.send(HttpRequest::new(HttpMethod::Put, url).json(update)?)
    }

    /// Delete the plan; the id travels in the path and no body is sent.
    pub fn delete(&self, plan_id: &str) -> Result<()> {
        let url = self.client.endpoint(&[PLANS, plan_id]);
        self.client.send_unit(HttpRequest::new(HttpMethod::Delete, url))
    }
}
