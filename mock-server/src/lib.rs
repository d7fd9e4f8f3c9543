//! In-memory stand-in for the Conekta API.
//!
//! Implements the endpoints the SDK calls with just enough behavior to
//! exercise it end to end: Basic-auth and versioned `Accept` checks, a few
//! parameter validations, 404s for unknown ids, and the service's JSON error
//! envelope on every failure. Collections nested in responses use the
//! service's paged `{"object":"list","data":[..]}` shape.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    extract::{rejection::JsonRejection, Path, Request, State},
    http::{
        header::{ACCEPT, AUTHORIZATION},
        StatusCode,
    },
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{post, put},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub type Record = Map<String, Value>;

/// Order sub-resource collections and the id prefix of their entries.
pub const ORDER_LINES: [(&str, &str); 4] = [
    ("line_items", "line_item"),
    ("discount_lines", "dis_lin"),
    ("tax_lines", "tax_lin"),
    ("shipping_lines", "ship_lin"),
];

#[derive(Default)]
pub struct Store {
    plans: HashMap<String, Record>,
    customers: HashMap<String, CustomerEntry>,
    orders: HashMap<String, OrderEntry>,
}

#[derive(Default)]
struct CustomerEntry {
    record: Record,
    payment_sources: Vec<Record>,
    shipping_contacts: Vec<Record>,
    subscription: Option<Record>,
}

#[derive(Default)]
struct OrderEntry {
    record: Record,
    lines: HashMap<&'static str, Vec<Record>>,
}

pub type Db = Arc<RwLock<Store>>;

/// Error envelope returned with every non-200 response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "type")]
    pub error_type: String,
    pub log_id: String,
    pub details: Vec<ErrorDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    pub debug_message: String,
    pub params: String,
    pub code: String,
}

#[derive(Debug)]
pub struct ApiFailure {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiFailure {
    fn new(status: StatusCode, error_type: &str, params: &str, message: &str) -> Self {
        Self {
            status,
            body: ErrorBody {
                error_type: error_type.to_string(),
                log_id: Uuid::new_v4().simple().to_string(),
                details: vec![ErrorDetail {
                    message: message.to_string(),
                    debug_message: message.to_string(),
                    params: params.to_string(),
                    code: format!("conekta.errors.{error_type}.{params}"),
                }],
            },
        }
    }

    fn invalid(params: &str, message: &str) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, "parameter_validation_error", params, message)
    }

    fn not_found(resource: &str, id: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "resource_not_found_error",
            "id",
            &format!("The {resource} {id} could not be found."),
        )
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

type ApiResult = Result<Json<Value>, ApiFailure>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    let mut router = Router::new()
        .route("/plans", post(create_plan))
        .route("/plans/{id}", put(update_plan).delete(delete_plan))
        .route("/customers", post(create_customer))
        .route("/customers/{id}", put(update_customer).delete(delete_customer))
        .route("/customers/{id}/payment_sources", post(create_payment_source))
        .route(
            "/customers/{id}/payment_sources/{source_id}",
            put(update_payment_source).delete(delete_payment_source),
        )
        .route("/customers/{id}/shipping_contacts", post(create_shipping_contact))
        .route(
            "/customers/{id}/shipping_contacts/{contact_id}",
            put(update_shipping_contact).delete(delete_shipping_contact),
        )
        .route("/customers/{id}/subscription", post(create_subscription).put(update_subscription))
        .route("/customers/{id}/subscription/{action}", post(subscription_action))
        .route("/orders", post(create_order))
        .route("/orders/{id}", put(update_order))
        .route("/orders/{id}/capture", post(capture_order))
        .route("/orders/{id}/refunds", post(refund_order));

    for (lines, prefix) in ORDER_LINES {
        router = router
            .route(
                &format!("/orders/{{id}}/{lines}"),
                post(
                    move |State(db): State<Db>, Path(id): Path<String>, payload: Result<Json<Record>, JsonRejection>| {
                        create_line(db, lines, prefix, id, payload)
                    },
                ),
            )
            .route(
                &format!("/orders/{{id}}/{lines}/{{line_id}}"),
                put(
                    move |State(db): State<Db>,
                          Path((id, line_id)): Path<(String, String)>,
                          payload: Result<Json<Record>, JsonRejection>| {
                        update_line(db, lines, id, line_id, payload)
                    },
                )
                .delete(move |State(db): State<Db>, Path((id, line_id)): Path<(String, String)>| {
                    delete_line(db, lines, id, line_id)
                }),
            );
    }

    router.layer(middleware::from_fn(authenticate)).with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Require a Basic credential with a non-empty key and a versioned `Accept`.
async fn authenticate(request: Request, next: Next) -> Result<Response, ApiFailure> {
    let headers = request.headers();
    let authorized = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Basic "))
        .and_then(|encoded| STANDARD.decode(encoded).ok())
        .and_then(|raw| String::from_utf8(raw).ok())
        .is_some_and(|credential| credential.split_once(':').is_some_and(|(key, _)| !key.is_empty()));
    if !authorized {
        tracing::debug!(path = %request.uri().path(), "rejected unauthenticated request");
        return Err(ApiFailure::new(
            StatusCode::UNAUTHORIZED,
            "authentication_error",
            "authorization",
            "Please include your access key in your request.",
        ));
    }

    let versioned = headers
        .get(ACCEPT)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|accept| accept.starts_with("application/vnd.conekta-"));
    if !versioned {
        return Err(ApiFailure::new(
            StatusCode::NOT_ACCEPTABLE,
            "api_version_error",
            "accept",
            "The Accept header must name an API version.",
        ));
    }

    Ok(next.run(request).await)
}

// --- plans ---

async fn create_plan(State(db): State<Db>, payload: Result<Json<Record>, JsonRejection>) -> ApiResult {
    let mut plan = body(payload)?;
    require_str(&plan, "name")?;
    if amount(&plan, "amount") == 0 {
        return Err(ApiFailure::invalid("amount", "The amount must be greater than zero."));
    }
    let id = stamp(&mut plan, "plan", "plan");
    db.write().await.plans.insert(id, plan.clone());
    Ok(Json(Value::Object(plan)))
}

async fn update_plan(
    State(db): State<Db>,
    Path(id): Path<String>,
    payload: Result<Json<Record>, JsonRejection>,
) -> ApiResult {
    let changes = body(payload)?;
    let mut store = db.write().await;
    let plan = store.plans.get_mut(&id).ok_or_else(|| ApiFailure::not_found("plan", &id))?;
    merge(plan, changes);
    Ok(Json(Value::Object(plan.clone())))
}

async fn delete_plan(State(db): State<Db>, Path(id): Path<String>) -> ApiResult {
    let plan = db.write().await.plans.remove(&id).ok_or_else(|| ApiFailure::not_found("plan", &id))?;
    Ok(Json(deleted(plan)))
}

// --- customers ---

async fn create_customer(State(db): State<Db>, payload: Result<Json<Record>, JsonRejection>) -> ApiResult {
    let mut record = body(payload)?;
    require_str(&record, "name")?;
    let email = require_str(&record, "email")?;
    if !email.contains('@') {
        return Err(ApiFailure::invalid("email", "The email address is not valid."));
    }
    let shipping_contacts = take_list(&mut record, "shipping_contacts", "ship_cont", "shipping_contact");
    record.remove("payment_sources");
    record.remove("subscriptions");
    let id = stamp(&mut record, "cus", "customer");
    let entry = CustomerEntry {
        record,
        shipping_contacts,
        ..CustomerEntry::default()
    };
    let rendered = entry.render();
    db.write().await.customers.insert(id, entry);
    Ok(Json(rendered))
}

async fn update_customer(
    State(db): State<Db>,
    Path(id): Path<String>,
    payload: Result<Json<Record>, JsonRejection>,
) -> ApiResult {
    let mut changes = body(payload)?;
    for nested in ["payment_sources", "shipping_contacts", "subscriptions"] {
        changes.remove(nested);
    }
    let mut store = db.write().await;
    let customer = store.customer(&id)?;
    merge(&mut customer.record, changes);
    Ok(Json(customer.render()))
}

async fn delete_customer(State(db): State<Db>, Path(id): Path<String>) -> ApiResult {
    let customer = db
        .write()
        .await
        .customers
        .remove(&id)
        .ok_or_else(|| ApiFailure::not_found("customer", &id))?;
    Ok(Json(deleted(customer.record)))
}

async fn create_payment_source(
    State(db): State<Db>,
    Path(id): Path<String>,
    payload: Result<Json<Record>, JsonRejection>,
) -> ApiResult {
    let request = body(payload)?;
    let token = require_str(&request, "token_id")?;
    if !token.starts_with("tok_test") {
        return Err(ApiFailure::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "processing_error",
            "token_id",
            "The token does not exist.",
        ));
    }
    let mut store = db.write().await;
    let customer = store.customer(&id)?;
    let mut source = Record::new();
    source.insert("type".to_string(), json!("card"));
    source.insert("last4".to_string(), json!("4242"));
    source.insert("brand".to_string(), json!("visa"));
    source.insert("parent_id".to_string(), json!(id));
    stamp(&mut source, "src", "payment_source");
    customer.payment_sources.push(source.clone());
    Ok(Json(Value::Object(source)))
}

async fn update_payment_source(
    State(db): State<Db>,
    Path((id, source_id)): Path<(String, String)>,
    payload: Result<Json<Record>, JsonRejection>,
) -> ApiResult {
    let changes = body(payload)?;
    let mut store = db.write().await;
    let customer = store.customer(&id)?;
    let source = find(&mut customer.payment_sources, &source_id)
        .ok_or_else(|| ApiFailure::not_found("payment source", &source_id))?;
    merge(source, changes);
    Ok(Json(Value::Object(source.clone())))
}

async fn delete_payment_source(
    State(db): State<Db>,
    Path((id, source_id)): Path<(String, String)>,
) -> ApiResult {
    let mut store = db.write().await;
    let customer = store.customer(&id)?;
    let source = remove(&mut customer.payment_sources, &source_id)
        .ok_or_else(|| ApiFailure::not_found("payment source", &source_id))?;
    Ok(Json(deleted(source)))
}

async fn create_shipping_contact(
    State(db): State<Db>,
    Path(id): Path<String>,
    payload: Result<Json<Record>, JsonRejection>,
) -> ApiResult {
    let mut contact = body(payload)?;
    if !contact.get("address").is_some_and(Value::is_object) {
        return Err(ApiFailure::invalid("address", "The shipping contact needs an address."));
    }
    let mut store = db.write().await;
    let customer = store.customer(&id)?;
    stamp(&mut contact, "ship_cont", "shipping_contact");
    contact.insert("parent_id".to_string(), json!(id));
    customer.shipping_contacts.push(contact.clone());
    Ok(Json(Value::Object(contact)))
}

async fn update_shipping_contact(
    State(db): State<Db>,
    Path((id, contact_id)): Path<(String, String)>,
    payload: Result<Json<Record>, JsonRejection>,
) -> ApiResult {
    let changes = body(payload)?;
    let mut store = db.write().await;
    let customer = store.customer(&id)?;
    let contact = find(&mut customer.shipping_contacts, &contact_id)
        .ok_or_else(|| ApiFailure::not_found("shipping contact", &contact_id))?;
    merge(contact, changes);
    Ok(Json(Value::Object(contact.clone())))
}

async fn delete_shipping_contact(
    State(db): State<Db>,
    Path((id, contact_id)): Path<(String, String)>,
) -> ApiResult {
    let mut store = db.write().await;
    let customer = store.customer(&id)?;
    let contact = remove(&mut customer.shipping_contacts, &contact_id)
        .ok_or_else(|| ApiFailure::not_found("shipping contact", &contact_id))?;
    Ok(Json(deleted(contact)))
}

// --- subscriptions ---

async fn create_subscription(
    State(db): State<Db>,
    Path(id): Path<String>,
    payload: Result<Json<Record>, JsonRejection>,
) -> ApiResult {
    let request = body(payload)?;
    let mut store = db.write().await;
    let (plan_id, trial_days) = store.subscription_plan(&request)?;
    let customer = store.customer(&id)?;
    let card_id = customer.billing_card(&request)?;

    let mut subscription = Record::new();
    subscription.insert("plan_id".to_string(), json!(plan_id));
    subscription.insert("customer_id".to_string(), json!(id));
    subscription.insert("card_id".to_string(), json!(card_id));
    let status = if trial_days > 0 { "in_trial" } else { "active" };
    subscription.insert("status".to_string(), json!(status));
    let started = now();
    subscription.insert("billing_cycle_start".to_string(), json!(started));
    if trial_days > 0 {
        subscription.insert("trial_start".to_string(), json!(started));
        subscription.insert("trial_end".to_string(), json!(started + trial_days * 86_400));
    }
    stamp(&mut subscription, "sub", "subscription");
    customer.record.insert("plan_id".to_string(), json!(plan_id));
    customer.subscription = Some(subscription.clone());
    Ok(Json(Value::Object(subscription)))
}

async fn update_subscription(
    State(db): State<Db>,
    Path(id): Path<String>,
    payload: Result<Json<Record>, JsonRejection>,
) -> ApiResult {
    let request = body(payload)?;
    let mut store = db.write().await;
    let (plan_id, _) = store.subscription_plan(&request)?;
    let customer = store.customer(&id)?;
    let card_id = customer.billing_card(&request)?;
    let subscription = customer
        .subscription
        .as_mut()
        .ok_or_else(|| ApiFailure::not_found("subscription of customer", &id))?;
    subscription.insert("plan_id".to_string(), json!(plan_id));
    subscription.insert("card_id".to_string(), json!(card_id));
    let subscription = subscription.clone();
    customer.record.insert("plan_id".to_string(), json!(plan_id));
    Ok(Json(Value::Object(subscription)))
}

async fn subscription_action(
    State(db): State<Db>,
    Path((id, action)): Path<(String, String)>,
    payload: Result<Json<Record>, JsonRejection>,
) -> ApiResult {
    let request = body(payload)?;
    let (status, stamp_field) = match action.as_str() {
        "pause" => ("paused", "paused_at"),
        "resume" => ("active", "resumed_at"),
        "cancel" => ("canceled", "canceled_at"),
        other => return Err(ApiFailure::not_found("subscription action", other)),
    };
    let mut store = db.write().await;
    let customer = store.customer(&id)?;
    let subscription = customer
        .subscription
        .as_mut()
        .ok_or_else(|| ApiFailure::not_found("subscription of customer", &id))?;
    let wanted = require_str(&request, "id")?;
    if subscription.get("id").and_then(Value::as_str) != Some(wanted) {
        return Err(ApiFailure::not_found("subscription", wanted));
    }
    if subscription.get("status").and_then(Value::as_str) == Some("canceled") {
        return Err(ApiFailure::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "processing_error",
            "status",
            "The subscription is already canceled.",
        ));
    }
    subscription.insert("status".to_string(), json!(status));
    subscription.insert(stamp_field.to_string(), json!(now()));
    Ok(Json(Value::Object(subscription.clone())))
}

// --- orders ---

async fn create_order(State(db): State<Db>, payload: Result<Json<Record>, JsonRejection>) -> ApiResult {
    let mut record = body(payload)?;
    require_str(&record, "currency")?;
    if !record.get("customer_info").is_some_and(Value::is_object) {
        return Err(ApiFailure::invalid("customer_info", "The order needs customer information."));
    }
    let mut entry = OrderEntry::default();
    for (lines, prefix) in ORDER_LINES {
        let object = prefix_object(prefix);
        entry.lines.insert(lines, take_list(&mut record, lines, prefix, object));
    }
    if entry.lines.get("line_items").map_or(true, Vec::is_empty) {
        return Err(ApiFailure::invalid("line_items", "The order must contain at least one line item."));
    }
    record.remove("charges");
    let pre_authorize = record.get("pre_authorize").and_then(Value::as_bool).unwrap_or(false);
    let status = if pre_authorize { "pre_authorized" } else { "paid" };
    record.insert("payment_status".to_string(), json!(status));
    record.insert("amount_refunded".to_string(), json!(0));
    let id = stamp(&mut entry.record, "ord", "order");
    merge(&mut entry.record, record);
    entry.recompute();
    let rendered = entry.render();
    db.write().await.orders.insert(id, entry);
    Ok(Json(rendered))
}

async fn update_order(
    State(db): State<Db>,
    Path(id): Path<String>,
    payload: Result<Json<Record>, JsonRejection>,
) -> ApiResult {
    let mut changes = body(payload)?;
    for (lines, _) in ORDER_LINES {
        changes.remove(lines);
    }
    for computed in ["amount", "amount_refunded", "payment_status", "charges"] {
        changes.remove(computed);
    }
    let mut store = db.write().await;
    let order = store.order(&id)?;
    merge(&mut order.record, changes);
    Ok(Json(order.render()))
}

async fn capture_order(State(db): State<Db>, Path(id): Path<String>) -> ApiResult {
    let mut store = db.write().await;
    let order = store.order(&id)?;
    if order.record.get("payment_status").and_then(Value::as_str) != Some("pre_authorized") {
        return Err(ApiFailure::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "processing_error",
            "order_id",
            "Only pre-authorized orders can be captured.",
        ));
    }
    order.record.insert("payment_status".to_string(), json!("paid"));
    Ok(Json(order.render()))
}

async fn refund_order(
    State(db): State<Db>,
    Path(id): Path<String>,
    payload: Result<Json<Record>, JsonRejection>,
) -> ApiResult {
    let request = body(payload)?;
    require_str(&request, "reason")?;
    let mut store = db.write().await;
    let order = store.order(&id)?;
    if order.record.get("payment_status").and_then(Value::as_str) != Some("paid")
        && order.record.get("payment_status").and_then(Value::as_str) != Some("partially_refunded")
    {
        return Err(ApiFailure::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "processing_error",
            "payment_status",
            "Only paid orders can be refunded.",
        ));
    }
    let total = amount(&order.record, "amount");
    let refunded = amount(&order.record, "amount_refunded");
    let refundable = total.saturating_sub(refunded);
    let requested = match amount(&request, "amount") {
        0 => refundable,
        requested => requested,
    };
    if requested > refundable {
        return Err(ApiFailure::invalid("amount", "The refund exceeds the refundable amount."));
    }
    let refunded = refunded + requested;
    let status = if refunded == total { "refunded" } else { "partially_refunded" };
    order.record.insert("amount_refunded".to_string(), json!(refunded));
    order.record.insert("payment_status".to_string(), json!(status));
    Ok(Json(order.render()))
}

async fn create_line(
    db: Db,
    lines: &'static str,
    prefix: &'static str,
    id: String,
    payload: Result<Json<Record>, JsonRejection>,
) -> ApiResult {
    let mut line = body(payload)?;
    let mut store = db.write().await;
    let order = store.order(&id)?;
    stamp(&mut line, prefix, prefix_object(prefix));
    line.insert("parent_id".to_string(), json!(id));
    order.lines.entry(lines).or_default().push(line.clone());
    order.recompute();
    Ok(Json(Value::Object(line)))
}

async fn update_line(
    db: Db,
    lines: &'static str,
    id: String,
    line_id: String,
    payload: Result<Json<Record>, JsonRejection>,
) -> ApiResult {
    let changes = body(payload)?;
    let mut store = db.write().await;
    let order = store.order(&id)?;
    let line = order
        .lines
        .get_mut(lines)
        .and_then(|entries| find(entries, &line_id))
        .ok_or_else(|| ApiFailure::not_found(lines, &line_id))?;
    merge(line, changes);
    let line = line.clone();
    order.recompute();
    Ok(Json(Value::Object(line)))
}

async fn delete_line(db: Db, lines: &'static str, id: String, line_id: String) -> ApiResult {
    let mut store = db.write().await;
    let order = store.order(&id)?;
    let line = order
        .lines
        .get_mut(lines)
        .and_then(|entries| remove(entries, &line_id))
        .ok_or_else(|| ApiFailure::not_found(lines, &line_id))?;
    order.recompute();
    Ok(Json(deleted(line)))
}

// --- store helpers ---

impl Store {
    fn customer(&mut self, id: &str) -> Result<&mut CustomerEntry, ApiFailure> {
        self.customers.get_mut(id).ok_or_else(|| ApiFailure::not_found("customer", id))
    }

    fn order(&mut self, id: &str) -> Result<&mut OrderEntry, ApiFailure> {
        self.orders.get_mut(id).ok_or_else(|| ApiFailure::not_found("order", id))
    }

    /// Plan named by a subscription request, with its trial length in days.
    fn subscription_plan(&self, request: &Record) -> Result<(String, u64), ApiFailure> {
        let plan_id = require_str(request, "plan")?;
        let plan = self.plans.get(plan_id).ok_or_else(|| ApiFailure::not_found("plan", plan_id))?;
        Ok((plan_id.to_string(), amount(plan, "trial_period_days")))
    }
}

impl CustomerEntry {
    /// Card named by a subscription request, or the customer's first source.
    fn billing_card(&self, request: &Record) -> Result<Option<String>, ApiFailure> {
        match request.get("card").and_then(Value::as_str) {
            Some(card) if self.payment_sources.iter().any(|source| has_id(source, card)) => Ok(Some(card.to_string())),
            Some(card) => Err(ApiFailure::not_found("payment source", card)),
            None => Ok(self
                .payment_sources
                .first()
                .and_then(|source| source.get("id"))
                .and_then(Value::as_str)
                .map(str::to_string)),
        }
    }

    fn render(&self) -> Value {
        let mut record = self.record.clone();
        record.insert("payment_sources".to_string(), page(&self.payment_sources));
        record.insert("shipping_contacts".to_string(), page(&self.shipping_contacts));
        if let Some(subscription) = &self.subscription {
            record.insert("subscription".to_string(), Value::Object(subscription.clone()));
        }
        Value::Object(record)
    }
}

impl OrderEntry {
    /// Order total: items plus shipping and taxes, minus discounts.
    fn recompute(&mut self) {
        let sum = |lines: &str, per_line: fn(&Record) -> u64| -> u64 {
            self.lines
                .get(lines)
                .map_or(0, |entries| entries.iter().map(per_line).fold(0, u64::saturating_add))
        };
        let items = sum("line_items", |line| amount(line, "unit_price").saturating_mul(amount(line, "quantity").max(1)));
        let shipping = sum("shipping_lines", |line| amount(line, "amount"));
        let taxes = sum("tax_lines", |line| amount(line, "amount"));
        let discounts = sum("discount_lines", |line| amount(line, "amount"));
        let total = items.saturating_add(shipping).saturating_add(taxes).saturating_sub(discounts);
        self.record.insert("amount".to_string(), json!(total));
    }

    fn render(&self) -> Value {
        let mut record = self.record.clone();
        for (lines, _) in ORDER_LINES {
            let entries = self.lines.get(lines).map(Vec::as_slice).unwrap_or_default();
            record.insert(lines.to_string(), page(entries));
        }
        Value::Object(record)
    }
}

fn body(payload: Result<Json<Record>, JsonRejection>) -> Result<Record, ApiFailure> {
    payload
        .map(|Json(record)| record)
        .map_err(|rejection| ApiFailure::new(StatusCode::BAD_REQUEST, "malformed_request_error", "body", &rejection.body_text()))
}

fn require_str<'r>(record: &'r Record, field: &str) -> Result<&'r str, ApiFailure> {
    record
        .get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiFailure::invalid(field, &format!("The parameter {field} is required.")))
}

fn amount(record: &Record, field: &str) -> u64 {
    record.get(field).and_then(Value::as_u64).unwrap_or(0)
}

/// Assign the service-side fields of a new resource and return its id.
fn stamp(record: &mut Record, prefix: &str, object: &str) -> String {
    let id = format!("{prefix}_{}", Uuid::new_v4().simple());
    record.insert("id".to_string(), json!(id));
    record.insert("object".to_string(), json!(object));
    record.insert("created_at".to_string(), json!(now()));
    record.insert("livemode".to_string(), json!(false));
    id
}

/// Apply client-sent fields, keeping the service-assigned ones.
fn merge(record: &mut Record, changes: Record) {
    for (key, value) in changes {
        if !matches!(key.as_str(), "id" | "object" | "created_at" | "livemode" | "parent_id") {
            record.insert(key, value);
        }
    }
}

fn deleted(mut record: Record) -> Value {
    record.insert("deleted".to_string(), json!(true));
    Value::Object(record)
}

/// Pull the nested list `field` out of a create request as stamped records.
fn take_list(record: &mut Record, field: &str, prefix: &str, object: &str) -> Vec<Record> {
    let Some(Value::Array(items)) = record.remove(field) else {
        return Vec::new();
    };
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(mut entry) => {
                stamp(&mut entry, prefix, object);
                Some(entry)
            }
            _ => None,
        })
        .collect()
}

fn prefix_object(prefix: &str) -> &'static str {
    match prefix {
        "line_item" => "line_item",
        "dis_lin" => "discount_line",
        "tax_lin" => "tax_line",
        "ship_lin" => "shipping_line",
        "ship_cont" => "shipping_contact",
        _ => "object",
    }
}

fn has_id(record: &Record, id: &str) -> bool {
    record.get("id").and_then(Value::as_str) == Some(id)
}

fn find<'r>(records: &'r mut [Record], id: &str) -> Option<&'r mut Record> {
    records.iter_mut().find(|record| has_id(record, id))
}

fn remove(records: &mut Vec<Record>, id: &str) -> Option<Record> {
    let index = records.iter().position(|record| has_id(record, id))?;
    Some(records.remove(index))
}

fn page(items: &[Record]) -> Value {
    json!({
        "object": "list",
        "has_more": false,
        "total": items.len(),
        "data": items,
    })
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamp_assigns_prefixed_id() {
        let mut record = Record::new();
        let id = stamp(&mut record, "ord", "order");
        assert!(id.starts_with("ord_"));
        assert_eq!(record["id"], json!(id));
        assert_eq!(record["object"], "order");
        assert_eq!(record["livemode"], false);
    }

    #[test]
    fn merge_keeps_service_fields() {
        let mut record = Record::new();
        stamp(&mut record, "plan", "plan");
        let original_id = record["id"].clone();
        let changes = json!({ "id": "plan_hijack", "name": "new" });
        let Value::Object(changes) = changes else { unreachable!() };
        merge(&mut record, changes);
        assert_eq!(record["id"], original_id);
        assert_eq!(record["name"], "new");
    }

    #[test]
    fn order_total_adds_shipping_and_taxes_and_subtracts_discounts() {
        let mut entry = OrderEntry::default();
        let line = |value: Value| match value {
            Value::Object(record) => record,
            _ => unreachable!(),
        };
        entry
            .lines
            .insert("line_items", vec![line(json!({ "unit_price": 1000, "quantity": 2 }))]);
        entry.lines.insert("shipping_lines", vec![line(json!({ "amount": 300 }))]);
        entry.lines.insert("tax_lines", vec![line(json!({ "amount": 160 }))]);
        entry.lines.insert("discount_lines", vec![line(json!({ "amount": 100 }))]);
        entry.recompute();
        assert_eq!(entry.record["amount"], 2360);
    }

    #[test]
    fn order_total_saturates_on_huge_lines() {
        let mut entry = OrderEntry::default();
        let Value::Object(line) = json!({ "unit_price": u64::MAX, "quantity": 3 }) else { unreachable!() };
        entry.lines.insert("line_items", vec![line.clone(), line]);
        entry.recompute();
        assert_eq!(entry.record["amount"], u64::MAX);
    }

    #[test]
    fn page_wraps_items() {
        let value = page(&[Record::new()]);
        assert_eq!(value["object"], "list");
        assert_eq!(value["total"], 1);
        assert!(value["data"].is_array());
    }

    #[test]
    fn error_envelope_serializes_like_the_service() {
        let failure = ApiFailure::invalid("email", "bad email");
        let json = serde_json::to_value(&failure.body).unwrap();
        assert_eq!(json["type"], "parameter_validation_error");
        assert_eq!(json["details"][0]["params"], "email");
        assert_eq!(json["details"][0]["code"], "conekta.errors.parameter_validation_error.email");
        assert!(!json["log_id"].as_str().unwrap().is_empty());
    }
}
