use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, ErrorBody};
use serde_json::{json, Value};
use tower::ServiceExt;

// base64("key_test:")
const AUTHORIZATION: &str = "Basic a2V5X3Rlc3Q6";
const ACCEPT: &str = "application/vnd.conekta-v2.0.0+json";

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .header(http::header::ACCEPT, ACCEPT)
        .header(http::header::AUTHORIZATION, AUTHORIZATION)
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::ACCEPT, ACCEPT)
        .header(http::header::AUTHORIZATION, AUTHORIZATION)
        .body(String::new())
        .unwrap()
}

async fn call(app: &mut axum::routing::RouterIntoService<String>, request: Request<String>) -> axum::response::Response {
    use tower::Service;

    ServiceExt::<Request<String>>::ready(app).await.unwrap().call(request).await.unwrap()
}

// --- auth ---

#[tokio::test]
async fn missing_credential_returns_authentication_error() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/plans")
                .header(http::header::ACCEPT, ACCEPT)
                .body(r#"{"name":"gold","amount":100}"#.to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let err: ErrorBody = body_json(resp).await;
    assert_eq!(err.error_type, "authentication_error");
}

#[tokio::test]
async fn empty_key_is_rejected() {
    // base64(":")
    let resp = app()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/plans/plan_1")
                .header(http::header::ACCEPT, ACCEPT)
                .header(http::header::AUTHORIZATION, "Basic Og==")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unversioned_accept_is_rejected() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/plans/plan_1")
                .header(http::header::ACCEPT, "application/json")
                .header(http::header::AUTHORIZATION, AUTHORIZATION)
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_ACCEPTABLE);
    let err: ErrorBody = body_json(resp).await;
    assert_eq!(err.details[0].params, "accept");
}

// --- plans ---

#[tokio::test]
async fn create_plan_returns_200_with_id() {
    let resp = app()
        .oneshot(json_request("POST", "/plans", r#"{"name":"gold","amount":5000,"interval":"month"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let plan: Value = body_json(resp).await;
    assert!(plan["id"].as_str().unwrap().starts_with("plan_"));
    assert_eq!(plan["object"], "plan");
    assert_eq!(plan["amount"], 5000);
}

#[tokio::test]
async fn create_plan_without_amount_is_a_validation_error() {
    let resp = app()
        .oneshot(json_request("POST", "/plans", r#"{"name":"gold"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let err: ErrorBody = body_json(resp).await;
    assert_eq!(err.error_type, "parameter_validation_error");
    assert_eq!(err.details[0].params, "amount");
}

#[tokio::test]
async fn malformed_json_returns_envelope() {
    let resp = app()
        .oneshot(json_request("POST", "/plans", "{not json"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let err: ErrorBody = body_json(resp).await;
    assert_eq!(err.error_type, "malformed_request_error");
}

#[tokio::test]
async fn update_unknown_plan_is_not_found() {
    let resp = app()
        .oneshot(json_request("PUT", "/plans/plan_missing", r#"{"name":"x"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let err: ErrorBody = body_json(resp).await;
    assert_eq!(err.error_type, "resource_not_found_error");
}

// --- customers ---

#[tokio::test]
async fn create_customer_with_bad_email_names_the_field() {
    let resp = app()
        .oneshot(json_request("POST", "/customers", r#"{"name":"jose","email":"not-an-email"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let err: ErrorBody = body_json(resp).await;
    assert_eq!(err.details[0].params, "email");
}

#[tokio::test]
async fn customer_lifecycle() {
    let mut app = app().into_service();

    let resp = call(
        &mut app,
        json_request("POST", "/customers", r#"{"name":"jose","email":"jose@mail.com","phone":"+5215542537676"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let customer: Value = body_json(resp).await;
    let id = customer["id"].as_str().unwrap().to_string();
    assert_eq!(customer["payment_sources"]["object"], "list");

    // bogus token
    let resp = call(
        &mut app,
        json_request("POST", &format!("/customers/{id}/payment_sources"), r#"{"type":"card","token_id":"tok_foobar123"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // test token
    let resp = call(
        &mut app,
        json_request(
            "POST",
            &format!("/customers/{id}/payment_sources"),
            r#"{"type":"card","token_id":"tok_test_visa_4242"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let source: Value = body_json(resp).await;
    assert_eq!(source["parent_id"], json!(id));

    // update
    let resp = call(&mut app, json_request("PUT", &format!("/customers/{id}"), r#"{"email":"nuevo@mail.com"}"#)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = body_json(resp).await;
    assert_eq!(updated["email"], "nuevo@mail.com");
    assert_eq!(updated["name"], "jose");
    assert_eq!(updated["payment_sources"]["total"], 1);

    // delete, then delete again
    let resp = call(&mut app, empty_request("DELETE", &format!("/customers/{id}"))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = call(&mut app, empty_request("DELETE", &format!("/customers/{id}"))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn subscription_lifecycle() {
    let mut app = app().into_service();

    let resp = call(&mut app, json_request("POST", "/plans", r#"{"name":"gold","amount":5000,"trial_period_days":10}"#)).await;
    let plan: Value = body_json(resp).await;
    let plan_id = plan["id"].as_str().unwrap().to_string();

    let resp = call(&mut app, json_request("POST", "/customers", r#"{"name":"ana","email":"ana@mail.com"}"#)).await;
    let customer: Value = body_json(resp).await;
    let id = customer["id"].as_str().unwrap().to_string();

    let resp = call(
        &mut app,
        json_request("POST", &format!("/customers/{id}/subscription"), &json!({ "plan": plan_id }).to_string()),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let subscription: Value = body_json(resp).await;
    assert_eq!(subscription["status"], "in_trial");
    let sub_id = subscription["id"].as_str().unwrap().to_string();

    let resp = call(
        &mut app,
        json_request("POST", &format!("/customers/{id}/subscription/pause"), &json!({ "id": sub_id }).to_string()),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let paused: Value = body_json(resp).await;
    assert_eq!(paused["status"], "paused");

    let resp = call(
        &mut app,
        json_request("POST", &format!("/customers/{id}/subscription/cancel"), &json!({ "id": sub_id }).to_string()),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = call(
        &mut app,
        json_request("POST", &format!("/customers/{id}/subscription/resume"), &json!({ "id": sub_id }).to_string()),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- orders ---

#[tokio::test]
async fn order_lines_and_refund() {
    let mut app = app().into_service();

    let order = json!({
        "currency": "MXN",
        "customer_info": { "name": "jose", "email": "jose@mail.com", "phone": "+5215542537676" },
        "line_items": [{ "name": "Box", "unit_price": 1000, "quantity": 2 }],
        "pre_authorize": true
    });
    let resp = call(&mut app, json_request("POST", "/orders", &order.to_string())).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let created: Value = body_json(resp).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["amount"], 2000);
    assert_eq!(created["payment_status"], "pre_authorized");
    assert_eq!(created["line_items"]["data"][0]["object"], "line_item");

    let resp = call(
        &mut app,
        json_request("POST", &format!("/orders/{id}/shipping_lines"), r#"{"amount":300,"carrier":"Fedex"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let line: Value = body_json(resp).await;
    let line_id = line["id"].as_str().unwrap().to_string();
    assert!(line_id.starts_with("ship_lin_"));

    let resp = call(
        &mut app,
        json_request("PUT", &format!("/orders/{id}/shipping_lines/{line_id}"), r#"{"amount":500}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    // refund before capture is refused
    let resp = call(
        &mut app,
        json_request("POST", &format!("/orders/{id}/refunds"), r#"{"reason":"requested_by_client"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let resp = call(&mut app, empty_request("POST", &format!("/orders/{id}/capture"))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let captured: Value = body_json(resp).await;
    assert_eq!(captured["payment_status"], "paid");
    assert_eq!(captured["amount"], 2500);

    let resp = call(
        &mut app,
        json_request("POST", &format!("/orders/{id}/refunds"), r#"{"reason":"requested_by_client","amount":500}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let refunded: Value = body_json(resp).await;
    assert_eq!(refunded["payment_status"], "partially_refunded");
    assert_eq!(refunded["amount_refunded"], 500);

    let resp = call(&mut app, empty_request("DELETE", &format!("/orders/{id}/shipping_lines/{line_id}"))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = call(&mut app, empty_request("DELETE", &format!("/orders/{id}/shipping_lines/{line_id}"))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn order_without_line_items_is_rejected() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/orders",
            r#"{"currency":"MXN","customer_info":{"customer_id":"cus_1"}}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let err: ErrorBody = body_json(resp).await;
    assert_eq!(err.details[0].params, "line_items");
}
