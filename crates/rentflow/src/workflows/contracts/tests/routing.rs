use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::workflows::contracts::router::contract_router;
use crate::workflows::contracts::service::ContractDeskService;

fn build_router() -> (axum::Router, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::seeded());
    let service = Arc::new(ContractDeskService::new(repository.clone(), desk_config()));
    (contract_router(service), repository)
}

fn submission_body() -> Value {
    json!({
        "tenant": "t-001",
        "property": "p-001",
        "lease": "l-001",
        "contract_type": "residential",
        "purpose": "Primary residence",
        "start_date": "2025-09-01",
        "end_date": "2026-08-31",
        "amount": 500_000,
        "security_deposit": 1_000_000,
        "payment_method": "mobile_money",
        "payment_frequency": "monthly",
    })
}

async fn post_json(router: &axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("serialize body")))
        .expect("request");

    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router dispatch");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body");
    let payload: Value = serde_json::from_slice(&bytes).expect("json");
    (status, payload)
}

async fn get_json(router: &axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router dispatch");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body");
    let payload: Value = serde_json::from_slice(&bytes).expect("json");
    (status, payload)
}

#[tokio::test]
async fn post_contracts_creates_and_returns_the_status_view() {
    let (router, repository) = build_router();

    let (status, payload) = post_json(&router, "/api/v1/contracts", submission_body()).await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(payload.get("contract_id").is_some());
    assert_eq!(
        payload.get("stage").and_then(Value::as_str),
        Some("Pending tenant signature"),
    );
    assert_eq!(
        payload.get("tenant_name").and_then(Value::as_str),
        Some("Jean Kouassi"),
    );
    assert_eq!(repository.create_calls(), 1);
}

#[tokio::test]
async fn post_contracts_surfaces_field_errors_without_touching_the_store() {
    let (router, repository) = build_router();
    let body = json!({
        "tenant": "t-001",
        "property": "p-001",
        "contract_type": "residential",
        "amount": 0,
    });

    let (status, payload) = post_json(&router, "/api/v1/contracts", body).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let errors = payload.get("errors").expect("errors payload");
    assert!(errors.get("amount").is_some());
    assert!(errors.get("start_date").is_some());
    assert_eq!(repository.create_calls(), 0);
}

#[tokio::test]
async fn post_contracts_maps_transport_failure_to_bad_gateway() {
    let (router, repository) = build_router();
    repository.set_unavailable(true);

    let (status, payload) = post_json(&router, "/api/v1/contracts", submission_body()).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(payload.get("retry"), Some(&json!(true)));
}

#[tokio::test]
async fn get_unknown_contract_is_not_found() {
    let (router, _) = build_router();

    let (status, payload) = get_json(&router, "/api/v1/contracts/c-9999").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(payload.get("error").is_some());
}

#[tokio::test]
async fn approval_screen_renders_the_signed_record() {
    let (router, repository) = build_router();
    let (_, created) = post_json(&router, "/api/v1/contracts", submission_body()).await;
    let contract_id = created
        .get("contract_id")
        .and_then(Value::as_str)
        .expect("contract id")
        .to_string();
    repository.record_tenant_signature(
        &crate::workflows::contracts::ContractId(contract_id.clone()),
        "dGVuYW50LXNpZ25hdHVyZQ==",
    );

    let (status, payload) = get_json(&router, &format!("/api/v1/contracts/{contract_id}")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        payload.get("tenant_signature").and_then(Value::as_str),
        Some("dGVuYW50LXNpZ25hdHVyZQ=="),
    );
    assert_eq!(payload.get("awaiting_owner_approval"), Some(&json!(true)));
    assert_eq!(payload.get("monthly_rent"), Some(&json!(500_000)));
}

#[tokio::test]
async fn posting_strokes_approves_the_contract() {
    let (router, repository) = build_router();
    let (_, created) = post_json(&router, "/api/v1/contracts", submission_body()).await;
    let contract_id = created
        .get("contract_id")
        .and_then(Value::as_str)
        .expect("contract id")
        .to_string();
    repository.record_tenant_signature(
        &crate::workflows::contracts::ContractId(contract_id.clone()),
        "dGVuYW50LXNpZ25hdHVyZQ==",
    );

    let body = json!({
        "strokes": [
            [
                {"x": 12.0, "y": 8.0},
                {"x": 60.0, "y": 30.0},
                {"x": 104.0, "y": 14.0},
            ],
        ],
    });
    let (status, payload) = post_json(
        &router,
        &format!("/api/v1/contracts/{contract_id}/approval"),
        body,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload.get("stage").and_then(Value::as_str), Some("Active"));
    assert_eq!(repository.approve_calls(), 1);
}

#[tokio::test]
async fn blank_strokes_are_refused_before_the_store_is_called() {
    let (router, repository) = build_router();
    let (_, created) = post_json(&router, "/api/v1/contracts", submission_body()).await;
    let contract_id = created
        .get("contract_id")
        .and_then(Value::as_str)
        .expect("contract id")
        .to_string();
    repository.record_tenant_signature(
        &crate::workflows::contracts::ContractId(contract_id.clone()),
        "dGVuYW50LXNpZ25hdHVyZQ==",
    );

    let body = json!({ "strokes": [] });
    let (status, payload) = post_json(
        &router,
        &format!("/api/v1/contracts/{contract_id}/approval"),
        body,
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(payload
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .contains("blank"));
    assert_eq!(repository.approve_calls(), 0);
}
