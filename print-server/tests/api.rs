//! HTTP surface, driven through the router without a socket

mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use common::*;
use http_body_util::BodyExt;
use print_server::notify::LogSink;
use print_server::{Config, MemoryStore, RecordStore, ServerState, build_router};
use serde_json::{Value, json};
use shared::order::OrderStatus;
use std::sync::Arc;
use tower::ServiceExt;

fn app(store: Arc<MemoryStore>) -> Router {
    let config = Config::with_overrides("/tmp/uniform-print-test", 0);
    build_router(ServerState::with_store(config, store, Arc::new(LogSink)))
}

async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(app(memory_store()), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_create_then_fetch_order() {
    let store = memory_store();
    let (status, created) = send(
        app(store.clone()),
        "POST",
        "/api/orders",
        Some(json!({
            "school_id": 4,
            "reference_code": "PO-2024-118",
            "dark_garments": 12,
            "light_garments": 8,
            "submitted_at": NOW
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["status"], "SUBMITTED");
    assert_eq!(created["total_garments"], 20);

    let id = created["id"].as_i64().unwrap();
    let (status, fetched) = send(app(store), "GET", &format!("/api/orders/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["reference_code"], "PO-2024-118");
}

#[tokio::test]
async fn test_create_rejects_negative_counts() {
    let (status, body) = send(
        app(memory_store()),
        "POST",
        "/api/orders",
        Some(json!({
            "school_id": 4,
            "reference_code": "PO-1",
            "dark_garments": -1,
            "submitted_at": null
        })),
    )
    .await;
    assert!(status.is_client_error());
    assert!(body["code"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn test_create_rejects_oversized_counts() {
    let (status, body) = send(
        app(memory_store()),
        "POST",
        "/api/orders",
        Some(json!({
            "school_id": 4,
            "reference_code": "PO-2",
            "dark_garments": i64::MAX,
            "light_garments": i64::MAX,
            "submitted_at": NOW
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "dark_garments");
}

#[tokio::test]
async fn test_missing_order_is_404() {
    let (status, body) = send(app(memory_store()), "GET", "/api/orders/9", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["details"]["order_id"], 9);
}

#[tokio::test]
async fn test_invalid_transition_is_conflict_with_states() {
    let store = memory_store();
    let order = seed_order(store.as_ref(), Some(NOW)).await;

    let (status, body) = send(
        app(store.clone()),
        "POST",
        &format!("/api/orders/{}/transition", order.id),
        Some(json!({ "target": "ONGOING", "actor_id": 2, "actor_name": "Ana" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["details"]["current"], "SUBMITTED");
    assert_eq!(body["details"]["attempted"], "ONGOING");

    let (_, events) = send(
        app(store),
        "GET",
        &format!("/api/orders/{}/events", order.id),
        None,
    )
    .await;
    assert_eq!(events.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_transition_and_events() {
    let store = memory_store();
    let order = seed_order(store.as_ref(), Some(NOW)).await;

    let (status, body) = send(
        app(store.clone()),
        "POST",
        &format!("/api/orders/{}/transition", order.id),
        Some(json!({ "target": "CONFIRMED", "actor_id": 2, "actor_name": "Ana" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "CONFIRMED");

    let (_, events) = send(
        app(store),
        "GET",
        &format!("/api/orders/{}/events", order.id),
        None,
    )
    .await;
    let events = events.as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["action"], "ORDER_CONFIRMED_MANUAL");
}

#[tokio::test]
async fn test_system_actor_not_accepted_from_clients() {
    let store = memory_store();
    let order = seed_order(store.as_ref(), Some(NOW)).await;
    let (status, _) = send(
        app(store.clone()),
        "POST",
        &format!("/api/orders/{}/transition", order.id),
        Some(json!({
            "target": "CONFIRMED",
            "actor_id": 0,
            "actor_name": "cron",
            "actor_type": "SYSTEM"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let stored = store.get_order(order.id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Submitted);
}

#[tokio::test]
async fn test_publish_audit_then_read_report() {
    let store = memory_store();
    let order = seed_order(store.as_ref(), Some(NOW)).await;
    let class = seed_class(store.as_ref(), order.id, "2A").await;
    let student = seed_student(store.as_ref(), &class, "Noa", 2, 1).await;

    let (status, audit) = send(
        app(store.clone()),
        "POST",
        &format!("/api/students/{}/audit", student.id),
        Some(json!({
            "auditor_id": 31,
            "auditor_name": "Pau",
            "collected_dark": 2,
            "collected_light": 0,
            "notes": "missing tee"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(audit["has_discrepancy"], true);
    assert_eq!(audit["light_delta"], -1);

    let report_id = audit["audit_report_id"].as_i64().unwrap();
    let (status, report) = send(
        app(store),
        "GET",
        &format!("/api/audit-reports/{report_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["students_with_discrepancies"], 1);
    assert_eq!(report["discrepancies_found"], true);
    assert_eq!(report["student_audits"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_publish_for_unknown_student_is_404() {
    let (status, _) = send(
        app(memory_store()),
        "POST",
        "/api/students/77/audit",
        Some(json!({
            "auditor_id": 31,
            "auditor_name": "Pau",
            "collected_dark": 1,
            "collected_light": 1
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_manual_sweep_returns_report() {
    let (status, body) = send(app(memory_store()), "POST", "/api/scheduler/sweep", None).await;
    assert_eq!(status, StatusCode::OK);
    let jobs_run = body["jobs_run"].as_array().unwrap();
    assert_eq!(jobs_run.len(), 5);
    assert_eq!(jobs_run[0], "auto_confirm");
    assert_eq!(jobs_run[4], "audit_retention");
    assert_eq!(body["outcomes"].as_array().unwrap().len(), 5);
    assert_eq!(body["outcomes"][0]["job"], "auto_confirm");
}

#[tokio::test]
async fn test_heartbeat() {
    let store = memory_store();
    let (status, _) = send(app(store.clone()), "POST", "/api/machines/5/heartbeat", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let machine = seed_machine(store.as_ref(), NOW - 60 * 60_000).await;
    let (status, body) = send(
        app(store),
        "POST",
        &format!("/api/machines/{}/heartbeat", machine.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_online"], true);
    assert!(body["last_seen_at"].as_i64().unwrap() > NOW);
}
