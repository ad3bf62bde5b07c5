//! Webhook sink against a local receiver

mod common;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use common::*;
use parking_lot::Mutex;
use print_server::notify::{NotificationSink, SinkError, WebhookSink};
use print_server::{RecordStore, Scheduler};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

type Received = Arc<Mutex<Vec<Value>>>;

async fn accept(State(received): State<Received>, Json(body): Json<Value>) -> StatusCode {
    received.lock().push(body);
    StatusCode::NO_CONTENT
}

async fn refuse() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "mailer down")
}

/// Serve `router` on an ephemeral port and return its base URL
async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_webhook_posts_recipient_batch() {
    let received: Received = Arc::default();
    let base = serve(
        Router::new()
            .route("/hook", post(accept))
            .with_state(received.clone()),
    )
    .await;

    let store = memory_store();
    let a = seed_notification(store.as_ref(), 42, NOW - 2_000).await;
    let b = seed_notification(store.as_ref(), 42, NOW - 1_000).await;

    let sink = WebhookSink::new(format!("{base}/hook"), Duration::from_secs(5)).unwrap();
    sink.deliver(42, &[a.clone(), b.clone()]).await.unwrap();

    let received = received.lock();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0]["recipient_id"], 42);
    let ids: Vec<i64> = received[0]["notifications"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![a.id, b.id]);
}

#[tokio::test]
async fn test_webhook_non_success_is_rejected() {
    let base = serve(Router::new().route("/hook", post(refuse))).await;
    let sink = WebhookSink::new(format!("{base}/hook"), Duration::from_secs(5)).unwrap();

    let store = memory_store();
    let n = seed_notification(store.as_ref(), 7, NOW).await;
    let err = sink.deliver(7, &[n]).await.unwrap_err();
    match err {
        SinkError::Rejected { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "mailer down");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_refused_batch_stays_pending_through_sweep() {
    let base = serve(Router::new().route("/hook", post(refuse))).await;
    let sink = WebhookSink::new(format!("{base}/hook"), Duration::from_secs(5)).unwrap();

    let store = memory_store();
    let n = seed_notification(store.as_ref(), 7, NOW - 1_000).await;
    let scheduler = Scheduler::new(store.clone(), Arc::new(sink), chrono_tz::Tz::UTC);
    let report = scheduler.run_sweep_at(NOW).await;

    assert!(report.is_clean());
    let outcome = report
        .outcome(print_server::SweepJob::NotificationBatch)
        .unwrap();
    assert_eq!(outcome.examined, 1);
    assert_eq!(outcome.failed, 1);

    let pending = store.list_pending_notifications(100).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, n.id);
}
