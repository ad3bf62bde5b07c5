//! Scheduler API
//!
//! | Path | Method | Meaning |
//! |------|--------|---------|
//! | /api/scheduler/sweep | POST | Run one sweep now and return its report |

use axum::{Json, Router, extract::State, routing::post};

use crate::core::ServerState;
use crate::scheduler::SweepReport;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/scheduler/sweep", post(sweep))
}

/// Per-job failures are part of the report, not an error response
async fn sweep(State(state): State<ServerState>) -> Json<SweepReport> {
    let report = state.scheduler.run_sweep().await;
    tracing::info!(
        jobs = report.jobs_run.len(),
        errors = report.errors.len(),
        "Manual sweep finished"
    );
    Json(report)
}
