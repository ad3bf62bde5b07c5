//! Audit API
//!
//! | Path | Method | Meaning |
//! |------|--------|---------|
//! | /api/students/{id}/audit | POST | Publish collected counts for a student |
//! | /api/audit-reports/{id} | GET | Report with its student audits |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub use handler::PublishAuditRequest;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/students/{id}/audit", post(handler::publish))
        .route("/api/audit-reports/{id}", get(handler::get_report))
}
