//! Order API
//!
//! | Path | Method | Meaning |
//! |------|--------|---------|
//! | /api/orders | POST | Create an order (draft or submitted) |
//! | /api/orders/{id} | GET | Order with its status stamps |
//! | /api/orders/{id}/transition | POST | Request a status change |
//! | /api/orders/{id}/events | GET | Audit trail of the order |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub use handler::TransitionRequest;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/transition", post(handler::transition))
        .route("/{id}/events", get(handler::list_events))
}
