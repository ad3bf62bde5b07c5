//! Machine API
//!
//! | Path | Method | Meaning |
//! |------|--------|---------|
//! | /api/machines/{id} | GET | Machine state |
//! | /api/machines/{id}/heartbeat | POST | Record a heartbeat, bringing the machine online |

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use shared::models::Machine;

use crate::core::ServerState;
use crate::utils::{AppError, AppResult, ErrorCode};

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/machines/{id}", get(get_by_id))
        .route("/api/machines/{id}/heartbeat", post(heartbeat))
}

fn machine_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::MachineNotFound, format!("Machine {id} not found"))
        .with_detail("machine_id", id)
}

async fn get_by_id(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<Json<Machine>> {
    let machine = state
        .store
        .get_machine(id)
        .await?
        .ok_or_else(|| machine_not_found(id))?;
    Ok(Json(machine))
}

async fn heartbeat(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<Json<Machine>> {
    if !state.store.touch_machine(id, shared::util::now_millis()).await? {
        return Err(machine_not_found(id));
    }
    tracing::debug!(machine_id = id, "Heartbeat received");
    get_by_id(State(state), Path(id)).await
}
