//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use shared::models::{ActorContext, ActorType, AuditEvent, MAX_GARMENT_COUNT, Order, OrderCreate};
use shared::order::OrderStatus;

use crate::core::ServerState;
use crate::orders::lifecycle::ORDER_TARGET;
use crate::store::AuditEventFilter;
use crate::utils::{AppError, AppResult, ErrorCode};

/// Transition request body
#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub target: OrderStatus,
    pub actor_id: i64,
    pub actor_name: String,
    /// HUMAN (default) or DEVICE; SYSTEM is reserved for the scheduler
    #[serde(default)]
    pub actor_type: Option<ActorType>,
}

impl TransitionRequest {
    fn actor(&self) -> AppResult<ActorContext> {
        match self.actor_type.unwrap_or(ActorType::Human) {
            ActorType::Human => Ok(ActorContext::human(self.actor_id, &self.actor_name)),
            ActorType::Device => Ok(ActorContext::device(self.actor_id, &self.actor_name)),
            ActorType::System => Err(AppError::validation(
                "SYSTEM actor is reserved for scheduled transitions",
            )),
        }
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<Order>> {
    if payload.reference_code.trim().is_empty() {
        return Err(AppError::validation("reference_code must not be empty"));
    }
    if payload.dark_garments < 0 || payload.light_garments < 0 || payload.total_students < 0 {
        return Err(AppError::with_message(
            ErrorCode::NegativeGarmentCount,
            "Counts must be non-negative",
        ));
    }
    for (field, value) in [
        ("dark_garments", payload.dark_garments),
        ("light_garments", payload.light_garments),
    ] {
        if value > MAX_GARMENT_COUNT {
            return Err(AppError::validation(format!(
                "{field} must not exceed {MAX_GARMENT_COUNT}"
            ))
            .with_detail("field", field)
            .with_detail("value", value));
        }
    }

    let order = payload.into_order(shared::util::now_millis());
    let order = state.store.insert_order(order).await?;
    tracing::info!(order_id = order.id, reference = %order.reference_code, status = %order.status, "Order created");
    Ok(Json(order))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Order>> {
    let order = state.store.get_order(id).await?.ok_or_else(|| {
        AppError::with_message(ErrorCode::OrderNotFound, format!("Order {id} not found"))
            .with_detail("order_id", id)
    })?;
    Ok(Json(order))
}

pub async fn transition(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<TransitionRequest>,
) -> AppResult<Json<Order>> {
    let actor = payload.actor()?;
    let order = state.lifecycle.transition(id, payload.target, &actor).await?;
    Ok(Json(order))
}

pub async fn list_events(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<AuditEvent>>> {
    let events = state
        .store
        .list_audit_events(&AuditEventFilter::for_target(ORDER_TARGET, id))
        .await?;
    Ok(Json(events))
}
