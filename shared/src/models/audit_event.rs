//! Audit Trail Model
//!
//! Entries are immutable once written. Only the retention sweep removes them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::order::OrderStatus;

/// Who performed an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorType {
    Human,
    System,
    Device,
}

/// Acting identity attached to transitions and audit events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    pub actor_type: ActorType,
    pub actor_id: i64,
    pub actor_name: String,
}

impl ActorContext {
    pub const SYSTEM_ID: i64 = 0;

    /// Synthetic actor used by the scheduler
    pub fn system() -> Self {
        Self {
            actor_type: ActorType::System,
            actor_id: Self::SYSTEM_ID,
            actor_name: "system".to_string(),
        }
    }

    pub fn human(actor_id: i64, actor_name: impl Into<String>) -> Self {
        Self {
            actor_type: ActorType::Human,
            actor_id,
            actor_name: actor_name.into(),
        }
    }

    pub fn device(actor_id: i64, actor_name: impl Into<String>) -> Self {
        Self {
            actor_type: ActorType::Device,
            actor_id,
            actor_name: actor_name.into(),
        }
    }

    pub fn is_system(&self) -> bool {
        self.actor_type == ActorType::System
    }
}

/// Structured event payload, one variant per event kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditDetails {
    OrderTransition {
        from: OrderStatus,
        to: OrderStatus,
        /// Stamp written for `to`
        at: i64,
    },
    StudentAuditPublished {
        student_id: i64,
        audit_report_id: i64,
        dark_delta: i64,
        light_delta: i64,
        has_discrepancy: bool,
    },
}

/// Immutable audit trail entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AuditEvent {
    pub id: i64,
    /// Unix millis
    pub timestamp: i64,
    pub actor_type: ActorType,
    pub actor_id: i64,
    pub actor_name: String,
    /// e.g. `ORDER_QUEUED_MANUAL`, `ORDER_AUTO_CONFIRMED`
    pub action: String,
    /// e.g. `order`, `student`
    pub target_type: String,
    pub target_id: i64,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub details: AuditDetails,
    /// Free-form metadata (`null` when absent)
    #[cfg_attr(feature = "db", sqlx(json))]
    pub extra: Value,
}

impl AuditEvent {
    /// Build an event stamped with `timestamp`. The id is assigned on insert.
    pub fn new(
        actor: &ActorContext,
        action: impl Into<String>,
        target_type: impl Into<String>,
        target_id: i64,
        details: AuditDetails,
        timestamp: i64,
    ) -> Self {
        Self {
            id: 0,
            timestamp,
            actor_type: actor.actor_type,
            actor_id: actor.actor_id,
            actor_name: actor.actor_name.clone(),
            action: action.into(),
            target_type: target_type.into(),
            target_id,
            details,
            extra: Value::Null,
        }
    }

    pub fn with_extra(mut self, extra: Value) -> Self {
        self.extra = extra;
        self
    }
}
