//! Order state machine
//!
//! [`plan_transition`] is pure: it validates the edge against the adjacency
//! table and produces the next order plus its audit event. [`OrderLifecycle`]
//! loads the order, plans, and commits both through one
//! `RecordStore::commit_transition` call guarded on the previous status.

use super::error::TransitionError;
use crate::store::{RecordStore, StoreError};
use shared::models::{ActorContext, AuditDetails, AuditEvent, Order};
use shared::order::OrderStatus;
use std::sync::Arc;

/// Audit target type for order events
pub const ORDER_TARGET: &str = "order";

/// Action recorded for a scheduler auto-confirmation
pub const AUTO_CONFIRMED_ACTION: &str = "ORDER_AUTO_CONFIRMED";

/// Why the transition happens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionCause {
    /// Requested by a person, a device, or a system job for a plain edge
    Requested,
    /// SUBMITTED → QUEUED because nobody confirmed in time. Also stamps
    /// `auto_confirmed_at` and records a single `ORDER_AUTO_CONFIRMED` event.
    AutoConfirm,
}

/// Validated transition, ready to commit
#[derive(Debug, Clone)]
pub struct TransitionPlan {
    /// Status the commit is guarded on
    pub from: OrderStatus,
    pub order: Order,
    pub event: AuditEvent,
}

/// `ORDER_<TARGET>_<METHOD>`, METHOD being `SYSTEM` for the system actor
/// and `MANUAL` for people and devices
pub fn action_name(target: OrderStatus, actor: &ActorContext) -> String {
    let method = if actor.is_system() { "SYSTEM" } else { "MANUAL" };
    format!("ORDER_{}_{}", target.as_str(), method)
}

pub fn plan_transition(
    order: &Order,
    target: OrderStatus,
    actor: &ActorContext,
    cause: TransitionCause,
    now: i64,
) -> Result<TransitionPlan, TransitionError> {
    let from = order.status;
    let invalid = || TransitionError::InvalidTransition {
        order_id: order.id,
        current: from,
        attempted: target,
    };

    if !from.can_transition_to(target) {
        return Err(invalid());
    }
    if cause == TransitionCause::AutoConfirm
        && (from != OrderStatus::Submitted
            || target != OrderStatus::Queued
            || order.auto_confirmed_at.is_some())
    {
        return Err(invalid());
    }

    // Stamps never go backwards, even with a skewed clock
    let at = order.latest_stamp().map_or(now, |latest| latest.max(now));

    let mut next = order.clone();
    next.status = target;
    next.set_stamp(target, at);
    next.updated_at = at;

    let action = match cause {
        TransitionCause::AutoConfirm => {
            next.set_stamp(OrderStatus::AutoConfirmed, at);
            AUTO_CONFIRMED_ACTION.to_string()
        }
        TransitionCause::Requested => action_name(target, actor),
    };

    let event = AuditEvent::new(
        actor,
        action,
        ORDER_TARGET,
        order.id,
        AuditDetails::OrderTransition {
            from,
            to: target,
            at,
        },
        at,
    );

    Ok(TransitionPlan {
        from,
        order: next,
        event,
    })
}

/// Order transition service
#[derive(Clone)]
pub struct OrderLifecycle {
    store: Arc<dyn RecordStore>,
}

impl OrderLifecycle {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Move an order to `target` on behalf of `actor`
    pub async fn transition(
        &self,
        order_id: i64,
        target: OrderStatus,
        actor: &ActorContext,
    ) -> Result<Order, TransitionError> {
        self.apply(
            order_id,
            target,
            actor,
            TransitionCause::Requested,
            shared::util::now_millis(),
        )
        .await
    }

    /// Auto-confirm a stale SUBMITTED order straight into the queue
    pub async fn auto_confirm(&self, order_id: i64, now: i64) -> Result<Order, TransitionError> {
        self.apply(
            order_id,
            OrderStatus::Queued,
            &ActorContext::system(),
            TransitionCause::AutoConfirm,
            now,
        )
        .await
    }

    pub async fn apply(
        &self,
        order_id: i64,
        target: OrderStatus,
        actor: &ActorContext,
        cause: TransitionCause,
        now: i64,
    ) -> Result<Order, TransitionError> {
        let order = self
            .store
            .get_order(order_id)
            .await?
            .ok_or(TransitionError::OrderNotFound(order_id))?;

        let plan = plan_transition(&order, target, actor, cause, now)?;
        let action = plan.event.action.clone();

        match self
            .store
            .commit_transition(&plan.order, plan.from, plan.event)
            .await
        {
            Ok(updated) => {
                tracing::info!(
                    order_id,
                    from = %plan.from,
                    to = %target,
                    action = %action,
                    actor_id = actor.actor_id,
                    "Order transitioned"
                );
                Ok(updated)
            }
            Err(StoreError::StatusConflict { current, .. }) => {
                tracing::warn!(
                    order_id,
                    expected = %plan.from,
                    current = %current,
                    attempted = %target,
                    "Order status changed concurrently, transition rejected"
                );
                Err(TransitionError::InvalidTransition {
                    order_id,
                    current,
                    attempted: target,
                })
            }
            Err(StoreError::NotFound(_)) => Err(TransitionError::OrderNotFound(order_id)),
            Err(e) => Err(TransitionError::Store(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::ActorType;

    fn order(status: OrderStatus) -> Order {
        Order {
            id: 11,
            school_id: 2,
            reference_code: "PO-11".into(),
            status,
            total_students: 30,
            total_garments: 60,
            dark_garments: 30,
            light_garments: 30,
            total_amount: 900.0,
            submitted_at: Some(1_000),
            confirmed_at: None,
            auto_confirmed_at: None,
            queued_at: None,
            pickup_at: None,
            ongoing_at: None,
            done_at: None,
            packaging_at: None,
            delivery_at: None,
            completed_at: None,
            aborted_at: None,
            created_at: 1_000,
            updated_at: 1_000,
        }
    }

    #[test]
    fn test_manual_action_name() {
        let actor = ActorContext::human(3, "Lee");
        let plan = plan_transition(
            &order(OrderStatus::Submitted),
            OrderStatus::Confirmed,
            &actor,
            TransitionCause::Requested,
            2_000,
        )
        .unwrap();
        assert_eq!(plan.event.action, "ORDER_CONFIRMED_MANUAL");
        assert_eq!(plan.event.actor_type, ActorType::Human);
        assert_eq!(plan.order.confirmed_at, Some(2_000));
        assert_eq!(plan.from, OrderStatus::Submitted);
    }

    #[test]
    fn test_device_actor_is_manual() {
        let actor = ActorContext::device(9, "press-2");
        assert_eq!(action_name(OrderStatus::Ongoing, &actor), "ORDER_ONGOING_MANUAL");
        assert_eq!(
            action_name(OrderStatus::Aborted, &ActorContext::system()),
            "ORDER_ABORTED_SYSTEM"
        );
    }

    #[test]
    fn test_auto_confirm_stamps_both_columns() {
        let plan = plan_transition(
            &order(OrderStatus::Submitted),
            OrderStatus::Queued,
            &ActorContext::system(),
            TransitionCause::AutoConfirm,
            5_000,
        )
        .unwrap();
        assert_eq!(plan.order.status, OrderStatus::Queued);
        assert_eq!(plan.order.auto_confirmed_at, Some(5_000));
        assert_eq!(plan.order.queued_at, Some(5_000));
        assert_eq!(plan.event.action, AUTO_CONFIRMED_ACTION);
    }

    #[test]
    fn test_auto_confirm_rejects_already_confirmed() {
        let mut o = order(OrderStatus::Submitted);
        o.auto_confirmed_at = Some(1_500);
        let err = plan_transition(
            &o,
            OrderStatus::Queued,
            &ActorContext::system(),
            TransitionCause::AutoConfirm,
            5_000,
        )
        .unwrap_err();
        assert!(matches!(err, TransitionError::InvalidTransition { .. }));
    }

    #[test]
    fn test_skip_is_invalid() {
        let err = plan_transition(
            &order(OrderStatus::Submitted),
            OrderStatus::Ongoing,
            &ActorContext::human(1, "a"),
            TransitionCause::Requested,
            2_000,
        )
        .unwrap_err();
        match err {
            TransitionError::InvalidTransition {
                current, attempted, ..
            } => {
                assert_eq!(current, OrderStatus::Submitted);
                assert_eq!(attempted, OrderStatus::Ongoing);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_stamp_clamped_to_latest() {
        let mut o = order(OrderStatus::Confirmed);
        o.confirmed_at = Some(9_000);
        let plan = plan_transition(
            &o,
            OrderStatus::Queued,
            &ActorContext::human(1, "a"),
            TransitionCause::Requested,
            4_000,
        )
        .unwrap();
        assert_eq!(plan.order.queued_at, Some(9_000));
        assert!(plan.order.queued_at >= plan.order.confirmed_at);
    }

    #[test]
    fn test_terminal_rejects_abort() {
        let err = plan_transition(
            &order(OrderStatus::Completed),
            OrderStatus::Aborted,
            &ActorContext::human(1, "a"),
            TransitionCause::Requested,
            2_000,
        )
        .unwrap_err();
        assert!(matches!(err, TransitionError::InvalidTransition { .. }));
    }
}
