use crate::store::StoreError;
use shared::error::{AppError, ErrorCode};
use shared::order::OrderStatus;
use thiserror::Error;

/// Order transition errors
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("Order not found: {0}")]
    OrderNotFound(i64),

    /// The current status does not allow the requested target. Not retried.
    #[error("Invalid transition for order {order_id}: {current} -> {attempted}")]
    InvalidTransition {
        order_id: i64,
        current: OrderStatus,
        attempted: OrderStatus,
    },

    #[error("Store failure: {0}")]
    Store(#[from] StoreError),
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::OrderNotFound(id) => {
                AppError::with_message(ErrorCode::OrderNotFound, format!("Order {id} not found"))
                    .with_detail("order_id", id)
            }
            TransitionError::InvalidTransition {
                order_id,
                current,
                attempted,
            } => AppError::with_message(
                ErrorCode::InvalidTransition,
                format!("Order {order_id} cannot move from {current} to {attempted}"),
            )
            .with_detail("order_id", order_id)
            .with_detail("current", current.as_str())
            .with_detail("attempted", attempted.as_str()),
            TransitionError::Store(e) => {
                tracing::error!(error = %e, "Store failure during transition");
                AppError::database(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_reports_both_states() {
        let err: AppError = TransitionError::InvalidTransition {
            order_id: 4,
            current: OrderStatus::Submitted,
            attempted: OrderStatus::Ongoing,
        }
        .into();
        assert_eq!(err.code, ErrorCode::InvalidTransition);
        let details = err.details.unwrap();
        assert_eq!(details["current"], "SUBMITTED");
        assert_eq!(details["attempted"], "ONGOING");
    }

    #[test]
    fn test_store_failure_is_database_error() {
        let err: AppError = TransitionError::Store(StoreError::Database("disk".into())).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }
}
