use crate::orders::OrderLifecycle;
use crate::scheduler::{AUTO_CONFIRM_AFTER, JobRun, SweepJob, SweepJobError, millis};
use crate::store::{OrderFilter, RecordStore};

/// Confirm SUBMITTED orders nobody acted on within [`AUTO_CONFIRM_AFTER`]
///
/// The lifecycle stamps `auto_confirmed_at` in the same commit as the status
/// change, so an order is never picked up twice.
pub async fn run(
    store: &dyn RecordStore,
    lifecycle: &OrderLifecycle,
    now: i64,
) -> Result<JobRun, SweepJobError> {
    let cutoff = now - millis(AUTO_CONFIRM_AFTER);
    let orders = store
        .list_orders(&OrderFilter::awaiting_auto_confirm(cutoff))
        .await?;

    let mut run = JobRun::new(SweepJob::AutoConfirm);
    run.outcome.examined = orders.len() as u64;

    for order in orders {
        match lifecycle.auto_confirm(order.id, now).await {
            Ok(_) => run.outcome.applied += 1,
            Err(e) => {
                tracing::warn!(order_id = order.id, error = %e, "Auto-confirm failed");
                run.fail(Some(order.id), e.to_string());
            }
        }
    }

    if run.outcome.applied > 0 {
        tracing::info!(count = run.outcome.applied, "Auto-confirmed stale orders");
    }
    Ok(run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use shared::models::{Order, OrderCreate};
    use shared::order::OrderStatus;
    use shared::util::HOUR_MS;
    use std::sync::Arc;

    const NOW: i64 = 1_700_000_000_000;

    fn submitted(id: i64, submitted_at: i64) -> Order {
        let mut order = OrderCreate {
            school_id: 1,
            reference_code: format!("PO-{id}"),
            total_students: 1,
            dark_garments: 1,
            light_garments: 1,
            total_amount: 0.0,
            submitted_at: Some(submitted_at),
        }
        .into_order(submitted_at);
        order.id = id;
        order
    }

    #[tokio::test]
    async fn test_only_stale_orders_confirmed() {
        let store = Arc::new(MemoryStore::new());
        store.put_order(submitted(1, NOW - 25 * HOUR_MS));
        store.put_order(submitted(2, NOW - 23 * HOUR_MS));
        let lifecycle = OrderLifecycle::new(store.clone());

        let run = run(store.as_ref(), &lifecycle, NOW).await.unwrap();
        assert_eq!(run.outcome.examined, 1);
        assert_eq!(run.outcome.applied, 1);

        let old = store.get_order(1).await.unwrap().unwrap();
        assert_eq!(old.status, OrderStatus::Queued);
        assert_eq!(old.auto_confirmed_at, Some(NOW));
        let fresh = store.get_order(2).await.unwrap().unwrap();
        assert_eq!(fresh.status, OrderStatus::Submitted);
    }

    #[tokio::test]
    async fn test_commit_failure_recorded_per_order() {
        let store = Arc::new(MemoryStore::new());
        store.put_order(submitted(1, NOW - 30 * HOUR_MS));
        store.put_order(submitted(2, NOW - 30 * HOUR_MS));
        store.fail_on_record("commit_transition", 1);
        let lifecycle = OrderLifecycle::new(store.clone());

        let run = run(store.as_ref(), &lifecycle, NOW).await.unwrap();
        assert_eq!(run.outcome.applied, 1);
        assert_eq!(run.errors.len(), 1);
        assert_eq!(run.errors[0].record_id, Some(1));
    }
}
