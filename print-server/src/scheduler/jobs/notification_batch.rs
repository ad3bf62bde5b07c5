use shared::models::Notification;
use std::collections::BTreeMap;

use crate::notify::NotificationSink;
use crate::scheduler::{JobRun, NOTIFICATION_BATCH_LIMIT, SweepJob, SweepJobError};
use crate::store::RecordStore;

/// Group pending notifications by recipient, ascending recipient id
pub fn group_by_recipient(pending: Vec<Notification>) -> BTreeMap<i64, Vec<Notification>> {
    let mut groups: BTreeMap<i64, Vec<Notification>> = BTreeMap::new();
    for n in pending {
        groups.entry(n.recipient_id).or_default().push(n);
    }
    groups
}

/// Hand undelivered notifications to the sink, one batch per recipient
///
/// A batch is marked delivered only after the sink accepts it. A rejected
/// batch stays pending for the next sweep; it counts as `failed` in the
/// outcome and is not a sweep error, since redelivery is the normal path.
pub async fn run(
    store: &dyn RecordStore,
    sink: &dyn NotificationSink,
    now: i64,
) -> Result<JobRun, SweepJobError> {
    let pending = store
        .list_pending_notifications(NOTIFICATION_BATCH_LIMIT)
        .await?;

    let mut run = JobRun::new(SweepJob::NotificationBatch);
    run.outcome.examined = pending.len() as u64;
    let mut deferred: u64 = 0;

    for (recipient_id, batch) in group_by_recipient(pending) {
        if let Err(e) = sink.deliver(recipient_id, &batch).await {
            tracing::warn!(
                recipient_id,
                sink = sink.name(),
                count = batch.len(),
                error = %e,
                "Notification delivery failed, batch left pending"
            );
            run.outcome.failed += 1;
            deferred += batch.len() as u64;
            continue;
        }

        let ids: Vec<i64> = batch.iter().map(|n| n.id).collect();
        match store.mark_notifications_delivered(&ids, now).await {
            Ok(marked) => run.outcome.applied += marked,
            Err(e) => {
                // Delivered but not marked: the sink will see these again
                tracing::error!(recipient_id, error = %e, "Failed to mark notifications delivered");
                run.fail(Some(recipient_id), e.to_string());
            }
        }
    }

    if deferred > 0 {
        run.outcome.note = Some(format!(
            "{deferred} notification(s) left pending for redelivery"
        ));
    }
    Ok(run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::NotificationKind;

    fn notification(id: i64, recipient_id: i64) -> Notification {
        Notification {
            id,
            recipient_id,
            kind: NotificationKind::OrderStatus,
            title: "Order queued".into(),
            body: String::new(),
            is_read: false,
            is_delivered: false,
            created_at: id,
            delivered_at: None,
        }
    }

    #[test]
    fn test_groups_sorted_by_recipient() {
        let groups = group_by_recipient(vec![
            notification(1, 9),
            notification(2, 3),
            notification(3, 9),
        ]);
        let recipients: Vec<i64> = groups.keys().copied().collect();
        assert_eq!(recipients, vec![3, 9]);
        let ids: Vec<i64> = groups[&9].iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }
}
