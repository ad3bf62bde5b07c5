use chrono_tz::Tz;
use shared::models::{StaffMetric, StaffRole, StaffTask, TaskStatus};
use shared::util::round2;

use crate::scheduler::{JobRun, SweepJob, SweepJobError};
use crate::store::RecordStore;
use crate::utils::time::previous_day;

/// Daily metric for one staff member over `[period_start, period_end)`
pub fn compute_metric(
    staff_id: i64,
    period_start: i64,
    period_end: i64,
    tasks: &[StaffTask],
    now: i64,
) -> StaffMetric {
    let tasks_assigned = tasks.len() as i64;
    let tasks_completed = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Completed)
        .count() as i64;

    let latencies: Vec<f64> = tasks
        .iter()
        .filter_map(|t| t.completed_at.map(|done| (done - t.assigned_at) as f64 / 1000.0))
        .collect();
    let avg_completion_secs = (!latencies.is_empty())
        .then(|| round2(latencies.iter().sum::<f64>() / latencies.len() as f64));

    let efficiency_score =
        (tasks_assigned > 0).then(|| round2(tasks_completed as f64 / tasks_assigned as f64));

    StaffMetric {
        id: 0,
        staff_id,
        period_start,
        period_end,
        tasks_assigned,
        tasks_completed,
        efficiency_score,
        avg_completion_secs,
        created_at: now,
    }
}

/// Roll up the previous business day for every tracked, active staff member
///
/// Skipped entirely when any metric already exists for that period; inserts
/// are insert-or-ignore, so a racing sweep cannot double count.
pub async fn run(store: &dyn RecordStore, tz: Tz, now: i64) -> Result<JobRun, SweepJobError> {
    let (date, start, end) = previous_day(now, tz);
    let mut run = JobRun::new(SweepJob::MetricsRollup);

    if !store.list_staff_metrics(start, end).await?.is_empty() {
        tracing::debug!(%date, "Staff metrics already rolled up");
        run.outcome.note = Some(format!("{date} already rolled up"));
        return Ok(run);
    }

    let staff = store.list_active_staff(&StaffRole::TRACKED).await?;
    run.outcome.examined = staff.len() as u64;

    for member in staff {
        let tasks = match store.list_staff_tasks(member.id, start, end).await {
            Ok(tasks) => tasks,
            Err(e) => {
                tracing::warn!(staff_id = member.id, error = %e, "Failed to load staff tasks");
                run.fail(Some(member.id), e.to_string());
                continue;
            }
        };

        let metric = compute_metric(member.id, start, end, &tasks, now);
        match store.insert_staff_metric(metric).await {
            Ok(true) => run.outcome.applied += 1,
            Ok(false) => tracing::debug!(staff_id = member.id, "Metric already present"),
            Err(e) => {
                tracing::warn!(staff_id = member.id, error = %e, "Failed to store staff metric");
                run.fail(Some(member.id), e.to_string());
            }
        }
    }

    tracing::info!(%date, staff = run.outcome.applied, "Daily staff metrics rolled up");
    run.outcome.note = Some(date.to_string());
    Ok(run)
}
