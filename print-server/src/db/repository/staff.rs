//! Staff, Task and Metric Repository

use super::{RepoResult, ensure_id};
use shared::models::{Staff, StaffMetric, StaffRole, StaffTask};
use sqlx::SqlitePool;

const TASK_COLUMNS: &str = "id, staff_id, order_id, title, status, assigned_at, completed_at";

const METRIC_COLUMNS: &str = "id, staff_id, period_start, period_end, tasks_assigned, tasks_completed, efficiency_score, avg_completion_secs, created_at";

pub async fn insert(pool: &SqlitePool, mut staff: Staff) -> RepoResult<Staff> {
    staff.id = ensure_id(staff.id);
    sqlx::query("INSERT INTO staff (id, name, role, is_active) VALUES (?1, ?2, ?3, ?4)")
        .bind(staff.id)
        .bind(&staff.name)
        .bind(staff.role)
        .bind(staff.is_active)
        .execute(pool)
        .await?;
    Ok(staff)
}

pub async fn find_active(pool: &SqlitePool, roles: &[StaffRole]) -> RepoResult<Vec<Staff>> {
    let staff = sqlx::query_as::<_, Staff>(
        "SELECT id, name, role, is_active FROM staff WHERE is_active = 1 ORDER BY id",
    )
    .fetch_all(pool)
    .await?;
    Ok(staff.into_iter().filter(|s| roles.contains(&s.role)).collect())
}

pub async fn insert_task(pool: &SqlitePool, mut task: StaffTask) -> RepoResult<StaffTask> {
    task.id = ensure_id(task.id);
    let sql = format!("INSERT INTO staff_task ({TASK_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)");
    sqlx::query(&sql)
        .bind(task.id)
        .bind(task.staff_id)
        .bind(task.order_id)
        .bind(&task.title)
        .bind(task.status)
        .bind(task.assigned_at)
        .bind(task.completed_at)
        .execute(pool)
        .await?;
    Ok(task)
}

pub async fn find_tasks_assigned_between(
    pool: &SqlitePool,
    staff_id: i64,
    start: i64,
    end: i64,
) -> RepoResult<Vec<StaffTask>> {
    let sql = format!(
        "SELECT {TASK_COLUMNS} FROM staff_task WHERE staff_id = ? AND assigned_at >= ? AND assigned_at < ? ORDER BY assigned_at"
    );
    let tasks = sqlx::query_as::<_, StaffTask>(&sql)
        .bind(staff_id)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;
    Ok(tasks)
}

pub async fn find_metrics_for_period(
    pool: &SqlitePool,
    period_start: i64,
    period_end: i64,
) -> RepoResult<Vec<StaffMetric>> {
    let sql = format!(
        "SELECT {METRIC_COLUMNS} FROM staff_metric WHERE period_start = ? AND period_end = ? ORDER BY staff_id"
    );
    let metrics = sqlx::query_as::<_, StaffMetric>(&sql)
        .bind(period_start)
        .bind(period_end)
        .fetch_all(pool)
        .await?;
    Ok(metrics)
}

/// INSERT OR IGNORE on the `(staff_id, period_start, period_end)` key
pub async fn insert_metric(pool: &SqlitePool, metric: StaffMetric) -> RepoResult<bool> {
    let sql = format!(
        "INSERT OR IGNORE INTO staff_metric ({METRIC_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
    );
    let rows = sqlx::query(&sql)
        .bind(ensure_id(metric.id))
        .bind(metric.staff_id)
        .bind(metric.period_start)
        .bind(metric.period_end)
        .bind(metric.tasks_assigned)
        .bind(metric.tasks_completed)
        .bind(metric.efficiency_score)
        .bind(metric.avg_completion_secs)
        .bind(metric.created_at)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
