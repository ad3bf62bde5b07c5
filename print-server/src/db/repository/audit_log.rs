//! Audit Log Repository (append-only, purged by retention)

use super::{RepoResult, ensure_id};
use crate::store::AuditEventFilter;
use shared::models::AuditEvent;
use sqlx::types::Json;
use sqlx::{Sqlite, SqlitePool, Transaction};

const COLUMNS: &str =
    "id, timestamp, actor_type, actor_id, actor_name, action, target_type, target_id, details, extra";

const INSERT: &str = "INSERT INTO audit_log (id, timestamp, actor_type, actor_id, actor_name, action, target_type, target_id, details, extra) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)";

fn bind_event<'q>(
    query: sqlx::query::Query<'q, Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    event: &'q AuditEvent,
) -> sqlx::query::Query<'q, Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    query
        .bind(event.id)
        .bind(event.timestamp)
        .bind(event.actor_type)
        .bind(event.actor_id)
        .bind(&event.actor_name)
        .bind(&event.action)
        .bind(&event.target_type)
        .bind(event.target_id)
        .bind(Json(&event.details))
        .bind(Json(&event.extra))
}

pub async fn insert(pool: &SqlitePool, mut event: AuditEvent) -> RepoResult<AuditEvent> {
    event.id = ensure_id(event.id);
    bind_event(sqlx::query(INSERT), &event).execute(pool).await?;
    Ok(event)
}

/// Append inside an open transaction
pub async fn insert_in(
    tx: &mut Transaction<'_, Sqlite>,
    mut event: AuditEvent,
) -> RepoResult<AuditEvent> {
    event.id = ensure_id(event.id);
    bind_event(sqlx::query(INSERT), &event)
        .execute(&mut **tx)
        .await?;
    Ok(event)
}

pub async fn find_by_filter(
    pool: &SqlitePool,
    filter: &AuditEventFilter,
) -> RepoResult<Vec<AuditEvent>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM audit_log \
         WHERE (?1 IS NULL OR target_type = ?1) \
         AND (?2 IS NULL OR target_id = ?2) \
         AND (?3 IS NULL OR action = ?3) \
         ORDER BY timestamp, id"
    );
    let events = sqlx::query_as::<_, AuditEvent>(&sql)
        .bind(filter.target_type.as_deref())
        .bind(filter.target_id)
        .bind(filter.action.as_deref())
        .fetch_all(pool)
        .await?;
    Ok(events)
}

pub async fn delete_before(pool: &SqlitePool, cutoff: i64) -> RepoResult<u64> {
    let rows = sqlx::query("DELETE FROM audit_log WHERE timestamp < ?")
        .bind(cutoff)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected())
}
