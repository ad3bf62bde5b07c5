//! Machine Repository

use super::{RepoResult, ensure_id};
use crate::store::MachineFilter;
use shared::models::Machine;
use sqlx::SqlitePool;

const COLUMNS: &str = "id, device_id, name, is_online, is_printing, active_session, last_seen_at";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Machine>> {
    let sql = format!("SELECT {COLUMNS} FROM machine WHERE id = ?");
    let machine = sqlx::query_as::<_, Machine>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(machine)
}

pub async fn insert(pool: &SqlitePool, mut machine: Machine) -> RepoResult<Machine> {
    machine.id = ensure_id(machine.id);
    let sql = format!("INSERT INTO machine ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)");
    sqlx::query(&sql)
        .bind(machine.id)
        .bind(&machine.device_id)
        .bind(&machine.name)
        .bind(machine.is_online)
        .bind(machine.is_printing)
        .bind(machine.active_session)
        .bind(machine.last_seen_at)
        .execute(pool)
        .await?;
    Ok(machine)
}

pub async fn find_by_filter(pool: &SqlitePool, filter: &MachineFilter) -> RepoResult<Vec<Machine>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM machine \
         WHERE (?1 IS NULL OR is_online = ?1) \
         AND (?2 IS NULL OR last_seen_at < ?2) \
         ORDER BY id"
    );
    let machines = sqlx::query_as::<_, Machine>(&sql)
        .bind(filter.is_online)
        .bind(filter.last_seen_before)
        .fetch_all(pool)
        .await?;
    Ok(machines)
}

pub async fn touch(pool: &SqlitePool, id: i64, at: i64) -> RepoResult<bool> {
    let rows = sqlx::query("UPDATE machine SET is_online = 1, last_seen_at = ?1 WHERE id = ?2")
        .bind(at)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Guarded by the staleness predicate, so a heartbeat landing after the
/// listing keeps the machine online
pub async fn mark_offline(pool: &SqlitePool, id: i64, cutoff: i64) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE machine SET is_online = 0, is_printing = 0, active_session = NULL WHERE id = ?1 AND is_online = 1 AND last_seen_at < ?2",
    )
    .bind(id)
    .bind(cutoff)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}
