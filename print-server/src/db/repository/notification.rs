//! Notification Repository

use super::{RepoResult, ensure_id};
use shared::models::Notification;
use sqlx::SqlitePool;

const COLUMNS: &str =
    "id, recipient_id, kind, title, body, is_read, is_delivered, created_at, delivered_at";

pub async fn insert(pool: &SqlitePool, mut notification: Notification) -> RepoResult<Notification> {
    notification.id = ensure_id(notification.id);
    let sql = format!("INSERT INTO notification ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)");
    sqlx::query(&sql)
        .bind(notification.id)
        .bind(notification.recipient_id)
        .bind(notification.kind)
        .bind(&notification.title)
        .bind(&notification.body)
        .bind(notification.is_read)
        .bind(notification.is_delivered)
        .bind(notification.created_at)
        .bind(notification.delivered_at)
        .execute(pool)
        .await?;
    Ok(notification)
}

pub async fn find_pending(pool: &SqlitePool, limit: i64) -> RepoResult<Vec<Notification>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM notification WHERE is_delivered = 0 AND is_read = 0 ORDER BY created_at, id LIMIT ?"
    );
    let pending = sqlx::query_as::<_, Notification>(&sql)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(pending)
}

pub async fn mark_delivered(pool: &SqlitePool, ids: &[i64], at: i64) -> RepoResult<u64> {
    let mut tx = pool.begin().await?;
    let mut changed = 0;
    for id in ids {
        let rows = sqlx::query(
            "UPDATE notification SET is_delivered = 1, delivered_at = ?1 WHERE id = ?2 AND is_delivered = 0",
        )
        .bind(at)
        .bind(*id)
        .execute(&mut *tx)
        .await?;
        changed += rows.rows_affected();
    }
    tx.commit().await?;
    Ok(changed)
}
