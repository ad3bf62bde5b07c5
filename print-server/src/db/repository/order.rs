//! Print Order Repository

use super::{RepoError, RepoResult, audit_log, ensure_id};
use crate::store::OrderFilter;
use shared::models::{AuditEvent, Order};
use shared::order::OrderStatus;
use sqlx::SqlitePool;

const COLUMNS: &str = "id, school_id, reference_code, status, total_students, total_garments, dark_garments, light_garments, total_amount, submitted_at, confirmed_at, auto_confirmed_at, queued_at, pickup_at, ongoing_at, done_at, packaging_at, delivery_at, completed_at, aborted_at, created_at, updated_at";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let sql = format!("SELECT {COLUMNS} FROM print_order WHERE id = ?");
    let order = sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(order)
}

pub async fn insert(pool: &SqlitePool, mut order: Order) -> RepoResult<Order> {
    order.id = ensure_id(order.id);
    let sql = format!(
        "INSERT INTO print_order ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22)"
    );
    sqlx::query(&sql)
        .bind(order.id)
        .bind(order.school_id)
        .bind(&order.reference_code)
        .bind(order.status)
        .bind(order.total_students)
        .bind(order.total_garments)
        .bind(order.dark_garments)
        .bind(order.light_garments)
        .bind(order.total_amount)
        .bind(order.submitted_at)
        .bind(order.confirmed_at)
        .bind(order.auto_confirmed_at)
        .bind(order.queued_at)
        .bind(order.pickup_at)
        .bind(order.ongoing_at)
        .bind(order.done_at)
        .bind(order.packaging_at)
        .bind(order.delivery_at)
        .bind(order.completed_at)
        .bind(order.aborted_at)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(pool)
        .await?;
    Ok(order)
}

pub async fn find_by_filter(pool: &SqlitePool, filter: &OrderFilter) -> RepoResult<Vec<Order>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM print_order \
         WHERE (?1 IS NULL OR status = ?1) \
         AND (?2 IS NULL OR (submitted_at IS NOT NULL AND submitted_at < ?2)) \
         AND (?3 IS NULL OR (auto_confirmed_at IS NOT NULL) = ?3) \
         ORDER BY submitted_at, id LIMIT ?4"
    );
    let orders = sqlx::query_as::<_, Order>(&sql)
        .bind(filter.status)
        .bind(filter.submitted_before)
        .bind(filter.auto_confirmed)
        .bind(filter.limit.unwrap_or(-1))
        .fetch_all(pool)
        .await?;
    Ok(orders)
}

/// Status compare-and-set plus audit append, in one transaction
pub async fn commit_transition(
    pool: &SqlitePool,
    order: &Order,
    expected: OrderStatus,
    event: AuditEvent,
) -> RepoResult<Order> {
    let mut tx = pool.begin().await?;

    let rows = sqlx::query(
        "UPDATE print_order SET status = ?1, submitted_at = ?2, confirmed_at = ?3, auto_confirmed_at = ?4, queued_at = ?5, pickup_at = ?6, ongoing_at = ?7, done_at = ?8, packaging_at = ?9, delivery_at = ?10, completed_at = ?11, aborted_at = ?12, updated_at = ?13 WHERE id = ?14 AND status = ?15",
    )
    .bind(order.status)
    .bind(order.submitted_at)
    .bind(order.confirmed_at)
    .bind(order.auto_confirmed_at)
    .bind(order.queued_at)
    .bind(order.pickup_at)
    .bind(order.ongoing_at)
    .bind(order.done_at)
    .bind(order.packaging_at)
    .bind(order.delivery_at)
    .bind(order.completed_at)
    .bind(order.aborted_at)
    .bind(order.updated_at)
    .bind(order.id)
    .bind(expected)
    .execute(&mut *tx)
    .await?;

    if rows.rows_affected() == 0 {
        let current =
            sqlx::query_scalar::<_, OrderStatus>("SELECT status FROM print_order WHERE id = ?")
                .bind(order.id)
                .fetch_optional(&mut *tx)
                .await?;
        tx.rollback().await?;
        return Err(match current {
            Some(current) => RepoError::StatusConflict {
                order_id: order.id,
                expected,
                current,
            },
            None => RepoError::NotFound(format!("Order {}", order.id)),
        });
    }

    audit_log::insert_in(&mut tx, event).await?;
    tx.commit().await?;

    // The committed row is exactly the planned order
    Ok(order.clone())
}
