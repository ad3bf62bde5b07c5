//! Audit Report Repository (reports + per-student audits)

use super::student::STUDENT_COLUMNS;
use super::{RepoError, RepoResult, ensure_id};
use crate::reconcile::ReportAggregate;
use shared::models::{AuditReport, Student, StudentAudit};
use sqlx::SqlitePool;
use sqlx::types::Json;

const REPORT_COLUMNS: &str = "id, order_id, auditor_id, auditor_name, status, total_students_audited, students_with_discrepancies, discrepancies_found, summary, created_at, updated_at";

const AUDIT_COLUMNS: &str = "id, audit_report_id, student_id, class_id, submitted_dark, submitted_light, collected_dark, collected_light, dark_delta, light_delta, has_discrepancy, discrepancy_reason, auditor_notes, published_at";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<AuditReport>> {
    let sql = format!("SELECT {REPORT_COLUMNS} FROM audit_report WHERE id = ?");
    let report = sqlx::query_as::<_, AuditReport>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(report)
}

pub async fn find_by_order_and_auditor(
    pool: &SqlitePool,
    order_id: i64,
    auditor_id: i64,
) -> RepoResult<Option<AuditReport>> {
    let sql =
        format!("SELECT {REPORT_COLUMNS} FROM audit_report WHERE order_id = ? AND auditor_id = ?");
    let report = sqlx::query_as::<_, AuditReport>(&sql)
        .bind(order_id)
        .bind(auditor_id)
        .fetch_optional(pool)
        .await?;
    Ok(report)
}

pub async fn insert(pool: &SqlitePool, mut report: AuditReport) -> RepoResult<AuditReport> {
    report.id = ensure_id(report.id);
    let sql = format!(
        "INSERT INTO audit_report ({REPORT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
    );
    sqlx::query(&sql)
        .bind(report.id)
        .bind(report.order_id)
        .bind(report.auditor_id)
        .bind(&report.auditor_name)
        .bind(report.status)
        .bind(report.total_students_audited)
        .bind(report.students_with_discrepancies)
        .bind(report.discrepancies_found)
        .bind(Json(&report.summary))
        .bind(report.created_at)
        .bind(report.updated_at)
        .execute(pool)
        .await?;
    Ok(report)
}

/// Recompute a report from its student rows inside one transaction
///
/// The first statement is a write, so the connection holds the SQLite write
/// lock before it reads: concurrent recomputes of the same report run one
/// after the other and the last one sees every committed row.
pub async fn recompute(pool: &SqlitePool, report_id: i64, now: i64) -> RepoResult<AuditReport> {
    let mut tx = pool.begin().await?;

    let touched = sqlx::query("UPDATE audit_report SET updated_at = ? WHERE id = ?")
        .bind(now)
        .bind(report_id)
        .execute(&mut *tx)
        .await?;
    if touched.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Audit report {report_id}")));
    }

    let sql = format!("SELECT {REPORT_COLUMNS} FROM audit_report WHERE id = ?");
    let mut report = sqlx::query_as::<_, AuditReport>(&sql)
        .bind(report_id)
        .fetch_one(&mut *tx)
        .await?;

    let sql = format!("SELECT {AUDIT_COLUMNS} FROM student_audit WHERE audit_report_id = ?");
    let audits = sqlx::query_as::<_, StudentAudit>(&sql)
        .bind(report_id)
        .fetch_all(&mut *tx)
        .await?;

    let sql = format!("SELECT {STUDENT_COLUMNS} FROM student WHERE order_id = ?");
    let students = sqlx::query_as::<_, Student>(&sql)
        .bind(report.order_id)
        .fetch_all(&mut *tx)
        .await?;

    ReportAggregate::compute(&audits, &students).apply_to(&mut report, now);

    sqlx::query(
        "UPDATE audit_report SET status = ?1, total_students_audited = ?2, students_with_discrepancies = ?3, discrepancies_found = ?4, summary = ?5, updated_at = ?6 WHERE id = ?7",
    )
    .bind(report.status)
    .bind(report.total_students_audited)
    .bind(report.students_with_discrepancies)
    .bind(report.discrepancies_found)
    .bind(Json(&report.summary))
    .bind(report.updated_at)
    .bind(report.id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(report)
}

/// Insert or replace keyed by `(student_id, audit_report_id)`; the row id survives replacement
pub async fn upsert_student_audit(
    pool: &SqlitePool,
    mut audit: StudentAudit,
) -> RepoResult<StudentAudit> {
    let candidate_id = ensure_id(audit.id);
    let sql = format!(
        "INSERT INTO student_audit ({AUDIT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14) \
         ON CONFLICT (student_id, audit_report_id) DO UPDATE SET \
         class_id = excluded.class_id, submitted_dark = excluded.submitted_dark, submitted_light = excluded.submitted_light, \
         collected_dark = excluded.collected_dark, collected_light = excluded.collected_light, \
         dark_delta = excluded.dark_delta, light_delta = excluded.light_delta, has_discrepancy = excluded.has_discrepancy, \
         discrepancy_reason = excluded.discrepancy_reason, auditor_notes = excluded.auditor_notes, published_at = excluded.published_at \
         RETURNING id"
    );
    let id = sqlx::query_scalar::<_, i64>(&sql)
        .bind(candidate_id)
        .bind(audit.audit_report_id)
        .bind(audit.student_id)
        .bind(audit.class_id)
        .bind(audit.submitted_dark)
        .bind(audit.submitted_light)
        .bind(audit.collected_dark)
        .bind(audit.collected_light)
        .bind(audit.dark_delta)
        .bind(audit.light_delta)
        .bind(audit.has_discrepancy)
        .bind(&audit.discrepancy_reason)
        .bind(&audit.auditor_notes)
        .bind(audit.published_at)
        .fetch_one(pool)
        .await?;
    audit.id = id;
    Ok(audit)
}

pub async fn find_student_audits(
    pool: &SqlitePool,
    audit_report_id: i64,
) -> RepoResult<Vec<StudentAudit>> {
    let sql = format!(
        "SELECT {AUDIT_COLUMNS} FROM student_audit WHERE audit_report_id = ? ORDER BY student_id"
    );
    let audits = sqlx::query_as::<_, StudentAudit>(&sql)
        .bind(audit_report_id)
        .fetch_all(pool)
        .await?;
    Ok(audits)
}

/// Purge reports last updated before `cutoff`, children first
pub async fn delete_before(pool: &SqlitePool, cutoff: i64) -> RepoResult<u64> {
    let mut tx = pool.begin().await?;
    sqlx::query(
        "DELETE FROM student_audit WHERE audit_report_id IN (SELECT id FROM audit_report WHERE updated_at < ?)",
    )
    .bind(cutoff)
    .execute(&mut *tx)
    .await?;
    let rows = sqlx::query("DELETE FROM audit_report WHERE updated_at < ?")
        .bind(cutoff)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(rows.rows_affected())
}
