//! Audit Report Models (garment collection audits)

use serde::{Deserialize, Serialize};

/// Audit report status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditReportStatus {
    #[default]
    InProgress,
    /// Every student of the order has a published audit
    Completed,
}

/// Deterministic totals recomputed from the report's student audits
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub submitted_dark: i64,
    pub submitted_light: i64,
    pub collected_dark: i64,
    pub collected_light: i64,
    /// Sum of `dark_delta` over all audits
    pub net_dark_delta: i64,
    pub net_light_delta: i64,
    /// Sum of absolute garment deltas
    pub total_garment_delta: i64,
    /// Ascending student ids with a discrepancy
    pub discrepant_students: Vec<i64>,
}

/// One auditor's report over one order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AuditReport {
    pub id: i64,
    /// Order (collection session) being audited
    pub order_id: i64,
    pub auditor_id: i64,
    pub auditor_name: String,
    pub status: AuditReportStatus,
    pub total_students_audited: i64,
    pub students_with_discrepancies: i64,
    /// Any audited student has a discrepancy
    pub discrepancies_found: bool,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub summary: ReportSummary,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Per-student audit row, unique on `(student_id, audit_report_id)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StudentAudit {
    pub id: i64,
    pub audit_report_id: i64,
    pub student_id: i64,
    pub class_id: i64,
    pub submitted_dark: i64,
    pub submitted_light: i64,
    pub collected_dark: i64,
    pub collected_light: i64,
    /// collected - submitted
    pub dark_delta: i64,
    pub light_delta: i64,
    pub has_discrepancy: bool,
    /// Generated explanation with auditor notes appended
    pub discrepancy_reason: Option<String>,
    pub auditor_notes: Option<String>,
    pub published_at: i64,
}

/// Report with its student audits, as served by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReportDetail {
    #[serde(flatten)]
    pub report: AuditReport,
    pub student_audits: Vec<StudentAudit>,
}
