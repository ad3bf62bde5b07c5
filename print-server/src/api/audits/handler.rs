//! Audit API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use shared::models::{ActorContext, AuditReportDetail, StudentAudit};

use crate::core::ServerState;
use crate::reconcile::PublishRequest;
use crate::utils::{AppError, AppResult, ErrorCode};

/// Publish request body
#[derive(Debug, Deserialize)]
pub struct PublishAuditRequest {
    pub auditor_id: i64,
    pub auditor_name: String,
    pub collected_dark: i64,
    pub collected_light: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

pub async fn publish(
    State(state): State<ServerState>,
    Path(student_id): Path<i64>,
    Json(payload): Json<PublishAuditRequest>,
) -> AppResult<Json<StudentAudit>> {
    let auditor = ActorContext::human(payload.auditor_id, payload.auditor_name);
    let request = PublishRequest {
        student_id,
        collected_dark: payload.collected_dark,
        collected_light: payload.collected_light,
        notes: payload.notes,
    };
    let audit = state
        .publisher
        .publish_student_audit(request, &auditor)
        .await?;
    Ok(Json(audit))
}

pub async fn get_report(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<AuditReportDetail>> {
    let report = state.store.get_audit_report(id).await?.ok_or_else(|| {
        AppError::with_message(
            ErrorCode::AuditReportNotFound,
            format!("Audit report {id} not found"),
        )
        .with_detail("audit_report_id", id)
    })?;
    let student_audits = state.store.list_student_audits(id).await?;
    Ok(Json(AuditReportDetail {
        report,
        student_audits,
    }))
}
