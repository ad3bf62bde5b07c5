//! Student audit publishing
//!
//! Write order:
//! 1. student collected counts
//! 2. find-or-create the (order, auditor) report
//! 3. upsert the student audit row
//! 4. recompute the report from all of its rows
//! 5. `STUDENT_AUDIT_PUBLISHED` trail entry (best effort)
//!
//! A failure at step 1 leaves everything untouched. Later failures report
//! which write failed; the student correction from step 1 stays persisted.

use super::discrepancy::{assess, discrepancy_reason};
use super::error::{FailedWrite, PublishError};
use crate::store::{RecordStore, StoreError};
use shared::models::{
    ActorContext, AuditDetails, AuditEvent, AuditReport, AuditReportStatus, MAX_GARMENT_COUNT,
    ReportSummary, StudentAudit,
};
use std::sync::Arc;

pub const STUDENT_AUDIT_PUBLISHED: &str = "STUDENT_AUDIT_PUBLISHED";

/// Auditor input for one student
#[derive(Debug, Clone)]
pub struct PublishRequest {
    pub student_id: i64,
    pub collected_dark: i64,
    pub collected_light: i64,
    pub notes: Option<String>,
}

/// Counts must lie in `0..=MAX_GARMENT_COUNT` before anything is written
fn check_count(field: &'static str, value: i64) -> Result<(), PublishError> {
    if value < 0 {
        return Err(PublishError::NegativeCount { field, value });
    }
    if value > MAX_GARMENT_COUNT {
        return Err(PublishError::CountTooLarge {
            field,
            value,
            max: MAX_GARMENT_COUNT,
        });
    }
    Ok(())
}

#[derive(Clone)]
pub struct AuditPublisher {
    store: Arc<dyn RecordStore>,
}

impl AuditPublisher {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn publish_student_audit(
        &self,
        request: PublishRequest,
        auditor: &ActorContext,
    ) -> Result<StudentAudit, PublishError> {
        self.publish_student_audit_at(request, auditor, shared::util::now_millis())
            .await
    }

    pub async fn publish_student_audit_at(
        &self,
        request: PublishRequest,
        auditor: &ActorContext,
        now: i64,
    ) -> Result<StudentAudit, PublishError> {
        let PublishRequest {
            student_id,
            collected_dark,
            collected_light,
            notes,
        } = request;

        check_count("collected_dark", collected_dark)?;
        check_count("collected_light", collected_light)?;

        let student = self
            .store
            .get_student(student_id)
            .await?
            .ok_or(PublishError::StudentNotFound(student_id))?;
        let class = self
            .store
            .get_class(student.class_id)
            .await?
            .ok_or(PublishError::ClassNotFound(student.class_id))?;
        let order = self
            .store
            .get_order(student.order_id)
            .await?
            .ok_or(PublishError::OrderNotFound(student.order_id))?;
        if class.order_id != order.id {
            return Err(PublishError::ClassOrderMismatch {
                student_id,
                class_id: class.id,
                order_id: order.id,
            });
        }

        let assessment = assess(
            student.submitted_dark,
            student.submitted_light,
            collected_dark,
            collected_light,
        );
        let notes = notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());

        // 1. Student correction
        self.store
            .update_student_collected(student_id, collected_dark, collected_light, now)
            .await
            .map_err(|e| self.fail(FailedWrite::Student, student_id, e))?;

        // 2. Report for (order, auditor)
        let report = self
            .find_or_create_report(order.id, auditor, now)
            .await
            .map_err(|e| self.fail(FailedWrite::AuditReport, student_id, e))?;

        // 3. Student audit row
        let audit = StudentAudit {
            id: 0,
            audit_report_id: report.id,
            student_id,
            class_id: class.id,
            submitted_dark: student.submitted_dark,
            submitted_light: student.submitted_light,
            collected_dark,
            collected_light,
            dark_delta: assessment.dark_delta,
            light_delta: assessment.light_delta,
            has_discrepancy: assessment.has_discrepancy,
            discrepancy_reason: discrepancy_reason(
                assessment.explanation.as_deref(),
                notes.as_deref(),
            ),
            auditor_notes: notes,
            published_at: now,
        };
        let audit = self
            .store
            .upsert_student_audit(audit)
            .await
            .map_err(|e| self.fail(FailedWrite::StudentAudit, student_id, e))?;

        // 4. Full recompute, atomic in the store
        let report = self
            .store
            .recompute_audit_report(report.id, now)
            .await
            .map_err(|e| self.fail(FailedWrite::ReportAggregate, student_id, e))?;

        // 5. Trail entry, failure is not the caller's problem
        let mut event = AuditEvent::new(
            auditor,
            STUDENT_AUDIT_PUBLISHED,
            "student",
            student_id,
            AuditDetails::StudentAuditPublished {
                student_id,
                audit_report_id: report.id,
                dark_delta: audit.dark_delta,
                light_delta: audit.light_delta,
                has_discrepancy: audit.has_discrepancy,
            },
            now,
        );
        if let Some(notes) = &audit.auditor_notes {
            event = event.with_extra(serde_json::json!({ "auditor_notes": notes }));
        }
        if let Err(e) = self.store.append_audit_event(event).await {
            tracing::warn!(student_id, report_id = report.id, error = %e, "Failed to record audit publish event");
        }

        tracing::info!(
            student_id,
            report_id = report.id,
            order_id = order.id,
            has_discrepancy = audit.has_discrepancy,
            report_status = ?report.status,
            "Student audit published"
        );
        Ok(audit)
    }

    async fn find_or_create_report(
        &self,
        order_id: i64,
        auditor: &ActorContext,
        now: i64,
    ) -> Result<AuditReport, StoreError> {
        if let Some(report) = self.store.find_audit_report(order_id, auditor.actor_id).await? {
            return Ok(report);
        }
        let report = AuditReport {
            id: 0,
            order_id,
            auditor_id: auditor.actor_id,
            auditor_name: auditor.actor_name.clone(),
            status: AuditReportStatus::InProgress,
            total_students_audited: 0,
            students_with_discrepancies: 0,
            discrepancies_found: false,
            summary: ReportSummary::default(),
            created_at: now,
            updated_at: now,
        };
        match self.store.insert_audit_report(report).await {
            Ok(report) => Ok(report),
            // Concurrent first publish by the same auditor created it
            Err(StoreError::Duplicate(_)) => self
                .store
                .find_audit_report(order_id, auditor.actor_id)
                .await?
                .ok_or_else(|| StoreError::NotFound(format!("audit report for order {order_id}"))),
            Err(e) => Err(e),
        }
    }

    fn fail(&self, failed_write: FailedWrite, student_id: i64, source: StoreError) -> PublishError {
        tracing::error!(
            student_id,
            failed_write = %failed_write,
            error = %source,
            "Student audit publish failed"
        );
        PublishError::write(failed_write, source)
    }
}
