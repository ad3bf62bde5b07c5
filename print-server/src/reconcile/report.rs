//! Audit report aggregation
//!
//! Totals are always recomputed from every child row, never incremented,
//! so a republished student cannot be double counted.

use shared::models::{AuditReport, AuditReportStatus, ReportSummary, Student, StudentAudit};
use std::collections::BTreeSet;

fn add(total: &mut i64, value: i64) {
    *total = total.saturating_add(value);
}

/// Recomputed report fields
#[derive(Debug, Clone, PartialEq)]
pub struct ReportAggregate {
    pub total_students_audited: i64,
    pub students_with_discrepancies: i64,
    pub discrepancies_found: bool,
    pub status: AuditReportStatus,
    pub summary: ReportSummary,
}

impl ReportAggregate {
    /// `order_students` is every student of the audited order
    pub fn compute(audits: &[StudentAudit], order_students: &[Student]) -> Self {
        let mut summary = ReportSummary::default();
        let mut discrepant = BTreeSet::new();
        let mut audited = BTreeSet::new();

        for audit in audits {
            audited.insert(audit.student_id);
            // Saturating: stored rows are summed as-is and must never panic the recompute
            add(&mut summary.submitted_dark, audit.submitted_dark);
            add(&mut summary.submitted_light, audit.submitted_light);
            add(&mut summary.collected_dark, audit.collected_dark);
            add(&mut summary.collected_light, audit.collected_light);
            add(&mut summary.net_dark_delta, audit.dark_delta);
            add(&mut summary.net_light_delta, audit.light_delta);
            add(&mut summary.total_garment_delta, audit.dark_delta.saturating_abs());
            add(&mut summary.total_garment_delta, audit.light_delta.saturating_abs());
            if audit.has_discrepancy {
                discrepant.insert(audit.student_id);
            }
        }
        summary.discrepant_students = discrepant.iter().copied().collect();

        let all_audited = !order_students.is_empty()
            && order_students.iter().all(|s| audited.contains(&s.id));

        Self {
            total_students_audited: audited.len() as i64,
            students_with_discrepancies: discrepant.len() as i64,
            discrepancies_found: !discrepant.is_empty(),
            status: if all_audited {
                AuditReportStatus::Completed
            } else {
                AuditReportStatus::InProgress
            },
            summary,
        }
    }

    pub fn apply_to(self, report: &mut AuditReport, now: i64) {
        report.total_students_audited = self.total_students_audited;
        report.students_with_discrepancies = self.students_with_discrepancies;
        report.discrepancies_found = self.discrepancies_found;
        report.status = self.status;
        report.summary = self.summary;
        report.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(id: i64) -> Student {
        Student {
            id,
            order_id: 1,
            class_id: 1,
            name: format!("S{id}"),
            is_served: false,
            submitted_dark: 2,
            submitted_light: 2,
            collected_dark: None,
            collected_light: None,
            updated_at: 0,
        }
    }

    fn audit(student_id: i64, collected_dark: i64, collected_light: i64) -> StudentAudit {
        let dark_delta = collected_dark - 2;
        let light_delta = collected_light - 2;
        StudentAudit {
            id: student_id * 10,
            audit_report_id: 1,
            student_id,
            class_id: 1,
            submitted_dark: 2,
            submitted_light: 2,
            collected_dark,
            collected_light,
            dark_delta,
            light_delta,
            has_discrepancy: dark_delta != 0 || light_delta != 0,
            discrepancy_reason: None,
            auditor_notes: None,
            published_at: 0,
        }
    }

    #[test]
    fn test_partial_audit_stays_in_progress() {
        let students = [student(1), student(2)];
        let agg = ReportAggregate::compute(&[audit(1, 1, 2)], &students);
        assert_eq!(agg.total_students_audited, 1);
        assert_eq!(agg.students_with_discrepancies, 1);
        assert!(agg.discrepancies_found);
        assert_eq!(agg.summary.total_garment_delta, 1);
        assert_eq!(agg.status, AuditReportStatus::InProgress);
    }

    #[test]
    fn test_summary_sums_children() {
        let students = [student(1), student(2)];
        let audits = [audit(2, 3, 0), audit(1, 2, 2)];
        let agg = ReportAggregate::compute(&audits, &students);
        assert_eq!(agg.status, AuditReportStatus::Completed);
        assert_eq!(agg.summary.submitted_dark, 4);
        assert_eq!(agg.summary.collected_dark, 5);
        assert_eq!(agg.summary.collected_light, 2);
        assert_eq!(agg.summary.net_dark_delta, 1);
        assert_eq!(agg.summary.net_light_delta, -2);
        assert_eq!(agg.summary.discrepant_students, vec![2]);
        assert!(agg.discrepancies_found);
        assert_eq!(agg.summary.total_garment_delta, 3);
    }

    #[test]
    fn test_no_students_never_completes() {
        let agg = ReportAggregate::compute(&[], &[]);
        assert_eq!(agg.status, AuditReportStatus::InProgress);
        assert_eq!(agg.total_students_audited, 0);
        assert!(!agg.discrepancies_found);
    }

    #[test]
    fn test_extreme_rows_saturate() {
        let students = [student(1), student(2)];
        let audits = [audit(1, i64::MAX, 2), audit(2, i64::MAX, 2)];
        let agg = ReportAggregate::compute(&audits, &students);
        assert_eq!(agg.summary.collected_dark, i64::MAX);
        assert_eq!(agg.summary.net_dark_delta, i64::MAX);
        assert_eq!(agg.summary.total_garment_delta, i64::MAX);
        assert_eq!(agg.students_with_discrepancies, 2);
    }
}
