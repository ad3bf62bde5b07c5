use crate::scheduler::{
    AUDIT_LOG_RETENTION, AUDIT_REPORT_RETENTION, JobRun, SweepJob, SweepJobError, millis,
};
use crate::store::RecordStore;

/// Purge audit events and audit reports past their retention horizon
///
/// The two purges are independent; one failing is recorded and the other
/// still runs.
pub async fn run(store: &dyn RecordStore, now: i64) -> Result<JobRun, SweepJobError> {
    let mut run = JobRun::new(SweepJob::AuditRetention);

    let events = match store
        .delete_audit_events_before(now - millis(AUDIT_LOG_RETENTION))
        .await
    {
        Ok(n) => n,
        Err(e) => {
            tracing::error!(error = %e, "Audit event purge failed");
            run.fail(None, format!("audit events: {e}"));
            0
        }
    };

    let reports = match store
        .delete_audit_reports_before(now - millis(AUDIT_REPORT_RETENTION))
        .await
    {
        Ok(n) => n,
        Err(e) => {
            tracing::error!(error = %e, "Audit report purge failed");
            run.fail(None, format!("audit reports: {e}"));
            0
        }
    };

    run.outcome.examined = events + reports;
    run.outcome.applied = events + reports;
    if events + reports > 0 {
        tracing::info!(events, reports, "Purged expired audit history");
    }
    run.outcome.note = Some(format!("{events} events, {reports} reports purged"));
    Ok(run)
}
