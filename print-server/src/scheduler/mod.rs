//! Background reconciliation scheduler
//!
//! One sweep runs five independent jobs in a fixed order:
//!
//! 1. [`SweepJob::AutoConfirm`] - SUBMITTED orders older than 24h move to QUEUED
//! 2. [`SweepJob::DeviceLiveness`] - machines without a heartbeat for 5min go offline
//! 3. [`SweepJob::MetricsRollup`] - daily staff metrics for the previous business day
//! 4. [`SweepJob::NotificationBatch`] - pending notifications handed to the sink
//! 5. [`SweepJob::AuditRetention`] - audit trail and report purge, always last
//!
//! A failing job never blocks the ones after it. No lock is held across a
//! sweep; every job is guarded by a predicate that makes a repeated or
//! overlapping run a no-op.

pub mod jobs;
pub mod runner;

pub use runner::SweepRunner;

use chrono_tz::Tz;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::core::tasks::panic_message;
use crate::notify::NotificationSink;
use crate::orders::OrderLifecycle;
use crate::store::{RecordStore, StoreError};
use crate::utils::{AppError, ErrorCode};

/// SUBMITTED orders older than this are confirmed by the system
pub const AUTO_CONFIRM_AFTER: Duration = Duration::from_secs(24 * 60 * 60);
/// Heartbeat silence after which a machine is considered offline
pub const MACHINE_LIVENESS_TIMEOUT: Duration = Duration::from_secs(5 * 60);
pub const AUDIT_LOG_RETENTION: Duration = Duration::from_secs(90 * 24 * 60 * 60);
pub const AUDIT_REPORT_RETENTION: Duration = Duration::from_secs(90 * 24 * 60 * 60);
/// Max notifications handed to the sink per sweep
pub const NOTIFICATION_BATCH_LIMIT: i64 = 200;

/// Threshold as Unix millis, for comparison against stored timestamps
pub(crate) fn millis(duration: Duration) -> i64 {
    duration.as_millis() as i64
}

/// Sweep job identity, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepJob {
    AutoConfirm,
    DeviceLiveness,
    MetricsRollup,
    NotificationBatch,
    AuditRetention,
}

impl SweepJob {
    /// Execution order. Retention stays last.
    pub const ORDER: [SweepJob; 5] = [
        SweepJob::AutoConfirm,
        SweepJob::DeviceLiveness,
        SweepJob::MetricsRollup,
        SweepJob::NotificationBatch,
        SweepJob::AuditRetention,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SweepJob::AutoConfirm => "auto_confirm",
            SweepJob::DeviceLiveness => "device_liveness",
            SweepJob::MetricsRollup => "metrics_rollup",
            SweepJob::NotificationBatch => "notification_batch",
            SweepJob::AuditRetention => "audit_retention",
        }
    }
}

impl fmt::Display for SweepJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters for one job in one sweep
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOutcome {
    pub job: SweepJob,
    /// Records the job looked at
    pub examined: u64,
    /// Records it changed (transitioned, flipped, inserted, delivered, purged)
    pub applied: u64,
    pub failed: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl JobOutcome {
    pub fn new(job: SweepJob) -> Self {
        Self {
            job,
            examined: 0,
            applied: 0,
            failed: 0,
            note: None,
        }
    }
}

/// A failure recorded during a sweep
///
/// `record_id` is the order, machine, staff member or notification recipient
/// the failure belongs to; `None` means the whole job (or one of its phases)
/// failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobError {
    pub job: SweepJob,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<i64>,
    pub message: String,
}

/// Job-level failure: aborts that job only
#[derive(Debug, Error)]
pub enum SweepJobError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Job panicked: {0}")]
    Panicked(String),
}

impl From<SweepJobError> for AppError {
    fn from(err: SweepJobError) -> Self {
        AppError::with_message(ErrorCode::SweepJobFailed, err.to_string())
    }
}

/// Result of one job: its counters plus any per-record failures
#[derive(Debug)]
pub struct JobRun {
    pub outcome: JobOutcome,
    pub errors: Vec<JobError>,
}

impl JobRun {
    pub fn new(job: SweepJob) -> Self {
        Self {
            outcome: JobOutcome::new(job),
            errors: Vec::new(),
        }
    }

    /// Record a failure without stopping the job
    pub fn fail(&mut self, record_id: Option<i64>, message: impl Into<String>) {
        self.outcome.failed += 1;
        self.errors.push(JobError {
            job: self.outcome.job,
            record_id,
            message: message.into(),
        });
    }
}

/// Summary of one sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    pub started_at: i64,
    pub finished_at: i64,
    /// Every job that was started, in execution order, aborted ones included
    pub jobs_run: Vec<SweepJob>,
    /// One entry per job that completed, in execution order
    pub outcomes: Vec<JobOutcome>,
    pub errors: Vec<JobError>,
}

impl SweepReport {
    pub fn outcome(&self, job: SweepJob) -> Option<&JobOutcome> {
        self.outcomes.iter().find(|o| o.job == job)
    }

    pub fn errors_for(&self, job: SweepJob) -> impl Iterator<Item = &JobError> {
        self.errors.iter().filter(move |e| e.job == job)
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Runs sweeps against the record store
#[derive(Clone)]
pub struct Scheduler {
    store: Arc<dyn RecordStore>,
    lifecycle: OrderLifecycle,
    sink: Arc<dyn NotificationSink>,
    tz: Tz,
}

impl Scheduler {
    pub fn new(store: Arc<dyn RecordStore>, sink: Arc<dyn NotificationSink>, tz: Tz) -> Self {
        Self {
            lifecycle: OrderLifecycle::new(store.clone()),
            store,
            sink,
            tz,
        }
    }

    pub async fn run_sweep(&self) -> SweepReport {
        self.run_sweep_at(shared::util::now_millis()).await
    }

    /// Run every job against a fixed `now`
    pub async fn run_sweep_at(&self, now: i64) -> SweepReport {
        let clock = Instant::now();
        let mut report = SweepReport {
            started_at: now,
            finished_at: now,
            jobs_run: Vec::with_capacity(SweepJob::ORDER.len()),
            outcomes: Vec::with_capacity(SweepJob::ORDER.len()),
            errors: Vec::new(),
        };

        for job in SweepJob::ORDER {
            let result = match AssertUnwindSafe(self.run_job(job, now))
                .catch_unwind()
                .await
            {
                Ok(result) => result,
                Err(panic) => Err(SweepJobError::Panicked(panic_message(panic.as_ref()))),
            };
            report.jobs_run.push(job);

            match result {
                Ok(run) => {
                    tracing::debug!(
                        job = %job,
                        examined = run.outcome.examined,
                        applied = run.outcome.applied,
                        failed = run.outcome.failed,
                        "Sweep job finished"
                    );
                    report.errors.extend(run.errors);
                    report.outcomes.push(run.outcome);
                }
                Err(e) => {
                    tracing::error!(job = %job, error = %e, "Sweep job aborted");
                    report.errors.push(JobError {
                        job,
                        record_id: None,
                        message: e.to_string(),
                    });
                }
            }
        }

        report.finished_at = now + clock.elapsed().as_millis() as i64;
        report
    }

    async fn run_job(&self, job: SweepJob, now: i64) -> Result<JobRun, SweepJobError> {
        let store = self.store.as_ref();
        match job {
            SweepJob::AutoConfirm => jobs::auto_confirm::run(store, &self.lifecycle, now).await,
            SweepJob::DeviceLiveness => jobs::device_liveness::run(store, now).await,
            SweepJob::MetricsRollup => jobs::metrics_rollup::run(store, self.tz, now).await,
            SweepJob::NotificationBatch => {
                jobs::notification_batch::run(store, self.sink.as_ref(), now).await
            }
            SweepJob::AuditRetention => jobs::audit_retention::run(store, now).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::LogSink;
    use crate::store::MemoryStore;

    #[test]
    fn test_retention_runs_last() {
        assert_eq!(SweepJob::ORDER.last(), Some(&SweepJob::AuditRetention));
        assert_eq!(SweepJob::ORDER[0], SweepJob::AutoConfirm);
    }

    #[test]
    fn test_threshold_millis() {
        assert_eq!(millis(AUTO_CONFIRM_AFTER), shared::util::DAY_MS);
        assert_eq!(millis(MACHINE_LIVENESS_TIMEOUT), 5 * shared::util::MINUTE_MS);
        assert_eq!(millis(AUDIT_LOG_RETENTION), 90 * shared::util::DAY_MS);
    }

    #[test]
    fn test_job_serializes_snake_case() {
        let json = serde_json::to_string(&SweepJob::NotificationBatch).unwrap();
        assert_eq!(json, "\"notification_batch\"");
    }

    #[test]
    fn test_job_error_maps_to_sweep_code() {
        let err: AppError = SweepJobError::Panicked("boom".into()).into();
        assert_eq!(err.code, ErrorCode::SweepJobFailed);
    }

    #[tokio::test]
    async fn test_empty_store_sweep_is_clean() {
        let store = Arc::new(MemoryStore::new());
        let scheduler = Scheduler::new(store, Arc::new(LogSink), Tz::UTC);
        let report = scheduler.run_sweep_at(1_700_000_000_000).await;
        assert_eq!(report.jobs_run, SweepJob::ORDER.to_vec());
        assert_eq!(report.outcomes.len(), 5);
        assert!(report.is_clean());
        assert!(report.finished_at >= report.started_at);
    }

    #[tokio::test]
    async fn test_failed_job_does_not_block_later_jobs() {
        let store = Arc::new(MemoryStore::new());
        store.fail_on("list_orders");
        let scheduler = Scheduler::new(store, Arc::new(LogSink), Tz::UTC);
        let report = scheduler.run_sweep_at(1_700_000_000_000).await;

        assert_eq!(report.jobs_run, SweepJob::ORDER.to_vec());
        assert!(report.outcome(SweepJob::AutoConfirm).is_none());
        assert!(report.outcome(SweepJob::AuditRetention).is_some());
        let errors: Vec<_> = report.errors_for(SweepJob::AutoConfirm).collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].record_id, None);
    }
}
