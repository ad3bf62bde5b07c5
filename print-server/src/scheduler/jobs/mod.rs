//! Sweep jobs
//!
//! Each job lists its candidates once, then handles every record on its own:
//! a record failure is recorded on the [`JobRun`](super::JobRun) and the job
//! moves on. Only a failed listing aborts the job.

pub mod audit_retention;
pub mod auto_confirm;
pub mod device_liveness;
pub mod metrics_rollup;
pub mod notification_batch;
