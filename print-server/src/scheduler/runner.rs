//! Periodic sweep driver
//!
//! Registered with `BackgroundTasks`. Missed ticks are skipped, so a sweep
//! that outlasts the interval is never re-entered in this process.

use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::{Scheduler, SweepReport};

pub struct SweepRunner {
    scheduler: Scheduler,
    interval: Duration,
    shutdown: CancellationToken,
}

impl SweepRunner {
    pub fn new(scheduler: Scheduler, interval: Duration, shutdown: CancellationToken) -> Self {
        Self {
            scheduler,
            interval,
            shutdown,
        }
    }

    /// Main loop: sweep on every tick until shutdown
    ///
    /// Shutdown is observed between sweeps; a running sweep finishes first.
    pub async fn run(self) {
        tracing::info!(interval_secs = self.interval.as_secs(), "Sweep runner started");

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = self.scheduler.run_sweep().await;
                    log_report(&report);
                }
                _ = self.shutdown.cancelled() => {
                    break;
                }
            }
        }

        tracing::info!("Sweep runner stopped");
    }
}

fn log_report(report: &SweepReport) {
    let applied: u64 = report.outcomes.iter().map(|o| o.applied).sum();
    let elapsed_ms = report.finished_at - report.started_at;
    if report.is_clean() {
        tracing::info!(jobs = report.jobs_run.len(), applied, elapsed_ms, "Sweep finished");
    } else {
        tracing::warn!(
            jobs = report.jobs_run.len(),
            applied,
            errors = report.errors.len(),
            elapsed_ms,
            "Sweep finished with errors"
        );
    }
}
