use crate::scheduler::{JobRun, MACHINE_LIVENESS_TIMEOUT, SweepJob, SweepJobError, millis};
use crate::store::{MachineFilter, RecordStore};

/// Take machines offline after [`MACHINE_LIVENESS_TIMEOUT`] without a heartbeat
///
/// The flip is re-guarded by the same staleness predicate, so a heartbeat that
/// lands between listing and update keeps the machine online.
pub async fn run(store: &dyn RecordStore, now: i64) -> Result<JobRun, SweepJobError> {
    let cutoff = now - millis(MACHINE_LIVENESS_TIMEOUT);
    let machines = store.list_machines(&MachineFilter::stale(cutoff)).await?;

    let mut run = JobRun::new(SweepJob::DeviceLiveness);
    run.outcome.examined = machines.len() as u64;

    for machine in machines {
        match store.mark_machine_offline(machine.id, cutoff).await {
            Ok(true) => {
                tracing::info!(
                    machine_id = machine.id,
                    device_id = %machine.device_id,
                    last_seen_at = machine.last_seen_at,
                    "Machine marked offline"
                );
                run.outcome.applied += 1;
            }
            Ok(false) => {
                tracing::debug!(machine_id = machine.id, "Heartbeat arrived, machine stays online");
            }
            Err(e) => {
                tracing::warn!(machine_id = machine.id, error = %e, "Failed to mark machine offline");
                run.fail(Some(machine.id), e.to_string());
            }
        }
    }
    Ok(run)
}
