//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the
//! recurring collection job.

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::api::AppState;
use crate::collection::{run_collection_job, CollectOutcome};

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process. Dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the cron expression is invalid, or the scheduler fails to start.
pub async fn build_scheduler(
    state: AppState,
    collect_cron: &str,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    register_collect_job(&scheduler, state, collect_cron).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the recurring collection job on `cron` (six-field, seconds first).
async fn register_collect_job(
    scheduler: &JobScheduler,
    state: AppState,
    cron: &str,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(cron, move |_uuid, _lock| {
        let state = state.clone();

        Box::pin(async move {
            match run_collection_job(&state, "scheduler").await {
                Ok(CollectOutcome::Completed(report)) => tracing::info!(
                    saved = report.articles.len(),
                    "scheduler: collection run complete"
                ),
                Ok(CollectOutcome::AlreadyRunning) => {
                    tracing::info!("scheduler: previous collection still running; skipped");
                }
                Err(e) => tracing::error!(error = %e, "scheduler: collection run failed"),
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron, "scheduler: collection job registered");
    Ok(())
}
