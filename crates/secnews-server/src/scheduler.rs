//! Background job scheduler.
//!
//! Registers the recurring digest run on the configured cron expression.
//! Expressions have a leading seconds field and are evaluated in UTC.

use std::sync::Arc;

use secnews_digest::DigestPipeline;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive for
/// the lifetime of the process. Dropping it shuts down all scheduled jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// `cron` does not parse, or the scheduler fails to start.
pub async fn build_scheduler(
    pipeline: Arc<DigestPipeline>,
    cron: &str,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    register_digest_job(&scheduler, pipeline, cron).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_digest_job(
    scheduler: &JobScheduler,
    pipeline: Arc<DigestPipeline>,
    cron: &str,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(cron, move |_uuid, _lock| {
        let pipeline = Arc::clone(&pipeline);

        Box::pin(async move {
            tracing::info!("scheduler: starting digest run");
            let outcome = pipeline.run().await;
            tracing::info!(outcome = %outcome, "scheduler: digest run finished");
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron, "scheduler: digest job registered");
    Ok(())
}
