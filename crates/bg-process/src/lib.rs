use std::sync::Arc;

use async_trait::async_trait;
use eyre::Error;
use ledger::Ledger;
use tokio_cron_scheduler::{Job, JobScheduler};

pub mod process;

#[async_trait]
pub trait Task: Clone + Send + Sync + 'static {
    const NAME: &'static str;
    const CRON: &'static str;

    async fn process(&mut self) -> Result<(), Error>;
}

pub async fn start(ledger: Arc<Ledger>) -> Result<JobScheduler, Error> {
    let scheduler = JobScheduler::new()
        .await
        .map_err(|err| eyre::eyre!("Failed to create scheduler: {err:?}"))?;
    register(
        &scheduler,
        process::nutrition::NutritionReminderBg::new(ledger),
    )
    .await?;
    scheduler
        .start()
        .await
        .map_err(|err| eyre::eyre!("Failed to start scheduler: {err:?}"))?;
    Ok(scheduler)
}

async fn register<T: Task>(scheduler: &JobScheduler, task: T) -> Result<(), Error> {
    let job = Job::new_async(T::CRON, move |_uuid, _lock| {
        let mut task = task.clone();
        Box::pin(async move {
            if let Err(err) = task.process().await {
                log::error!("Task {} failed: {:#}", T::NAME, err);
            }
        })
    })
    .map_err(|err| eyre::eyre!("Failed to create job {}: {err:?}", T::NAME))?;
    scheduler
        .add(job)
        .await
        .map_err(|err| eyre::eyre!("Failed to add job {}: {err:?}", T::NAME))?;
    Ok(())
}
