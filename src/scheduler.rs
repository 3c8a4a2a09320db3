use std::sync::Arc;

use anyhow::Context;

use tokio_cron_scheduler::{Job, JobScheduler};

use crate::domain::Frequency;
use crate::service::NotificationDispatcher;
use crate::settings::SchedulerSettings;

/// Cron triggers for the notification dispatcher.
///
/// Cron expressions have six fields, seconds first, and are evaluated in UTC.
pub struct Scheduler {
    dispatcher: Arc<NotificationDispatcher>,
    sched: JobScheduler,
}

impl Scheduler {
    pub async fn new(dispatcher: Arc<NotificationDispatcher>) -> anyhow::Result<Self> {
        let sched = JobScheduler::new()
            .await
            .context("Failed to create job scheduler")?;

        Ok(Self { dispatcher, sched })
    }

    /// Register the daily and hourly dispatch jobs and start ticking.
    /// The returned handle keeps the jobs running until it is shut down.
    pub async fn start(mut self, settings: &SchedulerSettings) -> anyhow::Result<JobScheduler> {
        self.schedule(&settings.daily_cron, Frequency::Daily).await?;
        self.schedule(&settings.hourly_cron, Frequency::Hourly).await?;

        self.sched
            .start()
            .await
            .context("Failed to start job scheduler")?;

        Ok(self.sched)
    }

    async fn schedule(&mut self, cron: &str, frequency: Frequency) -> anyhow::Result<()> {
        let dispatcher = self.dispatcher.clone();

        let job = Job::new_async(cron, move |_, _| {
            let dispatcher = Arc::clone(&dispatcher);

            Box::pin(async move {
                tracing::info!(%frequency, "Dispatch tick");
                dispatcher.dispatch(frequency).await;
            })
        })
        .with_context(|| format!("Invalid {} cron expression: {}", frequency, cron))?;

        self.sched
            .add(job)
            .await
            .with_context(|| format!("Failed to schedule {} notifications", frequency))?;

        Ok(())
    }
}
