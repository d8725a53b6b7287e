use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{Duration, interval};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::config::SchedulerConfig;
use crate::state::SharedState;

pub struct Scheduler {
    state: Arc<SharedState>,
    config: SchedulerConfig,
    running: Arc<RwLock<bool>>,
}

impl Scheduler {
    #[must_use]
    pub fn new(state: Arc<SharedState>, config: SchedulerConfig) -> Self {
        Self {
            state,
            config,
            running: Arc::new(RwLock::new(false)),
        }
    }

    /// Runs the timer loop until [`Scheduler::stop`] is called. The reminder job runs on
    /// its own cron schedule alongside it.
    pub async fn start(&self) -> Result<()> {
        if !self.config.enabled {
            info!("Scheduler is disabled in config");
            return Ok(());
        }

        *self.running.write().await = true;
        info!("Starting background scheduler");

        let mut sched = JobScheduler::new().await?;

        let state = Arc::clone(&self.state);
        let running = Arc::clone(&self.running);
        let reminder_job = Job::new_async(self.config.reminder_cron.as_str(), move |_uuid, _lock| {
            let state = Arc::clone(&state);
            let running = Arc::clone(&running);
            Box::pin(async move {
                if !*running.read().await {
                    return;
                }
                let start = std::time::Instant::now();
                info!(event = "job_started", job_name = "unresolved_reminders", "Sending unresolved topic reminders");

                match state.reminders.send_reminders(Utc::now()).await {
                    Ok(sent) => info!(
                        event = "job_finished",
                        job_name = "unresolved_reminders",
                        sent,
                        duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
                        "Unresolved topic reminders finished"
                    ),
                    Err(e) => {
                        error!(event = "job_failed", job_name = "unresolved_reminders", error = %e, "Unresolved topic reminders failed");
                    }
                }
            })
        })?;

        sched.add(reminder_job).await?;
        sched.start().await?;
        info!("Unresolved reminders scheduled: {}", self.config.reminder_cron);

        let result = self.run_timer_loop().await;
        sched.shutdown().await?;
        result
    }

    async fn run_timer_loop(&self) -> Result<()> {
        let every = self.config.timer_check_interval_seconds.max(1);
        info!("Checking auto-close timers every {}s", every);

        let mut ticker = interval(Duration::from_secs(every));
        loop {
            ticker.tick().await;
            if !*self.running.read().await {
                break;
            }

            if let Err(e) = self.state.auto_close.run_due(Utc::now()).await {
                error!(event = "job_failed", job_name = "auto_close", error = %e, "Auto-close timer check failed");
            }

            self.state.rate_limiter.prune();
        }

        Ok(())
    }

    pub async fn stop(&self) {
        info!("Stopping scheduler...");
        *self.running.write().await = false;
    }

    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    /// Runs every job once, for the CLI and tests.
    pub async fn run_once(&self) -> Result<()> {
        info!("Running manual check...");

        self.state.auto_close.run_due(Utc::now()).await?;
        self.state.reminders.send_reminders(Utc::now()).await?;

        Ok(())
    }
}
