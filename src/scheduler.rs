use anyhow::Result;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{Duration, interval};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::config::SchedulerConfig;
use crate::state::SharedState;

/// Background loop that periodically refreshes stale TMDb metadata.
///
/// Runs either on a fixed interval (`check_interval_minutes`) or, when
/// `cron_expression` is set, on a cron schedule.
pub struct Scheduler {
    state: Arc<SharedState>,
    config: SchedulerConfig,
    running: Arc<RwLock<bool>>,
}

impl Scheduler {
    pub fn new(state: Arc<SharedState>, config: SchedulerConfig) -> Self {
        Self {
            state,
            config,
            running: Arc::new(RwLock::new(false)),
        }
    }

    pub async fn start(&self) -> Result<()> {
        if !self.config.enabled {
            info!("Scheduler is disabled in config");
            return Ok(());
        }

        *self.running.write().await = true;
        info!("Starting background scheduler");

        if let Some(cron_expr) = &self.config.cron_expression {
            self.run_with_cron(cron_expr).await
        } else {
            self.run_with_interval().await
        }
    }

    async fn run_with_cron(&self, cron_expr: &str) -> Result<()> {
        let mut sched = JobScheduler::new().await?;

        let state = Arc::clone(&self.state);
        let running = Arc::clone(&self.running);
        let batch_limit = self.config.refresh_batch_limit;

        let job = Job::new_async(cron_expr, move |_uuid, _lock| {
            let state = Arc::clone(&state);
            let running = Arc::clone(&running);
            Box::pin(async move {
                if !*running.read().await {
                    return;
                }
                run_refresh_pass(&state, batch_limit).await;
            })
        })?;

        sched.add(job).await?;
        sched.start().await?;

        info!("Scheduler running with cron: {}", cron_expr);

        loop {
            if !*self.running.read().await {
                break;
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }

        sched.shutdown().await?;
        Ok(())
    }

    async fn run_with_interval(&self) -> Result<()> {
        let interval_mins = self.config.check_interval_minutes;
        let batch_limit = self.config.refresh_batch_limit;

        info!("Scheduler running every {} minutes", interval_mins);

        let mut check_interval = interval(Duration::from_secs(u64::from(interval_mins) * 60));

        // The first tick fires immediately; skip it so startup is not a
        // full refresh pass.
        check_interval.tick().await;

        loop {
            check_interval.tick().await;
            if !*self.running.read().await {
                break;
            }
            run_refresh_pass(&self.state, batch_limit).await;
        }

        Ok(())
    }

    pub async fn stop(&self) {
        info!("Stopping scheduler...");
        *self.running.write().await = false;
    }
}

async fn run_refresh_pass(state: &Arc<SharedState>, batch_limit: u64) {
    info!("Running scheduled metadata refresh...");
    match state.refresh.run_batch(batch_limit).await {
        Ok(report) => {
            info!(
                "Scheduled refresh complete: {} processed, {} updated, {} failed, {} skipped",
                report.processed, report.updated, report.failed, report.skipped
            );
        }
        Err(e) => {
            error!("Scheduled metadata refresh failed: {}", e);
        }
    }
}
