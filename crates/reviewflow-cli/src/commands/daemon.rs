use super::{AppContext, build_context};
use crate::output::Output;
use chrono::Utc;
use color_eyre::Result;
use review_lifecycle_config::{SchedulerConfig, default_scheduler_config};
use review_lifecycle_core::LifecycleEngine;
use std::sync::Arc;
use tracing::{error, info};

pub struct Scheduler {
    engine: Arc<LifecycleEngine>,
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(engine: Arc<LifecycleEngine>, config: SchedulerConfig) -> Self {
        Self { engine, config }
    }

    pub async fn start(&self) -> Result<()> {
        if self.config.run_on_startup {
            info!(
                operation = "scheduler_startup",
                "Running initial sweep on startup"
            );
            self.run_sweeps().await;
        }

        // Exact-time tasks for reviews that were pending before this process
        // started; reviews submitted later are picked up by the rescan after
        // each sweep, and the periodic sweep itself backstops anything missed.
        self.reschedule().await;

        info!(
            operation = "scheduler_started",
            sweep_interval_secs = self.config.sweep_interval_secs,
            "Scheduler started"
        );

        loop {
            tokio::time::sleep(tokio::time::Duration::from_secs(self.config.sweep_interval_secs))
                .await;
            self.run_sweeps().await;
            self.reschedule().await;
        }
    }

    /// Schedule one-shot tasks for reviews that went pending since the last
    /// pass; reviews already scheduled are skipped.
    async fn reschedule(&self) {
        match Arc::clone(&self.engine).pending_one_shots().await {
            Ok(count) if count > 0 => {
                info!(
                    operation = "one_shots_scheduled",
                    count, "Scheduled deadline and reminder tasks for pending reviews"
                );
            }
            Ok(_) => {}
            Err(e) => {
                error!(
                    operation = "one_shots_error",
                    error = %e,
                    "Failed to schedule one-shot tasks, relying on sweeps"
                );
            }
        }
    }

    /// Auto-publish first so reminders never fire for a review that is
    /// already past its deadline in the same pass.
    async fn run_sweeps(&self) {
        let now = Utc::now();
        match self.engine.auto_publish_due(now).await {
            Ok(stats) => {
                info!(
                    operation = "sweep_auto_publish_complete",
                    examined = stats.examined,
                    published = stats.published,
                    failures = stats.failures,
                    "Auto-publish pass complete"
                );
            }
            Err(e) => {
                error!(
                    operation = "sweep_error",
                    error = %e,
                    "Auto-publish pass failed"
                );
            }
        }
        match self.engine.send_due_reminders(now).await {
            Ok(stats) => {
                info!(
                    operation = "sweep_reminders_complete",
                    examined = stats.examined,
                    reminders_sent = stats.reminders_sent,
                    failures = stats.failures,
                    "Reminder pass complete"
                );
            }
            Err(e) => {
                error!(
                    operation = "sweep_error",
                    error = %e,
                    "Reminder pass failed"
                );
            }
        }
    }
}

pub async fn run_daemon(
    interval_override: Option<u64>,
    no_startup_sweep: bool,
    output: &Output,
) -> Result<()> {
    let context: AppContext = build_context(output)?;

    let mut scheduler_config = context
        .config
        .scheduler
        .clone()
        .unwrap_or_else(default_scheduler_config);
    if let Some(interval) = interval_override {
        scheduler_config.sweep_interval_secs = interval;
    }
    if no_startup_sweep {
        scheduler_config.run_on_startup = false;
    }

    output.info(format!(
        "Starting scheduler (sweep every {}s, store: {})",
        scheduler_config.sweep_interval_secs,
        context.paths.store_file().display()
    ));

    let scheduler = Scheduler::new(context.engine, scheduler_config);
    scheduler.start().await
}
