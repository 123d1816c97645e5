use super::build_context;
use crate::output::Output;
use chrono::Utc;
use color_eyre::Result;

pub async fn run_sweep(output: &Output) -> Result<()> {
    let context = build_context(output)?;
    let now = Utc::now();

    let publish = context
        .engine
        .auto_publish_due(now)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Auto-publish pass failed: {}", e))?;
    let reminders = context
        .engine
        .send_due_reminders(now)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Reminder pass failed: {}", e))?;

    output.success(format!(
        "Sweep complete: {} auto-published, {} reminder(s) sent, {} failure(s)",
        publish.published,
        reminders.reminders_sent,
        publish.failures + reminders.failures
    ));
    Ok(())
}
