use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub moderation: ModerationConfig,
    #[serde(default)]
    pub scheduler: Option<SchedulerConfig>,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

/// Settings for the publication decision and the moderation window.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ModerationConfig {
    /// Ratings at or above this value publish immediately.
    #[serde(default = "default_publish_threshold")]
    pub publish_threshold: u8,
    /// Length of the moderation window for negative reviews, in days.
    #[serde(default = "default_window_days")]
    pub window_days: u32,
    /// Day offsets (from submission) at which business reminders go out.
    /// Must all fall inside the moderation window.
    #[serde(default = "default_reminder_days")]
    pub reminder_days: Vec<u32>,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            publish_threshold: default_publish_threshold(),
            window_days: default_window_days(),
            reminder_days: default_reminder_days(),
        }
    }
}

impl ModerationConfig {
    pub fn window(&self) -> Duration {
        Duration::days(i64::from(self.window_days))
    }

    /// Days remaining in the window when a reminder at `day_offset` fires.
    pub fn days_remaining(&self, day_offset: u32) -> u32 {
        self.window_days.saturating_sub(day_offset)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SchedulerConfig {
    /// Interval between backstop sweeps, in seconds.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    /// Run a sweep immediately when the daemon starts.
    #[serde(default = "default_true")]
    pub run_on_startup: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_from_email")]
    pub from_email: String,
    #[serde(default = "default_from_name")]
    pub from_name: String,
    #[serde(default = "default_site_name")]
    pub site_name: String,
    #[serde(default = "default_site_url")]
    pub site_url: String,
    #[serde(default)]
    pub sendgrid: Option<SendGridConfig>,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            from_email: default_from_email(),
            from_name: default_from_name(),
            site_name: default_site_name(),
            site_url: default_site_url(),
            sendgrid: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SendGridConfig {
    pub api_key: String,
}

fn default_publish_threshold() -> u8 {
    3
}

fn default_window_days() -> u32 {
    7
}

fn default_reminder_days() -> Vec<u32> {
    vec![3, 5, 6]
}

fn default_sweep_interval_secs() -> u64 {
    3600
}

fn default_true() -> bool {
    true
}

fn default_from_email() -> String {
    "noreply@reviewflow.example".to_string()
}

fn default_from_name() -> String {
    "Reviewflow".to_string()
}

fn default_site_name() -> String {
    "Reviewflow".to_string()
}

fn default_site_url() -> String {
    "https://reviewflow.example".to_string()
}

pub fn default_scheduler_config() -> SchedulerConfig {
    SchedulerConfig {
        sweep_interval_secs: default_sweep_interval_secs(),
        run_on_startup: default_true(),
    }
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let m = &self.moderation;
        if m.publish_threshold < 1 || m.publish_threshold > 5 {
            return Err(anyhow::anyhow!(
                "publish_threshold must be between 1 and 5, got {}",
                m.publish_threshold
            ));
        }
        if m.window_days == 0 {
            return Err(anyhow::anyhow!("window_days must be at least 1"));
        }
        for day in &m.reminder_days {
            if *day == 0 || *day >= m.window_days {
                return Err(anyhow::anyhow!(
                    "reminder day {} must fall inside the {}-day moderation window",
                    day,
                    m.window_days
                ));
            }
        }
        if let Some(scheduler) = &self.scheduler {
            if scheduler.sweep_interval_secs == 0 {
                return Err(anyhow::anyhow!("sweep_interval_secs must be at least 1"));
            }
        }
        Ok(())
    }
}
