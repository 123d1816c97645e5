pub mod config;
pub mod paths;

pub use config::{
    Config, ModerationConfig, NotificationsConfig, SchedulerConfig, SendGridConfig,
    default_scheduler_config,
};
pub use paths::{PathManager, container_base_path};
