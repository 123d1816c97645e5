pub mod business;
pub mod daemon;
pub mod review;
pub mod sweep;

use crate::output::Output;
use color_eyre::Result;
use review_lifecycle_config::{Config, PathManager};
use review_lifecycle_core::{FileStore, LifecycleEngine};
use review_lifecycle_notify::{LogDispatcher, NotificationDispatcher, SendGridDispatcher};
use std::sync::Arc;
use tracing::info;

/// Everything a command needs: the engine wired to the file store and the
/// configured notification transport.
pub struct AppContext {
    pub engine: Arc<LifecycleEngine>,
    pub store: Arc<FileStore>,
    pub config: Config,
    pub paths: PathManager,
}

pub fn load_config(paths: &PathManager) -> Result<Config> {
    let config_file = paths.config_file();
    if config_file.exists() {
        Config::load_from_file(&config_file).map_err(|e| {
            color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e)
        })
    } else {
        info!(
            operation = "config_defaults",
            path = %config_file.display(),
            "No config file found, using defaults"
        );
        Ok(Config::default())
    }
}

pub fn build_context(output: &Output) -> Result<AppContext> {
    let paths = PathManager::default();
    paths
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create app directories: {}", e))?;
    let config = load_config(&paths)?;

    let store = Arc::new(
        FileStore::open(paths.store_file())
            .map_err(|e| color_eyre::eyre::eyre!("Failed to open review store: {}", e))?,
    );

    let notifications = &config.notifications;
    let dispatcher: Arc<dyn NotificationDispatcher> =
        if notifications.enabled && notifications.sendgrid.is_some() {
            Arc::new(
                SendGridDispatcher::from_config(notifications)
                    .map_err(|e| color_eyre::eyre::eyre!("Notification setup failed: {}", e))?,
            )
        } else {
            if notifications.enabled {
                output.warn("No notification transport configured; emails will only be logged");
            }
            Arc::new(LogDispatcher)
        };

    let engine = Arc::new(LifecycleEngine::new(
        store.clone(),
        store.clone(),
        dispatcher,
        config.moderation.clone(),
    ));

    Ok(AppContext {
        engine,
        store,
        config,
        paths,
    })
}
