use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, Notify, RwLock};

use crate::{
    config::{Config, RuntimeConfig},
    dashboard::DisplayState,
};

#[derive(Clone)]
pub struct AppContext {
    pub config: Config,
    pub config_path: String,
    pub runtime_config: Arc<RwLock<RuntimeConfig>>,
    pub runtime_update_notify: Arc<Notify>,
    pub display_state: Arc<RwLock<DisplayState>>,
    pub last_poll_tick: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl AppContext {
    pub fn new(config: Config, config_path: impl Into<String>) -> Self {
        let runtime_config = RuntimeConfig::from_config(&config);
        Self {
            config,
            config_path: config_path.into(),
            runtime_config: Arc::new(RwLock::new(runtime_config)),
            runtime_update_notify: Arc::new(Notify::new()),
            display_state: Arc::new(RwLock::new(DisplayState::default())),
            last_poll_tick: Arc::new(Mutex::new(None)),
        }
    }

    /// Swaps the runtime settings and wakes the polling loop if they changed.
    /// Returns `false` when `runtime_config` equals the current settings.
    pub async fn update_runtime_config(&self, runtime_config: RuntimeConfig) -> bool {
        {
            let mut current = self.runtime_config.write().await;
            if *current == runtime_config {
                return false;
            }
            *current = runtime_config;
        }
        self.runtime_update_notify.notify_one();
        true
    }
}
