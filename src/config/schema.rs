use serde::Deserialize;

use super::defaults::*;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    pub poll_interval_secs: u64,
    pub update_policy: UpdatePolicy,
    pub display_timezone: DisplayTimezone,
}

impl RuntimeConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            poll_interval_secs: config.dashboard.poll_interval_secs,
            update_policy: config.dashboard.update_policy,
            display_timezone: config.dashboard.display_timezone,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default)]
    pub update_policy: UpdatePolicy,
    #[serde(default)]
    pub display_timezone: DisplayTimezone,
    #[serde(default)]
    pub clear_screen: bool,
    #[serde(default = "default_title")]
    pub title: String,
}

/// Which display collections a polling cycle with failures may replace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdatePolicy {
    /// Stop at the first failed fetch and leave every collection untouched.
    #[default]
    AllOrNothing,
    /// Fetch everything and replace each collection whose fetch succeeded.
    PerResource,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayTimezone {
    #[default]
    Local,
    Utc,
}
