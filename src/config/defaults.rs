use super::schema::{ApiConfig, DashboardConfig, DisplayTimezone, UpdatePolicy};

pub(super) fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

pub(super) fn default_request_timeout_secs() -> u64 {
    10
}

pub(super) fn default_user_agent() -> String {
    format!("healwatch/{}", env!("CARGO_PKG_VERSION"))
}

pub const MAX_POLL_INTERVAL_SECS: u64 = 86_400;

pub(super) fn default_poll_interval_secs() -> u64 {
    30
}

pub(super) fn default_title() -> String {
    "Self-Healing System Monitor".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            update_policy: UpdatePolicy::default(),
            display_timezone: DisplayTimezone::default(),
            clear_screen: false,
            title: default_title(),
        }
    }
}
