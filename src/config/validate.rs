use reqwest::Url;
use thiserror::Error;

use super::{defaults::MAX_POLL_INTERVAL_SECS, schema::Config};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Validation(String),
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = Url::parse(self.api.base_url.trim()).map_err(|error| {
            ConfigError::Validation(format!("api.base_url is not a valid URL: {}", error))
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::Validation(
                "api.base_url must use http or https".to_string(),
            ));
        }
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::Validation(
                "api.base_url must be an absolute base URL".to_string(),
            ));
        }
        if self.api.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "api.request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.api.user_agent.trim().is_empty() {
            return Err(ConfigError::Validation(
                "api.user_agent must not be empty".to_string(),
            ));
        }
        if self.dashboard.poll_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "dashboard.poll_interval_secs must be greater than 0".to_string(),
            ));
        }
        if self.dashboard.poll_interval_secs > MAX_POLL_INTERVAL_SECS {
            return Err(ConfigError::Validation(format!(
                "dashboard.poll_interval_secs must be at most {}",
                MAX_POLL_INTERVAL_SECS
            )));
        }
        if self.dashboard.title.trim().is_empty() {
            return Err(ConfigError::Validation(
                "dashboard.title must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
