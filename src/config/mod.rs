mod defaults;
mod io;
mod schema;
mod validate;

pub use defaults::MAX_POLL_INTERVAL_SECS;
pub use io::{load_config, load_config_or_default};
#[allow(unused_imports)]
pub use schema::{
    ApiConfig, Config, DashboardConfig, DisplayTimezone, RuntimeConfig, UpdatePolicy,
};
pub use validate::ConfigError;
