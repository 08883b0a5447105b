use crate::app_context::AppContext;

mod config_reload;

pub fn start_background_jobs(app_context: AppContext) {
    config_reload::start_config_hot_reload_job(app_context);
}
