mod api;
mod app_context;
mod config;
mod dashboard;
mod jobs;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::api::ApiClient;
use crate::app_context::AppContext;
use crate::config::load_config_or_default;
use crate::dashboard::{StdoutSink, mount, poll_once, render_frame};
use crate::jobs::start_background_jobs;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Parser)]
#[command(name = "healwatch")]
#[command(about = "Terminal dashboard for the self-healing observability backend", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Run a single polling cycle, print the dashboard and exit
    #[arg(long)]
    once: bool,
}

fn init_json_logging() {
    if let Err(error) = tracing_log::LogTracer::init() {
        eprintln!(
            "logging bridge initialization failed (continuing with existing logger): {}",
            error
        );
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .json()
        .with_current_span(false)
        .with_span_list(false)
        .finish();

    if let Err(error) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("global logger initialization failed: {}", error);
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_json_logging();

    let config = match load_config_or_default(&cli.config) {
        Ok(config) => config,
        Err(error) => {
            log::error!("Configuration error: {}", error);
            return ExitCode::FAILURE;
        }
    };

    let client = match ApiClient::new(&config.api) {
        Ok(client) => client,
        Err(error) => {
            log::error!("API client initialization failed: {}", error);
            return ExitCode::FAILURE;
        }
    };

    log::info!(
        "healwatch starting base_url={} poll_interval_secs={} update_policy={:?}",
        client.base_url(),
        config.dashboard.poll_interval_secs,
        config.dashboard.update_policy
    );

    let clear_screen = config.dashboard.clear_screen;
    let app_context = AppContext::new(config, cli.config.clone());

    if cli.once {
        let summary = poll_once(&client, &app_context).await;
        println!("{}", render_frame(&app_context).await);
        return if summary.failed() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        };
    }

    start_background_jobs(app_context.clone());
    let last_poll_tick = app_context.last_poll_tick.clone();
    let handle = mount(client, app_context, StdoutSink::new(clear_screen));

    if let Err(error) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for shutdown signal: {}", error);
    }

    log::info!("shutdown requested, unmounting dashboard");
    handle.shutdown().await;

    let last_tick = *last_poll_tick.lock().await;
    let last_tick_text = last_tick
        .map(|tick| tick.to_rfc3339())
        .unwrap_or_else(|| "never".to_string());
    log::info!("healwatch stopped last_poll_tick={}", last_tick_text);
    ExitCode::SUCCESS
}
