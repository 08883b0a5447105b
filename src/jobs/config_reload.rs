use std::path::Path;

use notify::{Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::app_context::AppContext;
use crate::config::{ConfigError, RuntimeConfig, load_config};

/// Result of re-reading the config file after a change event.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum ReloadOutcome {
    Applied(RuntimeConfig),
    /// The file changed but the hot-reloadable settings did not.
    Unchanged,
}

async fn reload_runtime_config(
    app_context: &AppContext,
    config_path: &str,
) -> Result<ReloadOutcome, ConfigError> {
    let new_config = load_config(config_path)?;

    if new_config.api != app_context.config.api {
        log::warn!("config_hot_reload_partial section=api reason=restart_required");
    }

    let runtime_config = RuntimeConfig::from_config(&new_config);
    if app_context
        .update_runtime_config(runtime_config.clone())
        .await
    {
        Ok(ReloadOutcome::Applied(runtime_config))
    } else {
        Ok(ReloadOutcome::Unchanged)
    }
}

fn touches_file_contents(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Any
    )
}

async fn handle_change(app_context: &AppContext, config_path: &str) {
    match reload_runtime_config(app_context, config_path).await {
        Ok(ReloadOutcome::Applied(runtime_config)) => log::info!(
            "config_hot_reload_applied poll_interval_secs={} update_policy={:?} display_timezone={:?}",
            runtime_config.poll_interval_secs,
            runtime_config.update_policy,
            runtime_config.display_timezone,
        ),
        Ok(ReloadOutcome::Unchanged) => {
            log::debug!("config_hot_reload_skipped reason=runtime_unchanged")
        }
        Err(error) => log::warn!("config_hot_reload_rejected error={}", error),
    }
}

pub(super) fn start_config_hot_reload_job(app_context: AppContext) {
    tokio::spawn(async move {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let config_path = app_context.config_path.clone();

        let watcher = RecommendedWatcher::new(
            move |result| {
                let _ = tx.send(result);
            },
            NotifyConfig::default(),
        )
        .and_then(|mut watcher| {
            watcher
                .watch(Path::new(config_path.as_str()), RecursiveMode::NonRecursive)
                .map(|()| watcher)
        });
        // Dropping the watcher ends the event stream.
        let _watcher = match watcher {
            Ok(watcher) => watcher,
            Err(error) => {
                log::warn!(
                    "config_hot_reload_disabled path={} error={}",
                    config_path,
                    error
                );
                return;
            }
        };

        while let Some(event_result) = rx.recv().await {
            match event_result {
                Ok(event) if touches_file_contents(&event) => {
                    handle_change(&app_context, &config_path).await
                }
                Ok(_) => {}
                Err(error) => log::warn!("config_hot_reload_event_error error={}", error),
            }
        }
    });
}
