use chrono::{DateTime, Utc};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{Duration, Instant, sleep_until},
};

use crate::api::JsonSource;
use crate::app_context::AppContext;
use crate::config::{MAX_POLL_INTERVAL_SECS, UpdatePolicy};

use super::cycle::fetch_cycle;
use super::render::{RenderOptions, render_dashboard};
use super::sink::FrameSink;
use super::state::{CycleSummary, DisplayState};

/// Owns the polling task of a mounted dashboard.
///
/// [`PollingHandle::shutdown`] stops the timer and waits for the task to
/// finish; dropping the handle without calling it aborts the task. Either way
/// no cycle runs, and no in-flight response is applied, after teardown.
pub struct PollingHandle {
    stop_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl PollingHandle {
    pub async fn shutdown(mut self) {
        let _ = self.stop_tx.send(true);
        if let Some(task) = self.task.take()
            && let Err(error) = task.await
        {
            log::error!("dashboard_task_join_failed error={}", error);
        }
    }

    #[cfg(test)]
    pub(crate) fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(|task| task.is_finished())
    }
}

impl Drop for PollingHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Renders the empty dashboard, then polls immediately and on every interval.
pub fn mount<S, K>(source: S, app_context: AppContext, sink: K) -> PollingHandle
where
    S: JsonSource + Send + Sync + 'static,
    K: FrameSink,
{
    let (stop_tx, stop_rx) = watch::channel(false);
    let task = tokio::spawn(run_polling_loop(source, app_context, sink, stop_rx));

    PollingHandle {
        stop_tx,
        task: Some(task),
    }
}

/// One polling cycle: fetch, apply under the current update policy, log.
pub async fn poll_once<S>(source: &S, app_context: &AppContext) -> CycleSummary
where
    S: JsonSource + Sync,
{
    let policy = app_context.runtime_config.read().await.update_policy;
    {
        let mut tick = app_context.last_poll_tick.lock().await;
        *tick = Some(Utc::now());
    }

    let report = fetch_cycle(source, policy).await;
    let (summary, totals) = {
        let mut state = app_context.display_state.write().await;
        let summary = state.apply(report, policy, Utc::now());
        (summary, CycleTotals::from_state(&state))
    };

    log_cycle(&summary, policy, &totals);
    summary
}

pub async fn render_frame(app_context: &AppContext) -> String {
    let options = RenderOptions {
        title: app_context.config.dashboard.title.clone(),
        timezone: app_context.runtime_config.read().await.display_timezone,
    };
    let state = app_context.display_state.read().await;
    render_dashboard(&state, &options)
}

async fn run_polling_loop<S, K>(
    source: S,
    app_context: AppContext,
    mut sink: K,
    mut stop_rx: watch::Receiver<bool>,
) where
    S: JsonSource + Send + Sync + 'static,
    K: FrameSink,
{
    sink.present(&render_frame(&app_context).await);

    let mut previous_tick: Option<Instant> = None;

    loop {
        if *stop_rx.borrow() {
            break;
        }

        let runtime_config = app_context.runtime_config.read().await.clone();
        let interval_secs = runtime_config.poll_interval_secs.min(MAX_POLL_INTERVAL_SECS);
        let cycle_started = Instant::now();

        if let Some(previous) = previous_tick {
            let elapsed_secs = cycle_started.duration_since(previous).as_secs();
            let threshold_secs = interval_secs * 2;
            if elapsed_secs > threshold_secs {
                log::warn!(
                    "poll_loop_delayed elapsed_secs={} threshold_secs={}",
                    elapsed_secs,
                    threshold_secs
                );
            }
        }
        previous_tick = Some(cycle_started);

        let summary = tokio::select! {
            summary = poll_once(&source, &app_context) => summary,
            _ = stop_rx.changed() => {
                log::info!("poll_cycle_cancelled reason=teardown");
                break;
            }
        };

        if summary.changed() {
            sink.present(&render_frame(&app_context).await);
        }

        let deadline = cycle_started
            .checked_add(Duration::from_secs(interval_secs))
            .unwrap_or(cycle_started);
        tokio::select! {
            _ = sleep_until(deadline) => {}
            _ = app_context.runtime_update_notify.notified() => {
                log::info!(
                    "poll_interval_change_interrupt_applied previous_interval_secs={}",
                    runtime_config.poll_interval_secs
                );
            }
            _ = stop_rx.changed() => break,
        }
    }

    log::info!("dashboard_unmounted");
}

struct CycleTotals {
    cycles_ok: u64,
    cycles_failed: u64,
    last_updated_at: Option<DateTime<Utc>>,
}

impl CycleTotals {
    fn from_state(state: &DisplayState) -> Self {
        Self {
            cycles_ok: state.cycles_ok,
            cycles_failed: state.cycles_failed,
            last_updated_at: state.last_updated_at,
        }
    }
}

fn log_cycle(summary: &CycleSummary, policy: UpdatePolicy, totals: &CycleTotals) {
    for error in &summary.errors {
        log::error!(
            "poll_cycle_failed resource={} kind={} error={}",
            error.resource(),
            error.kind(),
            error
        );
    }

    let last_updated_at = totals
        .last_updated_at
        .map(|at| at.to_rfc3339())
        .unwrap_or_else(|| "never".to_string());

    tracing::info!(
        target: "dashboard",
        module = "dashboard",
        policy = ?policy,
        updated = summary.updated.len(),
        failed = summary.errors.len(),
        skipped = summary.skipped.len(),
        cycles_ok = totals.cycles_ok,
        cycles_failed = totals.cycles_failed,
        last_updated_at = %last_updated_at,
        "poll_cycle_applied"
    );
}
