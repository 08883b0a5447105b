use chrono::{DateTime, Local, Utc};

use crate::config::DisplayTimezone;

use super::model::Timestamp;
use super::state::DisplayState;

// en-US `toLocaleString()` layout.
const TIMESTAMP_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";
const INVALID_TIMESTAMP: &str = "Invalid Date";
const CONTINUATION_INDENT: &str = "  ";

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub title: String,
    pub timezone: DisplayTimezone,
}

pub fn render_dashboard(state: &DisplayState, options: &RenderOptions) -> String {
    let tz = options.timezone;

    let anomalies = state
        .anomalies
        .iter()
        .map(|anomaly| {
            [
                labeled("Service", &anomaly.service),
                labeled("Type", &anomaly.kind),
                labeled("Timestamp", &format_timestamp(&anomaly.timestamp, tz)),
            ]
            .join("\n")
        })
        .collect::<Vec<_>>();

    let scaling = state
        .scaling
        .iter()
        .map(|(service, status)| {
            format!(
                "{}: {} instances (Min: {}, Max: {})",
                service, status.current_instances, status.min_instances, status.max_instances
            )
        })
        .collect::<Vec<_>>();

    let remediation = state
        .remediation
        .iter()
        .map(|item| {
            [
                labeled("Action", &item.action),
                labeled("Status", &item.status),
                labeled("Timestamp", &format_timestamp(&item.timestamp, tz)),
            ]
            .join("\n")
        })
        .collect::<Vec<_>>();

    let llm_responses = state
        .llm_responses
        .iter()
        .map(|entry| {
            [
                labeled("Query", &entry.query),
                labeled("Response", &entry.response),
                labeled("Timestamp", &format_timestamp(&entry.timestamp, tz)),
            ]
            .join("\n")
        })
        .collect::<Vec<_>>();

    let mut out = heading(&options.title, '=');
    out.push_str(&panel("Anomaly Detection", &anomalies.join("\n\n")));
    out.push_str(&panel("Auto Scaling Status", &scaling.join("\n")));
    out.push_str(&panel("Remediation History", &remediation.join("\n\n")));
    out.push_str(&panel("LLM Responses", &llm_responses.join("\n\n")));
    out.truncate(out.trim_end().len());
    out
}

/// Missing and unparseable timestamps both print `Invalid Date`.
pub fn format_timestamp(timestamp: &Timestamp, timezone: DisplayTimezone) -> String {
    match timestamp.parse() {
        Some(instant) => format_instant(instant, timezone),
        None => INVALID_TIMESTAMP.to_string(),
    }
}

fn format_instant(instant: DateTime<Utc>, timezone: DisplayTimezone) -> String {
    match timezone {
        DisplayTimezone::Utc => instant.format(TIMESTAMP_FORMAT).to_string(),
        DisplayTimezone::Local => instant
            .with_timezone(&Local)
            .format(TIMESTAMP_FORMAT)
            .to_string(),
    }
}

fn heading(title: &str, underline: char) -> String {
    let rule: String = std::iter::repeat_n(underline, title.chars().count()).collect();
    format!("{}\n{}\n", title, rule)
}

fn panel(title: &str, body: &str) -> String {
    let mut out = String::from("\n");
    out.push_str(&heading(title, '-'));
    if !body.is_empty() {
        out.push_str(body);
        out.push('\n');
    }
    out
}

// Multi-line values keep their line breaks, indented under the label.
fn labeled(label: &str, value: &str) -> String {
    let mut lines = value.lines();
    let first = lines.next().unwrap_or("");
    let mut out = format!("{}: {}", label, first);
    for line in lines {
        out.push('\n');
        out.push_str(CONTINUATION_INDENT);
        out.push_str(line);
    }
    out
}
