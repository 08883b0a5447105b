use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Anomaly {
    #[serde(default, deserialize_with = "lenient_string")]
    pub service: String,
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(default)]
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ServiceScaling {
    pub current_instances: u32,
    pub min_instances: u32,
    pub max_instances: u32,
}

/// Service name to instance counts. Sorted so frames render deterministically.
pub type ScalingStatus = BTreeMap<String, ServiceScaling>;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemediationRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub action: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(default)]
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LlmResponse {
    #[serde(default, deserialize_with = "lenient_string")]
    pub query: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub response: String,
    #[serde(default)]
    pub timestamp: Timestamp,
}

/// Timestamp as the backend sent it; parsed only when rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Timestamp {
    #[default]
    Missing,
    Text(String),
    /// Milliseconds since the Unix epoch.
    EpochMillis(i64),
    Unsupported,
}

impl Timestamp {
    #[cfg(test)]
    pub(crate) fn new(raw: impl Into<String>) -> Self {
        Self::Text(raw.into())
    }

    /// RFC 3339, a naive date/date-time taken as UTC, or epoch milliseconds.
    pub fn parse(&self) -> Option<DateTime<Utc>> {
        let raw = match self {
            Timestamp::Text(raw) => raw.trim(),
            Timestamp::EpochMillis(millis) => return DateTime::from_timestamp_millis(*millis),
            Timestamp::Missing | Timestamp::Unsupported => return None,
        };

        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }

        for format in NAIVE_DATETIME_FORMATS {
            if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
                return Some(parsed.and_utc());
            }
        }

        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|datetime| datetime.and_utc())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Null => Self::Missing,
            Value::String(raw) => Self::Text(raw),
            Value::Number(number) => match number.as_i64() {
                Some(millis) => Self::EpochMillis(millis),
                None => number
                    .as_f64()
                    .filter(|millis| millis.is_finite())
                    .map(|millis| Self::EpochMillis(millis.trunc() as i64))
                    .unwrap_or(Self::Unsupported),
            },
            _ => Self::Unsupported,
        })
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => String::new(),
        Value::String(text) => text,
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::{Anomaly, LlmResponse, ScalingStatus, Timestamp};

    #[test]
    fn anomaly_maps_type_field_and_tolerates_nulls() {
        let anomalies: Vec<Anomaly> = serde_json::from_value(json!([
            {"service": "api", "type": "latency", "timestamp": "2024-01-01T00:00:00Z"},
            {"service": null, "type": "error_rate", "timestamp": null, "message": "extra"}
        ]))
        .expect("anomalies should decode");

        assert_eq!(anomalies[0].kind, "latency");
        assert_eq!(anomalies[1].service, "");
        assert_eq!(anomalies[1].timestamp, Timestamp::Missing);
    }

    #[test]
    fn scaling_status_requires_integer_counts() {
        let ok: ScalingStatus = serde_json::from_value(json!({
            "web-server": {"current_instances": 2, "min_instances": 1, "max_instances": 5}
        }))
        .expect("scaling should decode");
        assert_eq!(ok["web-server"].current_instances, 2);

        let bad = serde_json::from_value::<ScalingStatus>(json!({
            "web-server": {"current_instances": "two", "min_instances": 1, "max_instances": 5}
        }));
        assert!(bad.is_err());
    }

    #[test]
    fn llm_response_keeps_multiline_text() {
        let response: LlmResponse = serde_json::from_value(json!({
            "query": "why is the database slow?",
            "response": "1. Check indexes\n2. Restart the node",
            "timestamp": "2025-04-16T10:06:00"
        }))
        .expect("llm response should decode");

        assert!(response.response.contains('\n'));
    }

    #[test]
    fn timestamp_parses_offset_and_naive_forms() {
        let expected = Utc.with_ymd_and_hms(2025, 4, 16, 10, 1, 0).single();

        assert_eq!(Timestamp::new("2025-04-16T10:01:00Z").parse(), expected);
        assert_eq!(Timestamp::new("2025-04-16T12:01:00+02:00").parse(), expected);
        assert_eq!(Timestamp::new("2025-04-16T10:01:00.000").parse(), expected);
        assert_eq!(Timestamp::new("2025-04-16 10:01:00").parse(), expected);
        assert_eq!(
            Timestamp::new("2025-04-16").parse(),
            Utc.with_ymd_and_hms(2025, 4, 16, 0, 0, 0).single()
        );
        assert_eq!(Timestamp::new("yesterday").parse(), None);
        assert_eq!(Timestamp::default().parse(), None);
    }

    #[test]
    fn numeric_timestamp_is_epoch_milliseconds() {
        let anomaly: Anomaly = serde_json::from_value(json!({
            "service": "api", "type": "latency", "timestamp": 1_704_067_200_000_i64
        }))
        .expect("anomaly should decode");

        assert_eq!(anomaly.timestamp, Timestamp::EpochMillis(1_704_067_200_000));
        assert_eq!(
            anomaly.timestamp.parse(),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single()
        );

        let odd: Anomaly = serde_json::from_value(json!({"timestamp": {"at": 1}}))
            .expect("anomaly should decode");
        assert_eq!(odd.timestamp, Timestamp::Unsupported);
        assert_eq!(odd.timestamp.parse(), None);
    }
}
