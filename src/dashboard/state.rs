use chrono::{DateTime, Utc};

use crate::config::UpdatePolicy;

use super::cycle::{CycleReport, FetchOutcome, Resource, ResourceError};
use super::model::{Anomaly, LlmResponse, RemediationRecord, ScalingStatus};

/// Client-local copies of the four backend resources.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayState {
    pub anomalies: Vec<Anomaly>,
    pub scaling: ScalingStatus,
    pub remediation: Vec<RemediationRecord>,
    pub llm_responses: Vec<LlmResponse>,
    pub last_updated_at: Option<DateTime<Utc>>,
    pub cycles_ok: u64,
    pub cycles_failed: u64,
}

/// What a cycle did to the display state.
#[derive(Debug, Default)]
pub struct CycleSummary {
    pub updated: Vec<Resource>,
    pub skipped: Vec<Resource>,
    pub errors: Vec<ResourceError>,
}

impl CycleSummary {
    pub fn changed(&self) -> bool {
        !self.updated.is_empty()
    }

    pub fn failed(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl DisplayState {
    pub fn apply(
        &mut self,
        report: CycleReport,
        policy: UpdatePolicy,
        now: DateTime<Utc>,
    ) -> CycleSummary {
        let replace = match policy {
            UpdatePolicy::AllOrNothing => report.is_complete(),
            UpdatePolicy::PerResource => true,
        };

        let mut summary = CycleSummary::default();
        let CycleReport {
            anomalies,
            scaling,
            remediation,
            llm_responses,
        } = report;

        absorb(
            &mut self.anomalies,
            anomalies,
            Resource::Anomalies,
            replace,
            &mut summary,
        );
        absorb(&mut self.scaling, scaling, Resource::Scaling, replace, &mut summary);
        absorb(
            &mut self.remediation,
            remediation,
            Resource::Remediation,
            replace,
            &mut summary,
        );
        absorb(
            &mut self.llm_responses,
            llm_responses,
            Resource::LlmResponses,
            replace,
            &mut summary,
        );

        if summary.failed() {
            self.cycles_failed += 1;
        } else {
            self.cycles_ok += 1;
        }
        if summary.changed() {
            self.last_updated_at = Some(now);
        }

        summary
    }
}

fn absorb<T>(
    slot: &mut T,
    outcome: FetchOutcome<T>,
    resource: Resource,
    replace: bool,
    summary: &mut CycleSummary,
) {
    match outcome {
        FetchOutcome::Fetched(value) => {
            if replace {
                *slot = value;
                summary.updated.push(resource);
            }
        }
        FetchOutcome::Failed(error) => summary.errors.push(error),
        FetchOutcome::Skipped => summary.skipped.push(resource),
    }
}
