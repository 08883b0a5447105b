use std::fmt;

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::api::{ApiError, JsonSource};
use crate::config::UpdatePolicy;

use super::model::{Anomaly, LlmResponse, RemediationRecord, ScalingStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Anomalies,
    Scaling,
    Remediation,
    LlmResponses,
}

impl Resource {
    pub fn path(self) -> &'static str {
        match self {
            Resource::Anomalies => "/api/anomalies",
            Resource::Scaling => "/api/scaling",
            Resource::Remediation => "/api/remediation",
            Resource::LlmResponses => "/api/llm-responses",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Resource::Anomalies => "anomalies",
            Resource::Scaling => "scaling",
            Resource::Remediation => "remediation",
            Resource::LlmResponses => "llm_responses",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("{resource} fetch failed: {source}")]
    Fetch {
        resource: Resource,
        #[source]
        source: ApiError,
    },
    #[error("{resource} payload has an unexpected shape: {source}")]
    Shape {
        resource: Resource,
        #[source]
        source: serde_json::Error,
    },
}

impl ResourceError {
    pub fn resource(&self) -> Resource {
        match self {
            ResourceError::Fetch { resource, .. } | ResourceError::Shape { resource, .. } => {
                *resource
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ResourceError::Fetch { source, .. } => source.kind(),
            ResourceError::Shape { .. } => "shape",
        }
    }
}

#[derive(Debug)]
pub enum FetchOutcome<T> {
    Fetched(T),
    Failed(ResourceError),
    /// Not requested because an earlier fetch in the cycle failed.
    Skipped,
}

impl<T> FetchOutcome<T> {
    pub fn is_fetched(&self) -> bool {
        matches!(self, FetchOutcome::Fetched(_))
    }
}

/// Per-resource results of one polling cycle.
#[derive(Debug)]
pub struct CycleReport {
    pub anomalies: FetchOutcome<Vec<Anomaly>>,
    pub scaling: FetchOutcome<ScalingStatus>,
    pub remediation: FetchOutcome<Vec<RemediationRecord>>,
    pub llm_responses: FetchOutcome<Vec<LlmResponse>>,
}

impl CycleReport {
    pub fn is_complete(&self) -> bool {
        self.anomalies.is_fetched()
            && self.scaling.is_fetched()
            && self.remediation.is_fetched()
            && self.llm_responses.is_fetched()
    }
}

/// Fetches the four resources in order. Under [`UpdatePolicy::AllOrNothing`]
/// the first failure ends the cycle and the rest are reported as skipped.
pub async fn fetch_cycle<S>(source: &S, policy: UpdatePolicy) -> CycleReport
where
    S: JsonSource + Sync,
{
    let mut halted = false;

    let anomalies = fetch_resource(source, Resource::Anomalies, policy, &mut halted).await;
    let scaling = fetch_resource(source, Resource::Scaling, policy, &mut halted).await;
    let remediation = fetch_resource(source, Resource::Remediation, policy, &mut halted).await;
    let llm_responses = fetch_resource(source, Resource::LlmResponses, policy, &mut halted).await;

    CycleReport {
        anomalies,
        scaling,
        remediation,
        llm_responses,
    }
}

async fn fetch_resource<S, T>(
    source: &S,
    resource: Resource,
    policy: UpdatePolicy,
    halted: &mut bool,
) -> FetchOutcome<T>
where
    S: JsonSource + Sync,
    T: DeserializeOwned,
{
    if *halted {
        return FetchOutcome::Skipped;
    }

    let result = match source.get(resource.path()).await {
        Ok(body) => serde_json::from_value::<T>(body)
            .map_err(|source| ResourceError::Shape { resource, source }),
        Err(source) => Err(ResourceError::Fetch { resource, source }),
    };

    match result {
        Ok(value) => FetchOutcome::Fetched(value),
        Err(error) => {
            if policy == UpdatePolicy::AllOrNothing {
                *halted = true;
            }
            FetchOutcome::Failed(error)
        }
    }
}
