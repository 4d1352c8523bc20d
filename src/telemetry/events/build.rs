use super::run::PipelineRunEvent;
use super::super::types::RunOutcome;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildStatus {
    Success,
    Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeploymentStatus {
    Deployed,
    Failed,
}

/// Simplified build entry kept in the persisted history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRecord {
    pub build_number: u64,
    pub build_status: BuildStatus,
    pub deployment_status: DeploymentStatus,
    pub timestamp: DateTime<Utc>,
}

impl BuildRecord {
    /// Returns `None` for runs that have not finished yet.
    pub fn from_run(event: &PipelineRunEvent) -> Option<Self> {
        let (build_status, deployed) = match event.outcome {
            RunOutcome::Success { deployment } => (BuildStatus::Success, deployment),
            RunOutcome::Failed { .. } => (BuildStatus::Failure, false),
            RunOutcome::Running => return None,
        };

        let deployment_status = if deployed {
            DeploymentStatus::Deployed
        } else {
            DeploymentStatus::Failed
        };

        Some(Self {
            build_number: event.number.0,
            build_status,
            deployment_status,
            timestamp: event.timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::events::RunNumber;
    use crate::telemetry::types::{Environment, Pipeline};
    use chrono::TimeZone;

    fn run(outcome: RunOutcome) -> PipelineRunEvent {
        PipelineRunEvent {
            number: RunNumber(9),
            pipeline: Pipeline::Payments,
            environment: Environment::Production,
            triggered_by: "ci-bot".to_string(),
            outcome,
            duration_seconds: 60,
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_record_mapping() {
        let deployed = BuildRecord::from_run(&run(RunOutcome::Success { deployment: true }))
            .expect("finished run should map");
        assert_eq!(deployed.build_number, 9);
        assert_eq!(deployed.build_status, BuildStatus::Success);
        assert_eq!(deployed.deployment_status, DeploymentStatus::Deployed);

        let failed = BuildRecord::from_run(&run(RunOutcome::Failed { deployment: true })).unwrap();
        assert_eq!(failed.build_status, BuildStatus::Failure);
        assert_eq!(failed.deployment_status, DeploymentStatus::Failed);

        assert!(BuildRecord::from_run(&run(RunOutcome::Running)).is_none());
    }

    #[test]
    fn test_record_serializes_with_camel_case_keys() {
        let record = BuildRecord::from_run(&run(RunOutcome::Success { deployment: false })).unwrap();
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["buildNumber"], 9);
        assert_eq!(json["buildStatus"], "Success");
        assert_eq!(json["deploymentStatus"], "Failed");
        assert_eq!(json["timestamp"], "2024-01-01T00:00:00Z");
    }
}
