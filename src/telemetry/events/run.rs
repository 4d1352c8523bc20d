use super::super::types::{Environment, Pipeline, RunOutcome, RunStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Format used whenever a run timestamp is shown or searched.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RunNumber(pub u64);

impl fmt::Display for RunNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:04}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineRunEvent {
    pub number: RunNumber,
    pub pipeline: Pipeline,
    pub environment: Environment,
    pub triggered_by: String,
    pub outcome: RunOutcome,
    pub duration_seconds: u32,
    pub timestamp: DateTime<Utc>,
}

impl PipelineRunEvent {
    pub fn status(&self) -> RunStatus {
        self.outcome.status()
    }

    pub fn is_deployment(&self) -> bool {
        self.outcome.is_deployment()
    }

    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Lowercased text the free-text search runs against.
    pub fn search_haystack(&self) -> String {
        [
            self.number.to_string().as_str(),
            self.pipeline.display_name(),
            self.triggered_by.as_str(),
            self.status().as_ref(),
            self.environment.as_ref(),
            self.formatted_timestamp().as_str(),
        ]
        .join(" ")
        .to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_run_number_is_zero_padded() {
        assert_eq!(RunNumber(7).to_string(), "#0007");
        assert_eq!(RunNumber(12345).to_string(), "#12345");
    }

    #[test]
    fn test_search_haystack_contains_every_field() {
        let event = PipelineRunEvent {
            number: RunNumber(42),
            pipeline: Pipeline::WebFrontend,
            environment: Environment::Staging,
            triggered_by: "Release-Bot".to_string(),
            outcome: RunOutcome::Failed { deployment: true },
            duration_seconds: 300,
            timestamp: Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap(),
        };

        let haystack = event.search_haystack();
        for needle in [
            "#0042",
            "web frontend",
            "release-bot",
            "failed",
            "staging",
            "2024-03-09 14:05:00",
        ] {
            assert!(haystack.contains(needle), "{needle} missing from {haystack}");
        }
    }
}
