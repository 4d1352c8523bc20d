use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterParseError {
    #[error("Unknown pipeline '{0}'")]
    UnknownPipeline(String),
    #[error("Unknown environment '{0}'")]
    UnknownEnvironment(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pipeline {
    ApiGateway,
    WebFrontend,
    Payments,
    DataIngest,
    AuthService,
}

impl Pipeline {
    /// Declaration order. Per-pipeline views follow it.
    pub const ALL: [Pipeline; 5] = [
        Self::ApiGateway,
        Self::WebFrontend,
        Self::Payments,
        Self::DataIngest,
        Self::AuthService,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Self::ApiGateway => "API Gateway",
            Self::WebFrontend => "Web Frontend",
            Self::Payments => "Payments Service",
            Self::DataIngest => "Data Ingest",
            Self::AuthService => "Auth Service",
        }
    }
}

impl AsRef<str> for Pipeline {
    fn as_ref(&self) -> &str {
        match self {
            Self::ApiGateway => "api-gateway",
            Self::WebFrontend => "web-frontend",
            Self::Payments => "payments",
            Self::DataIngest => "data-ingest",
            Self::AuthService => "auth-service",
        }
    }
}

impl FromStr for Pipeline {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_ref().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FilterParseError::UnknownPipeline(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Environment {
    Production,
    Staging,
    Development,
}

impl Environment {
    pub const ALL: [Environment; 3] = [Self::Production, Self::Staging, Self::Development];
}

impl AsRef<str> for Environment {
    fn as_ref(&self) -> &str {
        match self {
            Self::Production => "prod",
            Self::Staging => "staging",
            Self::Development => "dev",
        }
    }
}

impl FromStr for Environment {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|e| e.as_ref().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FilterParseError::UnknownEnvironment(s.to_string()))
    }
}

/// Actors that can trigger a run.
pub const TRIGGER_ACTORS: [&str; 5] = ["alice", "bob", "carol", "ci-bot", "release-bot"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Success,
    Failed,
    Running,
}

impl AsRef<str> for RunStatus {
    fn as_ref(&self) -> &str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Running => "running",
        }
    }
}

/// How a run ended. Only finished runs can be deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    Success { deployment: bool },
    Failed { deployment: bool },
    Running,
}

impl RunOutcome {
    pub fn status(self) -> RunStatus {
        match self {
            Self::Success { .. } => RunStatus::Success,
            Self::Failed { .. } => RunStatus::Failed,
            Self::Running => RunStatus::Running,
        }
    }

    pub fn is_deployment(self) -> bool {
        match self {
            Self::Success { deployment } | Self::Failed { deployment } => deployment,
            Self::Running => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_ids_round_trip_through_from_str() {
        for pipeline in Pipeline::ALL {
            assert_eq!(pipeline.as_ref().parse::<Pipeline>(), Ok(pipeline));
        }
        assert_eq!("  Payments ".parse::<Pipeline>(), Ok(Pipeline::Payments));
        assert_eq!(
            "billing".parse::<Pipeline>(),
            Err(FilterParseError::UnknownPipeline("billing".to_string()))
        );
    }

    #[test]
    fn test_environment_from_str() {
        assert_eq!("prod".parse::<Environment>(), Ok(Environment::Production));
        assert_eq!("STAGING".parse::<Environment>(), Ok(Environment::Staging));
        assert!(matches!(
            "qa".parse::<Environment>(),
            Err(FilterParseError::UnknownEnvironment(_))
        ));
    }

    #[test]
    fn test_running_outcome_is_never_a_deployment() {
        assert!(!RunOutcome::Running.is_deployment());
        assert!(RunOutcome::Success { deployment: true }.is_deployment());
        assert!(RunOutcome::Failed { deployment: true }.is_deployment());
        assert!(!RunOutcome::Failed { deployment: false }.is_deployment());
        assert_eq!(RunOutcome::Running.status(), RunStatus::Running);
    }
}
