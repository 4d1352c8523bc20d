mod build;
mod run;

pub use build::{BuildRecord, BuildStatus, DeploymentStatus};
pub use run::{PipelineRunEvent, RunNumber};

/// Messages accepted by the refresh service on its control channel.
#[derive(Debug)]
pub enum ServiceMsg {
    Stop,
}
