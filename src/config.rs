use std::path::PathBuf;
use std::time::Duration;

use crate::telemetry::snapshot::SnapshotStore;

/// Resolved runtime settings. Fixed for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct PipewatchConfig {
    pub max_events: usize,
    pub refresh_interval: Duration,
    pub seed_count: usize,
    pub seed_spacing: chrono::Duration,
    pub bucket_count: usize,
    pub snapshot: Option<SnapshotConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotConfig {
    pub dir: PathBuf,
    pub key: String,
}

impl SnapshotConfig {
    pub fn store(&self) -> SnapshotStore {
        SnapshotStore::new(&self.dir, &self.key)
    }
}
