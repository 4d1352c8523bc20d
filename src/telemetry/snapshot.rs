use super::events::BuildRecord;
use log::{info, warn};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

pub const DEFAULT_SNAPSHOT_KEY: &str = "cicd-build-history";

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Finished builds, newest first, capped at `limit` entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildHistory {
    records: VecDeque<BuildRecord>,
    limit: usize,
}

impl BuildHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(limit),
            limit,
        }
    }

    pub fn from_records(records: Vec<BuildRecord>, limit: usize) -> Self {
        let mut records = VecDeque::from(records);
        records.truncate(limit);
        Self { records, limit }
    }

    pub fn record(&mut self, record: BuildRecord) {
        self.records.push_front(record);
        self.records.truncate(self.limit);
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn records(&self) -> impl Iterator<Item = &BuildRecord> {
        self.records.iter()
    }

    pub fn latest_build_number(&self) -> Option<u64> {
        self.records.iter().map(|r| r.build_number).max()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Stores one JSON document per key inside `dir`.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
    key: String,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            key: key.into(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.key))
    }

    async fn try_load(&self) -> Result<Option<Vec<BuildRecord>>, SnapshotError> {
        match tokio::fs::read_to_string(self.path()).await {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Loads the saved history. A missing or unreadable snapshot yields an
    /// empty history instead of an error.
    pub async fn load(&self, limit: usize) -> BuildHistory {
        match self.try_load().await {
            Ok(Some(records)) => {
                let history = BuildHistory::from_records(records, limit);
                info!(
                    "Loaded {} builds from snapshot {:?}",
                    history.len(),
                    self.path()
                );
                history
            }
            Ok(None) => {
                info!("No snapshot at {:?}, starting with an empty history", self.path());
                BuildHistory::new(limit)
            }
            Err(e) => {
                warn!(
                    "Ignoring unreadable snapshot {:?}: {}",
                    self.path(),
                    e
                );
                BuildHistory::new(limit)
            }
        }
    }

    pub async fn save(&self, history: &BuildHistory) -> Result<(), SnapshotError> {
        let records: Vec<&BuildRecord> = history.records().collect();
        let json = serde_json::to_string_pretty(&records)?;
        ensure_dir(&self.dir).await?;
        tokio::fs::write(self.path(), json).await?;
        Ok(())
    }
}

async fn ensure_dir(dir: &Path) -> std::io::Result<()> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    tokio::fs::create_dir_all(dir).await
}
