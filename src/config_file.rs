use minijinja::Environment;
use serde::{Deserialize, Serialize};

use std::{
    collections::HashMap,
    num::{NonZeroU64, NonZeroUsize},
    path::{Path, PathBuf},
};

use crate::telemetry::snapshot::DEFAULT_SNAPSHOT_KEY;
use crate::telemetry::{aggregate, buffer, generator, service};

/// Values the config template can reference.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct PipewatchVars {
    inner: HashMap<String, String>,
}

impl PipewatchVars {
    fn try_init_from_string(val: &str) -> Result<Self, PipewatchConfigError> {
        Ok(toml::from_str(val)?)
    }

    fn try_init(path: &Path) -> Result<Self, PipewatchConfigError> {
        match std::fs::read_to_string(path) {
            Ok(vars) => Self::try_init_from_string(&vars),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipewatchConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Templating error: {0:?}")]
    Template(#[from] minijinja::Error),
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipewatchConfigFile {
    /// Runs kept in memory before the oldest is evicted (default: 40)
    #[serde(default = "default_max_events")]
    pub max_events: NonZeroUsize,
    /// Milliseconds between generated runs (default: 5000)
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: NonZeroU64,
    /// Runs backfilled at startup (default: 30)
    #[serde(default = "default_seed_count")]
    pub seed_count: usize,
    /// Seconds between backfilled runs (default: 300)
    #[serde(default = "default_seed_spacing_secs")]
    pub seed_spacing_secs: u64,
    /// Buckets in the outcome time series (default: 20)
    #[serde(default = "default_bucket_count")]
    pub bucket_count: NonZeroUsize,
    #[serde(default)]
    pub snapshot: SnapshotEntry,
}

#[derive(Debug, Clone, serde::Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SnapshotEntry {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_snapshot_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_snapshot_key")]
    pub key: String,
}

impl Default for SnapshotEntry {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            dir: default_snapshot_dir(),
            key: default_snapshot_key(),
        }
    }
}

const DEFAULT_MAX_EVENTS: NonZeroUsize =
    NonZeroUsize::new(buffer::DEFAULT_MAX_EVENTS).expect("default capacity is positive");
const DEFAULT_REFRESH_INTERVAL_MS: NonZeroU64 =
    NonZeroU64::new(service::DEFAULT_REFRESH_INTERVAL.as_millis() as u64)
        .expect("default refresh interval is positive");
const DEFAULT_BUCKET_COUNT: NonZeroUsize =
    NonZeroUsize::new(aggregate::DEFAULT_BUCKET_COUNT).expect("default bucket count is positive");

fn default_max_events() -> NonZeroUsize {
    DEFAULT_MAX_EVENTS
}

fn default_refresh_interval_ms() -> NonZeroU64 {
    DEFAULT_REFRESH_INTERVAL_MS
}

fn default_seed_count() -> usize {
    generator::DEFAULT_SEED_COUNT
}

fn default_seed_spacing_secs() -> u64 {
    generator::DEFAULT_SEED_SPACING.num_seconds().unsigned_abs()
}

fn default_bucket_count() -> NonZeroUsize {
    DEFAULT_BUCKET_COUNT
}

fn default_true() -> bool {
    true
}

fn default_snapshot_dir() -> PathBuf {
    PathBuf::from(".pipewatch")
}

fn default_snapshot_key() -> String {
    DEFAULT_SNAPSHOT_KEY.to_string()
}

impl PipewatchConfigFile {
    fn try_init_from_string(
        mut config: String,
        vars: &PipewatchVars,
    ) -> Result<Self, PipewatchConfigError> {
        let mut env = Environment::new();
        env.set_undefined_behavior(minijinja::UndefinedBehavior::Strict);
        let template = env.template_from_str(&config)?;
        config = template.render(vars)?;

        Ok(toml::from_str(&config)?)
    }

    /// Reads the config at `path`, rendered with the variables at
    /// `vars_path`. Either file may be absent, in which case defaults apply.
    pub fn try_init(path: &Path, vars_path: &Path) -> Result<Self, PipewatchConfigError> {
        let vars = PipewatchVars::try_init(vars_path)?;
        let config = match std::fs::read_to_string(path) {
            Ok(config) => config,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No config at {path:?}, using defaults");
                String::new()
            }
            Err(e) => return Err(e.into()),
        };

        Self::try_init_from_string(config, &vars)
    }

    pub fn into_config(self) -> crate::config::PipewatchConfig {
        crate::config::PipewatchConfig {
            max_events: self.max_events.get(),
            refresh_interval: std::time::Duration::from_millis(self.refresh_interval_ms.get()),
            seed_count: self.seed_count,
            seed_spacing: i64::try_from(self.seed_spacing_secs)
                .ok()
                .and_then(chrono::Duration::try_seconds)
                .unwrap_or(chrono::Duration::MAX),
            bucket_count: self.bucket_count.get(),
            snapshot: self.snapshot.enabled.then(|| crate::config::SnapshotConfig {
                dir: self.snapshot.dir,
                key: self.snapshot.key,
            }),
        }
    }
}
