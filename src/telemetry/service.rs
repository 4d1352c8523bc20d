use super::dashboard::{self, SharedDashboard};
use super::events::ServiceMsg;
use super::snapshot::{BuildHistory, SnapshotStore};
use log::{debug, error, info, warn};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc::Receiver, watch};

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(5000);

/// Appends one generated run per interval and tells subscribers to re-pull
/// their views.
pub struct RefreshService {
    dashboard: SharedDashboard,
    interval: Duration,
    rx: Receiver<ServiceMsg>,
    updates: watch::Sender<()>,
    snapshot: Option<SnapshotStore>,
}

impl RefreshService {
    pub fn new(dashboard: SharedDashboard, interval: Duration, rx: Receiver<ServiceMsg>) -> Self {
        let (updates, _) = watch::channel(());
        Self {
            dashboard,
            interval,
            rx,
            updates,
            snapshot: None,
        }
    }

    /// Persists the dashboard's build history after every tick.
    pub fn with_snapshot(mut self, snapshot: SnapshotStore) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    /// Receivers are notified once per appended run. The notification carries
    /// nothing.
    pub fn subscribe(&self) -> watch::Receiver<()> {
        self.updates.subscribe()
    }

    pub async fn run(mut self) {
        info!("Refresh service started, interval {:?}", self.interval);
        let mut interval = tokio::time::interval(self.interval);
        // The first tick completes immediately. Live runs start one interval in.
        interval.tick().await;

        loop {
            tokio::select! {
                maybe_msg = self.rx.recv() => {
                    match maybe_msg {
                        Some(ServiceMsg::Stop) => {
                            info!("Received stop directive");
                            break;
                        }
                        None => {
                            info!("Control channel closed");
                            break;
                        }
                    }
                }
                _ = interval.tick() => {
                    self.tick().await;
                }
            }
        }

        self.persist().await;
        info!("Refresh service stopped");
    }

    async fn tick(&mut self) {
        let start = Instant::now();
        {
            let mut dashboard = dashboard::lock(&self.dashboard);
            let event = dashboard.tick();
            debug!(
                "Appended run {} ({} on {}, {})",
                event.number,
                event.pipeline.as_ref(),
                event.environment.as_ref(),
                event.status().as_ref()
            );
        }

        self.persist().await;
        self.updates.send_replace(());

        let duration = start.elapsed();
        if duration > self.interval {
            warn!("Refresh tick took {:?}, longer than the interval", duration);
        }
    }

    async fn persist(&self) {
        let Some(snapshot) = &self.snapshot else {
            return;
        };
        let history: Option<BuildHistory> = dashboard::lock(&self.dashboard).history().cloned();
        let Some(history) = history else {
            return;
        };

        if let Err(e) = snapshot.save(&history).await {
            error!("Failed to write snapshot {:?}: {}", snapshot.path(), e);
        }
    }
}
