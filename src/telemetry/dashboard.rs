use super::aggregate::{self, Summary, TimeBucket};
use super::buffer::EventStore;
use super::events::{BuildRecord, PipelineRunEvent};
use super::generator::EventGenerator;
use super::query::{self, FilterCriteria};
use super::snapshot::BuildHistory;
use super::types::Pipeline;
use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};
use rand::rngs::StdRng;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// All mutable simulator state: the run store, the active filter, the run
/// generator and, when snapshots are on, the persisted build history.
pub struct Dashboard {
    store: EventStore,
    filter: FilterCriteria,
    generator: EventGenerator<StdRng>,
    history: Option<BuildHistory>,
}

pub type SharedDashboard = Arc<Mutex<Dashboard>>;

/// Locks the dashboard. Every mutation is a single step, so a poisoned lock
/// still guards consistent state.
pub fn lock(dashboard: &SharedDashboard) -> MutexGuard<'_, Dashboard> {
    dashboard.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Dashboard {
    pub fn new(store: EventStore, generator: EventGenerator<StdRng>) -> Self {
        Self {
            store,
            filter: FilterCriteria::default(),
            generator,
            history: None,
        }
    }

    /// Mirrors finished runs into `history`. Numbering continues after the
    /// newest build already in it. A history whose newest build leaves no
    /// number to continue with is discarded.
    pub fn with_history(mut self, mut history: BuildHistory) -> Self {
        if let Some(latest) = history.latest_build_number() {
            match latest.checked_add(1) {
                Some(next) => {
                    self.generator.advance_to(next);
                    debug!("Run numbering resumes at {}", self.generator.next_number());
                }
                None => {
                    warn!("Build number {latest} cannot be continued, discarding the loaded history");
                    history.clear();
                }
            }
        }
        self.history = Some(history);
        self
    }

    pub fn into_shared(self) -> SharedDashboard {
        Arc::new(Mutex::new(self))
    }

    /// Backfills the store. Seeded runs are backdated, so they stay out of
    /// the persisted history.
    pub fn seed(&mut self, count: usize, spacing: Duration, now: DateTime<Utc>) {
        for event in self.generator.seed(count, spacing, now) {
            self.append(event);
        }
    }

    /// Generates one live run, records it in the history and appends it.
    pub fn tick(&mut self) -> PipelineRunEvent {
        let event = self.generator.generate();
        if let (Some(history), Some(record)) =
            (self.history.as_mut(), BuildRecord::from_run(&event))
        {
            history.record(record);
        }
        self.append(event.clone());
        event
    }

    fn append(&mut self, event: PipelineRunEvent) {
        for evicted in self.store.append(event) {
            debug!("Evicted run {} from the store", evicted.number);
        }
    }

    pub fn store(&self) -> &EventStore {
        &self.store
    }

    pub fn history(&self) -> Option<&BuildHistory> {
        self.history.as_ref()
    }

    pub fn filter(&self) -> &FilterCriteria {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: FilterCriteria) {
        self.filter = filter;
    }

    pub fn summary(&self) -> Summary {
        aggregate::summary(self.store.all())
    }

    pub fn time_series(&self, bucket_count: usize) -> Vec<TimeBucket> {
        aggregate::time_series(self.store.all(), bucket_count)
    }

    pub fn per_source_counts(&self) -> Vec<(Pipeline, usize)> {
        aggregate::per_source_counts(self.store.all())
    }

    /// Runs matching the current filter, newest first.
    pub fn query(&self) -> Vec<&PipelineRunEvent> {
        query::query(self.store.all(), &self.filter)
    }
}
