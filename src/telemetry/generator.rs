use super::events::{PipelineRunEvent, RunNumber};
use super::types::{Environment, Pipeline, RunOutcome, TRIGGER_ACTORS};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;

const SUCCESS_THRESHOLD: f64 = 0.65;
const RUNNING_THRESHOLD: f64 = 0.85;
const DEPLOYMENT_PROBABILITY: f64 = 0.4;
const MIN_DURATION_SECONDS: u32 = 45;
const MAX_DURATION_SECONDS: u32 = 1200;

pub const DEFAULT_SEED_COUNT: usize = 30;
pub const DEFAULT_SEED_SPACING: Duration = Duration::minutes(5);

/// Produces synthetic pipeline runs. Owns the run counter, so numbers are
/// unique for as long as the generator lives.
pub struct EventGenerator<R> {
    rng: R,
    next_number: u64,
}

impl<R: Rng> EventGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self::starting_at(rng, 1)
    }

    /// Resumes numbering at `next_number` (clamped to at least 1).
    pub fn starting_at(rng: R, next_number: u64) -> Self {
        Self {
            rng,
            next_number: next_number.max(1),
        }
    }

    /// Moves the counter forward to `next_number`. Never moves it back.
    pub fn advance_to(&mut self, next_number: u64) {
        self.next_number = self.next_number.max(next_number);
    }

    pub fn next_number(&self) -> RunNumber {
        RunNumber(self.next_number)
    }

    pub fn generate(&mut self) -> PipelineRunEvent {
        self.generate_at(Utc::now())
    }

    /// The counter saturates at `u64::MAX` instead of wrapping back to 1.
    pub fn generate_at(&mut self, timestamp: DateTime<Utc>) -> PipelineRunEvent {
        let number = RunNumber(self.next_number);
        self.next_number = self.next_number.saturating_add(1);

        let roll: f64 = self.rng.random();
        // Drawn for every run so running runs consume the same randomness.
        let deployment = self.rng.random::<f64>() < DEPLOYMENT_PROBABILITY;
        let outcome = if roll < SUCCESS_THRESHOLD {
            RunOutcome::Success { deployment }
        } else if roll < RUNNING_THRESHOLD {
            RunOutcome::Running
        } else {
            RunOutcome::Failed { deployment }
        };

        PipelineRunEvent {
            number,
            pipeline: Pipeline::ALL[self.rng.random_range(0..Pipeline::ALL.len())],
            environment: Environment::ALL[self.rng.random_range(0..Environment::ALL.len())],
            triggered_by: TRIGGER_ACTORS[self.rng.random_range(0..TRIGGER_ACTORS.len())]
                .to_string(),
            outcome,
            duration_seconds: self
                .rng
                .random_range(MIN_DURATION_SECONDS..=MAX_DURATION_SECONDS),
            timestamp,
        }
    }

    /// Builds an initial history of `count` runs spaced `spacing` apart,
    /// oldest first, the newest stamped at `now`.
    pub fn seed(
        &mut self,
        count: usize,
        spacing: Duration,
        now: DateTime<Utc>,
    ) -> Vec<PipelineRunEvent> {
        (0..count)
            .rev()
            .map(|steps_back| {
                let timestamp = i32::try_from(steps_back)
                    .ok()
                    .and_then(|steps| spacing.checked_mul(steps))
                    .and_then(|offset| now.checked_sub_signed(offset))
                    .unwrap_or(DateTime::<Utc>::MIN_UTC);
                self.generate_at(timestamp)
            })
            .collect()
    }
}
