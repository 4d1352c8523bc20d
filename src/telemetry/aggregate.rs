//! Derived views over a set of runs. Everything here is a pure function of
//! the events passed in.

use super::events::PipelineRunEvent;
use super::types::{Pipeline, RunStatus};
use chrono::{DateTime, Duration, Utc};

pub const DEFAULT_BUCKET_COUNT: usize = 20;
const BUCKET_LABEL_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    pub running: usize,
    pub deployments: usize,
    pub deployment_successes: usize,
    /// Whole percent in `[0, 100]`, zero when there were no deployments.
    pub deployment_rate: u8,
    pub average_duration_seconds: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeBucket {
    pub start: DateTime<Utc>,
    pub label: String,
    pub success: usize,
    pub failed: usize,
}

pub fn summary<'a>(events: impl IntoIterator<Item = &'a PipelineRunEvent>) -> Summary {
    let mut summary = Summary::default();
    let mut total_duration: u64 = 0;

    for event in events {
        summary.total += 1;
        total_duration += u64::from(event.duration_seconds);
        match event.status() {
            RunStatus::Success => summary.success += 1,
            RunStatus::Failed => summary.failed += 1,
            RunStatus::Running => summary.running += 1,
        }
        if event.is_deployment() {
            summary.deployments += 1;
            if event.status() == RunStatus::Success {
                summary.deployment_successes += 1;
            }
        }
    }

    summary.deployment_rate = percentage(summary.deployment_successes, summary.deployments);
    if summary.total > 0 {
        let average = (total_duration as f64 / summary.total as f64).round();
        summary.average_duration_seconds = average as u32;
    }
    summary
}

fn percentage(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let rate = (100.0 * part as f64 / whole as f64).round();
    rate.clamp(0.0, 100.0) as u8
}

/// Splits the span between the oldest and newest run into `bucket_count`
/// equal buckets and counts finished runs in each. Running runs are left out.
pub fn time_series<'a>(
    events: impl IntoIterator<Item = &'a PipelineRunEvent>,
    bucket_count: usize,
) -> Vec<TimeBucket> {
    let events: Vec<&PipelineRunEvent> = events.into_iter().collect();
    let (Some(start), Some(end)) = (
        events.iter().map(|e| e.timestamp).min(),
        events.iter().map(|e| e.timestamp).max(),
    ) else {
        return Vec::new();
    };
    if bucket_count == 0 {
        return Vec::new();
    }

    // Never zero, so identical timestamps still land in bucket 0.
    let range_ms = (end - start).num_milliseconds().max(1);
    let width_ms = range_ms as f64 / bucket_count as f64;

    let mut buckets: Vec<TimeBucket> = (0..bucket_count)
        .map(|i| {
            let bucket_start = start + Duration::milliseconds((width_ms * i as f64) as i64);
            TimeBucket {
                start: bucket_start,
                label: bucket_start.format(BUCKET_LABEL_FORMAT).to_string(),
                success: 0,
                failed: 0,
            }
        })
        .collect();

    for event in events {
        let offset_ms = (event.timestamp - start).num_milliseconds() as f64;
        let index = (offset_ms / range_ms as f64 * bucket_count as f64).floor();
        let index = (index.max(0.0) as usize).min(bucket_count - 1);
        match event.status() {
            RunStatus::Success => buckets[index].success += 1,
            RunStatus::Failed => buckets[index].failed += 1,
            RunStatus::Running => {}
        }
    }

    buckets
}

/// Run count for every known pipeline in declaration order, zeros included.
pub fn per_source_counts<'a>(
    events: impl IntoIterator<Item = &'a PipelineRunEvent>,
) -> Vec<(Pipeline, usize)> {
    let mut counts: Vec<(Pipeline, usize)> = Pipeline::ALL.iter().map(|p| (*p, 0)).collect();
    for event in events {
        if let Some((_, count)) = counts.iter_mut().find(|(p, _)| *p == event.pipeline) {
            *count += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::events::RunNumber;
    use crate::telemetry::generator::{DEFAULT_SEED_SPACING, EventGenerator};
    use crate::telemetry::types::{Environment, RunOutcome};
    use chrono::TimeZone;
    use quickcheck_macros::quickcheck;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn event(number: u64, outcome: RunOutcome, minute: u32) -> PipelineRunEvent {
        PipelineRunEvent {
            number: RunNumber(number),
            pipeline: Pipeline::ApiGateway,
            environment: Environment::Production,
            triggered_by: "alice".to_string(),
            outcome,
            duration_seconds: 100,
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap(),
        }
    }

    fn generated(seed: u64, count: usize) -> Vec<PipelineRunEvent> {
        let mut generator = EventGenerator::new(StdRng::seed_from_u64(seed));
        generator.seed(count, DEFAULT_SEED_SPACING, Utc::now())
    }

    #[test]
    fn test_summary_counts_and_rate() {
        let events = vec![
            event(1, RunOutcome::Success { deployment: true }, 0),
            event(2, RunOutcome::Success { deployment: true }, 1),
            event(3, RunOutcome::Failed { deployment: true }, 2),
            event(4, RunOutcome::Success { deployment: false }, 3),
            event(5, RunOutcome::Running, 4),
        ];

        let summary = summary(&events);
        assert_eq!(summary.total, 5);
        assert_eq!(summary.success, 3);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.running, 1);
        assert_eq!(summary.deployments, 3);
        assert_eq!(summary.deployment_successes, 2);
        // 66.67 rounds up.
        assert_eq!(summary.deployment_rate, 67);
        assert_eq!(summary.average_duration_seconds, 100);
    }

    #[test]
    fn test_summary_without_deployments_has_zero_rate() {
        let events = vec![
            event(1, RunOutcome::Success { deployment: false }, 0),
            event(2, RunOutcome::Running, 1),
        ];
        let summary = summary(&events);
        assert_eq!(summary.deployments, 0);
        assert_eq!(summary.deployment_rate, 0);

        assert_eq!(super::summary(&Vec::<PipelineRunEvent>::new()), Summary::default());
    }

    #[test]
    fn test_time_series_empty_input_has_no_buckets() {
        assert!(time_series(&Vec::<PipelineRunEvent>::new(), 20).is_empty());
        assert!(time_series(&generated(1, 5), 0).is_empty());
    }

    #[test]
    fn test_time_series_identical_timestamps_land_in_first_bucket() {
        let events = vec![
            event(1, RunOutcome::Success { deployment: false }, 10),
            event(2, RunOutcome::Failed { deployment: false }, 10),
            event(3, RunOutcome::Running, 10),
        ];

        let buckets = time_series(&events, 4);
        assert_eq!(buckets.len(), 4);
        assert_eq!((buckets[0].success, buckets[0].failed), (1, 1));
        assert!(buckets[1..].iter().all(|b| b.success == 0 && b.failed == 0));
        assert_eq!(buckets[0].label, "12:10");
    }

    #[test]
    fn test_time_series_places_newest_in_last_bucket() {
        let events = vec![
            event(1, RunOutcome::Success { deployment: false }, 0),
            event(2, RunOutcome::Failed { deployment: false }, 5),
            event(3, RunOutcome::Success { deployment: false }, 10),
        ];

        let buckets = time_series(&events, 2);
        assert_eq!((buckets[0].success, buckets[0].failed), (1, 0));
        // Offset 5 of 10 floors to index 1.
        assert_eq!((buckets[1].success, buckets[1].failed), (1, 1));
        assert_eq!(buckets[0].label, "12:00");
        assert_eq!(buckets[1].label, "12:05");
    }

    #[test]
    fn test_seeding_three_into_one_bucket() {
        let events = generated(11, 3);
        let running = events
            .iter()
            .filter(|e| e.status() == RunStatus::Running)
            .count();

        let buckets = time_series(&events, 1);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].success + buckets[0].failed, 3 - running);
    }

    #[test]
    fn test_per_source_counts_include_idle_pipelines() {
        let events = vec![
            event(1, RunOutcome::Running, 0),
            event(2, RunOutcome::Running, 1),
        ];
        let counts = per_source_counts(&events);
        assert_eq!(counts.len(), Pipeline::ALL.len());
        assert_eq!(counts[0], (Pipeline::ApiGateway, 2));
        assert!(counts[1..].iter().all(|(_, n)| *n == 0));
        assert_eq!(
            counts.iter().map(|(p, _)| *p).collect::<Vec<_>>(),
            Pipeline::ALL.to_vec()
        );
    }

    #[quickcheck]
    fn prop_deployment_rate_is_a_percentage(seed: u64, count: u8) -> bool {
        let summary = summary(&generated(seed, usize::from(count)));
        summary.deployment_rate <= 100 && (summary.deployments > 0 || summary.deployment_rate == 0)
    }

    #[quickcheck]
    fn prop_time_series_accounts_for_every_finished_run(seed: u64, count: u8, buckets: u8) -> bool {
        let events = generated(seed, usize::from(count));
        let bucket_count = usize::from(buckets % 40) + 1;
        let series = time_series(&events, bucket_count);

        let finished = events
            .iter()
            .filter(|e| e.status() != RunStatus::Running)
            .count();
        let bucketed: usize = series.iter().map(|b| b.success + b.failed).sum();

        let expected_len = if events.is_empty() { 0 } else { bucket_count };
        series.len() == expected_len && bucketed == finished
    }

    #[quickcheck]
    fn prop_per_source_counts_sum_to_total(seed: u64, count: u8) -> bool {
        let events = generated(seed, usize::from(count));
        let counts = per_source_counts(&events);
        counts.len() == Pipeline::ALL.len()
            && counts.iter().map(|(_, n)| n).sum::<usize>() == events.len()
    }
}
