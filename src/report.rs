//! Plain-text rendering of the dashboard views.

use crate::telemetry::dashboard::Dashboard;
use crate::telemetry::events::{BuildStatus, DeploymentStatus, RunNumber};
use crate::telemetry::query::{ALL, FilterCriteria};
use std::fmt::Write;

const RUN_ROWS: usize = 15;
const HISTORY_ROWS: usize = 5;

pub fn render(dashboard: &Dashboard, bucket_count: usize) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut out, dashboard, bucket_count);
    out
}

fn write_report(out: &mut String, dashboard: &Dashboard, bucket_count: usize) -> std::fmt::Result {
    let summary = dashboard.summary();
    writeln!(
        out,
        "runs {} | success {} | failed {} | running {} | deployments {} ({}% ok) | avg {}s",
        summary.total,
        summary.success,
        summary.failed,
        summary.running,
        summary.deployments,
        summary.deployment_rate,
        summary.average_duration_seconds,
    )?;

    let per_source = dashboard
        .per_source_counts()
        .into_iter()
        .map(|(pipeline, count)| format!("{} {}", pipeline.display_name(), count))
        .collect::<Vec<_>>()
        .join(" | ");
    writeln!(out, "{per_source}")?;

    let series = dashboard.time_series(bucket_count);
    if let (Some(first), Some(last)) = (series.first(), series.last()) {
        let bars: String = series
            .iter()
            .map(|bucket| match (bucket.success, bucket.failed) {
                (0, 0) => '.',
                (_, 0) => '+',
                (0, _) => 'x',
                _ => '*',
            })
            .collect();
        writeln!(out, "{} [{}] {}", first.label, bars, last.label)?;
    }

    let runs = dashboard.query();
    writeln!(
        out,
        "{} matching runs ({})",
        runs.len(),
        describe_filter(dashboard.filter())
    )?;
    for event in runs.into_iter().take(RUN_ROWS) {
        writeln!(
            out,
            "{:<7} {:<17} {:<8} {:<12} {:<8} {:>5}s {}{}",
            event.number.to_string(),
            event.pipeline.display_name(),
            event.environment.as_ref(),
            event.triggered_by,
            event.status().as_ref(),
            event.duration_seconds,
            event.formatted_timestamp(),
            if event.is_deployment() { " deploy" } else { "" },
        )?;
    }

    if let Some(history) = dashboard.history().filter(|h| !h.is_empty()) {
        writeln!(out, "{} persisted builds", history.len())?;
        for record in history.records().take(HISTORY_ROWS) {
            let build = match record.build_status {
                BuildStatus::Success => "success",
                BuildStatus::Failure => "failure",
            };
            let deployment = match record.deployment_status {
                DeploymentStatus::Deployed => "deployed",
                DeploymentStatus::Failed => "-",
            };
            writeln!(
                out,
                "{:<7} {:<8} {:<9} {}",
                RunNumber(record.build_number).to_string(),
                build,
                deployment,
                record.timestamp.to_rfc3339(),
            )?;
        }
    }
    Ok(())
}

fn describe_filter(filter: &FilterCriteria) -> String {
    let mut parts = vec![
        format!(
            "pipeline {}",
            filter.pipeline.as_ref().map_or(ALL, |p| p.as_ref())
        ),
        format!(
            "environment {}",
            filter.environment.as_ref().map_or(ALL, |e| e.as_ref())
        ),
    ];
    let search = filter.search.trim();
    if !search.is_empty() {
        parts.push(format!("search {search:?}"));
    }
    parts.join(", ")
}
