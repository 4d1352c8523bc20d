use super::events::PipelineRunEvent;
use super::types::{Environment, FilterParseError, Pipeline};

/// Keyword that disables a pipeline or environment criterion.
pub const ALL: &str = "all";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// `None` matches every pipeline.
    pub pipeline: Option<Pipeline>,
    /// `None` matches every environment.
    pub environment: Option<Environment>,
    pub search: String,
}

impl FilterCriteria {
    /// Builds criteria from the user-facing strings, where `all` disables a
    /// criterion.
    pub fn parse(pipeline: &str, environment: &str, search: &str) -> Result<Self, FilterParseError> {
        let pipeline = match pipeline.trim() {
            p if p.eq_ignore_ascii_case(ALL) => None,
            p => Some(p.parse()?),
        };
        let environment = match environment.trim() {
            e if e.eq_ignore_ascii_case(ALL) => None,
            e => Some(e.parse()?),
        };
        Ok(Self {
            pipeline,
            environment,
            search: search.to_string(),
        })
    }

    pub fn matches(&self, event: &PipelineRunEvent) -> bool {
        if self.pipeline.is_some_and(|p| p != event.pipeline) {
            return false;
        }
        if self.environment.is_some_and(|e| e != event.environment) {
            return false;
        }
        let needle = self.search.trim();
        needle.is_empty() || event.search_haystack().contains(&needle.to_lowercase())
    }
}

/// Runs matching `criteria`, newest first. Runs with the same timestamp keep
/// their relative input order.
pub fn query<'a>(
    events: impl IntoIterator<Item = &'a PipelineRunEvent>,
    criteria: &FilterCriteria,
) -> Vec<&'a PipelineRunEvent> {
    let mut matched: Vec<&PipelineRunEvent> =
        events.into_iter().filter(|e| criteria.matches(e)).collect();
    matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    matched
}
