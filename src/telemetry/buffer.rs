use super::events::PipelineRunEvent;
use std::collections::VecDeque;

pub const DEFAULT_MAX_EVENTS: usize = 40;

/// Bounded run history. Iteration order is insertion order, which is not
/// guaranteed to be chronological.
#[derive(Debug, Clone)]
pub struct EventStore {
    events: VecDeque<PipelineRunEvent>,
    capacity: usize,
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_EVENTS)
    }
}

impl EventStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends `event` and returns whatever had to be evicted from the front
    /// to stay within capacity.
    pub fn append(&mut self, event: PipelineRunEvent) -> Vec<PipelineRunEvent> {
        self.events.push_back(event);

        let overflow = self.events.len().saturating_sub(self.capacity);
        self.events.drain(..overflow).collect()
    }

    pub fn all(&self) -> impl DoubleEndedIterator<Item = &PipelineRunEvent> + ExactSizeIterator {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
