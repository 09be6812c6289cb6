//! EventTrace — the recorded timeline of a session
//!
//! Collected on the subscriber side; used by the CLI report and by tests
//! asserting ordering guarantees.

use crossbeam_channel::Receiver;
use serde::{Deserialize, Serialize};

use crate::event::TimedEvent;
use crate::stage::MachineEvent;

/// Chronological list of received events
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventTrace {
    pub events: Vec<TimedEvent>,
}

impl EventTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: TimedEvent) {
        self.events.push(event);
    }

    /// Pull everything currently queued on a subscriber channel
    pub fn drain_from(&mut self, rx: &Receiver<TimedEvent>) -> usize {
        let before = self.events.len();
        self.events.extend(rx.try_iter());
        self.events.len() - before
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Time between first and last event
    pub fn duration_ms(&self) -> f64 {
        match (self.events.first(), self.events.last()) {
            (Some(first), Some(last)) => last.timestamp_ms - first.timestamp_ms,
            _ => 0.0,
        }
    }

    /// Events with the given type name
    pub fn events_by_type(&self, type_name: &str) -> Vec<&TimedEvent> {
        self.events
            .iter()
            .filter(|e| e.type_name() == type_name)
            .collect()
    }

    /// Indices of every center-crossed event, in order
    pub fn center_indices(&self) -> Vec<usize> {
        self.events
            .iter()
            .filter_map(|e| match e.event {
                MachineEvent::CenterCrossed { index } => Some(index),
                _ => None,
            })
            .collect()
    }

    /// Position of the first event of a type
    pub fn position_of(&self, type_name: &str) -> Option<usize> {
        self.events.iter().position(|e| e.type_name() == type_name)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
