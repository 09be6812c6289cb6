//! TimedEvent — a machine event stamped with host time

use serde::{Deserialize, Serialize};

use crate::stage::MachineEvent;

/// A machine event with the host timestamp it was produced at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    /// The event
    pub event: MachineEvent,

    /// Host timestamp in milliseconds (frame clock)
    pub timestamp_ms: f64,
}

impl TimedEvent {
    pub fn new(event: MachineEvent, timestamp_ms: f64) -> Self {
        Self {
            event,
            timestamp_ms,
        }
    }

    /// Get event type name
    pub fn type_name(&self) -> &'static str {
        self.event.type_name()
    }
}
