//! EventBus — fan-out of machine events to UI subscribers
//!
//! Publishing never blocks: every subscriber gets an unbounded channel and
//! subscribers whose receiver was dropped are pruned on the next publish.

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::event::TimedEvent;
use crate::stage::MachineEvent;

/// Multi-subscriber event feed
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<Sender<TimedEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber. It only sees events published afterwards.
    pub fn subscribe(&mut self) -> Receiver<TimedEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Send an event to every live subscriber
    pub fn publish(&mut self, event: MachineEvent, timestamp_ms: f64) {
        log::trace!("event {} @ {:.1}ms", event.type_name(), timestamp_ms);
        let timed = TimedEvent::new(event, timestamp_ms);
        self.subscribers
            .retain(|tx| tx.send(timed.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
