//! Animation Clock — one eased scroll from offset 0 to the winning slot
//!
//! Driven by the host's per-frame callback. The outcome is fixed before
//! `start`, so the deceleration target is known up front.
//!
//! Center-crossed events are emitted once per index change, so indices are
//! strictly increasing. When a single frame scrolls past more than one slot
//! (early in the spin, or after a long frame), the intermediate indices are
//! skipped: at most one center-crossed event per frame.

use serde::{Deserialize, Serialize};

use cf_core::CfResult;

use crate::timing::{Geometry, SpinTiming, StripConfig};

/// Clock lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ClockState {
    #[default]
    Idle,
    Running,
    Settled,
    Cancelled,
}

/// Events produced by a frame tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockEvent {
    /// A new slot reached the viewport center
    CenterCrossed(usize),
    /// Scroll finished on the winning slot
    Settled(usize),
}

/// Scroll animation state
#[derive(Debug, Clone)]
pub struct AnimationClock {
    geometry: Geometry,
    timing: SpinTiming,
    state: ClockState,
    start_ms: f64,
    target: f64,
    winning_index: usize,
    offset: f64,
    last_index: Option<usize>,
    cancel_requested: bool,
}

impl AnimationClock {
    pub fn new(geometry: Geometry, timing: SpinTiming) -> Self {
        Self {
            geometry,
            timing,
            state: ClockState::Idle,
            start_ms: 0.0,
            target: 0.0,
            winning_index: 0,
            offset: 0.0,
            last_index: None,
            cancel_requested: false,
        }
    }

    /// Begin a spin toward `winning_index` at host time `now_ms`
    pub fn start(&mut self, now_ms: f64, strip: &StripConfig) -> CfResult<()> {
        strip.validate()?;
        self.geometry.validate_for(strip)?;
        self.timing.validate()?;

        self.state = ClockState::Running;
        self.start_ms = now_ms;
        self.winning_index = strip.winning_index;
        self.target = self.geometry.offset_for_index(strip.winning_index);
        self.offset = 0.0;
        self.last_index = None;
        self.cancel_requested = false;

        log::debug!(
            "Clock started at {:.1}ms: target {:.1}px over {:.0}ms",
            now_ms,
            self.target,
            self.timing.spin_duration_ms
        );
        Ok(())
    }

    /// Request cancellation. Honoured at the top of the next tick.
    pub fn cancel(&mut self) {
        if self.state == ClockState::Running {
            self.cancel_requested = true;
        }
    }

    /// Scroll offset after `elapsed_ms` of the current spin
    pub fn offset_at(&self, elapsed_ms: f64) -> f64 {
        let progress = (elapsed_ms.max(0.0) / self.timing.spin_duration_ms).min(1.0);
        self.timing.easing.evaluate(progress) * self.target
    }

    /// Advance to host time `now_ms`, returning the events of this frame
    pub fn tick(&mut self, now_ms: f64) -> Vec<ClockEvent> {
        let mut events = Vec::new();

        if self.state != ClockState::Running {
            return events;
        }
        if self.cancel_requested {
            self.state = ClockState::Cancelled;
            self.cancel_requested = false;
            log::debug!("Clock cancelled at {:.1}ms", now_ms);
            return events;
        }

        let elapsed = (now_ms - self.start_ms).max(0.0);
        let progress = (elapsed / self.timing.spin_duration_ms).min(1.0);
        self.offset = if progress >= 1.0 {
            self.target
        } else {
            self.timing.easing.evaluate(progress) * self.target
        };

        let index = self.geometry.center_index(self.offset);
        if self.last_index != Some(index) {
            self.last_index = Some(index);
            events.push(ClockEvent::CenterCrossed(index));
        }

        if progress >= 1.0 {
            if self.last_index != Some(self.winning_index) {
                self.last_index = Some(self.winning_index);
                events.push(ClockEvent::CenterCrossed(self.winning_index));
            }
            self.state = ClockState::Settled;
            events.push(ClockEvent::Settled(self.winning_index));
            log::debug!("Clock settled on slot {}", self.winning_index);
        }

        events
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running && !self.cancel_requested
    }

    /// Current scroll offset (px)
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Offset that centers the winning slot (px)
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Slot currently at the viewport center, if a frame has run
    pub fn center_index(&self) -> Option<usize> {
        self.last_index
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn timing(&self) -> &SpinTiming {
        &self.timing
    }
}
