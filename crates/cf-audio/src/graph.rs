//! Audio graph — one lazily created output shared by music and effects
//!
//! The output is built on first use, not at construction. If building it
//! fails the graph stays unavailable until `close`, and every audio call
//! becomes a no-op.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::AudioResult;
use crate::output::{AudioOutput, OfflineOutput, OfflineProbe};

/// Builds the output on first use
pub type OutputFactory = Box<dyn FnMut() -> AudioResult<Box<dyn AudioOutput>> + Send>;

/// Graph lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphStatus {
    /// No output yet; the next use tries to build one
    Uninitialized,
    Ready,
    /// Output creation failed; audio is silently disabled
    Unavailable,
}

/// Lazily built output
pub struct AudioGraph {
    factory: OutputFactory,
    output: Option<Box<dyn AudioOutput>>,
    status: GraphStatus,
}

impl fmt::Debug for AudioGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioGraph")
            .field("status", &self.status)
            .finish()
    }
}

impl AudioGraph {
    pub fn new(factory: OutputFactory) -> Self {
        Self {
            factory,
            output: None,
            status: GraphStatus::Uninitialized,
        }
    }

    pub fn status(&self) -> GraphStatus {
        self.status
    }

    fn ensure(&mut self) -> Option<&mut Box<dyn AudioOutput>> {
        if self.status == GraphStatus::Uninitialized {
            match (self.factory)() {
                Ok(mut output) => {
                    output.resume();
                    log::debug!("Audio output created");
                    self.output = Some(output);
                    self.status = GraphStatus::Ready;
                }
                Err(e) => {
                    log::warn!("Audio unavailable, continuing silently: {}", e);
                    self.status = GraphStatus::Unavailable;
                }
            }
        }
        self.output.as_mut()
    }

    /// Run `f` against the output, creating it on first use.
    /// Returns `None` when audio is unavailable.
    pub fn with_output<R>(&mut self, f: impl FnOnce(&mut dyn AudioOutput) -> R) -> Option<R> {
        self.ensure().map(|output| f(&mut **output))
    }

    /// Tear down the output; the next use builds a fresh one
    pub fn close(&mut self) {
        if let Some(mut output) = self.output.take() {
            output.close();
            log::debug!("Audio output closed");
        }
        self.status = GraphStatus::Uninitialized;
    }
}

/// Shared handle to one [`AudioGraph`]
#[derive(Debug, Clone)]
pub struct AudioHandle {
    graph: Arc<Mutex<AudioGraph>>,
}

impl AudioHandle {
    pub fn from_factory(factory: OutputFactory) -> Self {
        Self {
            graph: Arc::new(Mutex::new(AudioGraph::new(factory))),
        }
    }

    /// Handle over a fresh [`OfflineOutput`] per initialization.
    ///
    /// The probe follows the most recently created output.
    pub fn offline(sample_rate: u32) -> (Self, Arc<Mutex<Option<OfflineProbe>>>) {
        let probe_slot: Arc<Mutex<Option<OfflineProbe>>> = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&probe_slot);
        let handle = Self::from_factory(Box::new(move || {
            let (output, probe) = OfflineOutput::new(sample_rate);
            *slot.lock() = Some(probe);
            Ok(Box::new(output) as Box<dyn AudioOutput>)
        }));
        (handle, probe_slot)
    }

    /// Handle whose output can never be created
    pub fn disabled() -> Self {
        Self::from_factory(Box::new(|| Err(crate::AudioError::Unavailable)))
    }

    pub fn with_output<R>(&self, f: impl FnOnce(&mut dyn AudioOutput) -> R) -> Option<R> {
        self.graph.lock().with_output(f)
    }

    /// Audio clock, creating the output if needed
    pub fn now(&self) -> Option<f64> {
        self.with_output(|out| out.now())
    }

    pub fn status(&self) -> GraphStatus {
        self.graph.lock().status()
    }

    pub fn close(&self) {
        self.graph.lock().close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tone::{Tone, Waveform};
    use crate::AudioError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_lazy_creation() {
        let created = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&created);
        let handle = AudioHandle::from_factory(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            let (output, _probe) = OfflineOutput::new(1000);
            Ok(Box::new(output) as Box<dyn AudioOutput>)
        }));

        assert_eq!(created.load(Ordering::SeqCst), 0);
        assert_eq!(handle.status(), GraphStatus::Uninitialized);

        handle.with_output(|o| o.play(Tone::new(440.0, Waveform::Sine)));
        handle.with_output(|o| o.play(Tone::new(440.0, Waveform::Sine)));
        assert_eq!(created.load(Ordering::SeqCst), 1);
        assert_eq!(handle.status(), GraphStatus::Ready);

        handle.close();
        assert_eq!(handle.status(), GraphStatus::Uninitialized);
        handle.now();
        assert_eq!(created.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failed_creation_degrades_to_noop() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let handle = AudioHandle::from_factory(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(AudioError::NoDevice)
        }));

        assert_eq!(handle.now(), None);
        assert_eq!(handle.with_output(|_| 1), None);
        assert_eq!(handle.status(), GraphStatus::Unavailable);
        // Not retried on every call
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_offline_probe_tracks_latest_output() {
        let (handle, probe) = AudioHandle::offline(1000);
        assert!(probe.lock().is_none());
        handle.with_output(|o| o.play(Tone::new(440.0, Waveform::Sine).at(0.5)));

        let first = probe.lock().clone().unwrap();
        assert_eq!(first.scheduled().len(), 1);

        handle.close();
        assert!(first.is_closed());
        handle.now();
        let second = probe.lock().clone().unwrap();
        assert!(!second.is_closed());
        assert!(second.scheduled().is_empty());
    }

    #[test]
    fn test_disabled_handle() {
        let handle = AudioHandle::disabled();
        assert_eq!(handle.now(), None);
        assert_eq!(handle.status(), GraphStatus::Unavailable);
    }
}
