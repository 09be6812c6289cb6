//! Audio outputs — where scheduled tones end up
//!
//! [`AudioOutput`] is the seam between the scheduling side (music, sound
//! effects) and whatever renders samples. [`OfflineOutput`] renders on
//! demand, which makes the audio clock fully deterministic for tests and
//! for WAV export.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::mixer::Mixer;
use crate::tone::{GainStage, Tone};

/// A sink for scheduled tones with its own audio clock
pub trait AudioOutput: Send {
    /// Current audio clock (seconds)
    fn now(&self) -> f64;

    /// Schedule a tone on the audio clock
    fn play(&mut self, tone: Tone);

    /// Set a gain stage, optionally gliding with a time constant (seconds)
    fn set_gain(&mut self, stage: GainStage, value: f32, time_constant: Option<f64>);

    /// Resume a suspended output (no-op by default)
    fn resume(&mut self) {}

    /// Release the output; further calls are ignored
    fn close(&mut self);
}

#[derive(Debug)]
struct OfflineState {
    mixer: Mixer,
    scheduled: Vec<Tone>,
    rendered: Vec<f32>,
    record: bool,
    closed: bool,
}

/// Output rendered on demand through an [`OfflineProbe`]
pub struct OfflineOutput {
    state: Arc<Mutex<OfflineState>>,
}

/// Test/export side of an [`OfflineOutput`]
#[derive(Clone)]
pub struct OfflineProbe {
    state: Arc<Mutex<OfflineState>>,
}

impl OfflineOutput {
    /// Create an output and the probe that drives its clock
    pub fn new(sample_rate: u32) -> (Self, OfflineProbe) {
        let state = Arc::new(Mutex::new(OfflineState {
            mixer: Mixer::new(sample_rate),
            scheduled: Vec::new(),
            rendered: Vec::new(),
            record: true,
            closed: false,
        }));
        (
            Self {
                state: Arc::clone(&state),
            },
            OfflineProbe { state },
        )
    }
}

impl AudioOutput for OfflineOutput {
    fn now(&self) -> f64 {
        self.state.lock().mixer.now()
    }

    fn play(&mut self, tone: Tone) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        state.scheduled.push(tone);
        state.mixer.schedule(tone);
    }

    fn set_gain(&mut self, stage: GainStage, value: f32, time_constant: Option<f64>) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        state.mixer.set_gain(stage, value, time_constant);
    }

    fn close(&mut self) {
        self.state.lock().closed = true;
    }
}

impl OfflineProbe {
    /// Render `seconds` of audio, advancing the clock
    pub fn advance(&self, seconds: f64) {
        let mut state = self.state.lock();
        let frames = (seconds.max(0.0) * state.mixer.sample_rate() as f64).round() as usize;
        if state.record {
            let start = state.rendered.len();
            state.rendered.resize(start + frames, 0.0);
            let OfflineState {
                mixer, rendered, ..
            } = &mut *state;
            mixer.render(&mut rendered[start..], 1);
        } else {
            state.mixer.render_silent(frames);
        }
    }

    /// Stop (or resume) keeping rendered samples
    pub fn set_recording(&self, record: bool) {
        self.state.lock().record = record;
    }

    /// Every tone scheduled so far, in scheduling order
    pub fn scheduled(&self) -> Vec<Tone> {
        self.state.lock().scheduled.clone()
    }

    /// Take the mono samples rendered so far
    pub fn take_samples(&self) -> Vec<f32> {
        std::mem::take(&mut self.state.lock().rendered)
    }

    pub fn now(&self) -> f64 {
        self.state.lock().mixer.now()
    }

    pub fn sample_rate(&self) -> u32 {
        self.state.lock().mixer.sample_rate()
    }

    /// Current smoothed value of a gain stage
    pub fn gain(&self, stage: GainStage) -> f32 {
        self.state.lock().mixer.gain(stage)
    }

    /// Value a gain stage is heading for
    pub fn gain_target(&self, stage: GainStage) -> f32 {
        self.state.lock().mixer.gain_target(stage)
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tone::Waveform;
    use approx::assert_relative_eq;

    #[test]
    fn test_offline_clock_follows_probe() {
        let (output, probe) = OfflineOutput::new(1000);
        assert_eq!(output.now(), 0.0);
        probe.advance(0.25);
        assert_relative_eq!(output.now(), 0.25);
        assert_eq!(probe.take_samples().len(), 250);
    }

    #[test]
    fn test_offline_records_schedule() {
        let (mut output, probe) = OfflineOutput::new(1000);
        output.play(Tone::new(440.0, Waveform::Sine).at(0.1));
        output.set_gain(GainStage::MusicMaster, 0.5, None);
        assert_eq!(probe.scheduled().len(), 1);
        assert_eq!(probe.gain(GainStage::MusicMaster), 0.5);

        output.close();
        assert!(probe.is_closed());
        output.play(Tone::new(440.0, Waveform::Sine).at(0.2));
        assert_eq!(probe.scheduled().len(), 1);
    }
}
