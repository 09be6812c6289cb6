//! Tone — a single scheduled oscillator note with a decaying envelope

use serde::{Deserialize, Serialize};

/// Envelope floor reached at the end of the decay
pub const ENVELOPE_FLOOR: f32 = 0.001;

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Waveform {
    Sine,
    Square,
    Triangle,
}

impl Waveform {
    /// Sample the waveform at phase in [0, 1)
    #[inline]
    pub fn sample(&self, phase: f64) -> f32 {
        match self {
            Waveform::Sine => (phase * std::f64::consts::TAU).sin() as f32,
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Triangle => (1.0 - 4.0 * (phase - 0.5).abs()) as f32,
        }
    }
}

/// Where a tone is routed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bus {
    /// Straight to the output (sound effects)
    Direct,
    /// Music melody channel
    Melody,
    /// Music bass channel
    Bass,
    /// Music arpeggio channel
    Arp,
}

/// Gain stages of the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GainStage {
    /// Master volume of all music channels
    MusicMaster,
    Melody,
    Bass,
    Arp,
}

impl GainStage {
    pub const ALL: [GainStage; 4] = [
        GainStage::MusicMaster,
        GainStage::Melody,
        GainStage::Bass,
        GainStage::Arp,
    ];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            GainStage::MusicMaster => 0,
            GainStage::Melody => 1,
            GainStage::Bass => 2,
            GainStage::Arp => 3,
        }
    }
}

impl Bus {
    /// Channel gain stage feeding the music master, if any
    pub fn stage(self) -> Option<GainStage> {
        match self {
            Bus::Direct => None,
            Bus::Melody => Some(GainStage::Melody),
            Bus::Bass => Some(GainStage::Bass),
            Bus::Arp => Some(GainStage::Arp),
        }
    }
}

/// A note scheduled on the audio clock
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    /// Start time on the audio clock (seconds)
    pub start: f64,
    /// Oscillator frequency (Hz)
    pub frequency: f32,
    pub waveform: Waveform,
    /// Envelope start level
    pub peak: f32,
    /// Time for the envelope to fall from `peak` to the floor (seconds)
    pub decay: f64,
    /// Time until the oscillator stops (seconds, >= decay)
    pub length: f64,
    pub bus: Bus,
}

impl Tone {
    /// Full-level direct tone starting at time 0
    pub fn new(frequency: f32, waveform: Waveform) -> Self {
        Self {
            start: 0.0,
            frequency,
            waveform,
            peak: 1.0,
            decay: 0.1,
            length: 0.1,
            bus: Bus::Direct,
        }
    }

    pub fn at(mut self, start: f64) -> Self {
        self.start = start;
        self
    }

    pub fn peak(mut self, peak: f32) -> Self {
        self.peak = peak;
        self
    }

    /// Set decay; the oscillator stops with the envelope unless a tail is added
    pub fn decay(mut self, decay: f64) -> Self {
        self.decay = decay;
        self.length = decay;
        self
    }

    /// Keep the oscillator running `tail` seconds past the decay
    pub fn tail(mut self, tail: f64) -> Self {
        self.length = self.decay + tail.max(0.0);
        self
    }

    pub fn on(mut self, bus: Bus) -> Self {
        self.bus = bus;
        self
    }

    /// Time the oscillator stops
    #[inline]
    pub fn end(&self) -> f64 {
        self.start + self.length
    }

    /// Envelope level at `t` seconds after start (exponential ramp to the floor)
    #[inline]
    pub fn envelope(&self, t: f64) -> f32 {
        if t < 0.0 || t >= self.length {
            return 0.0;
        }
        if self.peak <= ENVELOPE_FLOOR || self.decay <= 0.0 {
            return self.peak.min(ENVELOPE_FLOOR);
        }
        if t >= self.decay {
            return ENVELOPE_FLOOR;
        }
        let ratio = (ENVELOPE_FLOOR / self.peak) as f64;
        (self.peak as f64 * ratio.powf(t / self.decay)) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_waveforms() {
        assert_relative_eq!(Waveform::Sine.sample(0.25), 1.0, epsilon = 1e-6);
        assert_eq!(Waveform::Square.sample(0.1), 1.0);
        assert_eq!(Waveform::Square.sample(0.6), -1.0);
        assert_relative_eq!(Waveform::Triangle.sample(0.5), 1.0);
        assert_relative_eq!(Waveform::Triangle.sample(0.0), -1.0);
    }

    #[test]
    fn test_envelope_decays_to_floor() {
        let tone = Tone::new(440.0, Waveform::Sine).peak(0.5).decay(0.2).tail(0.01);
        assert_relative_eq!(tone.envelope(0.0), 0.5);
        assert!(tone.envelope(0.1) < 0.5);
        assert!(tone.envelope(0.1) > ENVELOPE_FLOOR);
        assert_relative_eq!(tone.envelope(0.205), ENVELOPE_FLOOR);
        assert_eq!(tone.envelope(0.22), 0.0);
        assert_eq!(tone.envelope(-0.01), 0.0);
    }

    #[test]
    fn test_builder() {
        let tone = Tone::new(220.0, Waveform::Triangle)
            .at(1.5)
            .decay(0.3)
            .tail(0.01)
            .on(Bus::Bass);
        assert_relative_eq!(tone.end(), 1.81, epsilon = 1e-12);
        assert_eq!(tone.bus.stage(), Some(GainStage::Bass));
    }
}
