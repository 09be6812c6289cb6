//! Mixer — renders scheduled tones through the gain stages
//!
//! The mixer owns the authoritative audio clock: a sample counter advanced
//! only by `render`. Device and offline outputs both wrap one.

use crate::tone::{Bus, GainStage, Tone};

/// Simultaneous voices. The voice list never grows past this, so scheduling
/// from the device callback never allocates.
pub const MAX_VOICES: usize = 64;

/// Gain with `setTargetAtTime`-style exponential approach
#[derive(Debug, Clone, Copy)]
struct SmoothedGain {
    value: f32,
    target: f32,
    /// Per-sample approach coefficient (1.0 = jump)
    coeff: f32,
}

impl SmoothedGain {
    fn new(value: f32) -> Self {
        Self {
            value,
            target: value,
            coeff: 1.0,
        }
    }

    #[inline]
    fn next(&mut self) -> f32 {
        self.value += (self.target - self.value) * self.coeff;
        self.value
    }
}

/// A voice is a tone plus its oscillator phase
#[derive(Debug, Clone, Copy)]
struct Voice {
    tone: Tone,
    phase: f64,
}

/// Tone renderer with four gain stages
#[derive(Debug, Clone)]
pub struct Mixer {
    sample_rate: f64,
    clock: u64,
    voices: Vec<Voice>,
    gains: [SmoothedGain; 4],
}

impl Mixer {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate: sample_rate.max(1) as f64,
            clock: 0,
            voices: Vec::with_capacity(MAX_VOICES),
            gains: [SmoothedGain::new(1.0); 4],
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate as u32
    }

    /// Samples rendered so far
    pub fn samples(&self) -> u64 {
        self.clock
    }

    /// Audio clock in seconds
    #[inline]
    pub fn now(&self) -> f64 {
        self.clock as f64 / self.sample_rate
    }

    /// Queue a tone. Returns false if it was dropped: already ended, silent,
    /// or every voice is busy.
    pub fn schedule(&mut self, tone: Tone) -> bool {
        if tone.end() <= self.now() || tone.frequency <= 0.0 {
            return false;
        }
        if self.voices.len() >= MAX_VOICES {
            return false;
        }
        self.voices.push(Voice { tone, phase: 0.0 });
        true
    }

    /// Set a gain stage. `time_constant` in seconds glides toward the value,
    /// `None` jumps immediately.
    pub fn set_gain(&mut self, stage: GainStage, value: f32, time_constant: Option<f64>) {
        let gain = &mut self.gains[stage.index()];
        gain.target = value;
        match time_constant {
            Some(tau) if tau > 0.0 => {
                gain.coeff = (1.0 - (-1.0 / (tau * self.sample_rate)).exp()) as f32;
            }
            _ => {
                gain.coeff = 1.0;
                gain.value = value;
            }
        }
    }

    /// Current (smoothed) value of a gain stage
    pub fn gain(&self, stage: GainStage) -> f32 {
        self.gains[stage.index()].value
    }

    /// Target value of a gain stage
    pub fn gain_target(&self, stage: GainStage) -> f32 {
        self.gains[stage.index()].target
    }

    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    /// Render interleaved frames; every channel gets the same mono mix
    pub fn render(&mut self, out: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        let dt = 1.0 / self.sample_rate;

        for frame in out.chunks_mut(channels) {
            let t = self.now();
            let master = self.gains[GainStage::MusicMaster.index()].next();
            let mut bus_gain = [1.0f32; 4];
            for stage in [GainStage::Melody, GainStage::Bass, GainStage::Arp] {
                bus_gain[stage.index()] = self.gains[stage.index()].next() * master;
            }

            let mut mix = 0.0f32;
            for voice in self.voices.iter_mut() {
                let local = t - voice.tone.start;
                if local < 0.0 {
                    continue;
                }
                let env = voice.tone.envelope(local);
                let routed = match voice.tone.bus {
                    Bus::Direct => 1.0,
                    bus => bus.stage().map(|s| bus_gain[s.index()]).unwrap_or(1.0),
                };
                mix += voice.tone.waveform.sample(voice.phase) * env * routed;
                voice.phase = (voice.phase + voice.tone.frequency as f64 * dt).fract();
            }

            let sample = mix.clamp(-1.0, 1.0);
            frame.fill(sample);

            self.clock += 1;
        }

        let now = self.now();
        self.voices.retain(|v| v.tone.end() > now);
    }

    /// Advance the clock by whole frames without keeping the output
    pub fn render_silent(&mut self, frames: usize) {
        let mut scratch = [0.0f32; 256];
        let mut remaining = frames;
        while remaining > 0 {
            let n = remaining.min(scratch.len());
            self.render(&mut scratch[..n], 1);
            remaining -= n;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tone::Waveform;
    use approx::assert_relative_eq;

    #[test]
    fn test_clock_advances_with_render() {
        let mut mixer = Mixer::new(48_000);
        let mut buf = vec![0.0f32; 480 * 2];
        mixer.render(&mut buf, 2);
        assert_eq!(mixer.samples(), 480);
        assert_relative_eq!(mixer.now(), 0.01);
    }

    #[test]
    fn test_tone_starts_on_schedule() {
        let mut mixer = Mixer::new(1000);
        mixer.schedule(Tone::new(100.0, Waveform::Square).at(0.01).decay(0.05));

        let mut buf = vec![0.0f32; 20];
        mixer.render(&mut buf, 1);
        assert!(buf[..10].iter().all(|s| *s == 0.0));
        assert!(buf[10] > 0.0);
    }

    #[test]
    fn test_finished_voices_are_dropped() {
        let mut mixer = Mixer::new(1000);
        mixer.schedule(Tone::new(100.0, Waveform::Sine).decay(0.01));
        assert_eq!(mixer.active_voices(), 1);
        mixer.render_silent(20);
        assert_eq!(mixer.active_voices(), 0);

        // Already in the past
        mixer.schedule(Tone::new(100.0, Waveform::Sine).at(0.0).decay(0.01));
        assert_eq!(mixer.active_voices(), 0);
    }

    #[test]
    fn test_voice_limit() {
        let mut mixer = Mixer::new(1000);
        let capacity = mixer.voices.capacity();
        for i in 0..MAX_VOICES {
            assert!(mixer.schedule(Tone::new(100.0 + i as f32, Waveform::Sine).decay(1.0)));
        }
        assert!(!mixer.schedule(Tone::new(50.0, Waveform::Sine).decay(1.0)));
        assert_eq!(mixer.active_voices(), MAX_VOICES);
        assert_eq!(mixer.voices.capacity(), capacity);

        // voices free up once their tones end
        mixer.render_silent(1100);
        assert_eq!(mixer.active_voices(), 0);
        assert!(mixer.schedule(Tone::new(50.0, Waveform::Sine).at(1.2).decay(0.1)));
    }

    #[test]
    fn test_music_bus_follows_master() {
        let mut mixer = Mixer::new(1000);
        mixer.set_gain(GainStage::MusicMaster, 0.0, None);
        mixer.schedule(Tone::new(100.0, Waveform::Square).decay(0.05).on(Bus::Melody));
        mixer.schedule(Tone::new(100.0, Waveform::Square).decay(0.05).on(Bus::Direct).at(0.1));

        let mut buf = vec![0.0f32; 150];
        mixer.render(&mut buf, 1);
        assert!(buf[..50].iter().all(|s| *s == 0.0));
        assert!(buf[100..].iter().any(|s| *s != 0.0));
    }

    #[test]
    fn test_gain_glide() {
        let mut mixer = Mixer::new(1000);
        mixer.set_gain(GainStage::MusicMaster, 0.0, Some(0.05));
        assert_eq!(mixer.gain_target(GainStage::MusicMaster), 0.0);
        mixer.render_silent(10);
        let mid = mixer.gain(GainStage::MusicMaster);
        assert!(mid < 1.0 && mid > 0.0);
        mixer.render_silent(1000);
        assert!(mixer.gain(GainStage::MusicMaster) < 1e-3);
    }
}
