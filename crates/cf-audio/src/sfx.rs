//! Roulette sound effects — center-crossing ticks and the win chime
//!
//! Ticks are throttled: a crossing inside the throttle window of the last
//! audible tick is dropped, never queued. The chime is not throttled.

use serde::{Deserialize, Serialize};

use cf_core::{CfError, CfResult, RandomSource};

use crate::graph::AudioHandle;
use crate::tone::{Tone, Waveform};

/// Sound effect tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SfxConfig {
    /// Minimum spacing between audible ticks (ms)
    pub throttle_ms: f64,
    /// Tick pitch range [low, high) in Hz
    pub tick_freq_low: f32,
    pub tick_freq_high: f32,
    /// Tick peak gain before volume scaling
    pub tick_gain: f32,
    /// Tick decay (seconds)
    pub tick_decay: f64,
    /// Win chime pitches (Hz), played in order
    pub chime_notes: Vec<f32>,
    /// Spacing between chime notes (seconds)
    pub chime_spacing: f64,
    pub chime_gain: f32,
    pub chime_decay: f64,
}

impl Default for SfxConfig {
    fn default() -> Self {
        Self {
            throttle_ms: 50.0,
            tick_freq_low: 600.0,
            tick_freq_high: 1200.0,
            tick_gain: 0.08,
            tick_decay: 0.04,
            chime_notes: vec![523.0, 659.0, 784.0, 1047.0],
            chime_spacing: 0.12,
            chime_gain: 0.12,
            chime_decay: 0.35,
        }
    }
}

impl SfxConfig {
    pub fn validate(&self) -> CfResult<()> {
        if self.throttle_ms.is_nan() || self.throttle_ms < 0.0 {
            return Err(CfError::InvalidConfig(format!(
                "sfx throttle must be >= 0, got {}",
                self.throttle_ms
            )));
        }
        if self.tick_freq_low <= 0.0 || self.tick_freq_high < self.tick_freq_low {
            return Err(CfError::InvalidConfig(format!(
                "invalid tick pitch range [{}, {})",
                self.tick_freq_low, self.tick_freq_high
            )));
        }
        if self.tick_decay <= 0.0 || self.chime_decay <= 0.0 {
            return Err(CfError::InvalidConfig(
                "sfx decay times must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Mutable effect settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SfxState {
    pub enabled: bool,
    /// 0.0 - 1.0
    pub volume: f32,
    /// Host time of the last audible tick
    pub last_fire_ms: Option<f64>,
}

impl Default for SfxState {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 0.8,
            last_fire_ms: None,
        }
    }
}

/// Tick and chime player
pub struct SoundEffects {
    config: SfxConfig,
    state: SfxState,
    audio: AudioHandle,
    rng: Box<dyn RandomSource>,
}

impl SoundEffects {
    pub fn new(config: SfxConfig, audio: AudioHandle, rng: Box<dyn RandomSource>) -> Self {
        Self {
            config,
            state: SfxState::default(),
            audio,
            rng,
        }
    }

    pub fn state(&self) -> &SfxState {
        &self.state
    }

    pub fn config(&self) -> &SfxConfig {
        &self.config
    }

    fn audible(&self) -> bool {
        self.state.enabled && self.state.volume > 0.0
    }

    /// Tick for a slot crossing the center at host time `now_ms`.
    ///
    /// Returns true if a tone was scheduled.
    pub fn on_center_crossed(&mut self, now_ms: f64) -> bool {
        if !self.audible() {
            return false;
        }
        if let Some(last) = self.state.last_fire_ms {
            if now_ms - last < self.config.throttle_ms {
                return false;
            }
        }

        let freq = self.rng.next_range(
            self.config.tick_freq_low as f64,
            self.config.tick_freq_high as f64,
        ) as f32;
        let peak = self.config.tick_gain * self.state.volume;
        let decay = self.config.tick_decay;

        let scheduled = self
            .audio
            .with_output(|out| {
                let tone = Tone::new(freq, Waveform::Sine)
                    .at(out.now())
                    .peak(peak)
                    .decay(decay);
                out.play(tone);
            })
            .is_some();

        if scheduled {
            self.state.last_fire_ms = Some(now_ms);
        }
        scheduled
    }

    /// Win chime. Returns the number of notes scheduled.
    pub fn on_settled(&mut self) -> usize {
        if !self.audible() {
            return 0;
        }
        let peak = self.config.chime_gain * self.state.volume;
        let config = &self.config;

        self.audio
            .with_output(|out| {
                let now = out.now();
                for (i, &freq) in config.chime_notes.iter().enumerate() {
                    let tone = Tone::new(freq, Waveform::Triangle)
                        .at(now + i as f64 * config.chime_spacing)
                        .peak(peak)
                        .decay(config.chime_decay);
                    out.play(tone);
                }
                config.chime_notes.len()
            })
            .unwrap_or(0)
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.state.enabled = enabled;
        log::debug!("SFX {}", if enabled { "enabled" } else { "disabled" });
    }

    /// Clamped to [0, 1]
    pub fn set_volume(&mut self, volume: f32) {
        self.state.volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OfflineProbe;
    use approx::assert_relative_eq;
    use cf_core::{RngSource, SequenceSource};
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn offline_sfx() -> (SoundEffects, Arc<Mutex<Option<OfflineProbe>>>) {
        let (audio, probe) = AudioHandle::offline(8000);
        let sfx = SoundEffects::new(
            SfxConfig::default(),
            audio,
            Box::new(RngSource::seeded(11)),
        );
        (sfx, probe)
    }

    fn scheduled(probe: &Arc<Mutex<Option<OfflineProbe>>>) -> Vec<Tone> {
        probe.lock().as_ref().map(|p| p.scheduled()).unwrap_or_default()
    }

    #[test]
    fn test_burst_inside_window_plays_one_tick() {
        let (mut sfx, probe) = offline_sfx();
        let fired = (0..100)
            .filter(|i| sfx.on_center_crossed(1000.0 + *i as f64 * 0.1))
            .count();
        assert_eq!(fired, 1);
        assert_eq!(scheduled(&probe).len(), 1);
    }

    #[test]
    fn test_ticks_resume_after_window() {
        let (mut sfx, probe) = offline_sfx();
        assert!(sfx.on_center_crossed(0.0));
        assert!(!sfx.on_center_crossed(49.0));
        assert!(sfx.on_center_crossed(50.0));
        assert!(!sfx.on_center_crossed(60.0));
        assert!(sfx.on_center_crossed(120.0));
        assert_eq!(scheduled(&probe).len(), 3);
    }

    #[test]
    fn test_tick_tone_shape() {
        let (audio, probe) = AudioHandle::offline(8000);
        let mut sfx = SoundEffects::new(
            SfxConfig::default(),
            audio,
            Box::new(SequenceSource::new([0.5])),
        );
        sfx.set_volume(0.5);
        sfx.on_center_crossed(0.0);

        let tones = scheduled(&probe);
        assert_eq!(tones.len(), 1);
        let tick = tones[0];
        assert_relative_eq!(tick.frequency, 900.0);
        assert_relative_eq!(tick.peak, 0.04);
        assert_eq!(tick.waveform, Waveform::Sine);
        assert_relative_eq!(tick.decay, 0.04);
    }

    #[test]
    fn test_tick_pitch_in_band() {
        let (mut sfx, probe) = offline_sfx();
        for i in 0..50 {
            sfx.on_center_crossed(i as f64 * 100.0);
        }
        for tone in scheduled(&probe) {
            assert!(tone.frequency >= 600.0 && tone.frequency < 1200.0);
        }
    }

    #[test]
    fn test_chime() {
        let (mut sfx, probe) = offline_sfx();
        sfx.set_volume(1.0);
        assert_eq!(sfx.on_settled(), 4);
        // Not throttled
        assert_eq!(sfx.on_settled(), 4);

        let tones = scheduled(&probe);
        let freqs: Vec<f32> = tones[..4].iter().map(|t| t.frequency).collect();
        assert_eq!(freqs, vec![523.0, 659.0, 784.0, 1047.0]);
        assert_relative_eq!(tones[3].start - tones[0].start, 0.36, epsilon = 1e-9);
        assert!(tones.iter().all(|t| t.waveform == Waveform::Triangle));
        assert_relative_eq!(tones[0].peak, 0.12);
    }

    #[test]
    fn test_muted_and_disabled_are_silent() {
        let (mut sfx, probe) = offline_sfx();
        sfx.set_volume(0.0);
        assert!(!sfx.on_center_crossed(0.0));
        assert_eq!(sfx.on_settled(), 0);

        sfx.set_volume(2.0);
        assert_eq!(sfx.state().volume, 1.0);
        sfx.set_enabled(false);
        assert!(!sfx.on_center_crossed(100.0));
        assert_eq!(sfx.on_settled(), 0);
        assert!(scheduled(&probe).is_empty());
    }

    #[test]
    fn test_unavailable_audio_is_noop() {
        let mut sfx = SoundEffects::new(
            SfxConfig::default(),
            AudioHandle::disabled(),
            Box::new(RngSource::seeded(1)),
        );
        assert!(!sfx.on_center_crossed(0.0));
        assert_eq!(sfx.on_settled(), 0);
    }
}
