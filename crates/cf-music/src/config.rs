//! Sequencer tuning

use serde::{Deserialize, Serialize};

use cf_audio::Waveform;
use cf_core::{CfError, CfResult};
use cf_stage::taxonomy::MusicMode;

/// Voice settings for one channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub waveform: Waveform,
    /// Note length in the idle theme (seconds)
    pub idle_duration: f64,
    /// Note length in the spin theme (seconds)
    pub spin_duration: f64,
    /// Channel gain into the music master
    pub gain: f32,
}

impl ChannelConfig {
    pub fn duration(&self, mode: MusicMode) -> f64 {
        match mode {
            MusicMode::Idle => self.idle_duration,
            MusicMode::Spin => self.spin_duration,
        }
    }
}

/// Music sequencer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MusicConfig {
    pub idle_bpm: f64,
    pub spin_bpm: f64,
    /// Scheduling horizon past the audio clock (seconds)
    pub lookahead: f64,
    /// Host service interval (ms)
    pub service_interval_ms: u64,
    /// Delay before the first step after `start` (seconds)
    pub start_delay: f64,
    /// Master fade-out time constant on `stop` (seconds)
    pub stop_time_constant: f64,
    /// Master glide time constant on volume changes (seconds)
    pub volume_time_constant: f64,
    /// Oscillator run-on after each note's envelope (seconds)
    pub note_tail: f64,
    pub melody: ChannelConfig,
    pub bass: ChannelConfig,
    pub arp: ChannelConfig,
}

impl Default for MusicConfig {
    fn default() -> Self {
        Self {
            idle_bpm: 130.0,
            spin_bpm: 180.0,
            lookahead: 0.1,
            service_interval_ms: 25,
            start_delay: 0.05,
            stop_time_constant: 0.08,
            volume_time_constant: 0.05,
            note_tail: 0.01,
            melody: ChannelConfig {
                waveform: Waveform::Square,
                idle_duration: 0.18,
                spin_duration: 0.12,
                gain: 0.18,
            },
            bass: ChannelConfig {
                waveform: Waveform::Triangle,
                idle_duration: 0.3,
                spin_duration: 0.2,
                gain: 0.22,
            },
            arp: ChannelConfig {
                waveform: Waveform::Square,
                idle_duration: 0.06,
                spin_duration: 0.06,
                gain: 0.07,
            },
        }
    }
}

impl MusicConfig {
    pub fn bpm(&self, mode: MusicMode) -> f64 {
        match mode {
            MusicMode::Idle => self.idle_bpm,
            MusicMode::Spin => self.spin_bpm,
        }
    }

    /// Length of one step (an eighth note) in seconds
    pub fn step_duration(&self, mode: MusicMode) -> f64 {
        60.0 / self.bpm(mode) / 2.0
    }

    pub fn validate(&self) -> CfResult<()> {
        for (name, bpm) in [("idle", self.idle_bpm), ("spin", self.spin_bpm)] {
            if !bpm.is_finite() || bpm <= 0.0 {
                return Err(CfError::InvalidConfig(format!(
                    "{name} bpm must be positive, got {bpm}"
                )));
            }
        }
        if !self.lookahead.is_finite() || self.lookahead <= 0.0 {
            return Err(CfError::InvalidConfig(format!(
                "lookahead must be positive, got {}",
                self.lookahead
            )));
        }
        if self.service_interval_ms == 0 {
            return Err(CfError::InvalidConfig(
                "service interval must be at least 1ms".into(),
            ));
        }
        if self.service_interval_ms as f64 / 1000.0 >= self.lookahead {
            log::warn!(
                "Music service interval {}ms is not shorter than the {:.0}ms lookahead; notes may arrive late",
                self.service_interval_ms,
                self.lookahead * 1000.0
            );
        }
        Ok(())
    }
}
