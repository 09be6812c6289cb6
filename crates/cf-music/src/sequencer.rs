//! Look-ahead music sequencer

use serde::{Deserialize, Serialize};

use cf_audio::{AudioHandle, AudioOutput, Bus, GainStage, Tone};
use cf_stage::taxonomy::MusicMode;

use crate::config::{ChannelConfig, MusicConfig};
use crate::notes::Note;
use crate::patterns::{PATTERN_STEPS, Theme};

/// Sequencer state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MusicEngineState {
    pub mode: MusicMode,
    /// Master volume 0.0 - 1.0
    pub volume: f32,
    pub playing: bool,
    /// Steps played since the last start or mode change
    pub cursor: usize,
    /// Audio-clock time of the next unscheduled step (seconds)
    pub next_event_time: f64,
}

impl Default for MusicEngineState {
    fn default() -> Self {
        Self {
            mode: MusicMode::Idle,
            volume: 0.6,
            playing: false,
            cursor: 0,
            next_event_time: 0.0,
        }
    }
}

/// Schedules the current theme ahead of the audio clock
pub struct MusicSequencer {
    config: MusicConfig,
    state: MusicEngineState,
    audio: AudioHandle,
}

impl MusicSequencer {
    pub fn new(config: MusicConfig, audio: AudioHandle) -> Self {
        Self {
            config,
            state: MusicEngineState::default(),
            audio,
        }
    }

    pub fn state(&self) -> &MusicEngineState {
        &self.state
    }

    pub fn config(&self) -> &MusicConfig {
        &self.config
    }

    pub fn is_playing(&self) -> bool {
        self.state.playing
    }

    pub fn mode(&self) -> MusicMode {
        self.state.mode
    }

    /// Start playback, creating the audio graph if needed.
    ///
    /// Returns false when audio is unavailable.
    pub fn start(&mut self) -> bool {
        if self.state.playing {
            return true;
        }

        let config = &self.config;
        let volume = self.state.volume;
        let started = self.audio.with_output(|out| {
            out.set_gain(GainStage::Melody, config.melody.gain, None);
            out.set_gain(GainStage::Bass, config.bass.gain, None);
            out.set_gain(GainStage::Arp, config.arp.gain, None);
            out.set_gain(GainStage::MusicMaster, volume, None);
            out.now() + config.start_delay
        });

        let Some(first_step) = started else {
            log::debug!("Music not started: audio unavailable");
            return false;
        };

        self.state.playing = true;
        self.state.cursor = 0;
        self.state.next_event_time = first_step;
        log::info!("Music started ({} theme)", self.state.mode);

        self.service();
        true
    }

    /// Fade out and stop scheduling
    pub fn stop(&mut self) {
        if !self.state.playing {
            return;
        }
        self.state.playing = false;
        let tau = self.config.stop_time_constant;
        self.audio
            .with_output(|out| out.set_gain(GainStage::MusicMaster, 0.0, Some(tau)));
        log::info!("Music stopped");
    }

    /// Switch theme. The next serviced step is step 0 of the new theme.
    ///
    /// Returns true if the mode changed.
    pub fn set_mode(&mut self, mode: MusicMode) -> bool {
        if self.state.mode == mode {
            return false;
        }
        self.state.mode = mode;
        self.state.cursor = 0;
        log::debug!("Music mode -> {}", mode);
        true
    }

    /// Clamped to [0, 1]; glides the master gain while playing
    pub fn set_volume(&mut self, volume: f32) {
        let volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.state.volume = volume;
        if self.state.playing {
            let tau = self.config.volume_time_constant;
            self.audio
                .with_output(|out| out.set_gain(GainStage::MusicMaster, volume, Some(tau)));
        }
    }

    /// Schedule every step due before `audio_now + lookahead`.
    ///
    /// Returns the number of steps scheduled.
    pub fn service(&mut self) -> usize {
        if !self.state.playing {
            return 0;
        }

        let config = &self.config;
        let state = &mut self.state;
        self.audio
            .with_output(|out| {
                let horizon = out.now() + config.lookahead;
                let theme = Theme::for_mode(state.mode);
                let step = config.step_duration(state.mode);
                let mut scheduled = 0;

                while state.next_event_time < horizon {
                    let index = state.cursor % PATTERN_STEPS;
                    let at = state.next_event_time;
                    let voices = [
                        (theme.melody[index], &config.melody, Bus::Melody),
                        (theme.bass[index], &config.bass, Bus::Bass),
                        (theme.arp[index], &config.arp, Bus::Arp),
                    ];
                    for (note, channel, bus) in voices {
                        if let Some(note) = note {
                            play_note(out, note, channel, bus, state.mode, at, config.note_tail);
                        }
                    }
                    state.next_event_time += step;
                    state.cursor += 1;
                    scheduled += 1;
                }
                scheduled
            })
            .unwrap_or(0)
    }

    /// Stop and release the audio graph
    pub fn dispose(&mut self) {
        self.stop();
        self.audio.close();
    }
}

fn play_note(
    out: &mut dyn AudioOutput,
    note: Note,
    channel: &ChannelConfig,
    bus: Bus,
    mode: MusicMode,
    at: f64,
    tail: f64,
) {
    let tone = Tone::new(note.frequency(), channel.waveform)
        .at(at)
        .decay(channel.duration(mode))
        .tail(tail)
        .on(bus);
    out.play(tone);
}
