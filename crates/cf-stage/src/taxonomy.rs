//! Shared vocabulary: session states and music modes

use serde::{Deserialize, Serialize};

/// Spin lifecycle state of a machine session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpinState {
    /// Waiting for a spin request
    #[default]
    Idle,
    /// Strip is scrolling, outcome already fixed
    Spinning,
    /// Strip settled, winner presented
    Revealed,
}

impl SpinState {
    pub fn name(&self) -> &'static str {
        match self {
            SpinState::Idle => "idle",
            SpinState::Spinning => "spinning",
            SpinState::Revealed => "revealed",
        }
    }
}

/// Background music pattern set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MusicMode {
    /// Slow town theme
    #[default]
    Idle,
    /// Up-tempo theme while the strip scrolls
    Spin,
}

impl MusicMode {
    pub fn name(&self) -> &'static str {
        match self {
            MusicMode::Idle => "idle",
            MusicMode::Spin => "spin",
        }
    }

    /// Mode that matches a session state
    pub fn for_state(state: SpinState) -> Self {
        match state {
            SpinState::Spinning => MusicMode::Spin,
            SpinState::Idle | SpinState::Revealed => MusicMode::Idle,
        }
    }
}

impl std::fmt::Display for MusicMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::fmt::Display for SpinState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
