//! MachineEvent — every observable moment of a claw-machine session
//!
//! An event is the SEMANTIC MEANING of a moment, not an animation frame.
//! The UI renders from them, the audio layer fires sounds from them.

use serde::{Deserialize, Serialize};

use cf_core::PrizeItem;

use crate::taxonomy::MusicMode;

/// Canonical machine event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MachineEvent {
    // ═══════════════════════════════════════════════════════════════════════
    // STATIC INFO
    // ═══════════════════════════════════════════════════════════════════════
    /// Drop rate of one tier, for the static drop-rate display
    DropRate {
        label: String,
        tag: String,
        probability: f64,
    },

    /// Pool has no prizes; spins are refused
    PoolUnavailable,

    // ═══════════════════════════════════════════════════════════════════════
    // SPIN LIFECYCLE
    // ═══════════════════════════════════════════════════════════════════════
    /// Spin accepted, strip built, animation running
    SpinStarted {
        /// Sequence number of the spin within this session
        spin: u64,
        /// Number of slots on the strip
        strip_len: usize,
    },

    /// A new slot reached the viewport center
    CenterCrossed { index: usize },

    /// Strip came to rest on the winning slot
    Settled { winner: PrizeItem, index: usize },

    /// Reveal panel may open (short delay after settlement)
    RevealReady { winner: PrizeItem },

    /// Spin torn down before settling
    SpinCancelled,

    // ═══════════════════════════════════════════════════════════════════════
    // AUDIO / SOCIAL
    // ═══════════════════════════════════════════════════════════════════════
    /// Background music switched pattern
    ModeChanged { mode: MusicMode },

    /// User asked to share the last pull
    ShareRequested { text: String },
}

impl MachineEvent {
    /// Stable name for logging and filtering
    pub fn type_name(&self) -> &'static str {
        match self {
            MachineEvent::DropRate { .. } => "drop_rate",
            MachineEvent::PoolUnavailable => "pool_unavailable",
            MachineEvent::SpinStarted { .. } => "spin_started",
            MachineEvent::CenterCrossed { .. } => "center_crossed",
            MachineEvent::Settled { .. } => "settled",
            MachineEvent::RevealReady { .. } => "reveal_ready",
            MachineEvent::SpinCancelled => "spin_cancelled",
            MachineEvent::ModeChanged { .. } => "mode_changed",
            MachineEvent::ShareRequested { .. } => "share_requested",
        }
    }

    /// True for events that end a spin
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            MachineEvent::Settled { .. } | MachineEvent::SpinCancelled
        )
    }
}
