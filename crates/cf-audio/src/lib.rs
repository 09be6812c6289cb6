//! cf-audio: Audio output for the claw machine
//!
//! One shared output graph, created lazily on first use and torn down on
//! session disposal. Music and sound effects schedule [`Tone`]s against the
//! graph's audio clock; the [`Mixer`] turns them into samples.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌────────────┐     ┌──────────────────┐
//! │ SoundEffects │────▶│            │     │ OfflineOutput    │
//! │              │     │ AudioGraph │────▶│   or             │
//! │ MusicSeq     │────▶│  (lazy)    │     │ CpalOutput       │
//! └──────────────┘     └────────────┘     │  └─ Mixer        │
//!                                         └──────────────────┘
//! ```
//!
//! If the output cannot be created the graph degrades to a no-op: callers
//! keep working, nothing is heard.

mod error;
mod export;
mod graph;
mod mixer;
mod output;
mod sfx;
mod tone;

#[cfg(feature = "device")]
mod device;

pub use error::*;
pub use export::*;
pub use graph::*;
pub use mixer::*;
pub use output::*;
pub use sfx::*;
pub use tone::*;

#[cfg(feature = "device")]
pub use device::*;

/// Default render sample rate
pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;
