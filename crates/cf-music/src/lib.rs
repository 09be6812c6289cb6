//! cf-music: Procedural background music
//!
//! A three-voice chiptune loop (melody, bass, arpeggio) in two moods: a slow
//! idle theme and a fast theme while the strip scrolls.
//!
//! Notes are scheduled ahead of time against the audio clock. The host calls
//! [`MusicSequencer::service`] on a short interval (or spawns a
//! [`ServiceThread`]); every call schedules all steps falling inside the
//! look-ahead window, so timer jitter never reaches the audio.
//!
//! ```text
//!  service() every 25ms
//!      │
//!      ▼
//!  ┌────────────┐  steps < now + 100ms   ┌────────────┐
//!  │ Sequencer  │───────────────────────▶│ AudioGraph │
//!  │ cursor/mode│   melody/bass/arp      │ (Tones)    │
//!  └────────────┘                        └────────────┘
//! ```

mod config;
mod notes;
mod patterns;
mod sequencer;
mod service;

pub use config::*;
pub use notes::*;
pub use patterns::*;
pub use sequencer::*;
pub use service::*;
