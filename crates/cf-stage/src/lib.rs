//! # cf-stage — ClawForge machine event feed
//!
//! Defines the semantic moments of a claw-machine session that the UI layer
//! and the audio layer react to:
//! - Drop rates announced → Spin starts → Slots cross the center → Settled → Reveal
//!
//! Events carry a host timestamp and are fanned out to any number of
//! subscribers through [`EventBus`].

pub mod bus;
pub mod event;
pub mod stage;
pub mod taxonomy;
pub mod trace;

pub use bus::*;
pub use event::*;
pub use stage::*;
pub use taxonomy::*;
pub use trace::*;
