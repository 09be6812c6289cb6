//! cf-machine: The claw machine
//!
//! Ties the roulette, audio and music crates into one session:
//!
//! ```text
//! request_spin ─▶ Selector ─▶ Strip ─▶ AnimationClock
//!                                          │ on_frame(now)
//!                          ┌───────────────┼──────────────┐
//!                          ▼               ▼              ▼
//!                    CenterCrossed      Settled       RevealReady
//!                     tick SFX       chime, music     reveal panel
//!                                      → idle
//! ```
//!
//! Everything observable is published on the [`EventBus`](cf_stage::EventBus)
//! as a [`MachineEvent`](cf_stage::MachineEvent).

mod config;
mod machine;
mod prefetch;
mod reveal;
mod session;

pub use config::*;
pub use machine::*;
pub use prefetch::*;
pub use reveal::*;
pub use session::*;
