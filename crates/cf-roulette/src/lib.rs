//! # cf-roulette — Claw-machine roulette core
//!
//! Decides the outcome of a spin up front and plays it out as a single
//! eased scroll.
//!
//! ## Architecture
//!
//! ```text
//! PrizePool ──▶ TierTable::partition ──▶ Tiers
//!                                          │
//!                                          v
//!                         select_winner (tier roll, then item roll)
//!                                          │
//!                                          v
//!                     build_strip (filler + winner at fixed slot)
//!                                          │
//!                                          v
//!              AnimationClock::tick(now) ──▶ CenterCrossed / Settled
//! ```
//!
//! Nothing in here touches audio or rendering; the host drives the clock
//! from its frame callback and forwards the emitted events.

pub mod clock;
pub mod curve;
pub mod selector;
pub mod strip;
pub mod tiers;
pub mod timing;

pub use clock::*;
pub use curve::*;
pub use selector::*;
pub use strip::*;
pub use tiers::*;
pub use timing::*;
