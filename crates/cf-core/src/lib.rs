//! cf-core: Shared types for ClawForge
//!
//! Prize items, injectable randomness and the common error type used by
//! every other ClawForge crate.

mod error;
mod prize;
mod random;

pub use error::*;
pub use prize::*;
pub use random::*;
