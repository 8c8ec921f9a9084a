//! Concrete gameplay systems.
//!
//! Each implements the [`System`](starfall_core::System) contract and
//! is registered into the world in the order it should run: motion
//! before combat, expiry last.

mod combat;
mod expiry;
mod motion;

pub use combat::CombatSystem;
pub use expiry::ExpirySystem;
pub use motion::MotionSystem;

/// Tag identifying entities that carry a weapon and fire each frame.
pub const SHIP_TAG: &str = "ship";
