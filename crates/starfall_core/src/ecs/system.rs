//! # System Contract
//!
//! A system is a stateful unit that reads and writes components each
//! tick. Systems own no entities; they query the world and the tag
//! index. Faults are values: a failing `initialize` or `update` returns
//! a [`SystemError`] that the world logs and contains.

use crate::error::SystemError;

use super::world::World;

/// Lifecycle state of a registered system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SystemState {
    /// Registered, `initialize` not yet run.
    Pending,
    /// Initialized and eligible for updates.
    Ready,
    /// `initialize` failed; the system is skipped every tick.
    Failed,
}

/// Polymorphic update contract implemented by concrete systems
/// (combat, collision, motion, ...).
///
/// Registration order is execution order, every tick.
pub trait System {
    /// Stable name, used in scheduling controls and fault logs.
    fn name(&self) -> &'static str;

    /// One-time setup hook. Runs either at [`World::initialize`] or
    /// immediately on registration if the world is already initialized.
    fn initialize(&mut self, world: &mut World) -> Result<(), SystemError> {
        let _ = world;
        Ok(())
    }

    /// Per-tick update. `dt` is the host-supplied frame delta in
    /// seconds, already clamped by the host.
    fn update(&mut self, world: &mut World, dt: f32) -> Result<(), SystemError>;
}
