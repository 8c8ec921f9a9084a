//! Entity/component/system runtime.
//!
//! Entities are identity plus tags plus a closed set of typed
//! components. The [`World`] owns the entity table, the tag index, the
//! message bus, and an ordered list of [`System`]s, and drives the frame
//! update with per-system fault isolation.

mod component;
mod entity;
mod system;
mod world;

pub use component::{Component, ComponentKind, Expiry, Health, Motion, Transform, Weapon};
pub use entity::{Entity, EntityId, EntitySnapshot};
pub use system::{System, SystemState};
pub use world::World;
