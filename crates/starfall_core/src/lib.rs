//! # Starfall Core
//!
//! ECS runtime and pooling primitives for a frame-driven combat
//! simulation. Short-lived visual objects (projectiles, bursts, trails)
//! are churned every frame; everything here exists to create, look up,
//! update, and reclaim them without allocation spikes.
//!
//! ## Architecture rules
//!
//! 1. **Single-threaded** - one logical thread drives `World::update(dt)`
//!    per tick; no locks, no async.
//! 2. **Faults are contained** - a failing system or message handler is
//!    logged and skipped, never fatal to the frame.
//! 3. **Pools never shrink** - capacity only grows; reclaim is an
//!    idempotent no-op on stale handles.

#![deny(unsafe_code)]

pub mod ecs;
pub mod error;
pub mod events;
pub mod memory;

pub use ecs::{
    Component, ComponentKind, Entity, EntityId, EntitySnapshot, Expiry, Health, Motion, System,
    SystemState, Transform, Weapon, World,
};
pub use error::{HandlerError, LifecycleError, LookupError, SystemError};
pub use events::{topics, Message, MessageBus, Payload, PublishReport, Subscription};
pub use memory::{ObjectPool, PoolHandle};
