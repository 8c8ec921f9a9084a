//! # Starfall Effects
//!
//! Specialized pooling for the short-lived combat effects the
//! simulation churns every frame: projectile variants, trail segments,
//! muzzle flashes, tracer lines, impact bursts.
//!
//! The [`EffectPools`] façade composes one
//! [`ObjectPool`](starfall_core::ObjectPool) per [`EffectKind`] behind
//! shared immutable [`EffectTemplate`]s, pre-warms every pool at
//! startup, and drives per-frame aging and reclaim. The rendering
//! collaborator is reduced to the two-operation [`SceneRoot`] contract.

#![deny(unsafe_code)]

mod config;
mod instance;
mod kind;
mod manager;
mod scene;
mod template;

pub use config::{ConfigError, EffectsConfig, PoolTuning};
pub use instance::{EffectHandle, EffectInstance};
pub use kind::EffectKind;
pub use manager::EffectPools;
pub use scene::{NullSceneRoot, SceneRoot};
pub use template::{EffectTemplate, TemplateSet};
