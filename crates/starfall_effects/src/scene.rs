//! The rendering collaborator's contract.
//!
//! The core calls exactly two operations on the renderer: attach an
//! effect to the active scene root on spawn, detach it on release.
//! Everything else the renderer needs it samples from the instance's
//! transform fields each frame.

use crate::instance::EffectInstance;

/// Narrow attach/detach seam to the out-of-scope rendering pipeline.
pub trait SceneRoot {
    /// Called when a pooled effect goes live.
    fn attach(&mut self, instance: &EffectInstance);

    /// Called when a pooled effect is reclaimed. After this returns,
    /// ownership reverts fully to the pool; no renderer callback may
    /// touch the instance again.
    fn detach(&mut self, instance: &EffectInstance);
}

/// Scene root that renders nothing. Used by headless hosts and tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSceneRoot;

impl SceneRoot for NullSceneRoot {
    fn attach(&mut self, _instance: &EffectInstance) {}

    fn detach(&mut self, _instance: &EffectInstance) {}
}
