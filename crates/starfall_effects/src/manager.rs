//! # Effect Pool Manager
//!
//! Composes one object pool per effect kind behind a single façade.
//! Owns the scene attachment lifecycle, drives per-frame aging and
//! reclaim, and pre-warms every pool once at startup so first real use
//! pays no allocation spike.
//!
//! Runs after `World::update(dt)` each frame, on the same thread.

use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use starfall_core::{topics, MessageBus, ObjectPool, Payload};

use crate::config::EffectsConfig;
use crate::instance::{EffectHandle, EffectInstance};
use crate::kind::EffectKind;
use crate::scene::SceneRoot;
use crate::template::TemplateSet;

/// Synthetic tick used by the pre-warm cycle.
const PREWARM_TICK_SECS: f32 = 1.0 / 60.0;

/// Façade over the per-kind effect pools.
///
/// All methods tolerate malformed input: a stale or foreign handle is
/// logged and ignored, an unknown kind string falls back to the default
/// kind. Nothing here panics on a bad handle.
pub struct EffectPools {
    pools: [ObjectPool<EffectInstance>; EffectKind::COUNT],
    templates: Arc<TemplateSet>,
    scene: Box<dyn SceneRoot>,
    bus: Option<Rc<MessageBus>>,
    spawn_serial: u64,
    prewarmed: bool,
    expired_scratch: Vec<EffectHandle>,
}

impl EffectPools {
    /// Creates the per-kind pools from tuning config, pre-built shared
    /// templates, and the rendering collaborator's scene root.
    #[must_use]
    pub fn new(
        config: &EffectsConfig,
        templates: Arc<TemplateSet>,
        scene: Box<dyn SceneRoot>,
    ) -> Self {
        let pools = EffectKind::ALL.map(|kind| {
            let tuning = config.tuning(kind);
            ObjectPool::new(tuning.initial_size, tuning.capacity_increment, move || {
                EffectInstance::dormant(kind)
            })
            .with_reset(EffectInstance::deactivate)
        });
        Self {
            pools,
            templates,
            scene,
            bus: None,
            spawn_serial: 0,
            prewarmed: false,
            expired_scratch: Vec::new(),
        }
    }

    /// Announces spawns and expiries on the bus (`effect.spawned`,
    /// `effect.expired`) for audio/UI collaborators. Without a bus the
    /// pools run silently.
    #[must_use]
    pub fn with_bus(mut self, bus: Rc<MessageBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Forces one synthetic use-cycle (acquire, attach, tick, release)
    /// per kind so the first real spawn hits warm pools and a warm
    /// scene path. One-time; later calls are no-ops.
    pub fn prewarm(&mut self) {
        if self.prewarmed {
            return;
        }
        let start = Instant::now();
        for kind in EffectKind::ALL {
            let handle = self.spawn(kind);
            if let Some(instance) = self.instance_mut(handle) {
                instance.age_secs += PREWARM_TICK_SECS;
            }
            self.release(handle);
        }
        self.prewarmed = true;
        info!(
            elapsed_us = start.elapsed().as_micros() as u64,
            "effect pools pre-warmed"
        );
    }

    /// Acquires an effect of the kind: stamps the template defaults,
    /// attaches it to the scene root, returns its handle. Never fails;
    /// the backing pool grows on demand.
    pub fn spawn(&mut self, kind: EffectKind) -> EffectHandle {
        let template = *self.templates.get(kind);
        self.spawn_serial += 1;
        let serial = self.spawn_serial;

        let slot = self.pools[kind.index()].acquire();
        if let Some(instance) = self.pools[kind.index()].get_mut(slot) {
            instance.activate(&template, serial);
        }
        if let Some(instance) = self.pools[kind.index()].get(slot) {
            self.scene.attach(instance);
        }
        if let Some(bus) = &self.bus {
            let position = self.pools[kind.index()]
                .get(slot)
                .map_or([0.0; 3], |i| i.position);
            bus.publish(
                topics::EFFECT_SPAWNED,
                Payload::EffectSpawned {
                    kind: kind.as_str().to_string(),
                    position,
                },
            );
        }
        EffectHandle { kind, slot }
    }

    /// Spawns by vocabulary string; unknown strings fall back to the
    /// default kind with a logged warning.
    pub fn spawn_str(&mut self, kind: &str) -> EffectHandle {
        self.spawn(EffectKind::parse_or_default(kind))
    }

    /// Spawns `count` trail segments owned by `parent`, placed at the
    /// parent's position. The parent releases them exactly once, with
    /// itself at the latest. Returns the number actually attached
    /// (zero when the parent handle is stale).
    pub fn attach_trail(&mut self, parent: EffectHandle, count: usize) -> usize {
        let Some(parent_position) = self.instance(parent).map(|i| i.position) else {
            debug!(
                kind = %parent.kind,
                slot = parent.slot.index(),
                "attach_trail on stale effect handle ignored"
            );
            return 0;
        };
        let mut segments = Vec::with_capacity(count);
        for _ in 0..count {
            let segment = self.spawn(EffectKind::Trail);
            if let Some(instance) = self.instance_mut(segment) {
                instance.position = parent_position;
            }
            segments.push(segment);
        }
        match self.instance_mut(parent) {
            Some(instance) => {
                instance.children.extend(segments);
                count
            }
            // Unreachable in the single-threaded model, but a stale
            // parent must not leak freshly spawned children.
            None => {
                for segment in segments {
                    self.release(segment);
                }
                0
            }
        }
    }

    /// Looks up a live effect.
    #[must_use]
    pub fn instance(&self, handle: EffectHandle) -> Option<&EffectInstance> {
        self.pools[handle.kind.index()].get(handle.slot)
    }

    /// Looks up a live effect, mutably. Systems use this to position
    /// effects; the renderer samples the same fields read-only.
    pub fn instance_mut(&mut self, handle: EffectHandle) -> Option<&mut EffectInstance> {
        self.pools[handle.kind.index()].get_mut(handle.slot)
    }

    /// Releases an effect back to its kind's pool, detaching it from
    /// the scene root and recursively releasing any child resources it
    /// owns, each exactly once.
    ///
    /// Idempotent: a second release of the same handle, or a handle the
    /// pools never issued, is a logged no-op returning `false`. Early
    /// release before natural expiry is always valid and leaves the
    /// same end state as waiting for expiry.
    pub fn release(&mut self, handle: EffectHandle) -> bool {
        let Some(instance) = self.pools[handle.kind.index()].get_mut(handle.slot) else {
            debug!(
                kind = %handle.kind,
                slot = handle.slot.index(),
                "release of stale effect handle ignored"
            );
            return false;
        };
        let children = std::mem::take(&mut instance.children);
        for child in children {
            self.release(child);
        }
        if let Some(instance) = self.pools[handle.kind.index()].get(handle.slot) {
            self.scene.detach(instance);
        }
        let released = self.pools[handle.kind.index()].release(handle.slot);
        if released {
            if let Some(bus) = &self.bus {
                bus.publish(
                    topics::EFFECT_EXPIRED,
                    Payload::EffectExpired {
                        kind: handle.kind.as_str().to_string(),
                    },
                );
            }
        }
        released
    }

    /// Advances every active effect and synchronously reclaims the ones
    /// whose progress reached 1.0. This is the sole expiry mechanism;
    /// there is no timer or async cancellation channel.
    pub fn update(&mut self, dt: f32) {
        let mut expired = std::mem::take(&mut self.expired_scratch);
        for kind in EffectKind::ALL {
            for (slot, instance) in self.pools[kind.index()].iter_active_mut() {
                instance.age_secs += dt;
                instance.position[0] += instance.velocity[0] * dt;
                instance.position[1] += instance.velocity[1] * dt;
                instance.position[2] += instance.velocity[2] * dt;
                if instance.expired() {
                    expired.push(EffectHandle { kind, slot });
                }
            }
        }
        for handle in expired.drain(..) {
            self.release(handle);
        }
        self.expired_scratch = expired;
    }

    /// Releases every active effect. Used on teardown before disposal.
    pub fn release_all(&mut self) {
        for kind in EffectKind::ALL {
            for handle in self.active_handles(kind) {
                self.release(handle);
            }
        }
    }

    /// Handles of every active effect of one kind, for collaborators
    /// that walk the live set (renderer sampling, diagnostics).
    #[must_use]
    pub fn active_handles(&self, kind: EffectKind) -> Vec<EffectHandle> {
        self.pools[kind.index()]
            .iter_active()
            .map(|(slot, _)| EffectHandle { kind, slot })
            .collect()
    }

    /// Active effects of one kind.
    #[must_use]
    pub fn active_count(&self, kind: EffectKind) -> usize {
        self.pools[kind.index()].active_count()
    }

    /// Free effects of one kind.
    #[must_use]
    pub fn available_count(&self, kind: EffectKind) -> usize {
        self.pools[kind.index()].available_count()
    }

    /// Active effects across all kinds.
    #[must_use]
    pub fn total_active(&self) -> usize {
        self.pools.iter().map(ObjectPool::active_count).sum()
    }

    /// Free effects across all kinds.
    #[must_use]
    pub fn total_available(&self) -> usize {
        self.pools.iter().map(ObjectPool::available_count).sum()
    }
}

impl std::fmt::Debug for EffectPools {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectPools")
            .field("active", &self.total_active())
            .field("available", &self.total_available())
            .field("prewarmed", &self.prewarmed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::NullSceneRoot;

    fn pools() -> EffectPools {
        let config = EffectsConfig::default();
        let templates = TemplateSet::build(&config);
        EffectPools::new(&config, templates, Box::new(NullSceneRoot))
    }

    #[test]
    fn spawn_stamps_template_defaults() {
        let mut pools = pools();
        let handle = pools.spawn(EffectKind::Explosion);
        let instance = pools.instance(handle).unwrap();
        assert_eq!(instance.kind, EffectKind::Explosion);
        assert!(instance.visible);
        assert!(instance.lifetime_secs > 0.0);
        assert_eq!(instance.age_secs, 0.0);
    }

    #[test]
    fn spawn_str_falls_back_on_unknown_kind() {
        let mut pools = pools();
        let handle = pools.spawn_str("gravityWell");
        assert_eq!(handle.kind, EffectKind::DEFAULT);
        let known = pools.spawn_str("plasma");
        assert_eq!(known.kind, EffectKind::Plasma);
    }

    #[test]
    fn release_is_idempotent_and_kind_inferring() {
        let mut pools = pools();
        let handle = pools.spawn(EffectKind::Laser);
        assert_eq!(pools.active_count(EffectKind::Laser), 1);
        assert!(pools.release(handle));
        assert_eq!(pools.active_count(EffectKind::Laser), 0);
        assert!(!pools.release(handle));
        assert_eq!(pools.active_count(EffectKind::Laser), 0);
    }

    #[test]
    fn update_reclaims_expired_effects() {
        let mut pools = pools();
        let handle = pools.spawn(EffectKind::MuzzleFlash);
        let lifetime = pools.instance(handle).unwrap().lifetime_secs;
        pools.update(lifetime + 0.001);
        assert!(pools.instance(handle).is_none());
        assert_eq!(pools.active_count(EffectKind::MuzzleFlash), 0);
    }

    #[test]
    fn update_moves_effects_linearly() {
        let mut pools = pools();
        let handle = pools.spawn(EffectKind::Bullet);
        pools.instance_mut(handle).unwrap().velocity = [10.0, 0.0, 0.0];
        pools.update(0.1);
        let instance = pools.instance(handle).unwrap();
        assert!((instance.position[0] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn prewarm_leaves_pools_idle_and_is_one_time() {
        let mut pools = pools();
        let capacity_before = pools.total_available();
        pools.prewarm();
        assert_eq!(pools.total_active(), 0);
        assert_eq!(pools.total_available(), capacity_before);
        pools.prewarm();
        assert_eq!(pools.total_active(), 0);
    }

    #[test]
    fn bus_hears_spawns_and_expiries() {
        let bus = Rc::new(MessageBus::new());
        let config = EffectsConfig::default();
        let templates = TemplateSet::build(&config);
        let mut pools = EffectPools::new(&config, templates, Box::new(NullSceneRoot))
            .with_bus(Rc::clone(&bus));

        let heard = Rc::new(std::cell::RefCell::new(Vec::new()));
        for topic in [topics::EFFECT_SPAWNED, topics::EFFECT_EXPIRED] {
            let sink = Rc::clone(&heard);
            bus.subscribe(topic, move |message| {
                sink.borrow_mut().push(message.topic.clone());
                Ok(())
            });
        }

        let handle = pools.spawn(EffectKind::Laser);
        assert!(pools.release(handle));
        // Double release must not produce a second expiry.
        assert!(!pools.release(handle));
        assert_eq!(
            *heard.borrow(),
            vec![topics::EFFECT_SPAWNED.to_string(), topics::EFFECT_EXPIRED.to_string()]
        );
    }

    #[test]
    fn release_all_reclaims_everything() {
        let mut pools = pools();
        for _ in 0..5 {
            pools.spawn(EffectKind::Tracer);
        }
        let missile = pools.spawn(EffectKind::Missile);
        pools.attach_trail(missile, 3);
        assert!(pools.total_active() > 0);
        pools.release_all();
        assert_eq!(pools.total_active(), 0);
    }
}
