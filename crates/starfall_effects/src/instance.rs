//! Pooled effect instances and their handles.

use starfall_core::PoolHandle;

use crate::kind::EffectKind;
use crate::template::EffectTemplate;

/// Handle to a live pooled effect: the kind selects the sub-pool, the
/// inner handle the slot. Copyable; stale after release.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EffectHandle {
    /// Kind discriminator, used to infer the owning pool on release.
    pub kind: EffectKind,
    /// Slot handle inside that kind's pool.
    pub slot: PoolHandle,
}

/// A reusable visual/combat object.
///
/// The transform fields are what the rendering collaborator samples
/// each frame; it writes nothing back except through
/// [`EffectPools::instance_mut`](crate::EffectPools::instance_mut) on
/// the update thread. Once released, ownership reverts fully to the
/// pool and no collaborator callback may touch the instance.
#[derive(Debug)]
pub struct EffectInstance {
    /// Kind discriminator.
    pub kind: EffectKind,
    /// World-space position.
    pub position: [f32; 3],
    /// Euler rotation in radians.
    pub rotation: [f32; 3],
    /// Uniform scale.
    pub scale: f32,
    /// Whether the renderer should draw this instance.
    pub visible: bool,
    /// Current color, seeded from the template on spawn.
    pub color: [f32; 4],
    /// Velocity applied by the manager's update, world units/second.
    pub velocity: [f32; 3],
    /// Seconds since spawn.
    pub age_secs: f32,
    /// Seconds until expiry.
    pub lifetime_secs: f32,
    /// Child pooled resources owned by this instance (a projectile's
    /// trail segments). Released exactly once, before the parent
    /// returns to its pool.
    pub children: Vec<EffectHandle>,
    /// Monotonic spawn counter, for logs.
    pub spawn_serial: u64,
}

impl EffectInstance {
    /// Creates a dormant instance for pool storage.
    #[must_use]
    pub fn dormant(kind: EffectKind) -> Self {
        Self {
            kind,
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: 1.0,
            visible: false,
            color: [1.0; 4],
            velocity: [0.0; 3],
            age_secs: 0.0,
            lifetime_secs: 0.0,
            children: Vec::new(),
            spawn_serial: 0,
        }
    }

    /// Progress through the configured lifetime, 0.0 at spawn and 1.0
    /// at expiry. A non-positive lifetime counts as already complete.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.lifetime_secs <= 0.0 {
            return 1.0;
        }
        (self.age_secs / self.lifetime_secs).min(1.0)
    }

    /// Whether the instance has reached the end of its lifetime.
    #[must_use]
    pub fn expired(&self) -> bool {
        self.progress() >= 1.0
    }

    /// Stamps template defaults at spawn time.
    pub(crate) fn activate(&mut self, template: &EffectTemplate, serial: u64) {
        self.color = template.color;
        self.scale = template.size;
        self.lifetime_secs = template.lifetime_secs;
        self.age_secs = 0.0;
        self.visible = true;
        self.spawn_serial = serial;
    }

    /// Restores default state on release. Children are expected to be
    /// drained by the manager before this runs.
    pub(crate) fn deactivate(&mut self) {
        self.position = [0.0; 3];
        self.rotation = [0.0; 3];
        self.velocity = [0.0; 3];
        self.visible = false;
        self.age_secs = 0.0;
        self.lifetime_secs = 0.0;
        self.children.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_clamped() {
        let mut instance = EffectInstance::dormant(EffectKind::Laser);
        instance.lifetime_secs = 2.0;
        instance.age_secs = 1.0;
        assert!((instance.progress() - 0.5).abs() < f32::EPSILON);
        instance.age_secs = 5.0;
        assert!((instance.progress() - 1.0).abs() < f32::EPSILON);
        assert!(instance.expired());
    }

    #[test]
    fn zero_lifetime_counts_as_complete() {
        let instance = EffectInstance::dormant(EffectKind::Trail);
        assert!(instance.expired());
    }
}
