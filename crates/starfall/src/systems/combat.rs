//! Weapon cooldowns and projectile spawning.

use std::cell::RefCell;
use std::rc::Rc;

use starfall_core::{topics, Payload, System, SystemError, World};
use starfall_effects::{EffectKind, EffectPools};

use super::SHIP_TAG;

/// Trail segments attached to each missile.
const MISSILE_TRAIL_SEGMENTS: usize = 4;

/// Fires the weapon of every ship whose cooldown has elapsed.
///
/// Firing spawns a pooled projectile (plus a muzzle flash, plus trail
/// segments for missiles), seeds its position and velocity from the
/// shooter's transform, and publishes `projectile.fired` for audio/UI
/// collaborators.
pub struct CombatSystem {
    effects: Rc<RefCell<EffectPools>>,
    projectile_kind: EffectKind,
    projectile_speed: f32,
}

impl CombatSystem {
    /// Creates a combat system firing projectiles of `kind`.
    #[must_use]
    pub fn new(effects: Rc<RefCell<EffectPools>>, projectile_kind: EffectKind) -> Self {
        Self {
            effects,
            projectile_kind,
            projectile_speed: 40.0,
        }
    }

    /// Overrides the projectile speed in world units per second.
    #[must_use]
    pub const fn with_speed(mut self, speed: f32) -> Self {
        self.projectile_speed = speed;
        self
    }
}

impl System for CombatSystem {
    fn name(&self) -> &'static str {
        "combat"
    }

    fn update(&mut self, world: &mut World, dt: f32) -> Result<(), SystemError> {
        // Ships firing this frame may be destroyed mid-iteration by a
        // handler; work from an id snapshot.
        for id in world.ids_by_tag(SHIP_TAG) {
            let Some(entity) = world.entity_mut(id) else {
                continue;
            };
            let Some(origin) = entity.transform().map(|t| t.position) else {
                continue;
            };
            let Some(weapon) = entity.weapon_mut() else {
                continue;
            };
            weapon.remaining_secs = (weapon.remaining_secs - dt).max(0.0);
            if !weapon.ready() {
                continue;
            }
            weapon.remaining_secs = weapon.cooldown_secs;

            let direction = [0.0, 0.0, 1.0];
            {
                let mut effects = self.effects.borrow_mut();
                let projectile = effects.spawn(self.projectile_kind);
                if let Some(instance) = effects.instance_mut(projectile) {
                    instance.position = origin;
                    instance.velocity = [
                        direction[0] * self.projectile_speed,
                        direction[1] * self.projectile_speed,
                        direction[2] * self.projectile_speed,
                    ];
                }
                if self.projectile_kind == EffectKind::Missile {
                    effects.attach_trail(projectile, MISSILE_TRAIL_SEGMENTS);
                }
                let flash = effects.spawn(EffectKind::MuzzleFlash);
                if let Some(instance) = effects.instance_mut(flash) {
                    instance.position = origin;
                }
            }

            world.publish(
                topics::PROJECTILE_FIRED,
                Payload::ProjectileFired {
                    shooter: id,
                    kind: self.projectile_kind.as_str().to_string(),
                    origin,
                    direction,
                },
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use starfall_core::{Transform, Weapon};
    use starfall_effects::{EffectsConfig, NullSceneRoot, TemplateSet};

    fn shared_pools() -> Rc<RefCell<EffectPools>> {
        let config = EffectsConfig::default();
        let templates = TemplateSet::build(&config);
        Rc::new(RefCell::new(EffectPools::new(
            &config,
            templates,
            Box::new(NullSceneRoot),
        )))
    }

    fn ship(world: &mut World, cooldown: f32) -> starfall_core::EntityId {
        let id = world.create_entity();
        world.add_tag(id, SHIP_TAG);
        let entity = world.entity_mut(id).unwrap();
        entity.insert(Transform::at([0.0, 0.0, 0.0]));
        entity.insert(Weapon::with_cooldown(cooldown));
        id
    }

    #[test]
    fn ready_weapon_fires_and_enters_cooldown() {
        let mut world = World::new();
        let effects = shared_pools();
        ship(&mut world, 1.0);
        world.register_system(Box::new(CombatSystem::new(
            Rc::clone(&effects),
            EffectKind::Laser,
        )));

        world.update(0.016);
        {
            let pools = effects.borrow();
            assert_eq!(pools.active_count(EffectKind::Laser), 1);
            assert_eq!(pools.active_count(EffectKind::MuzzleFlash), 1);
        }

        // Cooldown holds fire on the next tick.
        world.update(0.016);
        assert_eq!(effects.borrow().active_count(EffectKind::Laser), 1);
    }

    #[test]
    fn missiles_get_trails() {
        let mut world = World::new();
        let effects = shared_pools();
        ship(&mut world, 10.0);
        world.register_system(Box::new(CombatSystem::new(
            Rc::clone(&effects),
            EffectKind::Missile,
        )));

        world.update(0.016);
        let pools = effects.borrow();
        assert_eq!(pools.active_count(EffectKind::Missile), 1);
        assert_eq!(pools.active_count(EffectKind::Trail), MISSILE_TRAIL_SEGMENTS);
    }

    #[test]
    fn fired_projectile_carries_shooter_velocity() {
        let mut world = World::new();
        let effects = shared_pools();
        ship(&mut world, 10.0);
        world.register_system(Box::new(
            CombatSystem::new(Rc::clone(&effects), EffectKind::Bullet).with_speed(10.0),
        ));

        world.update(0.016);
        let pools = effects.borrow();
        let handles = pools.active_handles(EffectKind::Bullet);
        assert_eq!(handles.len(), 1);
        let instance = pools.instance(handles[0]).unwrap();
        assert_eq!(instance.velocity, [0.0, 0.0, 10.0]);
        assert_eq!(instance.position, [0.0, 0.0, 0.0]);
    }
}
