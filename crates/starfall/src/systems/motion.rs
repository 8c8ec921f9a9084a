//! Linear motion integration.

use starfall_core::{System, SystemError, World};

/// Integrates each entity's [`Motion`](starfall_core::Motion) velocity
/// into its [`Transform`](starfall_core::Transform), simple linear
/// motion only.
#[derive(Debug, Default)]
pub struct MotionSystem;

impl System for MotionSystem {
    fn name(&self) -> &'static str {
        "motion"
    }

    fn update(&mut self, world: &mut World, dt: f32) -> Result<(), SystemError> {
        for entity in world.entities_mut() {
            let Some(motion) = entity.motion().copied() else {
                continue;
            };
            if let Some(transform) = entity.transform_mut() {
                transform.position[0] += motion.velocity[0] * dt;
                transform.position[1] += motion.velocity[1] * dt;
                transform.position[2] += motion.velocity[2] * dt;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use starfall_core::{Motion, Transform};

    #[test]
    fn integrates_velocity_into_position() {
        let mut world = World::new();
        let id = world.create_entity();
        {
            let entity = world.entity_mut(id).unwrap();
            entity.insert(Transform::at([0.0; 3]));
            entity.insert(Motion::new([2.0, 0.0, -4.0]));
        }
        world.register_system(Box::new(MotionSystem));
        world.update(0.5);

        let transform = *world.entity(id).unwrap().transform().unwrap();
        assert!((transform.position[0] - 1.0).abs() < 1e-6);
        assert!((transform.position[2] + 2.0).abs() < 1e-6);
    }

    #[test]
    fn entities_without_motion_are_untouched() {
        let mut world = World::new();
        let id = world.create_entity();
        world.entity_mut(id).unwrap().insert(Transform::at([7.0, 0.0, 0.0]));
        world.register_system(Box::new(MotionSystem));
        world.update(1.0);
        assert_eq!(world.entity(id).unwrap().transform().unwrap().position[0], 7.0);
    }
}
