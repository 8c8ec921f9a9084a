//! Lifetime-bound entity cleanup.

use starfall_core::{System, SystemError, World};

/// Ages every entity carrying an [`Expiry`](starfall_core::Expiry)
/// component and destroys the ones whose lifetime has elapsed.
///
/// Runs last so an entity spawned and expired in the same frame still
/// gets one full update from the earlier systems. Destruction goes
/// through [`World::destroy_entity`], so `entity.destroyed` is
/// published with the entity's final snapshot.
#[derive(Debug, Default)]
pub struct ExpirySystem;

impl System for ExpirySystem {
    fn name(&self) -> &'static str {
        "expiry"
    }

    fn update(&mut self, world: &mut World, dt: f32) -> Result<(), SystemError> {
        let mut elapsed = Vec::new();
        for entity in world.entities_mut() {
            let id = entity.id();
            if let Some(expiry) = entity.expiry_mut() {
                expiry.age_secs += dt;
                if expiry.elapsed() {
                    elapsed.push(id);
                }
            }
        }
        for id in elapsed {
            world.destroy_entity(id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use starfall_core::{topics, Expiry, Payload};

    #[test]
    fn destroys_entities_past_their_lifetime() {
        let mut world = World::new();
        let short = world.create_entity();
        world.entity_mut(short).unwrap().insert(Expiry::after(0.5));
        let long = world.create_entity();
        world.entity_mut(long).unwrap().insert(Expiry::after(10.0));
        world.register_system(Box::new(ExpirySystem));

        world.update(0.3);
        assert_eq!(world.entity_count(), 2);

        world.update(0.3);
        assert!(world.entity(short).is_none());
        assert!(world.entity(long).is_some());
    }

    #[test]
    fn expiry_destruction_publishes_a_snapshot() {
        let mut world = World::new();
        let id = world.create_entity();
        world.add_tag(id, "debris");
        world.entity_mut(id).unwrap().insert(Expiry::after(0.1));
        world.register_system(Box::new(ExpirySystem));

        let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let sink = std::rc::Rc::clone(&seen);
        world.bus().subscribe(topics::ENTITY_DESTROYED, move |message| {
            if let Payload::EntityDestroyed(snapshot) = &message.payload {
                sink.borrow_mut().push(snapshot.clone());
            }
            Ok(())
        });

        world.update(0.2);
        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].id, id);
        assert_eq!(seen[0].tags, vec!["debris".to_string()]);
    }

    #[test]
    fn entities_without_expiry_live_forever() {
        let mut world = World::new();
        let id = world.create_entity();
        world.register_system(Box::new(ExpirySystem));
        for _ in 0..100 {
            world.update(1.0);
        }
        assert!(world.entity(id).is_some());
    }
}
