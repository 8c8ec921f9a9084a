//! # ECS World
//!
//! The central container: entity table, tag index, message bus, and the
//! ordered system list. One logical thread drives `update(dt)` once per
//! tick; every mutation of entities, components, and tags happens on
//! that thread.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use tracing::{debug, warn};

use crate::error::LookupError;
use crate::events::{topics, MessageBus, Payload, PublishReport};

use super::entity::{Entity, EntityId};
use super::system::{System, SystemState};

struct SystemEntry {
    system: Box<dyn System>,
    state: SystemState,
    enabled: bool,
}

/// Owns entities, the message bus, and the ordered system list, and
/// drives the frame update.
///
/// # Fault isolation
///
/// A system that fails `initialize` or `update` is logged with its name
/// and skipped; the remaining systems still run. Initialization of one
/// subsystem never aborts the whole world.
pub struct World {
    entities: HashMap<EntityId, Entity>,
    tag_index: HashMap<String, HashSet<EntityId>>,
    bus: Rc<MessageBus>,
    systems: Vec<SystemEntry>,
    next_id: u64,
    initialized: bool,
}

impl World {
    /// Creates an empty world with its own message bus.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: HashMap::new(),
            tag_index: HashMap::new(),
            bus: Rc::new(MessageBus::new()),
            systems: Vec::new(),
            next_id: 1,
            initialized: false,
        }
    }

    // =========================================================================
    // Message bus
    // =========================================================================

    /// The world's message bus.
    #[must_use]
    pub fn bus(&self) -> &MessageBus {
        &self.bus
    }

    /// A shared handle to the bus, for handlers that publish from
    /// inside a dispatch or collaborators that outlive a borrow.
    #[must_use]
    pub fn bus_handle(&self) -> Rc<MessageBus> {
        Rc::clone(&self.bus)
    }

    /// Publishes on the world's bus.
    pub fn publish(&self, topic: &str, payload: Payload) -> PublishReport {
        self.bus.publish(topic, payload)
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Creates an entity with an auto-generated process-unique id.
    pub fn create_entity(&mut self) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        self.entities.insert(id, Entity::new(id));
        id
    }

    /// Creates an entity under an explicit id.
    ///
    /// # Errors
    ///
    /// [`LookupError::DuplicateEntity`] if the id is already live; the
    /// existing entity is untouched.
    pub fn create_entity_with_id(&mut self, id: EntityId) -> Result<EntityId, LookupError> {
        if self.entities.contains_key(&id) {
            return Err(LookupError::DuplicateEntity(id));
        }
        self.next_id = self.next_id.max(id.raw() + 1);
        self.entities.insert(id, Entity::new(id));
        Ok(id)
    }

    /// Destroys an entity: removes it from the entity table and from
    /// every tag bucket, then publishes `entity.destroyed` with a
    /// snapshot of the removed entity.
    ///
    /// An unknown id is a no-op returning `false`, not an error.
    pub fn destroy_entity(&mut self, id: EntityId) -> bool {
        let Some(entity) = self.entities.remove(&id) else {
            debug!(entity = %id, "destroy of unknown entity ignored");
            return false;
        };
        for tag in entity.tags() {
            if let Some(bucket) = self.tag_index.get_mut(tag) {
                bucket.remove(&id);
                if bucket.is_empty() {
                    self.tag_index.remove(tag);
                }
            }
        }
        let snapshot = entity.snapshot();
        self.bus
            .publish(topics::ENTITY_DESTROYED, Payload::EntityDestroyed(snapshot));
        true
    }

    /// Looks up an entity by id.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Looks up an entity by id, mutably.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Ids of all live entities, in no particular order. Systems that
    /// destroy entities while iterating take this snapshot first.
    #[must_use]
    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }

    /// Iterates mutably over all live entities.
    pub fn entities_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.values_mut()
    }

    // =========================================================================
    // Tags
    // =========================================================================

    /// Tags an entity, updating the tag index. Unknown id is a logged
    /// no-op returning `false`.
    pub fn add_tag(&mut self, id: EntityId, tag: &str) -> bool {
        let Some(entity) = self.entities.get_mut(&id) else {
            debug!(entity = %id, tag, "add_tag on unknown entity ignored");
            return false;
        };
        if entity.insert_tag(tag) {
            self.tag_index.entry(tag.to_string()).or_default().insert(id);
        }
        true
    }

    /// Removes a tag from an entity, updating the tag index. Unknown id
    /// or missing tag is a no-op returning `false`.
    pub fn remove_tag(&mut self, id: EntityId, tag: &str) -> bool {
        let Some(entity) = self.entities.get_mut(&id) else {
            debug!(entity = %id, tag, "remove_tag on unknown entity ignored");
            return false;
        };
        if !entity.take_tag(tag) {
            return false;
        }
        if let Some(bucket) = self.tag_index.get_mut(tag) {
            bucket.remove(&id);
            if bucket.is_empty() {
                self.tag_index.remove(tag);
            }
        }
        true
    }

    /// All entities carrying `tag`, in no guaranteed order.
    #[must_use]
    pub fn entities_by_tag(&self, tag: &str) -> Vec<&Entity> {
        self.tag_index
            .get(tag)
            .map(|bucket| bucket.iter().filter_map(|id| self.entities.get(id)).collect())
            .unwrap_or_default()
    }

    /// Ids of all entities carrying `tag`.
    #[must_use]
    pub fn ids_by_tag(&self, tag: &str) -> Vec<EntityId> {
        self.tag_index
            .get(tag)
            .map(|bucket| bucket.iter().copied().collect())
            .unwrap_or_default()
    }

    // =========================================================================
    // Systems
    // =========================================================================

    /// Appends a system to the ordered list. If the world is already
    /// initialized, the system's `initialize` hook runs immediately;
    /// otherwise it is deferred to [`World::initialize`].
    pub fn register_system(&mut self, mut system: Box<dyn System>) {
        let mut state = SystemState::Pending;
        if self.initialized {
            state = match system.initialize(self) {
                Ok(()) => SystemState::Ready,
                Err(err) => {
                    warn!(system = system.name(), error = %err, "system failed to initialize");
                    SystemState::Failed
                }
            };
        }
        self.systems.push(SystemEntry {
            system,
            state,
            enabled: true,
        });
    }

    /// Runs `initialize` on every pending system, in registration
    /// order. A failing system is logged and marked failed; the rest
    /// still initialize.
    pub fn initialize(&mut self) {
        let mut entries = std::mem::take(&mut self.systems);
        for entry in &mut entries {
            if entry.state != SystemState::Pending {
                continue;
            }
            entry.state = match entry.system.initialize(self) {
                Ok(()) => SystemState::Ready,
                Err(err) => {
                    warn!(system = entry.system.name(), error = %err, "system failed to initialize");
                    SystemState::Failed
                }
            };
        }
        // Systems registered by an initialize hook land in self.systems;
        // keep them after the original ones.
        entries.append(&mut self.systems);
        self.systems = entries;
        self.initialized = true;
    }

    /// Runs one tick: for each enabled, ready system in registration
    /// order, calls `update(dt)`. A failing system is logged and the
    /// frame continues with the remaining systems. Disabled systems are
    /// skipped entirely.
    ///
    /// The first update initializes any still-pending systems.
    pub fn update(&mut self, dt: f32) {
        if !self.initialized {
            self.initialize();
        }
        let mut entries = std::mem::take(&mut self.systems);
        for entry in &mut entries {
            if !entry.enabled || entry.state != SystemState::Ready {
                continue;
            }
            if let Err(err) = entry.system.update(self, dt) {
                warn!(system = entry.system.name(), error = %err, "system update failed; frame continues");
            }
        }
        entries.append(&mut self.systems);
        self.systems = entries;
    }

    /// Enables or disables a system by name. Returns `false` if no
    /// system has that name.
    pub fn set_system_enabled(&mut self, name: &str, enabled: bool) -> bool {
        for entry in &mut self.systems {
            if entry.system.name() == name {
                entry.enabled = enabled;
                return true;
            }
        }
        false
    }

    /// The lifecycle state of a system, by name.
    #[must_use]
    pub fn system_state(&self, name: &str) -> Option<SystemState> {
        self.systems
            .iter()
            .find(|entry| entry.system.name() == name)
            .map(|entry| entry.state)
    }

    /// Number of registered systems.
    #[must_use]
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("entities", &self.entities.len())
            .field("tags", &self.tag_index.len())
            .field("systems", &self.systems.len())
            .field("initialized", &self.initialized)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{Health, Transform};
    use crate::error::SystemError;
    use std::cell::RefCell;

    #[test]
    fn create_and_lookup() {
        let mut world = World::new();
        let id = world.create_entity();
        assert!(world.entity(id).is_some());
        assert_eq!(world.entity_count(), 1);

        let other = world.create_entity();
        assert_ne!(id, other);
    }

    #[test]
    fn explicit_id_collision_is_rejected() {
        let mut world = World::new();
        let id = world.create_entity_with_id(EntityId::new(40)).unwrap();
        assert_eq!(
            world.create_entity_with_id(id),
            Err(LookupError::DuplicateEntity(id))
        );
        // Auto ids keep clear of explicit ones.
        let auto = world.create_entity();
        assert!(auto.raw() > 40);
    }

    #[test]
    fn destroy_removes_from_table_and_tag_buckets() {
        let mut world = World::new();
        let id = world.create_entity();
        world.add_tag(id, "projectile");
        world.add_tag(id, "laser");

        assert!(world.destroy_entity(id));
        assert!(world.entity(id).is_none());
        assert!(world.entities_by_tag("projectile").is_empty());
        assert!(world.entities_by_tag("laser").is_empty());

        // Second destroy: no-op, not an error.
        assert!(!world.destroy_entity(id));
    }

    #[test]
    fn destroy_publishes_snapshot() {
        let mut world = World::new();
        let seen = std::rc::Rc::new(RefCell::new(Vec::new()));
        let sink = std::rc::Rc::clone(&seen);
        world.bus().subscribe(topics::ENTITY_DESTROYED, move |msg| {
            if let Payload::EntityDestroyed(snapshot) = &msg.payload {
                sink.borrow_mut().push(snapshot.clone());
            }
            Ok(())
        });

        let id = world.create_entity();
        world.add_tag(id, "ship");
        world.entity_mut(id).unwrap().insert(Health::full(50.0));
        world.destroy_entity(id);

        let snapshots = seen.borrow();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].id, id);
        assert_eq!(snapshots[0].tags, vec!["ship"]);
    }

    #[test]
    fn tag_index_stays_consistent() {
        let mut world = World::new();
        let a = world.create_entity();
        let b = world.create_entity();
        world.add_tag(a, "enemy");
        world.add_tag(b, "enemy");
        assert_eq!(world.entities_by_tag("enemy").len(), 2);

        world.remove_tag(a, "enemy");
        assert!(!world.entity(a).unwrap().has_tag("enemy"));
        assert_eq!(world.ids_by_tag("enemy"), vec![b]);

        // Unknown entity and missing tag are no-ops.
        assert!(!world.add_tag(EntityId::new(999), "enemy"));
        assert!(!world.remove_tag(a, "enemy"));
    }

    struct Recorder {
        name: &'static str,
        log: std::rc::Rc<RefCell<Vec<&'static str>>>,
        fail_update: bool,
    }

    impl System for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        fn update(&mut self, _world: &mut World, _dt: f32) -> Result<(), SystemError> {
            if self.fail_update {
                return Err(SystemError::new("intentional fault"));
            }
            self.log.borrow_mut().push(self.name);
            Ok(())
        }
    }

    #[test]
    fn systems_update_in_registration_order_with_fault_isolation() {
        let mut world = World::new();
        let log = std::rc::Rc::new(RefCell::new(Vec::new()));
        for (name, fail) in [("a", false), ("b", true), ("c", false)] {
            world.register_system(Box::new(Recorder {
                name,
                log: std::rc::Rc::clone(&log),
                fail_update: fail,
            }));
        }
        world.initialize();
        world.update(0.016);
        assert_eq!(*log.borrow(), vec!["a", "c"]);
    }

    #[test]
    fn disabled_systems_are_skipped() {
        let mut world = World::new();
        let log = std::rc::Rc::new(RefCell::new(Vec::new()));
        for name in ["a", "b"] {
            world.register_system(Box::new(Recorder {
                name,
                log: std::rc::Rc::clone(&log),
                fail_update: false,
            }));
        }
        world.initialize();
        assert!(world.set_system_enabled("a", false));
        assert!(!world.set_system_enabled("missing", false));
        world.update(0.016);
        assert_eq!(*log.borrow(), vec!["b"]);

        world.set_system_enabled("a", true);
        world.update(0.016);
        assert_eq!(*log.borrow(), vec!["b", "a", "b"]);
    }

    struct FailingInit;

    impl System for FailingInit {
        fn name(&self) -> &'static str {
            "failing_init"
        }

        fn initialize(&mut self, _world: &mut World) -> Result<(), SystemError> {
            Err(SystemError::new("missing table"))
        }

        fn update(&mut self, _world: &mut World, _dt: f32) -> Result<(), SystemError> {
            panic!("must never update");
        }
    }

    #[test]
    fn failed_initialize_isolates_the_system() {
        let mut world = World::new();
        let log = std::rc::Rc::new(RefCell::new(Vec::new()));
        world.register_system(Box::new(FailingInit));
        world.register_system(Box::new(Recorder {
            name: "healthy",
            log: std::rc::Rc::clone(&log),
            fail_update: false,
        }));
        world.initialize();

        assert_eq!(world.system_state("failing_init"), Some(SystemState::Failed));
        assert_eq!(world.system_state("healthy"), Some(SystemState::Ready));

        world.update(0.016);
        assert_eq!(*log.borrow(), vec!["healthy"]);
    }

    #[test]
    fn registering_after_initialize_runs_hook_immediately() {
        let mut world = World::new();
        world.initialize();
        let log = std::rc::Rc::new(RefCell::new(Vec::new()));
        world.register_system(Box::new(Recorder {
            name: "late",
            log: std::rc::Rc::clone(&log),
            fail_update: false,
        }));
        assert_eq!(world.system_state("late"), Some(SystemState::Ready));
        world.update(0.016);
        assert_eq!(*log.borrow(), vec!["late"]);
    }

    #[test]
    fn systems_can_mutate_entities_through_the_world() {
        struct Mover;
        impl System for Mover {
            fn name(&self) -> &'static str {
                "mover"
            }
            fn update(&mut self, world: &mut World, dt: f32) -> Result<(), SystemError> {
                for entity in world.entities_mut() {
                    if let Some(transform) = entity.transform_mut() {
                        transform.position[0] += dt;
                    }
                }
                Ok(())
            }
        }

        let mut world = World::new();
        let id = world.create_entity();
        world.entity_mut(id).unwrap().insert(Transform::at([0.0; 3]));
        world.register_system(Box::new(Mover));
        world.initialize();
        world.update(0.5);
        assert!((world.entity(id).unwrap().transform().unwrap().position[0] - 0.5).abs() < 1e-6);
    }
}
