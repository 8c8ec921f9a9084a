//! # Entity Management
//!
//! An entity is an identity plus a set of string tags plus typed
//! components. Identity is an opaque process-unique token handed out by
//! the world; tags are mutated through the world so the tag index can
//! never drift from an entity's own tag set.

use std::collections::HashSet;
use std::fmt;

use super::component::{
    Component, ComponentKind, ComponentSet, Expiry, Health, Motion, Transform, Weapon,
};

/// Opaque, stable, process-unique entity identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Wraps a raw id value. Ids are normally world-assigned; explicit
    /// construction exists for hosts that persist ids across sessions.
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw id value, for logs and serialization.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An entity: identity, tags, and at most one component per kind.
#[derive(Clone, Debug)]
pub struct Entity {
    id: EntityId,
    tags: HashSet<String>,
    components: ComponentSet,
}

impl Entity {
    pub(crate) fn new(id: EntityId) -> Self {
        Self {
            id,
            tags: HashSet::new(),
            components: ComponentSet::default(),
        }
    }

    /// This entity's id.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Whether the entity carries the tag.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// The entity's tags, in no particular order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    // Tag writes go through the world so the tag index stays consistent.
    pub(crate) fn insert_tag(&mut self, tag: &str) -> bool {
        self.tags.insert(tag.to_string())
    }

    pub(crate) fn take_tag(&mut self, tag: &str) -> bool {
        self.tags.remove(tag)
    }

    /// Attaches a component, keyed by its kind. An existing component
    /// of the same kind is overwritten and returned (last write wins).
    pub fn insert(&mut self, component: impl Into<Component>) -> Option<Component> {
        self.components.insert(component.into())
    }

    /// Looks up a component by kind.
    #[must_use]
    pub fn get(&self, kind: ComponentKind) -> Option<&Component> {
        self.components.get(kind)
    }

    /// Looks up a component by kind, mutably.
    pub fn get_mut(&mut self, kind: ComponentKind) -> Option<&mut Component> {
        self.components.get_mut(kind)
    }

    /// Whether a component of the kind is attached.
    #[must_use]
    pub fn has(&self, kind: ComponentKind) -> bool {
        self.components.get(kind).is_some()
    }

    /// Detaches and returns the component of the kind, if attached.
    pub fn remove(&mut self, kind: ComponentKind) -> Option<Component> {
        self.components.remove(kind)
    }

    /// Typed accessor for [`Transform`].
    #[must_use]
    pub fn transform(&self) -> Option<&Transform> {
        match self.components.get(ComponentKind::Transform) {
            Some(Component::Transform(t)) => Some(t),
            _ => None,
        }
    }

    /// Typed mutable accessor for [`Transform`].
    pub fn transform_mut(&mut self) -> Option<&mut Transform> {
        match self.components.get_mut(ComponentKind::Transform) {
            Some(Component::Transform(t)) => Some(t),
            _ => None,
        }
    }

    /// Typed accessor for [`Motion`].
    #[must_use]
    pub fn motion(&self) -> Option<&Motion> {
        match self.components.get(ComponentKind::Motion) {
            Some(Component::Motion(m)) => Some(m),
            _ => None,
        }
    }

    /// Typed mutable accessor for [`Motion`].
    pub fn motion_mut(&mut self) -> Option<&mut Motion> {
        match self.components.get_mut(ComponentKind::Motion) {
            Some(Component::Motion(m)) => Some(m),
            _ => None,
        }
    }

    /// Typed accessor for [`Health`].
    #[must_use]
    pub fn health(&self) -> Option<&Health> {
        match self.components.get(ComponentKind::Health) {
            Some(Component::Health(h)) => Some(h),
            _ => None,
        }
    }

    /// Typed mutable accessor for [`Health`].
    pub fn health_mut(&mut self) -> Option<&mut Health> {
        match self.components.get_mut(ComponentKind::Health) {
            Some(Component::Health(h)) => Some(h),
            _ => None,
        }
    }

    /// Typed accessor for [`Weapon`].
    #[must_use]
    pub fn weapon(&self) -> Option<&Weapon> {
        match self.components.get(ComponentKind::Weapon) {
            Some(Component::Weapon(w)) => Some(w),
            _ => None,
        }
    }

    /// Typed mutable accessor for [`Weapon`].
    pub fn weapon_mut(&mut self) -> Option<&mut Weapon> {
        match self.components.get_mut(ComponentKind::Weapon) {
            Some(Component::Weapon(w)) => Some(w),
            _ => None,
        }
    }

    /// Typed accessor for [`Expiry`].
    #[must_use]
    pub fn expiry(&self) -> Option<&Expiry> {
        match self.components.get(ComponentKind::Expiry) {
            Some(Component::Expiry(e)) => Some(e),
            _ => None,
        }
    }

    /// Typed mutable accessor for [`Expiry`].
    pub fn expiry_mut(&mut self) -> Option<&mut Expiry> {
        match self.components.get_mut(ComponentKind::Expiry) {
            Some(Component::Expiry(e)) => Some(e),
            _ => None,
        }
    }

    /// Takes a snapshot of this entity's identity, tags, and attached
    /// component kinds. Published with `entity.destroyed`.
    #[must_use]
    pub fn snapshot(&self) -> EntitySnapshot {
        let mut tags: Vec<String> = self.tags.iter().cloned().collect();
        tags.sort();
        EntitySnapshot {
            id: self.id,
            tags,
            components: self.components.kinds().collect(),
        }
    }
}

/// Immutable record of an entity at a point in time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntitySnapshot {
    /// The entity's id.
    pub id: EntityId,
    /// Tags, sorted for stable comparison.
    pub tags: Vec<String>,
    /// Kinds of the components that were attached.
    pub components: Vec<ComponentKind>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_accessors_roundtrip() {
        let mut entity = Entity::new(EntityId::new(1));
        entity.insert(Transform::at([1.0, 2.0, 3.0]));
        entity.insert(Motion::new([0.0, 0.0, 5.0]));

        assert_eq!(entity.transform().unwrap().position, [1.0, 2.0, 3.0]);
        entity.transform_mut().unwrap().position[0] = 9.0;
        assert_eq!(entity.transform().unwrap().position[0], 9.0);
        assert!(entity.health().is_none());
    }

    #[test]
    fn insert_is_last_write_wins() {
        let mut entity = Entity::new(EntityId::new(1));
        entity.insert(Health::full(100.0));
        let replaced = entity.insert(Health::full(10.0));
        assert!(replaced.is_some());
        assert!((entity.health().unwrap().max - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn snapshot_captures_tags_and_kinds() {
        let mut entity = Entity::new(EntityId::new(7));
        entity.insert_tag("ship");
        entity.insert_tag("enemy");
        entity.insert(Health::full(100.0));

        let snapshot = entity.snapshot();
        assert_eq!(snapshot.id, EntityId::new(7));
        assert_eq!(snapshot.tags, vec!["enemy", "ship"]);
        assert_eq!(snapshot.components, vec![ComponentKind::Health]);
    }
}
