//! # Component System
//!
//! Components are pure data containers with no behavior. The component
//! space is closed: a [`ComponentKind`] enum keys a [`Component`] tagged
//! union, so lookups return statically typed data instead of an untyped
//! bag. Each entity holds at most one component per kind.
//!
//! The leaf structs are `Pod` so they stay bitwise-copyable and
//! zero-initializable, matching pre-allocated storage.

use bytemuck::{Pod, Zeroable};

/// World-space placement and visibility of an entity.
///
/// These are exactly the fields a rendering collaborator samples each
/// frame; nothing else about rendering leaks into the core.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Transform {
    /// Position in world space.
    pub position: [f32; 3],
    /// Euler rotation in radians.
    pub rotation: [f32; 3],
    /// Uniform scale.
    pub scale: f32,
    /// Visibility flag (0.0 hidden, anything else visible).
    pub visibility: f32,
}

impl Transform {
    /// Creates a visible transform at `position` with unit scale.
    #[inline]
    #[must_use]
    pub const fn at(position: [f32; 3]) -> Self {
        Self {
            position,
            rotation: [0.0; 3],
            scale: 1.0,
            visibility: 1.0,
        }
    }

    /// Whether the renderer should draw this entity.
    #[inline]
    #[must_use]
    pub fn visible(&self) -> bool {
        self.visibility != 0.0
    }
}

/// Linear velocity in world units per second.
///
/// The core integrates simple linear motion only; anything fancier
/// belongs to a collaborator.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Motion {
    /// Velocity vector.
    pub velocity: [f32; 3],
    /// Padding for 16-byte alignment.
    pub _padding: f32,
}

impl Motion {
    /// Creates a motion component with the given velocity.
    #[inline]
    #[must_use]
    pub const fn new(velocity: [f32; 3]) -> Self {
        Self {
            velocity,
            _padding: 0.0,
        }
    }
}

/// Hit points.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Health {
    /// Current hit points.
    pub current: f32,
    /// Maximum hit points.
    pub max: f32,
}

impl Health {
    /// Creates a full-health component.
    #[inline]
    #[must_use]
    pub const fn full(max: f32) -> Self {
        Self { current: max, max }
    }

    /// Whether the entity is out of hit points.
    #[inline]
    #[must_use]
    pub fn depleted(&self) -> bool {
        self.current <= 0.0
    }
}

/// Weapon firing state.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Weapon {
    /// Seconds between shots.
    pub cooldown_secs: f32,
    /// Seconds until the next shot is allowed.
    pub remaining_secs: f32,
}

impl Weapon {
    /// Creates a weapon ready to fire with the given cooldown.
    #[inline]
    #[must_use]
    pub const fn with_cooldown(cooldown_secs: f32) -> Self {
        Self {
            cooldown_secs,
            remaining_secs: 0.0,
        }
    }

    /// Whether the cooldown has elapsed.
    #[inline]
    #[must_use]
    pub fn ready(&self) -> bool {
        self.remaining_secs <= 0.0
    }
}

/// Bounded lifetime of a short-lived entity.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Expiry {
    /// Seconds this entity has been alive.
    pub age_secs: f32,
    /// Seconds after which the entity is destroyed.
    pub lifetime_secs: f32,
}

impl Expiry {
    /// Creates an expiry component with the given lifetime.
    #[inline]
    #[must_use]
    pub const fn after(lifetime_secs: f32) -> Self {
        Self {
            age_secs: 0.0,
            lifetime_secs,
        }
    }

    /// Whether the lifetime has elapsed.
    #[inline]
    #[must_use]
    pub fn elapsed(&self) -> bool {
        self.age_secs >= self.lifetime_secs
    }
}

/// Discriminator for the closed component space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKind {
    /// [`Transform`]
    Transform,
    /// [`Motion`]
    Motion,
    /// [`Health`]
    Health,
    /// [`Weapon`]
    Weapon,
    /// [`Expiry`]
    Expiry,
}

impl ComponentKind {
    /// Number of component kinds.
    pub const COUNT: usize = 5;

    /// All kinds, in storage order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Transform,
        Self::Motion,
        Self::Health,
        Self::Weapon,
        Self::Expiry,
    ];

    /// Storage slot index for this kind.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// A component instance, tagged by kind.
///
/// Owned exclusively by one entity; destroyed with it or on explicit
/// removal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Component {
    /// Placement and visibility.
    Transform(Transform),
    /// Linear velocity.
    Motion(Motion),
    /// Hit points.
    Health(Health),
    /// Firing state.
    Weapon(Weapon),
    /// Bounded lifetime.
    Expiry(Expiry),
}

impl Component {
    /// Returns the kind tag of this instance.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ComponentKind {
        match self {
            Self::Transform(_) => ComponentKind::Transform,
            Self::Motion(_) => ComponentKind::Motion,
            Self::Health(_) => ComponentKind::Health,
            Self::Weapon(_) => ComponentKind::Weapon,
            Self::Expiry(_) => ComponentKind::Expiry,
        }
    }
}

impl From<Transform> for Component {
    fn from(value: Transform) -> Self {
        Self::Transform(value)
    }
}

impl From<Motion> for Component {
    fn from(value: Motion) -> Self {
        Self::Motion(value)
    }
}

impl From<Health> for Component {
    fn from(value: Health) -> Self {
        Self::Health(value)
    }
}

impl From<Weapon> for Component {
    fn from(value: Weapon) -> Self {
        Self::Weapon(value)
    }
}

impl From<Expiry> for Component {
    fn from(value: Expiry) -> Self {
        Self::Expiry(value)
    }
}

/// Per-entity component storage: one slot per kind.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ComponentSet {
    slots: [Option<Component>; ComponentKind::COUNT],
}

impl ComponentSet {
    /// Inserts a component, returning the instance it replaced.
    /// Last write wins, a deliberate contract rather than a merge.
    pub(crate) fn insert(&mut self, component: Component) -> Option<Component> {
        self.slots[component.kind().index()].replace(component)
    }

    pub(crate) fn get(&self, kind: ComponentKind) -> Option<&Component> {
        self.slots[kind.index()].as_ref()
    }

    pub(crate) fn get_mut(&mut self, kind: ComponentKind) -> Option<&mut Component> {
        self.slots[kind.index()].as_mut()
    }

    pub(crate) fn remove(&mut self, kind: ComponentKind) -> Option<Component> {
        self.slots[kind.index()].take()
    }

    pub(crate) fn kinds(&self) -> impl Iterator<Item = ComponentKind> + '_ {
        self.slots.iter().flatten().map(Component::kind)
    }
}
