//! Explicit dependency injection for the simulation.
//!
//! Everything a system or the frame driver needs lives in
//! [`GameContext`] and is passed down; nothing is looked up through a
//! process-wide ambient registry.

use std::cell::RefCell;
use std::rc::Rc;

use starfall_core::World;
use starfall_effects::{EffectPools, EffectsConfig, NullSceneRoot, SceneRoot, TemplateSet};

/// Owns the world and the effect pools for one simulation.
///
/// The effect pools are behind `Rc<RefCell<_>>` so gameplay systems
/// registered into the world can share them with the frame driver on
/// the single update thread.
pub struct GameContext {
    /// The ECS world: entities, tag index, bus, systems.
    pub world: World,
    effects: Rc<RefCell<EffectPools>>,
}

impl GameContext {
    /// Builds a context with the given rendering collaborator.
    ///
    /// Templates are constructed once here and shared immutably by
    /// every pooled instance.
    #[must_use]
    pub fn new(config: &EffectsConfig, scene: Box<dyn SceneRoot>) -> Self {
        let world = World::new();
        let templates = TemplateSet::build(config);
        let effects =
            EffectPools::new(config, templates, scene).with_bus(world.bus_handle());
        Self {
            world,
            effects: Rc::new(RefCell::new(effects)),
        }
    }

    /// Builds a context that renders nothing, for servers and tests.
    #[must_use]
    pub fn headless(config: &EffectsConfig) -> Self {
        Self::new(config, Box::new(NullSceneRoot))
    }

    /// Shared handle to the effect pools, for systems that spawn or
    /// position effects.
    #[must_use]
    pub fn effects(&self) -> Rc<RefCell<EffectPools>> {
        Rc::clone(&self.effects)
    }

    /// Initializes registered systems and pre-warms every effect pool.
    /// One-time, time-bounded startup work, not part of the steady
    /// per-frame path.
    pub fn start(&mut self) {
        self.world.initialize();
        self.effects.borrow_mut().prewarm();
    }
}

impl std::fmt::Debug for GameContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameContext")
            .field("world", &self.world)
            .field("effects", &self.effects.borrow())
            .finish()
    }
}
