//! Headless simulation demo.
//!
//! Runs a small fleet for two simulated seconds with no renderer:
//! ships fire pooled projectiles, missiles drag trail segments, debris
//! expires, and per-frame statistics land in the log.
//!
//! ```text
//! RUST_LOG=starfall=debug cargo run --bin headless_demo
//! ```

use std::rc::Rc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use starfall::systems::{CombatSystem, ExpirySystem, MotionSystem, SHIP_TAG};
use starfall::{FrameDriver, GameContext};
use starfall_core::{topics, Expiry, Motion, Transform, Weapon};
use starfall_effects::{EffectKind, EffectsConfig};

const FRAME_DT: f32 = 1.0 / 60.0;
const FRAMES: u64 = 120;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = EffectsConfig::default();
    let mut ctx = GameContext::headless(&config);
    let effects = ctx.effects();

    ctx.world.register_system(Box::new(MotionSystem));
    ctx.world.register_system(Box::new(
        CombatSystem::new(Rc::clone(&effects), EffectKind::Missile).with_speed(25.0),
    ));
    ctx.world.register_system(Box::new(ExpirySystem));

    // Count shots fired across the run.
    let shots = Rc::new(std::cell::Cell::new(0u64));
    let counter = Rc::clone(&shots);
    ctx.world.bus().subscribe(topics::PROJECTILE_FIRED, move |_| {
        counter.set(counter.get() + 1);
        Ok(())
    });

    for lane in 0..3 {
        let ship = ctx.world.create_entity();
        ctx.world.add_tag(ship, SHIP_TAG);
        let entity = ctx.world.entity_mut(ship).expect("just created");
        entity.insert(Transform::at([lane as f32 * 4.0, 0.0, 0.0]));
        entity.insert(Motion::new([0.0, 0.0, 2.0]));
        entity.insert(Weapon::with_cooldown(0.4));
    }

    // Short-lived debris exercising the expiry path.
    let debris = ctx.world.create_entity();
    ctx.world
        .entity_mut(debris)
        .expect("just created")
        .insert(Expiry::after(0.75));

    ctx.start();

    let mut driver = FrameDriver::new();
    for _ in 0..FRAMES {
        let stats = driver.run_frame(&mut ctx, FRAME_DT);
        if stats.frame % 30 == 0 {
            info!(
                frame = stats.frame,
                world_us = stats.world_us,
                effects_us = stats.effects_us,
                entities = stats.entities_alive,
                effects_active = stats.effects_active,
                "frame checkpoint"
            );
        }
    }

    info!(
        frames = driver.frame_count(),
        shots_fired = shots.get(),
        entities = ctx.world.entity_count(),
        effects_active = effects.borrow().total_active(),
        effects_pooled = effects.borrow().total_available(),
        "simulation complete"
    );

    effects.borrow_mut().release_all();
}
