//! # Frame Driver
//!
//! One frame per host tick:
//!
//! ```text
//! Frame N:
//! 1. Clamp dt (a stalled host must not cause a physics skip)
//! 2. World::update(dt)      - systems, in registration order
//! 3. EffectPools::update(dt) - age and reclaim pooled effects
//! 4. Record FrameStats
//! ```

use std::time::Instant;

use tracing::warn;

use crate::context::GameContext;

/// Maximum delta time fed into a frame, in seconds. Larger host deltas
/// (pause, debugger stall) are clamped to this.
pub const MAX_DELTA_TIME: f32 = 0.1;

/// Timing and occupancy statistics for one frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameStats {
    /// Frame number, counted from 1.
    pub frame: u64,
    /// World (systems) update time in microseconds.
    pub world_us: u64,
    /// Effect pool update time in microseconds.
    pub effects_us: u64,
    /// Live entities after the frame.
    pub entities_alive: usize,
    /// Active pooled effects after the frame.
    pub effects_active: usize,
    /// Whether the host's dt was clamped.
    pub dt_clamped: bool,
}

/// Drives `World::update` then `EffectPools::update` exactly once per
/// frame, on the single update thread.
#[derive(Debug, Default)]
pub struct FrameDriver {
    frame: u64,
}

impl FrameDriver {
    /// Creates a driver at frame zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames run so far.
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Runs one frame with the host-supplied delta in seconds.
    pub fn run_frame(&mut self, ctx: &mut GameContext, dt: f32) -> FrameStats {
        self.frame += 1;

        let dt_clamped = dt > MAX_DELTA_TIME;
        if dt_clamped {
            warn!(frame = self.frame, dt, max = MAX_DELTA_TIME, "clamping oversized frame delta");
        }
        let dt = dt.min(MAX_DELTA_TIME).max(0.0);

        let world_start = Instant::now();
        ctx.world.update(dt);
        let world_us = world_start.elapsed().as_micros() as u64;

        let effects = ctx.effects();
        let effects_start = Instant::now();
        effects.borrow_mut().update(dt);
        let effects_us = effects_start.elapsed().as_micros() as u64;

        let effects_active = effects.borrow().total_active();
        FrameStats {
            frame: self.frame,
            world_us,
            effects_us,
            entities_alive: ctx.world.entity_count(),
            effects_active,
            dt_clamped,
        }
    }
}
