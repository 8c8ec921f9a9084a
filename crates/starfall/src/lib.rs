//! # Starfall
//!
//! Game-side façade over the ECS core and the effect pools. The host
//! drives one frame per tick:
//!
//! ```
//! use starfall::{FrameDriver, GameContext};
//! use starfall_effects::EffectsConfig;
//!
//! let mut ctx = GameContext::headless(&EffectsConfig::default());
//! let mut driver = FrameDriver::new();
//! let stats = driver.run_frame(&mut ctx, 1.0 / 60.0);
//! assert_eq!(stats.frame, 1);
//! ```

#![deny(unsafe_code)]

mod context;
mod game_loop;
pub mod systems;

pub use context::GameContext;
pub use game_loop::{FrameDriver, FrameStats, MAX_DELTA_TIME};
