//! Tuning configuration for the effect pools.
//!
//! Parsed from TOML once at startup; the per-frame path never touches
//! the parser. Exact sizes and increments are tuning values, not
//! contracts, so everything has a default and the file may override any
//! subset of kinds:
//!
//! ```toml
//! [pools.laser]
//! initial_size = 64
//! capacity_increment = 16
//! lifetime_secs = 1.2
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::kind::EffectKind;

/// Failure to load a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML was malformed or carried unknown kinds.
    #[error("invalid effects config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Pool tuning for one effect kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolTuning {
    /// Objects synthesized up front.
    pub initial_size: usize,
    /// Objects synthesized when an acquire finds the pool empty.
    pub capacity_increment: u32,
    /// Seconds before an active effect expires.
    pub lifetime_secs: f32,
}

impl Default for PoolTuning {
    fn default() -> Self {
        Self {
            initial_size: 16,
            capacity_increment: 8,
            lifetime_secs: 1.0,
        }
    }
}

/// Tuning for all effect pools.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    /// Per-kind overrides; kinds not listed use stock tuning.
    pools: HashMap<EffectKind, PoolTuning>,
}

impl EffectsConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] when the document is malformed or names
    /// an unknown kind.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// The effective tuning for a kind: the configured override, or the
    /// stock value.
    #[must_use]
    pub fn tuning(&self, kind: EffectKind) -> PoolTuning {
        self.pools
            .get(&kind)
            .copied()
            .unwrap_or_else(|| Self::stock_tuning(kind))
    }

    /// Replaces the tuning for a kind.
    pub fn set_tuning(&mut self, kind: EffectKind, tuning: PoolTuning) {
        self.pools.insert(kind, tuning);
    }

    // Stock tuning: projectiles are plentiful, one-shot flashes less so.
    fn stock_tuning(kind: EffectKind) -> PoolTuning {
        match kind {
            EffectKind::Laser | EffectKind::Bullet => PoolTuning {
                initial_size: 64,
                capacity_increment: 16,
                lifetime_secs: 1.5,
            },
            EffectKind::Missile | EffectKind::Plasma => PoolTuning {
                initial_size: 24,
                capacity_increment: 8,
                lifetime_secs: 3.0,
            },
            EffectKind::Trail => PoolTuning {
                initial_size: 256,
                capacity_increment: 64,
                lifetime_secs: 0.6,
            },
            EffectKind::MuzzleFlash => PoolTuning {
                initial_size: 32,
                capacity_increment: 8,
                lifetime_secs: 0.08,
            },
            EffectKind::Tracer => PoolTuning {
                initial_size: 64,
                capacity_increment: 16,
                lifetime_secs: 0.25,
            },
            EffectKind::Explosion => PoolTuning {
                initial_size: 16,
                capacity_increment: 4,
                lifetime_secs: 1.2,
            },
        }
    }
}
