//! Shared immutable effect templates.
//!
//! A template is the geometry/material-equivalent descriptor for a
//! kind: constructed once at startup, shared read-only by every pooled
//! instance. Templates are built externally and handed to
//! [`EffectPools`](crate::EffectPools) so the pools stay decoupled from
//! content loading.

use std::sync::Arc;

use crate::config::EffectsConfig;
use crate::kind::EffectKind;

/// Immutable visual descriptor for one effect kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectTemplate {
    /// Base color, RGBA.
    pub color: [f32; 4],
    /// Base size in world units.
    pub size: f32,
    /// Emissive intensity for bloom.
    pub emissive: f32,
    /// Default lifetime in seconds, used when the config does not
    /// override it.
    pub lifetime_secs: f32,
}

/// One template per effect kind, built once at startup.
#[derive(Debug)]
pub struct TemplateSet {
    templates: [EffectTemplate; EffectKind::COUNT],
}

impl TemplateSet {
    /// Builds the stock templates, taking lifetimes from the config.
    #[must_use]
    pub fn build(config: &EffectsConfig) -> Arc<Self> {
        let mut templates = [EffectTemplate {
            color: [1.0; 4],
            size: 1.0,
            emissive: 1.0,
            lifetime_secs: 1.0,
        }; EffectKind::COUNT];

        for kind in EffectKind::ALL {
            let (color, size, emissive) = Self::stock_appearance(kind);
            templates[kind.index()] = EffectTemplate {
                color,
                size,
                emissive,
                lifetime_secs: config.tuning(kind).lifetime_secs,
            };
        }
        Arc::new(Self { templates })
    }

    /// The template for a kind.
    #[inline]
    #[must_use]
    pub fn get(&self, kind: EffectKind) -> &EffectTemplate {
        &self.templates[kind.index()]
    }

    // Stock appearance values; game content would replace these, the
    // core only guarantees one immutable descriptor per kind.
    const fn stock_appearance(kind: EffectKind) -> ([f32; 4], f32, f32) {
        match kind {
            EffectKind::Laser => ([1.0, 0.1, 0.1, 1.0], 0.2, 3.0),
            EffectKind::Missile => ([0.9, 0.9, 0.9, 1.0], 0.5, 1.0),
            EffectKind::Plasma => ([0.3, 1.0, 0.4, 1.0], 0.8, 2.5),
            EffectKind::Bullet => ([1.0, 0.8, 0.2, 1.0], 0.1, 1.5),
            EffectKind::Trail => ([0.8, 0.8, 1.0, 0.5], 0.15, 0.5),
            EffectKind::MuzzleFlash => ([1.0, 0.9, 0.5, 0.9], 0.6, 4.0),
            EffectKind::Tracer => ([1.0, 1.0, 0.6, 0.8], 0.05, 2.0),
            EffectKind::Explosion => ([1.0, 0.5, 0.1, 1.0], 1.5, 5.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_a_template() {
        let set = TemplateSet::build(&EffectsConfig::default());
        for kind in EffectKind::ALL {
            let template = set.get(kind);
            assert!(template.size > 0.0);
            assert!(template.lifetime_secs > 0.0);
        }
    }

    #[test]
    fn lifetimes_come_from_config() {
        let mut config = EffectsConfig::default();
        config.set_tuning(
            EffectKind::Laser,
            crate::config::PoolTuning {
                lifetime_secs: 9.5,
                ..config.tuning(EffectKind::Laser)
            },
        );
        let set = TemplateSet::build(&config);
        assert!((set.get(EffectKind::Laser).lifetime_secs - 9.5).abs() < f32::EPSILON);
    }
}
