//! Effect-kind vocabulary.
//!
//! Kinds are the public discriminators selecting which sub-pool and
//! template an effect belongs to. The string forms (`"laser"`,
//! `"muzzleFlash"`, ...) are part of the external contract; inside the
//! crate everything dispatches on the closed enum.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use starfall_core::LookupError;

/// Discriminator for pooled combat effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EffectKind {
    /// Straight-line energy bolt.
    Laser,
    /// Guided projectile with a trail.
    Missile,
    /// Slow, large energy ball.
    Plasma,
    /// Plain kinetic round. The fallback kind.
    Bullet,
    /// Trail segment owned by a projectile.
    Trail,
    /// Short flash at the muzzle on fire.
    MuzzleFlash,
    /// Thin tracer line.
    Tracer,
    /// Impact burst.
    Explosion,
}

impl EffectKind {
    /// Number of effect kinds.
    pub const COUNT: usize = 8;

    /// All kinds, in pool storage order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Laser,
        Self::Missile,
        Self::Plasma,
        Self::Bullet,
        Self::Trail,
        Self::MuzzleFlash,
        Self::Tracer,
        Self::Explosion,
    ];

    /// The kind unrecognized discriminators fall back to.
    pub const DEFAULT: Self = Self::Bullet;

    /// Pool storage index for this kind.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The public vocabulary string for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Laser => "laser",
            Self::Missile => "missile",
            Self::Plasma => "plasma",
            Self::Bullet => "bullet",
            Self::Trail => "trail",
            Self::MuzzleFlash => "muzzleFlash",
            Self::Tracer => "tracer",
            Self::Explosion => "explosion",
        }
    }

    /// Parses a vocabulary string, falling back to
    /// [`EffectKind::DEFAULT`] with a logged warning when the string is
    /// not recognized. Dropping a malformed request on the floor would
    /// lose a visual effect; a default-looking one is the better
    /// failure.
    #[must_use]
    pub fn parse_or_default(s: &str) -> Self {
        s.parse().unwrap_or_else(|_| {
            warn!(kind = s, fallback = Self::DEFAULT.as_str(), "unknown effect kind");
            Self::DEFAULT
        })
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EffectKind {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| LookupError::UnknownKind(s.to_string()))
    }
}
