//! Pluggable fish behaviours, picked from the catalog at spawn.
//!
//! A fish is one entity with the same component set regardless of variant. What differs
//! is data: the speed profile inside its `MovementDriver` and its `DeathStyle`.
//! Effect fish additionally carry an `EffectSequence` (see `effects.rs`).

use bevy::prelude::*;
use rand::Rng;

use crate::common::tunables::FishTunables;
use crate::plugins::paths::PathId;

use super::data::FishType;
use super::effects::EffectKind;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpeedProfile {
    Constant,
    /// Alternating bursts: `start` until the first glide, then `glide` / `push` forever.
    Pulse { start: f32, glide: f32, glide_after_secs: f32, push: f32, push_after_secs: f32 },
    /// A fresh random multiplier in `min..=max` every segment.
    Segmented { min: f32, max: f32, segment_secs: f32 },
}

impl SpeedProfile {
    pub const SQUID_PULSE: Self = Self::Pulse {
        start: 1.6,
        glide: 0.6,
        glide_after_secs: 0.8,
        push: 1.8,
        push_after_secs: 0.7,
    };
    pub const CRAB_SCUTTLE: Self = Self::Segmented { min: 0.6, max: 1.6, segment_secs: 0.6 };

    fn initial_multiplier(self) -> f32 {
        match self {
            Self::Constant => 1.0,
            Self::Pulse { start, .. } => start,
            Self::Segmented { min, max, .. } => (min + max) * 0.5,
        }
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeathStyle {
    /// Straight into the despawn fade.
    #[default]
    Fade,
    /// Short hop before the fade.
    Hop,
    /// Death is choreographed by an effect sequence.
    Sequence,
}

impl DeathStyle {
    /// Effect fish run a sequence, plain fish hop, everything else fades.
    pub fn for_fish(effect: Option<EffectKind>, fish_type: FishType) -> Self {
        match (effect, fish_type) {
            (Some(_), _) => Self::Sequence,
            (None, FishType::Normal) => Self::Hop,
            _ => Self::Fade,
        }
    }

    pub fn hold_secs(self, t: &FishTunables) -> f32 {
        match self {
            Self::Hop => t.hop_death_secs,
            Self::Fade | Self::Sequence => 0.0,
        }
    }

    /// Vertical offset of the hop animation at `elapsed` seconds into a `total` hold.
    pub fn hop_offset(elapsed: f32, total: f32) -> f32 {
        if total <= 0.0 {
            return 0.0;
        }
        // Up, down past the start, settle: 0.1 / 0.15 / 0.15 of a 0.4 s hop.
        let t = (elapsed / total).clamp(0.0, 1.0);
        let up = 0.25;
        let down = 0.625;
        if t < up {
            24.0 * (t / up)
        } else if t < down {
            24.0 - 32.0 * ((t - up) / (down - up))
        } else {
            -8.0 + 8.0 * ((t - down) / (1.0 - down))
        }
    }
}

/// Walks a fish along its path by arc length.
#[derive(Component, Debug, Clone)]
pub struct MovementDriver {
    pub path: PathId,
    pub distance: f32,
    pub base_speed: f32,
    pub profile: SpeedProfile,
    profile_multiplier: f32,
    profile_clock: f32,
    gliding: bool,
    escape_multiplier: Option<f32>,
}

impl MovementDriver {
    /// Speed is chosen so the whole path takes the server lifespan at multiplier 1.
    pub fn new(path: PathId, path_length: f32, lifespan_ms: u64, profile: SpeedProfile) -> Self {
        let secs = (lifespan_ms as f32 / 1000.0).max(0.1);
        Self {
            path,
            distance: 0.0,
            base_speed: path_length / secs,
            profile,
            profile_multiplier: profile.initial_multiplier(),
            profile_clock: 0.0,
            gliding: false,
            escape_multiplier: None,
        }
    }

    #[inline]
    pub fn speed_multiplier(&self) -> f32 {
        self.escape_multiplier.unwrap_or(self.profile_multiplier)
    }

    pub fn escape(&mut self, multiplier: f32) {
        self.escape_multiplier = Some(multiplier);
    }

    /// Move forward by `dt` seconds. Returns the new distance along the path.
    pub fn advance(&mut self, dt: f32, rng: &mut impl Rng) -> f32 {
        self.step_profile(dt, rng);
        self.distance += self.base_speed * self.speed_multiplier() * dt;
        self.distance
    }

    fn step_profile(&mut self, dt: f32, rng: &mut impl Rng) {
        self.profile_clock += dt;
        match self.profile {
            SpeedProfile::Constant => {}
            SpeedProfile::Pulse { glide, glide_after_secs, push, push_after_secs, .. } => {
                let hold = if self.gliding { push_after_secs } else { glide_after_secs };
                if self.profile_clock >= hold {
                    self.profile_clock = 0.0;
                    self.gliding = !self.gliding;
                    self.profile_multiplier = if self.gliding { glide } else { push };
                }
            }
            SpeedProfile::Segmented { min, max, segment_secs } => {
                if self.profile_clock >= segment_secs {
                    self.profile_clock = 0.0;
                    self.profile_multiplier =
                        if max > min { rng.gen_range(min..=max) } else { min };
                }
            }
        }
    }
}
