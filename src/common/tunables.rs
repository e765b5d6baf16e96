//! Tunable gameplay constants.
//!
//! Every group deserializes with `#[serde(default)]`, so a JSON override file only
//! needs the keys it changes:
//!
//! ```json
//! { "torpedo": { "max_lifetime_secs": 0.8 }, "weapons": { "bet_index": 2 } }
//! ```

use std::path::Path;

use bevy::prelude::*;
use serde::Deserialize;

use crate::common::error::ArcadeError;

#[derive(Resource, Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Tunables {
    pub physics: PhysicsTunables,
    pub arena: ArenaTunables,
    pub fish: FishTunables,
    pub weapons: WeaponTunables,
    pub torpedo: TorpedoTunables,
    pub bullets: BulletTunables,
    pub effects: EffectTunables,
}

impl Tunables {
    pub fn from_json(raw: &str) -> Result<Self, ArcadeError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArcadeError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PhysicsTunables {
    pub pixels_per_meter: f32,
}

impl Default for PhysicsTunables {
    fn default() -> Self {
        Self { pixels_per_meter: 20.0 }
    }
}

/// World-space arena. The camera frames exactly this rectangle.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArenaTunables {
    pub half_width: f32,
    pub half_height: f32,
    pub wall_thickness: f32,
    /// Inset applied to the viewport before the "fully on screen" test.
    pub viewport_padding: f32,
}

impl Default for ArenaTunables {
    fn default() -> Self {
        Self { half_width: 960.0, half_height: 540.0, wall_thickness: 30.0, viewport_padding: 8.0 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FishTunables {
    pub fade_in_secs: f32,
    pub fade_out_secs: f32,
    /// Despawning fish finalize after this even if the fade never reports back.
    pub finalize_fallback_secs: f32,
    /// Added to the server lifespan before the life watchdog fires.
    pub life_margin_secs: f32,
    pub default_lifespan_ms: u64,
    /// Longest a dead fish waits for in-flight torpedoes before despawning.
    pub last_torpedo_timeout_secs: f32,
    /// Longest a kill waits for the torpedo that is supposed to deliver it.
    pub killing_torpedo_timeout_secs: f32,
    pub hop_death_secs: f32,
    pub damage_flash_secs: f32,
    /// Chance that a batch commits to one authored path set instead of the fallback lanes.
    pub path_set_chance: f64,
}

impl Default for FishTunables {
    fn default() -> Self {
        Self {
            fade_in_secs: 0.2,
            fade_out_secs: 0.2,
            finalize_fallback_secs: 0.5,
            life_margin_secs: 2.0,
            default_lifespan_ms: 10_000,
            last_torpedo_timeout_secs: 2.0,
            killing_torpedo_timeout_secs: 2.0,
            hop_death_secs: 0.4,
            damage_flash_secs: 0.12,
            path_set_chance: 0.5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeaponTunables {
    pub simple_fire_interval_secs: f32,
    pub bullet_speed: f32,
    pub laser_damage_interval_secs: f32,
    pub laser_hit_interval_secs: f32,
    /// A laser hit that never gets a server answer stops blocking after this.
    pub laser_hit_timeout_secs: f32,
    pub torpedo_refire_secs: f32,
    pub variant_switch_cooldown_secs: f32,
    pub muzzle_offset: f32,
    /// Gun mount height above the bottom edge of the arena.
    pub mount_height: f32,
    pub bet_index: u32,
}

impl Default for WeaponTunables {
    fn default() -> Self {
        Self {
            simple_fire_interval_secs: 0.15,
            bullet_speed: 900.0,
            laser_damage_interval_secs: 0.2,
            laser_hit_interval_secs: 0.25,
            laser_hit_timeout_secs: 3.0,
            torpedo_refire_secs: 0.35,
            variant_switch_cooldown_secs: 0.5,
            muzzle_offset: 18.0,
            mount_height: 60.0,
            bet_index: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TorpedoTunables {
    pub launch_secs: f32,
    /// Launch covers this share of the initial distance to the target.
    pub launch_distance_factor: f32,
    pub launch_pulse: f32,
    pub homing_speed: f32,
    pub max_lifetime_secs: f32,
    pub hit_distance: f32,
    pub turn_rate_degrees: f32,
    /// Homing targets are clamped this far (fraction of the viewport) inside each edge.
    pub viewport_edge: f32,
    pub prewarm: usize,
}

impl Default for TorpedoTunables {
    fn default() -> Self {
        Self {
            launch_secs: 0.18,
            launch_distance_factor: 0.2,
            launch_pulse: 0.8,
            homing_speed: 1300.0,
            max_lifetime_secs: 0.6,
            hit_distance: 11.0,
            turn_rate_degrees: 720.0,
            viewport_edge: 0.01,
            prewarm: 16,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BulletTunables {
    pub lifetime_secs: f32,
    pub wall_bounces: u8,
    pub radius: f32,
    pub prewarm: usize,
}

impl Default for BulletTunables {
    fn default() -> Self {
        Self { lifetime_secs: 4.0, wall_bounces: 3, radius: 4.0, prewarm: 64 }
    }
}

/// Effect-fish choreography. Only the phase order is behaviour; every number here is cosmetic.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EffectTunables {
    pub own_torpedo_timeout_secs: f32,
    pub chain_charge_secs: f32,
    pub chain_link_secs: f32,
    pub chain_step_delay_secs: f32,
    pub chain_buffer_secs: f32,
    pub whirl_charge_secs: f32,
    pub whirl_secs: f32,
    pub whirl_radius: f32,
    pub bubble_interval_secs: f32,
    pub bubble_lifetime_secs: f32,
    pub barrage_prefire_secs: f32,
    pub barrage_interval_secs: f32,
    pub barrage_hit_timeout_secs: f32,
    pub escape_speed_multiplier: f32,
}

impl Default for EffectTunables {
    fn default() -> Self {
        Self {
            own_torpedo_timeout_secs: 2.0,
            chain_charge_secs: 0.3,
            chain_link_secs: 0.35,
            chain_step_delay_secs: 0.1,
            chain_buffer_secs: 0.2,
            whirl_charge_secs: 0.3,
            whirl_secs: 1.2,
            whirl_radius: 140.0,
            bubble_interval_secs: 0.08,
            bubble_lifetime_secs: 0.9,
            barrage_prefire_secs: 0.4,
            barrage_interval_secs: 0.08,
            barrage_hit_timeout_secs: 2.0,
            escape_speed_multiplier: 8.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_overrides_only_named_keys() {
        let t = Tunables::from_json(r#"{ "torpedo": { "max_lifetime_secs": 0.9 } }"#).unwrap();
        assert_eq!(t.torpedo.max_lifetime_secs, 0.9);
        assert_eq!(t.torpedo.launch_secs, TorpedoTunables::default().launch_secs);
        assert_eq!(t.fish.default_lifespan_ms, 10_000);
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let err = Tunables::from_json("{ nope").unwrap_err();
        assert!(matches!(err, ArcadeError::Decode(_)));
    }
}
