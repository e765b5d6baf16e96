//! Visual and collider template per variant.

use bevy::platform::collections::HashMap;
use bevy::prelude::*;

use super::behavior::{DeathStyle, SpeedProfile};
use super::data::FishType;
use super::effects::EffectKind;

/// Variants a torpedo may never be aimed at.
pub const TORPEDO_BLACKLIST: [&str; 9] = [
    "small_dragon_fish",
    "orange_fish",
    "angel_fish",
    "pinecone_fish",
    "puffer_fish",
    "turtle_fish",
    "jelly_fish",
    "lion_fish",
    "babyocto_fish",
];

#[derive(Debug, Clone, PartialEq)]
pub struct FishTemplate {
    pub variant: String,
    pub fish_type: FishType,
    pub sprite_size: Vec2,
    pub collider_size: Vec2,
    pub collider_offset: Vec2,
    /// Laser impact sprite scale relative to the collider.
    pub laser_impact_scale: f32,
    pub color: Color,
    pub torpedo_targetable: bool,
    pub speed_profile: SpeedProfile,
    pub death_style: DeathStyle,
    pub effect: Option<EffectKind>,
}

impl FishTemplate {
    fn new(variant: &str, fish_type: FishType, size: Vec2, color: Color) -> Self {
        let effect = EffectKind::for_variant(variant);
        Self {
            variant: variant.to_owned(),
            fish_type,
            sprite_size: size,
            collider_size: size * 0.8,
            collider_offset: Vec2::ZERO,
            laser_impact_scale: 0.7,
            color,
            torpedo_targetable: !TORPEDO_BLACKLIST.contains(&variant),
            speed_profile: match variant {
                "immo_squid_fish" => SpeedProfile::SQUID_PULSE,
                "effect_rockcrab_fish" => SpeedProfile::CRAB_SCUTTLE,
                _ => SpeedProfile::Constant,
            },
            death_style: DeathStyle::for_fish(effect, fish_type),
            effect,
        }
    }
}

#[derive(Resource, Debug, Clone)]
pub struct FishCatalog {
    templates: HashMap<String, FishTemplate>,
}

impl FishCatalog {
    pub fn from_templates(templates: impl IntoIterator<Item = FishTemplate>) -> Self {
        Self { templates: templates.into_iter().map(|t| (t.variant.clone(), t)).collect() }
    }

    pub fn template(&self, variant: &str) -> Option<&FishTemplate> {
        self.templates.get(variant)
    }

    pub fn variants(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Default for FishCatalog {
    fn default() -> Self {
        use FishType::*;
        let small = Vec2::new(56.0, 36.0);
        let medium = Vec2::new(96.0, 60.0);
        let large = Vec2::new(160.0, 96.0);
        let huge = Vec2::new(260.0, 140.0);

        let normal = Color::srgb(0.35, 0.7, 0.95);
        let templates = [
            FishTemplate::new("small_dragon_fish", Normal, small, normal),
            FishTemplate::new("orange_fish", Normal, small, Color::srgb(1.0, 0.55, 0.2)),
            FishTemplate::new("angel_fish", Normal, small, normal),
            FishTemplate::new("pinecone_fish", Normal, small, Color::srgb(0.75, 0.6, 0.3)),
            FishTemplate::new("puffer_fish", Normal, small, Color::srgb(0.9, 0.85, 0.4)),
            FishTemplate::new("turtle_fish", Normal, medium, Color::srgb(0.3, 0.65, 0.35)),
            FishTemplate::new("jelly_fish", Normal, small, Color::srgb(0.85, 0.5, 0.9)),
            FishTemplate::new("lion_fish", Normal, medium, Color::srgb(0.9, 0.35, 0.3)),
            FishTemplate::new("babyocto_fish", Normal, small, Color::srgb(0.95, 0.45, 0.6)),
            FishTemplate::new("clown_fish", Normal, small, Color::srgb(1.0, 0.6, 0.1)),
            FishTemplate::new("golden_fish", Golden, medium, Color::srgb(1.0, 0.84, 0.0)),
            FishTemplate::new("hammerhead_fish", Special, large, Color::srgb(0.55, 0.6, 0.7)),
            FishTemplate::new("manta_fish", Special, large, Color::srgb(0.3, 0.35, 0.55)),
            FishTemplate::new("effect_blue_fish", Effect, medium, Color::srgb(0.2, 0.45, 1.0)),
            FishTemplate::new(
                "effect_bubblecrab_fish",
                Effect,
                medium,
                Color::srgb(0.45, 0.85, 0.9),
            ),
            FishTemplate::new("effect_rockcrab_fish", Effect, medium, Color::srgb(0.6, 0.45, 0.35)),
            FishTemplate::new("immo_squid_fish", Immortal, large, Color::srgb(0.8, 0.8, 0.95)),
            FishTemplate::new("jackpot_fish", JackpotFish, large, Color::srgb(0.95, 0.3, 0.75)),
            FishTemplate::new("jackpot_dragon", JackpotDragon, huge, Color::srgb(0.85, 0.15, 0.15)),
        ];
        Self::from_templates(templates)
    }
}
