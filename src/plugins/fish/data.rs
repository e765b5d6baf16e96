use bevy::prelude::*;

/// Coarse fish category. Selects the pool and the default behaviour set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FishType {
    #[default]
    Normal,
    Golden,
    Special,
    Effect,
    Immortal,
    JackpotFish,
    JackpotDragon,
}

impl FishType {
    pub const ALL: [FishType; 7] = [
        Self::Normal,
        Self::Golden,
        Self::Special,
        Self::Effect,
        Self::Immortal,
        Self::JackpotFish,
        Self::JackpotDragon,
    ];

    /// Parse the backend's type string. Unknown strings fall back to `Normal`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "golden" => Self::Golden,
            "special" => Self::Special,
            "effect" => Self::Effect,
            "immortal" => Self::Immortal,
            "jackpot_fish" | "jackpotfish" => Self::JackpotFish,
            "jackpot_dragon" | "jackpotdragon" => Self::JackpotDragon,
            _ => Self::Normal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeathCause {
    #[default]
    None,
    Torpedo,
    Bullet,
    Laser,
    ServerCleanup,
}

/// Non-owning reference to one *lifetime* of a pooled fish.
///
/// `serial` is unique per spawn, so a reference taken before the fish was returned
/// and reused never matches the new lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetRef {
    pub entity: Entity,
    pub serial: u64,
}

/// Identity of the current lifetime. Replaced on every spawn.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct FishData {
    pub fish_id: Option<String>,
    pub variant: String,
    pub fish_type: FishType,
    pub lifespan_ms: u64,
    pub multiplier: f32,
}

/// Pool tag. Set once when the entity is created and never changes.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FishKind(pub FishType);

#[derive(Component, Debug, Clone, Copy)]
pub struct PooledFish;

/// Collider box in local space. Used for pointer picks and on-screen tests.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Hitbox {
    pub size: Vec2,
    pub offset: Vec2,
}

impl Hitbox {
    #[inline]
    pub fn center(&self, translation: Vec2) -> Vec2 {
        translation + self.offset
    }

    #[inline]
    pub fn world_rect(&self, translation: Vec2) -> Rect {
        Rect::from_center_size(self.center(translation), self.size)
    }
}

/// One-shot payload delivered when the fish actually returns to its pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DespawnReward {
    pub payout: f64,
}
