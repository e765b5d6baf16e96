use bevy::prelude::*;

use super::homing::TorpedoFlight;
use super::messages::TorpedoKind;

#[derive(Component)]
pub struct PooledBullet;

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BulletState {
    #[default]
    Inactive,
    Active,
    PendingReturn,
}

#[derive(Component, Debug, Clone, Default)]
pub struct Bullet {
    pub wall_bounces_left: u8,
    pub age: f32,
}

impl Bullet {
    #[inline]
    pub fn fired(wall_bounces: u8) -> Self {
        Self { wall_bounces_left: wall_bounces, age: 0.0 }
    }
}

#[derive(Component)]
pub struct PooledTorpedo;

/// `PendingReturn` torpedoes go back to the pool in `First` of the next frame.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TorpedoState {
    #[default]
    Inactive,
    Flying,
    PendingReturn,
}

#[derive(Component, Debug, Clone)]
pub struct Torpedo {
    pub flight: TorpedoFlight,
    pub kind: TorpedoKind,
}
