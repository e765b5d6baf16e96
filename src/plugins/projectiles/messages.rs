//! Buffered projectile intents and outcomes.
//!
//! Weapons and effect fish only write intents; the allocators are the single writers of
//! the pools. Flights report back with `TorpedoResolved`.

use bevy::prelude::*;

use crate::plugins::fish::TargetRef;

#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct SpawnBulletRequest {
    pub pos: Vec2,
    pub vel: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TorpedoKind {
    /// Fired by the player's launcher.
    Player,
    /// Fired by a rock crab's barrage; the impact clears the target.
    Crab { crab: TargetRef },
}

#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct LaunchTorpedo {
    pub origin: Vec2,
    pub target: TargetRef,
    pub target_position: Vec2,
    pub kind: TorpedoKind,
}

/// A torpedo reached its target, or ran out of time (`forced`).
#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct TorpedoResolved {
    pub target: TargetRef,
    pub kind: TorpedoKind,
    pub at: Vec2,
    pub forced: bool,
}
