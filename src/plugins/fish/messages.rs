//! Everything that wants a fish to change state says so with a `FishCommand`.
//!
//! Hit resolution, torpedoes and effect sequences are producers. `apply_fish_commands`
//! is the single consumer and the only writer of `FishLife` outside the per-frame tick,
//! so racing triggers within one frame are applied one after another and collapse on
//! the lifecycle's idempotency guards.

use bevy::prelude::*;

use super::data::{DeathCause, DespawnReward, FishType, TargetRef};

#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub enum FishCommand {
    /// Server-confirmed kill. Waits for an in-flight torpedo when the kill came from one.
    ConfirmKill { target: TargetRef, cause: DeathCause },
    Die { target: TargetRef, cause: DeathCause },
    MarkPendingDeath { target: TargetRef },
    ForceDespawn { target: TargetRef, cause: DeathCause },
    /// Server says the fish expired. Ignored while a visual death is held.
    ExpireCleanup { target: TargetRef },
    TorpedoLaunched { target: TargetRef },
    TorpedoArrived { target: TargetRef },
    Escape { target: TargetRef, speed_multiplier: f32 },
    SetReward { target: TargetRef, reward: DespawnReward },
    DamageFlash { target: TargetRef },
}

impl FishCommand {
    pub fn target(&self) -> TargetRef {
        match *self {
            Self::ConfirmKill { target, .. }
            | Self::Die { target, .. }
            | Self::MarkPendingDeath { target }
            | Self::ForceDespawn { target, .. }
            | Self::ExpireCleanup { target }
            | Self::TorpedoLaunched { target }
            | Self::TorpedoArrived { target }
            | Self::Escape { target, .. }
            | Self::SetReward { target, .. }
            | Self::DamageFlash { target } => target,
        }
    }
}

/// A fish went back to its pool. Carries the one-shot despawn reward, if any.
#[derive(Message, Debug, Clone, PartialEq)]
pub struct FishReturned {
    pub target: TargetRef,
    pub fish_id: Option<String>,
    pub variant: String,
    pub fish_type: FishType,
    pub cause: DeathCause,
    pub reward: Option<DespawnReward>,
    pub position: Vec2,
}
