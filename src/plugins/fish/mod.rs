//! Fish: pooled subjects that swim a path, get shot, and return to their pool.
//!
//! ```text
//!  SpawnFlow ──GameContext::spawn_fish──► pool acquire + fresh components + registry
//!                                                        │
//!   hits / torpedoes / effects ──FishCommand──► apply_fish_commands ──► FishLife
//!                                                        │ tick
//!                                                        ▼
//!                                        finalize_despawned_fish (Commit)
//!                                        registry remove, pool release, FishReturned
//!                                                        │
//!                                        payout coin / chain link flourishes
//! ```
//!
//! `FishCommand` is the only way gameplay changes a fish's lifecycle. Commands carry the
//! `TargetRef` they were aimed at; one addressed to a previous lifetime of a reused
//! entity is dropped.

pub mod behavior;
pub mod catalog;
pub mod data;
pub mod effects;
pub mod flourish;
pub mod lifecycle;
pub mod messages;
pub mod registry;
pub mod spawn;
pub mod systems;

pub use data::{
    DeathCause, DespawnReward, FishData, FishKind, FishType, Hitbox, PooledFish, TargetRef,
};
pub use messages::{FishCommand, FishReturned};
pub use registry::{ActiveFish, FishPools, FishRegistry};

use bevy::prelude::*;

use crate::common::schedule::ArcadeSet;

pub fn plugin(app: &mut App) {
    app.init_resource::<FishRegistry>()
        .init_resource::<FishPools>()
        .init_resource::<catalog::FishCatalog>()
        .init_resource::<effects::Whirlpools>()
        .init_resource::<spawn::SpawnFlow>();

    app.add_message::<FishCommand>()
        .add_message::<FishReturned>()
        .add_message::<effects::EffectTrigger>()
        .add_message::<effects::EffectLink>();

    app.add_systems(
        Update,
        (spawn::run_spawn_flow, spawn::spawn_mock_fish)
            .chain()
            .in_set(ArcadeSet::Spawn),
    )
    .add_systems(
        Update,
        (systems::advance_fish_movement, effects::swirl_affected_fish)
            .chain()
            .in_set(ArcadeSet::Sense),
    )
    .add_systems(Update, effects::count_barrage_impacts.in_set(ArcadeSet::Resolve))
    .add_systems(
        Update,
        (
            effects::start_effect_sequences,
            effects::advance_effect_sequences,
            systems::apply_fish_commands,
            systems::tick_fish_lifecycles,
            systems::animate_fish_presentation,
            systems::sync_fish_colliders,
            effects::run_whirlpools,
        )
            .chain()
            .in_set(ArcadeSet::Lifecycle),
    )
    .add_systems(
        Update,
        (
            systems::finalize_despawned_fish,
            flourish::spawn_payout_flourishes,
            flourish::spawn_link_flourishes,
            flourish::animate_flourishes,
        )
            .chain()
            .in_set(ArcadeSet::Commit),
    );
}
