//! Projectiles plugin: **message-based producer → consumer** spawning on top of pools.
//!
//! Weapons and crab barrages never touch a pool. They write intents, and one allocator per
//! pool is the single writer that hands instances out.
//!
//! # Data flow
//! ```text
//!   Update (variable dt)
//!┌────────────────────────────────────────────────────────────────────────────┐
//!│  Aim      weapons write SpawnBulletRequest / LaunchTorpedo                 │
//!│  Fly      allocate_bullets_from_pool    BulletPool  -> Active bullet        │
//!│           allocate_torpedoes_from_pool  TorpedoPool -> Flying torpedo       │
//!│                                         + FishCommand::TorpedoLaunched      │
//!│           expire_bullets                age >= lifetime -> PendingReturn    │
//!│           fly_torpedoes                 Launch -> Homing -> impact          │
//!│                                         writes TorpedoResolved              │
//!└────────────────────────────────────────────────────────────────────────────┘
//!                │
//!                v
//!   FixedPostUpdate (fixed dt)
//!┌────────────────────────────────────────────────────────────────────────────┐
//!│  Avian emits CollisionStart                                                │
//!│  process_bullet_collisions   wall: bounce budget, fish: flash + HitRequest  │
//!│  return_bullets_commit       PendingReturn -> Inactive, back to BulletPool │
//!└────────────────────────────────────────────────────────────────────────────┘
//!                │
//!                v
//!   First (next frame)
//!┌────────────────────────────────────────────────────────────────────────────┐
//!│  return_finished_torpedoes   PendingReturn -> Inactive, back to TorpedoPool│
//!└────────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod allocator;
pub mod collision;
pub mod commit;
pub mod components;
pub mod flight;
pub mod homing;
pub mod messages;
pub mod pool;

use avian2d::collision::narrow_phase::CollisionEventSystems;
use bevy::prelude::*;

use crate::common::schedule::ArcadeSet;
use crate::common::state::GameState;

pub struct ProjectilesPlugin;

impl Plugin for ProjectilesPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<pool::BulletPool>()
            .init_resource::<pool::TorpedoPool>()
            .add_message::<messages::SpawnBulletRequest>()
            .add_message::<messages::LaunchTorpedo>()
            .add_message::<messages::TorpedoResolved>()
            .add_systems(Startup, pool::prewarm_projectile_pools);

        app.add_systems(
            Update,
            (
                allocator::allocate_bullets_from_pool,
                allocator::allocate_torpedoes_from_pool,
                collision::expire_bullets,
                flight::fly_torpedoes,
            )
                .chain()
                .in_set(ArcadeSet::Fly),
        );

        app.add_systems(
            FixedPostUpdate,
            (collision::process_bullet_collisions, commit::return_bullets_commit)
                .chain()
                .after(CollisionEventSystems)
                .run_if(in_state(GameState::InGame)),
        );

        app.add_systems(
            First,
            commit::return_finished_torpedoes.run_if(in_state(GameState::InGame)),
        );
    }
}
