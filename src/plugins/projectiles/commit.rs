//! Return commits: recycle projectiles back into their pools.
//!
//! These systems own the *Inactive invariants*. Inactive bullets are hidden, still and
//! collide with nothing. Inactive torpedoes are hidden and carry no flight.

use avian2d::prelude::*;
use bevy::prelude::*;

use super::components::{BulletState, PooledBullet, PooledTorpedo, Torpedo, TorpedoState};
use super::pool::{inactive_bullet_layers, BulletPool, TorpedoPool};

pub fn return_bullets_commit(
    mut pool: ResMut<BulletPool>,
    mut q: Query<
        (Entity, &mut BulletState, &mut Visibility, &mut LinearVelocity, &mut CollisionLayers),
        With<PooledBullet>,
    >,
) {
    for (e, mut state, mut vis, mut vel, mut layers) in &mut q {
        if *state != BulletState::PendingReturn {
            continue;
        }

        *state = BulletState::Inactive;
        *vis = Visibility::Hidden;
        vel.0 = Vec2::ZERO;
        *layers = inactive_bullet_layers();

        pool.0.release(e);
    }
}

/// Runs in `First`, so a torpedo finished during a frame is returned exactly one frame later.
pub fn return_finished_torpedoes(
    mut commands: Commands,
    mut pool: ResMut<TorpedoPool>,
    mut q: Query<(Entity, &mut TorpedoState, &mut Visibility, &mut Transform), With<PooledTorpedo>>,
) {
    for (e, mut state, mut vis, mut tf) in &mut q {
        if *state != TorpedoState::PendingReturn {
            continue;
        }

        *state = TorpedoState::Inactive;
        *vis = Visibility::Hidden;
        tf.scale = Vec3::ONE;
        commands.entity(e).remove::<Torpedo>();

        pool.0.release(e);
    }
}
