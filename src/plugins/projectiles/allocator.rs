//! Spawn consumers: activate projectiles from their pools.
//!
//! These are the single writers of `BulletPool` and `TorpedoPool` on the acquire side.
//! An empty pool grows; a request is never dropped for capacity.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::pool::Acquired;
use crate::common::tunables::Tunables;
use crate::plugins::fish::FishCommand;

use super::components::{Bullet, BulletState, Torpedo, TorpedoState};
use super::homing::TorpedoFlight;
use super::messages::{LaunchTorpedo, SpawnBulletRequest};
use super::pool::{active_bullet_layers, bullet_body, torpedo_body, BulletPool, TorpedoPool};

pub fn allocate_bullets_from_pool(
    mut commands: Commands,
    tunables: Res<Tunables>,
    mut pool: ResMut<BulletPool>,
    mut reader: MessageReader<SpawnBulletRequest>,
) {
    let radius = tunables.bullets.radius;
    for req in reader.read() {
        let acquired = pool.0.acquire_or_create(|| commands.spawn(bullet_body(radius)).id());
        if let Acquired::Created(e) = acquired {
            debug!(?e, in_use = pool.0.in_use_len(), "bullet pool grew");
        }

        commands.entity(acquired.item()).insert((
            BulletState::Active,
            Bullet::fired(tunables.bullets.wall_bounces),
            Transform::from_translation(req.pos.extend(2.0)),
            LinearVelocity(req.vel),
            Visibility::Visible,
            active_bullet_layers(),
        ));
    }
}

pub fn allocate_torpedoes_from_pool(
    mut commands: Commands,
    tunables: Res<Tunables>,
    mut pool: ResMut<TorpedoPool>,
    mut reader: MessageReader<LaunchTorpedo>,
    mut fish_out: MessageWriter<FishCommand>,
) {
    for req in reader.read() {
        let acquired = pool.0.acquire_or_create(|| commands.spawn(torpedo_body()).id());
        let flight =
            TorpedoFlight::launch(req.origin, req.target, req.target_position, &tunables.torpedo);
        let heading = flight.heading();

        commands.entity(acquired.item()).insert((
            TorpedoState::Flying,
            Torpedo { flight, kind: req.kind },
            Transform::from_translation(req.origin.extend(4.0))
                .with_rotation(Quat::from_rotation_z(Vec2::Y.angle_to(heading))),
            Visibility::Visible,
        ));
        fish_out.write(FishCommand::TorpedoLaunched { target: req.target });
    }
}
