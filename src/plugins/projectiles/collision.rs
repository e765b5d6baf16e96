//! Bullet contact resolution.
//!
//! Walls spend the bounce budget. A fish flashes, gets a hit request for the current
//! bet (fish without a backend id are flashed only) and absorbs the bullet.

use avian2d::prelude::*;
use bevy::platform::collections::HashSet;
use bevy::prelude::*;

use crate::common::layers::Layer;
use crate::common::tunables::Tunables;
use crate::plugins::fish::lifecycle::FishLife;
use crate::plugins::fish::{FishCommand, FishData, TargetRef};
use crate::plugins::network::messages::HitRequest;
use crate::plugins::network::BetSelection;
use crate::plugins::weapons::WeaponKind;

use super::components::{Bullet, BulletState, PooledBullet};

#[derive(Clone, Copy, Debug)]
struct CollisionTarget {
    collider: Entity,
    body: Option<Entity>,
}

impl CollisionTarget {
    #[inline]
    fn gameplay_owner(self) -> Entity {
        self.body.unwrap_or(self.collider)
    }
}

#[inline]
fn targets(ev: &CollisionStart) -> (CollisionTarget, CollisionTarget) {
    (
        CollisionTarget { collider: ev.collider1, body: ev.body1 },
        CollisionTarget { collider: ev.collider2, body: ev.body2 },
    )
}

#[inline]
fn is_in_layer(layers: &CollisionLayers, layer: Layer) -> bool {
    layers.memberships.has_all(layer)
}

pub fn process_bullet_collisions(
    mut started: MessageReader<CollisionStart>,
    q_is_bullet: Query<(), With<PooledBullet>>,
    mut q_bullets: Query<(&mut Bullet, &mut BulletState), With<PooledBullet>>,
    q_layers: Query<&CollisionLayers>,
    q_fish: Query<(&FishLife, &FishData)>,
    bets: Res<BetSelection>,
    mut fish_out: MessageWriter<FishCommand>,
    mut hits: MessageWriter<HitRequest>,
    mut seen: Local<HashSet<Entity>>,
) {
    seen.clear();
    let bet_index = bets.bet_index();

    for ev in started.read() {
        let (t1, t2) = targets(ev);

        let b1 = q_is_bullet.contains(t1.collider);
        let b2 = q_is_bullet.contains(t2.collider);
        if !(b1 ^ b2) {
            continue;
        }
        let (bullet_side, other_side) = if b1 { (t1, t2) } else { (t2, t1) };

        // One contact per bullet per frame.
        if !seen.insert(bullet_side.collider) {
            continue;
        }

        let Ok(other_layers) = q_layers.get(other_side.collider) else {
            continue;
        };
        let Ok((mut bullet, mut state)) = q_bullets.get_mut(bullet_side.collider) else {
            continue;
        };
        if *state != BulletState::Active {
            continue;
        }

        if is_in_layer(other_layers, Layer::World) {
            bullet.wall_bounces_left = bullet.wall_bounces_left.saturating_sub(1);
            if bullet.wall_bounces_left == 0 {
                *state = BulletState::PendingReturn;
            }
            continue;
        }

        if is_in_layer(other_layers, Layer::Fish) {
            let fish = other_side.gameplay_owner();
            let Ok((life, data)) = q_fish.get(fish) else {
                continue;
            };
            if !life.collider_enabled() {
                continue;
            }

            let target = TargetRef { entity: fish, serial: life.serial() };
            fish_out.write(FishCommand::DamageFlash { target });
            if let Some(fish_id) = &data.fish_id {
                hits.write(HitRequest {
                    bet_index,
                    fish_id: fish_id.clone(),
                    weapon: WeaponKind::Simple,
                });
            }
            *state = BulletState::PendingReturn;
        }
    }
}

/// Bullets that never hit anything still go home.
pub fn expire_bullets(
    time: Res<Time>,
    tunables: Res<Tunables>,
    mut q: Query<(&mut Bullet, &mut BulletState), With<PooledBullet>>,
) {
    let dt = time.delta_secs();
    for (mut bullet, mut state) in &mut q {
        if *state != BulletState::Active {
            continue;
        }
        bullet.age += dt;
        if bullet.age >= tunables.bullets.lifetime_secs {
            *state = BulletState::PendingReturn;
        }
    }
}
