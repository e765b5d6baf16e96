use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::layers::Layer;
use crate::common::pool::ObjectPool;
use crate::common::tunables::Tunables;

use super::components::{Bullet, BulletState, PooledBullet, PooledTorpedo, TorpedoState};

#[derive(Resource, Debug, Default)]
pub struct BulletPool(pub ObjectPool<Entity>);

#[derive(Resource, Debug, Default)]
pub struct TorpedoPool(pub ObjectPool<Entity>);

#[inline]
pub fn active_bullet_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::PlayerBullet, [Layer::World, Layer::Fish])
}

/// “Disabled” without structural changes: empty filters means we collide with nothing.
#[inline]
pub fn inactive_bullet_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::PlayerBullet, [] as [Layer; 0])
}

/// A hidden, non-colliding bullet body. Physics components stay on for the whole life of
/// the entity; only layers, velocity and visibility change.
pub fn bullet_body(radius: f32) -> impl Bundle {
    (
        Name::new("Bullet(Pooled)"),
        PooledBullet,
        BulletState::Inactive,
        Bullet::default(),
        Sprite {
            color: Color::srgb(1.0, 0.85, 0.3),
            custom_size: Some(Vec2::splat(radius * 2.0)),
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, 2.0),
        Visibility::Hidden,
        RigidBody::Dynamic,
        Collider::circle(radius),
        inactive_bullet_layers(),
        Restitution::new(0.95).with_combine_rule(CoefficientCombine::Max),
        Friction::ZERO,
        LinearVelocity(Vec2::ZERO),
        CollisionEventsEnabled,
    )
}

pub fn torpedo_body() -> impl Bundle {
    (
        Name::new("Torpedo(Pooled)"),
        PooledTorpedo,
        TorpedoState::Inactive,
        Sprite {
            color: Color::srgb(0.95, 0.95, 1.0),
            custom_size: Some(Vec2::new(10.0, 26.0)),
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, 4.0),
        Visibility::Hidden,
    )
}

/// Pre-spawn pooled bullets and torpedoes (inactive).
pub fn prewarm_projectile_pools(
    mut commands: Commands,
    tunables: Res<Tunables>,
    mut bullets: ResMut<BulletPool>,
    mut torpedoes: ResMut<TorpedoPool>,
) {
    let radius = tunables.bullets.radius;
    bullets
        .0
        .prewarm(tunables.bullets.prewarm, || commands.spawn(bullet_body(radius)).id());
    torpedoes
        .0
        .prewarm(tunables.torpedo.prewarm, || commands.spawn(torpedo_body()).id());
}
