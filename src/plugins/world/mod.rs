//! World plugin: the tank. Walls bullets bounce off, and the water behind the fish.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::layers::Layer;
use crate::common::state::GameState;
use crate::common::tunables::Tunables;

const BAND_HEIGHT: f32 = 120.0;

pub fn plugin(app: &mut App) {
    app.add_systems(OnEnter(GameState::InGame), (spawn_arena, spawn_water));
}

fn spawn_arena(mut commands: Commands, tunables: Res<Tunables>) {
    let arena = &tunables.arena;
    let (half_w, half_h, thickness) = (arena.half_width, arena.half_height, arena.wall_thickness);
    let wall_color = Color::srgb(0.1, 0.2, 0.3);
    let wall_layers = CollisionLayers::new(Layer::World, [Layer::PlayerBullet]);

    let mut spawn_wall = |name: &'static str, pos: Vec3, size: Vec2| {
        commands.spawn((
            Name::new(name),
            Sprite {
                color: wall_color,
                custom_size: Some(size),
                ..default()
            },
            Transform::from_translation(pos),
            RigidBody::Static,
            Collider::rectangle(size.x, size.y),
            wall_layers,
            DespawnOnExit(GameState::InGame),
        ));
    };

    let span_x = half_w * 2.0 + thickness * 2.0;
    spawn_wall(
        "WallTop",
        Vec3::new(0.0, half_h + thickness * 0.5, 0.0),
        Vec2::new(span_x, thickness),
    );
    spawn_wall(
        "WallBottom",
        Vec3::new(0.0, -half_h - thickness * 0.5, 0.0),
        Vec2::new(span_x, thickness),
    );
    spawn_wall(
        "WallLeft",
        Vec3::new(-half_w - thickness * 0.5, 0.0, 0.0),
        Vec2::new(thickness, half_h * 2.0),
    );
    spawn_wall(
        "WallRight",
        Vec3::new(half_w + thickness * 0.5, 0.0, 0.0),
        Vec2::new(thickness, half_h * 2.0),
    );
}

/// Horizontal bands, darker with depth. Solid-color sprites, so there are no assets.
fn spawn_water(mut commands: Commands, tunables: Res<Tunables>) {
    let arena = &tunables.arena;
    let bands = (arena.half_height * 2.0 / BAND_HEIGHT).ceil() as i32;

    (0..bands).for_each(|i| {
        let depth = i as f32 / bands.max(1) as f32;
        let y = arena.half_height - (i as f32 + 0.5) * BAND_HEIGHT;
        commands.spawn((
            Name::new("Water"),
            Sprite::from_color(
                Color::srgb(0.05, 0.28 - 0.14 * depth, 0.42 - 0.18 * depth),
                Vec2::new(arena.half_width * 2.0, BAND_HEIGHT),
            ),
            Transform::from_xyz(0.0, y, -1.0),
            DespawnOnExit(GameState::InGame),
        ));
    });
}
