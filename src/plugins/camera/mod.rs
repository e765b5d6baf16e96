//! Camera plugin: a fixed 2D camera framing the arena, and the visible-world rectangle
//! the targeting code tests fish against.
//!
//! ```text
//! OnEnter(InGame): spawn MainCamera -> write MainCameraEntity resource
//! Ingest:          update_viewport   -> Viewport(Some(world rect))
//! ```
//!
//! Headless apps never spawn a camera. `Viewport` then stays whatever the caller put in
//! it (`None` by default, which makes every fish invalid as a target).

use bevy::camera::ScalingMode;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::schedule::ArcadeSet;
use crate::common::state::GameState;
use crate::common::tunables::{ArenaTunables, Tunables};

#[derive(Component)]
pub struct MainCamera;

#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct MainCameraEntity(pub Option<Entity>);

/// Visible world rectangle of the main camera.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct Viewport(pub Option<Rect>);

pub fn plugin(app: &mut App) {
    app.init_resource::<MainCameraEntity>()
        .add_systems(OnEnter(GameState::InGame), spawn_camera)
        .add_systems(Update, update_viewport.in_set(ArcadeSet::Ingest));
}

/// Orthographic projection that keeps the whole arena on screen at any window size.
pub fn arena_projection(arena: &ArenaTunables) -> Projection {
    Projection::Orthographic(OrthographicProjection {
        scaling_mode: ScalingMode::AutoMin {
            min_width: arena.half_width * 2.0,
            min_height: arena.half_height * 2.0,
        },
        ..OrthographicProjection::default_2d()
    })
}

fn spawn_camera(mut commands: Commands, tunables: Res<Tunables>) {
    let e = commands
        .spawn((
            Name::new("MainCamera"),
            Camera2d,
            MainCamera,
            arena_projection(&tunables.arena),
            Transform::from_xyz(0.0, 0.0, 999.0),
            DespawnOnExit(GameState::InGame),
        ))
        .id();

    commands.insert_resource(MainCameraEntity(Some(e)));
}

pub fn update_viewport(
    cam_e: Res<MainCameraEntity>,
    q_cam: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    mut viewport: ResMut<Viewport>,
) {
    let rect = cam_e
        .0
        .and_then(|e| q_cam.get(e).ok())
        .and_then(|(camera, cam_tf)| visible_world_rect(camera, cam_tf));
    if viewport.0 != rect {
        viewport.0 = rect;
    }
}

fn visible_world_rect(camera: &Camera, cam_tf: &GlobalTransform) -> Option<Rect> {
    let size = camera.logical_viewport_size()?;
    let a = camera.viewport_to_world_2d(cam_tf, Vec2::ZERO).ok()?;
    let b = camera.viewport_to_world_2d(cam_tf, size).ok()?;
    Some(Rect::from_corners(a, b))
}

#[cfg(test)]
mod tests;
