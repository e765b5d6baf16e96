use bevy::camera::ScalingMode;
use bevy::prelude::*;

use crate::common::tunables::ArenaTunables;

use super::*;

#[test]
fn projection_fits_the_whole_arena() {
    let arena = ArenaTunables::default();
    let Projection::Orthographic(ortho) = arena_projection(&arena) else {
        panic!("expected an orthographic projection");
    };
    let ScalingMode::AutoMin { min_width, min_height } = ortho.scaling_mode else {
        panic!("expected AutoMin scaling, got {:?}", ortho.scaling_mode);
    };
    assert_eq!(min_width, arena.half_width * 2.0);
    assert_eq!(min_height, arena.half_height * 2.0);
}

#[test]
fn gun_mount_sits_inside_the_framed_arena() {
    let tunables = Tunables::default();
    let arena = &tunables.arena;
    let framed = Rect::from_center_half_size(
        Vec2::ZERO,
        Vec2::new(arena.half_width, arena.half_height),
    );
    let mount = Vec2::new(0.0, -arena.half_height + tunables.weapons.mount_height);
    assert!(framed.contains(mount));
}
