//! Pointer and keyboard input, reduced to plain resources and messages.
//!
//! Gameplay reads `PointerState` and never touches windows or cameras. When no
//! `ButtonInput` exists (headless apps) the samplers leave their outputs alone, so tests
//! drive `PointerState` directly.

use bevy::prelude::*;

use crate::common::schedule::ArcadeSet;
use crate::plugins::camera::MainCamera;
use crate::plugins::weapons::{SwitchWeapon, ToggleTargetLock, WeaponKind};

#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    /// Cursor in world space; `None` while it is outside the window.
    pub world: Option<Vec2>,
    pub pressed: bool,
    pub just_pressed: bool,
    pub just_released: bool,
}

pub fn plugin(app: &mut App) {
    app.init_resource::<PointerState>().add_systems(
        Update,
        (sample_pointer, weapon_hotkeys).in_set(ArcadeSet::Ingest),
    );
}

pub fn sample_pointer(
    buttons: Option<Res<ButtonInput<MouseButton>>>,
    windows: Query<&Window>,
    q_camera: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    mut pointer: ResMut<PointerState>,
) {
    let Some(buttons) = buttons else { return };

    pointer.pressed = buttons.pressed(MouseButton::Left);
    pointer.just_pressed = buttons.just_pressed(MouseButton::Left);
    pointer.just_released = buttons.just_released(MouseButton::Left);
    pointer.world = cursor_world(&windows, &q_camera);
}

fn cursor_world(
    windows: &Query<&Window>,
    q_camera: &Query<(&Camera, &GlobalTransform), With<MainCamera>>,
) -> Option<Vec2> {
    let window = match windows.single() {
        Ok(w) => w,
        Err(e) => {
            debug!("No single Window: {e:?}");
            return None;
        }
    };
    let cursor = window.cursor_position()?;
    let (camera, camera_tf) = match q_camera.single() {
        Ok(v) => v,
        Err(e) => {
            debug!("No single MainCamera: {e:?}");
            return None;
        }
    };
    match camera.viewport_to_world_2d(camera_tf, cursor) {
        Ok(p) => Some(p),
        Err(e) => {
            debug!("viewport_to_world_2d failed: {e:?}");
            None
        }
    }
}

/// 1/2/3 pick a weapon, T toggles target lock.
pub fn weapon_hotkeys(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    mut switch: MessageWriter<SwitchWeapon>,
    mut toggle: MessageWriter<ToggleTargetLock>,
) {
    let Some(keys) = keys else { return };

    let picked = [
        (KeyCode::Digit1, WeaponKind::Simple),
        (KeyCode::Digit2, WeaponKind::Laser),
        (KeyCode::Digit3, WeaponKind::Torpedo),
    ]
    .into_iter()
    .find(|(key, _)| keys.just_pressed(*key));
    if let Some((_, weapon)) = picked {
        switch.write(SwitchWeapon(weapon));
    }
    if keys.just_pressed(KeyCode::KeyT) {
        toggle.write(ToggleTargetLock);
    }
}
