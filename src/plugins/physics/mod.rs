use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::tunables::Tunables;

/// Bullets bounce off the arena walls; nothing falls.
pub fn plugin(app: &mut App) {
    let ppm = app.world().resource::<Tunables>().physics.pixels_per_meter;
    app.add_plugins(PhysicsPlugins::default().with_length_unit(ppm));
    app.insert_resource(Gravity(Vec2::ZERO));
}
