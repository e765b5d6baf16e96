//! Core plugin: shared resources and global settings.
//!
//! Must be registered first: later plugins read `Tunables` while they build.

use bevy::prelude::*;

use crate::common::rng::ArcadeRng;
use crate::common::tunables::Tunables;
use crate::plugins::camera::Viewport;

pub fn plugin(app: &mut App) {
    if !app.world().contains_resource::<Tunables>() {
        app.insert_resource(Tunables::default());
    }
    app.init_resource::<ArcadeRng>()
        .init_resource::<Viewport>()
        .insert_resource(ClearColor(Color::srgb(0.02, 0.12, 0.22)));
}
