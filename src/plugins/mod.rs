//! Feature plugins.

use bevy::prelude::*;

use crate::plugins::projectiles::ProjectilesPlugin;

pub mod core;
pub mod fish;
pub mod hits;
pub mod input;
pub mod network;
pub mod paths;
pub mod physics;
pub mod projectiles;
pub mod targeting;
pub mod weapons;
pub mod world;

// Render-only
pub mod camera;

/// Register gameplay plugins that work in headless tests.
///
/// `core` goes first: the others read `Tunables` while building.
pub fn register_gameplay(app: &mut App) {
    core::plugin(app);
    physics::plugin(app);
    world::plugin(app);
    paths::plugin(app);
    fish::plugin(app);
    targeting::plugin(app);
    network::plugin(app);
    input::plugin(app);
    weapons::plugin(app);
    app.add_plugins(ProjectilesPlugin);
    hits::plugin(app);
}

/// Register render-only plugins (requires DefaultPlugins / render infra).
pub fn register_render(app: &mut App) {
    camera::plugin(app);
}
