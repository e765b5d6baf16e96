//! Game composition root.
//!
//! Provides two public configuration functions:
//! - `configure_full`: includes DefaultPlugins (window/render) + game plugins.
//! - `configure_headless`: minimal configuration for integration tests.

pub mod context;

use bevy::prelude::*;
use bevy::window::WindowResolution;

use crate::common::schedule;
use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins;

// Only compile these imports on Windows.
#[cfg(target_os = "windows")]
use bevy::render::{
    settings::{Backends, PowerPreference, WgpuSettings},
    RenderPlugin,
};

/// JSON file with tunable overrides, read once at startup.
pub const TUNABLES_ENV: &str = "FISH_ARCADE_TUNABLES";

pub fn run() {
    App::new().add_plugins(configure_full).run();
}

/// Full configuration for `cargo run`.
pub fn configure_full(app: &mut App) {
    let default_plugins = DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Fish Arcade".into(),
            resolution: WindowResolution::new(1280, 720),
            ..default()
        }),
        ..default()
    });

    // DX12 on the high-performance adapter.
    #[cfg(target_os = "windows")]
    let default_plugins = default_plugins.set(RenderPlugin {
        render_creation: WgpuSettings {
            backends: Some(Backends::DX12),
            power_preference: PowerPreference::HighPerformance,
            ..default()
        }
        .into(),
        ..default()
    });

    app.add_plugins(default_plugins);
    app.insert_resource(tunables_from_env());

    configure_game(app);
    plugins::register_render(app);
}

/// Headless configuration for integration tests.
///
/// Notes:
/// - Do NOT add DefaultPlugins.
/// - Do NOT add render-only plugins (camera).
/// - Uses default `Tunables` unless the caller inserted its own first.
pub fn configure_headless(app: &mut App) {
    configure_game(app);
}

/// Configuration shared by both full and headless apps.
fn configure_game(app: &mut App) {
    app.init_state::<GameState>();
    schedule::configure(app);
    plugins::register_gameplay(app);
}

fn tunables_from_env() -> Tunables {
    let Ok(path) = std::env::var(TUNABLES_ENV) else {
        return Tunables::default();
    };
    match Tunables::load(&path) {
        Ok(tunables) => {
            info!(%path, "tunables loaded");
            tunables
        }
        Err(err) => {
            warn!(%path, %err, "could not load tunables, using defaults");
            Tunables::default()
        }
    }
}
