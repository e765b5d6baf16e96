//! Integration test harness.
//!
//! Keep integration tests headless:
//! - `MinimalPlugins` provides core ECS runtime.
//! - we then call `fish_arcade::game::configure_headless` to install gameplay plugins.
//! - frames advance by a fixed 16 ms so timers are deterministic.

use std::time::Duration;

use bevy::asset::AssetPlugin;
use bevy::ecs::message::Messages;
use bevy::prelude::*;
use bevy::scene::ScenePlugin;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;

use fish_arcade::plugins::network::NetInbox;

pub const FRAME: Duration = Duration::from_millis(16);

pub fn app_headless() -> App {
    let mut app = App::new();

    // Add AssetPlugin + ScenePlugin so SceneSpawner exists.
    app.add_plugins((
        MinimalPlugins,
        StatesPlugin,
        AssetPlugin::default(),
        ScenePlugin,
    ));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(FRAME));

    fish_arcade::game::configure_headless(&mut app);
    // Run plugin `finish`/`cleanup` hooks as `App::run` would; some plugins
    // (e.g. avian's broad/narrow phase) register resources there.
    app.finish();
    app.cleanup();
    app
}

/// Queue a raw server frame as if the socket had just delivered it.
pub fn deliver(app: &mut App, frame: String) {
    app.world_mut().resource_mut::<NetInbox>().push(frame);
}

/// Take every `M` written since the last call. Only for messages nothing else reads.
pub fn take<M: Message>(app: &mut App) -> Vec<M> {
    app.world_mut().resource_mut::<Messages<M>>().drain().collect()
}
