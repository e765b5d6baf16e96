//! Test helpers.
//!
//! `World::run_system_once` runs a system without building a schedule. Systems that use
//! `Commands` only enqueue structural changes, so we `flush()` before returning.

use std::time::Duration;

use bevy::ecs::message::Messages;
use bevy::ecs::system::{IntoSystem, RunSystemOnce};
use bevy::prelude::*;

use crate::plugins::fish::{FishCommand, FishReturned};
use crate::plugins::fish::effects::{EffectLink, EffectTrigger};
use crate::plugins::network::messages::{
    HitRequest, HitResultReceived, SpawnBatchesReceived, SpawnRequest,
};
use crate::plugins::projectiles::messages::{LaunchTorpedo, SpawnBulletRequest, TorpedoResolved};

/// Run a system once on the given world, then flush deferred commands.
/// Returns the system output.
pub fn run_system_once<T, Out, Marker>(world: &mut World, system: T) -> Out
where
    T: IntoSystem<(), Out, Marker>,
{
    let out = world.run_system_once(system).expect("system run failed");
    world.flush();
    out
}

/// Register backing storage for every gameplay message, so any system can run in a bare `World`.
pub fn init_messages(world: &mut World) {
    world.init_resource::<Messages<FishCommand>>();
    world.init_resource::<Messages<FishReturned>>();
    world.init_resource::<Messages<EffectTrigger>>();
    world.init_resource::<Messages<EffectLink>>();
    world.init_resource::<Messages<HitRequest>>();
    world.init_resource::<Messages<HitResultReceived>>();
    world.init_resource::<Messages<SpawnBatchesReceived>>();
    world.init_resource::<Messages<SpawnRequest>>();
    world.init_resource::<Messages<SpawnBulletRequest>>();
    world.init_resource::<Messages<LaunchTorpedo>>();
    world.init_resource::<Messages<TorpedoResolved>>();
}

/// Drain every message of type `M` currently buffered in the world.
pub fn drain_messages<M: Message>(world: &mut World) -> Vec<M> {
    world.resource_mut::<Messages<M>>().drain().collect()
}

/// Insert a `Time` that reports `dt` seconds since the previous frame.
pub fn set_frame_time(world: &mut World, dt: f32) {
    let mut time = world.get_resource::<Time>().cloned().unwrap_or_default();
    time.advance_by(Duration::from_secs_f32(dt));
    world.insert_resource(time);
}

/// A stable, distinct `Entity` per `index`, for tests that only need identities.
pub fn test_entity(index: u32) -> Entity {
    let mut world = World::new();
    let mut last = world.spawn_empty().id();
    for _ in 0..index {
        last = world.spawn_empty().id();
    }
    last
}
