use bevy::prelude::*;

use crate::common::tunables::Tunables;
use crate::plugins::camera::Viewport;
use crate::plugins::fish::lifecycle::FishLife;
use crate::plugins::fish::Hitbox;

use super::components::{Torpedo, TorpedoState};
use super::homing::FlightStep;
use super::messages::TorpedoResolved;

/// Steer every flying torpedo toward where its target is *now*.
pub fn fly_torpedoes(
    time: Res<Time>,
    tunables: Res<Tunables>,
    viewport: Res<Viewport>,
    q_fish: Query<(&FishLife, &Hitbox, &Transform)>,
    mut q: Query<(&mut TorpedoState, &mut Torpedo, &mut Transform), Without<FishLife>>,
    mut resolved: MessageWriter<TorpedoResolved>,
) {
    let dt = time.delta_secs();
    for (mut state, mut torpedo, mut tf) in &mut q {
        if *state != TorpedoState::Flying {
            continue;
        }

        let live = torpedo.flight.target().and_then(|target| {
            let (life, hitbox, fish_tf) = q_fish.get(target.entity).ok()?;
            (life.serial() == target.serial && life.in_scene())
                .then(|| hitbox.center(fish_tf.translation.truncate()))
        });

        let step = torpedo.flight.step(dt, live, viewport.0, &tunables.torpedo);
        let flight = &torpedo.flight;
        tf.translation = flight.position().extend(tf.translation.z);
        tf.rotation = Quat::from_rotation_z(Vec2::Y.angle_to(flight.heading()));
        tf.scale = Vec3::splat(flight.scale());

        if let FlightStep::Impact { at, forced } = step {
            let kind = torpedo.kind;
            if let Some(target) = torpedo.flight.finish() {
                if forced {
                    debug!(?target, "torpedo timed out, forcing impact");
                }
                resolved.write(TorpedoResolved { target, kind, at, forced });
            }
            *state = TorpedoState::PendingReturn;
        }
    }
}
