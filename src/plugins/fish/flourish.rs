//! Short-lived cosmetic sprites: a payout coin where a rewarded fish returned to its pool,
//! and a link between two fish of a chain-lightning sequence. Nothing reads them back.

use bevy::prelude::*;

use crate::common::tunables::Tunables;

use super::effects::EffectLink;
use super::lifecycle::FishLife;
use super::messages::FishReturned;

const PAYOUT_SECS: f32 = 0.8;
const PAYOUT_RISE: f32 = 70.0;
const LINK_WIDTH: f32 = 4.0;

/// Fades out over its timer, drifting up by `rise` units per second, then despawns.
#[derive(Component, Debug, Clone)]
pub struct Flourish {
    timer: Timer,
    rise: f32,
    alpha: f32,
}

impl Flourish {
    pub fn new(secs: f32, rise: f32, alpha: f32) -> Self {
        Self { timer: Timer::from_seconds(secs.max(0.01), TimerMode::Once), rise, alpha }
    }
}

pub fn spawn_payout_flourishes(mut commands: Commands, mut returned: MessageReader<FishReturned>) {
    for ev in returned.read() {
        let Some(reward) = ev.reward else {
            continue;
        };
        let size = 18.0 + (reward.payout.max(1.0).log10() as f32) * 6.0;
        commands.spawn((
            Name::new("PayoutCoin"),
            Flourish::new(PAYOUT_SECS, PAYOUT_RISE, 1.0),
            Sprite {
                color: Color::srgb(1.0, 0.84, 0.1),
                custom_size: Some(Vec2::splat(size)),
                ..default()
            },
            Transform::from_translation(ev.position.extend(6.0)),
        ));
    }
}

pub fn spawn_link_flourishes(
    mut commands: Commands,
    tunables: Res<Tunables>,
    mut links: MessageReader<EffectLink>,
    q_fish: Query<(&FishLife, &Transform)>,
) {
    for link in links.read() {
        let ends = [link.from, link.to].map(|t| {
            q_fish
                .get(t.entity)
                .ok()
                .filter(|(life, _)| life.serial() == t.serial)
                .map(|(_, tf)| tf.translation.truncate())
        });
        let [Some(from), Some(to)] = ends else {
            debug!(?link, "chain link end no longer on screen");
            continue;
        };
        let span = to - from;
        commands.spawn((
            Name::new("ChainLink"),
            Flourish::new(tunables.effects.chain_link_secs, 0.0, 0.9),
            Sprite {
                color: Color::srgba(0.55, 0.8, 1.0, 0.9),
                custom_size: Some(Vec2::new(span.length(), LINK_WIDTH)),
                ..default()
            },
            Transform::from_translation((from + span * 0.5).extend(6.0))
                .with_rotation(Quat::from_rotation_z(span.to_angle())),
        ));
    }
}

pub fn animate_flourishes(
    mut commands: Commands,
    time: Res<Time>,
    mut q: Query<(Entity, &mut Flourish, &mut Sprite, &mut Transform)>,
) {
    for (e, mut flourish, mut sprite, mut tf) in &mut q {
        flourish.timer.tick(time.delta());
        if flourish.timer.is_finished() {
            commands.entity(e).despawn();
            continue;
        }
        tf.translation.y += flourish.rise * time.delta_secs();
        let alpha = flourish.alpha * (1.0 - flourish.timer.fraction());
        sprite.color = sprite.color.with_alpha(alpha);
    }
}
