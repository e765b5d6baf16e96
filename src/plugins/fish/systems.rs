use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::layers::Layer;
use crate::common::rng::ArcadeRng;
use crate::common::tunables::Tunables;
use crate::plugins::paths::PathLibrary;

use super::behavior::{DeathStyle, MovementDriver};
use super::data::{DeathCause, FishData, FishKind, TargetRef};
use super::effects::EffectSequence;
use super::lifecycle::{FishLife, LifePhase};
use super::messages::{FishCommand, FishReturned};
use super::registry::{FishPools, FishRegistry};

#[inline]
pub fn active_fish_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::Fish, [Layer::PlayerBullet])
}

/// Collider "off" without structural changes: empty filters collide with nothing.
#[inline]
pub fn inactive_fish_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::Fish, [] as [Layer; 0])
}

/// Cosmetic state: fades, hit flash, death hop. Never feeds back into gameplay except
/// through `FishLife::notify_fade_complete`.
#[derive(Component, Debug, Clone, Default)]
pub struct FishPresentation {
    pub base_color: Color,
    fade_out: Option<Timer>,
    flash: Option<Timer>,
    hop_origin: Option<Vec2>,
    hop_elapsed: f32,
}

impl FishPresentation {
    pub fn new(base_color: Color) -> Self {
        Self { base_color, ..default() }
    }

    pub fn flash(&mut self, secs: f32) {
        self.flash = Some(Timer::from_seconds(secs, TimerMode::Once));
    }

    #[inline]
    pub fn is_flashing(&self) -> bool {
        self.flash.is_some()
    }
}

pub fn apply_fish_commands(
    tunables: Res<Tunables>,
    mut reader: MessageReader<FishCommand>,
    mut q_fish: Query<(
        &mut FishLife,
        Option<&mut MovementDriver>,
        Option<&EffectSequence>,
        Option<&mut FishPresentation>,
    )>,
) {
    for cmd in reader.read() {
        let target = cmd.target();
        let Ok((mut life, driver, effect, presentation)) = q_fish.get_mut(target.entity) else {
            debug!(?cmd, "fish command for an entity without a lifecycle");
            continue;
        };
        if life.serial() != target.serial {
            debug!(?cmd, current = life.serial(), "fish command for a previous lifetime");
            continue;
        }

        let applied = match *cmd {
            FishCommand::ConfirmKill { cause, .. } => life.confirm_kill(cause),
            FishCommand::Die { cause, .. } => life.die(cause),
            FishCommand::MarkPendingDeath { .. } => life.mark_pending_death(),
            FishCommand::ForceDespawn { cause, .. } => life.force_despawn(cause),
            FishCommand::ExpireCleanup { .. } => {
                if life.ignores_expiry() || effect.is_some_and(EffectSequence::ignores_expiry) {
                    debug!(?target, "expiry ignored while a death sequence runs");
                    false
                } else {
                    life.force_despawn(DeathCause::ServerCleanup)
                }
            }
            FishCommand::TorpedoLaunched { .. } => life.register_incoming_torpedo(),
            FishCommand::TorpedoArrived { .. } => {
                life.unregister_incoming_torpedo();
                life.on_torpedo_impact()
            }
            FishCommand::Escape { speed_multiplier, .. } => {
                let escaped = life.escape();
                if let (true, Some(mut driver)) = (escaped, driver) {
                    driver.escape(speed_multiplier);
                }
                escaped
            }
            FishCommand::SetReward { reward, .. } => {
                life.set_reward(reward);
                true
            }
            FishCommand::DamageFlash { .. } => match presentation {
                Some(mut p) if life.in_scene() => {
                    p.flash(tunables.fish.damage_flash_secs);
                    true
                }
                _ => false,
            },
        };

        if !applied {
            debug!(?cmd, phase = ?life.phase(), "fish command had no effect");
        }
    }
}

pub fn tick_fish_lifecycles(time: Res<Time>, mut q_fish: Query<&mut FishLife>) {
    let dt = time.delta();
    for mut life in &mut q_fish {
        if life.in_scene() {
            life.tick(dt);
        }
    }
}

pub fn advance_fish_movement(
    time: Res<Time>,
    paths: Res<PathLibrary>,
    mut rng: ResMut<ArcadeRng>,
    mut q_fish: Query<(&mut FishLife, &mut MovementDriver, &mut Transform, Option<&mut Sprite>)>,
) {
    let dt = time.delta_secs();
    for (mut life, mut driver, mut tf, sprite) in &mut q_fish {
        if !life.in_scene() || life.movement_frozen() {
            continue;
        }
        let Some(path) = paths.path(driver.path) else {
            warn!(path = ?driver.path, serial = life.serial(), "fish path vanished, despawning");
            life.force_despawn(DeathCause::None);
            continue;
        };

        let distance = driver.advance(dt, &mut rng.0);
        let sample = path.sample(distance);
        tf.translation.x = sample.position.x;
        tf.translation.y = sample.position.y;
        if let Some(mut sprite) = sprite {
            let flip = sample.direction.x < 0.0;
            if sprite.flip_x != flip {
                sprite.flip_x = flip;
            }
        }

        if sample.finished {
            life.on_path_complete();
        }
    }
}

/// Fades, hit flash and death hop. Reports fade completion back to the lifecycle.
pub fn animate_fish_presentation(
    time: Res<Time>,
    tunables: Res<Tunables>,
    mut q_fish: Query<(
        &mut FishLife,
        &mut FishPresentation,
        &DeathStyle,
        &mut Sprite,
        &mut Transform,
    )>,
) {
    let dt = time.delta();
    let t = &tunables.fish;
    for (mut life, mut fx, style, mut sprite, mut tf) in &mut q_fish {
        if !life.in_scene() {
            continue;
        }

        let mut alpha = life.fade_in_fraction();
        match life.phase() {
            LifePhase::Despawning => {
                let fade = fx
                    .fade_out
                    .get_or_insert_with(|| Timer::from_seconds(t.fade_out_secs, TimerMode::Once));
                fade.tick(dt);
                alpha = 1.0 - fade.fraction();
                if fade.is_finished() {
                    let serial = life.serial();
                    life.notify_fade_complete(serial);
                }
            }
            LifePhase::PendingDeath
                if *style == DeathStyle::Hop && !life.pending_visual_death() =>
            {
                let origin = *fx.hop_origin.get_or_insert(tf.translation.truncate());
                fx.hop_elapsed += dt.as_secs_f32();
                let hop = DeathStyle::hop_offset(fx.hop_elapsed, t.hop_death_secs);
                tf.translation.y = origin.y + hop;
            }
            _ => {}
        }

        let mut color = fx.base_color;
        if let Some(flash) = fx.flash.as_mut() {
            flash.tick(dt);
            if flash.is_finished() {
                fx.flash = None;
            } else {
                color = Color::srgb(1.0, 0.35, 0.35);
            }
        }
        sprite.color = color.with_alpha(alpha.clamp(0.0, 1.0));
    }
}

/// Mirror the lifecycle's collider and scene flags onto physics layers and visibility.
pub fn sync_fish_colliders(
    mut q_fish: Query<(&FishLife, &mut CollisionLayers, &mut Visibility), Changed<FishLife>>,
) {
    for (life, mut layers, mut vis) in &mut q_fish {
        let want_layers = if life.collider_enabled() {
            active_fish_layers()
        } else {
            inactive_fish_layers()
        };
        if *layers != want_layers {
            *layers = want_layers;
        }
        let want_vis = if life.in_scene() { Visibility::Visible } else { Visibility::Hidden };
        if *vis != want_vis {
            *vis = want_vis;
        }
    }
}

/// Return commit: the single place fish go back to their pools.
///
/// Invariant for a returned fish: finalized, hidden, collides with nothing, not in the
/// registry, path reservation released, and every lifecycle timer cleared.
pub fn finalize_despawned_fish(
    mut registry: ResMut<FishRegistry>,
    mut pools: ResMut<FishPools>,
    mut paths: ResMut<PathLibrary>,
    mut q_fish: Query<(
        Entity,
        &mut FishLife,
        &FishKind,
        &FishData,
        &MovementDriver,
        &mut FishPresentation,
        &mut Visibility,
        &mut CollisionLayers,
        &Transform,
    )>,
    mut returned: MessageWriter<FishReturned>,
) {
    for (entity, mut life, kind, data, driver, mut fx, mut vis, mut layers, tf) in &mut q_fish {
        if !life.is_ready_to_finalize() {
            continue;
        }
        let Some(done) = life.finalize() else {
            continue;
        };
        let target = TargetRef { entity, serial: done.serial };

        if registry.unregister(target).is_none() {
            warn!(?target, "finalized fish was not in the active set");
        }
        if !pools.release(kind.0, entity) {
            warn!(?target, fish_type = ?kind.0, "finalized fish was not checked out of its pool");
        }
        paths.release(driver.path);

        *vis = Visibility::Hidden;
        *layers = inactive_fish_layers();
        *fx = FishPresentation::new(fx.base_color);

        debug!(?target, variant = %data.variant, cause = ?done.cause, "fish returned to pool");
        returned.write(FishReturned {
            target,
            fish_id: data.fish_id.clone(),
            variant: data.variant.clone(),
            fish_type: data.fish_type,
            cause: done.cause,
            reward: done.reward,
            position: tf.translation.truncate(),
        });
    }
}
