//! Laser: a continuous beam on one fish.
//!
//! Two pulses run independently while the beam is on a fish:
//! - damage pulse: a `DamageFlash` every `laser_damage_interval_secs`;
//! - hit pulse: a `HitRequest`, but never while an earlier one awaits its result.
//!
//! The awaiting flag clears on the laser hit result (`on_hit_result`) or, if the server
//! never answers, after `laser_hit_timeout_secs`.

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::fish::{FishCommand, FishRegistry, TargetRef};
use crate::plugins::input::PointerState;
use crate::plugins::network::messages::HitRequest;
use crate::plugins::network::BetSelection;
use crate::plugins::targeting::{Candidate, LockResolution, TargetCandidates, WeaponLock};

use super::{
    backend_id, hover_switch, pick_under_pointer, relock_at_pointer, GunMount, WeaponKind,
    WeaponLoadout,
};

const BEAM_WIDTH: f32 = 6.0;

#[derive(Component, Debug, Clone, Copy)]
pub struct LaserBeam;

#[derive(Resource, Debug, Default)]
pub struct LaserGun {
    pub lock: WeaponLock,
    firing: bool,
    beam: Option<TargetRef>,
    awaiting_hit_result: bool,
    awaiting_since: f32,
    next_hit_at: f32,
    next_damage_pulse_at: f32,
}

impl LaserGun {
    #[inline]
    pub fn is_firing(&self) -> bool {
        self.firing
    }

    /// The fish the beam is on this frame.
    #[inline]
    pub fn beam(&self) -> Option<TargetRef> {
        self.beam
    }

    #[inline]
    pub fn awaiting_hit_result(&self) -> bool {
        self.awaiting_hit_result
    }

    /// A hit request went out; no other until its result arrives or times out.
    pub fn report_sent(&mut self, now: f32) {
        self.awaiting_hit_result = true;
        self.awaiting_since = now;
    }

    /// A laser hit result arrived: allow the next report after `interval_secs`.
    pub fn on_hit_result(&mut self, now: f32, interval_secs: f32) {
        self.awaiting_hit_result = false;
        self.next_hit_at = now + interval_secs;
    }

    /// Beam off; lock and firing intent kept.
    pub fn stop_beam(&mut self) {
        self.beam = None;
    }

    pub fn stop_and_clear(&mut self) {
        self.firing = false;
        self.beam = None;
        self.lock.clear();
    }

    pub fn cancel(&mut self) {
        self.stop_and_clear();
    }

    fn expire_stale_report(&mut self, now: f32, timeout_secs: f32) {
        if self.awaiting_hit_result && now - self.awaiting_since >= timeout_secs {
            warn!(
                waited = now - self.awaiting_since,
                "laser hit result never arrived, reporting again"
            );
            self.awaiting_hit_result = false;
        }
    }

    /// Where the beam goes this frame, or `None` to hold it off.
    fn select<'a>(
        &mut self,
        locked_mode: bool,
        pointer: &PointerState,
        candidates: &'a TargetCandidates,
        now: f32,
        switch_cooldown_secs: f32,
    ) -> Option<&'a Candidate> {
        if !locked_mode {
            let picked = pick_under_pointer(pointer, candidates, |_| true);
            if picked.is_none() {
                self.stop_beam();
            }
            return picked;
        }

        if !pointer.just_pressed {
            hover_switch(&mut self.lock, pointer, candidates, now, switch_cooldown_secs, |_| true);
        }
        match self.lock.resolve(candidates, |_| true) {
            LockResolution::Target(c) => Some(c),
            LockResolution::Starved => {
                self.stop_beam();
                None
            }
            LockResolution::Unlocked => {
                self.stop_and_clear();
                None
            }
        }
    }
}

pub fn run_laser(
    time: Res<Time>,
    tunables: Res<Tunables>,
    loadout: Res<WeaponLoadout>,
    pointer: Res<PointerState>,
    candidates: Res<TargetCandidates>,
    registry: Res<FishRegistry>,
    bets: Res<BetSelection>,
    mut laser: ResMut<LaserGun>,
    mut mount: ResMut<GunMount>,
    mut hits: MessageWriter<HitRequest>,
    mut fish_out: MessageWriter<FishCommand>,
) {
    if loadout.weapon != WeaponKind::Laser {
        return;
    }
    let now = time.elapsed_secs();
    let t = &tunables.weapons;
    laser.expire_stale_report(now, t.laser_hit_timeout_secs);

    if loadout.target_lock {
        if pointer.just_pressed {
            let held = relock_at_pointer(&mut laser.lock, &pointer, &candidates, now, |_| true);
            if held {
                laser.firing = true;
            } else {
                laser.stop_and_clear();
            }
        }
    } else {
        laser.firing = pointer.pressed;
    }
    if !pointer.pressed {
        laser.firing = false;
        laser.stop_beam();
    }
    if !laser.firing {
        return;
    }

    let Some(target) = laser.select(
        loadout.target_lock,
        &pointer,
        &candidates,
        now,
        t.variant_switch_cooldown_secs,
    ) else {
        return;
    };

    laser.beam = Some(target.target);
    mount.aim_at(target.position);

    if now >= laser.next_damage_pulse_at {
        fish_out.write(FishCommand::DamageFlash { target: target.target });
        laser.next_damage_pulse_at = now + t.laser_damage_interval_secs;
    }

    if laser.awaiting_hit_result || now < laser.next_hit_at {
        return;
    }
    let Some(fish_id) = backend_id(&registry, target) else {
        debug!(target = ?target.target, "laser on a local-only fish, nothing to report");
        return;
    };
    laser.report_sent(now);
    hits.write(HitRequest { bet_index: bets.bet_index(), fish_id, weapon: WeaponKind::Laser });
}

pub fn spawn_laser_beam(mut commands: Commands) {
    commands.spawn((
        Name::new("LaserBeam"),
        LaserBeam,
        Sprite {
            color: Color::srgba(1.0, 0.3, 0.9, 0.85),
            custom_size: Some(Vec2::new(1.0, BEAM_WIDTH)),
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, 4.0),
        Visibility::Hidden,
        DespawnOnExit(GameState::InGame),
    ));
}

/// Stretch the beam sprite from the muzzle to the fish the beam is on.
pub fn draw_laser_beam(
    tunables: Res<Tunables>,
    laser: Res<LaserGun>,
    mount: Res<GunMount>,
    candidates: Res<TargetCandidates>,
    mut q_beam: Query<(&mut Transform, &mut Sprite, &mut Visibility), With<LaserBeam>>,
) {
    let end = laser.beam.and_then(|t| candidates.get(t)).map(|c| c.position);
    let start = mount.muzzle(tunables.weapons.muzzle_offset);

    for (mut tf, mut sprite, mut vis) in &mut q_beam {
        let Some(end) = end else {
            if *vis != Visibility::Hidden {
                *vis = Visibility::Hidden;
            }
            continue;
        };
        let span = end - start;
        tf.translation = (start + span * 0.5).extend(4.0);
        tf.rotation = Quat::from_rotation_z(span.to_angle());
        sprite.custom_size = Some(Vec2::new(span.length(), BEAM_WIDTH));
        *vis = Visibility::Visible;
    }
}
