//! Torpedo launcher: homing torpedoes at one fish, on a refire interval.
//!
//! The hit is reported at launch. A server kill that arrives while the torpedo is still
//! flying waits for the impact (`FishLife::wait_for_torpedo_kill`).

use bevy::prelude::*;

use crate::common::tunables::Tunables;
use crate::plugins::fish::FishRegistry;
use crate::plugins::input::PointerState;
use crate::plugins::network::messages::HitRequest;
use crate::plugins::network::BetSelection;
use crate::plugins::projectiles::messages::{LaunchTorpedo, TorpedoKind};
use crate::plugins::targeting::{Candidate, LockResolution, TargetCandidates, WeaponLock};

use super::{
    backend_id, hover_switch, pick_under_pointer, relock_at_pointer, GunMount, WeaponKind,
    WeaponLoadout,
};

#[derive(Resource, Debug, Default)]
pub struct TorpedoGun {
    pub lock: WeaponLock,
    next_fire_at: f32,
}

#[inline]
fn torpedo_ok(c: &Candidate) -> bool {
    c.torpedo_ok
}

impl TorpedoGun {
    pub fn cancel(&mut self) {
        self.lock.clear();
    }

    pub fn try_fire(&mut self, now: f32, refire_secs: f32) -> bool {
        if now < self.next_fire_at {
            return false;
        }
        self.next_fire_at = now + refire_secs;
        true
    }
}

pub fn run_torpedo_gun(
    time: Res<Time>,
    tunables: Res<Tunables>,
    loadout: Res<WeaponLoadout>,
    pointer: Res<PointerState>,
    candidates: Res<TargetCandidates>,
    registry: Res<FishRegistry>,
    bets: Res<BetSelection>,
    mut gun: ResMut<TorpedoGun>,
    mut mount: ResMut<GunMount>,
    mut launches: MessageWriter<LaunchTorpedo>,
    mut hits: MessageWriter<HitRequest>,
) {
    if loadout.weapon != WeaponKind::Torpedo {
        return;
    }
    let now = time.elapsed_secs();
    let t = &tunables.weapons;

    if loadout.target_lock && pointer.just_pressed {
        relock_at_pointer(&mut gun.lock, &pointer, &candidates, now, torpedo_ok);
    }
    if !pointer.pressed {
        return;
    }

    let target = if loadout.target_lock {
        if !pointer.just_pressed {
            hover_switch(
                &mut gun.lock,
                &pointer,
                &candidates,
                now,
                t.variant_switch_cooldown_secs,
                torpedo_ok,
            );
        }
        match gun.lock.resolve(&candidates, torpedo_ok) {
            LockResolution::Target(c) => Some(c),
            LockResolution::Starved | LockResolution::Unlocked => None,
        }
    } else {
        pick_under_pointer(&pointer, &candidates, torpedo_ok)
    };
    let Some(target) = target else {
        return;
    };
    if !gun.try_fire(now, t.torpedo_refire_secs) {
        return;
    }

    mount.aim_at(target.position);
    launches.write(LaunchTorpedo {
        origin: mount.muzzle(t.muzzle_offset),
        target: target.target,
        target_position: target.position,
        kind: TorpedoKind::Player,
    });
    match backend_id(&registry, target) {
        Some(fish_id) => {
            hits.write(HitRequest {
                bet_index: bets.bet_index(),
                fish_id,
                weapon: WeaponKind::Torpedo,
            });
        }
        None => debug!(target = ?target.target, "torpedo at a local-only fish, nothing to report"),
    }
}
