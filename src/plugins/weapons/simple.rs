//! Simple gun: pooled bullets on a fixed interval while the pointer is held.
//!
//! Unlocked, it fires at the pointer. Locked, it fires at the current instance of the
//! locked variant and holds fire while none exists. Hits are reported by the bullets.

use bevy::prelude::*;

use crate::common::tunables::Tunables;
use crate::plugins::input::PointerState;
use crate::plugins::projectiles::messages::SpawnBulletRequest;
use crate::plugins::targeting::{LockResolution, TargetCandidates, WeaponLock};

use super::{relock_at_pointer, GunMount, WeaponKind, WeaponLoadout};

#[derive(Resource, Debug, Default)]
pub struct SimpleGun {
    pub lock: WeaponLock,
    next_fire_at: f32,
}

impl SimpleGun {
    pub fn cancel(&mut self) {
        self.lock.clear();
    }

    /// Claim the next shot if the fire interval allows it at `now`.
    pub fn try_fire(&mut self, now: f32, interval_secs: f32) -> bool {
        if now < self.next_fire_at {
            return false;
        }
        self.next_fire_at = now + interval_secs;
        true
    }
}

pub fn run_simple_gun(
    time: Res<Time>,
    tunables: Res<Tunables>,
    loadout: Res<WeaponLoadout>,
    pointer: Res<PointerState>,
    candidates: Res<TargetCandidates>,
    mut gun: ResMut<SimpleGun>,
    mut mount: ResMut<GunMount>,
    mut bullets: MessageWriter<SpawnBulletRequest>,
) {
    if loadout.weapon != WeaponKind::Simple {
        return;
    }
    let now = time.elapsed_secs();
    let t = &tunables.weapons;

    if loadout.target_lock && pointer.just_pressed {
        relock_at_pointer(&mut gun.lock, &pointer, &candidates, now, |_| true);
    }
    if !pointer.pressed {
        return;
    }

    let aim = if loadout.target_lock && gun.lock.is_locked() {
        match gun.lock.resolve(&candidates, |_| true) {
            LockResolution::Target(c) => Some(c.position),
            LockResolution::Starved | LockResolution::Unlocked => None,
        }
    } else {
        pointer.world
    };
    let Some(aim) = aim else {
        return;
    };
    if !gun.try_fire(now, t.simple_fire_interval_secs) {
        return;
    }

    mount.aim_at(aim);
    let dir = mount.direction();
    bullets.write(SpawnBulletRequest {
        pos: mount.muzzle(t.muzzle_offset),
        vel: dir * t.bullet_speed,
    });
}
