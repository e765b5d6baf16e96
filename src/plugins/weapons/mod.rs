//! Weapons: simple gun, laser and torpedo launcher.
//!
//! ```text
//! Ingest   SwitchWeapon / ToggleTargetLock -> WeaponLoadout (switching cancels)
//! Aim      active weapon reads PointerState + TargetCandidates
//!            simple  -> SpawnBulletRequest
//!            laser   -> FishCommand::DamageFlash pulses, HitRequest (one outstanding)
//!            torpedo -> LaunchTorpedo + HitRequest
//! ```
//!
//! Two addressing modes, shared by every weapon:
//! - unlocked: shoot the valid fish under the pointer, re-picked every frame;
//! - locked: pointer-down locks the variant of the fish under it, and the weapon keeps
//!   firing at live instances of that variant (see `WeaponLock`).
//!
//! Each weapon is its own resource; nothing here is global.

pub mod laser;
pub mod simple;
pub mod torpedo;

use std::f32::consts::FRAC_PI_2;

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::schedule::ArcadeSet;
use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::fish::{DeathCause, FishRegistry};
use crate::plugins::input::{weapon_hotkeys, PointerState};
use crate::plugins::targeting::{Candidate, TargetCandidates, WeaponLock};

pub use laser::LaserGun;
pub use simple::SimpleGun;
pub use torpedo::TorpedoGun;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WeaponKind {
    #[default]
    Simple,
    Laser,
    Torpedo,
}

impl WeaponKind {
    pub const ALL: [Self; 3] = [Self::Simple, Self::Laser, Self::Torpedo];

    /// Name the server uses in hit requests and results.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Laser => "lazer",
            Self::Torpedo => "torpedo",
        }
    }

    pub fn from_wire(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "simple" => Some(Self::Simple),
            "lazer" | "laser" => Some(Self::Laser),
            "torpedo" => Some(Self::Torpedo),
            _ => None,
        }
    }

    pub fn death_cause(self) -> DeathCause {
        match self {
            Self::Simple => DeathCause::Bullet,
            Self::Laser => DeathCause::Laser,
            Self::Torpedo => DeathCause::Torpedo,
        }
    }
}

#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeaponLoadout {
    pub weapon: WeaponKind,
    pub target_lock: bool,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchWeapon(pub WeaponKind);

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleTargetLock;

/// The turret at the bottom of the arena. Angle 0 points straight up.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct GunMount {
    pub base: Vec2,
    angle: f32,
}

impl GunMount {
    pub fn new(base: Vec2) -> Self {
        Self { base, angle: 0.0 }
    }

    #[inline]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Turn toward `point`, clamped to ±90° from straight up.
    pub fn aim_at(&mut self, point: Vec2) {
        let d = point - self.base;
        if d.length_squared() < 1e-6 {
            return;
        }
        self.angle = (-d.x).atan2(d.y).clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    #[inline]
    pub fn direction(&self) -> Vec2 {
        Vec2::from_angle(self.angle + FRAC_PI_2)
    }

    #[inline]
    pub fn muzzle(&self, offset: f32) -> Vec2 {
        self.base + self.direction() * offset
    }
}

#[derive(Component)]
pub struct GunBarrel;

/// The valid fish under the pointer that `accept` allows, if any.
pub fn pick_under_pointer<'a>(
    pointer: &PointerState,
    candidates: &'a TargetCandidates,
    accept: impl Fn(&Candidate) -> bool,
) -> Option<&'a Candidate> {
    let at = pointer.world?;
    candidates.pick_at(at).filter(|c| c.valid && accept(c))
}

/// Pointer-down in locked mode: drop the old lock and lock whatever valid fish is under
/// the pointer. Returns whether a lock is held afterwards.
pub fn relock_at_pointer(
    lock: &mut WeaponLock,
    pointer: &PointerState,
    candidates: &TargetCandidates,
    now: f32,
    accept: impl Fn(&Candidate) -> bool,
) -> bool {
    lock.clear();
    match pick_under_pointer(pointer, candidates, accept) {
        Some(c) => {
            lock.lock(c, now);
            true
        }
        None => false,
    }
}

/// While held: move the lock onto a fish of another variant under the pointer, once the
/// switch cooldown allows it.
pub fn hover_switch(
    lock: &mut WeaponLock,
    pointer: &PointerState,
    candidates: &TargetCandidates,
    now: f32,
    cooldown_secs: f32,
    accept: impl Fn(&Candidate) -> bool,
) -> bool {
    if !lock.is_locked() {
        return false;
    }
    match pick_under_pointer(pointer, candidates, accept) {
        Some(c) => lock.try_switch_variant(c, now, cooldown_secs),
        None => false,
    }
}

/// Backend id of a live fish. Local-only fish have none and are never reported.
pub(crate) fn backend_id(registry: &FishRegistry, candidate: &Candidate) -> Option<String> {
    registry.get(candidate.target).and_then(|f| f.fish_id.clone())
}

pub fn apply_loadout_changes(
    mut switches: MessageReader<SwitchWeapon>,
    mut toggles: MessageReader<ToggleTargetLock>,
    mut loadout: ResMut<WeaponLoadout>,
    mut simple: ResMut<SimpleGun>,
    mut laser: ResMut<LaserGun>,
    mut torpedo: ResMut<TorpedoGun>,
) {
    let mut changed = false;
    for SwitchWeapon(weapon) in switches.read() {
        if loadout.weapon != *weapon {
            loadout.weapon = *weapon;
            changed = true;
        }
    }
    for _ in toggles.read() {
        loadout.target_lock = !loadout.target_lock;
        changed = true;
    }
    if !changed {
        return;
    }

    simple.cancel();
    laser.cancel();
    torpedo.cancel();
    info!(weapon = ?loadout.weapon, target_lock = loadout.target_lock, "loadout changed");
}

fn spawn_gun(mut commands: Commands, mount: Res<GunMount>) {
    commands.spawn((
        Name::new("GunBarrel"),
        GunBarrel,
        Sprite {
            color: Color::srgb(0.8, 0.8, 0.85),
            custom_size: Some(Vec2::new(14.0, 40.0)),
            ..default()
        },
        Transform::from_translation(mount.base.extend(5.0)),
        DespawnOnExit(GameState::InGame),
    ));
}

fn sync_gun_barrel(mount: Res<GunMount>, mut q_barrel: Query<&mut Transform, With<GunBarrel>>) {
    if !mount.is_changed() {
        return;
    }
    for mut tf in &mut q_barrel {
        tf.rotation = Quat::from_rotation_z(mount.angle());
    }
}

pub fn plugin(app: &mut App) {
    let tunables = app.world().resource::<Tunables>();
    let base = Vec2::new(0.0, -tunables.arena.half_height + tunables.weapons.mount_height);

    app.insert_resource(GunMount::new(base))
        .init_resource::<WeaponLoadout>()
        .init_resource::<SimpleGun>()
        .init_resource::<LaserGun>()
        .init_resource::<TorpedoGun>()
        .add_message::<SwitchWeapon>()
        .add_message::<ToggleTargetLock>();

    app.add_systems(OnEnter(GameState::InGame), (spawn_gun, laser::spawn_laser_beam))
        .add_systems(
            Update,
            apply_loadout_changes.in_set(ArcadeSet::Ingest).after(weapon_hotkeys),
        )
        .add_systems(
            Update,
            (
                simple::run_simple_gun,
                laser::run_laser,
                torpedo::run_torpedo_gun,
                sync_gun_barrel,
                laser::draw_laser_beam,
            )
                .chain()
                .in_set(ArcadeSet::Aim),
        );
}

#[cfg(test)]
mod tests;
