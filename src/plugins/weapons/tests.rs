//! Weapon tests. Every test drives `PointerState` and the `TargetCandidates` snapshot
//! directly, then runs one weapon system per frame.

use std::f32::consts::FRAC_PI_2;

use bevy::ecs::message::Messages;
use bevy::prelude::*;

use crate::common::test_utils::{
    drain_messages, init_messages, run_system_once, set_frame_time, test_entity,
};
use crate::common::tunables::Tunables;
use crate::plugins::fish::{ActiveFish, FishCommand, FishRegistry, FishType, TargetRef};
use crate::plugins::input::PointerState;
use crate::plugins::network::messages::HitRequest;
use crate::plugins::network::BetSelection;
use crate::plugins::projectiles::messages::{LaunchTorpedo, SpawnBulletRequest, TorpedoKind};
use crate::plugins::targeting::{Candidate, TargetCandidates};

use super::*;

// --------------------------------------------------------------------------------------
// Helpers
// --------------------------------------------------------------------------------------

fn weapons_world(weapon: WeaponKind, target_lock: bool) -> World {
    let mut world = World::new();
    world.insert_resource(Tunables::default());
    world.insert_resource(WeaponLoadout { weapon, target_lock });
    world.insert_resource(GunMount::new(Vec2::new(0.0, -480.0)));
    world.insert_resource(BetSelection { bets: vec![0.1, 1.0, 10.0], index: 2 });
    world.init_resource::<PointerState>();
    world.init_resource::<TargetCandidates>();
    world.init_resource::<FishRegistry>();
    world.init_resource::<SimpleGun>();
    world.init_resource::<LaserGun>();
    world.init_resource::<TorpedoGun>();
    world.init_resource::<Messages<SwitchWeapon>>();
    world.init_resource::<Messages<ToggleTargetLock>>();
    init_messages(&mut world);
    set_frame_time(&mut world, 0.0);
    world
}

fn fish(index: u32, variant: &str, at: Vec2) -> Candidate {
    Candidate {
        target: TargetRef { entity: test_entity(index), serial: index as u64 },
        variant: variant.to_owned(),
        fish_type: FishType::Normal,
        position: at,
        bounds: Rect::from_center_size(at, Vec2::splat(40.0)),
        pickable: true,
        valid: true,
        torpedo_ok: true,
    }
}

/// Publish a frame's snapshot and register every fish under a backend id `f-<serial>`.
fn show(world: &mut World, list: Vec<Candidate>) {
    {
        let mut registry = world.resource_mut::<FishRegistry>();
        for c in &list {
            if !registry.contains(c.target) {
                registry.register(ActiveFish {
                    target: c.target,
                    fish_id: Some(format!("f-{}", c.target.serial)),
                    variant: c.variant.clone(),
                    fish_type: c.fish_type,
                });
            }
        }
    }
    world.insert_resource(TargetCandidates::from_candidates(list));
}

fn pointer(world: &mut World, at: Option<Vec2>, pressed: bool, just_pressed: bool) {
    world.insert_resource(PointerState { world: at, pressed, just_pressed, just_released: false });
}

// --------------------------------------------------------------------------------------
// Gun mount
// --------------------------------------------------------------------------------------

#[test]
fn mount_turns_toward_the_point_and_clamps_below_the_horizon() {
    let mut mount = GunMount::new(Vec2::ZERO);

    mount.aim_at(Vec2::new(0.0, 100.0));
    assert!(mount.direction().abs_diff_eq(Vec2::Y, 1e-5));

    mount.aim_at(Vec2::new(100.0, 100.0));
    assert!(mount.direction().abs_diff_eq(Vec2::new(1.0, 1.0).normalize(), 1e-5));

    mount.aim_at(Vec2::new(100.0, -50.0));
    assert!((mount.angle() + FRAC_PI_2).abs() < 1e-5);
}

#[test]
fn wire_names_round_trip_and_accept_both_laser_spellings() {
    for weapon in WeaponKind::ALL {
        assert_eq!(WeaponKind::from_wire(weapon.wire_name()), Some(weapon));
    }
    assert_eq!(WeaponKind::from_wire("Laser"), Some(WeaponKind::Laser));
    assert_eq!(WeaponKind::from_wire("cannon"), None);
}

// --------------------------------------------------------------------------------------
// Simple gun
// --------------------------------------------------------------------------------------

#[test]
fn simple_gun_fires_at_the_pointer_on_its_interval() {
    let mut world = weapons_world(WeaponKind::Simple, false);
    pointer(&mut world, Some(Vec2::new(0.0, 200.0)), true, true);

    run_system_once(&mut world, simple::run_simple_gun);
    run_system_once(&mut world, simple::run_simple_gun);

    let shots = drain_messages::<SpawnBulletRequest>(&mut world);
    assert_eq!(shots.len(), 1);
    let t = Tunables::default();
    assert!(shots[0].vel.abs_diff_eq(Vec2::Y * t.weapons.bullet_speed, 1e-2));
    assert!(shots[0].pos.abs_diff_eq(Vec2::new(0.0, -480.0 + t.weapons.muzzle_offset), 1e-3));

    set_frame_time(&mut world, t.weapons.simple_fire_interval_secs + 0.01);
    run_system_once(&mut world, simple::run_simple_gun);
    assert_eq!(drain_messages::<SpawnBulletRequest>(&mut world).len(), 1);
}

#[test]
fn simple_gun_is_silent_while_the_pointer_is_up() {
    let mut world = weapons_world(WeaponKind::Simple, false);
    pointer(&mut world, Some(Vec2::new(0.0, 200.0)), false, false);

    run_system_once(&mut world, simple::run_simple_gun);

    assert!(drain_messages::<SpawnBulletRequest>(&mut world).is_empty());
}

#[test]
fn locked_simple_gun_holds_fire_while_the_variant_is_missing() {
    let mut world = weapons_world(WeaponKind::Simple, true);
    let first = fish(1, "angelfish", Vec2::new(-100.0, 0.0));
    show(&mut world, vec![first.clone()]);
    pointer(&mut world, Some(first.position), true, true);
    run_system_once(&mut world, simple::run_simple_gun);
    assert_eq!(drain_messages::<SpawnBulletRequest>(&mut world).len(), 1);

    // The angelfish died; only another variant is on screen.
    show(&mut world, vec![fish(2, "pufferfish", Vec2::new(50.0, 0.0))]);
    pointer(&mut world, Some(Vec2::new(50.0, 0.0)), true, false);
    set_frame_time(&mut world, 1.0);
    run_system_once(&mut world, simple::run_simple_gun);
    assert!(drain_messages::<SpawnBulletRequest>(&mut world).is_empty());
    assert_eq!(world.resource::<SimpleGun>().lock.locked_variant(), Some("angelfish"));

    // A new angelfish shows up: fire resumes at it.
    let second = fish(3, "angelfish", Vec2::new(200.0, 100.0));
    show(&mut world, vec![second.clone()]);
    set_frame_time(&mut world, 1.0);
    run_system_once(&mut world, simple::run_simple_gun);
    assert_eq!(drain_messages::<SpawnBulletRequest>(&mut world).len(), 1);
    assert_eq!(world.resource::<SimpleGun>().lock.current(), Some(second.target));
}

// --------------------------------------------------------------------------------------
// Laser
// --------------------------------------------------------------------------------------

#[test]
fn laser_reports_one_hit_at_a_time() {
    let mut world = weapons_world(WeaponKind::Laser, false);
    let target = fish(1, "lionfish", Vec2::new(0.0, 100.0));
    show(&mut world, vec![target.clone()]);
    pointer(&mut world, Some(target.position), true, true);

    run_system_once(&mut world, laser::run_laser);
    assert_eq!(world.resource::<LaserGun>().beam(), Some(target.target));
    assert_eq!(
        drain_messages::<HitRequest>(&mut world),
        vec![HitRequest { bet_index: 2, fish_id: "f-1".into(), weapon: WeaponKind::Laser }]
    );
    assert_eq!(
        drain_messages::<FishCommand>(&mut world),
        vec![FishCommand::DamageFlash { target: target.target }]
    );

    // Still awaiting the first verdict: damage pulses continue, reports do not.
    pointer(&mut world, Some(target.position), true, false);
    set_frame_time(&mut world, 0.5);
    run_system_once(&mut world, laser::run_laser);
    assert!(drain_messages::<HitRequest>(&mut world).is_empty());
    assert_eq!(drain_messages::<FishCommand>(&mut world).len(), 1);

    let now = world.resource::<Time>().elapsed_secs();
    let interval = Tunables::default().weapons.laser_hit_interval_secs;
    world.resource_mut::<LaserGun>().on_hit_result(now, interval);
    set_frame_time(&mut world, interval + 0.01);
    run_system_once(&mut world, laser::run_laser);
    assert_eq!(drain_messages::<HitRequest>(&mut world).len(), 1);
}

#[test]
fn unanswered_laser_report_times_out() {
    let mut world = weapons_world(WeaponKind::Laser, false);
    let target = fish(1, "lionfish", Vec2::new(0.0, 100.0));
    show(&mut world, vec![target.clone()]);
    pointer(&mut world, Some(target.position), true, true);
    run_system_once(&mut world, laser::run_laser);
    assert_eq!(drain_messages::<HitRequest>(&mut world).len(), 1);

    pointer(&mut world, Some(target.position), true, false);
    set_frame_time(&mut world, Tunables::default().weapons.laser_hit_timeout_secs + 0.1);
    run_system_once(&mut world, laser::run_laser);
    assert_eq!(drain_messages::<HitRequest>(&mut world).len(), 1);
}

#[test]
fn laser_beam_drops_off_empty_water_and_on_release() {
    let mut world = weapons_world(WeaponKind::Laser, false);
    let target = fish(1, "lionfish", Vec2::new(0.0, 100.0));
    show(&mut world, vec![target.clone()]);

    pointer(&mut world, Some(Vec2::new(400.0, 400.0)), true, true);
    run_system_once(&mut world, laser::run_laser);
    assert_eq!(world.resource::<LaserGun>().beam(), None);
    assert!(drain_messages::<HitRequest>(&mut world).is_empty());

    pointer(&mut world, Some(target.position), true, false);
    run_system_once(&mut world, laser::run_laser);
    assert_eq!(world.resource::<LaserGun>().beam(), Some(target.target));

    pointer(&mut world, Some(target.position), false, false);
    run_system_once(&mut world, laser::run_laser);
    let laser = world.resource::<LaserGun>();
    assert_eq!(laser.beam(), None);
    assert!(!laser.is_firing());
}

#[test]
fn beam_sprite_spans_muzzle_to_fish_and_hides_with_the_beam() {
    let mut world = weapons_world(WeaponKind::Laser, false);
    let beam = world
        .spawn((laser::LaserBeam, Sprite::default(), Transform::default(), Visibility::Hidden))
        .id();
    let target = fish(1, "lionfish", Vec2::new(0.0, 100.0));
    show(&mut world, vec![target.clone()]);
    pointer(&mut world, Some(target.position), true, true);

    run_system_once(&mut world, laser::run_laser);
    run_system_once(&mut world, laser::draw_laser_beam);

    let offset = Tunables::default().weapons.muzzle_offset;
    let muzzle = world.resource::<GunMount>().muzzle(offset);
    let length = world
        .get::<Sprite>(beam)
        .and_then(|s| s.custom_size)
        .map(|size| size.x)
        .expect("beam sized");
    assert!((length - muzzle.distance(target.position)).abs() < 1e-3);
    assert_eq!(world.get::<Visibility>(beam), Some(&Visibility::Visible));
    let mid = world.get::<Transform>(beam).map(|tf| tf.translation.truncate());
    assert!(mid.is_some_and(|m| m.abs_diff_eq((muzzle + target.position) * 0.5, 1e-3)));

    pointer(&mut world, Some(target.position), false, false);
    run_system_once(&mut world, laser::run_laser);
    run_system_once(&mut world, laser::draw_laser_beam);
    assert_eq!(world.get::<Visibility>(beam), Some(&Visibility::Hidden));
}

#[test]
fn locked_laser_click_on_empty_water_clears_the_lock() {
    let mut world = weapons_world(WeaponKind::Laser, true);
    let target = fish(1, "lionfish", Vec2::new(0.0, 100.0));
    show(&mut world, vec![target.clone()]);
    pointer(&mut world, Some(target.position), true, true);
    run_system_once(&mut world, laser::run_laser);
    assert_eq!(world.resource::<LaserGun>().lock.locked_variant(), Some("lionfish"));

    pointer(&mut world, Some(Vec2::new(-400.0, 300.0)), true, true);
    run_system_once(&mut world, laser::run_laser);

    let laser = world.resource::<LaserGun>();
    assert!(!laser.lock.is_locked());
    assert_eq!(laser.beam(), None);
}

// --------------------------------------------------------------------------------------
// Torpedo
// --------------------------------------------------------------------------------------

#[test]
fn torpedo_launches_at_the_fish_under_the_pointer_and_reports_the_hit() {
    let mut world = weapons_world(WeaponKind::Torpedo, false);
    let target = fish(4, "tuna", Vec2::new(120.0, 150.0));
    show(&mut world, vec![target.clone()]);
    pointer(&mut world, Some(target.position), true, true);

    run_system_once(&mut world, torpedo::run_torpedo_gun);
    run_system_once(&mut world, torpedo::run_torpedo_gun);

    let launches = drain_messages::<LaunchTorpedo>(&mut world);
    assert_eq!(launches.len(), 1, "refire interval blocks the second launch");
    assert_eq!(launches[0].target, target.target);
    assert_eq!(launches[0].target_position, target.position);
    assert_eq!(launches[0].kind, TorpedoKind::Player);
    assert_eq!(
        drain_messages::<HitRequest>(&mut world),
        vec![HitRequest { bet_index: 2, fish_id: "f-4".into(), weapon: WeaponKind::Torpedo }]
    );
}

#[test]
fn torpedo_skips_fish_that_veto_torpedoes() {
    let mut world = weapons_world(WeaponKind::Torpedo, false);
    let mut escaping = fish(4, "crab", Vec2::new(120.0, 150.0));
    escaping.torpedo_ok = false;
    show(&mut world, vec![escaping.clone()]);
    pointer(&mut world, Some(escaping.position), true, true);

    run_system_once(&mut world, torpedo::run_torpedo_gun);

    assert!(drain_messages::<LaunchTorpedo>(&mut world).is_empty());
    assert!(drain_messages::<HitRequest>(&mut world).is_empty());
}

#[test]
fn held_torpedo_lock_switches_variant_only_after_the_cooldown() {
    let mut world = weapons_world(WeaponKind::Torpedo, true);
    let tuna = fish(1, "tuna", Vec2::new(-150.0, 100.0));
    let eel = fish(2, "eel", Vec2::new(150.0, 100.0));
    show(&mut world, vec![tuna.clone(), eel.clone()]);

    pointer(&mut world, Some(tuna.position), true, true);
    run_system_once(&mut world, torpedo::run_torpedo_gun);
    assert_eq!(world.resource::<TorpedoGun>().lock.locked_variant(), Some("tuna"));

    pointer(&mut world, Some(eel.position), true, false);
    set_frame_time(&mut world, 0.1);
    run_system_once(&mut world, torpedo::run_torpedo_gun);
    assert_eq!(world.resource::<TorpedoGun>().lock.locked_variant(), Some("tuna"));

    let cooldown = Tunables::default().weapons.variant_switch_cooldown_secs;
    set_frame_time(&mut world, cooldown);
    run_system_once(&mut world, torpedo::run_torpedo_gun);
    let gun = world.resource::<TorpedoGun>();
    assert_eq!(gun.lock.locked_variant(), Some("eel"));
    assert_eq!(gun.lock.current(), Some(eel.target));
}

// --------------------------------------------------------------------------------------
// Loadout
// --------------------------------------------------------------------------------------

#[test]
fn switching_weapons_cancels_every_lock() {
    let mut world = weapons_world(WeaponKind::Torpedo, true);
    let tuna = fish(1, "tuna", Vec2::new(-150.0, 100.0));
    show(&mut world, vec![tuna.clone()]);
    pointer(&mut world, Some(tuna.position), true, true);
    run_system_once(&mut world, torpedo::run_torpedo_gun);
    assert!(world.resource::<TorpedoGun>().lock.is_locked());

    world.write_message(SwitchWeapon(WeaponKind::Laser));
    run_system_once(&mut world, apply_loadout_changes);

    assert_eq!(world.resource::<WeaponLoadout>().weapon, WeaponKind::Laser);
    assert!(world.resource::<WeaponLoadout>().target_lock);
    assert!(!world.resource::<TorpedoGun>().lock.is_locked());
}

#[test]
fn toggling_target_lock_flips_the_mode() {
    let mut world = weapons_world(WeaponKind::Simple, false);

    world.write_message(ToggleTargetLock);
    run_system_once(&mut world, apply_loadout_changes);

    assert!(world.resource::<WeaponLoadout>().target_lock);
}
