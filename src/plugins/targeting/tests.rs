use super::*;

use crate::common::test_utils::test_entity;
use crate::common::tunables::FishTunables;
use crate::plugins::fish::lifecycle::LifePhase;

fn candidate(index: u32, serial: u64, variant: &str, x: f32, valid: bool) -> Candidate {
    let position = Vec2::new(x, 0.0);
    Candidate {
        target: TargetRef { entity: test_entity(index), serial },
        variant: variant.to_owned(),
        fish_type: FishType::Golden,
        position,
        bounds: Rect::from_center_size(position, Vec2::splat(20.0)),
        pickable: valid,
        valid,
        torpedo_ok: valid,
    }
}

fn snapshot(list: Vec<Candidate>) -> TargetCandidates {
    TargetCandidates::from_candidates(list)
}

#[test]
fn equidistant_relock_prefers_the_earlier_spawn() {
    let mut lock = WeaponLock::default();
    lock.lock(&candidate(1, 1, "golden_fish", 0.0, true), 0.0);

    let frame = snapshot(vec![
        candidate(1, 1, "golden_fish", 0.0, false),
        candidate(2, 2, "golden_fish", 8.0, true),
        candidate(3, 3, "golden_fish", -8.0, true),
    ]);
    let LockResolution::Target(c) = lock.resolve(&frame, |_| true) else {
        panic!("lock should re-acquire");
    };
    assert_eq!(c.target.serial, 2);
}

#[test]
fn relocks_to_nearest_same_variant_after_target_dies() {
    let first = candidate(1, 1, "golden_fish", 0.0, true);
    let mut lock = WeaponLock::default();
    lock.lock(&first, 0.0);

    // First target confirmed dead this frame; two others at distance 10 and 5.
    let frame = snapshot(vec![
        candidate(1, 1, "golden_fish", 0.0, false),
        candidate(2, 2, "golden_fish", 10.0, true),
        candidate(3, 3, "golden_fish", -5.0, true),
        candidate(4, 4, "orange_fish", 1.0, true),
    ]);

    let LockResolution::Target(c) = lock.resolve(&frame, |_| true) else {
        panic!("lock should re-acquire");
    };
    assert_eq!(c.target.serial, 3);
    assert_eq!(lock.current().map(|t| t.serial), Some(3));
    assert_eq!(lock.locked_variant(), Some("golden_fish"));
}

#[test]
fn relock_uses_position_where_the_target_was_last_seen() {
    let mut lock = WeaponLock::default();
    lock.lock(&candidate(1, 1, "golden_fish", 0.0, true), 0.0);

    // The target swam to x=100 before dying.
    let moved = snapshot(vec![candidate(1, 1, "golden_fish", 100.0, true)]);
    assert!(matches!(lock.resolve(&moved, |_| true), LockResolution::Target(_)));

    let frame = snapshot(vec![
        candidate(2, 2, "golden_fish", 10.0, true),
        candidate(3, 3, "golden_fish", 90.0, true),
    ]);
    let LockResolution::Target(c) = lock.resolve(&frame, |_| true) else {
        panic!("lock should re-acquire");
    };
    assert_eq!(c.target.serial, 3);
}

#[test]
fn starved_lock_keeps_variant_and_stops() {
    let mut lock = WeaponLock::default();
    lock.lock(&candidate(1, 1, "golden_fish", 0.0, true), 0.0);

    let frame = snapshot(vec![candidate(2, 2, "orange_fish", 3.0, true)]);
    assert!(matches!(lock.resolve(&frame, |_| true), LockResolution::Starved));
    assert_eq!(lock.locked_variant(), Some("golden_fish"));
    assert_eq!(lock.current(), None);

    // A new golden fish shows up: the lock picks it up without a click.
    let later = snapshot(vec![candidate(5, 9, "golden_fish", 40.0, true)]);
    let LockResolution::Target(c) = lock.resolve(&later, |_| true) else {
        panic!("lock should pick up the new fish");
    };
    assert_eq!(c.target.serial, 9);
}

#[test]
fn current_target_is_kept_while_valid_even_if_another_is_closer() {
    let mut lock = WeaponLock::default();
    lock.lock(&candidate(1, 1, "golden_fish", 50.0, true), 0.0);

    let frame = snapshot(vec![
        candidate(2, 2, "golden_fish", 49.0, true),
        candidate(1, 1, "golden_fish", 60.0, true),
    ]);
    let LockResolution::Target(c) = lock.resolve(&frame, |_| true) else {
        panic!("target is valid");
    };
    assert_eq!(c.target.serial, 1);
    assert_eq!(lock.last_known_position(), Some(Vec2::new(60.0, 0.0)));
}

#[test]
fn locked_target_always_matches_locked_variant() {
    let mut lock = WeaponLock::default();
    lock.lock(&candidate(1, 1, "golden_fish", 0.0, true), 0.0);

    let frames = [
        vec![candidate(2, 2, "orange_fish", 0.0, true), candidate(3, 3, "golden_fish", 30.0, true)],
        vec![candidate(3, 3, "golden_fish", 30.0, false), candidate(4, 4, "lion_fish", 1.0, true)],
        vec![candidate(5, 5, "golden_fish", 8.0, true)],
    ];
    for list in frames {
        let frame = snapshot(list);
        if let LockResolution::Target(c) = lock.resolve(&frame, |_| true) {
            assert_eq!(c.variant, "golden_fish");
        }
        if let Some(current) = lock.current() {
            assert_eq!(frame.get(current).map(|c| c.variant.as_str()), Some("golden_fish"));
        }
    }
}

#[test]
fn accept_filter_vetoes_candidates() {
    let mut lock = WeaponLock::default();
    lock.lock(&candidate(1, 1, "golden_fish", 0.0, true), 0.0);

    let frame = snapshot(vec![candidate(1, 1, "golden_fish", 0.0, true)]);
    assert!(matches!(
        lock.resolve(&frame, |c| c.torpedo_ok && c.target.serial != 1),
        LockResolution::Starved
    ));
}

#[test]
fn variant_switch_respects_cooldown() {
    let mut lock = WeaponLock::default();
    lock.lock(&candidate(1, 1, "golden_fish", 0.0, true), 1.0);

    let other = candidate(2, 2, "lion_fish", 5.0, true);
    assert!(!lock.try_switch_variant(&other, 1.2, 0.5));
    assert_eq!(lock.locked_variant(), Some("golden_fish"));

    assert!(lock.try_switch_variant(&other, 1.6, 0.5));
    assert_eq!(lock.locked_variant(), Some("lion_fish"));

    // Same variant is never a switch.
    assert!(!lock.try_switch_variant(&candidate(3, 3, "lion_fish", 9.0, true), 9.0, 0.5));
}

#[test]
fn pick_at_prefers_topmost_pickable() {
    let frame = snapshot(vec![
        candidate(1, 1, "golden_fish", 0.0, true),
        candidate(2, 2, "orange_fish", 5.0, true),
        candidate(3, 3, "lion_fish", 2.0, false),
    ]);
    let hit = frame.pick_at(Vec2::new(3.0, 0.0)).unwrap();
    assert_eq!(hit.target.serial, 2);
    assert!(frame.pick_at(Vec2::new(500.0, 0.0)).is_none());
}

#[test]
fn visibility_needs_a_viewport_and_full_containment() {
    let view = Rect::from_corners(Vec2::new(-100.0, -100.0), Vec2::new(100.0, 100.0));
    let inside = Rect::from_center_size(Vec2::ZERO, Vec2::splat(20.0));
    let straddling = Rect::from_center_size(Vec2::new(95.0, 0.0), Vec2::splat(20.0));

    assert!(fully_visible(inside, Some(view), 8.0));
    assert!(!fully_visible(straddling, Some(view), 8.0));
    assert!(!fully_visible(inside, None, 8.0));
}

#[test]
fn validity_tracks_lifecycle_flags() {
    let data = FishData {
        fish_id: Some("f1".into()),
        variant: "golden_fish".into(),
        fish_type: FishType::Golden,
        lifespan_ms: 10_000,
        multiplier: 1.0,
    };
    let mut life = FishLife::spawned(1, 10_000, 0.0, &FishTunables::default());
    assert!(!is_valid_target(Some(&data), &life), "not on screen yet");

    life.set_visible(true);
    assert!(is_valid_target(Some(&data), &life));
    assert!(!is_valid_target(None, &life));

    assert!(life.mark_pending_death());
    assert_eq!(life.phase(), LifePhase::PendingDeath);
    assert!(!is_valid_target(Some(&data), &life));
}

#[test]
fn snapshot_lists_registered_fish_in_spawn_order() {
    use crate::plugins::fish::ActiveFish;

    let mut world = World::new();
    world.insert_resource(FishCatalog::default());
    world.init_resource::<TargetCandidates>();
    let tunables = FishTunables::default();

    let mut registry = FishRegistry::default();
    let fishes = [("golden_fish", -30.0), ("orange_fish", 30.0)];
    for (i, (variant, x)) in fishes.into_iter().enumerate() {
        let serial = registry.next_serial();
        let mut life = FishLife::spawned(serial, 10_000, 0.0, &tunables);
        life.set_visible(i == 0);
        let entity = world
            .spawn((
                FishData {
                    fish_id: None,
                    variant: variant.into(),
                    fish_type: FishType::Normal,
                    lifespan_ms: 10_000,
                    multiplier: 1.0,
                },
                life,
                Transform::from_xyz(x, 0.0, 1.0),
                Hitbox { size: Vec2::splat(20.0), offset: Vec2::ZERO },
            ))
            .id();
        registry.register(ActiveFish {
            target: TargetRef { entity, serial },
            fish_id: None,
            variant: variant.into(),
            fish_type: FishType::Normal,
        });
    }
    world.insert_resource(registry);

    crate::common::test_utils::run_system_once(&mut world, refresh_target_candidates);

    let snapshot = world.resource::<TargetCandidates>();
    let variants: Vec<_> = snapshot.iter().map(|c| c.variant.as_str()).collect();
    assert_eq!(variants, ["golden_fish", "orange_fish"]);

    let golden = snapshot.iter().next().unwrap();
    assert!(golden.valid && golden.torpedo_ok);
    // Orange fish is off screen and blacklisted for torpedoes.
    let orange = snapshot.iter().nth(1).unwrap();
    assert!(!orange.valid && !orange.torpedo_ok && orange.pickable);
}
