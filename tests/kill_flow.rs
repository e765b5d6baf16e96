//! End to end: server frames in, fish spawned, hits resolved, fish back in their pools.

mod common;

use bevy::prelude::*;
use serde_json::json;

use fish_arcade::plugins::fish::{DeathCause, FishRegistry, FishReturned, TargetRef};
use fish_arcade::plugins::network::{NetOutbox, wire::REQUEST_EVENT};
use fish_arcade::plugins::projectiles::messages::{LaunchTorpedo, TorpedoKind};

fn spawn_frame(fishes: &[(&str, &str)]) -> String {
    let fishes: Vec<_> = fishes
        .iter()
        .map(|(id, variant)| {
            json!({ "id": id, "type": "normal", "variant": variant,
                    "spawnTime": 1_000, "lifespan": 20_000 })
        })
        .collect();
    json!({
        "success": true,
        "id": "spawnresult",
        "payload": { "spawnBatches": [{ "batchId": "b-1", "spawnTime": 1_000, "fishes": fishes }] }
    })
    .to_string()
}

fn kill_frame(fish_id: &str, weapon: &str, payout: f64) -> String {
    json!({
        "success": true,
        "id": "hitresult",
        "payload": {
            "weaponType": weapon,
            "fishKilled": { "id": fish_id, "payout": payout, "affectedFishIds": [] },
            "isExpired": false,
            "message": ""
        }
    })
    .to_string()
}

fn target_of(app: &App, fish_id: &str) -> Option<TargetRef> {
    app.world().resource::<FishRegistry>().lookup_id(fish_id).map(|f| f.target)
}

fn spawned_app(fishes: &[(&str, &str)]) -> App {
    let mut app = common::app_headless();
    app.update();
    common::deliver(&mut app, spawn_frame(fishes));
    for _ in 0..3 {
        app.update();
    }
    for (id, _) in fishes {
        assert!(target_of(&app, id).is_some(), "fish {id} should be active");
    }
    app
}

/// Run frames until `fish_id` has gone back to its pool; returns what was reported.
fn run_until_returned(app: &mut App, fish_id: &str, max_frames: usize) -> FishReturned {
    for _ in 0..max_frames {
        app.update();
        let returned = common::take::<FishReturned>(app);
        if let Some(r) = returned.into_iter().find(|r| r.fish_id.as_deref() == Some(fish_id)) {
            return r;
        }
    }
    panic!("fish {fish_id} was never returned");
}

#[test]
fn server_kill_returns_the_fish_with_its_reward() {
    let mut app = spawned_app(&[("f-1", "clown_fish"), ("f-2", "orange_fish")]);

    common::deliver(&mut app, kill_frame("f-1", "simple", 7.5));
    let returned = run_until_returned(&mut app, "f-1", 120);

    assert_eq!(returned.cause, DeathCause::Bullet);
    assert_eq!(returned.reward.map(|r| r.payout), Some(7.5));
    assert_eq!(returned.variant, "clown_fish");

    let registry = app.world().resource::<FishRegistry>();
    assert!(registry.lookup_id("f-1").is_none());
    assert!(registry.lookup_id("f-2").is_some());
}

#[test]
fn torpedo_kill_waits_for_the_impact() {
    let mut app = spawned_app(&[("t-1", "turtle_fish")]);
    let target = target_of(&app, "t-1").expect("spawned");
    let at = app
        .world()
        .get::<Transform>(target.entity)
        .map(|tf| tf.translation.truncate())
        .expect("fish has a transform");

    app.world_mut().write_message(LaunchTorpedo {
        origin: Vec2::new(0.0, -480.0),
        target,
        target_position: at,
        kind: TorpedoKind::Player,
    });
    common::deliver(&mut app, kill_frame("t-1", "torpedo", 30.0));

    // The kill is confirmed while the torpedo is still flying; the fish stays put.
    for _ in 0..3 {
        app.update();
    }
    assert!(target_of(&app, "t-1").is_some());

    let returned = run_until_returned(&mut app, "t-1", 180);
    assert_eq!(returned.cause, DeathCause::Torpedo);
    assert_eq!(returned.reward.map(|r| r.payout), Some(30.0));
}

#[test]
fn finished_batch_asks_the_server_for_more() {
    let mut app = spawned_app(&[("f-9", "jelly_fish")]);
    common::deliver(&mut app, kill_frame("f-9", "lazer", 1.0));
    run_until_returned(&mut app, "f-9", 120);

    // Batch cleared: next frame requests another.
    for _ in 0..2 {
        app.update();
    }
    let frames = app.world_mut().resource_mut::<NetOutbox>().drain();
    assert!(
        frames.iter().any(|f| f.event == REQUEST_EVENT && f.body.contains("SPAWN")),
        "expected a spawn request, got {frames:?}"
    );
}
