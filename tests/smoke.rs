mod common;

use bevy::prelude::*;
use fish_arcade::common::state::GameState;
use fish_arcade::plugins::fish::FishRegistry;
use fish_arcade::plugins::projectiles::pool::{BulletPool, TorpedoPool};
use fish_arcade::plugins::targeting::TargetCandidates;

#[test]
fn boots_and_ticks() {
    let mut app = common::app_headless();

    for _ in 0..3 {
        app.update();
    }

    assert_eq!(*app.world().resource::<State<GameState>>().get(), GameState::InGame);
    assert!(app.world().resource::<FishRegistry>().is_empty());
    assert!(app.world().resource::<TargetCandidates>().is_empty());
}

#[test]
fn projectile_pools_are_prewarmed() {
    let mut app = common::app_headless();
    app.update();

    let bullets = app.world().resource::<BulletPool>();
    let torpedoes = app.world().resource::<TorpedoPool>();
    assert!(bullets.0.free_len() > 0);
    assert!(torpedoes.0.free_len() > 0);
    assert_eq!(bullets.0.in_use_len() + torpedoes.0.in_use_len(), 0);
}
