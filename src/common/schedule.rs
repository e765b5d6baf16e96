//! Frame ordering for gameplay systems in `Update`.
//!
//! ```text
//! Ingest    network frames decoded, pointer sampled
//! Spawn     spawn flow acquires fish from pools
//! Sense     movement, visibility, target candidate snapshot
//! Aim       weapons read the snapshot and write fire intents
//! Fly       projectiles allocated and advanced
//! Resolve   hit results / torpedo impacts / effect sequences -> FishCommand
//! Lifecycle FishCommand applied, lifecycle timers ticked
//! Commit    finalized fish returned to their pools
//! ```
//!
//! Everything that removes fish from the active set runs in `Commit`, after every
//! reader of the snapshot. Weapons never observe a half-removed fish.

use bevy::prelude::*;

use crate::common::state::GameState;

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArcadeSet {
    Ingest,
    Spawn,
    Sense,
    Aim,
    Fly,
    Resolve,
    Lifecycle,
    Commit,
}

pub fn configure(app: &mut App) {
    app.configure_sets(
        Update,
        (
            ArcadeSet::Ingest,
            ArcadeSet::Spawn,
            ArcadeSet::Sense,
            ArcadeSet::Aim,
            ArcadeSet::Fly,
            ArcadeSet::Resolve,
            ArcadeSet::Lifecycle,
            ArcadeSet::Commit,
        )
            .chain()
            .run_if(in_state(GameState::InGame)),
    );
}
