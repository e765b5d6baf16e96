//! Spawn flow: turns server spawn batches into fish over time.
//!
//! ```text
//!  SpawnBatchesReceived ──replace──► queue ──pop──► current batch
//!                                                     │  each fish waits for its offset
//!                                                     ▼
//!                                  every spawned fish left the registry?
//!                                        │ yes                 │ no
//!                                        ▼                     └── wait
//!                                  next batch, or SpawnRequest when the queue is empty
//! ```

use std::collections::VecDeque;

use bevy::prelude::*;
use rand::seq::SliceRandom;

use crate::game::context::GameContext;
use crate::plugins::network::messages::{SpawnBatchesReceived, SpawnRequest};
use crate::plugins::paths::SpawnBatchContext;

use super::data::{FishType, TargetRef};

/// One fish to put on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct FishSpawn {
    pub fish_id: Option<String>,
    /// Server type; picks the pool. `None` uses the catalog template's type.
    pub fish_type: Option<FishType>,
    pub variant: String,
    /// Server lifespan; `None` uses the configured default.
    pub lifespan_ms: Option<u64>,
    pub multiplier: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingFish {
    /// Seconds after the batch starts.
    pub offset_secs: f32,
    pub spawn: FishSpawn,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpawnBatch {
    pub batch_id: String,
    pub fishes: Vec<PendingFish>,
}

#[derive(Debug)]
struct ActiveBatch {
    batch_id: String,
    pending: VecDeque<PendingFish>,
    elapsed: f32,
    paths: Option<SpawnBatchContext>,
    spawned: Vec<TargetRef>,
}

impl ActiveBatch {
    fn new(batch: SpawnBatch) -> Self {
        let mut fishes = batch.fishes;
        fishes.sort_by(|a, b| a.offset_secs.total_cmp(&b.offset_secs));
        Self {
            batch_id: batch.batch_id,
            pending: fishes.into(),
            elapsed: 0.0,
            paths: None,
            spawned: Vec::new(),
        }
    }
}

#[derive(Resource, Debug, Default)]
pub struct SpawnFlow {
    queue: VecDeque<SpawnBatch>,
    current: Option<ActiveBatch>,
    running: bool,
}

impl SpawnFlow {
    /// Drop whatever was running and start over with `batches`.
    pub fn replace(&mut self, batches: Vec<SpawnBatch>) {
        if self.running {
            let dropped = self.queue.len() + self.current.is_some() as usize;
            info!(dropped, "spawn flow replaced");
        }
        self.queue = batches.into();
        self.current = None;
        self.running = true;
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn current_batch_id(&self) -> Option<&str> {
        self.current.as_ref().map(|b| b.batch_id.as_str())
    }

    #[inline]
    pub fn queued(&self) -> usize {
        self.queue.len()
    }
}

pub fn run_spawn_flow(
    time: Res<Time>,
    mut received: MessageReader<SpawnBatchesReceived>,
    mut flow: ResMut<SpawnFlow>,
    mut ctx: GameContext,
    mut requests: MessageWriter<SpawnRequest>,
) {
    if let Some(latest) = received.read().last() {
        flow.replace(latest.batches.clone());
    }
    if !flow.running {
        return;
    }

    let mut dt = time.delta_secs();
    loop {
        if flow.current.is_none() {
            let Some(next) = flow.queue.pop_front() else {
                flow.running = false;
                info!("spawn batches exhausted, requesting more");
                requests.write(SpawnRequest);
                return;
            };
            info!(batch = %next.batch_id, fishes = next.fishes.len(), "spawn batch started");
            flow.current = Some(ActiveBatch::new(next));
        }
        let Some(batch) = flow.current.as_mut() else {
            return;
        };

        batch.elapsed += dt;
        dt = 0.0;
        while batch.pending.front().is_some_and(|p| p.offset_secs <= batch.elapsed) {
            let Some(fish) = batch.pending.pop_front() else {
                break;
            };
            let paths = batch.paths.get_or_insert_with(|| ctx.begin_batch());
            match ctx.spawn_fish(&fish.spawn, paths) {
                Ok(target) => batch.spawned.push(target),
                Err(err) => error!(
                    batch = %batch.batch_id,
                    variant = %fish.spawn.variant,
                    %err,
                    "fish spawn aborted"
                ),
            }
        }

        let cleared = batch.pending.is_empty()
            && batch.spawned.iter().all(|t| !ctx.registry.contains(*t));
        if !cleared {
            return;
        }
        info!(batch = %batch.batch_id, "spawn batch finished");
        flow.current = None;
    }
}

/// Local spawn of a random catalog variant, without a backend id.
pub fn spawn_mock_fish(keys: Option<Res<ButtonInput<KeyCode>>>, mut ctx: GameContext) {
    let Some(keys) = keys else { return };
    if !keys.just_pressed(KeyCode::Space) {
        return;
    }

    let mut variants: Vec<String> = ctx.catalog.variants().map(str::to_owned).collect();
    variants.sort();
    let Some(variant) = variants.choose(&mut ctx.rng.0).cloned() else {
        warn!("fish catalog is empty, nothing to mock-spawn");
        return;
    };

    let mut paths = ctx.begin_batch();
    let request = FishSpawn {
        fish_id: None,
        fish_type: None,
        variant,
        lifespan_ms: None,
        multiplier: 1.0,
    };
    if let Err(err) = ctx.spawn_fish(&request, &mut paths) {
        error!(%err, "mock spawn failed");
    }
}
