//! Active fish set and per-type pools.
//!
//! The registry is the only place that knows which fish are alive. It hands out spawn
//! serials, maps backend ids to the current lifetime, and keeps spawn order (later
//! spawns draw on top and win pointer picks).

use bevy::platform::collections::HashMap;
use bevy::prelude::*;

use crate::common::pool::ObjectPool;

use super::data::{FishType, TargetRef};

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveFish {
    pub target: TargetRef,
    pub fish_id: Option<String>,
    pub variant: String,
    pub fish_type: FishType,
}

#[derive(Resource, Debug, Default)]
pub struct FishRegistry {
    active: Vec<ActiveFish>,
    by_id: HashMap<String, TargetRef>,
    next_serial: u64,
}

impl FishRegistry {
    pub fn next_serial(&mut self) -> u64 {
        self.next_serial += 1;
        self.next_serial
    }

    pub fn register(&mut self, fish: ActiveFish) {
        if let Some(id) = &fish.fish_id {
            if let Some(previous) = self.by_id.insert(id.clone(), fish.target) {
                warn!(fish_id = %id, ?previous, "backend id registered twice, newest spawn wins");
            }
        }
        self.active.push(fish);
    }

    /// Remove a lifetime from the active set. A stale reference (entity reused since)
    /// removes nothing.
    pub fn unregister(&mut self, target: TargetRef) -> Option<ActiveFish> {
        let idx = self.active.iter().position(|f| f.target == target)?;
        let fish = self.active.remove(idx);
        if let Some(id) = &fish.fish_id {
            if self.by_id.get(id) == Some(&target) {
                self.by_id.remove(id);
            }
        }
        Some(fish)
    }

    pub fn lookup_id(&self, fish_id: &str) -> Option<&ActiveFish> {
        let target = self.by_id.get(fish_id)?;
        self.active.iter().find(|f| f.target == *target)
    }

    pub fn get(&self, target: TargetRef) -> Option<&ActiveFish> {
        self.active.iter().find(|f| f.target == target)
    }

    #[inline]
    pub fn contains(&self, target: TargetRef) -> bool {
        self.active.iter().any(|f| f.target == target)
    }

    #[inline]
    pub fn active(&self) -> &[ActiveFish] {
        &self.active
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

/// One pool per fish type. Fish carry a `FishKind` tag; the pool is looked up from it.
#[derive(Resource, Debug, Default)]
pub struct FishPools {
    pools: HashMap<FishType, ObjectPool<Entity>>,
}

impl FishPools {
    pub fn pool_mut(&mut self, fish_type: FishType) -> &mut ObjectPool<Entity> {
        self.pools.entry(fish_type).or_default()
    }

    pub fn pool(&self, fish_type: FishType) -> Option<&ObjectPool<Entity>> {
        self.pools.get(&fish_type)
    }

    pub fn release(&mut self, fish_type: FishType, entity: Entity) -> bool {
        self.pool_mut(fish_type).release(entity)
    }
}
