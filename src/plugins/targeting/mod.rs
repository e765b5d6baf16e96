//! Target acquisition shared by every weapon.
//!
//! Once per frame (`ArcadeSet::Sense`) the active fish set is flattened into a
//! `TargetCandidates` snapshot. Weapons only ever read the snapshot, so nothing they do
//! can observe a fish halfway through being returned to its pool.
//!
//! `WeaponLock` is the variant lock: a persistent commitment to *any* live fish of one
//! variant. It re-acquires the instance nearest the last known position when the current
//! one dies, and idles (keeping the lock) while no instance exists.

use bevy::prelude::*;

use crate::common::schedule::ArcadeSet;
use crate::common::tunables::Tunables;
use crate::plugins::camera::Viewport;
use crate::plugins::fish::catalog::FishCatalog;
use crate::plugins::fish::effects::{swirl_affected_fish, EffectSequence};
use crate::plugins::fish::lifecycle::FishLife;
use crate::plugins::fish::{FishData, FishRegistry, FishType, Hitbox, TargetRef};
use crate::plugins::fish::systems::advance_fish_movement;

pub fn plugin(app: &mut App) {
    app.init_resource::<TargetCandidates>().add_systems(
        Update,
        (update_fish_visibility, refresh_target_candidates)
            .chain()
            .after(advance_fish_movement)
            .after(swirl_affected_fish)
            .in_set(ArcadeSet::Sense),
    );
}

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub target: TargetRef,
    pub variant: String,
    pub fish_type: FishType,
    /// Hitbox centre in world space.
    pub position: Vec2,
    pub bounds: Rect,
    /// Has an enabled collider, so a pointer ray would hit it.
    pub pickable: bool,
    pub valid: bool,
    pub torpedo_ok: bool,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct TargetCandidates {
    list: Vec<Candidate>,
}

impl TargetCandidates {
    pub fn from_candidates(list: Vec<Candidate>) -> Self {
        Self { list }
    }

    pub fn get(&self, target: TargetRef) -> Option<&Candidate> {
        self.list.iter().find(|c| c.target == target)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.list.iter()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Topmost pickable fish under `point`. Later spawns draw on top.
    pub fn pick_at(&self, point: Vec2) -> Option<&Candidate> {
        self.list.iter().rev().find(|c| c.pickable && c.bounds.contains(point))
    }
}

/// Fully inside the viewport shrunk by `padding`. No viewport means nothing is visible.
pub fn fully_visible(bounds: Rect, viewport: Option<Rect>, padding: f32) -> bool {
    let Some(view) = viewport else {
        return false;
    };
    let inner = view.inflate(-padding);
    if inner.is_empty() {
        return false;
    }
    inner.contains(bounds.min) && inner.contains(bounds.max)
}

/// The shared validity predicate.
pub fn is_valid_target(data: Option<&FishData>, life: &FishLife) -> bool {
    data.is_some() && life.is_targetable()
}

/// Rebuild the candidate snapshot from the registry's active set, in spawn order.
pub fn refresh_target_candidates(
    registry: Res<FishRegistry>,
    catalog: Res<FishCatalog>,
    q_fish: Query<(Option<&FishData>, &FishLife, &Transform, &Hitbox, Option<&EffectSequence>)>,
    mut candidates: ResMut<TargetCandidates>,
) {
    candidates.list.clear();

    for active in registry.active() {
        let Ok((data, life, tf, hitbox, effect)) = q_fish.get(active.target.entity) else {
            debug!(entity = ?active.target.entity, "registered fish has no body, skipping");
            continue;
        };
        // Spawn components not applied yet, or a stale lifetime.
        if life.serial() != active.target.serial {
            continue;
        }

        let at = tf.translation.truncate();
        let valid = is_valid_target(data, life);
        let vetoed = effect.is_some_and(EffectSequence::blocks_torpedo)
            || catalog.template(&active.variant).is_none_or(|t| !t.torpedo_targetable);

        candidates.list.push(Candidate {
            target: active.target,
            variant: active.variant.clone(),
            fish_type: active.fish_type,
            position: hitbox.center(at),
            bounds: hitbox.world_rect(at),
            pickable: life.in_scene() && life.collider_enabled(),
            valid,
            torpedo_ok: valid && !vetoed,
        });
    }
}

/// Recompute each fish's on-screen flag from its hitbox and the current viewport.
pub fn update_fish_visibility(
    tunables: Res<Tunables>,
    viewport: Res<Viewport>,
    mut q_fish: Query<(&mut FishLife, &Transform, &Hitbox)>,
) {
    let padding = tunables.arena.viewport_padding;
    for (mut life, tf, hitbox) in &mut q_fish {
        if !life.in_scene() {
            continue;
        }
        let bounds = hitbox.world_rect(tf.translation.truncate());
        let visible = fully_visible(bounds, viewport.0, padding);
        if life.visible() != visible {
            life.set_visible(visible);
        }
    }
}

pub enum LockResolution<'a> {
    /// No variant locked: the weapon uses pointer targeting.
    Unlocked,
    Target(&'a Candidate),
    /// Locked, but no valid fish of the variant exists right now.
    Starved,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeaponLock {
    locked_variant: Option<String>,
    current: Option<TargetRef>,
    last_known_position: Option<Vec2>,
    last_switch_at: Option<f32>,
}

impl WeaponLock {
    #[inline]
    pub fn locked_variant(&self) -> Option<&str> {
        self.locked_variant.as_deref()
    }

    #[inline]
    pub fn current(&self) -> Option<TargetRef> {
        self.current
    }

    #[inline]
    pub fn last_known_position(&self) -> Option<Vec2> {
        self.last_known_position
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked_variant.is_some()
    }

    pub fn lock(&mut self, candidate: &Candidate, now: f32) {
        self.locked_variant = Some(candidate.variant.clone());
        self.current = Some(candidate.target);
        self.last_known_position = Some(candidate.position);
        self.last_switch_at = Some(now);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Move the lock to another variant while held, respecting the switch cooldown.
    /// Hovering a fish of the locked variant changes nothing.
    pub fn try_switch_variant(
        &mut self,
        candidate: &Candidate,
        now: f32,
        cooldown_secs: f32,
    ) -> bool {
        if self.locked_variant.as_deref() == Some(candidate.variant.as_str()) {
            return false;
        }
        if self.last_switch_at.is_some_and(|t| now - t < cooldown_secs) {
            return false;
        }
        self.lock(candidate, now);
        true
    }

    /// Find what to shoot at this frame.
    ///
    /// The current target is kept while it stays valid. Otherwise the nearest valid fish
    /// of the locked variant (squared distance to the last known position, first in
    /// spawn order on ties) becomes the new current target.
    pub fn resolve<'a>(
        &mut self,
        candidates: &'a TargetCandidates,
        accept: impl Fn(&Candidate) -> bool,
    ) -> LockResolution<'a> {
        let Some(variant) = self.locked_variant.clone() else {
            return LockResolution::Unlocked;
        };
        let usable = |c: &Candidate| c.variant == variant && c.valid && accept(c);

        if let Some(current) = self.current {
            if let Some(c) = candidates.get(current) {
                self.last_known_position = Some(c.position);
                if usable(c) {
                    return LockResolution::Target(c);
                }
            }
        }

        let anchor = self.last_known_position;
        let dist = |c: &Candidate| anchor.map_or(0.0, |p| c.position.distance_squared(p));
        let best = candidates
            .iter()
            .filter(|c| usable(c))
            .min_by(|a, b| dist(a).total_cmp(&dist(b)));

        match best {
            Some(c) => {
                self.current = Some(c.target);
                self.last_known_position = Some(c.position);
                LockResolution::Target(c)
            }
            None => {
                self.current = None;
                LockResolution::Starved
            }
        }
    }
}

#[cfg(test)]
mod tests;
