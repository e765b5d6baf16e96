//! Movement paths.
//!
//! Paths are polylines sampled by arc length. They are grouped into sets per fish
//! type, each with a left-to-right and a right-to-left list, plus fallback lists
//! any fish may use. A spawn batch picks one direction and (sometimes) one set, and
//! avoids handing the same path to two fish of the batch.

use bevy::platform::collections::{HashMap, HashSet};
use bevy::prelude::*;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::common::error::ArcadeError;
use crate::common::tunables::{ArenaTunables, Tunables};
use crate::plugins::fish::FishType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathId(pub usize);

#[derive(Debug, Clone)]
pub struct FishPath {
    points: Vec<Vec2>,
    /// `cumulative[i]` is the arc length from `points[0]` to `points[i]`.
    cumulative: Vec<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSample {
    pub position: Vec2,
    pub direction: Vec2,
    pub finished: bool,
}

impl FishPath {
    pub fn new(points: Vec<Vec2>) -> Self {
        let mut cumulative = Vec::with_capacity(points.len());
        let mut total = 0.0;
        for (i, p) in points.iter().enumerate() {
            if i > 0 {
                total += p.distance(points[i - 1]);
            }
            cumulative.push(total);
        }
        Self { points, cumulative }
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    pub fn start(&self) -> Vec2 {
        self.points.first().copied().unwrap_or(Vec2::ZERO)
    }

    pub fn sample(&self, distance: f32) -> PathSample {
        let len = self.length();
        if self.points.len() < 2 || len <= 0.0 {
            return PathSample { position: self.start(), direction: Vec2::X, finished: true };
        }
        let d = distance.clamp(0.0, len);
        // First segment whose end lies at or beyond `d`.
        let seg = self.cumulative.partition_point(|c| *c < d).clamp(1, self.points.len() - 1);
        let (a, b) = (self.points[seg - 1], self.points[seg]);
        let seg_len = self.cumulative[seg] - self.cumulative[seg - 1];
        let t = if seg_len > 0.0 { (d - self.cumulative[seg - 1]) / seg_len } else { 1.0 };
        PathSample {
            position: a.lerp(b, t),
            direction: (b - a).normalize_or(Vec2::X),
            finished: distance >= len,
        }
    }

    fn reversed(&self) -> Self {
        Self::new(self.points.iter().rev().copied().collect())
    }
}

#[derive(Debug, Clone)]
pub struct PathSet {
    pub name: String,
    pub fish_types: Vec<FishType>,
    pub left_to_right: Vec<PathId>,
    pub right_to_left: Vec<PathId>,
}

impl PathSet {
    fn list(&self, right_to_left: bool) -> &[PathId] {
        if right_to_left { &self.right_to_left } else { &self.left_to_right }
    }
}

/// Per-batch scratch state. Created when a batch starts, dropped once it is placed.
#[derive(Debug, Clone, Default)]
pub struct SpawnBatchContext {
    pub move_right_to_left: bool,
    pub chosen_set: Option<usize>,
    pub used: HashSet<PathId>,
}

impl SpawnBatchContext {
    pub fn roll(library: &PathLibrary, path_set_chance: f64, rng: &mut impl Rng) -> Self {
        let move_right_to_left = rng.gen_bool(0.5);
        let chosen_set = (!library.sets.is_empty() && rng.gen_bool(path_set_chance.clamp(0.0, 1.0)))
            .then(|| rng.gen_range(0..library.sets.len()));
        Self { move_right_to_left, chosen_set, used: HashSet::default() }
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct PathLibrary {
    paths: Vec<FishPath>,
    sets: Vec<PathSet>,
    fallback_left_to_right: Vec<PathId>,
    fallback_right_to_left: Vec<PathId>,
    /// Live fish per path.
    reserved: HashMap<PathId, u32>,
}

impl PathLibrary {
    pub fn add_path(&mut self, path: FishPath) -> PathId {
        self.paths.push(path);
        PathId(self.paths.len() - 1)
    }

    pub fn add_set(&mut self, set: PathSet) {
        self.sets.push(set);
    }

    pub fn add_fallback(&mut self, id: PathId, right_to_left: bool) {
        if right_to_left {
            self.fallback_right_to_left.push(id);
        } else {
            self.fallback_left_to_right.push(id);
        }
    }

    #[inline]
    pub fn path(&self, id: PathId) -> Option<&FishPath> {
        self.paths.get(id.0)
    }

    #[inline]
    pub fn sets(&self) -> &[PathSet] {
        &self.sets
    }

    #[inline]
    pub fn is_reserved(&self, id: PathId) -> bool {
        self.reserved.get(&id).is_some_and(|n| *n > 0)
    }

    /// Choose a path for one fish of the batch.
    ///
    /// The batch's chosen set is used when it accepts `fish_type`, else the fallback
    /// list for the batch direction. Paths unused in this batch and not reserved by a
    /// live fish are preferred; when none is left, any path of the list is reused.
    pub fn pick_path(
        &mut self,
        fish_type: FishType,
        ctx: &mut SpawnBatchContext,
        rng: &mut impl Rng,
    ) -> Result<PathId, ArcadeError> {
        let rtl = ctx.move_right_to_left;
        let set_list = ctx
            .chosen_set
            .and_then(|i| self.sets.get(i))
            .filter(|set| set.fish_types.contains(&fish_type))
            .map(|set| set.list(rtl))
            .filter(|list| !list.is_empty());
        let list = match set_list {
            Some(list) => list,
            None if rtl => &self.fallback_right_to_left,
            None => &self.fallback_left_to_right,
        };

        let fresh: Vec<PathId> = list
            .iter()
            .copied()
            .filter(|id| !ctx.used.contains(id) && !self.is_reserved(*id))
            .collect();
        let picked = fresh
            .choose(&mut *rng)
            .or_else(|| list.choose(&mut *rng))
            .copied()
            .ok_or(ArcadeError::NoPathAvailable { fish_type, right_to_left: rtl })?;

        ctx.used.insert(picked);
        *self.reserved.entry(picked).or_insert(0) += 1;
        Ok(picked)
    }

    /// Give a path back when the fish that used it returns to its pool.
    pub fn release(&mut self, id: PathId) {
        if let Some(n) = self.reserved.get_mut(&id) {
            *n = n.saturating_sub(1);
            if *n == 0 {
                self.reserved.remove(&id);
            }
        }
    }

    /// Wavy horizontal lanes across the arena in both directions, a diagonal set for
    /// small fish and a centre set for big ones.
    pub fn generated(arena: &ArenaTunables) -> Self {
        let mut lib = Self::default();
        let (w, h) = (arena.half_width, arena.half_height);
        let overshoot = 220.0;
        let x0 = -w - overshoot;
        let x1 = w + overshoot;

        let lane = |y0: f32, y1: f32, amplitude: f32, phase: f32| {
            let steps = 12;
            let points = (0..=steps)
                .map(|i| {
                    let t = i as f32 / steps as f32;
                    let wave = amplitude * (t * std::f32::consts::TAU + phase).sin();
                    let y = y0 + (y1 - y0) * t + wave;
                    Vec2::new(x0 + (x1 - x0) * t, y)
                })
                .collect();
            FishPath::new(points)
        };

        let lanes = 7;
        for i in 0..lanes {
            let y = -h * 0.7 + (h * 1.4) * i as f32 / (lanes - 1) as f32;
            let ltr = lane(y, y, 40.0, i as f32);
            let rtl = ltr.reversed();
            let a = lib.add_path(ltr);
            let b = lib.add_path(rtl);
            lib.add_fallback(a, false);
            lib.add_fallback(b, true);
        }

        let mut diag = PathSet {
            name: "diagonals".into(),
            fish_types: vec![FishType::Normal, FishType::Golden, FishType::Effect],
            left_to_right: Vec::new(),
            right_to_left: Vec::new(),
        };
        let diagonals = [
            (-h * 0.8, h * 0.4),
            (-h * 0.4, h * 0.8),
            (h * 0.8, -h * 0.4),
            (h * 0.4, -h * 0.8),
        ];
        for (y0, y1) in diagonals {
            let ltr = lane(y0, y1, 25.0, 0.0);
            let rtl = ltr.reversed();
            let a = lib.add_path(ltr);
            diag.left_to_right.push(a);
            let b = lib.add_path(rtl);
            diag.right_to_left.push(b);
        }
        lib.add_set(diag);

        let mut centre = PathSet {
            name: "centre".into(),
            fish_types: vec![
                FishType::Special,
                FishType::Immortal,
                FishType::JackpotFish,
                FishType::JackpotDragon,
            ],
            left_to_right: Vec::new(),
            right_to_left: Vec::new(),
        };
        for y in [-h * 0.25, 0.0, h * 0.25] {
            let ltr = lane(y, y, 60.0, 0.5);
            let rtl = ltr.reversed();
            let a = lib.add_path(ltr);
            centre.left_to_right.push(a);
            let b = lib.add_path(rtl);
            centre.right_to_left.push(b);
        }
        lib.add_set(centre);

        lib
    }
}

pub fn plugin(app: &mut App) {
    let arena = app.world().resource::<Tunables>().arena.clone();
    app.insert_resource(PathLibrary::generated(&arena));
}
