//! Effect fish: deaths that take other fish with them.
//!
//! Every sequence has the same outer shape:
//!
//! ```text
//! Dormant ─trigger─► AwaitOwnTorpedoes ─► Charging ─► (kind-specific) ─► Done
//! ```
//!
//! At trigger time the source and every affected fish are marked pending death, so they
//! stop moving, stop being targetable and hold on screen. The kind-specific part decides
//! when they are force-despawned:
//!
//! - `ChainLightning`: one link per affected fish, then a short buffer.
//! - `Whirlpool`: affected fish orbit into the crab for the swirl duration.
//! - `TorpedoBarrage`: one crab torpedo per affected fish; each impact despawns its
//!   target. When all landed (or timed out) the crab escapes instead of dying.
//!
//! Timings come from `Tunables::effects`. `EffectSequence` is pure; the systems below
//! translate its `EffectAction`s into messages.

use bevy::platform::collections::HashMap;
use bevy::prelude::*;

use crate::common::pool::{Acquired, ObjectPool};
use crate::common::tunables::{EffectTunables, Tunables};
use crate::plugins::projectiles::messages::{LaunchTorpedo, TorpedoKind, TorpedoResolved};
use crate::plugins::targeting::TargetCandidates;

use super::data::{DeathCause, DespawnReward, TargetRef};
use super::lifecycle::FishLife;
use super::messages::FishCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    ChainLightning,
    Whirlpool,
    TorpedoBarrage,
}

impl EffectKind {
    pub fn for_variant(variant: &str) -> Option<Self> {
        match variant {
            "effect_blue_fish" => Some(Self::ChainLightning),
            "effect_bubblecrab_fish" => Some(Self::Whirlpool),
            "effect_rockcrab_fish" => Some(Self::TorpedoBarrage),
            _ => None,
        }
    }

    fn charge_secs(self, t: &EffectTunables) -> f32 {
        match self {
            Self::ChainLightning => t.chain_charge_secs,
            Self::Whirlpool => t.whirl_charge_secs,
            Self::TorpedoBarrage => t.barrage_prefire_secs,
        }
    }
}

/// Server killed an effect fish.
#[derive(Message, Debug, Clone, PartialEq)]
pub struct EffectTrigger {
    pub source: TargetRef,
    pub affected: Vec<TargetRef>,
    pub cause: DeathCause,
    pub reward: Option<DespawnReward>,
}

/// Presentation hook: draw a chain link between two fish.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct EffectLink {
    pub from: TargetRef,
    pub to: TargetRef,
    pub kind: EffectKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EffectAction {
    Link(TargetRef),
    BeginSwirl,
    FireCrabTorpedo(TargetRef),
    DespawnAffected,
    DespawnSource,
    Escape,
}

#[derive(Debug, Clone, Default)]
enum EffectStage {
    #[default]
    Dormant,
    AwaitOwnTorpedoes(Timer),
    Charging(Timer),
    Linking { next: usize, timer: Timer },
    Swirling(Timer),
    Barrage { next: usize, timer: Timer },
    AwaitBarrage(Timer),
    Buffer(Timer),
    Escaping,
    Done,
}

#[inline]
fn once(secs: f32) -> Timer {
    Timer::from_seconds(secs.max(0.0), TimerMode::Once)
}

#[inline]
fn finished(timer: &mut Timer, dt: std::time::Duration) -> bool {
    timer.tick(dt);
    timer.is_finished()
}

#[derive(Component, Debug, Clone)]
pub struct EffectSequence {
    pub kind: EffectKind,
    stage: EffectStage,
    source: Option<TargetRef>,
    affected: Vec<TargetRef>,
    cause: DeathCause,
    barrage_in_flight: u32,
}

impl EffectSequence {
    pub fn new(kind: EffectKind) -> Self {
        Self {
            kind,
            stage: EffectStage::Dormant,
            source: None,
            affected: Vec::new(),
            cause: DeathCause::None,
            barrage_in_flight: 0,
        }
    }

    /// Started and not yet done (escaping counts as running).
    pub fn is_running(&self) -> bool {
        !matches!(self.stage, EffectStage::Dormant | EffectStage::Done)
    }

    pub fn is_done(&self) -> bool {
        matches!(self.stage, EffectStage::Done)
    }

    pub fn is_swirling(&self) -> bool {
        matches!(self.stage, EffectStage::Swirling(_))
    }

    /// Swirl progress in `0..=1` while swirling.
    pub fn swirl_fraction(&self) -> Option<f32> {
        match &self.stage {
            EffectStage::Swirling(t) => Some(t.fraction()),
            _ => None,
        }
    }

    /// Torpedoes may not be aimed at a fish whose sequence is running.
    pub fn blocks_torpedo(&self) -> bool {
        self.is_running()
    }

    /// Server expiry cleanup must not cut a running sequence short.
    pub fn ignores_expiry(&self) -> bool {
        self.is_running()
    }

    pub fn affected(&self) -> &[TargetRef] {
        &self.affected
    }

    pub fn cause(&self) -> DeathCause {
        self.cause
    }

    pub fn barrage_in_flight(&self) -> u32 {
        self.barrage_in_flight
    }

    /// Arm the sequence. Only the first trigger of a lifetime counts.
    pub fn start(
        &mut self,
        source: TargetRef,
        affected: Vec<TargetRef>,
        cause: DeathCause,
        t: &EffectTunables,
    ) -> bool {
        if !matches!(self.stage, EffectStage::Dormant) {
            return false;
        }
        self.source = Some(source);
        self.affected = affected.into_iter().filter(|a| *a != source).collect();
        self.cause = cause;
        self.stage = EffectStage::AwaitOwnTorpedoes(once(t.own_torpedo_timeout_secs));
        true
    }

    pub fn on_barrage_hit(&mut self) {
        self.barrage_in_flight = self.barrage_in_flight.saturating_sub(1);
    }

    /// Advance by `dt`. `own_torpedoes` is how many torpedoes are still flying at the source.
    pub fn advance(
        &mut self,
        dt: std::time::Duration,
        own_torpedoes: u32,
        t: &EffectTunables,
    ) -> Vec<EffectAction> {
        let mut actions = Vec::new();
        let kind = self.kind;
        let stage = std::mem::take(&mut self.stage);

        self.stage = match stage {
            EffectStage::AwaitOwnTorpedoes(mut timer) => {
                let timed_out = finished(&mut timer, dt);
                if own_torpedoes == 0 || timed_out {
                    if timed_out && own_torpedoes > 0 {
                        warn!(
                            ?kind,
                            own_torpedoes, "effect fish stopped waiting for its own torpedoes"
                        );
                    }
                    EffectStage::Charging(once(kind.charge_secs(t)))
                } else {
                    EffectStage::AwaitOwnTorpedoes(timer)
                }
            }
            EffectStage::Charging(mut timer) => {
                if !finished(&mut timer, dt) {
                    EffectStage::Charging(timer)
                } else {
                    match kind {
                        EffectKind::ChainLightning => {
                            EffectStage::Linking { next: 0, timer: once(0.0) }
                        }
                        EffectKind::Whirlpool => {
                            actions.push(EffectAction::BeginSwirl);
                            EffectStage::Swirling(once(t.whirl_secs))
                        }
                        EffectKind::TorpedoBarrage => {
                            EffectStage::Barrage { next: 0, timer: once(0.0) }
                        }
                    }
                }
            }
            EffectStage::Linking { next, mut timer } => {
                if !finished(&mut timer, dt) {
                    EffectStage::Linking { next, timer }
                } else if let Some(target) = self.affected.get(next).copied() {
                    actions.push(EffectAction::Link(target));
                    EffectStage::Linking {
                        next: next + 1,
                        timer: once(t.chain_link_secs + t.chain_step_delay_secs),
                    }
                } else {
                    EffectStage::Buffer(once(t.chain_buffer_secs))
                }
            }
            EffectStage::Swirling(mut timer) => {
                if finished(&mut timer, dt) {
                    actions.push(EffectAction::DespawnAffected);
                    actions.push(EffectAction::DespawnSource);
                    EffectStage::Done
                } else {
                    EffectStage::Swirling(timer)
                }
            }
            EffectStage::Buffer(mut timer) => {
                if finished(&mut timer, dt) {
                    actions.push(EffectAction::DespawnAffected);
                    actions.push(EffectAction::DespawnSource);
                    EffectStage::Done
                } else {
                    EffectStage::Buffer(timer)
                }
            }
            EffectStage::Barrage { next, mut timer } => {
                if !finished(&mut timer, dt) {
                    EffectStage::Barrage { next, timer }
                } else if let Some(target) = self.affected.get(next).copied() {
                    actions.push(EffectAction::FireCrabTorpedo(target));
                    self.barrage_in_flight += 1;
                    EffectStage::Barrage { next: next + 1, timer: once(t.barrage_interval_secs) }
                } else {
                    EffectStage::AwaitBarrage(once(t.barrage_hit_timeout_secs))
                }
            }
            EffectStage::AwaitBarrage(mut timer) => {
                let timed_out = finished(&mut timer, dt);
                if self.barrage_in_flight == 0 || timed_out {
                    if timed_out && self.barrage_in_flight > 0 {
                        warn!(
                            in_flight = self.barrage_in_flight,
                            "crab torpedoes never landed, clearing targets"
                        );
                        actions.push(EffectAction::DespawnAffected);
                        self.barrage_in_flight = 0;
                    }
                    actions.push(EffectAction::Escape);
                    EffectStage::Escaping
                } else {
                    EffectStage::AwaitBarrage(timer)
                }
            }
            other @ (EffectStage::Dormant | EffectStage::Escaping | EffectStage::Done) => other,
        };
        actions
    }
}

/// Start sequences for effect fish the server just killed.
pub fn start_effect_sequences(
    tunables: Res<Tunables>,
    mut triggers: MessageReader<EffectTrigger>,
    mut q_fish: Query<(&FishLife, &mut EffectSequence)>,
    mut commands_out: MessageWriter<FishCommand>,
) {
    for trigger in triggers.read() {
        let source = trigger.source;
        let Ok((life, mut seq)) = q_fish.get_mut(source.entity) else {
            warn!(?source, "effect trigger for a fish without an effect");
            continue;
        };
        if life.serial() != source.serial || !life.in_scene() {
            debug!(?source, "effect trigger for a stale lifetime, ignoring");
            continue;
        }
        if !seq.start(source, trigger.affected.clone(), trigger.cause, &tunables.effects) {
            debug!(?source, "effect sequence already running");
            continue;
        }

        info!(kind = ?seq.kind, affected = seq.affected().len(), "effect sequence started");
        if let Some(reward) = trigger.reward {
            commands_out.write(FishCommand::SetReward { target: source, reward });
        }
        commands_out.write(FishCommand::MarkPendingDeath { target: source });
        for target in seq.affected() {
            commands_out.write(FishCommand::MarkPendingDeath { target: *target });
        }
    }
}

pub fn advance_effect_sequences(
    time: Res<Time>,
    tunables: Res<Tunables>,
    candidates: Res<TargetCandidates>,
    mut q_fish: Query<(Entity, &FishLife, &mut EffectSequence, &Transform)>,
    mut fish_out: MessageWriter<FishCommand>,
    mut links: MessageWriter<EffectLink>,
    mut launches: MessageWriter<LaunchTorpedo>,
) {
    let t = &tunables.effects;
    for (entity, life, mut seq, tf) in &mut q_fish {
        if !seq.is_running() {
            continue;
        }
        let source = TargetRef { entity, serial: life.serial() };
        if !life.in_scene() {
            // Returned to the pool with the sequence half done.
            let kind = seq.kind;
            *seq = EffectSequence::new(kind);
            continue;
        }

        let actions = seq.advance(time.delta(), life.active_torpedo_count(), t);
        let cause = seq.cause();
        for action in actions {
            match action {
                EffectAction::Link(to) => {
                    links.write(EffectLink { from: source, to, kind: seq.kind });
                }
                EffectAction::BeginSwirl => {
                    debug!(?source, "whirlpool swirl started");
                }
                EffectAction::FireCrabTorpedo(target) => match candidates.get(target) {
                    Some(c) => {
                        launches.write(LaunchTorpedo {
                            origin: tf.translation.truncate(),
                            target,
                            target_position: c.position,
                            kind: TorpedoKind::Crab { crab: source },
                        });
                    }
                    None => {
                        // Already gone: nothing to fly at, nothing to wait for.
                        seq.on_barrage_hit();
                        fish_out.write(FishCommand::ForceDespawn { target, cause });
                    }
                },
                EffectAction::DespawnAffected => {
                    for target in seq.affected() {
                        fish_out.write(FishCommand::ForceDespawn { target: *target, cause });
                    }
                }
                EffectAction::DespawnSource => {
                    fish_out.write(FishCommand::ForceDespawn { target: source, cause });
                }
                EffectAction::Escape => {
                    fish_out.write(FishCommand::Escape {
                        target: source,
                        speed_multiplier: t.escape_speed_multiplier,
                    });
                }
            }
        }
    }
}

/// Count crab torpedo impacts back into the crab's sequence.
pub fn count_barrage_impacts(
    mut resolved: MessageReader<TorpedoResolved>,
    mut q_fish: Query<(&FishLife, &mut EffectSequence)>,
) {
    for ev in resolved.read() {
        let TorpedoKind::Crab { crab } = ev.kind else {
            continue;
        };
        let Ok((life, mut seq)) = q_fish.get_mut(crab.entity) else {
            continue;
        };
        if life.serial() == crab.serial {
            seq.on_barrage_hit();
        }
    }
}

/// Affected fish spiral into a swirling whirlpool crab.
pub fn swirl_affected_fish(
    q_crabs: Query<(&EffectSequence, &Transform)>,
    mut q_fish: Query<(&FishLife, &mut Transform), Without<EffectSequence>>,
    tunables: Res<Tunables>,
) {
    let radius = tunables.effects.whirl_radius;
    for (seq, crab_tf) in &q_crabs {
        let Some(progress) = seq.swirl_fraction() else {
            continue;
        };
        let centre = crab_tf.translation.truncate();
        let count = seq.affected().len().max(1) as f32;
        for (i, target) in seq.affected().iter().enumerate() {
            let Ok((life, mut tf)) = q_fish.get_mut(target.entity) else {
                continue;
            };
            if life.serial() != target.serial || !life.pending_visual_death() {
                continue;
            }
            let angle = std::f32::consts::TAU * (i as f32 / count + progress * 1.5);
            let r = radius * (1.0 - progress);
            let p = centre + Vec2::from_angle(angle) * r;
            tf.translation.x = p.x;
            tf.translation.y = p.y;
        }
    }
}

#[derive(Component, Debug, Clone)]
pub struct Bubble {
    pub owner: Entity,
    pub angle: f32,
    pub age: f32,
}

#[derive(Debug, Default)]
struct CrabWhirl {
    bubbles: ObjectPool<Entity>,
    spawn_clock: f32,
}

/// Bubble pools, one per whirlpool crab entity. Survive pool reuse of the crab.
#[derive(Resource, Debug, Default)]
pub struct Whirlpools {
    per_crab: HashMap<Entity, CrabWhirl>,
}

impl Whirlpools {
    pub fn bubbles_in_use(&self, crab: Entity) -> usize {
        self.per_crab.get(&crab).map_or(0, |w| w.bubbles.in_use_len())
    }
}

fn whirl_is_live(life: &FishLife, seq: &EffectSequence) -> bool {
    seq.kind == EffectKind::Whirlpool && life.in_scene() && !life.is_despawning() && !seq.is_done()
}

/// Keep a live bubble crab surrounded by pooled bubbles; reclaim them all when it stops.
pub fn run_whirlpools(
    mut commands: Commands,
    time: Res<Time>,
    tunables: Res<Tunables>,
    mut whirlpools: ResMut<Whirlpools>,
    q_crabs: Query<(Entity, &FishLife, &EffectSequence, &Transform)>,
    mut q_bubbles: Query<(&mut Bubble, &mut Transform, &mut Visibility), Without<FishLife>>,
) {
    let t = &tunables.effects;
    let dt = time.delta_secs();

    for (crab, life, seq, _) in &q_crabs {
        if whirl_is_live(life, seq) {
            whirlpools.per_crab.entry(crab).or_default();
        }
    }

    for (crab, whirl) in whirlpools.per_crab.iter_mut() {
        let live = q_crabs.get(*crab).ok().filter(|(_, life, seq, _)| whirl_is_live(life, seq));
        let Some((_, _, _, crab_tf)) = live else {
            for bubble in whirl.bubbles.release_all() {
                commands.entity(bubble).insert(Visibility::Hidden);
            }
            whirl.spawn_clock = 0.0;
            continue;
        };
        let centre = crab_tf.translation.truncate();

        whirl.spawn_clock += dt;
        if whirl.spawn_clock >= t.bubble_interval_secs {
            whirl.spawn_clock = 0.0;
            let angle = (time.elapsed_secs() * 7.3).rem_euclid(std::f32::consts::TAU);
            let acquired = whirl.bubbles.acquire_or_create(|| {
                commands
                    .spawn((
                        Name::new("WhirlpoolBubble"),
                        Sprite {
                            color: Color::srgba(0.8, 0.95, 1.0, 0.7),
                            custom_size: Some(Vec2::splat(10.0)),
                            ..default()
                        },
                        Transform::from_xyz(0.0, 0.0, 3.0),
                        Visibility::Hidden,
                    ))
                    .id()
            });
            if let Acquired::Created(_) = acquired {
                debug!(crab = ?crab, "whirlpool bubble pool grew");
            }
            commands.entity(acquired.item()).insert((
                Bubble { owner: *crab, angle, age: 0.0 },
                Visibility::Visible,
            ));
        }

        let mut expired = Vec::new();
        for &bubble in whirl.bubbles.in_use() {
            let Ok((mut b, mut tf, _)) = q_bubbles.get_mut(bubble) else {
                continue;
            };
            b.age += dt;
            let progress = (b.age / t.bubble_lifetime_secs.max(1e-3)).min(1.0);
            if progress >= 1.0 {
                expired.push(bubble);
                continue;
            }
            let radius = t.whirl_radius * (1.0 - progress);
            let p = centre + Vec2::from_angle(b.angle + progress * 4.0) * radius;
            tf.translation.x = p.x;
            tf.translation.y = p.y;
        }
        for bubble in expired {
            whirl.bubbles.release(bubble);
            if let Ok((_, _, mut vis)) = q_bubbles.get_mut(bubble) {
                *vis = Visibility::Hidden;
            }
        }
    }
}
