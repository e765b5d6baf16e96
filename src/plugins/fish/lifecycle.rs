//! Fish lifecycle state machine.
//!
//! ```text
//!  Idle ──spawn──► Spawning ──fade-in──► Alive ──die / mark_pending_death──► PendingDeath
//!                     │                    │                                     │
//!                     │                    └──path end / force_despawn──┐        │ hold released and
//!                     │                                                 ▼        ▼ no torpedo in flight
//!                     └───────────── life watchdog ───────────────► Despawning ◄─┘ (or timeout)
//!                                                                       │
//!                                                   fade done / fallback│
//!                                                                       ▼
//!                                                              finalize (once) ──► Idle
//! ```
//!
//! `FishLife` is plain data plus transitions. It never touches the world: systems feed
//! it commands and `dt`, and a single commit system acts on `LifeStep::ReadyToFinalize`.
//!
//! Every timer lives in `LifeTimers` as an `Option<Timer>`. Cancelling is setting the
//! option to `None`, and `finalize` clears all of them, so nothing scheduled for one
//! lifetime can fire against the next.

use std::time::Duration;

use bevy::prelude::*;

use crate::common::tunables::FishTunables;

use super::data::{DeathCause, DespawnReward};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifePhase {
    #[default]
    Idle,
    Spawning,
    Alive,
    PendingDeath,
    Despawning,
}

/// Who decides when a pending-death fish may move on to despawning.
#[derive(Debug, Clone, Default)]
enum DeathHold {
    #[default]
    Released,
    /// Local death animation.
    Animating(Timer),
    /// An effect sequence owns this fish and will force-despawn it.
    External,
}

#[derive(Debug, Clone, Default)]
struct LifeTimers {
    fade_in: Option<Timer>,
    watchdog: Option<Timer>,
    last_torpedo: Option<Timer>,
    killing_torpedo: Option<Timer>,
    finalize_fallback: Option<Timer>,
}

/// Per-lifetime copy of the timing knobs, taken at spawn.
#[derive(Debug, Clone, Copy, Default)]
struct LifeTimings {
    death_hold_secs: f32,
    last_torpedo_timeout_secs: f32,
    killing_torpedo_timeout_secs: f32,
    finalize_fallback_secs: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifeStep {
    Idle,
    Running,
    ReadyToFinalize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Finalized {
    pub serial: u64,
    pub cause: DeathCause,
    pub reward: Option<DespawnReward>,
}

#[derive(Component, Debug, Clone, Default)]
pub struct FishLife {
    serial: u64,
    phase: LifePhase,
    is_despawning: bool,
    pending_visual_death: bool,
    finalized: bool,
    kill_on_torpedo_arrival: bool,
    waiting_for_killing_torpedo: bool,
    escaping: bool,
    death_cause: DeathCause,
    visible: bool,
    collider_enabled: bool,
    movement_frozen: bool,
    active_torpedo_count: u32,
    fade_complete: bool,
    finalize_ready: bool,
    hold: DeathHold,
    timers: LifeTimers,
    timings: LifeTimings,
    reward: Option<DespawnReward>,
}

#[inline]
fn once(secs: f32) -> Timer {
    Timer::from_seconds(secs.max(0.0), TimerMode::Once)
}

impl FishLife {
    /// A freshly initialized lifetime: every flag reset, fade-in started, watchdog armed.
    pub fn spawned(serial: u64, lifespan_ms: u64, death_hold_secs: f32, t: &FishTunables) -> Self {
        let watchdog_secs = lifespan_ms as f32 / 1000.0 + t.life_margin_secs;
        Self {
            serial,
            phase: LifePhase::Spawning,
            collider_enabled: true,
            timers: LifeTimers {
                fade_in: Some(once(t.fade_in_secs)),
                watchdog: Some(once(watchdog_secs)),
                ..default()
            },
            timings: LifeTimings {
                death_hold_secs,
                last_torpedo_timeout_secs: t.last_torpedo_timeout_secs,
                killing_torpedo_timeout_secs: t.killing_torpedo_timeout_secs,
                finalize_fallback_secs: t.finalize_fallback_secs,
            },
            ..default()
        }
    }

    pub fn initialize(
        &mut self,
        serial: u64,
        lifespan_ms: u64,
        death_hold_secs: f32,
        t: &FishTunables,
    ) {
        *self = Self::spawned(serial, lifespan_ms, death_hold_secs, t);
    }

    #[inline]
    pub fn serial(&self) -> u64 {
        self.serial
    }
    #[inline]
    pub fn phase(&self) -> LifePhase {
        self.phase
    }
    #[inline]
    pub fn is_despawning(&self) -> bool {
        self.is_despawning
    }
    #[inline]
    pub fn pending_visual_death(&self) -> bool {
        self.pending_visual_death
    }
    #[inline]
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }
    #[inline]
    pub fn kill_on_torpedo_arrival(&self) -> bool {
        self.kill_on_torpedo_arrival
    }
    #[inline]
    pub fn waiting_for_killing_torpedo(&self) -> bool {
        self.waiting_for_killing_torpedo
    }
    #[inline]
    pub fn is_escaping(&self) -> bool {
        self.escaping
    }
    #[inline]
    pub fn death_cause(&self) -> DeathCause {
        self.death_cause
    }
    #[inline]
    pub fn visible(&self) -> bool {
        self.visible
    }
    #[inline]
    pub fn collider_enabled(&self) -> bool {
        self.collider_enabled
    }
    #[inline]
    pub fn movement_frozen(&self) -> bool {
        self.movement_frozen
    }
    #[inline]
    pub fn active_torpedo_count(&self) -> u32 {
        self.active_torpedo_count
    }
    /// Set by `tick` once the despawn fade (or its fallback) is done.
    #[inline]
    pub fn is_ready_to_finalize(&self) -> bool {
        self.finalize_ready && !self.finalized
    }
    #[inline]
    pub fn in_scene(&self) -> bool {
        self.phase != LifePhase::Idle && !self.finalized
    }

    /// Spawn fade progress in `0..=1`, for presentation.
    pub fn fade_in_fraction(&self) -> f32 {
        match (&self.timers.fade_in, self.phase) {
            (Some(t), LifePhase::Spawning) => t.fraction(),
            (_, LifePhase::Idle) => 0.0,
            _ => 1.0,
        }
    }

    /// Lifecycle half of the target validity predicate. Visibility comes from the last
    /// `set_visible` call.
    pub fn is_targetable(&self) -> bool {
        matches!(self.phase, LifePhase::Spawning | LifePhase::Alive)
            && !self.is_despawning
            && !self.pending_visual_death
            && !self.finalized
            && !self.escaping
            && self.collider_enabled
            && self.visible
    }

    /// Expiry cleanup from the server is ignored while a visual death is being held.
    #[inline]
    pub fn ignores_expiry(&self) -> bool {
        self.pending_visual_death
    }

    #[inline]
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible && self.in_scene();
    }

    pub fn set_reward(&mut self, reward: DespawnReward) {
        if !self.finalized {
            self.reward = Some(reward);
        }
    }

    fn accepts_death(&self) -> bool {
        matches!(self.phase, LifePhase::Spawning | LifePhase::Alive)
            && !self.is_despawning
            && !self.pending_visual_death
            && !self.finalized
            && !self.escaping
    }

    fn enter_pending_death(&mut self, cause: DeathCause) {
        self.phase = LifePhase::PendingDeath;
        if cause != DeathCause::None {
            self.death_cause = cause;
        }
        self.collider_enabled = false;
        self.movement_frozen = true;
        self.timers.fade_in = None;
        self.timers.killing_torpedo = None;
    }

    fn begin_despawn(&mut self) {
        self.is_despawning = true;
        self.phase = LifePhase::Despawning;
        self.collider_enabled = false;
        self.movement_frozen = true;
        self.pending_visual_death = false;
        self.kill_on_torpedo_arrival = false;
        self.waiting_for_killing_torpedo = false;
        self.fade_complete = false;
        self.finalize_ready = false;
        self.hold = DeathHold::Released;
        self.timers = LifeTimers {
            finalize_fallback: Some(once(self.timings.finalize_fallback_secs)),
            ..default()
        };
    }

    /// Start the local death. No-op (returns `false`) while despawning, while a visual
    /// death is held, while a kill waits for its torpedo, or after the first call.
    pub fn die(&mut self, cause: DeathCause) -> bool {
        if !self.accepts_death()
            || self.kill_on_torpedo_arrival
            || self.waiting_for_killing_torpedo
        {
            return false;
        }
        self.enter_pending_death(cause);
        self.hold = if self.timings.death_hold_secs > 0.0 {
            DeathHold::Animating(once(self.timings.death_hold_secs))
        } else {
            DeathHold::Released
        };
        true
    }

    /// A kill confirmed by the server. Torpedo kills with a torpedo still in the air wait
    /// for it to land so the fish does not die before the visible impact.
    pub fn confirm_kill(&mut self, cause: DeathCause) -> bool {
        if cause == DeathCause::Torpedo && self.active_torpedo_count > 0 {
            let timeout = self.timings.killing_torpedo_timeout_secs;
            return self.wait_for_torpedo_kill(timeout);
        }
        self.die(cause)
    }

    /// Freeze collision and movement without finalizing. Despawn is left to whoever
    /// marked the fish.
    pub fn mark_pending_death(&mut self) -> bool {
        let eligible = matches!(
            self.phase,
            LifePhase::Spawning | LifePhase::Alive | LifePhase::PendingDeath
        );
        if !eligible || self.is_despawning || self.finalized || self.pending_visual_death {
            return false;
        }
        if self.phase != LifePhase::PendingDeath {
            self.enter_pending_death(DeathCause::None);
        }
        self.pending_visual_death = true;
        self.hold = DeathHold::External;
        true
    }

    /// Skip any hold and start despawning now.
    pub fn force_despawn(&mut self, cause: DeathCause) -> bool {
        if self.phase == LifePhase::Idle || self.is_despawning || self.finalized {
            return false;
        }
        if cause != DeathCause::None {
            self.death_cause = cause;
        }
        self.begin_despawn();
        true
    }

    pub fn on_path_complete(&mut self) -> bool {
        if !matches!(self.phase, LifePhase::Spawning | LifePhase::Alive) || self.is_despawning {
            return false;
        }
        self.escaping = false;
        self.begin_despawn();
        true
    }

    pub fn register_incoming_torpedo(&mut self) -> bool {
        if !self.in_scene() {
            return false;
        }
        self.active_torpedo_count += 1;
        true
    }

    pub fn unregister_incoming_torpedo(&mut self) {
        self.active_torpedo_count = self.active_torpedo_count.saturating_sub(1);
    }

    /// Defer the kill until the torpedo addressed to this fish arrives. A fail-safe kills
    /// the fish anyway after `timeout_secs`.
    pub fn wait_for_torpedo_kill(&mut self, timeout_secs: f32) -> bool {
        if !self.accepts_death() || self.kill_on_torpedo_arrival {
            return false;
        }
        self.kill_on_torpedo_arrival = true;
        self.waiting_for_killing_torpedo = true;
        self.timers.killing_torpedo = Some(once(timeout_secs));
        true
    }

    /// A torpedo landed on this fish. Delivers a deferred kill, if one is waiting.
    pub fn on_torpedo_impact(&mut self) -> bool {
        if !self.kill_on_torpedo_arrival {
            return false;
        }
        self.kill_on_torpedo_arrival = false;
        self.waiting_for_killing_torpedo = false;
        self.timers.killing_torpedo = None;
        self.die(DeathCause::Torpedo)
    }

    /// Leave a held death alive: movement resumes, the fish stays untargetable and
    /// despawns when its path ends.
    pub fn escape(&mut self) -> bool {
        if self.phase != LifePhase::PendingDeath || self.is_despawning || self.finalized {
            return false;
        }
        self.phase = LifePhase::Alive;
        self.pending_visual_death = false;
        self.movement_frozen = false;
        self.escaping = true;
        self.hold = DeathHold::Released;
        true
    }

    /// The despawn fade for `serial` finished. Stale notifications are ignored.
    pub fn notify_fade_complete(&mut self, serial: u64) -> bool {
        if serial != self.serial || self.phase != LifePhase::Despawning {
            return false;
        }
        self.fade_complete = true;
        true
    }

    /// Advance every timer by `dt`.
    pub fn tick(&mut self, dt: Duration) -> LifeStep {
        if self.phase == LifePhase::Idle || self.finalized {
            return LifeStep::Idle;
        }

        let watchdog_fired = self.timers.watchdog.as_mut().is_some_and(|w| {
            w.tick(dt);
            w.is_finished()
        });
        if watchdog_fired && !self.is_despawning {
            warn!(
                serial = self.serial,
                phase = ?self.phase,
                "life watchdog fired, forcing despawn"
            );
            self.begin_despawn();
        }

        match self.phase {
            LifePhase::Spawning | LifePhase::Alive => self.tick_alive(dt),
            LifePhase::PendingDeath => self.tick_pending_death(dt),
            LifePhase::Despawning | LifePhase::Idle => {}
        }

        if self.phase != LifePhase::Despawning {
            return LifeStep::Running;
        }
        if self.fade_complete {
            self.finalize_ready = true;
            return LifeStep::ReadyToFinalize;
        }
        let fallback_fired = self.timers.finalize_fallback.as_mut().is_some_and(|t| {
            t.tick(dt);
            t.is_finished()
        });
        if fallback_fired {
            warn!(serial = self.serial, "despawn fade never reported back, finalizing on fallback");
            self.finalize_ready = true;
            return LifeStep::ReadyToFinalize;
        }
        LifeStep::Running
    }

    fn tick_alive(&mut self, dt: Duration) {
        if let Some(fade) = self.timers.fade_in.as_mut() {
            fade.tick(dt);
            if fade.is_finished() {
                self.timers.fade_in = None;
                self.phase = LifePhase::Alive;
            }
        }

        let kill_timed_out = self.timers.killing_torpedo.as_mut().is_some_and(|t| {
            t.tick(dt);
            t.is_finished()
        });
        if kill_timed_out {
            warn!(serial = self.serial, "killing torpedo never arrived, dying without it");
            self.kill_on_torpedo_arrival = false;
            self.waiting_for_killing_torpedo = false;
            self.timers.killing_torpedo = None;
            self.die(DeathCause::Torpedo);
        }
    }

    fn tick_pending_death(&mut self, dt: Duration) {
        let released = match &mut self.hold {
            DeathHold::Animating(t) => {
                t.tick(dt);
                t.is_finished()
            }
            DeathHold::External => false,
            DeathHold::Released => true,
        };
        if !released {
            return;
        }
        self.hold = DeathHold::Released;

        if self.active_torpedo_count == 0 {
            self.begin_despawn();
            return;
        }

        let timeout = self.timings.last_torpedo_timeout_secs;
        let wait = self.timers.last_torpedo.get_or_insert_with(|| once(timeout));
        wait.tick(dt);
        if wait.is_finished() {
            warn!(
                serial = self.serial,
                in_flight = self.active_torpedo_count,
                "incoming torpedoes never arrived, despawning anyway"
            );
            self.begin_despawn();
        }
    }

    /// Return-to-pool bookkeeping. Runs at most once per lifetime; later calls return `None`.
    pub fn finalize(&mut self) -> Option<Finalized> {
        if self.finalized || self.phase != LifePhase::Despawning {
            return None;
        }
        self.finalized = true;
        self.finalize_ready = false;
        self.phase = LifePhase::Idle;
        self.timers = LifeTimers::default();
        self.hold = DeathHold::Released;
        self.collider_enabled = false;
        self.visible = false;
        self.active_torpedo_count = 0;
        Some(Finalized { serial: self.serial, cause: self.death_cause, reward: self.reward.take() })
    }
}
