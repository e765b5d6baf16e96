//! Torpedo flight, as a pure state machine.
//!
//! ```text
//!   Launch ──(launch_secs elapsed)──► Homing ──(within hit_distance)──► Finished
//!     │  straight burst along the           │  re-aims at the live target
//!     │  firing direction, eased out,       │  every step, turn-rate limited
//!     │  scale pulses                       └──(max_lifetime_secs)──► Finished (forced)
//! ```
//!
//! The launch burst always lasts `launch_secs`; only its length scales with the
//! distance to the target. The homing phase is capped, so every flight terminates even
//! if the target vanished and the last known position cannot be reached.

use std::f32::consts::PI;

use bevy::prelude::*;

use crate::common::tunables::TorpedoTunables;
use crate::plugins::fish::TargetRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightPhase {
    Launch,
    Homing,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlightStep {
    Flying,
    Impact { at: Vec2, forced: bool },
    /// Already finished; nothing happened.
    Idle,
}

#[derive(Debug, Clone)]
pub struct TorpedoFlight {
    phase: FlightPhase,
    elapsed: f32,
    origin: Vec2,
    position: Vec2,
    heading: Vec2,
    launch_distance: f32,
    target: Option<TargetRef>,
    aim: Vec2,
    scale: f32,
}

impl TorpedoFlight {
    pub fn launch(
        origin: Vec2,
        target: TargetRef,
        target_position: Vec2,
        t: &TorpedoTunables,
    ) -> Self {
        let to_target = target_position - origin;
        let heading = to_target.try_normalize().unwrap_or(Vec2::Y);
        Self {
            phase: FlightPhase::Launch,
            elapsed: 0.0,
            origin,
            position: origin,
            heading,
            launch_distance: to_target.length() * t.launch_distance_factor,
            target: Some(target),
            aim: target_position,
            scale: 1.0,
        }
    }

    #[inline]
    pub fn phase(&self) -> FlightPhase {
        self.phase
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn heading(&self) -> Vec2 {
        self.heading
    }

    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    #[inline]
    pub fn target(&self) -> Option<TargetRef> {
        self.target
    }

    /// Advance by `dt`. `live_target` is the target's current position, or `None` once it
    /// is gone (the flight then keeps going for the last position it saw).
    pub fn step(
        &mut self,
        dt: f32,
        live_target: Option<Vec2>,
        viewport: Option<Rect>,
        t: &TorpedoTunables,
    ) -> FlightStep {
        if let Some(p) = live_target {
            self.aim = p;
        }
        if let Some(view) = viewport {
            self.aim = clamp_inside(self.aim, view, t.viewport_edge);
        }

        match self.phase {
            FlightPhase::Finished => FlightStep::Idle,
            FlightPhase::Launch => {
                self.elapsed += dt;
                let duration = t.launch_secs.max(f32::EPSILON);
                let f = (self.elapsed / duration).min(1.0);
                let eased = 1.0 - (1.0 - f) * (1.0 - f);
                self.position = self.origin + self.heading * self.launch_distance * eased;
                self.scale = 1.0 + t.launch_pulse * (PI * f).sin();
                if f >= 1.0 {
                    self.phase = FlightPhase::Homing;
                    self.elapsed = 0.0;
                    self.scale = 1.0;
                }
                FlightStep::Flying
            }
            FlightPhase::Homing => {
                self.elapsed += dt;
                if let Some(at) = self.home(dt, t) {
                    return self.impact(at, false);
                }
                if self.elapsed >= t.max_lifetime_secs {
                    return self.impact(self.position, true);
                }
                FlightStep::Flying
            }
        }
    }

    fn home(&mut self, dt: f32, t: &TorpedoTunables) -> Option<Vec2> {
        let to_aim = self.aim - self.position;
        let distance = to_aim.length();
        let travel = t.homing_speed * dt;
        if distance <= t.hit_distance || (distance <= travel && self.heading.dot(to_aim) > 0.0) {
            self.position = self.aim;
            return Some(self.aim);
        }

        let wanted = to_aim / distance;
        let max_turn = t.turn_rate_degrees.to_radians() * dt;
        let turn = self.heading.angle_to(wanted).clamp(-max_turn, max_turn);
        self.heading = Vec2::from_angle(turn).rotate(self.heading).normalize_or(wanted);
        self.position += self.heading * travel;

        (self.position.distance(self.aim) <= t.hit_distance).then_some(self.aim)
    }

    fn impact(&mut self, at: Vec2, forced: bool) -> FlightStep {
        self.position = at;
        self.phase = FlightPhase::Finished;
        FlightStep::Impact { at, forced }
    }

    /// Stop the flight and hand back the target it was registered on.
    ///
    /// Only the first call returns the target; later calls do nothing.
    pub fn finish(&mut self) -> Option<TargetRef> {
        self.phase = FlightPhase::Finished;
        self.scale = 1.0;
        self.target.take()
    }
}

fn clamp_inside(point: Vec2, view: Rect, edge: f32) -> Vec2 {
    let inset = view.size() * edge;
    let lo = view.min + inset;
    let hi = (view.max - inset).max(lo);
    point.clamp(lo, hi)
}
