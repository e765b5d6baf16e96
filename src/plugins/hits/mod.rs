//! Hit resolution: server verdicts and torpedo impacts become `FishCommand`s.
//!
//! ```text
//! HitResultReceived ─┬─ laser verdict        -> LaserGun may report again
//!                    ├─ kill, effect fish    -> EffectTrigger (affected ids resolved)
//!                    ├─ kill                 -> SetReward + ConfirmKill
//!                    └─ expired              -> ExpireCleanup
//! TorpedoResolved ───┬─ any                  -> TorpedoArrived
//!                    └─ crab barrage         -> ForceDespawn
//! ```
//!
//! The server is authoritative, so verdicts about fish we no longer track are logged and
//! dropped. The client may simply have despawned them first.

use bevy::prelude::*;

use crate::common::schedule::ArcadeSet;
use crate::common::tunables::Tunables;
use crate::plugins::fish::effects::{EffectSequence, EffectTrigger};
use crate::plugins::fish::{DeathCause, DespawnReward, FishCommand, FishRegistry, TargetRef};
use crate::plugins::network::messages::{HitResultReceived, KilledFish};
use crate::plugins::projectiles::messages::{TorpedoKind, TorpedoResolved};
use crate::plugins::weapons::{LaserGun, WeaponKind};

pub fn plugin(app: &mut App) {
    app.add_systems(
        Update,
        (resolve_hit_results, resolve_torpedo_impacts).in_set(ArcadeSet::Resolve),
    );
}

pub fn resolve_hit_results(
    time: Res<Time>,
    tunables: Res<Tunables>,
    registry: Res<FishRegistry>,
    q_effect: Query<(), With<EffectSequence>>,
    mut laser: ResMut<LaserGun>,
    mut results: MessageReader<HitResultReceived>,
    mut fish_out: MessageWriter<FishCommand>,
    mut triggers: MessageWriter<EffectTrigger>,
) {
    let now = time.elapsed_secs();
    for result in results.read() {
        if result.weapon == Some(WeaponKind::Laser) {
            laser.on_hit_result(now, tunables.weapons.laser_hit_interval_secs);
        }

        if let Some(killed) = &result.killed {
            let cause = result.weapon.map_or(DeathCause::None, WeaponKind::death_cause);
            resolve_kill(killed, cause, &registry, &q_effect, &mut fish_out, &mut triggers);
        } else if result.expired {
            let Some(fish_id) = result.subject_id() else {
                debug!("expiry without a fish id");
                continue;
            };
            match registry.lookup_id(fish_id) {
                Some(fish) => {
                    fish_out.write(FishCommand::ExpireCleanup { target: fish.target });
                }
                None => debug!(fish_id, "expiry for a fish no longer active"),
            }
        } else if !result.success {
            debug!(message = %result.message, "hit rejected");
        }
    }
}

fn resolve_kill(
    killed: &KilledFish,
    cause: DeathCause,
    registry: &FishRegistry,
    q_effect: &Query<(), With<EffectSequence>>,
    fish_out: &mut MessageWriter<FishCommand>,
    triggers: &mut MessageWriter<EffectTrigger>,
) {
    let Some(fish) = registry.lookup_id(&killed.fish_id) else {
        warn!(fish_id = %killed.fish_id, "kill for an unknown fish, ignoring");
        return;
    };
    let target = fish.target;
    let reward = (killed.payout > 0.0).then_some(DespawnReward { payout: killed.payout });

    if q_effect.contains(target.entity) {
        let affected: Vec<TargetRef> = killed
            .affected_ids
            .iter()
            .filter_map(|id| registry.lookup_id(id))
            .map(|f| f.target)
            .filter(|t| *t != target)
            .collect();
        if affected.len() < killed.affected_ids.len() {
            debug!(
                known = affected.len(),
                reported = killed.affected_ids.len(),
                "some affected fish are no longer active"
            );
        }
        triggers.write(EffectTrigger { source: target, affected, cause, reward });
        return;
    }

    if let Some(reward) = reward {
        fish_out.write(FishCommand::SetReward { target, reward });
    }
    fish_out.write(FishCommand::ConfirmKill { target, cause });
}

pub fn resolve_torpedo_impacts(
    mut resolved: MessageReader<TorpedoResolved>,
    mut fish_out: MessageWriter<FishCommand>,
) {
    for ev in resolved.read() {
        fish_out.write(FishCommand::TorpedoArrived { target: ev.target });
        if let TorpedoKind::Crab { .. } = ev.kind {
            fish_out.write(FishCommand::ForceDespawn {
                target: ev.target,
                cause: DeathCause::Torpedo,
            });
        }
    }
}
