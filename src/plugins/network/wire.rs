//! Server JSON format.
//!
//! ```text
//! in   { "success", "id": "initdata" | "spawnresult" | "hitresult", "payload", "gameData"? }
//! out  event "request": {"type":"SPAWN"}
//!      event "request": {"type":"HIT","payload":{"betIndex","fishId","weaponType"}}
//! ```
//!
//! Spawn times arrive as numbers or numeric strings (epoch millis). Fish offsets inside a
//! batch are `fish.spawnTime - batch.spawnTime`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::error::ArcadeError;
use crate::plugins::fish::FishType;
use crate::plugins::fish::spawn::{FishSpawn, PendingFish, SpawnBatch};
use crate::plugins::weapons::WeaponKind;

use super::messages::{HitRequest, HitResultReceived, KilledFish};

pub const REQUEST_EVENT: &str = "request";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    #[serde(default)]
    pub success: bool,
    pub id: String,
    #[serde(default)]
    pub payload: Option<Value>,
    #[serde(default)]
    pub game_data: Option<WireGameData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireGameData {
    #[serde(default)]
    pub bets: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WireTime {
    Number(f64),
    Text(String),
}

impl WireTime {
    pub fn millis(&self) -> Result<f64, ArcadeError> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| ArcadeError::InvalidSpawnTime(s.clone())),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSpawnPayload {
    #[serde(default)]
    pub spawn_batches: Vec<WireBatch>,
    #[serde(default)]
    pub remaining_time: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireBatch {
    #[serde(default)]
    pub batch_id: String,
    pub spawn_time: WireTime,
    #[serde(default)]
    pub fishes: Vec<WireFish>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireFish {
    pub id: String,
    #[serde(rename = "type", default)]
    pub fish_type: String,
    pub variant: String,
    #[serde(default = "one")]
    pub multiplier: f32,
    pub spawn_time: WireTime,
    #[serde(default)]
    pub lifespan: Option<u64>,
    #[serde(default)]
    pub hit_points: Option<i64>,
    #[serde(default)]
    pub max_hit_points: Option<i64>,
}

fn one() -> f32 {
    1.0
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireHitResult {
    #[serde(default)]
    pub weapon_type: Option<String>,
    #[serde(default)]
    pub fish_killed: Option<WireKill>,
    #[serde(default)]
    pub fish_id: Option<String>,
    #[serde(default)]
    pub is_expired: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub success: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireKill {
    pub id: String,
    #[serde(default)]
    pub variant: Option<String>,
    #[serde(default)]
    pub payout: f64,
    #[serde(default)]
    pub affected_fish_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<WireHitPayload<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireHitPayload<'a> {
    bet_index: usize,
    fish_id: &'a str,
    weapon_type: &'static str,
}

/// A decoded server frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    InitData { bets: Vec<f64> },
    SpawnResult(Vec<SpawnBatch>),
    HitResult(HitResultReceived),
}

pub fn decode_frame(raw: &str) -> Result<Inbound, ArcadeError> {
    let envelope: Envelope = serde_json::from_str(raw)?;
    let payload = envelope.payload.unwrap_or(Value::Null);
    match envelope.id.to_ascii_lowercase().as_str() {
        "initdata" => Ok(Inbound::InitData {
            bets: envelope.game_data.map(|g| g.bets).unwrap_or_default(),
        }),
        "spawnresult" => {
            let wire: WireSpawnPayload = serde_json::from_value(payload)?;
            let batches = wire
                .spawn_batches
                .into_iter()
                .map(spawn_batch)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Inbound::SpawnResult(batches))
        }
        "hitresult" => {
            let wire: WireHitResult = serde_json::from_value(payload)?;
            Ok(Inbound::HitResult(hit_result(wire)))
        }
        _ => Err(ArcadeError::UnknownEnvelope(envelope.id)),
    }
}

fn spawn_batch(wire: WireBatch) -> Result<SpawnBatch, ArcadeError> {
    let start = wire.spawn_time.millis()?;
    let fishes = wire
        .fishes
        .into_iter()
        .map(|fish| {
            let offset_ms = (fish.spawn_time.millis()? - start).max(0.0);
            Ok::<_, ArcadeError>(PendingFish {
                offset_secs: (offset_ms / 1000.0) as f32,
                spawn: FishSpawn {
                    fish_id: Some(fish.id),
                    fish_type: (!fish.fish_type.trim().is_empty())
                        .then(|| FishType::parse(&fish.fish_type)),
                    variant: fish.variant,
                    lifespan_ms: fish.lifespan.filter(|ms| *ms > 0),
                    multiplier: fish.multiplier,
                },
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(SpawnBatch { batch_id: wire.batch_id, fishes })
}

fn hit_result(wire: WireHitResult) -> HitResultReceived {
    HitResultReceived {
        weapon: wire.weapon_type.as_deref().and_then(WeaponKind::from_wire),
        killed: wire.fish_killed.map(|k| KilledFish {
            fish_id: k.id,
            variant: k.variant,
            payout: k.payout,
            affected_ids: k.affected_fish_ids,
        }),
        fish_id: wire.fish_id,
        expired: wire.is_expired,
        success: wire.success,
        message: wire.message,
    }
}

pub fn encode_spawn_request() -> Result<String, ArcadeError> {
    Ok(serde_json::to_string(&WireRequest { kind: "SPAWN", payload: None })?)
}

pub fn encode_hit_request(hit: &HitRequest) -> Result<String, ArcadeError> {
    let payload = WireHitPayload {
        bet_index: hit.bet_index,
        fish_id: &hit.fish_id,
        weapon_type: hit.weapon.wire_name(),
    };
    Ok(serde_json::to_string(&WireRequest { kind: "HIT", payload: Some(payload) })?)
}
