//! Domain messages crossing the network boundary.
//!
//! Decoding turns server frames into these; weapons and the spawn flow write the
//! outgoing ones and never see JSON.

use bevy::prelude::*;

use crate::plugins::fish::spawn::SpawnBatch;
use crate::plugins::weapons::WeaponKind;

/// Ask the server for the next spawn batches.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnRequest;

#[derive(Message, Debug, Clone, PartialEq)]
pub struct HitRequest {
    pub bet_index: usize,
    pub fish_id: String,
    pub weapon: WeaponKind,
}

#[derive(Message, Debug, Clone, PartialEq)]
pub struct SpawnBatchesReceived {
    pub batches: Vec<SpawnBatch>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KilledFish {
    pub fish_id: String,
    pub variant: Option<String>,
    pub payout: f64,
    pub affected_ids: Vec<String>,
}

#[derive(Message, Debug, Clone, PartialEq)]
pub struct HitResultReceived {
    /// `None` when the server named a weapon we don't know.
    pub weapon: Option<WeaponKind>,
    pub killed: Option<KilledFish>,
    pub fish_id: Option<String>,
    pub expired: bool,
    pub success: bool,
    pub message: String,
}

impl HitResultReceived {
    /// The fish this result is about: the killed one, else the one named.
    pub fn subject_id(&self) -> Option<&str> {
        self.killed
            .as_ref()
            .map(|k| k.fish_id.as_str())
            .or(self.fish_id.as_deref())
    }
}
