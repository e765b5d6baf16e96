//! Network boundary.
//!
//! The transport is outside this crate: it pushes raw JSON frames into `NetInbox` and
//! sends whatever it finds in `NetOutbox`. Inside, frames become messages in
//! `ArcadeSet::Ingest`, and outgoing requests are encoded in `ArcadeSet::Commit`.

pub mod messages;
pub mod wire;

use std::collections::VecDeque;

use bevy::prelude::*;

use crate::common::error::ArcadeError;
use crate::common::schedule::ArcadeSet;

use messages::{HitRequest, HitResultReceived, SpawnBatchesReceived, SpawnRequest};
use wire::Inbound;

#[derive(Resource, Debug, Default)]
pub struct NetInbox {
    frames: VecDeque<String>,
}

impl NetInbox {
    pub fn push(&mut self, frame: impl Into<String>) {
        self.frames.push_back(frame.into());
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundFrame {
    pub event: &'static str,
    pub body: String,
}

#[derive(Resource, Debug, Default)]
pub struct NetOutbox {
    frames: Vec<OutboundFrame>,
}

impl NetOutbox {
    /// Hand every pending frame to the transport.
    pub fn drain(&mut self) -> Vec<OutboundFrame> {
        std::mem::take(&mut self.frames)
    }

    pub fn frames(&self) -> &[OutboundFrame] {
        &self.frames
    }
}

/// Bet levels from the session and the one currently selected.
#[derive(Resource, Debug, Clone, Default)]
pub struct BetSelection {
    pub bets: Vec<f64>,
    pub index: usize,
}

impl BetSelection {
    pub fn bet_index(&self) -> usize {
        self.index
    }

    pub fn current_bet(&self) -> Option<f64> {
        self.bets.get(self.index).copied()
    }
}

pub fn decode_inbound_frames(
    mut inbox: ResMut<NetInbox>,
    mut bets: ResMut<BetSelection>,
    mut spawn_requests: MessageWriter<SpawnRequest>,
    mut spawn_batches: MessageWriter<SpawnBatchesReceived>,
    mut hit_results: MessageWriter<HitResultReceived>,
) {
    while let Some(frame) = inbox.frames.pop_front() {
        match wire::decode_frame(&frame) {
            Ok(Inbound::InitData { bets: levels }) => {
                info!(bets = levels.len(), "session initialised");
                if !levels.is_empty() {
                    bets.index = bets.index.min(levels.len() - 1);
                    bets.bets = levels;
                }
                spawn_requests.write(SpawnRequest);
            }
            Ok(Inbound::SpawnResult(batches)) => {
                debug!(batches = batches.len(), "spawn result received");
                spawn_batches.write(SpawnBatchesReceived { batches });
            }
            Ok(Inbound::HitResult(result)) => {
                hit_results.write(result);
            }
            Err(ArcadeError::UnknownEnvelope(id)) => {
                debug!(%id, "ignoring unhandled server event");
            }
            Err(err) => {
                warn!(%err, len = frame.len(), "dropping malformed server frame");
            }
        }
    }
}

pub fn encode_outbound_requests(
    mut spawn_requests: MessageReader<SpawnRequest>,
    mut hit_requests: MessageReader<HitRequest>,
    mut outbox: ResMut<NetOutbox>,
) {
    // Several producers may ask for spawns in one frame; the server needs one.
    if spawn_requests.read().count() > 0 {
        match wire::encode_spawn_request() {
            Ok(body) => outbox.frames.push(OutboundFrame { event: wire::REQUEST_EVENT, body }),
            Err(err) => error!(%err, "could not encode spawn request"),
        }
    }
    for hit in hit_requests.read() {
        match wire::encode_hit_request(hit) {
            Ok(body) => outbox.frames.push(OutboundFrame { event: wire::REQUEST_EVENT, body }),
            Err(err) => error!(%err, fish_id = %hit.fish_id, "could not encode hit request"),
        }
    }
}

pub fn plugin(app: &mut App) {
    app.init_resource::<NetInbox>()
        .init_resource::<NetOutbox>()
        .init_resource::<BetSelection>()
        .add_message::<SpawnRequest>()
        .add_message::<HitRequest>()
        .add_message::<SpawnBatchesReceived>()
        .add_message::<HitResultReceived>();

    app.add_systems(Update, decode_inbound_frames.in_set(ArcadeSet::Ingest))
        .add_systems(Update, encode_outbound_requests.in_set(ArcadeSet::Commit));
}
