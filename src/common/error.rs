//! Crate error type.
//!
//! Gameplay systems never return these across a frame: they log and skip.
//! Fallible helpers (decode, config load, spawn) return `Result<_, ArcadeError>`.

use std::fmt;

use crate::plugins::fish::FishType;

#[derive(Debug)]
pub enum ArcadeError {
    Decode(serde_json::Error),
    Io(std::io::Error),
    UnknownEnvelope(String),
    UnknownVariant(String),
    NoPathAvailable { fish_type: FishType, right_to_left: bool },
    InvalidSpawnTime(String),
}

impl fmt::Display for ArcadeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(e) => write!(f, "malformed json: {e}"),
            Self::Io(e) => write!(f, "io: {e}"),
            Self::UnknownEnvelope(id) => write!(f, "unknown envelope id `{id}`"),
            Self::UnknownVariant(v) => write!(f, "no template for fish variant `{v}`"),
            Self::NoPathAvailable { fish_type, right_to_left } => {
                let dir = if *right_to_left { "right-to-left" } else { "left-to-right" };
                write!(f, "no {dir} path available for {fish_type:?}")
            }
            Self::InvalidSpawnTime(raw) => write!(f, "spawn time `{raw}` is not a number"),
        }
    }
}

impl std::error::Error for ArcadeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ArcadeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e)
    }
}

impl From<std::io::Error> for ArcadeError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
