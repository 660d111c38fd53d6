//! Error types for the grass LOD engine

use glam::Vec3;
use thiserror::Error;

/// Main error type for the engine
#[derive(Debug, Error)]
pub enum Error {
    #[error("LOD tier list is empty")]
    EmptyTiers,

    #[error("too many LOD tiers: {0} (at most 256 fit a u8 tier index)")]
    TooManyTiers(usize),

    #[error("LOD tier {index} has invalid switch distance {value}")]
    InvalidDistance { index: usize, value: f32 },

    #[error("LOD tier {index} switch distance {current} does not exceed previous {previous}")]
    UnorderedTiers { index: usize, previous: f32, current: f32 },

    #[error("{buffer} buffer has length {actual}, expected {expected}")]
    BufferLength { buffer: &'static str, expected: usize, actual: usize },

    #[error("blade {index} has a non-finite world position")]
    NonFinitePosition { index: usize },

    #[error("camera position {0} is not finite")]
    InvalidCamera(Vec3),

    #[error("Config error: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
