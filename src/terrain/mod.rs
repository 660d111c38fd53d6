//! Terrain height sampling used when scattering blades

pub mod sampler;
pub use sampler::{TerrainSampler, FlatTerrain};

pub mod generator;
pub use generator::{NoiseTerrain, TerrainParams};
