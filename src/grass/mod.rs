//! Chunked instanced grass with per-blade LOD.
//!
//! A [`GrassGroup`] splits a rectangular field into a grid of
//! [`GrassChunk`]s. Each frame the group tests every chunk's bounds against
//! a sphere around the camera whose radius is the farthest LOD switch
//! distance. Chunks inside classify each blade by its camera distance;
//! chunks outside pin all blades to the lowest-detail tier. Either way the
//! chunk then compacts its blade transforms into one instance buffer per
//! tier, so the renderer issues one draw per tier with an exact count.

pub mod config;
pub mod scatter;
pub mod chunk;
pub mod group;
pub mod stats;

pub use config::{GrassGroupConfig, ScaleRange};
pub use scatter::{BladeBuffers, scatter_blades, TRANSFORM_STRIDE, POSITION_STRIDE};
pub use chunk::{GrassChunk, ChunkState};
pub use group::{GrassGroup, DrawCall};
pub use stats::LodStats;
