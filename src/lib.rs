//! Murova - chunked instanced grass with per-blade LOD

pub mod core;
pub mod math;
pub mod terrain;
pub mod lod;
pub mod grass;
pub mod render;
pub mod scene;
