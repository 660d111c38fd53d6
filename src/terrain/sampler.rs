//! Height lookup abstraction

/// Deterministic mapping from world (x, z) to terrain height.
///
/// Only queried while a grass group is being built, once per blade.
pub trait TerrainSampler {
    fn height_at(&self, x: f32, z: f32) -> f32;
}

/// Terrain with the same height everywhere
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlatTerrain {
    pub height: f32,
}

impl FlatTerrain {
    pub fn new(height: f32) -> Self {
        Self { height }
    }
}

impl TerrainSampler for FlatTerrain {
    fn height_at(&self, _x: f32, _z: f32) -> f32 {
        self.height
    }
}

impl<F> TerrainSampler for F
where
    F: Fn(f32, f32) -> f32,
{
    fn height_at(&self, x: f32, z: f32) -> f32 {
        self(x, z)
    }
}
