//! Random blade placement inside a chunk cell.
//!
//! Produces the flat buffers a [`GrassChunk`](super::GrassChunk) is built
//! from: one column-major 4x4 local transform and one world position per
//! blade. Heights come from the terrain sampler.

use std::f32::consts::TAU;

use rand::Rng;

use super::config::ScaleRange;
use crate::core::{Mat4, Quat, Vec2, Vec3};
use crate::terrain::TerrainSampler;

/// Floats per blade in the transform buffer
pub const TRANSFORM_STRIDE: usize = 16;
/// Floats per blade in the world-position buffer
pub const POSITION_STRIDE: usize = 3;

/// Flat per-blade buffers for one chunk
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BladeBuffers {
    /// N x 16 floats, translation relative to the chunk origin
    pub transforms: Vec<f32>,
    /// N x 3 floats, absolute world positions
    pub world_positions: Vec<f32>,
}

impl BladeBuffers {
    pub fn with_capacity(count: usize) -> Self {
        Self {
            transforms: Vec::with_capacity(count * TRANSFORM_STRIDE),
            world_positions: Vec::with_capacity(count * POSITION_STRIDE),
        }
    }

    pub fn blade_count(&self) -> usize {
        self.transforms.len() / TRANSFORM_STRIDE
    }

    /// Append one blade at `local` offset from `origin`, rotated about Y
    pub fn push(&mut self, origin: Vec3, local: Vec3, rotation_y: f32, scale_y: f32) {
        let transform = Mat4::from_scale_rotation_translation(
            Vec3::new(1.0, scale_y, 1.0),
            Quat::from_rotation_y(rotation_y),
            local,
        );
        self.transforms.extend_from_slice(&transform.to_cols_array());
        self.world_positions.extend_from_slice(&(origin + local).to_array());
    }
}

/// Scatter `count` blades uniformly over a cell centered at `origin`.
///
/// Each blade gets a random XZ offset within the cell, a random Y rotation
/// and optionally a random Y-scale. Its height is sampled from `terrain` at
/// the blade's world XZ; the transform stores it relative to `origin.y`.
pub fn scatter_blades<R, T>(
    rng: &mut R,
    origin: Vec3,
    cell_size: Vec2,
    count: usize,
    scale_y: Option<ScaleRange>,
    terrain: &T,
) -> BladeBuffers
where
    R: Rng,
    T: TerrainSampler + ?Sized,
{
    let half = cell_size * 0.5;
    let mut buffers = BladeBuffers::with_capacity(count);

    for _ in 0..count {
        let x = rng.gen_range(-half.x..=half.x);
        let z = rng.gen_range(-half.y..=half.y);
        let rotation = rng.gen_range(0.0..TAU);
        let scale = match scale_y {
            Some(range) => rng.gen_range(range.low..=range.high),
            None => 1.0,
        };

        let height = terrain.height_at(origin.x + x, origin.z + z);
        buffers.push(origin, Vec3::new(x, height - origin.y, z), rotation, scale);
    }

    buffers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::FlatTerrain;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_scatter_within_cell() {
        let mut rng = StdRng::seed_from_u64(1);
        let origin = Vec3::new(15.0, 0.0, -5.0);
        let terrain = FlatTerrain::new(2.0);
        let buffers = scatter_blades(&mut rng, origin, Vec2::new(10.0, 4.0), 200, None, &terrain);

        assert_eq!(buffers.blade_count(), 200);
        assert_eq!(buffers.transforms.len(), 200 * TRANSFORM_STRIDE);
        assert_eq!(buffers.world_positions.len(), 200 * POSITION_STRIDE);

        for p in buffers.world_positions.chunks_exact(POSITION_STRIDE) {
            assert!((10.0..=20.0).contains(&p[0]), "x {} outside cell", p[0]);
            assert_eq!(p[1], 2.0);
            assert!((-7.0..=-3.0).contains(&p[2]), "z {} outside cell", p[2]);
        }
    }

    #[test]
    fn test_transform_matches_world_position() {
        let mut rng = StdRng::seed_from_u64(2);
        let origin = Vec3::new(-8.0, 1.5, 3.0);
        let terrain = |x: f32, z: f32| 0.1 * x + 0.2 * z;
        let buffers = scatter_blades(&mut rng, origin, Vec2::splat(6.0), 32, None, &terrain);

        for (m, p) in buffers
            .transforms
            .chunks_exact(TRANSFORM_STRIDE)
            .zip(buffers.world_positions.chunks_exact(POSITION_STRIDE))
        {
            let local = Mat4::from_cols_slice(m).w_axis.truncate();
            let world = Vec3::new(p[0], p[1], p[2]);
            assert!((origin + local - world).length() < 1e-4);
            assert!((world.y - terrain(world.x, world.z)).abs() < 1e-4);
        }
    }

    #[test]
    fn test_scale_range() {
        let mut rng = StdRng::seed_from_u64(3);
        let range = ScaleRange::new(1.0, 2.2);
        let terrain = FlatTerrain::default();
        let buffers = scatter_blades(&mut rng, Vec3::ZERO, Vec2::ONE, 64, Some(range), &terrain);

        for m in buffers.transforms.chunks_exact(TRANSFORM_STRIDE) {
            let (scale, _, _) = Mat4::from_cols_slice(m).to_scale_rotation_translation();
            assert!((scale.x - 1.0).abs() < 1e-4);
            assert!(scale.y >= 1.0 - 1e-4 && scale.y <= 2.2 + 1e-4);
        }
    }

    #[test]
    fn test_deterministic_for_seed() {
        let scatter = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let terrain = FlatTerrain::default();
            scatter_blades(&mut rng, Vec3::ZERO, Vec2::splat(10.0), 16, None, &terrain)
        };
        assert_eq!(scatter(42), scatter(42));
        assert_ne!(scatter(42), scatter(43));
    }

    #[test]
    fn test_zero_blades() {
        let mut rng = StdRng::seed_from_u64(0);
        let terrain = FlatTerrain::default();
        let buffers = scatter_blades(&mut rng, Vec3::ZERO, Vec2::ONE, 0, None, &terrain);
        assert_eq!(buffers.blade_count(), 0);
        assert!(buffers.world_positions.is_empty());
    }
}
