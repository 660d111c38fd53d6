//! Grid of grass chunks with camera-sphere activity culling.

use std::sync::Arc;

use log::{debug, trace};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;

use super::chunk::GrassChunk;
use super::config::GrassGroupConfig;
use super::scatter::scatter_blades;
use super::stats::LodStats;
use crate::core::{Error, Result, UVec2, Vec2, Vec3};
use crate::lod::{InstanceSink, LodTiers, SinkFactory, TierIndex};
use crate::math::Sphere;
use crate::terrain::TerrainSampler;

/// One instanced draw the renderer should issue
#[derive(Debug)]
pub struct DrawCall<'a, H, S> {
    /// Index into `GrassGroup::chunks`
    pub chunk: usize,
    pub tier: TierIndex,
    /// Geometry/material of the tier
    pub handle: &'a H,
    /// World position of the chunk; instance transforms are relative to it
    pub origin: Vec3,
    pub sink: &'a S,
    pub instance_count: u32,
}

/// A rectangular field of grass split into `cols x rows` chunks.
///
/// Chunks are stored row-major: index = `row * cols + col`, with columns
/// along X and rows along Z.
pub struct GrassGroup<H, S> {
    position: Vec3,
    size: Vec2,
    grid: UVec2,
    tiers: Arc<LodTiers<H>>,
    chunks: Vec<GrassChunk<H, S>>,
    culling_sphere: Sphere,
}

impl<H, S: InstanceSink> GrassGroup<H, S> {
    /// Generate every chunk of the group.
    ///
    /// Blades are scattered per cell with a generator seeded from
    /// `config.seed`, heights come from `terrain`, and each chunk allocates
    /// its per-tier sinks from `factory`.
    pub fn new<T, F>(
        config: &GrassGroupConfig,
        tiers: LodTiers<H>,
        terrain: &T,
        factory: &mut F,
    ) -> Result<Self>
    where
        T: TerrainSampler + ?Sized,
        F: SinkFactory<Sink = S>,
    {
        config.validate()?;

        let tiers = Arc::new(tiers);
        let chunk_size = config.chunk_size();
        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut chunks = Vec::with_capacity(config.chunk_count());

        for row in 0..config.grid.y {
            for col in 0..config.grid.x {
                let origin = cell_origin(config.position, config.size, chunk_size, col, row);
                let blades = scatter_blades(
                    &mut rng,
                    origin,
                    chunk_size,
                    config.blades_per_chunk,
                    config.scale_y,
                    terrain,
                );
                chunks.push(GrassChunk::new(
                    origin,
                    blades.transforms,
                    blades.world_positions,
                    Arc::clone(&tiers),
                    factory,
                )?);
            }
        }

        let culling_sphere = Sphere::new(config.position, tiers.max_distance());

        debug!(
            "Grass group at {}: {}x{} chunks, {} blades each, culling radius {}",
            config.position,
            config.grid.x,
            config.grid.y,
            config.blades_per_chunk,
            culling_sphere.radius
        );

        Ok(Self {
            position: config.position,
            size: config.size,
            grid: config.grid,
            tiers,
            chunks,
            culling_sphere,
        })
    }

    /// Run one frame of LOD selection for every chunk.
    ///
    /// Chunks whose bounds touch the camera-centered culling sphere classify
    /// their blades by distance; all others are forced to the last tier.
    pub fn update_lod(&mut self, camera_position: Vec3) -> Result<LodStats> {
        let sphere = self.begin_frame(camera_position)?;

        for chunk in &mut self.chunks {
            let is_active = chunk.chunk_box().intersects_sphere(&sphere);
            chunk.update_lod(camera_position, is_active)?;
        }

        Ok(self.finish_frame())
    }

    /// Compute the current LOD statistics without updating.
    pub fn stats(&self) -> LodStats {
        let mut stats = LodStats::new(self.tiers.len());
        for chunk in &self.chunks {
            stats.record(chunk);
        }
        stats
    }

    fn begin_frame(&mut self, camera_position: Vec3) -> Result<Sphere> {
        if !camera_position.is_finite() {
            return Err(Error::InvalidCamera(camera_position));
        }
        self.culling_sphere.center = camera_position;
        Ok(self.culling_sphere)
    }

    fn finish_frame(&self) -> LodStats {
        let stats = self.stats();
        trace!(
            "Grass LOD: {} active / {} culled chunks, tiers {:?}",
            stats.active_chunks,
            stats.inactive_chunks,
            stats.tier_counts
        );
        stats
    }
}

impl<H, S> GrassGroup<H, S>
where
    H: Send + Sync,
    S: InstanceSink + Send,
{
    /// Same as [`update_lod`](Self::update_lod) with chunks processed on the
    /// rayon thread pool. Chunks share no mutable state, so the result is
    /// identical to the sequential update.
    pub fn update_lod_parallel(&mut self, camera_position: Vec3) -> Result<LodStats> {
        let sphere = self.begin_frame(camera_position)?;

        self.chunks.par_iter_mut().try_for_each(|chunk| {
            let is_active = chunk.chunk_box().intersects_sphere(&sphere);
            chunk.update_lod(camera_position, is_active)
        })?;

        Ok(self.finish_frame())
    }
}

impl<H, S> GrassGroup<H, S> {
    /// World position of the group's center
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Footprint on the XZ plane
    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn cols(&self) -> u32 {
        self.grid.x
    }

    pub fn rows(&self) -> u32 {
        self.grid.y
    }

    pub fn chunk_size(&self) -> Vec2 {
        self.size / self.grid.as_vec2()
    }

    pub fn tiers(&self) -> &LodTiers<H> {
        &self.tiers
    }

    pub fn chunks(&self) -> &[GrassChunk<H, S>] {
        &self.chunks
    }

    pub fn chunks_mut(&mut self) -> &mut [GrassChunk<H, S>] {
        &mut self.chunks
    }

    pub fn chunk(&self, col: u32, row: u32) -> Option<&GrassChunk<H, S>> {
        if col >= self.grid.x || row >= self.grid.y {
            return None;
        }
        self.chunks.get((row * self.grid.x + col) as usize)
    }

    /// Sphere used for the last activity test
    pub fn culling_sphere(&self) -> Sphere {
        self.culling_sphere
    }

    /// XZ bounds (min, max) of a grid cell in world space
    pub fn cell_bounds(&self, col: u32, row: u32) -> (Vec2, Vec2) {
        let chunk_size = self.chunk_size();
        let center = cell_origin(self.position, self.size, chunk_size, col, row);
        let half = chunk_size * 0.5;
        (Vec2::new(center.x, center.z) - half, Vec2::new(center.x, center.z) + half)
    }

    pub fn blade_count(&self) -> usize {
        self.chunks.iter().map(|c| c.blade_count()).sum()
    }

    /// Instanced draws for the current frame, one per non-empty (chunk, tier).
    pub fn draw_calls(&self) -> impl Iterator<Item = DrawCall<'_, H, S>> {
        let tiers = &*self.tiers;
        self.chunks.iter().enumerate().flat_map(move |(index, chunk)| {
            let origin = chunk.origin();
            tiers
                .iter()
                .zip(chunk.sinks())
                .zip(chunk.visible_counts())
                .enumerate()
                .filter(|(_, (_, count))| **count > 0)
                .map(move |(tier, ((lod, sink), &instance_count))| DrawCall {
                    chunk: index,
                    tier: tier as TierIndex,
                    handle: &lod.handle,
                    origin,
                    sink,
                    instance_count,
                })
        })
    }
}

/// Center of cell (`col`, `row`), at the group's height
fn cell_origin(position: Vec3, size: Vec2, chunk_size: Vec2, col: u32, row: u32) -> Vec3 {
    Vec3::new(
        position.x + chunk_size.x * (col as f32 + 0.5) - size.x * 0.5,
        position.y,
        position.z + chunk_size.y * (row as f32 + 0.5) - size.y * 0.5,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grass::config::ScaleRange;
    use crate::lod::{CpuSinks, InstanceBuffer, LodTier};
    use crate::terrain::{FlatTerrain, NoiseTerrain, TerrainParams};

    type TestGroup = GrassGroup<usize, InstanceBuffer>;

    fn tiers() -> LodTiers<usize> {
        LodTiers::from_distances(&[10.0, 30.0, 60.0]).unwrap()
    }

    fn small_config() -> GrassGroupConfig {
        GrassGroupConfig {
            size: Vec2::new(20.0, 20.0),
            grid: UVec2::new(2, 2),
            blades_per_chunk: 4,
            ..Default::default()
        }
    }

    fn flat_group(config: &GrassGroupConfig) -> TestGroup {
        GrassGroup::new(config, tiers(), &FlatTerrain::default(), &mut CpuSinks).unwrap()
    }

    #[test]
    fn test_grid_layout() {
        let group = flat_group(&small_config());

        assert_eq!(group.chunks().len(), 4);
        assert_eq!(group.blade_count(), 16);
        assert_eq!(group.cols(), 2);
        assert_eq!(group.rows(), 2);
        assert_eq!(group.chunk_size(), Vec2::new(10.0, 10.0));

        for row in 0..2 {
            for col in 0..2 {
                let chunk = group.chunk(col, row).unwrap();
                assert_eq!(chunk.blade_count(), 4);

                let (min, max) = group.cell_bounds(col, row);
                for blade in 0..chunk.blade_count() {
                    let p = chunk.world_position(blade).unwrap();
                    assert!(p.x >= min.x && p.x <= max.x, "blade x {} outside cell", p.x);
                    assert!(p.z >= min.y && p.z <= max.y, "blade z {} outside cell", p.z);
                }
            }
        }
        assert!(group.chunk(2, 0).is_none());
    }

    #[test]
    fn test_cell_bounds_cover_footprint() {
        let config = GrassGroupConfig {
            position: Vec3::new(100.0, 5.0, -40.0),
            ..small_config()
        };
        let group = flat_group(&config);

        assert_eq!(
            group.cell_bounds(0, 0),
            (Vec2::new(90.0, -50.0), Vec2::new(100.0, -40.0))
        );
        assert_eq!(
            group.cell_bounds(1, 1),
            (Vec2::new(100.0, -40.0), Vec2::new(110.0, -30.0))
        );
        assert_eq!(group.chunk(1, 0).unwrap().origin(), Vec3::new(105.0, 5.0, -45.0));
    }

    #[test]
    fn test_heights_from_terrain() {
        let terrain = NoiseTerrain::new(TerrainParams::default());
        let group: TestGroup =
            GrassGroup::new(&small_config(), tiers(), &terrain, &mut CpuSinks).unwrap();

        for chunk in group.chunks() {
            for blade in 0..chunk.blade_count() {
                let p = chunk.world_position(blade).unwrap();
                assert!((p.y - terrain.height_at(p.x, p.z)).abs() < 1e-4);

                let transform = chunk.transform(blade).unwrap();
                // Translation Y sits in column 3, row 1
                assert!((transform[13] + chunk.origin().y - p.y).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn test_deterministic_construction() {
        let a = flat_group(&small_config());
        let b = flat_group(&small_config());
        for (ca, cb) in a.chunks().iter().zip(b.chunks()) {
            assert_eq!(ca.transforms(), cb.transforms());
            assert_eq!(ca.world_positions(), cb.world_positions());
        }
    }

    #[test]
    fn test_far_chunks_forced_low() {
        let config = GrassGroupConfig {
            size: Vec2::new(400.0, 10.0),
            grid: UVec2::new(4, 1),
            blades_per_chunk: 50,
            ..Default::default()
        };
        let mut group = flat_group(&config);
        assert_eq!(group.culling_sphere().radius, 60.0);

        let stats = group.update_lod(Vec3::new(-150.0, 0.0, 0.0)).unwrap();
        assert_eq!(group.culling_sphere().center, Vec3::new(-150.0, 0.0, 0.0));

        assert!(group.chunk(0, 0).unwrap().is_active());
        for col in [2, 3] {
            let chunk = group.chunk(col, 0).unwrap();
            assert!(!chunk.is_active());
            assert!(chunk.tier_assignments().iter().all(|&t| t == 2));
            assert_eq!(chunk.visible_counts(), &[0, 0, 50]);
        }
        assert!(stats.active_chunks >= 1);
        assert!(stats.inactive_chunks >= 2);
        assert_eq!(stats.total_blades(), 200);
        assert!(stats.non_empty_tiers() >= 2);
    }

    #[test]
    fn test_counts_sum_every_frame() {
        let config = GrassGroupConfig {
            size: Vec2::new(120.0, 120.0),
            grid: UVec2::new(4, 4),
            blades_per_chunk: 64,
            scale_y: Some(ScaleRange::new(1.0, 2.2)),
            ..Default::default()
        };
        let mut group = flat_group(&config);

        for frame in 0..20 {
            let angle = frame as f32 * 0.4;
            let camera = Vec3::new(angle.cos() * 70.0, 3.0, angle.sin() * 70.0);
            let stats = group.update_lod(camera).unwrap();
            assert_eq!(stats.total_blades() as usize, group.blade_count());

            for chunk in group.chunks() {
                let sum: u32 = chunk.visible_counts().iter().sum();
                assert_eq!(sum as usize, chunk.blade_count());
            }
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let config = GrassGroupConfig {
            size: Vec2::new(160.0, 160.0),
            grid: UVec2::new(8, 8),
            blades_per_chunk: 32,
            ..Default::default()
        };
        let terrain = NoiseTerrain::new(TerrainParams::default());
        let mut sequential: TestGroup =
            GrassGroup::new(&config, tiers(), &terrain, &mut CpuSinks).unwrap();
        let mut parallel: TestGroup =
            GrassGroup::new(&config, tiers(), &terrain, &mut CpuSinks).unwrap();

        let cameras = [Vec3::ZERO, Vec3::new(75.0, 2.0, -20.0), Vec3::new(-300.0, 0.0, 0.0)];
        for camera in cameras {
            let a = sequential.update_lod(camera).unwrap();
            let b = parallel.update_lod_parallel(camera).unwrap();
            assert_eq!(a, b);
            for (ca, cb) in sequential.chunks().iter().zip(parallel.chunks()) {
                assert_eq!(ca.tier_assignments(), cb.tier_assignments());
                assert_eq!(ca.state(), cb.state());
            }
        }
    }

    #[test]
    fn test_draw_calls() {
        let tiers = LodTiers::new(vec![
            LodTier::new(100usize, 10.0),
            LodTier::new(200usize, 30.0),
            LodTier::new(300usize, 60.0),
        ])
        .unwrap();
        let config = GrassGroupConfig {
            size: Vec2::new(400.0, 10.0),
            grid: UVec2::new(4, 1),
            blades_per_chunk: 25,
            ..Default::default()
        };
        let mut group: TestGroup =
            GrassGroup::new(&config, tiers, &FlatTerrain::default(), &mut CpuSinks).unwrap();
        group.update_lod(Vec3::new(-150.0, 0.0, 0.0)).unwrap();

        let calls: Vec<_> = group.draw_calls().collect();
        assert!(calls.iter().all(|c| c.instance_count > 0));
        assert!(calls.iter().all(|c| c.sink.visible_count() == c.instance_count));
        assert!(calls.iter().all(|c| *c.handle == (c.tier as usize + 1) * 100));

        let total: u32 = calls.iter().map(|c| c.instance_count).sum();
        assert_eq!(total, 100);

        // Far chunks draw a single low-detail batch
        let far: Vec<_> = calls.iter().filter(|c| c.chunk == 3).collect();
        assert_eq!(far.len(), 1);
        assert_eq!(far[0].tier, 2);
        assert_eq!(far[0].origin, group.chunk(3, 0).unwrap().origin());
    }

    #[test]
    fn test_invalid_camera() {
        let mut group = flat_group(&small_config());
        let result = group.update_lod(Vec3::new(0.0, f32::NAN, 0.0));
        assert!(matches!(result, Err(Error::InvalidCamera(_))));
        let result = group.update_lod_parallel(Vec3::splat(f32::NEG_INFINITY));
        assert!(matches!(result, Err(Error::InvalidCamera(_))));
    }

    #[test]
    fn test_invalid_config() {
        let config = GrassGroupConfig { grid: UVec2::new(0, 1), ..small_config() };
        let result: Result<TestGroup> =
            GrassGroup::new(&config, tiers(), &FlatTerrain::default(), &mut CpuSinks);
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_non_finite_terrain_rejected() {
        let terrain = |_x: f32, _z: f32| f32::NAN;
        let result: Result<TestGroup> =
            GrassGroup::new(&small_config(), tiers(), &terrain, &mut CpuSinks);
        assert!(matches!(result, Err(Error::NonFinitePosition { index: 0 })));
    }

    #[test]
    fn test_zero_blades_per_chunk() {
        let config = GrassGroupConfig { blades_per_chunk: 0, ..small_config() };
        let mut group = flat_group(&config);
        let stats = group.update_lod(Vec3::ZERO).unwrap();
        assert_eq!(stats.total_blades(), 0);
        assert_eq!(stats.inactive_chunks, 4);
        assert_eq!(stats.non_empty_tiers(), 0);
        assert_eq!(group.draw_calls().count(), 0);
    }
}
