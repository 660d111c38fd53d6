//! One spatial cell of grass blades with per-blade LOD classification.
//!
//! Blade data lives in flat, fixed-stride buffers that never change after
//! construction. Every frame `update_lod` assigns each blade a tier and then
//! compacts the transforms into the per-tier sinks so each tier's visible
//! blades occupy slots `0..count`, in blade order.

use std::sync::{Arc, OnceLock};

use log::{debug, trace, warn};

use super::scatter::{POSITION_STRIDE, TRANSFORM_STRIDE};
use crate::core::{Error, Result, Vec3};
use crate::lod::{InstanceSink, LodTiers, SinkFactory, TierIndex};
use crate::math::Aabb;

/// How the chunk classified its blades on the last update
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChunkState {
    /// Inside the culling sphere: per-blade distance classification
    #[default]
    Evaluating,
    /// Outside the culling sphere: every blade pinned to the last tier
    ForcedLow,
}

/// Grass blades of one grid cell plus one instance sink per LOD tier.
pub struct GrassChunk<H, S> {
    origin: Vec3,
    blade_count: usize,
    /// N x 16, column-major local transforms (relative to `origin`)
    transforms: Vec<f32>,
    /// N x 3, world positions
    world_positions: Vec<f32>,
    tiers: Arc<LodTiers<H>>,
    /// Current tier of every blade
    assigned: Vec<TierIndex>,
    /// Visible instances per tier after the last compaction
    counts: Vec<u32>,
    sinks: Vec<S>,
    /// Bounds of `world_positions`; positions are immutable so never invalidated
    chunk_box: OnceLock<Aabb>,
    state: ChunkState,
}

impl<H, S: InstanceSink> GrassChunk<H, S> {
    /// Build a chunk from flat blade buffers.
    ///
    /// The blade count is `transforms.len() / 16`; `world_positions` must
    /// hold exactly three floats per blade. One sink per tier is allocated
    /// with room for every blade and seeded with the local transforms. Until
    /// the first update all blades report tier 0.
    pub fn new<F>(
        origin: Vec3,
        transforms: Vec<f32>,
        world_positions: Vec<f32>,
        tiers: Arc<LodTiers<H>>,
        factory: &mut F,
    ) -> Result<Self>
    where
        F: SinkFactory<Sink = S>,
    {
        if transforms.len() % TRANSFORM_STRIDE != 0 {
            return Err(Error::BufferLength {
                buffer: "transform",
                expected: transforms.len().div_ceil(TRANSFORM_STRIDE) * TRANSFORM_STRIDE,
                actual: transforms.len(),
            });
        }
        let blade_count = transforms.len() / TRANSFORM_STRIDE;

        if world_positions.len() != blade_count * POSITION_STRIDE {
            return Err(Error::BufferLength {
                buffer: "world position",
                expected: blade_count * POSITION_STRIDE,
                actual: world_positions.len(),
            });
        }
        if blade_count > u32::MAX as usize {
            return Err(Error::InvalidConfig(format!("chunk holds {} blades", blade_count)));
        }
        if let Some(index) = world_positions
            .chunks_exact(POSITION_STRIDE)
            .position(|p| !p.iter().all(|c| c.is_finite()))
        {
            return Err(Error::NonFinitePosition { index });
        }
        if blade_count == 0 {
            warn!("Grass chunk at {} has no blades", origin);
        }

        let rows: &[[f32; 16]] = bytemuck::cast_slice(&transforms);
        let mut sinks: Vec<S> = Vec::with_capacity(tiers.len());
        for tier in 0..tiers.len() {
            let mut sink = factory.allocate(tier as TierIndex, blade_count);
            if sink.capacity() < blade_count {
                return Err(Error::BufferLength {
                    buffer: "instance sink",
                    expected: blade_count,
                    actual: sink.capacity(),
                });
            }
            for (slot, transform) in rows.iter().enumerate() {
                sink.set_transform(slot, transform);
            }
            let visible = if tier == 0 { blade_count as u32 } else { 0 };
            sink.set_visible_count(visible);
            sink.mark_dirty();
            sinks.push(sink);
        }

        let mut counts = vec![0; tiers.len()];
        counts[0] = blade_count as u32;

        debug!(
            "Grass chunk at {}: {} blades, {} LOD tiers",
            origin,
            blade_count,
            tiers.len()
        );

        Ok(Self {
            origin,
            blade_count,
            transforms,
            world_positions,
            assigned: vec![0; blade_count],
            counts,
            sinks,
            tiers,
            chunk_box: OnceLock::new(),
            state: ChunkState::Evaluating,
        })
    }

    /// Reclassify every blade and rebuild the per-tier sinks.
    ///
    /// With `is_active` each blade gets the highest tier whose switch
    /// distance its camera distance strictly exceeds (tier 0 if none).
    /// Without it every blade goes to the last tier and no distances are
    /// computed. Compaction runs in both cases.
    pub fn update_lod(&mut self, camera_position: Vec3, is_active: bool) -> Result<()> {
        if !camera_position.is_finite() {
            return Err(Error::InvalidCamera(camera_position));
        }

        if is_active {
            self.state = ChunkState::Evaluating;
            self.classify(camera_position);
        } else {
            self.state = ChunkState::ForcedLow;
            self.assigned.fill(self.tiers.last_index());
        }

        self.compact();
        trace!("Grass chunk at {}: {:?}, counts {:?}", self.origin, self.state, self.counts);
        Ok(())
    }

    fn classify(&mut self, camera_position: Vec3) {
        let positions: &[[f32; 3]] = bytemuck::cast_slice(&self.world_positions);
        for (tier, position) in self.assigned.iter_mut().zip(positions) {
            let distance = Vec3::from_array(*position).distance(camera_position);
            *tier = self.tiers.classify(distance);
        }
    }

    /// Stable per-tier compaction of the local transforms.
    fn compact(&mut self) {
        self.counts.fill(0);

        let rows: &[[f32; 16]] = bytemuck::cast_slice(&self.transforms);
        for (transform, &tier) in rows.iter().zip(&self.assigned) {
            let tier = tier as usize;
            let slot = self.counts[tier];
            self.sinks[tier].set_transform(slot as usize, transform);
            self.counts[tier] = slot + 1;
        }

        for (sink, &count) in self.sinks.iter_mut().zip(&self.counts) {
            sink.set_visible_count(count);
            sink.mark_dirty();
        }
    }

    /// Bounds of all blade world positions, computed on first use.
    ///
    /// Empty for a chunk without blades.
    pub fn chunk_box(&self) -> Aabb {
        *self
            .chunk_box
            .get_or_init(|| Aabb::from_points(bytemuck::cast_slice(&self.world_positions)))
    }
}

impl<H, S> GrassChunk<H, S> {
    /// World position the local transforms are relative to
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn blade_count(&self) -> usize {
        self.blade_count
    }

    pub fn tiers(&self) -> &LodTiers<H> {
        &self.tiers
    }

    pub fn state(&self) -> ChunkState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == ChunkState::Evaluating
    }

    /// Tier of every blade, in blade order
    pub fn tier_assignments(&self) -> &[TierIndex] {
        &self.assigned
    }

    /// Visible instance count of every tier
    pub fn visible_counts(&self) -> &[u32] {
        &self.counts
    }

    pub fn sinks(&self) -> &[S] {
        &self.sinks
    }

    pub fn sinks_mut(&mut self) -> &mut [S] {
        &mut self.sinks
    }

    pub fn sink(&self, tier: TierIndex) -> Option<&S> {
        self.sinks.get(tier as usize)
    }

    /// Flat N x 16 transform buffer
    pub fn transforms(&self) -> &[f32] {
        &self.transforms
    }

    /// Local transform of one blade
    pub fn transform(&self, blade: usize) -> Option<&[f32; 16]> {
        let rows: &[[f32; 16]] = bytemuck::cast_slice(&self.transforms);
        rows.get(blade)
    }

    /// Flat N x 3 world-position buffer
    pub fn world_positions(&self) -> &[f32] {
        &self.world_positions
    }

    pub fn world_position(&self, blade: usize) -> Option<Vec3> {
        let rows: &[[f32; 3]] = bytemuck::cast_slice(&self.world_positions);
        rows.get(blade).map(|p| Vec3::from_array(*p))
    }
}
