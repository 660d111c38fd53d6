//! Grass scene: terrain, LOD tiers and a grass group driven per frame

pub mod config;

pub use config::SceneConfig;

use log::{debug, info};

use crate::core::{Result, Vec3};
use crate::grass::{DrawCall, GrassGroup, LodStats};
use crate::lod::{CpuSinks, InstanceBuffer, LodTiers};
use crate::terrain::NoiseTerrain;

/// Headless scene with CPU instance buffers.
///
/// Tier handles are the tier indices; a renderer would substitute its own
/// geometry handles and sinks by building a [`GrassGroup`] directly.
pub struct GrassScene {
    config: SceneConfig,
    terrain: NoiseTerrain,
    group: GrassGroup<usize, InstanceBuffer>,
    camera_position: Vec3,
    frame: u64,
}

impl GrassScene {
    pub fn new(config: SceneConfig) -> Result<Self> {
        let terrain = NoiseTerrain::new(config.terrain.clone());
        let tiers = LodTiers::from_distances(&config.lod_distances)?;
        let group = GrassGroup::new(&config.group, tiers, &terrain, &mut CpuSinks)?;

        info!(
            "Grass scene ready: {} chunks, {} blades",
            group.chunks().len(),
            group.blade_count()
        );

        Ok(Self {
            camera_position: config.initial_camera_position,
            config,
            terrain,
            group,
            frame: 0,
        })
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn terrain(&self) -> &NoiseTerrain {
        &self.terrain
    }

    pub fn group(&self) -> &GrassGroup<usize, InstanceBuffer> {
        &self.group
    }

    pub fn camera_position(&self) -> Vec3 {
        self.camera_position
    }

    /// Frames rendered so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Advance one frame with the camera at `camera_position`.
    pub fn update(&mut self, camera_position: Vec3) -> Result<LodStats> {
        let stats = self.group.update_lod(camera_position)?;
        self.finish_frame(camera_position, stats)
    }

    /// Like [`update`](Self::update), spreading chunks over the rayon pool.
    pub fn update_parallel(&mut self, camera_position: Vec3) -> Result<LodStats> {
        let stats = self.group.update_lod_parallel(camera_position)?;
        self.finish_frame(camera_position, stats)
    }

    fn finish_frame(&mut self, camera_position: Vec3, stats: LodStats) -> Result<LodStats> {
        self.camera_position = camera_position;
        self.frame += 1;

        if self.config.dev_mode {
            info!(
                "frame {}: camera {}, tiers {:?} ({} drawn)",
                self.frame,
                camera_position,
                stats.tier_counts,
                stats.non_empty_tiers()
            );
        } else {
            debug!(
                "frame {}: camera {}, tiers {:?}",
                self.frame, camera_position, stats.tier_counts
            );
        }
        Ok(stats)
    }

    /// Draws for the last updated frame
    pub fn draw_calls(&self) -> impl Iterator<Item = DrawCall<'_, usize, InstanceBuffer>> {
        self.group.draw_calls()
    }
}
