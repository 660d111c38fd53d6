//! Grass group configuration (user-facing settings).
//!
//! LOD tiers are not part of this config: their drawable handles belong to
//! the renderer and are passed to `GrassGroup::new` separately.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result, UVec2, Vec2, Vec3};

/// Inclusive range for the random per-blade Y-scale
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScaleRange {
    pub low: f32,
    pub high: f32,
}

impl ScaleRange {
    pub fn new(low: f32, high: f32) -> Self {
        Self { low, high }
    }
}

/// Layout and scattering settings for a grass group.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrassGroupConfig {
    /// World position of the group's center.
    pub position: Vec3,
    /// Footprint on the XZ plane in meters (x = width along X, y = depth along Z).
    pub size: Vec2,
    /// Chunk grid (x = columns along X, y = rows along Z).
    pub grid: UVec2,
    /// Blades generated in every chunk.
    pub blades_per_chunk: usize,
    /// Seed for blade placement.
    pub seed: u64,
    /// Random non-uniform Y-scale; `None` keeps blades at unit scale.
    pub scale_y: Option<ScaleRange>,
}

impl Default for GrassGroupConfig {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            size: Vec2::new(100.0, 100.0),
            grid: UVec2::new(10, 10),
            blades_per_chunk: 1000,
            seed: 12345,
            scale_y: None,
        }
    }
}

impl GrassGroupConfig {
    /// Parse a JSON document; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Size of one grid cell on the XZ plane
    pub fn chunk_size(&self) -> Vec2 {
        self.size / self.grid.as_vec2()
    }

    /// Total number of chunks
    pub fn chunk_count(&self) -> usize {
        self.grid.x as usize * self.grid.y as usize
    }

    pub fn validate(&self) -> Result<()> {
        if self.grid.x == 0 || self.grid.y == 0 {
            return Err(Error::InvalidConfig(format!("grid must be non-zero, got {}", self.grid)));
        }
        if !self.size.is_finite() || self.size.x <= 0.0 || self.size.y <= 0.0 {
            return Err(Error::InvalidConfig(format!("size must be positive, got {}", self.size)));
        }
        if !self.position.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "position must be finite, got {}",
                self.position
            )));
        }
        if self.blades_per_chunk > u32::MAX as usize {
            return Err(Error::InvalidConfig(format!(
                "blades_per_chunk {} exceeds {}",
                self.blades_per_chunk,
                u32::MAX
            )));
        }
        if let Some(range) = self.scale_y {
            let finite = range.low.is_finite() && range.high.is_finite();
            if !finite || range.low <= 0.0 || range.low > range.high {
                return Err(Error::InvalidConfig(format!(
                    "scale_y range [{}, {}] is invalid",
                    range.low, range.high
                )));
            }
        }
        Ok(())
    }
}
