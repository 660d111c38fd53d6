//! Noise-based procedural terrain heights

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use super::sampler::TerrainSampler;

/// Parameters controlling terrain height generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    pub seed: u32,
    pub scale: f32,        // Horizontal scale (larger = smoother)
    pub height_scale: f32, // Vertical scale (max height above base)
    pub base_height: f32,  // Height of the lowest possible point
    pub octaves: u32,      // FBM octaves (detail levels)
    pub persistence: f32,  // FBM persistence (0.5 typical)
    pub lacunarity: f32,   // FBM lacunarity (2.0 typical)
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            seed: 12345,
            scale: 60.0,
            height_scale: 6.0,
            base_height: 0.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

/// Rolling terrain using fractal Brownian motion (FBM) over Perlin noise
pub struct NoiseTerrain {
    params: TerrainParams,
    noise: Fbm<Perlin>,
}

impl NoiseTerrain {
    /// Create a new terrain with the given parameters
    pub fn new(params: TerrainParams) -> Self {
        let noise = Fbm::<Perlin>::new(params.seed)
            .set_octaves(params.octaves as usize)
            .set_persistence(params.persistence as f64)
            .set_lacunarity(params.lacunarity as f64);

        Self { params, noise }
    }

    /// Get terrain parameters
    pub fn params(&self) -> &TerrainParams {
        &self.params
    }
}

impl TerrainSampler for NoiseTerrain {
    fn height_at(&self, x: f32, z: f32) -> f32 {
        let nx = (x / self.params.scale) as f64;
        let nz = (z / self.params.scale) as f64;

        // Fbm output is roughly [-1, 1]; clamp so heights stay in range
        let noise_value = self.noise.get([nx, nz]).clamp(-1.0, 1.0);

        let normalized = (noise_value + 1.0) / 2.0;
        self.params.base_height + (normalized * self.params.height_scale as f64) as f32
    }
}
