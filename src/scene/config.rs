//! Scene configuration for the headless grass driver

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{Result, Vec3};
use crate::grass::GrassGroupConfig;
use crate::terrain::TerrainParams;

/// Configuration for a grass scene.
///
/// Development switches live here rather than in process-wide state so
/// that every scene carries its own.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Log per-frame LOD statistics at `info` instead of `debug`
    pub dev_mode: bool,
    /// Camera position before the first frame
    pub initial_camera_position: Vec3,
    /// Terrain noise parameters
    pub terrain: TerrainParams,
    /// Grass field layout
    pub group: GrassGroupConfig,
    /// Ascending LOD switch distances, nearest first
    pub lod_distances: Vec<f32>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            dev_mode: false,
            initial_camera_position: Vec3::new(0.0, 8.0, 40.0),
            terrain: TerrainParams::default(),
            group: GrassGroupConfig::default(),
            lod_distances: vec![0.0, 15.0, 35.0],
        }
    }
}

impl SceneConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.group.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
