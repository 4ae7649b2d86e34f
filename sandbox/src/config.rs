// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Sandbox settings, loaded from an optional RON file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use vireo_core::math::Vec3;
use vireo_core::JobSystemConfig;
use vireo_lanes::render_lane::shaders::DebugView;
use vireo_lanes::RasterizerConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_y_degrees: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(3.0, 2.5, 4.0),
            target: Vec3::ZERO,
            fov_y_degrees: 45.0,
            z_near: 0.1,
            z_far: 50.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    /// Direction the light travels in.
    pub direction: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    /// Side of the square shadow map. Zero disables shadows.
    pub shadow_map_size: u32,
    pub shadow_bias: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            direction: Vec3::new(-0.4, -1.0, -0.3),
            color: Vec3::new(1.0, 0.96, 0.9),
            intensity: 3.0,
            shadow_map_size: 1024,
            shadow_bias: 0.005,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub width: u32,
    pub height: u32,
    pub output: PathBuf,
    pub camera: CameraConfig,
    pub light: LightConfig,
    pub exposure: f32,
    pub gamma: f32,
    pub debug_view: DebugView,
    pub jobs: JobSystemConfig,
    pub rasterizer: RasterizerConfig,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            output: PathBuf::from("sandbox.png"),
            camera: CameraConfig::default(),
            light: LightConfig::default(),
            exposure: 1.0,
            gamma: 2.2,
            debug_view: DebugView::Lit,
            jobs: JobSystemConfig::default(),
            rasterizer: RasterizerConfig::default(),
        }
    }
}

impl SandboxConfig {
    /// Reads the config at `path`, or returns the defaults when there is none.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            log::info!("No config file given, using defaults.");
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = ron::from_str(&text)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        log::info!("Loaded config from {}.", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: SandboxConfig = ron::from_str("(width: 64, light: (intensity: 5.0))").unwrap();
        assert_eq!(config.width, 64);
        assert_eq!(config.height, 600);
        assert_eq!(config.light.intensity, 5.0);
        assert_eq!(config.light.shadow_map_size, 1024);
    }

    #[test]
    fn test_shipped_config_parses() {
        let text = include_str!("../sandbox.ron");
        let config: SandboxConfig = ron::from_str(text).unwrap();
        assert_eq!(config.jobs.worker_count, 4);
        assert_eq!(config.rasterizer.vertices_per_job, 16);
    }
}
