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

//! Global settings for the rendering system.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A collection of renderer-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// The RGBA colour used by [`Renderer::clear`](crate::renderer::Renderer::clear).
    pub clear_color: [f32; 4],
    /// If `true`, alpha blending is enabled when the renderer is created.
    pub blend: bool,
    /// Frames per second for movements that do not specify their own rate.
    pub default_frame_rate: f64,
    /// The highest mipmap level sampled from textures.
    pub max_texture_level: i32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 1.0],
            blend: true,
            default_frame_rate: 20.0,
            max_texture_level: 7,
        }
    }
}

impl RenderSettings {
    /// Parses settings from a JSON document. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Reads and parses a JSON settings file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading render settings from {}", path.display()))?;
        Self::from_json(&text)
            .with_context(|| format!("parsing render settings from {}", path.display()))
    }
}
