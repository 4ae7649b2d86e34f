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

//! The mapping from normalized device coordinates to pixels.

use serde::{Deserialize, Serialize};

use crate::math::Vec3;

/// The pixel rectangle NDC is mapped onto, plus the output depth range.
///
/// Screen `y` grows upwards from the viewport origin: NDC `y = -1` maps to
/// row `y`, NDC `y = 1` to row `y + height`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Left edge in pixels.
    pub x: u32,
    /// Bottom edge in pixels.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Depth written for NDC `z = 0`.
    pub min_depth: f32,
    /// Depth written for NDC `z = 1`.
    pub max_depth: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0, 0, 0, 0)
    }
}

impl Viewport {
    /// Creates a viewport with the default `[0, 1]` depth range.
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }

    /// Returns a copy with a different depth range.
    pub const fn with_depth_range(mut self, min_depth: f32, max_depth: f32) -> Self {
        self.min_depth = min_depth;
        self.max_depth = max_depth;
        self
    }

    /// Maps a normalized device coordinate to screen space.
    #[inline]
    pub fn map(&self, ndc: Vec3) -> Vec3 {
        Vec3::new(
            self.x as f32 + 0.5 * (1.0 + ndc.x) * self.width as f32,
            self.y as f32 + 0.5 * (1.0 + ndc.y) * self.height as f32,
            self.min_depth + ndc.z * (self.max_depth - self.min_depth),
        )
    }

    /// One past the right-most column.
    #[inline]
    pub fn x_end(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// One past the top-most row.
    #[inline]
    pub fn y_end(&self) -> u32 {
        self.y.saturating_add(self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_corners() {
        let vp = Viewport::new(10, 20, 100, 50).with_depth_range(0.25, 0.75);
        assert_eq!(vp.map(Vec3::new(-1.0, -1.0, 0.0)), Vec3::new(10.0, 20.0, 0.25));
        assert_eq!(vp.map(Vec3::new(1.0, 1.0, 1.0)), Vec3::new(110.0, 70.0, 0.75));
        assert_eq!(vp.map(Vec3::ZERO), Vec3::new(60.0, 45.0, 0.25));
    }
}
