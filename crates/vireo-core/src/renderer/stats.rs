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

//! Counters collected by the rasterizer.

use std::fmt;
use std::ops::AddAssign;

/// What happened during a single draw call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    /// Vertices run through the vertex stage.
    pub vertices_shaded: u64,
    /// Primitives submitted with the draw.
    pub primitives_submitted: u64,
    /// Primitives rejected whole against a clip-space plane, or crossing `w <= 0`.
    pub primitives_rejected: u64,
    /// Primitives removed by face culling or for having zero area.
    pub primitives_culled: u64,
    /// Primitives that reached scan conversion.
    pub primitives_rasterized: u64,
    /// Pixel centers found inside a rasterized primitive.
    pub pixels_tested: u64,
    /// Covered pixels discarded by the depth test.
    pub pixels_depth_failed: u64,
    /// Pixels that ran the pixel stage.
    pub pixels_shaded: u64,
}

impl AddAssign for DrawStats {
    fn add_assign(&mut self, rhs: Self) {
        self.vertices_shaded += rhs.vertices_shaded;
        self.primitives_submitted += rhs.primitives_submitted;
        self.primitives_rejected += rhs.primitives_rejected;
        self.primitives_culled += rhs.primitives_culled;
        self.primitives_rasterized += rhs.primitives_rasterized;
        self.pixels_tested += rhs.pixels_tested;
        self.pixels_depth_failed += rhs.pixels_depth_failed;
        self.pixels_shaded += rhs.pixels_shaded;
    }
}

impl fmt::Display for DrawStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} verts, {}/{} prims rasterized ({} rejected, {} culled), {} px covered, {} depth-failed, {} shaded",
            self.vertices_shaded,
            self.primitives_rasterized,
            self.primitives_submitted,
            self.primitives_rejected,
            self.primitives_culled,
            self.pixels_tested,
            self.pixels_depth_failed,
            self.pixels_shaded
        )
    }
}

/// Running totals since the last reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Number of draw calls recorded.
    pub draw_calls: u64,
    /// Sum of every recorded [`DrawStats`].
    pub totals: DrawStats,
}

impl FrameStats {
    /// Adds one draw call to the totals.
    pub fn record(&mut self, draw: &DrawStats) {
        self.draw_calls += 1;
        self.totals += *draw;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_stats_accumulate() {
        let draw = DrawStats {
            vertices_shaded: 3,
            primitives_submitted: 1,
            primitives_rasterized: 1,
            pixels_tested: 55,
            pixels_shaded: 55,
            ..Default::default()
        };
        let mut frame = FrameStats::default();
        frame.record(&draw);
        frame.record(&draw);
        assert_eq!(frame.draw_calls, 2);
        assert_eq!(frame.totals.pixels_shaded, 110);
        assert_eq!(frame.totals.vertices_shaded, 6);
    }
}
