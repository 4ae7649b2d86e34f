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

//! Per-triangle setup: clip-space rejection, facing, screen bounds,
//! barycentric coverage and attribute interpolation.

use vireo_core::math::{Vec2, Vec4};
use vireo_core::renderer::{GraphicsPipelineState, Primitive, ShaderPayload};

/// Barycentric weights of a point relative to a triangle's three vertices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Barycentric {
    /// Weight of the first vertex.
    pub alpha: f32,
    /// Weight of the second vertex.
    pub beta: f32,
    /// Weight of the third vertex.
    pub gamma: f32,
}

impl Barycentric {
    /// Whether the point lies inside the triangle or on one of its edges.
    #[inline]
    pub fn is_inside(&self) -> bool {
        self.alpha >= 0.0 && self.beta >= 0.0 && self.gamma >= 0.0
    }

    #[inline]
    fn lerp_f32(&self, a: f32, b: f32, c: f32) -> f32 {
        self.alpha * a + self.beta * b + self.gamma * c
    }
}

/// Computes the barycentric coordinates of `p` in the screen triangle `(a, b, c)`.
///
/// Each weight is the ratio of the sub-triangle facing its vertex to the
/// whole triangle. Returns `None` for a degenerate (zero or non-finite area)
/// triangle.
///
/// ```
/// use vireo_core::math::Vec2;
/// use vireo_lanes::render_lane::barycentric;
///
/// let (a, b, c) = (Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0), Vec2::new(0.0, 4.0));
/// let w = barycentric(a, b, c, Vec2::new(1.0, 1.0)).unwrap();
/// assert!((w.alpha + w.beta + w.gamma - 1.0).abs() < 1e-6);
/// ```
pub fn barycentric(a: Vec2, b: Vec2, c: Vec2, p: Vec2) -> Option<Barycentric> {
    let area = (b - a).cross(c - a);
    if area == 0.0 || !area.is_finite() {
        return None;
    }
    let inv_area = 1.0 / area;
    Some(Barycentric {
        alpha: (b - p).cross(c - p) * inv_area,
        beta: (c - p).cross(a - p) * inv_area,
        gamma: (a - p).cross(b - p) * inv_area,
    })
}

/// Whether all three clip-space vertices lie outside one half-space of the
/// view volume, or beyond the `[z_near, z_far]` range in `w`.
pub fn is_trivially_outside(clip: [Vec4; 3], z_near: f32, z_far: f32) -> bool {
    let all = |outside: &dyn Fn(&Vec4) -> bool| clip.iter().all(outside);

    all(&|v| v.w < z_near)
        || all(&|v| v.w > z_far)
        || all(&|v| v.x > v.w)
        || all(&|v| v.x < -v.w)
        || all(&|v| v.y > v.w)
        || all(&|v| v.y < -v.w)
        || all(&|v| v.z > v.w)
        || all(&|v| v.z < -v.w)
}

/// Pixel rectangle a triangle may touch, `[x0, x1) x [y0, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PixelRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl PixelRect {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }
}

/// Why a primitive produced no setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Discard {
    /// Entirely outside the view volume.
    Rejected,
    /// Back/front-face culled or zero area.
    Culled,
    /// Survived rejection with a vertex at or behind the eye.
    BehindEye,
}

/// A triangle ready for scan conversion.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TriangleSetup {
    pub indices: Primitive,
    screen: [Vec2; 3],
    inv_area: f32,
    /// Twice the triangle area divided by each edge length, indexed by the
    /// opposite vertex: multiplying a weight by it gives the pixel distance
    /// to that edge.
    edge_heights: [f32; 3],
    pub bounds: PixelRect,
}

impl TriangleSetup {
    /// Rejects, culls and bounds one primitive.
    ///
    /// `limit` is the intersection of the viewport with the bound targets.
    pub fn new<U>(
        indices: Primitive,
        payloads: &[ShaderPayload],
        pipeline: &GraphicsPipelineState<'_, U>,
        limit: PixelRect,
        z_near: f32,
        z_far: f32,
    ) -> Result<Self, Discard> {
        let [v0, v1, v2] = indices.map(|i| &payloads[i as usize]);

        if is_trivially_outside(
            [v0.clip_position, v1.clip_position, v2.clip_position],
            z_near,
            z_far,
        ) {
            return Err(Discard::Rejected);
        }
        if [v0, v1, v2].iter().any(|v| v.clip_position.w <= 0.0) {
            return Err(Discard::BehindEye);
        }

        let screen = [v0, v1, v2].map(|v| v.screen_position.xy());
        let area = (screen[1] - screen[0]).cross(screen[2] - screen[0]);
        if pipeline.culls(area) {
            return Err(Discard::Culled);
        }

        let min_x = screen[0].x.min(screen[1].x).min(screen[2].x).floor();
        let max_x = screen[0].x.max(screen[1].x).max(screen[2].x).ceil();
        let min_y = screen[0].y.min(screen[1].y).min(screen[2].y).floor();
        let max_y = screen[0].y.max(screen[1].y).max(screen[2].y).ceil();

        // Float to int casts saturate, so off-screen extents clamp cleanly.
        let bounds = PixelRect {
            x0: (min_x.max(0.0) as u32).max(limit.x0),
            y0: (min_y.max(0.0) as u32).max(limit.y0),
            x1: (max_x.max(0.0) as u32).min(limit.x1),
            y1: (max_y.max(0.0) as u32).min(limit.y1),
        };

        let twice_area = area.abs();
        let edge_height = |from: Vec2, to: Vec2| {
            let len = (to - from).length();
            if len > 0.0 {
                twice_area / len
            } else {
                0.0
            }
        };

        Ok(Self {
            indices,
            screen,
            inv_area: 1.0 / area,
            edge_heights: [
                edge_height(screen[1], screen[2]),
                edge_height(screen[2], screen[0]),
                edge_height(screen[0], screen[1]),
            ],
            bounds,
        })
    }

    /// Barycentric weights of the pixel center `p`.
    #[inline]
    pub fn weights_at(&self, p: Vec2) -> Barycentric {
        let [a, b, c] = self.screen;
        Barycentric {
            alpha: (b - p).cross(c - p) * self.inv_area,
            beta: (c - p).cross(a - p) * self.inv_area,
            gamma: (a - p).cross(b - p) * self.inv_area,
        }
    }

    /// Whether a covered point lies within one pixel of an edge.
    #[inline]
    pub fn is_near_edge(&self, w: &Barycentric) -> bool {
        w.alpha * self.edge_heights[0] < 1.0
            || w.beta * self.edge_heights[1] < 1.0
            || w.gamma * self.edge_heights[2] < 1.0
    }
}

/// Builds the pixel payload from three finalized vertex payloads.
///
/// Attributes pre-divided by `w` are interpolated in screen space and
/// multiplied by the interpolated `w`. Screen and NDC positions are affine in
/// screen space and are interpolated directly.
pub fn interpolate(v: [&ShaderPayload; 3], w: &Barycentric) -> ShaderPayload {
    let inv_w = w.lerp_f32(v[0].inv_w, v[1].inv_w, v[2].inv_w);
    let persp = 1.0 / inv_w;

    ShaderPayload {
        clip_position: (v[0].clip_position * (w.alpha * v[0].inv_w)
            + v[1].clip_position * (w.beta * v[1].inv_w)
            + v[2].clip_position * (w.gamma * v[2].inv_w))
            * persp,
        ndc_position: v[0].ndc_position * w.alpha
            + v[1].ndc_position * w.beta
            + v[2].ndc_position * w.gamma,
        screen_position: v[0].screen_position * w.alpha
            + v[1].screen_position * w.beta
            + v[2].screen_position * w.gamma,
        inv_w,
        world_position: (v[0].world_position * w.alpha
            + v[1].world_position * w.beta
            + v[2].world_position * w.gamma)
            * persp,
        world_normal: (v[0].world_normal * w.alpha
            + v[1].world_normal * w.beta
            + v[2].world_normal * w.gamma)
            * persp,
        world_tangent: (v[0].world_tangent * w.alpha
            + v[1].world_tangent * w.beta
            + v[2].world_tangent * w.gamma)
            * persp,
        tex_coord: (v[0].tex_coord * w.alpha + v[1].tex_coord * w.beta + v[2].tex_coord * w.gamma)
            * persp,
    }
}
