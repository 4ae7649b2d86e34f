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

//! The contract between the rasterizer and the programmable stages.
//!
//! A vertex shader fills one [`ShaderPayload`] per vertex. The rasterizer then
//! finalizes it (perspective divide and viewport transform), interpolates the
//! three payloads of a triangle for every covered pixel, and hands the result
//! to the pixel shader.
//!
//! Both stages receive a uniform value of a shader-chosen type `U`; the
//! pipeline never looks inside it.

use super::viewport::Viewport;
use crate::math::{Vec2, Vec3, Vec4};

/// Per-vertex output of the vertex stage and per-pixel input of the pixel stage.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShaderPayload {
    /// Clip-space position. The only field a vertex shader must write.
    pub clip_position: Vec4,
    /// Clip position after the perspective divide.
    pub ndc_position: Vec3,
    /// Pixel coordinates and mapped depth.
    pub screen_position: Vec3,
    /// `1 / clip_position.w`.
    pub inv_w: f32,
    /// World-space position.
    pub world_position: Vec3,
    /// World-space normal.
    pub world_normal: Vec3,
    /// World-space tangent.
    pub world_tangent: Vec3,
    /// Texture coordinate.
    pub tex_coord: Vec2,
}

impl ShaderPayload {
    /// Applies the perspective divide and the viewport transform.
    ///
    /// The world-space attributes are pre-multiplied by `1 / w` so that
    /// screen-space interpolation followed by a multiply with the
    /// interpolated `w` is perspective-correct.
    pub fn finalize(&mut self, viewport: &Viewport) {
        let inv_w = 1.0 / self.clip_position.w;
        self.inv_w = inv_w;
        self.world_position *= inv_w;
        self.world_normal *= inv_w;
        self.world_tangent *= inv_w;
        self.tex_coord *= inv_w;
        self.ndc_position = self.clip_position.truncate() * inv_w;
        self.screen_position = viewport.map(self.ndc_position);
    }
}

/// The programmable vertex stage.
pub trait VertexShader<U>: Send + Sync {
    /// Computes the payload of vertex `vertex_id`.
    fn main(&self, vertex_id: u32, output: &mut ShaderPayload, uniforms: &U);
}

/// The programmable pixel stage.
pub trait PixelShader<U>: Send + Sync {
    /// Returns the linear, unclamped RGBA color of one pixel.
    fn main(&self, input: &ShaderPayload, uniforms: &U) -> Vec4;
}

impl<U, F> VertexShader<U> for F
where
    F: Fn(u32, &mut ShaderPayload, &U) + Send + Sync,
{
    #[inline]
    fn main(&self, vertex_id: u32, output: &mut ShaderPayload, uniforms: &U) {
        self(vertex_id, output, uniforms)
    }
}

impl<U, F> PixelShader<U> for F
where
    F: Fn(&ShaderPayload, &U) -> Vec4 + Send + Sync,
{
    #[inline]
    fn main(&self, input: &ShaderPayload, uniforms: &U) -> Vec4 {
        self(input, uniforms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_finalize_divides_and_maps() {
        let mut payload = ShaderPayload {
            clip_position: Vec4::new(1.0, -1.0, 1.0, 2.0),
            world_position: Vec3::new(2.0, 4.0, 6.0),
            tex_coord: Vec2::new(1.0, 1.0),
            ..Default::default()
        };
        payload.finalize(&Viewport::new(0, 0, 100, 100));

        assert_relative_eq!(payload.inv_w, 0.5);
        assert_eq!(payload.ndc_position, Vec3::new(0.5, -0.5, 0.5));
        assert_eq!(payload.screen_position, Vec3::new(75.0, 25.0, 0.5));
        assert_eq!(payload.world_position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(payload.tex_coord, Vec2::new(0.5, 0.5));
    }

    #[test]
    fn test_closures_are_shaders() {
        let vs = |id: u32, out: &mut ShaderPayload, scale: &f32| {
            out.clip_position = Vec4::new(id as f32 * scale, 0.0, 0.0, 1.0);
        };
        let ps = |_: &ShaderPayload, scale: &f32| Vec4::splat(*scale);

        let vs: &dyn VertexShader<f32> = &vs;
        let ps: &dyn PixelShader<f32> = &ps;
        let mut payload = ShaderPayload::default();
        vs.main(3, &mut payload, &2.0);
        assert_eq!(payload.clip_position.x, 6.0);
        assert_eq!(ps.main(&payload, &0.5), Vec4::splat(0.5));
    }
}
