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

//! Built-in shaders for the software rasterizer.
//!
//! Each shader is a zero-sized type implementing both
//! [`VertexShader`](vireo_core::renderer::VertexShader) and
//! [`PixelShader`](vireo_core::renderer::PixelShader) for its own uniform
//! struct. Vertex attributes reach the shaders through a borrowed
//! [`MeshView`] inside the uniforms.
//!
//! # Available Shaders
//!
//! - [`UnlitShader`] - Flat color, optionally modulated by a texture
//! - [`DepthOnlyShader`] - Position-only pass for shadow maps
//! - [`LitShader`] - Metallic-roughness PBR with one directional light,
//!   PCF shadows and ACES tonemapping
//!
//! # Usage
//!
//! ```
//! use vireo_core::math::{Mat4, Vec3, Vec4};
//! use vireo_core::renderer::{GraphicsPipelineState, SamplerState};
//! use vireo_lanes::render_lane::shaders::{MeshView, UnlitShader, UnlitUniforms};
//!
//! let positions = [Vec3::ZERO, Vec3::X, Vec3::Y];
//! let uniforms = UnlitUniforms {
//!     mesh: MeshView::new(&positions),
//!     mvp: Mat4::IDENTITY,
//!     color: Vec4::ONE,
//!     texture: None,
//!     sampler: SamplerState::LINEAR_WRAP,
//! };
//! let pipeline = GraphicsPipelineState::<UnlitUniforms>::new(&UnlitShader, &UnlitShader);
//! # let _ = (pipeline, uniforms);
//! ```

mod depth_only;
mod lit;
mod unlit;

pub use depth_only::*;
pub use lit::*;
pub use unlit::*;

use vireo_core::math::{Vec2, Vec3};

/// Borrowed per-vertex attribute streams of one mesh.
///
/// Only positions are required. Missing normals, tangents or texture
/// coordinates read as zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeshView<'a> {
    /// Object-space positions.
    pub positions: &'a [Vec3],
    /// Object-space normals.
    pub normals: &'a [Vec3],
    /// Object-space tangents.
    pub tangents: &'a [Vec3],
    /// Texture coordinates.
    pub tex_coords: &'a [Vec2],
}

impl<'a> MeshView<'a> {
    /// A view over positions only.
    pub fn new(positions: &'a [Vec3]) -> Self {
        Self {
            positions,
            ..Default::default()
        }
    }

    /// Adds normals.
    pub fn with_normals(mut self, normals: &'a [Vec3]) -> Self {
        self.normals = normals;
        self
    }

    /// Adds tangents.
    pub fn with_tangents(mut self, tangents: &'a [Vec3]) -> Self {
        self.tangents = tangents;
        self
    }

    /// Adds texture coordinates.
    pub fn with_tex_coords(mut self, tex_coords: &'a [Vec2]) -> Self {
        self.tex_coords = tex_coords;
        self
    }

    /// Number of vertices, as passed to `draw_primitives`.
    pub fn vertex_count(&self) -> u32 {
        self.positions.len() as u32
    }

    #[inline]
    pub(crate) fn position(&self, id: u32) -> Vec3 {
        self.positions.get(id as usize).copied().unwrap_or_default()
    }

    #[inline]
    pub(crate) fn normal(&self, id: u32) -> Vec3 {
        self.normals.get(id as usize).copied().unwrap_or_default()
    }

    #[inline]
    pub(crate) fn tangent(&self, id: u32) -> Vec3 {
        self.tangents.get(id as usize).copied().unwrap_or_default()
    }

    #[inline]
    pub(crate) fn tex_coord(&self, id: u32) -> Vec2 {
        self.tex_coords.get(id as usize).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_attributes_read_as_zero() {
        let positions = [Vec3::X, Vec3::Y];
        let normals = [Vec3::Z];
        let mesh = MeshView::new(&positions).with_normals(&normals);

        assert_eq!(mesh.vertex_count(), 2);
        assert_eq!(mesh.position(1), Vec3::Y);
        assert_eq!(mesh.normal(0), Vec3::Z);
        assert_eq!(mesh.normal(1), Vec3::ZERO);
        assert_eq!(mesh.tangent(0), Vec3::ZERO);
        assert_eq!(mesh.tex_coord(0), Vec2::ZERO);
    }
}
