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

//! Position-only shader for depth prepasses and shadow maps.

use super::MeshView;
use vireo_core::math::{Mat4, Vec4};
use vireo_core::renderer::{PixelShader, ShaderPayload, VertexShader};

/// Uniforms of [`DepthOnlyShader`].
#[derive(Debug, Clone, Copy)]
pub struct DepthOnlyUniforms<'a> {
    /// Mesh being drawn.
    pub mesh: MeshView<'a>,
    /// Object to (light) clip space.
    pub mvp: Mat4,
}

/// Writes depth only. Bind a depth target and no color target; the pixel
/// stage then never runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DepthOnlyShader;

impl<'a> VertexShader<DepthOnlyUniforms<'a>> for DepthOnlyShader {
    fn main(&self, vertex_id: u32, output: &mut ShaderPayload, uniforms: &DepthOnlyUniforms<'a>) {
        output.clip_position = uniforms.mvp * uniforms.mesh.position(vertex_id).extend(1.0);
    }
}

impl<'a> PixelShader<DepthOnlyUniforms<'a>> for DepthOnlyShader {
    fn main(&self, _input: &ShaderPayload, _uniforms: &DepthOnlyUniforms<'a>) -> Vec4 {
        Vec4::ONE
    }
}
