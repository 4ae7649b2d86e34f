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

//! The unlit shader: transformed positions and a flat or textured color.

use super::MeshView;
use vireo_core::math::{Mat4, Vec4};
use vireo_core::renderer::{PixelShader, SamplerState, ShaderPayload, Texture, VertexShader};

/// Uniforms of [`UnlitShader`].
#[derive(Debug, Clone, Copy)]
pub struct UnlitUniforms<'a> {
    /// Mesh being drawn.
    pub mesh: MeshView<'a>,
    /// Object to clip space.
    pub mvp: Mat4,
    /// Color multiplied into every pixel.
    pub color: Vec4,
    /// Optional texture sampled at the interpolated texture coordinate.
    pub texture: Option<&'a Texture>,
    /// Sampler used for `texture`.
    pub sampler: SamplerState,
}

/// Draws meshes without lighting.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnlitShader;

impl<'a> VertexShader<UnlitUniforms<'a>> for UnlitShader {
    fn main(&self, vertex_id: u32, output: &mut ShaderPayload, uniforms: &UnlitUniforms<'a>) {
        let position = uniforms.mesh.position(vertex_id);
        output.clip_position = uniforms.mvp * position.extend(1.0);
        output.world_position = position;
        output.tex_coord = uniforms.mesh.tex_coord(vertex_id);
    }
}

impl<'a> PixelShader<UnlitUniforms<'a>> for UnlitShader {
    fn main(&self, input: &ShaderPayload, uniforms: &UnlitUniforms<'a>) -> Vec4 {
        match uniforms.texture {
            Some(texture) => uniforms.color * texture.sample(&uniforms.sampler, input.tex_coord),
            None => uniforms.color,
        }
    }
}
