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

//! Metallic-roughness PBR shading with a single directional light.
//!
//! The BRDF is Cook-Torrance with a GGX distribution, Schlick-GGX geometry
//! and Schlick Fresnel. The light is attenuated by a 5x5 PCF lookup into an
//! optional shadow map, then the result is exposed, ACES tonemapped and
//! gamma encoded.

use super::MeshView;
use serde::{Deserialize, Serialize};
use vireo_core::math::{self, Mat3, Mat4, Vec2, Vec3, Vec4, PI};
use vireo_core::renderer::{
    PixelShader, RenderTarget, SamplerState, ShaderPayload, Texture, VertexShader,
};

/// Reflectance at normal incidence shared by all dielectrics.
const DIELECTRIC_F0: f32 = 0.04;

/// Lower bound on roughness; the GGX lobe degenerates at zero.
const MIN_ROUGHNESS: f32 = 0.045;

/// Quantity the lit shader writes instead of the shaded color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DebugView {
    /// Fully lit and tonemapped.
    #[default]
    Lit,
    /// World-space position.
    Position,
    /// Shading normal, after normal mapping.
    Normal,
    /// Linear base color.
    BaseColor,
    /// Metallic factor.
    Metallic,
    /// Roughness factor.
    Roughness,
    /// Clip-space depth `z / w`.
    Depth,
    /// Shadow visibility.
    Shadow,
}

/// Per-frame camera, light and output parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameData {
    /// World to clip space.
    pub view_projection: Mat4,
    /// Eye position in world space.
    pub camera_position: Vec3,
    /// Direction the light travels in.
    pub light_direction: Vec3,
    /// Linear light color.
    pub light_color: Vec3,
    /// Scalar applied to `light_color`.
    pub light_intensity: f32,
    /// Multiplier applied before tonemapping.
    pub exposure: f32,
    /// Display gamma, also used to decode sRGB base color maps.
    pub gamma: f32,
    /// Debug output selection.
    pub debug_view: DebugView,
}

impl Default for FrameData {
    fn default() -> Self {
        Self {
            view_projection: Mat4::IDENTITY,
            camera_position: Vec3::ZERO,
            light_direction: Vec3::new(0.0, -1.0, 0.0),
            light_color: Vec3::ONE,
            light_intensity: 1.0,
            exposure: 1.0,
            gamma: 2.2,
            debug_view: DebugView::Lit,
        }
    }
}

/// Surface description for [`LitShader`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material<'a> {
    /// Linear base color factor.
    pub base_color: Vec4,
    /// Metallic factor.
    pub metallic: f32,
    /// Perceptual roughness factor.
    pub roughness: f32,
    /// Linear emitted radiance, added after lighting.
    pub emission: Vec3,
    /// sRGB base color map.
    pub base_color_map: Option<&'a Texture>,
    /// Tangent-space normal map.
    pub normal_map: Option<&'a Texture>,
    /// Roughness in green, metallic in blue.
    pub metallic_roughness_map: Option<&'a Texture>,
}

impl Default for Material<'_> {
    fn default() -> Self {
        Self {
            base_color: Vec4::ONE,
            metallic: 0.0,
            roughness: 0.5,
            emission: Vec3::ZERO,
            base_color_map: None,
            normal_map: None,
            metallic_roughness_map: None,
        }
    }
}

/// A depth target rendered from the light, used for shadowing.
#[derive(Debug, Clone, Copy)]
pub struct ShadowMap<'a> {
    /// Depth written by the shadow pass.
    pub depth: &'a RenderTarget<f32>,
    /// World to light clip space, as used by the shadow pass.
    pub light_view_projection: Mat4,
    /// Depth offset subtracted before comparing, against acne.
    pub bias: f32,
}

impl ShadowMap<'_> {
    /// Fraction of light reaching `world_position`, in `[0, 1]`.
    ///
    /// Points projecting outside the map are fully lit.
    pub fn visibility(&self, world_position: Vec3) -> f32 {
        let clip = self.light_view_projection * world_position.extend(1.0);
        if clip.w <= 0.0 {
            return 1.0;
        }
        let ndc = clip.truncate() * (1.0 / clip.w);
        let coord = Vec3::new((1.0 + ndc.x) * 0.5, (1.0 + ndc.y) * 0.5, ndc.z);
        pcf(self.depth, coord, self.bias)
    }
}

fn pcf(depth: &RenderTarget<f32>, coord: Vec3, bias: f32) -> f32 {
    let outside = |v: f32| !(0.0..=1.0).contains(&v);
    if outside(coord.x) || outside(coord.y) || outside(coord.z) || depth.is_empty() {
        return 1.0;
    }
    let reference = coord.z - bias;
    let texel = Vec2::new(1.0 / depth.width() as f32, 1.0 / depth.height() as f32);

    let mut lit = 0u32;
    for i in -2..=2 {
        for j in -2..=2 {
            let uv = coord.xy() + Vec2::new(i as f32 * texel.x, j as f32 * texel.y);
            if reference < depth.sample(&SamplerState::LINEAR_CLAMP, uv) {
                lit += 1;
            }
        }
    }
    lit as f32 / 25.0
}

/// Uniforms of [`LitShader`].
#[derive(Debug, Clone, Copy)]
pub struct LitUniforms<'a> {
    /// Mesh being drawn. Normals are required for meaningful lighting.
    pub mesh: MeshView<'a>,
    /// Object to world space.
    pub model: Mat4,
    /// Camera and light.
    pub frame: &'a FrameData,
    /// Surface.
    pub material: &'a Material<'a>,
    /// Optional shadow map for the light.
    pub shadow: Option<ShadowMap<'a>>,
}

/// Physically based forward shading.
#[derive(Debug, Clone, Copy, Default)]
pub struct LitShader;

impl<'a> VertexShader<LitUniforms<'a>> for LitShader {
    fn main(&self, vertex_id: u32, output: &mut ShaderPayload, uniforms: &LitUniforms<'a>) {
        let mesh = &uniforms.mesh;
        let world = uniforms.model * mesh.position(vertex_id).extend(1.0);
        let normal_matrix = Mat3::normal_matrix(&uniforms.model);

        output.clip_position = uniforms.frame.view_projection * world;
        output.world_position = world.truncate();
        output.world_normal = (normal_matrix * mesh.normal(vertex_id)).normalize();
        output.world_tangent = (normal_matrix * mesh.tangent(vertex_id)).normalize();
        output.tex_coord = mesh.tex_coord(vertex_id);
    }
}

impl<'a> PixelShader<LitUniforms<'a>> for LitShader {
    fn main(&self, input: &ShaderPayload, uniforms: &LitUniforms<'a>) -> Vec4 {
        let frame = uniforms.frame;
        let material = uniforms.material;
        let uv = input.tex_coord;
        let sampler = SamplerState::LINEAR_WRAP;

        let base_color = match material.base_color_map {
            Some(map) => {
                material.base_color * srgb_to_linear(map.sample(&sampler, uv), frame.gamma)
            }
            None => material.base_color,
        };

        let mut n = input.world_normal.normalize();
        if let Some(map) = material.normal_map {
            let t = input.world_tangent.normalize();
            let b = n.cross(t);
            let tangent_normal =
                (map.sample(&sampler, uv).truncate() * 2.0 - Vec3::ONE).normalize();
            n = (Mat3::from_cols(t, b, n) * tangent_normal).normalize();
        }

        let factors = material
            .metallic_roughness_map
            .map_or(Vec4::ONE, |map| map.sample(&sampler, uv));
        let metallic = math::saturate(material.metallic * factors.z);
        let roughness = math::saturate(material.roughness * factors.y);

        let visibility = uniforms
            .shadow
            .as_ref()
            .map_or(1.0, |shadow| shadow.visibility(input.world_position));

        let out = match frame.debug_view {
            DebugView::Lit => {
                let v = (frame.camera_position - input.world_position).normalize();
                let radiance = shade_direct(
                    n,
                    v,
                    -frame.light_direction.normalize(),
                    base_color.truncate(),
                    metallic,
                    roughness,
                ) * frame.light_color
                    * (frame.light_intensity * visibility);
                let color = aces_film((radiance + material.emission) * frame.exposure);
                gamma_encode(color, frame.gamma)
            }
            DebugView::Position => input.world_position,
            DebugView::Normal => n,
            DebugView::BaseColor => base_color.truncate(),
            DebugView::Metallic => Vec3::splat(metallic),
            DebugView::Roughness => Vec3::splat(roughness),
            DebugView::Depth => Vec3::splat(input.clip_position.z / input.clip_position.w),
            DebugView::Shadow => Vec3::splat(visibility),
        };
        out.extend(1.0)
    }
}

/// Outgoing radiance towards `v` per unit of incoming radiance from `l`,
/// already multiplied by the cosine term.
fn shade_direct(
    n: Vec3,
    v: Vec3,
    l: Vec3,
    base_color: Vec3,
    metallic: f32,
    roughness: f32,
) -> Vec3 {
    let cos_li = math::saturate(n.dot(l));
    if cos_li <= 0.0 {
        return Vec3::ZERO;
    }
    let n_dot_v = math::saturate(n.dot(v));
    let h = (l + v).normalize();
    let cos_lh = math::saturate(n.dot(h));
    let roughness = roughness.max(MIN_ROUGHNESS);

    let f0 = Vec3::lerp(Vec3::splat(DIELECTRIC_F0), base_color, metallic);
    let f = fresnel_schlick(f0, n_dot_v);
    let d = distribution_ggx(cos_lh, roughness);
    let g = geometry_schlick_ggx(cos_li, n_dot_v, roughness);

    let kd = (Vec3::ONE - f) * (1.0 - metallic);
    let diffuse = kd * base_color * (1.0 / PI);
    let specular = f * (d * g / (4.0 * cos_li * n_dot_v).max(0.001));
    (diffuse + specular) * cos_li
}

fn distribution_ggx(n_dot_h: f32, roughness: f32) -> f32 {
    let alpha = roughness * roughness;
    let alpha_sq = alpha * alpha;
    let denom = n_dot_h * n_dot_h * (alpha_sq - 1.0) + 1.0;
    alpha_sq / (PI * denom * denom)
}

fn geometry_schlick_ggx(n_dot_l: f32, n_dot_v: f32, roughness: f32) -> f32 {
    let r = roughness + 1.0;
    let k = r * r / 8.0;
    let g1 = |cos: f32| cos / (cos * (1.0 - k) + k);
    g1(n_dot_l) * g1(n_dot_v)
}

fn fresnel_schlick(f0: Vec3, cos_theta: f32) -> Vec3 {
    f0 + (Vec3::ONE - f0) * (1.0 - cos_theta).powi(5)
}

/// ACES filmic curve fit, clamped to `[0, 1]`.
pub fn aces_film(x: Vec3) -> Vec3 {
    const A: f32 = 2.51;
    const B: f32 = 0.03;
    const C: f32 = 2.43;
    const D: f32 = 0.59;
    const E: f32 = 0.14;
    let curve = |x: f32| math::saturate((x * (A * x + B)) / (x * (C * x + D) + E));
    Vec3::new(curve(x.x), curve(x.y), curve(x.z))
}

fn gamma_encode(color: Vec3, gamma: f32) -> Vec3 {
    color.abs().powf(1.0 / gamma)
}

fn srgb_to_linear(color: Vec4, gamma: f32) -> Vec4 {
    color.truncate().powf(gamma).extend(color.w)
}
