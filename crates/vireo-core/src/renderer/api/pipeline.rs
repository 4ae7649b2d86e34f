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

//! Defines the fixed-function state bundled with a shader pair for a draw call.

use serde::{Deserialize, Serialize};

use super::pool::{ColorTargetId, DepthTargetId};
use super::shader::{PixelShader, VertexShader};
use std::fmt;

/// Three indices into the vertex payloads of a draw. Order defines winding.
pub type Primitive = [u32; 3];

/// Defines how triangles are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FillMode {
    /// Every covered pixel is shaded.
    #[default]
    Solid,
    /// Only covered pixels within one pixel of an edge are shaded.
    Wireframe,
}

/// Defines which face of a triangle to cull (not render).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CullMode {
    /// No culling is performed.
    None,
    /// Cull front-facing triangles.
    Front,
    /// Cull back-facing triangles.
    #[default]
    Back,
    /// Cull every triangle.
    FrontAndBack,
}

/// Defines which vertex winding order considers a triangle to be "front-facing".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FrontFace {
    /// Counter-clockwise winding on screen (positive signed area) is the front face.
    #[default]
    Ccw,
    /// Clockwise winding on screen (negative signed area) is the front face.
    Cw,
}

/// The comparison function used for depth testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CompareFunction {
    /// The test never passes.
    Never,
    /// The test passes if the new value is less than the existing value.
    Less,
    /// The test passes if the new value is equal to the existing value.
    Equal,
    /// The test passes if the new value is less than or equal to the existing value.
    #[default]
    LessEqual,
    /// The test passes if the new value is greater than the existing value.
    Greater,
    /// The test passes if the new value is not equal to the existing value.
    NotEqual,
    /// The test passes if the new value is greater than or equal to the existing value.
    GreaterEqual,
    /// The test always passes.
    Always,
}

impl CompareFunction {
    /// Compares a candidate value against the stored one.
    #[inline]
    pub fn test(self, candidate: f32, stored: f32) -> bool {
        match self {
            CompareFunction::Never => false,
            CompareFunction::Less => candidate < stored,
            CompareFunction::Equal => candidate == stored,
            CompareFunction::LessEqual => candidate <= stored,
            CompareFunction::Greater => candidate > stored,
            CompareFunction::NotEqual => candidate != stored,
            CompareFunction::GreaterEqual => candidate >= stored,
            CompareFunction::Always => true,
        }
    }
}

impl FrontFace {
    /// Whether a triangle with the given screen-space signed area faces the viewer.
    #[inline]
    pub fn is_front(self, signed_area: f32) -> bool {
        match self {
            FrontFace::Ccw => signed_area > 0.0,
            FrontFace::Cw => signed_area < 0.0,
        }
    }
}

impl CullMode {
    /// Whether a triangle of the given facing is removed.
    #[inline]
    pub fn culls(self, front_facing: bool) -> bool {
        match self {
            CullMode::None => false,
            CullMode::Front => front_facing,
            CullMode::Back => !front_facing,
            CullMode::FrontAndBack => true,
        }
    }
}

/// Everything a draw call needs besides geometry and uniforms.
///
/// Targets are referenced by handle and resolved against the caller's
/// [`RenderTargetPool`](super::pool::RenderTargetPool) when the draw starts.
pub struct GraphicsPipelineState<'a, U> {
    /// The vertex stage.
    pub vertex_shader: &'a dyn VertexShader<U>,
    /// The pixel stage.
    pub pixel_shader: &'a dyn PixelShader<U>,
    /// Solid or wireframe filling.
    pub fill_mode: FillMode,
    /// Which faces are culled.
    pub cull_mode: CullMode,
    /// Which winding is front-facing.
    pub front_face: FrontFace,
    /// Whether covered pixels are depth-tested.
    pub depth_test_enable: bool,
    /// Whether passing pixels write their depth.
    pub depth_write_enable: bool,
    /// Comparison used by the depth test.
    pub depth_compare: CompareFunction,
    /// Color output. `None` skips the pixel stage.
    pub color_target: Option<ColorTargetId>,
    /// Depth buffer.
    pub depth_target: Option<DepthTargetId>,
}

impl<'a, U> GraphicsPipelineState<'a, U> {
    /// Creates a pipeline with back-face culling, counter-clockwise front faces
    /// and `LessEqual` depth test and write enabled. No targets are bound.
    pub fn new(
        vertex_shader: &'a dyn VertexShader<U>,
        pixel_shader: &'a dyn PixelShader<U>,
    ) -> Self {
        Self {
            vertex_shader,
            pixel_shader,
            fill_mode: FillMode::Solid,
            cull_mode: CullMode::Back,
            front_face: FrontFace::Ccw,
            depth_test_enable: true,
            depth_write_enable: true,
            depth_compare: CompareFunction::LessEqual,
            color_target: None,
            depth_target: None,
        }
    }

    /// Binds a color target.
    pub fn with_color_target(mut self, target: ColorTargetId) -> Self {
        self.color_target = Some(target);
        self
    }

    /// Binds a depth target.
    pub fn with_depth_target(mut self, target: DepthTargetId) -> Self {
        self.depth_target = Some(target);
        self
    }

    /// Sets the fill mode.
    pub fn with_fill_mode(mut self, fill_mode: FillMode) -> Self {
        self.fill_mode = fill_mode;
        self
    }

    /// Sets the cull mode.
    pub fn with_cull_mode(mut self, cull_mode: CullMode) -> Self {
        self.cull_mode = cull_mode;
        self
    }

    /// Sets the front-face winding.
    pub fn with_front_face(mut self, front_face: FrontFace) -> Self {
        self.front_face = front_face;
        self
    }

    /// Enables or disables depth testing and sets its comparison.
    pub fn with_depth_test(mut self, enable: bool, compare: CompareFunction) -> Self {
        self.depth_test_enable = enable;
        self.depth_compare = compare;
        self
    }

    /// Enables or disables depth writes.
    pub fn with_depth_write(mut self, enable: bool) -> Self {
        self.depth_write_enable = enable;
        self
    }

    /// Whether a triangle with the given screen-space signed area is culled.
    ///
    /// Zero-area triangles are always culled.
    #[inline]
    pub fn culls(&self, signed_area: f32) -> bool {
        if signed_area == 0.0 || signed_area.is_nan() {
            return true;
        }
        self.cull_mode.culls(self.front_face.is_front(signed_area))
    }
}

impl<U> Clone for GraphicsPipelineState<'_, U> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<U> Copy for GraphicsPipelineState<'_, U> {}

impl<U> fmt::Debug for GraphicsPipelineState<'_, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphicsPipelineState")
            .field("fill_mode", &self.fill_mode)
            .field("cull_mode", &self.cull_mode)
            .field("front_face", &self.front_face)
            .field("depth_test_enable", &self.depth_test_enable)
            .field("depth_write_enable", &self.depth_write_enable)
            .field("depth_compare", &self.depth_compare)
            .field("color_target", &self.color_target)
            .field("depth_target", &self.depth_target)
            .finish_non_exhaustive()
    }
}
