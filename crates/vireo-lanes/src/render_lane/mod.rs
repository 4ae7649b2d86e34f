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

//! Rendering lane - the hot path of the software rasterizer.
//!
//! [`Rasterizer`] turns a [`GraphicsPipelineState`](vireo_core::renderer::GraphicsPipelineState),
//! a vertex count and a list of primitives into pixels in the caller's
//! [`RenderTargetPool`](vireo_core::renderer::RenderTargetPool). The
//! [`shaders`] module provides ready-made vertex and pixel stages.

mod rasterizer;
pub mod shaders;
mod triangle;

pub use rasterizer::*;
pub use triangle::{barycentric, interpolate, is_trivially_outside, Barycentric};
