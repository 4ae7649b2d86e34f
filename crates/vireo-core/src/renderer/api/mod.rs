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

//! Software rendering API.
//!
//! Organized into several logical sub-modules:
//!
//! - **[`target`]**: 2D texel buffers with load/store and filtered sampling.
//! - **[`texture`]**: Sampler state and color textures.
//! - **[`pool`]**: The caller-owned table of color and depth targets.
//! - **[`shader`]**: The vertex/pixel stage traits and their payload.
//! - **[`pipeline`]**: Fixed-function state for a draw call.
//! - **[`viewport`]**: The NDC to screen mapping.

pub mod pipeline;
pub mod pool;
pub mod shader;
pub mod target;
pub mod texture;
pub mod viewport;

pub use self::pipeline::{
    CompareFunction, CullMode, FillMode, FrontFace, GraphicsPipelineState, Primitive,
};
pub use self::pool::{ColorTargetId, DepthTargetId, RenderTargetPool};
pub use self::shader::{PixelShader, ShaderPayload, VertexShader};
pub use self::target::{RenderTarget, RowBand, Texel};
pub use self::texture::{AddressMode, FilterMode, SamplerState, Texture};
pub use self::viewport::Viewport;
