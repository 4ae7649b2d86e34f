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

//! Provides the rendering contracts shared by the rasterizer and its callers.
//!
//! This module defines the "what" of rendering: render targets, textures,
//! shader stages, pipeline state and the errors and statistics a draw call
//! produces. The "how" (scan conversion and the built-in shaders) lives in
//! the `vireo-lanes` crate, which only depends on these types.

pub mod api;
pub mod error;
pub mod stats;

// Re-export the most important types for easier use.
pub use self::api::*;
pub use self::error::{RasterError, TargetError};
pub use self::stats::{DrawStats, FrameStats};
