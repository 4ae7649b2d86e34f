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

//! Defines the error types for the rendering subsystem.

use crate::jobs::JobError;
use crate::renderer::api::pool::{ColorTargetId, DepthTargetId};
use thiserror::Error;

/// An error raised by a render target or texture accessor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    /// The coordinate lies outside the target.
    #[error("Texel ({x}, {y}) is outside the {width}x{height} target")]
    OutOfBounds {
        /// Requested column.
        x: u32,
        /// Requested row.
        y: u32,
        /// Width of the target.
        width: u32,
        /// Height of the target.
        height: u32,
    },
    /// The supplied data does not match the declared dimensions.
    #[error("Expected {expected} bytes of texel data, got {actual}")]
    SizeMismatch {
        /// Byte count implied by the dimensions.
        expected: usize,
        /// Byte count actually supplied.
        actual: usize,
    },
}

/// An error that aborts a draw call before any pixel is written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RasterError {
    /// The pipeline references a color target that is not in the pool.
    #[error("Color target {0} does not exist")]
    InvalidColorTarget(ColorTargetId),
    /// The pipeline references a depth target that is not in the pool.
    #[error("Depth target {0} does not exist")]
    InvalidDepthTarget(DepthTargetId),
    /// Color and depth targets are both bound but differ in size.
    #[error("Color target is {color:?} but depth target is {depth:?}")]
    TargetSizeMismatch {
        /// `(width, height)` of the color target.
        color: (u32, u32),
        /// `(width, height)` of the depth target.
        depth: (u32, u32),
    },
    /// Depth testing is enabled but no depth target is bound.
    #[error("Depth test is enabled without a depth target")]
    DepthTestWithoutTarget,
    /// A primitive references a vertex past the end of the draw.
    #[error("Primitive {primitive} references vertex {index}, but only {vertex_count} vertices were drawn")]
    IndexOutOfRange {
        /// Position of the offending primitive in the submitted list.
        primitive: usize,
        /// The out-of-range index.
        index: u32,
        /// Vertex count of the draw call.
        vertex_count: u32,
    },
    /// The job system failed to run the draw.
    #[error(transparent)]
    Job(#[from] JobError),
}
