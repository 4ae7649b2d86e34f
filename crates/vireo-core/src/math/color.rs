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

//! Defines the `Rgba8` texel stored in color targets.
//!
//! Shaders compute colors as linear `Vec4`s; the rasterizer quantizes them to
//! [`Rgba8`] when writing to a color target.

use serde::{Deserialize, Serialize};

use super::{saturate, vector::Vec4};

/// An 8-bit-per-channel RGBA texel, the storage format of color targets.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    bytemuck::Pod,
    bytemuck::Zeroable,
    Serialize,
    Deserialize,
)]
#[repr(C)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    /// All channels zero.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Creates a texel from its four channels.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Quantizes a shader output: each channel is clamped to `[0, 1]`, scaled
    /// by 255 and truncated. NaN channels become 0.
    ///
    /// ```
    /// use vireo_core::math::{Rgba8, Vec4};
    /// let c = Rgba8::from_vec4_clamped(Vec4::new(2.0, 0.5, -1.0, 1.0));
    /// assert_eq!(c, Rgba8::new(255, 127, 0, 255));
    /// ```
    #[inline]
    pub fn from_vec4_clamped(v: Vec4) -> Self {
        let q = |c: f32| (saturate(c) * 255.0) as u8;
        Self::new(q(v.x), q(v.y), q(v.z), q(v.w))
    }

    /// Expands the texel to normalized `[0, 1]` floats.
    #[inline]
    pub fn to_vec4(self) -> Vec4 {
        Vec4::new(self.r as f32, self.g as f32, self.b as f32, self.a as f32) * (1.0 / 255.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_quantization_truncates() {
        let c = Rgba8::from_vec4_clamped(Vec4::new(1.0, 0.999, 0.0, 0.5));
        assert_eq!(c, Rgba8::new(255, 254, 0, 127));
    }

    #[test]
    fn test_quantization_clamps_out_of_range_and_nan() {
        let c = Rgba8::from_vec4_clamped(Vec4::new(f32::NAN, 7.0, -0.2, f32::INFINITY));
        assert_eq!(c, Rgba8::new(0, 255, 0, 255));
    }

    #[test]
    fn test_rgba8_to_vec4() {
        let v = Rgba8::WHITE.to_vec4();
        assert_relative_eq!(v.x, 1.0);
        assert_relative_eq!(v.w, 1.0);
        assert_eq!(Rgba8::TRANSPARENT.to_vec4(), Vec4::ZERO);
    }
}
