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

//! Sampler state and the color texture type read by pixel shaders.

use serde::{Deserialize, Serialize};

use super::target::RenderTarget;
use crate::math::{Vec2, Vec4};
use crate::renderer::error::TargetError;

/// Defines how texel coordinates outside the texture are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AddressMode {
    /// Coordinates repeat. Texel `width` becomes texel `0`.
    #[default]
    Wrap,
    /// Coordinates repeat, mirroring every other period.
    Mirror,
    /// Coordinates are clamped to the edge texels.
    Clamp,
}

impl AddressMode {
    /// Maps an integer texel coordinate into `[0, dim)`. `dim` must be positive.
    #[inline]
    pub fn resolve(self, coord: i64, dim: i64) -> i64 {
        match self {
            AddressMode::Wrap => coord.rem_euclid(dim),
            AddressMode::Mirror => {
                let m = coord.rem_euclid(2 * dim);
                if m < dim {
                    m
                } else {
                    2 * dim - 1 - m
                }
            }
            AddressMode::Clamp => coord.clamp(0, dim - 1),
        }
    }
}

/// Defines the filtering mode for texture sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FilterMode {
    /// Point sampling. Returns the value of the nearest texel.
    Nearest,
    /// Bilinear interpolation of the four nearest texels.
    #[default]
    Linear,
}

/// How a texture or target is sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SamplerState {
    /// Filtering between texels.
    pub filter: FilterMode,
    /// Addressing outside `[0, 1]`.
    pub address: AddressMode,
}

impl SamplerState {
    /// Bilinear filtering, repeating coordinates.
    pub const LINEAR_WRAP: Self = Self {
        filter: FilterMode::Linear,
        address: AddressMode::Wrap,
    };
    /// Bilinear filtering, clamped coordinates.
    pub const LINEAR_CLAMP: Self = Self {
        filter: FilterMode::Linear,
        address: AddressMode::Clamp,
    };
    /// Point filtering, repeating coordinates.
    pub const NEAREST_WRAP: Self = Self {
        filter: FilterMode::Nearest,
        address: AddressMode::Wrap,
    };
    /// Point filtering, clamped coordinates.
    pub const NEAREST_CLAMP: Self = Self {
        filter: FilterMode::Nearest,
        address: AddressMode::Clamp,
    };
}

/// A color texture with `[0, 1]` float texels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Texture {
    texels: RenderTarget<Vec4>,
}

impl Texture {
    /// Creates a texture of a single color.
    pub fn solid(color: Vec4) -> Self {
        let mut texels = RenderTarget::new(1, 1);
        texels.clear(color);
        Self { texels }
    }

    /// Builds a texture from tightly packed 8-bit RGBA data.
    pub fn from_rgba8(width: u32, height: u32, bytes: &[u8]) -> Result<Self, TargetError> {
        let expected = width as usize * height as usize * 4;
        if bytes.len() != expected {
            return Err(TargetError::SizeMismatch {
                expected,
                actual: bytes.len(),
            });
        }
        let texels = bytes
            .chunks_exact(4)
            .map(|c| {
                Vec4::new(c[0] as f32, c[1] as f32, c[2] as f32, c[3] as f32) * (1.0 / 255.0)
            })
            .collect();
        Ok(Self {
            texels: RenderTarget::from_data(width, height, texels)?,
        })
    }

    /// Width in texels.
    pub fn width(&self) -> u32 {
        self.texels.width()
    }

    /// Height in texels.
    pub fn height(&self) -> u32 {
        self.texels.height()
    }

    /// Reads one texel. Coordinates outside the texture yield zero.
    pub fn load_texel(&self, x: i64, y: i64) -> Vec4 {
        if x < 0 || y < 0 {
            return Vec4::ZERO;
        }
        self.texels
            .try_load(x as u32, y as u32)
            .unwrap_or(Vec4::ZERO)
    }

    /// Samples the texture at `uv`.
    #[inline]
    pub fn sample(&self, sampler: &SamplerState, uv: Vec2) -> Vec4 {
        self.texels.sample(sampler, uv)
    }

    /// The underlying texel storage.
    pub fn texels(&self) -> &RenderTarget<Vec4> {
        &self.texels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_address_modes() {
        assert_eq!(AddressMode::Wrap.resolve(-1, 4), 3);
        assert_eq!(AddressMode::Wrap.resolve(9, 4), 1);
        assert_eq!(AddressMode::Clamp.resolve(-7, 4), 0);
        assert_eq!(AddressMode::Clamp.resolve(7, 4), 3);
        let mirrored: Vec<_> = (-2..10).map(|x| AddressMode::Mirror.resolve(x, 4)).collect();
        assert_eq!(mirrored, vec![1, 0, 0, 1, 2, 3, 3, 2, 1, 0, 0, 1]);
    }

    #[test]
    fn test_from_rgba8() {
        let tex = Texture::from_rgba8(2, 1, &[255, 0, 0, 255, 0, 0, 255, 255]).unwrap();
        assert_eq!(tex.load_texel(0, 0), Vec4::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(tex.load_texel(1, 0), Vec4::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(tex.load_texel(2, 0), Vec4::ZERO);
        assert_eq!(tex.load_texel(-1, 0), Vec4::ZERO);

        let blended = tex.sample(&SamplerState::LINEAR_CLAMP, Vec2::new(0.5, 0.5));
        assert_relative_eq!(blended.x, 0.5);
        assert_relative_eq!(blended.z, 0.5);

        assert!(matches!(
            Texture::from_rgba8(2, 2, &[0; 15]),
            Err(TargetError::SizeMismatch { expected: 16, actual: 15 })
        ));
    }

    #[test]
    fn test_solid_texture() {
        let tex = Texture::solid(Vec4::ONE);
        assert_eq!(tex.sample(&SamplerState::LINEAR_WRAP, Vec2::new(3.7, -2.2)), Vec4::ONE);
        for uv in [Vec2::new(f32::INFINITY, 0.0), Vec2::new(1.0e30, -1.0e30)] {
            assert_eq!(tex.sample(&SamplerState::LINEAR_WRAP, uv), Vec4::ONE);
            assert_eq!(tex.sample(&SamplerState::NEAREST_CLAMP, uv), Vec4::ONE);
        }
    }
}
