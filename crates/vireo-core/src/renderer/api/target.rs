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

//! CPU-resident 2D buffers used as color targets, depth targets and textures.

use super::texture::{AddressMode, FilterMode, SamplerState};
use crate::math::{lerp, Rgba8, Vec2, Vec4};
use crate::renderer::error::TargetError;

/// An element type that can be filtered by [`RenderTarget::sample`].
pub trait Texel: Copy + Default + Send + Sync {
    /// Blends two texels. `t == 0` yields `a`, `t == 1` yields `b`.
    fn lerp(a: Self, b: Self, t: f32) -> Self;
}

impl Texel for f32 {
    #[inline]
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        lerp(a, b, t)
    }
}

impl Texel for Vec4 {
    #[inline]
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        a + (b - a) * t
    }
}

impl Texel for Rgba8 {
    #[inline]
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        let channel = |x: u8, y: u8| lerp(x as f32, y as f32, t).round().clamp(0.0, 255.0) as u8;
        Rgba8::new(
            channel(a.r, b.r),
            channel(a.g, b.g),
            channel(a.b, b.b),
            channel(a.a, b.a),
        )
    }
}

/// A row-major `width x height` buffer of `T`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderTarget<T> {
    width: u32,
    height: u32,
    data: Vec<T>,
}

impl<T: Copy + Default> RenderTarget<T> {
    /// Creates a target filled with `T::default()`.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width as usize * height as usize],
        }
    }

    /// Creates a target from existing row-major data.
    pub fn from_data(width: u32, height: u32, data: Vec<T>) -> Result<Self, TargetError> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(TargetError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Width in texels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in texels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns `true` if the target holds no texels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Reallocates the storage. Every texel is reset to `T::default()`.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.data.clear();
        self.data
            .resize(width as usize * height as usize, T::default());
    }

    /// Fills every texel with `value`.
    pub fn clear(&mut self, value: T) {
        self.data.fill(value);
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(
            x < self.width && y < self.height,
            "texel ({x}, {y}) outside {}x{} target",
            self.width,
            self.height
        );
        y as usize * self.width as usize + x as usize
    }

    /// Reads the texel at `(x, y)`.
    ///
    /// # Panics
    /// Panics if the coordinate is out of range.
    #[inline]
    pub fn load(&self, x: u32, y: u32) -> T {
        self.data[self.index(x, y)]
    }

    /// Writes the texel at `(x, y)`.
    ///
    /// # Panics
    /// Panics if the coordinate is out of range.
    #[inline]
    pub fn store(&mut self, x: u32, y: u32, value: T) {
        let index = self.index(x, y);
        self.data[index] = value;
    }

    /// Reads the texel at `(x, y)`, or `None` if it is out of range.
    #[inline]
    pub fn try_load(&self, x: u32, y: u32) -> Option<T> {
        (x < self.width && y < self.height).then(|| self.load(x, y))
    }

    /// Writes the texel at `(x, y)`, failing if it is out of range.
    pub fn try_store(&mut self, x: u32, y: u32, value: T) -> Result<(), TargetError> {
        if x >= self.width || y >= self.height {
            return Err(TargetError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        self.store(x, y, value);
        Ok(())
    }

    /// The raw row-major storage.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Splits the storage into disjoint bands of `band_rows` rows each.
    ///
    /// The last band may be shorter. Each band can be written from a
    /// different thread.
    pub fn rows_mut(&mut self, band_rows: u32) -> impl Iterator<Item = RowBand<'_, T>> {
        let band_rows = band_rows.max(1);
        let width = self.width;
        let chunk = (width as usize * band_rows as usize).max(1);
        self.data
            .chunks_mut(chunk)
            .enumerate()
            .map(move |(i, data)| RowBand {
                y_start: i as u32 * band_rows,
                rows: (data.len() / width.max(1) as usize) as u32,
                width,
                data,
            })
    }
}

impl<T: bytemuck::Pod + Default> RenderTarget<T> {
    /// The raw storage as bytes, for blitting or encoding.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }
}

impl<T: Texel> RenderTarget<T> {
    /// Samples the target at normalized coordinates `uv`.
    ///
    /// Texel centers sit at `(i + 0.5) / size`. Sampling an empty target
    /// returns `T::default()`.
    pub fn sample(&self, sampler: &SamplerState, uv: Vec2) -> T {
        if self.is_empty() {
            return T::default();
        }
        let (w, h) = (self.width as i64, self.height as i64);
        match sampler.filter {
            FilterMode::Nearest => {
                let x = texel_coord(uv.x * w as f32).floor() as i64;
                let y = texel_coord(uv.y * h as f32).floor() as i64;
                self.load_addressed(sampler.address, x, y)
            }
            FilterMode::Linear => {
                let fx = texel_coord(uv.x * w as f32 - 0.5);
                let fy = texel_coord(uv.y * h as f32 - 0.5);
                let x0 = fx.floor();
                let y0 = fy.floor();
                let (tx, ty) = (fx - x0, fy - y0);
                let (x0, y0) = (x0 as i64, y0 as i64);

                let t00 = self.load_addressed(sampler.address, x0, y0);
                let t10 = self.load_addressed(sampler.address, x0 + 1, y0);
                let t01 = self.load_addressed(sampler.address, x0, y0 + 1);
                let t11 = self.load_addressed(sampler.address, x0 + 1, y0 + 1);

                let top = T::lerp(t00, t10, tx);
                let bottom = T::lerp(t01, t11, tx);
                T::lerp(top, bottom, ty)
            }
        }
    }

    #[inline]
    fn load_addressed(&self, mode: AddressMode, x: i64, y: i64) -> T {
        let x = mode.resolve(x, self.width as i64);
        let y = mode.resolve(y, self.height as i64);
        self.load(x as u32, y as u32)
    }
}

/// Texel coordinates are clamped to this magnitude before the integer cast, so
/// `x + 1` stays inside `i64`. `f32` has no sub-texel precision this far out.
const MAX_TEXEL_COORD: f32 = 1.0e12;

#[inline]
fn texel_coord(coord: f32) -> f32 {
    coord.clamp(-MAX_TEXEL_COORD, MAX_TEXEL_COORD)
}

/// A horizontal band of a [`RenderTarget`], addressed in target coordinates.
#[derive(Debug)]
pub struct RowBand<'a, T> {
    y_start: u32,
    rows: u32,
    width: u32,
    data: &'a mut [T],
}

impl<T: Copy> RowBand<'_, T> {
    /// First row covered by the band.
    #[inline]
    pub fn y_start(&self) -> u32 {
        self.y_start
    }

    /// One past the last row covered by the band.
    #[inline]
    pub fn y_end(&self) -> u32 {
        self.y_start + self.rows
    }

    /// Width of the band in texels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y >= self.y_start && y < self.y_end());
        (y - self.y_start) as usize * self.width as usize + x as usize
    }

    /// Reads the texel at target coordinate `(x, y)`.
    #[inline]
    pub fn load(&self, x: u32, y: u32) -> T {
        self.data[self.index(x, y)]
    }

    /// Writes the texel at target coordinate `(x, y)`.
    #[inline]
    pub fn store(&mut self, x: u32, y: u32, value: T) {
        let index = self.index(x, y);
        self.data[index] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn gradient() -> RenderTarget<f32> {
        // 4x1: 0, 1, 2, 3
        RenderTarget::from_data(4, 1, vec![0.0, 1.0, 2.0, 3.0]).unwrap()
    }

    #[test]
    fn test_store_then_load() {
        let mut target = RenderTarget::<Rgba8>::new(8, 4);
        target.store(7, 3, Rgba8::WHITE);
        assert_eq!(target.load(7, 3), Rgba8::WHITE);
        assert_eq!(target.load(0, 0), Rgba8::default());
        assert_eq!(target.try_load(8, 0), None);
        assert!(matches!(
            target.try_store(0, 4, Rgba8::WHITE),
            Err(TargetError::OutOfBounds { x: 0, y: 4, .. })
        ));
    }

    #[test]
    #[should_panic]
    fn test_load_out_of_bounds_panics() {
        let target = RenderTarget::<f32>::new(2, 2);
        target.load(0, 2);
    }

    #[test]
    fn test_resize_and_clear() {
        let mut target = RenderTarget::<f32>::new(2, 2);
        target.clear(1.0);
        assert!(target.as_slice().iter().all(|&d| d == 1.0));
        target.resize(3, 5);
        assert_eq!(target.size(), (3, 5));
        assert_eq!(target.as_slice().len(), 15);
        assert!(target.as_slice().iter().all(|&d| d == 0.0));
    }

    #[test]
    fn test_from_data_size_mismatch() {
        let err = RenderTarget::from_data(2, 2, vec![0.0f32; 3]).unwrap_err();
        assert_eq!(err, TargetError::SizeMismatch { expected: 4, actual: 3 });
    }

    #[test]
    fn test_as_bytes() {
        let mut target = RenderTarget::<Rgba8>::new(1, 1);
        target.store(0, 0, Rgba8::new(1, 2, 3, 4));
        assert_eq!(target.as_bytes(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_rows_mut_bands_are_disjoint() {
        let mut target = RenderTarget::<u8>::new(3, 5);
        let bands: Vec<_> = target.rows_mut(2).collect();
        let ranges: Vec<_> = bands.iter().map(|b| (b.y_start(), b.y_end())).collect();
        assert_eq!(ranges, vec![(0, 2), (2, 4), (4, 5)]);

        for mut band in target.rows_mut(2) {
            let y = band.y_start();
            band.store(1, y, y as u8 + 10);
        }
        assert_eq!(target.load(1, 0), 10);
        assert_eq!(target.load(1, 2), 12);
        assert_eq!(target.load(1, 4), 14);
    }

    #[test]
    fn test_nearest_sampling() {
        let t = gradient();
        assert_eq!(t.sample(&SamplerState::NEAREST_CLAMP, Vec2::new(0.0, 0.5)), 0.0);
        assert_eq!(t.sample(&SamplerState::NEAREST_CLAMP, Vec2::new(0.6, 0.5)), 2.0);
        assert_eq!(t.sample(&SamplerState::NEAREST_CLAMP, Vec2::new(1.0, 0.5)), 3.0);
        assert_eq!(t.sample(&SamplerState::NEAREST_WRAP, Vec2::new(1.0, 0.5)), 0.0);
    }

    #[test]
    fn test_linear_sampling_blends_neighbours() {
        let t = gradient();
        // Halfway between the centers of texels 1 and 2.
        assert_relative_eq!(t.sample(&SamplerState::LINEAR_CLAMP, Vec2::new(0.5, 0.5)), 1.5);
        // Exactly on a texel center.
        assert_relative_eq!(t.sample(&SamplerState::LINEAR_CLAMP, Vec2::new(0.375, 0.5)), 1.0);
    }

    #[test]
    fn test_clamp_below_zero_matches_zero() {
        let t = gradient();
        for sampler in [SamplerState::LINEAR_CLAMP, SamplerState::NEAREST_CLAMP] {
            let at_zero = t.sample(&sampler, Vec2::new(0.0, 0.0));
            let below = t.sample(&sampler, Vec2::new(-0.01, -0.01));
            assert_eq!(at_zero, below);
        }
    }

    #[test]
    fn test_sampling_far_outside_stays_in_range() {
        // --- 1. ARRANGE ---
        let t = gradient();
        let coords = [1.0e30, -1.0e30, f32::INFINITY, f32::NEG_INFINITY];

        for filter in [FilterMode::Nearest, FilterMode::Linear] {
            for address in [AddressMode::Wrap, AddressMode::Mirror, AddressMode::Clamp] {
                let sampler = SamplerState { filter, address };
                for u in coords {
                    // --- 2. ACT ---
                    let value = t.sample(&sampler, Vec2::new(u, 0.5));
                    let swapped = t.sample(&sampler, Vec2::new(0.5, u));

                    // --- 3. ASSERT ---
                    assert!((0.0..=3.0).contains(&value), "{sampler:?} at u = {u}: {value}");
                    assert!((0.0..=3.0).contains(&swapped), "{sampler:?} at v = {u}: {swapped}");
                }
            }
        }
        assert_eq!(t.sample(&SamplerState::LINEAR_CLAMP, Vec2::new(f32::INFINITY, 0.5)), 3.0);
        assert_eq!(t.sample(&SamplerState::NEAREST_CLAMP, Vec2::new(-1.0e30, 0.5)), 0.0);
    }

    #[test]
    fn test_mirror_sampling() {
        let t = gradient();
        let sampler = SamplerState {
            filter: FilterMode::Nearest,
            address: AddressMode::Mirror,
        };
        // Texel index 4 mirrors to 3, index -1 mirrors to 0.
        assert_eq!(t.sample(&sampler, Vec2::new(1.1, 0.5)), 3.0);
        assert_eq!(t.sample(&sampler, Vec2::new(-0.1, 0.5)), 0.0);
        assert_eq!(t.sample(&sampler, Vec2::new(1.6, 0.5)), 1.0);
    }

    #[test]
    fn test_empty_target_samples_default() {
        let t = RenderTarget::<Vec4>::default();
        assert_eq!(t.sample(&SamplerState::LINEAR_WRAP, Vec2::ZERO), Vec4::ZERO);
    }
}
