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

//! Defines the `Mat3` and `Mat4` types and associated operations.

use super::{Vec3, Vec4, EPSILON};
use std::ops::Mul;

// --- Mat3 ---

/// A 3x3 column-major matrix.
///
/// In the pipeline its main use is the normal matrix, the inverse-transpose of
/// the upper-left corner of a model matrix.
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Mat3 {
    /// The columns of the matrix. `cols[0]` is the first column, and so on.
    pub cols: [Vec3; 3],
}

impl Mat3 {
    /// The 3x3 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [Vec3::X, Vec3::Y, Vec3::Z],
    };

    /// Creates a new matrix from three column vectors.
    #[inline]
    pub const fn from_cols(c0: Vec3, c1: Vec3, c2: Vec3) -> Self {
        Self { cols: [c0, c1, c2] }
    }

    /// Creates a `Mat3` from the upper-left 3x3 corner of a [`Mat4`], discarding translation.
    #[inline]
    pub fn from_mat4(m4: &Mat4) -> Self {
        Self::from_cols(
            m4.cols[0].truncate(),
            m4.cols[1].truncate(),
            m4.cols[2].truncate(),
        )
    }

    /// Builds the matrix that transforms normals for the given model matrix.
    ///
    /// Falls back to the plain upper-left corner when the model matrix is singular.
    pub fn normal_matrix(model: &Mat4) -> Self {
        let upper = Self::from_mat4(model);
        upper
            .inverse()
            .map(|inv| inv.transpose())
            .unwrap_or(upper)
    }

    /// Returns the transpose of the matrix, where rows and columns are swapped.
    #[inline]
    pub fn transpose(&self) -> Self {
        let [c0, c1, c2] = self.cols;
        Self::from_cols(
            Vec3::new(c0.x, c1.x, c2.x),
            Vec3::new(c0.y, c1.y, c2.y),
            Vec3::new(c0.z, c1.z, c2.z),
        )
    }

    /// Computes the determinant of the matrix.
    #[inline]
    pub fn determinant(&self) -> f32 {
        let [c0, c1, c2] = self.cols;
        c0.dot(c1.cross(c2))
    }

    /// Computes the inverse of the matrix.
    ///
    /// Returns `None` if the determinant is close to zero.
    pub fn inverse(&self) -> Option<Self> {
        let [c0, c1, c2] = self.cols;
        // Rows of the inverse are the cross products of column pairs.
        let r0 = c1.cross(c2);
        let r1 = c2.cross(c0);
        let r2 = c0.cross(c1);
        let det = c0.dot(r0);
        if det.abs() < EPSILON * EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;
        Some(Self::from_cols(r0 * inv_det, r1 * inv_det, r2 * inv_det).transpose())
    }
}

impl Default for Mat3 {
    /// Returns the 3x3 identity matrix.
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<Vec3> for Mat3 {
    type Output = Vec3;
    #[inline]
    fn mul(self, v: Vec3) -> Self::Output {
        self.cols[0] * v.x + self.cols[1] * v.y + self.cols[2] * v.z
    }
}

impl Mul<Mat3> for Mat3 {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: Mat3) -> Self::Output {
        Self::from_cols(self * rhs.cols[0], self * rhs.cols[1], self * rhs.cols[2])
    }
}

// --- Mat4 ---

/// A 4x4 column-major matrix, used for model, view and projection transforms.
///
/// Vectors are treated as columns, so `a * b * v` applies `b` first.
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable, serde::Serialize, serde::Deserialize)]
#[repr(C)]
pub struct Mat4 {
    /// The columns of the matrix. `cols[0]` is the first column, and so on.
    pub cols: [Vec4; 4],
}

impl Mat4 {
    /// The 4x4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [Vec4::X, Vec4::Y, Vec4::Z, Vec4::W],
    };

    /// Creates a new matrix from four column vectors.
    #[inline]
    pub const fn from_cols(c0: Vec4, c1: Vec4, c2: Vec4, c3: Vec4) -> Self {
        Self {
            cols: [c0, c1, c2, c3],
        }
    }

    /// Returns a row of the matrix as a `Vec4`.
    #[inline]
    pub fn row(&self, index: usize) -> Vec4 {
        Vec4::new(
            self.cols[0].get(index),
            self.cols[1].get(index),
            self.cols[2].get(index),
            self.cols[3].get(index),
        )
    }

    /// Creates a translation matrix.
    #[inline]
    pub const fn from_translation(v: Vec3) -> Self {
        Self::from_cols(Vec4::X, Vec4::Y, Vec4::Z, Vec4::new(v.x, v.y, v.z, 1.0))
    }

    /// Creates a non-uniform scaling matrix.
    #[inline]
    pub const fn from_scale(scale: Vec3) -> Self {
        Self::from_cols(
            Vec4::new(scale.x, 0.0, 0.0, 0.0),
            Vec4::new(0.0, scale.y, 0.0, 0.0),
            Vec4::new(0.0, 0.0, scale.z, 0.0),
            Vec4::W,
        )
    }

    /// Creates a matrix for a right-handed rotation around the X-axis.
    #[inline]
    pub fn from_rotation_x(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_cols(
            Vec4::X,
            Vec4::new(0.0, c, s, 0.0),
            Vec4::new(0.0, -s, c, 0.0),
            Vec4::W,
        )
    }

    /// Creates a matrix for a right-handed rotation around the Y-axis.
    #[inline]
    pub fn from_rotation_y(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_cols(
            Vec4::new(c, 0.0, -s, 0.0),
            Vec4::Y,
            Vec4::new(s, 0.0, c, 0.0),
            Vec4::W,
        )
    }

    /// Creates a matrix for a right-handed rotation around the Z-axis.
    #[inline]
    pub fn from_rotation_z(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_cols(
            Vec4::new(c, s, 0.0, 0.0),
            Vec4::new(-s, c, 0.0, 0.0),
            Vec4::Z,
            Vec4::W,
        )
    }

    /// Creates a right-handed perspective projection matrix with a [0, 1] depth range (ZO).
    ///
    /// # Arguments
    ///
    /// * `fov_y_radians`: Vertical field of view in radians.
    /// * `aspect_ratio`: Width divided by height of the viewport.
    /// * `z_near`: Distance to the near clipping plane (must be positive).
    /// * `z_far`: Distance to the far clipping plane (must be greater than `z_near`).
    ///
    /// The resulting clip-space `w` equals the view-space distance along `-Z`,
    /// which is what the near/far rejection of the rasterizer compares against.
    #[inline]
    pub fn perspective_rh_zo(
        fov_y_radians: f32,
        aspect_ratio: f32,
        z_near: f32,
        z_far: f32,
    ) -> Self {
        debug_assert!(z_near > 0.0 && z_far > z_near);
        let f = 1.0 / (0.5 * fov_y_radians).tan();
        let range = z_far / (z_near - z_far);

        Self::from_cols(
            Vec4::new(f / aspect_ratio, 0.0, 0.0, 0.0),
            Vec4::new(0.0, f, 0.0, 0.0),
            Vec4::new(0.0, 0.0, range, -1.0),
            Vec4::new(0.0, 0.0, range * z_near, 0.0),
        )
    }

    /// Creates a right-handed orthographic projection matrix with a [0, 1] depth range (ZO).
    #[inline]
    pub fn orthographic_rh_zo(
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        z_near: f32,
        z_far: f32,
    ) -> Self {
        let inv_width = 1.0 / (right - left);
        let inv_height = 1.0 / (top - bottom);
        let inv_depth = 1.0 / (z_far - z_near);

        Self::from_cols(
            Vec4::new(2.0 * inv_width, 0.0, 0.0, 0.0),
            Vec4::new(0.0, 2.0 * inv_height, 0.0, 0.0),
            Vec4::new(0.0, 0.0, -inv_depth, 0.0),
            Vec4::new(
                -(right + left) * inv_width,
                -(top + bottom) * inv_height,
                -z_near * inv_depth,
                1.0,
            ),
        )
    }

    /// Creates a right-handed view matrix for a camera at `eye` looking towards `target`.
    ///
    /// Returns `None` if `eye` and `target` coincide or if `up` is parallel to
    /// the view direction.
    pub fn look_at_rh(eye: Vec3, target: Vec3, up: Vec3) -> Option<Self> {
        let forward = target - eye;
        if forward.length_squared() < EPSILON * EPSILON {
            return None;
        }
        let f = forward.normalize();
        let side = f.cross(up);
        if side.length_squared() < EPSILON * EPSILON {
            return None;
        }
        let s = side.normalize();
        let u = s.cross(f);

        Some(Self::from_cols(
            Vec4::new(s.x, u.x, -f.x, 0.0),
            Vec4::new(s.y, u.y, -f.y, 0.0),
            Vec4::new(s.z, u.z, -f.z, 0.0),
            Vec4::new(-eye.dot(s), -eye.dot(u), eye.dot(f), 1.0),
        ))
    }

    /// Returns the transpose of the matrix, where rows and columns are swapped.
    #[inline]
    pub fn transpose(&self) -> Self {
        Self::from_cols(self.row(0), self.row(1), self.row(2), self.row(3))
    }

    /// Computes the inverse of the matrix.
    ///
    /// Returns `None` if the matrix is singular.
    pub fn inverse(&self) -> Option<Self> {
        // Cofactor expansion over the columns read as rows. Writing the result
        // back column-by-column undoes the implied transpose.
        let [a0, a1, a2, a3] = self.cols;

        let s0 = a0.x * a1.y - a1.x * a0.y;
        let s1 = a0.x * a1.z - a1.x * a0.z;
        let s2 = a0.x * a1.w - a1.x * a0.w;
        let s3 = a0.y * a1.z - a1.y * a0.z;
        let s4 = a0.y * a1.w - a1.y * a0.w;
        let s5 = a0.z * a1.w - a1.z * a0.w;

        let c5 = a2.z * a3.w - a3.z * a2.w;
        let c4 = a2.y * a3.w - a3.y * a2.w;
        let c3 = a2.y * a3.z - a3.y * a2.z;
        let c2 = a2.x * a3.w - a3.x * a2.w;
        let c1 = a2.x * a3.z - a3.x * a2.z;
        let c0 = a2.x * a3.y - a3.x * a2.y;

        let det = s0 * c5 - s1 * c4 + s2 * c3 + s3 * c2 - s4 * c1 + s5 * c0;
        if det.abs() < f32::MIN_POSITIVE || !det.is_finite() {
            return None;
        }
        let inv_det = 1.0 / det;

        let b0 = Vec4::new(
            a1.y * c5 - a1.z * c4 + a1.w * c3,
            -a0.y * c5 + a0.z * c4 - a0.w * c3,
            a3.y * s5 - a3.z * s4 + a3.w * s3,
            -a2.y * s5 + a2.z * s4 - a2.w * s3,
        );
        let b1 = Vec4::new(
            -a1.x * c5 + a1.z * c2 - a1.w * c1,
            a0.x * c5 - a0.z * c2 + a0.w * c1,
            -a3.x * s5 + a3.z * s2 - a3.w * s1,
            a2.x * s5 - a2.z * s2 + a2.w * s1,
        );
        let b2 = Vec4::new(
            a1.x * c4 - a1.y * c2 + a1.w * c0,
            -a0.x * c4 + a0.y * c2 - a0.w * c0,
            a3.x * s4 - a3.y * s2 + a3.w * s0,
            -a2.x * s4 + a2.y * s2 - a2.w * s0,
        );
        let b3 = Vec4::new(
            -a1.x * c3 + a1.y * c1 - a1.z * c0,
            a0.x * c3 - a0.y * c1 + a0.z * c0,
            -a3.x * s3 + a3.y * s1 - a3.z * s0,
            a2.x * s3 - a2.y * s1 + a2.z * s0,
        );

        Some(Self::from_cols(b0, b1, b2, b3).mul_scalar(inv_det))
    }

    /// Transforms a point (`w = 1`) without the perspective divide.
    #[inline]
    pub fn transform_point3(&self, p: Vec3) -> Vec3 {
        (*self * p.extend(1.0)).truncate()
    }

    /// Transforms a direction (`w = 0`), ignoring translation.
    #[inline]
    pub fn transform_vector3(&self, v: Vec3) -> Vec3 {
        (*self * v.extend(0.0)).truncate()
    }

    #[inline]
    fn mul_scalar(self, s: f32) -> Self {
        Self::from_cols(
            self.cols[0] * s,
            self.cols[1] * s,
            self.cols[2] * s,
            self.cols[3] * s,
        )
    }
}

impl Default for Mat4 {
    /// Returns the 4x4 identity matrix.
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;
    #[inline]
    fn mul(self, rhs: Vec4) -> Self::Output {
        self.cols[0] * rhs.x + self.cols[1] * rhs.y + self.cols[2] * rhs.z + self.cols[3] * rhs.w
    }
}

impl Mul<Mat4> for Mat4 {
    type Output = Self;
    /// Multiplies this matrix by another `Mat4`. Matrix multiplication is not commutative.
    #[inline]
    fn mul(self, rhs: Mat4) -> Self::Output {
        Self::from_cols(
            self * rhs.cols[0],
            self * rhs.cols[1],
            self * rhs.cols[2],
            self * rhs.cols[3],
        )
    }
}
