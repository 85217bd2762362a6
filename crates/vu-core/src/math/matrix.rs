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

//! Defines the `Mat3`, `Mat4` and `Pose` types and associated operations.

use super::{Vec3, Vec4};
use std::ops::Mul;

// --- Mat3 ---

/// A 3x3 column-major matrix.
///
/// The renderer only builds these from the upper-left corner of a [`Mat4`] to
/// feed the `nm` (normal matrix) uniform.
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

    /// Creates a `Mat3` from the upper-left 3x3 corner of a [`Mat4`].
    /// This keeps the rotation and scale components and discards translation.
    #[inline]
    pub fn from_mat4(m4: &Mat4) -> Self {
        Self {
            cols: [
                m4.cols[0].truncate(),
                m4.cols[1].truncate(),
                m4.cols[2].truncate(),
            ],
        }
    }

    /// The 9 matrix elements in column-major order.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        bytemuck::cast_slice(&self.cols)
    }
}

impl Default for Mat3 {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

// --- Mat4 ---

/// A 4x4 column-major matrix.
///
/// Used for the model-view (`mvm`) and model-view-projection (`mvpm`) uniforms and
/// for joint keyframes. The memory layout matches what `glUniformMatrix4fv` expects
/// with `transpose = false`.
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
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

    /// A 4x4 matrix with all elements set to 0.
    pub const ZERO: Self = Self {
        cols: [Vec4::ZERO; 4],
    };

    /// Creates a new matrix from four column vectors.
    #[inline]
    pub fn from_cols(c0: Vec4, c1: Vec4, c2: Vec4, c3: Vec4) -> Self {
        Self {
            cols: [c0, c1, c2, c3],
        }
    }

    /// Returns a row of the matrix as a `Vec4`.
    #[inline]
    pub fn get_row(&self, index: usize) -> Vec4 {
        Vec4 {
            x: self.cols[0].get(index),
            y: self.cols[1].get(index),
            z: self.cols[2].get(index),
            w: self.cols[3].get(index),
        }
    }

    /// Creates a translation matrix.
    #[inline]
    pub fn from_translation(v: Vec3) -> Self {
        Self {
            cols: [Vec4::X, Vec4::Y, Vec4::Z, Vec4::new(v.x, v.y, v.z, 1.0)],
        }
    }

    /// Creates a non-uniform scaling matrix.
    #[inline]
    pub fn from_scale(scale: Vec3) -> Self {
        Self {
            cols: [
                Vec4::new(scale.x, 0.0, 0.0, 0.0),
                Vec4::new(0.0, scale.y, 0.0, 0.0),
                Vec4::new(0.0, 0.0, scale.z, 0.0),
                Vec4::W,
            ],
        }
    }

    /// Blends two matrices element by element: `start * (1 - t) + end * t`.
    ///
    /// This is what keyframe interpolation uses between two neighbouring frames.
    /// With `t == 0.0` the result is exactly `start`.
    #[inline]
    pub fn lerp(start: &Self, end: &Self, t: f32) -> Self {
        let s = 1.0 - t;
        let mut cols = [Vec4::ZERO; 4];
        for (i, col) in cols.iter_mut().enumerate() {
            *col = start.cols[i] * s + end.cols[i] * t;
        }
        Self { cols }
    }

    /// The 16 matrix elements in column-major order.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        bytemuck::cast_slice(&self.cols)
    }
}

impl Default for Mat4 {
    /// Returns the 4x4 identity matrix.
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<Mat4> for Mat4 {
    type Output = Self;
    /// Multiplies this matrix by another `Mat4`. Note that matrix multiplication is not commutative.
    #[inline]
    fn mul(self, rhs: Mat4) -> Self::Output {
        let mut result_cols = [Vec4::ZERO; 4];
        for (c_idx, target_col) in result_cols.iter_mut().enumerate() {
            let col_from_rhs = rhs.cols[c_idx];
            *target_col = Vec4 {
                x: self.get_row(0).dot(col_from_rhs),
                y: self.get_row(1).dot(col_from_rhs),
                z: self.get_row(2).dot(col_from_rhs),
                w: self.get_row(3).dot(col_from_rhs),
            };
        }
        Mat4 { cols: result_cols }
    }
}

// --- Pose ---

/// A joint transform packed as the first three rows of an affine [`Mat4`].
///
/// The implicit fourth row is `0, 0, 0, 1`. Sending 12 floats instead of 16 per
/// joint keeps the `bpos` uniform array small; shaders read each entry as a
/// `mat3x4` and multiply from the left accordingly.
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Pose(pub [f32; 12]);

impl Pose {
    /// The identity joint transform.
    pub const IDENTITY: Self = Self([
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0,
    ]);

    /// Packs the first three rows of `m`.
    pub fn from_mat4(m: &Mat4) -> Self {
        let mut out = [0.0; 12];
        for row in 0..3 {
            let r = m.get_row(row);
            out[row * 4..row * 4 + 4].copy_from_slice(&[r.x, r.y, r.z, r.w]);
        }
        Self(out)
    }

    /// Expands back to a full matrix with the implicit `0, 0, 0, 1` last row.
    pub fn to_mat4(&self) -> Mat4 {
        let p = &self.0;
        let mut cols = [Vec4::ZERO; 4];
        for (c, col) in cols.iter_mut().enumerate() {
            *col = Vec4::new(p[c], p[4 + c], p[8 + c], if c == 3 { 1.0 } else { 0.0 });
        }
        Mat4 { cols }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// --- Tests ---
