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

//! The small amount of linear algebra the renderer needs to feed shader uniforms.
//!
//! Everything here is `f32` and laid out the way the GPU reads it: matrices are
//! column-major, and [`Pose`] packs a joint transform into the 3x4 layout expected
//! by the `bpos` uniform array.

/// A small constant for floating-point comparisons.
pub const EPSILON: f32 = 1e-5;

pub mod matrix;
pub mod vector;

pub use self::matrix::{Mat3, Mat4, Pose};
pub use self::vector::{Vec3, Vec4};

/// Checks if two floating-point numbers are approximately equal.
#[inline]
pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}
