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

//! Opaque identifiers for GPU objects and for renderer-owned resources.
//!
//! GPU ids are handed out by a [`GraphicsContext`](crate::renderer::GraphicsContext)
//! and are never zero, so `Option<Id>` is the unbound state. Resource handles index
//! the tables owned by the [`Renderer`](crate::renderer::Renderer).

use std::num::NonZeroU32;

/// An opaque handle to a linked GPU program object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(pub NonZeroU32);

/// An opaque handle to a single compiled shader stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderId(pub NonZeroU32);

/// An opaque handle to a GPU buffer object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub NonZeroU32);

/// An opaque handle to a vertex array object recording a mesh's attribute layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexArrayId(pub NonZeroU32);

/// An opaque handle to a GPU texture object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub NonZeroU32);

/// The location of a uniform within a linked program.
///
/// Drivers report `-1` for names that are not active; [`UniformLocation::ABSENT`]
/// mirrors that, and setting a value at it is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub i32);

impl UniformLocation {
    /// The location of a uniform that does not exist in the program.
    pub const ABSENT: Self = Self(-1);

    /// Returns `true` if the location refers to an active uniform.
    #[inline]
    pub fn is_present(self) -> bool {
        self.0 >= 0
    }
}

impl Default for UniformLocation {
    fn default() -> Self {
        Self::ABSENT
    }
}

/// Handle to a [`Mesh`](crate::renderer::Mesh) stored in the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshHandle(pub usize);

/// Handle to a [`ShaderProgram`](crate::renderer::ShaderProgram) stored in the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderHandle(pub usize);

/// Handle to a [`Texture`](crate::renderer::Texture) stored in the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub usize);

/// Handle to an [`Animation`](crate::renderer::Animation) stored in the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationHandle(pub usize);
