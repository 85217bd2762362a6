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

//! GPU-backed resources shared between models.
//!
//! Each resource keeps its CPU data, an optional GPU handle (`None` while
//! unbound) and a count of the models using it. The
//! [`Renderer`](crate::renderer::Renderer) owns every resource; models only hold
//! handles.

pub mod animation;
pub mod buffer;
pub mod mesh;
pub mod shader;
pub mod texture;

pub use self::animation::{Animation, Movement};
pub use self::buffer::{IndexBuffer, VertexBuffer, VertexData};
pub use self::mesh::Mesh;
pub use self::shader::{ShaderProgram, GLSL_ES_300};
pub use self::texture::Texture;

/// The number of models sharing a resource.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RefCount(u32);

impl RefCount {
    pub(crate) fn get(self) -> u32 {
        self.0
    }

    pub(crate) fn acquire(&mut self) {
        self.0 += 1;
    }

    /// Drops one reference and returns `true` when none are left.
    ///
    /// # Panics
    ///
    /// Panics if the count is already zero.
    pub(crate) fn release(&mut self, resource: &str) -> bool {
        assert!(
            self.0 > 0,
            "reference count underflow releasing {resource}"
        );
        self.0 -= 1;
        self.0 == 0
    }
}
