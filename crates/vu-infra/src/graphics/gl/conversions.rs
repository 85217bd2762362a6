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

use glow::{NativeBuffer, NativeProgram, NativeShader, NativeTexture, NativeVertexArray};
use vu_core::renderer::api::{
    BufferId, BufferTarget, BufferUsage, Capability, DataKind, DrawMode, ProgramId, ShaderId,
    ShaderStage, TextureId, VertexArrayId,
};

/// Converts engine enums and handles into their OpenGL counterparts.
/// This avoids the orphan rules while keeping an idiomatic `.into_gl()` syntax.
pub trait IntoGl<T> {
    /// Consumes self and converts it into an OpenGL value.
    fn into_gl(self) -> T;
}

// --- Enums ---

impl IntoGl<u32> for ShaderStage {
    fn into_gl(self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl IntoGl<u32> for BufferTarget {
    fn into_gl(self) -> u32 {
        match self {
            BufferTarget::Array => glow::ARRAY_BUFFER,
            BufferTarget::ElementArray => glow::ELEMENT_ARRAY_BUFFER,
        }
    }
}

impl IntoGl<u32> for BufferUsage {
    fn into_gl(self) -> u32 {
        match self {
            BufferUsage::Static => glow::STATIC_DRAW,
            BufferUsage::Dynamic => glow::DYNAMIC_DRAW,
        }
    }
}

impl IntoGl<u32> for DataKind {
    fn into_gl(self) -> u32 {
        match self {
            DataKind::Float => glow::FLOAT,
            DataKind::UnsignedByte => glow::UNSIGNED_BYTE,
        }
    }
}

impl IntoGl<u32> for DrawMode {
    fn into_gl(self) -> u32 {
        match self {
            DrawMode::Triangles => glow::TRIANGLES,
            DrawMode::Points => glow::POINTS,
            DrawMode::Lines => glow::LINES,
        }
    }
}

impl IntoGl<u32> for Capability {
    fn into_gl(self) -> u32 {
        match self {
            Capability::DepthTest => glow::DEPTH_TEST,
            Capability::CullFace => glow::CULL_FACE,
            Capability::Blend => glow::BLEND,
            Capability::ProgramPointSize => glow::PROGRAM_POINT_SIZE,
        }
    }
}

// --- Object handles ---

impl IntoGl<NativeProgram> for ProgramId {
    fn into_gl(self) -> NativeProgram {
        NativeProgram(self.0)
    }
}

impl IntoGl<NativeShader> for ShaderId {
    fn into_gl(self) -> NativeShader {
        NativeShader(self.0)
    }
}

impl IntoGl<NativeBuffer> for BufferId {
    fn into_gl(self) -> NativeBuffer {
        NativeBuffer(self.0)
    }
}

impl IntoGl<NativeVertexArray> for VertexArrayId {
    fn into_gl(self) -> NativeVertexArray {
        NativeVertexArray(self.0)
    }
}

impl IntoGl<NativeTexture> for TextureId {
    fn into_gl(self) -> NativeTexture {
        NativeTexture(self.0)
    }
}

impl<T, U: IntoGl<T>> IntoGl<Option<T>> for Option<U> {
    fn into_gl(self) -> Option<T> {
        self.map(IntoGl::into_gl)
    }
}

/// The wrap mode for repeating or clamped textures.
pub fn wrap_mode(repeat: bool) -> i32 {
    if repeat {
        glow::REPEAT as i32
    } else {
        glow::CLAMP_TO_EDGE as i32
    }
}
