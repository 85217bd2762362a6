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

//! Plain enums and value types exchanged with a [`GraphicsContext`](crate::renderer::GraphicsContext).

use std::fmt;

/// One of the two programmable stages a [`ShaderProgram`](crate::renderer::ShaderProgram) links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// The per-vertex stage.
    Vertex,
    /// The per-fragment stage.
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

/// The API flavour and version a context was created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextVersion {
    /// Major version number.
    pub major: u32,
    /// Minor version number.
    pub minor: u32,
    /// `true` for OpenGL ES, `false` for desktop OpenGL.
    pub is_embedded: bool,
}

impl ContextVersion {
    /// Returns `true` for desktop OpenGL 3.3+ or OpenGL ES 3.0+, the contexts whose
    /// GLSL accepts the shader preambles.
    pub fn is_supported(&self) -> bool {
        let minimum = if self.is_embedded { (3, 0) } else { (3, 3) };
        (self.major, self.minor) >= minimum
    }
}

impl fmt::Display for ContextVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let api = if self.is_embedded { "OpenGL ES" } else { "OpenGL" };
        write!(f, "{api} {}.{}", self.major, self.minor)
    }
}

/// Integer program properties queried during introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgramParameter {
    /// Number of active uniforms.
    ActiveUniforms,
    /// Length of the longest active uniform name, including the terminator.
    ActiveUniformMaxLength,
    /// Number of active vertex attributes.
    ActiveAttributes,
    /// Length of the longest active attribute name, including the terminator.
    ActiveAttributeMaxLength,
}

/// The binding point a buffer is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Per-vertex attribute data.
    Array,
    /// 16-bit triangle indices.
    ElementArray,
}

/// How often buffer contents are expected to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferUsage {
    /// Uploaded once and drawn many times.
    #[default]
    Static,
    /// Rewritten frequently; uploads orphan the previous storage first.
    Dynamic,
}

/// The element type stored in a vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    /// 32-bit floats, never normalised.
    Float,
    /// Unsigned bytes, optionally normalised to `0.0..=1.0`.
    UnsignedByte,
}

/// The primitive type used when drawing a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DrawMode {
    /// Indexed triangles.
    #[default]
    Triangles,
    /// One point per vertex.
    Points,
    /// Triangle edges drawn as lines.
    Lines,
}

/// Fixed-function state toggled through [`GraphicsContext::set_capability`](crate::renderer::GraphicsContext::set_capability).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Depth testing.
    DepthTest,
    /// Back-face culling.
    CullFace,
    /// Colour blending.
    Blend,
    /// Shader-controlled point size.
    ProgramPointSize,
}

/// A value written to a uniform location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue<'a> {
    /// A single `int`, also used for sampler units.
    Int(i32),
    /// A single `float`.
    Float(f32),
    /// A `vec2`.
    Vec2([f32; 2]),
    /// A `vec3`.
    Vec3([f32; 3]),
    /// A `vec4`.
    Vec4([f32; 4]),
    /// One column-major `mat3` (9 floats).
    Mat3(&'a [f32]),
    /// An array of `count` row-major 3x4 joint matrices (12 floats each).
    Mat3x4 {
        /// The number of matrices.
        count: usize,
        /// `count * 12` floats.
        data: &'a [f32],
    },
    /// One column-major `mat4` (16 floats).
    Mat4(&'a [f32]),
}

/// An active uniform or attribute reported by program introspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveVariable {
    /// The name as reported by the driver, possibly with an array subscript.
    pub name: String,
    /// The array size, `1` for non-arrays.
    pub size: i32,
    /// The backend's type enum.
    pub kind: u32,
}
