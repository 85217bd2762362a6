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

use crate::renderer::api::*;
use crate::renderer::error::ResourceError;
use std::fmt::Debug;

/// The thin layer of GPU calls the renderer is built on.
///
/// A context is created once by the host, handed to the
/// [`Renderer`](crate::renderer::Renderer) and passed explicitly to every
/// resource that issues GPU calls. Implementations wrap a single current OpenGL
/// (or OpenGL ES) context; all methods must be called from the thread that owns it.
///
/// Methods that allocate an object return a [`ResourceError`] when the driver
/// refuses. Everything else mirrors the underlying call and reports failures only
/// through [`GraphicsContext::error`].
pub trait GraphicsContext: Debug {
    // --- Context ---

    /// The shading language version string, e.g. `"OpenGL ES GLSL ES 3.00"`.
    fn shading_language_version(&self) -> String;

    /// The API flavour and version of the context.
    fn version(&self) -> ContextVersion;

    /// Returns and clears the oldest pending error code, `0` when there is none.
    fn error(&self) -> u32;

    /// Enables or disables a fixed-function capability.
    fn set_capability(&self, capability: Capability, enabled: bool);

    /// Sets the blend equation to standard premultiplied-free alpha blending.
    fn blend_alpha(&self);

    /// Sets the colour used by [`GraphicsContext::clear`].
    fn clear_color(&self, rgba: [f32; 4]);

    /// Clears the colour and depth buffers.
    fn clear(&self);

    /// Sets the viewport rectangle in pixels.
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);

    // --- Programs and shaders ---

    /// Allocates an empty program object.
    fn create_program(&self) -> Result<ProgramId, ResourceError>;

    /// Deletes a program object.
    fn delete_program(&self, program: ProgramId);

    /// Allocates a shader object for `stage`.
    fn create_shader(&self, stage: ShaderStage) -> Result<ShaderId, ResourceError>;

    /// Replaces the source of a shader with the concatenation of `sources`.
    fn shader_source(&self, shader: ShaderId, sources: &[String]);

    /// Compiles the shader's current source.
    fn compile_shader(&self, shader: ShaderId);

    /// Returns `true` if the last compile succeeded.
    fn shader_compile_status(&self, shader: ShaderId) -> bool;

    /// The length of the shader info log, `0` when there is none.
    fn shader_info_log_length(&self, shader: ShaderId) -> i32;

    /// Reads at most `max_len` bytes of the shader info log.
    fn shader_info_log(&self, shader: ShaderId, max_len: usize) -> String;

    /// Attaches a compiled shader to a program.
    fn attach_shader(&self, program: ProgramId, shader: ShaderId);

    /// Detaches a shader from a program.
    fn detach_shader(&self, program: ProgramId, shader: ShaderId);

    /// Deletes a shader object.
    fn delete_shader(&self, shader: ShaderId);

    /// Links the program's attached shaders.
    fn link_program(&self, program: ProgramId);

    /// Returns `true` if the last link succeeded.
    fn program_link_status(&self, program: ProgramId) -> bool;

    /// The length of the program info log, `0` when there is none.
    fn program_info_log_length(&self, program: ProgramId) -> i32;

    /// Reads at most `max_len` bytes of the program info log.
    fn program_info_log(&self, program: ProgramId, max_len: usize) -> String;

    /// Makes `program` current, or unbinds with `None`.
    fn use_program(&self, program: Option<ProgramId>);

    // --- Introspection ---

    /// Queries an integer program property.
    fn program_parameter(&self, program: ProgramId, parameter: ProgramParameter) -> i32;

    /// Describes the active uniform at `index`, reading at most `max_len` name bytes.
    fn active_uniform(
        &self,
        program: ProgramId,
        index: u32,
        max_len: usize,
    ) -> Option<ActiveVariable>;

    /// Describes the active attribute at `index`, reading at most `max_len` name bytes.
    fn active_attribute(
        &self,
        program: ProgramId,
        index: u32,
        max_len: usize,
    ) -> Option<ActiveVariable>;

    /// Looks up a uniform by name, [`UniformLocation::ABSENT`] when it is not active.
    fn uniform_location(&self, program: ProgramId, name: &str) -> UniformLocation;

    /// Looks up the layout location of an attribute by name.
    fn attribute_location(&self, program: ProgramId, name: &str) -> Option<u32>;

    // --- Vertex arrays and buffers ---

    /// Allocates a vertex array object.
    fn create_vertex_array(&self) -> Result<VertexArrayId, ResourceError>;

    /// Binds a vertex array, or unbinds with `None`.
    fn bind_vertex_array(&self, vao: Option<VertexArrayId>);

    /// Deletes a vertex array object.
    fn delete_vertex_array(&self, vao: VertexArrayId);

    /// Allocates a buffer object.
    fn create_buffer(&self) -> Result<BufferId, ResourceError>;

    /// Binds a buffer to `target`, or unbinds with `None`.
    fn bind_buffer(&self, target: BufferTarget, buffer: Option<BufferId>);

    /// Allocates storage for the bound buffer and fills it with `data`.
    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage);

    /// Allocates `size` bytes of uninitialised storage, orphaning any previous storage.
    fn buffer_storage(&self, target: BufferTarget, size: usize, usage: BufferUsage);

    /// Overwrites part of the bound buffer starting at `offset` bytes.
    fn buffer_sub_data(&self, target: BufferTarget, offset: usize, data: &[u8]);

    /// Describes how the bound array buffer feeds attribute `slot`.
    fn vertex_attrib_pointer(&self, slot: u32, span: i32, kind: DataKind, normalize: bool);

    /// Enables attribute `slot` for the bound vertex array.
    fn enable_vertex_attrib_array(&self, slot: u32);

    /// Deletes a buffer object.
    fn delete_buffer(&self, buffer: BufferId);

    // --- Textures ---

    /// Allocates a texture object.
    fn create_texture(&self) -> Result<TextureId, ResourceError>;

    /// Binds a 2D texture to the active unit, or unbinds with `None`.
    fn bind_texture(&self, texture: Option<TextureId>);

    /// Selects the texture unit subsequent texture calls apply to.
    fn active_texture(&self, unit: u32);

    /// Uploads tightly packed RGBA8 pixels to level 0 of the bound texture.
    fn upload_rgba8(&self, width: u32, height: u32, pixels: &[u8]);

    /// Builds the mipmap chain of the bound texture.
    fn generate_mipmap(&self);

    /// Sets wrap mode (repeat or clamp to edge), filters and maximum mip level.
    fn set_texture_params(&self, repeat: bool, max_level: i32);

    /// Deletes a texture object.
    fn delete_texture(&self, texture: TextureId);

    // --- Uniforms and drawing ---

    /// Writes a uniform of the current program. A no-op for absent locations.
    fn set_uniform(&self, location: UniformLocation, value: UniformValue<'_>);

    /// Draws `count` 16-bit indices starting `byte_offset` bytes into the element buffer.
    fn draw_elements(&self, mode: DrawMode, count: i32, byte_offset: i32);

    /// Draws `count` vertices starting at `first` without indices.
    fn draw_arrays(&self, mode: DrawMode, first: i32, count: i32);

    /// Switches polygon rasterisation between filled and outlined.
    fn polygon_lines(&self, enabled: bool);
}
