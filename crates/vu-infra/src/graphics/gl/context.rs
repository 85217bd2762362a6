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

use super::conversions::{wrap_mode, IntoGl};
use glow::HasContext;
use std::fmt;
use vu_core::renderer::api::*;
use vu_core::renderer::error::ResourceError;
use vu_core::renderer::traits::GraphicsContext;

/// A [`GraphicsContext`] over a current `glow` OpenGL or OpenGL ES context.
///
/// The host creates the native context and makes it current; this type only
/// issues calls on it. It must stay on the thread that owns the context.
pub struct GlowGraphicsContext {
    gl: glow::Context,
    version: ContextVersion,
    glsl_version: String,
}

impl GlowGraphicsContext {
    /// Wraps a loaded `glow` context and reads its version strings.
    pub fn new(gl: glow::Context) -> Self {
        let reported = gl.version();
        let version = ContextVersion {
            major: reported.major,
            minor: reported.minor,
            is_embedded: reported.is_embedded,
        };
        // SAFETY: the caller hands over a context that is current on this thread.
        let glsl_version = unsafe { gl.get_parameter_string(glow::SHADING_LANGUAGE_VERSION) };
        log::info!("OpenGL context {version} ({}), GLSL {glsl_version}", reported.vendor_info);
        Self {
            gl,
            version,
            glsl_version,
        }
    }

    /// The wrapped `glow` context, for calls outside the renderer.
    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    fn truncated(mut text: String, max_len: usize) -> String {
        if text.len() > max_len {
            let mut end = max_len;
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            text.truncate(end);
        }
        text
    }

    fn longest_name(names: impl Iterator<Item = String>) -> i32 {
        // Includes the terminator, matching the driver's own count.
        names.map(|name| name.len() + 1).max().unwrap_or(0) as i32
    }
}

impl fmt::Debug for GlowGraphicsContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlowGraphicsContext")
            .field("version", &self.version)
            .field("glsl_version", &self.glsl_version)
            .finish_non_exhaustive()
    }
}

// SAFETY (all blocks below): `glow` calls are unsafe because they require a
// current context on the calling thread, which `new` requires of its caller.
// Object names passed back in were produced by this same context.
impl GraphicsContext for GlowGraphicsContext {
    // --- Context ---

    fn shading_language_version(&self) -> String {
        self.glsl_version.clone()
    }

    fn version(&self) -> ContextVersion {
        self.version
    }

    fn error(&self) -> u32 {
        unsafe { self.gl.get_error() }
    }

    fn set_capability(&self, capability: Capability, enabled: bool) {
        unsafe {
            if enabled {
                self.gl.enable(capability.into_gl());
            } else {
                self.gl.disable(capability.into_gl());
            }
        }
    }

    fn blend_alpha(&self) {
        unsafe { self.gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA) }
    }

    fn clear_color(&self, [r, g, b, a]: [f32; 4]) {
        unsafe { self.gl.clear_color(r, g, b, a) }
    }

    fn clear(&self) {
        unsafe { self.gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT) }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.viewport(x, y, width, height) }
    }

    // --- Programs and shaders ---

    fn create_program(&self) -> Result<ProgramId, ResourceError> {
        unsafe { self.gl.create_program() }
            .map(|program| ProgramId(program.0))
            .map_err(ResourceError::Backend)
    }

    fn delete_program(&self, program: ProgramId) {
        unsafe { self.gl.delete_program(program.into_gl()) }
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<ShaderId, ResourceError> {
        unsafe { self.gl.create_shader(stage.into_gl()) }
            .map(|shader| ShaderId(shader.0))
            .map_err(ResourceError::Backend)
    }

    fn shader_source(&self, shader: ShaderId, sources: &[String]) {
        unsafe { self.gl.shader_source(shader.into_gl(), &sources.concat()) }
    }

    fn compile_shader(&self, shader: ShaderId) {
        unsafe { self.gl.compile_shader(shader.into_gl()) }
    }

    fn shader_compile_status(&self, shader: ShaderId) -> bool {
        unsafe { self.gl.get_shader_compile_status(shader.into_gl()) }
    }

    fn shader_info_log_length(&self, shader: ShaderId) -> i32 {
        unsafe { self.gl.get_shader_info_log(shader.into_gl()) }.len() as i32
    }

    fn shader_info_log(&self, shader: ShaderId, max_len: usize) -> String {
        let log = unsafe { self.gl.get_shader_info_log(shader.into_gl()) };
        Self::truncated(log, max_len)
    }

    fn attach_shader(&self, program: ProgramId, shader: ShaderId) {
        unsafe { self.gl.attach_shader(program.into_gl(), shader.into_gl()) }
    }

    fn detach_shader(&self, program: ProgramId, shader: ShaderId) {
        unsafe { self.gl.detach_shader(program.into_gl(), shader.into_gl()) }
    }

    fn delete_shader(&self, shader: ShaderId) {
        unsafe { self.gl.delete_shader(shader.into_gl()) }
    }

    fn link_program(&self, program: ProgramId) {
        unsafe { self.gl.link_program(program.into_gl()) }
    }

    fn program_link_status(&self, program: ProgramId) -> bool {
        unsafe { self.gl.get_program_link_status(program.into_gl()) }
    }

    fn program_info_log_length(&self, program: ProgramId) -> i32 {
        unsafe { self.gl.get_program_info_log(program.into_gl()) }.len() as i32
    }

    fn program_info_log(&self, program: ProgramId, max_len: usize) -> String {
        let log = unsafe { self.gl.get_program_info_log(program.into_gl()) };
        Self::truncated(log, max_len)
    }

    fn use_program(&self, program: Option<ProgramId>) {
        unsafe { self.gl.use_program(program.into_gl()) }
    }

    // --- Introspection ---

    fn program_parameter(&self, program: ProgramId, parameter: ProgramParameter) -> i32 {
        let native = program.into_gl();
        match parameter {
            ProgramParameter::ActiveUniforms => unsafe { self.gl.get_active_uniforms(native) as i32 },
            ProgramParameter::ActiveAttributes => unsafe { self.gl.get_active_attributes(native) as i32 },
            ProgramParameter::ActiveUniformMaxLength => {
                let count = unsafe { self.gl.get_active_uniforms(native) };
                Self::longest_name((0..count).filter_map(|index| {
                    unsafe { self.gl.get_active_uniform(native, index) }.map(|u| u.name)
                }))
            }
            ProgramParameter::ActiveAttributeMaxLength => {
                let count = unsafe { self.gl.get_active_attributes(native) };
                Self::longest_name((0..count).filter_map(|index| {
                    unsafe { self.gl.get_active_attribute(native, index) }.map(|a| a.name)
                }))
            }
        }
    }

    fn active_uniform(&self, program: ProgramId, index: u32, max_len: usize) -> Option<ActiveVariable> {
        let uniform = unsafe { self.gl.get_active_uniform(program.into_gl(), index) }?;
        Some(ActiveVariable {
            name: Self::truncated(uniform.name, max_len),
            size: uniform.size,
            kind: uniform.utype,
        })
    }

    fn active_attribute(
        &self,
        program: ProgramId,
        index: u32,
        max_len: usize,
    ) -> Option<ActiveVariable> {
        let attribute = unsafe { self.gl.get_active_attribute(program.into_gl(), index) }?;
        Some(ActiveVariable {
            name: Self::truncated(attribute.name, max_len),
            size: attribute.size,
            kind: attribute.atype,
        })
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> UniformLocation {
        unsafe { self.gl.get_uniform_location(program.into_gl(), name) }
            .map_or(UniformLocation::ABSENT, |location| UniformLocation(location.0 as i32))
    }

    fn attribute_location(&self, program: ProgramId, name: &str) -> Option<u32> {
        unsafe { self.gl.get_attrib_location(program.into_gl(), name) }
    }

    // --- Vertex arrays and buffers ---

    fn create_vertex_array(&self) -> Result<VertexArrayId, ResourceError> {
        unsafe { self.gl.create_vertex_array() }
            .map(|vao| VertexArrayId(vao.0))
            .map_err(ResourceError::Backend)
    }

    fn bind_vertex_array(&self, vao: Option<VertexArrayId>) {
        unsafe { self.gl.bind_vertex_array(vao.into_gl()) }
    }

    fn delete_vertex_array(&self, vao: VertexArrayId) {
        unsafe { self.gl.delete_vertex_array(vao.into_gl()) }
    }

    fn create_buffer(&self) -> Result<BufferId, ResourceError> {
        unsafe { self.gl.create_buffer() }
            .map(|buffer| BufferId(buffer.0))
            .map_err(ResourceError::Backend)
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<BufferId>) {
        unsafe { self.gl.bind_buffer(target.into_gl(), buffer.into_gl()) }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        unsafe { self.gl.buffer_data_u8_slice(target.into_gl(), data, usage.into_gl()) }
    }

    fn buffer_storage(&self, target: BufferTarget, size: usize, usage: BufferUsage) {
        unsafe { self.gl.buffer_data_size(target.into_gl(), size as i32, usage.into_gl()) }
    }

    fn buffer_sub_data(&self, target: BufferTarget, offset: usize, data: &[u8]) {
        unsafe { self.gl.buffer_sub_data_u8_slice(target.into_gl(), offset as i32, data) }
    }

    fn vertex_attrib_pointer(&self, slot: u32, span: i32, kind: DataKind, normalize: bool) {
        unsafe {
            self.gl
                .vertex_attrib_pointer_f32(slot, span, kind.into_gl(), normalize, 0, 0)
        }
    }

    fn enable_vertex_attrib_array(&self, slot: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(slot) }
    }

    fn delete_buffer(&self, buffer: BufferId) {
        unsafe { self.gl.delete_buffer(buffer.into_gl()) }
    }

    // --- Textures ---

    fn create_texture(&self) -> Result<TextureId, ResourceError> {
        unsafe { self.gl.create_texture() }
            .map(|texture| TextureId(texture.0))
            .map_err(ResourceError::Backend)
    }

    fn bind_texture(&self, texture: Option<TextureId>) {
        unsafe { self.gl.bind_texture(glow::TEXTURE_2D, texture.into_gl()) }
    }

    fn active_texture(&self, unit: u32) {
        unsafe { self.gl.active_texture(glow::TEXTURE0 + unit) }
    }

    fn upload_rgba8(&self, width: u32, height: u32, pixels: &[u8]) {
        unsafe {
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA as i32,
                width as i32,
                height as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(pixels)),
            )
        }
    }

    fn generate_mipmap(&self) {
        unsafe { self.gl.generate_mipmap(glow::TEXTURE_2D) }
    }

    fn set_texture_params(&self, repeat: bool, max_level: i32) {
        let wrap = wrap_mode(repeat);
        unsafe {
            self.gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, wrap);
            self.gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, wrap);
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                glow::LINEAR_MIPMAP_LINEAR as i32,
            );
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAX_LEVEL, max_level);
        }
    }

    fn delete_texture(&self, texture: TextureId) {
        unsafe { self.gl.delete_texture(texture.into_gl()) }
    }

    // --- Uniforms and drawing ---

    fn set_uniform(&self, location: UniformLocation, value: UniformValue<'_>) {
        let Ok(raw) = u32::try_from(location.0) else {
            return;
        };
        let native = glow::NativeUniformLocation(raw);
        let location = Some(&native);
        unsafe {
            match value {
                UniformValue::Int(v) => self.gl.uniform_1_i32(location, v),
                UniformValue::Float(v) => self.gl.uniform_1_f32(location, v),
                UniformValue::Vec2(v) => self.gl.uniform_2_f32_slice(location, &v),
                UniformValue::Vec3(v) => self.gl.uniform_3_f32_slice(location, &v),
                UniformValue::Vec4(v) => self.gl.uniform_4_f32_slice(location, &v),
                UniformValue::Mat3(m) => self.gl.uniform_matrix_3_f32_slice(location, false, m),
                UniformValue::Mat4(m) => self.gl.uniform_matrix_4_f32_slice(location, false, m),
                // Each pose is three rows of four, read by the shader as a mat3x4 column set.
                UniformValue::Mat3x4 { count, data } => {
                    let len = (count * 12).min(data.len());
                    self.gl
                        .uniform_matrix_3x4_f32_slice(location, false, &data[..len])
                }
            }
        }
    }

    fn draw_elements(&self, mode: DrawMode, count: i32, byte_offset: i32) {
        unsafe {
            self.gl
                .draw_elements(mode.into_gl(), count, glow::UNSIGNED_SHORT, byte_offset)
        }
    }

    fn draw_arrays(&self, mode: DrawMode, first: i32, count: i32) {
        unsafe { self.gl.draw_arrays(mode.into_gl(), first, count) }
    }

    fn polygon_lines(&self, enabled: bool) {
        if self.version.is_embedded {
            log::debug!("Polygon mode is not available on {}", self.version);
            return;
        }
        let mode = if enabled { glow::LINE } else { glow::FILL };
        unsafe { self.gl.polygon_mode(glow::FRONT_AND_BACK, mode) }
    }
}
