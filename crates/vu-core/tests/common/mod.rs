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

//! A recording graphics context shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashSet;
use std::num::NonZeroU32;
use std::rc::Rc;
use vu_core::renderer::*;

/// A GPU call the mock observed.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateProgram(u32),
    DeleteProgram(u32),
    CreateShader(ShaderStage, u32),
    ShaderSource(u32, Vec<String>),
    AttachShader(u32, u32),
    DetachShader(u32, u32),
    DeleteShader(u32),
    LinkProgram(u32),
    UseProgram(Option<u32>),
    SetCapability(Capability, bool),
    CreateVertexArray(u32),
    BindVertexArray(Option<u32>),
    DeleteVertexArray(u32),
    CreateBuffer(u32),
    BindBuffer(BufferTarget, Option<u32>),
    BufferData(BufferTarget, usize, BufferUsage),
    BufferStorage(BufferTarget, usize),
    BufferSubData(BufferTarget, usize, usize),
    VertexAttribPointer(u32, i32, DataKind, bool),
    EnableVertexAttribArray(u32),
    DeleteBuffer(u32),
    CreateTexture(u32),
    BindTexture(Option<u32>),
    ActiveTexture(u32),
    UploadRgba8(u32, u32),
    GenerateMipmap,
    TextureParams(bool, i32),
    DeleteTexture(u32),
    SetUniform(i32, Vec<f32>),
    DrawElements(DrawMode, i32, i32),
    DrawArrays(DrawMode, i32, i32),
    PolygonLines(bool),
    Clear,
    Viewport(i32, i32),
}

/// What the mock reports and the calls it has seen.
#[derive(Debug)]
pub struct MockState {
    pub glsl_version: String,
    pub version: ContextVersion,
    pub vertex_log: Option<String>,
    pub fragment_log: Option<String>,
    pub link_log: Option<String>,
    /// Active uniforms as `(reported name, array size)`; the location is the index.
    pub uniforms: Vec<(String, i32)>,
    /// Active attributes as `(name, layout location)`.
    pub attributes: Vec<(String, u32)>,
    /// Error codes returned by successive `error()` calls.
    pub errors: Vec<u32>,
    pub calls: Vec<Call>,
    pub live_programs: HashSet<u32>,
    pub live_shaders: HashSet<u32>,
    pub live_buffers: HashSet<u32>,
    pub live_textures: HashSet<u32>,
    next_id: u32,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            glsl_version: "3.30 Mock".to_string(),
            version: ContextVersion {
                major: 3,
                minor: 3,
                is_embedded: false,
            },
            vertex_log: None,
            fragment_log: None,
            link_log: None,
            uniforms: Vec::new(),
            attributes: Vec::new(),
            errors: Vec::new(),
            calls: Vec::new(),
            live_programs: HashSet::new(),
            live_shaders: HashSet::new(),
            live_buffers: HashSet::new(),
            live_textures: HashSet::new(),
            next_id: 1,
        }
    }
}

impl MockState {
    fn next(&mut self) -> NonZeroU32 {
        let id = self.next_id;
        self.next_id += 1;
        NonZeroU32::new(id).unwrap_or(NonZeroU32::MIN)
    }

    /// The number of recorded calls matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| predicate(c)).count()
    }

    /// Every value written to a uniform location, in order.
    pub fn uniform_writes(&self, location: i32) -> Vec<Vec<f32>> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::SetUniform(loc, values) if *loc == location => Some(values.clone()),
                _ => None,
            })
            .collect()
    }

    fn location_of(&self, name: &str) -> i32 {
        self.uniforms
            .iter()
            .position(|(n, _)| n == name)
            .map_or(-1, |i| i as i32)
    }
}

/// A [`GraphicsContext`] that records calls into shared state.
#[derive(Debug, Clone, Default)]
pub struct MockGraphicsContext {
    pub state: Rc<RefCell<MockState>>,
}

impl MockGraphicsContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// A context whose program reports the given active uniforms and attributes.
    pub fn with_program(uniforms: &[&str], attributes: &[(&str, u32)]) -> Self {
        let mock = Self::new();
        {
            let mut state = mock.state.borrow_mut();
            state.uniforms = uniforms.iter().map(|u| (u.to_string(), 1)).collect();
            state.attributes = attributes
                .iter()
                .map(|(n, l)| (n.to_string(), *l))
                .collect();
        }
        mock
    }

    fn record(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }
}

/// Starts logging once per test binary.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A renderer over a fresh mock with default settings.
pub fn renderer_with(mock: &MockGraphicsContext) -> Renderer {
    init_logging();
    Renderer::new(Box::new(mock.clone()), RenderSettings::default())
        .expect("mock context is supported")
}

pub const VSH: &[&str] = &["layout(location=0) in vec3 in_v;", "void main() {}"];
pub const FSH: &[&str] = &["out vec4 color;", "void main() { color = vec4(1.0); }"];

/// A mesh holding one triangle at slot 0 with indices.
pub fn triangle(renderer: &mut Renderer, name: &str) -> MeshHandle {
    let handle = renderer.new_mesh(name);
    let mesh = renderer.mesh_mut(handle).expect("new mesh");
    mesh.init_data(0, 3, BufferUsage::Static, false)
        .set_data(0, [0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    mesh.init_faces(BufferUsage::Static).set_faces(&[0, 1, 2]);
    handle
}

impl GraphicsContext for MockGraphicsContext {
    fn shading_language_version(&self) -> String {
        self.state.borrow().glsl_version.clone()
    }

    fn version(&self) -> ContextVersion {
        self.state.borrow().version
    }

    fn error(&self) -> u32 {
        let mut state = self.state.borrow_mut();
        if state.errors.is_empty() {
            0
        } else {
            state.errors.remove(0)
        }
    }

    fn set_capability(&self, capability: Capability, enabled: bool) {
        self.record(Call::SetCapability(capability, enabled));
    }

    fn blend_alpha(&self) {}

    fn clear_color(&self, _rgba: [f32; 4]) {}

    fn clear(&self) {
        self.record(Call::Clear);
    }

    fn viewport(&self, _x: i32, _y: i32, width: i32, height: i32) {
        self.record(Call::Viewport(width, height));
    }

    fn create_program(&self) -> Result<ProgramId, ResourceError> {
        let mut state = self.state.borrow_mut();
        let id = state.next();
        state.live_programs.insert(id.get());
        state.calls.push(Call::CreateProgram(id.get()));
        Ok(ProgramId(id))
    }

    fn delete_program(&self, program: ProgramId) {
        let mut state = self.state.borrow_mut();
        state.live_programs.remove(&program.0.get());
        state.calls.push(Call::DeleteProgram(program.0.get()));
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<ShaderId, ResourceError> {
        let mut state = self.state.borrow_mut();
        let id = state.next();
        state.live_shaders.insert(id.get());
        state.calls.push(Call::CreateShader(stage, id.get()));
        Ok(ShaderId(id))
    }

    fn shader_source(&self, shader: ShaderId, sources: &[String]) {
        self.record(Call::ShaderSource(shader.0.get(), sources.to_vec()));
    }

    fn compile_shader(&self, _shader: ShaderId) {}

    fn shader_compile_status(&self, shader: ShaderId) -> bool {
        let state = self.state.borrow();
        let stage = state.calls.iter().find_map(|c| match c {
            Call::CreateShader(stage, id) if *id == shader.0.get() => Some(*stage),
            _ => None,
        });
        match stage {
            Some(ShaderStage::Vertex) => state.vertex_log.is_none(),
            Some(ShaderStage::Fragment) => state.fragment_log.is_none(),
            None => false,
        }
    }

    fn shader_info_log_length(&self, shader: ShaderId) -> i32 {
        self.shader_info_log(shader, usize::MAX).len() as i32
    }

    fn shader_info_log(&self, shader: ShaderId, max_len: usize) -> String {
        let state = self.state.borrow();
        let vertex = state
            .calls
            .iter()
            .any(|c| *c == Call::CreateShader(ShaderStage::Vertex, shader.0.get()));
        let log = if vertex {
            &state.vertex_log
        } else {
            &state.fragment_log
        };
        let log = log.clone().unwrap_or_default();
        log.chars().take(max_len).collect()
    }

    fn attach_shader(&self, program: ProgramId, shader: ShaderId) {
        self.record(Call::AttachShader(program.0.get(), shader.0.get()));
    }

    fn detach_shader(&self, program: ProgramId, shader: ShaderId) {
        self.record(Call::DetachShader(program.0.get(), shader.0.get()));
    }

    fn delete_shader(&self, shader: ShaderId) {
        let mut state = self.state.borrow_mut();
        state.live_shaders.remove(&shader.0.get());
        state.calls.push(Call::DeleteShader(shader.0.get()));
    }

    fn link_program(&self, program: ProgramId) {
        self.record(Call::LinkProgram(program.0.get()));
    }

    fn program_link_status(&self, _program: ProgramId) -> bool {
        self.state.borrow().link_log.is_none()
    }

    fn program_info_log_length(&self, _program: ProgramId) -> i32 {
        self.state.borrow().link_log.as_ref().map_or(0, |l| l.len() as i32)
    }

    fn program_info_log(&self, _program: ProgramId, max_len: usize) -> String {
        let log = self.state.borrow().link_log.clone().unwrap_or_default();
        log.chars().take(max_len).collect()
    }

    fn use_program(&self, program: Option<ProgramId>) {
        self.record(Call::UseProgram(program.map(|p| p.0.get())));
    }

    fn program_parameter(&self, _program: ProgramId, parameter: ProgramParameter) -> i32 {
        let state = self.state.borrow();
        let longest = |names: Vec<usize>| names.into_iter().max().map_or(0, |l| l + 1) as i32;
        match parameter {
            ProgramParameter::ActiveUniforms => state.uniforms.len() as i32,
            ProgramParameter::ActiveAttributes => state.attributes.len() as i32,
            ProgramParameter::ActiveUniformMaxLength => {
                longest(state.uniforms.iter().map(|(n, _)| n.len()).collect())
            }
            ProgramParameter::ActiveAttributeMaxLength => {
                longest(state.attributes.iter().map(|(n, _)| n.len()).collect())
            }
        }
    }

    fn active_uniform(
        &self,
        _program: ProgramId,
        index: u32,
        _max_len: usize,
    ) -> Option<ActiveVariable> {
        let state = self.state.borrow();
        state
            .uniforms
            .get(index as usize)
            .map(|(name, size)| ActiveVariable {
                name: name.clone(),
                size: *size,
                kind: 0,
            })
    }

    fn active_attribute(
        &self,
        _program: ProgramId,
        index: u32,
        _max_len: usize,
    ) -> Option<ActiveVariable> {
        let state = self.state.borrow();
        state
            .attributes
            .get(index as usize)
            .map(|(name, _)| ActiveVariable {
                name: name.clone(),
                size: 1,
                kind: 0,
            })
    }

    fn uniform_location(&self, _program: ProgramId, name: &str) -> UniformLocation {
        UniformLocation(self.state.borrow().location_of(name))
    }

    fn attribute_location(&self, _program: ProgramId, name: &str) -> Option<u32> {
        let state = self.state.borrow();
        state
            .attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, l)| *l)
    }

    fn create_vertex_array(&self) -> Result<VertexArrayId, ResourceError> {
        let mut state = self.state.borrow_mut();
        let id = state.next();
        state.calls.push(Call::CreateVertexArray(id.get()));
        Ok(VertexArrayId(id))
    }

    fn bind_vertex_array(&self, vao: Option<VertexArrayId>) {
        self.record(Call::BindVertexArray(vao.map(|v| v.0.get())));
    }

    fn delete_vertex_array(&self, vao: VertexArrayId) {
        self.record(Call::DeleteVertexArray(vao.0.get()));
    }

    fn create_buffer(&self) -> Result<BufferId, ResourceError> {
        let mut state = self.state.borrow_mut();
        let id = state.next();
        state.live_buffers.insert(id.get());
        state.calls.push(Call::CreateBuffer(id.get()));
        Ok(BufferId(id))
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<BufferId>) {
        self.record(Call::BindBuffer(target, buffer.map(|b| b.0.get())));
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        self.record(Call::BufferData(target, data.len(), usage));
    }

    fn buffer_storage(&self, target: BufferTarget, size: usize, _usage: BufferUsage) {
        self.record(Call::BufferStorage(target, size));
    }

    fn buffer_sub_data(&self, target: BufferTarget, offset: usize, data: &[u8]) {
        self.record(Call::BufferSubData(target, offset, data.len()));
    }

    fn vertex_attrib_pointer(&self, slot: u32, span: i32, kind: DataKind, normalize: bool) {
        self.record(Call::VertexAttribPointer(slot, span, kind, normalize));
    }

    fn enable_vertex_attrib_array(&self, slot: u32) {
        self.record(Call::EnableVertexAttribArray(slot));
    }

    fn delete_buffer(&self, buffer: BufferId) {
        let mut state = self.state.borrow_mut();
        state.live_buffers.remove(&buffer.0.get());
        state.calls.push(Call::DeleteBuffer(buffer.0.get()));
    }

    fn create_texture(&self) -> Result<TextureId, ResourceError> {
        let mut state = self.state.borrow_mut();
        let id = state.next();
        state.live_textures.insert(id.get());
        state.calls.push(Call::CreateTexture(id.get()));
        Ok(TextureId(id))
    }

    fn bind_texture(&self, texture: Option<TextureId>) {
        self.record(Call::BindTexture(texture.map(|t| t.0.get())));
    }

    fn active_texture(&self, unit: u32) {
        self.record(Call::ActiveTexture(unit));
    }

    fn upload_rgba8(&self, width: u32, height: u32, pixels: &[u8]) {
        assert_eq!(pixels.len(), (width * height * 4) as usize);
        self.record(Call::UploadRgba8(width, height));
    }

    fn generate_mipmap(&self) {
        self.record(Call::GenerateMipmap);
    }

    fn set_texture_params(&self, repeat: bool, max_level: i32) {
        self.record(Call::TextureParams(repeat, max_level));
    }

    fn delete_texture(&self, texture: TextureId) {
        let mut state = self.state.borrow_mut();
        state.live_textures.remove(&texture.0.get());
        state.calls.push(Call::DeleteTexture(texture.0.get()));
    }

    fn set_uniform(&self, location: UniformLocation, value: UniformValue<'_>) {
        let values = match value {
            UniformValue::Int(v) => vec![v as f32],
            UniformValue::Float(v) => vec![v],
            UniformValue::Vec2(v) => v.to_vec(),
            UniformValue::Vec3(v) => v.to_vec(),
            UniformValue::Vec4(v) => v.to_vec(),
            UniformValue::Mat3(m) | UniformValue::Mat4(m) => m.to_vec(),
            UniformValue::Mat3x4 { count, data } => data[..count * 12].to_vec(),
        };
        self.record(Call::SetUniform(location.0, values));
    }

    fn draw_elements(&self, mode: DrawMode, count: i32, byte_offset: i32) {
        self.record(Call::DrawElements(mode, count, byte_offset));
    }

    fn draw_arrays(&self, mode: DrawMode, first: i32, count: i32) {
        self.record(Call::DrawArrays(mode, first, count));
    }

    fn polygon_lines(&self, enabled: bool) {
        self.record(Call::PolygonLines(enabled));
    }
}
