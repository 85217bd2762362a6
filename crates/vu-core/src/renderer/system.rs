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

//! The renderer: resource tables, model lifecycle and draw calls.

use crate::math::Mat4;
use crate::renderer::api::*;
use crate::renderer::error::{RenderError, ResourceError, ShaderError};
use crate::renderer::model::Model;
use crate::renderer::resource::{Animation, Mesh, Movement, ShaderProgram, Texture};
use crate::renderer::traits::GraphicsContext;
use image::RgbaImage;
use std::collections::HashMap;
use std::rc::Rc;

/// Owns the graphics context and every mesh, shader, texture and animation.
///
/// Resources are referred to by handle. Models take a reference on each resource
/// they use; when the last reference goes the GPU objects are released but the
/// CPU data stays, so a later model can bind it again.
#[derive(Debug)]
pub struct Renderer {
    ctx: Box<dyn GraphicsContext>,
    settings: RenderSettings,
    meshes: HashMap<MeshHandle, Mesh>,
    shaders: HashMap<ShaderHandle, ShaderProgram>,
    textures: HashMap<TextureHandle, Texture>,
    animations: HashMap<AnimationHandle, Rc<Animation>>,
    next_handle: usize,
    current_program: Option<ProgramId>,
}

impl Renderer {
    /// Wraps a context and applies the initial state from `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::UnsupportedVersion`] for contexts older than
    /// OpenGL 3.3 or OpenGL ES 3.0.
    pub fn new(ctx: Box<dyn GraphicsContext>, settings: RenderSettings) -> Result<Self, RenderError> {
        let version = ctx.version();
        if !version.is_supported() {
            return Err(RenderError::UnsupportedVersion(version.to_string()));
        }
        log::info!(
            "Renderer on {version}, shading language {}",
            ctx.shading_language_version()
        );

        ctx.clear_color(settings.clear_color);
        ctx.set_capability(Capability::DepthTest, true);
        ctx.set_capability(Capability::CullFace, true);
        if settings.blend {
            ctx.set_capability(Capability::Blend, true);
            ctx.blend_alpha();
        }

        Ok(Self {
            ctx,
            settings,
            meshes: HashMap::new(),
            shaders: HashMap::new(),
            textures: HashMap::new(),
            animations: HashMap::new(),
            next_handle: 0,
            current_program: None,
        })
    }

    /// The graphics context every resource binds through.
    pub fn context(&self) -> &dyn GraphicsContext {
        self.ctx.as_ref()
    }

    /// The settings the renderer was created with.
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    fn next(&mut self) -> usize {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }

    // --- Resource tables ---

    /// Stores a new empty mesh.
    pub fn new_mesh(&mut self, name: impl Into<String>) -> MeshHandle {
        let handle = MeshHandle(self.next());
        self.meshes.insert(handle, Mesh::new(name));
        handle
    }

    /// A stored mesh.
    pub fn mesh(&self, handle: MeshHandle) -> Option<&Mesh> {
        self.meshes.get(&handle)
    }

    /// A stored mesh, for changing its data.
    pub fn mesh_mut(&mut self, handle: MeshHandle) -> Option<&mut Mesh> {
        self.meshes.get_mut(&handle)
    }

    /// Compiles and links a shader and stores it.
    ///
    /// Nothing is stored if compilation or linking fails.
    pub fn new_shader<V, F>(
        &mut self,
        name: impl Into<String>,
        vsh: &[V],
        fsh: &[F],
    ) -> Result<ShaderHandle, ShaderError>
    where
        V: AsRef<str>,
        F: AsRef<str>,
    {
        let mut shader = ShaderProgram::new(name, vsh, fsh);
        shader.bind(self.ctx.as_ref())?;
        let handle = ShaderHandle(self.next());
        self.shaders.insert(handle, shader);
        Ok(handle)
    }

    /// A stored shader.
    pub fn shader(&self, handle: ShaderHandle) -> Option<&ShaderProgram> {
        self.shaders.get(&handle)
    }

    /// Stores a texture. It is uploaded when first attached to a model and keeps
    /// its pixels so it can be uploaded again after being released.
    pub fn new_texture(&mut self, name: impl Into<String>, image: RgbaImage) -> TextureHandle {
        let handle = TextureHandle(self.next());
        self.textures.insert(handle, Texture::new(name, image));
        handle
    }

    /// A stored texture.
    pub fn texture(&self, handle: TextureHandle) -> Option<&Texture> {
        self.textures.get(&handle)
    }

    /// A stored texture, for changing its pixels or dropping them.
    pub fn texture_mut(&mut self, handle: TextureHandle) -> Option<&mut Texture> {
        self.textures.get_mut(&handle)
    }

    /// Stores joint keyframes. Movements without a rate play at
    /// [`RenderSettings::default_frame_rate`].
    pub fn new_animation(
        &mut self,
        name: impl Into<String>,
        frames: Vec<Mat4>,
        joints: Vec<i32>,
        movements: Vec<Movement>,
    ) -> AnimationHandle {
        let mut animation = Animation::new(name, self.settings.default_frame_rate);
        animation.set_data(frames, joints, movements);
        let handle = AnimationHandle(self.next());
        self.animations.insert(handle, Rc::new(animation));
        handle
    }

    /// Stored animation data.
    pub fn animation(&self, handle: AnimationHandle) -> Option<Rc<Animation>> {
        self.animations.get(&handle).cloned()
    }

    // --- Models ---

    /// Creates a model drawn by `shader`, rebinding the shader if it was released.
    pub fn new_model(&mut self, shader: ShaderHandle) -> Result<Model, RenderError> {
        let program = self
            .shaders
            .get_mut(&shader)
            .ok_or(ResourceError::InvalidHandle)?;
        if !program.is_bound() {
            program.bind(self.ctx.as_ref())?;
        }
        program.refs.acquire();
        Ok(Model::new(shader))
    }

    /// Gives `model` a new mesh, releasing its reference on the previous one.
    ///
    /// A valid mesh is uploaded straight away; failures are logged and retried on
    /// the next draw.
    pub fn set_mesh(&mut self, model: &mut Model, mesh: MeshHandle) -> Result<(), RenderError> {
        let entry = self
            .meshes
            .get_mut(&mesh)
            .ok_or(ResourceError::InvalidHandle)?;
        entry.refs.acquire();
        if !entry.is_bound() && entry.is_valid() {
            if let Err(err) = entry.bind(self.ctx.as_ref()) {
                log::warn!("Could not bind mesh {}: {err}", entry.name());
            }
            self.ctx.bind_vertex_array(None);
        }
        if let Some(previous) = model.mesh.replace(mesh) {
            self.detach_mesh(previous);
        }
        Ok(())
    }

    /// Draws one model.
    ///
    /// Models without a mesh, or whose mesh fails [`Mesh::is_valid`], are skipped
    /// with a warning.
    pub fn render(&mut self, model: &Model) -> Result<(), RenderError> {
        let ctx = self.ctx.as_ref();
        let shader = self
            .shaders
            .get_mut(&model.shader)
            .ok_or(ResourceError::InvalidHandle)?;
        let Some(mesh_handle) = model.mesh else {
            log::warn!("Model using shader {} has no mesh", shader.name());
            return Ok(());
        };
        let mesh = self
            .meshes
            .get_mut(&mesh_handle)
            .ok_or(ResourceError::InvalidHandle)?;
        if !mesh.is_valid() {
            log::warn!("Mesh {} is not valid, skipping draw", mesh.name());
            return Ok(());
        }
        if !shader.is_bound() {
            shader.bind(ctx)?;
        }
        let Some(program) = shader.program_id() else {
            return Ok(());
        };

        ctx.set_capability(Capability::DepthTest, !model.is_2d);
        ctx.set_capability(Capability::CullFace, model.cull);
        if self.current_program != Some(program) {
            ctx.use_program(Some(program));
            self.current_program = Some(program);
        }
        model.bind_uniforms(ctx, shader, mesh.name(), &self.textures);
        mesh.bind(ctx)?;

        let index_count = mesh.index_count() as i32;
        match model.mode {
            DrawMode::Lines => {
                ctx.polygon_lines(true);
                ctx.draw_elements(DrawMode::Lines, index_count, 0);
                ctx.polygon_lines(false);
            }
            DrawMode::Points => {
                ctx.set_capability(Capability::ProgramPointSize, true);
                ctx.draw_arrays(DrawMode::Points, 0, mesh.vertex_count() as i32);
                ctx.set_capability(Capability::ProgramPointSize, false);
            }
            DrawMode::Triangles => {
                let ranged = model.textures.len() > 1
                    && model.textures[0].faces.is_some_and(|(_, count)| count > 0);
                if ranged {
                    // One sampler, swapping the image per face range.
                    ctx.active_texture(0);
                    for slot in &model.textures {
                        let Some((first, count)) = slot.faces else {
                            continue;
                        };
                        let id = self.textures.get(&slot.handle).and_then(Texture::texture_id);
                        ctx.bind_texture(id);
                        ctx.draw_elements(DrawMode::Triangles, (count * 3) as i32, (first * 6) as i32);
                    }
                } else if index_count == 0 {
                    log::warn!("Mesh {} has no faces to draw", mesh.name());
                } else {
                    ctx.draw_elements(DrawMode::Triangles, index_count, 0);
                }
            }
        }
        ctx.set_capability(Capability::DepthTest, false);
        Ok(())
    }

    // --- Frame state ---

    /// Clears colour and depth.
    pub fn clear(&self) {
        self.ctx.clear();
    }

    /// Changes the clear colour.
    pub fn set_clear_color(&mut self, rgba: [f32; 4]) {
        self.settings.clear_color = rgba;
        self.ctx.clear_color(rgba);
    }

    /// Resizes the viewport.
    pub fn viewport(&self, width: i32, height: i32) {
        self.ctx.viewport(0, 0, width, height);
    }

    /// Toggles a capability outside of model draws.
    pub fn enable(&self, capability: Capability, enabled: bool) {
        self.ctx.set_capability(capability, enabled);
    }

    // --- Reference counting ---

    pub(crate) fn attach_texture(&mut self, handle: TextureHandle) -> Result<(), RenderError> {
        let texture = self
            .textures
            .get_mut(&handle)
            .ok_or(ResourceError::InvalidHandle)?;
        if !texture.is_bound() {
            match texture.bind(self.ctx.as_ref(), self.settings.max_texture_level) {
                Ok(()) => {}
                // Nothing to upload, so the texture can never be sampled.
                Err(err) if texture.image().is_none() => return Err(err.into()),
                Err(err) => log::warn!("Could not bind texture {}: {err}", texture.name()),
            }
        }
        texture.refs.acquire();
        Ok(())
    }

    pub(crate) fn detach_texture(&mut self, handle: TextureHandle) {
        if let Some(texture) = self.textures.get_mut(&handle) {
            if texture.release_ref() {
                texture.release(self.ctx.as_ref());
                log::debug!("Released texture {}", texture.name());
            }
        }
    }

    pub(crate) fn detach_mesh(&mut self, handle: MeshHandle) {
        if let Some(mesh) = self.meshes.get_mut(&handle) {
            if mesh.release_ref() {
                mesh.release(self.ctx.as_ref());
                log::debug!("Released mesh {}", mesh.name());
            }
        }
    }

    pub(crate) fn detach_shader(&mut self, handle: ShaderHandle) {
        if let Some(shader) = self.shaders.get_mut(&handle) {
            if shader.release_ref() {
                if shader.program_id() == self.current_program {
                    self.ctx.use_program(None);
                    self.current_program = None;
                }
                shader.release(self.ctx.as_ref());
                log::debug!("Released shader {}", shader.name());
            }
        }
    }

    pub(crate) fn set_texture_repeat(&mut self, handle: TextureHandle, repeat: bool) {
        if let Some(texture) = self.textures.get_mut(&handle) {
            texture.set_repeat(self.ctx.as_ref(), repeat, self.settings.max_texture_level);
        }
    }

    pub(crate) fn replace_texture_image(&mut self, handle: TextureHandle, image: RgbaImage) {
        if let Some(texture) = self.textures.get_mut(&handle) {
            texture.set_image(image);
            if let Err(err) = texture.bind(self.ctx.as_ref(), self.settings.max_texture_level) {
                log::warn!("Could not bind texture {}: {err}", texture.name());
            }
        }
    }
}
