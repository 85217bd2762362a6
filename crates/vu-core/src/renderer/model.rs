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

//! A drawable instance: shader, mesh, textures and the uniform values fed to them.
//!
//! Every active uniform of the model's shader is resolved at draw time. Names in
//! the built-in table ([`builtin`]) are supplied from model state; anything else
//! must be set with [`Model::set_uniform`].

use crate::math::{Mat3, Mat4, Pose, Vec3};
use crate::renderer::api::{
    AnimationHandle, DrawMode, MeshHandle, ShaderHandle, TextureHandle, UniformLocation,
    UniformValue,
};
use crate::renderer::error::{RenderError, ResourceError, VerifyError};
use crate::renderer::resource::{Animation, ShaderProgram, Texture};
use crate::renderer::system::Renderer;
use crate::renderer::traits::GraphicsContext;
use image::RgbaImage;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Instant;

/// The number of texture units a model can sample.
pub const MAX_TEXTURES: usize = 16;

/// A uniform whose value comes from model state rather than from user values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    /// `mvpm`: the model-view-projection matrix.
    Mvp,
    /// `mvm`: the model-view matrix.
    Mv,
    /// `nm`: the upper 3x3 of the model-view matrix.
    Normal,
    /// `bpos`: the current joint poses.
    Pose,
    /// `uv`, `uv0` .. `uv15`: the sampler for a texture unit.
    Texture(usize),
    /// `scale`: the model scale.
    Scale,
    /// `alpha`: the model transparency.
    Alpha,
    /// `time`: seconds since the model was created.
    Time,
}

/// Looks up the built-in supplier for a uniform name.
pub fn builtin(name: &str) -> Option<Builtin> {
    let supplier = match name {
        "mvpm" => Builtin::Mvp,
        "mvm" => Builtin::Mv,
        "nm" => Builtin::Normal,
        "bpos" => Builtin::Pose,
        "uv" => Builtin::Texture(0),
        "scale" => Builtin::Scale,
        "alpha" => Builtin::Alpha,
        "time" => Builtin::Time,
        _ => return texture_unit(name).map(Builtin::Texture),
    };
    Some(supplier)
}

/// Parses `uv0` .. `uv15`. Leading zeros and signs are not accepted.
fn texture_unit(name: &str) -> Option<usize> {
    let digits = name.strip_prefix("uv")?;
    if digits.is_empty()
        || !digits.bytes().all(|b| b.is_ascii_digit())
        || (digits.len() > 1 && digits.starts_with('0'))
    {
        return None;
    }
    digits.parse().ok().filter(|unit| *unit < MAX_TEXTURES)
}

/// A texture attached to a model, optionally limited to a range of triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelTexture {
    /// The texture.
    pub handle: TextureHandle,
    /// First triangle and triangle count drawn with this texture.
    pub faces: Option<(u32, u32)>,
}

/// One drawable instance.
///
/// Models are created by [`Renderer::new_model`] and hold handles into the
/// renderer's resource tables. A model owns one reference on each resource it
/// uses and gives them back in [`Model::dispose`].
#[derive(Debug)]
pub struct Model {
    pub(crate) shader: ShaderHandle,
    pub(crate) mesh: Option<MeshHandle>,
    pub(crate) textures: Vec<ModelTexture>,
    pub(crate) mode: DrawMode,
    pub(crate) is_2d: bool,
    pub(crate) cull: bool,

    mv: Mat4,
    mvp: Mat4,
    scale: Vec3,
    alpha: f32,
    created: Instant,
    uniforms: HashMap<String, Vec<f32>>,

    animation: Option<(AnimationHandle, Rc<Animation>)>,
    poses: Vec<Pose>,
    movement: usize,
    frame: f64,
    max_frames: usize,
}

impl Model {
    pub(crate) fn new(shader: ShaderHandle) -> Self {
        Self {
            shader,
            mesh: None,
            textures: Vec::new(),
            mode: DrawMode::Triangles,
            is_2d: false,
            cull: true,
            mv: Mat4::IDENTITY,
            mvp: Mat4::IDENTITY,
            scale: Vec3::ONE,
            alpha: 1.0,
            created: Instant::now(),
            uniforms: HashMap::new(),
            animation: None,
            poses: Vec::new(),
            movement: 0,
            frame: 0.0,
            max_frames: 0,
        }
    }

    // --- Accessors ---

    /// The shader drawing this model.
    pub fn shader(&self) -> ShaderHandle {
        self.shader
    }

    /// The mesh, if one has been set.
    pub fn mesh(&self) -> Option<MeshHandle> {
        self.mesh
    }

    /// The texture at a unit.
    pub fn texture(&self, index: usize) -> Option<TextureHandle> {
        self.textures.get(index).map(|t| t.handle)
    }

    /// All attached textures in unit order.
    pub fn textures(&self) -> &[ModelTexture] {
        &self.textures
    }

    /// The primitive type used to draw.
    pub fn draw_mode(&self) -> DrawMode {
        self.mode
    }

    /// Returns `true` if depth testing is disabled for this model.
    pub fn is_2d(&self) -> bool {
        self.is_2d
    }

    /// Returns `true` if back faces are culled.
    pub fn culls(&self) -> bool {
        self.cull
    }

    /// The `alpha` uniform value.
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// The `scale` uniform value.
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// The `mvm` uniform value.
    pub fn mv_transform(&self) -> &Mat4 {
        &self.mv
    }

    /// The `mvpm` uniform value.
    pub fn mvp_transform(&self) -> &Mat4 {
        &self.mvp
    }

    /// A user uniform value.
    pub fn uniform(&self, name: &str) -> Option<&[f32]> {
        self.uniforms.get(name).map(Vec::as_slice)
    }

    // --- Setters ---

    /// Sets a user uniform. One to four floats map to `float` .. `vec4`.
    pub fn set_uniform(&mut self, name: impl Into<String>, value: &[f32]) {
        self.uniforms.insert(name.into(), value.to_vec());
    }

    /// Sets the transparency.
    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha;
    }

    /// Sets the per-axis scale.
    pub fn set_scale(&mut self, x: f32, y: f32, z: f32) {
        self.scale = Vec3::new(x, y, z);
    }

    /// Sets the model-view matrix.
    pub fn set_mv_transform(&mut self, mv: &Mat4) {
        self.mv = *mv;
    }

    /// Sets the model-view-projection matrix.
    pub fn set_mvp_transform(&mut self, mvp: &Mat4) {
        self.mvp = *mvp;
    }

    /// Sets the primitive type used to draw.
    pub fn set_draw_mode(&mut self, mode: DrawMode) {
        self.mode = mode;
    }

    /// Draws without depth testing.
    pub fn set_2d(&mut self) {
        self.is_2d = true;
    }

    /// Draws back faces too.
    pub fn set_cull_off(&mut self) {
        self.cull = false;
    }

    // --- Textures ---

    /// Attaches a texture to the next free unit and returns that unit.
    ///
    /// The texture is uploaded if it is not bound yet and its CPU pixels are then
    /// dropped. An upload failure is logged and the texture is still attached.
    pub fn add_texture(
        &mut self,
        renderer: &mut Renderer,
        texture: TextureHandle,
    ) -> Result<usize, RenderError> {
        self.push_texture(renderer, texture, None)
    }

    /// Like [`Model::add_texture`], limiting the texture to `face_count` triangles
    /// starting at `first_face`.
    pub fn add_model_texture(
        &mut self,
        renderer: &mut Renderer,
        texture: TextureHandle,
        first_face: u32,
        face_count: u32,
    ) -> Result<usize, RenderError> {
        self.push_texture(renderer, texture, Some((first_face, face_count)))
    }

    fn push_texture(
        &mut self,
        renderer: &mut Renderer,
        texture: TextureHandle,
        faces: Option<(u32, u32)>,
    ) -> Result<usize, RenderError> {
        if self.textures.len() >= MAX_TEXTURES {
            return Err(ResourceError::TextureLimit(MAX_TEXTURES).into());
        }
        renderer.attach_texture(texture)?;
        self.textures.push(ModelTexture {
            handle: texture,
            faces,
        });
        Ok(self.textures.len() - 1)
    }

    /// Replaces the texture at `index`, keeping its face range.
    pub fn use_texture(
        &mut self,
        renderer: &mut Renderer,
        texture: TextureHandle,
        index: usize,
    ) -> Result<(), RenderError> {
        let Some(old) = self.textures.get(index).copied() else {
            return Err(ResourceError::InvalidHandle.into());
        };
        renderer.attach_texture(texture)?;
        renderer.detach_texture(old.handle);
        self.textures[index].handle = texture;
        Ok(())
    }

    /// Detaches the texture at `index`; later units shift down by one.
    /// Out of range indices are ignored.
    pub fn rem_texture(&mut self, renderer: &mut Renderer, index: usize) {
        if index < self.textures.len() {
            let removed = self.textures.remove(index);
            renderer.detach_texture(removed.handle);
        }
    }

    /// Switches the texture at `index` between repeating and clamping.
    pub fn set_texture_mode(&self, renderer: &mut Renderer, index: usize, repeat: bool) {
        if let Some(t) = self.textures.get(index) {
            renderer.set_texture_repeat(t.handle, repeat);
        }
    }

    /// Replaces the pixels of the texture at `index` and uploads them.
    pub fn set_image(&self, renderer: &mut Renderer, index: usize, image: RgbaImage) {
        if let Some(t) = self.textures.get(index) {
            renderer.replace_texture_image(t.handle, image);
        }
    }

    // --- Animation ---

    /// Plays `animation` from the start of its first movement.
    pub fn set_animation(
        &mut self,
        renderer: &Renderer,
        animation: AnimationHandle,
    ) -> Result<(), RenderError> {
        let data = renderer
            .animation(animation)
            .ok_or(ResourceError::InvalidHandle)?;
        self.max_frames = data.max_frames(0);
        self.poses = vec![Pose::IDENTITY; data.joint_count()];
        self.movement = 0;
        self.frame = 0.0;
        self.animation = Some((animation, data));
        Ok(())
    }

    /// The animation handle, if any.
    pub fn animation(&self) -> Option<AnimationHandle> {
        self.animation.as_ref().map(|(handle, _)| *handle)
    }

    /// Restarts playback on movement `index`.
    ///
    /// Returns `false` if the movement does not exist, in which case movement 0 plays.
    pub fn play_movement(&mut self, index: usize) -> bool {
        let Some((_, data)) = &self.animation else {
            return false;
        };
        self.movement = data.play_movement(index);
        self.max_frames = data.max_frames(self.movement);
        self.frame = 0.0;
        self.movement == index
    }

    /// The names of the available movements.
    pub fn movements(&self) -> Vec<String> {
        self.animation.as_ref().map_or_else(Vec::new, |(_, data)| {
            data.movement_names()
                .into_iter()
                .map(str::to_string)
                .collect()
        })
    }

    /// Advances the animation by `dt` seconds.
    ///
    /// Returns `true` when the current movement completed a loop; playback then
    /// restarts at frame 0. A movement without frames never completes.
    pub fn animate(&mut self, dt: f64) -> bool {
        let Some((_, data)) = &self.animation else {
            return false;
        };
        if self.max_frames == 0 {
            return false;
        }
        self.frame = data.animate(dt, self.frame, self.movement, &mut self.poses);
        if self.frame as usize >= self.max_frames {
            self.frame = 0.0;
            return true;
        }
        false
    }

    /// The current frame position.
    pub fn frame(&self) -> f64 {
        self.frame
    }

    /// The current pose of `joint`, identity when there is no such joint.
    pub fn pose(&self, joint: usize) -> Mat4 {
        self.poses
            .get(joint)
            .map_or(Mat4::IDENTITY, Pose::to_mat4)
    }

    // --- Binding ---

    /// Checks that the shader can be fed from this model.
    ///
    /// Every active uniform must have a built-in supplier or a user value, a mesh
    /// must be set when the shader reads attributes, and every attribute location
    /// must be a mesh slot.
    pub fn verify(&self, renderer: &Renderer) -> Result<(), VerifyError> {
        let shader = renderer.shader(self.shader).ok_or(VerifyError::NoShader)?;

        let mut names: Vec<&String> = shader.uniforms().keys().collect();
        names.sort();
        for name in names {
            if builtin(name).is_none() && !self.uniforms.contains_key(name.as_str()) {
                return Err(VerifyError::MissingUniform {
                    uniform: name.clone(),
                    shader: shader.name().to_string(),
                });
            }
        }

        let attributes = shader.attributes();
        if attributes.is_empty() {
            return Ok(());
        }
        let Some(mesh) = self.mesh.and_then(|h| renderer.mesh(h)) else {
            return Err(VerifyError::NoMesh {
                shader: shader.name().to_string(),
                expected: attributes.len(),
            });
        };
        let mut attributes: Vec<(&String, &u32)> = attributes.iter().collect();
        attributes.sort();
        for (name, location) in attributes {
            if !mesh.has_slot(*location) {
                return Err(VerifyError::MissingAttribute {
                    attribute: name.clone(),
                    shader: shader.name().to_string(),
                    mesh: mesh.name().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Writes every active uniform of `shader`, which must be the current program.
    pub(crate) fn bind_uniforms(
        &self,
        ctx: &dyn GraphicsContext,
        shader: &ShaderProgram,
        mesh: &str,
        textures: &HashMap<TextureHandle, Texture>,
    ) {
        for (name, &location) in shader.uniforms() {
            if let Some(supplier) = builtin(name) {
                self.bind_builtin(ctx, supplier, location, textures);
                continue;
            }
            match self.uniforms.get(name).map(Vec::as_slice) {
                Some(&[x]) => ctx.set_uniform(location, UniformValue::Float(x)),
                Some(&[x, y]) => ctx.set_uniform(location, UniformValue::Vec2([x, y])),
                Some(&[x, y, z]) => ctx.set_uniform(location, UniformValue::Vec3([x, y, z])),
                Some(&[x, y, z, w]) => {
                    ctx.set_uniform(location, UniformValue::Vec4([x, y, z, w]))
                }
                Some(values) => log::warn!(
                    "Uniform {name} has {} values, expected 1 to 4",
                    values.len()
                ),
                None => log::warn!(
                    "No uniform {name} for mesh {mesh} shader {}",
                    shader.name()
                ),
            }
        }
    }

    fn bind_builtin(
        &self,
        ctx: &dyn GraphicsContext,
        supplier: Builtin,
        location: UniformLocation,
        textures: &HashMap<TextureHandle, Texture>,
    ) {
        match supplier {
            Builtin::Mvp => ctx.set_uniform(location, UniformValue::Mat4(self.mvp.as_slice())),
            Builtin::Mv => ctx.set_uniform(location, UniformValue::Mat4(self.mv.as_slice())),
            Builtin::Normal => {
                let nm = Mat3::from_mat4(&self.mv);
                ctx.set_uniform(location, UniformValue::Mat3(nm.as_slice()));
            }
            Builtin::Pose => {
                if !self.poses.is_empty() {
                    ctx.set_uniform(
                        location,
                        UniformValue::Mat3x4 {
                            count: self.poses.len(),
                            data: bytemuck::cast_slice(&self.poses),
                        },
                    );
                }
            }
            Builtin::Texture(unit) => {
                let texture = self
                    .textures
                    .get(unit)
                    .and_then(|t| textures.get(&t.handle))
                    .and_then(Texture::texture_id);
                match texture {
                    Some(id) => {
                        ctx.set_uniform(location, UniformValue::Int(unit as i32));
                        ctx.active_texture(unit as u32);
                        ctx.bind_texture(Some(id));
                    }
                    None => log::warn!("No bound texture at unit {unit} for model sampler"),
                }
            }
            Builtin::Scale => ctx.set_uniform(location, UniformValue::Vec3(self.scale.to_array())),
            Builtin::Alpha => ctx.set_uniform(location, UniformValue::Float(self.alpha)),
            Builtin::Time => {
                let elapsed = self.created.elapsed().as_secs_f32();
                ctx.set_uniform(location, UniformValue::Float(elapsed));
            }
        }
    }

    /// Gives back this model's references on its shader, mesh and textures.
    ///
    /// Resources whose count reaches zero release their GPU objects and become
    /// unbound; their CPU data stays in the renderer.
    pub fn dispose(self, renderer: &mut Renderer) {
        renderer.detach_shader(self.shader);
        if let Some(mesh) = self.mesh {
            renderer.detach_mesh(mesh);
        }
        for texture in &self.textures {
            renderer.detach_texture(texture.handle);
        }
    }
}
