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

//! Shader compilation, linking and introspection of active uniforms and attributes.

use super::RefCount;
use crate::renderer::api::{ProgramId, ProgramParameter, ShaderId, ShaderStage, UniformLocation};
use crate::renderer::error::ShaderError;
use crate::renderer::traits::GraphicsContext;
use std::collections::HashMap;

/// The shading language version reported by OpenGL ES 3.0 contexts.
pub const GLSL_ES_300: &str = "OpenGL ES GLSL ES 3.00";

const ES_PREAMBLE: &[&str] = &["#version 300 es\n", "precision highp float;\n"];
const DESKTOP_PREAMBLE: &[&str] = &["#version 330\n"];

/// Returns the lines prepended to every shader stage for a context reporting
/// `glsl_version`.
pub fn preamble(glsl_version: &str) -> &'static [&'static str] {
    if glsl_version == GLSL_ES_300 {
        ES_PREAMBLE
    } else {
        DESKTOP_PREAMBLE
    }
}

/// Returns `source` with the version preamble for `glsl_version` in front.
pub fn with_preamble(source: &[String], glsl_version: &str) -> Vec<String> {
    let lead = preamble(glsl_version);
    let mut out = Vec::with_capacity(lead.len() + source.len());
    out.extend(lead.iter().map(|line| line.to_string()));
    out.extend_from_slice(source);
    out
}

/// Compiles `vsh` and `fsh` and links them into `program`.
///
/// The version preamble for the context is prepended to both stages. Shader
/// objects are detached and deleted on every exit path. The program is not
/// validated, so this succeeds without a vertex array bound.
///
/// # Errors
///
/// * [`ShaderError::EmptySource`] if either stage has no source.
/// * [`ShaderError::VertexCompile`] / [`ShaderError::FragmentCompile`] carrying the
///   compiler log.
/// * [`ShaderError::Link`] carrying the linker log.
/// * [`ShaderError::ProgramCreation`] if a shader object cannot be created.
pub fn bind_program(
    ctx: &dyn GraphicsContext,
    program: ProgramId,
    vsh: &[String],
    fsh: &[String],
) -> Result<(), ShaderError> {
    if is_blank(vsh) {
        return Err(ShaderError::EmptySource {
            stage: ShaderStage::Vertex,
        });
    }
    if is_blank(fsh) {
        return Err(ShaderError::EmptySource {
            stage: ShaderStage::Fragment,
        });
    }

    let glsl_version = ctx.shading_language_version();
    let vsh = with_preamble(vsh, &glsl_version);
    let fsh = with_preamble(fsh, &glsl_version);

    let _vertex = StageGuard::compile(ctx, program, ShaderStage::Vertex, &vsh)?;
    let _fragment = StageGuard::compile(ctx, program, ShaderStage::Fragment, &fsh)?;

    ctx.link_program(program);
    if !ctx.program_link_status(program) {
        let log = read_log(ctx.program_info_log_length(program), |len| {
            ctx.program_info_log(program, len)
        });
        return Err(ShaderError::Link { log });
    }
    Ok(())
}

/// Reads the active uniforms of a linked program.
///
/// Array uniforms are keyed by their base name (`bpos[0]` becomes `bpos`).
pub fn active_uniforms(
    ctx: &dyn GraphicsContext,
    program: ProgramId,
) -> HashMap<String, UniformLocation> {
    let max_len = ctx
        .program_parameter(program, ProgramParameter::ActiveUniformMaxLength)
        .max(0) as usize;
    let count = ctx
        .program_parameter(program, ProgramParameter::ActiveUniforms)
        .max(0) as u32;
    (0..count)
        .filter_map(|index| ctx.active_uniform(program, index, max_len))
        .filter(|uniform| !uniform.name.is_empty())
        .map(|uniform| {
            let location = ctx.uniform_location(program, &uniform.name);
            (strip_subscript(&uniform.name).to_string(), location)
        })
        .collect()
}

/// Reads the active vertex attributes of a linked program and their layout locations.
pub fn active_attributes(ctx: &dyn GraphicsContext, program: ProgramId) -> HashMap<String, u32> {
    let max_len = ctx
        .program_parameter(program, ProgramParameter::ActiveAttributeMaxLength)
        .max(0) as usize;
    let count = ctx
        .program_parameter(program, ProgramParameter::ActiveAttributes)
        .max(0) as u32;
    (0..count)
        .filter_map(|index| ctx.active_attribute(program, index, max_len))
        .filter(|attribute| !attribute.name.is_empty())
        .filter_map(|attribute| {
            ctx.attribute_location(program, &attribute.name)
                .map(|location| (attribute.name, location))
        })
        .collect()
}

fn strip_subscript(name: &str) -> &str {
    name.split('[').next().unwrap_or(name)
}

fn is_blank(source: &[String]) -> bool {
    source.iter().all(|line| line.trim().is_empty())
}

fn read_log(length: i32, fetch: impl FnOnce(usize) -> String) -> String {
    if length <= 0 {
        return String::new();
    }
    fetch(length as usize).trim_end_matches('\0').to_string()
}

/// A compiled shader object, detached and deleted when dropped.
struct StageGuard<'a> {
    ctx: &'a dyn GraphicsContext,
    program: ProgramId,
    shader: ShaderId,
    attached: bool,
}

impl<'a> StageGuard<'a> {
    fn compile(
        ctx: &'a dyn GraphicsContext,
        program: ProgramId,
        stage: ShaderStage,
        source: &[String],
    ) -> Result<Self, ShaderError> {
        let shader = ctx
            .create_shader(stage)
            .map_err(|e| ShaderError::ProgramCreation(e.to_string()))?;
        let mut guard = Self {
            ctx,
            program,
            shader,
            attached: false,
        };

        ctx.shader_source(shader, source);
        ctx.compile_shader(shader);
        if !ctx.shader_compile_status(shader) {
            let log = read_log(ctx.shader_info_log_length(shader), |len| {
                ctx.shader_info_log(shader, len)
            });
            return Err(match stage {
                ShaderStage::Vertex => ShaderError::VertexCompile { log },
                ShaderStage::Fragment => ShaderError::FragmentCompile { log },
            });
        }

        ctx.attach_shader(program, shader);
        guard.attached = true;
        Ok(guard)
    }
}

impl Drop for StageGuard<'_> {
    fn drop(&mut self) {
        if self.attached {
            self.ctx.detach_shader(self.program, self.shader);
        }
        self.ctx.delete_shader(self.shader);
    }
}

/// A vertex and fragment shader pair and, once bound, its linked GPU program.
///
/// Uniform and attribute tables are only populated after a successful bind.
#[derive(Debug)]
pub struct ShaderProgram {
    name: String,
    vsh: Vec<String>,
    fsh: Vec<String>,
    program: Option<ProgramId>,
    uniforms: HashMap<String, UniformLocation>,
    attributes: HashMap<String, u32>,
    pub(crate) refs: RefCount,
}

impl ShaderProgram {
    /// Creates an unbound shader from vertex and fragment source fragments.
    pub fn new<V, F>(name: impl Into<String>, vsh: &[V], fsh: &[F]) -> Self
    where
        V: AsRef<str>,
        F: AsRef<str>,
    {
        let mut shader = Self {
            name: name.into(),
            vsh: Vec::new(),
            fsh: Vec::new(),
            program: None,
            uniforms: HashMap::new(),
            attributes: HashMap::new(),
            refs: RefCount::default(),
        };
        shader.set_source(vsh, fsh);
        shader
    }

    /// Replaces the source. Each fragment is trimmed and terminated with `\n`.
    ///
    /// A bound program keeps running the old source until it is released and bound again.
    pub fn set_source<V, F>(&mut self, vsh: &[V], fsh: &[F])
    where
        V: AsRef<str>,
        F: AsRef<str>,
    {
        self.vsh = normalize_lines(vsh);
        self.fsh = normalize_lines(fsh);
    }

    /// The shader name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The normalised vertex source.
    pub fn vertex_source(&self) -> &[String] {
        &self.vsh
    }

    /// The normalised fragment source.
    pub fn fragment_source(&self) -> &[String] {
        &self.fsh
    }

    /// The linked GPU program, if bound.
    pub fn program_id(&self) -> Option<ProgramId> {
        self.program
    }

    /// Returns `true` once the program is linked on the GPU.
    pub fn is_bound(&self) -> bool {
        self.program.is_some()
    }

    /// Active uniforms by base name.
    pub fn uniforms(&self) -> &HashMap<String, UniformLocation> {
        &self.uniforms
    }

    /// Active attributes and their layout locations.
    pub fn attributes(&self) -> &HashMap<String, u32> {
        &self.attributes
    }

    /// The location of an active uniform.
    pub fn uniform(&self, name: &str) -> Option<UniformLocation> {
        self.uniforms.get(name).copied()
    }

    /// The number of models sharing this shader.
    pub fn refs(&self) -> u32 {
        self.refs.get()
    }

    /// Drops one model's reference and returns `true` when none are left.
    pub(crate) fn release_ref(&mut self) -> bool {
        self.refs.release(&self.name)
    }

    /// Compiles, links and introspects the program. Does nothing if already bound.
    ///
    /// On failure no program object is left alive and the shader stays unbound.
    pub fn bind(&mut self, ctx: &dyn GraphicsContext) -> Result<(), ShaderError> {
        if self.program.is_some() {
            return Ok(());
        }
        let program = ctx
            .create_program()
            .map_err(|e| ShaderError::ProgramCreation(e.to_string()))?;
        if let Err(err) = bind_program(ctx, program, &self.vsh, &self.fsh) {
            ctx.delete_program(program);
            return Err(err);
        }

        self.uniforms = active_uniforms(ctx, program);
        self.attributes = active_attributes(ctx, program);
        self.program = Some(program);
        log::debug!(
            "Linked shader {} ({} uniforms, {} attributes)",
            self.name,
            self.uniforms.len(),
            self.attributes.len()
        );
        Ok(())
    }

    /// Deletes the GPU program and forgets the introspected tables.
    pub fn release(&mut self, ctx: &dyn GraphicsContext) {
        if let Some(program) = self.program.take() {
            ctx.delete_program(program);
        }
        self.uniforms.clear();
        self.attributes.clear();
    }
}

fn normalize_lines<S: AsRef<str>>(source: &[S]) -> Vec<String> {
    source
        .iter()
        .map(|line| format!("{}\n", line.as_ref().trim()))
        .collect()
}
