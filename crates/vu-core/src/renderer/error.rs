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

//! Defines the hierarchy of error types for the rendering subsystem.

use crate::renderer::api::ShaderStage;
use std::fmt;

/// An error raised while turning shader source into a linked GPU program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderError {
    /// The vertex stage failed to compile.
    VertexCompile {
        /// The driver's info log, empty when the driver reported none.
        log: String,
    },
    /// The fragment stage failed to compile.
    FragmentCompile {
        /// The driver's info log, empty when the driver reported none.
        log: String,
    },
    /// Both stages compiled but the program failed to link.
    Link {
        /// The driver's program info log, empty when the driver reported none.
        log: String,
    },
    /// One of the two stages was given no source at all.
    EmptySource {
        /// The stage with the missing source.
        stage: ShaderStage,
    },
    /// The backend refused to allocate a program or shader object.
    ProgramCreation(String),
}

impl ShaderError {
    /// The driver log attached to a compile or link failure, if any.
    pub fn log(&self) -> Option<&str> {
        match self {
            ShaderError::VertexCompile { log }
            | ShaderError::FragmentCompile { log }
            | ShaderError::Link { log } => Some(log.as_str()),
            _ => None,
        }
    }
}

fn write_with_log(f: &mut fmt::Formatter<'_>, headline: &str, log: &str) -> fmt::Result {
    if log.is_empty() {
        write!(f, "{headline}")
    } else {
        write!(f, "{headline}\n{log}")
    }
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::VertexCompile { log } => {
                write_with_log(f, "Vertex shader compile failed", log)
            }
            ShaderError::FragmentCompile { log } => {
                write_with_log(f, "Fragment shader compile failed", log)
            }
            ShaderError::Link { log } => write_with_log(f, "Shader link failed", log),
            ShaderError::EmptySource { stage } => {
                write!(f, "No source provided for the {stage} shader")
            }
            ShaderError::ProgramCreation(msg) => {
                write!(f, "Failed to create shader program: {msg}")
            }
        }
    }
}

impl std::error::Error for ShaderError {}

/// An error related to a mesh's CPU data or its upload to the GPU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// The mesh failed its consistency check: slot 0 is missing, empty or not float
    /// data, or another populated slot disagrees on the vertex count.
    Inconsistent {
        /// The mesh name.
        mesh: String,
    },
    /// The backend reported an error code around a buffer upload.
    Upload {
        /// The mesh name.
        mesh: String,
        /// The backend error code.
        code: u32,
    },
    /// The backend refused to allocate a vertex array or buffer object.
    Allocation {
        /// The mesh name.
        mesh: String,
        /// The backend's description of the failure.
        details: String,
    },
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshError::Inconsistent { mesh } => {
                write!(f, "Mesh '{mesh}' has inconsistent vertex data")
            }
            MeshError::Upload { mesh, code } => {
                write!(f, "Failed to upload mesh '{mesh}': error code 0x{code:X}")
            }
            MeshError::Allocation { mesh, details } => {
                write!(f, "Failed to allocate GPU objects for mesh '{mesh}': {details}")
            }
        }
    }
}

impl std::error::Error for MeshError {}

/// A model is not renderable with its current shader, mesh and uniform values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    /// The model's shader is not in the renderer.
    NoShader,
    /// The shader reads vertex attributes but the model has no mesh.
    NoMesh {
        /// The shader name.
        shader: String,
        /// The number of attributes the shader expects.
        expected: usize,
    },
    /// An active uniform has neither a built-in supplier nor a user value.
    MissingUniform {
        /// The uniform name.
        uniform: String,
        /// The shader name.
        shader: String,
    },
    /// An active attribute's location has no matching mesh slot.
    MissingAttribute {
        /// The attribute name.
        attribute: String,
        /// The shader name.
        shader: String,
        /// The mesh name.
        mesh: String,
    },
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyError::NoShader => write!(f, "Model has no shader"),
            VerifyError::NoMesh { shader, expected } => {
                write!(
                    f,
                    "No mesh data for shader '{shader}' expecting {expected} attribute(s)"
                )
            }
            VerifyError::MissingUniform { uniform, shader } => {
                write!(f, "Missing uniform '{uniform}' for shader '{shader}'")
            }
            VerifyError::MissingAttribute {
                attribute,
                shader,
                mesh,
            } => {
                write!(
                    f,
                    "Missing attribute '{attribute}' for shader '{shader}' in mesh '{mesh}'"
                )
            }
        }
    }
}

impl std::error::Error for VerifyError {}

/// An error related to the creation or use of a GPU resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// A shader-specific error occurred.
    Shader(ShaderError),
    /// A mesh-specific error occurred.
    Mesh(MeshError),
    /// A texture could not be uploaded.
    Texture {
        /// The texture name.
        texture: String,
        /// The backend's description of the failure.
        details: String,
    },
    /// The handle used to reference a resource does not exist in its table.
    InvalidHandle,
    /// A model already samples the maximum number of textures.
    TextureLimit(usize),
    /// An error originating from the specific graphics backend implementation.
    Backend(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::Shader(err) => write!(f, "Shader resource error: {err}"),
            ResourceError::Mesh(err) => write!(f, "Mesh resource error: {err}"),
            ResourceError::Texture { texture, details } => {
                write!(f, "Texture '{texture}' could not be bound: {details}")
            }
            ResourceError::InvalidHandle => write!(f, "Invalid resource handle."),
            ResourceError::TextureLimit(limit) => {
                write!(f, "A model can sample at most {limit} textures")
            }
            ResourceError::Backend(msg) => write!(f, "Backend-specific resource error: {msg}"),
        }
    }
}

impl std::error::Error for ResourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResourceError::Shader(err) => Some(err),
            ResourceError::Mesh(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ShaderError> for ResourceError {
    fn from(err: ShaderError) -> Self {
        ResourceError::Shader(err)
    }
}

impl From<MeshError> for ResourceError {
    fn from(err: MeshError) -> Self {
        ResourceError::Mesh(err)
    }
}

/// A high-level error surfaced by the [`Renderer`](crate::renderer::Renderer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The context is older than OpenGL 3.2 or OpenGL ES 3.0.
    UnsupportedVersion(String),
    /// An error occurred while managing a GPU resource.
    Resource(ResourceError),
    /// A model failed verification.
    Verify(VerifyError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::UnsupportedVersion(version) => {
                write!(
                    f,
                    "Unsupported graphics context {version}: need OpenGL 3.2 or OpenGL ES 3.0"
                )
            }
            RenderError::Resource(err) => write!(f, "Graphics resource operation failed: {err}"),
            RenderError::Verify(err) => write!(f, "Model verification failed: {err}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Resource(err) => Some(err),
            RenderError::Verify(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResourceError> for RenderError {
    fn from(err: ResourceError) -> Self {
        RenderError::Resource(err)
    }
}

impl From<ShaderError> for RenderError {
    fn from(err: ShaderError) -> Self {
        RenderError::Resource(err.into())
    }
}

impl From<MeshError> for RenderError {
    fn from(err: MeshError) -> Self {
        RenderError::Resource(err.into())
    }
}

impl From<VerifyError> for RenderError {
    fn from(err: VerifyError) -> Self {
        RenderError::Verify(err)
    }
}
