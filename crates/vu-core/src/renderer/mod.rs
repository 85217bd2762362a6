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

//! Shader binding, uniform resolution and the mesh data model.
//!
//! This module defines the backend-agnostic side of rendering: the
//! [`GraphicsContext`] trait every GPU call goes through, the resources that
//! hold CPU data and their GPU handles, and the [`Renderer`] that owns them.
//! A concrete context lives in the `vu-infra` crate.

pub mod api;
pub mod error;
pub mod model;
pub mod resource;
pub mod system;
pub mod traits;

// Re-export the most important traits and types for easier use.
pub use self::api::*;
pub use self::error::{MeshError, RenderError, ResourceError, ShaderError, VerifyError};
pub use self::model::{builtin, Builtin, Model, ModelTexture, MAX_TEXTURES};
pub use self::resource::{
    Animation, IndexBuffer, Mesh, Movement, ShaderProgram, Texture, VertexBuffer, VertexData,
    GLSL_ES_300,
};
pub use self::system::Renderer;
pub use self::traits::GraphicsContext;
