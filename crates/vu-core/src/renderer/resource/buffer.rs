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

//! CPU-side vertex and index storage and its upload to GPU buffer objects.

use crate::renderer::api::{BufferId, BufferTarget, BufferUsage, DataKind};
use crate::renderer::error::MeshError;
use crate::renderer::traits::GraphicsContext;

/// The contents of a [`VertexBuffer`]. A buffer holds either floats or bytes, never both.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum VertexData {
    /// Nothing has been set yet.
    #[default]
    Empty,
    /// 32-bit float elements.
    Float(Vec<f32>),
    /// Unsigned byte elements.
    Byte(Vec<u8>),
}

impl VertexData {
    /// The element kind, `None` for [`VertexData::Empty`].
    pub fn kind(&self) -> Option<DataKind> {
        match self {
            VertexData::Empty => None,
            VertexData::Float(_) => Some(DataKind::Float),
            VertexData::Byte(_) => Some(DataKind::UnsignedByte),
        }
    }

    /// The number of elements.
    pub fn len(&self) -> usize {
        match self {
            VertexData::Empty => 0,
            VertexData::Float(v) => v.len(),
            VertexData::Byte(v) => v.len(),
        }
    }

    /// Returns `true` if there are no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size in bytes: 4 per float, 1 per byte.
    pub fn byte_size(&self) -> usize {
        self.as_bytes().len()
    }

    /// The raw bytes as they are uploaded.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            VertexData::Empty => &[],
            VertexData::Float(v) => bytemuck::cast_slice(v),
            VertexData::Byte(v) => v,
        }
    }
}

impl From<Vec<f32>> for VertexData {
    fn from(v: Vec<f32>) -> Self {
        VertexData::Float(v)
    }
}

impl From<&[f32]> for VertexData {
    fn from(v: &[f32]) -> Self {
        VertexData::Float(v.to_vec())
    }
}

impl<const N: usize> From<[f32; N]> for VertexData {
    fn from(v: [f32; N]) -> Self {
        VertexData::Float(v.to_vec())
    }
}

impl From<Vec<u8>> for VertexData {
    fn from(v: Vec<u8>) -> Self {
        VertexData::Byte(v)
    }
}

impl From<&[u8]> for VertexData {
    fn from(v: &[u8]) -> Self {
        VertexData::Byte(v.to_vec())
    }
}

impl<const N: usize> From<[u8; N]> for VertexData {
    fn from(v: [u8; N]) -> Self {
        VertexData::Byte(v.to_vec())
    }
}

/// Per-vertex attribute data bound to one shader layout location.
#[derive(Debug, Clone)]
pub struct VertexBuffer {
    slot: u32,
    span: usize,
    usage: BufferUsage,
    normalize: bool,
    kind: Option<DataKind>,
    data: VertexData,
    needs_upload: bool,
    buffer: Option<BufferId>,
    allocated: usize,
}

impl VertexBuffer {
    /// Creates an empty buffer for `slot` holding `span` elements per vertex.
    pub fn new(slot: u32, span: usize, usage: BufferUsage, normalize: bool) -> Self {
        Self {
            slot,
            span,
            usage,
            normalize,
            kind: None,
            data: VertexData::Empty,
            needs_upload: true,
            buffer: None,
            allocated: 0,
        }
    }

    /// Replaces the contents and marks the buffer for upload.
    ///
    /// The first non-empty data fixes the element kind. Data of the other kind is
    /// rejected with a warning and `false` is returned; the buffer is unchanged.
    pub fn set(&mut self, data: VertexData) -> bool {
        match (self.kind, data.kind()) {
            (Some(fixed), Some(new)) if fixed != new => {
                log::warn!(
                    "Vertex buffer at slot {} holds {:?} data, ignoring {:?} data",
                    self.slot,
                    fixed,
                    new
                );
                return false;
            }
            (None, Some(new)) => self.kind = Some(new),
            _ => {}
        }
        self.data = data;
        self.needs_upload = true;
        true
    }

    /// The layout location this buffer feeds.
    pub fn slot(&self) -> u32 {
        self.slot
    }

    /// Elements per vertex.
    pub fn span(&self) -> usize {
        self.span
    }

    /// The usage hint passed to the backend.
    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// Whether byte data is normalised when read by the shader.
    pub fn normalize(&self) -> bool {
        self.normalize
    }

    /// The element kind fixed by the first non-empty data, if any.
    pub fn kind(&self) -> Option<DataKind> {
        self.kind
    }

    /// The current contents.
    pub fn data(&self) -> &VertexData {
        &self.data
    }

    /// `len / span`, or `0` when the span is zero.
    pub fn vertex_count(&self) -> usize {
        if self.span == 0 {
            return 0;
        }
        self.data.len() / self.span
    }

    /// Size of the data in bytes.
    pub fn byte_size(&self) -> usize {
        self.data.byte_size()
    }

    /// Returns `true` if the contents changed since the last upload.
    pub fn needs_upload(&self) -> bool {
        self.needs_upload
    }

    /// The GPU buffer, if one has been created.
    pub fn buffer_id(&self) -> Option<BufferId> {
        self.buffer
    }

    /// Uploads the data if it changed and points the attribute slot at it.
    ///
    /// Must be called with the owning mesh's vertex array bound.
    pub(crate) fn upload(
        &mut self,
        ctx: &dyn GraphicsContext,
        mesh: &str,
    ) -> Result<(), MeshError> {
        if !self.needs_upload {
            return Ok(());
        }
        let Some(kind) = self.data.kind() else {
            self.needs_upload = false;
            return Ok(());
        };
        let buffer = match self.buffer {
            Some(buffer) => buffer,
            None => {
                let buffer = ctx.create_buffer().map_err(|e| MeshError::Allocation {
                    mesh: mesh.to_string(),
                    details: e.to_string(),
                })?;
                self.buffer = Some(buffer);
                buffer
            }
        };

        ctx.bind_buffer(BufferTarget::Array, Some(buffer));
        let bytes = self.data.as_bytes();
        match (self.usage, kind) {
            (BufferUsage::Dynamic, DataKind::Float) => {
                // Orphan the old storage so the driver need not wait on pending draws.
                let size = bytes.len().max(self.allocated);
                ctx.buffer_storage(BufferTarget::Array, size, self.usage);
                ctx.buffer_sub_data(BufferTarget::Array, 0, bytes);
                self.allocated = size;
            }
            _ => {
                ctx.buffer_data(BufferTarget::Array, bytes, self.usage);
                self.allocated = bytes.len();
            }
        }

        let normalize = kind == DataKind::UnsignedByte && self.normalize;
        ctx.vertex_attrib_pointer(self.slot, self.span as i32, kind, normalize);
        ctx.enable_vertex_attrib_array(self.slot);
        self.needs_upload = false;
        Ok(())
    }

    /// Deletes the GPU buffer and marks the data for re-upload.
    pub(crate) fn release(&mut self, ctx: &dyn GraphicsContext) {
        if let Some(buffer) = self.buffer.take() {
            ctx.delete_buffer(buffer);
        }
        self.allocated = 0;
        self.needs_upload = true;
    }
}

/// 16-bit triangle indices into slot 0's vertices.
#[derive(Debug, Clone)]
pub struct IndexBuffer {
    usage: BufferUsage,
    data: Vec<u16>,
    needs_upload: bool,
    buffer: Option<BufferId>,
}

impl IndexBuffer {
    /// Creates an empty index buffer.
    pub fn new(usage: BufferUsage) -> Self {
        Self {
            usage,
            data: Vec::new(),
            needs_upload: true,
            buffer: None,
        }
    }

    /// Replaces the indices and marks the buffer for upload.
    pub fn set(&mut self, indices: &[u16]) {
        self.data.clear();
        self.data.extend_from_slice(indices);
        self.needs_upload = true;
    }

    /// The indices.
    pub fn indices(&self) -> &[u16] {
        &self.data
    }

    /// The number of indices.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if there are no indices.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Size in bytes, 2 per index.
    pub fn byte_size(&self) -> usize {
        self.data.len() * std::mem::size_of::<u16>()
    }

    /// The usage hint passed to the backend.
    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// Returns `true` if the indices changed since the last upload.
    pub fn needs_upload(&self) -> bool {
        self.needs_upload
    }

    /// The GPU buffer, if one has been created.
    pub fn buffer_id(&self) -> Option<BufferId> {
        self.buffer
    }

    pub(crate) fn upload(
        &mut self,
        ctx: &dyn GraphicsContext,
        mesh: &str,
    ) -> Result<(), MeshError> {
        if !self.needs_upload || self.data.is_empty() {
            return Ok(());
        }
        let buffer = match self.buffer {
            Some(buffer) => buffer,
            None => {
                let buffer = ctx.create_buffer().map_err(|e| MeshError::Allocation {
                    mesh: mesh.to_string(),
                    details: e.to_string(),
                })?;
                self.buffer = Some(buffer);
                buffer
            }
        };
        ctx.bind_buffer(BufferTarget::ElementArray, Some(buffer));
        ctx.buffer_data(
            BufferTarget::ElementArray,
            bytemuck::cast_slice(&self.data),
            self.usage,
        );
        self.needs_upload = false;
        Ok(())
    }

    pub(crate) fn release(&mut self, ctx: &dyn GraphicsContext) {
        if let Some(buffer) = self.buffer.take() {
            ctx.delete_buffer(buffer);
        }
        self.needs_upload = true;
    }
}
