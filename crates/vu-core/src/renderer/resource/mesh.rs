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

//! A set of vertex buffers keyed by layout location plus optional triangle indices.

use super::buffer::{IndexBuffer, VertexBuffer, VertexData};
use super::RefCount;
use crate::renderer::api::{BufferUsage, DataKind, VertexArrayId};
use crate::renderer::error::MeshError;
use crate::renderer::traits::GraphicsContext;
use std::collections::BTreeMap;

/// Vertex attribute streams and face indices for one drawable shape.
///
/// Slot 0 holds float positions and defines the vertex count; every other
/// populated slot must describe the same number of vertices. A mesh that breaks
/// this is still storable but [`Mesh::is_valid`] reports `false` and
/// [`Mesh::bind`] refuses it.
#[derive(Debug)]
pub struct Mesh {
    name: String,
    slots: BTreeMap<u32, VertexBuffer>,
    faces: Option<IndexBuffer>,
    vao: Option<VertexArrayId>,
    pub(crate) refs: RefCount,
}

impl Mesh {
    /// Creates an empty, unbound mesh.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slots: BTreeMap::new(),
            faces: None,
            vao: None,
            refs: RefCount::default(),
        }
    }

    /// The mesh name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declares the attribute stream at `slot`. Does nothing if the slot already exists.
    pub fn init_data(
        &mut self,
        slot: u32,
        span: usize,
        usage: BufferUsage,
        normalize: bool,
    ) -> &mut Self {
        self.slots
            .entry(slot)
            .or_insert_with(|| VertexBuffer::new(slot, span, usage, normalize));
        self
    }

    /// Replaces the data at `slot`. Ignored for slots not declared by [`Mesh::init_data`].
    pub fn set_data(&mut self, slot: u32, data: impl Into<VertexData>) -> &mut Self {
        if let Some(vb) = self.slots.get_mut(&slot) {
            vb.set(data.into());
        }
        self
    }

    /// Declares the index buffer. Does nothing if it already exists.
    pub fn init_faces(&mut self, usage: BufferUsage) -> &mut Self {
        self.faces.get_or_insert_with(|| IndexBuffer::new(usage));
        self
    }

    /// Replaces the triangle indices. Ignored until [`Mesh::init_faces`] is called.
    pub fn set_faces(&mut self, indices: &[u16]) -> &mut Self {
        if let Some(faces) = self.faces.as_mut() {
            faces.set(indices);
        }
        self
    }

    /// Returns `true` if slot 0 holds float vertices and every populated slot agrees
    /// on the vertex count.
    pub fn is_valid(&self) -> bool {
        let Some(positions) = self.slots.get(&0) else {
            return false;
        };
        if positions.kind() != Some(DataKind::Float) || positions.data().is_empty() {
            return false;
        }
        let count = positions.vertex_count();
        self.slots
            .values()
            .filter(|vb| !vb.data().is_empty())
            .all(|vb| vb.vertex_count() == count)
    }

    /// Returns `true` if an attribute stream was declared at `slot`.
    pub fn has_slot(&self, slot: u32) -> bool {
        self.slots.contains_key(&slot)
    }

    /// The attribute stream at `slot`, if declared.
    pub fn slot(&self, slot: u32) -> Option<&VertexBuffer> {
        self.slots.get(&slot)
    }

    /// The declared layout locations in ascending order.
    pub fn slots(&self) -> impl Iterator<Item = u32> + '_ {
        self.slots.keys().copied()
    }

    /// The index buffer, if declared.
    pub fn faces(&self) -> Option<&IndexBuffer> {
        self.faces.as_ref()
    }

    /// Total bytes of vertex and index data.
    pub fn size(&self) -> usize {
        let vertices: usize = self.slots.values().map(VertexBuffer::byte_size).sum();
        vertices + self.faces.as_ref().map_or(0, IndexBuffer::byte_size)
    }

    /// The number of vertices in slot 0, `0` unless it holds float data.
    pub fn vertex_count(&self) -> usize {
        match self.slots.get(&0) {
            Some(vb) if vb.kind() == Some(DataKind::Float) => vb.vertex_count(),
            _ => 0,
        }
    }

    /// The number of indices, `0` without an index buffer.
    pub fn index_count(&self) -> usize {
        self.faces.as_ref().map_or(0, IndexBuffer::len)
    }

    /// Returns `true` once a vertex array exists on the GPU.
    pub fn is_bound(&self) -> bool {
        self.vao.is_some()
    }

    /// The GPU vertex array, if bound.
    pub fn vertex_array(&self) -> Option<VertexArrayId> {
        self.vao
    }

    /// Returns `true` if any buffer changed since it was last uploaded.
    pub fn needs_upload(&self) -> bool {
        self.slots.values().any(VertexBuffer::needs_upload)
            || self.faces.as_ref().is_some_and(IndexBuffer::needs_upload)
    }

    /// The number of models sharing this mesh.
    pub fn refs(&self) -> u32 {
        self.refs.get()
    }

    /// Drops one model's reference and returns `true` when none are left.
    pub(crate) fn release_ref(&mut self) -> bool {
        self.refs.release(&self.name)
    }

    /// Binds the mesh's vertex array, creating it and uploading changed buffers first.
    ///
    /// Leaves the vertex array bound on success.
    ///
    /// # Errors
    ///
    /// * [`MeshError::Inconsistent`] if [`Mesh::is_valid`] is `false`.
    /// * [`MeshError::Upload`] if the context reports an error before or during upload.
    /// * [`MeshError::Allocation`] if a GPU object cannot be created.
    pub fn bind(&mut self, ctx: &dyn GraphicsContext) -> Result<(), MeshError> {
        if !self.is_valid() {
            return Err(MeshError::Inconsistent {
                mesh: self.name.clone(),
            });
        }
        if self.vao.is_some() && !self.needs_upload() {
            ctx.bind_vertex_array(self.vao);
            return Ok(());
        }

        let code = ctx.error();
        if code != 0 {
            log::warn!(
                "Pending graphics error 0x{code:X} before binding mesh {}",
                self.name
            );
            return Err(self.upload_error(code));
        }

        let vao = match self.vao {
            Some(vao) => vao,
            None => {
                let vao = ctx.create_vertex_array().map_err(|e| MeshError::Allocation {
                    mesh: self.name.clone(),
                    details: e.to_string(),
                })?;
                self.vao = Some(vao);
                vao
            }
        };
        ctx.bind_vertex_array(Some(vao));

        for vb in self.slots.values_mut() {
            vb.upload(ctx, &self.name)?;
        }
        self.check(ctx)?;

        if let Some(faces) = self.faces.as_mut() {
            faces.upload(ctx, &self.name)?;
        }
        self.check(ctx)?;

        log::debug!(
            "Uploaded mesh {} ({} vertices, {} bytes)",
            self.name,
            self.vertex_count(),
            self.size()
        );
        Ok(())
    }

    /// Deletes every GPU buffer and the vertex array, keeping the CPU data.
    ///
    /// The mesh is left unbound and will be fully re-uploaded on the next bind.
    pub fn release(&mut self, ctx: &dyn GraphicsContext) {
        for vb in self.slots.values_mut() {
            vb.release(ctx);
        }
        if let Some(faces) = self.faces.as_mut() {
            faces.release(ctx);
        }
        if let Some(vao) = self.vao.take() {
            ctx.delete_vertex_array(vao);
        }
    }

    fn check(&self, ctx: &dyn GraphicsContext) -> Result<(), MeshError> {
        match ctx.error() {
            0 => Ok(()),
            code => Err(self.upload_error(code)),
        }
    }

    fn upload_error(&self, code: u32) -> MeshError {
        MeshError::Upload {
            mesh: self.name.clone(),
            code,
        }
    }
}
