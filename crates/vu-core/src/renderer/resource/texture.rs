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

//! RGBA textures sampled by model shaders.

use super::RefCount;
use crate::renderer::api::TextureId;
use crate::renderer::error::ResourceError;
use crate::renderer::traits::GraphicsContext;
use image::RgbaImage;

/// An RGBA8 image and, once bound, its mipmapped GPU texture.
///
/// The CPU pixels are kept so a released texture can be uploaded again. They can
/// be dropped with [`Texture::free_image`]; the texture then stays usable only
/// until it is released.
#[derive(Debug)]
pub struct Texture {
    name: String,
    image: Option<RgbaImage>,
    width: u32,
    height: u32,
    texture: Option<TextureId>,
    repeat: bool,
    needs_upload: bool,
    pub(crate) refs: RefCount,
}

impl Texture {
    /// Creates an unbound texture that clamps at its edges.
    pub fn new(name: impl Into<String>, image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            name: name.into(),
            image: Some(image),
            width,
            height,
            texture: None,
            repeat: false,
            needs_upload: true,
            refs: RefCount::default(),
        }
    }

    /// The texture name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Width and height in pixels of the last image set.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The CPU pixels, if not yet freed.
    pub fn image(&self) -> Option<&RgbaImage> {
        self.image.as_ref()
    }

    /// Replaces the pixels. They are uploaded on the next bind.
    pub fn set_image(&mut self, image: RgbaImage) {
        (self.width, self.height) = image.dimensions();
        self.image = Some(image);
        self.needs_upload = true;
    }

    /// Drops the CPU pixels.
    pub fn free_image(&mut self) {
        self.image = None;
    }

    /// The GPU texture, if bound.
    pub fn texture_id(&self) -> Option<TextureId> {
        self.texture
    }

    /// Returns `true` once the texture exists on the GPU.
    pub fn is_bound(&self) -> bool {
        self.texture.is_some()
    }

    /// Returns `true` if the texture wraps instead of clamping.
    pub fn repeats(&self) -> bool {
        self.repeat
    }

    /// The number of models sharing this texture.
    pub fn refs(&self) -> u32 {
        self.refs.get()
    }

    /// Drops one model's reference and returns `true` when none are left.
    pub(crate) fn release_ref(&mut self) -> bool {
        self.refs.release(&self.name)
    }

    /// Uploads the image if it changed, building mipmaps up to `max_level`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Texture`] if there are no pixels to upload for an
    /// unbound texture or the context reports an error after upload.
    pub fn bind(&mut self, ctx: &dyn GraphicsContext, max_level: i32) -> Result<(), ResourceError> {
        if self.texture.is_some() && !self.needs_upload {
            return Ok(());
        }
        let Some(image) = self.image.as_ref() else {
            if self.texture.is_some() {
                return Ok(());
            }
            return Err(self.error("no image data to upload"));
        };

        let code = ctx.error();
        if code != 0 {
            log::warn!(
                "Pending graphics error 0x{code:X} before binding texture {}",
                self.name
            );
        }

        let texture = match self.texture {
            Some(texture) => texture,
            None => ctx.create_texture().map_err(|e| ResourceError::Texture {
                texture: self.name.clone(),
                details: e.to_string(),
            })?,
        };
        self.texture = Some(texture);
        ctx.bind_texture(Some(texture));
        ctx.upload_rgba8(image.width(), image.height(), image.as_raw());
        ctx.generate_mipmap();
        ctx.set_texture_params(self.repeat, max_level);

        let code = ctx.error();
        if code != 0 {
            return Err(self.error(&format!("error code 0x{code:X} after upload")));
        }
        self.needs_upload = false;
        log::debug!("Uploaded texture {} ({}x{})", self.name, self.width, self.height);
        Ok(())
    }

    /// Switches between repeating and clamping, updating the GPU texture if bound.
    pub fn set_repeat(&mut self, ctx: &dyn GraphicsContext, repeat: bool, max_level: i32) {
        self.repeat = repeat;
        if let Some(texture) = self.texture {
            ctx.bind_texture(Some(texture));
            ctx.set_texture_params(repeat, max_level);
        }
    }

    /// Deletes the GPU texture. The texture can only be bound again if pixels remain.
    pub fn release(&mut self, ctx: &dyn GraphicsContext) {
        if let Some(texture) = self.texture.take() {
            ctx.delete_texture(texture);
        }
        self.needs_upload = true;
    }

    fn error(&self, details: &str) -> ResourceError {
        ResourceError::Texture {
            texture: self.name.clone(),
            details: details.to_string(),
        }
    }
}
