use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use image::RgbaImage;

use crate::scene::TextureId;

use super::RenderCtx;

/// Texture generations, unique across all registries.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

struct RegisteredTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    generation: u64,
}

/// GPU textures addressed by [`TextureId`].
///
/// Textures are straight-alpha `Rgba8UnormSrgb`. Each entry carries a
/// generation that changes whenever its view is replaced, so renderers can
/// cache bind groups per `(id, generation)`.
#[derive(Default)]
pub struct TextureRegistry {
    textures: HashMap<TextureId, RegisteredTexture>,
}

impl TextureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn contains(&self, id: TextureId) -> bool {
        self.textures.contains_key(&id)
    }

    /// Returns the view and generation for `id`.
    #[inline]
    pub fn view(&self, id: TextureId) -> Option<(&wgpu::TextureView, u64)> {
        self.textures.get(&id).map(|t| (&t.view, t.generation))
    }

    /// Uploads `image` under `id`.
    ///
    /// Same-sized replacements are written in place and keep their
    /// generation; anything else allocates a new texture.
    pub fn upload_rgba(&mut self, ctx: &RenderCtx<'_>, id: TextureId, image: &RgbaImage) {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            log::warn!("TextureRegistry: refusing zero-sized upload for {id:?}");
            return;
        }

        let reuse = self
            .textures
            .get(&id)
            .is_some_and(|t| t.texture.width() == width && t.texture.height() == height);

        if !reuse {
            let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
                label: Some("tessera sprite texture"),
                size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            let generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
            self.textures.insert(id, RegisteredTexture { texture, view, generation });
        }

        let Some(entry) = self.textures.get(&id) else { return };
        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &entry.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
        );
    }
}
