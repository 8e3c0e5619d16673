//! Shape blitter: one shape, two backends.
//!
//! - texture path (`draw_textured`): records quads into a `DrawList`
//! - raster path (`draw_raster`): blits a cached surface into an `RgbaImage`
//!
//! Size and crop are shared by both paths. The raster cache is rebuilt
//! lazily after a size change; GPU textures are never cached here.

mod crop;
mod raster_path;
mod texture_path;

use image::RgbaImage;
use tessera_engine::coords::{PixelRect, Rect};
use tessera_engine::paint::Color;
use tessera_engine::scene::{DrawList, ZIndex};

use crate::decoder::ShapeDecoder;
use crate::descriptor::{ShapeDescriptor, SpriteReference, TextureType};
use crate::surface::Surface;
use crate::texture::TextureManager;

use crop::CropState;
use raster_path::{RasterCache, ScaledSlot};

pub use crop::Extent;

/// Result of a draw call. Failures are soft: nothing was drawn this time.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DrawOutcome {
    Drawn,
    /// The asset or texture could not be produced.
    Unavailable,
}

/// Which backend the host renders with.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum RenderMode {
    #[default]
    Texture,
    Raster,
}

/// Destination of a [`ShapeBlitter::draw`] call, one variant per backend.
pub enum DrawTarget<'a> {
    Texture {
        textures: &'a mut dyn TextureManager,
        list: &'a mut DrawList,
        z: ZIndex,
    },
    Raster {
        decoder: &'a mut dyn ShapeDecoder,
        surface: &'a mut RgbaImage,
    },
}

impl DrawTarget<'_> {
    #[inline]
    pub fn mode(&self) -> RenderMode {
        match self {
            DrawTarget::Texture { .. } => RenderMode::Texture,
            DrawTarget::Raster { .. } => RenderMode::Raster,
        }
    }
}

/// Per-blitter settings applied at construction.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BlitterOptions {
    /// Texture-path color multiplier.
    pub tint: Color,
    /// Texture-path rotation in degrees about the destination center.
    pub rotation: f32,
    /// Raster-path alpha compositing.
    pub transparency: bool,
}

impl Default for BlitterOptions {
    fn default() -> Self {
        Self { tint: Color::white(), rotation: 0.0, transparency: true }
    }
}

/// Draws one shape at any size, cropped, through either backend.
pub struct ShapeBlitter {
    reference: SpriteReference,
    descriptor: ShapeDescriptor,
    geometry: CropState,
    tint: Color,
    rotation: f32,
    transparency: bool,
    raster: RasterCache,
}

impl ShapeBlitter {
    /// Creates a blitter with default options.
    ///
    /// The shape is decoded once to learn its size and then discarded. If the
    /// decode fails the blitter has zero size and every draw reports
    /// [`DrawOutcome::Unavailable`] until the shape can be decoded.
    pub fn new(reference: SpriteReference, decoder: &mut dyn ShapeDecoder) -> Self {
        Self::with_options(reference, decoder, BlitterOptions::default())
    }

    pub fn with_options(
        reference: SpriteReference,
        decoder: &mut dyn ShapeDecoder,
        options: BlitterOptions,
    ) -> Self {
        let descriptor = reference.descriptor();
        let native = match decoder.decode(descriptor) {
            Some(decoded) => {
                let (w, h) = decoded.surface.dimensions();
                Extent::new(w, h)
            }
            None => {
                log::debug!("ShapeBlitter: could not decode {descriptor}, starting at zero size");
                Extent::default()
            }
        };

        Self {
            reference,
            descriptor,
            geometry: CropState::new(native),
            tint: options.tint,
            rotation: options.rotation,
            transparency: options.transparency,
            raster: RasterCache::default(),
        }
    }

    // ── accessors ─────────────────────────────────────────────────────────

    /// Current (scaled) width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.geometry.scaled.width
    }

    /// Current (scaled) height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.geometry.scaled.height
    }

    #[inline]
    pub fn unscaled_width(&self) -> u32 {
        self.geometry.native.width
    }

    #[inline]
    pub fn unscaled_height(&self) -> u32 {
        self.geometry.native.height
    }

    /// Crop region in scaled space.
    #[inline]
    pub fn crop(&self) -> PixelRect {
        self.geometry.crop
    }

    #[inline]
    pub fn descriptor(&self) -> ShapeDescriptor {
        self.descriptor
    }

    #[inline]
    pub fn reference(&self) -> SpriteReference {
        self.reference
    }

    #[inline]
    pub fn texture_type(&self) -> TextureType {
        self.reference.texture_type
    }

    #[inline]
    pub fn tint(&self) -> Color {
        self.tint
    }

    #[inline]
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    #[inline]
    pub fn transparency(&self) -> bool {
        self.transparency
    }

    // ── setters ───────────────────────────────────────────────────────────

    /// Sets the crop region, in scaled space.
    pub fn set_crop(&mut self, crop: PixelRect) {
        self.geometry.crop = crop;
    }

    pub fn set_tint(&mut self, tint: Color) {
        self.tint = tint;
    }

    pub fn set_rotation(&mut self, degrees: f32) {
        self.rotation = degrees;
    }

    /// Enables alpha compositing on the raster path.
    ///
    /// Only affects how the base surface is materialized; a base that already
    /// exists is kept until [`ShapeBlitter::release_surfaces`].
    pub fn set_transparency(&mut self, enabled: bool) {
        self.transparency = enabled;
    }

    // ── sizing ────────────────────────────────────────────────────────────

    /// Changes the drawn size, re-proportioning the crop.
    ///
    /// Resizing to the current size is a no-op and keeps the raster cache.
    pub fn rescale(&mut self, width: i32, height: i32) {
        if self.geometry.rescale(width, height) {
            self.raster.dirty = true;
        }
    }

    // ── drawing ───────────────────────────────────────────────────────────

    /// Draws through whichever backend `target` names.
    ///
    /// The raster path uses `dst` rounded to whole pixels.
    pub fn draw(&mut self, target: DrawTarget<'_>, dst: Rect) -> DrawOutcome {
        match target {
            DrawTarget::Texture { textures, list, z } => self.draw_textured(textures, list, z, dst),
            DrawTarget::Raster { decoder, surface } => {
                self.draw_raster(decoder, surface, dst.round_to_pixels())
            }
        }
    }

    /// Drops both raster surfaces. The next raster draw decodes again.
    pub fn release_surfaces(&mut self) {
        self.raster.release();
    }

    /// Call when the host switches backends. Leaving the raster path frees
    /// the raster surfaces.
    pub fn prepare_for(&mut self, mode: RenderMode) {
        if mode == RenderMode::Texture {
            self.release_surfaces();
        }
    }

    // ── raster cache introspection ────────────────────────────────────────

    /// Number of times the scaled raster surface was rebuilt.
    #[inline]
    pub fn raster_rebuilds(&self) -> u64 {
        self.raster.rebuilds
    }

    #[inline]
    pub fn base_surface(&self) -> Option<&Surface> {
        self.raster.base.as_ref()
    }

    /// The surface the raster path blits from, if built.
    #[inline]
    pub fn scaled_surface(&self) -> Option<&Surface> {
        self.raster.scaled_surface()
    }

    /// Whether the scaled slot points at the base surface instead of a copy.
    #[inline]
    pub fn scaled_is_aliased(&self) -> bool {
        matches!(self.raster.scaled, ScaledSlot::AliasedToBase)
    }
}
