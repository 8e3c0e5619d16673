//! Raster path: blits a cached, scaled surface into a CPU image.

use image::RgbaImage;
use tessera_engine::coords::PixelRect;

use crate::decoder::ShapeDecoder;
use crate::descriptor::{ShapeDescriptor, TextureType};
use crate::surface::Surface;

use super::{DrawOutcome, Extent, ShapeBlitter};

/// The scaled surface slot.
///
/// `AliasedToBase` means "draw the base surface as-is" and owns nothing, so
/// dropping the cache can never release the base twice.
#[derive(Debug, Default)]
pub(super) enum ScaledSlot {
    #[default]
    Empty,
    AliasedToBase,
    Owned(Surface),
}

/// Per-blitter raster state.
#[derive(Debug)]
pub(super) struct RasterCache {
    /// Full-resolution display surface, materialized once.
    pub base: Option<Surface>,
    pub scaled: ScaledSlot,
    pub dirty: bool,
    pub rebuilds: u64,
    warned_unavailable: bool,
}

impl Default for RasterCache {
    fn default() -> Self {
        Self {
            base: None,
            scaled: ScaledSlot::Empty,
            dirty: true,
            rebuilds: 0,
            warned_unavailable: false,
        }
    }
}

impl RasterCache {
    /// The surface to blit from, if one is built.
    #[inline]
    pub fn scaled_surface(&self) -> Option<&Surface> {
        match &self.scaled {
            ScaledSlot::Empty => None,
            ScaledSlot::AliasedToBase => self.base.as_ref(),
            ScaledSlot::Owned(s) => Some(s),
        }
    }

    pub fn release(&mut self) {
        self.scaled = ScaledSlot::Empty;
        self.base = None;
        self.dirty = true;
    }

    /// Decodes the base surface if it is not there yet.
    ///
    /// A failed decode is not remembered; the next call asks again.
    fn materialize(
        &mut self,
        decoder: &mut dyn ShapeDecoder,
        descriptor: ShapeDescriptor,
        transparency: bool,
    ) -> bool {
        if self.base.is_some() {
            return true;
        }

        let Some(decoded) = decoder.decode(descriptor) else {
            if !self.warned_unavailable {
                self.warned_unavailable = true;
                log::warn!("ShapeBlitter: shape {descriptor} unavailable, will retry");
            } else {
                log::trace!("ShapeBlitter: shape {descriptor} still unavailable");
            }
            return false;
        };

        let surface = if transparency {
            decoded.surface.to_display(true)
        } else if decoded.raw_pixels.is_some() {
            // The decoded surface borrows the raw buffer, which goes away here.
            decoded.surface.to_display(false)
        } else {
            decoded.surface
        };

        log::debug!("ShapeBlitter: materialized {descriptor} at {:?}", surface.dimensions());
        self.base = Some(surface);
        // A fresh base invalidates whatever the slot pointed at.
        self.scaled = ScaledSlot::Empty;
        true
    }

    /// Rebuilds the scaled slot from the base when dirty or empty.
    fn ensure_scaled(&mut self, native: Extent, scaled: Extent, texture_type: TextureType) -> bool {
        if !self.dirty && !matches!(self.scaled, ScaledSlot::Empty) {
            return true;
        }
        let Some(base) = self.base.as_ref() else {
            return false;
        };

        self.scaled = ScaledSlot::Empty;
        if scaled.is_empty() {
            log::trace!("ShapeBlitter: zero scaled size {scaled:?}, nothing to build");
            return false;
        }

        let resized = if scaled != native || base.dimensions() != (native.width, native.height) {
            let Some(s) = base.rescaled(scaled.width, scaled.height) else {
                return false;
            };
            Some(s)
        } else {
            None
        };

        let source = resized.as_ref().unwrap_or(base);
        let post = match texture_type {
            TextureType::Wall => Some(source.transposed()),
            TextureType::Landscape => Some(source.flipped_vertical()),
            _ => None,
        };

        self.scaled = match (post, resized) {
            (Some(post), _) => ScaledSlot::Owned(post),
            (None, Some(resized)) => ScaledSlot::Owned(resized),
            (None, None) => ScaledSlot::AliasedToBase,
        };
        self.rebuilds += 1;
        self.dirty = false;
        true
    }
}

impl ShapeBlitter {
    /// Blits the cropped shape into `surface` with the crop's top-left at
    /// `dst`'s origin.
    ///
    /// The base surface is decoded on first use and the scaled copy rebuilt
    /// after a size change. Nothing is written when the shape cannot be
    /// decoded or has no size.
    pub fn draw_raster(
        &mut self,
        decoder: &mut dyn ShapeDecoder,
        surface: &mut RgbaImage,
        dst: PixelRect,
    ) -> DrawOutcome {
        if !self.raster.materialize(decoder, self.descriptor, self.transparency) {
            return DrawOutcome::Unavailable;
        }
        if !self
            .raster
            .ensure_scaled(self.geometry.native, self.geometry.scaled, self.reference.texture_type)
        {
            return DrawOutcome::Unavailable;
        }
        let Some(scaled) = self.raster.scaled_surface() else {
            return DrawOutcome::Unavailable;
        };

        let written = scaled.blit(self.geometry.crop, surface, (dst.x, dst.y), self.transparency);
        log::trace!(
            "ShapeBlitter: {} wrote {written} px at ({}, {})",
            self.descriptor,
            dst.x,
            dst.y
        );
        DrawOutcome::Drawn
    }
}
