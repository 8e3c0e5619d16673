//! CPU pixel surfaces for the raster path.
//!
//! Shapes decode either to straight-alpha RGBA or to palette indices. All
//! transforms here return new surfaces; inputs are never modified.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use tessera_engine::coords::PixelRect;

/// Palette-indexed pixels with an RGBA color table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    palette: Vec<[u8; 4]>,
}

impl IndexedSurface {
    /// Returns `None` if `pixels` does not hold exactly `width * height` entries.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>, palette: Vec<[u8; 4]>) -> Option<Self> {
        (pixels.len() == width as usize * height as usize)
            .then_some(Self { width, height, pixels, palette })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn palette(&self) -> &[[u8; 4]] {
        &self.palette
    }

    #[inline]
    pub fn index_at(&self, x: u32, y: u32) -> u8 {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Color of `index`; indices past the palette read as transparent black.
    #[inline]
    pub fn color(&self, index: u8) -> [u8; 4] {
        self.palette.get(index as usize).copied().unwrap_or([0; 4])
    }

    fn from_fn(
        width: u32,
        height: u32,
        palette: Vec<[u8; 4]>,
        mut f: impl FnMut(u32, u32) -> u8,
    ) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self { width, height, pixels, palette }
    }
}

/// A decoded or derived shape bitmap.
#[derive(Debug, Clone, PartialEq)]
pub enum Surface {
    /// Straight-alpha RGBA.
    Rgba(RgbaImage),
    Indexed(IndexedSurface),
}

impl Surface {
    #[inline]
    pub fn width(&self) -> u32 {
        match self {
            Surface::Rgba(img) => img.width(),
            Surface::Indexed(s) => s.width,
        }
    }

    #[inline]
    pub fn height(&self) -> u32 {
        match self {
            Surface::Rgba(img) => img.height(),
            Surface::Indexed(s) => s.height,
        }
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    /// Straight RGBA of one pixel. Caller keeps `x`/`y` in bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        match self {
            Surface::Rgba(img) => img.get_pixel(x, y).0,
            Surface::Indexed(s) => s.color(s.index_at(x, y)),
        }
    }

    /// Returns the RGBA buffer when this surface is already RGBA.
    pub fn into_rgba(self) -> Option<RgbaImage> {
        match self {
            Surface::Rgba(img) => Some(img),
            Surface::Indexed(_) => None,
        }
    }

    /// Converts to the display format used for blitting.
    ///
    /// With `keep_alpha` the per-pixel alpha survives; otherwise every pixel
    /// becomes opaque.
    pub fn to_display(&self, keep_alpha: bool) -> Surface {
        let (w, h) = self.dimensions();
        Surface::Rgba(RgbaImage::from_fn(w, h, |x, y| {
            let mut p = self.pixel(x, y);
            if !keep_alpha {
                p[3] = u8::MAX;
            }
            Rgba(p)
        }))
    }

    /// Resamples to `width` x `height`.
    ///
    /// RGBA uses a Catmull-Rom filter. Indices cannot be blended, so indexed
    /// surfaces use nearest-neighbour. Returns `None` for a zero target size.
    pub fn rescaled(&self, width: u32, height: u32) -> Option<Surface> {
        if width == 0 || height == 0 {
            return None;
        }
        if self.dimensions() == (width, height) {
            return Some(self.clone());
        }

        Some(match self {
            Surface::Rgba(img) => {
                Surface::Rgba(imageops::resize(img, width, height, FilterType::CatmullRom))
            }
            Surface::Indexed(s) => {
                let (sw, sh) = (s.width as u64, s.height as u64);
                Surface::Indexed(IndexedSurface::from_fn(width, height, s.palette.clone(), |x, y| {
                    let sx = (x as u64 * sw / width as u64) as u32;
                    let sy = (y as u64 * sh / height as u64) as u32;
                    s.index_at(sx, sy)
                }))
            }
        })
    }

    /// Swaps rows and columns: pixel `(x, y)` moves to `(y, x)`.
    ///
    /// Wall art is stored column-major, so this is the rotation that makes it
    /// read upright. Width and height swap.
    pub fn transposed(&self) -> Surface {
        let (w, h) = self.dimensions();
        match self {
            Surface::Rgba(img) => {
                Surface::Rgba(RgbaImage::from_fn(h, w, |x, y| *img.get_pixel(y, x)))
            }
            Surface::Indexed(s) => {
                let palette = s.palette.clone();
                Surface::Indexed(IndexedSurface::from_fn(h, w, palette, |x, y| s.index_at(y, x)))
            }
        }
    }

    /// Reverses row order. The palette of an indexed surface is kept.
    pub fn flipped_vertical(&self) -> Surface {
        match self {
            Surface::Rgba(img) => Surface::Rgba(imageops::flip_vertical(img)),
            Surface::Indexed(s) => {
                let h = s.height;
                Surface::Indexed(IndexedSurface::from_fn(s.width, h, s.palette.clone(), |x, y| {
                    s.index_at(x, h - 1 - y)
                }))
            }
        }
    }

    /// Copies `src` (in this surface's space) onto `dst` with its top-left at `at`.
    ///
    /// Both rectangles are clipped: `src` to this surface, the placed result to
    /// `dst`. With `blend` the copy is a straight-alpha "over"; without it
    /// pixels are written opaque. Returns the number of pixels written.
    pub fn blit(&self, src: PixelRect, dst: &mut RgbaImage, at: (i32, i32), blend: bool) -> usize {
        let (w, h) = self.dimensions();
        let Some(src_clip) = src.intersect(PixelRect::from_size(w as i32, h as i32)) else {
            return 0;
        };

        // Placement runs in i64: `at` plus the crop offset may leave i32.
        let px = at.0 as i64 + (src_clip.x as i64 - src.x as i64);
        let py = at.1 as i64 + (src_clip.y as i64 - src.y as i64);
        let x0 = px.max(0);
        let y0 = py.max(0);
        let x1 = (px + src_clip.w as i64).min(dst.width() as i64);
        let y1 = (py + src_clip.h as i64).min(dst.height() as i64);
        if x1 <= x0 || y1 <= y0 {
            return 0;
        }

        let sx0 = src_clip.x as i64 + (x0 - px);
        let sy0 = src_clip.y as i64 + (y0 - py);

        for row in 0..y1 - y0 {
            for col in 0..x1 - x0 {
                let s = self.pixel((sx0 + col) as u32, (sy0 + row) as u32);
                let d = dst.get_pixel_mut((x0 + col) as u32, (y0 + row) as u32);
                d.0 = if blend { blend_over(s, d.0) } else { [s[0], s[1], s[2], u8::MAX] };
            }
        }

        ((x1 - x0) * (y1 - y0)) as usize
    }
}

/// Straight-alpha source-over.
fn blend_over(src: [u8; 4], dst: [u8; 4]) -> [u8; 4] {
    match src[3] {
        u8::MAX => return src,
        0 => return dst,
        _ => {}
    }

    let sa = src[3] as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);

    let channel = |s: u8, d: u8| -> u8 {
        let c = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
        c.round().clamp(0.0, 255.0) as u8
    };

    [
        channel(src[0], dst[0]),
        channel(src[1], dst[1]),
        channel(src[2], dst[2]),
        (out_a * 255.0).round() as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 3x2 RGBA where red = x, green = y.
    fn coords_rgba() -> Surface {
        Surface::Rgba(RgbaImage::from_fn(3, 2, |x, y| Rgba([x as u8, y as u8, 0, 255])))
    }

    fn indexed_2x2() -> Surface {
        let palette = vec![[0, 0, 0, 0], [255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 128]];
        Surface::Indexed(IndexedSurface::new(2, 2, vec![0, 1, 2, 3], palette).unwrap())
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn indexed_rejects_wrong_pixel_count() {
        assert!(IndexedSurface::new(2, 2, vec![0; 3], vec![]).is_none());
    }

    #[test]
    fn out_of_palette_index_is_transparent() {
        let s = IndexedSurface::new(1, 1, vec![9], vec![[1, 2, 3, 4]]).unwrap();
        assert_eq!(s.color(9), [0; 4]);
    }

    // ── display conversion ────────────────────────────────────────────────

    #[test]
    fn display_with_alpha_expands_palette() {
        let d = indexed_2x2().to_display(true);
        assert_eq!(d.pixel(0, 0), [0, 0, 0, 0]);
        assert_eq!(d.pixel(1, 1), [0, 0, 255, 128]);
    }

    #[test]
    fn opaque_display_forces_alpha() {
        let d = indexed_2x2().to_display(false);
        assert_eq!(d.pixel(0, 0), [0, 0, 0, 255]);
        assert_eq!(d.pixel(1, 1), [0, 0, 255, 255]);
    }

    // ── transforms ────────────────────────────────────────────────────────

    #[test]
    fn transpose_swaps_axes() {
        let t = coords_rgba().transposed();
        assert_eq!(t.dimensions(), (2, 3));
        // Pixel that was at (2, 1) now sits at (1, 2).
        assert_eq!(t.pixel(1, 2), [2, 1, 0, 255]);
    }

    #[test]
    fn transpose_indexed_keeps_palette() {
        let t = indexed_2x2().transposed();
        let Surface::Indexed(s) = &t else { panic!("expected indexed") };
        assert_eq!(s.index_at(1, 0), 2);
        assert_eq!(s.palette().len(), 4);
    }

    #[test]
    fn flip_reverses_rows() {
        let f = coords_rgba().flipped_vertical();
        assert_eq!(f.pixel(2, 0), [2, 1, 0, 255]);
        assert_eq!(f.pixel(2, 1), [2, 0, 0, 255]);
    }

    #[test]
    fn flip_indexed_keeps_palette() {
        let f = indexed_2x2().flipped_vertical();
        let Surface::Indexed(s) = &f else { panic!("expected indexed") };
        assert_eq!((s.index_at(0, 0), s.index_at(1, 0)), (2, 3));
        assert_eq!(s.palette(), indexed_2x2_palette());
    }

    fn indexed_2x2_palette() -> &'static [[u8; 4]] {
        &[[0, 0, 0, 0], [255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 128]]
    }

    #[test]
    fn rescale_to_zero_is_none() {
        assert!(coords_rgba().rescaled(0, 4).is_none());
    }

    #[test]
    fn rescale_indexed_is_nearest() {
        let s = indexed_2x2().rescaled(4, 4).unwrap();
        assert_eq!(s.dimensions(), (4, 4));
        assert_eq!(s.pixel(1, 1), [0, 0, 0, 0]);
        assert_eq!(s.pixel(3, 3), [0, 0, 255, 128]);
    }

    #[test]
    fn rescale_rgba_changes_dimensions() {
        assert_eq!(coords_rgba().rescaled(6, 5).unwrap().dimensions(), (6, 5));
    }

    // ── blit ──────────────────────────────────────────────────────────────

    #[test]
    fn blit_copies_sub_rect_at_origin() {
        let mut dst = RgbaImage::new(4, 4);
        let n = coords_rgba().blit(PixelRect::new(1, 0, 2, 2), &mut dst, (2, 1), false);
        assert_eq!(n, 4);
        assert_eq!(dst.get_pixel(2, 1).0, [1, 0, 0, 255]);
        assert_eq!(dst.get_pixel(3, 2).0, [2, 1, 0, 255]);
        assert_eq!(dst.get_pixel(0, 0).0, [0, 0, 0, 0]);
    }

    #[test]
    fn blit_clips_to_destination() {
        let mut dst = RgbaImage::new(2, 2);
        let n = coords_rgba().blit(PixelRect::new(0, 0, 3, 2), &mut dst, (1, 1), false);
        assert_eq!(n, 1);
        assert_eq!(dst.get_pixel(1, 1).0, [0, 0, 0, 255]);
    }

    #[test]
    fn blit_clips_source_overhang() {
        let mut dst = RgbaImage::new(4, 4);
        let n = coords_rgba().blit(PixelRect::new(-1, 0, 2, 1), &mut dst, (0, 0), false);
        assert_eq!(n, 1);
        // The overhanging source column is skipped, shifting the copy right.
        assert_eq!(dst.get_pixel(1, 0).0, [0, 0, 0, 255]);
        assert_eq!(dst.get_pixel(0, 0).0, [0, 0, 0, 0]);
    }

    #[test]
    fn blit_far_off_destination_writes_nothing() {
        let mut dst = RgbaImage::new(4, 4);
        let before = dst.clone();
        let whole = PixelRect::from_size(3, 2);
        assert_eq!(coords_rgba().blit(whole, &mut dst, (i32::MAX - 1, 0), true), 0);
        assert_eq!(coords_rgba().blit(whole, &mut dst, (0, i32::MIN), true), 0);
        assert_eq!(dst, before);
    }

    #[test]
    fn blit_extreme_crop_does_not_overflow() {
        let mut dst = RgbaImage::new(4, 4);
        // Crop starting far left of the surface: the visible part lands far right.
        let left = PixelRect::new(i32::MIN, 0, i32::MAX, 2);
        let n = coords_rgba().blit(left, &mut dst, (0, 0), false);
        assert_eq!(n, 0);
        let n = coords_rgba().blit(PixelRect::new(1, 0, i32::MAX, 1), &mut dst, (0, 0), false);
        assert_eq!(n, 2);
        assert_eq!(dst.get_pixel(0, 0).0, [1, 0, 0, 255]);
    }

    #[test]
    fn blend_skips_transparent_source() {
        let mut dst = RgbaImage::from_pixel(2, 2, Rgba([9, 9, 9, 255]));
        indexed_2x2().blit(PixelRect::from_size(2, 2), &mut dst, (0, 0), true);
        assert_eq!(dst.get_pixel(0, 0).0, [9, 9, 9, 255]);
        assert_eq!(dst.get_pixel(1, 0).0, [255, 0, 0, 255]);
    }

    #[test]
    fn blend_half_alpha_over_opaque() {
        assert_eq!(blend_over([0, 0, 255, 128], [255, 0, 0, 255]), [127, 0, 128, 255]);
    }
}
