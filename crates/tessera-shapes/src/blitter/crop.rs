use tessera_engine::coords::PixelRect;

/// Width and height in whole pixels.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn swapped(self) -> Self {
        Self { width: self.height, height: self.width }
    }
}

/// Native size, scaled size and crop of one shape.
///
/// The crop lives in scaled space and follows the scaled size around.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(super) struct CropState {
    pub native: Extent,
    pub scaled: Extent,
    pub crop: PixelRect,
}

impl CropState {
    pub fn new(native: Extent) -> Self {
        Self {
            native,
            scaled: native,
            crop: PixelRect::from_size(native.width as i32, native.height as i32),
        }
    }

    /// Changes the scaled size, re-proportioning the crop on every axis that
    /// changed. Negative sizes clamp to zero. Returns whether anything changed.
    pub fn rescale(&mut self, width: i32, height: i32) -> bool {
        let width = width.max(0) as u32;
        let height = height.max(0) as u32;
        let mut changed = false;

        if width != self.scaled.width {
            let (x, w) = rescale_axis(self.crop.x, self.crop.w, self.scaled.width, width);
            (self.crop.x, self.crop.w) = (x, w);
            self.scaled.width = width;
            changed = true;
        }
        if height != self.scaled.height {
            let (y, h) = rescale_axis(self.crop.y, self.crop.h, self.scaled.height, height);
            (self.crop.y, self.crop.h) = (y, h);
            self.scaled.height = height;
            changed = true;
        }

        changed
    }
}

/// `pos * new / old`, `len * new / old`, truncating. A zero `old` or `new`
/// leaves the axis alone, so scaling through zero and back keeps the crop.
#[inline]
fn rescale_axis(pos: i32, len: i32, old: u32, new: u32) -> (i32, i32) {
    if old == 0 || new == 0 {
        return (pos, len);
    }
    let scale = |v: i32| (v as i64 * new as i64 / old as i64) as i32;
    (scale(pos), scale(len))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(w: u32, h: u32) -> CropState {
        CropState::new(Extent::new(w, h))
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn starts_uncropped_at_native_size() {
        let s = state(64, 32);
        assert_eq!(s.scaled, Extent::new(64, 32));
        assert_eq!(s.crop, PixelRect::new(0, 0, 64, 32));
    }

    // ── rescale ───────────────────────────────────────────────────────────

    #[test]
    fn crop_scales_with_size() {
        let mut s = state(100, 50);
        s.crop = PixelRect::new(10, 5, 80, 40);
        assert!(s.rescale(200, 25));
        assert_eq!(s.scaled, Extent::new(200, 25));
        assert_eq!(s.crop, PixelRect::new(20, 2, 160, 20));
    }

    #[test]
    fn proportions_survive_within_rounding() {
        let mut s = state(97, 61);
        s.crop = PixelRect::new(13, 7, 71, 45);
        let before = s;
        for (w, h) in [(37, 200), (500, 3), (97, 61), (1, 1), (250, 250)] {
            let prev = s;
            s.rescale(w, h);
            let fx = s.crop.x as f64 / s.scaled.width as f64;
            let px = prev.crop.x as f64 / prev.scaled.width as f64;
            // One pixel of truncation per step, measured in the new size.
            assert!((fx - px).abs() <= 1.0 / s.scaled.width as f64 + 1e-9);
            let fh = s.crop.h as f64 / s.scaled.height as f64;
            let ph = prev.crop.h as f64 / prev.scaled.height as f64;
            assert!((fh - ph).abs() <= 1.0 / s.scaled.height as f64 + 1e-9);
        }
        assert_ne!(s, before);
    }

    #[test]
    fn same_size_is_not_a_change() {
        let mut s = state(40, 40);
        s.crop = PixelRect::new(3, 4, 30, 20);
        assert!(!s.rescale(40, 40));
        assert_eq!(s.crop, PixelRect::new(3, 4, 30, 20));
    }

    #[test]
    fn only_changed_axis_is_touched() {
        let mut s = state(10, 10);
        s.crop = PixelRect::new(1, 1, 3, 3);
        assert!(s.rescale(10, 30));
        assert_eq!(s.crop, PixelRect::new(1, 3, 3, 9));
    }

    #[test]
    fn zero_old_size_leaves_crop() {
        let mut s = state(0, 0);
        assert!(s.rescale(50, 20));
        assert_eq!(s.crop, PixelRect::new(0, 0, 0, 0));
        assert_eq!(s.scaled, Extent::new(50, 20));
    }

    #[test]
    fn negative_size_clamps_to_zero() {
        let mut s = state(8, 8);
        assert!(s.rescale(-5, 8));
        assert_eq!(s.scaled, Extent::new(0, 8));
        assert_eq!(s.crop, PixelRect::new(0, 0, 8, 8));
    }

    #[test]
    fn crop_survives_round_trip_through_zero() {
        let mut s = state(100, 50);
        s.crop = PixelRect::new(10, 0, 90, 50);
        assert!(s.rescale(0, 50));
        assert_eq!(s.scaled, Extent::new(0, 50));
        assert!(s.rescale(100, 50));
        assert_eq!(s.crop, PixelRect::new(10, 0, 90, 50));
    }

    #[test]
    fn large_values_do_not_overflow() {
        let mut s = state(3, 3);
        s.crop = PixelRect::new(2, 2, 3, 3);
        s.rescale(i32::MAX, i32::MAX);
        assert_eq!(s.crop.w, i32::MAX);
        assert_eq!(s.crop.x, (2i64 * i32::MAX as i64 / 3) as i32);
    }
}
