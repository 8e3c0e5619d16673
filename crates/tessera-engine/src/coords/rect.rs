use super::{PixelRect, Vec2};

/// Axis-aligned rectangle in pixels (top-left origin).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        self.origin + self.size
    }

    #[inline]
    pub fn center(self) -> Vec2 {
        self.origin + self.size * 0.5
    }

    /// Corners in fan order: top-left, top-right, bottom-right, bottom-left.
    #[inline]
    pub fn corners(self) -> [Vec2; 4] {
        let min = self.origin;
        let max = self.max();
        [
            min,
            Vec2::new(max.x, min.y),
            max,
            Vec2::new(min.x, max.y),
        ]
    }

    /// Rounds to the nearest integer pixel rectangle.
    #[inline]
    pub fn round_to_pixels(self) -> PixelRect {
        PixelRect::new(
            self.origin.x.round() as i32,
            self.origin.y.round() as i32,
            self.size.x.round() as i32,
            self.size.y.round() as i32,
        )
    }
}

impl From<PixelRect> for Rect {
    #[inline]
    fn from(r: PixelRect) -> Self {
        Rect::new(r.x as f32, r.y as f32, r.w as f32, r.h as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x: f32, y: f32, w: f32, h: f32) -> Rect {
        Rect::new(x, y, w, h)
    }

    // ── corners ───────────────────────────────────────────────────────────

    #[test]
    fn corners_follow_fan_order() {
        let c = r(10.0, 20.0, 30.0, 40.0).corners();
        assert_eq!(c[0], Vec2::new(10.0, 20.0));
        assert_eq!(c[1], Vec2::new(40.0, 20.0));
        assert_eq!(c[2], Vec2::new(40.0, 60.0));
        assert_eq!(c[3], Vec2::new(10.0, 60.0));
    }

    #[test]
    fn center_is_midpoint() {
        assert_eq!(r(0.0, 0.0, 10.0, 4.0).center(), Vec2::new(5.0, 2.0));
    }

    // ── pixel conversion ──────────────────────────────────────────────────

    #[test]
    fn round_to_pixels_rounds_each_field() {
        assert_eq!(r(1.4, 1.6, 9.5, 2.2).round_to_pixels(), PixelRect::new(1, 2, 10, 2));
    }
}
