//! Coordinate and geometry types shared by the renderers and the compositor.
//!
//! Canonical CPU space:
//! - Pixels, origin top-left
//! - +X right, +Y down
//!
//! `Rect`/`Vec2` are float geometry for the GPU path. `PixelRect` is the
//! integer rectangle used for crop regions and software blits.

mod pixel_rect;
mod rect;
mod vec2;
mod viewport;

pub use pixel_rect::PixelRect;
pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::Viewport;
