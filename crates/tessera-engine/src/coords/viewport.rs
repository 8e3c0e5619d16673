/// Viewport size in pixels.
///
/// Renderers use this as the basis for converting pixel positions to NDC in
/// shaders.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Viewport covering a render target of `width` x `height` texels.
    #[inline]
    pub fn from_target_size(width: u32, height: u32) -> Self {
        Self::new(width as f32, height as f32)
    }

    /// Size uploaded to shaders; never zero so the NDC divide stays finite.
    #[inline]
    pub fn shader_size(self) -> [f32; 2] {
        [self.width.max(1.0), self.height.max(1.0)]
    }
}
