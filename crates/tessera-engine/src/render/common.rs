//! Shared GPU types and helpers for the renderers.

use bytemuck::{Pod, Zeroable};

use crate::coords::Viewport;
use crate::scene::BlendMode;

// ── blend ─────────────────────────────────────────────────────────────────

/// Blend state for a sprite `BlendMode`.
///
/// Sprite textures carry straight alpha, so color uses `SrcAlpha` factors.
pub(super) fn blend_state(mode: BlendMode) -> wgpu::BlendState {
    let color = match mode {
        BlendMode::Alpha => wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        BlendMode::Additive => wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        },
    };
    wgpu::BlendState {
        color,
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

// ── viewport uniform ──────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct ViewportUniform {
    pub viewport: [f32; 2],
    pub _pad: [f32; 2], // 16-byte alignment
}

impl ViewportUniform {
    #[inline]
    pub(super) fn new(viewport: Viewport) -> Self {
        Self { viewport: viewport.shader_size(), _pad: [0.0; 2] }
    }
}

/// Minimum binding size of the viewport uniform buffer.
///
/// `ViewportUniform` is 16 bytes, so this is non-zero by construction.
pub(super) fn viewport_ubo_min_binding_size() -> std::num::NonZeroU64 {
    std::num::NonZeroU64::new(std::mem::size_of::<ViewportUniform>() as u64)
        .expect("ViewportUniform has non-zero size by construction")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn additive_keeps_destination() {
        let b = blend_state(BlendMode::Additive);
        assert_eq!(b.color.dst_factor, wgpu::BlendFactor::One);
    }
}
