//! GPU rendering subsystem.
//!
//! Renderers consume `scene` draw streams and issue GPU commands via wgpu.
//! Each renderer owns its pipelines and buffers; textures live in a
//! [`TextureRegistry`] shared by callers.
//!
//! Convention:
//! - CPU geometry is in pixels (top-left origin, +Y down).
//! - Vertex shaders convert to NDC using a viewport uniform.

mod common;
mod ctx;
mod sprite;
mod texture;

pub use ctx::{RenderCtx, RenderTarget};
pub use sprite::SpriteRenderer;
pub use texture::TextureRegistry;
