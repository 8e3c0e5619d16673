//! Shape compositor.
//!
//! A [`ShapeBlitter`] wraps one shape (collection / clut / shape index) and
//! draws it as 2D art through either backend:
//! - the texture path records textured quads into a `tessera_engine::scene::DrawList`
//! - the raster path blits a cached, scaled pixel surface into an `RgbaImage`
//!
//! Asset decoding and GPU texture management are collaborators behind the
//! [`ShapeDecoder`] and [`TextureManager`] traits.

pub mod blitter;
pub mod decoder;
pub mod descriptor;
pub mod surface;
pub mod texture;

pub use blitter::{BlitterOptions, DrawOutcome, DrawTarget, Extent, RenderMode, ShapeBlitter};
pub use decoder::{DecodedShape, ShapeDecoder, ShapeLibrary};
pub use descriptor::{ShapeDescriptor, SpriteReference, TextureType};
pub use surface::{IndexedSurface, Surface};
pub use texture::{
    RegistryTextureManager, TextureClass, TextureManager, TextureMatrix, TextureSetup,
};
