//! Color model shared between the compositor and renderers.
//!
//! Colors are stored as linear premultiplied RGBA. Renderers that blend with
//! straight alpha convert at the upload boundary.

pub mod color;

pub use color::Color;
