//! Tessera engine crate.
//!
//! This crate owns the geometry, GPU and draw-stream pieces used by the shape
//! compositor and its tools.

pub mod device;
pub mod logging;
pub mod coords;
pub mod paint;
pub mod render;
pub mod scene;
