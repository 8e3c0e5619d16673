//! Headless GPU device management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue without a window
//! - creating offscreen render targets
//! - reading rendered pixels back to the CPU

mod gpu;
mod init;
mod target;

pub use gpu::HeadlessGpu;
pub use init::GpuInit;
pub use target::OffscreenTarget;
