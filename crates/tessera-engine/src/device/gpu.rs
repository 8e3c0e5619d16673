use anyhow::{Context, Result};

use super::{GpuInit, OffscreenTarget};

/// Owns wgpu core objects for rendering without a window surface.
pub struct HeadlessGpu {
    /// Selected adapter; kept for diagnostics.
    adapter: wgpu::Adapter,

    /// Logical device.
    device: wgpu::Device,

    /// Command queue.
    queue: wgpu::Queue,

    /// Format used for offscreen targets.
    target_format: wgpu::TextureFormat,
}

impl HeadlessGpu {
    /// Creates a headless GPU context.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(init: GpuInit) -> Result<Self> {
        let GpuInit {
            power_preference,
            allow_fallback_adapter,
            required_features,
            required_limits,
            target_format,
        } = init;

        // Readback assumes 4-byte RGBA texels.
        anyhow::ensure!(
            target_format.has_color_aspect() && target_format.block_copy_size(None) == Some(4),
            "unsupported offscreen target format {target_format:?}"
        );

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference,
                compatible_surface: None,
                force_fallback_adapter: allow_fallback_adapter,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("tessera headless device"),
                required_features,
                required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        log::info!("using GPU adapter: {}", adapter.get_info().name);

        Ok(Self {
            adapter,
            device,
            queue,
            target_format,
        })
    }

    /// Blocking wrapper around [`HeadlessGpu::new`].
    pub fn new_blocking(init: GpuInit) -> Result<Self> {
        pollster::block_on(Self::new(init))
    }

    /// Returns adapter info (name, backend, driver).
    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    /// Returns a reference to the logical device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns a reference to the command queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Returns the offscreen target format.
    pub fn target_format(&self) -> wgpu::TextureFormat {
        self.target_format
    }

    /// Creates an offscreen color target of `width` x `height` texels.
    pub fn create_target(&self, width: u32, height: u32) -> Result<OffscreenTarget> {
        OffscreenTarget::new(&self.device, self.target_format, width, height)
    }

    /// Creates a command encoder for one batch of offscreen work.
    pub fn create_encoder(&self) -> wgpu::CommandEncoder {
        self.device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("tessera offscreen encoder"),
            })
    }

    /// Submits recorded commands.
    pub fn submit(&self, encoder: wgpu::CommandEncoder) {
        self.queue.submit(std::iter::once(encoder.finish()));
    }
}
