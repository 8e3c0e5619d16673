//! `tessera-preview`: draw one shape to a PNG through either backend.

mod args;
mod png_dir;

use anyhow::{Context, Result, bail};
use clap::Parser;
use image::RgbaImage;
use tessera_engine::coords::{PixelRect, Rect};
use tessera_engine::device::{GpuInit, HeadlessGpu};
use tessera_engine::logging::{LoggingConfig, init_logging};
use tessera_engine::paint::Color;
use tessera_engine::render::{RenderCtx, SpriteRenderer, TextureRegistry};
use tessera_engine::scene::{DrawList, ZIndex};
use tessera_shapes::{
    BlitterOptions, DrawOutcome, DrawTarget, RegistryTextureManager, RenderMode, ShapeBlitter,
    SpriteReference,
};

use args::Args;
use png_dir::PngDirectory;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(LoggingConfig::with_level(args.log_level()));

    let mut decoder = PngDirectory::new(&args.root);
    let reference = SpriteReference::new(args.collection, args.shape, args.texture_type, args.clut);
    let mut options = BlitterOptions {
        rotation: args.rotation,
        transparency: !args.opaque,
        ..BlitterOptions::default()
    };
    if let Some(tint) = args.tint {
        options.tint = tint;
    }

    let mut blitter = ShapeBlitter::with_options(reference, &mut decoder, options);
    if blitter.width() == 0 || blitter.height() == 0 {
        bail!(
            "shape {} not found at {}",
            blitter.descriptor(),
            decoder.path_for(blitter.descriptor()).display()
        );
    }
    log::info!(
        "shape {} is {}x{}",
        blitter.descriptor(),
        blitter.unscaled_width(),
        blitter.unscaled_height()
    );

    if let Some((w, h)) = args.size {
        blitter.rescale(w, h);
    }
    if let Some(crop) = args.crop {
        blitter.set_crop(crop);
    }

    let crop = blitter.crop();
    let (width, height) = (crop.w.max(1) as u32, crop.h.max(1) as u32);
    let dst = Rect::from(PixelRect::from_size(width as i32, height as i32));

    let mode = RenderMode::from(args.mode);
    blitter.prepare_for(mode);
    let image = match mode {
        RenderMode::Raster => render_raster(&mut blitter, &mut decoder, width, height, dst)?,
        RenderMode::Texture => render_textured(&mut blitter, &mut decoder, width, height, dst)?,
    };

    image
        .save(&args.output)
        .with_context(|| format!("write {}", args.output.display()))?;
    log::info!("wrote {} ({width}x{height}, {mode:?})", args.output.display());
    Ok(())
}

fn render_raster(
    blitter: &mut ShapeBlitter,
    decoder: &mut PngDirectory,
    width: u32,
    height: u32,
    dst: Rect,
) -> Result<RgbaImage> {
    let mut image = RgbaImage::new(width, height);
    let target = DrawTarget::Raster { decoder, surface: &mut image };
    if blitter.draw(target, dst) == DrawOutcome::Unavailable {
        bail!("raster draw of {} produced nothing", blitter.descriptor());
    }
    Ok(image)
}

fn render_textured(
    blitter: &mut ShapeBlitter,
    decoder: &mut PngDirectory,
    width: u32,
    height: u32,
    dst: Rect,
) -> Result<RgbaImage> {
    let gpu = HeadlessGpu::new_blocking(GpuInit {
        allow_fallback_adapter: true,
        ..GpuInit::default()
    })?;
    let info = gpu.adapter_info();
    log::info!("adapter: {} ({:?})", info.name, info.backend);

    let target = gpu.create_target(width, height)?;
    let ctx = RenderCtx::new(gpu.device(), gpu.queue(), target.format(), target.viewport());

    let mut registry = TextureRegistry::new();
    let mut list = DrawList::new();
    {
        let mut textures = RegistryTextureManager::new(&ctx, &mut registry, decoder);
        let target = DrawTarget::Texture { textures: &mut textures, list: &mut list, z: ZIndex(0) };
        if blitter.draw(target, dst) == DrawOutcome::Unavailable {
            bail!("no texture for {}", blitter.descriptor());
        }
    }

    let mut renderer = SpriteRenderer::new();
    let mut encoder = gpu.create_encoder();
    target.clear(&mut encoder, Color::transparent());
    {
        let mut render_target = target.render_target(&mut encoder);
        renderer.render(&ctx, &mut render_target, &mut list, &registry);
    }
    gpu.submit(encoder);

    target.read_rgba(gpu.device(), gpu.queue()).context("read back render target")
}
