use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tessera_engine::coords::PixelRect;
use tessera_engine::paint::Color;
use tessera_shapes::{RenderMode, TextureType};

/// Render one shape to a PNG.
///
/// Shapes are read from `<root>/<collection>/<clut>/<shape>.png`.
#[derive(Parser, Debug)]
#[command(name = "tessera-preview", version, about)]
pub struct Args {
    /// Directory holding the shape tree
    pub root: PathBuf,

    /// Collection index (0-31)
    #[arg(short, long)]
    pub collection: u8,

    /// Color table index (0-7)
    #[arg(long, default_value_t = 0)]
    pub clut: u8,

    /// Shape index within the collection
    #[arg(short, long)]
    pub shape: u8,

    /// Texture type: wall, landscape, sprite, weapon or interface
    #[arg(short = 't', long = "type", default_value = "interface")]
    pub texture_type: TextureType,

    /// Draw size as WxH (defaults to the shape's own size)
    #[arg(long, value_parser = parse_size)]
    pub size: Option<(i32, i32)>,

    /// Crop region as X,Y,W,H in scaled pixels
    #[arg(long, value_parser = parse_crop)]
    pub crop: Option<PixelRect>,

    /// Tint as RRGGBB or RRGGBBAA hex (texture mode only)
    #[arg(long, value_parser = parse_tint)]
    pub tint: Option<Color>,

    /// Rotation in degrees (texture mode only)
    #[arg(long, default_value_t = 0.0)]
    pub rotation: f32,

    /// Disable alpha compositing (raster mode only)
    #[arg(long)]
    pub opaque: bool,

    /// Backend to draw with
    #[arg(short, long, value_enum, default_value_t = Mode::Raster)]
    pub mode: Mode,

    /// Output PNG path
    #[arg(short, long, default_value = "shape.png")]
    pub output: PathBuf,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Raster,
    Texture,
}

impl From<Mode> for RenderMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Raster => RenderMode::Raster,
            Mode::Texture => RenderMode::Texture,
        }
    }
}

impl Args {
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

fn parse_size(s: &str) -> Result<(i32, i32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got `{s}`"))?;
    let w = w.trim().parse::<i32>().map_err(|e| format!("bad width `{w}`: {e}"))?;
    let h = h.trim().parse::<i32>().map_err(|e| format!("bad height `{h}`: {e}"))?;
    Ok((w, h))
}

fn parse_crop(s: &str) -> Result<PixelRect, String> {
    let parts: Vec<i32> = s
        .split(',')
        .map(|p| p.trim().parse::<i32>().map_err(|e| format!("bad crop value `{p}`: {e}")))
        .collect::<Result<_, _>>()?;
    match parts.as_slice() {
        &[x, y, w, h] => Ok(PixelRect::new(x, y, w, h)),
        _ => Err(format!("expected X,Y,W,H, got `{s}`")),
    }
}

fn parse_tint(s: &str) -> Result<Color, String> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
        return Err(format!("expected RRGGBB or RRGGBBAA, got `{s}`"));
    }
    let byte = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| format!("bad tint `{s}`: {e}"))
    };
    let a = if hex.len() == 8 { byte(6)? } else { u8::MAX };
    Ok(Color::from_srgb_u8(byte(0)?, byte(2)?, byte(4)?, a))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_parses() {
        assert_eq!(parse_size("64x32"), Ok((64, 32)));
        assert_eq!(parse_size("8X8"), Ok((8, 8)));
        assert!(parse_size("64").is_err());
        assert!(parse_size("ax2").is_err());
    }

    #[test]
    fn crop_parses() {
        assert_eq!(parse_crop("10,0,90,50"), Ok(PixelRect::new(10, 0, 90, 50)));
        assert!(parse_crop("1,2,3").is_err());
    }

    #[test]
    fn tint_parses_hex() {
        assert_eq!(parse_tint("ffffff"), Ok(Color::white()));
        assert_eq!(parse_tint("#ff000080"), Ok(Color::from_srgb_u8(255, 0, 0, 128)));
        assert!(parse_tint("fff").is_err());
        assert!(parse_tint("gg0000").is_err());
    }

    #[test]
    fn args_parse() {
        let args = Args::try_parse_from([
            "tessera-preview", "shapes", "-c", "3", "-s", "12", "--type", "wall", "--size", "32x64",
            "-m", "texture",
        ])
        .unwrap();
        assert_eq!(args.collection, 3);
        assert_eq!(args.shape, 12);
        assert_eq!(args.texture_type, TextureType::Wall);
        assert_eq!(args.size, Some((32, 64)));
        assert_eq!(args.mode, Mode::Texture);
        assert_eq!(args.tint, None);
        assert_eq!(args.log_level(), log::LevelFilter::Info);
    }
}
