//! Shape identity.

use std::fmt;
use std::str::FromStr;

/// Number of addressable collections (5 bits).
pub const MAXIMUM_COLLECTIONS: u8 = 32;
/// Number of color tables per collection (3 bits).
pub const MAXIMUM_CLUTS: u8 = 8;

/// Packed shape identity: `((collection | clut << 5) << 8) | shape`.
///
/// The descriptor is the key for every asset and texture lookup.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ShapeDescriptor(u16);

impl ShapeDescriptor {
    /// Packs a descriptor. Collection and clut are masked into range.
    #[inline]
    pub const fn new(collection: u8, clut: u8, shape: u8) -> Self {
        let coll = (collection & 0x1f) as u16 | (((clut & 0x07) as u16) << 5);
        Self((coll << 8) | shape as u16)
    }

    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }

    #[inline]
    pub const fn collection(self) -> u8 {
        ((self.0 >> 8) & 0x1f) as u8
    }

    #[inline]
    pub const fn clut(self) -> u8 {
        ((self.0 >> 13) & 0x07) as u8
    }

    #[inline]
    pub const fn shape(self) -> u8 {
        (self.0 & 0xff) as u8
    }
}

impl fmt::Display for ShapeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}", self.collection(), self.clut(), self.shape())
    }
}

/// What kind of art a shape is. Decides texture class and post-processing.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TextureType {
    Wall,
    Landscape,
    Sprite,
    WeaponInHand,
    Interface,
}

/// Error returned when parsing an unknown texture type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTextureTypeError {
    pub input: String,
}

impl fmt::Display for ParseTextureTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown texture type `{}` (expected wall, landscape, sprite, weapon or interface)",
            self.input
        )
    }
}

impl std::error::Error for ParseTextureTypeError {}

impl FromStr for TextureType {
    type Err = ParseTextureTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wall" => Ok(TextureType::Wall),
            "landscape" => Ok(TextureType::Landscape),
            "sprite" => Ok(TextureType::Sprite),
            "weapon" | "weapon-in-hand" => Ok(TextureType::WeaponInHand),
            "interface" => Ok(TextureType::Interface),
            _ => Err(ParseTextureTypeError { input: s.to_owned() }),
        }
    }
}

/// Immutable reference to one shape as the blitter sees it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct SpriteReference {
    pub collection: u8,
    pub texture_index: u8,
    pub texture_type: TextureType,
    pub clut: u8,
}

impl SpriteReference {
    #[inline]
    pub const fn new(
        collection: u8,
        texture_index: u8,
        texture_type: TextureType,
        clut: u8,
    ) -> Self {
        Self { collection, texture_index, texture_type, clut }
    }

    #[inline]
    pub const fn descriptor(&self) -> ShapeDescriptor {
        ShapeDescriptor::new(self.collection, self.clut, self.texture_index)
    }
}
