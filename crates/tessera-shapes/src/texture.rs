//! Texture-manager contract for the texture path.

use tessera_engine::render::{RenderCtx, TextureRegistry};
use tessera_engine::scene::TextureId;

use crate::decoder::ShapeDecoder;
use crate::descriptor::{ShapeDescriptor, TextureType};

/// Texture classes known to the texture manager.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TextureClass {
    Wall,
    Landscape,
    Inhabitant,
    WeaponsInHand,
}

impl From<TextureType> for TextureClass {
    fn from(t: TextureType) -> Self {
        match t {
            TextureType::Wall => TextureClass::Wall,
            TextureType::Landscape => TextureClass::Landscape,
            TextureType::Sprite => TextureClass::Inhabitant,
            // Interface art is uploaded like weapons-in-hand.
            TextureType::WeaponInHand | TextureType::Interface => TextureClass::WeaponsInHand,
        }
    }
}

/// 2x3 affine transform applied to texture coordinates.
///
/// `u' = m[0][0]*u + m[0][1]*v + m[0][2]`, `v' = m[1][0]*u + m[1][1]*v + m[1][2]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextureMatrix {
    pub m: [[f64; 3]; 2],
}

impl Default for TextureMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl TextureMatrix {
    pub const IDENTITY: Self = Self { m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] };

    /// Exact 90° counter-clockwise rotation.
    pub const QUARTER_TURN: Self = Self { m: [[0.0, -1.0, 0.0], [1.0, 0.0, 0.0]] };

    #[inline]
    pub const fn scale(su: f64, sv: f64) -> Self {
        Self { m: [[su, 0.0, 0.0], [0.0, sv, 0.0]] }
    }

    /// Landscape art is stored rotated: quarter turn after a vertical flip.
    /// Net effect is `(u, v) -> (v, u)`.
    #[inline]
    pub fn landscape() -> Self {
        Self::QUARTER_TURN.then_after(Self::scale(1.0, -1.0))
    }

    /// `self ∘ inner`: applies `inner` first, then `self`.
    pub fn then_after(self, inner: TextureMatrix) -> TextureMatrix {
        let a = self.m;
        let b = inner.m;
        let mut m = [[0.0; 3]; 2];
        for (row, out) in m.iter_mut().enumerate() {
            out[0] = a[row][0] * b[0][0] + a[row][1] * b[1][0];
            out[1] = a[row][0] * b[0][1] + a[row][1] * b[1][1];
            out[2] = a[row][0] * b[0][2] + a[row][1] * b[1][2] + a[row][2];
        }
        TextureMatrix { m }
    }

    #[inline]
    pub fn apply(&self, uv: [f64; 2]) -> [f64; 2] {
        let m = &self.m;
        [
            m[0][0] * uv[0] + m[0][1] * uv[1] + m[0][2],
            m[1][0] * uv[0] + m[1][1] * uv[1] + m[1][2],
        ]
    }
}

/// What the texture manager resolved for one shape.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextureSetup {
    pub texture: TextureId,
    /// Glow layer drawn additively over the base quad.
    pub glow: Option<TextureId>,
    pub u_scale: f64,
    pub v_scale: f64,
    pub u_offset: f64,
    pub v_offset: f64,
    /// Texture-coordinate transform the manager wants applied.
    pub matrix: TextureMatrix,
}

impl TextureSetup {
    /// Setup for a texture that holds exactly one shape.
    #[inline]
    pub fn whole(texture: TextureId) -> Self {
        Self {
            texture,
            glow: None,
            u_scale: 1.0,
            v_scale: 1.0,
            u_offset: 0.0,
            v_offset: 0.0,
            matrix: TextureMatrix::IDENTITY,
        }
    }
}

/// Resolves shapes to GPU textures.
///
/// The manager owns the textures. Blitters call `setup` on every draw and
/// never keep the result, so evictions and reloads are always picked up.
/// `None` means the texture is unavailable this frame.
pub trait TextureManager {
    fn setup(&mut self, descriptor: ShapeDescriptor, class: TextureClass) -> Option<TextureSetup>;
}

/// Texture manager that uploads decoded shapes into a [`TextureRegistry`].
///
/// Built per frame around the frame's render context. Each shape is uploaded
/// the first time its descriptor/class pair is requested and becomes one
/// whole texture.
pub struct RegistryTextureManager<'a, 'r> {
    ctx: &'a RenderCtx<'r>,
    registry: &'a mut TextureRegistry,
    decoder: &'a mut dyn ShapeDecoder,
}

impl<'a, 'r> RegistryTextureManager<'a, 'r> {
    pub fn new(
        ctx: &'a RenderCtx<'r>,
        registry: &'a mut TextureRegistry,
        decoder: &'a mut dyn ShapeDecoder,
    ) -> Self {
        Self { ctx, registry, decoder }
    }

    /// Registry id for a descriptor/class pair.
    pub fn texture_id(descriptor: ShapeDescriptor, class: TextureClass) -> TextureId {
        let class_bits: u64 = match class {
            TextureClass::Wall => 0,
            TextureClass::Landscape => 1,
            TextureClass::Inhabitant => 2,
            TextureClass::WeaponsInHand => 3,
        };
        TextureId((class_bits << 16) | descriptor.raw() as u64)
    }
}

impl TextureManager for RegistryTextureManager<'_, '_> {
    fn setup(&mut self, descriptor: ShapeDescriptor, class: TextureClass) -> Option<TextureSetup> {
        let id = Self::texture_id(descriptor, class);
        if !self.registry.contains(id) {
            let decoded = self.decoder.decode(descriptor)?;
            let rgba = decoded.surface.to_display(true).into_rgba()?;
            self.registry.upload_rgba(self.ctx, id, &rgba);
            log::debug!("uploaded shape {descriptor} as {class:?} texture {id:?}");
        }
        // A zero-sized shape is refused by the registry.
        self.registry.contains(id).then(|| TextureSetup::whole(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_mapping() {
        assert_eq!(TextureClass::from(TextureType::Wall), TextureClass::Wall);
        assert_eq!(TextureClass::from(TextureType::Landscape), TextureClass::Landscape);
        assert_eq!(TextureClass::from(TextureType::Sprite), TextureClass::Inhabitant);
        assert_eq!(TextureClass::from(TextureType::WeaponInHand), TextureClass::WeaponsInHand);
        assert_eq!(TextureClass::from(TextureType::Interface), TextureClass::WeaponsInHand);
    }

    #[test]
    fn landscape_matrix_swaps_u_and_v() {
        let m = TextureMatrix::landscape();
        assert_eq!(m.apply([0.25, 0.75]), [0.75, 0.25]);
        assert_eq!(m.apply([1.0, 0.0]), [0.0, 1.0]);
    }

    #[test]
    fn identity_is_neutral_under_composition() {
        let m = TextureMatrix::QUARTER_TURN;
        assert_eq!(m.then_after(TextureMatrix::IDENTITY), m);
        assert_eq!(TextureMatrix::IDENTITY.then_after(m), m);
    }

    #[test]
    fn texture_ids_differ_per_class() {
        let d = ShapeDescriptor::new(4, 0, 9);
        assert_ne!(
            RegistryTextureManager::texture_id(d, TextureClass::Wall),
            RegistryTextureManager::texture_id(d, TextureClass::Landscape)
        );
    }
}
