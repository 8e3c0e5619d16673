use crate::coords::Vec2;
use crate::paint::Color;

use super::{DrawCmd, DrawList, ZIndex};

/// Handle of a GPU texture held by a `render::TextureRegistry`.
///
/// The registry owns the texture; draw commands only name it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TextureId(pub u64);

/// How a sprite quad combines with what is already in the target.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum BlendMode {
    /// Straight-alpha "over".
    #[default]
    Alpha,
    /// `dst + src * src_alpha`; used for glow layers.
    Additive,
}

/// One textured quad.
///
/// Corners and UVs are in fan order (corner 0, 1, 2, 3). Corners are in
/// target pixels and may describe a rotated quad.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteCmd {
    pub texture: TextureId,
    pub corners: [Vec2; 4],
    pub uvs: [[f32; 2]; 4],
    pub tint: Color,
    pub blend: BlendMode,
}

impl DrawList {
    /// Records a textured quad.
    #[inline]
    pub fn push_sprite(&mut self, z: ZIndex, cmd: SpriteCmd) {
        self.push(z, DrawCmd::Sprite(cmd));
    }

    /// Iterates sprite commands in insertion order.
    pub fn sprites(&self) -> impl Iterator<Item = &SpriteCmd> {
        self.items().iter().map(|item| match &item.cmd {
            DrawCmd::Sprite(cmd) => cmd,
        })
    }
}
