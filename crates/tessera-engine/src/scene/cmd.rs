use super::SpriteCmd;

/// Renderer-agnostic draw command stream.
///
/// Adding a command kind means a new variant here plus a renderer under
/// `render::*` that picks it out of the `DrawList`.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Sprite(SpriteCmd),
}
