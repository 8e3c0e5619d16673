//! Texture path: records textured quads for the GPU renderer.

use tessera_engine::coords::{PixelRect, Rect};
use tessera_engine::scene::{BlendMode, DrawList, SpriteCmd, ZIndex};

use crate::descriptor::TextureType;
use crate::texture::{TextureClass, TextureManager, TextureMatrix, TextureSetup};

use super::{DrawOutcome, Extent, ShapeBlitter};

/// Rotations at or below this many degrees are drawn axis-aligned.
const MIN_ROTATION_DEGREES: f32 = 0.1;

impl ShapeBlitter {
    /// Records this shape into `list`, stretched over `dst`.
    ///
    /// The texture is resolved through `textures` on every call. A missing
    /// texture records nothing and reports [`DrawOutcome::Unavailable`].
    pub fn draw_textured(
        &self,
        textures: &mut dyn TextureManager,
        list: &mut DrawList,
        z: ZIndex,
        dst: Rect,
    ) -> DrawOutcome {
        let class = TextureClass::from(self.reference.texture_type);
        let Some(setup) = textures.setup(self.descriptor, class) else {
            log::trace!("ShapeBlitter: no texture for {} ({class:?})", self.descriptor);
            return DrawOutcome::Unavailable;
        };

        let mut corners = dst.corners();
        if self.rotation.abs() > MIN_ROTATION_DEGREES {
            let pivot = dst.center();
            corners = corners.map(|c| c.rotated_about(pivot, self.rotation));
        }

        let geometry = &self.geometry;
        let uvs = quad_uvs(self.reference.texture_type, geometry.crop, geometry.scaled, &setup);

        list.push_sprite(z, SpriteCmd {
            texture: setup.texture,
            corners,
            uvs,
            tint: self.tint,
            blend: BlendMode::Alpha,
        });

        if let Some(glow) = setup.glow {
            list.push_sprite(z, SpriteCmd {
                texture: glow,
                corners,
                uvs,
                tint: self.tint,
                blend: BlendMode::Additive,
            });
        }

        DrawOutcome::Drawn
    }
}

/// Corner texture coordinates (fan order TL, TR, BR, BL) for `crop` inside
/// a shape of size `extent`.
///
/// Interface art is stored upright: crop x runs along U. Everything else is
/// stored transposed, so crop x runs along V and the corner order follows.
pub(super) fn quad_uvs(
    texture_type: TextureType,
    crop: PixelRect,
    extent: Extent,
    setup: &TextureSetup,
) -> [[f32; 2]; 4] {
    let mut u_offset = setup.u_offset;
    let mut v_offset = setup.v_offset;
    let mut u_scale = setup.u_scale;
    let mut v_scale = setup.v_scale;

    let w = extent.width as f64;
    let h = extent.height as f64;
    let has_w = extent.width > 0;
    let has_h = extent.height > 0;

    let (matrix, uvs) = if texture_type == TextureType::Interface {
        if has_w {
            if crop.x > 0 {
                u_offset += crop.x as f64 * u_scale / w;
            }
            if (crop.w as f64) < w {
                u_scale *= crop.w as f64 / w;
            }
        }
        if has_h {
            if crop.y > 0 {
                v_offset += crop.y as f64 * v_scale / h;
            }
            if (crop.h as f64) < h {
                v_scale *= crop.h as f64 / h;
            }
        }

        let (u, v, us, vs) = (u_offset, v_offset, u_scale, v_scale);
        (setup.matrix, [[u, v], [u + us, v], [u + us, v + vs], [u, v + vs]])
    } else {
        let matrix = if texture_type == TextureType::Landscape {
            u_offset = 0.0;
            TextureMatrix::landscape()
        } else {
            setup.matrix
        };

        if has_w {
            if crop.x > 0 {
                v_offset += crop.x as f64 * v_scale / w;
            }
            if (crop.w as f64) < w {
                v_scale *= crop.w as f64 / w;
            }
        }
        if has_h {
            if crop.y > 0 {
                u_offset += crop.y as f64 * u_scale / h;
            }
            if (crop.h as f64) < h {
                u_scale *= crop.h as f64 / h;
            }
        }

        let (u, v, us, vs) = (u_offset, v_offset, u_scale, v_scale);
        (matrix, [[u, v], [u, v + vs], [u + us, v + vs], [u + us, v]])
    };

    uvs.map(|uv| {
        let [s, t] = matrix.apply(uv);
        [s as f32, t as f32]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::ShapeLibrary;
    use crate::descriptor::{ShapeDescriptor, SpriteReference};
    use crate::surface::Surface;
    use image::{Rgba, RgbaImage};
    use tessera_engine::coords::Vec2;
    use tessera_engine::paint::Color;
    use tessera_engine::scene::TextureId;

    fn approx_uvs(got: [[f32; 2]; 4], want: [[f32; 2]; 4]) {
        for (g, w) in got.iter().zip(want.iter()) {
            assert!(
                (g[0] - w[0]).abs() < 1e-6 && (g[1] - w[1]).abs() < 1e-6,
                "got {got:?}, want {want:?}"
            );
        }
    }

    /// Manager that hands out one fixed setup and counts requests.
    struct FixedManager {
        setup: Option<TextureSetup>,
        requests: Vec<(ShapeDescriptor, TextureClass)>,
    }

    impl FixedManager {
        fn new(setup: Option<TextureSetup>) -> Self {
            Self { setup, requests: Vec::new() }
        }
    }

    impl TextureManager for FixedManager {
        fn setup(
            &mut self,
            descriptor: ShapeDescriptor,
            class: TextureClass,
        ) -> Option<TextureSetup> {
            self.requests.push((descriptor, class));
            self.setup
        }
    }

    fn blitter(texture_type: TextureType, w: u32, h: u32) -> ShapeBlitter {
        let reference = SpriteReference::new(2, 5, texture_type, 0);
        let mut lib = ShapeLibrary::new();
        lib.insert(
            reference.descriptor(),
            Surface::Rgba(RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255]))),
        );
        ShapeBlitter::new(reference, &mut lib)
    }

    // ── uv math ───────────────────────────────────────────────────────────

    #[test]
    fn interface_crop_shifts_and_narrows_u() {
        let setup = TextureSetup::whole(TextureId(1));
        let uvs = quad_uvs(
            TextureType::Interface,
            PixelRect::new(10, 0, 90, 50),
            Extent::new(100, 50),
            &setup,
        );
        approx_uvs(uvs, [[0.1, 0.0], [1.0, 0.0], [1.0, 1.0], [0.1, 1.0]]);
    }

    #[test]
    fn interface_crop_respects_atlas_offsets() {
        let mut setup = TextureSetup::whole(TextureId(1));
        setup.u_offset = 0.5;
        setup.u_scale = 0.5;
        setup.v_offset = 0.25;
        setup.v_scale = 0.5;
        let uvs = quad_uvs(
            TextureType::Interface,
            PixelRect::new(10, 0, 90, 50),
            Extent::new(100, 50),
            &setup,
        );
        // u' = u + 0.1 * us, us' = 0.9 * us; v untouched.
        approx_uvs(uvs, [[0.55, 0.25], [1.0, 0.25], [1.0, 0.75], [0.55, 0.75]]);
    }

    #[test]
    fn sprite_crop_runs_along_v() {
        let setup = TextureSetup::whole(TextureId(1));
        let uvs = quad_uvs(
            TextureType::Sprite,
            PixelRect::new(25, 10, 50, 20),
            Extent::new(100, 40),
            &setup,
        );
        // v from crop x: 0.25 .. 0.75; u from crop y: 0.25 .. 0.75.
        approx_uvs(uvs, [[0.25, 0.25], [0.25, 0.75], [0.75, 0.75], [0.75, 0.25]]);
    }

    #[test]
    fn uncropped_sprite_uses_transposed_corners() {
        let setup = TextureSetup::whole(TextureId(1));
        let whole = PixelRect::new(0, 0, 8, 8);
        let uvs = quad_uvs(TextureType::Wall, whole, Extent::new(8, 8), &setup);
        approx_uvs(uvs, [[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]]);
    }

    #[test]
    fn landscape_swaps_axes_and_drops_u_offset() {
        let mut setup = TextureSetup::whole(TextureId(1));
        setup.u_offset = 0.5;
        let whole = PixelRect::new(0, 0, 8, 8);
        let uvs = quad_uvs(TextureType::Landscape, whole, Extent::new(8, 8), &setup);
        // Transposed corners swapped back by the landscape matrix.
        approx_uvs(uvs, [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]);
    }

    #[test]
    fn landscape_crop_y_moves_u_from_zero_before_swap() {
        let mut setup = TextureSetup::whole(TextureId(1));
        setup.u_offset = 0.5;
        let band = PixelRect::new(0, 2, 8, 4);
        let uvs = quad_uvs(TextureType::Landscape, band, Extent::new(8, 8), &setup);
        // u runs 0.25 .. 0.75 (offset reset, then moved by crop y), then the
        // matrix swaps it onto t.
        approx_uvs(uvs, [[0.0, 0.25], [1.0, 0.25], [1.0, 0.75], [0.0, 0.75]]);
    }

    #[test]
    fn zero_extent_skips_crop_math() {
        let setup = TextureSetup::whole(TextureId(1));
        let empty = PixelRect::new(3, 3, 0, 0);
        let uvs = quad_uvs(TextureType::Interface, empty, Extent::new(0, 0), &setup);
        approx_uvs(uvs, [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]);
    }

    #[test]
    fn setup_matrix_applies_to_every_corner() {
        let mut setup = TextureSetup::whole(TextureId(1));
        setup.matrix = TextureMatrix::scale(0.5, 2.0);
        let whole = PixelRect::new(0, 0, 4, 4);
        let uvs = quad_uvs(TextureType::Interface, whole, Extent::new(4, 4), &setup);
        approx_uvs(uvs, [[0.0, 0.0], [0.5, 0.0], [0.5, 2.0], [0.0, 2.0]]);
    }

    // ── recording ─────────────────────────────────────────────────────────

    #[test]
    fn records_one_alpha_quad() {
        let b = blitter(TextureType::Interface, 100, 50);
        let mut manager = FixedManager::new(Some(TextureSetup::whole(TextureId(7))));
        let mut list = DrawList::new();

        let dst = Rect::new(10.0, 20.0, 100.0, 50.0);
        let outcome = b.draw_textured(&mut manager, &mut list, ZIndex(3), dst);

        assert_eq!(outcome, DrawOutcome::Drawn);
        assert_eq!(manager.requests, vec![(b.descriptor(), TextureClass::WeaponsInHand)]);
        let sprites: Vec<_> = list.sprites().collect();
        assert_eq!(sprites.len(), 1);
        assert_eq!(sprites[0].texture, TextureId(7));
        assert_eq!(sprites[0].blend, BlendMode::Alpha);
        assert_eq!(sprites[0].tint, Color::white());
        assert_eq!(sprites[0].corners[0], Vec2::new(10.0, 20.0));
        assert_eq!(sprites[0].corners[2], Vec2::new(110.0, 70.0));
    }

    #[test]
    fn glow_adds_additive_quad_with_same_geometry() {
        let b = blitter(TextureType::Sprite, 16, 16);
        let mut setup = TextureSetup::whole(TextureId(1));
        setup.glow = Some(TextureId(2));
        let mut manager = FixedManager::new(Some(setup));
        let mut list = DrawList::new();

        b.draw_textured(&mut manager, &mut list, ZIndex(0), Rect::new(0.0, 0.0, 16.0, 16.0));

        let sprites: Vec<_> = list.sprites().collect();
        assert_eq!(sprites.len(), 2);
        assert_eq!(sprites[1].texture, TextureId(2));
        assert_eq!(sprites[1].blend, BlendMode::Additive);
        assert_eq!(sprites[0].corners, sprites[1].corners);
        assert_eq!(sprites[0].uvs, sprites[1].uvs);
    }

    #[test]
    fn missing_texture_records_nothing() {
        let b = blitter(TextureType::Wall, 16, 16);
        let mut manager = FixedManager::new(None);
        let mut list = DrawList::new();

        let dst = Rect::new(0.0, 0.0, 16.0, 16.0);
        let outcome = b.draw_textured(&mut manager, &mut list, ZIndex(0), dst);

        assert_eq!(outcome, DrawOutcome::Unavailable);
        assert!(list.is_empty());
        assert_eq!(manager.requests[0].1, TextureClass::Wall);
    }

    #[test]
    fn texture_is_resolved_on_every_draw() {
        let b = blitter(TextureType::Sprite, 8, 8);
        let mut manager = FixedManager::new(Some(TextureSetup::whole(TextureId(1))));
        let mut list = DrawList::new();
        let dst = Rect::new(0.0, 0.0, 8.0, 8.0);

        b.draw_textured(&mut manager, &mut list, ZIndex(0), dst);
        b.draw_textured(&mut manager, &mut list, ZIndex(0), dst);

        assert_eq!(manager.requests.len(), 2);
    }

    #[test]
    fn rotation_turns_corners_about_center() {
        let mut b = blitter(TextureType::Interface, 10, 10);
        b.set_rotation(90.0);
        let mut manager = FixedManager::new(Some(TextureSetup::whole(TextureId(1))));
        let mut list = DrawList::new();

        b.draw_textured(&mut manager, &mut list, ZIndex(0), Rect::new(0.0, 0.0, 10.0, 10.0));

        let tl = list.sprites().next().map(|s| s.corners[0]).unwrap();
        // Top-left turns clockwise on screen to top-right.
        assert!((tl.x - 10.0).abs() < 1e-4 && tl.y.abs() < 1e-4, "{tl:?}");
    }

    #[test]
    fn tiny_rotation_is_ignored() {
        let mut b = blitter(TextureType::Interface, 10, 10);
        b.set_rotation(0.05);
        let mut manager = FixedManager::new(Some(TextureSetup::whole(TextureId(1))));
        let mut list = DrawList::new();
        let dst = Rect::new(0.0, 0.0, 10.0, 10.0);

        b.draw_textured(&mut manager, &mut list, ZIndex(0), dst);

        assert_eq!(list.sprites().next().map(|s| s.corners), Some(dst.corners()));
    }
}
