use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};

use crate::render::{RenderCtx, RenderTarget, TextureRegistry};
use crate::scene::{BlendMode, DrawCmd, DrawList, TextureId};

use super::common::{ViewportUniform, blend_state, viewport_ubo_min_binding_size};

/// A run of consecutive quads sharing texture and blend mode.
#[derive(Debug, Clone, PartialEq)]
struct Batch {
    texture: TextureId,
    blend: BlendMode,
    first_quad: u32,
    quad_count: u32,
}

/// Renderer for `DrawCmd::Sprite`.
///
/// Quads are expanded to four vertices on the CPU (corners may be rotated)
/// and drawn with a shared index pattern. Draw calls are split whenever the
/// texture or blend mode changes between consecutive quads in paint order.
#[derive(Default)]
pub struct SpriteRenderer {
    // pipelines
    pipeline_format: Option<wgpu::TextureFormat>,
    alpha_pipeline: Option<wgpu::RenderPipeline>,
    additive_pipeline: Option<wgpu::RenderPipeline>,
    viewport_bgl: Option<wgpu::BindGroupLayout>,
    texture_bgl: Option<wgpu::BindGroupLayout>,

    // bindings
    viewport_ubo: Option<wgpu::Buffer>,
    viewport_bind_group: Option<wgpu::BindGroup>,
    sampler: Option<wgpu::Sampler>,
    texture_bind_groups: HashMap<TextureId, (u64, wgpu::BindGroup)>,

    // geometry
    vbo: Option<wgpu::Buffer>,
    ibo: Option<wgpu::Buffer>,
    quad_capacity: usize,

    warned_missing_texture: bool,
}

impl SpriteRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders all `DrawCmd::Sprite` entries of `draw_list` into `target`.
    ///
    /// Sprites whose texture is not in `textures` are skipped (one-time warning).
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        draw_list: &mut DrawList,
        textures: &TextureRegistry,
    ) {
        self.ensure_pipelines(ctx);
        self.ensure_sampler(ctx);
        self.ensure_viewport_binding(ctx);

        // ── collect vertices + batches ─────────────────────────────────────
        let mut vertices: Vec<SpriteVertex> = Vec::new();
        let mut batches: Vec<Batch> = Vec::new();

        for item in draw_list.iter_in_paint_order() {
            let DrawCmd::Sprite(cmd) = &item.cmd;
            if textures.view(cmd.texture).is_none() {
                if !self.warned_missing_texture {
                    log::warn!(
                        "SpriteRenderer: texture {:?} not registered; skipping",
                        cmd.texture
                    );
                    self.warned_missing_texture = true;
                }
                continue;
            }

            let color = cmd.tint.to_straight();
            for (corner, uv) in cmd.corners.iter().zip(cmd.uvs.iter()) {
                vertices.push(SpriteVertex { pos: [corner.x, corner.y], uv: *uv, color });
            }

            let quad = (vertices.len() / 4 - 1) as u32;
            match batches.last_mut() {
                Some(b) if b.texture == cmd.texture && b.blend == cmd.blend => {
                    b.quad_count += 1;
                }
                _ => batches.push(Batch {
                    texture: cmd.texture,
                    blend: cmd.blend,
                    first_quad: quad,
                    quad_count: 1,
                }),
            }
        }

        if batches.is_empty() {
            return;
        }

        // ── mutable operations before any immutable borrows ────────────────
        prune_stale_bind_groups(&mut self.texture_bind_groups, |id| {
            textures.view(id).map(|(_, generation)| generation)
        });
        for batch in &batches {
            self.ensure_texture_bind_group(ctx, textures, batch.texture);
        }
        self.write_viewport_uniform(ctx);
        self.ensure_quad_capacity(ctx, vertices.len() / 4);

        let Some(vbo) = self.vbo.as_ref() else { return };
        ctx.queue.write_buffer(vbo, 0, bytemuck::cast_slice(&vertices));

        // ── immutable borrows ──────────────────────────────────────────────
        let Some(alpha_pipeline) = self.alpha_pipeline.as_ref() else { return };
        let Some(additive_pipeline) = self.additive_pipeline.as_ref() else { return };
        let Some(viewport_bind_group) = self.viewport_bind_group.as_ref() else { return };
        let Some(ibo) = self.ibo.as_ref() else { return };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("tessera sprite pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_bind_group(0, viewport_bind_group, &[]);
        rpass.set_vertex_buffer(0, vbo.slice(..));
        rpass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint32);

        for batch in &batches {
            let Some((_, texture_bind_group)) = self.texture_bind_groups.get(&batch.texture) else {
                continue;
            };
            let pipeline = match batch.blend {
                BlendMode::Alpha => alpha_pipeline,
                BlendMode::Additive => additive_pipeline,
            };
            rpass.set_pipeline(pipeline);
            rpass.set_bind_group(1, texture_bind_group, &[]);

            let first = batch.first_quad * 6;
            let last = (batch.first_quad + batch.quad_count) * 6;
            rpass.draw_indexed(first..last, 0, 0..1);
        }
    }

    // ── lazy-init helpers ──────────────────────────────────────────────────

    fn ensure_pipelines(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.target_format)
            && self.alpha_pipeline.is_some()
            && self.additive_pipeline.is_some()
        {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("tessera sprite shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/sprite.wgsl").into()),
        });

        let viewport_bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tessera sprite viewport bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: Some(viewport_ubo_min_binding_size()),
                },
                count: None,
            }],
        });

        let texture_bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tessera sprite texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("tessera sprite pipeline layout"),
            bind_group_layouts: &[&viewport_bgl, &texture_bgl],
            immediate_size: 0,
        });

        let build = |mode: BlendMode, label: &'static str| {
            ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[SpriteVertex::layout()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: ctx.target_format,
                        blend: Some(blend_state(mode)),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    // Rotated or mirrored quads flip winding.
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        };

        self.alpha_pipeline = Some(build(BlendMode::Alpha, "tessera sprite pipeline (alpha)"));
        self.additive_pipeline =
            Some(build(BlendMode::Additive, "tessera sprite pipeline (additive)"));
        self.pipeline_format = Some(ctx.target_format);
        self.viewport_bgl = Some(viewport_bgl);
        self.texture_bgl = Some(texture_bgl);

        // Layouts changed; everything bound against them is stale.
        self.viewport_ubo = None;
        self.viewport_bind_group = None;
        self.texture_bind_groups.clear();
    }

    fn ensure_sampler(&mut self, ctx: &RenderCtx<'_>) {
        if self.sampler.is_some() {
            return;
        }
        // Atlas offsets may run past 1.0 for tiling wall/landscape art.
        self.sampler = Some(ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("tessera sprite sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        }));
    }

    fn ensure_viewport_binding(&mut self, ctx: &RenderCtx<'_>) {
        if self.viewport_bind_group.is_some() && self.viewport_ubo.is_some() {
            return;
        }
        let Some(bgl) = self.viewport_bgl.as_ref() else { return };

        let ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tessera sprite viewport ubo"),
            size: std::mem::size_of::<ViewportUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tessera sprite viewport bind group"),
            layout: bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.as_entire_binding(),
            }],
        });

        self.viewport_ubo = Some(ubo);
        self.viewport_bind_group = Some(bind_group);
    }

    fn ensure_texture_bind_group(
        &mut self,
        ctx: &RenderCtx<'_>,
        textures: &TextureRegistry,
        id: TextureId,
    ) {
        let Some((view, generation)) = textures.view(id) else { return };
        if self
            .texture_bind_groups
            .get(&id)
            .is_some_and(|(cached, _)| *cached == generation)
        {
            return;
        }
        let Some(bgl) = self.texture_bgl.as_ref() else { return };
        let Some(sampler) = self.sampler.as_ref() else { return };

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tessera sprite texture bind group"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });
        self.texture_bind_groups.insert(id, (generation, bind_group));
    }

    fn write_viewport_uniform(&mut self, ctx: &RenderCtx<'_>) {
        let Some(ubo) = self.viewport_ubo.as_ref() else { return };
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&ViewportUniform::new(ctx.viewport)));
    }

    fn ensure_quad_capacity(&mut self, ctx: &RenderCtx<'_>, required_quads: usize) {
        if required_quads <= self.quad_capacity && self.vbo.is_some() && self.ibo.is_some() {
            return;
        }

        let new_cap = required_quads.next_power_of_two().max(64);
        self.vbo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tessera sprite vbo"),
            size: (new_cap * 4 * std::mem::size_of::<SpriteVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));

        let indices = quad_indices(new_cap);
        self.ibo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tessera sprite ibo"),
            size: (indices.len() * std::mem::size_of::<u32>()) as u64,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        if let Some(ibo) = self.ibo.as_ref() {
            ctx.queue.write_buffer(ibo, 0, bytemuck::cast_slice(&indices));
        }
        self.quad_capacity = new_cap;
    }
}

/// Drops cached bind groups whose texture is gone or was replaced.
///
/// `live` returns the current generation of a texture id.
fn prune_stale_bind_groups<B>(
    cache: &mut HashMap<TextureId, (u64, B)>,
    live: impl Fn(TextureId) -> Option<u64>,
) {
    cache.retain(|id, (generation, _)| live(*id) == Some(*generation));
}

/// Two triangles per quad as a fan around corner 0.
fn quad_indices(quads: usize) -> Vec<u32> {
    (0..quads as u32)
        .flat_map(|q| {
            let b = q * 4;
            [b, b + 1, b + 2, b, b + 2, b + 3]
        })
        .collect()
}

// ── GPU types ─────────────────────────────────────────────────────────────

/// Vertex layout (32 bytes):
///
///  offset  0  pos    [f32; 2]   loc 0
///  offset  8  uv     [f32; 2]   loc 1
///  offset 16  color  [f32; 4]   loc 2
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct SpriteVertex {
    pos: [f32; 2],
    uv: [f32; 2],
    color: [f32; 4],
}

impl SpriteVertex {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x2, // pos
        1 => Float32x2, // uv
        2 => Float32x4  // color
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_indices_fan_each_quad() {
        assert_eq!(quad_indices(2), vec![0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]);
    }

    #[test]
    fn stale_bind_groups_are_pruned() {
        let mut cache: HashMap<TextureId, (u64, ())> = HashMap::new();
        cache.insert(TextureId(1), (4, ()));
        cache.insert(TextureId(2), (5, ()));
        cache.insert(TextureId(3), (6, ()));

        // 1 is current, 2 was re-uploaded, 3 is no longer registered.
        prune_stale_bind_groups(&mut cache, |id| match id.0 {
            1 => Some(4),
            2 => Some(9),
            _ => None,
        });

        assert_eq!(cache.len(), 1);
        assert!(cache.contains_key(&TextureId(1)));
    }

    #[test]
    fn vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<SpriteVertex>(), 32);
    }
}
