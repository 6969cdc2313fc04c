//! wgpu implementation of [`RenderBackend`].
//!
//! Rects, borders and glyphs are drawn as instanced quads. Instances are
//! batched per pipeline between clip changes and uploaded once per frame.

mod atlas;
mod ndc;
mod ring;

use std::borrow::Cow;
use std::sync::Arc;

use tally_core::{Rect, RenderBackend, Scene, SceneNode};

pub use atlas::{GlyphAtlas, GlyphInfo, ShelfPacker};
pub use ndc::{ClipStack, to_ndc, to_ndc_len, to_scissor};
use ring::UploadRing;

const ATLAS_SIZE: u32 = 1024;
const MIN_TEXT_PX: f32 = 6.0;
const MAX_TEXT_PX: f32 = 128.0;

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct RectInstance {
    // xy in NDC, wh in NDC extents
    xywh: [f32; 4],
    radius: f32,
    // linear rgba
    color: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct BorderInstance {
    xywh: [f32; 4],
    radius_outer: f32,
    stroke: f32,
    color: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct GlyphInstance {
    xywh: [f32; 4],
    // u0, v1, u1, v0
    uv: [f32; 4],
    color: [f32; 4],
}

const RECT_ATTRS: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x4, 1 => Float32, 2 => Float32x4];
const BORDER_ATTRS: [wgpu::VertexAttribute; 4] =
    wgpu::vertex_attr_array![0 => Float32x4, 1 => Float32, 2 => Float32, 3 => Float32x4];
const GLYPH_ATTRS: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x4, 1 => Float32x4, 2 => Float32x4];

/// Draw commands in submission order. Instance ranges are `(first, count)`.
#[derive(Debug)]
enum Cmd {
    PushClip(Rect),
    PopClip,
    Rects(u32, u32),
    Borders(u32, u32),
    Glyphs(u32, u32),
}

/// A frame's instances. Everything pushed since the last flush becomes one
/// draw per kind.
#[derive(Default)]
struct Batch {
    rects: Vec<RectInstance>,
    borders: Vec<BorderInstance>,
    glyphs: Vec<GlyphInstance>,
    flushed: (usize, usize, usize),
    cmds: Vec<Cmd>,
}

impl Batch {
    fn flush(&mut self) {
        let (r, b, g) = self.flushed;
        if self.rects.len() > r {
            self.cmds
                .push(Cmd::Rects(r as u32, (self.rects.len() - r) as u32));
        }
        if self.borders.len() > b {
            self.cmds
                .push(Cmd::Borders(b as u32, (self.borders.len() - b) as u32));
        }
        if self.glyphs.len() > g {
            self.cmds
                .push(Cmd::Glyphs(g as u32, (self.glyphs.len() - g) as u32));
        }
        self.flushed = (self.rects.len(), self.borders.len(), self.glyphs.len());
    }

    fn push_cmd(&mut self, cmd: Cmd) {
        self.flush();
        self.cmds.push(cmd);
    }
}

pub struct WgpuBackend {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    rect_pipeline: wgpu::RenderPipeline,
    border_pipeline: wgpu::RenderPipeline,
    text_pipeline: wgpu::RenderPipeline,
    text_bind_group: wgpu::BindGroup,

    atlas: GlyphAtlas,

    ring_rect: UploadRing,
    ring_border: UploadRing,
    ring_glyph: UploadRing,
}

impl WgpuBackend {
    pub fn new(window: Arc<winit::window::Window>) -> anyhow::Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::from_env_or_default());
        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .map_err(|e| anyhow::anyhow!("no suitable adapter: {e}"))?;
        log::info!("using adapter {:?}", adapter.get_info().name);

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("tally device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                .using_resolution(adapter.limits()),
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
            memory_hints: wgpu::MemoryHints::default(),
            trace: wgpu::Trace::Off,
        }))?;

        let size = window.inner_size();
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let present_mode = caps
            .present_modes
            .iter()
            .copied()
            .find(|m| *m == wgpu::PresentMode::Mailbox)
            .unwrap_or(wgpu::PresentMode::Fifo);
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let plain_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("shape pipeline layout"),
            bind_group_layouts: &[],
            immediate_size: 0,
        });
        let rect_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("rect.wgsl"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("shaders/rect.wgsl"))),
        });
        let rect_pipeline = instanced_pipeline(
            &device,
            "rect pipeline",
            &rect_shader,
            &plain_layout,
            std::mem::size_of::<RectInstance>() as u64,
            &RECT_ATTRS,
            format,
        );

        let border_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("border.wgsl"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("shaders/border.wgsl"))),
        });
        let border_pipeline = instanced_pipeline(
            &device,
            "border pipeline",
            &border_shader,
            &plain_layout,
            std::mem::size_of::<BorderInstance>() as u64,
            &BORDER_ATTRS,
            format,
        );

        let text_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("text.wgsl"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("shaders/text.wgsl"))),
        });
        let text_bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("text bind layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
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
        let text_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("text pipeline layout"),
            bind_group_layouts: &[&text_bind_layout],
            immediate_size: 0,
        });
        let text_pipeline = instanced_pipeline(
            &device,
            "text pipeline",
            &text_shader,
            &text_layout,
            std::mem::size_of::<GlyphInstance>() as u64,
            &GLYPH_ATTRS,
            format,
        );

        let atlas = GlyphAtlas::new(&device, ATLAS_SIZE);
        let text_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("atlas bind group"),
            layout: &text_bind_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&atlas.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&atlas.sampler),
                },
            ],
        });

        let ring_rect = UploadRing::new(&device, "ring rect", 64 << 10);
        let ring_border = UploadRing::new(&device, "ring border", 16 << 10);
        let ring_glyph = UploadRing::new(&device, "ring glyph", 256 << 10);

        log::debug!(
            "surface {}x{} {:?} {:?}",
            config.width,
            config.height,
            config.format,
            config.present_mode
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            rect_pipeline,
            border_pipeline,
            text_pipeline,
            text_bind_group,
            atlas,
            ring_rect,
            ring_border,
            ring_glyph,
        })
    }

    /// Converts a scene into instances and draw commands.
    fn record(&mut self, scene: &Scene) -> Batch {
        let fb_w = self.config.width as f32;
        let fb_h = self.config.height as f32;
        let mut batch = Batch::default();

        for node in &scene.nodes {
            match node {
                SceneNode::Rect {
                    rect,
                    color,
                    radius,
                } => batch.rects.push(RectInstance {
                    xywh: to_ndc(*rect, fb_w, fb_h),
                    radius: to_ndc_len(*radius, fb_w, fb_h),
                    color: color.to_linear(),
                }),
                SceneNode::Border {
                    rect,
                    color,
                    width,
                    radius,
                } => batch.borders.push(BorderInstance {
                    xywh: to_ndc(*rect, fb_w, fb_h),
                    radius_outer: to_ndc_len(*radius, fb_w, fb_h),
                    stroke: to_ndc_len(*width, fb_w, fb_h),
                    color: color.to_linear(),
                }),
                SceneNode::Text {
                    rect,
                    text,
                    color,
                    size,
                } => {
                    let px = size.clamp(MIN_TEXT_PX, MAX_TEXT_PX);
                    let color = color.to_linear();
                    for sg in tally_text::shape_line(text, px) {
                        let Some(info) = self.atlas.glyph(&self.queue, sg.key) else {
                            continue;
                        };
                        let x = rect.x + sg.x + sg.bearing_x;
                        let y = rect.y + sg.y - sg.bearing_y;
                        batch.glyphs.push(GlyphInstance {
                            xywh: to_ndc(Rect::new(x, y, info.w, info.h), fb_w, fb_h),
                            uv: [info.u0, info.v1, info.u1, info.v0],
                            color,
                        });
                    }
                }
                SceneNode::PushClip { rect } => batch.push_cmd(Cmd::PushClip(*rect)),
                SceneNode::PopClip => batch.push_cmd(Cmd::PopClip),
            }
        }
        batch.flush();
        batch
    }
}

fn instanced_pipeline(
    device: &wgpu::Device,
    label: &str,
    shader: &wgpu::ShaderModule,
    layout: &wgpu::PipelineLayout,
    stride: u64,
    attributes: &[wgpu::VertexAttribute],
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: stride,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes,
            }],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

fn byte_range<T>(first: u32, count: u32) -> std::ops::Range<u64> {
    let stride = std::mem::size_of::<T>() as u64;
    let start = first as u64 * stride;
    start..start + count as u64 * stride
}

impl RenderBackend for WgpuBackend {
    fn configure_surface(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
    }

    fn frame(&mut self, scene: &Scene) {
        let frame = match self.surface.get_current_texture() {
            Ok(f) => f,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost or outdated; reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("surface timeout; skipping frame");
                return;
            }
            Err(e) => {
                log::error!("cannot acquire frame: {e}");
                return;
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let batch = self.record(scene);
        self.ring_rect.upload(
            &self.device,
            &self.queue,
            bytemuck::cast_slice(&batch.rects),
        );
        self.ring_border.upload(
            &self.device,
            &self.queue,
            bytemuck::cast_slice(&batch.borders),
        );
        self.ring_glyph.upload(
            &self.device,
            &self.queue,
            bytemuck::cast_slice(&batch.glyphs),
        );

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });
        {
            let clear = scene.clear_color.to_linear();
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: clear[0] as f64,
                            g: clear[1] as f64,
                            b: clear[2] as f64,
                            a: clear[3] as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            let (w, h) = (self.config.width, self.config.height);
            rpass.set_scissor_rect(0, 0, w, h);
            let mut clips = ClipStack::new(Rect::new(0.0, 0.0, w as f32, h as f32));
            let mut scissor_empty = false;

            for cmd in &batch.cmds {
                match *cmd {
                    Cmd::PushClip(r) => {
                        let top = clips.push(r);
                        let (x, y, sw, sh) = to_scissor(&top, w, h);
                        scissor_empty = sw == 0 || sh == 0;
                        if !scissor_empty {
                            rpass.set_scissor_rect(x, y, sw, sh);
                        }
                    }
                    Cmd::PopClip => {
                        let top = clips.pop();
                        let (x, y, sw, sh) = to_scissor(&top, w, h);
                        scissor_empty = sw == 0 || sh == 0;
                        if !scissor_empty {
                            rpass.set_scissor_rect(x, y, sw, sh);
                        }
                    }
                    _ if scissor_empty => {}
                    Cmd::Rects(first, n) => {
                        rpass.set_pipeline(&self.rect_pipeline);
                        rpass.set_vertex_buffer(
                            0,
                            self.ring_rect.buf.slice(byte_range::<RectInstance>(first, n)),
                        );
                        rpass.draw(0..6, 0..n);
                    }
                    Cmd::Borders(first, n) => {
                        rpass.set_pipeline(&self.border_pipeline);
                        rpass.set_vertex_buffer(
                            0,
                            self.ring_border
                                .buf
                                .slice(byte_range::<BorderInstance>(first, n)),
                        );
                        rpass.draw(0..6, 0..n);
                    }
                    Cmd::Glyphs(first, n) => {
                        rpass.set_pipeline(&self.text_pipeline);
                        rpass.set_bind_group(0, &self.text_bind_group, &[]);
                        rpass.set_vertex_buffer(
                            0,
                            self.ring_glyph
                                .buf
                                .slice(byte_range::<GlyphInstance>(first, n)),
                        );
                        rpass.draw(0..6, 0..n);
                    }
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_splits_draws_at_clip_boundaries() {
        let mut batch = Batch::default();
        let zero = RectInstance {
            xywh: [0.0; 4],
            radius: 0.0,
            color: [0.0; 4],
        };
        batch.rects.push(zero);
        batch.rects.push(zero);
        batch.push_cmd(Cmd::PushClip(Rect::new(0.0, 0.0, 10.0, 10.0)));
        batch.rects.push(zero);
        batch.borders.push(BorderInstance {
            xywh: [0.0; 4],
            radius_outer: 8.0,
            stroke: 1.0,
            color: [0.0; 4],
        });
        batch.push_cmd(Cmd::PopClip);
        batch.flush();

        let shape: Vec<String> = batch.cmds.iter().map(|c| format!("{c:?}")).collect();
        assert_eq!(
            shape,
            vec![
                "Rects(0, 2)",
                "PushClip(Rect { x: 0.0, y: 0.0, w: 10.0, h: 10.0 })",
                "Rects(2, 1)",
                "Borders(0, 1)",
                "PopClip",
            ]
        );
    }

    #[test]
    fn test_instance_layouts_match_attributes() {
        assert_eq!(std::mem::size_of::<RectInstance>(), 36);
        assert_eq!(std::mem::size_of::<BorderInstance>(), 40);
        assert_eq!(std::mem::size_of::<GlyphInstance>(), 48);
        assert_eq!(RECT_ATTRS[2].offset, 20);
        assert_eq!(BORDER_ATTRS[3].offset, 24);
        assert_eq!(GLYPH_ATTRS[2].offset, 32);
        assert_eq!(byte_range::<GlyphInstance>(2, 3), 96..240);
    }
}
