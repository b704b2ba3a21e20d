//! WebGPU render pipeline setup

use glam::Vec2;
use wgpu::util::DeviceExt;

use super::texture::Texture;
use super::vertex::{Vertex, push_quad};
use crate::assets::Assets;
use crate::sim::{GameState, Rect};

/// Main render state: one textured-quad pipeline, one bind group per sprite
pub struct SpriteRenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub pipeline: wgpu::RenderPipeline,
    bucket_bind_group: wgpu::BindGroup,
    droplet_bind_group: wgpu::BindGroup,
    _bucket_texture: Texture,
    _droplet_texture: Texture,
    /// Viewport size in physical pixels
    pub size: (u32, u32),
    /// World (game coordinate) size for NDC mapping
    pub world: Vec2,
}

impl SpriteRenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
        world: Vec2,
        assets: &Assets,
    ) -> Self {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("rain-bucket-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await
            .expect("Failed to create device");

        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sprite_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sprite_bind_group_layout"),
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

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sprite_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sprite_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let bucket_texture = Texture::from_image(&device, &queue, &assets.bucket, "bucket");
        let droplet_texture = Texture::from_image(&device, &queue, &assets.droplet, "droplet");
        let bucket_bind_group = Self::sprite_bind_group(
            &device,
            &bind_group_layout,
            &bucket_texture,
            "bucket_bind_group",
        );
        let droplet_bind_group = Self::sprite_bind_group(
            &device,
            &bind_group_layout,
            &droplet_texture,
            "droplet_bind_group",
        );

        Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            bucket_bind_group,
            droplet_bind_group,
            _bucket_texture: bucket_texture,
            _droplet_texture: droplet_texture,
            size: (width, height),
            world,
        }
    }

    fn sprite_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        texture: &Texture,
        label: &str,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        })
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Convert world coordinates (y-up, origin bottom-left) to NDC
    fn world_to_ndc(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x / self.world.x * 2.0 - 1.0,
            y / self.world.y * 2.0 - 1.0,
        )
    }

    fn rect_vertices(&self, out: &mut Vec<Vertex>, rect: &Rect) {
        let (x0, y0) = self.world_to_ndc(rect.x, rect.y);
        let (x1, y1) = self.world_to_ndc(rect.right(), rect.top());
        push_quad(out, x0, y0, x1, y1);
    }

    /// Clear and draw the bucket plus every active droplet
    pub fn render(&mut self, state: &GameState) -> Result<(), wgpu::SurfaceError> {
        let mut bucket_verts = Vec::with_capacity(6);
        self.rect_vertices(&mut bucket_verts, &state.bucket);

        let mut droplet_verts = Vec::with_capacity(state.droplets.len() * 6);
        for droplet in &state.droplets {
            self.rect_vertices(&mut droplet_verts, &droplet.rect);
        }

        // Recreate buffers each frame (simple approach; could optimize)
        let bucket_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("bucket_vertices"),
                contents: bytemuck::cast_slice(&bucket_verts),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let droplet_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("droplet_vertices"),
                contents: bytemuck::cast_slice(&droplet_verts),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            render_pass.set_pipeline(&self.pipeline);

            render_pass.set_bind_group(0, &self.bucket_bind_group, &[]);
            render_pass.set_vertex_buffer(0, bucket_buffer.slice(..));
            render_pass.draw(0..bucket_verts.len() as u32, 0..1);

            if !droplet_verts.is_empty() {
                render_pass.set_bind_group(0, &self.droplet_bind_group, &[]);
                render_pass.set_vertex_buffer(0, droplet_buffer.slice(..));
                render_pass.draw(0..droplet_verts.len() as u32, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
