use crate::error::RenderError;
use crate::shaders::ShaderSources;
use crate::texture::{self, DEPTH_FORMAT, GpuTexture};
use bytemuck::Zeroable;
use glam::Vec4;
use skyline_assets::{FacadeTextureSet, SkyboxImages};
use skyline_common::FacadeTexture;
use skyline_render::frame::{LitUniforms, SkyboxUniforms};
use skyline_render::{
    CityMesh, DepthTest, FRAME_PASSES, FrameUniforms, MeshData, PassKind, SKYBOX_VERTICES, Vertex,
};
use wgpu::util::DeviceExt;

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
    0 => Float32x3,
    1 => Float32x3,
    2 => Float32x2,
    3 => Float32x4,
    4 => Float32,
];

const SKY_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

/// What a scene needs uploaded besides its shaders.
pub struct SceneUpload<'a> {
    pub mesh: &'a CityMesh,
    /// Absent for themes that never sample a facade.
    pub facades: Option<&'a FacadeTextureSet>,
    pub skybox: &'a SkyboxImages,
    pub clear_color: Vec4,
}

/// Vertex and index buffers for one mesh.
struct IndexedMesh {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

impl IndexedMesh {
    /// `None` for an empty mesh; empty buffers cannot be sliced.
    fn upload(device: &wgpu::Device, label: &str, mesh: &MeshData) -> Option<Self> {
        if mesh.is_empty() {
            return None;
        }
        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}_vertex_buffer")),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}_index_buffer")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Some(Self {
            vertices,
            indices,
            index_count: mesh.indices.len() as u32,
        })
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertices.slice(..));
        pass.set_index_buffer(self.indices.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// Every GPU handle a scene owns. Dropped as a unit with the renderer.
struct GpuResources {
    ground: Option<IndexedMesh>,
    boundary: wgpu::Buffer,
    boundary_count: u32,
    buildings: [Option<IndexedMesh>; 2],
    skybox_vertices: wgpu::Buffer,
    facade_bind_groups: [wgpu::BindGroup; 2],
    plain_bind_group: wgpu::BindGroup,
    skybox_bind_group: wgpu::BindGroup,
    _textures: Vec<GpuTexture>,
}

/// wgpu renderer for one city scene.
pub struct CityRenderer {
    ground_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    building_pipeline: wgpu::RenderPipeline,
    skybox_pipeline: wgpu::RenderPipeline,
    lit_uniform_buffer: wgpu::Buffer,
    lit_uniform_bind_group: wgpu::BindGroup,
    sky_uniform_buffer: wgpu::Buffer,
    sky_uniform_bind_group: wgpu::BindGroup,
    resources: GpuResources,
    depth_texture: wgpu::TextureView,
    clear_color: wgpu::Color,
}

fn uniform_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

fn texture_layout(
    device: &wgpu::Device,
    label: &str,
    dimension: wgpu::TextureViewDimension,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: dimension,
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
    })
}

fn texture_bind_group(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
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
    })
}

fn uniform_bind_group(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    })
}

fn depth_state(kind: PassKind) -> wgpu::DepthStencilState {
    let spec = kind.spec();
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: spec.depth_write,
        depth_compare: match spec.depth_test {
            DepthTest::Less => wgpu::CompareFunction::Less,
            DepthTest::LessEqual => wgpu::CompareFunction::LessEqual,
        },
        stencil: Default::default(),
        bias: Default::default(),
    }
}

/// Run `build` inside a validation error scope.
fn validated<T>(device: &wgpu::Device, build: impl FnOnce() -> T) -> Result<T, String> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = build();
    match pollster::block_on(device.pop_error_scope()) {
        Some(err) => Err(err.to_string()),
        None => Ok(value),
    }
}

fn linked<T>(
    device: &wgpu::Device,
    program: &'static str,
    build: impl FnOnce() -> T,
) -> Result<T, RenderError> {
    validated(device, build).map_err(|message| RenderError::ShaderLink { program, message })
}

struct PipelineParts<'a> {
    label: &'a str,
    layout: &'a wgpu::PipelineLayout,
    module: &'a wgpu::ShaderModule,
    entry_points: (&'a str, &'a str),
    buffer: wgpu::VertexBufferLayout<'a>,
    topology: wgpu::PrimitiveTopology,
    pass: PassKind,
    format: wgpu::TextureFormat,
}

fn create_pipeline(device: &wgpu::Device, parts: PipelineParts<'_>) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(parts.label),
        layout: Some(parts.layout),
        vertex: wgpu::VertexState {
            module: parts.module,
            entry_point: Some(parts.entry_points.0),
            compilation_options: Default::default(),
            buffers: &[parts.buffer],
        },
        fragment: Some(wgpu::FragmentState {
            module: parts.module,
            entry_point: Some(parts.entry_points.1),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: parts.format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: parts.topology,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(depth_state(parts.pass)),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}

impl CityRenderer {
    /// Compile both programs and upload the scene.
    ///
    /// Fails with [`RenderError::ShaderLink`] if either program does not
    /// pass validation.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        scene: SceneUpload<'_>,
        shaders: &ShaderSources,
    ) -> Result<Self, RenderError> {
        let uniform_layout = uniform_layout(device, "uniform_bind_group_layout");
        let facade_layout =
            texture_layout(device, "facade_bind_group_layout", wgpu::TextureViewDimension::D2);
        let sky_layout =
            texture_layout(device, "skybox_bind_group_layout", wgpu::TextureViewDimension::Cube);

        let lit_uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("lit_uniform_buffer"),
            contents: bytemuck::bytes_of(&LitUniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let sky_uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sky_uniform_buffer"),
            contents: bytemuck::bytes_of(&SkyboxUniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let lit_uniform_bind_group =
            uniform_bind_group(device, "lit_uniform_bind_group", &uniform_layout, &lit_uniform_buffer);
        let sky_uniform_bind_group =
            uniform_bind_group(device, "sky_uniform_bind_group", &uniform_layout, &sky_uniform_buffer);

        let lit_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("lit_pipeline_layout"),
            bind_group_layouts: &[&uniform_layout, &facade_layout],
            push_constant_ranges: &[],
        });
        let sky_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("skybox_pipeline_layout"),
            bind_group_layouts: &[&uniform_layout, &sky_layout],
            push_constant_ranges: &[],
        });

        let vertex_buffer = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &VERTEX_ATTRIBUTES,
        };

        let (ground_pipeline, line_pipeline, building_pipeline) = linked(device, "lit", || {
            let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("lit_shader"),
                source: wgpu::ShaderSource::Wgsl(shaders.lit.as_str().into()),
            });
            let lit = |label, topology, pass| {
                create_pipeline(
                    device,
                    PipelineParts {
                        label,
                        layout: &lit_layout,
                        module: &module,
                        entry_points: ("vs_main", "fs_main"),
                        buffer: vertex_buffer.clone(),
                        topology,
                        pass,
                        format: surface_format,
                    },
                )
            };
            (
                lit("ground_pipeline", wgpu::PrimitiveTopology::TriangleList, PassKind::Ground),
                lit("line_pipeline", wgpu::PrimitiveTopology::LineList, PassKind::Ground),
                lit("building_pipeline", wgpu::PrimitiveTopology::TriangleList, PassKind::Buildings),
            )
        })?;

        let skybox_pipeline = linked(device, "skybox", || {
            let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("skybox_shader"),
                source: wgpu::ShaderSource::Wgsl(shaders.skybox.as_str().into()),
            });
            create_pipeline(
                device,
                PipelineParts {
                    label: "skybox_pipeline",
                    layout: &sky_pipeline_layout,
                    module: &module,
                    entry_points: ("vs_sky", "fs_sky"),
                    buffer: wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<[f32; 3]>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &SKY_ATTRIBUTES,
                    },
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    pass: PassKind::Skybox,
                    format: surface_format,
                },
            )
        })?;

        let resources = validated(device, || {
            Self::upload_scene(device, queue, &scene, &facade_layout, &sky_layout)
        })
        .map_err(|message| RenderError::Upload { message })?;
        let c = scene.clear_color.as_dvec4();
        tracing::info!(
            building_vertices = scene.mesh.building_vertex_count(),
            skybox_size = scene.skybox.size(),
            "city renderer ready"
        );

        Ok(Self {
            ground_pipeline,
            line_pipeline,
            building_pipeline,
            skybox_pipeline,
            lit_uniform_buffer,
            lit_uniform_bind_group,
            sky_uniform_buffer,
            sky_uniform_bind_group,
            resources,
            depth_texture: texture::create_depth_texture(device, width, height),
            clear_color: wgpu::Color {
                r: c.x,
                g: c.y,
                b: c.z,
                a: c.w,
            },
        })
    }

    fn upload_scene(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        scene: &SceneUpload<'_>,
        facade_layout: &wgpu::BindGroupLayout,
        sky_layout: &wgpu::BindGroupLayout,
    ) -> GpuResources {
        let facade_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("facade_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let sky_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("skybox_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let white = GpuTexture::white(device, queue);
        let plain_bind_group =
            texture_bind_group(device, "plain_bind_group", facade_layout, &white.view, &facade_sampler);

        let facade_textures: Vec<GpuTexture> = match scene.facades {
            Some(set) => FacadeTexture::ALL
                .iter()
                .map(|&t| GpuTexture::from_image(device, queue, "facade_texture", set.get(t)))
                .collect(),
            None => Vec::new(),
        };
        let facade_bind_groups = FacadeTexture::ALL.map(|t| {
            let view = facade_textures.get(t.index()).map_or(&white.view, |tex| &tex.view);
            texture_bind_group(device, "facade_bind_group", facade_layout, view, &facade_sampler)
        });

        let sky = GpuTexture::cube(device, queue, scene.skybox);
        let skybox_bind_group =
            texture_bind_group(device, "skybox_bind_group", sky_layout, &sky.view, &sky_sampler);

        let boundary = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("boundary_vertex_buffer"),
            contents: bytemuck::cast_slice(&scene.mesh.boundary),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let skybox_vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("skybox_vertex_buffer"),
            contents: bytemuck::cast_slice(&SKYBOX_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let mut textures = facade_textures;
        textures.push(white);
        textures.push(sky);

        GpuResources {
            ground: IndexedMesh::upload(device, "ground", &scene.mesh.ground),
            boundary,
            boundary_count: scene.mesh.boundary.len() as u32,
            buildings: FacadeTexture::ALL
                .map(|t| IndexedMesh::upload(device, "building", scene.mesh.buildings_for(t))),
            skybox_vertices,
            facade_bind_groups,
            plain_bind_group,
            skybox_bind_group,
            _textures: textures,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = texture::create_depth_texture(device, width, height);
    }

    /// Draw one frame. Returns `false` if the GPU reported an error while
    /// recording or submitting it.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        frame: &FrameUniforms,
    ) -> bool {
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        queue.write_buffer(&self.lit_uniform_buffer, 0, bytemuck::bytes_of(&frame.lit()));
        queue.write_buffer(&self.sky_uniform_buffer, 0, bytemuck::bytes_of(&frame.skybox()));

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("city_encoder"),
        });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("city_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            let res = &self.resources;
            for spec in FRAME_PASSES {
                match spec.kind {
                    PassKind::Ground => {
                        pass.set_bind_group(0, &self.lit_uniform_bind_group, &[]);
                        pass.set_bind_group(1, &res.plain_bind_group, &[]);
                        if let Some(ground) = &res.ground {
                            pass.set_pipeline(&self.ground_pipeline);
                            ground.draw(&mut pass);
                        }
                        pass.set_pipeline(&self.line_pipeline);
                        pass.set_vertex_buffer(0, res.boundary.slice(..));
                        pass.draw(0..res.boundary_count, 0..1);
                    }
                    PassKind::Buildings => {
                        pass.set_pipeline(&self.building_pipeline);
                        pass.set_bind_group(0, &self.lit_uniform_bind_group, &[]);
                        for texture in FacadeTexture::ALL {
                            if let Some(mesh) = &res.buildings[texture.index()] {
                                pass.set_bind_group(1, &res.facade_bind_groups[texture.index()], &[]);
                                mesh.draw(&mut pass);
                            }
                        }
                    }
                    PassKind::Skybox => {
                        pass.set_pipeline(&self.skybox_pipeline);
                        pass.set_bind_group(0, &self.sky_uniform_bind_group, &[]);
                        pass.set_bind_group(1, &res.skybox_bind_group, &[]);
                        pass.set_vertex_buffer(0, res.skybox_vertices.slice(..));
                        pass.draw(0..SKYBOX_VERTICES.len() as u32, 0..1);
                    }
                }
            }
        }
        queue.submit(std::iter::once(encoder.finish()));

        match pollster::block_on(device.pop_error_scope()) {
            Some(err) => {
                tracing::warn!(%err, "GPU error during frame");
                false
            }
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A headless device, or `None` on machines without an adapter.
    fn device() -> Option<(wgpu::Device, wgpu::Queue)> {
        let instance = wgpu::Instance::default();
        let adapter = pollster::block_on(instance.request_adapter(&Default::default()))?;
        pollster::block_on(adapter.request_device(&Default::default(), None)).ok()
    }

    #[test]
    fn oversized_texture_is_reported_not_raised() {
        let Some((device, _queue)) = device() else {
            return;
        };
        let side = device.limits().max_texture_dimension_2d + 1;
        let result = validated(&device, || {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some("too_big"),
                size: wgpu::Extent3d {
                    width: side,
                    height: 1,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: texture::COLOR_FORMAT,
                usage: wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            })
        });
        let message = result.err().unwrap_or_default();
        assert!(!message.is_empty());
        let err = RenderError::Upload { message };
        assert!(err.to_string().starts_with("scene upload failed"));
    }

    #[test]
    fn broken_shader_fails_to_link() {
        let Some((device, _queue)) = device() else {
            return;
        };
        let result = linked(&device, "lit", || {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("broken"),
                source: wgpu::ShaderSource::Wgsl("fn vs_main( {".into()),
            })
        });
        assert!(matches!(
            result,
            Err(RenderError::ShaderLink { program: "lit", .. })
        ));
    }
}
