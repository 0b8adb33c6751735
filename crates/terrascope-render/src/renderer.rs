use terrascope_core::constants::{
    ATMOSPHERE_SEGMENTS, CLOUD_RADIUS, SURFACE_RADIUS, SURFACE_SEGMENTS,
};
use wgpu::util::DeviceExt;

use crate::materials::{Material, MaterialEngine, MeshTransforms};
use crate::mesh::{SphereMesh, SphereVertex};
use crate::satellites::{SatelliteRing, SATELLITE_STYLE, STAR_STYLE};
use crate::shaders::{points_module_source, registry, ProgramKind};
use crate::texture::GpuTexture;
use crate::texture_cache::TextureCache;
use crate::uniforms::{
    AtmosphereUniforms, CloudUniforms, ModelUniforms, PointStyle, SurfaceUniforms, TextureId,
};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// GPU-uploadable camera uniforms. Must match Camera in globals.wgsl.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniforms {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub position: [f32; 4],
}

/// Pack a material's uniform bag into the byte layout its shader expects.
fn packed_uniforms(material: &Material) -> Vec<u8> {
    let bag = material.uniforms();
    match material.kind() {
        ProgramKind::Surface => bytemuck::bytes_of(&SurfaceUniforms::from_bag(bag)).to_vec(),
        ProgramKind::Cloud => bytemuck::bytes_of(&CloudUniforms::from_bag(bag)).to_vec(),
        ProgramKind::Atmosphere => {
            bytemuck::bytes_of(&AtmosphereUniforms::from_bag(bag)).to_vec()
        }
    }
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// GPU side of one material. Rebuilt whenever the material's generation moves.
struct GpuMaterial {
    generation: u64,
    uploaded_revision: u64,
    textures: Vec<TextureId>,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

struct SphereBuffers {
    vertex: wgpu::Buffer,
    index: wgpu::Buffer,
    index_count: u32,
}

impl SphereBuffers {
    fn new(device: &wgpu::Device, label: &str, mesh: &SphereMesh) -> Self {
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-vertices")),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-indices")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex,
            index,
            index_count: mesh.index_count(),
        }
    }
}

struct ModelSlot {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

struct PointCloud {
    instances: wgpu::Buffer,
    count: u32,
    style_bind_group: wgpu::BindGroup,
    model: ModelSlot,
}

/// Owns every GPU resource of the planet scene. Resources are created at
/// init; per frame only uniform buffers are written.
pub struct PlanetRenderer {
    surface_format: wgpu::TextureFormat,
    // Shared layouts
    camera_bgl: wgpu::BindGroupLayout,
    model_bgl: wgpu::BindGroupLayout,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    sampler: wgpu::Sampler,
    fallback: GpuTexture,
    depth_view: wgpu::TextureView,
    // Planet
    surface: GpuMaterial,
    cloud: GpuMaterial,
    atmosphere: GpuMaterial,
    surface_mesh: SphereBuffers,
    cloud_mesh: SphereBuffers,
    atmosphere_mesh: SphereBuffers,
    surface_model: ModelSlot,
    cloud_model: ModelSlot,
    atmosphere_model: ModelSlot,
    // Points
    points_pipeline: wgpu::RenderPipeline,
    satellites: PointCloud,
    stars: PointCloud,
    material_rebuilds: u64,
}

impl PlanetRenderer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        engine: &MaterialEngine,
        textures: &TextureCache<GpuTexture>,
        satellites: &SatelliteRing,
        stars: &[[f32; 3]],
    ) -> Self {
        // -- Shared bind group layouts --
        let camera_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("camera-bgl"),
            entries: &[uniform_entry(
                0,
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            )],
        });
        let model_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("model-bgl"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX)],
        });

        // -- Uniform buffers --
        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("camera-uniforms"),
            size: std::mem::size_of::<CameraUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera-bg"),
            layout: &camera_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("planet-sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let fallback = GpuTexture::solid(device, queue, "fallback-texture", [128, 128, 128, 255], false);

        let depth_view = Self::create_depth_view(device, width, height);

        // -- Meshes --
        let surface_mesh = SphereBuffers::new(
            device,
            "surface-mesh",
            &SphereMesh::new(SURFACE_RADIUS, SURFACE_SEGMENTS, SURFACE_SEGMENTS),
        );
        let cloud_mesh = SphereBuffers::new(
            device,
            "cloud-mesh",
            &SphereMesh::new(CLOUD_RADIUS, SURFACE_SEGMENTS, SURFACE_SEGMENTS),
        );
        let atmosphere_mesh = SphereBuffers::new(
            device,
            "atmosphere-mesh",
            &SphereMesh::new(SURFACE_RADIUS, ATMOSPHERE_SEGMENTS, ATMOSPHERE_SEGMENTS),
        );

        let surface_model = Self::create_model_slot(device, &model_bgl, "surface-model");
        let cloud_model = Self::create_model_slot(device, &model_bgl, "cloud-model");
        let atmosphere_model = Self::create_model_slot(device, &model_bgl, "atmosphere-model");

        // -- Materials --
        let build = |kind| {
            let mut m = GpuMaterial::new(
                device,
                surface_format,
                &camera_bgl,
                &model_bgl,
                engine.material(kind),
                textures,
                &sampler,
                &fallback,
            );
            m.upload(queue, engine.material(kind));
            m
        };
        let surface = build(ProgramKind::Surface);
        let cloud = build(ProgramKind::Cloud);
        let atmosphere = build(ProgramKind::Atmosphere);

        // -- Points pipeline --
        let style_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("point-style-bgl"),
            entries: &[uniform_entry(
                0,
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            )],
        });
        let points_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("points-shader"),
            source: wgpu::ShaderSource::Wgsl(points_module_source().into()),
        });
        let points_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("points-pipeline-layout"),
            bind_group_layouts: &[&camera_bgl, &style_bgl, &model_bgl],
            push_constant_ranges: &[],
        });
        let points_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("points-pipeline"),
            layout: Some(&points_layout),
            vertex: wgpu::VertexState {
                module: &points_module,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<[f32; 3]>() as u64,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3],
                }],
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(depth_state(false)),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &points_module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            multiview: None,
            cache: None,
        });

        let satellites = Self::create_point_cloud(
            device,
            &style_bgl,
            &model_bgl,
            "satellites",
            satellites.points(),
            SATELLITE_STYLE,
        );
        let stars = Self::create_point_cloud(device, &style_bgl, &model_bgl, "stars", stars, STAR_STYLE);
        queue.write_buffer(
            &stars.model.buffer,
            0,
            bytemuck::bytes_of(&model_uniforms(glam::Mat4::IDENTITY)),
        );

        log::info!("planet renderer initialized ({width}x{height}, {surface_format:?})");

        Self {
            surface_format,
            camera_bgl,
            model_bgl,
            camera_buffer,
            camera_bind_group,
            sampler,
            fallback,
            depth_view,
            surface,
            cloud,
            atmosphere,
            surface_mesh,
            cloud_mesh,
            atmosphere_mesh,
            surface_model,
            cloud_model,
            atmosphere_model,
            points_pipeline,
            satellites,
            stars,
            material_rebuilds: 0,
        }
    }

    /// Mirror the material engine onto the GPU. A new generation rebuilds the
    /// pipeline; a changed texture set rebuilds only the bind group; a new
    /// uniform revision is a buffer write. Returns how many pipelines were
    /// rebuilt.
    pub fn sync_materials(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        engine: &MaterialEngine,
        textures: &TextureCache<GpuTexture>,
    ) -> u32 {
        let mut rebuilt = 0;
        for kind in ProgramKind::ALL {
            let material = engine.material(kind);
            let gpu = match kind {
                ProgramKind::Surface => &mut self.surface,
                ProgramKind::Cloud => &mut self.cloud,
                ProgramKind::Atmosphere => &mut self.atmosphere,
            };

            if gpu.generation != material.generation() {
                *gpu = GpuMaterial::new(
                    device,
                    self.surface_format,
                    &self.camera_bgl,
                    &self.model_bgl,
                    material,
                    textures,
                    &self.sampler,
                    &self.fallback,
                );
                rebuilt += 1;
            } else {
                let bound = material.bound_textures();
                if bound != gpu.textures {
                    gpu.bind_group = create_material_bind_group(
                        device,
                        kind,
                        &gpu.bind_group_layout,
                        &gpu.uniform_buffer,
                        &bound,
                        textures,
                        &self.sampler,
                        &self.fallback,
                    );
                    gpu.textures = bound;
                }
            }

            gpu.upload(queue, material);
        }
        self.material_rebuilds += u64::from(rebuilt);
        rebuilt
    }

    /// Per-frame uniform uploads: camera and model matrices.
    pub fn update_frame(
        &self,
        queue: &wgpu::Queue,
        camera: &CameraUniforms,
        transforms: &MeshTransforms,
        satellites: &SatelliteRing,
    ) {
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(camera));
        let write = |slot: &ModelSlot, m: glam::Mat4| {
            queue.write_buffer(&slot.buffer, 0, bytemuck::bytes_of(&model_uniforms(m)));
        };
        write(&self.surface_model, transforms.surface_model());
        write(&self.cloud_model, transforms.cloud_model());
        write(&self.atmosphere_model, transforms.atmosphere_model());
        write(&self.satellites.model, satellites.model(transforms.group()));
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_view = Self::create_depth_view(device, width, height);
    }

    /// Pipeline rebuilds since init, not counting the initial three.
    pub fn material_rebuilds(&self) -> u64 {
        self.material_rebuilds
    }

    /// Encode the scene: stars, surface, clouds, atmosphere glow, satellites.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        show_satellites: bool,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("planet-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_bind_group(0, &self.camera_bind_group, &[]);

        self.draw_points(&mut pass, &self.stars);

        for (material, mesh, model) in [
            (&self.surface, &self.surface_mesh, &self.surface_model),
            (&self.cloud, &self.cloud_mesh, &self.cloud_model),
            (&self.atmosphere, &self.atmosphere_mesh, &self.atmosphere_model),
        ] {
            pass.set_pipeline(&material.pipeline);
            pass.set_bind_group(1, &material.bind_group, &[]);
            pass.set_bind_group(2, &model.bind_group, &[]);
            pass.set_vertex_buffer(0, mesh.vertex.slice(..));
            pass.set_index_buffer(mesh.index.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }

        if show_satellites {
            self.draw_points(&mut pass, &self.satellites);
        }
    }

    // -- Private helpers --

    fn draw_points(&self, pass: &mut wgpu::RenderPass<'_>, cloud: &PointCloud) {
        if cloud.count == 0 {
            return;
        }
        pass.set_pipeline(&self.points_pipeline);
        pass.set_bind_group(1, &cloud.style_bind_group, &[]);
        pass.set_bind_group(2, &cloud.model.bind_group, &[]);
        pass.set_vertex_buffer(0, cloud.instances.slice(..));
        pass.draw(0..6, 0..cloud.count);
    }

    fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth-texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn create_model_slot(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        label: &str,
    ) -> ModelSlot {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::bytes_of(&model_uniforms(glam::Mat4::IDENTITY)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label}-bg")),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        ModelSlot { buffer, bind_group }
    }

    fn create_point_cloud(
        device: &wgpu::Device,
        style_bgl: &wgpu::BindGroupLayout,
        model_bgl: &wgpu::BindGroupLayout,
        label: &str,
        points: &[[f32; 3]],
        style: PointStyle,
    ) -> PointCloud {
        // wgpu rejects zero-sized vertex buffers.
        let placeholder = [[0.0f32; 3]];
        let contents: &[[f32; 3]] = if points.is_empty() { &placeholder } else { points };
        let instances = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-instances")),
            contents: bytemuck::cast_slice(contents),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let style_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-style")),
            contents: bytemuck::bytes_of(&style),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let style_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label}-style-bg")),
            layout: style_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: style_buffer.as_entire_binding(),
            }],
        });
        PointCloud {
            instances,
            count: points.len() as u32,
            style_bind_group,
            model: Self::create_model_slot(device, model_bgl, &format!("{label}-model")),
        }
    }
}

impl GpuMaterial {
    #[allow(clippy::too_many_arguments)]
    fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        camera_bgl: &wgpu::BindGroupLayout,
        model_bgl: &wgpu::BindGroupLayout,
        material: &Material,
        textures: &TextureCache<GpuTexture>,
        sampler: &wgpu::Sampler,
        fallback: &GpuTexture,
    ) -> Self {
        let kind = material.kind();
        let label = kind.label();
        let descriptor = registry(kind);

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{label}-shader")),
            source: wgpu::ShaderSource::Wgsl(descriptor.module_source().into()),
        });

        // Binding 0 is the uniform block, then one binding per texture in
        // declaration order, then the sampler.
        let texture_count = descriptor.texture_uniforms().count() as u32;
        let mut entries = vec![uniform_entry(
            0,
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        )];
        for i in 0..texture_count {
            entries.push(wgpu::BindGroupLayoutEntry {
                binding: 1 + i,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            });
        }
        if texture_count > 0 {
            entries.push(wgpu::BindGroupLayoutEntry {
                binding: 1 + texture_count,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            });
        }
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{label}-bgl")),
            entries: &entries,
        });

        let uniform_bytes = packed_uniforms(material);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-uniforms")),
            contents: &uniform_bytes,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bound = material.bound_textures();
        let bind_group = create_material_bind_group(
            device,
            kind,
            &bind_group_layout,
            &uniform_buffer,
            &bound,
            textures,
            sampler,
            fallback,
        );

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{label}-pipeline-layout")),
            bind_group_layouts: &[camera_bgl, &bind_group_layout, model_bgl],
            push_constant_ranges: &[],
        });

        let (cull_mode, depth_write, blend) = match kind {
            ProgramKind::Surface => (Some(wgpu::Face::Back), true, None),
            ProgramKind::Cloud => (None, false, Some(wgpu::BlendState::ALPHA_BLENDING)),
            ProgramKind::Atmosphere => (
                Some(wgpu::Face::Front),
                false,
                Some(wgpu::BlendState {
                    color: wgpu::BlendComponent {
                        src_factor: wgpu::BlendFactor::SrcAlpha,
                        dst_factor: wgpu::BlendFactor::One,
                        operation: wgpu::BlendOperation::Add,
                    },
                    alpha: wgpu::BlendComponent::OVER,
                }),
            ),
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("{label}-pipeline")),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                buffers: &[SphereVertex::layout()],
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode,
                ..Default::default()
            },
            depth_stencil: Some(depth_state(depth_write)),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            multiview: None,
            cache: None,
        });

        log::debug!("built {label} pipeline (generation {})", material.generation());

        Self {
            generation: material.generation(),
            uploaded_revision: material.uniforms().revision(),
            textures: bound,
            pipeline,
            uniform_buffer,
            bind_group_layout,
            bind_group,
        }
    }

    fn upload(&mut self, queue: &wgpu::Queue, material: &Material) {
        let revision = material.uniforms().revision();
        if revision == self.uploaded_revision {
            return;
        }
        queue.write_buffer(&self.uniform_buffer, 0, &packed_uniforms(material));
        self.uploaded_revision = revision;
    }
}

#[allow(clippy::too_many_arguments)]
fn create_material_bind_group(
    device: &wgpu::Device,
    kind: ProgramKind,
    layout: &wgpu::BindGroupLayout,
    uniform_buffer: &wgpu::Buffer,
    bound: &[TextureId],
    textures: &TextureCache<GpuTexture>,
    sampler: &wgpu::Sampler,
    fallback: &GpuTexture,
) -> wgpu::BindGroup {
    let views: Vec<&wgpu::TextureView> = bound
        .iter()
        .map(|&id| match textures.resource(id) {
            Some(t) => &t.view,
            None => {
                log::warn!("{} material bound to missing texture {id:?}", kind.label());
                &fallback.view
            }
        })
        .collect();

    let mut entries = vec![wgpu::BindGroupEntry {
        binding: 0,
        resource: uniform_buffer.as_entire_binding(),
    }];
    for (i, view) in views.iter().enumerate() {
        entries.push(wgpu::BindGroupEntry {
            binding: 1 + i as u32,
            resource: wgpu::BindingResource::TextureView(view),
        });
    }
    if !views.is_empty() {
        entries.push(wgpu::BindGroupEntry {
            binding: 1 + views.len() as u32,
            resource: wgpu::BindingResource::Sampler(sampler),
        });
    }

    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("{}-bg", kind.label())),
        layout,
        entries: &entries,
    })
}

fn depth_state(write: bool) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: write,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

fn model_uniforms(m: glam::Mat4) -> ModelUniforms {
    ModelUniforms {
        model: m.to_cols_array_2d(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_uniforms_layout() {
        assert_eq!(std::mem::size_of::<CameraUniforms>(), 144);
    }

    #[test]
    fn test_packed_sizes_match_structs() {
        let params = terrascope_core::VisualParams::default();
        let ids = crate::texture_cache::SlotMap {
            day: TextureId(1),
            specular: TextureId(2),
            normal: TextureId(3),
            cloud: TextureId(4),
        };
        let engine = MaterialEngine::new(&params, ids, TextureId(5));
        assert_eq!(packed_uniforms(engine.material(ProgramKind::Surface)).len(), 64);
        assert_eq!(packed_uniforms(engine.material(ProgramKind::Cloud)).len(), 32);
        assert_eq!(packed_uniforms(engine.material(ProgramKind::Atmosphere)).len(), 32);
    }
}
