//! Rendering system: wgpu device ownership, the three pipelines (sky,
//! ocean, props), and per-frame uniform and instance uploads.
//!
//! The ocean vertex stage re-implements the Gerstner sum from
//! [`crate::ocean::SeaState`]; both are fed from the same packed wave
//! uniforms every frame so the CPU and GPU surfaces cannot drift apart.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};
use log::warn;
use thiserror::Error;
use wgpu::util::DeviceExt;

use crate::ocean::{OceanMesh, OceanVertex};
use crate::params::RecordingConfig;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Ways bringing up or driving the GPU can fail. Surface loss during a
/// frame is handled inline by reconfiguring, not through this type.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create rendering surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter found")]
    NoAdapter,

    #[error("failed to acquire GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
}

/// Uniforms for the sky shader.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct SkyUniforms {
    pub inv_view_proj: [[f32; 4]; 4],
    pub sun_dir: [f32; 3],
    pub _pad0: f32,
    pub camera_pos: [f32; 3],
    pub _pad1: f32,
}

/// Uniforms for the ocean shader: camera, the packed wave trio, and the
/// patch re-centering offset that doubles as the wave phase origin.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct OceanUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub waves: [[f32; 4]; 3],
    pub patch_offset: [f32; 2],
    pub time: f32,
    pub _pad0: f32,
    pub sun_dir: [f32; 3],
    pub _pad1: f32,
    pub camera_pos: [f32; 3],
    pub _pad2: f32,
}

/// Uniforms for the prop shader.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct PropUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub light_dir: [f32; 3],
    pub _pad0: f32,
    pub sun_dir: [f32; 3],
    pub _pad1: f32,
}

/// One drawn prop: a unit cube stretched into place plus a flat color.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct PropInstance {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl PropInstance {
    pub fn new(scale: Vec3, rotation: Quat, translation: Vec3, color: [f32; 4]) -> Self {
        Self {
            model: Mat4::from_scale_rotation_translation(scale, rotation, translation)
                .to_cols_array_2d(),
            color,
        }
    }
}

/// Unit cube vertex (position + face normal), centered on the origin.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct CubeVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// 24 vertices (4 per face, so normals stay flat) and 36 indices.
fn cube_mesh() -> (Vec<CubeVertex>, Vec<u32>) {
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        // (normal, tangent u, tangent v) per face
        ([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (n, u, v) in faces {
        let n3 = Vec3::from(n);
        let u3 = Vec3::from(u);
        let v3 = Vec3::from(v);
        let base = vertices.len() as u32;
        for (su, sv) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
            let p = n3 * 0.5 + u3 * su + v3 * sv;
            vertices.push(CubeVertex {
                position: p.to_array(),
                normal: n,
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    (vertices, indices)
}

const HULL_COLOR: [f32; 4] = [0.85, 0.25, 0.15, 1.0];
const FRAME_COLOR: [f32; 4] = [0.25, 0.25, 0.28, 1.0];
const PAD_COLOR: [f32; 4] = [0.4, 0.43, 0.46, 1.0];

/// Number of instances the helicopter itself contributes.
pub const HELI_INSTANCE_COUNT: usize = 5;

/// The five helicopter props: hull, tail boom, two skids, rotor blade.
/// Hull-local offsets are rotated by the hull so everything tilts and yaws
/// together; the blade alone follows the rotor body plus its visual spin.
pub fn heli_instances(
    hull_position: Vec3,
    hull_orientation: Quat,
    rotor_position: Vec3,
    rotor_orientation: Quat,
    rotor_spin: f32,
) -> [PropInstance; HELI_INSTANCE_COUNT] {
    let part = |scale: Vec3, local_offset: Vec3, color: [f32; 4]| {
        PropInstance::new(
            scale,
            hull_orientation,
            hull_position + hull_orientation * local_offset,
            color,
        )
    };
    [
        part(Vec3::new(1.2, 1.0, 1.2), Vec3::ZERO, HULL_COLOR),
        part(Vec3::new(0.25, 0.25, 1.6), Vec3::new(0.0, 0.25, 1.6), HULL_COLOR),
        part(Vec3::new(0.12, 0.12, 1.5), Vec3::new(-0.55, -0.65, 0.0), FRAME_COLOR),
        part(Vec3::new(0.12, 0.12, 1.5), Vec3::new(0.55, -0.65, 0.0), FRAME_COLOR),
        PropInstance::new(
            Vec3::new(0.1, 0.02, 5.0),
            rotor_orientation * Quat::from_rotation_y(rotor_spin),
            rotor_position,
            FRAME_COLOR,
        ),
    ]
}

/// A helipad deck at its wave-synchronized pose.
pub fn pad_instance(position: Vec3, orientation: Quat) -> PropInstance {
    PropInstance::new(Vec3::new(5.0, 1.0, 5.0), orientation, position, PAD_COLOR)
}

/// Rendering system managing the wgpu device, pipelines, and buffers.
pub struct RenderSystem {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,

    sky_pipeline: wgpu::RenderPipeline,
    sky_uniform_buffer: wgpu::Buffer,
    sky_bind_group: wgpu::BindGroup,

    ocean_pipeline: wgpu::RenderPipeline,
    ocean_wireframe_pipeline: Option<wgpu::RenderPipeline>,
    ocean_vertex_buffer: wgpu::Buffer,
    ocean_index_buffer: wgpu::Buffer,
    ocean_index_count: u32,
    ocean_uniform_buffer: wgpu::Buffer,
    ocean_bind_group: wgpu::BindGroup,

    prop_pipeline: wgpu::RenderPipeline,
    cube_vertex_buffer: wgpu::Buffer,
    cube_index_buffer: wgpu::Buffer,
    cube_index_count: u32,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    instance_count: u32,
    prop_uniform_buffer: wgpu::Buffer,
    prop_bind_group: wgpu::BindGroup,

    wireframe: bool,
    recording_config: Option<RecordingConfig>,
}

/// One uniform buffer in a single-entry bind group, the layout every
/// pipeline here uses.
fn uniform_bind_group(
    device: &wgpu::Device,
    label: &str,
    buffer: &wgpu::Buffer,
) -> (wgpu::BindGroupLayout, wgpu::BindGroup) {
    let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout: &layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    });
    (layout, bind_group)
}

fn create_depth_view(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
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

impl RenderSystem {
    /// Bring up the GPU and build every pipeline. `pad_count` sizes the
    /// prop instance buffer (pads plus the helicopter parts).
    pub async fn new(
        window: std::sync::Arc<winit::window::Window>,
        ocean_mesh: &OceanMesh,
        pad_count: usize,
        recording_config: Option<RecordingConfig>,
        wireframe: bool,
    ) -> Result<Self, RenderError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;

        // Wireframe needs line fill mode; take it when the adapter has it
        // and quietly fall back to solid shading when it doesn't.
        let line_mode = adapter
            .features()
            .contains(wgpu::Features::POLYGON_MODE_LINE);
        let required_features = if line_mode {
            wgpu::Features::POLYGON_MODE_LINE
        } else {
            wgpu::Features::empty()
        };

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features,
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let mut usage = wgpu::TextureUsages::RENDER_ATTACHMENT;
        if recording_config.is_some() {
            usage |= wgpu::TextureUsages::COPY_SRC;
        }

        let config = wgpu::SurfaceConfiguration {
            usage,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_view = create_depth_view(&device, &config);

        let sky_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Sky Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/sky.wgsl").into()),
        });
        let ocean_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Ocean Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/ocean.wgsl").into()),
        });
        let prop_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Prop Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/props.wgsl").into()),
        });

        // Sky
        let sky_uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sky Uniform Buffer"),
            contents: bytemuck::cast_slice(&[SkyUniforms::zeroed()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let (sky_layout, sky_bind_group) =
            uniform_bind_group(&device, "Sky Bind Group", &sky_uniform_buffer);

        let sky_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sky Pipeline Layout"),
            bind_group_layouts: &[&sky_layout],
            push_constant_ranges: &[],
        });
        let sky_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Sky Pipeline"),
            layout: Some(&sky_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &sky_shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &sky_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: None,
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
            // The sky sits exactly on the far plane; LessEqual lets it
            // through the cleared depth without writing over anything.
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        // Ocean
        let ocean_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Ocean Vertex Buffer"),
            contents: bytemuck::cast_slice(&ocean_mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let ocean_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Ocean Index Buffer"),
            contents: bytemuck::cast_slice(&ocean_mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let ocean_uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Ocean Uniform Buffer"),
            contents: bytemuck::cast_slice(&[OceanUniforms::zeroed()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let (ocean_layout, ocean_bind_group) =
            uniform_bind_group(&device, "Ocean Bind Group", &ocean_uniform_buffer);

        let ocean_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Ocean Pipeline Layout"),
                bind_group_layouts: &[&ocean_layout],
                push_constant_ranges: &[],
            });

        let ocean_pipeline_with = |mode: wgpu::PolygonMode| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Ocean Pipeline"),
                layout: Some(&ocean_pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &ocean_shader,
                    entry_point: Some("vs_main"),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<OceanVertex>() as wgpu::BufferAddress,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &[wgpu::VertexAttribute {
                            offset: 0,
                            shader_location: 0,
                            format: wgpu::VertexFormat::Float32x3,
                        }],
                    }],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &ocean_shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: config.format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    // Steep crests can fold the surface past edge-on
                    cull_mode: None,
                    polygon_mode: mode,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };
        let ocean_pipeline = ocean_pipeline_with(wgpu::PolygonMode::Fill);
        let ocean_wireframe_pipeline =
            line_mode.then(|| ocean_pipeline_with(wgpu::PolygonMode::Line));
        if wireframe && ocean_wireframe_pipeline.is_none() {
            warn!("adapter lacks line polygon mode; wireframe disabled");
        }

        // Props
        let (cube_vertices, cube_indices) = cube_mesh();
        let cube_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Cube Vertex Buffer"),
            contents: bytemuck::cast_slice(&cube_vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let cube_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Cube Index Buffer"),
            contents: bytemuck::cast_slice(&cube_indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let instance_capacity = pad_count + HELI_INSTANCE_COUNT;
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Prop Instance Buffer"),
            size: (instance_capacity * std::mem::size_of::<PropInstance>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let prop_uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Prop Uniform Buffer"),
            contents: bytemuck::cast_slice(&[PropUniforms::zeroed()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let (prop_layout, prop_bind_group) =
            uniform_bind_group(&device, "Prop Bind Group", &prop_uniform_buffer);

        let prop_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Prop Pipeline Layout"),
            bind_group_layouts: &[&prop_layout],
            push_constant_ranges: &[],
        });
        let prop_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Prop Pipeline"),
            layout: Some(&prop_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &prop_shader,
                entry_point: Some("vs_main"),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<CubeVertex>() as wgpu::BufferAddress,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<PropInstance>() as wgpu::BufferAddress,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            2 => Float32x4, 3 => Float32x4, 4 => Float32x4,
                            5 => Float32x4, 6 => Float32x4
                        ],
                    },
                ],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &prop_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_view,
            sky_pipeline,
            sky_uniform_buffer,
            sky_bind_group,
            ocean_pipeline,
            ocean_wireframe_pipeline,
            ocean_vertex_buffer,
            ocean_index_buffer,
            ocean_index_count: ocean_mesh.indices.len() as u32,
            ocean_uniform_buffer,
            ocean_bind_group,
            prop_pipeline,
            cube_vertex_buffer,
            cube_index_buffer,
            cube_index_count: cube_indices.len() as u32,
            instance_buffer,
            instance_capacity,
            instance_count: 0,
            prop_uniform_buffer,
            prop_bind_group,
            wireframe: wireframe && line_mode,
            recording_config,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, &self.config);
    }

    /// Reconfigure with the current size, for recovering a lost surface.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Flip wireframe and report the resulting state (stays off when the
    /// adapter has no line mode).
    pub fn toggle_wireframe(&mut self) -> bool {
        if self.ocean_wireframe_pipeline.is_some() {
            self.wireframe = !self.wireframe;
        } else {
            warn!("wireframe unavailable on this adapter");
        }
        self.wireframe
    }

    pub fn update_sky_uniforms(&self, uniforms: &SkyUniforms) {
        self.queue
            .write_buffer(&self.sky_uniform_buffer, 0, bytemuck::cast_slice(&[*uniforms]));
    }

    pub fn update_ocean_uniforms(&self, uniforms: &OceanUniforms) {
        self.queue.write_buffer(
            &self.ocean_uniform_buffer,
            0,
            bytemuck::cast_slice(&[*uniforms]),
        );
    }

    pub fn update_prop_uniforms(&self, uniforms: &PropUniforms) {
        self.queue.write_buffer(
            &self.prop_uniform_buffer,
            0,
            bytemuck::cast_slice(&[*uniforms]),
        );
    }

    /// Upload this frame's prop instances; anything past the buffer's
    /// capacity is dropped with a warning.
    pub fn update_instances(&mut self, instances: &[PropInstance]) {
        let count = if instances.len() > self.instance_capacity {
            warn!(
                "prop instance overflow: {} > capacity {}",
                instances.len(),
                self.instance_capacity
            );
            self.instance_capacity
        } else {
            instances.len()
        };
        self.queue.write_buffer(
            &self.instance_buffer,
            0,
            bytemuck::cast_slice(&instances[..count]),
        );
        self.instance_count = count as u32;
    }

    /// Render a frame (and capture it if recording).
    pub fn render(&self, frame_num: usize) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
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
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.sky_pipeline);
            render_pass.set_bind_group(0, &self.sky_bind_group, &[]);
            render_pass.draw(0..3, 0..1);

            let ocean_pipeline = match (&self.ocean_wireframe_pipeline, self.wireframe) {
                (Some(line), true) => line,
                _ => &self.ocean_pipeline,
            };
            render_pass.set_pipeline(ocean_pipeline);
            render_pass.set_bind_group(0, &self.ocean_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.ocean_vertex_buffer.slice(..));
            render_pass
                .set_index_buffer(self.ocean_index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..self.ocean_index_count, 0, 0..1);

            render_pass.set_pipeline(&self.prop_pipeline);
            render_pass.set_bind_group(0, &self.prop_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.cube_vertex_buffer.slice(..));
            render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            render_pass
                .set_index_buffer(self.cube_index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..self.cube_index_count, 0, 0..self.instance_count);
        }

        self.queue.submit(std::iter::once(encoder.finish()));

        if let Some(ref config) = self.recording_config {
            self.capture_frame(frame_num, config, &output);
        }

        output.present();

        Ok(())
    }

    /// Copy the frame out of the surface texture and save it as a PNG.
    /// Failures degrade the recording, never the simulation.
    fn capture_frame(
        &self,
        frame_num: usize,
        config: &RecordingConfig,
        texture: &wgpu::SurfaceTexture,
    ) {
        let width = self.config.width;
        let height = self.config.height;
        let bytes_per_pixel = 4; // RGBA8 / BGRA8
        let unpadded_bytes_per_row = width * bytes_per_pixel;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_bytes_per_row = (unpadded_bytes_per_row + align - 1) / align * align;

        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Capture Buffer"),
            size: (padded_bytes_per_row * height) as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Capture Encoder"),
            });

        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &texture.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &buffer,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        self.queue.submit(std::iter::once(encoder.finish()));

        let buffer_slice = buffer.slice(..);
        buffer_slice.map_async(wgpu::MapMode::Read, |_| {});
        self.device.poll(wgpu::Maintain::Wait);

        let data = buffer_slice.get_mapped_range();
        let mut image_data = vec![0u8; (width * height * bytes_per_pixel) as usize];
        for y in 0..height {
            let padded_offset = (y * padded_bytes_per_row) as usize;
            let unpadded_offset = (y * unpadded_bytes_per_row) as usize;
            image_data[unpadded_offset..unpadded_offset + unpadded_bytes_per_row as usize]
                .copy_from_slice(
                    &data[padded_offset..padded_offset + unpadded_bytes_per_row as usize],
                );
        }
        drop(data);
        buffer.unmap();

        // Surfaces are commonly BGRA; swizzle so the PNG comes out right.
        let bgra = matches!(
            self.config.format,
            wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb
        );
        if bgra {
            for pixel in image_data.chunks_exact_mut(4) {
                pixel.swap(0, 2);
            }
        }

        let frame_path = format!("{}/frame_{:05}.png", config.frames_dir(), frame_num);
        if let Err(e) = image::save_buffer(
            &frame_path,
            &image_data,
            width,
            height,
            image::ColorType::Rgba8,
        ) {
            warn!("failed to save frame {frame_num}: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn validate_wgsl(source: &str) {
        let module = naga::front::wgsl::parse_str(source).expect("WGSL parse failed");
        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator.validate(&module).expect("WGSL validation failed");
    }

    #[test]
    fn test_sky_shader_validates() {
        validate_wgsl(include_str!("shaders/sky.wgsl"));
    }

    #[test]
    fn test_ocean_shader_validates() {
        validate_wgsl(include_str!("shaders/ocean.wgsl"));
    }

    #[test]
    fn test_props_shader_validates() {
        validate_wgsl(include_str!("shaders/props.wgsl"));
    }

    #[test]
    fn test_uniform_sizes_are_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<SkyUniforms>() % 16, 0);
        assert_eq!(std::mem::size_of::<OceanUniforms>() % 16, 0);
        assert_eq!(std::mem::size_of::<PropUniforms>() % 16, 0);
        // 4 matrix columns + color, matching the instance attribute layout
        assert_eq!(std::mem::size_of::<PropInstance>(), 80);
    }

    #[test]
    fn test_cube_mesh_shape() {
        let (vertices, indices) = cube_mesh();
        assert_eq!(vertices.len(), 24);
        assert_eq!(indices.len(), 36);
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));

        // Every corner of the unit cube lies on the half-extent box.
        for v in &vertices {
            for c in v.position {
                assert_relative_eq!(c.abs(), 0.5);
            }
        }
    }

    #[test]
    fn test_heli_instances_follow_the_hull() {
        let hull_pos = glam::Vec3::new(10.0, 5.0, -3.0);
        let rotor_pos = hull_pos + glam::Vec3::Y;
        let instances = heli_instances(hull_pos, Quat::IDENTITY, rotor_pos, Quat::IDENTITY, 0.0);
        assert_eq!(instances.len(), HELI_INSTANCE_COUNT);

        // Hull cube translation is the last matrix column.
        let hull_model = Mat4::from_cols_array_2d(&instances[0].model);
        assert_eq!(hull_model.w_axis.truncate(), hull_pos);

        // The blade rides the rotor body, one unit above.
        let blade_model = Mat4::from_cols_array_2d(&instances[4].model);
        assert_eq!(blade_model.w_axis.truncate(), rotor_pos);
    }

    #[test]
    fn test_pad_instance_spans_the_collider() {
        let instance = pad_instance(glam::Vec3::new(1.0, 0.2, 3.0), Quat::IDENTITY);
        let model = Mat4::from_cols_array_2d(&instance.model);
        // 5 m wide and 1 m tall: twice the physics half-extents.
        assert_relative_eq!(model.x_axis.length(), 5.0, epsilon = 1e-6);
        assert_relative_eq!(model.y_axis.length(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(model.z_axis.length(), 5.0, epsilon = 1e-6);
    }
}
