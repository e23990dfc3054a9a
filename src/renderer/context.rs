//! Forward renderer
//!
//! One pipeline, one render pass per frame. Meshes are uploaded lazily the
//! first time they appear in a visibility list and evicted once every strong
//! handle to them is gone. Per-draw model matrices live in a single uniform
//! buffer addressed with dynamic offsets.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use rustc_hash::FxHashMap;
use wgpu::util::DeviceExt;
use winit::window::Window;

use super::Camera;
use super::material::MaterialTexture;
use super::mesh::{Mesh, Vertex};
use super::texture::Texture;
use crate::assets::{AssetHandle, AssetId, WeakAssetHandle};
use crate::core::LightingConfig;
use crate::ecs::VisibleRenderable;

/// Uniform buffer for camera data
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct CameraUniform {
    view_proj: [[f32; 4]; 4],
    view_pos: [f32; 3],
    _padding: f32,
}

impl CameraUniform {
    fn new() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            view_pos: [0.0; 3],
            _padding: 0.0,
        }
    }

    fn update(&mut self, camera: &Camera) {
        self.view_proj = camera.view_projection_matrix().to_cols_array_2d();
        self.view_pos = camera.position.into();
    }
}

/// Uniform buffer for model transform
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ModelUniform {
    model: [[f32; 4]; 4],
    normal_matrix: [[f32; 4]; 4],
}

impl ModelUniform {
    pub fn from_transform(model: Mat4) -> Self {
        let normal_matrix = model.inverse().transpose();
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: normal_matrix.to_cols_array_2d(),
        }
    }
}

/// Directional light uniform
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct LightUniform {
    direction: [f32; 3],
    _padding1: f32,
    color: [f32; 3],
    _padding2: f32,
    ambient: [f32; 3],
    _padding3: f32,
}

/// Single directional light plus ambient term
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingParameters {
    /// Direction towards the light
    pub direction: Vec3,
    pub color: Vec3,
    pub ambient: Vec3,
}

impl LightingParameters {
    pub fn from_config(config: &LightingConfig) -> Self {
        Self {
            direction: config.direction.normalize_or(Vec3::Y),
            color: config.color,
            ambient: config.ambient,
        }
    }

    fn to_uniform(self) -> LightUniform {
        LightUniform {
            direction: self.direction.into(),
            _padding1: 0.0,
            color: self.color.into(),
            _padding2: 0.0,
            ambient: self.ambient.into(),
            _padding3: 0.0,
        }
    }
}

impl Default for LightingParameters {
    fn default() -> Self {
        Self::from_config(&LightingConfig::default())
    }
}

/// Buffers of an uploaded mesh
struct GpuMesh {
    source: WeakAssetHandle<Mesh>,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    material_bind_group: wgpu::BindGroup,
}

/// Main renderer
pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: (u32, u32),
    render_pipeline: wgpu::RenderPipeline,
    depth_view: wgpu::TextureView,
    camera_uniform: CameraUniform,
    camera_buffer: wgpu::Buffer,
    light_buffer: wgpu::Buffer,
    global_bind_group: wgpu::BindGroup,
    model_bind_group_layout: wgpu::BindGroupLayout,
    model_buffer: wgpu::Buffer,
    model_bind_group: wgpu::BindGroup,
    /// Byte distance between consecutive model uniforms
    model_stride: u64,
    /// Number of model uniforms `model_buffer` can hold
    model_capacity: usize,
    material_bind_group_layout: wgpu::BindGroupLayout,
    white_texture: Texture,
    checker_texture: Texture,
    meshes: FxHashMap<AssetId, GpuMesh>,
    /// Clear color
    pub clear_color: wgpu::Color,
}

impl Renderer {
    /// Create a renderer drawing into `window`
    ///
    /// # Errors
    ///
    /// Returns an error if no surface, adapter, or device can be created
    pub async fn new(window: Arc<Window>, vsync: bool) -> Result<Self, RenderError> {
        let size = window.inner_size();
        let size = (size.width.max(1), size.height.max(1));

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .map_err(|e| RenderError::Surface(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;

        log::info!("Using GPU: {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Sandbox Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .map_err(|e| RenderError::Device(e.to_string()))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| RenderError::Surface("surface reports no formats".to_string()))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let present_mode = if vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.0,
            height: size.1,
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_view = Self::create_depth_view(&device, size.0, size.1);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        // Group 0: camera + light
        let camera_uniform = CameraUniform::new();
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[camera_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let light_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Buffer"),
            contents: bytemuck::cast_slice(&[LightingParameters::default().to_uniform()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let global_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Global Bind Group Layout"),
                entries: &[
                    uniform_entry(0, wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT),
                    uniform_entry(1, wgpu::ShaderStages::FRAGMENT),
                ],
            });

        let global_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Global Bind Group"),
            layout: &global_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: light_buffer.as_entire_binding(),
                },
            ],
        });

        // Group 1: per-draw model matrix at a dynamic offset
        let model_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Model Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: wgpu::BufferSize::new(MODEL_UNIFORM_SIZE),
                    },
                    count: None,
                }],
            });

        let alignment = u64::from(device.limits().min_uniform_buffer_offset_alignment);
        let model_stride = MODEL_UNIFORM_SIZE.div_ceil(alignment) * alignment;
        let model_capacity = INITIAL_MODEL_CAPACITY;
        let (model_buffer, model_bind_group) = Self::create_model_storage(
            &device,
            &model_bind_group_layout,
            model_stride,
            model_capacity,
        );

        // Group 2: material uniform + texture
        let material_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Material Bind Group Layout"),
                entries: &[
                    uniform_entry(0, wgpu::ShaderStages::FRAGMENT),
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let white_texture = Texture::white(&device, &queue);
        let checker_texture = Texture::checkerboard(&device, &queue);

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Render Pipeline Layout"),
                bind_group_layouts: &[
                    &global_bind_group_layout,
                    &model_bind_group_layout,
                    &material_bind_group_layout,
                ],
                push_constant_ranges: &[],
            });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Render Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
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
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            render_pipeline,
            depth_view,
            camera_uniform,
            camera_buffer,
            light_buffer,
            global_bind_group,
            model_bind_group_layout,
            model_buffer,
            model_bind_group,
            model_stride,
            model_capacity,
            material_bind_group_layout,
            white_texture,
            checker_texture,
            meshes: FxHashMap::default(),
            clear_color: wgpu::Color {
                r: 0.1,
                g: 0.1,
                b: 0.1,
                a: 1.0,
            },
        })
    }

    fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width,
                height,
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

    fn create_model_storage(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        stride: u64,
        capacity: usize,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Model Buffer"),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Model Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(MODEL_UNIFORM_SIZE),
                }),
            }],
        });

        (buffer, bind_group)
    }

    /// Resize the renderer
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.size = (width, height);
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view = Self::create_depth_view(&self.device, width, height);

            log::debug!("Resized to {}x{}", width, height);
        }
    }

    /// Surface size in pixels
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Update camera uniform
    pub fn update_camera(&mut self, camera: &Camera) {
        self.camera_uniform.update(camera);
        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[self.camera_uniform]),
        );
    }

    /// Update the light
    pub fn set_lighting(&mut self, lighting: &LightingParameters) {
        self.queue.write_buffer(
            &self.light_buffer,
            0,
            bytemuck::cast_slice(&[lighting.to_uniform()]),
        );
    }

    fn upload_mesh(&self, handle: &AssetHandle<Mesh>) -> GpuMesh {
        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Vertex Buffer"),
                contents: bytemuck::cast_slice(&handle.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Index Buffer"),
                contents: bytemuck::cast_slice(&handle.indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        let material_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Material Buffer"),
                contents: bytemuck::cast_slice(&[handle.material.to_uniform()]),
                usage: wgpu::BufferUsages::UNIFORM,
            });

        let texture = match handle.material.texture {
            MaterialTexture::None => &self.white_texture,
            MaterialTexture::Checker => &self.checker_texture,
        };

        let material_bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Material Bind Group"),
            layout: &self.material_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: material_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        });

        GpuMesh {
            source: handle.downgrade(),
            vertex_buffer,
            index_buffer,
            index_count: handle.index_count(),
            material_bind_group,
        }
    }

    /// Upload new meshes, drop dead ones, and write model matrices
    fn prepare(&mut self, visible: &[VisibleRenderable]) {
        let before = self.meshes.len();
        self.meshes.retain(|_, gpu| gpu.source.is_alive());
        let evicted = before - self.meshes.len();
        if evicted > 0 {
            log::debug!("Evicted {evicted} unused meshes");
        }

        for item in visible {
            let id = item.mesh.id();
            if !self.meshes.contains_key(&id) && !item.mesh.indices.is_empty() {
                let gpu = self.upload_mesh(&item.mesh);
                self.meshes.insert(id, gpu);
            }
        }

        if visible.len() > self.model_capacity {
            self.model_capacity = visible.len().next_power_of_two();
            let (buffer, bind_group) = Self::create_model_storage(
                &self.device,
                &self.model_bind_group_layout,
                self.model_stride,
                self.model_capacity,
            );
            self.model_buffer = buffer;
            self.model_bind_group = bind_group;
        }

        if visible.is_empty() {
            return;
        }
        let stride = self.model_stride as usize;
        let mut data = vec![0_u8; stride * visible.len()];
        for (slot, item) in data.chunks_exact_mut(stride).zip(visible) {
            let uniform = ModelUniform::from_transform(item.transform);
            slot[..MODEL_UNIFORM_SIZE as usize].copy_from_slice(bytemuck::bytes_of(&uniform));
        }
        self.queue.write_buffer(&self.model_buffer, 0, &data);
    }

    /// Draw `visible` in one render pass and present.
    ///
    /// Returns false if the frame was skipped.
    pub fn render(&mut self, visible: &[VisibleRenderable]) -> bool {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return false;
            }
            Err(e) => {
                log::error!("Surface error: {:?}", e);
                return false;
            }
        };

        self.prepare(visible);

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
                        load: wgpu::LoadOp::Clear(self.clear_color),
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

            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.global_bind_group, &[]);

            for (index, item) in visible.iter().enumerate() {
                let Some(gpu) = self.meshes.get(&item.mesh.id()) else {
                    continue;
                };
                let offset = (index as u64 * self.model_stride) as u32;
                render_pass.set_bind_group(1, &self.model_bind_group, &[offset]);
                render_pass.set_bind_group(2, &gpu.material_bind_group, &[]);
                render_pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
                render_pass.set_index_buffer(gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..gpu.index_count, 0, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        true
    }
}

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const MODEL_UNIFORM_SIZE: u64 = std::mem::size_of::<ModelUniform>() as u64;
const INITIAL_MODEL_CAPACITY: usize = 64;

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

/// Errors that can occur while setting up rendering
#[derive(Debug, Clone)]
pub enum RenderError {
    /// Surface creation or configuration failed
    Surface(String),
    /// No compatible GPU adapter
    NoAdapter,
    /// Device request failed
    Device(String),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Surface(e) => write!(f, "Surface error: {e}"),
            Self::NoAdapter => write!(f, "No compatible GPU adapter found"),
            Self::Device(e) => write!(f, "Device error: {e}"),
        }
    }
}

impl std::error::Error for RenderError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_sizes_match_shader() {
        assert_eq!(MODEL_UNIFORM_SIZE, 128);
        assert_eq!(std::mem::size_of::<LightUniform>(), 48);
        assert_eq!(std::mem::size_of::<CameraUniform>(), 80);
    }

    #[test]
    fn test_lighting_from_config_is_normalized() {
        let lighting = LightingParameters::default();
        assert!((lighting.direction.length() - 1.0).abs() < 1e-5);
        assert_eq!(lighting.color, Vec3::new(1.0, 0.8, 0.6));
    }
}
