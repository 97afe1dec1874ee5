//! wgpu side of the scene: lit particle spheres and the container wireframe.
//!
//! The [`Renderer`] lives in eframe's paint callback resources. Each frame the
//! app encodes a [`GpuFrame`] and the particle list into byte buffers with
//! `encase`, and the callback uploads them in `prepare` before drawing.

use eframe::egui_wgpu::wgpu;
use eframe::wgpu::include_wgsl;
use eframe::wgpu::util::DeviceExt;
use encase::{ArrayLength, ShaderSize, ShaderType, StorageBuffer, UniformBuffer};

use crate::camera::Camera;
use crate::container::Container;
use crate::light::{GpuLight, Light, MAX_LIGHTS, pack_lights};
use crate::particle::{GpuParticle, Particle};

#[derive(ShaderType)]
pub struct GpuFrame {
    pub view_matrix: cgmath::Matrix4<f32>,
    pub projection_matrix: cgmath::Matrix4<f32>,
    pub camera_position: cgmath::Vector3<f32>,
    pub light_count: u32,
    pub ambient: cgmath::Vector4<f32>,
    pub lights: [GpuLight; MAX_LIGHTS],
}

#[derive(ShaderType)]
struct GpuParticles<'a> {
    pub length: ArrayLength,
    #[size(runtime)]
    pub particles: &'a [GpuParticle],
}

impl GpuFrame {
    pub fn new(camera: &Camera, aspect: f32, lights: &[Light], ambient: [f32; 4]) -> Self {
        let (lights, light_count) = pack_lights(lights);
        Self {
            view_matrix: camera.view_matrix(),
            projection_matrix: camera.projection_matrix(aspect),
            camera_position: camera.position,
            light_count,
            ambient: ambient.into(),
            lights,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, encase::internal::Error> {
        let size = <GpuFrame as ShaderSize>::SHADER_SIZE.get() as usize;
        let mut uniform = UniformBuffer::new(Vec::with_capacity(size));
        uniform.write(self)?;
        Ok(uniform.into_inner())
    }
}

pub fn encode_particles(particles: &[Particle]) -> Result<Vec<u8>, encase::internal::Error> {
    let particles: Vec<GpuParticle> = particles.iter().map(Particle::to_gpu).collect();
    let mut storage = StorageBuffer::new(vec![]);
    storage.write(&GpuParticles {
        length: ArrayLength,
        particles: &particles,
    })?;
    Ok(storage.into_inner())
}

fn encode_edges(container: &Container) -> Result<Vec<u8>, encase::internal::Error> {
    let mut storage = StorageBuffer::new(vec![]);
    storage.write(&container.edges())?;
    Ok(storage.into_inner())
}

pub struct Renderer {
    frame_uniform_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    particles_storage_buffer: wgpu::Buffer,
    particles_storage_buffer_size: usize,
    particles_bind_group_layout: wgpu::BindGroupLayout,
    particles_bind_group: wgpu::BindGroup,
    particles_render_pipeline: wgpu::RenderPipeline,
    border_vertex_buffer: wgpu::Buffer,
    border_render_pipeline: wgpu::RenderPipeline,
}

impl Renderer {
    pub fn new(
        render_state: &eframe::egui_wgpu::RenderState,
        container: &Container,
    ) -> Result<Self, encase::internal::Error> {
        let device = &render_state.device;

        let (particles_shader, border_shader) = rayon::join(
            || device.create_shader_module(include_wgsl!("./shaders/particles.wgsl")),
            || device.create_shader_module(include_wgsl!("./shaders/border.wgsl")),
        );

        let frame_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Frame Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: Some(<GpuFrame as ShaderSize>::SHADER_SIZE),
                    },
                    count: None,
                }],
            });

        let particles_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Particles Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: Some(<GpuParticles as ShaderType>::min_size()),
                    },
                    count: None,
                }],
            });

        const PARTICLES_STORAGE_BUFFER_SIZE: usize =
            <GpuParticles as ShaderType>::METADATA.min_size().get() as _;

        let frame_uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame Uniform Buffer"),
            contents: &[0; <GpuFrame as ShaderSize>::SHADER_SIZE.get() as _],
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::UNIFORM,
        });

        let particles_storage_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particles Storage Buffer"),
            contents: &[0; PARTICLES_STORAGE_BUFFER_SIZE],
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::STORAGE,
        });

        let border_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Border Vertex Buffer"),
            contents: &encode_edges(container)?,
            usage: wgpu::BufferUsages::VERTEX,
        });

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_uniform_buffer.as_entire_binding(),
            }],
        });

        let particles_bind_group = Self::create_particles_bind_group(
            device,
            &particles_bind_group_layout,
            &particles_storage_buffer,
        );

        let particles_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Particles Pipeline Layout"),
                bind_group_layouts: &[&frame_bind_group_layout, &particles_bind_group_layout],
                push_constant_ranges: &[],
            });

        let border_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Border Pipeline Layout"),
            bind_group_layouts: &[&frame_bind_group_layout],
            push_constant_ranges: &[],
        });

        let depth_stencil = wgpu::DepthStencilState {
            format: wgpu::TextureFormat::Depth32Float,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        };

        // Edge endpoints are written as a storage array of vec3, so each one takes 16 bytes.
        let border_vertex_layout = wgpu::VertexBufferLayout {
            array_stride: 16,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![0 => Float32x3],
        };

        let (particles_render_pipeline, border_render_pipeline) = rayon::join(
            || {
                device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some("Particles Render Pipeline"),
                    layout: Some(&particles_pipeline_layout),
                    vertex: wgpu::VertexState {
                        module: &particles_shader,
                        entry_point: "vs_main",
                        buffers: &[],
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &particles_shader,
                        entry_point: "fs_main",
                        targets: &[Some(render_state.target_format.into())],
                    }),
                    primitive: wgpu::PrimitiveState {
                        polygon_mode: wgpu::PolygonMode::Fill,
                        topology: wgpu::PrimitiveTopology::TriangleStrip,
                        ..Default::default()
                    },
                    depth_stencil: Some(depth_stencil.clone()),
                    multisample: wgpu::MultisampleState::default(),
                    multiview: None,
                })
            },
            || {
                device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some("Border Render Pipeline"),
                    layout: Some(&border_pipeline_layout),
                    vertex: wgpu::VertexState {
                        module: &border_shader,
                        entry_point: "vs_main",
                        buffers: &[border_vertex_layout.clone()],
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &border_shader,
                        entry_point: "fs_main",
                        targets: &[Some(render_state.target_format.into())],
                    }),
                    primitive: wgpu::PrimitiveState {
                        polygon_mode: wgpu::PolygonMode::Fill,
                        topology: wgpu::PrimitiveTopology::LineList,
                        ..Default::default()
                    },
                    depth_stencil: Some(depth_stencil.clone()),
                    multisample: wgpu::MultisampleState::default(),
                    multiview: None,
                })
            },
        );

        Ok(Self {
            frame_uniform_buffer,
            frame_bind_group,
            particles_storage_buffer,
            particles_storage_buffer_size: PARTICLES_STORAGE_BUFFER_SIZE,
            particles_bind_group_layout,
            particles_bind_group,
            particles_render_pipeline,
            border_vertex_buffer,
            border_render_pipeline,
        })
    }

    fn create_particles_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Particles Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        })
    }

    pub fn prepare(
        &mut self,
        frame: &[u8],
        particles: &[u8],
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Vec<wgpu::CommandBuffer> {
        queue.write_buffer(&self.frame_uniform_buffer, 0, frame);

        if self.particles_storage_buffer_size >= particles.len() {
            queue.write_buffer(&self.particles_storage_buffer, 0, particles);
        } else {
            log::debug!(
                "Growing particle buffer from {} to {} bytes",
                self.particles_storage_buffer_size,
                particles.len()
            );
            self.particles_storage_buffer =
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Particles Storage Buffer"),
                    contents: particles,
                    usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::STORAGE,
                });
            self.particles_storage_buffer_size = particles.len();
            self.particles_bind_group = Self::create_particles_bind_group(
                device,
                &self.particles_bind_group_layout,
                &self.particles_storage_buffer,
            );
        }

        vec![]
    }

    pub fn paint<'a>(&'a self, sphere_count: u32, render_pass: &mut wgpu::RenderPass<'a>) {
        render_pass.set_pipeline(&self.particles_render_pipeline);
        render_pass.set_bind_group(0, &self.frame_bind_group, &[]);
        render_pass.set_bind_group(1, &self.particles_bind_group, &[]);
        render_pass.draw(0..4, 0..sphere_count);

        render_pass.set_pipeline(&self.border_render_pipeline);
        render_pass.set_bind_group(0, &self.frame_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.border_vertex_buffer.slice(..));
        render_pass.draw(0..24, 0..1);
    }
}
