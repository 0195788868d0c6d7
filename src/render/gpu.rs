use std::collections::HashMap;

use crate::foundation::core::TextureHandle;
use crate::foundation::error::{UifxError, UifxResult};
use crate::render::backend::{
    BackendStats, DrawCommand, RenderBackend, TARGET_BYTES_PER_TEXEL, TargetDesc, TexturePixels,
};
use crate::render::mesh::CellVertex;

const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const TRANSFORM_BYTES: u64 = 32;

const CELL_SHADER: &str = r#"
struct Xform {
  m: vec4<f32>,
  t: vec4<f32>,
};

@group(0) @binding(0) var<uniform> xf: Xform;

struct VsIn {
  @location(0) pos: vec2<f32>,
  @location(1) color: vec4<f32>,
};

struct VsOut {
  @builtin(position) pos: vec4<f32>,
  @location(0) @interpolate(flat) color: vec4<f32>,
};

@vertex
fn vs(in: VsIn) -> VsOut {
  let x = xf.m.x * in.pos.x + xf.m.z * in.pos.y + xf.t.x;
  let y = xf.m.y * in.pos.x + xf.m.w * in.pos.y + xf.t.y;
  var o: VsOut;
  o.pos = vec4<f32>(x, y, 0.0, 1.0);
  o.color = in.color;
  return o;
}

@fragment
fn fs(in: VsOut) -> @location(0) vec4<f32> {
  return in.color;
}
"#;

struct GpuTarget {
    desc: TargetDesc,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

struct CellPipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    transform: wgpu::Buffer,
}

struct DynamicBuffer {
    buffer: wgpu::Buffer,
    capacity: u64,
}

/// wgpu implementation of [`RenderBackend`].
///
/// Targets are `Rgba8Unorm` render attachments. Cell meshes go through growable vertex and index
/// buffers and one non-blended pipeline.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    sampler: wgpu::Sampler,
    cells: Option<CellPipeline>,
    vertices: Option<DynamicBuffer>,
    indices: Option<DynamicBuffer>,
    targets: HashMap<TextureHandle, GpuTarget>,
    stats: BackendStats,
}

impl WgpuBackend {
    pub fn new() -> UifxResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(|e| match e {
            wgpu::RequestAdapterError::NotFound { .. } => {
                UifxError::render("no gpu adapter available")
            }
            other => UifxError::render(format!("wgpu request_adapter failed: {other:?}")),
        })?;

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("uifx_device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults(),
            experimental_features: wgpu::ExperimentalFeatures::default(),
            memory_hints: wgpu::MemoryHints::MemoryUsage,
            trace: wgpu::Trace::Off,
        }))
        .map_err(|e| UifxError::render(format!("wgpu request_device failed: {e:?}")))?;

        // Parameters must never be interpolated or wrapped when sampled.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("uifx_param_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Ok(Self {
            device,
            queue,
            sampler,
            cells: None,
            vertices: None,
            indices: None,
            targets: HashMap::new(),
            stats: BackendStats::default(),
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Point/clamp sampler consumers should pair with parameter textures.
    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    pub fn texture_view(&self, handle: TextureHandle) -> Option<&wgpu::TextureView> {
        self.targets.get(&handle).map(|t| &t.view)
    }

    fn ensure_cell_pipeline(&mut self) {
        if self.cells.is_some() {
            return;
        }
        let device = &self.device;

        let transform = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uifx_cell_transform"),
            size: TRANSFORM_BYTES,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uifx_cell_bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(TRANSFORM_BYTES),
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uifx_cell_bg"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: transform.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("uifx_cell_shader"),
            source: wgpu::ShaderSource::Wgsl(CELL_SHADER.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("uifx_cell_pl"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let vertex_attributes = wgpu::vertex_attr_array![0 => Float32x2, 1 => Unorm8x4];
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("uifx_cell_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<CellVertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &vertex_attributes,
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: TARGET_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        self.cells = Some(CellPipeline {
            pipeline,
            bind_group,
            transform,
        });
    }
}

fn ensure_dynamic_buffer<'a>(
    device: &wgpu::Device,
    slot: &'a mut Option<DynamicBuffer>,
    label: &'static str,
    usage: wgpu::BufferUsages,
    needed: u64,
) -> &'a wgpu::Buffer {
    if slot.as_ref().is_some_and(|b| b.capacity < needed) {
        *slot = None;
    }
    let grown = slot.get_or_insert_with(|| {
        let capacity = needed.next_power_of_two().max(256);
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: capacity,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        DynamicBuffer { buffer, capacity }
    });
    &grown.buffer
}

fn align_to(value: u32, alignment: u32) -> u32 {
    let mask = alignment - 1;
    (value + mask) & !mask
}

impl RenderBackend for WgpuBackend {
    fn ensure_target(&mut self, handle: TextureHandle, desc: &TargetDesc) -> UifxResult<()> {
        if self.targets.get(&handle).is_some_and(|t| t.desc == *desc) {
            return Ok(());
        }
        if desc.width == 0 || desc.height == 0 {
            return Err(UifxError::render("render target must be at least 1x1"));
        }
        let max = self.device.limits().max_texture_dimension_2d;
        if desc.width > max || desc.height > max {
            return Err(UifxError::render(format!(
                "parameter target {}x{} exceeds device limit {max}",
                desc.width, desc.height
            )));
        }

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("uifx_param_texture"),
            size: wgpu::Extent3d {
                width: desc.width,
                height: desc.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        // Fresh targets start transparent black, same as the CPU backend.
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("uifx_target_clear"),
            });
        {
            let _rp = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("uifx_target_clear_rp"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }
        self.queue.submit(Some(encoder.finish()));

        tracing::debug!(
            target_id = handle.0,
            width = desc.width,
            height = desc.height,
            "create gpu parameter target"
        );
        self.targets.insert(
            handle,
            GpuTarget {
                desc: *desc,
                texture,
                view,
            },
        );
        self.stats.targets_created = self.stats.targets_created.saturating_add(1);
        Ok(())
    }

    fn draw_cells(&mut self, cmd: &DrawCommand<'_>) -> UifxResult<()> {
        if cmd.mesh.is_empty() {
            return Ok(());
        }
        self.ensure_cell_pipeline();

        let vertex_bytes: &[u8] = bytemuck::cast_slice(cmd.mesh.vertices());
        let index_bytes: &[u8] = bytemuck::cast_slice(cmd.mesh.indices());
        let vertex_buffer = ensure_dynamic_buffer(
            &self.device,
            &mut self.vertices,
            "uifx_cell_vertices",
            wgpu::BufferUsages::VERTEX,
            vertex_bytes.len() as u64,
        );
        self.queue.write_buffer(vertex_buffer, 0, vertex_bytes);
        let index_buffer = ensure_dynamic_buffer(
            &self.device,
            &mut self.indices,
            "uifx_cell_indices",
            wgpu::BufferUsages::INDEX,
            index_bytes.len() as u64,
        );
        self.queue.write_buffer(index_buffer, 0, index_bytes);

        let cells = self
            .cells
            .as_ref()
            .ok_or_else(|| UifxError::render("gpu cell pipeline not initialized"))?;
        let [a, b, c, d, e, f] = cmd.transform.as_coeffs();
        let xform: [f32; 8] = [
            a as f32, b as f32, c as f32, d as f32, e as f32, f as f32, 0.0, 0.0,
        ];
        self.queue
            .write_buffer(&cells.transform, 0, bytemuck::cast_slice(&xform));

        let target = self.targets.get(&cmd.target).ok_or_else(|| {
            UifxError::render(format!(
                "draw target {:?} was not initialized",
                cmd.target
            ))
        })?;
        let vertex_buffer = self
            .vertices
            .as_ref()
            .ok_or_else(|| UifxError::render("gpu vertex buffer not initialized"))?;
        let index_buffer = self
            .indices
            .as_ref()
            .ok_or_else(|| UifxError::render("gpu index buffer not initialized"))?;

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("uifx_cell_encoder"),
            });
        {
            let mut rp = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("uifx_cell_rp"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rp.set_pipeline(&cells.pipeline);
            rp.set_bind_group(0, &cells.bind_group, &[]);
            rp.set_vertex_buffer(0, vertex_buffer.buffer.slice(..vertex_bytes.len() as u64));
            rp.set_index_buffer(
                index_buffer.buffer.slice(..index_bytes.len() as u64),
                wgpu::IndexFormat::Uint32,
            );
            rp.draw_indexed(0..cmd.mesh.indices().len() as u32, 0, 0..1);
        }
        self.queue.submit(Some(encoder.finish()));

        self.stats.draws = self.stats.draws.saturating_add(1);
        self.stats.triangles = self
            .stats
            .triangles
            .saturating_add(cmd.mesh.triangle_count() as u64);
        Ok(())
    }

    fn readback_rgba8(&mut self, handle: TextureHandle) -> UifxResult<TexturePixels> {
        let target = self.targets.get(&handle).ok_or_else(|| {
            UifxError::render(format!("readback target {handle:?} was not initialized"))
        })?;
        let TargetDesc { width, height } = target.desc;

        let row_bytes = width
            .checked_mul(TARGET_BYTES_PER_TEXEL)
            .ok_or_else(|| UifxError::render("readback row size overflow"))?;
        let padded_row_bytes = align_to(row_bytes, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);
        let buffer_size = (padded_row_bytes as u64)
            .checked_mul(height as u64)
            .ok_or_else(|| UifxError::render("readback buffer size overflow"))?;

        let readback = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uifx_readback"),
            size: buffer_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("uifx_readback_encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &target.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row_bytes),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(Some(encoder.finish()));

        let slice = readback.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = tx.send(res);
        });
        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|e| UifxError::render(format!("wgpu poll failed: {e:?}")))?;
        rx.recv()
            .map_err(|_| UifxError::render("readback channel closed"))?
            .map_err(|e| UifxError::render(format!("readback map failed: {e:?}")))?;

        let mapped = slice.get_mapped_range();
        let mut data = Vec::with_capacity(row_bytes as usize * height as usize);
        for row in 0..height as usize {
            let start = row * padded_row_bytes as usize;
            data.extend_from_slice(&mapped[start..start + row_bytes as usize]);
        }
        drop(mapped);
        readback.unmap();

        Ok(TexturePixels {
            width,
            height,
            data,
        })
    }

    fn stats(&self) -> BackendStats {
        self.stats
    }
}
