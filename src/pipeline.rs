// ============================================================================
// pipeline.rs — LifeRewind
// Grid render pipeline: cell storage buffer, view uniforms, bind groups.
// ============================================================================

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::camera::CameraUniforms;
use crate::config::SandboxConfig;
use crate::grid::Grid;

/// Per-frame view parameters consumed by the fragment shader. `hover_*` is
/// the cell under the cursor while editing, or -1 when none.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ViewParams {
    pub width: u32,
    pub height: u32,
    pub hover_x: i32,
    pub hover_y: i32,
}

/// The fullscreen pipeline that draws the cell grid, plus the buffers it
/// reads. Cells are uploaded as one u32 per cell each frame.
pub struct GridPipeline {
    pub render_pipeline: wgpu::RenderPipeline,
    pub bind_group: wgpu::BindGroup,
    pub camera_buffer: wgpu::Buffer,
    pub view_params_buffer: wgpu::Buffer,
    pub cell_buffer: wgpu::Buffer,
    grid_width: u32,
    grid_height: u32,
    staging: Vec<u32>,
}

pub fn create_grid_pipeline(
    device: &wgpu::Device,
    config: &SandboxConfig,
    surface_format: wgpu::TextureFormat,
) -> GridPipeline {
    let shader = load_shader(device, "render_grid", include_str!("shaders/render_grid.wgsl"));

    let cell_count = config.grid_width * config.grid_height;
    let cell_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("cells"),
        size: (cell_count * std::mem::size_of::<u32>()) as u64,
        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("camera"),
        contents: bytemuck::bytes_of(&CameraUniforms {
            offset: [0.0, 0.0],
            stride: 1.0,
            fill: 1.0,
        }),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });

    let view_params = ViewParams {
        width: config.grid_width as u32,
        height: config.grid_height as u32,
        hover_x: -1,
        hover_y: -1,
    };
    let view_params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("view_params"),
        contents: bytemuck::bytes_of(&view_params),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });

    let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("grid_bgl"),
        entries: &[bgl_uniform(0), bgl_uniform(1), bgl_storage_ro(2)],
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("grid_bg"),
        layout: &bgl,
        entries: &[
            bg_buffer(0, &camera_buffer),
            bg_buffer(1, &view_params_buffer),
            bg_buffer(2, &cell_buffer),
        ],
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("grid_pipeline_layout"),
        bind_group_layouts: &[&bgl],
        push_constant_ranges: &[],
    });

    let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("grid_pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    });

    GridPipeline {
        render_pipeline,
        bind_group,
        camera_buffer,
        view_params_buffer,
        cell_buffer,
        grid_width: config.grid_width as u32,
        grid_height: config.grid_height as u32,
        staging: vec![0; cell_count],
    }
}

impl GridPipeline {
    /// Upload the displayed grid and this frame's view uniforms.
    pub fn upload(
        &mut self,
        queue: &wgpu::Queue,
        grid: &Grid,
        camera: &CameraUniforms,
        hover: Option<(usize, usize)>,
    ) {
        for (packed, &cell) in self.staging.iter_mut().zip(grid.cells()) {
            *packed = cell as u32;
        }
        queue.write_buffer(&self.cell_buffer, 0, bytemuck::cast_slice(&self.staging));
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(camera));

        let (hover_x, hover_y) = match hover {
            Some((x, y)) => (x as i32, y as i32),
            None => (-1, -1),
        };
        let view_params = ViewParams {
            width: self.grid_width,
            height: self.grid_height,
            hover_x,
            hover_y,
        };
        queue.write_buffer(&self.view_params_buffer, 0, bytemuck::bytes_of(&view_params));
    }
}

// ======================== Helpers ========================

fn load_shader(device: &wgpu::Device, label: &str, source: &str) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    })
}

fn bgl_uniform(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn bgl_storage_ro(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only: true },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn bg_buffer(binding: u32, buffer: &wgpu::Buffer) -> wgpu::BindGroupEntry<'_> {
    wgpu::BindGroupEntry {
        binding,
        resource: buffer.as_entire_binding(),
    }
}
