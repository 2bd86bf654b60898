//! Draws the output image onto the window as a full-screen quad.

use crate::error::GpuError;
use crate::output_image::OutputImage;
use crate::program::{CompiledProgram, Pipeline};
use crate::shader::{compile_stage, link_program, StageKind, PRESENT_SOURCE};
use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

/// Background colour visible outside the image viewport.
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.2,
    g: 0.0,
    b: 0.2,
    a: 1.0,
};

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

/// Triangle-strip quad covering clip space. Texture row 0 is the top of the
/// image, so v runs opposite to clip-space y.
pub const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex {
        position: [-1.0, -1.0],
        uv: [0.0, 1.0],
    },
    QuadVertex {
        position: [1.0, -1.0],
        uv: [1.0, 1.0],
    },
    QuadVertex {
        position: [-1.0, 1.0],
        uv: [0.0, 0.0],
    },
    QuadVertex {
        position: [1.0, 1.0],
        uv: [1.0, 0.0],
    },
];

impl QuadVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

fn present_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("present_bind_group_layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    // Rgba32Float is not filterable without an optional feature.
                    sample_type: wgpu::TextureSampleType::Float { filterable: false },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
                count: None,
            },
        ],
    })
}

/// Build the vertex/fragment program that draws the output image quad.
pub(crate) fn build_present_program(
    device: &wgpu::Device,
    target_format: wgpu::TextureFormat,
) -> Result<CompiledProgram, GpuError> {
    let vs = compile_stage("builtin:present.wgsl", PRESENT_SOURCE, StageKind::Vertex)?;
    let fs = compile_stage("builtin:present.wgsl", PRESENT_SOURCE, StageKind::Fragment)?;
    let linked = link_program("present", vec![vs, fs])?;
    CompiledProgram::render(
        device,
        linked,
        present_bind_group_layout(device),
        &[QuadVertex::layout()],
        target_format,
    )
}

/// Render pass sampling the output image into the surface.
pub struct Presenter {
    program: CompiledProgram,
    vertex_buffer: wgpu::Buffer,
    sampler: wgpu::Sampler,
    bind_group: Option<(u64, wgpu::BindGroup)>,
}

impl Presenter {
    pub fn new(device: &wgpu::Device, target_format: wgpu::TextureFormat) -> Result<Self, GpuError> {
        let program = build_present_program(device, target_format)?;

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("fullscreen_quad"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("output_image_sampler"),
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Ok(Self {
            program,
            vertex_buffer,
            sampler,
            bind_group: None,
        })
    }

    fn refresh_bind_group(&mut self, device: &wgpu::Device, image: &OutputImage) {
        if matches!(&self.bind_group, Some((generation, _)) if *generation == image.generation()) {
            return;
        }
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("present_bind_group"),
            layout: self.program.bind_group_layout(),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(image.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        self.bind_group = Some((image.generation(), bind_group));
    }

    /// Clear `target` and draw `image` over a viewport of the image's size,
    /// clipped to `target_size`.
    pub fn draw(
        &mut self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        target_size: (u32, u32),
        image: &OutputImage,
    ) {
        let width = image.size().0.min(target_size.0);
        let height = image.size().1.min(target_size.1);
        self.refresh_bind_group(device, image);
        let (Pipeline::Render(pipeline), Some((_, bind_group))) =
            (self.program.pipeline(), &self.bind_group)
        else {
            log::error!("Program '{}' is not a render program", self.program.label());
            return;
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("present_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_viewport(0.0, 0.0, width as f32, height as f32, 0.0, 1.0);
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.draw(0..QUAD_VERTICES.len() as u32, 0..1);
    }
}
