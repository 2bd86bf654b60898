//! Device-side programs built from linked stages.

use crate::error::GpuError;
use crate::shader::{LinkedProgram, LinkedStage, ParamLayout, StageKind};

pub enum Pipeline {
    Compute(wgpu::ComputePipeline),
    Render(wgpu::RenderPipeline),
}

/// A linked program together with its wgpu pipeline.
pub struct CompiledProgram {
    label: String,
    pipeline: Pipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    params: Option<ParamLayout>,
    workgroup_size: Option<[u32; 3]>,
}

impl CompiledProgram {
    /// Build a compute pipeline from a linked compute program.
    pub fn compute(
        device: &wgpu::Device,
        linked: LinkedProgram,
        bind_group_layout: wgpu::BindGroupLayout,
    ) -> Result<Self, GpuError> {
        let stage = required_stage(&linked, StageKind::Compute)?;
        let workgroup_size = stage.workgroup_size;

        let pipeline = with_validation_scope(device, &linked.label, || {
            let module = create_module(device, stage);
            let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(linked.label.as_str()),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            });
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(linked.label.as_str()),
                layout: Some(&layout),
                module: &module,
                entry_point: Some(stage.entry_point.as_str()),
                compilation_options: Default::default(),
                cache: None,
            })
        })?;

        log::info!(
            "Built compute program '{}' (workgroup {:?})",
            linked.label,
            workgroup_size
        );

        Ok(Self {
            label: linked.label,
            pipeline: Pipeline::Compute(pipeline),
            bind_group_layout,
            params: linked.params,
            workgroup_size: Some(workgroup_size),
        })
    }

    /// Build a render pipeline drawing a triangle strip into `target_format`.
    pub fn render(
        device: &wgpu::Device,
        linked: LinkedProgram,
        bind_group_layout: wgpu::BindGroupLayout,
        vertex_buffers: &[wgpu::VertexBufferLayout<'_>],
        target_format: wgpu::TextureFormat,
    ) -> Result<Self, GpuError> {
        let vertex = required_stage(&linked, StageKind::Vertex)?;
        let fragment = required_stage(&linked, StageKind::Fragment)?;

        let pipeline = with_validation_scope(device, &linked.label, || {
            let vs_module = create_module(device, vertex);
            let fs_module = create_module(device, fragment);
            let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(linked.label.as_str()),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            });
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(linked.label.as_str()),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &vs_module,
                    entry_point: Some(vertex.entry_point.as_str()),
                    buffers: vertex_buffers,
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &fs_module,
                    entry_point: Some(fragment.entry_point.as_str()),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: target_format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleStrip,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        })?;

        log::info!("Built render program '{}'", linked.label);

        Ok(Self {
            label: linked.label,
            pipeline: Pipeline::Render(pipeline),
            bind_group_layout,
            params: linked.params,
            workgroup_size: None,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    /// Reflected uniform parameters, if the program declares a block.
    pub fn params(&self) -> Option<&ParamLayout> {
        self.params.as_ref()
    }

    /// `@workgroup_size` of a compute program.
    pub fn workgroup_size(&self) -> Option<[u32; 3]> {
        self.workgroup_size
    }
}

fn required_stage(linked: &LinkedProgram, kind: StageKind) -> Result<&LinkedStage, GpuError> {
    linked.stage(kind).ok_or_else(|| GpuError::Link {
        program: linked.label.clone(),
        diagnostic: format!("program has no {kind:?} stage"),
    })
}

fn create_module(device: &wgpu::Device, stage: &LinkedStage) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(stage.source_id.as_str()),
        source: wgpu::ShaderSource::Wgsl(stage.source.as_str().into()),
    })
}

/// Run `build` inside a validation error scope and turn a captured error
/// into `GpuError::Link`.
fn with_validation_scope<T>(
    device: &wgpu::Device,
    label: &str,
    build: impl FnOnce() -> T,
) -> Result<T, GpuError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = build();
    match pollster::block_on(device.pop_error_scope()) {
        None => Ok(value),
        Some(err) => Err(GpuError::Link {
            program: label.to_string(),
            diagnostic: err.to_string(),
        }),
    }
}
