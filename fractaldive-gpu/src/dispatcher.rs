//! Per-frame compute dispatch of the escape-time kernel.

use crate::device::GpuContext;
use crate::error::GpuError;
use crate::output_image::{OutputImage, SizeChange, SizeTracker, OUTPUT_FORMAT};
use crate::params::ParamBlock;
use crate::program::{CompiledProgram, Pipeline};
use crate::shader::{compile_stage, link_program, StageKind, KERNEL_SOURCE};
use fractaldive_core::{workgroup_count, KernelParams, ViewState, WORKGROUP_SIZE};

/// Bind group layout every kernel is built against: the parameter block at
/// binding 0 and the write-only output image at binding 1.
pub fn kernel_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("kernel_bind_group_layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::StorageTexture {
                    access: wgpu::StorageTextureAccess::WriteOnly,
                    format: OUTPUT_FORMAT,
                    view_dimension: wgpu::TextureViewDimension::D2,
                },
                count: None,
            },
        ],
    })
}

/// Compile, link and build a kernel program from WGSL `source`.
pub fn build_kernel(
    device: &wgpu::Device,
    source_id: &str,
    source: &str,
) -> Result<CompiledProgram, GpuError> {
    let stage = compile_stage(source_id, source, StageKind::Compute)?;
    let expected = [WORKGROUP_SIZE, WORKGROUP_SIZE, 1];
    if stage.workgroup_size() != expected {
        return Err(GpuError::Link {
            program: source_id.to_string(),
            diagnostic: format!(
                "kernel declares @workgroup_size{:?}, dispatcher requires {expected:?}",
                stage.workgroup_size()
            ),
        });
    }
    let linked = link_program(source_id, vec![stage])?;
    CompiledProgram::compute(device, linked, kernel_bind_group_layout(device))
}

/// Build the kernel shipped with the crate.
pub fn build_builtin_kernel(device: &wgpu::Device) -> Result<CompiledProgram, GpuError> {
    build_kernel(device, "builtin:fractal.wgsl", KERNEL_SOURCE)
}

/// Owns the kernel, its parameter buffer and the output image.
pub struct ComputeDispatcher {
    program: CompiledProgram,
    params: ParamBlock,
    uniform_buffer: wgpu::Buffer,
    image: OutputImage,
    tracker: SizeTracker,
    bind_group: wgpu::BindGroup,
}

impl ComputeDispatcher {
    /// `initial_size` is clamped to at least 1×1. Fails with
    /// `GpuError::Link` if `program` is not a compute program.
    pub fn new(
        ctx: &GpuContext,
        program: CompiledProgram,
        initial_size: (u32, u32),
    ) -> Result<Self, GpuError> {
        if !matches!(program.pipeline(), Pipeline::Compute(_)) {
            return Err(GpuError::Link {
                program: program.label().to_string(),
                diagnostic: "dispatcher requires a compute program".into(),
            });
        }

        let size = (initial_size.0.max(1), initial_size.1.max(1));
        let params = ParamBlock::new(program.params().cloned().unwrap_or_default());
        let uniform_buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("kernel_params"),
            size: params.bytes().len() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let image = OutputImage::new(&ctx.device, size);
        let bind_group = Self::create_bind_group(&ctx.device, &program, &uniform_buffer, &image);

        log::info!("Output image allocated at {}x{}", size.0, size.1);

        Ok(Self {
            program,
            params,
            uniform_buffer,
            image,
            tracker: SizeTracker::new(size),
            bind_group,
        })
    }

    fn create_bind_group(
        device: &wgpu::Device,
        program: &CompiledProgram,
        uniform_buffer: &wgpu::Buffer,
        image: &OutputImage,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("kernel_bind_group"),
            layout: program.bind_group_layout(),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(image.view()),
                },
            ],
        })
    }

    /// Reallocate the output image if the drawable size changed.
    pub fn sync_size(&mut self, device: &wgpu::Device, drawable: (u32, u32)) -> SizeChange {
        let change = self.tracker.observe(drawable);
        if let SizeChange::Resized { from, to } = change {
            log::info!(
                "Output image reallocated {}x{} -> {}x{}",
                from.0,
                from.1,
                to.0,
                to.1
            );
            self.image.reallocate(device, to);
            self.bind_group =
                Self::create_bind_group(device, &self.program, &self.uniform_buffer, &self.image);
        }
        change
    }

    /// Upload parameters from `view` and record the kernel dispatch.
    ///
    /// Ending the compute pass here orders the image writes before any later
    /// pass in `encoder` that samples the image.
    pub fn dispatch(
        &mut self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &ViewState,
    ) -> KernelParams {
        let (width, height) = self.image.size();
        let params = KernelParams::new(view, (width, height));
        self.params.set_kernel_params(&params);
        queue.write_buffer(&self.uniform_buffer, 0, self.params.bytes());

        // Checked in `new`.
        let Pipeline::Compute(pipeline) = self.program.pipeline() else {
            return params;
        };

        let (groups_x, groups_y) = workgroup_count(width, height);
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("kernel_pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);
            pass.dispatch_workgroups(groups_x, groups_y, 1);
        }
        log::trace!("Dispatched {groups_x}x{groups_y} workgroups for {width}x{height}");

        params
    }

    pub fn image(&self) -> &OutputImage {
        &self.image
    }

    pub fn program(&self) -> &CompiledProgram {
        &self.program
    }
}
