//! One frame: size check, kernel dispatch, presentation.

use crate::device::GpuContext;
use crate::dispatcher::ComputeDispatcher;
use crate::error::GpuError;
use crate::output_image::{OutputImage, SizeChange};
use crate::presenter::Presenter;
use crate::program::CompiledProgram;
use fractaldive_core::{KernelParams, ViewState};

/// What a call to [`FractalRenderer::render_frame`] did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameOutcome {
    Rendered(KernelParams),
    /// Zero-sized drawable; nothing was dispatched or drawn.
    Skipped,
}

/// Owns the kernel dispatcher and the presenter for one surface format.
pub struct FractalRenderer {
    dispatcher: ComputeDispatcher,
    presenter: Presenter,
}

impl FractalRenderer {
    pub fn new(
        ctx: &GpuContext,
        kernel: CompiledProgram,
        target_format: wgpu::TextureFormat,
        initial_size: (u32, u32),
    ) -> Result<Self, GpuError> {
        Ok(Self {
            dispatcher: ComputeDispatcher::new(ctx, kernel, initial_size)?,
            presenter: Presenter::new(&ctx.device, target_format)?,
        })
    }

    /// Render `view` into `target`, whose size is `drawable`.
    ///
    /// Both passes go into one submission; the compute pass finishes writing
    /// the output image before the render pass samples it.
    pub fn render_frame(
        &mut self,
        ctx: &GpuContext,
        target: &wgpu::TextureView,
        drawable: (u32, u32),
        view: &ViewState,
    ) -> FrameOutcome {
        if self.dispatcher.sync_size(&ctx.device, drawable) == SizeChange::Empty {
            return FrameOutcome::Skipped;
        }

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });
        let params = self.dispatcher.dispatch(&ctx.queue, &mut encoder, view);
        self.presenter.draw(
            &ctx.device,
            &mut encoder,
            target,
            drawable,
            self.dispatcher.image(),
        );
        ctx.queue.submit(std::iter::once(encoder.finish()));

        FrameOutcome::Rendered(params)
    }

    /// Run only the kernel (no presentation) and wait for it to finish.
    pub fn compute_only(
        &mut self,
        ctx: &GpuContext,
        drawable: (u32, u32),
        view: &ViewState,
    ) -> FrameOutcome {
        if self.dispatcher.sync_size(&ctx.device, drawable) == SizeChange::Empty {
            return FrameOutcome::Skipped;
        }
        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("compute_encoder"),
            });
        let params = self.dispatcher.dispatch(&ctx.queue, &mut encoder, view);
        ctx.queue.submit(std::iter::once(encoder.finish()));
        ctx.device.poll(wgpu::Maintain::Wait);
        FrameOutcome::Rendered(params)
    }

    pub fn image(&self) -> &OutputImage {
        self.dispatcher.image()
    }

    pub fn dispatcher(&self) -> &ComputeDispatcher {
        &self.dispatcher
    }
}
