//! The RGBA32F image written by the kernel and sampled by the presenter.

use crate::device::GpuContext;
use crate::error::GpuError;

pub const OUTPUT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

const BYTES_PER_PIXEL: u32 = 16;

/// Result of comparing the drawable size with the image size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SizeChange {
    Unchanged,
    Resized { from: (u32, u32), to: (u32, u32) },
    /// The drawable has a zero dimension (e.g. minimized); nothing to render.
    Empty,
}

/// Remembers the last drawable size the image was allocated for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SizeTracker {
    current: (u32, u32),
}

impl SizeTracker {
    pub fn new(initial: (u32, u32)) -> Self {
        Self { current: initial }
    }

    pub fn current(&self) -> (u32, u32) {
        self.current
    }

    /// Compare `drawable` with the tracked size and adopt it if it differs.
    pub fn observe(&mut self, drawable: (u32, u32)) -> SizeChange {
        if drawable.0 == 0 || drawable.1 == 0 {
            return SizeChange::Empty;
        }
        if drawable == self.current {
            return SizeChange::Unchanged;
        }
        let from = self.current;
        self.current = drawable;
        SizeChange::Resized { from, to: drawable }
    }
}

/// GPU texture holding one colour per pixel.
///
/// `generation` increases on every reallocation so holders of views or bind
/// groups can tell theirs are stale.
pub struct OutputImage {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    size: (u32, u32),
    generation: u64,
}

impl OutputImage {
    pub fn new(device: &wgpu::Device, size: (u32, u32)) -> Self {
        let (texture, view) = Self::allocate(device, size);
        Self {
            texture,
            view,
            size,
            generation: 0,
        }
    }

    /// Replace the texture with one of `size`. Previous contents are lost.
    pub fn reallocate(&mut self, device: &wgpu::Device, size: (u32, u32)) {
        let (texture, view) = Self::allocate(device, size);
        self.texture = texture;
        self.view = view;
        self.size = size;
        self.generation += 1;
    }

    fn allocate(device: &wgpu::Device, (width, height): (u32, u32)) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("output_image"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: OUTPUT_FORMAT,
            usage: wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Copy the image back to the host, row-major from the top-left pixel.
    pub async fn read_back(&self, ctx: &GpuContext) -> Result<Vec<[f32; 4]>, GpuError> {
        let (width, height) = self.size;
        let unpadded_row = width * BYTES_PER_PIXEL;
        let padded_row = unpadded_row.next_multiple_of(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);

        let staging = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("output_image_staging"),
            size: u64::from(padded_row) * u64::from(height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("output_image_readback"),
            });
        encoder.copy_texture_to_buffer(
            self.texture.as_image_copy(),
            wgpu::ImageCopyBuffer {
                buffer: &staging,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        ctx.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = futures_channel::oneshot::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        ctx.device.poll(wgpu::Maintain::Wait);

        rx.await
            .map_err(|_| GpuError::Context("read-back channel closed".into()))??;

        let pixels = {
            let mapped = slice.get_mapped_range();
            mapped
                .chunks_exact(padded_row as usize)
                .flat_map(|row| {
                    bytemuck::cast_slice::<u8, [f32; 4]>(&row[..unpadded_row as usize]).to_vec()
                })
                .collect()
        };
        staging.unmap();

        Ok(pixels)
    }
}
