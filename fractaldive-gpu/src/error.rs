//! GPU error types.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GpuError {
    /// A shader stage was rejected by the WGSL front-end or validator.
    #[error("Shader compile error ({source_id}):\n{diagnostic}")]
    Compile {
        source_id: String,
        diagnostic: String,
    },

    /// A set of stages could not be linked into a pipeline.
    #[error("Link error ({program}):\n{diagnostic}")]
    Link { program: String, diagnostic: String },

    /// The display, surface or device context could not be created.
    #[error("Context error: {0}")]
    Context(String),

    #[error("No GPU adapter found")]
    NoAdapter,

    #[error("GPU adapter lacks required features: {0:?}")]
    MissingFeatures(wgpu::Features),

    #[error("Failed to create device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),

    #[error("Failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("Surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error("Buffer mapping failed: {0}")]
    BufferMap(#[from] wgpu::BufferAsyncError),

    #[error("Cannot read shader source {path}: {source}")]
    ShaderIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GpuError {
    /// True for errors caused by shader source text, which a caller may
    /// recover from by retrying with different source.
    pub fn is_shader_error(&self) -> bool {
        matches!(
            self,
            GpuError::Compile { .. } | GpuError::Link { .. } | GpuError::ShaderIo { .. }
        )
    }
}
