//! GPU side of the fractal viewer: shader compilation and linking, the
//! escape-time compute dispatch and the full-screen presentation pass.

mod device;
mod dispatcher;
mod error;
mod output_image;
mod params;
mod presenter;
mod program;
mod renderer;
mod shader;

pub use device::{GpuAvailability, GpuContext, REQUIRED_FEATURES};
pub use dispatcher::{build_builtin_kernel, build_kernel, kernel_bind_group_layout, ComputeDispatcher};
pub use error::GpuError;
pub use output_image::{OutputImage, SizeChange, SizeTracker, OUTPUT_FORMAT};
pub use params::{
    ParamBlock, ParamValue, PARAM_CENTER, PARAM_MAX_ITERATIONS, PARAM_RESOLUTION, PARAM_VARIANT,
    PARAM_ZOOM,
};
pub use presenter::{Presenter, QuadVertex, CLEAR_COLOR, QUAD_VERTICES};
pub use program::{CompiledProgram, Pipeline};
pub use renderer::{FractalRenderer, FrameOutcome};
pub use shader::{
    compile_stage, link_program, LinkedProgram, LinkedStage, ParamLayout, ParamSlot, ParamType,
    ShaderStage, StageKind, KERNEL_SOURCE, PRESENT_SOURCE,
};

/// Read a WGSL file from disk.
pub fn load_shader_source(path: &std::path::Path) -> Result<String, GpuError> {
    std::fs::read_to_string(path).map_err(|source| GpuError::ShaderIo {
        path: path.to_path_buf(),
        source,
    })
}
