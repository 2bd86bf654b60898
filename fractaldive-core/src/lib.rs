pub mod config;
pub mod controls;
pub mod input;
pub mod kernel;
pub mod preset;
pub mod variant;
pub mod view_state;

pub use config::{ConfigError, ControlsConfig, ViewerConfig, WindowConfig, CONFIG_ENV_VAR};
pub use controls::ControlProfile;
pub use input::{FrameCommand, InputAction, InputController, InputSnapshot};
pub use kernel::{
    colorize, escape_time, plane_point, render_reference, shade_pixel, workgroup_count,
    EscapeResult, KernelParams, ESCAPE_RADIUS_SQ, INTERIOR_COLOR, WORKGROUP_SIZE,
};
pub use preset::{Preset, PresetTable, CLASSIC_PRESETS, COMPUTE_PRESETS};
pub use variant::{Variant, JULIA_CONSTANT};
pub use view_state::{
    ViewState, DEFAULT_MAX_ITERATIONS, MAX_ITERATION_CEILING, MAX_ZOOM, MIN_ZOOM,
};
