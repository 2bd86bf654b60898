//! Device-free checks of the kernel contract: compile diagnostics, stage
//! linking and parameter reflection all run through naga alone.

use fractaldive_core::{KernelParams, ViewState, WORKGROUP_SIZE};
use fractaldive_gpu::{
    compile_stage, link_program, load_shader_source, GpuError, ParamBlock, ParamValue, StageKind,
    KERNEL_SOURCE, PARAM_CENTER, PARAM_MAX_ITERATIONS, PARAM_RESOLUTION, PARAM_VARIANT,
    PARAM_ZOOM, PRESENT_SOURCE,
};
use std::path::Path;

/// A kernel that only declares part of the parameter block.
const PARTIAL_KERNEL: &str = r#"
struct Params {
    zoom: f64,
    resolution: vec2<i32>,
}

@group(0) @binding(0) var<uniform> params: Params;
@group(0) @binding(1) var output_image: texture_storage_2d<rgba32float, write>;

@compute @workgroup_size(16, 16, 1)
fn main(@builtin(global_invocation_id) gid: vec3<u32>) {
    let px = vec2<i32>(gid.xy);
    if (px.x >= params.resolution.x || px.y >= params.resolution.y) {
        return;
    }
    let shade = f32(params.zoom);
    textureStore(output_image, px, vec4<f32>(shade, shade, shade, 1.0));
}
"#;

#[test]
fn builtin_kernel_declares_all_parameters() {
    let stage = compile_stage("fractal.wgsl", KERNEL_SOURCE, StageKind::Compute).unwrap();
    assert_eq!(stage.workgroup_size(), [WORKGROUP_SIZE, WORKGROUP_SIZE, 1]);

    let program = link_program("kernel", vec![stage]).unwrap();
    let params = program.params().unwrap();
    for name in [
        PARAM_CENTER,
        PARAM_ZOOM,
        PARAM_VARIANT,
        PARAM_MAX_ITERATIONS,
        PARAM_RESOLUTION,
    ] {
        assert!(params.contains(name), "missing {name}");
    }
}

#[test]
fn partial_kernel_links_and_skips_undeclared_uploads() {
    let stage = compile_stage("partial.wgsl", PARTIAL_KERNEL, StageKind::Compute).unwrap();
    let program = link_program("partial", vec![stage]).unwrap();
    let layout = program.params().cloned().unwrap();
    assert!(!layout.contains(PARAM_CENTER));

    let mut block = ParamBlock::new(layout);
    assert!(!block.set(PARAM_CENTER, ParamValue::F64x2([0.0, 0.0])));
    assert!(!block.set(PARAM_VARIANT, ParamValue::I32(1)));
    assert!(block.set(PARAM_ZOOM, ParamValue::F64(2.0)));

    let view = ViewState::default();
    assert_eq!(block.set_kernel_params(&KernelParams::new(&view, (900, 700))), 2);
}

#[test]
fn compile_error_reports_location() {
    let source = KERNEL_SOURCE.replace("let max_iter", "let max_iter: bool");
    let err = compile_stage("edited.wgsl", &source, StageKind::Compute).unwrap_err();
    match err {
        GpuError::Compile {
            source_id,
            diagnostic,
        } => {
            assert_eq!(source_id, "edited.wgsl");
            assert!(diagnostic.contains("wgsl"), "{diagnostic}");
        }
        other => panic!("expected compile error, got {other:?}"),
    }
}

#[test]
fn compile_error_is_recoverable_shader_error() {
    let err = compile_stage("bad.wgsl", "@compute fn", StageKind::Compute).unwrap_err();
    assert!(err.is_shader_error());
}

#[test]
fn vertex_stage_alone_does_not_link() {
    let vs = compile_stage("present.wgsl", PRESENT_SOURCE, StageKind::Vertex).unwrap();
    let err = link_program("vertex-only", vec![vs]).unwrap_err();
    assert!(matches!(err, GpuError::Link { .. }));
    assert!(err.is_shader_error());
}

#[test]
fn two_compute_stages_do_not_link() {
    let a = compile_stage("a.wgsl", KERNEL_SOURCE, StageKind::Compute).unwrap();
    let b = compile_stage("b.wgsl", PARTIAL_KERNEL, StageKind::Compute).unwrap();
    assert!(matches!(
        link_program("double", vec![a, b]),
        Err(GpuError::Link { .. })
    ));
}

#[test]
fn missing_kernel_file_is_shader_io_error() {
    let err = load_shader_source(Path::new("/nonexistent/kernel.wgsl")).unwrap_err();
    assert!(matches!(err, GpuError::ShaderIo { .. }));
    assert!(err.is_shader_error());
}
