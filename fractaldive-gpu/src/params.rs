//! Host-side staging of the kernel's uniform parameter block.

use crate::shader::{ParamLayout, ParamType};
use fractaldive_core::{KernelParams, MAX_ITERATION_CEILING};
use std::collections::HashSet;

pub const PARAM_CENTER: &str = "center";
pub const PARAM_ZOOM: &str = "zoom";
pub const PARAM_VARIANT: &str = "variant";
pub const PARAM_MAX_ITERATIONS: &str = "maxIterations";
pub const PARAM_RESOLUTION: &str = "resolution";

/// A value for one named parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamValue {
    F32(f32),
    F64(f64),
    I32(i32),
    U32(u32),
    F64x2([f64; 2]),
    I32x2([i32; 2]),
}

impl ParamValue {
    pub fn param_type(&self) -> ParamType {
        match self {
            ParamValue::F32(_) => ParamType::F32,
            ParamValue::F64(_) => ParamType::F64,
            ParamValue::I32(_) => ParamType::I32,
            ParamValue::U32(_) => ParamType::U32,
            ParamValue::F64x2(_) => ParamType::F64x2,
            ParamValue::I32x2(_) => ParamType::I32x2,
        }
    }

    fn bytes(&self) -> &[u8] {
        match self {
            ParamValue::F32(v) => bytemuck::bytes_of(v),
            ParamValue::F64(v) => bytemuck::bytes_of(v),
            ParamValue::I32(v) => bytemuck::bytes_of(v),
            ParamValue::U32(v) => bytemuck::bytes_of(v),
            ParamValue::F64x2(v) => bytemuck::bytes_of(v),
            ParamValue::I32x2(v) => bytemuck::bytes_of(v),
        }
    }
}

/// Byte image of a program's uniform block.
///
/// Setting a name the program does not declare is not an error: the value is
/// dropped, a warning is logged the first time, and the rest of the block is
/// still uploaded.
#[derive(Debug)]
pub struct ParamBlock {
    layout: ParamLayout,
    bytes: Vec<u8>,
    warned: HashSet<String>,
}

impl ParamBlock {
    pub fn new(layout: ParamLayout) -> Self {
        // Uniform buffers must be non-empty and 16-byte sized.
        let size = (layout.size().max(16) as usize).next_multiple_of(16);
        Self {
            layout,
            bytes: vec![0; size],
            warned: HashSet::new(),
        }
    }

    /// Write `value` into the slot for `name`. Returns false if the program
    /// has no such parameter or declares it with a different type.
    pub fn set(&mut self, name: &str, value: ParamValue) -> bool {
        let Some(slot) = self.layout.slot(name) else {
            self.skip(name, "is not declared by the kernel");
            return false;
        };
        if slot.ty != value.param_type() {
            self.skip(name, "has a different type in the kernel");
            return false;
        }

        let src = value.bytes();
        let start = slot.offset as usize;
        self.bytes[start..start + src.len()].copy_from_slice(src);
        true
    }

    /// Stage every kernel parameter from `params`. Returns how many were
    /// bound.
    pub fn set_kernel_params(&mut self, params: &KernelParams) -> usize {
        let (width, height) = params.resolution;
        [
            (PARAM_CENTER, ParamValue::F64x2([params.center.0, params.center.1])),
            (PARAM_ZOOM, ParamValue::F64(params.zoom)),
            (PARAM_VARIANT, ParamValue::I32(params.variant.index())),
            (
                PARAM_MAX_ITERATIONS,
                ParamValue::I32(saturating_i32(
                    params.max_iterations.min(MAX_ITERATION_CEILING),
                )),
            ),
            (
                PARAM_RESOLUTION,
                ParamValue::I32x2([saturating_i32(width), saturating_i32(height)]),
            ),
        ]
        .into_iter()
        .filter(|(name, value)| self.set(name, *value))
        .count()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn layout(&self) -> &ParamLayout {
        &self.layout
    }

    fn skip(&mut self, name: &str, reason: &str) {
        if self.warned.insert(name.to_string()) {
            log::warn!("Parameter '{name}' {reason}; upload skipped");
        } else {
            log::trace!("Parameter '{name}' {reason}; upload skipped");
        }
    }
}

fn saturating_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::{compile_stage, link_program, StageKind, KERNEL_SOURCE};
    use fractaldive_core::{Variant, ViewState, COMPUTE_PRESETS};

    fn kernel_layout() -> ParamLayout {
        let stage = compile_stage("fractal.wgsl", KERNEL_SOURCE, StageKind::Compute).unwrap();
        link_program("kernel", vec![stage])
            .unwrap()
            .params()
            .cloned()
            .unwrap()
    }

    fn read_f64(bytes: &[u8], offset: u32) -> f64 {
        let start = offset as usize;
        bytemuck::pod_read_unaligned(&bytes[start..start + 8])
    }

    fn read_i32(bytes: &[u8], offset: u32) -> i32 {
        let start = offset as usize;
        bytemuck::pod_read_unaligned(&bytes[start..start + 4])
    }

    #[test]
    fn block_size_is_padded_to_16_bytes() {
        let block = ParamBlock::new(kernel_layout());
        assert_eq!(block.bytes().len() % 16, 0);
        assert!(block.bytes().len() as u32 >= block.layout().size());
    }

    #[test]
    fn empty_layout_still_yields_a_bindable_block() {
        let block = ParamBlock::new(ParamLayout::default());
        assert_eq!(block.bytes().len(), 16);
    }

    #[test]
    fn set_writes_value_at_reflected_offset() {
        let layout = kernel_layout();
        let zoom_offset = layout.slot(PARAM_ZOOM).unwrap().offset;
        let mut block = ParamBlock::new(layout);

        assert!(block.set(PARAM_ZOOM, ParamValue::F64(0.125)));
        assert_eq!(read_f64(block.bytes(), zoom_offset), 0.125);
    }

    #[test]
    fn unknown_name_is_skipped_without_touching_block() {
        let mut block = ParamBlock::new(kernel_layout());
        let before = block.bytes().to_vec();

        assert!(!block.set("colourCycle", ParamValue::F32(1.0)));
        assert!(!block.set("colourCycle", ParamValue::F32(2.0)));
        assert_eq!(block.bytes(), before.as_slice());
    }

    #[test]
    fn type_mismatch_is_skipped() {
        let mut block = ParamBlock::new(kernel_layout());
        assert!(!block.set(PARAM_ZOOM, ParamValue::F32(1.0)));
    }

    #[test]
    fn kernel_params_bind_all_five_slots() {
        let layout = kernel_layout();
        let center = layout.slot(PARAM_CENTER).unwrap().offset;
        let variant = layout.slot(PARAM_VARIANT).unwrap().offset;
        let resolution = layout.slot(PARAM_RESOLUTION).unwrap().offset;

        let view = ViewState::from_preset(
            Variant::Julia,
            COMPUTE_PRESETS.get(Variant::Julia),
            500,
        );
        let params = KernelParams::new(&view, (640, 480));

        let mut block = ParamBlock::new(layout);
        assert_eq!(block.set_kernel_params(&params), 5);

        let bytes = block.bytes();
        assert_eq!(read_f64(bytes, center), 0.0);
        assert_eq!(read_i32(bytes, variant), 2);
        assert_eq!(read_i32(bytes, resolution), 640);
        assert_eq!(read_i32(bytes, resolution + 4), 480);
    }

    #[test]
    fn oversized_iteration_count_is_clamped_not_wrapped() {
        let layout = kernel_layout();
        let offset = layout.slot(PARAM_MAX_ITERATIONS).unwrap().offset;
        let params = KernelParams {
            max_iterations: u32::MAX,
            ..KernelParams::new(&ViewState::default(), (8, 8))
        };

        let mut block = ParamBlock::new(layout);
        block.set_kernel_params(&params);
        assert_eq!(read_i32(block.bytes(), offset), MAX_ITERATION_CEILING as i32);
    }

    #[test]
    fn kernel_params_against_partial_layout_bind_what_exists() {
        let source = r#"
            struct Params { zoom: f64 }
            @group(0) @binding(0) var<uniform> params: Params;
            @compute @workgroup_size(16, 16, 1)
            fn main() { let z = params.zoom; }
        "#;
        let stage = compile_stage("partial.wgsl", source, StageKind::Compute).unwrap();
        let layout = link_program("partial", vec![stage])
            .unwrap()
            .params()
            .cloned()
            .unwrap();

        let view = ViewState::default();
        let mut block = ParamBlock::new(layout);
        assert_eq!(block.set_kernel_params(&KernelParams::new(&view, (8, 8))), 1);
    }
}
