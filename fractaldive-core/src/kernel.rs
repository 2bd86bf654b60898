// fractaldive-core/src/kernel.rs

//! CPU rendition of the escape-time kernel.
//!
//! Mirrors `fractal.wgsl` step for step (plane mapping and recurrences in
//! f64, palette in f32) so GPU output can be checked against it.

use crate::{Variant, ViewState, JULIA_CONSTANT};

/// Work-group edge length. The WGSL kernel declares
/// `@workgroup_size(16, 16, 1)` and the dispatcher divides by this value.
pub const WORKGROUP_SIZE: u32 = 16;

/// Squared escape radius (|z| > 2).
pub const ESCAPE_RADIUS_SQ: f64 = 4.0;

/// Color of points that never escape within the cap.
pub const INTERIOR_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

const TAU: f32 = 6.283_185_5;
const PALETTE_CYCLES: f32 = 3.0;
const PALETTE_PHASE: [f32; 3] = [0.0, 0.33, 0.67];

/// Snapshot of everything the kernel reads for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KernelParams {
    pub center: (f64, f64),
    pub zoom: f64,
    pub variant: Variant,
    pub max_iterations: u32,
    pub resolution: (u32, u32),
}

impl KernelParams {
    pub fn new(view: &ViewState, resolution: (u32, u32)) -> Self {
        Self {
            center: view.center(),
            zoom: view.zoom(),
            variant: view.variant(),
            max_iterations: view.max_iterations(),
            resolution,
        }
    }
}

/// Outcome of the escape-time test for one point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EscapeResult {
    /// Iteration at which the escape condition triggered, or the cap.
    pub iterations: u32,
    pub escaped: bool,
}

/// Map pixel `(px, py)` to the complex plane.
///
/// One pixel spans `2 * zoom / height` in both axes, so the image aspect ratio
/// matches the window. Row 0 is the top of the image (largest imaginary part)
/// and pixel `(width / 2, height / 2)` lands exactly on `center`.
pub fn plane_point(params: &KernelParams, px: u32, py: u32) -> (f64, f64) {
    let (width, height) = params.resolution;
    let scale = 2.0 * params.zoom / height as f64;
    let dx = px as f64 - width as f64 * 0.5;
    let dy = height as f64 * 0.5 - py as f64;
    (params.center.0 + dx * scale, params.center.1 + dy * scale)
}

/// Run the variant's recurrence from `point` until |z|² > 4 or the cap.
pub fn escape_time(variant: Variant, point: (f64, f64), max_iterations: u32) -> EscapeResult {
    let (mut zx, mut zy, cx, cy) = match variant {
        Variant::Julia => (point.0, point.1, JULIA_CONSTANT.0, JULIA_CONSTANT.1),
        _ => (0.0, 0.0, point.0, point.1),
    };

    for i in 0..max_iterations {
        let zx_sq = zx * zx;
        let zy_sq = zy * zy;
        if zx_sq + zy_sq > ESCAPE_RADIUS_SQ {
            return EscapeResult {
                iterations: i,
                escaped: true,
            };
        }

        let (new_zx, new_zy) = match variant {
            Variant::Mandelbrot | Variant::Julia => (zx_sq - zy_sq + cx, 2.0 * zx * zy + cy),
            Variant::BurningShip => {
                let ax = zx.abs();
                let ay = zy.abs();
                (zx_sq - zy_sq + cx, 2.0 * ax * ay + cy)
            }
            Variant::Tricorn => (zx_sq - zy_sq + cx, -2.0 * zx * zy + cy),
        };
        zx = new_zx;
        zy = new_zy;
    }

    EscapeResult {
        iterations: max_iterations,
        escaped: false,
    }
}

/// Color for an escape result.
///
/// The ratio is formed from the unscaled iteration count in f64 and only then
/// narrowed to f32 for the cosine palette.
pub fn colorize(result: EscapeResult, max_iterations: u32) -> [f32; 4] {
    if !result.escaped || max_iterations == 0 {
        return INTERIOR_COLOR;
    }

    let t = (result.iterations as f64 / max_iterations as f64) as f32;
    let s = t.sqrt() * PALETTE_CYCLES;
    let channel = |phase: f32| 0.5 + 0.5 * (TAU * (s + phase)).cos();

    [
        channel(PALETTE_PHASE[0]),
        channel(PALETTE_PHASE[1]),
        channel(PALETTE_PHASE[2]),
        1.0,
    ]
}

/// Evaluate the kernel for a single pixel.
pub fn shade_pixel(params: &KernelParams, px: u32, py: u32) -> [f32; 4] {
    let point = plane_point(params, px, py);
    let result = escape_time(params.variant, point, params.max_iterations);
    colorize(result, params.max_iterations)
}

/// Evaluate every pixel, row-major from the top-left corner.
pub fn render_reference(params: &KernelParams) -> Vec<[f32; 4]> {
    let (width, height) = params.resolution;
    (0..height)
        .flat_map(|py| (0..width).map(move |px| shade_pixel(params, px, py)))
        .collect()
}

/// Number of work-groups needed to cover `(width, height)`.
pub fn workgroup_count(width: u32, height: u32) -> (u32, u32) {
    (width.div_ceil(WORKGROUP_SIZE), height.div_ceil(WORKGROUP_SIZE))
}
