// fractaldive-core/src/view_state.rs

use crate::{Preset, PresetTable, Variant};

/// Upper bound on per-pixel iterations so a single frame's GPU time stays bounded.
pub const MAX_ITERATION_CEILING: u32 = 100_000;

/// Iteration cap used when no configuration overrides it.
pub const DEFAULT_MAX_ITERATIONS: u32 = 2000;

/// Smallest reachable zoom. Below this the per-pixel step of an f64 plane
/// mapping drops under the ulp of coordinates near 1.0.
pub const MIN_ZOOM: f64 = 1e-13;

/// Largest reachable zoom.
pub const MAX_ZOOM: f64 = 1e4;

/// What is currently being viewed.
///
/// `zoom` is the half-height of the visible region of the complex plane:
/// multiplying it by a factor below one magnifies. It is kept in
/// `[MIN_ZOOM, MAX_ZOOM]`, so it is always positive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewState {
    center: (f64, f64),
    zoom: f64,
    variant: Variant,
    max_iterations: u32,
}

impl ViewState {
    /// Create a view positioned at `preset` for `variant`.
    ///
    /// `max_iterations` is clamped to `1..=MAX_ITERATION_CEILING`.
    pub fn from_preset(variant: Variant, preset: Preset, max_iterations: u32) -> Self {
        let mut state = Self {
            center: (0.0, 0.0),
            zoom: 1.0,
            variant,
            max_iterations: max_iterations.clamp(1, MAX_ITERATION_CEILING),
        };
        state.select(variant, preset);
        state
    }

    pub fn center(&self) -> (f64, f64) {
        self.center
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Move the center by `(dx, dy)` plane units.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        let x = self.center.0 + dx;
        let y = self.center.1 + dy;
        if x.is_finite() && y.is_finite() {
            self.center = (x, y);
        }
    }

    /// Multiply zoom by `factor`, clamped to the reachable range.
    pub fn scale_zoom(&mut self, factor: f64) {
        let zoom = self.zoom * factor;
        if zoom.is_nan() {
            return;
        }
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Switch to `variant` and jump to `preset` in one step.
    pub fn select(&mut self, variant: Variant, preset: Preset) {
        self.variant = variant;
        if preset.is_valid() {
            self.center = preset.center;
            self.zoom = preset.zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        } else {
            log::warn!("Ignoring invalid preset {preset:?} for {variant}");
        }
    }

    pub fn set_max_iterations(&mut self, max_iterations: u32) {
        self.max_iterations = max_iterations.clamp(1, MAX_ITERATION_CEILING);
    }
}

/// Mandelbrot at its default preset with the default iteration cap.
impl Default for ViewState {
    fn default() -> Self {
        Self::from_preset(
            Variant::Mandelbrot,
            PresetTable::default().get(Variant::Mandelbrot),
            DEFAULT_MAX_ITERATIONS,
        )
    }
}
