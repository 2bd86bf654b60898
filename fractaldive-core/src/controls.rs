// fractaldive-core/src/controls.rs

use crate::{PresetTable, CLASSIC_PRESETS, COMPUTE_PRESETS};
use serde::{Deserialize, Serialize};

/// Input-to-parameter mapping constants.
///
/// Pan moves the center by `step_base * zoom` per frame, zoom-in multiplies
/// zoom by `zoom_in_factor` (< 1), zoom-out by `zoom_out_factor` (> 1).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControlProfile {
    pub step_base: f64,
    pub zoom_in_factor: f64,
    pub zoom_out_factor: f64,
    pub presets: PresetTable,
}

impl ControlProfile {
    /// Mapping of the compute-shader viewer (the default).
    pub const fn compute() -> Self {
        Self {
            step_base: 0.004,
            zoom_in_factor: 0.98,
            zoom_out_factor: 1.02,
            presets: COMPUTE_PRESETS,
        }
    }

    /// Mapping of the fragment-shader viewer.
    pub const fn classic() -> Self {
        Self {
            step_base: 0.002,
            zoom_in_factor: 0.99,
            zoom_out_factor: 1.01,
            presets: CLASSIC_PRESETS,
        }
    }

    /// Look up a built-in profile by name.
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "compute" => Some(Self::compute()),
            "classic" => Some(Self::classic()),
            _ => None,
        }
    }

    /// Check the factor ordering and preset table.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.step_base.is_finite() && self.step_base > 0.0) {
            return Err(format!("step_base must be positive, got {}", self.step_base));
        }
        if !(self.zoom_in_factor > 0.0 && self.zoom_in_factor < 1.0) {
            return Err(format!(
                "zoom_in_factor must be in (0, 1), got {}",
                self.zoom_in_factor
            ));
        }
        if !(self.zoom_out_factor > 1.0 && self.zoom_out_factor.is_finite()) {
            return Err(format!(
                "zoom_out_factor must be finite and > 1, got {}",
                self.zoom_out_factor
            ));
        }
        if let Some(variant) = self.presets.first_invalid() {
            return Err(format!("preset for {variant} has a non-finite center or zoom <= 0"));
        }
        Ok(())
    }
}

impl Default for ControlProfile {
    fn default() -> Self {
        Self::compute()
    }
}
