// fractaldive-core/src/preset.rs

use crate::Variant;
use serde::{Deserialize, Serialize};

/// A known good `(center, zoom)` view restored when a variant is selected.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub center: (f64, f64),
    pub zoom: f64,
}

impl Preset {
    pub const fn new(center: (f64, f64), zoom: f64) -> Self {
        Self { center, zoom }
    }

    pub fn is_valid(&self) -> bool {
        self.center.0.is_finite()
            && self.center.1.is_finite()
            && self.zoom.is_finite()
            && self.zoom > 0.0
    }
}

/// One preset per variant, indexed by `Variant::slot()`.
///
/// Different front-ends ship different tables for the same variant numbers.
/// Each table is an independent configuration input and none of them is
/// treated as canonical.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresetTable {
    presets: [Preset; 4],
}

/// Presets of the compute-shader viewer.
pub const COMPUTE_PRESETS: PresetTable = PresetTable::new([
    Preset::new((-0.5, 0.0), 1.0),
    Preset::new((0.0, 0.0), 1.0),
    Preset::new((0.0, 0.0), 1.0),
    Preset::new((0.0, 0.0), 1.0),
]);

/// Presets of the fragment-shader viewer.
pub const CLASSIC_PRESETS: PresetTable = PresetTable::new([
    Preset::new((-0.2, 0.0), 0.8),
    Preset::new((0.2, 0.0), 1.2),
    Preset::new((0.0, 0.0), 0.8),
    Preset::new((0.0, 0.0), 1.2),
]);

impl PresetTable {
    pub const fn new(presets: [Preset; 4]) -> Self {
        Self { presets }
    }

    pub fn get(&self, variant: Variant) -> Preset {
        self.presets[variant.slot()]
    }

    /// Returns the first variant whose preset is not finite with a positive zoom.
    pub fn first_invalid(&self) -> Option<Variant> {
        Variant::ALL
            .into_iter()
            .find(|v| !self.get(*v).is_valid())
    }
}

impl Default for PresetTable {
    fn default() -> Self {
        COMPUTE_PRESETS
    }
}
