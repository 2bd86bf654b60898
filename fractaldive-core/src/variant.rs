// fractaldive-core/src/variant.rs

use serde::{Deserialize, Serialize};

/// Fixed constant `k` used by the Julia variant (z ← z² + k), the "Douady
/// rabbit" whose filled Julia set has interior around the origin.
pub const JULIA_CONSTANT: (f64, f64) = (-0.122_561, 0.744_862);

/// One of the supported escape-time formulas.
///
/// The discriminant is the value uploaded to the kernel's `variant`
/// parameter, so it must stay in sync with the `switch` in the WGSL kernel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// z₀ = 0, z ← z² + c
    #[default]
    Mandelbrot = 1,
    /// z₀ = pixel, z ← z² + k with `JULIA_CONSTANT`
    Julia = 2,
    /// z₀ = 0, z ← (|Re z| + i|Im z|)² + c
    BurningShip = 3,
    /// z₀ = 0, z ← conj(z)² + c
    Tricorn = 4,
}

impl Variant {
    pub const ALL: [Variant; 4] = [
        Variant::Mandelbrot,
        Variant::Julia,
        Variant::BurningShip,
        Variant::Tricorn,
    ];

    /// Kernel-side index (1..=4).
    pub fn index(self) -> i32 {
        self as i32
    }

    pub fn from_index(index: i32) -> Option<Variant> {
        Self::ALL.into_iter().find(|v| v.index() == index)
    }

    /// Position in `ALL` and in preset tables.
    pub fn slot(self) -> usize {
        (self.index() - 1) as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Variant::Mandelbrot => "Mandelbrot",
            Variant::Julia => "Julia",
            Variant::BurningShip => "Burning Ship",
            Variant::Tricorn => "Tricorn",
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_one_based_and_contiguous() {
        let indices: Vec<i32> = Variant::ALL.iter().map(|v| v.index()).collect();
        assert_eq!(indices, vec![1, 2, 3, 4]);
    }

    #[test]
    fn from_index_round_trips_supported_values() {
        for v in Variant::ALL {
            assert_eq!(Variant::from_index(v.index()), Some(v));
        }
    }

    #[test]
    fn from_index_rejects_unknown_values() {
        assert_eq!(Variant::from_index(0), None);
        assert_eq!(Variant::from_index(5), None);
        assert_eq!(Variant::from_index(-1), None);
    }

    #[test]
    fn slot_matches_position_in_all() {
        for (i, v) in Variant::ALL.iter().enumerate() {
            assert_eq!(v.slot(), i);
        }
    }

    #[test]
    fn deserializes_from_snake_case() {
        let v: Variant = serde_json::from_str("\"burning_ship\"").unwrap();
        assert_eq!(v, Variant::BurningShip);
    }
}
