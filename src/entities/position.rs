//! Position - 6-DOF placement with a vertical datum

use serde::{Deserialize, Serialize};

/// Default vertical reference system
pub const DEFAULT_REFERENCE_SYSTEM: &str = "LAT";

/// Placement of a building block or subassembly
///
/// Coordinates are in mm; rotations in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub reference_system: String,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            alpha: 0.0,
            beta: 0.0,
            gamma: 0.0,
            reference_system: DEFAULT_REFERENCE_SYSTEM.to_string(),
        }
    }
}

impl Position {
    /// Translation-only placement in the default datum
    pub fn at(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            ..Self::default()
        }
    }

    /// Build a position from optional raw fields, NaN and absent become zero
    pub fn from_raw(
        xyz: [Option<f64>; 3],
        rotations: [Option<f64>; 3],
        reference_system: Option<&str>,
    ) -> Self {
        let v = |o: Option<f64>| crate::core::units::present(o).unwrap_or(0.0);
        Self {
            x: v(xyz[0]),
            y: v(xyz[1]),
            z: v(xyz[2]),
            alpha: v(rotations[0]),
            beta: v(rotations[1]),
            gamma: v(rotations[2]),
            reference_system: reference_system
                .filter(|s| !s.is_empty())
                .unwrap_or(DEFAULT_REFERENCE_SYSTEM)
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_defaults() {
        let pos = Position::at(1.0, 2.0, 3.0);
        assert_eq!((pos.x, pos.y, pos.z), (1.0, 2.0, 3.0));
        assert_eq!(pos.alpha, 0.0);
        assert_eq!(pos.reference_system, "LAT");
    }

    #[test]
    fn test_position_from_raw() {
        let pos = Position::from_raw(
            [Some(1.0), None, Some(f64::NAN)],
            [None, Some(90.0), None],
            Some("MSL"),
        );
        assert_eq!(pos.y, 0.0);
        assert_eq!(pos.z, 0.0);
        assert_eq!(pos.beta, 90.0);
        assert_eq!(pos.reference_system, "MSL");
    }
}
