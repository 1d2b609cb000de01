//! Can truncation at a joint elevation
//!
//! When the transition piece and the monopile overlap (grouted or slip
//! joints), the can that crosses the joint is cut at the joint elevation.
//! The cut keeps the can's material density (mass over volume) and
//! recomputes its height, volume, mass and mass per metre from the new ends.

use std::f64::consts::PI;

use crate::core::error::{GeometryError, Result};
use crate::core::units::{interp_clamped, MM_TO_M};
use crate::processing::tables::TubularRow;

/// Which end of a stack is cut
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanEnd {
    /// The lowest can of the stack gets a new "to" elevation
    Bottom,
    /// The highest can of the stack gets a new "from" elevation
    Top,
}

/// Properties recomputed for a can from its elevations and section
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanProperties {
    /// m
    pub height: f64,
    /// m³
    pub volume: f64,
    /// t
    pub mass: f64,
    /// t/m
    pub rho: f64,
}

/// Recompute height, volume, mass and mass per metre of a can
///
/// Height is the span between the two elevations. Volume is the hollow
/// conical frustum with the row's diameters and wall thickness. Mass is
/// the new volume at the density implied by the row's current mass and
/// volume, so a can without a positive volume is rejected.
pub fn can_adjust_properties(row: &TubularRow) -> Result<CanProperties> {
    if !(row.volume.is_finite() && row.volume > 0.0) {
        return Err(GeometryError::missing(format!(
            "can '{}' has no volume to derive its density from",
            row.title
        )));
    }
    let density = row.mass / row.volume;
    let height = row.elevation_from - row.elevation_to;
    let r1 = row.diameter_from / 2.0;
    let r2 = row.diameter_to / 2.0;
    let volume_out = PI / 3.0 * (r1 * r1 + r1 * r2 + r2 * r2) * height;
    let wall = row.wall_thickness * MM_TO_M;
    let (r1, r2) = (r1 - wall, r2 - wall);
    let volume_in = PI / 3.0 * (r1 * r1 + r1 * r2 + r2 * r2) * height;
    let volume = volume_out - volume_in;
    let mass = volume * density;

    Ok(CanProperties {
        height,
        volume,
        mass,
        rho: mass / height,
    })
}

impl CanProperties {
    fn apply(self, row: &mut TubularRow) {
        row.height = self.height;
        row.volume = self.volume;
        row.mass = self.mass;
        row.rho = self.rho;
    }
}

/// Cut the end can of a stack at `altitude` (mLAT)
///
/// The diameter at the cut is interpolated linearly along the can, clamped
/// to its end diameters.
pub fn can_modification(mut rows: Vec<TubularRow>, altitude: f64, end: CanEnd) -> Result<Vec<TubularRow>> {
    let row = match end {
        CanEnd::Bottom => rows.last_mut(),
        CanEnd::Top => rows.first_mut(),
    }
    .ok_or_else(|| GeometryError::missing("no can to modify at the joint elevation"))?;

    let diameter = interp_clamped(
        altitude,
        (row.elevation_from, row.diameter_from),
        (row.elevation_to, row.diameter_to),
    );
    match end {
        CanEnd::Bottom => {
            row.elevation_to = altitude;
            row.diameter_to = diameter;
        }
        CanEnd::Top => {
            row.elevation_from = altitude;
            row.diameter_from = diameter;
        }
    }
    can_adjust_properties(row)?.apply(row);

    Ok(rows)
}
