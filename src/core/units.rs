//! Numeric helpers shared by the geometry engine
//!
//! Raw records carry millimetres and kilograms; derived tables carry
//! metres, tonnes and mLAT elevations. Rounding is half-to-even so that
//! derived values agree with the reference tables they are checked against.

use std::f64::consts::PI;

/// Millimetres to metres.
pub const MM_TO_M: f64 = 1e-3;

/// Kilograms to tonnes.
pub const KG_TO_T: f64 = 1e-3;

/// Round to `decimals` places, ties to even.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// Volume of a conical frustum.
pub fn frustum_volume(r_bottom: f64, r_top: f64, height: f64) -> f64 {
    PI * height / 3.0 * (r_bottom * r_bottom + r_bottom * r_top + r_top * r_top)
}

/// Volume of a hollow frustum: outer frustum minus inner frustum.
///
/// Radii and wall thickness share one length unit; the result is in that unit cubed.
pub fn hollow_frustum_volume(r_bottom: f64, r_top: f64, wall_thickness: f64, height: f64) -> f64 {
    let outer = frustum_volume(r_bottom, r_top, height);
    let inner = frustum_volume(r_bottom - wall_thickness, r_top - wall_thickness, height);
    outer - inner
}

/// Piecewise-linear interpolation between two points, clamped at the ends.
///
/// The two abscissae may come in any order. Values outside the span take
/// the ordinate of the nearest end.
pub fn interp_clamped(x: f64, (x0, y0): (f64, f64), (x1, y1): (f64, f64)) -> f64 {
    let ((lo_x, lo_y), (hi_x, hi_y)) = if x0 <= x1 {
        ((x0, y0), (x1, y1))
    } else {
        ((x1, y1), (x0, y0))
    };
    if x <= lo_x {
        return lo_y;
    }
    if x >= hi_x {
        return hi_y;
    }
    lo_y + (x - lo_x) * (hi_y - lo_y) / (hi_x - lo_x)
}

/// Treat NaN as absent.
pub fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| !v.is_nan())
}
