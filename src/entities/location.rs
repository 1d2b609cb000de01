//! Turbine location

use serde::{Deserialize, Serialize};

/// Location record of a turbine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    /// Seabed elevation in mLAT, i.e. the water depth
    pub elevation: f64,
}
