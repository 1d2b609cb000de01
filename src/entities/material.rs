//! Material - immutable physical properties shared by building blocks

use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw material record as supplied by the metadata source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRecord {
    pub id: i64,

    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Young's modulus in MPa
    #[serde(default)]
    pub young_modulus: Option<f64>,

    /// Density in kg/m³
    #[serde(default)]
    pub density: Option<f64>,

    #[serde(default)]
    pub poisson_ratio: Option<f64>,
}

/// A structural material
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Material {
    pub id: i64,
    pub title: String,
    pub description: String,

    /// Density in kg/m³
    pub density: Option<f64>,

    /// Young's modulus in MPa
    pub young_modulus: Option<f64>,

    pub poisson_ratio: Option<f64>,
}

impl Material {
    /// Young's modulus converted to GPa
    pub fn young_modulus_gpa(&self) -> Option<f64> {
        self.young_modulus.map(|e| e * 1e-3)
    }

    /// Submerged unit weight in kN/m³, taking seawater as 10 kN/m³
    pub fn submerged_unit_weight(&self) -> Option<f64> {
        self.density.map(|rho| 1e-2 * rho - 10.0)
    }
}

impl From<MaterialRecord> for Material {
    fn from(record: MaterialRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            description: record.description.unwrap_or_default(),
            density: crate::core::units::present(record.density),
            young_modulus: crate::core::units::present(record.young_modulus),
            poisson_ratio: crate::core::units::present(record.poisson_ratio),
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}
