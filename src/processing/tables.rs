//! Typed rows of the derived geometry tables
//!
//! Every table the engine produces is a `Vec` of one of these row types.
//! Serialized field names follow the engineering column headers
//! (`Elevation from [mLAT]`, `Mass [t]`, ...) so JSON output can be fed to
//! existing tooling unchanged.

use serde::Serialize;

use crate::entities::subassembly::SubAssemblyType;

/// A row that can be rendered as a table line
pub trait TableRow: Serialize {
    /// Column headers, in display order
    fn headers() -> Vec<&'static str>
    where
        Self: Sized;

    /// Cell values, in the same order as [`TableRow::headers`]
    fn cells(&self) -> Vec<String>;
}

/// A row that records which structural kind it belongs to
pub trait Tagged {
    fn subassembly(&self) -> Option<SubAssemblyType>;
    fn set_subassembly(&mut self, kind: SubAssemblyType);
}

/// Tag every row of a table with its structural kind
pub fn tag_rows<R: Tagged>(rows: &mut [R], kind: SubAssemblyType) {
    for row in rows {
        row.set_subassembly(kind);
    }
}

/// Format a number for a table cell
pub fn num(value: f64) -> String {
    value.to_string()
}

/// Format an optional number, blank when absent
pub fn opt(value: Option<f64>) -> String {
    value.map(num).unwrap_or_default()
}

fn tag(kind: Option<SubAssemblyType>) -> String {
    kind.map(|k| k.to_string()).unwrap_or_default()
}

macro_rules! impl_tagged {
    ($($ty:ty),*) => {
        $(
            impl Tagged for $ty {
                fn subassembly(&self) -> Option<SubAssemblyType> {
                    self.subassembly
                }

                fn set_subassembly(&mut self, kind: SubAssemblyType) {
                    self.subassembly = Some(kind);
                }
            }
        )*
    };
}

impl_tagged!(TubularRow, RnaRow, LumpedMassRow, DistributedMassRow);

/// Building-block row re-referenced to mLAT, before unit conversion
///
/// Lengths in mm and mass in kg, as in the raw records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureRow {
    pub title: String,
    #[serde(rename = "OD")]
    pub od: String,
    pub height: f64,
    pub mass: f64,
    pub volume: f64,
    pub wall_thickness: f64,
    /// Material id
    pub material: Option<i64>,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(rename = "Elevation from [mLAT]")]
    pub elevation_from: f64,
    #[serde(rename = "Elevation to [mLAT]")]
    pub elevation_to: f64,
}

/// A can of the tower, transition piece, monopile or an assembled stack
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TubularRow {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Elevation from [mLAT]")]
    pub elevation_from: f64,
    #[serde(rename = "Elevation to [mLAT]")]
    pub elevation_to: f64,
    #[serde(rename = "Height [m]")]
    pub height: f64,
    #[serde(rename = "Diameter from [m]")]
    pub diameter_from: f64,
    #[serde(rename = "Diameter to [m]")]
    pub diameter_to: f64,
    #[serde(rename = "Volume [m3]")]
    pub volume: f64,
    #[serde(rename = "Wall thickness [mm]")]
    pub wall_thickness: f64,
    #[serde(rename = "Youngs modulus [GPa]")]
    pub youngs_modulus: f64,
    #[serde(rename = "Poissons ratio [-]")]
    pub poissons_ratio: f64,
    #[serde(rename = "Mass [t]")]
    pub mass: f64,
    #[serde(rename = "rho [t/m]")]
    pub rho: f64,
    #[serde(rename = "Subassembly", skip_serializing_if = "Option::is_none")]
    pub subassembly: Option<SubAssemblyType>,
}

impl TableRow for TubularRow {
    fn headers() -> Vec<&'static str> {
        vec![
            "Title",
            "Elevation from [mLAT]",
            "Elevation to [mLAT]",
            "Height [m]",
            "Diameter from [m]",
            "Diameter to [m]",
            "Volume [m3]",
            "Wall thickness [mm]",
            "Youngs modulus [GPa]",
            "Poissons ratio [-]",
            "Mass [t]",
            "rho [t/m]",
            "Subassembly",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            num(self.elevation_from),
            num(self.elevation_to),
            num(self.height),
            num(self.diameter_from),
            num(self.diameter_to),
            num(self.volume),
            num(self.wall_thickness),
            num(self.youngs_modulus),
            num(self.poissons_ratio),
            num(self.mass),
            num(self.rho),
            tag(self.subassembly),
        ]
    }
}

/// Rotor-nacelle assembly
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RnaRow {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "X [m]")]
    pub x: f64,
    #[serde(rename = "Y [m]")]
    pub y: f64,
    #[serde(rename = "Z [mLAT]")]
    pub z: f64,
    #[serde(rename = "Mass [t]")]
    pub mass: f64,
    #[serde(rename = "Ixx [tm2]")]
    pub ixx: Option<f64>,
    #[serde(rename = "Iyy [tm2]")]
    pub iyy: Option<f64>,
    #[serde(rename = "Izz [tm2]")]
    pub izz: Option<f64>,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Subassembly", skip_serializing_if = "Option::is_none")]
    pub subassembly: Option<SubAssemblyType>,
}

impl TableRow for RnaRow {
    fn headers() -> Vec<&'static str> {
        vec![
            "Title",
            "X [m]",
            "Y [m]",
            "Z [mLAT]",
            "Mass [t]",
            "Ixx [tm2]",
            "Iyy [tm2]",
            "Izz [tm2]",
            "Description",
            "Subassembly",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            num(self.x),
            num(self.y),
            num(self.z),
            num(self.mass),
            opt(self.ixx),
            opt(self.iyy),
            opt(self.izz),
            self.description.clone(),
            tag(self.subassembly),
        ]
    }
}

/// Raw appurtenance (lumped or distributed) with its mLAT elevation
///
/// Lengths in mm and mass in kg, except `z_lat`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppurtenanceRow {
    pub title: String,
    pub mass: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub height: Option<f64>,
    pub volume: Option<f64>,
    pub description: String,
    #[serde(rename = "Z [mLAT]")]
    pub z_lat: f64,
}

/// Point mass attached to the structure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LumpedMassRow {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "X [m]")]
    pub x: f64,
    #[serde(rename = "Y [m]")]
    pub y: f64,
    #[serde(rename = "Z [mLAT]")]
    pub z: f64,
    #[serde(rename = "Mass [t]")]
    pub mass: f64,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Subassembly", skip_serializing_if = "Option::is_none")]
    pub subassembly: Option<SubAssemblyType>,
}

impl From<&RnaRow> for LumpedMassRow {
    fn from(rna: &RnaRow) -> Self {
        Self {
            title: rna.title.clone(),
            x: rna.x,
            y: rna.y,
            z: rna.z,
            mass: rna.mass,
            description: rna.description.clone(),
            subassembly: rna.subassembly,
        }
    }
}

impl TableRow for LumpedMassRow {
    fn headers() -> Vec<&'static str> {
        vec!["Title", "X [m]", "Y [m]", "Z [mLAT]", "Mass [t]", "Description", "Subassembly"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            num(self.x),
            num(self.y),
            num(self.z),
            num(self.mass),
            self.description.clone(),
            tag(self.subassembly),
        ]
    }
}

/// Mass spread uniformly over a height (anodes, grout, ...)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributedMassRow {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "X [m]")]
    pub x: f64,
    #[serde(rename = "Y [m]")]
    pub y: f64,
    #[serde(rename = "Z [mLAT]")]
    pub z: f64,
    #[serde(rename = "Height [m]")]
    pub height: f64,
    #[serde(rename = "Mass [t]")]
    pub mass: f64,
    #[serde(rename = "Volume [m3]")]
    pub volume: Option<f64>,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Subassembly", skip_serializing_if = "Option::is_none")]
    pub subassembly: Option<SubAssemblyType>,
}

impl TableRow for DistributedMassRow {
    fn headers() -> Vec<&'static str> {
        vec![
            "Title",
            "X [m]",
            "Y [m]",
            "Z [mLAT]",
            "Height [m]",
            "Mass [t]",
            "Volume [m3]",
            "Description",
            "Subassembly",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            num(self.x),
            num(self.y),
            num(self.z),
            num(self.height),
            num(self.mass),
            opt(self.volume),
            self.description.clone(),
            tag(self.subassembly),
        ]
    }
}

/// Monopile segment measured from the mudline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PileRow {
    #[serde(rename = "Elevation from [m]")]
    pub elevation_from: f64,
    #[serde(rename = "Elevation to [m]")]
    pub elevation_to: f64,
    #[serde(rename = "Pile material")]
    pub material: String,
    #[serde(rename = "Pile material submerged unit weight [kN/m3]")]
    pub submerged_unit_weight: Option<f64>,
    #[serde(rename = "Wall thickness [mm]")]
    pub wall_thickness: Option<f64>,
    #[serde(rename = "Diameter [m]")]
    pub diameter: f64,
    #[serde(rename = "Youngs modulus [GPa]")]
    pub youngs_modulus: Option<f64>,
    #[serde(rename = "Poissons ratio [-]")]
    pub poissons_ratio: Option<f64>,
}

impl TableRow for PileRow {
    fn headers() -> Vec<&'static str> {
        vec![
            "Elevation from [m]",
            "Elevation to [m]",
            "Pile material",
            "Pile material submerged unit weight [kN/m3]",
            "Wall thickness [mm]",
            "Diameter [m]",
            "Youngs modulus [GPa]",
            "Poissons ratio [-]",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            num(self.elevation_from),
            num(self.elevation_to),
            self.material.clone(),
            opt(self.submerged_unit_weight),
            opt(self.wall_thickness),
            num(self.diameter),
            opt(self.youngs_modulus),
            opt(self.poissons_ratio),
        ]
    }
}

/// Per-turbine line of the fleet summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurbineSummary {
    #[serde(rename = "Turbine name")]
    pub turbine: String,
    #[serde(rename = "Water depth [m]")]
    pub water_depth: f64,
    #[serde(rename = "Monopile toe [m]")]
    pub monopile_toe: Option<f64>,
    #[serde(rename = "Monopile head [m]")]
    pub monopile_head: Option<f64>,
    #[serde(rename = "Tower base [m]")]
    pub tower_base: Option<f64>,
    #[serde(rename = "Monopile height [m]")]
    pub monopile_height: Option<f64>,
    #[serde(rename = "Monopile mass [t]")]
    pub monopile_mass: Option<f64>,
    #[serde(rename = "Transition piece height [m]")]
    pub transition_piece_height: Option<f64>,
    #[serde(rename = "Transition piece mass [t]")]
    pub transition_piece_mass: Option<f64>,
    #[serde(rename = "Tower height [m]")]
    pub tower_height: Option<f64>,
    #[serde(rename = "Tower mass [t]")]
    pub tower_mass: Option<f64>,
    #[serde(rename = "RNA mass [t]")]
    pub rna_mass: Option<f64>,
}

impl TableRow for TurbineSummary {
    fn headers() -> Vec<&'static str> {
        vec![
            "Turbine name",
            "Water depth [m]",
            "Monopile toe [m]",
            "Monopile head [m]",
            "Tower base [m]",
            "Monopile height [m]",
            "Monopile mass [t]",
            "Transition piece height [m]",
            "Transition piece mass [t]",
            "Tower height [m]",
            "Tower mass [t]",
            "RNA mass [t]",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.turbine.clone(),
            num(self.water_depth),
            opt(self.monopile_toe),
            opt(self.monopile_head),
            opt(self.tower_base),
            opt(self.monopile_height),
            opt(self.monopile_mass),
            opt(self.transition_piece_height),
            opt(self.transition_piece_mass),
            opt(self.tower_height),
            opt(self.tower_mass),
            opt(self.rna_mass),
        ]
    }
}

/// A row of a fleet-wide table, labelled with its turbine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetRow<R> {
    #[serde(rename = "Turbine")]
    pub turbine: String,
    #[serde(flatten)]
    pub row: R,
}

impl<R: TableRow> TableRow for FleetRow<R> {
    fn headers() -> Vec<&'static str> {
        let mut headers = vec!["Turbine"];
        headers.extend(R::headers());
        headers
    }

    fn cells(&self) -> Vec<String> {
        let mut cells = vec![self.turbine.clone()];
        cells.extend(self.row.cells());
        cells
    }
}

/// Label every row of a turbine table with the turbine title
pub fn label<R: Clone>(turbine: &str, rows: &[R]) -> Vec<FleetRow<R>> {
    rows.iter()
        .map(|row| FleetRow {
            turbine: turbine.to_string(),
            row: row.clone(),
        })
        .collect()
}
