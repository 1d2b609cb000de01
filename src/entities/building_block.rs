//! Building block - the smallest structural element of a subassembly
//!
//! A block is one of three physical kinds, decided once from which raw
//! fields are populated:
//!
//! 1. `bottom_outer_diameter` present: tubular section (a can)
//! 2. else `mass` present: lumped mass
//! 3. else `mass_distribution` present: distributed mass
//!
//! Raw lengths are in mm, masses in kg.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::core::error::{GeometryError, Result};
use crate::core::units::{hollow_frustum_volume, present, round_to};
use crate::entities::material::Material;
use crate::entities::position::Position;

/// Raw building-block record as supplied by the metadata source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildingBlockRecord {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,

    /// Owning subassembly id
    pub sub_assembly: Option<i64>,

    pub x_position: Option<f64>,
    pub y_position: Option<f64>,
    pub z_position: Option<f64>,
    pub alpha: Option<f64>,
    pub beta: Option<f64>,
    pub gamma: Option<f64>,
    pub vertical_position_reference_system: Option<String>,

    pub height: Option<f64>,
    pub mass: Option<f64>,
    pub mass_distribution: Option<f64>,
    pub volume_distribution: Option<f64>,
    pub bottom_outer_diameter: Option<f64>,
    pub top_outer_diameter: Option<f64>,
    pub wall_thickness: Option<f64>,

    /// Material id
    pub material: Option<i64>,

    pub moment_of_inertia_x: Option<f64>,
    pub moment_of_inertia_y: Option<f64>,
    pub moment_of_inertia_z: Option<f64>,
}

/// Physical kind of a building block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    TubularSection,
    LumpedMass,
    DistributedMass,
}

impl BlockKind {
    /// Classify a raw record by field presence
    pub fn classify(record: &BuildingBlockRecord) -> Result<Self> {
        if present(record.bottom_outer_diameter).is_some() {
            Ok(BlockKind::TubularSection)
        } else if present(record.mass).is_some() {
            Ok(BlockKind::LumpedMass)
        } else if present(record.mass_distribution).is_some() {
            Ok(BlockKind::DistributedMass)
        } else {
            Err(GeometryError::classification(format!(
                "building block '{}' has no diameter, mass or mass distribution",
                record.title
            )))
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockKind::TubularSection => write!(f, "tubular_section"),
            BlockKind::LumpedMass => write!(f, "lumped_mass"),
            BlockKind::DistributedMass => write!(f, "distributed_mass"),
        }
    }
}

/// Rotational inertia about the three axes, kg·m²
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MomentOfInertia {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
}

/// Closed profile trace of a can in local coordinates (mm)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outline {
    pub x: [f64; 5],
    pub z: [f64; 5],
}

/// One row of a subassembly's building-block table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockRow {
    pub title: String,
    pub kind: BlockKind,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(rename = "OD")]
    pub od: String,
    pub wall_thickness: Option<f64>,
    pub height: Option<f64>,
    pub volume: Option<f64>,
    pub mass: f64,
    /// Material id
    pub material: Option<i64>,
    pub moment_of_inertia: MomentOfInertia,
    pub description: String,
    /// Absolute position in m, filled on request
    #[serde(rename = "absolute_position, m", skip_serializing_if = "Option::is_none")]
    pub absolute_position: Option<f64>,
}

impl BlockRow {
    pub fn is_grout(&self) -> bool {
        is_grout_title(&self.title)
    }
}

/// True for titles that mark a block as grout, in any case
pub fn is_grout_title(title: &str) -> bool {
    title.to_lowercase().contains("grout")
}

/// A classified building block
#[derive(Debug, Clone)]
pub struct BuildingBlock {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub position: Position,
    pub material: Option<Arc<Material>>,
    kind: BlockKind,
    record: BuildingBlockRecord,
}

impl BuildingBlock {
    /// Classify a raw record and resolve its material among `materials`
    pub fn new(record: BuildingBlockRecord, materials: &[Arc<Material>]) -> Result<Self> {
        let kind = BlockKind::classify(&record)?;
        let material = record
            .material
            .and_then(|id| materials.iter().find(|m| m.id == id).cloned());
        let position = Position::from_raw(
            [record.x_position, record.y_position, record.z_position],
            [record.alpha, record.beta, record.gamma],
            record.vertical_position_reference_system.as_deref(),
        );

        Ok(Self {
            id: record.id,
            title: record.title.clone(),
            description: record.description.clone().unwrap_or_default(),
            position,
            material,
            kind,
            record,
        })
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn is_tubular(&self) -> bool {
        self.kind == BlockKind::TubularSection
    }

    /// True for blocks whose title marks them as grout
    pub fn is_grout(&self) -> bool {
        is_grout_title(&self.title)
    }

    /// The raw record this block was built from
    pub fn record(&self) -> &BuildingBlockRecord {
        &self.record
    }

    /// Wall thickness in mm (tubular sections only)
    pub fn wall_thickness(&self) -> Option<f64> {
        self.tubular_field(self.record.wall_thickness)
    }

    /// Bottom outer diameter in mm (tubular sections only)
    pub fn bottom_outer_diameter(&self) -> Option<f64> {
        self.tubular_field(self.record.bottom_outer_diameter)
    }

    /// Top outer diameter in mm (tubular sections only)
    ///
    /// A missing top diameter means a straight can.
    pub fn top_outer_diameter(&self) -> Option<f64> {
        self.tubular_field(self.record.top_outer_diameter)
            .or_else(|| self.bottom_outer_diameter())
    }

    fn tubular_field(&self, value: Option<f64>) -> Option<f64> {
        if self.is_tubular() {
            present(value)
        } else {
            None
        }
    }

    /// Height in mm
    pub fn height(&self) -> Option<f64> {
        present(self.record.height)
    }

    fn nonzero_height(&self) -> Result<f64> {
        match self.height() {
            Some(h) if h != 0.0 => Ok(h),
            _ => Err(GeometryError::missing(format!(
                "height data is missing for building block '{}'",
                self.title
            ))),
        }
    }

    /// Diameter as "bottom/top" in whole mm, a single value when both match
    pub fn diameter_str(&self) -> String {
        match (self.bottom_outer_diameter(), self.top_outer_diameter()) {
            (Some(bottom), Some(top)) if bottom != 0.0 && top != 0.0 => {
                let b = bottom.round_ties_even() as i64;
                if top != bottom {
                    format!("{}/{}", b, top.round_ties_even() as i64)
                } else {
                    b.to_string()
                }
            }
            _ => String::new(),
        }
    }

    /// Volume in m³
    ///
    /// Tubular sections use outer minus inner frustum. Distributed masses
    /// use `volume_distribution × height`. Lumped masses have no volume.
    pub fn volume(&self) -> Result<Option<f64>> {
        match self.kind {
            BlockKind::TubularSection => {
                let height = self.nonzero_height()?;
                let wall = self.wall_thickness().ok_or_else(|| {
                    GeometryError::missing(format!(
                        "wall thickness is missing for building block '{}'",
                        self.title
                    ))
                })?;
                let r_bottom = self.bottom_outer_diameter().unwrap_or_default() / 2.0;
                let r_top = self.top_outer_diameter().unwrap_or_default() / 2.0;
                Ok(Some(hollow_frustum_volume(r_bottom, r_top, wall, height) / 1e9))
            }
            BlockKind::DistributedMass => {
                let height = self.nonzero_height()?;
                Ok(present(self.record.volume_distribution)
                    .map(|vd| round_to(vd * height / 1000.0, 0)))
            }
            BlockKind::LumpedMass => Ok(None),
        }
    }

    /// Mass in kg
    pub fn mass(&self) -> Result<f64> {
        match self.kind {
            BlockKind::LumpedMass => present(self.record.mass).ok_or_else(|| {
                GeometryError::missing(format!("mass is missing for building block '{}'", self.title))
            }),
            BlockKind::DistributedMass => {
                let height = self.nonzero_height()?;
                let md = present(self.record.mass_distribution).unwrap_or_default();
                Ok(round_to(md * height / 1000.0, 0))
            }
            BlockKind::TubularSection => {
                let material = self.material.as_ref().ok_or_else(|| {
                    GeometryError::missing(format!(
                        "material data is missing for building block '{}'",
                        self.title
                    ))
                })?;
                let volume = self.volume()?;
                match (material.density, volume) {
                    (Some(rho), Some(v)) if rho != 0.0 && v != 0.0 => Ok(round_to(v * rho, 1)),
                    _ => Err(GeometryError::missing(format!(
                        "density or volume data is missing for building block '{}'",
                        self.title
                    ))),
                }
            }
        }
    }

    /// Moment of inertia, populated for lumped masses only
    pub fn moment_of_inertia(&self) -> MomentOfInertia {
        if self.kind == BlockKind::LumpedMass {
            MomentOfInertia {
                x: present(self.record.moment_of_inertia_x),
                y: present(self.record.moment_of_inertia_y),
                z: present(self.record.moment_of_inertia_z),
            }
        } else {
            MomentOfInertia::default()
        }
    }

    /// Profile trace of a can: bottom right, bottom left, top left, top right, closed
    pub fn outline(&self) -> Option<Outline> {
        if !self.is_tubular() {
            return None;
        }
        let height = self.height()?;
        let z_bottom = self.position.z;
        let z_top = self.position.z + height;
        let x_bottom = self.bottom_outer_diameter()? / 2.0;
        let x_top = self.top_outer_diameter()? / 2.0;

        Some(Outline {
            x: [x_bottom, -x_bottom, -x_top, x_top, x_bottom],
            z: [z_bottom, z_bottom, z_top, z_top, z_bottom],
        })
    }

    /// Tabular view of this block
    pub fn as_row(&self) -> Result<BlockRow> {
        Ok(BlockRow {
            title: self.title.clone(),
            kind: self.kind,
            x: self.position.x,
            y: self.position.y,
            z: self.position.z,
            od: self.diameter_str(),
            wall_thickness: self.wall_thickness(),
            height: self.height(),
            volume: self.volume()?,
            mass: self.mass()?,
            material: self.material.as_ref().map(|m| m.id),
            moment_of_inertia: self.moment_of_inertia(),
            description: self.description.clone(),
            absolute_position: None,
        })
    }
}

impl fmt::Display for BuildingBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::material::MaterialRecord;
    use std::f64::consts::PI;

    fn steel() -> Vec<Arc<Material>> {
        vec![Arc::new(Material::from(MaterialRecord {
            id: 1,
            title: "Steel".to_string(),
            description: None,
            young_modulus: Some(210000.0),
            density: Some(7850.0),
            poisson_ratio: Some(0.3),
        }))]
    }

    fn can(height: f64, bottom: f64, top: f64, wall: f64) -> BuildingBlockRecord {
        BuildingBlockRecord {
            id: 1,
            title: "can".to_string(),
            height: Some(height),
            bottom_outer_diameter: Some(bottom),
            top_outer_diameter: Some(top),
            wall_thickness: Some(wall),
            material: Some(1),
            ..Default::default()
        }
    }

    #[test]
    fn test_classification_priority() {
        let mut record = can(1000.0, 6000.0, 6000.0, 50.0);
        record.mass = Some(100.0);
        record.mass_distribution = Some(10.0);
        assert_eq!(BlockKind::classify(&record).unwrap(), BlockKind::TubularSection);

        record.bottom_outer_diameter = Some(f64::NAN);
        assert_eq!(BlockKind::classify(&record).unwrap(), BlockKind::LumpedMass);

        record.mass = None;
        assert_eq!(BlockKind::classify(&record).unwrap(), BlockKind::DistributedMass);

        record.mass_distribution = None;
        assert!(matches!(
            BlockKind::classify(&record),
            Err(GeometryError::Classification(_))
        ));
    }

    #[test]
    fn test_cylinder_volume_and_mass() {
        let bb = BuildingBlock::new(can(1000.0, 6000.0, 6000.0, 50.0), &steel()).unwrap();
        let volume = bb.volume().unwrap().unwrap();
        let expected = PI * (9.0 - 2.95 * 2.95);
        assert!((volume - expected).abs() < 1e-9);
        assert!(volume > 0.0);
        assert_eq!(bb.mass().unwrap(), round_to(expected * 7850.0, 1));
    }

    #[test]
    fn test_volume_requires_height() {
        let bb = BuildingBlock::new(can(0.0, 6000.0, 6000.0, 50.0), &steel()).unwrap();
        assert!(matches!(bb.volume(), Err(GeometryError::MissingData(_))));
    }

    #[test]
    fn test_tubular_mass_requires_material() {
        let bb = BuildingBlock::new(can(1000.0, 6000.0, 6000.0, 50.0), &[]).unwrap();
        assert!(bb.material.is_none());
        assert!(matches!(bb.mass(), Err(GeometryError::MissingData(_))));
    }

    #[test]
    fn test_diameter_str() {
        let conical = BuildingBlock::new(can(1000.0, 6000.0, 5000.4, 50.0), &steel()).unwrap();
        assert_eq!(conical.diameter_str(), "6000/5000");
        let straight = BuildingBlock::new(can(1000.0, 6500.0, 6500.0, 50.0), &steel()).unwrap();
        assert_eq!(straight.diameter_str(), "6500");

        let lumped = BuildingBlock::new(
            BuildingBlockRecord {
                title: "platform".to_string(),
                mass: Some(100.0),
                ..Default::default()
            },
            &steel(),
        )
        .unwrap();
        assert_eq!(lumped.diameter_str(), "");
        assert_eq!(lumped.wall_thickness(), None);
    }

    #[test]
    fn test_distributed_mass() {
        let bb = BuildingBlock::new(
            BuildingBlockRecord {
                title: "TP_grout".to_string(),
                height: Some(4000.0),
                mass_distribution: Some(500.0),
                volume_distribution: Some(0.2),
                ..Default::default()
            },
            &steel(),
        )
        .unwrap();
        assert_eq!(bb.kind(), BlockKind::DistributedMass);
        assert_eq!(bb.mass().unwrap(), 2000.0);
        // 0.8 rounds to 1
        assert_eq!(bb.volume().unwrap(), Some(1.0));
        assert!(bb.is_grout());
        assert!(bb.as_row().unwrap().is_grout());
        assert!(bb.outline().is_none());
    }

    #[test]
    fn test_grout_title_ignores_case() {
        assert!(is_grout_title("TP_Grout_1"));
        assert!(is_grout_title("GROUT"));
        assert!(!is_grout_title("TP_anodes"));

        let tube = BuildingBlock::new(can(1000.0, 6000.0, 6000.0, 50.0), &steel()).unwrap();
        assert_eq!(tube.is_grout(), tube.as_row().unwrap().is_grout());
    }

    #[test]
    fn test_lumped_mass_inertia() {
        let bb = BuildingBlock::new(
            BuildingBlockRecord {
                title: "BB_1".to_string(),
                mass: Some(100.0),
                moment_of_inertia_x: Some(1.0),
                moment_of_inertia_y: Some(2.0),
                moment_of_inertia_z: Some(3.0),
                ..Default::default()
            },
            &steel(),
        )
        .unwrap();
        assert_eq!(bb.mass().unwrap(), 100.0);
        assert_eq!(bb.moment_of_inertia().y, Some(2.0));
        assert_eq!(bb.volume().unwrap(), None);
        assert_eq!(bb.to_string(), "BB_1 (lumped_mass)");

        let tube = BuildingBlock::new(can(1000.0, 6000.0, 6000.0, 50.0), &steel()).unwrap();
        assert_eq!(tube.moment_of_inertia(), MomentOfInertia::default());
    }

    #[test]
    fn test_outline_trace() {
        let mut record = can(10000.0, 6000.0, 5000.0, 40.0);
        record.z_position = Some(2000.0);
        let bb = BuildingBlock::new(record, &steel()).unwrap();
        let outline = bb.outline().unwrap();
        assert_eq!(outline.x, [3000.0, -3000.0, -2500.0, 2500.0, 3000.0]);
        assert_eq!(outline.z, [2000.0, 2000.0, 12000.0, 12000.0, 2000.0]);
    }
}
